/// Entities: Player, Enemy, TossedBlock, Poof.
///
/// Positions are foot positions in screen pixels: `x` is the horizontal
/// center, `y` the bottom of the hitbox. `None` means dead; dead entities
/// neither move nor draw and are pruned at the end of the tick.

use std::ops::{BitAnd, BitOr, Not};

/// Collision center sits this far above the foot; also the collision
/// half-height of every walker.
pub const CENTER_OFFSET: f32 = 8.0;

// ── Input ──

/// Button bitset.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
pub struct Buttons(pub u8);

impl Buttons {
    pub const NONE: Buttons = Buttons(0);
    pub const A: Buttons = Buttons(0x80);
    pub const B: Buttons = Buttons(0x40);
    pub const START: Buttons = Buttons(0x10);
    pub const UP: Buttons = Buttons(0x08);
    pub const DOWN: Buttons = Buttons(0x04);
    pub const LEFT: Buttons = Buttons(0x02);
    pub const RIGHT: Buttons = Buttons(0x01);

    /// True if any button of `mask` is set.
    #[inline]
    pub fn any(self, mask: Buttons) -> bool {
        self.0 & mask.0 != 0
    }
}

impl BitOr for Buttons {
    type Output = Buttons;
    fn bitor(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 | rhs.0)
    }
}

impl BitAnd for Buttons {
    type Output = Buttons;
    fn bitand(self, rhs: Buttons) -> Buttons {
        Buttons(self.0 & rhs.0)
    }
}

impl Not for Buttons {
    type Output = Buttons;
    fn not(self) -> Buttons {
        Buttons(!self.0)
    }
}

/// Frame input: buttons held now, and those that were not held last frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameInput {
    pub held: Buttons,
    pub pressed: Buttons,
}

impl FrameInput {
    pub fn new(held: Buttons, previous: Buttons) -> Self {
        FrameInput { held, pressed: held & !previous }
    }
}

// ── Bodies ──

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Pos {
    pub x: f32,
    pub y: f32,
}

impl Pos {
    pub const fn new(x: f32, y: f32) -> Self {
        Pos { x, y }
    }

    /// Foot position standing at the bottom of cell `(cx, cy)`.
    pub fn standing_in(cx: i32, cy: i32) -> Self {
        Pos::new(cx as f32 * 16.0 + 8.0, cy as f32 * 16.0 + 15.0)
    }
}

/// Walker state machine (shared by Player and walking enemies).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WalkState {
    Walking,
    Hanging,
    Jumping,
    OnLadder,
    Reposition,  // enemy only: off screen, waiting to re-enter from the ceiling
    Throwing,    // player only: toss animation
    EnteringDoor,
}

/// Per-kind movement parameters.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WalkerStats {
    pub speed: f32,
    pub half_width: f32,
    /// Contact half-height; collision always uses `CENTER_OFFSET`.
    pub half_height: f32,
    pub jump_power: f32,
    pub hang_jump_power: f32,
    pub can_hang: bool,
}

pub const PLAYER_STATS: WalkerStats = WalkerStats {
    speed: 2.0,
    half_width: 4.0,
    half_height: 8.0,
    jump_power: 3.0,
    hang_jump_power: 2.0,
    can_hang: true,
};

/// Movement state common to everything that walks.
#[derive(Clone, Debug)]
pub struct Body {
    pub pos: Option<Pos>,
    pub yvel: f32,
    pub facing_left: bool,
    pub state: WalkState,
    /// Animation phase while walking; step counter in the other states.
    pub walking_frame: u32,
    pub carrying_block: bool,
    pub mercy_time: u32,
}

impl Body {
    pub fn new(pos: Pos) -> Self {
        Body {
            pos: Some(pos),
            yvel: 0.0,
            facing_left: false,
            state: WalkState::Walking,
            walking_frame: 0,
            carrying_block: false,
            mercy_time: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.pos.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Body,
    pub health: u32,
}

impl Player {
    pub fn new(pos: Pos, health: u32) -> Self {
        Player { body: Body::new(pos), health }
    }
}

// ── Enemies ──

/// Enemy kinds. Behavior is selected by data, not by subtype.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum EnemyKind {
    Plodder,
    Pecker,
    Sneaker,
    Spinner,
    Burger,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Locomotion {
    Walks,
    Flies,
}

impl EnemyKind {
    pub fn stats(self) -> WalkerStats {
        let (speed, half_height) = match self {
            EnemyKind::Plodder | EnemyKind::Spinner => (1.0, 8.0),
            EnemyKind::Pecker => (2.0, 8.0),
            EnemyKind::Sneaker => (3.0, 7.0),
            EnemyKind::Burger => (3.0, 8.0),
        };
        // Walkers only ever hop out of a stun; flyers never jump.
        let jump_power = match self.locomotion() {
            Locomotion::Walks => 1.0,
            Locomotion::Flies => 0.0,
        };
        WalkerStats {
            speed,
            half_width: 7.0,
            half_height,
            jump_power,
            hang_jump_power: 2.0,
            can_hang: false,
        }
    }

    pub fn locomotion(self) -> Locomotion {
        match self {
            EnemyKind::Spinner | EnemyKind::Burger => Locomotion::Flies,
            _ => Locomotion::Walks,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Plodder => "plodder",
            EnemyKind::Pecker => "pecker",
            EnemyKind::Sneaker => "sneaker",
            EnemyKind::Spinner => "spinner",
            EnemyKind::Burger => "burger",
        }
    }
}

/// Sneaker lookout state.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Lookout {
    pub crouch_time: u32,
    /// Column the last threat scan ran from; scans repeat only on a new column.
    pub test_column: Option<i32>,
    /// Once hit, a sneaker stops crouching for good.
    pub damaged: bool,
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub body: Body,
    pub stun_time: u32,
    pub lookout: Lookout,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Pos) -> Self {
        Enemy {
            kind,
            body: Body::new(pos),
            stun_time: 0,
            lookout: Lookout::default(),
        }
    }

    #[inline]
    pub fn is_stunned(&self) -> bool {
        self.stun_time > 0
    }

    #[inline]
    pub fn is_crouching(&self) -> bool {
        self.lookout.crouch_time > 0
    }
}

// ── Projectiles and effects ──

/// Tossed block is removed once it falls below this line.
pub const TOSS_FLOOR_Y: f32 = 176.0;

#[derive(Clone, Debug)]
pub struct TossedBlock {
    /// Center of the block.
    pub pos: Option<Pos>,
    pub xvel: f32,
    pub yvel: f32,
}

impl TossedBlock {
    pub fn new(pos: Pos, facing_left: bool) -> Self {
        TossedBlock {
            pos: Some(pos),
            xvel: if facing_left { -2.0 } else { 2.0 },
            yvel: -5.0,
        }
    }

    pub fn advance(&mut self) {
        let Some(p) = self.pos.as_mut() else {
            return;
        };
        p.y += self.yvel;
        p.x += self.xvel;
        self.yvel += 1.0;
        if p.y > TOSS_FLOOR_Y || p.x < 4.0 || p.x > 252.0 {
            self.pos = None;
        }
    }
}

/// Frames a poof lasts.
pub const POOF_FRAMES: u32 = 24;

#[derive(Clone, Debug)]
pub struct Poof {
    pub pos: Option<Pos>,
    pub frame: u32,
}

impl Poof {
    pub fn new(pos: Pos) -> Self {
        Poof { pos: Some(pos), frame: 0 }
    }

    pub fn advance(&mut self) {
        self.frame += 1;
        if self.frame >= POOF_FRAMES {
            self.pos = None;
        }
    }

    /// Distance of the four puffs from the center.
    pub fn spread(&self) -> i32 {
        self.frame.saturating_sub(8) as i32 / 4 + 4
    }
}
