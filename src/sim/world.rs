/// WorldState: the complete snapshot of a running game.
///
/// ## Ownership
///
/// One `WorldState` exists per game. `step` mutates it once per tick and
/// the renderer reads it (and drains the plane's dirty mask) right after.
/// Nothing else holds references into it between frames.
///
/// ## Screen
///
/// The visible room is the first 16 columns of the plane, 11 rows of map
/// plus one spare row, 16 px per tile. Scroll stays at (0, 0).

use crate::domain::ai::{LaneCycle, Spawner};
use crate::domain::entity::{Enemy, Player, Poof, Pos, TossedBlock, WalkState};
use crate::sim::plane::MetatilePlane;

pub const SCREEN_WIDTH: i32 = 256;
pub const SCREEN_HEIGHT: i32 = 176;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Playing,
    RoomClear,
    GameOver,
    GameComplete,
}

#[derive(Clone, Debug)]
pub struct WorldState {
    pub plane: MetatilePlane,

    // ── Actors ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub player_projectiles: Vec<TossedBlock>,
    pub poofs: Vec<Poof>,

    // ── Spawning / exit ──
    pub spawner: Option<Spawner>,
    /// Ticks until the next spawn or ceiling re-entry may happen.
    pub spawn_time: i32,
    pub lanes: LaneCycle,
    pub exit: Option<(i32, i32)>,

    // ── Progress ──
    pub phase: Phase,
    pub room_index: usize,
    pub room_name: String,
    pub score: u32,
    pub starting_health: u32,
    pub tick: u64,

    // ── UI ──
    pub message: String,
    pub message_timer: u32,
}

impl WorldState {
    pub fn new(starting_health: u32) -> Self {
        WorldState {
            plane: MetatilePlane::default(),
            player: Player::new(Pos::standing_in(1, 9), starting_health),
            enemies: vec![],
            player_projectiles: vec![],
            poofs: vec![],
            spawner: None,
            spawn_time: 0,
            lanes: LaneCycle::default(),
            exit: None,
            phase: Phase::Playing,
            room_index: 0,
            room_name: String::new(),
            score: 0,
            starting_health,
            tick: 0,
            message: String::new(),
            message_timer: 0,
        }
    }

    /// Forget everything that belongs to the current room. The player
    /// keeps health and position; movement state is reset.
    pub fn clear_objs(&mut self) {
        self.enemies.clear();
        self.player_projectiles.clear();
        self.poofs.clear();
        self.spawner = None;
        self.spawn_time = 0;
        self.exit = None;

        let body = &mut self.player.body;
        body.yvel = 0.0;
        body.state = WalkState::Walking;
        body.carrying_block = false;
        body.walking_frame = 0;
    }

    pub fn set_message(&mut self, msg: &str, duration: u32) {
        self.message = msg.to_string();
        self.message_timer = duration;
    }
}
