/// Walker physics: one tick of movement for anything that walks.
///
/// ## Order within a tick
///   1. Horizontal input moves by `speed` and sets facing.
///   2. On a ladder, UP/DOWN climb at half speed; otherwise gravity,
///      and a fresh UP/DOWN over a ladder grabs it.
///   3. The four-corner collider resolves the body against the grid
///      (center `CENTER_OFFSET` above the foot, half-height the same).
///   4. Landing, ledge hanging, and jumping are decided from the push.
///
/// ## Collider flags
///   - `ladders_below_solid`  unless climbing or jumping, so walkers
///     stand on ladder tops but can jump up through them
///   - `diagonal_corner_push` only while climbing, so a climber slides
///     past a block corner instead of snapping to its side

use super::collision::{collide, Collision, TileLookup, CELL};
use super::entity::{Body, Buttons, FrameInput, WalkState, WalkerStats, CENTER_OFFSET};
use super::tile::Metatile;

pub const GRAVITY: f32 = 0.125;
pub const MAX_FALL_SPEED: f32 = 4.0;
/// Slowest fall that still counts as a landing.
pub const LANDING_SPEED: f32 = 0.25;

/// What happened during a walker tick.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WalkOutcome {
    pub pushed: Collision,
    /// Came down on a floor fast enough to count as a landing.
    pub landed: bool,
    pub jumped: bool,
}

impl Default for WalkOutcome {
    fn default() -> Self {
        WalkOutcome { pushed: Collision::NoCollision, landed: false, jumped: false }
    }
}

/// Tile under a screen pixel.
///
/// Only the 16 visible columns are addressed; rows wrap by one screen
/// height in either direction.
pub fn block_at<L: TileLookup + ?Sized>(lookup: &L, px: f32, py: f32) -> Metatile {
    let rows = lookup.rows() as i32;
    let x = ((px / CELL).floor() as i32).rem_euclid(16);
    let mut y = (py / CELL).floor() as i32;
    if y < 0 {
        y += rows;
    } else if y >= rows {
        y -= rows;
    }
    lookup.cell(x, y)
}

/// Advance `body` by one tick.
pub fn walk<L: TileLookup + ?Sized>(
    body: &mut Body,
    stats: &WalkerStats,
    lookup: &L,
    input: FrameInput,
) -> WalkOutcome {
    let mut out = WalkOutcome::default();
    let Some(mut pos) = body.pos else {
        return out;
    };
    let (held, pressed) = (input.held, input.pressed);

    // ── Horizontal ──
    let dir = if held.any(Buttons::RIGHT) {
        Some(false)
    } else if held.any(Buttons::LEFT) {
        Some(true)
    } else {
        None
    };
    match dir {
        Some(left) => {
            pos.x += if left { -stats.speed } else { stats.speed };
            if body.state == WalkState::Walking {
                body.walking_frame = (body.walking_frame + 32) % 1024;
            }
            if body.facing_left != left && body.state == WalkState::Hanging {
                body.state = WalkState::Jumping;
            }
            body.facing_left = left;
        }
        None if body.state == WalkState::Walking => body.walking_frame = 128,
        None => {}
    }

    // ── Vertical ──
    if body.state == WalkState::OnLadder {
        body.yvel = if held.any(Buttons::UP) {
            -stats.speed / 2.0
        } else if held.any(Buttons::DOWN) {
            stats.speed / 2.0
        } else {
            0.0
        };
        if !block_at(lookup, pos.x, pos.y - CENTER_OFFSET).is_ladder()
            && !block_at(lookup, pos.x, pos.y + 1.0).is_ladder()
        {
            body.state = WalkState::Walking;
        }
    } else {
        body.yvel = (body.yvel + GRAVITY).min(MAX_FALL_SPEED);
        if pressed.any(Buttons::UP | Buttons::DOWN) && !body.carrying_block {
            let probe = if pressed.any(Buttons::DOWN) { 1.0 } else { -1.0 };
            if block_at(lookup, pos.x, pos.y + probe).is_ladder() {
                body.state = WalkState::OnLadder;
            }
        }
    }
    pos.y += body.yvel;

    // ── Collision ──
    let on_ladder = body.state == WalkState::OnLadder;
    let ladders_below_solid = !matches!(body.state, WalkState::OnLadder | WalkState::Jumping);
    out.pushed = collide(
        lookup,
        pos.x,
        pos.y - CENTER_OFFSET,
        stats.half_width,
        CENTER_OFFSET,
        ladders_below_solid,
        on_ladder,
    );

    let mut on_floor = false;
    if let Collision::Push { dx, dy } = out.pushed {
        pos.x += dx;
        if dy > 0.0 || body.yvel > 0.0 {
            pos.y += dy;
        }
        if dy < 0.0 {
            if body.yvel >= 0.0 {
                out.landed = body.yvel >= LANDING_SPEED;
                body.yvel = body.yvel.min(0.0);
                on_floor = true;
            }
        } else if dy > 0.0 {
            body.yvel = body.yvel.max(0.0);
        }
    }

    // ── Landing / hanging ──
    let mut can_jump = false;
    if on_floor {
        can_jump = true;
        if matches!(body.state, WalkState::Jumping | WalkState::Hanging)
            || (body.state == WalkState::OnLadder && body.yvel > LANDING_SPEED)
        {
            body.state = WalkState::Walking;
            body.walking_frame = 128;
        }
    } else if stats.can_hang
        && body.yvel > 0.0
        && !held.any(Buttons::DOWN)
        && !body.carrying_block
    {
        let ledge_x = pos.x + if body.facing_left { -5.0 } else { 5.0 };
        let solid_lo = block_at(lookup, ledge_x, pos.y - 14.0).is_block();
        let solid_hi = block_at(lookup, ledge_x, pos.y - 18.0).is_block();
        if solid_lo && !solid_hi {
            body.state = WalkState::Hanging;
            body.yvel = 0.0;
            pos.y = ((pos.y + 8.0) / CELL).floor() * CELL;
            can_jump = true;
        }
    } else if body.state == WalkState::OnLadder {
        can_jump = true;
    }

    // ── Jump ──
    if can_jump {
        let jump_mask = if body.state == WalkState::OnLadder {
            Buttons::A
        } else {
            Buttons::UP | Buttons::A
        };
        if pressed.any(jump_mask) {
            body.yvel = if body.state == WalkState::Hanging {
                -stats.hang_jump_power
            } else {
                -stats.jump_power
            };
            body.state = WalkState::Jumping;
            out.jumped = body.yvel < 0.0;
        }
    }

    body.pos = Some(pos);
    out
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Pos, PLAYER_STATS};
    use crate::domain::tile::{MT_BLOCK, MT_LADDER};

    /// 16-column room from a diagram.
    /// Legend: '%'=block  'H'=ladder  ' '=empty
    struct Room {
        cells: Vec<[u8; 16]>,
    }

    impl TileLookup for Room {
        fn cell(&self, x: i32, y: i32) -> Metatile {
            if y < 0 || y as usize >= self.cells.len() {
                return Metatile::EMPTY;
            }
            Metatile(self.cells[y as usize][x.rem_euclid(16) as usize])
        }

        fn rows(&self) -> usize {
            self.cells.len()
        }
    }

    fn room(rows: &[&str]) -> Room {
        let cells = rows
            .iter()
            .map(|row| {
                let mut r = [0u8; 16];
                for (x, ch) in row.chars().take(16).enumerate() {
                    r[x] = match ch {
                        '%' => MT_BLOCK,
                        'H' => MT_LADDER,
                        _ => 0,
                    };
                }
                r
            })
            .collect();
        Room { cells }
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn press(b: Buttons) -> FrameInput {
        FrameInput { held: b, pressed: b }
    }

    fn hold(b: Buttons) -> FrameInput {
        FrameInput { held: b, pressed: Buttons::NONE }
    }

    fn run(body: &mut Body, r: &Room, input: FrameInput, ticks: usize) {
        for _ in 0..ticks {
            walk(body, &PLAYER_STATS, r, input);
        }
    }

    /// Row 3 floor; foot at y=48 stands exactly on it.
    fn flat() -> Room {
        room(&[
            "                ",
            "                ",
            "                ",
            "%%%%%%%%%%%%%%%%",
        ])
    }

    // ── block_at ──

    #[test]
    fn block_at_wraps_columns_and_rows() {
        let r = room(&["%               ", "                ", "               H"]);
        assert!(block_at(&r, 3.0, 3.0).is_block());
        assert!(block_at(&r, 16.0 * 16.0 + 3.0, 3.0).is_block());
        assert!(block_at(&r, -1.0, -1.0).is_ladder());
        assert!(block_at(&r, 3.0, 3.0 * 16.0 + 3.0).is_block());
    }

    // ── Gravity and landing ──

    #[test]
    fn falling_body_accelerates_up_to_max() {
        let r = room(&["                "; 4]);
        let mut b = Body::new(Pos::new(40.0, 0.0));
        run(&mut b, &r, idle(), 40);
        assert_eq!(b.yvel, MAX_FALL_SPEED);
    }

    #[test]
    fn body_lands_on_floor_and_stops() {
        let r = flat();
        let mut b = Body::new(Pos::new(40.0, 20.0));
        b.state = WalkState::Jumping;
        let mut landed = false;
        for _ in 0..60 {
            let out = walk(&mut b, &PLAYER_STATS, &r, idle());
            landed |= out.landed;
        }
        assert!(landed);
        assert_eq!(b.state, WalkState::Walking);
        assert_eq!(b.yvel, 0.0);
        let y = b.pos.map(|p| p.y).unwrap_or_default();
        assert!((47.0..=48.0).contains(&y), "foot at {y}");
    }

    #[test]
    fn standing_body_stays_put() {
        let r = flat();
        let mut b = Body::new(Pos::new(40.0, 48.0));
        run(&mut b, &r, idle(), 10);
        let p = b.pos.unwrap_or_default();
        assert_eq!(p.x, 40.0);
        assert!((47.0..=48.0).contains(&p.y));
    }

    #[test]
    fn dead_body_does_not_move() {
        let r = flat();
        let mut b = Body::new(Pos::new(40.0, 20.0));
        b.pos = None;
        let out = walk(&mut b, &PLAYER_STATS, &r, hold(Buttons::RIGHT));
        assert_eq!(out, WalkOutcome::default());
        assert!(b.pos.is_none());
    }

    // ── Walking ──

    #[test]
    fn walking_moves_by_speed_and_faces() {
        let r = flat();
        let mut b = Body::new(Pos::new(40.0, 48.0));
        run(&mut b, &r, hold(Buttons::LEFT), 5);
        assert!(b.facing_left);
        assert_eq!(b.pos.map(|p| p.x), Some(30.0));
    }

    #[test]
    fn wall_stops_walker() {
        let r = room(&[
            "                ",
            "                ",
            "    %           ",
            "%%%%%%%%%%%%%%%%",
        ]);
        let mut b = Body::new(Pos::new(40.0, 48.0));
        run(&mut b, &r, hold(Buttons::RIGHT), 30);
        let x = b.pos.map(|p| p.x).unwrap_or_default();
        // Wall at x 64..80, half-width 4.
        assert!((58.0..=60.0).contains(&x), "x = {x}");
    }

    // ── Jumping ──

    #[test]
    fn jump_from_floor() {
        let r = flat();
        let mut b = Body::new(Pos::new(40.0, 48.0));
        walk(&mut b, &PLAYER_STATS, &r, idle());
        let out = walk(&mut b, &PLAYER_STATS, &r, press(Buttons::A));
        assert!(out.jumped);
        assert_eq!(b.state, WalkState::Jumping);
        assert_eq!(b.yvel, -PLAYER_STATS.jump_power);
    }

    #[test]
    fn no_jump_in_midair() {
        let r = room(&["                "; 6]);
        let mut b = Body::new(Pos::new(40.0, 20.0));
        let out = walk(&mut b, &PLAYER_STATS, &r, press(Buttons::A));
        assert!(!out.jumped);
        assert!(b.yvel > 0.0);
    }

    #[test]
    fn held_jump_does_not_repeat() {
        let r = flat();
        let mut b = Body::new(Pos::new(40.0, 48.0));
        walk(&mut b, &PLAYER_STATS, &r, idle());
        let out = walk(&mut b, &PLAYER_STATS, &r, hold(Buttons::A));
        assert!(!out.jumped);
    }

    // ── Ladders ──

    fn ladder_room() -> Room {
        room(&[
            "                ",
            "%%H%%%%%%%%%%%%%",
            "  H             ",
            "  H             ",
            "%%%%%%%%%%%%%%%%",
        ])
    }

    #[test]
    fn ladder_top_is_a_floor() {
        let r = ladder_room();
        let mut b = Body::new(Pos::new(40.0, 10.0));
        run(&mut b, &r, idle(), 30);
        let y = b.pos.map(|p| p.y).unwrap_or_default();
        assert!((15.0..=16.0).contains(&y), "foot at {y}");
    }

    #[test]
    fn up_grabs_ladder_and_climbs_at_half_speed() {
        let r = ladder_room();
        let mut b = Body::new(Pos::new(40.0, 64.0));
        walk(&mut b, &PLAYER_STATS, &r, idle());
        walk(&mut b, &PLAYER_STATS, &r, press(Buttons::UP));
        assert_eq!(b.state, WalkState::OnLadder);

        let before = b.pos.map(|p| p.y).unwrap_or_default();
        walk(&mut b, &PLAYER_STATS, &r, hold(Buttons::UP));
        let after = b.pos.map(|p| p.y).unwrap_or_default();
        assert_eq!(before - after, PLAYER_STATS.speed / 2.0);
    }

    #[test]
    fn climbing_reaches_the_upper_floor() {
        let r = ladder_room();
        let mut b = Body::new(Pos::new(40.0, 64.0));
        walk(&mut b, &PLAYER_STATS, &r, idle());
        walk(&mut b, &PLAYER_STATS, &r, press(Buttons::UP));
        run(&mut b, &r, hold(Buttons::UP), 80);
        run(&mut b, &r, idle(), 10);
        let y = b.pos.map(|p| p.y).unwrap_or_default();
        assert!(y <= 16.0, "foot at {y}");
        assert_eq!(b.state, WalkState::Walking);
    }

    #[test]
    fn carrying_a_block_prevents_grabbing() {
        let r = ladder_room();
        let mut b = Body::new(Pos::new(40.0, 64.0));
        b.carrying_block = true;
        walk(&mut b, &PLAYER_STATS, &r, idle());
        walk(&mut b, &PLAYER_STATS, &r, press(Buttons::UP));
        assert_ne!(b.state, WalkState::OnLadder);
    }

    #[test]
    fn up_does_not_jump_off_a_ladder_but_a_does() {
        let r = ladder_room();
        let mut b = Body::new(Pos::new(40.0, 56.0));
        b.state = WalkState::OnLadder;
        let out = walk(&mut b, &PLAYER_STATS, &r, press(Buttons::UP));
        assert!(!out.jumped);
        let out = walk(&mut b, &PLAYER_STATS, &r, press(Buttons::A));
        assert!(out.jumped);
        assert_eq!(b.state, WalkState::Jumping);
    }

    // ── Ledges ──

    #[test]
    fn falling_past_a_ledge_hangs() {
        let r = room(&[
            "                ",
            "                ",
            "    %           ",
            "                ",
            "                ",
            "%%%%%%%%%%%%%%%%",
        ]);
        // Just left of the block, falling, facing right.
        let mut b = Body::new(Pos::new(59.0, 30.0));
        b.state = WalkState::Jumping;
        b.yvel = 1.0;
        let mut hung = false;
        for _ in 0..20 {
            walk(&mut b, &PLAYER_STATS, &r, idle());
            if b.state == WalkState::Hanging {
                hung = true;
                break;
            }
        }
        assert!(hung);
        assert_eq!(b.yvel, 0.0);
        assert_eq!(b.pos.map(|p| p.y), Some(48.0));
    }

    #[test]
    fn down_prevents_hanging() {
        let r = room(&[
            "                ",
            "                ",
            "    %           ",
            "                ",
            "                ",
            "%%%%%%%%%%%%%%%%",
        ]);
        let mut b = Body::new(Pos::new(59.0, 30.0));
        b.state = WalkState::Jumping;
        b.yvel = 1.0;
        for _ in 0..20 {
            walk(&mut b, &PLAYER_STATS, &r, hold(Buttons::DOWN));
            assert_ne!(b.state, WalkState::Hanging);
        }
    }
}
