/// Enemy behavior.
///
/// Walking enemies feed button bitsets into the same walker physics the
/// player uses: they hold LEFT or RIGHT in their facing direction, turn
/// around when a wall pushes them back, and press A to hop up when a stun
/// wears off. Leaving the screen sends them to `Reposition`, from where
/// they drop back in through the ceiling opening.
///
/// Flying enemies ignore the grid entirely and cross the screen on a
/// horizontal lane, re-entering from the far side on a new lane.
///
/// The sneaker watches for threats (a tossed block headed its way, or the
/// player facing it with a block in hand and a clear line of sight) and
/// crouches under them. A crouching sneaker deflects its first hit.

use tracing::debug;

use super::collision::{TileLookup, CELL};
use super::entity::{
    Body, Buttons, Enemy, EnemyKind, FrameInput, Locomotion, Pos, TossedBlock, WalkState,
};
use super::geometry::raycast_cells;
use super::physics::{walk, WalkOutcome};
use super::tile::Metatile;

/// Ticks between spawns, and the delay a ceiling re-entry adds.
pub const SPAWN_INTERVAL: i32 = 30;
pub const STUN_TICKS: u32 = 200;
pub const HIT_MERCY_TICKS: u32 = 15;
pub const CROUCH_TICKS: u32 = 30;
/// Flyers pause this long after entering so the player can get clear.
pub const FLYER_ENTRY_PAUSE: u32 = 15;

/// Walkers outside this band, or below this line, go back to the ceiling.
const WALK_MIN_X: f32 = 8.0;
const WALK_MAX_X: f32 = 248.0;
const WALK_MAX_Y: f32 = 192.0;

const SCREEN_WIDTH: f32 = 256.0;

/// What an enemy sees of the world during its tick.
pub struct Surroundings<'a, L: TileLookup + ?Sized> {
    pub lookup: &'a L,
    /// Top row of the visible screen, used to find the entry opening.
    pub ceiling: &'a [Metatile],
    pub player: &'a Body,
    pub blocks: &'a [TossedBlock],
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HitResult {
    Stunned,
    /// A crouching sneaker took the block on its shell.
    Deflected,
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct EnemyTick {
    pub jumped: bool,
    pub hit: Option<HitResult>,
}

// ── Flyer lanes ──

/// Deterministic sequence of flyer lanes.
///
/// Steps through all 32 lanes in a scattered order, so consecutive
/// flyers rarely share a height.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LaneCycle(u32);

impl LaneCycle {
    pub const LANES: u32 = 32;
    const STRIDE: u32 = 13;

    pub fn next(&mut self) -> u32 {
        self.0 = (self.0 + Self::STRIDE) % Self::LANES;
        self.0
    }

    /// Foot height of a lane.
    pub fn lane_y(lane: u32) -> f32 {
        (5 * (lane % Self::LANES) + 18) as f32
    }
}

// ── Spawning ──

/// Create a new enemy entering the room.
pub fn spawn_enemy<L: TileLookup + ?Sized>(
    kind: EnemyKind,
    facing_left: bool,
    env: &Surroundings<L>,
    spawn_time: &mut i32,
    lanes: &mut LaneCycle,
) -> Enemy {
    let mut enemy = Enemy::new(kind, Pos::new(128.0, 15.0));
    match kind.locomotion() {
        Locomotion::Walks => {
            reposition_walker(&mut enemy, env.ceiling, Some(facing_left), spawn_time);
            if let Some(pos) = enemy.body.pos {
                enemy.lookout.test_column = Some((pos.x / CELL).floor() as i32);
            }
        }
        Locomotion::Flies => reposition_flyer(&mut enemy, Some(facing_left), lanes),
    }
    debug!(kind = kind.name(), facing_left, "enemy_spawned");
    enemy
}

/// Drop a walker back in through the ceiling opening nearest to it.
/// `None` turns it around.
pub fn reposition_walker(
    enemy: &mut Enemy,
    ceiling: &[Metatile],
    facing_left: Option<bool>,
    spawn_time: &mut i32,
) {
    let body = &mut enemy.body;
    body.facing_left = facing_left.unwrap_or(!body.facing_left);

    let mut openings = ceiling
        .iter()
        .enumerate()
        .filter(|(_, t)| t.index() < 16)
        .map(|(i, _)| i as f32 * CELL + 8.0);
    let first = openings.next();
    let last = openings.last().or(first);
    match (first, last, body.pos) {
        (Some(lo), Some(hi), Some(pos)) => body.pos = Some(Pos::new(pos.x.clamp(lo, hi), 0.0)),
        _ => debug!(kind = enemy.kind.name(), "no open ceiling cells"),
    }
    body.state = WalkState::Jumping;
    *spawn_time += SPAWN_INTERVAL;
}

/// Send a flyer in from the screen edge it faces away from.
pub fn reposition_flyer(enemy: &mut Enemy, facing_left: Option<bool>, lanes: &mut LaneCycle) {
    let body = &mut enemy.body;
    body.facing_left = facing_left.unwrap_or(!body.facing_left);
    let x = if body.facing_left { 252.0 } else { 4.0 };
    body.pos = Some(Pos::new(x, LaneCycle::lane_y(lanes.next())));
    enemy.stun_time = FLYER_ENTRY_PAUSE;
}

/// Hands out the room's roster, a few enemies at a time.
#[derive(Clone, Debug)]
pub struct Spawner {
    roster: Vec<EnemyKind>,
    cursor: usize,
    looped: bool,
    limit: usize,
    facing_left: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SpawnTick {
    Wait,
    Spawn { kind: EnemyKind, facing_left: bool },
    /// Roster used up and every enemy gone.
    Exhausted,
}

impl Spawner {
    pub fn new(roster: Vec<EnemyKind>, limit: usize, looped: bool) -> Self {
        Spawner { roster, cursor: 0, looped, limit, facing_left: false }
    }

    /// One tick. `alive` counts the enemies still in the room.
    pub fn tick(&mut self, alive: usize, spawn_time: &mut i32) -> SpawnTick {
        if *spawn_time > 0 {
            *spawn_time -= 1;
        }
        if self.limit == 0 && alive == 0 {
            return SpawnTick::Exhausted;
        }
        if *spawn_time > 0 || alive >= self.limit {
            return SpawnTick::Wait;
        }
        *spawn_time = SPAWN_INTERVAL;
        match self.next_kind() {
            Some(kind) => {
                let facing_left = self.facing_left;
                self.facing_left = !facing_left;
                SpawnTick::Spawn { kind, facing_left }
            }
            None => {
                self.limit = 0;
                SpawnTick::Wait
            }
        }
    }

    fn next_kind(&mut self) -> Option<EnemyKind> {
        if self.cursor >= self.roster.len() {
            if !self.looped || self.roster.is_empty() {
                return None;
            }
            self.cursor = 0;
        }
        let kind = self.roster[self.cursor];
        self.cursor += 1;
        Some(kind)
    }
}

// ── Per-tick behavior ──

/// Advance one enemy by a tick.
pub fn step_enemy<L: TileLookup + ?Sized>(
    enemy: &mut Enemy,
    env: &Surroundings<L>,
    spawn_time: &mut i32,
    lanes: &mut LaneCycle,
) -> EnemyTick {
    let mut tick = EnemyTick::default();
    if enemy.body.pos.is_none() {
        return tick;
    }
    match enemy.kind.locomotion() {
        Locomotion::Walks => {
            if enemy.body.state == WalkState::Reposition {
                if *spawn_time <= 0 {
                    reposition_walker(enemy, env.ceiling, None, spawn_time);
                }
                return tick;
            }
            let crouched = enemy.kind == EnemyKind::Sneaker && update_lookout(enemy, env);
            tick.jumped = step_walker(enemy, env.lookup, !crouched).jumped;
        }
        Locomotion::Flies => step_flyer(enemy, lanes),
    }
    tick.hit = check_hit(enemy, env.blocks);
    tick
}

/// Walker movement: hold the facing direction unless falling, stunned, or
/// told to stay put.
pub fn step_walker<L: TileLookup + ?Sized>(enemy: &mut Enemy, lookup: &L, advancing: bool) -> WalkOutcome {
    let mut pressed = Buttons::NONE;
    if enemy.stun_time > 0 {
        enemy.stun_time -= 1;
        if enemy.stun_time == 0 {
            pressed = Buttons::A;
        }
    }
    let held = if enemy.body.yvel > 0.0 || enemy.stun_time > 0 || !advancing {
        Buttons::NONE
    } else if enemy.body.facing_left {
        Buttons::LEFT
    } else {
        Buttons::RIGHT
    };

    let stats = enemy.kind.stats();
    let out = walk(&mut enemy.body, &stats, lookup, FrameInput { held, pressed });

    if let Some((dx, _)) = out.pushed.push() {
        if dx > 0.0 {
            enemy.body.facing_left = false;
        } else if dx < 0.0 {
            enemy.body.facing_left = true;
        }
    }
    if let Some(pos) = enemy.body.pos {
        if pos.y >= WALK_MAX_Y || pos.x < WALK_MIN_X || pos.x > WALK_MAX_X {
            enemy.body.state = WalkState::Reposition;
        }
    }
    out
}

fn step_flyer(enemy: &mut Enemy, lanes: &mut LaneCycle) {
    let speed = enemy.kind.stats().speed;
    let Some(pos) = enemy.body.pos.as_mut() else {
        return;
    };
    let left_screen = if enemy.stun_time > 0 {
        enemy.stun_time -= 1;
        false
    } else if enemy.body.facing_left {
        pos.x -= speed;
        pos.x < 0.0
    } else {
        pos.x += speed;
        pos.x >= SCREEN_WIDTH
    };
    if left_screen {
        reposition_flyer(enemy, None, lanes);
    }
}

// ── Hits ──

/// Is a tossed block overlapping this enemy?
pub fn touches_block(enemy: &Enemy, blocks: &[TossedBlock]) -> bool {
    let Some(pos) = enemy.body.pos else {
        return false;
    };
    let stats = enemy.kind.stats();
    blocks.iter().filter_map(|b| b.pos).any(|b| {
        let dx = b.x - pos.x;
        let dy = b.y - pos.y + 8.0;
        dx.abs() < 4.0 + stats.half_width && dy.abs() < 4.0 + stats.half_height
    })
}

/// Count down hit immunity, or take a hit from any overlapping block.
fn check_hit(enemy: &mut Enemy, blocks: &[TossedBlock]) -> Option<HitResult> {
    if enemy.body.mercy_time > 0 {
        enemy.body.mercy_time -= 1;
        None
    } else if touches_block(enemy, blocks) {
        Some(on_hit(enemy))
    } else {
        None
    }
}

pub fn on_hit(enemy: &mut Enemy) -> HitResult {
    enemy.body.mercy_time = HIT_MERCY_TICKS;
    if enemy.kind == EnemyKind::Sneaker && !enemy.lookout.damaged && enemy.is_crouching() {
        enemy.stun_time = 0;
        enemy.lookout.damaged = true;
        debug!("sneaker_deflected");
        return HitResult::Deflected;
    }
    enemy.stun_time = STUN_TICKS;
    debug!(kind = enemy.kind.name(), "enemy_stunned");
    HitResult::Stunned
}

// ── Sneaker lookout ──

/// Decide whether the sneaker crouches this tick.
///
/// A standing sneaker only scans for threats when it enters a new column;
/// once crouched it stays down for `CROUCH_TICKS`.
pub fn update_lookout<L: TileLookup + ?Sized>(enemy: &mut Enemy, env: &Surroundings<L>) -> bool {
    let Some(pos) = enemy.body.pos else {
        return false;
    };
    let facing_left = enemy.body.facing_left;
    let look = &mut enemy.lookout;
    if look.damaged || enemy.body.yvel > 0.0 {
        look.crouch_time = 0;
        return false;
    }

    if look.crouch_time > 0 {
        look.crouch_time -= 1;
        if look.crouch_time > 0 {
            return true;
        }
    } else {
        let column = (pos.x / CELL).floor() as i32;
        if look.test_column == Some(column) {
            return false;
        }
        look.test_column = Some(column);
    }

    let threatened = env.blocks.iter().any(|b| block_is_threat(pos, facing_left, b))
        || player_is_threat(pos, facing_left, env.player, env.lookup);
    if threatened {
        look.crouch_time = CROUCH_TICKS;
    }
    threatened
}

/// A block in front of the sneaker, not far below, flying toward it.
fn block_is_threat(pos: Pos, facing_left: bool, block: &TossedBlock) -> bool {
    let Some(b) = block.pos else {
        return false;
    };
    if b.y - pos.y > 32.0 {
        return false;
    }
    let ahead = if facing_left { pos.x - b.x } else { b.x - pos.x };
    if ahead < -12.0 {
        return false;
    }
    let block_left = block.xvel < 0.0;
    block_left != facing_left
}

/// The player carrying a block, facing the sneaker, in front of it within
/// 45 degrees of level, with no block between them.
fn player_is_threat<L: TileLookup + ?Sized>(pos: Pos, facing_left: bool, player: &Body, lookup: &L) -> bool {
    let Some(p) = player.pos else {
        return false;
    };
    if !player.carrying_block || player.facing_left == facing_left {
        return false;
    }
    let dy = p.y - pos.y;
    let dx = p.x - pos.x;
    if dy.abs() > dx.abs() {
        return false;
    }
    let ahead = if facing_left { -dx } else { dx };
    if ahead < 0.0 {
        return false;
    }
    !block_in_the_way(lookup, pos, p)
}

fn block_in_the_way<L: TileLookup + ?Sized>(lookup: &L, from: Pos, to: Pos) -> bool {
    raycast_cells(
        from.x / CELL,
        (from.y - 8.0) / CELL,
        to.x / CELL,
        (to.y - 8.0) / CELL,
    )
    .into_iter()
    .any(|(x, y)| lookup.cell(x, y).is_block())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tile::MT_BLOCK;

    /// 16-column room from a diagram.
    /// Legend: '%'=block  ' '=empty
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
                    if ch == '%' {
                        r[x] = MT_BLOCK;
                    }
                }
                r
            })
            .collect();
        Room { cells }
    }

    fn ceiling_of(r: &Room) -> Vec<Metatile> {
        (0..16).map(|x| r.cell(x, 0)).collect()
    }

    fn arena() -> Room {
        room(&[
            "%%%%%%    %%%%%%",
            "                ",
            "                ",
            "%%              ",
            "%%%%%%%%%%%%%%%%",
        ])
    }

    fn player_at(x: f32, y: f32, facing_left: bool, carrying: bool) -> Body {
        let mut b = Body::new(Pos::new(x, y));
        b.facing_left = facing_left;
        b.carrying_block = carrying;
        b
    }

    fn standing(kind: EnemyKind, x: f32, y: f32, facing_left: bool) -> Enemy {
        let mut e = Enemy::new(kind, Pos::new(x, y));
        e.body.facing_left = facing_left;
        e
    }

    // ── Spawner ──

    #[test]
    fn spawner_respects_interval_and_limit() {
        let mut s = Spawner::new(vec![EnemyKind::Plodder, EnemyKind::Pecker], 1, false);
        let mut t = 0;
        assert_eq!(
            s.tick(0, &mut t),
            SpawnTick::Spawn { kind: EnemyKind::Plodder, facing_left: false }
        );
        assert_eq!(t, SPAWN_INTERVAL);
        // Limit reached while the first one lives.
        for _ in 0..100 {
            assert_eq!(s.tick(1, &mut t), SpawnTick::Wait);
        }
        assert_eq!(
            s.tick(0, &mut t),
            SpawnTick::Spawn { kind: EnemyKind::Pecker, facing_left: true }
        );
    }

    #[test]
    fn spawner_exhausts_after_roster_and_last_enemy() {
        let mut s = Spawner::new(vec![EnemyKind::Plodder], 2, false);
        let mut t = 0;
        assert!(matches!(s.tick(0, &mut t), SpawnTick::Spawn { .. }));
        t = 0;
        assert_eq!(s.tick(1, &mut t), SpawnTick::Wait);
        // Roster is empty but an enemy is still alive.
        assert_eq!(s.tick(1, &mut t), SpawnTick::Wait);
        assert_eq!(s.tick(0, &mut t), SpawnTick::Exhausted);
    }

    #[test]
    fn looped_roster_cycles() {
        let mut s = Spawner::new(vec![EnemyKind::Spinner, EnemyKind::Burger], 5, true);
        let mut kinds = Vec::new();
        for _ in 0..5 {
            let mut t = 0;
            if let SpawnTick::Spawn { kind, .. } = s.tick(0, &mut t) {
                kinds.push(kind);
            }
        }
        assert_eq!(
            kinds,
            vec![
                EnemyKind::Spinner,
                EnemyKind::Burger,
                EnemyKind::Spinner,
                EnemyKind::Burger,
                EnemyKind::Spinner,
            ]
        );
    }

    #[test]
    fn empty_roster_exhausts_immediately() {
        let mut s = Spawner::new(Vec::new(), 2, false);
        let mut t = 0;
        assert_eq!(s.tick(0, &mut t), SpawnTick::Wait);
        assert_eq!(s.tick(0, &mut t), SpawnTick::Exhausted);
    }

    // ── Reposition ──

    #[test]
    fn walker_drops_in_through_nearest_opening() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let mut t = 0;

        let mut e = standing(EnemyKind::Plodder, 20.0, 100.0, false);
        reposition_walker(&mut e, &ceiling, None, &mut t);
        assert_eq!(e.body.pos, Some(Pos::new(6.0 * 16.0 + 8.0, 0.0)));
        assert!(e.body.facing_left);
        assert_eq!(e.body.state, WalkState::Jumping);
        assert_eq!(t, SPAWN_INTERVAL);

        let mut e = standing(EnemyKind::Plodder, 240.0, 100.0, true);
        reposition_walker(&mut e, &ceiling, Some(true), &mut t);
        assert_eq!(e.body.pos, Some(Pos::new(9.0 * 16.0 + 8.0, 0.0)));
        assert!(e.body.facing_left);
    }

    #[test]
    fn walker_without_opening_stays_put() {
        let ceiling = vec![Metatile(MT_BLOCK); 16];
        let mut t = 0;
        let mut e = standing(EnemyKind::Plodder, 20.0, 100.0, false);
        reposition_walker(&mut e, &ceiling, None, &mut t);
        assert_eq!(e.body.pos, Some(Pos::new(20.0, 100.0)));
    }

    #[test]
    fn lanes_visit_every_height() {
        let mut lanes = LaneCycle::default();
        let mut seen: Vec<u32> = (0..LaneCycle::LANES).map(|_| lanes.next()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..LaneCycle::LANES).collect::<Vec<_>>());
        assert_eq!(LaneCycle::lane_y(0), 18.0);
        assert_eq!(LaneCycle::lane_y(31), 173.0);
    }

    // ── Walkers ──

    #[test]
    fn walker_turns_at_a_wall() {
        let r = arena();
        // Standing on the floor, walking left into the two-block wall.
        let mut e = standing(EnemyKind::Pecker, 48.0, 64.0, true);
        for _ in 0..20 {
            step_walker(&mut e, &r, true);
        }
        assert!(!e.body.facing_left);
    }

    #[test]
    fn walker_off_the_side_repositions() {
        let r = arena();
        let mut e = standing(EnemyKind::Pecker, 246.0, 64.0, false);
        for _ in 0..3 {
            step_walker(&mut e, &r, true);
        }
        assert_eq!(e.body.state, WalkState::Reposition);
    }

    #[test]
    fn repositioning_walker_waits_for_spawn_timer() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let player = player_at(200.0, 64.0, false, false);
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &[] };
        let mut lanes = LaneCycle::default();

        let mut e = standing(EnemyKind::Plodder, 250.0, 64.0, false);
        e.body.state = WalkState::Reposition;
        let mut t = 5;
        step_enemy(&mut e, &env, &mut t, &mut lanes);
        assert_eq!(e.body.state, WalkState::Reposition);

        t = 0;
        step_enemy(&mut e, &env, &mut t, &mut lanes);
        assert_eq!(e.body.state, WalkState::Jumping);
        assert_eq!(e.body.pos.map(|p| p.y), Some(0.0));
        assert_eq!(t, SPAWN_INTERVAL);
    }

    #[test]
    fn stunned_walker_stands_then_hops() {
        let r = arena();
        let mut e = standing(EnemyKind::Plodder, 100.0, 64.0, false);
        step_walker(&mut e, &r, true);
        e.stun_time = 3;
        let x = e.body.pos.map(|p| p.x);
        step_walker(&mut e, &r, true);
        step_walker(&mut e, &r, true);
        assert_eq!(e.body.pos.map(|p| p.x), x);
        let out = step_walker(&mut e, &r, true);
        assert!(out.jumped);
        assert!(e.body.yvel < 0.0);
    }

    #[test]
    fn stun_wearing_off_is_a_small_hop() {
        let r = arena();
        let mut e = standing(EnemyKind::Plodder, 100.0, 64.0, false);
        step_walker(&mut e, &r, true);
        e.stun_time = 1;
        let out = step_walker(&mut e, &r, true);
        assert!(out.jumped);
        assert_eq!(e.body.yvel, -1.0);
    }

    // ── Hits ──

    #[test]
    fn block_hit_stuns_then_grants_mercy() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let player = player_at(200.0, 64.0, false, false);
        let blocks = vec![TossedBlock::new(Pos::new(100.0, 56.0), false)];
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &blocks };
        let mut lanes = LaneCycle::default();
        let mut t = 10;

        let mut e = standing(EnemyKind::Plodder, 100.0, 64.0, false);
        let tick = step_enemy(&mut e, &env, &mut t, &mut lanes);
        assert_eq!(tick.hit, Some(HitResult::Stunned));
        assert_eq!(e.stun_time, STUN_TICKS);
        assert_eq!(e.body.mercy_time, HIT_MERCY_TICKS);

        let tick = step_enemy(&mut e, &env, &mut t, &mut lanes);
        assert_eq!(tick.hit, None);
        assert_eq!(e.body.mercy_time, HIT_MERCY_TICKS - 1);
    }

    #[test]
    fn crouching_sneaker_deflects_first_hit_only() {
        let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, false);
        e.lookout.crouch_time = 10;
        assert_eq!(on_hit(&mut e), HitResult::Deflected);
        assert!(e.lookout.damaged);
        assert_eq!(e.stun_time, 0);

        e.lookout.crouch_time = 10;
        assert_eq!(on_hit(&mut e), HitResult::Stunned);
        assert_eq!(e.stun_time, STUN_TICKS);
    }

    #[test]
    fn standing_sneaker_is_stunned() {
        let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, false);
        assert_eq!(on_hit(&mut e), HitResult::Stunned);
    }

    // ── Lookout ──

    #[test]
    fn sneaker_crouches_when_player_aims_at_it() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let player = player_at(200.0, 64.0, true, true);
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &[] };
        let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, false);
        assert!(update_lookout(&mut e, &env));
        assert_eq!(e.lookout.crouch_time, CROUCH_TICKS);
        // Stays down while the timer runs.
        assert!(update_lookout(&mut e, &env));
    }

    #[test]
    fn sneaker_ignores_unarmed_or_turned_away_player() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        for player in [player_at(200.0, 64.0, true, false), player_at(200.0, 64.0, false, true)] {
            let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &[] };
            let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, false);
            assert!(!update_lookout(&mut e, &env));
        }
    }

    #[test]
    fn sneaker_does_not_see_through_blocks() {
        let r = room(&[
            "%%%%%%    %%%%%%",
            "                ",
            "                ",
            "         %      ",
            "%%%%%%%%%%%%%%%%",
        ]);
        let ceiling = ceiling_of(&r);
        let player = player_at(200.0, 64.0, true, true);
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &[] };
        let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, false);
        assert!(!update_lookout(&mut e, &env));
    }

    #[test]
    fn sneaker_scans_once_per_column() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let unarmed = player_at(200.0, 64.0, true, false);
        let armed = player_at(200.0, 64.0, true, true);
        let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, false);

        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &unarmed, blocks: &[] };
        assert!(!update_lookout(&mut e, &env));
        // Same column: no rescan even though the player is now armed.
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &armed, blocks: &[] };
        assert!(!update_lookout(&mut e, &env));
        e.body.pos = Some(Pos::new(116.0, 64.0));
        assert!(update_lookout(&mut e, &env));
    }

    #[test]
    fn sneaker_ducks_incoming_block() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let player = player_at(20.0, 64.0, false, false);
        let blocks = vec![TossedBlock::new(Pos::new(60.0, 40.0), false)];
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &blocks };
        let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, true);
        assert!(update_lookout(&mut e, &env));
    }

    #[test]
    fn damaged_sneaker_never_crouches() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let player = player_at(200.0, 64.0, true, true);
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &[] };
        let mut e = standing(EnemyKind::Sneaker, 100.0, 64.0, false);
        e.lookout.damaged = true;
        assert!(!update_lookout(&mut e, &env));
    }

    // ── Flyers ──

    #[test]
    fn flyer_enters_from_the_far_side_and_pauses() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let player = player_at(200.0, 64.0, false, false);
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &[] };
        let mut lanes = LaneCycle::default();
        let mut t = 0;

        let mut e = spawn_enemy(EnemyKind::Burger, true, &env, &mut t, &mut lanes);
        assert_eq!(e.body.pos.map(|p| p.x), Some(252.0));
        assert_eq!(e.stun_time, FLYER_ENTRY_PAUSE);
        assert_eq!(t, 0);

        for _ in 0..FLYER_ENTRY_PAUSE {
            step_enemy(&mut e, &env, &mut t, &mut lanes);
        }
        assert_eq!(e.body.pos.map(|p| p.x), Some(252.0));
        step_enemy(&mut e, &env, &mut t, &mut lanes);
        assert_eq!(e.body.pos.map(|p| p.x), Some(249.0));
    }

    #[test]
    fn flyer_wraps_to_a_new_lane() {
        let mut lanes = LaneCycle::default();
        let mut e = standing(EnemyKind::Spinner, 0.5, 50.0, true);
        step_flyer(&mut e, &mut lanes);
        let p = e.body.pos.unwrap_or_default();
        assert_eq!(p.x, 4.0);
        assert!(!e.body.facing_left);
        assert_eq!(p.y, LaneCycle::lane_y(13));
    }

    #[test]
    fn walker_spawn_uses_ceiling_and_delays_next_spawn() {
        let r = arena();
        let ceiling = ceiling_of(&r);
        let player = player_at(200.0, 64.0, false, false);
        let env = Surroundings { lookup: &r, ceiling: &ceiling, player: &player, blocks: &[] };
        let mut lanes = LaneCycle::default();
        let mut t = SPAWN_INTERVAL;
        let e = spawn_enemy(EnemyKind::Plodder, false, &env, &mut t, &mut lanes);
        assert_eq!(e.body.pos, Some(Pos::new(128.0, 0.0)));
        assert_eq!(t, 2 * SPAWN_INTERVAL);
    }
}
