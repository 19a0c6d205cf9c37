/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Player (door entry, walking, block make / toss, enemy contact)
///   2. Spawner (prune dead enemies, maybe spawn one)
///   3. Prune dead blocks and poofs, then fly the blocks
///   4. Enemies (move, take hits from blocks)
///   5. Poofs
///   6. Exit door opens once the roster is exhausted
///   7. Win / lose check
///
/// Every walking actor goes through `physics::walk`, and so through the
/// four-corner collider, exactly once per tick.

use tracing::{debug, info};

use crate::domain::ai::{self, HitResult, SpawnTick, Surroundings};
use crate::domain::entity::{Buttons, FrameInput, Poof, Pos, TossedBlock, WalkState, PLAYER_STATS};
use crate::domain::physics::{self, block_at};
use crate::domain::tile::MT_OPEN_DOOR;
use super::event::GameEvent;
use super::level::ROOM_COLUMNS;
use super::world::{Phase, WorldState};

/// Player x is kept within this band.
const PLAYER_MIN_X: f32 = 8.0;
const PLAYER_MAX_X: f32 = 248.0;
/// Falling past this line comes back in at the top.
const WRAP_Y: f32 = 192.0;
const HURT_MERCY_TICKS: u32 = 60;
/// Door animation ticks before the room counts as cleared.
const DOOR_ENTRY_TICKS: u32 = 20;
/// Tossed blocks leave the player this far above the feet.
const TOSS_HEIGHT: f32 = 28.0;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    if world.message_timer > 0 {
        world.message_timer -= 1;
        if world.message_timer == 0 { world.message.clear(); }
    }

    resolve_player(world, input, &mut events);
    let open_door = resolve_spawner(world, &mut events);

    world.player_projectiles.retain(|b| b.pos.is_some());
    world.poofs.retain(|p| p.pos.is_some());
    for block in &mut world.player_projectiles {
        block.advance();
    }
    resolve_enemies(world, &mut events);
    for poof in &mut world.poofs {
        poof.advance();
    }

    if open_door { open_exit(world, &mut events); }
    resolve_outcome(world, &mut events);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    let body = &mut world.player.body;
    let Some(pos) = body.pos else { return };

    // ── Door ──
    match body.state {
        WalkState::Walking if block_at(&world.plane, pos.x, pos.y - 8.0).is_open_door_bottom() => {
            body.state = WalkState::EnteringDoor;
            body.walking_frame = 0;
            return;
        }
        WalkState::EnteringDoor => {
            let off = (pos.x.floor() as i32).rem_euclid(16) - 8;
            let nudge = -(off.signum() as f32);
            body.pos = Some(Pos::new(pos.x + nudge, pos.y));
            body.walking_frame += 1;
            return;
        }
        _ => {}
    }

    // ── Walk ──
    let out = physics::walk(body, &PLAYER_STATS, &world.plane, input);
    if out.jumped {
        events.push(GameEvent::Jump);
    }

    // ── Blocks ──
    if input.pressed.any(Buttons::B) && matches!(body.state, WalkState::Walking | WalkState::Jumping) {
        if body.carrying_block {
            body.state = WalkState::Throwing;
            body.walking_frame = 0;
            body.carrying_block = false;
            if let Some(p) = body.pos {
                let from = Pos::new(p.x, p.y - TOSS_HEIGHT);
                world.player_projectiles.push(TossedBlock::new(from, body.facing_left));
            }
            events.push(GameEvent::ThrowBlock);
        } else if body.state == WalkState::Walking {
            body.carrying_block = true;
            events.push(GameEvent::MakeBlock);
        }
    }
    if body.state == WalkState::Throwing {
        body.walking_frame += 64;
        if body.walking_frame >= 512 {
            body.state = WalkState::Walking;
            body.walking_frame = 128;
        }
    }

    // ── Screen bounds ──
    let Some(mut pos) = body.pos else { return };
    pos.x = pos.x.clamp(PLAYER_MIN_X, PLAYER_MAX_X);
    if pos.y >= WRAP_Y {
        pos.y -= WRAP_Y;
    }
    body.pos = Some(pos);

    resolve_contacts(world, events);

    let body = &mut world.player.body;
    if body.mercy_time > 0 {
        body.mercy_time -= 1;
    }
}

/// Touching a stunned enemy destroys it; touching any other enemy hurts,
/// unless the player is still blinking from the last hurt.
fn resolve_contacts(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let Some(p) = world.player.body.pos else { return };
    let player = &mut world.player;

    for enemy in world.enemies.iter_mut() {
        if enemy.body.state == WalkState::Reposition { continue; }
        let Some(e) = enemy.body.pos else { continue };
        let stats = enemy.kind.stats();
        let dx = e.x - p.x;
        let dy = (e.y - stats.half_height) - (p.y - PLAYER_STATS.half_height);
        if dx.abs() >= stats.half_width + PLAYER_STATS.half_width
            || dy.abs() >= stats.half_height + PLAYER_STATS.half_height
        {
            continue;
        }

        let destroyed = if enemy.is_stunned() {
            world.score += 1;
            debug!(kind = enemy.kind.name(), score = world.score, "enemy_destroyed");
            events.push(GameEvent::EnemyDestroyed { kind: enemy.kind });
            true
        } else if player.body.mercy_time == 0 {
            player.health = player.health.saturating_sub(1);
            player.body.mercy_time = HURT_MERCY_TICKS;
            debug!(kind = enemy.kind.name(), health = player.health, "player_hurt");
            events.push(GameEvent::PlayerHurt { health: player.health });
            true
        } else {
            false
        };

        if destroyed {
            player.body.yvel = player.body.yvel.min(-2.0);
            world.poofs.push(Poof::new(e));
            enemy.body.pos = None;
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Spawner
// ══════════════════════════════════════════════════════════════

/// Returns true when the roster has just run out.
fn resolve_spawner(world: &mut WorldState, events: &mut Vec<GameEvent>) -> bool {
    world.enemies.retain(|e| e.body.is_alive());
    let Some(spawner) = world.spawner.as_mut() else { return false };

    match spawner.tick(world.enemies.len(), &mut world.spawn_time) {
        SpawnTick::Wait => false,
        SpawnTick::Exhausted => {
            world.spawner = None;
            true
        }
        SpawnTick::Spawn { kind, facing_left } => {
            let ceiling = world.plane.get_row(0, ROOM_COLUMNS as i32, 0);
            let env = Surroundings {
                lookup: &world.plane,
                ceiling: &ceiling,
                player: &world.player.body,
                blocks: &world.player_projectiles,
            };
            let enemy = ai::spawn_enemy(kind, facing_left, &env, &mut world.spawn_time, &mut world.lanes);
            world.enemies.push(enemy);
            events.push(GameEvent::EnemySpawned { kind });
            false
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let ceiling = world.plane.get_row(0, ROOM_COLUMNS as i32, 0);
    let env = Surroundings {
        lookup: &world.plane,
        ceiling: &ceiling,
        player: &world.player.body,
        blocks: &world.player_projectiles,
    };

    for enemy in world.enemies.iter_mut() {
        let tick = ai::step_enemy(enemy, &env, &mut world.spawn_time, &mut world.lanes);
        if tick.jumped {
            events.push(GameEvent::Jump);
        }
        match tick.hit {
            Some(HitResult::Stunned) => events.push(GameEvent::Knock { kind: enemy.kind }),
            Some(HitResult::Deflected) => events.push(GameEvent::SneakerDeflected),
            None => {}
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Exit door / outcome
// ══════════════════════════════════════════════════════════════

fn open_exit(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let Some((x, y)) = world.exit else { return };
    world.plane.set_col(x, y - 1, [MT_OPEN_DOOR, MT_OPEN_DOOR + 1]);
    world.set_message("The door is open!", 90);
    info!(room = %world.room_name, "door_opened");
    events.push(GameEvent::DoorOpened);
}

fn resolve_outcome(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let body = &world.player.body;
    if world.player.health == 0 {
        world.phase = Phase::GameOver;
        world.set_message("GAME OVER", 0);
        info!(room = %world.room_name, score = world.score, "game_over");
        events.push(GameEvent::PlayerDied);
    } else if body.state == WalkState::EnteringDoor && body.walking_frame > DOOR_ENTRY_TICKS {
        world.phase = Phase::RoomClear;
        info!(room = %world.room_name, score = world.score, "room_clear");
        events.push(GameEvent::RoomCleared);
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
