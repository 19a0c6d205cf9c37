/// Sprite drawing: actors, tossed blocks, and poofs over the tile layer.
///
/// Every sprite is a few solid rectangles. The rectangles actually drawn
/// are returned so the plane can mark the tiles under them dirty.

use crate::domain::entity::{Enemy, EnemyKind, Player, Poof, TossedBlock, WalkState};
use crate::domain::geometry::PixelRect;
use crate::sim::world::WorldState;

use super::framebuffer::FrameBuffer;
use super::tilesheet::{
    INK_BURGER, INK_PECKER, INK_PLAYER, INK_PLODDER, INK_POOF, INK_SNEAKER, INK_SPINNER,
    INK_STUNNED, INK_TOSSED,
};

/// Draw everything that moves, back to front.
pub fn draw_sprites(world: &WorldState, fb: &mut FrameBuffer) -> Vec<PixelRect> {
    let mut rects = Vec::new();
    for poof in &world.poofs {
        draw_poof(poof, fb, &mut rects);
    }
    for enemy in &world.enemies {
        draw_enemy(enemy, fb, &mut rects);
    }
    draw_player(&world.player, fb, &mut rects);
    for block in &world.player_projectiles {
        draw_block(block, fb, &mut rects);
    }
    rects
}

fn push_fill(fb: &mut FrameBuffer, rect: PixelRect, ink: u8, rects: &mut Vec<PixelRect>) {
    let drawn = fb.fill_rect(rect, ink);
    if !drawn.is_empty() {
        rects.push(drawn);
    }
}

fn draw_player(player: &Player, fb: &mut FrameBuffer, rects: &mut Vec<PixelRect>) {
    let body = &player.body;
    let Some(pos) = body.pos else { return };
    let (x, y) = (pos.x.floor() as i32, pos.y.floor() as i32);

    // Blinks while mercy is running.
    if body.mercy_time & 6 != 6 {
        let height = match body.state {
            WalkState::Hanging | WalkState::EnteringDoor => 18,
            _ => 20,
        };
        push_fill(fb, PixelRect::new(x - 4, y - height, 8, height), INK_PLAYER, rects);
    }
    if body.carrying_block {
        push_fill(fb, PixelRect::new(x - 4, y - 32, 8, 8), INK_TOSSED, rects);
    }
}

fn enemy_ink(enemy: &Enemy) -> u8 {
    if enemy.is_stunned() {
        return INK_STUNNED;
    }
    match enemy.kind {
        EnemyKind::Plodder => INK_PLODDER,
        EnemyKind::Pecker => INK_PECKER,
        EnemyKind::Sneaker => INK_SNEAKER,
        EnemyKind::Spinner => INK_SPINNER,
        EnemyKind::Burger => INK_BURGER,
    }
}

fn draw_enemy(enemy: &Enemy, fb: &mut FrameBuffer, rects: &mut Vec<PixelRect>) {
    if enemy.body.state == WalkState::Reposition { return; }
    let Some(pos) = enemy.body.pos else { return };
    let stats = enemy.kind.stats();
    let (hw, hh) = (stats.half_width as i32, stats.half_height as i32);
    let height = if enemy.is_crouching() { hh } else { 2 * hh };
    let (x, y) = (pos.x.floor() as i32, pos.y.floor() as i32);
    push_fill(fb, PixelRect::new(x - hw, y - height, 2 * hw, height), enemy_ink(enemy), rects);
}

fn draw_block(block: &TossedBlock, fb: &mut FrameBuffer, rects: &mut Vec<PixelRect>) {
    let Some(pos) = block.pos else { return };
    let (x, y) = (pos.x.floor() as i32, pos.y.floor() as i32);
    push_fill(fb, PixelRect::new(x - 4, y - 4, 8, 8), INK_TOSSED, rects);
}

/// Four puffs drifting apart from where the enemy stood.
fn draw_poof(poof: &Poof, fb: &mut FrameBuffer, rects: &mut Vec<PixelRect>) {
    let Some(pos) = poof.pos else { return };
    let (cx, cy) = (pos.x.floor() as i32, pos.y.floor() as i32 - 8);
    let s = poof.spread();
    for (dx, dy) in [(-s, -s), (s, -s), (-s, s), (s, s)] {
        push_fill(fb, PixelRect::new(cx + dx - 2, cy + dy - 2, 4, 4), INK_POOF, rects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Pos;
    use crate::ui::tilesheet::{TileSheet, INK_BG};

    fn screen() -> FrameBuffer {
        FrameBuffer::new(256, 176, TileSheet::generate())
    }

    fn world_with_player_at(x: f32, y: f32) -> WorldState {
        let mut world = WorldState::new(5);
        world.player.body.pos = Some(Pos::new(x, y));
        world
    }

    #[test]
    fn player_is_drawn_above_the_feet() {
        let world = world_with_player_at(100.0, 100.0);
        let mut fb = screen();
        let rects = draw_sprites(&world, &mut fb);
        assert_eq!(rects, vec![PixelRect::new(96, 80, 8, 20)]);
        assert_eq!(fb.pixel(100, 99), INK_PLAYER);
        assert_eq!(fb.pixel(100, 100), INK_BG);
    }

    #[test]
    fn player_blinks_during_mercy() {
        let mut world = world_with_player_at(100.0, 100.0);
        world.player.body.mercy_time = 6;
        let mut fb = screen();
        assert!(draw_sprites(&world, &mut fb).is_empty());
        world.player.body.mercy_time = 8;
        assert_eq!(draw_sprites(&world, &mut fb).len(), 1);
    }

    #[test]
    fn carried_block_rides_overhead() {
        let mut world = world_with_player_at(100.0, 100.0);
        world.player.body.carrying_block = true;
        let mut fb = screen();
        let rects = draw_sprites(&world, &mut fb);
        assert!(rects.contains(&PixelRect::new(96, 68, 8, 8)));
        assert_eq!(fb.pixel(100, 70), INK_TOSSED);
    }

    #[test]
    fn repositioning_and_dead_enemies_are_hidden() {
        let mut world = WorldState::new(5);
        world.player.body.pos = None;
        let mut gone = Enemy::new(EnemyKind::Plodder, Pos::new(50.0, 50.0));
        gone.body.state = WalkState::Reposition;
        let mut dead = Enemy::new(EnemyKind::Plodder, Pos::new(80.0, 50.0));
        dead.body.pos = None;
        world.enemies = vec![gone, dead];
        let mut fb = screen();
        assert!(draw_sprites(&world, &mut fb).is_empty());
    }

    #[test]
    fn stunned_enemy_changes_color_and_crouch_shrinks() {
        let mut world = WorldState::new(5);
        world.player.body.pos = None;
        let mut stunned = Enemy::new(EnemyKind::Pecker, Pos::new(50.0, 50.0));
        stunned.stun_time = 10;
        let mut crouched = Enemy::new(EnemyKind::Sneaker, Pos::new(150.0, 50.0));
        crouched.lookout.crouch_time = 5;
        world.enemies = vec![stunned, crouched];
        let mut fb = screen();
        let rects = draw_sprites(&world, &mut fb);
        assert_eq!(rects[0], PixelRect::new(43, 34, 14, 16));
        assert_eq!(fb.pixel(50, 40), INK_STUNNED);
        assert_eq!(rects[1], PixelRect::new(143, 43, 14, 7));
    }

    #[test]
    fn poof_spreads_four_puffs() {
        let mut world = WorldState::new(5);
        world.player.body.pos = None;
        world.poofs.push(Poof::new(Pos::new(100.0, 100.0)));
        let mut fb = screen();
        let rects = draw_sprites(&world, &mut fb);
        assert_eq!(rects.len(), 4);
        assert_eq!(rects[0], PixelRect::new(94, 86, 4, 4));
    }

    #[test]
    fn sprites_off_screen_are_not_reported() {
        let mut world = world_with_player_at(100.0, 100.0);
        world.player_projectiles.push(TossedBlock::new(Pos::new(300.0, 50.0), false));
        let mut fb = screen();
        assert_eq!(draw_sprites(&world, &mut fb).len(), 1);
    }
}
