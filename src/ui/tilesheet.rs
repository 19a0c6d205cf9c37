/// Metatile sheet: one 16×16 indexed-color image per metatile index,
/// drawn procedurally at startup.
///
/// Tiles are laid out 16 per row, index `t` at column `t % 16`, row
/// `t / 16`, which is the layout `MetatilePlane::redraw_dirty` assumes
/// for a 256-pixel-wide sheet.
///
/// Inks are palette indices. The terminal presenter folds several pixels
/// into one half-cell by taking the highest ink, so inks are numbered
/// from background to foreground.

use crate::domain::tile::{
    Metatile, CONNECT_DOWN, CONNECT_LEFT, CONNECT_RIGHT, CONNECT_UP, MT_DOOR,
    MT_DOOR_UNFINISHED_BOTTOM, MT_ELEVATOR_DOOR, MT_ELEVATOR_SIGNAL, MT_LADDER, MT_OPEN_DOOR,
};

// ── Inks ──

pub const INK_BG: u8 = 0;
pub const INK_LADDER: u8 = 1;
pub const INK_SIGNAL: u8 = 2;
pub const INK_DOOR_DARK: u8 = 3;
pub const INK_DOOR: u8 = 4;
pub const INK_BLOCK: u8 = 5;
pub const INK_BLOCK_EDGE: u8 = 6;
pub const INK_POOF: u8 = 7;
pub const INK_TOSSED: u8 = 8;
pub const INK_PLODDER: u8 = 9;
pub const INK_PECKER: u8 = 10;
pub const INK_SNEAKER: u8 = 11;
pub const INK_SPINNER: u8 = 12;
pub const INK_BURGER: u8 = 13;
pub const INK_STUNNED: u8 = 14;
pub const INK_PLAYER: u8 = 15;
pub const INK_COUNT: usize = 16;

// ── Layout ──

pub const TILE_PX: i32 = 16;
pub const TILES_PER_ROW: i32 = 16;
pub const SHEET_ROWS: i32 = 3;
pub const SHEET_WIDTH: i32 = TILE_PX * TILES_PER_ROW;
pub const SHEET_HEIGHT: i32 = TILE_PX * SHEET_ROWS;

#[derive(Clone, Debug)]
pub struct TileSheet {
    pixels: Vec<u8>,
}

impl TileSheet {
    pub fn generate() -> Self {
        let mut sheet = TileSheet {
            pixels: vec![INK_BG; (SHEET_WIDTH * SHEET_HEIGHT) as usize],
        };
        for t in 0..(TILES_PER_ROW * SHEET_ROWS) as u8 {
            sheet.paint(t);
        }
        sheet
    }

    pub fn width(&self) -> i32 {
        SHEET_WIDTH
    }

    #[cfg(test)]
    pub fn height(&self) -> i32 {
        SHEET_HEIGHT
    }

    /// Ink at a sheet pixel; outside the sheet reads as background.
    pub fn pixel(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= SHEET_WIDTH || y >= SHEET_HEIGHT {
            return INK_BG;
        }
        self.pixels[(y * SHEET_WIDTH + x) as usize]
    }

    /// Ink at pixel `(x, y)` of tile `t`.
    #[cfg(test)]
    pub fn tile_pixel(&self, t: u8, x: i32, y: i32) -> u8 {
        let t = t as i32;
        self.pixel(t % TILES_PER_ROW * TILE_PX + x, t / TILES_PER_ROW * TILE_PX + y)
    }

    fn paint(&mut self, t: u8) {
        let tile = Metatile(t);
        let rail = |x: i32| (2..4).contains(&x) || (12..14).contains(&x);

        for y in 0..TILE_PX {
            for x in 0..TILE_PX {
                let ink = match t {
                    MT_LADDER => {
                        if rail(x) || (y % 8 == 3 && (4..12).contains(&x)) { INK_LADDER } else { INK_BG }
                    }
                    MT_DOOR => door_top(x, y, INK_DOOR),
                    t if t == MT_DOOR + 1 => door_bottom(x, INK_DOOR),
                    MT_OPEN_DOOR => door_top(x, y, INK_DOOR_DARK),
                    t if t == MT_OPEN_DOOR + 1 || t == MT_DOOR_UNFINISHED_BOTTOM => {
                        door_bottom(x, INK_DOOR_DARK)
                    }
                    MT_ELEVATOR_SIGNAL => {
                        if (6..10).contains(&x) && (6..10).contains(&y) { INK_SIGNAL } else { INK_BG }
                    }
                    MT_ELEVATOR_DOOR => {
                        if x < 2 || x >= 14 { INK_DOOR } else { INK_DOOR_DARK }
                    }
                    _ if tile.is_block() => block(tile.connections(), x, y),
                    _ => INK_BG,
                };
                self.set_tile_pixel(t, x, y, ink);
            }
        }
    }

    fn set_tile_pixel(&mut self, t: u8, x: i32, y: i32, ink: u8) {
        let t = t as i32;
        let px = t % TILES_PER_ROW * TILE_PX + x;
        let py = t / TILES_PER_ROW * TILE_PX + y;
        self.pixels[(py * SHEET_WIDTH + px) as usize] = ink;
    }
}

/// Door frame with an arched lintel; `fill` colors the opening.
fn door_top(x: i32, y: i32, fill: u8) -> u8 {
    if y < 2 || !(2..14).contains(&x) {
        INK_BG
    } else if y < 4 || x < 4 || x >= 12 {
        INK_DOOR
    } else {
        fill
    }
}

fn door_bottom(x: i32, fill: u8) -> u8 {
    if !(2..14).contains(&x) {
        INK_BG
    } else if x < 4 || x >= 12 {
        INK_DOOR
    } else {
        fill
    }
}

/// Solid block, rimmed on every side that does not join another block.
fn block(connections: u8, x: i32, y: i32) -> u8 {
    let rim = (y < 2 && connections & CONNECT_UP == 0)
        || (y >= 14 && connections & CONNECT_DOWN == 0)
        || (x < 2 && connections & CONNECT_LEFT == 0)
        || (x >= 14 && connections & CONNECT_RIGHT == 0);
    if rim { INK_BLOCK_EDGE } else { INK_BLOCK }
}
