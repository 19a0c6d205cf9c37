/// Metatile plane: the room's tile grid plus its dirty mask.
///
/// The grid is 32 columns wide, stored as two banks of 16 columns, and
/// wraps horizontally: column `x` and column `x + 32` are the same cell.
/// Every write marks its cell dirty, and sprites mark the tiles they
/// cover with `mark_dirty_rect`; `redraw_dirty` then repaints exactly
/// the dirty tiles through a `TileCanvas` and clears the mask.
///
/// ## Frame order
///   1. `redraw_dirty`         → repaints tiles, returns last frame's runs
///   2. draw sprites           → collect their pixel rects
///   3. `mark_dirty_rects`     → tiles under sprites are dirty again
///   4. `dirty_runs`           → this frame's runs
///   5. `union_old_new`        → what changed on screen
///   6. `runs_to_rects`        → present those rects

use crate::domain::collision::TileLookup;
use crate::domain::geometry::{ceil_div, PixelRect};
use crate::domain::tile::Metatile;

use super::runs::{bools_to_runs, DirtyRuns};

pub const BANK_COLUMNS: usize = 16;
pub const PLANE_COLUMNS: usize = 2 * BANK_COLUMNS;
pub const DEFAULT_ROWS: usize = 12;
pub const TILE_SIZE: i32 = 16;

/// Destination for tile redraws.
///
/// The sheet holds metatiles left to right, top to bottom; tile `t` sits
/// at column `t % per_row`, row `t / per_row` where
/// `per_row = sheet_width / tile_width`.
pub trait TileCanvas {
    fn sheet_width(&self) -> u32;
    /// Copy `src` from the sheet to `(dst_x, dst_y)` on the canvas.
    fn blit(&mut self, dst_x: i32, dst_y: i32, src: PixelRect);
}

#[derive(Clone, Debug)]
pub struct MetatilePlane {
    banks: [Vec<[u8; BANK_COLUMNS]>; 2],
    dirty: Vec<[bool; PLANE_COLUMNS]>,
    tile_w: i32,
    tile_h: i32,
}

impl MetatilePlane {
    /// Empty plane of `rows` rows, everything dirty.
    pub fn new(rows: usize) -> Self {
        MetatilePlane {
            banks: [vec![[0; BANK_COLUMNS]; rows], vec![[0; BANK_COLUMNS]; rows]],
            dirty: vec![[true; PLANE_COLUMNS]; rows],
            tile_w: TILE_SIZE,
            tile_h: TILE_SIZE,
        }
    }

    pub fn rows(&self) -> usize {
        self.dirty.len()
    }

    pub fn tile_size(&self) -> (i32, i32) {
        (self.tile_w, self.tile_h)
    }

    // ── Cells ──

    #[inline]
    fn locate(x: i32) -> (usize, usize) {
        let x = x.rem_euclid(PLANE_COLUMNS as i32) as usize;
        (x / BANK_COLUMNS, x % BANK_COLUMNS)
    }

    #[inline]
    fn row_index(&self, y: i32) -> Option<usize> {
        usize::try_from(y).ok().filter(|&y| y < self.rows())
    }

    /// Tile at `(x, y)`; rows outside the plane read as empty.
    pub fn get_cell(&self, x: i32, y: i32) -> Metatile {
        let Some(y) = self.row_index(y) else {
            return Metatile::EMPTY;
        };
        let (bank, col) = Self::locate(x);
        Metatile(self.banks[bank][y][col])
    }

    /// Store a tile and mark the cell dirty, even if the value is unchanged.
    /// Writes to rows outside the plane are ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, tile: impl Into<Metatile>) {
        let Some(y) = self.row_index(y) else {
            return;
        };
        let (bank, col) = Self::locate(x);
        self.banks[bank][y][col] = tile.into().index();
        self.dirty[y][bank * BANK_COLUMNS + col] = true;
    }

    /// Tiles `x_min..x_max` of row `y`.
    pub fn get_row(&self, x_min: i32, x_max: i32, y: i32) -> Vec<Metatile> {
        (x_min..x_max).map(|x| self.get_cell(x, y)).collect()
    }

    /// Write `tiles` rightward from `(x, y)`, wrapping past column 31.
    pub fn set_row<T: Into<Metatile>>(&mut self, x: i32, y: i32, tiles: impl IntoIterator<Item = T>) {
        for (i, tile) in tiles.into_iter().enumerate() {
            self.set_cell(x + i as i32, y, tile);
        }
    }

    /// Write `tiles` downward from `(x, y)`.
    pub fn set_col<T: Into<Metatile>>(&mut self, x: i32, y: i32, tiles: impl IntoIterator<Item = T>) {
        for (i, tile) in tiles.into_iter().enumerate() {
            self.set_cell(x, y + i as i32, tile);
        }
    }

    // ── Dirty mask ──

    pub fn clear_dirty(&mut self, value: bool) {
        for row in &mut self.dirty {
            row.fill(value);
        }
    }

    #[cfg(test)]
    pub fn is_dirty(&self, x: i32, y: i32) -> bool {
        let Some(y) = self.row_index(y) else {
            return false;
        };
        self.dirty[y][x.rem_euclid(PLANE_COLUMNS as i32) as usize]
    }

    /// Mark every tile touched by the pixel rectangle.
    ///
    /// The rectangle is widened to tile boundaries, clamped vertically
    /// to the plane, and split in two where it wraps past column 31.
    /// A rectangle 32 or more tiles wide marks whole rows.
    pub fn mark_dirty_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (tw, th) = (self.tile_w, self.tile_h);
        let cols = PLANE_COLUMNS as i32;

        let mut w = ceil_div(w + x.rem_euclid(tw), tw);
        let mut x = x.div_euclid(tw).rem_euclid(cols);
        if w >= cols {
            x = 0;
            w = cols;
        }

        let mut h = ceil_div(h + y.rem_euclid(th), th);
        let mut y = y.div_euclid(th);
        if y < 0 {
            h += y;
            y = 0;
        }
        h = h.min(self.rows() as i32 - y);
        if h <= 0 {
            return;
        }

        let wrapped = (x + w - cols).max(0) as usize;
        let (x, w) = (x as usize, (w as usize) - wrapped);
        for row in &mut self.dirty[y as usize..(y + h) as usize] {
            row[..wrapped].fill(true);
            row[x..x + w].fill(true);
        }
    }

    /// Mark a batch of screen rectangles, converting from screen to
    /// plane coordinates with the scroll offset.
    pub fn mark_dirty_rects(&mut self, rects: &[PixelRect], x_scroll: i32, y_scroll: i32) {
        for r in rects {
            self.mark_dirty_rect(r.x + x_scroll, r.y + y_scroll, r.w, r.h);
        }
    }

    /// Current mask as runs, without clearing it.
    pub fn dirty_runs(&self) -> DirtyRuns {
        self.dirty.iter().map(|row| bools_to_runs(row)).collect()
    }

    /// Repaint every dirty tile, then clear the mask.
    ///
    /// Returns the runs that were dirty before clearing, so the caller
    /// can union them with the next frame's sprite damage.
    pub fn redraw_dirty<C: TileCanvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        x_scroll: i32,
        y_scroll: i32,
    ) -> DirtyRuns {
        let (tw, th) = (self.tile_w, self.tile_h);
        let per_row = (canvas.sheet_width() as i32 / tw).max(1);
        let span = PLANE_COLUMNS as i32 * tw;

        for (yt, row) in self.dirty.iter().enumerate() {
            let dst_y = yt as i32 * th - y_scroll;
            for (xt, _) in row.iter().enumerate().filter(|&(_, &d)| d) {
                let tile = self.banks[xt / BANK_COLUMNS][yt][xt % BANK_COLUMNS] as i32;
                let src = PixelRect::new(tile % per_row * tw, tile / per_row * th, tw, th);
                let dst_x = ((xt as i32 + 1) * tw - x_scroll).rem_euclid(span) - tw;
                canvas.blit(dst_x, dst_y, src);
            }
        }

        let runs = self.dirty_runs();
        self.clear_dirty(false);
        runs
    }
}

impl Default for MetatilePlane {
    fn default() -> Self {
        MetatilePlane::new(DEFAULT_ROWS)
    }
}

impl TileLookup for MetatilePlane {
    fn cell(&self, x: i32, y: i32) -> Metatile {
        self.get_cell(x, y)
    }

    fn rows(&self) -> usize {
        MetatilePlane::rows(self)
    }
}
