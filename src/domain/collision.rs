/// Four-corner collision against the metatile grid.
///
/// An actor is resolved against the 2x2 block of 16 px cells straddling
/// its center. The block is always the one around the nominal 16x16 cell
/// containing the center, whatever the actor's half-extents are.
///
/// Corner bits of the sampled block:
///
/// ```text
///   1 2
///   4 8
/// ```
///
/// Resolution is split in two:
///   1. `sample_corners`: find the block, classify its cells as solid.
///   2. `resolve_mask`: pure arithmetic on the classified mask.
///
/// Both are pure; `collide` runs them back to back.

use super::tile::Metatile;

/// Edge length of a metatile in pixels.
pub const CELL: f32 = 16.0;

/// Read access to a tile grid.
///
/// Columns wrap around the grid; rows outside it read as
/// `Metatile::EMPTY`.
pub trait TileLookup {
    fn cell(&self, x: i32, y: i32) -> Metatile;
    fn rows(&self) -> usize;
}

/// Outcome of a collision test.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Collision {
    NoCollision,
    /// Displacement that moves the actor's center out of solid cells.
    Push { dx: f32, dy: f32 },
}

impl Collision {
    #[inline]
    pub fn push(self) -> Option<(f32, f32)> {
        match self {
            Collision::NoCollision => None,
            Collision::Push { dx, dy } => Some((dx, dy)),
        }
    }
}

/// Solid cells of the sampled 2x2 block.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct CornerMask(pub u8);

impl CornerMask {
    pub const TOP_LEFT: u8 = 0x01;
    pub const TOP_RIGHT: u8 = 0x02;
    pub const BOTTOM_LEFT: u8 = 0x04;
    pub const BOTTOM_RIGHT: u8 = 0x08;

    pub const LEFT_COLUMN: u8 = 0x05;
    pub const RIGHT_COLUMN: u8 = 0x0A;
    pub const TOP_ROW: u8 = 0x03;
    pub const BOTTOM_ROW: u8 = 0x0C;
    pub const ALL: u8 = 0x0F;

    /// Build from classified cells in reading order:
    /// top-left, top-right, bottom-left, bottom-right.
    pub fn from_corners(solid: [bool; 4]) -> Self {
        let corners = [Self::TOP_LEFT, Self::TOP_RIGHT, Self::BOTTOM_LEFT, Self::BOTTOM_RIGHT];
        let bits = solid
            .iter()
            .zip(corners)
            .fold(0u8, |acc, (&s, bit)| if s { acc | bit } else { acc });
        CornerMask(bits)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    fn has_all(bits: u8, want: u8) -> bool {
        bits & want == want
    }
}

/// Classified neighborhood plus the center's offset from the block's
/// shared corner, each roughly in `[-8, 8)`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CornerSample {
    pub mask: CornerMask,
    pub dx: f32,
    pub dy: f32,
}

/// Sample and classify the 2x2 block around `(cx, cy)`.
///
/// A ladder in the bottom row counts as solid only when
/// `ladders_below_solid` is set and the center is above the block's
/// horizontal midline. Samples with a negative column or row are empty;
/// rows past the grid are clamped to its last row.
pub fn sample_corners<L: TileLookup + ?Sized>(
    lookup: &L,
    cx: f32,
    cy: f32,
    ladders_below_solid: bool,
) -> CornerSample {
    let tile_x = ((cx - CELL / 2.0) / CELL).floor() as i32;
    let tile_y = ((cy - CELL / 2.0) / CELL).floor() as i32;
    let dx = cx - (tile_x + 1) as f32 * CELL;
    let dy = cy - (tile_y + 1) as f32 * CELL;

    // A ladder is a floor only when approached from above.
    let ladders_below_solid = ladders_below_solid && dy < 0.0;

    let last_row = lookup.rows() as i32 - 1;
    let mut solid = [false; 4];
    for (i, (ox, oy)) in [(0, 0), (1, 0), (0, 1), (1, 1)].into_iter().enumerate() {
        let (x, y) = (tile_x + ox, tile_y + oy);
        if x < 0 || y < 0 {
            continue;
        }
        let tile = lookup.cell(x, y.min(last_row));
        solid[i] = tile.is_solid() || (oy == 1 && ladders_below_solid && tile.is_ladder());
    }

    CornerSample { mask: CornerMask::from_corners(solid), dx, dy }
}

/// Turn a classified block into a pushout.
///
/// `(dx, dy)` is the center's offset from the block's shared corner and
/// `(rx, ry)` the actor's half-extents.
pub fn resolve_mask(
    mask: CornerMask,
    dx: f32,
    dy: f32,
    rx: f32,
    ry: f32,
    diagonal_corner_push: bool,
) -> Collision {
    if mask.is_empty() {
        return Collision::NoCollision;
    }
    let mut blks = mask.0;

    // Buried: leave through the nearest of the four block edges.
    if blks == CornerMask::ALL {
        let (px, py) = if dx < dy {
            if dx < -dy { (-CELL, 0.0) } else { (0.0, CELL) }
        } else if dx < -dy {
            (0.0, -CELL)
        } else {
            (CELL, 0.0)
        };
        return Collision::Push { dx: px, dy: py };
    }

    // Quadrant holding the center:
    //   0 1
    //   2 3
    let inside = (if dx >= 0.0 { 1 } else { 0 }) | (if dy >= 0.0 { 2 } else { 0 });
    let embedded = blks & (1 << inside) != 0;

    // With the center in an empty cell, cells on the far side of a block
    // line the bounding box does not cross cannot be touched. Fold the
    // near row/column over the far one so only the contour inside the box
    // remains.
    if !embedded {
        if dx <= -rx {
            blks &= CornerMask::LEFT_COLUMN;
            blks |= blks << 1;
        } else if dx >= rx {
            blks &= CornerMask::RIGHT_COLUMN;
            blks |= blks >> 1;
        }
        if dy <= -ry {
            blks &= CornerMask::TOP_ROW;
            blks |= blks << 2;
        } else if dy >= ry {
            blks &= CornerMask::BOTTOM_ROW;
            blks |= blks >> 2;
        }
        if blks == 0 {
            return Collision::NoCollision;
        }
    }

    // Only the cell diagonally opposite the center is solid.
    if blks == 8 >> inside {
        if diagonal_corner_push {
            blks = CornerMask::ALL ^ (1 << inside);
        } else if rx - dx.abs() <= ry - dy.abs() {
            // side of the cell is closer
            blks |= 1 << (inside ^ 1);
        } else {
            // top or bottom is closer
            blks |= 1 << (inside ^ 2);
        }
    }

    // Single corners and checkerboards: fill the corner across the
    // diagonal so an edge pair exists.
    match blks {
        1 | 8 | 9 => blks |= if dx > dy { 4 } else { 2 },
        2 | 4 | 6 => blks |= if dx > -dy { 1 } else { 8 },
        _ => {}
    }
    debug_assert!(
        !matches!(blks, 0 | 1 | 2 | 4 | 6 | 8 | 9 | 15),
        "corner mask {blks:#x} left unresolved (dx={dx}, dy={dy})"
    );

    // 3, 7, B: push down   5, 7, D: push right
    // A, B, E: push left   C, D, E: push up
    let mut push_x = 0.0;
    let mut push_y = 0.0;
    if CornerMask::has_all(blks, CornerMask::LEFT_COLUMN) {
        push_x = rx - dx;
    } else if CornerMask::has_all(blks, CornerMask::RIGHT_COLUMN) {
        push_x = -rx - dx;
    }
    if CornerMask::has_all(blks, CornerMask::TOP_ROW) {
        push_y = ry - dy;
    } else if CornerMask::has_all(blks, CornerMask::BOTTOM_ROW) {
        push_y = -ry - dy;
    }
    debug_assert!(push_x != 0.0 || push_y != 0.0, "zero push for mask {blks:#x}");

    Collision::Push { dx: push_x, dy: push_y }
}

/// Resolve an actor centered at `(cx, cy)` with half-extents `(rx, ry)`
/// against the grid.
pub fn collide<L: TileLookup + ?Sized>(
    lookup: &L,
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    ladders_below_solid: bool,
    diagonal_corner_push: bool,
) -> Collision {
    let sample = sample_corners(lookup, cx, cy, ladders_below_solid);
    resolve_mask(sample.mask, sample.dx, sample.dy, rx, ry, diagonal_corner_push)
}
