/// Small geometry helpers shared by the collider, the plane and the AI.

/// Axis-aligned rectangle in screen pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        PixelRect { x, y, w, h }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Intersection with `(0, 0, width, height)`. Fully clipped
    /// rectangles come back with zero width or height at the clamped origin.
    pub fn clip(&self, width: i32, height: i32) -> PixelRect {
        let x0 = self.x.clamp(0, width);
        let y0 = self.y.clamp(0, height);
        let x1 = self.right().clamp(0, width);
        let y1 = self.bottom().clamp(0, height);
        PixelRect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }
}

/// Integer division rounding toward positive infinity.
#[inline]
pub fn ceil_div(n: i32, d: i32) -> i32 {
    -((-n).div_euclid(d))
}

/// Cells crossed by the segment (x1, y1)-(x2, y2), in grid units.
///
/// Cells are emitted column by column from left to right; within a column
/// every row the segment passes through is emitted before moving on, so
/// consecutive cells always share an edge. The walk stops on the end row
/// once it reaches the end column.
pub fn raycast_cells(x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<(i32, i32)> {
    let (mut x1, mut y1, x2, y2) = if x1 > x2 { (x2, y2, x1, y1) } else { (x1, y1, x2, y2) };

    let mut xt = x1.floor() as i32;
    let mut yt = y1.floor() as i32;
    let y2t = y2.floor() as i32;
    let mut cells = Vec::new();

    if x1 == x2 {
        let step = if y2t >= yt { 1 } else { -1 };
        cells.push((xt, yt));
        while yt != y2t {
            yt += step;
            cells.push((xt, yt));
        }
        return cells;
    }

    let slope = (y2 - y1) / (x2 - x1);
    while x1 <= x2 {
        cells.push((xt, yt));
        let next_x = (xt + 1) as f32;
        y1 += (next_x - x1) * slope;
        let target = if next_x > x2 { y2t } else { y1.floor() as i32 };
        while yt < target {
            yt += 1;
            cells.push((xt, yt));
        }
        while yt > target {
            yt -= 1;
            cells.push((xt, yt));
        }
        x1 = next_x;
        xt += 1;
    }
    cells
}
