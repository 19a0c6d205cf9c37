/// Indexed-color pixel surface the frame is composed on.
///
/// Tiles come in through `TileCanvas::blit` from the owned tile sheet;
/// sprites are drawn with `fill_rect`. Both clip to the surface.

use crate::domain::geometry::PixelRect;
use crate::sim::plane::TileCanvas;

use super::tilesheet::{TileSheet, INK_BG};

#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: i32,
    height: i32,
    pixels: Vec<u8>,
    sheet: TileSheet,
}

impl FrameBuffer {
    pub fn new(width: i32, height: i32, sheet: TileSheet) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        FrameBuffer {
            width,
            height,
            pixels: vec![INK_BG; (width * height) as usize],
            sheet,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[cfg(test)]
    pub fn pixel(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return INK_BG;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Fill `rect` with `ink` and return the part that landed on the
    /// surface.
    pub fn fill_rect(&mut self, rect: PixelRect, ink: u8) -> PixelRect {
        let r = rect.clip(self.width, self.height);
        for y in r.y..r.bottom() {
            let row = (y * self.width) as usize;
            self.pixels[row + r.x as usize..row + r.right() as usize].fill(ink);
        }
        r
    }

    /// Highest ink inside `rect`.
    pub fn max_ink(&self, rect: PixelRect) -> u8 {
        let r = rect.clip(self.width, self.height);
        let mut ink = INK_BG;
        for y in r.y..r.bottom() {
            let row = (y * self.width) as usize;
            if let Some(&m) = self.pixels[row + r.x as usize..row + r.right() as usize].iter().max() {
                ink = ink.max(m);
            }
        }
        ink
    }
}

impl TileCanvas for FrameBuffer {
    fn sheet_width(&self) -> u32 {
        self.sheet.width() as u32
    }

    fn blit(&mut self, dst_x: i32, dst_y: i32, src: PixelRect) {
        let dst = PixelRect::new(dst_x, dst_y, src.w, src.h).clip(self.width, self.height);
        for y in dst.y..dst.bottom() {
            for x in dst.x..dst.right() {
                let ink = self.sheet.pixel(src.x + x - dst_x, src.y + y - dst_y);
                self.pixels[(y * self.width + x) as usize] = ink;
            }
        }
    }
}
