/// Presentation layer: dirty-rect frame composition plus a half-block
/// terminal presenter.
///
/// How a frame is built (`compose_frame`):
///   1. `redraw_dirty` repaints dirty tiles into the framebuffer and
///      returns last frame's runs
///   2. Sprites are drawn on top; their rects mark the tiles under them
///      dirty so next frame erases them
///   3. Old runs ∪ new runs → pixel rects that changed on screen
///
/// How it reaches the terminal (`present`):
///   - One terminal cell covers 4×8 pixels and is drawn as an upper half
///     block: foreground = top 4×4, background = bottom 4×4, each the
///     highest ink in its square
///   - Only cells inside the changed rects are examined, and of those
///     only cells whose inks differ from what is already on screen are
///     written
///   - All commands are batched with `queue!`, flushed once per frame

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use tracing::trace;

use crate::domain::geometry::{ceil_div, PixelRect};
use crate::sim::level::room_count;
use crate::sim::runs::{runs_to_rects, union_old_new};
use crate::sim::world::{Phase, WorldState, SCREEN_HEIGHT, SCREEN_WIDTH};

use super::framebuffer::FrameBuffer;
use super::sprites::draw_sprites;
use super::tilesheet::{TileSheet, INK_COUNT};

// ── Layout ──

const CELL_PX_W: i32 = 4;
const CELL_PX_H: i32 = 8;
const MAP_COLS: usize = (SCREEN_WIDTH / CELL_PX_W) as usize;
const MAP_ROWS: usize = (SCREEN_HEIGHT / CELL_PX_H) as usize;
const MAP_LEFT: u16 = 1;
const MAP_TOP: u16 = 1;
const HUD_LEFT: u16 = MAP_LEFT + MAP_COLS as u16 + 2;
const HUD_WIDTH: usize = 26;
/// Smallest terminal that fits the map and the HUD.
const MIN_TERM_W: u16 = HUD_LEFT + HUD_WIDTH as u16;
const MIN_TERM_H: u16 = MAP_TOP + MAP_ROWS as u16 + 1;

const HALF_BLOCK: char = '▀';

/// Explicit background for everything outside the map. Using the same
/// RGB for `Clear` and for every written cell keeps VTE terminals from
/// showing seams between rows.
const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

/// Ink → terminal color, indexed by the inks in `tilesheet`.
const PALETTE: [Color; INK_COUNT] = [
    Color::Rgb { r: 12, g: 12, b: 24 },     // background
    Color::Rgb { r: 170, g: 120, b: 60 },   // ladder
    Color::Rgb { r: 255, g: 80, b: 80 },    // elevator signal
    Color::Rgb { r: 30, g: 20, b: 10 },     // open doorway
    Color::Rgb { r: 150, g: 90, b: 40 },    // door
    Color::Rgb { r: 70, g: 110, b: 170 },   // block
    Color::Rgb { r: 140, g: 180, b: 230 },  // block rim
    Color::Rgb { r: 220, g: 220, b: 220 },  // poof
    Color::Rgb { r: 100, g: 200, b: 255 },  // tossed block
    Color::Rgb { r: 90, g: 200, b: 90 },    // plodder
    Color::Rgb { r: 230, g: 150, b: 40 },   // pecker
    Color::Rgb { r: 180, g: 90, b: 220 },   // sneaker
    Color::Rgb { r: 240, g: 90, b: 160 },   // spinner
    Color::Rgb { r: 230, g: 60, b: 50 },    // burger
    Color::Rgb { r: 255, g: 255, b: 120 },  // stunned
    Color::Rgb { r: 255, g: 255, b: 255 },  // player
];

const HUD_FG: Color = Color::Rgb { r: 200, g: 200, b: 210 };
const HUD_ACCENT: Color = Color::Rgb { r: 255, g: 220, b: 50 };

// ── Frame composition ──

/// Bring the framebuffer up to date with the world and return the pixel
/// rects that changed since the last frame.
pub fn compose_frame(world: &mut WorldState, fb: &mut FrameBuffer) -> Vec<PixelRect> {
    let (tw, th) = world.plane.tile_size();
    let old = world.plane.redraw_dirty(fb, 0, 0);
    let sprites = draw_sprites(world, fb);
    world.plane.mark_dirty_rects(&sprites, 0, 0);
    let new = world.plane.dirty_runs();
    let rects = runs_to_rects(&union_old_new(&old, &new), tw, th);
    trace!(rects = rects.len(), sprites = sprites.len(), "frame_composed");
    rects
}

/// Top and bottom inks of terminal cell `(col, row)` of the map.
pub fn cell_inks(fb: &FrameBuffer, col: usize, row: usize) -> (u8, u8) {
    let (x, y) = (col as i32 * CELL_PX_W, row as i32 * CELL_PX_H);
    let half = CELL_PX_H / 2;
    (
        fb.max_ink(PixelRect::new(x, y, CELL_PX_W, half)),
        fb.max_ink(PixelRect::new(x, y + half, CELL_PX_W, half)),
    )
}

/// Side panel text, one entry per line.
pub fn hud_lines(world: &WorldState) -> Vec<String> {
    let health = "♥".repeat(world.player.health as usize);
    let mut lines = vec![
        "B L O C K   T O S S".to_string(),
        String::new(),
        format!("Room    {}/{}  {}", world.room_index + 1, room_count(), world.room_name),
        format!("Score   {}", world.score),
        format!("Health  {}", health),
        format!("Enemies {}", world.enemies.iter().filter(|e| e.body.is_alive()).count()),
        String::new(),
        world.message.clone(),
        String::new(),
    ];
    match world.phase {
        Phase::GameOver | Phase::GameComplete => {
            lines.push("ENTER  play again".to_string());
            lines.push("Q/ESC  quit".to_string());
        }
        Phase::Playing | Phase::RoomClear => {
            lines.push("←→ / AD   walk".to_string());
            lines.push("↑↓ / WS   climb".to_string());
            lines.push("Z / Space jump".to_string());
            lines.push("X         make / toss".to_string());
            lines.push("Q / Esc   quit".to_string());
        }
    }
    lines
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    fb: FrameBuffer,
    /// Inks currently on screen per map cell; `None` forces a write.
    shown: Vec<Option<(u8, u8)>>,
    /// HUD lines currently on screen.
    shown_hud: Vec<String>,
    term_w: u16,
    term_h: u16,
    too_small: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            fb: FrameBuffer::new(SCREEN_WIDTH, SCREEN_HEIGHT, TileSheet::generate()),
            shown: vec![None; MAP_COLS * MAP_ROWS],
            shown_hud: vec![],
            term_w: 0,
            term_h: 0,
            too_small: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(BASE_BG),
            Clear(ClearType::All)
        )?;
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw;
        self.term_h = th;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn draw_frame(&mut self, world: &mut WorldState) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw != self.term_w || th != self.term_h {
            self.term_w = tw;
            self.term_h = th;
            self.invalidate(world)?;
        }

        if tw < MIN_TERM_W || th < MIN_TERM_H {
            if !self.too_small {
                self.too_small = true;
                let msg = format!("Terminal too small: need {}x{}", MIN_TERM_W, MIN_TERM_H);
                queue!(self.writer, MoveTo(0, 0), SetForegroundColor(HUD_FG), Print(msg))?;
                self.writer.flush()?;
            }
            return Ok(());
        }
        if self.too_small {
            self.invalidate(world)?;
        }

        let rects = compose_frame(world, &mut self.fb);
        self.present(&rects)?;
        self.draw_hud(world)?;
        self.writer.flush()
    }

    /// Forget what is on screen: clear it and repaint everything.
    fn invalidate(&mut self, world: &mut WorldState) -> io::Result<()> {
        self.shown.fill(None);
        self.shown_hud.clear();
        self.too_small = false;
        world.plane.clear_dirty(true);
        queue!(self.writer, SetBackgroundColor(BASE_BG), Clear(ClearType::All))
    }

    // ── Present: only write cells whose inks changed ──

    fn present(&mut self, rects: &[PixelRect]) -> io::Result<()> {
        let mut last: Option<(u8, u8)> = None;
        for rect in rects {
            let r = rect.clip(self.fb.width(), self.fb.height());
            if r.is_empty() { continue; }
            let (c0, c1) = ((r.x / CELL_PX_W) as usize, ceil_div(r.right(), CELL_PX_W) as usize);
            let (r0, r1) = ((r.y / CELL_PX_H) as usize, ceil_div(r.bottom(), CELL_PX_H) as usize);

            for row in r0..r1.min(MAP_ROWS) {
                for col in c0..c1.min(MAP_COLS) {
                    let inks = cell_inks(&self.fb, col, row);
                    let slot = &mut self.shown[row * MAP_COLS + col];
                    if *slot == Some(inks) { continue; }
                    *slot = Some(inks);

                    queue!(self.writer, MoveTo(MAP_LEFT + col as u16, MAP_TOP + row as u16))?;
                    if last.map(|l| l.0) != Some(inks.0) {
                        queue!(self.writer, SetForegroundColor(PALETTE[inks.0 as usize]))?;
                    }
                    if last.map(|l| l.1) != Some(inks.1) {
                        queue!(self.writer, SetBackgroundColor(PALETTE[inks.1 as usize]))?;
                    }
                    last = Some(inks);
                    queue!(self.writer, Print(HALF_BLOCK))?;
                }
            }
        }
        Ok(())
    }

    // ── HUD: rewrite only the lines that changed ──

    fn draw_hud(&mut self, world: &WorldState) -> io::Result<()> {
        let lines = hud_lines(world);
        let rows = lines.len().max(self.shown_hud.len());
        queue!(self.writer, SetBackgroundColor(BASE_BG))?;
        for i in 0..rows {
            let line = lines.get(i).map(String::as_str).unwrap_or("");
            if self.shown_hud.get(i).map(String::as_str) == Some(line) { continue; }
            let fg = if i == 0 || (i == 7 && !line.is_empty()) { HUD_ACCENT } else { HUD_FG };
            let padded: String = format!("{:<width$}", line, width = HUD_WIDTH).chars().take(HUD_WIDTH).collect();
            queue!(
                self.writer,
                MoveTo(HUD_LEFT, MAP_TOP + i as u16),
                SetForegroundColor(fg),
                Print(padded)
            )?;
        }
        self.shown_hud = lines;
        Ok(())
    }
}
