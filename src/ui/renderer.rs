/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// World units are continuous. One terminal column covers WORLD_PER_COL
/// units and one row covers WORLD_PER_ROW, so a character cell is twice
/// as tall as it is wide, roughly matching a square on screen.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::sim::session::{GameSession, Phase, Viewport};

/// World units per terminal column / row.
const WORLD_PER_COL: f32 = 8.0;
const WORLD_PER_ROW: f32 = 16.0;

/// Uniform upward shift applied when drawing the player, platforms, the
/// floor and the lava. Collision treats `y + size` as the body's bottom
/// while drawing happens one body-height higher; shifting every entity by
/// the same amount keeps a standing player flush with its platform line.
const RENDER_Y_OFFSET: f32 = 20.0;

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

/// Rows below the map: gap + message bar + gap + help bar.
const RESERVED_ROWS: usize = MAP_ROW + 4;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// On VTE-based Linux terminals the inter-row gap pixels use the
    /// background color from the last Clear or the terminal's configured
    /// default. Using the SAME explicit RGB for both `Clear(ClearType::All)`
    /// and every cell's background keeps the gap color identical to the
    /// cell color, eliminating visible horizontal lines.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 12, b: 24 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: Color::Magenta,
        bg: Color::Magenta,
    };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell gets an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        Cell { ch, fg, bg: Self::norm_bg(bg) }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width { break; }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// World dimensions backing the current terminal size. The map area of
    /// the screen IS the sim viewport, so the walls always sit at the
    /// screen edges.
    pub fn world_viewport(&self) -> Viewport {
        let map_rows = if self.term_h > RESERVED_ROWS {
            self.term_h - RESERVED_ROWS
        } else {
            1
        };
        Viewport::new(
            (self.term_w.max(1) as f32) * WORLD_PER_COL,
            (map_rows as f32) * WORLD_PER_ROW,
        )
    }

    fn map_rows(&self) -> usize {
        if self.term_h > RESERVED_ROWS { self.term_h - RESERVED_ROWS } else { 1 }
    }

    pub fn render(&mut self, session: &mut GameSession) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            // Force full repaint after resize.
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            session.set_viewport(self.world_viewport());
        }

        // Detect phase change → clear for clean transition
        let phase_changed = self.last_phase != Some(session.phase);
        if phase_changed {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(session.phase);
        }

        // Build front buffer
        self.front.clear();

        match session.phase {
            Phase::Title => self.compose_title(session),
            Phase::Playing => self.compose_game(session),
            Phase::GameOver => {
                self.compose_game(session);
                self.compose_game_over_overlay(session);
            }
        }

        // Diff and emit
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame.
        // IMPORTANT: Do NOT use ResetColor here. It resets to the terminal's
        // native default, which may differ from BASE_BG and cause line
        // artifacts.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                if cell == prev {
                    need_move = true;
                    continue;
                }

                // Position cursor if needed
                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                // Set colors only if changed
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── World → screen mapping ──

    fn screen_col(&self, wx: f32) -> i64 {
        (wx / WORLD_PER_COL).floor() as i64
    }

    fn screen_row(&self, cam_y: f32, wy: f32) -> i64 {
        MAP_ROW as i64 + ((wy - cam_y) / WORLD_PER_ROW).floor() as i64
    }

    /// Row for a world entity. The render offset applies to every drawn
    /// entity so relative alignment survives the shift.
    fn entity_row(&self, cam_y: f32, wy: f32) -> i64 {
        self.screen_row(cam_y, wy - RENDER_Y_OFFSET)
    }

    // ── Compose: build front buffer content ──

    fn compose_game(&mut self, s: &GameSession) {
        let buf_w = self.front.width;
        let map_rows = self.map_rows();
        let map_bottom = MAP_ROW + map_rows; // exclusive
        let cam = s.camera.y;

        let wall_fg = Color::Rgb { r: 110, g: 90, b: 70 };
        let rock_bg = Color::Rgb { r: 45, g: 35, b: 30 };
        let plat_fg = Color::Rgb { r: 160, g: 160, b: 170 };
        let mover_fg = Color::Rgb { r: 255, g: 180, b: 80 };
        let floor_fg = Color::Rgb { r: 90, g: 140, b: 70 };
        let lava_fg = Color::Rgb { r: 255, g: 120, b: 40 };
        let lava_bg = Color::Rgb { r: 120, g: 20, b: 0 };

        // ── Side walls ──
        let wall_l_col = self.screen_col(s.tuning.wall_margin).max(0) as usize;
        let wall_r_col = self
            .screen_col(s.viewport.width - s.tuning.wall_margin)
            .max(0) as usize;
        for row in MAP_ROW..map_bottom {
            for x in 0..=wall_l_col.min(buf_w.saturating_sub(1)) {
                self.front.set(x, row, Cell::new('▓', wall_fg, rock_bg));
            }
            for x in wall_r_col..buf_w {
                self.front.set(x, row, Cell::new('▓', wall_fg, rock_bg));
            }
        }

        // ── Floor ──
        let floor_row = self.entity_row(cam, s.floor_y());
        if floor_row < map_bottom as i64 {
            let start = floor_row.max(MAP_ROW as i64) as usize;
            for row in start..map_bottom {
                for x in 0..buf_w {
                    self.front.set(x, row, Cell::new('▒', floor_fg, rock_bg));
                }
            }
        }

        // ── Platforms ──
        for p in &s.field.platforms {
            let row = self.entity_row(cam, p.y);
            if row < MAP_ROW as i64 || row >= map_bottom as i64 {
                continue;
            }
            let fg = if p.moving { mover_fg } else { plat_fg };
            let c0 = self.screen_col(p.x).max(0) as usize;
            let c1 = self.screen_col(p.right()).max(0) as usize;
            for x in c0..=c1.min(buf_w.saturating_sub(1)) {
                self.front.set(x, row as usize, Cell::new('▀', fg, Color::Reset));
            }
        }

        // ── Player ──
        let body_fg = if s.game_over {
            Color::Rgb { r: 255, g: 220, b: 60 }
        } else {
            Color::Rgb { r: 80, g: 255, b: 120 }
        };
        let p_row = self.entity_row(cam, s.player.y);
        if p_row >= MAP_ROW as i64 && p_row < map_bottom as i64 {
            let c0 = self.screen_col(s.player.x).max(0) as usize;
            let c1 = self.screen_col(s.player.x + s.player.size).max(0) as usize;
            for x in c0..=c1.min(buf_w.saturating_sub(1)) {
                self.front.set(x, p_row as usize, Cell::new('█', body_fg, Color::Reset));
            }
        }

        // ── Lava (drawn last, swallows everything below its surface) ──
        let lava_row = self.entity_row(cam, s.lava_y);
        if lava_row < map_bottom as i64 {
            let start = lava_row.max(MAP_ROW as i64) as usize;
            for row in start..map_bottom {
                let surface = row == start;
                let ch = if surface { '▂' } else { '█' };
                for x in 0..buf_w {
                    self.front.set(x, row, Cell::new(ch, lava_fg, lava_bg));
                }
            }
        }

        // ── HUD row ──
        let hud_bg = Color::Rgb { r: 20, g: 20, b: 60 };
        let hud = format!(" LAVA LEAP   Score:{:<7} Height:{:<6.0}", s.score, -s.player.y);
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, hud_bg));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, hud_bg);

        // ── Message bar ──
        let msg_row = map_bottom + 1;
        if msg_row < self.front.height && !s.message.is_empty() {
            let msg = format!(" ◈ {} ", s.message);
            for x in 0..buf_w {
                self.front.set(x, msg_row, Cell::new(' ', Color::Black, Color::Rgb { r: 200, g: 180, b: 50 }));
            }
            self.front.put_str(0, msg_row, &msg, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        }

        // ── Help bar ──
        let help_row = map_bottom + 3;
        if help_row < self.front.height {
            let help = " SPACE/W/Click:Jump  R:Restart  ESC:Title  │  Pad: A:Jump";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }
    }

    // ── Static screens (title, game over) ──

    fn compose_title(&mut self, s: &GameSession) {
        let title = [
            r"  _                      _                     ",
            r" | |    __ _ __ __ __ _ | |    ___  __ _  _ __ ",
            r" | |__ / _` |\ V // _` || |__ / -_)/ _` || '_ \",
            r" |____|\__,_| \_/ \__,_||____|\___|\__,_|| .__/",
            r"                                         |_|   ",
        ];

        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, Color::Rgb { r: 255, g: 140, b: 40 }, Color::Reset);
        }

        let subtitle = "◈◈  Outrun the Lava  ◈◈";
        let sx = 2 + (title[1].len().saturating_sub(subtitle.len())) / 2;
        self.front.put_str(sx, 8, subtitle, Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);

        // Menu options
        let menu_base = 11;
        let hi = Color::Rgb { r: 80, g: 255, b: 80 };

        self.front.put_str(8, menu_base, "SPACE   Start Climbing", hi, Color::Reset);
        self.front.put_str(8, menu_base + 1, "  Q     Quit", Color::White, Color::Reset);

        // Controls reference
        let help = [
            "Controls",
            "  SPACE / W / Up / Click   Jump (bounce off walls too)",
            "  R                       Restart run",
            "  ESC                     Back here",
        ];
        let help_base = menu_base + 3;
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { Color::Rgb { r: 255, g: 200, b: 50 } } else { Color::White };
            self.front.put_str(8, help_base + i, line, color, Color::Reset);
        }

        // Message bar (seed announcements, etc.)
        if !s.message.is_empty() {
            let msg_row = self.front.height.saturating_sub(1);
            let msg = format!(" ◈ {} ", s.message);
            let buf_w = self.front.width;
            for x in 0..buf_w {
                self.front.set(x, msg_row, Cell::new(' ', Color::Black, Color::Rgb { r: 200, g: 180, b: 50 }));
            }
            self.front.put_str(0, msg_row, &msg, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        }
    }

    fn compose_game_over_overlay(&mut self, s: &GameSession) {
        let box_art = [
            "╔════════════════════════════════╗",
            "║     ☼  THE LAVA GOT YOU  ☼     ║",
            "╚════════════════════════════════╝",
        ];
        let map_rows = self.map_rows();
        let cy = MAP_ROW + map_rows / 2;
        let cx = self.front.width.saturating_sub(box_art[0].chars().count()) / 2;
        let bg = Color::Rgb { r: 60, g: 10, b: 0 };

        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(cx, cy.saturating_sub(2) + i, l, Color::Rgb { r: 255, g: 80, b: 40 }, bg);
        }
        let score = format!("   ◈ Final Score: {}   ", s.score);
        self.front.put_str(cx + 5, cy + 2, &score, Color::White, bg);
        self.front.put_str(cx + 2, cy + 4, "▸ SPACE: Climb Again", Color::Rgb { r: 80, g: 255, b: 80 }, Color::Reset);
        self.front.put_str(cx + 2, cy + 5, "▸ ESC:   Back to Title", Color::DarkGrey, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Renderer::new touches no terminal state, so the pure world-to-screen
    // mapping is testable directly.

    #[test]
    fn standing_player_sits_flush_on_its_platform_row() {
        let r = Renderer::new();
        let cam = 0.0;
        let platform_top = 400.0;
        let player_y = platform_top - 20.0; // bottom resting on the top

        let player_row = r.entity_row(cam, player_y);
        let platform_row = r.entity_row(cam, platform_top);
        // One body (20 units) spans just over one row (16 units): the
        // platform line must be the row directly below the sprite.
        assert_eq!(platform_row, player_row + 1);
    }

    #[test]
    fn render_offset_shifts_all_heights_uniformly() {
        let r = Renderer::new();
        let cam = 160.0;
        // Row-aligned world heights across the scene move by the same
        // whole-row amount, never a single entity kind alone.
        for wy in [176.0, 480.0, 688.0, 1216.0] {
            assert_eq!(
                r.entity_row(cam, wy),
                r.screen_row(cam, wy) - (RENDER_Y_OFFSET / WORLD_PER_ROW).ceil() as i64,
            );
        }
    }
}
