use crossterm::{
    cursor,
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use glyphfield::{Rgba, Surface, TextStyle};
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

/// How a cell relates to double-width glyphs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Span {
    Single,
    /// Left half of a double-width glyph.
    Lead,
    /// Covered by the glyph to its left; never printed.
    Tail,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) span: Span,
    /// Alpha of the glyph drawn here; a stronger glyph may claim a covered cell.
    pub(crate) ink: f32,
    /// Opaque background, kept for compositing.
    backdrop: Rgba,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Black,
            span: Span::Single,
            ink: 0.0,
            backdrop: Rgba::BLACK,
        }
    }
}

fn to_color(rgb: [u8; 3]) -> Color {
    Color::Rgb {
        r: rgb[0],
        g: rgb[1],
        b: rgb[2],
    }
}

/// One frame of terminal cells, addressed in the field's pixel space.
pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    cell_size: f32,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16, cell_size: f32) -> Self {
        Self {
            w,
            h,
            cell_size,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }

    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.w && y < self.h {
            self.cells.get(self.idx(x, y))
        } else {
            None
        }
    }

    fn cell_of(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.cell_size).floor() as u32;
        let row = (y / self.cell_size).floor() as u32;
        (col < self.w as u32 && row < self.h as u32).then_some((col as u16, row as u16))
    }

    /// Writes one glyph. Double-width glyphs take the next cell too, unless
    /// they would run off the row.
    fn put(&mut self, x: u16, y: u16, ch: char, color: Rgba) {
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        if self.cells[i].span == Span::Tail {
            if self.cells[i].ink >= color.a {
                return;
            }
            // Stronger ink: drop the wide glyph on the left.
            if let Some(lead) = i.checked_sub(1).and_then(|l| self.cells.get_mut(l)) {
                lead.ch = ' ';
                lead.span = Span::Single;
            }
        }
        if self.cells[i].span == Span::Lead {
            if let Some(tail) = self.cells.get_mut(i + 1) {
                tail.span = Span::Single;
                tail.ch = ' ';
            }
        }

        let width = ch.width().unwrap_or(0);
        let (ch, width) = match width {
            1 => (ch, 1),
            2 if x + 1 < self.w => (ch, 2),
            _ => (' ', 1),
        };

        let cell = &mut self.cells[i];
        cell.ch = ch;
        cell.fg = to_color(color.composite_over(cell.backdrop));
        cell.ink = color.a;
        cell.span = if width == 2 { Span::Lead } else { Span::Single };

        if width == 2 {
            let fg = cell.fg;
            let tail = &mut self.cells[i + 1];
            tail.ch = ' ';
            tail.fg = fg;
            tail.ink = color.a;
            tail.span = Span::Tail;
        }
    }

    fn tint(&mut self, x: u16, y: u16, color: Rgba) {
        if x >= self.w || y >= self.h {
            return;
        }
        let i = self.idx(x, y);
        let cell = &mut self.cells[i];
        let [r, g, b] = color.composite_over(cell.backdrop);
        cell.backdrop = Rgba::opaque(r, g, b);
        cell.bg = to_color([r, g, b]);
    }

    /// Prints a run of text starting at a cell, clipped at the right edge.
    pub(crate) fn put_str(&mut self, x: u16, y: u16, s: &str, color: Rgba) {
        let mut col = x;
        for ch in s.chars() {
            if col >= self.w {
                break;
            }
            self.put(col, y, ch, color);
            col = col.saturating_add(ch.width().unwrap_or(0).max(1) as u16);
        }
    }

    /// Paints the background of a whole row.
    pub(crate) fn shade_row(&mut self, y: u16, color: Rgba) {
        for x in 0..self.w {
            self.tint(x, y, color);
        }
    }
}

impl Surface for CellBuffer {
    fn size(&self) -> (f32, f32) {
        (self.w as f32 * self.cell_size, self.h as f32 * self.cell_size)
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba) {
        let c0 = (x / self.cell_size).floor().max(0.0) as u32;
        let r0 = (y / self.cell_size).floor().max(0.0) as u32;
        let c1 = (((x + width) / self.cell_size).ceil().max(0.0) as u32).min(self.w as u32);
        let r1 = (((y + height) / self.cell_size).ceil().max(0.0) as u32).min(self.h as u32);
        for row in r0..r1 {
            for col in c0..c1 {
                let i = self.idx(col as u16, row as u16);
                let cell = &mut self.cells[i];
                let [r, g, b] = color.composite_over(cell.backdrop);
                *cell = Cell {
                    bg: to_color([r, g, b]),
                    backdrop: Rgba::opaque(r, g, b),
                    ..Cell::default()
                };
            }
        }
    }

    // One glyph per cell, so font metrics have nothing to adjust.
    fn set_text_style(&mut self, _style: TextStyle) {}

    fn fill_text(&mut self, ch: char, x: f32, y: f32, color: Rgba) {
        if let Some((col, row)) = self.cell_of(x, y) {
            self.put(col, row, ch, color);
        }
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        let Some((col, row)) = self.cell_of(x, y) else {
            return;
        };
        self.tint(col, row, color);

        // Larger dots spill into neighbours whose centers they cover.
        let reach = (radius / self.cell_size).ceil() as i32;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (cx, cy) = (col as i32 + dx, row as i32 + dy);
                if cx < 0 || cy < 0 {
                    continue;
                }
                let px = (cx as f32 + 0.5) * self.cell_size - x;
                let py = (cy as f32 + 0.5) * self.cell_size - y;
                if px * px + py * py <= radius * radius {
                    self.tint(cx as u16, cy as u16, color);
                }
            }
        }
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
    cell_size: f32,
    dirty: bool,
}

impl Terminal {
    pub(crate) fn begin(cell_size: f32) -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            EnableMouseCapture,
            EnableFocusChange,
            terminal::Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows, cell_size),
            cur: CellBuffer::new(cols, rows, cell_size),
            cell_size,
            dirty: true,
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableFocusChange,
            DisableMouseCapture,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// The field's viewport in pixels for the current terminal size.
    pub(crate) fn viewport(&self) -> (f32, f32) {
        (
            self.cols as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.prev = CellBuffer::new(cols, rows, self.cell_size);
        self.cur = CellBuffer::new(cols, rows, self.cell_size);
        self.dirty = true;
    }

    /// Flushes changed rows. Whole rows are reprinted so double-width glyphs
    /// keep their columns.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;
        if self.dirty {
            queue!(self.out, ResetColor, Clear(ClearType::All))?;
        }

        let w = self.cols as usize;
        let mut last_fg = None;
        let mut last_bg = None;

        for y in 0..self.rows {
            let start = y as usize * w;
            let row = &self.cur.cells[start..start + w];
            if !self.dirty && row == &self.prev.cells[start..start + w] {
                continue;
            }

            queue!(self.out, cursor::MoveTo(0, y))?;
            let mut covered = false;
            for c in row {
                // An orphaned tail still needs its column printed.
                if c.span == Span::Tail && covered {
                    covered = false;
                    continue;
                }
                covered = c.span == Span::Lead;
                let ch = if c.span == Span::Tail { ' ' } else { c.ch };
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }
                queue!(self.out, Print(ch))?;
            }
        }

        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        self.dirty = false;
        Ok(())
    }
}
