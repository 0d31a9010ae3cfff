use crate::input::{collect_input_nonblocking, map_event, Input};
use crate::term::{CellBuffer, Terminal};
use glyphfield::overlay::HINT_TEXT;
use glyphfield::{Config, GlyphField};
use log::{info, trace};
use rand::rngs::StdRng;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

pub(crate) struct App {
    field: GlyphField,
    term: Terminal,
    frame_dt: Duration,
    should_quit: bool,
}

impl App {
    pub(crate) fn init(config: Config, fps: u32, rng: StdRng) -> anyhow::Result<Self> {
        // The terminal and the field must map pixels with the same cell size.
        let config = config.sanitized();
        let term = Terminal::begin(config.cell_size)?;
        let field = GlyphField::new(config, term.viewport(), Instant::now(), rng);
        let fps = fps.clamp(10, 240);

        Ok(Self {
            field,
            term,
            frame_dt: Duration::from_secs_f32(1.0 / fps as f32),
            should_quit: false,
        })
    }

    pub(crate) fn run(&mut self) -> anyhow::Result<()> {
        let result = self.run_loop();
        // Restore the terminal even when the loop failed.
        let restored = self.term.end();
        result.and(restored)
    }

    fn run_loop(&mut self) -> anyhow::Result<()> {
        let cell_size = self.field.config().cell_size;
        let mut frames: u64 = 0;

        while !self.should_quit {
            let frame_start = Instant::now();

            for ev in collect_input_nonblocking(self.frame_dt)? {
                if let Some(input) = map_event(&ev, cell_size) {
                    self.apply(input, Instant::now());
                }
                if self.should_quit {
                    break;
                }
            }

            let now = Instant::now();
            let stats = self.field.frame(now, &mut self.term.cur);
            draw_overlay(&self.field, &mut self.term.cur);
            self.term.present()?;

            frames += 1;
            if frames % 120 == 0 {
                trace!(
                    "frame {frames}: {} cells, {} revealing, {} lit",
                    stats.cells,
                    stats.revealing,
                    stats.lit
                );
            }

            // frame cap
            spin_sleep(self.frame_dt, frame_start);
        }
        info!("quit after {frames} frames");
        Ok(())
    }

    fn apply(&mut self, input: Input, now: Instant) {
        match input {
            Input::Quit => self.should_quit = true,
            Input::CycleTheme => {
                self.field.cycle_theme();
                self.field.show_overlay(now);
            }
            Input::CycleGlyphs => {
                self.field.cycle_glyph_set();
                self.field.show_overlay(now);
            }
            Input::RevealNow => {
                self.field.trigger_reveal(now);
                self.field.show_overlay(now);
            }
            Input::PointerMove { x, y } => self.field.pointer_moved(x, y, now),
            Input::TouchStart { x, y } => self.field.touch_started(x, y, now),
            Input::TouchMove { x, y } => self.field.touch_moved(x, y, now),
            Input::PointerEnd => self.field.pointer_ended(now),
            Input::Resize { cols, rows } => {
                self.term.resize(cols, rows);
                self.field.resize(self.term.viewport(), now);
            }
        }
    }
}

/// Status line along the bottom and the first-run hint in the middle.
fn draw_overlay(field: &GlyphField, buf: &mut CellBuffer) {
    if buf.h == 0 {
        return;
    }
    let palette = field.palette();
    let hint = palette.hint_color();

    if field.overlay().hint_visible() {
        let width = HINT_TEXT.width() as u16;
        let x = buf.w.saturating_sub(width) / 2;
        buf.put_str(x, buf.h / 2, HINT_TEXT, hint);
    }

    if field.overlay().visible() {
        let y = buf.h - 1;
        buf.shade_row(y, palette.background.with_alpha(0.85));
        let status = format!(
            " {} · {}   t theme  g glyphs  r reveal  q quit",
            field.theme_name(),
            field.glyph_set_name()
        );
        buf.put_str(0, y, &status, palette.reveal.with_alpha(0.9));
    }
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfield::Surface;
    use rand::SeedableRng;

    #[test]
    fn overlay_draws_hint_then_status() {
        let t0 = Instant::now();
        let mut buf = CellBuffer::new(60, 5, 14.0);
        let mut field = GlyphField::new(
            Config::default(),
            buf.size(),
            t0,
            StdRng::seed_from_u64(4),
        );

        field.frame(t0, &mut buf);
        draw_overlay(&field, &mut buf);
        let middle: String = (0..60).map(|x| buf.cells[2 * 60 + x].ch).collect();
        assert!(middle.contains("Hold still"));

        field.pointer_moved(10.0, 10.0, t0);
        field.frame(t0, &mut buf);
        draw_overlay(&field, &mut buf);
        let bottom: String = (0..60).map(|x| buf.cells[4 * 60 + x].ch).collect();
        assert!(bottom.contains("Matrix · Matrix"));
        let middle: String = (0..60).map(|x| buf.cells[2 * 60 + x].ch).collect();
        assert!(!middle.contains("Hold still"));
    }

    #[test]
    fn degenerate_cell_size_is_shared_by_terminal_and_field() {
        let t0 = Instant::now();
        let config = Config {
            cell_size: 0.5,
            ..Config::default()
        }
        .sanitized();
        let mut buf = CellBuffer::new(80, 24, config.cell_size);
        let mut field = GlyphField::new(config, buf.size(), t0, StdRng::seed_from_u64(2));

        assert_eq!(field.config().cell_size, 14.0);
        let dims = field.grid().dims();
        assert_eq!((dims.cols, dims.rows), (80, 24));
        let stats = field.frame(t0, &mut buf);
        assert_eq!(stats.cells, 80 * 24);

        // A click on terminal cell (5, 2) lands on grid cell (5, 2).
        let (x, y) = match crate::input::map_event(
            &crossterm::event::Event::Mouse(crossterm::event::MouseEvent {
                kind: crossterm::event::MouseEventKind::Moved,
                column: 5,
                row: 2,
                modifiers: crossterm::event::KeyModifiers::NONE,
            }),
            field.config().cell_size,
        ) {
            Some(Input::PointerMove { x, y }) => (x, y),
            other => panic!("unexpected {other:?}"),
        };
        assert_eq!(dims.cell_at(x, y, field.config().cell_size), Some((5, 2)));
    }

    #[test]
    fn spin_sleep_waits_out_the_frame() {
        let start = Instant::now();
        spin_sleep(Duration::from_millis(5), start);
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
