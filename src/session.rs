use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;

use crate::config::Config;
use crate::detector::{DetectorState, InputMode, PointerState, StillnessDetector};
use crate::grid::{Alphabet, GridDims, GridStore};
use crate::overlay::Overlay;
use crate::render::{self, CellTuning, CursorTuning, FrameStats};
use crate::reveal::{Placement, RevealEngine, RevealId};
use crate::schedule::{Scheduler, Task, TaskId};
use crate::surface::{Surface, TextAlign, TextBaseline, TextStyle};
use crate::theme::{self, ColorScheme, Palette};

/// One running glyph field: grid, reveals, timers and pointer in a single owner.
///
/// Hosts feed pointer events in as they arrive and call [`GlyphField::frame`]
/// once per display refresh. Every method takes the current time explicitly.
pub struct GlyphField {
    config: Config,
    theme_key: String,
    glyph_key: String,
    /// Colors or glyphs came from the config instead of a preset.
    custom_colors: bool,
    custom_glyphs: bool,
    palette: Palette,
    alphabet: Alphabet,
    viewport: (f32, f32),
    grid: GridStore,
    reveals: RevealEngine,
    detector: StillnessDetector,
    overlay: Overlay,
    pointer: PointerState,
    scheduler: Scheduler<Task>,
    rng: StdRng,
}

impl GlyphField {
    pub fn new(config: Config, viewport: (f32, f32), now: Instant, rng: StdRng) -> Self {
        let config = config.sanitized();

        let theme_key = match theme::find_theme(&config.theme) {
            Some(t) => t.key,
            None => {
                warn!("theme `{}` not found, using `{}`", config.theme, theme::THEMES[0].key);
                theme::THEMES[0].key
            }
        };
        let glyph_key = match theme::find_glyph_set(&config.glyph_set) {
            Some(g) => g.key,
            None => {
                warn!(
                    "glyph set `{}` not found, using `{}`",
                    config.glyph_set,
                    theme::GLYPH_SETS[0].key
                );
                theme::GLYPH_SETS[0].key
            }
        };

        let palette = match &config.colors {
            Some(scheme) => Palette::from_scheme(scheme),
            None => Palette::from_scheme(&preset_scheme(theme_key)),
        };
        let alphabet = match &config.glyphs {
            Some(glyphs) => Alphabet::new(glyphs),
            None => Alphabet::new(preset_glyphs(glyph_key)),
        };

        let reveals = RevealEngine::new(&config.snippets, config.reveal_duration());
        let detector =
            StillnessDetector::new(config.stillness_threshold(), config.hold_threshold());
        let overlay = Overlay::new(config.overlay_timeout());

        let mut field = Self {
            theme_key: theme_key.to_string(),
            glyph_key: glyph_key.to_string(),
            custom_colors: config.colors.is_some(),
            custom_glyphs: config.glyphs.is_some(),
            palette,
            alphabet,
            viewport: (0.0, 0.0),
            grid: GridStore::new(),
            reveals,
            detector,
            overlay,
            pointer: PointerState::new(now),
            scheduler: Scheduler::new(),
            rng,
            config,
        };
        field.resize(viewport, now);
        info!(
            "glyph field ready: {}x{} cells, theme {}, glyphs {}",
            field.grid.dims().cols,
            field.grid.dims().rows,
            field.theme_key,
            field.glyph_key
        );
        field
    }

    /// Tears everything down and rebuilds the grid for the new viewport.
    /// Pending timers and any in-flight reveal are dropped.
    pub fn resize(&mut self, viewport: (f32, f32), _now: Instant) {
        self.scheduler.clear();
        self.reveals.reset();
        self.detector.reset();
        self.overlay.reset();

        self.viewport = viewport;
        let dims = GridDims::from_viewport(viewport.0, viewport.1, self.config.cell_size);
        self.grid.resize(dims, &self.alphabet, &mut self.rng);
        info!(
            "viewport {}x{} -> {}x{} cells",
            viewport.0, viewport.1, dims.cols, dims.rows
        );
    }

    /// Switches color scheme. Unknown keys are logged and ignored.
    pub fn apply_theme(&mut self, key: &str) -> bool {
        let Some(theme) = theme::find_theme(key) else {
            warn!("theme `{key}` not found");
            return false;
        };
        self.theme_key = theme.key.to_string();
        self.custom_colors = false;
        self.palette = Palette::from_scheme(&ColorScheme::from(theme));
        info!("theme: {}", theme.name);
        true
    }

    /// Switches glyph set and resets the grid. Unknown keys are logged and ignored.
    pub fn apply_glyph_set(&mut self, key: &str) -> bool {
        let Some(set) = theme::find_glyph_set(key) else {
            warn!("glyph set `{key}` not found");
            return false;
        };
        self.glyph_key = set.key.to_string();
        self.custom_glyphs = false;
        self.alphabet = Alphabet::new(set.chars);
        self.reveals.cancel(&mut self.scheduler);
        let dims = self.grid.dims();
        self.grid.resize(dims, &self.alphabet, &mut self.rng);
        info!("glyph set: {}", set.name);
        true
    }

    pub fn cycle_theme(&mut self) -> bool {
        let next = theme::next_theme_key(&self.theme_key);
        self.apply_theme(next)
    }

    pub fn cycle_glyph_set(&mut self) -> bool {
        let next = theme::next_glyph_set_key(&self.glyph_key);
        self.apply_glyph_set(next)
    }

    /// Key presses and other non-pointer interaction keep the overlay up.
    pub fn show_overlay(&mut self, now: Instant) {
        self.overlay.show(&mut self.scheduler, now);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32, now: Instant) {
        self.record_move(x, y, now, InputMode::Mouse);
        self.detector
            .on_move(&mut self.scheduler, now, InputMode::Mouse, &mut self.overlay);
    }

    pub fn touch_started(&mut self, x: f32, y: f32, now: Instant) {
        self.record_move(x, y, now, InputMode::Touch);
        self.detector
            .on_touch_start(&mut self.scheduler, now, &mut self.overlay);
    }

    pub fn touch_moved(&mut self, x: f32, y: f32, now: Instant) {
        self.record_move(x, y, now, InputMode::Touch);
        self.detector
            .on_move(&mut self.scheduler, now, InputMode::Touch, &mut self.overlay);
    }

    /// Pointer left the surface or lifted. A running reveal is left to expire.
    pub fn pointer_ended(&mut self, now: Instant) {
        self.detector
            .on_end(&mut self.scheduler, now, &mut self.overlay);
    }

    fn record_move(&mut self, x: f32, y: f32, now: Instant, mode: InputMode) {
        self.pointer.position = Some((x, y));
        self.pointer.last_move = now;
        self.pointer.mode = mode;
        // Whatever was showing under the old position starts fading.
        self.reveals.cancel(&mut self.scheduler);
    }

    /// Reveals a snippet under the last known pointer position.
    pub fn trigger_reveal(&mut self, now: Instant) -> Option<Placement> {
        self.trigger_reveal_at(self.pointer.position, now)
    }

    pub fn trigger_reveal_at(
        &mut self,
        position: Option<(f32, f32)>,
        now: Instant,
    ) -> Option<Placement> {
        let placement = self.reveals.trigger(
            position,
            self.config.cell_size,
            &mut self.grid,
            &mut self.scheduler,
            now,
            &mut self.rng,
        );
        if placement.is_some() {
            // Detection restarts with the next qualifying pointer event.
            self.detector.clear(&mut self.scheduler);
        }
        placement
    }

    /// Runs every timer that is due, oldest first.
    pub fn advance_timers(&mut self, now: Instant) {
        while let Some((id, task)) = self.scheduler.pop_due(now) {
            self.dispatch(id, task, now);
        }
    }

    fn dispatch(&mut self, id: TaskId, task: Task, now: Instant) {
        match task {
            Task::StillnessCheck => {
                let last_move = self.pointer.last_move;
                if self
                    .detector
                    .on_stillness_check(id, &mut self.scheduler, now, last_move)
                {
                    debug!("pointer still, revealing");
                    self.trigger_reveal(now);
                }
            }
            Task::HoldCheck => {
                if self.detector.on_hold_check(id) {
                    debug!("touch held, revealing");
                    self.trigger_reveal(now);
                }
            }
            Task::RevealExpiry(reveal) => {
                self.reveals.expire(id, reveal);
            }
            Task::OverlayHide => {
                self.overlay.on_hide(id);
            }
        }
    }

    /// Advances timers and animation by one frame and paints it.
    pub fn frame<S: Surface + ?Sized>(&mut self, now: Instant, surface: &mut S) -> FrameStats {
        self.advance_timers(now);

        let busy = self.reveals.active().is_some() || self.reveals.expiry_pending();
        self.detector
            .maybe_rearm(&mut self.scheduler, now, &self.pointer, busy);

        let (width, height) = surface.size();
        surface.fill_rect(0.0, 0.0, width, height, self.palette.background);
        surface.set_text_style(TextStyle {
            font_size: self.config.font_size,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        });

        let cells = CellTuning {
            cell_size: self.config.cell_size,
            reveal_speed: self.config.reveal_speed,
            shimmer_chance: self.config.shimmer_chance,
        };
        let stats = render::paint_cells(
            &mut self.grid,
            &self.alphabet,
            self.reveals.active(),
            &self.palette,
            &cells,
            &mut self.rng,
            surface,
        );

        let cursor = CursorTuning {
            radius: self.config.cursor_radius,
            hide_after: self.config.cursor_hide_threshold(),
        };
        render::paint_cursor(&self.pointer, now, &self.palette, &cursor, surface);

        stats
    }

    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    pub fn active_reveal(&self) -> Option<RevealId> {
        self.reveals.active()
    }

    pub fn detector_state(&self) -> DetectorState {
        self.detector.state()
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn theme_name(&self) -> &'static str {
        if self.custom_colors {
            return "Custom";
        }
        theme::find_theme(&self.theme_key).map_or("Custom", |t| t.name)
    }

    pub fn glyph_set_name(&self) -> &'static str {
        if self.custom_glyphs {
            return "Custom";
        }
        theme::find_glyph_set(&self.glyph_key).map_or("Custom", |g| g.name)
    }
}

fn preset_scheme(key: &str) -> ColorScheme {
    theme::find_theme(key)
        .map(ColorScheme::from)
        .unwrap_or_else(|| ColorScheme::from(&theme::THEMES[0]))
}

fn preset_glyphs(key: &str) -> &'static str {
    theme::find_glyph_set(key).map_or(theme::GLYPH_SETS[0].chars, |g| g.chars)
}
