use std::time::{Duration, Instant};

use rand::Rng;

use crate::detector::{InputMode, PointerState};
use crate::grid::{Alphabet, CellTarget, GridStore};
use crate::reveal::RevealId;
use crate::surface::Surface;
use crate::theme::Palette;

/// Below this a cell counts as fully idle noise.
pub const IDLE_EPSILON: f32 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellTuning {
    pub cell_size: f32,
    pub reveal_speed: f32,
    pub shimmer_chance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorTuning {
    pub radius: f32,
    pub hide_after: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells painted.
    pub cells: usize,
    /// Cells whose target is still a reveal character.
    pub revealing: usize,
    /// Cells drawn in reveal colors.
    pub lit: usize,
}

/// Advances every cell one frame and paints it.
///
/// Per cell the order is fixed: resolve the target, step the intensity, then
/// mutate (shimmer, target reset) and draw.
pub fn paint_cells<S, R>(
    grid: &mut GridStore,
    alphabet: &Alphabet,
    active: Option<RevealId>,
    palette: &Palette,
    tuning: &CellTuning,
    rng: &mut R,
    surface: &mut S,
) -> FrameStats
where
    S: Surface + ?Sized,
    R: Rng,
{
    let dims = grid.dims();
    let half = tuning.cell_size / 2.0;
    let mut stats = FrameStats::default();

    for row in 0..dims.rows {
        for col in 0..dims.cols {
            let Some(index) = dims.index(col, row) else {
                continue;
            };
            let (Some(target), Some(current)) = (grid.target(index), grid.intensity(index)) else {
                continue;
            };

            let (ch, id) = match target {
                CellTarget::Revealing { ch, id } => (ch, Some(id)),
                CellTarget::Noise => (valid_base(grid, index, alphabet, rng), None),
            };

            let goal = if id.is_some() && id == active { 1.0 } else { 0.0 };
            let next = (current + (goal - current) * tuning.reveal_speed).clamp(0.0, 1.0);
            grid.set_intensity(index, next);

            let x = col as f32 * tuning.cell_size + half;
            let y = row as f32 * tuning.cell_size + half;

            if next < IDLE_EPSILON {
                if rng.gen::<f64>() < tuning.shimmer_chance {
                    grid.set_base(index, alphabet.pick(rng));
                }
                let base = grid.base(index).unwrap_or(ch);
                surface.fill_text(base, x, y, palette.base);
                if id.is_some() && goal == 0.0 {
                    grid.set_target(index, CellTarget::Noise);
                } else if id.is_some() {
                    stats.revealing += 1;
                }
            } else {
                surface.fill_text(ch, x, y, palette.base.lerp(palette.reveal, next));
                stats.lit += 1;
                if id.is_some() {
                    stats.revealing += 1;
                }
            }
            stats.cells += 1;
        }
    }

    stats
}

/// The cell's base glyph, re-rolled first if it is not from `alphabet`.
fn valid_base<R: Rng>(
    grid: &mut GridStore,
    index: usize,
    alphabet: &Alphabet,
    rng: &mut R,
) -> char {
    match grid.base(index) {
        Some(ch) if alphabet.contains(ch) => ch,
        _ => {
            let ch = alphabet.pick(rng);
            grid.set_base(index, ch);
            ch
        }
    }
}

/// Dot under a recently moved mouse. Touch input never shows it.
pub fn paint_cursor<S: Surface + ?Sized>(
    pointer: &PointerState,
    now: Instant,
    palette: &Palette,
    tuning: &CursorTuning,
    surface: &mut S,
) -> bool {
    let Some((x, y)) = pointer.position else {
        return false;
    };
    if pointer.mode == InputMode::Touch || pointer.since_move(now) >= tuning.hide_after {
        return false;
    }
    surface.fill_circle(x, y, tuning.radius, palette.cursor_color());
    true
}
