use log::{debug, warn};
use rand::Rng;

use crate::reveal::RevealId;

const PLACEHOLDER_GLYPH: char = '?';

/// What a cell is heading towards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellTarget {
    /// Render the cell's base glyph.
    Noise,
    /// Show `ch` for as long as `id` is the active reveal.
    Revealing { ch: char, id: RevealId },
}

/// The characters noise is drawn from. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    pub fn new(glyphs: &str) -> Self {
        let mut chars: Vec<char> = glyphs.chars().collect();
        if chars.is_empty() {
            warn!("glyph alphabet is empty, substituting `{PLACEHOLDER_GLYPH}`");
            chars.push(PLACEHOLDER_GLYPH);
        }
        Self { chars }
    }

    pub fn pick<R: Rng>(&self, rng: &mut R) -> char {
        self.chars[rng.gen_range(0..self.chars.len())]
    }

    pub fn contains(&self, ch: char) -> bool {
        self.chars.contains(&ch)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridDims {
    pub cols: usize,
    pub rows: usize,
}

impl GridDims {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Enough cells to cover the viewport, partial cells included.
    pub fn from_viewport(width: f32, height: f32, cell_size: f32) -> Self {
        let cell_size = cell_size.max(1.0);
        let span = |extent: f32| -> usize {
            if extent.is_finite() && extent > 0.0 {
                (extent / cell_size).ceil() as usize
            } else {
                0
            }
        };
        Self {
            cols: span(width),
            rows: span(height),
        }
    }

    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.cols && row < self.rows).then(|| row * self.cols + col)
    }

    /// Grid cell containing pixel `(x, y)`, if any.
    pub fn cell_at(&self, x: f32, y: f32, cell_size: f32) -> Option<(usize, usize)> {
        if !(x.is_finite() && y.is_finite()) || cell_size <= 0.0 {
            return None;
        }
        let col = (x / cell_size).floor();
        let row = (y / cell_size).floor();
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        (col < self.cols && row < self.rows).then_some((col, row))
    }
}

/// Three parallel per-cell arrays indexed by `row * cols + col`.
#[derive(Debug, Default)]
pub struct GridStore {
    dims: GridDims,
    base: Vec<char>,
    target: Vec<CellTarget>,
    intensity: Vec<f32>,
}

impl GridStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reallocates every array and reseeds the noise.
    pub fn resize<R: Rng>(&mut self, dims: GridDims, alphabet: &Alphabet, rng: &mut R) {
        let len = dims.len();
        self.dims = dims;
        self.base = (0..len).map(|_| alphabet.pick(rng)).collect();
        self.target = vec![CellTarget::Noise; len];
        self.intensity = vec![0.0; len];
        debug!(
            "grid reallocated to {}x{} ({} glyphs)",
            dims.cols,
            dims.rows,
            alphabet.len()
        );
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn base(&self, index: usize) -> Option<char> {
        self.base.get(index).copied()
    }

    pub fn set_base(&mut self, index: usize, ch: char) {
        if let Some(slot) = self.base.get_mut(index) {
            *slot = ch;
        }
    }

    pub fn target(&self, index: usize) -> Option<CellTarget> {
        self.target.get(index).copied()
    }

    pub fn set_target(&mut self, index: usize, target: CellTarget) {
        if let Some(slot) = self.target.get_mut(index) {
            *slot = target;
        }
    }

    pub fn intensity(&self, index: usize) -> Option<f32> {
        self.intensity.get(index).copied()
    }

    pub fn set_intensity(&mut self, index: usize, value: f32) {
        if let Some(slot) = self.intensity.get_mut(index) {
            *slot = value.clamp(0.0, 1.0);
        }
    }

    pub fn intensities(&self) -> &[f32] {
        &self.intensity
    }

    pub fn targets(&self) -> &[CellTarget] {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn dims_use_ceiling_division() {
        assert_eq!(GridDims::from_viewport(140.0, 70.0, 14.0), GridDims::new(10, 5));
        assert_eq!(GridDims::from_viewport(141.0, 71.0, 14.0), GridDims::new(11, 6));
        assert_eq!(GridDims::from_viewport(0.0, 70.0, 14.0), GridDims::new(0, 5));
    }

    #[test]
    fn cell_at_rejects_outside_points() {
        let dims = GridDims::new(10, 5);
        assert_eq!(dims.cell_at(70.0, 35.0, 14.0), Some((5, 2)));
        assert_eq!(dims.cell_at(70.0, -1.0, 14.0), None);
        assert_eq!(dims.cell_at(140.0, 0.0, 14.0), None);
        assert_eq!(dims.cell_at(f32::NAN, 0.0, 14.0), None);
    }

    #[test]
    fn resize_allocates_every_array() {
        let mut rng = StdRng::seed_from_u64(7);
        let alphabet = Alphabet::new("01 ");
        let mut grid = GridStore::new();
        grid.resize(GridDims::new(10, 5), &alphabet, &mut rng);

        assert_eq!(grid.len(), 50);
        assert_eq!(grid.intensities().len(), 50);
        for i in 0..50 {
            assert!(alphabet.contains(grid.base(i).unwrap()));
            assert_eq!(grid.target(i), Some(CellTarget::Noise));
            assert_eq!(grid.intensity(i), Some(0.0));
        }
    }

    #[test]
    fn out_of_range_access_is_inert() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = GridStore::new();
        grid.resize(GridDims::new(2, 2), &Alphabet::new("x"), &mut rng);

        grid.set_base(4, 'y');
        grid.set_intensity(99, 0.5);
        grid.set_target(4, CellTarget::Noise);
        assert_eq!(grid.base(4), None);
        assert_eq!(grid.intensity(99), None);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn intensity_is_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut grid = GridStore::new();
        grid.resize(GridDims::new(1, 1), &Alphabet::new("x"), &mut rng);
        grid.set_intensity(0, 1.7);
        assert_eq!(grid.intensity(0), Some(1.0));
        grid.set_intensity(0, -0.2);
        assert_eq!(grid.intensity(0), Some(0.0));
    }

    #[test]
    fn empty_alphabet_gets_placeholder() {
        let alphabet = Alphabet::new("");
        assert_eq!(alphabet.chars(), &['?']);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(alphabet.pick(&mut rng), '?');
    }
}
