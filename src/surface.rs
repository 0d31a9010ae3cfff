use crate::color::Rgba;

/// Glyphs are anchored at the center of their cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Center,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    #[default]
    Middle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

/// A 2D drawing target. Coordinates share the pointer's pixel space.
pub trait Surface {
    fn size(&self) -> (f32, f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgba);
    fn set_text_style(&mut self, style: TextStyle);
    fn fill_text(&mut self, ch: char, x: f32, y: f32, color: Rgba);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);
}
