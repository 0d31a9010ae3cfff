//! Glyph field: a grid of shimmering noise glyphs that reveals short text
//! snippets wherever the pointer comes to rest.

pub mod color;
pub mod config;
pub mod detector;
pub mod grid;
pub mod overlay;
pub mod render;
pub mod reveal;
pub mod schedule;
pub mod session;
pub mod surface;
pub mod theme;

pub use color::Rgba;
pub use config::{Config, ConfigError};
pub use render::FrameStats;
pub use session::GlyphField;
pub use surface::{Surface, TextAlign, TextBaseline, TextStyle};
