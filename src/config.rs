use std::{fs, path::Path, time::Duration};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::theme::{ColorScheme, DEFAULT_SNIPPETS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Every tunable of the field. Missing keys fall back to the defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Grid cell edge in pixels.
    pub cell_size: f32,
    pub font_size: f32,
    /// Smoothing factor applied to intensity every frame, in (0, 1].
    pub reveal_speed: f32,
    /// Per idle cell, per frame.
    pub shimmer_chance: f64,
    pub stillness_threshold_ms: u64,
    pub hold_threshold_ms: u64,
    pub reveal_duration_ms: u64,
    pub overlay_timeout_ms: u64,
    pub cursor_hide_threshold_ms: u64,
    pub cursor_radius: f32,
    pub theme: String,
    pub glyph_set: String,
    /// Overrides the theme's colors when set.
    pub colors: Option<ColorScheme>,
    /// Overrides the glyph set's alphabet when set.
    pub glyphs: Option<String>,
    pub snippets: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: 14.0,
            font_size: 13.0,
            reveal_speed: 0.15,
            shimmer_chance: 0.03,
            stillness_threshold_ms: 150,
            hold_threshold_ms: 350,
            reveal_duration_ms: 1500,
            overlay_timeout_ms: 3000,
            cursor_hide_threshold_ms: 300,
            cursor_radius: 4.0,
            theme: "matrixGreen".to_string(),
            glyph_set: "matrix".to_string(),
            colors: None,
            glyphs: None,
            snippets: DEFAULT_SNIPPETS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Pulls every value back into its valid range, warning about each fix.
    pub fn sanitized(mut self) -> Self {
        let defaults = Config::default();

        if !(self.cell_size.is_finite() && self.cell_size >= 1.0) {
            warn!("cellSize {} is invalid, using {}", self.cell_size, defaults.cell_size);
            self.cell_size = defaults.cell_size;
        }
        if !(self.font_size.is_finite() && self.font_size >= 1.0) {
            warn!("fontSize {} is invalid, using {}", self.font_size, defaults.font_size);
            self.font_size = defaults.font_size;
        }
        if !(self.reveal_speed.is_finite() && self.reveal_speed > 0.0 && self.reveal_speed <= 1.0) {
            let fixed = if self.reveal_speed.is_finite() && self.reveal_speed > 1.0 {
                1.0
            } else {
                defaults.reveal_speed
            };
            warn!("revealSpeed {} is out of range, using {fixed}", self.reveal_speed);
            self.reveal_speed = fixed;
        }
        if !(0.0..=1.0).contains(&self.shimmer_chance) {
            let fixed = if self.shimmer_chance.is_nan() {
                defaults.shimmer_chance
            } else {
                self.shimmer_chance.clamp(0.0, 1.0)
            };
            warn!("shimmerChance {} is out of range, using {fixed}", self.shimmer_chance);
            self.shimmer_chance = fixed;
        }
        if !(self.cursor_radius.is_finite() && self.cursor_radius >= 0.0) {
            self.cursor_radius = defaults.cursor_radius;
        }
        if self.snippets.iter().all(|s| s.is_empty()) {
            warn!("snippet list is empty, using the built-in snippets");
            self.snippets = defaults.snippets;
        } else {
            self.snippets.retain(|s| !s.is_empty());
        }
        self
    }

    pub fn stillness_threshold(&self) -> Duration {
        Duration::from_millis(self.stillness_threshold_ms)
    }

    pub fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_threshold_ms)
    }

    pub fn reveal_duration(&self) -> Duration {
        Duration::from_millis(self.reveal_duration_ms)
    }

    pub fn overlay_timeout(&self) -> Duration {
        Duration::from_millis(self.overlay_timeout_ms)
    }

    pub fn cursor_hide_threshold(&self) -> Duration {
        Duration::from_millis(self.cursor_hide_threshold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json(r#"{ "cellSize": 10, "theme": "hackerBlue" }"#).unwrap();
        assert_eq!(cfg.cell_size, 10.0);
        assert_eq!(cfg.theme, "hackerBlue");
        assert_eq!(cfg.reveal_duration_ms, 1500);
        assert_eq!(cfg.snippets.len(), DEFAULT_SNIPPETS.len());
        assert!(cfg.colors.is_none());
    }

    #[test]
    fn color_override_round_trips_through_json() {
        let cfg = Config::from_json(
            r##"{ "colors": {
                "base": "rgba(1,2,3,0.5)", "reveal": "#fff", "background": "#000"
            } }"##,
        )
        .unwrap();
        let colors = cfg.colors.unwrap();
        assert_eq!(colors.reveal, "#fff");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(Config::from_json("{ cellSize: }").is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Config::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let cfg = Config {
            cell_size: 0.0,
            reveal_speed: 3.0,
            shimmer_chance: -1.0,
            snippets: vec![String::new()],
            ..Config::default()
        }
        .sanitized();
        assert_eq!(cfg.cell_size, 14.0);
        assert_eq!(cfg.reveal_speed, 1.0);
        assert_eq!(cfg.shimmer_chance, 0.0);
        assert_eq!(cfg.snippets.len(), DEFAULT_SNIPPETS.len());

        let cfg = Config {
            reveal_speed: 0.0,
            snippets: vec!["a".into(), String::new()],
            ..Config::default()
        }
        .sanitized();
        assert_eq!(cfg.reveal_speed, 0.15);
        assert_eq!(cfg.snippets, vec!["a".to_string()]);
    }

    #[test]
    fn bundled_example_parses() {
        let cfg = Config::from_json(include_str!("../glyphfield.example.json")).unwrap();
        assert_eq!(cfg.theme, "cyberPunk");
        assert_eq!(cfg.glyph_set, "ascii");
        assert_eq!(cfg.cursor_radius, 4.0);
        assert_eq!(cfg, cfg.clone().sanitized());
    }
}
