use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// A named color scheme, colors kept as their source strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub key: &'static str,
    pub name: &'static str,
    pub base: &'static str,
    pub reveal: &'static str,
    pub background: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphSet {
    pub key: &'static str,
    pub name: &'static str,
    pub chars: &'static str,
}

pub const THEMES: &[Theme] = &[
    Theme {
        key: "matrixGreen",
        name: "Matrix",
        base: "rgba(0, 255, 0, 0.15)",
        reveal: "rgba(0, 255, 0, 0.95)",
        background: "#101015",
    },
    Theme {
        key: "terminalAmber",
        name: "Amber",
        base: "rgba(255, 176, 0, 0.2)",
        reveal: "rgba(255, 191, 0, 0.95)",
        background: "#1a1a10",
    },
    Theme {
        key: "hackerBlue",
        name: "Blue",
        base: "rgba(0, 180, 255, 0.15)",
        reveal: "rgba(100, 220, 255, 0.95)",
        background: "#101520",
    },
    Theme {
        key: "classicWhite",
        name: "Mono",
        base: "rgba(200, 200, 200, 0.2)",
        reveal: "rgba(255, 255, 255, 0.95)",
        background: "#101010",
    },
    Theme {
        key: "stealthGray",
        name: "Stealth",
        base: "rgba(150, 150, 150, 0.2)",
        reveal: "rgba(200, 200, 200, 0.85)",
        background: "#181818",
    },
    Theme {
        key: "cyberPunk",
        name: "Cyber",
        base: "rgba(255, 0, 255, 0.15)",
        reveal: "rgba(0, 255, 255, 0.95)",
        background: "#101010",
    },
    Theme {
        key: "inverted",
        name: "Light",
        base: "rgba(50, 50, 50, 0.2)",
        reveal: "rgba(0, 0, 0, 0.85)",
        background: "#f0f0f0",
    },
];

pub const GLYPH_SETS: &[GlyphSet] = &[
    GlyphSet {
        key: "matrix",
        name: "Matrix",
        chars: "ｱｲｳｴｵｶｷｸｹｺｻｼｽｾｿﾀﾁﾂﾃﾄﾅﾆﾇﾈﾉﾊﾋﾌﾍﾎﾏﾐﾑﾒﾓﾔﾕﾖﾗﾘﾙﾚﾛﾜｦﾝｧｨｩｪｫｯｬｭｮｶﾞｷﾞｸﾞｹﾞｺﾞｻﾞｼﾞｽﾞｾﾞｿﾞﾀﾞﾁﾞﾂﾞﾃﾞﾄﾞﾊﾞﾋﾞﾌﾞﾍﾞﾎﾟﾊﾟﾋﾟﾌﾟﾍﾟﾎﾟｰ0123456789",
    },
    GlyphSet {
        key: "katakana",
        name: "Katakana",
        chars: "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲンァィゥェォッャュョガギグゲゴザジズゼゾダヂヅデドバビブベボパピプペポー",
    },
    GlyphSet {
        key: "ascii",
        name: "ASCII",
        chars: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()[]{}-_+=\\|;:'\",.<>/?`~ ",
    },
    GlyphSet {
        key: "binary",
        name: "Binary",
        chars: "01 ",
    },
    GlyphSet {
        key: "blocks",
        name: "Blocks",
        chars: "█▓▒░ ",
    },
];

pub const DEFAULT_SNIPPETS: &[&str] = &[
    "focus", "reveal", "static", "order", "chaos", "signal", "hidden", "latent", "decode", "field",
    "mouse", "still", "touch", "hold", "silence", "glimpse", "perceive", "return;", "null", "void",
    "true", "false", "const", "let", "() => {}", "// ...", "data[i]", "<tag>", "{...}", "[...]",
    "sync", "await",
];

pub fn find_theme(key: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.key == key)
}

pub fn find_glyph_set(key: &str) -> Option<&'static GlyphSet> {
    GLYPH_SETS.iter().find(|g| g.key == key)
}

/// Key of the preset after `key`, wrapping; unknown keys restart at the first.
pub fn next_theme_key(key: &str) -> &'static str {
    let pos = THEMES.iter().position(|t| t.key == key);
    THEMES[pos.map_or(0, |i| (i + 1) % THEMES.len())].key
}

pub fn next_glyph_set_key(key: &str) -> &'static str {
    let pos = GLYPH_SETS.iter().position(|g| g.key == key);
    GLYPH_SETS[pos.map_or(0, |i| (i + 1) % GLYPH_SETS.len())].key
}

/// Color strings as they appear in configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub base: String,
    pub reveal: String,
    pub background: String,
}

impl From<&Theme> for ColorScheme {
    fn from(theme: &Theme) -> Self {
        Self {
            base: theme.base.to_string(),
            reveal: theme.reveal.to_string(),
            background: theme.background.to_string(),
        }
    }
}

/// Parsed colors used while drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub base: Rgba,
    pub reveal: Rgba,
    pub background: Rgba,
}

impl Palette {
    pub fn from_scheme(scheme: &ColorScheme) -> Self {
        Self {
            base: Rgba::parse_or_black(&scheme.base),
            reveal: Rgba::parse_or_black(&scheme.reveal),
            background: Rgba::parse_or_black(&scheme.background),
        }
    }

    /// Faint text that stays readable on the background.
    pub fn hint_color(&self) -> Rgba {
        if self.background.luminance() > 128.0 {
            Rgba::new(0, 0, 0, 0.4)
        } else {
            Rgba::new(255, 255, 255, 0.3)
        }
    }

    pub fn cursor_color(&self) -> Rgba {
        self.reveal.with_alpha(0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_parses_cleanly() {
        for theme in THEMES {
            let scheme = ColorScheme::from(theme);
            assert!(scheme.base.parse::<Rgba>().is_ok(), "{}", theme.key);
            assert!(scheme.reveal.parse::<Rgba>().is_ok(), "{}", theme.key);
            assert!(scheme.background.parse::<Rgba>().is_ok(), "{}", theme.key);
        }
        assert!(GLYPH_SETS.iter().all(|g| !g.chars.is_empty()));
        assert_eq!(DEFAULT_SNIPPETS.len(), 32);
    }

    #[test]
    fn lookups_and_cycling() {
        assert_eq!(find_theme("hackerBlue").map(|t| t.name), Some("Blue"));
        assert!(find_theme("nope").is_none());
        assert_eq!(find_glyph_set("binary").map(|g| g.chars), Some("01 "));

        assert_eq!(next_theme_key("matrixGreen"), "terminalAmber");
        assert_eq!(next_theme_key("inverted"), "matrixGreen");
        assert_eq!(next_theme_key("nope"), "matrixGreen");
        assert_eq!(next_glyph_set_key("blocks"), "matrix");
    }

    #[test]
    fn hint_color_follows_background() {
        let dark = Palette::from_scheme(&ColorScheme::from(&THEMES[0]));
        assert_eq!(dark.hint_color(), Rgba::new(255, 255, 255, 0.3));
        let light = Palette::from_scheme(&ColorScheme::from(find_theme("inverted").unwrap()));
        assert_eq!(light.hint_color(), Rgba::new(0, 0, 0, 0.4));
    }
}
