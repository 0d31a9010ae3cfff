use std::str::FromStr;

use log::warn;

/// An sRGB color with straight (non-premultiplied) alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,
    #[error("unsupported color syntax `{0}`")]
    Unsupported(String),
    #[error("malformed color `{0}`")]
    Malformed(String),
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Total parse: anything unparseable becomes opaque black.
    pub fn parse_or_black(input: &str) -> Self {
        match input.parse() {
            Ok(color) => color,
            Err(err) => {
                warn!("{err}, falling back to opaque black");
                Self::BLACK
            }
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Channel-wise linear interpolation. RGB is rounded, alpha is not.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let channel = |from: u8, to: u8| -> u8 {
            let v = from as f32 + (to as f32 - from as f32) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: channel(self.r, other.r),
            g: channel(self.g, other.g),
            b: channel(self.b, other.b),
            a: self.a * (1.0 - t) + other.a * t,
        }
    }

    /// Source-over blend onto an opaque backdrop.
    pub fn composite_over(self, backdrop: Rgba) -> [u8; 3] {
        let a = self.a.clamp(0.0, 1.0);
        let blend = |src: u8, dst: u8| -> u8 {
            (src as f32 * a + dst as f32 * (1.0 - a) + 0.5).clamp(0.0, 255.0) as u8
        };
        [
            blend(self.r, backdrop.r),
            blend(self.g, backdrop.g),
            blend(self.b, backdrop.b),
        ]
    }

    /// Rec.601 luma on the 0..=255 scale, alpha ignored.
    pub fn luminance(self) -> f32 {
        self.r as f32 * 0.299 + self.g as f32 * 0.587 + self.b as f32 * 0.114
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() {
            return Err(ColorParseError::Empty);
        }

        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ColorParseError::Malformed(input.to_string()));
        }

        let args = s
            .strip_prefix("rgba(")
            .or_else(|| s.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'));
        match args {
            Some(args) => {
                parse_functional(args).ok_or_else(|| ColorParseError::Malformed(input.to_string()))
            }
            None => Err(ColorParseError::Unsupported(input.to_string())),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);

    match hex.len() {
        3 => Some(Rgba::opaque(nibble(0)?, nibble(1)?, nibble(2)?)),
        6 => Some(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)? as f32 / 255.0)),
        _ => None,
    }
}

fn parse_functional(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        let v: f32 = s.parse().ok()?;
        v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(s) => {
            let a: f32 = s.parse().ok()?;
            if !a.is_finite() {
                return None;
            }
            a.clamp(0.0, 1.0)
        }
        None => 1.0,
    };

    Some(Rgba::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}
