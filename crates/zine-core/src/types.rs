//! Visual and spatial types

use crate::error::ZineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// RGBA color, each channel in `[0, 1]`
///
/// Deserializes from `"#rrggbb"`, `"#rrggbbaa"`, `"rgb(r, g, b)"`,
/// `"rgba(r, g, b, a)"` strings or from `[r, g, b, a]` float arrays.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr", into = "ColorRepr")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const BLACK: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
            a: 1.0,
        }
    }

    /// Build from 0-255 channel values and a `[0, 1]` alpha, the way CSS
    /// `rgba()` is written.
    pub fn from_rgba8(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: (r / 255.0).clamp(0.0, 1.0),
            g: (g / 255.0).clamp(0.0, 1.0),
            b: (b / 255.0).clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Hex form, `#rrggbb` when opaque and `#rrggbbaa` otherwise
    pub fn to_hex_string(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl FromStr for Color {
    type Err = ZineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(|| ZineError::InvalidColor(s.to_string()));
        }
        let lower = s.to_ascii_lowercase();
        let args = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ZineError::InvalidColor(s.to_string()))?;

        let parts: Vec<f32> = args
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<_, _>>()
            .map_err(|_| ZineError::InvalidColor(s.to_string()))?;

        match parts.as_slice() {
            [r, g, b] => Ok(Self::from_rgba8(*r, *g, *b, 1.0)),
            [r, g, b, a] => Ok(Self::from_rgba8(*r, *g, *b, *a)),
            _ => Err(ZineError::InvalidColor(s.to_string())),
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        6 => Some(Color::from_rgba8(
            byte(0)? as f32,
            byte(2)? as f32,
            byte(4)? as f32,
            1.0,
        )),
        8 => Some(Color::from_rgba8(
            byte(0)? as f32,
            byte(2)? as f32,
            byte(4)? as f32,
            byte(6)? as f32 / 255.0,
        )),
        _ => None,
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Text(String),
    Array([f32; 4]),
}

impl TryFrom<ColorRepr> for Color {
    type Error = ZineError;

    fn try_from(repr: ColorRepr) -> Result<Self, Self::Error> {
        match repr {
            ColorRepr::Text(s) => s.parse(),
            ColorRepr::Array([r, g, b, a]) => Ok(Color::new(
                r.clamp(0.0, 1.0),
                g.clamp(0.0, 1.0),
                b.clamp(0.0, 1.0),
                a.clamp(0.0, 1.0),
            )),
        }
    }
}

impl From<Color> for ColorRepr {
    fn from(c: Color) -> Self {
        ColorRepr::Text(c.to_hex_string())
    }
}

/// How a draw is mixed into what is already on a surface, after the
/// canvas `globalCompositeOperation` names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    /// Plain source-over
    #[default]
    Normal,
    Screen,
    Multiply,
    Overlay,
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [
        BlendMode::Normal,
        BlendMode::Screen,
        BlendMode::Multiply,
        BlendMode::Overlay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Screen => "screen",
            BlendMode::Multiply => "multiply",
            BlendMode::Overlay => "overlay",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = ZineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lower)
            .ok_or_else(|| ZineError::InvalidEnumValue {
                value: s.to_string(),
                allowed: Self::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

/// Pixel dimensions of a drawing surface or viewport
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl ViewportSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or NaN
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Clamp to at least 1x1 so ranges derived from the size stay valid
    pub fn sanitized(self) -> Self {
        let fix = |v: f32| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
        Self {
            width: fix(self.width),
            height: fix(self.height),
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x <= self.width && y <= self.height
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let c = Color::from_hex(0xFF8844);
        assert!((c.r - 1.0).abs() < 0.01);
        assert!((c.g - 0.533).abs() < 0.01);
        assert!((c.b - 0.267).abs() < 0.01);
    }

    #[test]
    fn parse_hex_strings() {
        let c: Color = "#76c893".parse().unwrap();
        assert_eq!(c.to_rgba8(), [0x76, 0xc8, 0x93, 255]);

        let c: Color = "#ffffff80".parse().unwrap();
        assert_eq!(c.to_rgba8()[3], 0x80);

        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn parse_css_rgba() {
        let c: Color = "rgba(5, 10, 20, 0.4)".parse().unwrap();
        assert_eq!(c.to_rgba8()[..3], [5, 10, 20]);
        assert!((c.a - 0.4).abs() < 1e-6);

        let c: Color = "rgb(255, 0, 0)".parse().unwrap();
        assert_eq!(c, Color::new(1.0, 0.0, 0.0, 1.0));

        assert!("rgba(1, 2)".parse::<Color>().is_err());
        assert!("blue".parse::<Color>().is_err());
    }

    #[test]
    fn color_serde_accepts_strings_and_arrays() {
        #[derive(Deserialize)]
        struct Palette {
            colors: Vec<Color>,
        }
        let p: Palette =
            toml::from_str(r##"colors = ["#4895ef", [1.0, 0.5, 0.0, 1.0], "rgba(0,0,0,0)"]"##)
                .unwrap();
        assert_eq!(p.colors.len(), 3);
        assert!((p.colors[1].g - 0.5).abs() < 1e-6);
        assert_eq!(p.colors[2].a, 0.0);
    }

    #[test]
    fn hex_round_trip_string() {
        assert_eq!(Color::from_hex(0x9d4edd).to_hex_string(), "#9d4edd");
        assert_eq!(Color::WHITE.with_alpha(0.0).to_hex_string(), "#ffffff00");
    }

    #[test]
    fn viewport_sanitize() {
        assert!(ViewportSize::new(0.0, 10.0).is_empty());
        assert!(ViewportSize::new(f32::NAN, 10.0).is_empty());
        let s = ViewportSize::new(-5.0, f32::INFINITY).sanitized();
        assert_eq!(s, ViewportSize::new(1.0, 1.0));
        assert!(!s.is_empty());
    }

    #[test]
    fn blend_mode_names_parse_case_insensitively() {
        assert_eq!("Screen".parse::<BlendMode>().unwrap(), BlendMode::Screen);
        assert_eq!(" overlay ".parse::<BlendMode>().unwrap(), BlendMode::Overlay);
        let err = "lighten".parse::<BlendMode>().unwrap_err();
        assert!(matches!(err, ZineError::InvalidEnumValue { ref allowed, .. } if allowed.len() == 4));
        assert_eq!(BlendMode::default(), BlendMode::Normal);
    }
}
