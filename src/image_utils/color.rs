use image::Rgba;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognised color `{0}`, expected #rrggbb, #rrggbbaa, rgb(r,g,b), rgba(r,g,b,a) or a palette name")]
pub struct ColorParseError(pub String);

/// The circle picker palette, by name.
pub const PICKER_PALETTE: [(&str, [u8; 3]); 18] = [
    ("red", [0xf4, 0x43, 0x36]),
    ("pink", [0xe9, 0x1e, 0x63]),
    ("purple", [0x9c, 0x27, 0xb0]),
    ("deep-purple", [0x67, 0x3a, 0xb7]),
    ("indigo", [0x3f, 0x51, 0xb5]),
    ("blue", [0x21, 0x96, 0xf3]),
    ("light-blue", [0x03, 0xa9, 0xf4]),
    ("cyan", [0x00, 0xbc, 0xd4]),
    ("teal", [0x00, 0x96, 0x88]),
    ("green", [0x4c, 0xaf, 0x50]),
    ("light-green", [0x8b, 0xc3, 0x4a]),
    ("lime", [0xcd, 0xdc, 0x39]),
    ("yellow", [0xff, 0xeb, 0x3b]),
    ("amber", [0xff, 0xc1, 0x07]),
    ("orange", [0xff, 0x98, 0x00]),
    ("deep-orange", [0xff, 0x57, 0x22]),
    ("brown", [0x79, 0x55, 0x48]),
    ("blue-grey", [0x60, 0x7d, 0x8b]),
];

/// An RGBA color with 8 bits per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl BoxColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        BoxColor { r, g, b, a: 255 }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for BoxColor {
    /// Formats as a CSS `rgba()` string with the alpha channel in 0..1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let alpha = self.a as f64 / 255.0;
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, (alpha * 100.0).round() / 100.0)
    }
}

fn parse_hex(hex: &str, original: &str) -> Result<BoxColor, ColorParseError> {
    let err = || ColorParseError(original.to_string());
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(err());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(BoxColor { r: channel(0)?, g: channel(2)?, b: channel(4)?, a })
}

fn parse_functional(args: &str, with_alpha: bool, original: &str) -> Result<BoxColor, ColorParseError> {
    let err = || ColorParseError(original.to_string());
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let expected = if with_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return Err(err());
    }
    let channel = |s: &str| s.parse::<u8>().map_err(|_| err());
    let a = if with_alpha {
        let alpha: f64 = parts[3].parse().map_err(|_| err())?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(err());
        }
        (alpha * 255.0).round() as u8
    } else {
        255
    };
    Ok(BoxColor { r: channel(parts[0])?, g: channel(parts[1])?, b: channel(parts[2])?, a })
}

impl FromStr for BoxColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if let Some(hex) = lowered.strip_prefix('#') {
            return parse_hex(hex, s);
        }
        if let Some(args) = lowered.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
            return parse_functional(args, true, s);
        }
        if let Some(args) = lowered.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
            return parse_functional(args, false, s);
        }
        PICKER_PALETTE
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, [r, g, b])| BoxColor::rgb(*r, *g, *b))
            .ok_or_else(|| ColorParseError(s.to_string()))
    }
}

impl Serialize for BoxColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BoxColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// How boxes are stroked. Every box uses the same style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxStyle {
    pub normal: BoxColor,
    pub selected: BoxColor,
    pub unselected: BoxColor,
    pub line_thickness: u32,
}

impl BoxStyle {
    /// A style where every state is drawn in `color`.
    pub fn uniform(color: BoxColor, line_thickness: u32) -> Self {
        BoxStyle { normal: color, selected: color, unselected: color, line_thickness }
    }

    pub fn with_color(self, color: BoxColor) -> Self {
        BoxStyle::uniform(color, self.line_thickness)
    }
}

impl Default for BoxStyle {
    fn default() -> Self {
        BoxStyle {
            normal: BoxColor::rgb(255, 225, 255),
            selected: BoxColor::rgb(0, 225, 204),
            unselected: BoxColor::rgb(100, 100, 100),
            line_thickness: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_rgba() {
        let c: BoxColor = "rgba(244, 67, 54, 0.5)".parse().unwrap();
        assert_eq!(c, BoxColor { r: 244, g: 67, b: 54, a: 128 });
    }

    #[test]
    fn parses_hex_with_and_without_alpha() {
        assert_eq!("#F44336".parse::<BoxColor>().unwrap(), BoxColor::rgb(0xf4, 0x43, 0x36));
        assert_eq!(
            "#00000080".parse::<BoxColor>().unwrap(),
            BoxColor { r: 0, g: 0, b: 0, a: 0x80 }
        );
    }

    #[test]
    fn parses_palette_names() {
        assert_eq!("teal".parse::<BoxColor>().unwrap(), BoxColor::rgb(0x00, 0x96, 0x88));
    }

    #[test]
    fn rejects_garbage() {
        assert!("rgba(1,2,3)".parse::<BoxColor>().is_err());
        assert!("rgb(300,0,0)".parse::<BoxColor>().is_err());
        assert!("rgba(1,2,3,1.5)".parse::<BoxColor>().is_err());
        assert!("#12345".parse::<BoxColor>().is_err());
        assert!("chartreuse".parse::<BoxColor>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let c = BoxColor::rgb(1, 2, 3);
        assert_eq!(c.to_string(), "rgba(1,2,3,1)");
        assert_eq!(c.to_string().parse::<BoxColor>().unwrap(), c);
    }

    #[test]
    fn with_color_sets_every_state() {
        let red = BoxColor::rgb(255, 0, 0);
        let style = BoxStyle::default().with_color(red);
        assert_eq!(style.normal, red);
        assert_eq!(style.selected, red);
        assert_eq!(style.unselected, red);
        assert_eq!(style.line_thickness, 3);
    }
}
