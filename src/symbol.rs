use crate::error::RenderError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_FONT_NAME: &str = "Helvetica";
pub const DEFAULT_FONT_SIZE: f64 = 8.0;

/// One filled module (bar or square cell), in symbol units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// A closed hexagonal cell described by its six vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hexagon {
    pub points_x: [f64; 6],
    pub points_y: [f64; 6],
}

impl Hexagon {
    pub const fn new(points_x: [f64; 6], points_y: [f64; 6]) -> Self {
        Self { points_x, points_y }
    }

    /// Pointy-top hexagon centered on `(x, y)` whose vertex-to-vertex
    /// height is `diameter`.
    pub fn centered(x: f64, y: f64, diameter: f64) -> Self {
        let radius = diameter / 2.0;
        let half_width = radius * 3f64.sqrt() / 2.0;
        let offsets = [
            (0.0, -radius),
            (half_width, -radius / 2.0),
            (half_width, radius / 2.0),
            (0.0, radius),
            (-half_width, radius / 2.0),
            (-half_width, -radius / 2.0),
        ];
        let mut points_x = [0.0; 6];
        let mut points_y = [0.0; 6];
        for (idx, (dx, dy)) in offsets.iter().enumerate() {
            points_x[idx] = x + dx;
            points_y[idx] = y + dy;
        }
        Self { points_x, points_y }
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points_x.iter().copied().zip(self.points_y.iter().copied())
    }
}

/// Bounding box of one target ring, in symbol units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Ellipse {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn circle(cx: f64, cy: f64, diameter: f64) -> Self {
        let r = diameter / 2.0;
        Self::new(cx - r, cy - r, diameter, diameter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HumanReadableAlignment {
    Left,
    Right,
    #[default]
    Center,
    Justify,
}

impl HumanReadableAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::Justify => "justify",
        }
    }
}

impl FromStr for HumanReadableAlignment {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" | "centre" => Ok(Self::Center),
            "justify" => Ok(Self::Justify),
            _ => Err(RenderError::UnknownAlignment(s.to_string())),
        }
    }
}

impl fmt::Display for HumanReadableAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HumanReadableAlignment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HumanReadableAlignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Human-readable text anchored at `(x, y)` (baseline) and aligned within a
/// box `width` symbol units wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub text: String,
    #[serde(default)]
    pub alignment: HumanReadableAlignment,
}

impl TextBox {
    pub fn new(
        x: f64,
        y: f64,
        width: f64,
        text: impl Into<String>,
        alignment: HumanReadableAlignment,
    ) -> Self {
        Self {
            x,
            y,
            width,
            text: text.into(),
            alignment,
        }
    }

    /// Characters that get drawn; line breaks take no space.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|ch| *ch != '\n').count()
    }
}

/// A fully encoded symbol, ready to draw. `width` and `height` include the
/// quiet zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    #[serde(default)]
    pub quiet_zone_horizontal: f64,
    #[serde(default)]
    pub quiet_zone_vertical: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_font_name")]
    pub font_name: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub rectangles: Vec<Rectangle>,
    #[serde(default)]
    pub hexagons: Vec<Hexagon>,
    /// Concentric rings, outermost first.
    #[serde(default)]
    pub target: Vec<Ellipse>,
    #[serde(default)]
    pub texts: Vec<TextBox>,
}

fn default_font_name() -> String {
    DEFAULT_FONT_NAME.to_string()
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

impl Symbol {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            quiet_zone_horizontal: 0.0,
            quiet_zone_vertical: 0.0,
            width,
            height,
            font_name: default_font_name(),
            font_size: default_font_size(),
            rectangles: Vec::new(),
            hexagons: Vec::new(),
            target: Vec::new(),
            texts: Vec::new(),
        }
    }

    pub fn with_quiet_zone(mut self, horizontal: f64, vertical: f64) -> Self {
        self.quiet_zone_horizontal = horizontal;
        self.quiet_zone_vertical = vertical;
        self
    }

    pub fn with_font(mut self, name: impl Into<String>, size: f64) -> Self {
        self.font_name = name.into();
        self.font_size = size;
        self
    }

    pub fn push_rectangle(&mut self, rect: Rectangle) {
        self.rectangles.push(rect);
    }

    pub fn push_hexagon(&mut self, hexagon: Hexagon) {
        self.hexagons.push(hexagon);
    }

    pub fn push_ring(&mut self, ring: Ellipse) {
        self.target.push(ring);
    }

    pub fn push_text(&mut self, text: TextBox) {
        self.texts.push(text);
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Accepts either a single symbol object or an array of symbols.
    pub fn many_from_json(input: &str) -> Result<Vec<Self>, serde_json::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(Box<Symbol>),
            Many(Vec<Symbol>),
        }
        Ok(match serde_json::from_str(input)? {
            OneOrMany::One(symbol) => vec![*symbol],
            OneOrMany::Many(symbols) => symbols,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_parsing_is_strict() {
        assert_eq!(
            "JUSTIFY".parse::<HumanReadableAlignment>().unwrap(),
            HumanReadableAlignment::Justify
        );
        let err = "middle".parse::<HumanReadableAlignment>().unwrap_err();
        assert!(matches!(err, RenderError::UnknownAlignment(ref tag) if tag == "middle"));
    }

    #[test]
    fn symbol_json_applies_defaults() {
        let symbol = Symbol::from_json(
            r#"{"width": 20, "height": 10, "rectangles": [{"x": 1, "y": 2, "width": 3, "height": 4}]}"#,
        )
        .unwrap();
        assert_eq!(symbol.font_name, DEFAULT_FONT_NAME);
        assert_eq!(symbol.font_size, DEFAULT_FONT_SIZE);
        assert_eq!(symbol.quiet_zone_horizontal, 0.0);
        assert_eq!(symbol.rectangles, vec![Rectangle::new(1.0, 2.0, 3.0, 4.0)]);
    }

    #[test]
    fn unknown_alignment_fails_at_load_time() {
        let input = r#"{"width": 20, "height": 10,
            "texts": [{"x": 0, "y": 9, "width": 20, "text": "12", "alignment": "diagonal"}]}"#;
        let err = Symbol::from_json(input).unwrap_err();
        assert!(err.to_string().contains("unknown alignment: diagonal"));
    }

    #[test]
    fn many_from_json_accepts_object_or_array() {
        let one = Symbol::many_from_json(r#"{"width": 1, "height": 1}"#).unwrap();
        assert_eq!(one.len(), 1);
        let many =
            Symbol::many_from_json(r#"[{"width": 1, "height": 1}, {"width": 2, "height": 2}]"#)
                .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].width, 2.0);
    }

    #[test]
    fn centered_hexagon_is_symmetric() {
        let hex = Hexagon::centered(10.0, 10.0, 2.0);
        assert_eq!(hex.points_y[0], 9.0);
        assert_eq!(hex.points_y[3], 11.0);
        let sum_x: f64 = hex.points_x.iter().sum();
        assert!((sum_x / 6.0 - 10.0).abs() < 1e-9);
    }
}
