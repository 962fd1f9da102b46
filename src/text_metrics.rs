use crate::error::RenderError;
use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use ttf_parser::Face;

static GLOBAL_FONT_BOOK: Lazy<FontBook> = Lazy::new(FontBook::with_system_fonts);

/// Advance used for characters the face has no glyph for, in ems.
const FALLBACK_ADVANCE_EM: f64 = 0.56;

/// A font request: family list, size in device units and letter tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f64,
    /// Extra space per inter-character gap, in ems.
    pub tracking: f64,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            tracking: 0.0,
        }
    }

    pub fn with_tracking(&self, tracking: f64) -> Self {
        Self {
            tracking,
            ..self.clone()
        }
    }

    /// Total tracking added to a run of `chars` characters.
    pub fn tracking_width(&self, chars: usize) -> f64 {
        if chars < 2 {
            return 0.0;
        }
        self.tracking * self.size * (chars - 1) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBounds {
    pub width: f64,
    pub height: f64,
    /// Distance from the top of the box down to the baseline.
    pub baseline: f64,
}

impl TextBounds {
    pub fn validate(self, text: &str) -> Result<Self, RenderError> {
        if !self.width.is_finite() || self.width < 0.0 || !self.height.is_finite() {
            return Err(RenderError::DegenerateBounds {
                text: text.to_string(),
                width: self.width,
            });
        }
        Ok(self)
    }
}

pub trait TextMeasurer {
    fn measure(&self, font: &Font, text: &str) -> Result<TextBounds, RenderError>;
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, font: &Font, text: &str) -> Result<TextBounds, RenderError> {
        (**self).measure(font, text)
    }
}

/// Deterministic measurer where every character advances by the same
/// number of ems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceMeasurer {
    pub advance_em: f64,
    pub ascent_em: f64,
    pub descent_em: f64,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self {
            advance_em: 0.6,
            ascent_em: 0.8,
            descent_em: 0.2,
        }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, font: &Font, text: &str) -> Result<TextBounds, RenderError> {
        let chars = text.chars().filter(|ch| *ch != '\n').count();
        let width = chars as f64 * self.advance_em * font.size + font.tracking_width(chars);
        TextBounds {
            width: width.max(0.0),
            height: (self.ascent_em + self.descent_em) * font.size,
            baseline: self.ascent_em * font.size,
        }
        .validate(text)
    }
}

struct FaceData {
    data: Vec<u8>,
    index: u32,
}

/// System and user fonts, resolved by family list and cached per family.
pub struct FontBook {
    db: Database,
    cache: Mutex<HashMap<String, Option<Arc<FaceData>>>>,
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_system_fonts() -> Self {
        let mut book = Self::new();
        book.db.load_system_fonts();
        book
    }

    /// Lazily initialised book holding the system fonts.
    pub fn global() -> &'static FontBook {
        &GLOBAL_FONT_BOOK
    }

    pub fn load_font_file(&mut self, path: &Path) -> Result<(), RenderError> {
        self.db.load_font_file(path)?;
        self.invalidate();
        Ok(())
    }

    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
        self.invalidate();
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Family names of every loaded face, sorted and deduplicated.
    pub fn families(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .db
            .faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn invalidate(&mut self) {
        if let Ok(cache) = self.cache.get_mut() {
            cache.clear();
        }
    }

    /// Runs `f` against the face resolved for `family`.
    pub fn with_face<T>(
        &self,
        family: &str,
        f: impl FnOnce(&Face<'_>) -> T,
    ) -> Result<T, RenderError> {
        let data = self.resolve(family)?;
        let face = Face::parse(&data.data, data.index).map_err(|_| RenderError::InvalidFont {
            family: family.to_string(),
        })?;
        Ok(f(&face))
    }

    fn resolve(&self, family: &str) -> Result<Arc<FaceData>, RenderError> {
        let key = normalize_family_key(family);
        let mut cache = self.cache.lock().map_err(|_| RenderError::FontCachePoisoned)?;
        let entry = cache
            .entry(key)
            .or_insert_with(|| self.load_face(family).map(Arc::new));
        entry.clone().ok_or_else(|| RenderError::FontNotFound {
            family: family.to_string(),
        })
    }

    fn load_face(&self, font_family: &str) -> Option<FaceData> {
        #[derive(Clone, Copy)]
        enum FamilyToken {
            Generic(Family<'static>),
            Name(usize),
        }

        let mut names: Vec<String> = Vec::new();
        let mut order: Vec<FamilyToken> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => order.push(FamilyToken::Generic(Family::Serif)),
                "sans-serif" | "sansserif" | "dialog" => {
                    order.push(FamilyToken::Generic(Family::SansSerif))
                }
                "monospace" | "monospaced" => order.push(FamilyToken::Generic(Family::Monospace)),
                "cursive" => order.push(FamilyToken::Generic(Family::Cursive)),
                "fantasy" => order.push(FamilyToken::Generic(Family::Fantasy)),
                _ => {
                    let idx = names.len();
                    names.push(raw.to_string());
                    order.push(FamilyToken::Name(idx));
                }
            }
        }
        if order.is_empty() {
            order.push(FamilyToken::Generic(Family::SansSerif));
        }

        let families: Vec<Family<'_>> = order
            .iter()
            .map(|token| match *token {
                FamilyToken::Generic(family) => family,
                FamilyToken::Name(idx) => Family::Name(names[idx].as_str()),
            })
            .collect();

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| {
                Face::parse(data, index).ok().map(|_| FaceData {
                    data: data.to_vec(),
                    index,
                })
            })
            .flatten()
    }
}

impl TextMeasurer for FontBook {
    fn measure(&self, font: &Font, text: &str) -> Result<TextBounds, RenderError> {
        let bounds = self.with_face(&font.family, |face| {
            let scale = font.size / face.units_per_em().max(1) as f64;
            let mut width = 0.0;
            let mut chars = 0usize;
            for ch in text.chars() {
                if ch == '\n' {
                    continue;
                }
                width += glyph_advance(face, ch, font.size);
                chars += 1;
            }
            width += font.tracking_width(chars);
            let ascent = face.ascender() as f64 * scale;
            let descent = face.descender() as f64 * scale;
            TextBounds {
                width: width.max(0.0),
                height: ascent - descent,
                baseline: ascent,
            }
        })?;
        bounds.validate(text)
    }
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for Arc<M> {
    fn measure(&self, font: &Font, text: &str) -> Result<TextBounds, RenderError> {
        (**self).measure(font, text)
    }
}

/// Horizontal advance of `ch` at `size`, in device units.
pub(crate) fn glyph_advance(face: &Face<'_>, ch: char, size: f64) -> f64 {
    let scale = size / face.units_per_em().max(1) as f64;
    match face
        .glyph_index(ch)
        .and_then(|glyph| face.glyph_hor_advance(glyph))
    {
        Some(advance) if advance > 0 => advance as f64 * scale,
        _ => size * FALLBACK_ADVANCE_EM,
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_advance_scales_with_size() {
        let measurer = FixedAdvanceMeasurer::default();
        let bounds = measurer.measure(&Font::new("any", 10.0), "1234").unwrap();
        assert!((bounds.width - 24.0).abs() < 1e-9);
        assert!((bounds.height - 10.0).abs() < 1e-9);
        assert!((bounds.baseline - 8.0).abs() < 1e-9);
    }

    #[test]
    fn tracking_widens_gaps_only() {
        let measurer = FixedAdvanceMeasurer::default();
        let font = Font::new("any", 10.0).with_tracking(0.5);
        let bounds = measurer.measure(&font, "1234").unwrap();
        assert!((bounds.width - (24.0 + 3.0 * 5.0)).abs() < 1e-9);
        let single = measurer.measure(&font, "1").unwrap();
        assert!((single.width - 6.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_bounds_are_rejected() {
        let bounds = TextBounds {
            width: f64::NAN,
            height: 1.0,
            baseline: 1.0,
        };
        assert!(matches!(
            bounds.validate("x"),
            Err(RenderError::DegenerateBounds { .. })
        ));
    }

    #[test]
    fn empty_book_reports_missing_font() {
        let book = FontBook::new();
        let err = book.measure(&Font::new("Helvetica", 12.0), "123").unwrap_err();
        assert!(matches!(err, RenderError::FontNotFound { ref family } if family == "Helvetica"));
    }

    #[test]
    fn unparsable_font_data_adds_no_faces() {
        let mut book = FontBook::new();
        book.load_font_data(vec![0u8; 16]);
        assert_eq!(book.face_count(), 0);
        assert!(book.families().is_empty());
    }

    #[test]
    fn family_keys_are_normalized() {
        assert_eq!(normalize_family_key("  "), "sans-serif");
        assert_eq!(normalize_family_key(" DejaVu Sans "), "dejavu sans");
    }
}
