//! Horizontal placement of human-readable text.
//!
//! Each text box is anchored at its symbol-space origin and aligned within
//! its box width. Justified text is stretched to fill the box exactly by
//! adding letter tracking between characters; a single character has no gap
//! to stretch and falls back to centering.

use crate::error::RenderError;
use crate::symbol::{HumanReadableAlignment, TextBox};
use crate::text_metrics::{Font, TextBounds, TextMeasurer};
use crate::transform::Transform;
use serde::Deserialize;

/// What justified text does with its slack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JustifyMode {
    /// Spread the slack evenly across the character gaps.
    #[default]
    Tracking,
    /// Draw at natural width, left anchored.
    Natural,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPlacement {
    pub x: f64,
    pub y: f64,
    pub font: Font,
    pub bounds: TextBounds,
}

pub fn effective_alignment(text: &TextBox) -> HumanReadableAlignment {
    if text.alignment == HumanReadableAlignment::Justify && text.char_count() == 1 {
        HumanReadableAlignment::Center
    } else {
        text.alignment
    }
}

/// Tracking (in ems) that makes a run measuring `natural_width` span
/// `target_width`.
pub fn tracking_for(font: &Font, natural_width: f64, target_width: f64, chars: usize) -> f64 {
    if chars < 2 || font.size <= 0.0 {
        return 0.0;
    }
    let extra_space = target_width - natural_width;
    let extra_per_gap = extra_space / (chars - 1) as f64;
    extra_per_gap / font.size
}

pub fn layout_text(
    text: &TextBox,
    transform: &Transform,
    base_font: &Font,
    measurer: &dyn TextMeasurer,
    justify: JustifyMode,
) -> Result<TextPlacement, RenderError> {
    let alignment = effective_alignment(text);
    let box_left = transform.x(text.x);
    let box_width = transform.extent(text.width);
    let y = transform.y(text.y);

    let font = match (alignment, justify) {
        (HumanReadableAlignment::Justify, JustifyMode::Tracking) => {
            let natural = measurer.measure(base_font, &text.text)?.validate(&text.text)?;
            let tracking = tracking_for(base_font, natural.width, box_width, text.char_count());
            base_font.with_tracking(tracking)
        }
        _ => base_font.clone(),
    };
    let bounds = measurer.measure(&font, &text.text)?.validate(&text.text)?;

    let x = match alignment {
        HumanReadableAlignment::Left | HumanReadableAlignment::Justify => box_left,
        HumanReadableAlignment::Right => box_left + box_width - bounds.width,
        HumanReadableAlignment::Center => box_left + box_width / 2.0 - bounds.width / 2.0,
    };

    Ok(TextPlacement { x, y, font, bounds })
}
