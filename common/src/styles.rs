//! Fonts and text alignment styles shared by the renderer.
//!
//! Draw commands only carry a [`TextSize`] and an [`Align`]; the mapping to
//! real fonts lives here so the layout engine stays free of font types.

use embedded_graphics::{
    mono_font::{MonoFont, ascii::FONT_6X10},
    text::{Alignment, TextStyle, TextStyleBuilder},
};
use profont::{PROFONT_12_POINT, PROFONT_14_POINT, PROFONT_18_POINT};

use crate::layout::{Align, TextSize};

// =============================================================================
// Text Alignment Styles
// =============================================================================

/// Centered text. Gauge values, units, lamp letters.
pub const CENTERED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Center).build();

/// Left-aligned text.
pub const LEFT_ALIGNED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Left).build();

/// Right-aligned text.
pub const RIGHT_ALIGNED: TextStyle = TextStyleBuilder::new().alignment(Alignment::Right).build();

// =============================================================================
// Fonts
// =============================================================================

/// Gauge values (4 characters fit in an 80 px column).
pub const VALUE_FONT: &MonoFont<'static> = &PROFONT_18_POINT;

/// Battery percentage and agile rate.
pub const MEDIUM_FONT: &MonoFont<'static> = &PROFONT_14_POINT;

/// Clock and presence lamp letters.
pub const SMALL_FONT: &MonoFont<'static> = &PROFONT_12_POINT;

/// Unit and caption labels.
pub const LABEL_FONT: &MonoFont<'static> = &FONT_6X10;

/// Font for a draw command text size.
pub const fn font(size: TextSize) -> &'static MonoFont<'static> {
    match size {
        TextSize::Value => VALUE_FONT,
        TextSize::Medium => MEDIUM_FONT,
        TextSize::Small => SMALL_FONT,
        TextSize::Label => LABEL_FONT,
    }
}

/// Text style for a draw command alignment.
pub const fn text_style(align: Align) -> TextStyle {
    match align {
        Align::Left => LEFT_ALIGNED,
        Align::Center => CENTERED,
        Align::Right => RIGHT_ALIGNED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_font_fits_column() {
        let width = VALUE_FONT.character_size.width * 4;
        assert!(width < 80, "four value characters must fit a gauge column, got {width}");
    }

    #[test]
    fn test_sizes_strictly_shrink() {
        let heights = [TextSize::Value, TextSize::Medium, TextSize::Small, TextSize::Label]
            .map(|size| font(size).character_size.height);
        assert!(heights.windows(2).all(|w| w[0] > w[1]), "heights: {heights:?}");
    }
}
