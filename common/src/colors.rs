//! Color palette for the solar dashboard.
//!
//! The panel is driven in RGB565. Palette entries are written as 8-bit RGB
//! triples and packed at compile time with [`rgb`], so the values read the
//! same as the colors picked for the gauges.

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};

/// Pack an 8-bit RGB triple into RGB565 (5/6/5 bits).
pub const fn rgb(
    r: u8,
    g: u8,
    b: u8,
) -> Rgb565 {
    Rgb565::new(r >> 3, g >> 2, b >> 3)
}

// =============================================================================
// Standard Colors
// =============================================================================

/// Background and erase color.
pub const BLACK: Rgb565 = Rgb565::BLACK;

/// Balanced grid flow and consumption values.
pub const WHITE: Rgb565 = Rgb565::WHITE;

// =============================================================================
// Chrome
// =============================================================================

/// Divider lines between gauges.
pub const DIVIDER: Rgb565 = rgb(64, 64, 64);

/// Unit and caption labels.
pub const LABEL: Rgb565 = rgb(224, 224, 224);

/// Clock in the top-left corner. Kept dim so it never competes with values.
pub const CLOCK: Rgb565 = rgb(64, 64, 64);

/// Dotted arc fill shared by every gauge.
pub const ARC: Rgb565 = rgb(0, 0, 64);

// =============================================================================
// Gauge Values and Icons
// =============================================================================

/// Solar values and the full sun icon.
pub const SOLAR: Rgb565 = rgb(255, 255, 192);

/// Partial cloud icon (some sun).
pub const SOLAR_DIM: Rgb565 = rgb(192, 192, 64);

/// Cloud icon (little or no sun).
pub const CLOUD: Rgb565 = rgb(128, 128, 128);

/// Plug icon on the consumption gauge.
pub const PLUG: Rgb565 = rgb(96, 96, 96);

/// Lightning bolt shown on grid gauges.
pub const ZAP: Rgb565 = rgb(192, 192, 192);

/// Export value (power flowing to the grid).
pub const EXPORT: Rgb565 = rgb(128, 255, 128);

/// Export arrow.
pub const EXPORT_ICON: Rgb565 = rgb(64, 192, 64);

/// Exported energy today.
pub const EXPORT_TODAY: Rgb565 = rgb(192, 255, 192);

/// Import value (power drawn from the grid).
pub const IMPORT: Rgb565 = rgb(255, 128, 128);

/// Import arrow.
pub const IMPORT_ICON: Rgb565 = rgb(192, 64, 64);

/// Imported energy today.
pub const IMPORT_TODAY: Rgb565 = rgb(255, 64, 64);

// =============================================================================
// Battery
// =============================================================================

/// Battery body.
pub const BATTERY: Rgb565 = rgb(192, 192, 255);

/// Battery percentage text.
pub const BATTERY_TEXT: Rgb565 = rgb(230, 230, 255);

/// Charge/discharge flow arrow drawn over the battery body.
pub const BATTERY_FLOW: Rgb565 = rgb(0, 0, 64);

/// Battery went down since the last full refresh.
pub const TREND_DOWN: Rgb565 = rgb(192, 64, 64);

/// Battery went up since the last full refresh.
pub const TREND_UP: Rgb565 = rgb(64, 192, 64);

/// Battery unchanged.
pub const TREND_FLAT: Rgb565 = rgb(192, 192, 192);

// =============================================================================
// Agile Rate
// =============================================================================

/// Expensive rate (15p and above).
pub const RATE_HIGH: Rgb565 = rgb(192, 64, 64);

/// Medium rate (10p to 15p).
pub const RATE_MEDIUM: Rgb565 = rgb(192, 192, 64);

/// Cheap rate (above 0p).
pub const RATE_LOW: Rgb565 = rgb(64, 192, 64);

/// Free or negative rate.
pub const RATE_NEGATIVE: Rgb565 = rgb(64, 64, 192);

/// "Power up" boost window, overrides the rate bands.
pub const RATE_BOOST: Rgb565 = rgb(192, 64, 192);

// =============================================================================
// Presence and Bins
// =============================================================================

/// Lamp of a person who is home.
pub const PRESENT: Rgb565 = rgb(128, 192, 128);

/// Lamp of a person who is away. Barely visible on black.
pub const ABSENT: Rgb565 = rgb(16, 16, 16);

pub const BIN_REFUSE: Rgb565 = rgb(96, 96, 96);
pub const BIN_RECYCLING: Rgb565 = rgb(64, 128, 255);
pub const BIN_GARDEN: Rgb565 = rgb(64, 160, 64);
pub const BIN_FOOD: Rgb565 = rgb(160, 96, 32);
pub const BIN_UNKNOWN: Rgb565 = rgb(224, 224, 224);

// =============================================================================
// Status Indicator
// =============================================================================

/// Fetch in progress.
pub const STATUS_CHECKING: Rgb565 = rgb(64, 64, 192);

/// Last fetch succeeded. Same as the background, so the dot disappears.
pub const STATUS_OK: Rgb565 = BLACK;

/// Last reading failed validation.
pub const STATUS_INVALID: Rgb565 = rgb(192, 192, 0);

/// Last fetch failed.
pub const STATUS_FAILED: Rgb565 = rgb(192, 0, 0);
