//! Gauge scale maxima and color/icon bands.
//!
//! All thresholds are compile-time constants with ordering assertions, so a
//! mistyped band (e.g. `RATE_MEDIUM_PENCE > RATE_HIGH_PENCE`) fails the build.
//! The layout table in [`crate::layout::spec`] is the only consumer.

// =============================================================================
// Gauge Maxima (value at which the dotted arc is a full half circle)
// =============================================================================

/// Array peak output in watts.
pub const SOLAR_IN_MAX_W: f64 = 5_000.0;

/// Best generation day in kWh.
pub const SOLAR_TODAY_MAX_KWH: f64 = 30.0;

/// Household consumption ceiling in watts.
pub const POWER_USED_MAX_W: f64 = 15_000.0;

/// Best export day in kWh.
pub const EXPORT_TODAY_MAX_KWH: f64 = 25.0;

/// Grid import ceiling in watts (supply fuse).
pub const GRID_IMPORT_MAX_W: f64 = 15_000.0;

/// Grid export ceiling in watts (export limit of the inverter).
pub const GRID_EXPORT_MAX_W: f64 = 5_000.0;

/// Worst import day in kWh.
pub const GRID_IN_TODAY_MAX_KWH: f64 = 40.0;

const _: () = assert!(GRID_EXPORT_MAX_W <= GRID_IMPORT_MAX_W);

// =============================================================================
// Unit Switching
// =============================================================================

/// Power values strictly above this are shown in kW.
pub const KILO_THRESHOLD_W: f64 = 1_000.0;

// =============================================================================
// Solar Icon Bands
// =============================================================================

/// Above this the solar gauge shows a full sun.
pub const SUN_FULL_W: f64 = 1_800.0;

/// Above this (and up to [`SUN_FULL_W`]) a partly cloudy sun, below a cloud.
pub const SUN_PARTIAL_W: f64 = 1_000.0;

const _: () = assert!(SUN_PARTIAL_W < SUN_FULL_W);
const _: () = assert!(SUN_FULL_W < SOLAR_IN_MAX_W);

// =============================================================================
// Agile Rate Bands (pence per kWh)
// =============================================================================

/// At or above: expensive (red).
pub const RATE_HIGH_PENCE: f64 = 15.0;

/// At or above: medium (yellow).
pub const RATE_MEDIUM_PENCE: f64 = 10.0;

/// Strictly above: cheap (green). At or below: free/negative (blue).
pub const RATE_FREE_PENCE: f64 = 0.0;

/// Telemetry carries the rate in pounds.
pub const PENCE_PER_POUND: f64 = 100.0;

const _: () = assert!(RATE_FREE_PENCE < RATE_MEDIUM_PENCE);
const _: () = assert!(RATE_MEDIUM_PENCE < RATE_HIGH_PENCE);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::assertions_on_constants)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_band_ordering() {
        assert!(RATE_FREE_PENCE < RATE_MEDIUM_PENCE);
        assert!(RATE_MEDIUM_PENCE < RATE_HIGH_PENCE);
    }

    #[test]
    fn test_solar_icon_band_ordering() {
        assert!(SUN_PARTIAL_W < SUN_FULL_W);
        assert!(SUN_FULL_W < SOLAR_IN_MAX_W);
    }

    #[test]
    fn test_kilo_switch_below_every_power_maximum() {
        for max in [SOLAR_IN_MAX_W, POWER_USED_MAX_W, GRID_IMPORT_MAX_W, GRID_EXPORT_MAX_W] {
            assert!(KILO_THRESHOLD_W < max, "kW switch must be reachable for max {max}");
        }
    }
}
