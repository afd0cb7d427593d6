//! Timing, screen and state machine configuration.
//!
//! Everything here is a compile-time constant. The values that the state
//! machines take as parameters are bundled again in [`DashboardConfig`] so the
//! simulator and the tests can run them with other settings.

// =============================================================================
// Display Configuration
// =============================================================================

/// Display width in pixels (ST7789 on Pimoroni PIM715: 320x240)
pub const SCREEN_WIDTH: u32 = 320;

/// Display height in pixels
pub const SCREEN_HEIGHT: u32 = 240;

// =============================================================================
// Poll Loop Timing
// =============================================================================

/// Pause between the end of one poll cycle and the start of the next.
pub const POLL_PERIOD_SECS: u64 = 45;

/// Pause after drawing the "checking" indicator so it is visible before the
/// fetch blocks the poll task.
pub const POLL_SETTLE_MS: u64 = 1_000;

/// Upper bound for one telemetry fetch (connect, request and response).
pub const FETCH_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Watchdog Timing
// =============================================================================

/// Button sampling period of the watchdog loop.
pub const WATCHDOG_PERIOD_MS: u64 = 40;

/// Consecutive pressed samples before the factory reset fires (75 x 40 ms = 3 s).
pub const RESET_HOLD_SAMPLES: u32 = 75;

/// Pause between wiping the credentials and the reboot.
pub const RESET_REBOOT_DELAY_MS: u64 = 2_000;

/// Peek counter value at boot. A schedule-driven switch-off lingers for
/// `PEEK_LIMIT - PEEK_INITIAL` ticks.
pub const PEEK_INITIAL: u32 = 60;

/// Peek counter value at which the forced-on backlight is released
/// (90 x 40 ms = 3.6 s after the last press).
pub const PEEK_LIMIT: u32 = 90;

const _: () = assert!(PEEK_INITIAL <= PEEK_LIMIT);
const _: () = assert!(RESET_HOLD_SAMPLES > 0);

// =============================================================================
// Backlight Schedule
// =============================================================================

/// Hour (local, from the telemetry timestamp) at which the backlight turns off.
pub const NIGHT_START_HOUR: u8 = 23;

/// Hour at which the backlight turns back on.
pub const NIGHT_END_HOUR: u8 = 5;

const _: () = assert!(NIGHT_START_HOUR < 24 && NIGHT_END_HOUR < 24);
const _: () = assert!(NIGHT_START_HOUR != NIGHT_END_HOUR);

// =============================================================================
// Telemetry Source
// =============================================================================

/// Home Assistant state path appended to the configured base URL.
pub const STATE_PATH: &str = "/api/states/input_text.solar_display_data";

/// Person codes of the presence lamps, in lamp order.
pub const PRESENCE_CODES: [char; 4] = ['j', 'B', 'C', 'L'];

/// Runtime parameters of the dashboard state machines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DashboardConfig {
    pub night_start_hour: u8,
    pub night_end_hour: u8,
    pub reset_hold_samples: u32,
    pub peek_initial: u32,
    pub peek_limit: u32,
}

impl DashboardConfig {
    /// Values used by the firmware.
    pub const DEFAULT: Self = Self {
        night_start_hour: NIGHT_START_HOUR,
        night_end_hour: NIGHT_END_HOUR,
        reset_hold_samples: RESET_HOLD_SAMPLES,
        peek_initial: PEEK_INITIAL,
        peek_limit: PEEK_LIMIT,
    };
}

impl Default for DashboardConfig {
    fn default() -> Self { Self::DEFAULT }
}
