//! Reset button watchdog and backlight peek.
//!
//! Sampled once per watchdog tick (40 ms on the firmware). Two independent
//! counters share the button:
//!
//! - **Long press**: consecutive pressed samples. Reaching the threshold
//!   requests a factory reset; any released sample starts over.
//! - **Peek**: re-armed to zero by every pressed sample. While the schedule
//!   has the backlight off, the counter climbs once per tick and keeps the
//!   backlight forced on until it reaches its limit.

use crate::{backlight::BacklightState, config::DashboardConfig};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogAction {
    Continue,
    /// Wipe the credentials, wait, reboot.
    FactoryReset,
}

/// Result of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogTick {
    pub action: WatchdogAction,
    /// Level to drive the backlight pin to.
    pub backlight: BacklightState,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Watchdog {
    held: u32,
    hold_threshold: u32,
    peek: u32,
    peek_limit: u32,
}

impl Watchdog {
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            held: 0,
            hold_threshold: config.reset_hold_samples,
            peek: config.peek_initial,
            peek_limit: config.peek_limit,
        }
    }

    /// Consecutive pressed samples so far.
    pub fn held(&self) -> u32 { self.held }

    /// One sample of the reset button against the scheduled backlight state.
    pub fn tick(
        &mut self,
        pressed: bool,
        scheduled: BacklightState,
    ) -> WatchdogTick {
        if pressed {
            self.held = self.held.saturating_add(1);
            self.peek = 0;
        } else {
            self.held = 0;
        }

        let action = if self.held >= self.hold_threshold { WatchdogAction::FactoryReset } else { WatchdogAction::Continue };

        let backlight = match scheduled {
            BacklightState::On => BacklightState::On,
            BacklightState::Off if self.peek < self.peek_limit => {
                self.peek += 1;
                BacklightState::On
            }
            BacklightState::Off => BacklightState::Off,
        };

        WatchdogTick { action, backlight }
    }
}

impl Default for Watchdog {
    fn default() -> Self { Self::new(&DashboardConfig::DEFAULT) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PEEK_INITIAL, PEEK_LIMIT, RESET_HOLD_SAMPLES};

    #[test]
    fn test_74_presses_do_not_reset() {
        let mut watchdog = Watchdog::default();
        for _ in 0..RESET_HOLD_SAMPLES - 1 {
            assert_eq!(watchdog.tick(true, BacklightState::On).action, WatchdogAction::Continue);
        }
        assert_eq!(watchdog.held(), 74);
    }

    #[test]
    fn test_75th_press_resets() {
        let mut watchdog = Watchdog::default();
        let mut actions = (0..RESET_HOLD_SAMPLES).map(|_| watchdog.tick(true, BacklightState::On).action);
        assert!(actions.by_ref().take(74).all(|a| a == WatchdogAction::Continue));
        assert_eq!(actions.next(), Some(WatchdogAction::FactoryReset));
    }

    #[test]
    fn test_release_clears_hold() {
        let mut watchdog = Watchdog::default();
        for _ in 0..70 {
            watchdog.tick(true, BacklightState::On);
        }
        watchdog.tick(false, BacklightState::On);
        assert_eq!(watchdog.held(), 0);
        for _ in 0..74 {
            assert_eq!(watchdog.tick(true, BacklightState::On).action, WatchdogAction::Continue);
        }
    }

    #[test]
    fn test_scheduled_on_is_always_on() {
        let mut watchdog = Watchdog::default();
        for pressed in [false, true, false] {
            assert_eq!(watchdog.tick(pressed, BacklightState::On).backlight, BacklightState::On);
        }
    }

    #[test]
    fn test_schedule_off_lingers_then_goes_dark() {
        let mut watchdog = Watchdog::default();
        let linger = PEEK_LIMIT - PEEK_INITIAL;
        for tick in 0..linger {
            assert_eq!(watchdog.tick(false, BacklightState::Off).backlight, BacklightState::On, "tick {tick}");
        }
        assert_eq!(watchdog.tick(false, BacklightState::Off).backlight, BacklightState::Off);
    }

    #[test]
    fn test_press_while_dark_peeks_for_limit_ticks() {
        let mut watchdog = Watchdog::default();
        while watchdog.tick(false, BacklightState::Off).backlight.is_on() {}

        // The press itself re-arms the counter and lights the screen
        assert_eq!(watchdog.tick(true, BacklightState::Off).backlight, BacklightState::On);
        for _ in 1..PEEK_LIMIT {
            assert_eq!(watchdog.tick(false, BacklightState::Off).backlight, BacklightState::On);
        }
        assert_eq!(watchdog.tick(false, BacklightState::Off).backlight, BacklightState::Off);
    }

    #[test]
    fn test_peek_and_reset_are_independent() {
        let mut watchdog = Watchdog::default();
        let mut last = None;
        for _ in 0..RESET_HOLD_SAMPLES {
            last = Some(watchdog.tick(true, BacklightState::Off));
        }
        let last = last.unwrap();
        assert_eq!(last.action, WatchdogAction::FactoryReset);
        assert_eq!(last.backlight, BacklightState::On);
    }
}
