//! Day/night backlight schedule.
//!
//! The schedule is driven by the telemetry timestamp rather than a local
//! clock. It flips only when the hour string equals one of the two configured
//! hours exactly, so a reading that skips the hour (a long outage) keeps the
//! current state until the next matching one.

use core::fmt;

use heapless::String;

use crate::{config::DashboardConfig, reading::Timestamp};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BacklightState {
    On,
    Off,
}

impl BacklightState {
    pub const fn is_on(self) -> bool { matches!(self, Self::On) }

    pub const fn from_on(on: bool) -> Self { if on { Self::On } else { Self::Off } }
}

impl fmt::Display for BacklightState {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(if self.is_on() { "on" } else { "off" })
    }
}

/// Zero-padded two digit hour, as it appears after the `T`.
fn hour_code(hour: u8) -> String<2> {
    let mut code = String::new();
    code.push(char::from(b'0' + hour / 10 % 10)).ok();
    code.push(char::from(b'0' + hour % 10)).ok();
    code
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacklightScheduler {
    state: BacklightState,
    off_at: String<2>,
    on_at: String<2>,
}

impl BacklightScheduler {
    /// Starts `On`.
    pub fn new(config: &DashboardConfig) -> Self {
        Self {
            state: BacklightState::On,
            off_at: hour_code(config.night_start_hour),
            on_at: hour_code(config.night_end_hour),
        }
    }

    pub fn state(&self) -> BacklightState { self.state }

    /// Feed the timestamp of a fetched reading. Returns the new state when it
    /// changed.
    pub fn observe(
        &mut self,
        timestamp: &Timestamp,
    ) -> Option<BacklightState> {
        let hour = timestamp.hour()?;
        let next = match self.state {
            BacklightState::Off if hour == self.on_at.as_str() => BacklightState::On,
            BacklightState::On if hour == self.off_at.as_str() => BacklightState::Off,
            _ => return None,
        };
        self.state = next;
        Some(next)
    }
}

impl Default for BacklightScheduler {
    fn default() -> Self { Self::new(&DashboardConfig::DEFAULT) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: &str) -> Timestamp {
        let mut text: heapless::String<32> = heapless::String::try_from("2024-06-01T").unwrap();
        text.push_str(hour).unwrap();
        text.push_str(":15:00").unwrap();
        Timestamp::new(&text)
    }

    #[test]
    fn test_hour_code_zero_padded() {
        assert_eq!(hour_code(5).as_str(), "05");
        assert_eq!(hour_code(23).as_str(), "23");
        assert_eq!(hour_code(0).as_str(), "00");
    }

    #[test]
    fn test_starts_on() {
        assert_eq!(BacklightScheduler::default().state(), BacklightState::On);
    }

    #[test]
    fn test_night_cycle() {
        let mut scheduler = BacklightScheduler::default();
        assert_eq!(scheduler.observe(&at("22")), None);
        assert_eq!(scheduler.observe(&at("23")), Some(BacklightState::Off));
        assert_eq!(scheduler.observe(&at("23")), None, "already off");
        assert_eq!(scheduler.observe(&at("03")), None);
        assert_eq!(scheduler.observe(&at("05")), Some(BacklightState::On));
        assert_eq!(scheduler.state(), BacklightState::On);
    }

    #[test]
    fn test_equality_not_range() {
        let mut scheduler = BacklightScheduler::default();
        // Past the start hour without ever seeing it
        assert_eq!(scheduler.observe(&at("00")), None);
        assert_eq!(scheduler.state(), BacklightState::On);
        assert_eq!(scheduler.observe(&at("5")), None, "single digit hour never matches");
    }

    #[test]
    fn test_unusable_timestamp_keeps_state() {
        let mut scheduler = BacklightScheduler::default();
        assert_eq!(scheduler.observe(&Timestamp::default()), None);
        assert_eq!(scheduler.observe(&Timestamp::new("2024-06-01")), None);
        assert_eq!(scheduler.state(), BacklightState::On);
    }

    #[test]
    fn test_custom_hours() {
        let config = DashboardConfig { night_start_hour: 21, night_end_hour: 7, ..DashboardConfig::DEFAULT };
        let mut scheduler = BacklightScheduler::new(&config);
        assert_eq!(scheduler.observe(&at("23")), None);
        assert_eq!(scheduler.observe(&at("21")), Some(BacklightState::Off));
        assert_eq!(scheduler.observe(&at("07")), Some(BacklightState::On));
    }
}
