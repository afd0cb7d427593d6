//! Current/previous snapshot pair and the refresh decision.

use crate::reading::{Timestamp, ValidatedReading};

/// What the poll task has to redraw after a reading arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshMode {
    /// Every widget.
    Full,
    /// Only the presence lamps (same timestamp as the last full refresh).
    PresenceOnly,
    /// Nothing, the reading was rejected.
    Suppressed,
}

/// What the store remembers of the last full refresh with a new timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Previous {
    pub timestamp: Timestamp,
    pub battery_per: i32,
}

impl Default for Previous {
    fn default() -> Self { Self { timestamp: Timestamp::never(), battery_per: 0 } }
}

#[derive(Clone, Debug, Default)]
pub struct SnapshotStore {
    current: Option<ValidatedReading>,
    previous: Previous,
    trend_baseline: i32,
}

impl SnapshotStore {
    pub fn new() -> Self { Self::default() }

    /// Accept a validated reading (or `None` for a rejected one) and decide
    /// the refresh mode.
    ///
    /// `previous` only moves when the timestamp changed. The battery value it
    /// held before the move becomes the trend baseline for the render.
    pub fn ingest(
        &mut self,
        candidate: Option<ValidatedReading>,
        force: bool,
    ) -> RefreshMode {
        let Some(reading) = candidate else {
            return RefreshMode::Suppressed;
        };

        let changed = reading.timestamp != self.previous.timestamp;
        let mode = if changed || force { RefreshMode::Full } else { RefreshMode::PresenceOnly };

        if mode == RefreshMode::Full {
            self.trend_baseline = self.previous.battery_per;
        }
        if changed {
            self.previous = Previous { timestamp: reading.timestamp.clone(), battery_per: reading.battery_whole() };
        }
        self.current = Some(reading);
        mode
    }

    pub fn current(&self) -> Option<&ValidatedReading> { self.current.as_ref() }

    pub fn previous(&self) -> &Previous { &self.previous }

    /// Battery percentage the trend glyph compares against.
    pub fn trend_baseline(&self) -> i32 { self.trend_baseline }
}
