//! One poll cycle of the dashboard.
//!
//! The poll task owns a [`Dashboard`] and drives it in two steps around the
//! fetch:
//!
//! 1. [`Dashboard::begin_poll`] draws the "checking" indicator.
//! 2. [`Dashboard::complete_poll`] takes the fetch result, updates the
//!    backlight schedule, validates, decides the refresh mode and draws.
//!
//! Both steps only emit draw commands; the caller decides where they go and
//! logs the returned [`PollOutcome`].

use heapless::Vec;

use crate::{
    backlight::{BacklightScheduler, BacklightState},
    config::DashboardConfig,
    layout::{self, CommandSink, DashboardLayout, LayoutReport},
    reading::{RawReading, RawValue, TIMESTAMP, Timestamp},
    snapshot::{RefreshMode, SnapshotStore},
    status::StatusIndicator,
    telemetry::FetchError,
    validation::{self, MAX_WARNINGS, ValidationReport, ValidationWarning},
};

#[derive(Clone, Debug, PartialEq)]
pub enum PollResult {
    /// Nothing usable was fetched; the screen keeps the last render.
    Failed(FetchError),
    /// Fetched while the backlight is off. Not validated, not drawn.
    Dark,
    /// Fetched but failed validation; the screen keeps the last render.
    Rejected(ValidationReport),
    Rendered {
        mode: RefreshMode,
        warnings: Vec<ValidationWarning, MAX_WARNINGS>,
        layout: LayoutReport,
        quality: u8,
    },
}

/// Everything a poll cycle did, for logging.
#[derive(Clone, Debug, PartialEq)]
pub struct PollOutcome {
    /// Last status drawn.
    pub status: StatusIndicator,
    /// New backlight state when the schedule flipped.
    pub backlight: Option<BacklightState>,
    pub result: PollResult,
}

pub struct Dashboard {
    layout: &'static DashboardLayout,
    store: SnapshotStore,
    backlight: BacklightScheduler,
    force_full: bool,
}

impl Dashboard {
    /// The first accepted reading is always drawn in full.
    pub fn new(
        config: &DashboardConfig,
        layout: &'static DashboardLayout,
    ) -> Self {
        Self { layout, store: SnapshotStore::new(), backlight: BacklightScheduler::new(config), force_full: true }
    }

    pub fn backlight(&self) -> BacklightState { self.backlight.state() }

    pub fn store(&self) -> &SnapshotStore { &self.store }

    fn status<S: CommandSink + ?Sized>(
        &self,
        sink: &mut S,
        status: StatusIndicator,
    ) {
        sink.emit(status.command(&self.layout.status));
    }

    pub fn begin_poll<S: CommandSink + ?Sized>(
        &self,
        sink: &mut S,
    ) {
        self.status(sink, StatusIndicator::Checking);
    }

    pub fn complete_poll<S: CommandSink + ?Sized>(
        &mut self,
        fetched: Result<RawReading, FetchError>,
        sink: &mut S,
    ) -> PollOutcome {
        let raw = match fetched.and_then(|raw| if raw.contains(TIMESTAMP) { Ok(raw) } else { Err(FetchError::NoData) })
        {
            Ok(raw) => raw,
            Err(error) => {
                self.status(sink, StatusIndicator::Failed);
                return PollOutcome { status: StatusIndicator::Failed, backlight: None, result: PollResult::Failed(error) };
            }
        };
        self.status(sink, StatusIndicator::Ok);

        let timestamp = raw.get(TIMESTAMP).and_then(RawValue::as_text).map(Timestamp::new).unwrap_or_default();
        let backlight = self.backlight.observe(&timestamp);
        if !self.backlight.state().is_on() {
            return PollOutcome { status: StatusIndicator::Ok, backlight, result: PollResult::Dark };
        }

        let report = validation::validate(&raw);
        if !report.is_valid() {
            self.store.ingest(None, self.force_full);
            self.status(sink, StatusIndicator::Invalid);
            return PollOutcome { status: StatusIndicator::Invalid, backlight, result: PollResult::Rejected(report) };
        }

        let quality = validation::quality_score(&raw);
        let mode = self.store.ingest(Some(validation::sanitize(&raw)), self.force_full);
        self.force_full = false;

        let mut layout_report = LayoutReport::default();
        if let Some(reading) = self.store.current() {
            match mode {
                RefreshMode::Full => {
                    layout_report = layout::render_full(self.layout, reading, self.store.trend_baseline(), sink);
                    // The clear wiped the indicator
                    self.status(sink, StatusIndicator::Ok);
                }
                RefreshMode::PresenceOnly => layout::render_presence(self.layout, reading, sink),
                RefreshMode::Suppressed => {}
            }
        }

        PollOutcome {
            status: StatusIndicator::Ok,
            backlight,
            result: PollResult::Rendered { mode, warnings: report.warnings, layout: layout_report, quality },
        }
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::pixelcolor::Rgb565;

    use super::*;
    use crate::{
        colors,
        layout::{DASHBOARD, DrawCommand},
        reading::NumericField,
        validation::ValidationError,
    };

    type Batch = Vec<DrawCommand, 1024>;

    fn raw(timestamp: &str) -> RawReading {
        let mut raw = RawReading::new();
        for field in NumericField::ALL {
            raw.insert(field.key(), RawValue::Number(42.0));
        }
        raw.insert("presence", RawValue::text("j"));
        raw.insert(TIMESTAMP, RawValue::text(timestamp));
        raw
    }

    fn statuses(batch: &Batch) -> std::vec::Vec<Rgb565> {
        batch
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { top_left, color, .. } if *top_left == DASHBOARD.status.top_left => Some(*color),
                _ => None,
            })
            .collect()
    }

    fn poll(
        dashboard: &mut Dashboard,
        fetched: Result<RawReading, FetchError>,
    ) -> (PollOutcome, Batch) {
        let mut batch = Batch::new();
        dashboard.begin_poll(&mut batch);
        let outcome = dashboard.complete_poll(fetched, &mut batch);
        (outcome, batch)
    }

    fn dashboard() -> Dashboard { Dashboard::new(&DashboardConfig::DEFAULT, &DASHBOARD) }

    #[test]
    fn test_first_reading_renders_full() {
        let mut dashboard = dashboard();
        let (outcome, batch) = poll(&mut dashboard, Ok(raw("2024-06-01T10:00:00")));
        assert!(matches!(outcome.result, PollResult::Rendered { mode: RefreshMode::Full, quality: 100, .. }));
        assert!(batch.iter().any(|c| matches!(c, DrawCommand::Clear(_))));
        assert_eq!(statuses(&batch), [colors::STATUS_CHECKING, colors::STATUS_OK, colors::STATUS_OK]);
    }

    #[test]
    fn test_same_timestamp_updates_presence_only() {
        let mut dashboard = dashboard();
        poll(&mut dashboard, Ok(raw("2024-06-01T10:00:00")));
        let (outcome, batch) = poll(&mut dashboard, Ok(raw("2024-06-01T10:00:00")));
        assert!(matches!(outcome.result, PollResult::Rendered { mode: RefreshMode::PresenceOnly, .. }));
        assert!(!batch.iter().any(|c| matches!(c, DrawCommand::Clear(_))));
    }

    #[test]
    fn test_transport_failure_keeps_screen() {
        let mut dashboard = dashboard();
        let (outcome, batch) = poll(&mut dashboard, Err(FetchError::Timeout));
        assert_eq!(outcome.result, PollResult::Failed(FetchError::Timeout));
        assert_eq!(statuses(&batch), [colors::STATUS_CHECKING, colors::STATUS_FAILED]);
        assert_eq!(batch.len(), 2, "only the indicator is drawn");
    }

    #[test]
    fn test_missing_timestamp_is_failure() {
        let mut dashboard = dashboard();
        let mut reading = RawReading::new();
        reading.insert("solar_in", RawValue::Number(1.0));
        let (outcome, _) = poll(&mut dashboard, Ok(reading));
        assert_eq!(outcome.result, PollResult::Failed(FetchError::NoData));
    }

    #[test]
    fn test_invalid_reading_keeps_screen_and_snapshot() {
        let mut dashboard = dashboard();
        poll(&mut dashboard, Ok(raw("2024-06-01T10:00:00")));
        let mut bad = raw("2024-06-01T10:01:00");
        bad.insert("battery_per", RawValue::text("unknown"));
        let (outcome, batch) = poll(&mut dashboard, Ok(bad));
        assert!(matches!(outcome.result, PollResult::Rejected(ref report) if report.errors.len() == 1));
        assert_eq!(outcome.status, StatusIndicator::Invalid);
        assert_eq!(statuses(&batch), [colors::STATUS_CHECKING, colors::STATUS_OK, colors::STATUS_INVALID]);
        assert_eq!(dashboard.store().previous().timestamp.as_str(), "2024-06-01T10:00:00");
    }

    #[test]
    fn test_unknown_grid_reading_on_fresh_dashboard_is_rejected() {
        let mut reading = RawReading::new();
        reading.insert("grid_in", RawValue::text("unknown"));
        reading.insert("solar_in", RawValue::Number(1200.0));
        reading.insert("power_used", RawValue::Number(3000.0));
        reading.insert("battery_per", RawValue::Number(80.0));
        reading.insert("solar_today", RawValue::Number(4.2));
        reading.insert("export_today", RawValue::Number(-0.1));
        reading.insert("grid_in_today", RawValue::Number(2.0));
        reading.insert("cur_rate", RawValue::Number(0.12));
        reading.insert(TIMESTAMP, RawValue::text("2024-01-01T12:00:00"));

        let mut dashboard = dashboard();
        let (outcome, batch) = poll(&mut dashboard, Ok(reading));
        let PollResult::Rejected(report) = &outcome.result else {
            panic!("expected a rejection, got {:?}", outcome.result);
        };
        assert!(!report.is_valid());
        assert_eq!(
            report.errors.as_slice(),
            &[ValidationError::InvalidCritical { field: NumericField::GridIn, value: RawValue::text("unknown") }]
        );
        assert_eq!(outcome.status, StatusIndicator::Invalid);
        assert!(!batch.iter().any(|c| matches!(c, DrawCommand::Clear(_))), "render suppressed");
        assert_eq!(statuses(&batch).last(), Some(&colors::STATUS_INVALID));
        assert!(dashboard.store().current().is_none());
        assert_eq!(dashboard.store().previous().timestamp.as_str(), "0");
    }

    #[test]
    fn test_night_suppresses_rendering() {
        let mut dashboard = dashboard();
        let (outcome, batch) = poll(&mut dashboard, Ok(raw("2024-06-01T23:00:00")));
        assert_eq!(outcome.backlight, Some(BacklightState::Off));
        assert_eq!(outcome.result, PollResult::Dark);
        assert!(!batch.iter().any(|c| matches!(c, DrawCommand::Clear(_))));
        assert!(dashboard.store().current().is_none());

        let (outcome, _) = poll(&mut dashboard, Ok(raw("2024-06-02T05:00:00")));
        assert_eq!(outcome.backlight, Some(BacklightState::On));
        assert!(matches!(outcome.result, PollResult::Rendered { mode: RefreshMode::Full, .. }));
    }

    #[test]
    fn test_warnings_are_reported_not_rejected() {
        let mut dashboard = dashboard();
        let mut reading = raw("2024-06-01T10:00:00");
        reading.insert("car_charging", RawValue::text("Paused"));
        let (outcome, _) = poll(&mut dashboard, Ok(reading));
        let PollResult::Rendered { warnings, .. } = outcome.result else {
            panic!("warnings must not reject the reading");
        };
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_malformed_bins_reported() {
        let mut dashboard = dashboard();
        let mut reading = raw("2024-06-01T10:00:00");
        reading.insert("bins", RawValue::text("RCGDX"));
        let (outcome, _) = poll(&mut dashboard, Ok(reading));
        let PollResult::Rendered { layout: report, .. } = outcome.result else {
            panic!("expected a render");
        };
        assert_eq!(report.issues.as_slice(), &[layout::LayoutIssue::MalformedBins(5)]);
    }
}
