//! Core of the solar telemetry dashboard.
//!
//! This crate contains everything that does not touch hardware, so it can be
//! shared between the Pico 2 W firmware and the desktop simulator and tested
//! on the host:
//!
//! - [`reading`]: Raw telemetry map and the sanitized [`ValidatedReading`]
//! - [`validation`]: Hard errors, soft warnings, sanitizing and quality score
//! - [`snapshot`]: Current/previous snapshot pair and the refresh decision
//! - [`format`]: Value stringification used by every gauge
//! - [`geometry`]: Dotted arc sweep and polygon maths
//! - [`layout`]: Declarative widget table and the layout engine
//! - [`render`]: Executes draw commands on any `DrawTarget<Color = Rgb565>`
//! - [`backlight`]: Day/night backlight schedule
//! - [`watchdog`]: Long-press factory reset and the backlight peek
//! - [`pipeline`]: One poll cycle, fetch result in, status + draw commands out
//! - [`payload`]: Home Assistant state JSON parsing (`json` feature)
//!
//! # no_std Compatibility
//!
//! The crate is `no_std` outside of tests. Payload parsing needs `alloc` for
//! `serde_json`; everything else works with fixed capacity `heapless` types.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod backlight;
pub mod colors;
pub mod config;
pub mod format;
pub mod geometry;
pub mod layout;
#[cfg(feature = "json")]
pub mod payload;
pub mod pipeline;
pub mod reading;
pub mod render;
pub mod snapshot;
pub mod status;
pub mod styles;
pub mod telemetry;
pub mod thresholds;
pub mod validation;
pub mod watchdog;

// Re-export commonly used items
pub use backlight::{BacklightScheduler, BacklightState};
pub use config::DashboardConfig;
pub use layout::{CommandSink, DASHBOARD, DashboardLayout, DrawCommand};
pub use pipeline::{Dashboard, PollOutcome, PollResult};
pub use reading::{RawReading, RawValue, ValidatedReading};
pub use snapshot::{RefreshMode, SnapshotStore};
pub use status::StatusIndicator;
pub use telemetry::FetchError;
pub use validation::{ValidationReport, quality_score, sanitize, validate};
pub use watchdog::{Watchdog, WatchdogAction, WatchdogTick};
