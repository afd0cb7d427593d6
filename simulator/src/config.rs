//! Simulator settings from the environment.
//!
//! | Variable          | Default                       |
//! |-------------------|-------------------------------|
//! | `SIM_TELEMETRY`   | `simulator/telemetry.json`    |
//! | `SIM_CREDENTIALS` | `simulator/credentials.env`   |
//! | `SIM_POLL_SECS`   | 45 (the firmware poll period) |
//!
//! Log filtering uses `RUST_LOG` as usual.

use std::path::PathBuf;
use std::time::Duration;

use solar_dash_common::config::POLL_PERIOD_SECS;

const DEFAULT_TELEMETRY: &str = "simulator/telemetry.json";
const DEFAULT_CREDENTIALS: &str = "simulator/credentials.env";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimConfig {
    /// Home Assistant state object, re-read on every poll.
    pub telemetry: PathBuf,
    /// Stand-in for the flash credential blob; deleted by a factory reset.
    pub credentials: PathBuf,
    pub poll_period: Duration,
}

impl SimConfig {
    pub fn from_env() -> Self { Self::from_lookup(|name| std::env::var(name).ok()) }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let poll_secs = match lookup("SIM_POLL_SECS") {
            Some(value) => value.trim().parse().ok().filter(|&secs| secs > 0).unwrap_or_else(|| {
                tracing::warn!(%value, "invalid SIM_POLL_SECS, using {POLL_PERIOD_SECS}");
                POLL_PERIOD_SECS
            }),
            None => POLL_PERIOD_SECS,
        };

        Self {
            telemetry: lookup("SIM_TELEMETRY").unwrap_or_else(|| DEFAULT_TELEMETRY.into()).into(),
            credentials: lookup("SIM_CREDENTIALS").unwrap_or_else(|| DEFAULT_CREDENTIALS.into()).into(),
            poll_period: Duration::from_secs(poll_secs),
        }
    }
}
