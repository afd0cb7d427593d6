//! Telemetry poll task.
//!
//! One cycle: draw the "checking" indicator, settle, fetch, hand the result to
//! the [`Dashboard`], flush, publish the scheduled backlight state for the
//! watchdog loop, then sleep for the poll period.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{error, info, warn};
use embassy_net::Stack;
use embassy_time::Timer;
use solar_dash_common::config::{POLL_PERIOD_SECS, POLL_SETTLE_MS};
use solar_dash_common::render::Canvas;
use solar_dash_common::{Dashboard, PollOutcome, PollResult};
use solar_dash_pico2::Credentials;

use crate::net;
use crate::st7789::St7789;

/// Scheduled backlight state, written here and read by the watchdog loop.
pub static BACKLIGHT_SCHEDULED: AtomicBool = AtomicBool::new(true);

/// Whole HTTP response, headers included.
const RESPONSE_LEN: usize = 8 * 1024;

#[embassy_executor::task]
pub async fn poll_task(
    stack: Stack<'static>,
    credentials: &'static Credentials,
    display: &'static mut St7789<'static>,
    mut dashboard: Dashboard,
) {
    info!("Poll task started");
    let mut response = [0u8; RESPONSE_LEN];

    loop {
        dashboard.begin_poll(&mut Canvas::new(&mut *display));
        display.flush().await;
        Timer::after_millis(POLL_SETTLE_MS).await;

        let fetched = net::fetch_state(stack, credentials, &mut response).await;
        let outcome = dashboard.complete_poll(fetched, &mut Canvas::new(&mut *display));
        display.flush().await;

        BACKLIGHT_SCHEDULED.store(dashboard.backlight().is_on(), Ordering::Relaxed);
        log_outcome(&outcome);

        Timer::after_secs(POLL_PERIOD_SECS).await;
    }
}

fn log_outcome(outcome: &PollOutcome) {
    if let Some(state) = outcome.backlight {
        info!("Backlight scheduled {}", state);
    }

    match &outcome.result {
        PollResult::Failed(e) => warn!("Fetch failed: {}", e),
        PollResult::Dark => info!("Backlight off, reading skipped"),
        PollResult::Rejected(report) => {
            for e in &report.errors {
                error!("Rejected: {}", e);
            }
        }
        PollResult::Rendered { mode, warnings, layout, quality } => {
            for w in warnings {
                warn!("{}", w);
            }
            for issue in &layout.issues {
                warn!("{}", issue);
            }
            info!("Refresh {} (quality {}%)", mode, quality);
        }
    }
}
