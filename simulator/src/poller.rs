//! Poll thread: the simulator's counterpart of the firmware poll task.
//!
//! Draw commands travel to the UI thread in batches over a bounded channel;
//! the UI thread owns the display. The scheduled backlight state is shared
//! through an atomic, the same way the firmware hands it to the watchdog loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::time::Duration;

use solar_dash_common::config::POLL_SETTLE_MS;
use solar_dash_common::{DASHBOARD, Dashboard, DashboardConfig, DrawCommand, PollOutcome, PollResult};
use solar_dash_pico2::screens;
use tracing::{error, info, warn};

use crate::config::SimConfig;
use crate::source;

pub type Batch = Vec<DrawCommand>;

/// Messages from the UI thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    /// Factory reset done; boot again.
    Restart,
}

const IP_SCREEN: Duration = Duration::from_secs(2);
const SIMULATED_ADDRESS: &str = "127.0.0.1";

pub struct Poller {
    config: SimConfig,
    batches: SyncSender<Batch>,
    control: Receiver<Control>,
    scheduled_on: Arc<AtomicBool>,
}

impl Poller {
    pub fn new(
        config: SimConfig,
        batches: SyncSender<Batch>,
        control: Receiver<Control>,
        scheduled_on: Arc<AtomicBool>,
    ) -> Self {
        Self { config, batches, control, scheduled_on }
    }

    pub fn spawn(self) -> thread::JoinHandle<()> { thread::spawn(move || self.run()) }

    /// Returns when the UI thread hangs up.
    fn run(self) {
        loop {
            let booted = self.boot();
            let control = if booted { self.poll_until_restart() } else { self.control.recv().ok() };
            match control {
                Some(Control::Restart) => info!("restarting"),
                None => return,
            }
        }
    }

    /// Startup screens. `false` when there are no usable credentials.
    fn boot(&self) -> bool {
        self.scheduled_on.store(true, Ordering::Relaxed);
        let mut batch = Batch::new();
        match source::load_credentials(&self.config.credentials) {
            Ok(credentials) => {
                info!(ssid = %credentials.ssid, host = %credentials.endpoint.host, "credentials loaded");
                screens::ip_address(&mut batch, SIMULATED_ADDRESS);
                self.send(batch);
                thread::sleep(IP_SCREEN);
                true
            }
            Err(e) => {
                error!(error = %e, "startup failed, waiting for factory reset");
                screens::setup_failed(&mut batch, "No credentials", "reprovision");
                self.send(batch);
                false
            }
        }
    }

    fn poll_until_restart(&self) -> Option<Control> {
        let mut dashboard = Dashboard::new(&DashboardConfig::DEFAULT, &DASHBOARD);
        loop {
            let mut batch = Batch::new();
            dashboard.begin_poll(&mut batch);
            self.send(batch);
            thread::sleep(Duration::from_millis(POLL_SETTLE_MS));

            let mut batch = Batch::new();
            let outcome = dashboard.complete_poll(source::fetch_state(&self.config.telemetry), &mut batch);
            self.send(batch);
            self.scheduled_on.store(dashboard.backlight().is_on(), Ordering::Relaxed);
            log_outcome(&outcome);

            match self.control.recv_timeout(self.config.poll_period) {
                Ok(control) => return Some(control),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    fn send(
        &self,
        batch: Batch,
    ) {
        // Only fails once the UI thread is gone
        self.batches.send(batch).ok();
    }
}

fn log_outcome(outcome: &PollOutcome) {
    if let Some(state) = outcome.backlight {
        info!(%state, "backlight scheduled");
    }

    match &outcome.result {
        PollResult::Failed(e) => warn!(error = %e, "fetch failed"),
        PollResult::Dark => info!("backlight off, reading skipped"),
        PollResult::Rejected(report) => {
            for e in &report.errors {
                error!(error = %e, "reading rejected");
            }
        }
        PollResult::Rendered { mode, warnings, layout, quality } => {
            for w in warnings {
                warn!(warning = %w, "reading degraded");
            }
            for issue in &layout.issues {
                warn!(%issue, "layout");
            }
            info!(?mode, quality, "refresh");
        }
    }
}
