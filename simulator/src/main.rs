//! Solar Dashboard Simulator for Desktop.
//!
//! Runs the dashboard core in an `embedded-graphics-simulator` window:
//! a poll thread reads the state file and produces draw commands, the UI
//! thread draws them and runs the 40 ms watchdog tick.
//!
//! # Controls
//!
//! - **Space**: the reset button (tap to peek while dark, hold 3 s to wipe
//!   the credentials file)

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod config;
mod poller;
mod source;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use solar_dash_common::colors::BLACK;
use solar_dash_common::config::{RESET_REBOOT_DELAY_MS, SCREEN_HEIGHT, SCREEN_WIDTH, WATCHDOG_PERIOD_MS};
use solar_dash_common::render;
use solar_dash_common::{BacklightState, DashboardConfig, Watchdog, WatchdogAction};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::SimConfig;
use crate::poller::{Control, Poller};

/// Batches in flight between the poll thread and the UI thread.
const BATCH_QUEUE: usize = 4;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let config = SimConfig::from_env();
    info!(telemetry = %config.telemetry.display(), poll_secs = config.poll_period.as_secs(), "simulator starting");
    let credentials_path = config.credentials.clone();

    let (batch_tx, batch_rx) = mpsc::sync_channel(BATCH_QUEUE);
    let (control_tx, control_rx) = mpsc::sync_channel(1);
    let scheduled_on = Arc::new(AtomicBool::new(true));
    let poller = Poller::new(config, batch_tx, control_rx, scheduled_on.clone()).spawn();

    let size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(size);
    let mut dark: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(size);
    display.clear(BLACK).ok();
    dark.clear(BLACK).ok();

    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Solar Dashboard Sim", &output_settings);
    window.update(&display);

    let period = Duration::from_millis(WATCHDOG_PERIOD_MS);
    let mut watchdog = Watchdog::new(&DashboardConfig::DEFAULT);
    let mut pressed = false;

    'ui: loop {
        let tick_start = Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'ui,
                SimulatorEvent::KeyDown { keycode: Keycode::Space, .. } => pressed = true,
                SimulatorEvent::KeyUp { keycode: Keycode::Space, .. } => pressed = false,
                _ => {}
            }
        }

        loop {
            match batch_rx.try_recv() {
                Ok(batch) => batch.iter().for_each(|command| render::execute(&mut display, command)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("poll thread stopped");
                    break 'ui;
                }
            }
        }

        let scheduled = BacklightState::from_on(scheduled_on.load(Ordering::Relaxed));
        let tick = watchdog.tick(pressed, scheduled);
        window.update(if tick.backlight.is_on() { &display } else { &dark });

        if tick.action == WatchdogAction::FactoryReset {
            error!("factory reset: wiping credentials");
            thread::sleep(Duration::from_millis(RESET_REBOOT_DELAY_MS));
            source::wipe_credentials(&credentials_path);
            watchdog = Watchdog::new(&DashboardConfig::DEFAULT);
            pressed = false;
            display.clear(BLACK).ok();
            if control_tx.send(Control::Restart).is_err() {
                break 'ui;
            }
        }

        thread::sleep(period.saturating_sub(tick_start.elapsed()));
    }

    drop(control_tx);
    drop(batch_rx);
    poller.join().ok();
}
