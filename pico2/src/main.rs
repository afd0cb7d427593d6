//! Solar telemetry dashboard firmware for Raspberry Pi Pico 2 W (RP2350).
//!
//! Shows Home Assistant solar, battery and grid telemetry on the Pimoroni
//! PIM715 Display Pack 2.8".
//!
//! # Architecture
//!
//! - Startup: credentials from flash, Wi-Fi join, IP address screen
//! - Poll task: fetch the state entity every 45 s and redraw
//! - Main loop: the 40 ms watchdog tick driving the backlight pin and the
//!   long-press factory reset
//!
//! # Button Controls
//!
//! - **A** (short press while the screen is dark): light the screen for a few seconds
//! - **A** (hold 3 s): wipe the credentials and reboot

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Modules only used in the binary (not testable on host)
mod net;
mod st7789;
mod storage;
mod tasks;

use core::fmt::Write;
use core::mem::MaybeUninit;
use core::sync::atomic::Ordering;

use defmt::{error, info, unwrap};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::Spi;
use embassy_time::{Duration, Ticker, Timer};
use embedded_alloc::LlffHeap as Heap;
use heapless::String;
use solar_dash_common::config::{RESET_REBOOT_DELAY_MS, WATCHDOG_PERIOD_MS};
use solar_dash_common::render::Canvas;
use solar_dash_common::{BacklightState, DASHBOARD, Dashboard, DashboardConfig, Watchdog, WatchdogAction};
use solar_dash_pico2::{Credentials, CredentialsError, screens};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::net::{JoinError, Radio};
use crate::st7789::St7789;
use crate::storage::CredentialStore;
use crate::tasks::{BACKLIGHT_SCHEDULED, poll_task};

/// Heap for the JSON parser. One state object needs a few KiB.
const HEAP_SIZE: usize = 32 * 1024;

/// How long the IP address stays on screen.
const IP_SCREEN_MS: u64 = 2_000;

#[global_allocator]
static HEAP: Heap = Heap::empty();

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"solar-dash"),
    embassy_rp::binary_info::rp_program_description!(c"Solar telemetry dashboard on PIM715 Display"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Solar dashboard starting...");
    let p = embassy_rp::init(Default::default());

    {
        static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
        // SAFETY: called once, before the first allocation
        unsafe { HEAP.init(core::ptr::addr_of_mut!(HEAP_MEM) as usize, HEAP_SIZE) }
    }

    // PIM715 pinout: CS=17, DC=16, CLK=18, MOSI=19, Backlight=20
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let mut backlight = Output::new(p.PIN_20, Level::High);
    // DMA_CH0 belongs to the radio
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH1, st7789::spi_config());

    static DISPLAY: StaticCell<St7789<'static>> = StaticCell::new();
    // SAFETY: the only driver instance
    let display = DISPLAY.init(unsafe { St7789::new(spi, dc, cs) }.await);
    info!("Display initialized");

    // PIM715: A=12 (active-low)
    let reset_button = Input::new(p.PIN_12, Pull::Up);
    let mut store = CredentialStore::new(p.FLASH);

    let radio = Radio { pwr: p.PIN_23, dio: p.PIN_24, cs: p.PIN_25, clk: p.PIN_29, pio: p.PIO0, dma: p.DMA_CH0 };
    match start(spawner, &mut store, radio, display).await {
        Ok(()) => info!("Dashboard running"),
        // Stay in the watchdog loop so a long press can still wipe bad credentials
        Err(e) => error!("Startup failed ({}), waiting for factory reset", e),
    }

    let mut watchdog = Watchdog::new(&DashboardConfig::DEFAULT);
    let mut ticker = Ticker::every(Duration::from_millis(WATCHDOG_PERIOD_MS));
    loop {
        let scheduled = BacklightState::from_on(BACKLIGHT_SCHEDULED.load(Ordering::Relaxed));
        let tick = watchdog.tick(reset_button.is_low(), scheduled);
        backlight.set_level(if tick.backlight.is_on() { Level::High } else { Level::Low });

        if tick.action == WatchdogAction::FactoryReset {
            error!("Factory reset: wiping credentials");
            Timer::after_millis(RESET_REBOOT_DELAY_MS).await;
            store.wipe();
            cortex_m::peripheral::SCB::sys_reset();
        }

        ticker.next().await;
    }
}

#[derive(Clone, Copy, defmt::Format)]
enum StartupError {
    Credentials(CredentialsError),
    Wifi(JoinError),
}

/// Credentials, Wi-Fi, IP screen, then hand the display to the poll task.
async fn start(
    spawner: Spawner,
    store: &mut CredentialStore<'_>,
    radio: Radio,
    display: &'static mut St7789<'static>,
) -> Result<(), StartupError> {
    static CREDENTIALS: StaticCell<Credentials> = StaticCell::new();
    let credentials: &'static Credentials = match store.load() {
        Ok(credentials) => CREDENTIALS.init(credentials),
        Err(e) => {
            screens::setup_failed(&mut Canvas::new(&mut *display), "No credentials", "reprovision");
            display.flush().await;
            return Err(StartupError::Credentials(e));
        }
    };

    let stack = match net::connect(spawner, radio, credentials).await {
        Ok(stack) => stack,
        Err(e) => {
            screens::setup_failed(&mut Canvas::new(&mut *display), "No WiFi", "hold A to reset");
            display.flush().await;
            return Err(StartupError::Wifi(e));
        }
    };

    let mut address: String<16> = String::new();
    if let Some(config) = stack.config_v4() {
        write!(address, "{}", config.address.address()).ok();
    }
    info!("IP address: {}", address.as_str());
    screens::ip_address(&mut Canvas::new(&mut *display), &address);
    display.flush().await;
    Timer::after_millis(IP_SCREEN_MS).await;

    let dashboard = Dashboard::new(&DashboardConfig::DEFAULT, &DASHBOARD);
    unwrap!(spawner.spawn(poll_task(stack, credentials, display, dashboard)));
    Ok(())
}
