//! Wi-Fi bring-up and the telemetry fetch.
//!
//! The CYW43439 radio sits behind PIO0 (gSPI) on the Pico 2 W:
//! PWR GPIO23, DIO GPIO24, CS GPIO25, CLK GPIO29.

use cyw43::JoinOptions;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::Peri;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_time::{Duration, Timer, with_timeout};
use embedded_io_async::Write;
use solar_dash_common::config::FETCH_TIMEOUT_SECS;
use solar_dash_common::{FetchError, RawReading, payload};
use solar_dash_pico2::Credentials;
use solar_dash_pico2::http;
use static_cell::StaticCell;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// Join attempts, one second apart, before giving up.
const JOIN_ATTEMPTS: u32 = 30;

const SOCKET_BUFFER_LEN: usize = 1024;

/// Fixed seed for the TCP sequence numbers.
const STACK_SEED: u64 = 0x5d2f_81c4_a937_0e6b;

pub struct Radio {
    pub pwr: Peri<'static, PIN_23>,
    pub dio: Peri<'static, PIN_24>,
    pub cs: Peri<'static, PIN_25>,
    pub clk: Peri<'static, PIN_29>,
    pub pio: Peri<'static, PIO0>,
    pub dma: Peri<'static, DMA_CH0>,
}

#[derive(Clone, Copy, Debug, defmt::Format)]
pub enum JoinError {
    /// Association failed on every attempt.
    Association,
}

#[embassy_executor::task]
async fn wifi_task(runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! { runner.run().await }

/// Power the radio, join the network and wait for a DHCP lease.
pub async fn connect(
    spawner: Spawner,
    radio: Radio,
    credentials: &Credentials,
) -> Result<Stack<'static>, JoinError> {
    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(radio.pwr, Level::Low);
    let cs = Output::new(radio.cs, Level::High);
    let mut pio = Pio::new(radio.pio, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        radio.dio,
        radio.clk,
        radio.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    unwrap!(spawner.spawn(wifi_task(runner)));

    control.init(clm).await;
    control.set_power_management(cyw43::PowerManagementMode::PowerSave).await;

    static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
    let (stack, runner) =
        embassy_net::new(net_device, Config::dhcpv4(Default::default()), RESOURCES.init(StackResources::new()), STACK_SEED);
    unwrap!(spawner.spawn(net_task(runner)));

    let options = || {
        if credentials.password.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(credentials.password.as_bytes())
        }
    };

    info!("Joining {}", credentials.ssid.as_str());
    let mut attempt = 0;
    loop {
        attempt += 1;
        match control.join(&credentials.ssid, options()).await {
            Ok(()) => break,
            Err(e) if attempt < JOIN_ATTEMPTS => {
                warn!("Join attempt {} failed: {}", attempt, e.status);
                Timer::after_secs(1).await;
            }
            Err(_) => return Err(JoinError::Association),
        }
    }

    info!("WiFi joined, waiting for DHCP");
    stack.wait_config_up().await;
    Ok(stack)
}

/// GET the dashboard state entity and parse its telemetry map.
///
/// `response` holds the whole HTTP response; it must fit.
pub async fn fetch_state(
    stack: Stack<'static>,
    credentials: &Credentials,
    response: &mut [u8],
) -> Result<RawReading, FetchError> {
    with_timeout(Duration::from_secs(FETCH_TIMEOUT_SECS), exchange(stack, credentials, response))
        .await
        .unwrap_or(Err(FetchError::Timeout))
}

async fn exchange(
    stack: Stack<'static>,
    credentials: &Credentials,
    response: &mut [u8],
) -> Result<RawReading, FetchError> {
    let endpoint = &credentials.endpoint;
    let request = http::state_request(credentials)?;

    let address = match stack.dns_query(&endpoint.host, DnsQueryType::A).await {
        Ok(addresses) => *addresses.first().ok_or(FetchError::Dns)?,
        Err(e) => {
            warn!("DNS lookup for {} failed: {}", endpoint.host.as_str(), e);
            return Err(FetchError::Dns);
        }
    };

    let mut rx = [0u8; SOCKET_BUFFER_LEN];
    let mut tx = [0u8; SOCKET_BUFFER_LEN];
    let mut socket = TcpSocket::new(stack, &mut rx, &mut tx);

    if let Err(e) = socket.connect((address, endpoint.port)).await {
        warn!("Connect failed: {}", e);
        return Err(FetchError::Transport);
    }
    socket.write_all(request.as_bytes()).await.map_err(|_| FetchError::Transport)?;

    // Connection: close, so the server ends the body with EOF
    let mut len = 0;
    loop {
        if len == response.len() {
            socket.abort();
            return Err(FetchError::Overflow);
        }
        match socket.read(&mut response[len..]).await {
            Ok(0) => break,
            Ok(n) => len += n,
            Err(e) => {
                warn!("Read failed after {} bytes: {}", len, e);
                return Err(FetchError::Transport);
            }
        }
    }
    socket.close();

    let body = http::response_body(&response[..len])?;
    payload::parse_state(body)
}
