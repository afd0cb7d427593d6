//! Async ST7789 display driver with a single framebuffer for embassy-rp.
//!
//! The dashboard redraws at most once per poll cycle, so one 150 KiB
//! framebuffer is enough: draw into it, then [`St7789::flush`] pushes the whole
//! frame over SPI with DMA.
//!
//! Pin mapping for the Pimoroni PIM715 Display Pack 2.8":
//! - DC: GPIO16
//! - CS: GPIO17
//! - CLK: GPIO18 (SPI0 CLK)
//! - MOSI: GPIO19 (SPI0 TX)
//! - Backlight: GPIO20 (driven by the watchdog loop, not by this driver)

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Config as SpiConfig, Spi};
use embassy_time::Timer;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use solar_dash_common::config::{SCREEN_HEIGHT, SCREEN_WIDTH};

const WIDTH: usize = SCREEN_WIDTH as usize;
const HEIGHT: usize = SCREEN_HEIGHT as usize;
const BUFFER_SIZE: usize = WIDTH * HEIGHT * 2;

/// The ST7789 accepts up to 62.5 MHz.
const SPI_FREQUENCY: u32 = 62_500_000;

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

// MADCTL flags
const MADCTL_MX: u8 = 0x40;
const MADCTL_MV: u8 = 0x20;

/// Big-endian RGB565 pixels, row major.
static mut FRAMEBUFFER: [u8; BUFFER_SIZE] = [0u8; BUFFER_SIZE];

pub fn spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = SPI_FREQUENCY;
    config
}

pub struct St7789<'d> {
    spi: Spi<'d, SPI0, Async>,
    dc: Output<'d>,
    cs: Output<'d>,
    framebuffer: &'static mut [u8; BUFFER_SIZE],
}

impl<'d> St7789<'d> {
    /// Take the framebuffer and configure the panel for landscape RGB565.
    ///
    /// # Safety
    /// Must only be called once; the driver owns the static framebuffer.
    pub async unsafe fn new(
        spi: Spi<'d, SPI0, Async>,
        dc: Output<'d>,
        cs: Output<'d>,
    ) -> Self {
        // SAFETY: single call guaranteed by the caller
        let framebuffer = unsafe { &mut *core::ptr::addr_of_mut!(FRAMEBUFFER) };
        let mut display = Self { spi, dc, cs, framebuffer };
        display.init().await;
        display
    }

    async fn init(&mut self) {
        self.write_command(SWRESET).await;
        Timer::after_millis(150).await;

        self.write_command(SLPOUT).await;
        Timer::after_millis(10).await;

        self.write_command(COLMOD).await;
        self.write_data(&[0x55]).await;

        // 90° rotation (landscape)
        self.write_command(MADCTL).await;
        self.write_data(&[MADCTL_MV | MADCTL_MX]).await;

        // PIM715 panel needs inversion on
        self.write_command(INVON).await;
        Timer::after_millis(10).await;

        self.write_command(NORON).await;
        Timer::after_millis(10).await;

        self.write_command(DISPON).await;
        Timer::after_millis(10).await;

        // Every flush writes the full frame
        self.set_window(0, 0, WIDTH as u16, HEIGHT as u16).await;
    }

    async fn write_command(
        &mut self,
        cmd: u8,
    ) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.write(&[cmd]).await.ok();
        self.cs.set_high();
    }

    async fn write_data(
        &mut self,
        data: &[u8],
    ) {
        self.cs.set_low();
        self.dc.set_high();
        self.spi.write(data).await.ok();
        self.cs.set_high();
    }

    async fn set_window(
        &mut self,
        x: u16,
        y: u16,
        w: u16,
        h: u16,
    ) {
        let x1 = x + w - 1;
        let y1 = y + h - 1;

        self.write_command(CASET).await;
        self.write_data(&[(x >> 8) as u8, x as u8, (x1 >> 8) as u8, x1 as u8]).await;

        self.write_command(RASET).await;
        self.write_data(&[(y >> 8) as u8, y as u8, (y1 >> 8) as u8, y1 as u8]).await;
    }

    /// Push the framebuffer to the panel.
    pub async fn flush(&mut self) {
        self.cs.set_low();
        self.dc.set_low();
        self.spi.blocking_write(&[RAMWR]).ok();
        self.dc.set_high();
        self.spi.write(&self.framebuffer[..]).await.ok();
        self.cs.set_high();
    }

    #[inline]
    fn put(
        &mut self,
        x: usize,
        y: usize,
        color: Rgb565,
    ) {
        let idx = (y * WIDTH + x) * 2;
        let raw: RawU16 = color.into();
        self.framebuffer[idx..idx + 2].copy_from_slice(&raw.into_inner().to_be_bytes());
    }
}

impl OriginDimensions for St7789<'_> {
    fn size(&self) -> Size { Size::new(WIDTH as u32, HEIGHT as u32) }
}

impl DrawTarget for St7789<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if (0..WIDTH as i32).contains(&point.x) && (0..HEIGHT as i32).contains(&point.y) {
                self.put(point.x as usize, point.y as usize, color);
            }
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        let raw: RawU16 = color.into();
        let pixel = raw.into_inner().to_be_bytes();
        let (x0, x1) = (area.top_left.x as usize, bottom_right.x as usize);
        for y in area.rows() {
            let row = y as usize * WIDTH * 2;
            for chunk in self.framebuffer[row + x0 * 2..row + (x1 + 1) * 2].chunks_exact_mut(2) {
                chunk.copy_from_slice(&pixel);
            }
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let raw: RawU16 = color.into();
        let pixel = raw.into_inner().to_be_bytes();
        for chunk in self.framebuffer.chunks_exact_mut(2) {
            chunk.copy_from_slice(&pixel);
        }
        Ok(())
    }
}
