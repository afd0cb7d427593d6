//! Full-screen messages shown before the dashboard takes over.
//!
//! Built as draw commands so the same screens run on the host tests and the
//! simulator.

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use solar_dash_common::{
    CommandSink, DrawCommand,
    colors::{BLACK, IMPORT, LABEL},
    config::{SCREEN_HEIGHT, SCREEN_WIDTH},
    layout::{Align, TextSize},
};

const CENTER_X: i32 = SCREEN_WIDTH as i32 / 2;
const TITLE_POS: Point = Point::new(CENTER_X, SCREEN_HEIGHT as i32 / 2 - 16);
const DETAIL_POS: Point = Point::new(CENTER_X, SCREEN_HEIGHT as i32 / 2 + 12);

fn message<S: CommandSink + ?Sized>(
    sink: &mut S,
    title: &str,
    detail: &str,
    color: Rgb565,
) {
    sink.emit(DrawCommand::Clear(BLACK));
    sink.emit(DrawCommand::text(title, TITLE_POS, TextSize::Medium, Align::Center, color));
    sink.emit(DrawCommand::text(detail, DETAIL_POS, TextSize::Value, Align::Center, LABEL));
}

/// Address obtained by DHCP, shown once after joining the network.
pub fn ip_address<S: CommandSink + ?Sized>(
    sink: &mut S,
    address: &str,
) {
    message(sink, "WiFi connected", address, LABEL);
}

/// Startup failure. The firmware stops here until it is reprovisioned.
pub fn setup_failed<S: CommandSink + ?Sized>(
    sink: &mut S,
    title: &str,
    detail: &str,
) {
    message(sink, title, detail, IMPORT);
}

#[cfg(test)]
mod tests {
    use heapless::Vec;

    use super::*;

    fn texts(batch: &Vec<DrawCommand, 8>) -> std::vec::Vec<&str> {
        batch
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_ip_screen_clears_then_shows_address() {
        let mut batch = Vec::<DrawCommand, 8>::new();
        ip_address(&mut batch, "192.168.178.100");
        assert_eq!(batch[0], DrawCommand::Clear(BLACK));
        assert_eq!(texts(&batch), ["WiFi connected", "192.168.178.100"]);
    }

    #[test]
    fn test_failure_title_in_alert_color() {
        let mut batch = Vec::<DrawCommand, 8>::new();
        setup_failed(&mut batch, "No WiFi", "check settings");
        let DrawCommand::Text { color, .. } = &batch[1] else {
            panic!("title must be text");
        };
        assert_eq!(*color, IMPORT);
    }

    #[test]
    fn test_text_centered_on_screen() {
        let mut batch = Vec::<DrawCommand, 8>::new();
        ip_address(&mut batch, "10.0.0.2");
        for command in batch.iter().skip(1) {
            let DrawCommand::Text { position, align, .. } = command else {
                panic!("expected text");
            };
            assert_eq!(position.x, 160);
            assert_eq!(*align, Align::Center);
        }
    }
}
