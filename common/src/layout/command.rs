//! Draw commands emitted by the layout engine.
//!
//! Commands are plain data so the same layout can be drawn on the ST7789
//! framebuffer, shipped across a channel to the simulator window, or
//! inspected by tests.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{Point, Size},
};
use heapless::String;

/// Longest text a single command carries.
pub const LABEL_LEN: usize = 16;

pub type Label = String<LABEL_LEN>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSize {
    Value,
    Medium,
    Small,
    Label,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Glyphs drawn from primitives by [`crate::render::icons`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Icon {
    Sun,
    PartialCloud,
    Cloud,
    Plug,
    Zap,
    ArrowUp,
    ArrowDown,
    Bin,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb565),
    FillRect {
        top_left: Point,
        size: Size,
        color: Rgb565,
    },
    OutlineRect {
        top_left: Point,
        size: Size,
        color: Rgb565,
    },
    Line {
        start: Point,
        end: Point,
        color: Rgb565,
    },
    Circle {
        center: Point,
        diameter: u32,
        color: Rgb565,
        filled: bool,
    },
    /// Filled regular polygon, see [`crate::geometry::polygon_vertices`].
    Polygon {
        center: Point,
        sides: u8,
        radius: u32,
        rotation_deg: i32,
        color: Rgb565,
    },
    Text {
        text: Label,
        position: Point,
        size: TextSize,
        align: Align,
        color: Rgb565,
    },
    Icon {
        icon: Icon,
        center: Point,
        color: Rgb565,
    },
}

impl DrawCommand {
    /// Text command; text beyond [`LABEL_LEN`] is cut.
    pub fn text(
        text: &str,
        position: Point,
        size: TextSize,
        align: Align,
        color: Rgb565,
    ) -> Self {
        Self::Text { text: crate::reading::bounded(text), position, size, align, color }
    }
}

/// Receiver of draw commands, in drawing order.
pub trait CommandSink {
    fn emit(
        &mut self,
        command: DrawCommand,
    );
}

/// Fixed capacity batch. Commands past the capacity are dropped.
impl<const N: usize> CommandSink for heapless::Vec<DrawCommand, N> {
    fn emit(
        &mut self,
        command: DrawCommand,
    ) {
        self.push(command).ok();
    }
}

#[cfg(feature = "alloc")]
impl CommandSink for alloc::vec::Vec<DrawCommand> {
    fn emit(
        &mut self,
        command: DrawCommand,
    ) {
        self.push(command);
    }
}

impl<S: CommandSink + ?Sized> CommandSink for &mut S {
    fn emit(
        &mut self,
        command: DrawCommand,
    ) {
        (**self).emit(command);
    }
}
