//! Executes draw commands on an embedded-graphics target.
//!
//! [`Canvas`] is the [`CommandSink`] used on hardware: it draws every command
//! straight into the framebuffer as it is emitted. The simulator collects
//! commands first and replays them with [`execute`] on its own thread.

pub mod icons;

use embedded_graphics::{
    mono_font::MonoTextStyle,
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
    text::Text,
};

use crate::{
    geometry,
    layout::{CommandSink, DrawCommand},
    styles,
};

/// Filled regular polygon as a triangle fan around the first vertex.
pub fn fill_polygon<D>(
    display: &mut D,
    center: Point,
    sides: u8,
    radius: u32,
    rotation_deg: i32,
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    let vertices = geometry::polygon_vertices(center, sides, radius, rotation_deg);
    let style = PrimitiveStyle::with_fill(color);
    let Some((&first, rest)) = vertices.split_first() else {
        return;
    };
    for pair in rest.windows(2) {
        Triangle::new(first, pair[0], pair[1]).into_styled(style).draw(display).ok();
    }
}

/// Draw one command.
pub fn execute<D>(
    display: &mut D,
    command: &DrawCommand,
) where
    D: DrawTarget<Color = Rgb565>,
{
    match command {
        DrawCommand::Clear(color) => {
            display.clear(*color).ok();
        }
        DrawCommand::FillRect { top_left, size, color } => {
            Rectangle::new(*top_left, *size).into_styled(PrimitiveStyle::with_fill(*color)).draw(display).ok();
        }
        DrawCommand::OutlineRect { top_left, size, color } => {
            Rectangle::new(*top_left, *size).into_styled(PrimitiveStyle::with_stroke(*color, 1)).draw(display).ok();
        }
        DrawCommand::Line { start, end, color } => {
            Line::new(*start, *end).into_styled(PrimitiveStyle::with_stroke(*color, 1)).draw(display).ok();
        }
        DrawCommand::Circle { center, diameter, color, filled } => {
            let style = if *filled { PrimitiveStyle::with_fill(*color) } else { PrimitiveStyle::with_stroke(*color, 1) };
            Circle::with_center(*center, *diameter).into_styled(style).draw(display).ok();
        }
        DrawCommand::Polygon { center, sides, radius, rotation_deg, color } => {
            fill_polygon(display, *center, *sides, *radius, *rotation_deg, *color);
        }
        DrawCommand::Text { text, position, size, align, color } => {
            let style = MonoTextStyle::new(styles::font(*size), *color);
            Text::with_text_style(text, *position, style, styles::text_style(*align)).draw(display).ok();
        }
        DrawCommand::Icon { icon, center, color } => icons::draw_icon(display, *icon, *center, *color),
    }
}

/// Command sink that draws immediately.
pub struct Canvas<'a, D> {
    display: &'a mut D,
}

impl<'a, D> Canvas<'a, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(display: &'a mut D) -> Self { Self { display } }
}

impl<D> CommandSink for Canvas<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn emit(
        &mut self,
        command: DrawCommand,
    ) {
        execute(self.display, &command);
    }
}
