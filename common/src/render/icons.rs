//! Dashboard icons built from embedded-graphics primitives.
//!
//! Icons are about 20x20 pixels, centered on the given point.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, Triangle},
};

use crate::layout::Icon;

/// Sun ray segments as (inner, outer) offsets from the center.
const SUN_RAYS: [(Point, Point); 8] = [
    (Point::new(0, -7), Point::new(0, -10)),
    (Point::new(5, -5), Point::new(7, -7)),
    (Point::new(7, 0), Point::new(10, 0)),
    (Point::new(5, 5), Point::new(7, 7)),
    (Point::new(0, 7), Point::new(0, 10)),
    (Point::new(-5, 5), Point::new(-7, 7)),
    (Point::new(-7, 0), Point::new(-10, 0)),
    (Point::new(-5, -5), Point::new(-7, -7)),
];

fn disc<D>(
    display: &mut D,
    center: Point,
    diameter: u32,
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    Circle::with_center(center, diameter).into_styled(PrimitiveStyle::with_fill(color)).draw(display).ok();
}

fn block<D>(
    display: &mut D,
    top_left: Point,
    size: Size,
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(top_left, size).into_styled(PrimitiveStyle::with_fill(color)).draw(display).ok();
}

fn wedge<D>(
    display: &mut D,
    points: [Point; 3],
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    Triangle::new(points[0], points[1], points[2]).into_styled(PrimitiveStyle::with_fill(color)).draw(display).ok();
}

fn draw_sun<D>(
    display: &mut D,
    center: Point,
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    disc(display, center, 11, color);
    let stroke = PrimitiveStyle::with_stroke(color, 2);
    for (inner, outer) in SUN_RAYS {
        Line::new(center + inner, center + outer).into_styled(stroke).draw(display).ok();
    }
}

fn draw_cloud<D>(
    display: &mut D,
    center: Point,
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    disc(display, center + Point::new(-4, 1), 10, color);
    disc(display, center + Point::new(3, -1), 13, color);
    block(display, center + Point::new(-9, 2), Size::new(19, 6), color);
}

/// Draw `icon` centered on `center`.
pub fn draw_icon<D>(
    display: &mut D,
    icon: Icon,
    center: Point,
    color: Rgb565,
) where
    D: DrawTarget<Color = Rgb565>,
{
    match icon {
        Icon::Sun => draw_sun(display, center, color),
        Icon::PartialCloud => {
            // Sun disc peeking out behind the cloud, top-right
            disc(display, center + Point::new(4, -4), 11, color);
            draw_cloud(display, center + Point::new(-1, 3), color);
        }
        Icon::Cloud => draw_cloud(display, center, color),
        Icon::Plug => {
            let stroke = PrimitiveStyle::with_stroke(color, 2);
            Line::new(center + Point::new(-3, -9), center + Point::new(-3, -4)).into_styled(stroke).draw(display).ok();
            Line::new(center + Point::new(3, -9), center + Point::new(3, -4)).into_styled(stroke).draw(display).ok();
            block(display, center + Point::new(-6, -4), Size::new(13, 8), color);
            Line::new(center + Point::new(0, 4), center + Point::new(0, 10)).into_styled(stroke).draw(display).ok();
        }
        Icon::Zap => {
            wedge(display, [center + Point::new(3, -10), center + Point::new(-5, 1), center + Point::new(1, 1)], color);
            wedge(display, [center + Point::new(-1, -1), center + Point::new(5, -1), center + Point::new(-3, 10)], color);
        }
        Icon::ArrowUp => {
            wedge(display, [center + Point::new(0, -9), center + Point::new(-7, 0), center + Point::new(7, 0)], color);
            block(display, center + Point::new(-2, 0), Size::new(5, 9), color);
        }
        Icon::ArrowDown => {
            wedge(display, [center + Point::new(0, 9), center + Point::new(-7, 0), center + Point::new(7, 0)], color);
            block(display, center + Point::new(-2, -9), Size::new(5, 9), color);
        }
        Icon::Bin => {
            block(display, center + Point::new(-8, -9), Size::new(17, 3), color);
            block(display, center + Point::new(-6, -5), Size::new(13, 15), color);
            Rectangle::new(center + Point::new(-2, -11), Size::new(5, 2))
                .into_styled(PrimitiveStyle::with_stroke(color, 1))
                .draw(display)
                .ok();
        }
    }
}
