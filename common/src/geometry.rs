//! Dotted arc sweep and polygon vertices.
//!
//! A gauge arc is a half circle drawn clockwise from the bottom (π/2) through
//! the left to the top, one small rotated square per π/90 step. The sweep
//! covers `[π/2, π/2 + π·percent/100)`.

use core::f32::consts::{FRAC_PI_2, PI};

use embedded_graphics::prelude::Point;
use heapless::Vec;
#[cfg(not(test))]
use micromath::F32Ext;

/// Steps in a full (100%) sweep.
pub const ARC_STEPS: u32 = 90;

/// Angle between two dots.
pub const ARC_STEP: f32 = PI / ARC_STEPS as f32;

/// Angle of the first dot (straight down in screen coordinates).
pub const ARC_START: f32 = FRAC_PI_2;

/// Rotation added to every dot so its corners follow the arc.
pub const DOT_BASE_ROTATION_DEG: i32 = 45;

/// Most vertices a polygon command can have.
pub const MAX_POLYGON_SIDES: usize = 8;

/// One dot of a gauge arc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcDot {
    pub angle: f32,
    pub center: Point,
    pub rotation_deg: i32,
}

/// Number of dots for `percent`. Clamped to a full sweep; zero, negative and
/// NaN percentages draw nothing.
pub fn arc_step_count(percent: f32) -> u32 {
    if !(percent > 0.0) {
        return 0;
    }
    let percent = percent.min(100.0);
    (percent * ARC_STEPS as f32 / 100.0).ceil() as u32
}

/// Dots of an arc of `radius` around `center`.
pub fn arc_dots(
    center: Point,
    radius: u32,
    percent: f32,
) -> impl Iterator<Item = ArcDot> {
    let radius = radius as f32;
    (0..arc_step_count(percent)).map(move |step| {
        let angle = ARC_START + step as f32 * ARC_STEP;
        let offset = Point::new((radius * angle.cos()).round() as i32, (radius * angle.sin()).round() as i32);
        ArcDot { angle, center: center + offset, rotation_deg: DOT_BASE_ROTATION_DEG + (angle * 180.0 / PI).round() as i32 }
    })
}

/// Vertices of a regular polygon. Vertex `i` sits at angle
/// `rotation + i·360°/sides` on the circumscribed circle.
pub fn polygon_vertices(
    center: Point,
    sides: u8,
    radius: u32,
    rotation_deg: i32,
) -> Vec<Point, MAX_POLYGON_SIDES> {
    let mut vertices = Vec::new();
    let sides = usize::from(sides).min(MAX_POLYGON_SIDES);
    let radius = radius as f32;
    let base = rotation_deg as f32 * PI / 180.0;
    for i in 0..sides {
        let angle = base + i as f32 * 2.0 * PI / sides as f32;
        let vertex =
            center + Point::new((radius * angle.cos()).round() as i32, (radius * angle.sin()).round() as i32);
        vertices.push(vertex).ok();
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_count_clamps() {
        assert_eq!(arc_step_count(0.0), 0);
        assert_eq!(arc_step_count(-20.0), 0);
        assert_eq!(arc_step_count(f32::NAN), 0);
        assert_eq!(arc_step_count(100.0), 90);
        assert_eq!(arc_step_count(250.0), 90);
    }

    #[test]
    fn test_step_count_rounds_partial_steps_up() {
        assert_eq!(arc_step_count(1.0), 1); // 0.9 steps
        assert_eq!(arc_step_count(50.0), 45);
        assert_eq!(arc_step_count(51.0), 46); // 45.9 steps
    }

    #[test]
    fn test_dot_angles_stay_inside_sweep() {
        for percent in [1.0_f32, 12.5, 33.0, 50.0, 99.0, 100.0] {
            let end = ARC_START + PI * percent / 100.0;
            let mut last = None;
            for dot in arc_dots(Point::zero(), 30, percent) {
                assert!(dot.angle >= ARC_START);
                assert!(dot.angle < end + 1e-4, "{percent}%: {} >= {end}", dot.angle);
                if let Some(previous) = last {
                    assert!(dot.angle > previous, "angles must increase");
                }
                last = Some(dot.angle);
            }
        }
    }

    #[test]
    fn test_first_dot_below_center() {
        let dot = arc_dots(Point::new(100, 100), 30, 10.0).next().unwrap();
        assert_eq!(dot.center, Point::new(100, 130));
        assert_eq!(dot.rotation_deg, 135);
    }

    #[test]
    fn test_full_sweep_reaches_left_and_top() {
        let dots: std::vec::Vec<_> = arc_dots(Point::new(50, 50), 20, 100.0).collect();
        assert_eq!(dots.len(), 90);
        assert!(dots.iter().any(|d| d.center == Point::new(30, 50)), "passes the leftmost point");
        let last = dots.last().unwrap();
        assert!(last.center.y <= 51 && last.center.x >= 49, "ends near the top: {:?}", last.center);
    }

    #[test]
    fn test_polygon_vertices_square() {
        let vertices = polygon_vertices(Point::new(10, 10), 4, 5, 0);
        assert_eq!(vertices.as_slice(), &[Point::new(15, 10), Point::new(10, 15), Point::new(5, 10), Point::new(10, 5)]);
    }

    #[test]
    fn test_polygon_vertices_capped() {
        assert_eq!(polygon_vertices(Point::zero(), 12, 5, 0).len(), MAX_POLYGON_SIDES);
        assert!(polygon_vertices(Point::zero(), 0, 5, 0).is_empty());
    }
}
