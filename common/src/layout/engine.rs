//! Layout engine: validated reading in, draw commands out.
//!
//! The engine is pure. It walks the [`DashboardLayout`] table, resolves each
//! widget against the reading and streams commands into a [`CommandSink`].
//! Problems it can work around (a malformed bins code) are returned in a
//! [`LayoutReport`] instead of aborting the render.

use core::{cmp::Ordering, fmt, fmt::Write};

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{Point, Size},
};
use heapless::Vec;

use super::{
    command::{Align, CommandSink, DrawCommand, Icon, Label, TextSize},
    spec::{
        ARC_CENTER, ArcStyle, BatterySpec, BinsSpec, DIVIDER_END, DIVIDER_START, DashboardLayout, GaugeSpec,
        ICON_PITCH, IconRule, IconSlot, PresenceSpec, RateSpec, Scale, UNIT_POSITION, Units, VALUE_POSITION,
        WattFormat,
    },
};
use crate::{
    colors,
    format::{self, ValueText},
    geometry,
    reading::{Switch, ValidatedReading},
    thresholds,
};

/// Most icons a gauge shows at once (direction arrow plus two fixed icons).
pub const MAX_GAUGE_ICONS: usize = 3;

// =============================================================================
// Report
// =============================================================================

/// Data problem the renderer worked around.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutIssue {
    /// Bins code whose length (in characters) is not 0, 2 or 4.
    MalformedBins(usize),
}

impl fmt::Display for LayoutIssue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MalformedBins(len) => write!(f, "malformed bins code of length {len}, bins skipped"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub issues: Vec<LayoutIssue, 4>,
}

impl LayoutReport {
    pub fn is_clean(&self) -> bool { self.issues.is_empty() }
}

// =============================================================================
// Arc
// =============================================================================

/// Dotted half-circle arc, one rotated square per step. See
/// [`geometry::arc_dots`] for the sweep.
pub fn draw_arc<S: CommandSink + ?Sized>(
    sink: &mut S,
    center: Point,
    style: &ArcStyle,
    percent: f32,
) {
    for dot in geometry::arc_dots(center, style.radius, percent) {
        sink.emit(DrawCommand::Polygon {
            center: dot.center,
            sides: 4,
            radius: style.dot,
            rotation_deg: dot.rotation_deg,
            color: style.color,
        });
    }
}

// =============================================================================
// Gauges
// =============================================================================

/// A gauge resolved against its value, before anything is drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct GaugeView {
    pub text: ValueText,
    pub unit: &'static str,
    pub value_color: Rgb565,
    /// Arc fill, may be negative or above 100.
    pub percent: f32,
    pub icons: Vec<IconSlot, MAX_GAUGE_ICONS>,
}

/// Apply scale, unit, color and icon rules of `spec` to `value`.
pub fn resolve_gauge(
    spec: &GaugeSpec,
    value: f64,
) -> GaugeView {
    let value = if spec.clamp_negative { value.max(0.0) } else { value };

    let (max, value_color, arrow, shown) = match spec.scale {
        Scale::Fixed { max, value_color } => (max, value_color, None, value),
        Scale::NetFlow(flow) => {
            let (style, magnitude) = if value > 0.0 {
                (flow.export, value)
            } else if value < 0.0 {
                (flow.import, -value)
            } else {
                (flow.balanced, 0.0)
            };
            (style.max, style.value_color, style.arrow, magnitude)
        }
    };

    let mut percent = shown / max * 100.0;
    if spec.whole_percent {
        percent = (percent as i64) as f64;
    }

    let (text, unit) = match spec.units {
        Units::Power(_) if shown > thresholds::KILO_THRESHOLD_W => (format::truncated(shown / 1000.0), "kW"),
        Units::Power(WattFormat::Rounded) => (format::rounded(shown), "W"),
        Units::Power(WattFormat::IntegerPart) => (format::integer_part(shown), "W"),
        Units::Energy => (format::truncated(shown), "kWh"),
    };

    let mut icons = Vec::new();
    if let Some(arrow) = arrow {
        icons.push(arrow).ok();
    }
    match spec.icons {
        IconRule::Fixed(slots) => {
            for slot in slots {
                icons.push(*slot).ok();
            }
        }
        IconRule::Levels(table) => {
            icons.push(table.select(shown)).ok();
        }
    }

    GaugeView { text, unit, value_color, percent: percent as f32, icons }
}

/// Centers of `count` icons stacked vertically around `center`.
fn icon_center(
    center: Point,
    index: usize,
    count: usize,
) -> Point {
    let offset = (2 * index as i32 - (count as i32 - 1)) * ICON_PITCH / 2;
    center + Point::new(0, offset)
}

fn draw_gauge<S: CommandSink + ?Sized>(
    sink: &mut S,
    spec: &GaugeSpec,
    value: f64,
) {
    let view = resolve_gauge(spec, value);
    let origin = spec.origin;
    let center = origin + ARC_CENTER;

    draw_arc(sink, center, &spec.arc, view.percent);

    for (index, slot) in view.icons.iter().enumerate() {
        sink.emit(DrawCommand::Icon {
            icon: slot.icon,
            center: icon_center(center, index, view.icons.len()),
            color: slot.color,
        });
    }

    sink.emit(DrawCommand::text(&view.text, origin + VALUE_POSITION, TextSize::Value, Align::Center, view.value_color));
    sink.emit(DrawCommand::Line { start: origin + DIVIDER_START, end: origin + DIVIDER_END, color: colors::DIVIDER });

    let mut unit = Label::new();
    write!(unit, "{} {}", view.unit, spec.caption).ok();
    sink.emit(DrawCommand::Text {
        text: unit,
        position: origin + UNIT_POSITION,
        size: TextSize::Label,
        align: Align::Center,
        color: colors::LABEL,
    });
}

// =============================================================================
// Battery
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trend {
    Down,
    Up,
    Flat,
}

/// Compare the whole battery percentage with the baseline of the last full
/// refresh.
pub fn battery_trend(
    current: i32,
    baseline: i32,
) -> Trend {
    match current.cmp(&baseline) {
        Ordering::Less => Trend::Down,
        Ordering::Greater => Trend::Up,
        Ordering::Equal => Trend::Flat,
    }
}

fn fill(
    (top_left, size): (Point, Size),
    color: Rgb565,
) -> DrawCommand {
    DrawCommand::FillRect { top_left, size, color }
}

fn triangle(
    center: Point,
    radius: u32,
    rotation_deg: i32,
    color: Rgb565,
) -> DrawCommand {
    DrawCommand::Polygon { center, sides: 3, radius, rotation_deg, color }
}

fn draw_battery<S: CommandSink + ?Sized>(
    sink: &mut S,
    spec: &BatterySpec,
    reading: &ValidatedReading,
    baseline: i32,
) {
    let percent = reading.battery_per;

    sink.emit(fill(spec.nub, spec.body_color));
    sink.emit(fill(spec.body, spec.body_color));

    let (cells_origin, cells_size) = spec.cells;
    let charged = (f64::from(cells_size.width) * percent.clamp(0.0, 100.0) / 100.0) as u32;
    let drained = cells_size.width.saturating_sub(charged);
    if drained > 0 {
        sink.emit(fill((cells_origin, Size::new(drained, cells_size.height)), colors::BLACK));
    }

    let mut text = Label::new();
    write!(text, "{}%", format::integer_part(percent)).ok();
    sink.emit(DrawCommand::Text {
        text,
        position: spec.text_position,
        size: TextSize::Medium,
        align: Align::Center,
        color: spec.text_color,
    });

    let trend = match battery_trend(reading.battery_whole(), baseline) {
        Trend::Down => triangle(spec.trend_center, spec.trend_radius, 90, colors::TREND_DOWN),
        Trend::Up => triangle(spec.trend_center, spec.trend_radius, 270, colors::TREND_UP),
        Trend::Flat => {
            let r = spec.trend_radius as i32;
            fill(
                (spec.trend_center - Point::new(r, 2), Size::new(spec.trend_radius * 2, 4)),
                colors::TREND_FLAT,
            )
        }
    };
    sink.emit(trend);

    let arrow_radius = spec.flow_bar.1.height * 2;
    if reading.solis_discharging == Some(Switch::On) {
        sink.emit(triangle(spec.discharge_arrow, arrow_radius, 180, spec.flow_color));
        sink.emit(fill(spec.flow_bar, spec.flow_color));
    }
    if reading.solis_charging == Some(Switch::On) {
        sink.emit(triangle(spec.charge_arrow, arrow_radius, 0, spec.flow_color));
        sink.emit(fill(spec.flow_bar, spec.flow_color));
    }
}

// =============================================================================
// Rate, Clock
// =============================================================================

/// Text and color of the agile rate. The boost window overrides the bands.
pub fn resolve_rate(
    spec: &RateSpec,
    reading: &ValidatedReading,
) -> (ValueText, Rgb565) {
    let pence = reading.cur_rate * thresholds::PENCE_PER_POUND;
    let color = if reading.is_boost() { spec.boost_color } else { spec.colors.select(pence) };
    (format::fixed2(pence, "p"), color)
}

fn draw_rate<S: CommandSink + ?Sized>(
    sink: &mut S,
    spec: &RateSpec,
    reading: &ValidatedReading,
) {
    let (text, color) = resolve_rate(spec, reading);
    sink.emit(DrawCommand::text(&text, spec.position, TextSize::Medium, Align::Center, color));
    if reading.is_boost() {
        let (top_left, size) = spec.boost_outline;
        sink.emit(DrawCommand::OutlineRect { top_left, size, color });
    }
}

// =============================================================================
// Presence, Bins
// =============================================================================

fn draw_presence<S: CommandSink + ?Sized>(
    sink: &mut S,
    spec: &PresenceSpec,
    presence: &str,
) {
    for (code, center) in spec.codes.iter().zip(spec.centers) {
        let color = if presence.contains(*code) { spec.present } else { spec.absent };
        sink.emit(DrawCommand::Circle { center, diameter: spec.diameter, color, filled: false });
        let mut letter = Label::new();
        letter.push(*code).ok();
        sink.emit(DrawCommand::Text {
            text: letter,
            position: center + spec.letter_offset,
            size: TextSize::Small,
            align: Align::Center,
            color,
        });
    }
}

fn bin_color(
    spec: &BinsSpec,
    code: &str,
) -> Rgb565 {
    spec.kinds.iter().find(|kind| kind.code == code).map_or(spec.unknown, |kind| kind.color)
}

fn draw_bins<S: CommandSink + ?Sized>(
    sink: &mut S,
    spec: &BinsSpec,
    bins: &str,
) -> Option<LayoutIssue> {
    let len = bins.chars().count();
    let split = bins.char_indices().nth(2).map_or(bins.len(), |(index, _)| index);
    let (first, second) = bins.split_at(split);
    let half = spec.spacing / 2;

    let placed: [(&str, i32); 2] = match len {
        0 => return None,
        2 => [(first, 0), ("", 0)],
        4 => [(first, -half), (second, half)],
        _ => return Some(LayoutIssue::MalformedBins(len)),
    };
    for (code, dx) in placed.into_iter().filter(|(code, _)| !code.is_empty()) {
        sink.emit(DrawCommand::Icon { icon: Icon::Bin, center: spec.center + Point::new(dx, 0), color: bin_color(spec, code) });
    }
    None
}

// =============================================================================
// Entry Points
// =============================================================================

/// Clear the screen and draw every widget.
pub fn render_full<S: CommandSink + ?Sized>(
    layout: &DashboardLayout,
    reading: &ValidatedReading,
    trend_baseline: i32,
    sink: &mut S,
) -> LayoutReport {
    let mut report = LayoutReport::default();

    sink.emit(DrawCommand::Clear(colors::BLACK));
    for &(start, end) in layout.dividers {
        sink.emit(DrawCommand::Line { start, end, color: layout.divider_color });
    }

    for gauge in layout.gauges {
        draw_gauge(sink, gauge, reading.numeric(gauge.field));
    }

    if let Some(clock) = reading.timestamp.clock() {
        sink.emit(DrawCommand::text(clock, layout.clock.position, TextSize::Small, Align::Center, layout.clock.color));
    }
    draw_battery(sink, &layout.battery, reading, trend_baseline);
    draw_rate(sink, &layout.rate, reading);
    draw_presence(sink, &layout.presence, &reading.presence);

    if let Some(bins) = &reading.bins {
        if let Some(issue) = draw_bins(sink, &layout.bins, bins) {
            report.issues.push(issue).ok();
        }
    }

    report
}

/// Redraw only the presence lamps. Lamps are drawn over themselves, so no
/// clearing is needed.
pub fn render_presence<S: CommandSink + ?Sized>(
    layout: &DashboardLayout,
    reading: &ValidatedReading,
    sink: &mut S,
) {
    draw_presence(sink, &layout.presence, &reading.presence);
}

// =============================================================================
// Unit Tests
// =============================================================================
