//! Declarative widget table.
//!
//! The screen is a fixed 320x240 landscape layout:
//!
//! ```text
//! +--------+---------+---------+---------+
//! | clock  | solar   | power   | grid    |
//! | battery| now     | used    | flow    |
//! | rate   |         |         |         |
//! +  lamps +---------+---------+---------+
//! |        | solar   | export  | import  |
//! | bins   | today   | today   | today   |
//! +--------+---------+---------+---------+
//! ```
//!
//! Every gauge cell is 80x120 and laid out the same way: dotted arc with the
//! icons in its middle, value text, divider, unit and caption. What differs
//! between gauges lives in [`GaugeSpec`], so one renderer draws all of them.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::{Point, Size},
};

use super::command::Icon;
use crate::{colors, config, reading::NumericField, thresholds};

// =============================================================================
// Threshold Tables
// =============================================================================

/// Lower bound of one band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bound {
    /// `value > limit`
    Above(f64),
    /// `value >= limit`
    AtLeast(f64),
}

impl Bound {
    pub fn admits(
        self,
        value: f64,
    ) -> bool {
        match self {
            Self::Above(limit) => value > limit,
            Self::AtLeast(limit) => value >= limit,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Band<T> {
    pub bound: Bound,
    pub value: T,
}

/// Ordered bands, highest first. The first band whose bound admits the value
/// wins; `otherwise` covers everything below the last band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdTable<T: 'static> {
    pub bands: &'static [Band<T>],
    pub otherwise: T,
}

impl<T: Copy> ThresholdTable<T> {
    pub fn select(
        &self,
        value: f64,
    ) -> T {
        self.bands.iter().find(|band| band.bound.admits(value)).map_or(self.otherwise, |band| band.value)
    }
}

// =============================================================================
// Gauge Spec
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconSlot {
    pub icon: Icon,
    pub color: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum IconRule {
    /// Always the same icons, top to bottom.
    Fixed(&'static [IconSlot]),
    /// One icon picked by the gauge value.
    Levels(ThresholdTable<IconSlot>),
}

/// How sub-kilowatt power is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WattFormat {
    /// `{:.0}`
    Rounded,
    /// Digits before the decimal point.
    IntegerPart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Units {
    /// W, or kW above [`thresholds::KILO_THRESHOLD_W`].
    Power(WattFormat),
    /// kWh, truncating formatter.
    Energy,
}

/// Look of one direction of a net-flow gauge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowStyle {
    pub max: f64,
    pub value_color: Rgb565,
    /// Drawn above the gauge's fixed icons.
    pub arrow: Option<IconSlot>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetFlowSpec {
    /// Positive values.
    pub export: FlowStyle,
    /// Negative values.
    pub import: FlowStyle,
    /// Exactly zero.
    pub balanced: FlowStyle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scale {
    Fixed { max: f64, value_color: Rgb565 },
    /// Signed value; magnitude shown, direction picks the style.
    NetFlow(NetFlowSpec),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArcStyle {
    pub radius: u32,
    /// Circumradius of each square dot.
    pub dot: u32,
    pub color: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaugeSpec {
    pub name: &'static str,
    pub field: NumericField,
    /// Top-left corner of the gauge cell.
    pub origin: Point,
    /// Second word of the unit line ("now", "today").
    pub caption: &'static str,
    pub scale: Scale,
    pub units: Units,
    /// Show negative values as zero.
    pub clamp_negative: bool,
    /// Truncate the arc percentage to a whole number before sweeping.
    pub whole_percent: bool,
    pub icons: IconRule,
    pub arc: ArcStyle,
}

// Offsets inside a gauge cell
pub const CELL_SIZE: Size = Size::new(80, 120);
pub const ARC_CENTER: Point = Point::new(48, 40);
pub const ICON_PITCH: i32 = 24;
pub const VALUE_POSITION: Point = Point::new(40, 98);
pub const DIVIDER_START: Point = Point::new(8, 104);
pub const DIVIDER_END: Point = Point::new(72, 104);
pub const UNIT_POSITION: Point = Point::new(40, 116);

// =============================================================================
// Special Widgets
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockSpec {
    pub position: Point,
    pub color: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatterySpec {
    /// Positive terminal on the left.
    pub nub: (Point, Size),
    pub body: (Point, Size),
    /// Drained part grows from the left edge of this area.
    pub cells: (Point, Size),
    pub body_color: Rgb565,
    pub text_position: Point,
    pub text_color: Rgb565,
    pub trend_center: Point,
    pub trend_radius: u32,
    /// Flow bar across the body while charging or discharging.
    pub flow_bar: (Point, Size),
    /// Right end of the bar, arrow pointing right.
    pub charge_arrow: Point,
    /// Left end of the bar, arrow pointing at the terminal.
    pub discharge_arrow: Point,
    pub flow_color: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateSpec {
    pub position: Point,
    /// Pence per kWh to color.
    pub colors: ThresholdTable<Rgb565>,
    pub boost_color: Rgb565,
    pub boost_outline: (Point, Size),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PresenceSpec {
    pub codes: [char; 4],
    pub centers: [Point; 4],
    pub diameter: u32,
    /// Letter baseline relative to the lamp center.
    pub letter_offset: Point,
    pub present: Rgb565,
    pub absent: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinSpec {
    pub code: &'static str,
    pub color: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinsSpec {
    pub center: Point,
    /// Horizontal distance between two icons.
    pub spacing: i32,
    pub kinds: &'static [BinSpec],
    pub unknown: Rgb565,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSpec {
    pub top_left: Point,
    pub size: Size,
}

/// Complete screen description.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DashboardLayout {
    pub gauges: &'static [GaugeSpec],
    pub clock: ClockSpec,
    pub battery: BatterySpec,
    pub rate: RateSpec,
    pub presence: PresenceSpec,
    pub bins: BinsSpec,
    pub status: StatusSpec,
    /// Static separator lines.
    pub dividers: &'static [(Point, Point)],
    pub divider_color: Rgb565,
}

// =============================================================================
// The Dashboard
// =============================================================================

const DEFAULT_ARC: ArcStyle = ArcStyle { radius: 30, dot: 5, color: colors::ARC };

const ZAP: IconSlot = IconSlot { icon: Icon::Zap, color: colors::ZAP };
const EXPORT_ARROW: IconSlot = IconSlot { icon: Icon::ArrowUp, color: colors::EXPORT_ICON };
const IMPORT_ARROW: IconSlot = IconSlot { icon: Icon::ArrowDown, color: colors::IMPORT_ICON };

const SOLAR_ICONS: ThresholdTable<IconSlot> = ThresholdTable {
    bands: &[
        Band { bound: Bound::Above(thresholds::SUN_FULL_W), value: IconSlot { icon: Icon::Sun, color: colors::SOLAR } },
        Band {
            bound: Bound::Above(thresholds::SUN_PARTIAL_W),
            value: IconSlot { icon: Icon::PartialCloud, color: colors::SOLAR_DIM },
        },
    ],
    otherwise: IconSlot { icon: Icon::Cloud, color: colors::CLOUD },
};

const RATE_COLORS: ThresholdTable<Rgb565> = ThresholdTable {
    bands: &[
        Band { bound: Bound::AtLeast(thresholds::RATE_HIGH_PENCE), value: colors::RATE_HIGH },
        Band { bound: Bound::AtLeast(thresholds::RATE_MEDIUM_PENCE), value: colors::RATE_MEDIUM },
        Band { bound: Bound::Above(thresholds::RATE_FREE_PENCE), value: colors::RATE_LOW },
    ],
    otherwise: colors::RATE_NEGATIVE,
};

const GAUGES: [GaugeSpec; 6] = [
    GaugeSpec {
        name: "solar_in",
        field: NumericField::SolarIn,
        origin: Point::new(80, 0),
        caption: "now",
        scale: Scale::Fixed { max: thresholds::SOLAR_IN_MAX_W, value_color: colors::SOLAR },
        units: Units::Power(WattFormat::Rounded),
        clamp_negative: false,
        whole_percent: true,
        icons: IconRule::Levels(SOLAR_ICONS),
        arc: DEFAULT_ARC,
    },
    GaugeSpec {
        name: "power_used",
        field: NumericField::PowerUsed,
        origin: Point::new(160, 0),
        caption: "now",
        scale: Scale::Fixed { max: thresholds::POWER_USED_MAX_W, value_color: colors::WHITE },
        units: Units::Power(WattFormat::Rounded),
        clamp_negative: false,
        whole_percent: true,
        icons: IconRule::Fixed(&[IconSlot { icon: Icon::Plug, color: colors::PLUG }]),
        arc: DEFAULT_ARC,
    },
    GaugeSpec {
        name: "grid_in",
        field: NumericField::GridIn,
        origin: Point::new(240, 0),
        caption: "now",
        scale: Scale::NetFlow(NetFlowSpec {
            export: FlowStyle {
                max: thresholds::GRID_EXPORT_MAX_W,
                value_color: colors::EXPORT,
                arrow: Some(EXPORT_ARROW),
            },
            import: FlowStyle {
                max: thresholds::GRID_IMPORT_MAX_W,
                value_color: colors::IMPORT,
                arrow: Some(IMPORT_ARROW),
            },
            balanced: FlowStyle { max: thresholds::GRID_IMPORT_MAX_W, value_color: colors::WHITE, arrow: None },
        }),
        units: Units::Power(WattFormat::IntegerPart),
        clamp_negative: false,
        whole_percent: true,
        icons: IconRule::Fixed(&[ZAP]),
        arc: DEFAULT_ARC,
    },
    GaugeSpec {
        name: "solar_today",
        field: NumericField::SolarToday,
        origin: Point::new(80, 120),
        caption: "today",
        scale: Scale::Fixed { max: thresholds::SOLAR_TODAY_MAX_KWH, value_color: colors::SOLAR },
        units: Units::Energy,
        clamp_negative: false,
        whole_percent: false,
        icons: IconRule::Fixed(&[IconSlot { icon: Icon::Sun, color: colors::SOLAR }]),
        arc: DEFAULT_ARC,
    },
    GaugeSpec {
        name: "export_today",
        field: NumericField::ExportToday,
        origin: Point::new(160, 120),
        caption: "today",
        scale: Scale::Fixed { max: thresholds::EXPORT_TODAY_MAX_KWH, value_color: colors::EXPORT_TODAY },
        units: Units::Energy,
        clamp_negative: true,
        whole_percent: true,
        icons: IconRule::Fixed(&[IconSlot { icon: Icon::ArrowUp, color: colors::EXPORT_TODAY }, ZAP]),
        arc: ArcStyle { radius: 33, ..DEFAULT_ARC },
    },
    GaugeSpec {
        name: "grid_in_today",
        field: NumericField::GridInToday,
        origin: Point::new(240, 120),
        caption: "today",
        scale: Scale::Fixed { max: thresholds::GRID_IN_TODAY_MAX_KWH, value_color: colors::IMPORT_TODAY },
        units: Units::Energy,
        clamp_negative: true,
        whole_percent: true,
        icons: IconRule::Fixed(&[IMPORT_ARROW, ZAP]),
        arc: ArcStyle { radius: 32, dot: 6, color: colors::ARC },
    },
];

const BINS: [BinSpec; 4] = [
    BinSpec { code: "RF", color: colors::BIN_REFUSE },
    BinSpec { code: "RC", color: colors::BIN_RECYCLING },
    BinSpec { code: "GD", color: colors::BIN_GARDEN },
    BinSpec { code: "FD", color: colors::BIN_FOOD },
];

const SIDEBAR_WIDTH: i32 = 80;
const SCREEN_RIGHT: i32 = config::SCREEN_WIDTH as i32 - 1;
const SCREEN_BOTTOM: i32 = config::SCREEN_HEIGHT as i32 - 1;

/// The dashboard shown by the firmware and the simulator.
pub const DASHBOARD: DashboardLayout = DashboardLayout {
    gauges: &GAUGES,
    clock: ClockSpec { position: Point::new(40, 16), color: colors::CLOCK },
    battery: BatterySpec {
        nub: (Point::new(6, 33), Size::new(6, 16)),
        body: (Point::new(12, 26), Size::new(60, 30)),
        cells: (Point::new(15, 30), Size::new(50, 22)),
        body_color: colors::BATTERY,
        text_position: Point::new(36, 78),
        text_color: colors::BATTERY_TEXT,
        trend_center: Point::new(70, 72),
        trend_radius: 7,
        flow_bar: (Point::new(25, 39), Size::new(30, 4)),
        charge_arrow: Point::new(59, 41),
        discharge_arrow: Point::new(21, 41),
        flow_color: colors::BATTERY_FLOW,
    },
    rate: RateSpec {
        position: Point::new(40, 106),
        colors: RATE_COLORS,
        boost_color: colors::RATE_BOOST,
        boost_outline: (Point::new(3, 89), Size::new(74, 23)),
    },
    presence: PresenceSpec {
        codes: config::PRESENCE_CODES,
        centers: [Point::new(21, 138), Point::new(59, 138), Point::new(21, 176), Point::new(59, 176)],
        diameter: 30,
        letter_offset: Point::new(0, 5),
        present: colors::PRESENT,
        absent: colors::ABSENT,
    },
    bins: BinsSpec {
        center: Point::new(40, 216),
        spacing: 36,
        kinds: &BINS,
        unknown: colors::BIN_UNKNOWN,
    },
    status: StatusSpec {
        top_left: Point::new(config::SCREEN_WIDTH as i32 - 4, 0),
        size: Size::new(4, 4),
    },
    dividers: &[
        (Point::new(SIDEBAR_WIDTH, 0), Point::new(SIDEBAR_WIDTH, SCREEN_BOTTOM)),
        (Point::new(SIDEBAR_WIDTH, 120), Point::new(SCREEN_RIGHT, 120)),
    ],
    divider_color: colors::DIVIDER,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_table_first_match_wins() {
        assert_eq!(RATE_COLORS.select(15.0), colors::RATE_HIGH);
        assert_eq!(RATE_COLORS.select(14.99), colors::RATE_MEDIUM);
        assert_eq!(RATE_COLORS.select(10.0), colors::RATE_MEDIUM);
        assert_eq!(RATE_COLORS.select(0.01), colors::RATE_LOW);
        assert_eq!(RATE_COLORS.select(0.0), colors::RATE_NEGATIVE);
        assert_eq!(RATE_COLORS.select(-3.0), colors::RATE_NEGATIVE);
    }

    #[test]
    fn test_solar_icon_bands_are_strict() {
        assert_eq!(SOLAR_ICONS.select(1800.0).icon, Icon::PartialCloud);
        assert_eq!(SOLAR_ICONS.select(1800.5).icon, Icon::Sun);
        assert_eq!(SOLAR_ICONS.select(1000.0).icon, Icon::Cloud);
    }

    #[test]
    fn test_gauges_fit_their_cells() {
        for gauge in DASHBOARD.gauges {
            let reach = (gauge.arc.radius + gauge.arc.dot) as i32;
            assert!(ARC_CENTER.x - reach >= 0, "{} arc leaves its cell", gauge.name);
            assert!(ARC_CENTER.y - reach >= 0, "{} arc leaves its cell", gauge.name);
            assert!(ARC_CENTER.y + reach < VALUE_POSITION.y - 14, "{} arc hits its value", gauge.name);
            let far = gauge.origin + Point::new(CELL_SIZE.width as i32, CELL_SIZE.height as i32);
            assert!(far.x <= config::SCREEN_WIDTH as i32 && far.y <= config::SCREEN_HEIGHT as i32);
        }
    }

    #[test]
    fn test_every_numeric_gauge_is_unique() {
        for (i, a) in DASHBOARD.gauges.iter().enumerate() {
            for b in &DASHBOARD.gauges[i + 1..] {
                assert_ne!(a.field, b.field);
                assert_ne!(a.origin, b.origin);
            }
        }
    }
}
