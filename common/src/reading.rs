//! Telemetry readings.
//!
//! A [`RawReading`] is the untrusted field map exactly as the telemetry
//! source delivered it. [`crate::validation::sanitize`] turns it into a
//! [`ValidatedReading`] whose numeric fields are always finite and whose
//! enumerated fields are typed.
//!
//! Both types are fixed capacity. Over-long text is cut at a character
//! boundary. A raw reading always keeps room for the fields the dashboard
//! reads; only unknown extras are dropped once their share is used up.

use core::fmt;

use heapless::{String, Vec};

/// Maximum number of fields kept from one payload.
pub const MAX_FIELDS: usize = 24;

/// Maximum key length. Longer keys cannot name a known field and are dropped.
pub const KEY_LEN: usize = 24;

/// Maximum text value length.
pub const TEXT_LEN: usize = 64;

/// Maximum timestamp length (`2024-06-01T12:34:56.123456+01:00` fits).
pub const TIMESTAMP_LEN: usize = 32;

// =============================================================================
// Field Names
// =============================================================================

pub const CAR_CHARGING: &str = "car_charging";
pub const SOLIS_CHARGING: &str = "solis_charging";
pub const SOLIS_DISCHARGING: &str = "solis_discharging";
pub const POWER_UP: &str = "power_up";
pub const PRESENCE: &str = "presence";
pub const TIMESTAMP: &str = "timestamp";
pub const BINS: &str = "bins";

/// The numeric telemetry fields. Every one of them is critical: a reading
/// missing any of them is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NumericField {
    GridIn,
    SolarIn,
    PowerUsed,
    BatteryPer,
    SolarToday,
    ExportToday,
    GridInToday,
    CurRate,
}

impl NumericField {
    pub const ALL: [Self; 8] = [
        Self::GridIn,
        Self::SolarIn,
        Self::PowerUsed,
        Self::BatteryPer,
        Self::SolarToday,
        Self::ExportToday,
        Self::GridInToday,
        Self::CurRate,
    ];

    /// Key of the field in the telemetry payload.
    pub const fn key(self) -> &'static str {
        match self {
            Self::GridIn => "grid_in",
            Self::SolarIn => "solar_in",
            Self::PowerUsed => "power_used",
            Self::BatteryPer => "battery_per",
            Self::SolarToday => "solar_today",
            Self::ExportToday => "export_today",
            Self::GridInToday => "grid_in_today",
            Self::CurRate => "cur_rate",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> { Self::ALL.into_iter().find(|field| field.key() == key) }
}

/// Every key the dashboard reads.
pub const KNOWN_KEYS: [&str; 15] = [
    NumericField::GridIn.key(),
    NumericField::SolarIn.key(),
    NumericField::PowerUsed.key(),
    NumericField::BatteryPer.key(),
    NumericField::SolarToday.key(),
    NumericField::ExportToday.key(),
    NumericField::GridInToday.key(),
    NumericField::CurRate.key(),
    CAR_CHARGING,
    SOLIS_CHARGING,
    SOLIS_DISCHARGING,
    POWER_UP,
    PRESENCE,
    TIMESTAMP,
    BINS,
];

/// Entries left for keys outside [`KNOWN_KEYS`].
pub const SPARE_FIELDS: usize = MAX_FIELDS - KNOWN_KEYS.len();

pub fn is_known_key(key: &str) -> bool { KNOWN_KEYS.contains(&key) }

impl fmt::Display for NumericField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Copy `text` into a fixed string, cutting at the last character boundary
/// that fits.
pub fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

// =============================================================================
// Raw Reading
// =============================================================================

/// One untyped payload value.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String<TEXT_LEN>),
    /// Nested array or object. Never valid for any known field.
    Other,
}

impl RawValue {
    pub fn text(text: &str) -> Self { Self::Text(bounded(text)) }

    pub const fn is_null(&self) -> bool { matches!(self, Self::Null) }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Other => f.write_str("<nested>"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RawValue {
    fn format(
        &self,
        fmt: defmt::Formatter,
    ) {
        match self {
            Self::Null => defmt::write!(fmt, "null"),
            Self::Bool(value) => defmt::write!(fmt, "{}", value),
            Self::Number(value) => defmt::write!(fmt, "{}", value),
            Self::Text(text) => defmt::write!(fmt, "'{}'", text.as_str()),
            Self::Other => defmt::write!(fmt, "<nested>"),
        }
    }
}

/// Field map of one telemetry payload, in arrival order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawReading {
    entries: Vec<(String<KEY_LEN>, RawValue), MAX_FIELDS>,
}

impl RawReading {
    pub const fn new() -> Self { Self { entries: Vec::new() } }

    /// Insert or replace a field. Returns `false` when the field was dropped:
    /// the key is too long, or it is unknown and [`SPARE_FIELDS`] unknown
    /// keys are already stored. Known keys always fit.
    pub fn insert(
        &mut self,
        key: &str,
        value: RawValue,
    ) -> bool {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            slot.1 = value;
            return true;
        }
        if !is_known_key(key) && self.entries.iter().filter(|(k, _)| !is_known_key(k)).count() >= SPARE_FIELDS {
            return false;
        }
        let Ok(key) = String::try_from(key) else {
            return false;
        };
        self.entries.push((key, value)).is_ok()
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&RawValue> {
        self.entries.iter().find(|(k, _)| k.as_str() == key).map(|(_, value)| value)
    }

    pub fn contains(
        &self,
        key: &str,
    ) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> { self.entries.iter().map(|(k, v)| (k.as_str(), v)) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// =============================================================================
// Typed Fields
// =============================================================================

/// State of the car charger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CarCharging {
    Stopped,
    Charging,
    Complete,
}

impl CarCharging {
    /// Accepted payload spellings, in declaration order.
    pub const ALLOWED: &'static [&'static str] = &["Stopped", "Charging", "Complete"];

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "Stopped" => Some(Self::Stopped),
            "Charging" => Some(Self::Charging),
            "Complete" => Some(Self::Complete),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str { Self::ALLOWED[self as usize] }
}

/// Home Assistant on/off switch state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub const ALLOWED: &'static [&'static str] = &["on", "off"];

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "on" => Some(Self::On),
            "off" => Some(Self::Off),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

/// ISO-8601 timestamp as sent by the telemetry source. Only the text after
/// the `T` separator is ever interpreted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timestamp(String<TIMESTAMP_LEN>);

impl Timestamp {
    pub fn new(text: &str) -> Self { Self(bounded(text)) }

    /// Sentinel held by the snapshot store before the first full refresh.
    pub fn never() -> Self { Self::new("0") }

    pub fn as_str(&self) -> &str { self.0.as_str() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    fn time_part(&self) -> Option<&str> { self.0.split_once('T').map(|(_, time)| time) }

    /// The two hour characters after `T`, if both are ASCII digits.
    pub fn hour(&self) -> Option<&str> {
        let hour = self.time_part()?.get(..2)?;
        hour.bytes().all(|b| b.is_ascii_digit()).then_some(hour)
    }

    /// `HH:MM` for the clock widget: the first five characters after `T`.
    pub fn clock(&self) -> Option<&str> {
        let time = self.time_part()?;
        Some(time.get(..5).unwrap_or(time))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Validated Reading
// =============================================================================

/// Sanitized telemetry. Numeric fields are finite, everything else typed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidatedReading {
    pub grid_in: f64,
    pub solar_in: f64,
    pub power_used: f64,
    pub battery_per: f64,
    pub solar_today: f64,
    pub export_today: f64,
    pub grid_in_today: f64,
    pub cur_rate: f64,
    pub car_charging: Option<CarCharging>,
    pub solis_charging: Option<Switch>,
    pub solis_discharging: Option<Switch>,
    pub power_up: Option<Switch>,
    pub presence: String<TEXT_LEN>,
    pub timestamp: Timestamp,
    pub bins: Option<String<TEXT_LEN>>,
}

impl ValidatedReading {
    pub const fn numeric(
        &self,
        field: NumericField,
    ) -> f64 {
        match field {
            NumericField::GridIn => self.grid_in,
            NumericField::SolarIn => self.solar_in,
            NumericField::PowerUsed => self.power_used,
            NumericField::BatteryPer => self.battery_per,
            NumericField::SolarToday => self.solar_today,
            NumericField::ExportToday => self.export_today,
            NumericField::GridInToday => self.grid_in_today,
            NumericField::CurRate => self.cur_rate,
        }
    }

    pub const fn numeric_mut(
        &mut self,
        field: NumericField,
    ) -> &mut f64 {
        match field {
            NumericField::GridIn => &mut self.grid_in,
            NumericField::SolarIn => &mut self.solar_in,
            NumericField::PowerUsed => &mut self.power_used,
            NumericField::BatteryPer => &mut self.battery_per,
            NumericField::SolarToday => &mut self.solar_today,
            NumericField::ExportToday => &mut self.export_today,
            NumericField::GridInToday => &mut self.grid_in_today,
            NumericField::CurRate => &mut self.cur_rate,
        }
    }

    /// Battery percentage truncated toward zero, as used by the trend.
    pub fn battery_whole(&self) -> i32 { self.battery_per as i32 }

    pub const fn is_boost(&self) -> bool { matches!(self.power_up, Some(Switch::On)) }

    /// Convert back into a raw map. Sanitizing the result yields `self`.
    pub fn to_raw(&self) -> RawReading {
        let mut raw = RawReading::new();
        for field in NumericField::ALL {
            raw.insert(field.key(), RawValue::Number(self.numeric(field)));
        }
        let optional = |value: Option<&'static str>| value.map_or(RawValue::Null, RawValue::text);
        raw.insert(CAR_CHARGING, optional(self.car_charging.map(CarCharging::as_str)));
        raw.insert(SOLIS_CHARGING, optional(self.solis_charging.map(Switch::as_str)));
        raw.insert(SOLIS_DISCHARGING, optional(self.solis_discharging.map(Switch::as_str)));
        raw.insert(POWER_UP, optional(self.power_up.map(Switch::as_str)));
        raw.insert(PRESENCE, RawValue::text(&self.presence));
        let timestamp = if self.timestamp.is_empty() { RawValue::Null } else { RawValue::text(self.timestamp.as_str()) };
        raw.insert(TIMESTAMP, timestamp);
        if let Some(bins) = &self.bins {
            raw.insert(BINS, RawValue::text(bins));
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut raw = RawReading::new();
        assert!(raw.insert("solar_in", RawValue::Number(1.0)));
        assert!(raw.insert("solar_in", RawValue::Number(2.0)));
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.get("solar_in"), Some(&RawValue::Number(2.0)));
    }

    fn extra_key(i: usize) -> String<8> {
        let mut key = String::new();
        core::fmt::write(&mut key, format_args!("k{i}")).ok();
        key
    }

    #[test]
    fn test_insert_drops_long_keys_and_unknown_overflow() {
        let mut raw = RawReading::new();
        assert!(!raw.insert("a_key_that_is_much_too_long_to_keep", RawValue::Null));
        for i in 0..SPARE_FIELDS {
            assert!(raw.insert(&extra_key(i), RawValue::Null));
        }
        assert!(!raw.insert("extra", RawValue::Null), "unknown keys beyond their share are dropped");
        assert_eq!(raw.len(), SPARE_FIELDS);
    }

    #[test]
    fn test_known_keys_fit_after_many_extras() {
        let mut raw = RawReading::new();
        for i in 0..MAX_FIELDS * 2 {
            raw.insert(&extra_key(i), RawValue::Number(1.0));
        }
        for key in KNOWN_KEYS {
            assert!(raw.insert(key, RawValue::Number(2.0)), "{key} dropped");
        }
        assert_eq!(raw.len(), MAX_FIELDS);
        assert!(KNOWN_KEYS.iter().all(|key| raw.get(key) == Some(&RawValue::Number(2.0))));
    }

    #[test]
    fn test_known_keys_are_distinct_and_short() {
        for (i, key) in KNOWN_KEYS.iter().enumerate() {
            assert!(key.len() <= KEY_LEN, "{key}");
            assert!(!KNOWN_KEYS[i + 1..].contains(key), "{key} listed twice");
        }
    }

    #[test]
    fn test_text_truncates_at_char_boundary() {
        let long = "é".repeat(40); // 80 bytes
        let RawValue::Text(text) = RawValue::text(&long) else {
            panic!("expected text");
        };
        assert_eq!(text.len(), TEXT_LEN);
        assert!(text.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_timestamp_hour_and_clock() {
        let ts = Timestamp::new("2024-06-01T05:07:09+01:00");
        assert_eq!(ts.hour(), Some("05"));
        assert_eq!(ts.clock(), Some("05:07"));
    }

    #[test]
    fn test_timestamp_without_separator() {
        assert_eq!(Timestamp::new("2024-06-01").hour(), None);
        assert_eq!(Timestamp::never().hour(), None);
        assert_eq!(Timestamp::default().clock(), None);
    }

    #[test]
    fn test_timestamp_hour_requires_digits() {
        assert_eq!(Timestamp::new("xTab:cd").hour(), None);
        assert_eq!(Timestamp::new("xT1").hour(), None);
    }

    #[test]
    fn test_numeric_field_keys_round_trip() {
        for field in NumericField::ALL {
            assert_eq!(NumericField::from_key(field.key()), Some(field));
        }
        assert_eq!(NumericField::from_key("presence"), None);
    }

    #[test]
    fn test_enum_parsing_is_case_sensitive() {
        assert_eq!(CarCharging::parse("Charging"), Some(CarCharging::Charging));
        assert_eq!(CarCharging::parse("charging"), None);
        assert_eq!(Switch::parse("on"), Some(Switch::On));
        assert_eq!(Switch::parse("ON"), None);
    }

    #[test]
    fn test_battery_whole_truncates_toward_zero() {
        let reading = ValidatedReading { battery_per: 79.9, ..Default::default() };
        assert_eq!(reading.battery_whole(), 79);
    }
}
