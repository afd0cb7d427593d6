//! Validation and sanitizing of untrusted telemetry.
//!
//! [`validate`] separates hard errors (a numeric field missing or unusable,
//! the reading is rejected) from soft warnings (an enumerated field or the
//! timestamp is unusable, the reading is still shown). [`sanitize`] never
//! fails: it maps every numeric field to a finite value, defaulting to `0.0`.

use core::fmt;

use heapless::Vec;

use crate::reading::{
    BINS, CAR_CHARGING, CarCharging, NumericField, POWER_UP, PRESENCE, RawReading, RawValue, SOLIS_CHARGING,
    SOLIS_DISCHARGING, Switch, TIMESTAMP, Timestamp, ValidatedReading, bounded,
};

/// Strings rejected as numbers (compared case-insensitively).
const NUMBER_SENTINELS: [&str; 4] = ["unknown", "none", "null", "nan"];

/// Strings rejected as text (compared case-insensitively).
const STRING_SENTINELS: [&str; 3] = ["unknown", "none", "null"];

/// Enumerated string fields and their accepted values.
const ENUM_FIELDS: [(&str, &[&str]); 4] = [
    (CAR_CHARGING, CarCharging::ALLOWED),
    (SOLIS_CHARGING, Switch::ALLOWED),
    (POWER_UP, Switch::ALLOWED),
    (SOLIS_DISCHARGING, Switch::ALLOWED),
];

/// Capacity of the error list: at most one error per numeric field.
pub const MAX_ERRORS: usize = NumericField::ALL.len();

/// Capacity of the warning list: enumerated fields, presence, timestamp.
pub const MAX_WARNINGS: usize = ENUM_FIELDS.len() + 2;

// =============================================================================
// Field Checks
// =============================================================================

fn is_sentinel(
    text: &str,
    sentinels: &[&str],
) -> bool {
    sentinels.iter().any(|sentinel| text.eq_ignore_ascii_case(sentinel))
}

/// Parse a raw value as a finite number.
///
/// Booleans count as `0`/`1`. Text is trimmed and must not be a sentinel.
pub fn parse_number(value: &RawValue) -> Option<f64> {
    let number = match value {
        RawValue::Number(number) => *number,
        RawValue::Bool(flag) => f64::from(u8::from(*flag)),
        RawValue::Text(text) => {
            let text = text.trim();
            if is_sentinel(text, &NUMBER_SENTINELS) {
                return None;
            }
            text.parse::<f64>().ok()?
        }
        RawValue::Null | RawValue::Other => return None,
    };
    number.is_finite().then_some(number)
}

pub fn is_valid_number(value: &RawValue) -> bool { parse_number(value).is_some() }

/// Text that is not a sentinel and, when `allowed` is given, one of its values.
pub fn is_valid_string(
    value: &RawValue,
    allowed: Option<&[&str]>,
) -> bool {
    let Some(text) = value.as_text() else {
        return false;
    };
    if is_sentinel(text, &STRING_SENTINELS) {
        return false;
    }
    allowed.is_none_or(|allowed| allowed.contains(&text))
}

// =============================================================================
// Report
// =============================================================================

/// Hard error: the reading cannot be shown.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    MissingCritical(NumericField),
    InvalidCritical { field: NumericField, value: RawValue },
}

impl fmt::Display for ValidationError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MissingCritical(field) => write!(f, "missing critical field: {field}"),
            Self::InvalidCritical { field, value } => {
                write!(f, "invalid numeric value in critical field {field}: {value}")
            }
        }
    }
}

/// Soft warning: the reading is shown with the field degraded.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationWarning {
    InvalidString { field: &'static str, value: RawValue },
    StaleTimestamp,
}

impl fmt::Display for ValidationWarning {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::InvalidString { field, value } => write!(f, "invalid value in {field}: {value}"),
            Self::StaleTimestamp => f.write_str("timestamp is null, data may be stale"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError, MAX_ERRORS>,
    pub warnings: Vec<ValidationWarning, MAX_WARNINGS>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool { self.errors.is_empty() }
}

/// Classify a raw reading. Missing fields are reported before invalid ones.
pub fn validate(raw: &RawReading) -> ValidationReport {
    let mut report = ValidationReport::default();

    for field in NumericField::ALL {
        if !raw.contains(field.key()) {
            report.errors.push(ValidationError::MissingCritical(field)).ok();
        }
    }
    for field in NumericField::ALL {
        if let Some(value) = raw.get(field.key()) {
            if !is_valid_number(value) {
                report.errors.push(ValidationError::InvalidCritical { field, value: value.clone() }).ok();
            }
        }
    }

    for (field, allowed) in ENUM_FIELDS {
        if let Some(value) = raw.get(field) {
            if !is_valid_string(value, Some(allowed)) {
                report.warnings.push(ValidationWarning::InvalidString { field, value: value.clone() }).ok();
            }
        }
    }
    if let Some(value) = raw.get(PRESENCE) {
        if !is_valid_string(value, None) {
            report.warnings.push(ValidationWarning::InvalidString { field: PRESENCE, value: value.clone() }).ok();
        }
    }

    if raw.get(TIMESTAMP).is_some_and(RawValue::is_null) {
        report.warnings.push(ValidationWarning::StaleTimestamp).ok();
    }

    report
}

// =============================================================================
// Sanitizing
// =============================================================================

fn valid_text<'a>(
    raw: &'a RawReading,
    key: &str,
) -> Option<&'a str> {
    raw.get(key).filter(|value| is_valid_string(value, None)).and_then(RawValue::as_text)
}

/// Build a [`ValidatedReading`]. Unusable numbers become `0.0`, unusable
/// enumerated fields `None`, an unusable presence the empty string.
pub fn sanitize(raw: &RawReading) -> ValidatedReading {
    let mut reading = ValidatedReading::default();

    for field in NumericField::ALL {
        *reading.numeric_mut(field) = raw.get(field.key()).and_then(parse_number).unwrap_or(0.0);
    }

    reading.car_charging = valid_text(raw, CAR_CHARGING).and_then(CarCharging::parse);
    reading.solis_charging = valid_text(raw, SOLIS_CHARGING).and_then(Switch::parse);
    reading.solis_discharging = valid_text(raw, SOLIS_DISCHARGING).and_then(Switch::parse);
    reading.power_up = valid_text(raw, POWER_UP).and_then(Switch::parse);
    reading.presence = valid_text(raw, PRESENCE).map(bounded).unwrap_or_default();
    reading.timestamp = raw.get(TIMESTAMP).and_then(RawValue::as_text).map(Timestamp::new).unwrap_or_default();
    reading.bins = raw.get(BINS).and_then(RawValue::as_text).map(bounded);

    reading
}

/// Percentage of present fields holding a usable value, truncated.
pub fn quality_score(raw: &RawReading) -> u8 {
    if raw.is_empty() {
        return 0;
    }
    let valid = raw
        .iter()
        .filter(|(key, value)| {
            if NumericField::from_key(key).is_some() {
                is_valid_number(value)
            } else if ENUM_FIELDS.iter().any(|(field, _)| field == key) {
                is_valid_string(value, None)
            } else {
                !value.is_null()
            }
        })
        .count();
    (valid * 100 / raw.len()) as u8
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> RawReading {
        let mut raw = RawReading::new();
        for (i, field) in NumericField::ALL.into_iter().enumerate() {
            raw.insert(field.key(), RawValue::Number(i as f64 * 10.0));
        }
        raw.insert(CAR_CHARGING, RawValue::text("Charging"));
        raw.insert(SOLIS_CHARGING, RawValue::text("on"));
        raw.insert(SOLIS_DISCHARGING, RawValue::text("off"));
        raw.insert(POWER_UP, RawValue::text("off"));
        raw.insert(PRESENCE, RawValue::text("jB"));
        raw.insert(TIMESTAMP, RawValue::text("2024-06-01T12:30:00"));
        raw
    }

    #[test]
    fn test_number_sentinels_case_insensitive() {
        for sentinel in ["unknown", "UNKNOWN", "None", "null", "NaN", " nan "] {
            assert!(!is_valid_number(&RawValue::text(sentinel)), "{sentinel:?} must be invalid");
        }
    }

    #[test]
    fn test_numeric_strings_and_bools() {
        assert_eq!(parse_number(&RawValue::text(" 12.5 ")), Some(12.5));
        assert_eq!(parse_number(&RawValue::Bool(true)), Some(1.0));
        assert_eq!(parse_number(&RawValue::Number(-3.0)), Some(-3.0));
        assert_eq!(parse_number(&RawValue::text("12W")), None);
        assert_eq!(parse_number(&RawValue::Null), None);
        assert_eq!(parse_number(&RawValue::Other), None);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        assert!(!is_valid_number(&RawValue::Number(f64::INFINITY)));
        assert!(!is_valid_number(&RawValue::text("inf")));
        assert!(!is_valid_number(&RawValue::text("1e400")), "overflows to infinity");
    }

    #[test]
    fn test_large_finite_numbers_accepted() {
        assert_eq!(parse_number(&RawValue::text("1e39")), Some(1e39));
        assert_eq!(parse_number(&RawValue::Number(1e39)), Some(1e39));
        assert_eq!(parse_number(&RawValue::Number(f64::MAX)), Some(f64::MAX));

        let mut raw = complete();
        raw.insert("solar_in", RawValue::text("1e39"));
        assert!(validate(&raw).is_valid());
        assert_eq!(sanitize(&raw).solar_in, 1e39);
    }

    #[test]
    fn test_numbers_keep_double_precision() {
        assert_eq!(parse_number(&RawValue::Number(4.999_999_99)), Some(4.999_999_99));
        assert_eq!(parse_number(&RawValue::text("0.1")), Some(0.1));
    }

    #[test]
    fn test_string_sentinels_exclude_nan() {
        assert!(!is_valid_string(&RawValue::text("Unknown"), None));
        assert!(is_valid_string(&RawValue::text("nan"), None));
        assert!(!is_valid_string(&RawValue::Number(1.0), None));
        assert!(!is_valid_string(&RawValue::text("maybe"), Some(Switch::ALLOWED)));
        assert!(is_valid_string(&RawValue::text("on"), Some(Switch::ALLOWED)));
    }

    #[test]
    fn test_complete_reading_is_valid() {
        let report = validate(&complete());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn test_missing_critical_field_names_field() {
        let mut raw = RawReading::new();
        for field in NumericField::ALL.into_iter().filter(|f| *f != NumericField::CurRate) {
            raw.insert(field.key(), RawValue::Number(1.0));
        }
        let report = validate(&raw);
        assert_eq!(report.errors.as_slice(), &[ValidationError::MissingCritical(NumericField::CurRate)]);
    }

    #[test]
    fn test_invalid_critical_value_names_field_and_value() {
        let mut raw = complete();
        raw.insert("solar_in", RawValue::text("unavailable"));
        let report = validate(&raw);
        assert!(!report.is_valid());
        assert_eq!(
            report.errors[0],
            ValidationError::InvalidCritical { field: NumericField::SolarIn, value: RawValue::text("unavailable") }
        );
        let mut message: heapless::String<96> = heapless::String::new();
        core::fmt::write(&mut message, format_args!("{}", report.errors[0])).ok();
        assert!(message.contains("solar_in") && message.contains("unavailable"), "{message}");
    }

    #[test]
    fn test_missing_errors_listed_before_invalid() {
        let mut raw = complete();
        raw.insert("grid_in", RawValue::Null);
        let mut trimmed = RawReading::new();
        for (key, value) in raw.iter().filter(|(key, _)| *key != "cur_rate") {
            trimmed.insert(key, value.clone());
        }
        let report = validate(&trimmed);
        assert!(matches!(report.errors[0], ValidationError::MissingCritical(NumericField::CurRate)));
        assert!(matches!(report.errors[1], ValidationError::InvalidCritical { field: NumericField::GridIn, .. }));
    }

    #[test]
    fn test_enum_and_presence_problems_are_warnings() {
        let mut raw = complete();
        raw.insert(CAR_CHARGING, RawValue::text("Paused"));
        raw.insert(PRESENCE, RawValue::Null);
        let report = validate(&raw);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_null_timestamp_is_stale_warning() {
        let mut raw = complete();
        raw.insert(TIMESTAMP, RawValue::Null);
        let report = validate(&raw);
        assert!(report.is_valid());
        assert_eq!(report.warnings.as_slice(), &[ValidationWarning::StaleTimestamp]);
    }

    #[test]
    fn test_sanitize_defaults_invalid_numbers() {
        let mut raw = complete();
        raw.insert("battery_per", RawValue::text("unknown"));
        raw.insert("grid_in", RawValue::text("-250.5"));
        let reading = sanitize(&raw);
        assert_eq!(reading.battery_per, 0.0);
        assert_eq!(reading.grid_in, -250.5);
        assert_eq!(reading.car_charging, Some(CarCharging::Charging));
        assert_eq!(reading.presence.as_str(), "jB");
        assert_eq!(reading.timestamp.hour(), Some("12"));
    }

    #[test]
    fn test_sanitize_keeps_late_presence_codes() {
        let mut raw = complete();
        raw.insert(PRESENCE, RawValue::text("home: j, C; away: B, garage L"));
        let reading = sanitize(&raw);
        assert_eq!(reading.presence.as_str(), "home: j, C; away: B, garage L");
        assert!(['j', 'B', 'C', 'L'].iter().all(|code| reading.presence.contains(*code)));
    }

    #[test]
    fn test_sanitize_keeps_whole_bins_code() {
        let mut raw = complete();
        raw.insert(BINS, RawValue::text("ÉÉÉÉÉ"));
        assert_eq!(sanitize(&raw).bins.as_deref(), Some("ÉÉÉÉÉ"));
        raw.insert(BINS, RawValue::text("RFRCGDFDRF"));
        assert_eq!(sanitize(&raw).bins.as_deref(), Some("RFRCGDFDRF"));
    }

    #[test]
    fn test_sanitize_every_numeric_field_finite() {
        let mut raw = RawReading::new();
        let hostile = [
            RawValue::Null,
            RawValue::Other,
            RawValue::text("nan"),
            RawValue::Number(f64::NEG_INFINITY),
            RawValue::text("1e40"),
            RawValue::Bool(false),
            RawValue::text(""),
            RawValue::Number(f64::NAN),
        ];
        for (field, value) in NumericField::ALL.into_iter().zip(hostile) {
            raw.insert(field.key(), value);
        }
        let reading = sanitize(&raw);
        for field in NumericField::ALL {
            assert!(reading.numeric(field).is_finite(), "{field} not finite");
        }
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut raw = complete();
        raw.insert("solar_in", RawValue::text("none"));
        raw.insert(BINS, RawValue::text("RCGD"));
        let once = sanitize(&raw);
        let twice = sanitize(&once.to_raw());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sanitize_degrades_bad_enums() {
        let mut raw = complete();
        raw.insert(SOLIS_CHARGING, RawValue::text("ON"));
        raw.insert(POWER_UP, RawValue::Null);
        let reading = sanitize(&raw);
        assert_eq!(reading.solis_charging, None);
        assert_eq!(reading.power_up, None);
        assert_eq!(reading.solis_discharging, Some(Switch::Off));
    }

    #[test]
    fn test_quality_score_bounds() {
        assert_eq!(quality_score(&RawReading::new()), 0);
        assert_eq!(quality_score(&complete()), 100);
    }

    #[test]
    fn test_quality_score_truncates() {
        let mut raw = RawReading::new();
        raw.insert("solar_in", RawValue::Number(1.0));
        raw.insert("grid_in", RawValue::text("unknown"));
        raw.insert(CAR_CHARGING, RawValue::text("anything"));
        // 2 of 3 usable
        assert_eq!(quality_score(&raw), 66);
    }

    #[test]
    fn test_quality_score_counts_null_extras_as_invalid() {
        let mut raw = RawReading::new();
        raw.insert("solar_in", RawValue::Number(1.0));
        raw.insert("weather", RawValue::Null);
        assert_eq!(quality_score(&raw), 50);
    }
}
