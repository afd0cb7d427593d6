//! Home Assistant state payload parsing.
//!
//! The telemetry lives in the attributes of an `input_text` entity:
//!
//! ```json
//! { "entity_id": "input_text.solar_display_data",
//!   "state": "...",
//!   "attributes": { "info": { "solar_in": 2345, "timestamp": "..." } } }
//! ```
//!
//! Only `attributes.info` is kept. Its values are mapped onto [`RawValue`]
//! without interpretation; validation happens later.

use core::fmt;

use heapless::String;
use serde::{
    Deserialize, Deserializer,
    de::{IgnoredAny, MapAccess, SeqAccess, Visitor},
};

use crate::{
    reading::{KEY_LEN, RawReading, RawValue},
    telemetry::FetchError,
};

struct RawValueVisitor;

impl<'de> Visitor<'de> for RawValueVisitor {
    type Value = RawValue;

    fn expecting(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E>(
        self,
        value: bool,
    ) -> Result<RawValue, E> {
        Ok(RawValue::Bool(value))
    }

    fn visit_i64<E>(
        self,
        value: i64,
    ) -> Result<RawValue, E> {
        Ok(RawValue::Number(value as f64))
    }

    fn visit_u64<E>(
        self,
        value: u64,
    ) -> Result<RawValue, E> {
        Ok(RawValue::Number(value as f64))
    }

    fn visit_f64<E>(
        self,
        value: f64,
    ) -> Result<RawValue, E> {
        Ok(RawValue::Number(value))
    }

    fn visit_str<E>(
        self,
        value: &str,
    ) -> Result<RawValue, E> {
        Ok(RawValue::text(value))
    }

    fn visit_unit<E>(self) -> Result<RawValue, E> { Ok(RawValue::Null) }

    fn visit_none<E>(self) -> Result<RawValue, E> { Ok(RawValue::Null) }

    fn visit_some<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<RawValue, D::Error> {
        RawValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> Result<RawValue, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        Ok(RawValue::Other)
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> Result<RawValue, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        Ok(RawValue::Other)
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawValueVisitor)
    }
}

/// Map key; `None` when it is too long to name a known field.
struct Key(Option<String<KEY_LEN>>);

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = Key;

            fn expecting(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                f.write_str("a field name")
            }

            fn visit_str<E>(
                self,
                value: &str,
            ) -> Result<Key, E> {
                Ok(Key(String::try_from(value).ok()))
            }
        }

        deserializer.deserialize_str(KeyVisitor)
    }
}

struct RawReadingVisitor;

impl<'de> Visitor<'de> for RawReadingVisitor {
    type Value = RawReading;

    fn expecting(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str("a telemetry object")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
    ) -> Result<RawReading, A::Error> {
        let mut reading = RawReading::new();
        while let Some(Key(key)) = map.next_key()? {
            match key {
                Some(key) => {
                    let value: RawValue = map.next_value()?;
                    reading.insert(&key, value);
                }
                None => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(reading)
    }
}

impl<'de> Deserialize<'de> for RawReading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawReadingVisitor)
    }
}

#[derive(Deserialize)]
struct Attributes {
    info: RawReading,
}

#[derive(Deserialize)]
struct StateObject {
    attributes: Attributes,
}

/// Parse a Home Assistant state object and return its `attributes.info`.
pub fn parse_state(body: &[u8]) -> Result<RawReading, FetchError> {
    serde_json::from_slice::<StateObject>(body).map(|state| state.attributes.info).map_err(|_| FetchError::Payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATE: &str = r#"{
        "entity_id": "input_text.solar_display_data",
        "state": "ok",
        "attributes": {
            "friendly_name": "Solar display data",
            "info": {
                "grid_in": -250,
                "solar_in": 2345.5,
                "battery_per": "unknown",
                "power_up": "off",
                "presence": null,
                "flag": true,
                "history": [1, 2, 3],
                "nested": {"a": {"b": 1}},
                "timestamp": "2024-06-01T12:30:00+01:00"
            }
        },
        "last_changed": "2024-06-01T11:30:00+00:00"
    }"#;

    #[test]
    fn test_parse_state_maps_value_kinds() {
        let reading = parse_state(STATE.as_bytes()).unwrap();
        assert_eq!(reading.get("grid_in"), Some(&RawValue::Number(-250.0)));
        assert_eq!(reading.get("solar_in"), Some(&RawValue::Number(2345.5)));
        assert_eq!(reading.get("battery_per"), Some(&RawValue::text("unknown")));
        assert_eq!(reading.get("presence"), Some(&RawValue::Null));
        assert_eq!(reading.get("flag"), Some(&RawValue::Bool(true)));
        assert_eq!(reading.get("history"), Some(&RawValue::Other));
        assert_eq!(reading.get("nested"), Some(&RawValue::Other));
        assert_eq!(reading.get("timestamp").and_then(RawValue::as_text), Some("2024-06-01T12:30:00+01:00"));
        assert!(reading.get("friendly_name").is_none(), "only info is kept");
    }

    #[test]
    fn test_missing_info_is_payload_error() {
        let body = br#"{"state": "ok", "attributes": {"friendly_name": "x"}}"#;
        assert_eq!(parse_state(body), Err(FetchError::Payload));
    }

    #[test]
    fn test_info_must_be_an_object() {
        let body = br#"{"attributes": {"info": "2024-06-01T12:30:00"}}"#;
        assert_eq!(parse_state(body), Err(FetchError::Payload));
    }

    #[test]
    fn test_not_json_is_payload_error() {
        assert_eq!(parse_state(b"<html>502 Bad Gateway</html>"), Err(FetchError::Payload));
        assert_eq!(parse_state(b""), Err(FetchError::Payload));
    }

    #[test]
    fn test_long_keys_are_skipped() {
        let body = br#"{"attributes": {"info": {"a_really_long_key_nobody_reads": {"x": 1}, "solar_in": 1}}}"#;
        let reading = parse_state(body).unwrap();
        assert_eq!(reading.len(), 1);
        assert_eq!(reading.get("solar_in"), Some(&RawValue::Number(1.0)));
    }

    #[test]
    fn test_escaped_strings() {
        let body = br#"{"attributes": {"info": {"presence": "j\u0042", "bins": "R\"F", "time\u0073tamp": "x\/y"}}}"#;
        let reading = parse_state(body).unwrap();
        assert_eq!(reading.get("presence").and_then(RawValue::as_text), Some("jB"));
        assert_eq!(reading.get("bins").and_then(RawValue::as_text), Some("R\"F"));
        assert_eq!(reading.get("timestamp").and_then(RawValue::as_text), Some("x/y"));
    }

    #[test]
    fn test_telemetry_after_many_extra_keys_is_kept() {
        let mut info: std::vec::Vec<std::string::String> = (0..30).map(|i| format!(r#""extra_{i}": 1"#)).collect();
        info.extend(
            [
                r#""grid_in": -250"#,
                r#""solar_in": 1200"#,
                r#""power_used": 3000"#,
                r#""battery_per": 80"#,
                r#""solar_today": 4.2"#,
                r#""export_today": 1.5"#,
                r#""grid_in_today": 2.0"#,
                r#""cur_rate": 0.12"#,
                r#""presence": "jB""#,
                r#""timestamp": "2024-01-01T12:00:00""#,
            ]
            .map(std::string::String::from),
        );
        let body = format!(r#"{{"attributes": {{"info": {{{}}}}}}}"#, info.join(", "));

        let reading = parse_state(body.as_bytes()).unwrap();
        assert!(reading.contains("timestamp"));
        assert_eq!(reading.get("cur_rate"), Some(&RawValue::Number(0.12)));
        let report = crate::validate(&reading);
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }
}
