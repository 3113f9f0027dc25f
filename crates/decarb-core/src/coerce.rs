//! Lenient numeric coercion.
//!
//! Every numeric field the engine reads from a caller goes through this
//! module. Blank, missing, `null` or non-numeric values become zero; nothing
//! here returns an error to the caller.
//!
//! The `decimal`, `count` and `year` functions are meant for
//! `#[serde(default, deserialize_with = "...")]` on input structs.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};

/// Parse free text into a Decimal. Anything unparseable is zero.
pub fn parse_decimal(text: &str) -> Decimal {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',' && *c != '_').collect();
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .unwrap_or(Decimal::ZERO)
}

/// Convert a float into a Decimal using its shortest round-trip text form,
/// so `0.1` becomes exactly `0.1`. Non-finite values are zero.
pub fn float_to_decimal(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    parse_decimal(&value.to_string())
}

/// Coerce an untyped JSON value into a Decimal.
pub fn json_decimal(value: &serde_json::Value) -> Decimal {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else if let Some(u) = n.as_u64() {
                Decimal::from(u)
            } else {
                n.as_f64().map(float_to_decimal).unwrap_or(Decimal::ZERO)
            }
        }
        serde_json::Value::String(s) => parse_decimal(s),
        _ => Decimal::ZERO,
    }
}

/// Truncate a Decimal into a non-negative whole count.
pub fn decimal_to_count(value: Decimal) -> u32 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.trunc().to_u32().unwrap_or(u32::MAX)
}

struct DecimalVisitor;

impl<'de> Visitor<'de> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number, numeric string, or blank")
    }

    fn visit_bool<E: de::Error>(self, _v: bool) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Ok(float_to_decimal(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Ok(parse_decimal(v))
    }

    fn visit_none<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Decimal, E> {
        Ok(Decimal::ZERO)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Decimal, D::Error> {
        deserializer.deserialize_any(DecimalVisitor)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Decimal, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Decimal, A::Error> {
        while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
        Ok(Decimal::ZERO)
    }
}

/// Deserialize any JSON-ish scalar into a Decimal, zero on failure.
pub fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
    deserializer.deserialize_any(DecimalVisitor)
}

/// Like [`decimal`] but keeps blank and missing values as `None`.
pub fn optional_decimal<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Decimal>, D::Error> {
    let raw: Option<serde_json::Value> = serde::Deserialize::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(json_decimal(&v)),
    })
}

/// Deserialize a non-negative whole number (years, lifetimes). Fractions
/// truncate, negatives and garbage become zero.
pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    decimal(deserializer).map(decimal_to_count)
}

/// Deserialize a calendar year. Garbage becomes zero.
pub fn year<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    decimal(deserializer).map(|d| d.trunc().to_i32().unwrap_or(0))
}

/// Deserialize an ISO `YYYY-MM-DD` date (a trailing time part is ignored).
/// Blank or unparseable text is `None`.
pub fn optional_date<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<serde_json::Value> = serde::Deserialize::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => {
            let date_part = s.trim().get(..10).unwrap_or(s.trim());
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
        }
        _ => None,
    })
}
