//! Typing of SQLite values by declared column type
//!
//! SQLite only stores five storage classes, so the declared type decides the
//! native value a column yields: booleans from `BIT`, timestamps from
//! `DATETIME`, reals from `DECIMAL` even when stored as an integer.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::types::ValueRef;

use crate::model::{NativeValue, TypeFamily};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Convert one stored value to a native value
pub fn native_value(value: ValueRef<'_>, family: TypeFamily) -> NativeValue {
    match value {
        ValueRef::Null => NativeValue::Null,
        ValueRef::Integer(i) => match family {
            TypeFamily::Boolean => NativeValue::Bool(i != 0),
            TypeFamily::Decimal | TypeFamily::Float => NativeValue::Float(i as f64),
            _ => NativeValue::Int(i),
        },
        ValueRef::Real(f) => NativeValue::Float(f),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            match family {
                TypeFamily::DateTime | TypeFamily::Date => parse_temporal(&text)
                    .unwrap_or_else(|| NativeValue::String(text.into_owned())),
                TypeFamily::Time => NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
                    .map(NativeValue::Time)
                    .unwrap_or_else(|_| NativeValue::String(text.into_owned())),
                _ => NativeValue::String(text.into_owned()),
            }
        }
        ValueRef::Blob(bytes) => NativeValue::Bytes(bytes.to_vec()),
    }
}

fn parse_temporal(text: &str) -> Option<NativeValue> {
    let trimmed = text.trim();
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(NativeValue::DateTime(dt));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(NativeValue::Date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_typing_follows_family() {
        assert_eq!(native_value(ValueRef::Integer(1), TypeFamily::Boolean), NativeValue::Bool(true));
        assert_eq!(native_value(ValueRef::Integer(75000), TypeFamily::Decimal), NativeValue::Float(75000.0));
        assert_eq!(native_value(ValueRef::Integer(3), TypeFamily::Integer), NativeValue::Int(3));
        assert_eq!(native_value(ValueRef::Integer(3), TypeFamily::Unknown), NativeValue::Int(3));
    }

    #[test]
    fn test_text_typing_follows_family() {
        let dt = native_value(ValueRef::Text(b"2024-05-01 10:20:30"), TypeFamily::DateTime);
        assert_eq!(
            dt,
            NativeValue::DateTime(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(10, 20, 30).unwrap()
            )
        );

        let date = native_value(ValueRef::Text(b"2020-01-15"), TypeFamily::Date);
        assert_eq!(date, NativeValue::Date(NaiveDate::from_ymd_opt(2020, 1, 15).unwrap()));

        let garbage = native_value(ValueRef::Text(b"soon"), TypeFamily::Date);
        assert_eq!(garbage, NativeValue::String("soon".into()));

        let plain = native_value(ValueRef::Text(b"2020-01-15"), TypeFamily::Text);
        assert_eq!(plain, NativeValue::String("2020-01-15".into()));
    }

    #[test]
    fn test_null_and_blob() {
        assert_eq!(native_value(ValueRef::Null, TypeFamily::Binary), NativeValue::Null);
        assert_eq!(
            native_value(ValueRef::Blob(&[1, 2]), TypeFamily::Unknown),
            NativeValue::Bytes(vec![1, 2])
        );
    }
}
