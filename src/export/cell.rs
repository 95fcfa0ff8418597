use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, TimeUnit};

const SECONDS_PER_DAY: i64 = 86_400;

/// One frame value in the shape the row-oriented writers need.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl From<AnyValue<'_>> for Cell {
    fn from(value: AnyValue<'_>) -> Self {
        match value {
            AnyValue::Null => Cell::Null,
            AnyValue::Boolean(b) => Cell::Bool(b),
            AnyValue::Int8(v) => Cell::Int(v.into()),
            AnyValue::Int16(v) => Cell::Int(v.into()),
            AnyValue::Int32(v) => Cell::Int(v.into()),
            AnyValue::Int64(v) => Cell::Int(v),
            AnyValue::UInt8(v) => Cell::Int(v.into()),
            AnyValue::UInt16(v) => Cell::Int(v.into()),
            AnyValue::UInt32(v) => Cell::Int(v.into()),
            AnyValue::UInt64(v) => match i64::try_from(v) {
                Ok(v) => Cell::Int(v),
                Err(_) => Cell::Float(v as f64),
            },
            AnyValue::Float32(v) => Cell::Float(v.into()),
            AnyValue::Float64(v) => Cell::Float(v),
            AnyValue::Datetime(v, unit, _) => datetime(v, unit).map_or(Cell::Null, Cell::DateTime),
            AnyValue::Date(days) => DateTime::from_timestamp(i64::from(days) * SECONDS_PER_DAY, 0)
                .map_or(Cell::Null, |dt| Cell::Date(dt.date_naive())),
            other => match other.get_str() {
                Some(s) => Cell::Text(s.to_string()),
                None => Cell::Text(other.to_string()),
            },
        }
    }
}

fn datetime(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value)?,
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value)?,
        TimeUnit::Nanoseconds => DateTime::from_timestamp_nanos(value),
    };
    Some(dt.naive_utc())
}
