//! Turns the raw records of one event type into a canonical polars `DataFrame`.

use crate::events::source::RawEvent;
use crate::types::event_type::EventType;
use crate::types::timestamp::{has_datetime_separator, parse_timestamp};
use log::debug;
use polars::prelude::*;
use serde_json::Value;

/// Column tagging every row with the event type it was fetched under.
pub const EVENT_TYPE_COLUMN: &str = "event_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Null,
    Boolean,
    Integer,
    Float,
    Text,
}

/// Builds the canonical frame for `events`.
///
/// Columns are the union of the record keys in first-seen order, missing keys become null.
/// String columns that look like date-times are converted to `Datetime(ms)` when every value
/// parses; otherwise they are kept as strings. An `event_type` column is appended.
pub fn normalize_events(event_type: EventType, events: &[RawEvent]) -> PolarsResult<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    for event in events {
        for key in event.keys() {
            if key != EVENT_TYPE_COLUMN && !names.contains(&key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len() + 1);
    for name in names {
        let values: Vec<Option<&Value>> = events
            .iter()
            .map(|event| event.get(name).filter(|v| !v.is_null()))
            .collect();
        columns.push(build_column(name, &values)?);
    }
    columns.push(Column::new(
        EVENT_TYPE_COLUMN.into(),
        vec![event_type.path_segment(); events.len()],
    ));

    let frame = DataFrame::new(columns)?;
    debug!(
        "Normalized {} {} events into {} columns",
        frame.height(),
        event_type,
        frame.width()
    );
    Ok(frame)
}

fn build_column(name: &str, values: &[Option<&Value>]) -> PolarsResult<Column> {
    let column = match infer_kind(values) {
        ColumnKind::Null => Column::full_null(name.into(), values.len(), &DataType::Null),
        ColumnKind::Boolean => Column::new(
            name.into(),
            values
                .iter()
                .map(|v| v.and_then(Value::as_bool))
                .collect::<Vec<_>>(),
        ),
        ColumnKind::Integer => Column::new(
            name.into(),
            values
                .iter()
                .map(|v| v.and_then(Value::as_i64))
                .collect::<Vec<_>>(),
        ),
        ColumnKind::Float => Column::new(
            name.into(),
            values
                .iter()
                .map(|v| v.and_then(Value::as_f64))
                .collect::<Vec<_>>(),
        ),
        ColumnKind::Text => {
            let all_strings = values.iter().flatten().all(|v| v.is_string());
            let texts: Vec<Option<String>> = values
                .iter()
                .map(|v| {
                    v.map(|value| match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect();
            if all_strings {
                if let Some(timestamps) = parse_timestamp_column(name, &texts)? {
                    return Ok(timestamps);
                }
            }
            Column::new(name.into(), texts)
        }
    };
    Ok(column)
}

/// Narrowest type holding every present value. Nested or mixed values fall back to text.
/// A column without any present value stays `Null` so merging can adopt another frame's type.
fn infer_kind(values: &[Option<&Value>]) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for value in values.iter().flatten() {
        let next = match value {
            Value::Bool(_) => ColumnKind::Boolean,
            Value::Number(n) if n.is_i64() => ColumnKind::Integer,
            Value::Number(_) => ColumnKind::Float,
            _ => return ColumnKind::Text,
        };
        kind = Some(match (kind, next) {
            (None, next) => next,
            (Some(current), next) if current == next => current,
            (Some(ColumnKind::Integer), ColumnKind::Float)
            | (Some(ColumnKind::Float), ColumnKind::Integer) => ColumnKind::Float,
            _ => return ColumnKind::Text,
        });
    }
    kind.unwrap_or(ColumnKind::Null)
}

/// Converts the whole column or nothing: a single unparseable value keeps the strings.
fn parse_timestamp_column(name: &str, texts: &[Option<String>]) -> PolarsResult<Option<Column>> {
    if !texts.iter().flatten().any(|t| has_datetime_separator(t)) {
        return Ok(None);
    }

    let mut millis: Vec<Option<i64>> = Vec::with_capacity(texts.len());
    for text in texts {
        match text.as_deref().map(str::trim) {
            None | Some("") => millis.push(None),
            Some(value) => match parse_timestamp(value) {
                Some(datetime) => millis.push(Some(datetime.and_utc().timestamp_millis())),
                None => {
                    debug!(
                        "Keeping column '{}' as text, '{}' is not a timestamp",
                        name, value
                    );
                    return Ok(None);
                }
            },
        }
    }

    Column::new(name.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn raw(value: serde_json::Value) -> Vec<RawEvent> {
        serde_json::from_value(value).unwrap()
    }

    fn millis(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[test]
    fn test_timestamp_columns_are_converted_to_naive_utc() -> PolarsResult<()> {
        let events = raw(json!([
            {"flrID": "2024-01-01T00:00:00-FLR-001", "beginTime": "2024-01-01T00:00Z", "classType": "M1.2"},
            {"flrID": "2024-01-03T05:10:00-FLR-001", "beginTime": "2024-01-03T07:10+02:00", "classType": "X1.0"},
        ]));

        let frame = normalize_events(EventType::Flare, &events)?;

        let begin = frame.column("beginTime")?;
        assert_eq!(
            begin.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        let begin_millis = begin.cast(&DataType::Int64)?;
        let begin_millis = begin_millis.i64()?;
        assert_eq!(begin_millis.get(0), Some(millis(2024, 1, 1, 0, 0)));
        assert_eq!(begin_millis.get(1), Some(millis(2024, 1, 3, 5, 10)));

        // Identifiers contain a date but are not timestamps.
        assert_eq!(frame.column("flrID")?.dtype(), &DataType::String);
        assert_eq!(
            frame.column("flrID")?.str()?.get(0),
            Some("2024-01-01T00:00:00-FLR-001")
        );
        Ok(())
    }

    #[test]
    fn test_one_bad_value_keeps_the_whole_column_as_text() -> PolarsResult<()> {
        let events = raw(json!([
            {"startTime": "2024-01-01T00:00Z"},
            {"startTime": "sometime in 2024"},
        ]));

        let frame = normalize_events(EventType::CoronalMassEjection, &events)?;

        let start = frame.column("startTime")?;
        assert_eq!(start.dtype(), &DataType::String);
        assert_eq!(start.str()?.get(0), Some("2024-01-01T00:00Z"));
        assert_eq!(start.str()?.get(1), Some("sometime in 2024"));
        Ok(())
    }

    #[test]
    fn test_nulls_and_blanks_do_not_block_conversion() -> PolarsResult<()> {
        let events = raw(json!([
            {"endTime": "2024-01-01T01:00Z"},
            {"endTime": null},
            {"endTime": ""},
            {},
        ]));

        let frame = normalize_events(EventType::Flare, &events)?;

        let end = frame.column("endTime")?;
        assert!(matches!(end.dtype(), DataType::Datetime(_, None)));
        assert_eq!(end.null_count(), 3);
        Ok(())
    }

    #[test]
    fn test_event_type_is_appended_and_order_preserved() -> PolarsResult<()> {
        let events = raw(json!([
            {"gstID": "a", "kp_index": 5},
            {"gstID": "b", "kp_index": 7},
            {"gstID": "c", "kp_index": 3},
        ]));

        let frame = normalize_events(EventType::GeomagneticStorm, &events)?;

        let names: Vec<&str> = frame
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, ["gstID", "kp_index", "event_type"]);
        let ids: Vec<Option<&str>> = frame.column("gstID")?.str()?.into_iter().collect();
        assert_eq!(ids, [Some("a"), Some("b"), Some("c")]);
        let types: Vec<Option<&str>> = frame.column(EVENT_TYPE_COLUMN)?.str()?.into_iter().collect();
        assert_eq!(types, [Some("GST"); 3]);
        Ok(())
    }

    #[test]
    fn test_heterogeneous_records_get_a_rectangular_frame() -> PolarsResult<()> {
        let events = raw(json!([
            {"activityID": "x", "speed": 500},
            {"activityID": "y", "note": "halo"},
        ]));

        let frame = normalize_events(EventType::CoronalMassEjection, &events)?;

        assert_eq!(frame.shape(), (2, 4));
        assert_eq!(frame.column("speed")?.i64()?.get(1), None);
        assert_eq!(frame.column("note")?.str()?.get(0), None);
        Ok(())
    }

    #[test]
    fn test_column_typing() -> PolarsResult<()> {
        let events = raw(json!([
            {"count": 1, "speed": 500, "flag": true, "mixed": 1, "instruments": [{"displayName": "SOHO"}]},
            {"count": 2, "speed": 612.5, "flag": false, "mixed": "two", "instruments": []},
        ]));

        let frame = normalize_events(EventType::CoronalMassEjection, &events)?;

        assert_eq!(frame.column("count")?.dtype(), &DataType::Int64);
        assert_eq!(frame.column("speed")?.dtype(), &DataType::Float64);
        assert_eq!(frame.column("speed")?.f64()?.get(0), Some(500.0));
        assert_eq!(frame.column("flag")?.dtype(), &DataType::Boolean);
        assert_eq!(frame.column("mixed")?.str()?.get(0), Some("1"));
        assert_eq!(
            frame.column("instruments")?.str()?.get(0),
            Some(r#"[{"displayName":"SOHO"}]"#)
        );
        Ok(())
    }

    #[test]
    fn test_columns_without_values_are_null_typed() -> PolarsResult<()> {
        let events = raw(json!([
            {"activityID": "x", "startTime": null},
            {"activityID": "y"},
        ]));

        let frame = normalize_events(EventType::CoronalMassEjection, &events)?;

        let start = frame.column("startTime")?;
        assert_eq!(start.dtype(), &DataType::Null);
        assert_eq!(start.null_count(), 2);
        Ok(())
    }

    #[test]
    fn test_no_events_yields_an_empty_tagged_frame() -> PolarsResult<()> {
        let frame = normalize_events(EventType::Flare, &[])?;
        assert_eq!(frame.height(), 0);
        assert!(frame.get_column_index(EVENT_TYPE_COLUMN).is_some());
        Ok(())
    }

    #[test]
    fn test_raw_event_type_field_is_replaced_by_the_tag() -> PolarsResult<()> {
        let events = raw(json!([{"event_type": "bogus", "beginTime": "2024-01-01T00:00Z"}]));
        let frame = normalize_events(EventType::Flare, &events)?;
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.column(EVENT_TYPE_COLUMN)?.str()?.get(0), Some("FLR"));
        Ok(())
    }
}
