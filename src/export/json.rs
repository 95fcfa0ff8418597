use crate::export::cell::Cell;
use crate::export::ExportError;
use polars::prelude::DataFrame;
use crate::types::timestamp::ISO_DATETIME_FORMAT;
use serde_json::{Map, Number, Value};

pub const JSON_DATETIME_FORMAT: &str = ISO_DATETIME_FORMAT;

/// One JSON object per row, keyed by column name in column order.
///
/// Datetimes become `YYYY-MM-DDTHH:MM:SS` strings; nulls and non-finite floats become `null`.
pub fn to_json_records(frame: &DataFrame) -> Result<Vec<Map<String, Value>>, ExportError> {
    let columns = frame.get_columns();
    let mut records = Vec::with_capacity(frame.height());
    for row in 0..frame.height() {
        let mut record = Map::with_capacity(columns.len());
        for column in columns {
            let cell = Cell::from(column.as_materialized_series().get(row)?);
            record.insert(column.name().to_string(), json_value(cell));
        }
        records.push(record);
    }
    Ok(records)
}

/// The records of [`to_json_records`] as a JSON array string.
pub fn to_json(frame: &DataFrame) -> Result<String, ExportError> {
    Ok(serde_json::to_string(&to_json_records(frame)?)?)
}

fn json_value(cell: Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => Value::Bool(b),
        Cell::Int(v) => Value::Number(v.into()),
        Cell::Float(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        Cell::Text(s) => Value::String(s),
        Cell::DateTime(dt) => Value::String(dt.format(JSON_DATETIME_FORMAT).to_string()),
        Cell::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
    }
}
