use crate::types::timestamp::ISO_DATETIME_FORMAT;
use chrono::DateTime;
use log::debug;
use polars::prelude::{Column, DataFrame, DataType, PlSmallStr, PolarsResult, TimeUnit};

/// Stacks per-type frames into one rectangular frame.
///
/// The result has the union of all columns in first-seen order. Frames lacking a column get
/// nulls for it. A column whose dtype differs between frames is widened: mixed integer and
/// float become Float64, anything else becomes String. Timestamps widened to String are
/// written as `YYYY-MM-DDTHH:MM:SS`. A column that is null everywhere ends up as String.
pub fn merge_frames(frames: Vec<DataFrame>) -> PolarsResult<DataFrame> {
    let mut schema: Vec<(PlSmallStr, DataType)> = Vec::new();
    for frame in &frames {
        for column in frame.get_columns() {
            match schema.iter_mut().find(|(name, _)| name == column.name()) {
                Some((_, dtype)) => *dtype = unify(dtype, column.dtype()),
                None => schema.push((column.name().clone(), column.dtype().clone())),
            }
        }
    }
    for (_, dtype) in schema.iter_mut() {
        if *dtype == DataType::Null {
            *dtype = DataType::String;
        }
    }

    let mut merged: Option<DataFrame> = None;
    for frame in &frames {
        let aligned = align(frame, &schema)?;
        match merged.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&aligned)?;
            }
            None => merged = Some(aligned),
        }
    }

    let merged = merged.unwrap_or_else(DataFrame::empty);
    debug!(
        "Merged {} frames into {} rows and {} columns",
        frames.len(),
        merged.height(),
        merged.width()
    );
    Ok(merged)
}

fn align(frame: &DataFrame, schema: &[(PlSmallStr, DataType)]) -> PolarsResult<DataFrame> {
    let height = frame.height();
    let columns = schema
        .iter()
        .map(|(name, dtype)| match frame.column(name.as_str()) {
            Ok(column) if column.dtype() == dtype => Ok(column.clone()),
            Ok(column)
                if *dtype == DataType::String
                    && matches!(column.dtype(), DataType::Datetime(_, _) | DataType::Date) =>
            {
                iso_strings(column)
            }
            Ok(column) => column.cast(dtype),
            Err(_) => Ok(Column::full_null(name.clone(), height, dtype)),
        })
        .collect::<PolarsResult<Vec<_>>>()?;
    DataFrame::new(columns)
}

fn iso_strings(column: &Column) -> PolarsResult<Column> {
    let millis = column
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    let texts: Vec<Option<String>> = millis
        .i64()?
        .into_iter()
        .map(|ms| {
            ms.and_then(DateTime::from_timestamp_millis)
                .map(|dt| dt.naive_utc().format(ISO_DATETIME_FORMAT).to_string())
        })
        .collect();
    Ok(Column::new(column.name().clone(), texts))
}

fn unify(left: &DataType, right: &DataType) -> DataType {
    let is_number = |dtype: &DataType| matches!(dtype, DataType::Int64 | DataType::Float64);
    if left == right {
        left.clone()
    } else if *left == DataType::Null {
        right.clone()
    } else if *right == DataType::Null {
        left.clone()
    } else if is_number(left) && is_number(right) {
        DataType::Float64
    } else {
        DataType::String
    }
}
