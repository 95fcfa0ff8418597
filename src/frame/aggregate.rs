use crate::frame::normalize::EVENT_TYPE_COLUMN;
use crate::types::event_type::{EventType, UnknownEventType};
use crate::types::report::{DailyEventCount, TypeCount};
use crate::types::timestamp::parse_timestamp;
use chrono::{DateTime, NaiveDate};
use polars::prelude::*;

pub const BEGIN_TIME_COLUMN: &str = "beginTime";
pub const START_TIME_COLUMN: &str = "startTime";
const EVENT_DATE_COLUMN: &str = "event_date";
const COUNT_COLUMN: &str = "count";

/// The UTC date of each row: `beginTime` when it holds a timestamp, otherwise `startTime`.
///
/// Rows where neither yields a timestamp get `None`.
pub fn event_dates(frame: &DataFrame) -> PolarsResult<Vec<Option<NaiveDate>>> {
    let begin = column_dates(frame, BEGIN_TIME_COLUMN)?;
    let start = column_dates(frame, START_TIME_COLUMN)?;
    let pick = |dates: &Option<Vec<Option<NaiveDate>>>, row: usize| {
        dates.as_ref().and_then(|dates| dates[row])
    };
    Ok((0..frame.height())
        .map(|row| pick(&begin, row).or_else(|| pick(&start, row)))
        .collect())
}

fn column_dates(frame: &DataFrame, name: &str) -> PolarsResult<Option<Vec<Option<NaiveDate>>>> {
    let Ok(column) = frame.column(name) else {
        return Ok(None);
    };
    let dates: Vec<Option<NaiveDate>> = match column.dtype() {
        DataType::Datetime(_, _) => {
            let millis = column
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            millis
                .i64()?
                .into_iter()
                .map(|ms| {
                    ms.and_then(DateTime::from_timestamp_millis)
                        .map(|dt| dt.date_naive())
                })
                .collect()
        }
        DataType::String => column
            .str()?
            .into_iter()
            .map(|value| value.and_then(parse_timestamp).map(|dt| dt.date()))
            .collect(),
        _ => vec![None; column.len()],
    };
    Ok(Some(dates))
}

/// Counts events per (UTC date, event type).
///
/// Ordered by date ascending; event types sharing a date keep the order in which they first
/// appear in `frame`. Rows without a usable `beginTime`/`startTime` are left out.
pub fn aggregate_by_date(frame: &DataFrame) -> PolarsResult<Vec<DailyEventCount>> {
    if frame.height() == 0 || frame.get_column_index(EVENT_TYPE_COLUMN).is_none() {
        return Ok(Vec::new());
    }

    let dates = event_dates(frame)?;

    let grouped = DataFrame::new(vec![
        Column::new(EVENT_DATE_COLUMN.into(), dates),
        frame.column(EVENT_TYPE_COLUMN)?.clone(),
    ])?
    .lazy()
    .filter(col(EVENT_DATE_COLUMN).is_not_null())
    .group_by_stable([col(EVENT_DATE_COLUMN), col(EVENT_TYPE_COLUMN)])
    .agg([len().alias(COUNT_COLUMN)])
    .collect()?;

    let dates = grouped
        .column(EVENT_DATE_COLUMN)?
        .as_materialized_series()
        .date()?
        .as_date_iter();
    let types = grouped.column(EVENT_TYPE_COLUMN)?.str()?;
    let counts = grouped.column(COUNT_COLUMN)?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    let mut series = Vec::with_capacity(grouped.height());
    for ((date, event_type), count) in dates.zip(types.into_iter()).zip(counts.into_iter()) {
        let (Some(date), Some(event_type), Some(count)) = (date, event_type, count) else {
            continue;
        };
        series.push(DailyEventCount {
            date,
            event_type: parse_event_type(event_type)?,
            count,
        });
    }
    // Stable, so types within a date stay in encounter order.
    series.sort_by_key(|entry| entry.date);
    Ok(series)
}

/// Counts rows per event type, in order of first appearance.
pub fn aggregate_by_type(frame: &DataFrame) -> PolarsResult<Vec<TypeCount>> {
    if frame.height() == 0 || frame.get_column_index(EVENT_TYPE_COLUMN).is_none() {
        return Ok(Vec::new());
    }

    let grouped = frame
        .clone()
        .lazy()
        .group_by_stable([col(EVENT_TYPE_COLUMN)])
        .agg([len().alias(COUNT_COLUMN)])
        .collect()?;

    let types = grouped.column(EVENT_TYPE_COLUMN)?.str()?;
    let counts = grouped.column(COUNT_COLUMN)?.cast(&DataType::UInt64)?;
    let counts = counts.u64()?;

    types
        .into_iter()
        .zip(counts.into_iter())
        .filter_map(|(event_type, count)| Some((event_type?, count?)))
        .map(|(event_type, count)| {
            Ok(TypeCount {
                event_type: parse_event_type(event_type)?,
                count,
            })
        })
        .collect()
}

fn parse_event_type(value: &str) -> PolarsResult<EventType> {
    value
        .parse()
        .map_err(|e: UnknownEventType| {
            PolarsError::ComputeError(e.to_string().into())
        })
}
