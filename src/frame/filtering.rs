use crate::types::event_type::EventType;
use crate::types::filter_range::{EventFilters, FilterRange};
use log::debug;
use polars::prelude::{col, lit, DataFrame, DataType, IntoLazy, LazyFrame, PolarsResult};

pub const SPEED_COLUMN: &str = "speed";
pub const KP_INDEX_COLUMN: &str = "kp_index";

pub trait EventFrameFilterExt {
    /// Keeps rows whose `column`, read as a float, lies within `range` (inclusive).
    ///
    /// Values that cannot be read as a number are null and never match, so those rows
    /// are dropped. The column itself is left as it was.
    fn filter_range(self, column: &str, range: FilterRange) -> LazyFrame;

    /// Rewrites `column` as Float64. Values that cannot be coerced become null.
    fn coerce_numeric(self, column: &str) -> LazyFrame;
}

impl EventFrameFilterExt for LazyFrame {
    fn filter_range(self, column: &str, range: FilterRange) -> LazyFrame {
        let value = col(column).cast(DataType::Float64);
        self.filter(
            value
                .clone()
                .gt_eq(lit(range.min))
                .and(value.lt_eq(lit(range.max))),
        )
    }

    fn coerce_numeric(self, column: &str) -> LazyFrame {
        self.with_column(col(column).cast(DataType::Float64))
    }
}

/// Applies the range filter that belongs to `event_type`, if any.
///
/// CME frames are filtered on `speed`, GST frames on `kp_index` (which is coerced to a number
/// first). Frames of other types, or without the relevant column, are returned untouched.
pub fn filter_events(
    event_type: EventType,
    frame: DataFrame,
    filters: &EventFilters,
) -> PolarsResult<DataFrame> {
    let before = frame.height();
    let filtered = match event_type {
        EventType::CoronalMassEjection if has_column(&frame, SPEED_COLUMN) => frame
            .lazy()
            .filter_range(SPEED_COLUMN, filters.cme_speed)
            .collect()?,
        EventType::GeomagneticStorm if has_column(&frame, KP_INDEX_COLUMN) => frame
            .lazy()
            .coerce_numeric(KP_INDEX_COLUMN)
            .filter_range(KP_INDEX_COLUMN, filters.gst_kp)
            .collect()?,
        _ => return Ok(frame),
    };
    debug!(
        "Range filter kept {} of {} {} events",
        filtered.height(),
        before,
        event_type
    );
    Ok(filtered)
}

fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_index(name).is_some()
}
