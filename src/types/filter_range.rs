//! Numeric range predicates applied to the canonical event frames.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A closed numeric interval `[min, max]`.
///
/// # Examples
///
/// ```
/// use donki::FilterRange;
///
/// let range = FilterRange::new(0.0, 3000.0);
/// assert!(range.contains(3000.0));
/// assert!(!range.contains(3000.5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterRange {
    pub min: f64,
    pub max: f64,
}

impl FilterRange {
    /// Default CME speed range in km/s.
    pub const CME_SPEED: FilterRange = FilterRange::new(0.0, 3000.0);
    /// Default GST planetary Kp index range.
    pub const GST_KP: FilterRange = FilterRange::new(0.0, 9.0);

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive on both ends. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// A range is usable when both bounds are numbers and `min <= max`.
    pub fn is_valid(&self) -> bool {
        !self.min.is_nan() && !self.max.is_nan() && self.min <= self.max
    }
}

impl From<(f64, f64)> for FilterRange {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

impl fmt::Display for FilterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// The per-event-type filters of one query.
///
/// `cme_speed` only applies to [`crate::EventType::CoronalMassEjection`] rows and `gst_kp`
/// only to [`crate::EventType::GeomagneticStorm`] rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventFilters {
    pub cme_speed: FilterRange,
    pub gst_kp: FilterRange,
}

impl Default for EventFilters {
    fn default() -> Self {
        Self {
            cme_speed: FilterRange::CME_SPEED,
            gst_kp: FilterRange::GST_KP,
        }
    }
}
