//! Defines the space-weather event categories served by the DONKI API.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of a DONKI space-weather event.
///
/// Every category maps to one DONKI endpoint (its [`EventType::path_segment`]) and carries its
/// own record schema. The pipeline never relies on a fixed schema, so supporting a new category
/// only requires a new variant here.
///
/// # Examples
///
/// ```
/// use donki::EventType;
///
/// assert_eq!(EventType::CoronalMassEjection.to_string(), "CME");
/// assert_eq!("GST".parse::<EventType>().unwrap(), EventType::GeomagneticStorm);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventType {
    /// Solar flare (`FLR`). Records carry `beginTime`, `peakTime`, `endTime` and `classType`.
    #[serde(rename = "FLR")]
    Flare,
    /// Coronal mass ejection (`CME`). Records carry `startTime` and, when analysed, `speed`.
    #[serde(rename = "CME")]
    CoronalMassEjection,
    /// Geomagnetic storm (`GST`). Records carry `startTime` and a Kp index.
    #[serde(rename = "GST")]
    GeomagneticStorm,
}

impl EventType {
    /// All supported event types, in the order they are usually presented.
    pub const ALL: [EventType; 3] = [
        EventType::Flare,
        EventType::CoronalMassEjection,
        EventType::GeomagneticStorm,
    ];

    /// The DONKI endpoint name, which is also the value stored in the `event_type` column.
    pub fn path_segment(&self) -> &'static str {
        match self {
            EventType::Flare => "FLR",
            EventType::CoronalMassEjection => "CME",
            EventType::GeomagneticStorm => "GST",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            EventType::Flare => "Solar flare",
            EventType::CoronalMassEjection => "Coronal mass ejection",
            EventType::GeomagneticStorm => "Geomagnetic storm",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown event type '{0}', expected one of FLR, CME, GST")]
pub struct UnknownEventType(pub String);

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.path_segment().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownEventType(s.to_string()))
    }
}
