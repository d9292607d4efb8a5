use crate::error::{DeliveryError, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A half-open `[start, end)` time-of-day interval with minute resolution.
///
/// Both bounds are minutes since midnight; construction enforces
/// `start < end`, so zero-length and inverted intervals are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeInterval {
    start: u16,
    end: u16,
}

const MINUTES_PER_DAY: u16 = 24 * 60;

impl TimeInterval {
    pub fn new(start: u16, end: u16) -> Result<Self> {
        if start >= end {
            return Err(DeliveryError::InvalidInterval(format!(
                "start ({start}) must be less than end ({end})"
            )));
        }
        if end > MINUTES_PER_DAY {
            return Err(DeliveryError::InvalidInterval(format!(
                "end ({end}) exceeds minutes in a day"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    /// Half-open overlap test. Intervals that merely touch at a boundary
    /// (`a.end == b.start`) do not intersect.
    pub fn intersects(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Returns whether any delivery interval overlaps any working interval.
///
/// An empty set on either side never matches: an order with no delivery
/// window cannot be handed over, and a courier with no working hours cannot
/// take anything.
pub fn matches(delivery_hours: &[TimeInterval], working_hours: &[TimeInterval]) -> bool {
    delivery_hours
        .iter()
        .any(|dh| working_hours.iter().any(|wh| dh.intersects(wh)))
}

/// Parses one `HH:MM` component of the wire format, strict two-digit fields.
fn parse_minute_of_day(text: &str) -> Result<u16> {
    let invalid = || DeliveryError::InvalidInterval(format!("malformed time of day: {text:?}"));

    let (hours, minutes) = text.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    let hours: u16 = hours.parse().map_err(|_| invalid())?;
    let minutes: u16 = minutes.parse().map_err(|_| invalid())?;
    if hours >= 24 || minutes >= 60 {
        return Err(invalid());
    }
    Ok(hours * 60 + minutes)
}

impl FromStr for TimeInterval {
    type Err = DeliveryError;

    /// Parses the `HH:MM-HH:MM` wire format.
    fn from_str(text: &str) -> Result<Self> {
        let (start, end) = text.split_once('-').ok_or_else(|| {
            DeliveryError::InvalidInterval(format!("malformed interval: {text:?}"))
        })?;
        Self::new(parse_minute_of_day(start)?, parse_minute_of_day(end)?)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

impl Serialize for TimeInterval {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
