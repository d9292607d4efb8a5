use crate::error::{DeliveryError, Result};
use chrono::{DateTime, NaiveDateTime};

/// Wire format for timestamps: `YYYY-MM-DDTHH:MM:SS.mmm`, millisecond
/// precision with exactly three digits.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Parses a wire timestamp into epoch seconds (UTC). Sub-second precision is
/// validated but not carried into the domain, which works in whole seconds.
pub fn parse_timestamp(text: &str) -> Result<i64> {
    let parsed = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .map_err(|e| DeliveryError::InvalidTimestamp(format!("{text:?}: {e}")))?;
    Ok(parsed.and_utc().timestamp())
}

/// Formats epoch seconds back into the wire format.
pub fn format_timestamp(epoch_seconds: i64) -> String {
    match DateTime::from_timestamp(epoch_seconds, 0) {
        Some(dt) => dt.naive_utc().format(DATETIME_FORMAT).to_string(),
        None => String::new(),
    }
}
