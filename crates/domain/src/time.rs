//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};

/// UTC timestamp used for entry/exit times and service date ranges.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render a timestamp the way it is stored and returned by the API
/// (RFC 3339, second precision, `Z` suffix).
#[must_use]
pub fn format(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Naive layouts accepted in addition to RFC 3339; they are read as UTC.
const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse an ISO 8601 timestamp into UTC.
///
/// Values with an offset are converted; values without one are taken as UTC.
/// Sub-second precision is dropped to match what storage keeps.
///
/// # Errors
///
/// Returns the chrono parse error of the RFC 3339 attempt when no layout matches.
pub fn parse(value: &str) -> Result<Timestamp, chrono::ParseError> {
    let err = match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => return Ok(dt.with_timezone(&Utc).trunc_subsecs(0)),
        Err(err) => err,
    };
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc().trunc_subsecs(0))
        .ok_or(err)
}
