//! Row-level parsing and validation for NPMRDS measurement records.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::analyzers::types::{Observation, RawObservation};

/// Per-record validation failure. Each variant invalidates one row; none
/// of them abort an aggregation run.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("malformed timestamp {0:?}")]
    MalformedTimestamp(String),
    #[error("travel time {0:?} is not a non-negative number")]
    InvalidTravelTime(String),
    #[error("record has no segment identifier")]
    MissingSegment,
}

/// Accepted layouts for `measurement_tstamp`. NPMRDS exports write
/// ISO `2019-01-02 10:15:00`; some drop the seconds.
const TSTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parses the ISO `YYYY-MM-DD HH:MM[:SS]` timestamp used by NPMRDS
/// exports. No timezone conversion is applied.
///
/// Older feeds used the day-first `MM/DD/YYYY` ordering. Those are
/// rejected rather than guessed at: a silent day/month swap would shuffle
/// observations between weekday and weekend buckets.
///
/// # Errors
///
/// Returns [`ParseError::MalformedTimestamp`] for anything outside the
/// accepted layouts.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, ParseError> {
    let raw = raw.trim();
    TSTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| ParseError::MalformedTimestamp(raw.to_string()))
}

/// Validates one raw CSV row into an [`Observation`].
///
/// Travel times must be finite and non-negative. Zeroes are kept: they
/// show up in real exports and are handled downstream as null ratios
/// instead of division errors.
pub fn parse_observation(raw: &RawObservation) -> Result<Observation, ParseError> {
    let tmc_code = raw.tmc_code.trim();
    if tmc_code.is_empty() {
        return Err(ParseError::MissingSegment);
    }

    let timestamp = parse_timestamp(&raw.measurement_tstamp)?;

    let travel_time: f64 = raw
        .travel_time_seconds
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidTravelTime(raw.travel_time_seconds.clone()))?;
    if !travel_time.is_finite() || travel_time < 0.0 {
        return Err(ParseError::InvalidTravelTime(raw.travel_time_seconds.clone()));
    }

    Ok(Observation {
        tmc_code: tmc_code.to_string(),
        timestamp,
        travel_time_seconds: travel_time,
    })
}
