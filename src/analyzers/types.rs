//! Data types used by the aggregation pipeline.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::periods::{classify_clock, DayType, NhppPeriod};

/// A single measurement row as read from an NPMRDS export.
///
/// The travel-time field stays textual at this layer so that one bad cell
/// invalidates one row, not the whole file read.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    pub tmc_code: String,
    pub measurement_tstamp: String,
    pub travel_time_seconds: String,
}

/// A validated probe observation.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub tmc_code: String,
    pub timestamp: NaiveDateTime,
    pub travel_time_seconds: f64,
}

/// An [`Observation`] enriched with its derived day type and NHPP period.
/// Both are derived once at intake and carried, never recomputed.
#[derive(Debug, Clone)]
pub struct ClassifiedObservation {
    pub observation: Observation,
    pub day_type: DayType,
    pub period: NhppPeriod,
}

impl ClassifiedObservation {
    pub fn derive(observation: Observation) -> Self {
        let day_type = DayType::from_date(observation.timestamp.date());
        // chrono hours are already on the 24-hour clock
        let period = classify_clock(day_type, observation.timestamp.hour());
        ClassifiedObservation {
            observation,
            day_type,
            period,
        }
    }
}

/// Final reliability row for one segment: one nullable LOTTR cell per
/// requested period.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub tmc_code: String,
    pub lottr: BTreeMap<NhppPeriod, Option<f64>>,
}

/// Result of one aggregation run, plus the diagnostics callers need to
/// judge data quality.
#[derive(Debug, Serialize)]
pub struct AggregateReport {
    /// Requested periods, deduplicated, in index order.
    pub periods: Vec<NhppPeriod>,
    /// One row per segment present in every requested period.
    pub rows: BTreeMap<String, SummaryRow>,
    /// Rows dropped for malformed timestamps, bad travel times, or a
    /// missing segment identifier.
    pub skipped_records: usize,
    /// Segments removed by the inner join across periods.
    pub dropped_segments: usize,
    /// Requested periods that received no observations at all.
    pub empty_periods: Vec<NhppPeriod>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn observation(tstamp: NaiveDateTime) -> Observation {
        Observation {
            tmc_code: "110N04128".to_string(),
            timestamp: tstamp,
            travel_time_seconds: 60.0,
        }
    }

    #[test]
    fn test_derive_weekday_morning() {
        let ts = NaiveDate::from_ymd_opt(2019, 1, 2)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        let classified = ClassifiedObservation::derive(observation(ts));
        assert_eq!(classified.day_type, DayType::Weekday);
        assert_eq!(classified.period, NhppPeriod::Weekday6To10);
    }

    #[test]
    fn test_derive_weekend_night_is_off_period() {
        let ts = NaiveDate::from_ymd_opt(2019, 1, 5)
            .unwrap()
            .and_hms_opt(22, 0, 0)
            .unwrap();
        let classified = ClassifiedObservation::derive(observation(ts));
        assert_eq!(classified.day_type, DayType::Weekend);
        assert_eq!(classified.period, NhppPeriod::None);
    }
}
