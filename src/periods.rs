//! NHPP analysis periods and the day-type/hour classification rule.
//!
//! The federal reliability methodology splits the week into four reporting
//! periods (three weekday, one weekend) plus an off-period for everything
//! else. Classification is a pure function of day type and clock hour.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use thiserror::Error;

/// Day-of-week bucket used by the reliability periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Buckets a calendar date: Saturday and Sunday are weekend, all other
    /// days weekday. Uses chrono's proleptic Gregorian weekday, no custom
    /// day counting.
    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayType::Weekend,
            _ => DayType::Weekday,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        }
    }
}

/// NHPP reliability analysis period.
///
/// | Index | Name          | Condition               |
/// |-------|---------------|-------------------------|
/// | 0     | none          | outside all windows     |
/// | 1     | weekday_6_10  | weekday, hour in [6,10) |
/// | 2     | weekday_10_16 | weekday, hour in [10,16)|
/// | 3     | weekday_16_20 | weekday, hour in [16,20)|
/// | 4     | weekend_6_20  | weekend, hour in [6,20) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NhppPeriod {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "weekday_6_10")]
    Weekday6To10,
    #[serde(rename = "weekday_10_16")]
    Weekday10To16,
    #[serde(rename = "weekday_16_20")]
    Weekday16To20,
    #[serde(rename = "weekend_6_20")]
    Weekend6To20,
}

impl NhppPeriod {
    /// The four periods the federal measure reports on. The off-period is
    /// excluded here but can still be requested explicitly.
    pub const REPORTED: [NhppPeriod; 4] = [
        NhppPeriod::Weekday6To10,
        NhppPeriod::Weekday10To16,
        NhppPeriod::Weekday16To20,
        NhppPeriod::Weekend6To20,
    ];

    pub fn index(self) -> u8 {
        match self {
            NhppPeriod::None => 0,
            NhppPeriod::Weekday6To10 => 1,
            NhppPeriod::Weekday10To16 => 2,
            NhppPeriod::Weekday16To20 => 3,
            NhppPeriod::Weekend6To20 => 4,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(NhppPeriod::None),
            1 => Some(NhppPeriod::Weekday6To10),
            2 => Some(NhppPeriod::Weekday10To16),
            3 => Some(NhppPeriod::Weekday16To20),
            4 => Some(NhppPeriod::Weekend6To20),
            _ => None,
        }
    }

    /// Column name for this period's ratio in the summary table.
    pub fn lottr_column(self) -> String {
        format!("p{}_lottr", self.index())
    }

    pub fn name(self) -> &'static str {
        match self {
            NhppPeriod::None => "none",
            NhppPeriod::Weekday6To10 => "weekday_6_10",
            NhppPeriod::Weekday10To16 => "weekday_10_16",
            NhppPeriod::Weekday16To20 => "weekday_16_20",
            NhppPeriod::Weekend6To20 => "weekend_6_20",
        }
    }
}

impl std::fmt::Display for NhppPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Hour outside the 24-hour clock.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("hour {0} is outside the 24-hour clock")]
pub struct InvalidHour(pub u32);

/// Maps a (day type, clock hour) pair to its NHPP period.
///
/// The weekend test comes first and is not a fallback: weekend hours
/// outside [6, 20) land in [`NhppPeriod::None`], never in a weekday
/// bucket. Hours use the 24-hour clock; anything above 23 is a caller
/// error.
pub fn classify(day_type: DayType, hour: u32) -> Result<NhppPeriod, InvalidHour> {
    if hour > 23 {
        return Err(InvalidHour(hour));
    }
    Ok(classify_clock(day_type, hour))
}

/// Classification for an hour already known to be on the 24-hour clock,
/// e.g. one taken from a chrono timestamp.
pub(crate) fn classify_clock(day_type: DayType, hour: u32) -> NhppPeriod {
    match day_type {
        DayType::Weekend => {
            if (6..20).contains(&hour) {
                NhppPeriod::Weekend6To20
            } else {
                NhppPeriod::None
            }
        }
        DayType::Weekday => match hour {
            6..=9 => NhppPeriod::Weekday6To10,
            10..=15 => NhppPeriod::Weekday10To16,
            16..=19 => NhppPeriod::Weekday16To20,
            _ => NhppPeriod::None,
        },
    }
}
