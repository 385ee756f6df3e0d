//! Per-group travel-time statistics and the LOTTR ratio.

use serde::Serialize;

use crate::analyzers::utility::{percentile, round2};

/// Travel-time statistics for one (segment, period) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStat {
    pub p50_seconds: f64,
    pub p80_seconds: f64,
    /// Ratio of the 80th to the 50th percentile, rounded to two decimals.
    /// `None` when the median is zero.
    pub lottr: Option<f64>,
}

impl PeriodStat {
    /// Computes the statistic for one group of travel times.
    ///
    /// Percentiles use linear interpolation between order statistics, so a
    /// single-observation group returns that value for both. Returns
    /// `None` for an empty group; the aggregation never builds one, since
    /// a group only exists once an observation lands in it.
    pub fn from_travel_times(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.total_cmp(b));

        let p50 = percentile(&values, 0.50);
        let p80 = percentile(&values, 0.80);
        let lottr = if p50 == 0.0 {
            None
        } else {
            Some(round2(p80 / p50))
        };

        Some(PeriodStat {
            p50_seconds: p50,
            p80_seconds: p80,
            lottr,
        })
    }
}
