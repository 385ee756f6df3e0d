use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::analyzers::types::{
    AggregateReport, ClassifiedObservation, RawObservation, SummaryRow,
};
use crate::parser::parse_observation;
use crate::periods::NhppPeriod;
use crate::stats::PeriodStat;

/// Aggregates raw measurement rows into one LOTTR summary row per segment.
///
/// Each row is parsed and classified into its NHPP period; rows that fail
/// validation are skipped and counted, never fatal. Observations are then
/// partitioned by (segment, period), each group reduced to its 50th/80th
/// percentile ratio, and the per-period tables inner-joined: a segment
/// missing from any requested period is dropped from the summary.
///
/// Pure given its inputs; running it twice on the same rows returns the
/// same report.
pub fn aggregate(rows: &[RawObservation], periods: &[NhppPeriod]) -> AggregateReport {
    let requested: BTreeSet<NhppPeriod> = periods.iter().copied().collect();

    // Parse & classify, partitioning as we go. Off-period observations
    // only participate when that period was asked for explicitly.
    let mut skipped_records = 0usize;
    let mut groups: HashMap<(String, NhppPeriod), Vec<f64>> = HashMap::new();
    for raw in rows {
        let observation = match parse_observation(raw) {
            Ok(observation) => observation,
            Err(err) => {
                warn!(tmc_code = %raw.tmc_code, error = %err, "Skipping measurement row");
                skipped_records += 1;
                continue;
            }
        };

        let classified = ClassifiedObservation::derive(observation);
        if !requested.contains(&classified.period) {
            continue;
        }

        groups
            .entry((classified.observation.tmc_code.clone(), classified.period))
            .or_default()
            .push(classified.observation.travel_time_seconds);
    }

    // Per-period stat tables. Groups exist only where observations landed,
    // so every group reduces to a stat.
    let mut tables: BTreeMap<NhppPeriod, BTreeMap<String, PeriodStat>> =
        requested.iter().map(|p| (*p, BTreeMap::new())).collect();
    for ((tmc_code, period), values) in groups {
        debug!(tmc_code = %tmc_code, period = %period, n = values.len(), "Reducing group");
        if let Some(stat) = PeriodStat::from_travel_times(values) {
            if let Some(table) = tables.get_mut(&period) {
                table.insert(tmc_code, stat);
            }
        }
    }

    let empty_periods: Vec<NhppPeriod> = tables
        .iter()
        .filter(|(_, table)| table.is_empty())
        .map(|(period, _)| *period)
        .collect();

    // Inner join: only segments present in every requested period survive.
    let all_segments: BTreeSet<String> = tables
        .values()
        .flat_map(|table| table.keys().cloned())
        .collect();

    let mut summary: BTreeMap<String, SummaryRow> = BTreeMap::new();
    let mut dropped_segments = 0usize;
    for tmc_code in all_segments {
        if tables.values().all(|table| table.contains_key(&tmc_code)) {
            let lottr = tables
                .iter()
                .map(|(period, table)| (*period, table[&tmc_code].lottr))
                .collect();
            summary.insert(
                tmc_code.clone(),
                SummaryRow {
                    tmc_code,
                    lottr,
                },
            );
        } else {
            dropped_segments += 1;
        }
    }

    AggregateReport {
        periods: requested.into_iter().collect(),
        rows: summary,
        skipped_records,
        dropped_segments,
        empty_periods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tmc: &str, tstamp: &str, travel_time: &str) -> RawObservation {
        RawObservation {
            tmc_code: tmc.to_string(),
            measurement_tstamp: tstamp.to_string(),
            travel_time_seconds: travel_time.to_string(),
        }
    }

    /// Five rows per weekday morning period with the canonical 100..500
    /// spread: p50 = 300, p80 = 420, lottr = 1.40.
    fn morning_spread(tmc: &str) -> Vec<RawObservation> {
        // 2019-01-02 was a Wednesday
        vec![
            raw(tmc, "2019-01-02 06:00:00", "100"),
            raw(tmc, "2019-01-02 07:00:00", "200"),
            raw(tmc, "2019-01-02 08:00:00", "300"),
            raw(tmc, "2019-01-02 09:00:00", "400"),
            raw(tmc, "2019-01-02 09:59:00", "500"),
        ]
    }

    #[test]
    fn test_single_segment_single_period() {
        let rows = morning_spread("110N04128");
        let report = aggregate(&rows, &[NhppPeriod::Weekday6To10]);

        assert_eq!(report.rows.len(), 1);
        let row = &report.rows["110N04128"];
        assert_eq!(row.lottr[&NhppPeriod::Weekday6To10], Some(1.40));
        assert_eq!(report.skipped_records, 0);
        assert!(report.empty_periods.is_empty());
    }

    #[test]
    fn test_inner_join_drops_partial_segments() {
        let mut rows = morning_spread("110N04128");
        // Second segment only has morning observations, so it must not
        // survive a join that also asks for the midday period.
        rows.extend(morning_spread("110N04129"));
        rows.push(raw("110N04128", "2019-01-02 12:00:00", "100"));

        let report = aggregate(
            &rows,
            &[NhppPeriod::Weekday6To10, NhppPeriod::Weekday10To16],
        );

        assert_eq!(report.rows.len(), 1);
        assert!(report.rows.contains_key("110N04128"));
        assert!(!report.rows.contains_key("110N04129"));
        assert_eq!(report.dropped_segments, 1);
    }

    #[test]
    fn test_malformed_rows_are_skipped_and_counted() {
        let mut rows = morning_spread("110N04128");
        rows.push(raw("110N04128", "1/2/2019 10:15", "100"));
        rows.push(raw("110N04128", "2019-01-02 08:00:00", "abc"));
        rows.push(raw("", "2019-01-02 08:00:00", "100"));

        let report = aggregate(&rows, &[NhppPeriod::Weekday6To10]);

        assert_eq!(report.skipped_records, 3);
        // The valid rows still aggregate.
        let row = &report.rows["110N04128"];
        assert_eq!(row.lottr[&NhppPeriod::Weekday6To10], Some(1.40));
    }

    #[test]
    fn test_off_period_rows_do_not_leak_into_buckets() {
        let mut rows = morning_spread("110N04128");
        // Saturday 05:00 is outside every reporting window.
        rows.push(raw("110N04128", "2019-01-05 05:00:00", "9999"));

        let report = aggregate(&rows, &[NhppPeriod::Weekday6To10]);

        let row = &report.rows["110N04128"];
        assert_eq!(row.lottr[&NhppPeriod::Weekday6To10], Some(1.40));
    }

    #[test]
    fn test_off_period_can_be_requested_explicitly() {
        let rows = vec![
            raw("110N04128", "2019-01-05 05:00:00", "100"),
            raw("110N04128", "2019-01-05 04:00:00", "100"),
        ];

        let report = aggregate(&rows, &[NhppPeriod::None]);

        let row = &report.rows["110N04128"];
        assert_eq!(row.lottr[&NhppPeriod::None], Some(1.0));
    }

    #[test]
    fn test_weekend_rows_fill_the_weekend_bucket_only() {
        // 2019-01-05 was a Saturday; 10:00 on a weekday would be period 2.
        let rows = vec![
            raw("110N04128", "2019-01-05 10:00:00", "100"),
            raw("110N04128", "2019-01-05 11:00:00", "120"),
        ];

        let report = aggregate(
            &rows,
            &[NhppPeriod::Weekday10To16, NhppPeriod::Weekend6To20],
        );

        // Present only in the weekend table, so the join drops the segment
        // and the weekday table stays empty.
        assert!(report.rows.is_empty());
        assert_eq!(report.dropped_segments, 1);
        assert_eq!(report.empty_periods, vec![NhppPeriod::Weekday10To16]);
    }

    #[test]
    fn test_zero_median_emits_null_cell_not_failure() {
        let mut rows = morning_spread("110N04128");
        rows.push(raw("110N04128", "2019-01-02 12:00:00", "0"));
        rows.push(raw("110N04128", "2019-01-02 13:00:00", "0"));

        let report = aggregate(
            &rows,
            &[NhppPeriod::Weekday6To10, NhppPeriod::Weekday10To16],
        );

        let row = &report.rows["110N04128"];
        assert_eq!(row.lottr[&NhppPeriod::Weekday10To16], None);
        // The other period keeps its value.
        assert_eq!(row.lottr[&NhppPeriod::Weekday6To10], Some(1.40));
    }

    #[test]
    fn test_duplicate_requested_periods_collapse() {
        let rows = morning_spread("110N04128");
        let report = aggregate(
            &rows,
            &[NhppPeriod::Weekday6To10, NhppPeriod::Weekday6To10],
        );
        assert_eq!(report.periods, vec![NhppPeriod::Weekday6To10]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let mut rows = morning_spread("110N04128");
        rows.extend(morning_spread("110N04129"));
        rows.push(raw("110N04128", "bad", "100"));

        let periods = NhppPeriod::REPORTED;
        let first = aggregate(&rows, &periods);
        let second = aggregate(&rows, &periods);

        assert_eq!(first.skipped_records, second.skipped_records);
        assert_eq!(first.dropped_segments, second.dropped_segments);
        assert_eq!(
            first.rows.keys().collect::<Vec<_>>(),
            second.rows.keys().collect::<Vec<_>>()
        );
        for (tmc, row) in &first.rows {
            assert_eq!(row.lottr, second.rows[tmc].lottr);
        }
    }
}
