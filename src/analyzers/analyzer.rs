use std::fs::File;
use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::{AggregateReport, ClassifiedObservation, RawObservation};
use crate::output::{write_classified, write_summary};
use crate::parser::parse_observation;
use crate::periods::NhppPeriod;

/// Reads raw measurement rows from an NPMRDS-style CSV export.
///
/// Rows the CSV layer cannot deserialize are skipped and counted, the
/// same per-record recovery the aggregation applies to its own
/// validation. Returns the rows plus the unreadable-row count.
pub fn load_observations(path: impl AsRef<Path>) -> Result<(Vec<RawObservation>, usize)> {
    let file = File::open(path.as_ref())?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    let mut unreadable = 0usize;
    for result in rdr.deserialize() {
        match result {
            Ok(record) => rows.push(record),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable CSV row");
                unreadable += 1;
            }
        }
    }

    Ok((rows, unreadable))
}

/// Runs the whole reliability pipeline for one measurement file and
/// writes the per-segment summary CSV.
pub fn analyze(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    periods: &[NhppPeriod],
) -> Result<AggregateReport> {
    let (rows, unreadable) = load_observations(&input)?;
    info!(rows = rows.len(), unreadable, "Loaded measurement rows");

    let mut report = aggregate(&rows, periods);
    report.skipped_records += unreadable;

    if !report.empty_periods.is_empty() {
        warn!(periods = ?report.empty_periods, "Requested periods received no observations");
    }

    write_summary(&output, &report)?;
    info!(
        segments = report.rows.len(),
        skipped = report.skipped_records,
        dropped = report.dropped_segments,
        "LOTTR summary written"
    );

    Ok(report)
}

/// Annotates each measurement row with its derived day type and NHPP
/// period and writes the result as a CSV. Debugging aid for checking the
/// classification against a feed before aggregating it.
///
/// Returns (rows written, rows skipped).
pub fn classify_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<(usize, usize)> {
    let (rows, unreadable) = load_observations(&input)?;

    let mut classified = Vec::with_capacity(rows.len());
    let mut skipped = unreadable;
    for raw in &rows {
        match parse_observation(raw) {
            Ok(observation) => classified.push(ClassifiedObservation::derive(observation)),
            Err(err) => {
                warn!(tmc_code = %raw.tmc_code, error = %err, "Skipping measurement row");
                skipped += 1;
            }
        }
    }

    write_classified(&output, &classified)?;
    info!(written = classified.len(), skipped, "Classified rows written");

    Ok((classified.len(), skipped))
}
