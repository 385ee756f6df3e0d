//! Output formatting and persistence for reliability results.
//!
//! Supports pretty-printing, JSON serialization, and CSV writing.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{AggregateReport, ClassifiedObservation};
use std::path::Path;

/// Logs an aggregation report using Rust's debug pretty-print format.
pub fn print_pretty(report: &AggregateReport) {
    debug!("{:#?}", report);
}

/// Logs an aggregation report as pretty-printed JSON.
pub fn print_json(report: &AggregateReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes the per-segment summary table as CSV.
///
/// The header is `tmc_code` plus one `pN_lottr` column per requested
/// period, in period-index order. Null ratios become empty cells. Rows
/// are emitted in segment-id order, so repeated runs produce identical
/// files.
pub fn write_summary(path: impl AsRef<Path>, report: &AggregateReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec!["tmc_code".to_string()];
    header.extend(report.periods.iter().map(|p| p.lottr_column()));
    writer.write_record(&header)?;

    for (tmc_code, row) in &report.rows {
        let mut record = vec![tmc_code.clone()];
        for period in &report.periods {
            let cell = row.lottr.get(period).copied().flatten();
            record.push(match cell {
                Some(ratio) => format!("{ratio:.2}"),
                None => String::new(),
            });
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct ClassifiedRecord<'a> {
    tmc_code: &'a str,
    measurement_tstamp: String,
    travel_time_seconds: f64,
    day_of_week: &'static str,
    nhpp_period: u8,
}

/// Writes classified observations as CSV, one annotated row per input
/// observation.
pub fn write_classified(
    path: impl AsRef<Path>,
    rows: &[ClassifiedObservation],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    for classified in rows {
        writer.serialize(ClassifiedRecord {
            tmc_code: &classified.observation.tmc_code,
            measurement_tstamp: classified
                .observation
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            travel_time_seconds: classified.observation.travel_time_seconds,
            day_of_week: classified.day_type.label(),
            nhpp_period: classified.period.index(),
        })?;
    }

    writer.flush()?;
    Ok(())
}
