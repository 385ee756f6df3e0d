//! The travel-time reliability pipeline.
//!
//! This module partitions classified observations by segment and NHPP
//! period, reduces each group to its percentile-based LOTTR ratio, and
//! joins the per-period results into one summary row per segment.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
