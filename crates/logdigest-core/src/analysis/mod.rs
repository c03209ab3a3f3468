mod aggregator;
mod report;

pub use aggregator::{AggregationState, Aggregator, UrlTimings};
pub use report::ReportBuilder;

use serde::Serialize;
use std::path::PathBuf;

/// Latency statistics for a single URL
///
/// Serialized field names are the ones the HTML report table reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRecord {
    pub url: String,
    pub count: usize,
    pub count_perc: f64,
    pub time_sum: f64,
    pub time_perc: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub time_med: f64,
}

/// Finished analysis of one log file
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source: PathBuf,
    pub total_lines: usize,
    pub failed_lines: usize,
    pub error_percent: u32,
    pub total_time: f64,
    pub records: Vec<ReportRecord>,
}
