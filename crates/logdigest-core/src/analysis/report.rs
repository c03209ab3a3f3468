use super::aggregator::{AggregationState, UrlTimings};
use super::{Report, ReportRecord};
use std::path::Path;

/// Turns aggregated durations into the sorted, size-bounded URL table
pub struct ReportBuilder {
    report_size: usize,
}

impl ReportBuilder {
    pub fn new(report_size: usize) -> Self {
        Self { report_size }
    }

    /// One record per URL, slowest total time first, at most `report_size` long
    ///
    /// The sort is stable: URLs with equal `time_sum` keep first-seen order.
    pub fn build(&self, state: &AggregationState) -> Vec<ReportRecord> {
        tracing::debug!("Building report for {} URLs", state.urls().len());

        let mut records: Vec<ReportRecord> = state
            .urls()
            .iter()
            .map(|timings| record(timings, state))
            .collect();

        records.sort_by(|a, b| b.time_sum.total_cmp(&a.time_sum));
        records.truncate(self.report_size);

        records
    }

    pub fn build_report(&self, source: &Path, state: &AggregationState) -> Report {
        Report {
            source: source.to_path_buf(),
            total_lines: state.total_lines(),
            failed_lines: state.failed_lines(),
            error_percent: state.error_percent(),
            total_time: round3(state.total_duration()),
            records: self.build(state),
        }
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(1000)
    }
}

fn record(timings: &UrlTimings, state: &AggregationState) -> ReportRecord {
    let durations = &timings.durations;
    let count = durations.len();
    let sum: f64 = durations.iter().sum();
    let max = durations.iter().copied().fold(f64::MIN, f64::max);

    let time_perc = if state.total_duration() > 0.0 {
        sum / state.total_duration() * 100.0
    } else {
        0.0
    };

    ReportRecord {
        url: timings.url.clone(),
        count,
        count_perc: round3(count as f64 / state.total_lines() as f64 * 100.0),
        time_sum: round3(sum),
        time_perc: round3(time_perc),
        time_avg: round3(sum / count as f64),
        time_max: round3(max),
        time_med: round3(median(durations)),
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Aggregator;
    use crate::parse::ParsedLine;

    fn state(records: &[(&str, f64)]) -> AggregationState {
        let mut aggregator = Aggregator::new();
        for (url, duration) in records {
            aggregator.push(ParsedLine::Record {
                url: url.to_string(),
                duration: *duration,
            });
        }
        aggregator.into_state()
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23449), 1.234);
        assert_eq!(round3(1.2346), 1.235);
        assert_eq!(round3(2.0), 2.0);
    }

    #[test]
    fn test_record_statistics() {
        let state = state(&[("/a", 0.1), ("/a", 0.3), ("/b", 0.6), ("/a", 0.2)]);
        let records = ReportBuilder::default().build(&state);

        assert_eq!(records.len(), 2);
        let a = &records[0];
        assert_eq!(a.url, "/a");
        assert_eq!(a.count, 3);
        assert_eq!(a.count_perc, 75.0);
        assert_eq!(a.time_sum, 0.6);
        assert_eq!(a.time_perc, 50.0);
        assert_eq!(a.time_avg, 0.2);
        assert_eq!(a.time_max, 0.3);
        assert_eq!(a.time_med, 0.2);
    }

    #[test]
    fn test_sorted_by_time_sum_and_truncated() {
        let state = state(&[
            ("/fast", 0.01),
            ("/slow", 5.0),
            ("/medium", 1.0),
            ("/medium", 1.0),
        ]);

        let records = ReportBuilder::new(2).build(&state);
        let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["/slow", "/medium"]);

        let all = ReportBuilder::new(10).build(&state);
        assert_eq!(all.len(), 3);
        assert!(all.windows(2).all(|w| w[0].time_sum >= w[1].time_sum));
    }

    #[test]
    fn test_equal_time_sum_keeps_first_seen_order() {
        let state = state(&[("/x", 1.0), ("/tie-b", 2.0), ("/tie-a", 2.0), ("/y", 0.5)]);

        for _ in 0..5 {
            let records = ReportBuilder::default().build(&state);
            let urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
            assert_eq!(urls, vec!["/tie-b", "/tie-a", "/x", "/y"]);
        }
    }

    #[test]
    fn test_zero_total_duration() {
        let state = state(&[("/a", 0.0), ("/b", 0.0)]);
        let records = ReportBuilder::default().build(&state);
        assert!(records.iter().all(|r| r.time_perc == 0.0));
    }
}
