use crate::parse::ParsedLine;
use crate::{Error, Result};
use std::collections::HashMap;

/// All durations observed for one URL, in log order
#[derive(Debug, Clone, PartialEq)]
pub struct UrlTimings {
    pub url: String,
    pub durations: Vec<f64>,
}

/// Per-URL durations and line counters collected over one log
#[derive(Debug, Clone, Default)]
pub struct AggregationState {
    urls: Vec<UrlTimings>,
    index: HashMap<String, usize>,
    total_lines: usize,
    failed_lines: usize,
    total_duration: f64,
}

impl AggregationState {
    /// URLs in the order they were first seen
    pub fn urls(&self) -> &[UrlTimings] {
        &self.urls
    }

    #[cfg(test)]
    fn durations(&self, url: &str) -> Option<&[f64]> {
        self.index
            .get(url)
            .map(|&i| self.urls[i].durations.as_slice())
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn failed_lines(&self) -> usize {
        self.failed_lines
    }

    #[cfg(test)]
    fn parsed_lines(&self) -> usize {
        self.total_lines - self.failed_lines
    }

    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn is_empty(&self) -> bool {
        self.total_lines == 0
    }

    /// Share of unparsable lines as a whole percent
    ///
    /// Rounds half to even, so 2.5% counts as 2% and 1.5% as 2%.
    pub fn error_percent(&self) -> u32 {
        if self.total_lines == 0 {
            return 0;
        }
        let ratio = self.failed_lines as f64 / self.total_lines as f64;
        (ratio * 100.0).round_ties_even() as u32
    }

    /// Fail when the share of unparsable lines exceeds `max_percent`
    pub fn check_quality(&self, max_percent: u32) -> Result<()> {
        let percent = self.error_percent();
        if percent > max_percent {
            return Err(Error::TooManyUnparsable {
                failed: self.failed_lines,
                total: self.total_lines,
                percent,
                max_percent,
            });
        }
        Ok(())
    }
}

/// Folds a stream of parsed lines into an [`AggregationState`]
#[derive(Debug, Default)]
pub struct Aggregator {
    state: AggregationState,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the whole stream, stopping at the first read error
    pub fn aggregate<I>(lines: I) -> Result<AggregationState>
    where
        I: IntoIterator<Item = Result<ParsedLine>>,
    {
        let mut aggregator = Self::new();
        for line in lines {
            aggregator.push(line?);
        }

        let state = aggregator.into_state();
        tracing::info!(
            total_lines = state.total_lines,
            failed_lines = state.failed_lines,
            unique_urls = state.urls.len(),
            "Aggregation complete"
        );
        Ok(state)
    }

    pub fn push(&mut self, line: ParsedLine) {
        let state = &mut self.state;
        state.total_lines += 1;

        match line {
            ParsedLine::Unparsable => state.failed_lines += 1,
            ParsedLine::Record { url, duration } => {
                state.total_duration += duration;
                match state.index.get(&url).copied() {
                    Some(i) => state.urls[i].durations.push(duration),
                    None => {
                        state.index.insert(url.clone(), state.urls.len());
                        state.urls.push(UrlTimings {
                            url,
                            durations: vec![duration],
                        });
                    }
                }
            }
        }
    }

    pub fn into_state(self) -> AggregationState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, duration: f64) -> ParsedLine {
        ParsedLine::Record {
            url: url.to_string(),
            duration,
        }
    }

    fn state_with(failed: usize, total: usize) -> AggregationState {
        let mut aggregator = Aggregator::new();
        for i in 0..total {
            if i < failed {
                aggregator.push(ParsedLine::Unparsable);
            } else {
                aggregator.push(record("/", 0.1));
            }
        }
        aggregator.into_state()
    }

    #[test]
    fn test_groups_by_url_in_first_seen_order() {
        let state = Aggregator::aggregate(vec![
            Ok(record("/b", 1.0)),
            Ok(record("/a", 2.0)),
            Ok(ParsedLine::Unparsable),
            Ok(record("/b", 3.0)),
        ])
        .unwrap();

        assert_eq!(state.total_lines(), 4);
        assert_eq!(state.failed_lines(), 1);
        assert_eq!(state.total_duration(), 6.0);
        let urls: Vec<&str> = state.urls().iter().map(|u| u.url.as_str()).collect();
        assert_eq!(urls, vec!["/b", "/a"]);
        assert_eq!(state.durations("/b"), Some(&[1.0, 3.0][..]));
        assert_eq!(state.durations("/missing"), None);
    }

    #[test]
    fn test_conservation() {
        let state = state_with(7, 250);
        let counted: usize = state.urls().iter().map(|u| u.durations.len()).sum();
        assert_eq!(state.failed_lines() + counted, state.total_lines());
        assert_eq!(state.parsed_lines(), counted);
    }

    #[test]
    fn test_read_error_aborts() {
        let lines = vec![
            Ok(record("/a", 1.0)),
            Err(Error::Io(std::io::Error::other("disk gone"))),
            Ok(record("/a", 1.0)),
        ];
        assert!(matches!(Aggregator::aggregate(lines), Err(Error::Io(_))));
    }

    #[test]
    fn test_empty_stream() {
        let state = Aggregator::aggregate(Vec::<Result<ParsedLine>>::new()).unwrap();
        assert!(state.is_empty());
        assert_eq!(state.error_percent(), 0);
        assert!(state.check_quality(1).is_ok());
    }

    #[test]
    fn test_error_percent_rounding_boundaries() {
        // 1.4% rounds down, 1.5% rounds up
        assert_eq!(state_with(14, 1000).error_percent(), 1);
        assert!(state_with(14, 1000).check_quality(1).is_ok());
        assert_eq!(state_with(15, 1000).error_percent(), 2);
        assert!(state_with(15, 1000).check_quality(1).is_err());
    }

    #[test]
    fn test_quality_gate_threshold() {
        let state = state_with(2, 100);
        assert_eq!(state.error_percent(), 2);

        match state.check_quality(1) {
            Err(Error::TooManyUnparsable {
                failed,
                total,
                percent,
                max_percent,
            }) => {
                assert_eq!((failed, total, percent, max_percent), (2, 100, 2, 1));
            }
            other => panic!("expected quality gate failure, got {:?}", other),
        }
        assert!(state.check_quality(5).is_ok());
    }

    #[test]
    fn test_all_lines_unparsable() {
        let state = state_with(10, 10);
        assert_eq!(state.error_percent(), 100);
        assert!(state.urls().is_empty());
        assert!(state.check_quality(1).is_err());
    }
}
