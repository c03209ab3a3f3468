use crate::analysis::{Aggregator, Report, ReportBuilder};
use crate::locate::{LogFile, LogLocator};
use crate::reader::{LogLines, LogReader};
use crate::render::ReportWriter;
use crate::{Config, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How a digest run ended, short of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new report was written
    ReportWritten(PathBuf),
    /// The report for the latest log is already there; nothing was parsed
    ReportExists(PathBuf),
    /// No file in the log directory matches the configured prefix
    NoLogFile,
    /// The latest log has no lines
    NothingToAnalyze,
}

/// Locate, parse, aggregate and report, driven by one [`Config`]
pub struct Pipeline<'a> {
    config: &'a Config,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn latest_log(&self) -> Result<Option<LogFile>> {
        LogLocator::new(&self.config.log_prefix).latest(&self.config.log_dir)
    }

    pub fn report_path(&self, log: &LogFile) -> PathBuf {
        self.config.report_dir.join(log.report_name())
    }

    /// Analyze a located log; `None` when it has no lines
    pub fn analyze(&self, log: &LogFile) -> Result<Option<Report>> {
        self.analyze_lines(&log.path, LogReader::open(log)?)
    }

    /// Analyze an arbitrary log file; `None` when it has no lines
    pub fn analyze_path(&self, path: &Path) -> Result<Option<Report>> {
        self.analyze_lines(path, LogReader::open_path(path)?)
    }

    fn analyze_lines(&self, source: &Path, lines: LogLines) -> Result<Option<Report>> {
        let start_time = Instant::now();
        tracing::info!("Analyzing {}", source.display());

        let state = Aggregator::aggregate(lines)?;
        if state.is_empty() {
            return Ok(None);
        }
        state.check_quality(self.config.max_error_percent)?;

        let report = ReportBuilder::new(self.config.report_size).build_report(source, &state);

        tracing::info!(
            error_percent = report.error_percent,
            records = report.records.len(),
            duration_ms = start_time.elapsed().as_millis() as u64,
            "Analysis complete"
        );
        Ok(Some(report))
    }

    /// Produce the report for the latest log
    ///
    /// An existing report short-circuits the run before any parsing unless
    /// `force` is set.
    pub fn run(&self, force: bool) -> Result<Outcome> {
        let Some(log) = self.latest_log()? else {
            return Ok(Outcome::NoLogFile);
        };

        let report_path = self.report_path(&log);
        if !force && report_path.exists() {
            return Ok(Outcome::ReportExists(report_path));
        }

        let writer = ReportWriter::from_config(self.config)?;

        let Some(report) = self.analyze(&log)? else {
            return Ok(Outcome::NothingToAnalyze);
        };

        fs::create_dir_all(&self.config.report_dir)?;
        writer.write(&report.records, &report_path)?;

        Ok(Outcome::ReportWritten(report_path))
    }
}
