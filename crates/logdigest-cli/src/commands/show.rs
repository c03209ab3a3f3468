use anyhow::{Context, Result};
use clap::ValueEnum;
use logdigest_core::analysis::Report;
use logdigest_core::{Config, Pipeline};
use std::io::Write;
use std::path::Path;

/// How `show` prints a digest to stdout
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Styled summary followed by a numbered list of the slowest URLs
    Pretty,
    /// The whole `Report`, summary fields included
    Json,
    /// CSV with one row per `ReportRecord` and a header line
    Table,
}

/// Analyze `file`, or the latest log in `LOG_DIR` when no file is given
///
/// Returns `None` when there is no log to analyze or the log is empty.
pub fn analyze_log(config: &Config, file: Option<&Path>) -> Result<Option<Report>> {
    let pipeline = Pipeline::new(config);

    let report = match file {
        Some(path) => pipeline
            .analyze_path(path)
            .with_context(|| format!("Failed to analyze {}", path.display()))?,
        None => {
            let Some(log) = pipeline.latest_log()? else {
                tracing::info!("No log file to analyze in {}", config.log_dir.display());
                return Ok(None);
            };
            pipeline
                .analyze(&log)
                .with_context(|| format!("Failed to analyze {}", log.path.display()))?
        }
    };

    if report.is_none() {
        tracing::info!("Log file is empty, nothing to analyze");
    }
    Ok(report)
}

pub fn execute(
    config: &Config,
    file: Option<&Path>,
    top: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(top) = top {
        anyhow::ensure!(top > 0, "--top must be greater than 0");
    }
    tracing::debug!(?format, ?top, "Printing digest");

    let Some(mut report) = analyze_log(config, file)? else {
        return Ok(());
    };

    if let Some(top) = top {
        report.records.truncate(top);
    }

    match format {
        OutputFormat::Json => output_json(&report)?,
        OutputFormat::Table => output_table(&report),
        OutputFormat::Pretty => output_pretty(&report),
    }

    Ok(())
}

fn output_pretty(report: &Report) {
    use console::style;

    println!("\n{}", style("Access Log Digest").bold().cyan());
    println!("{}", style("=================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Source:           {}", report.source.display());
    println!("  Total Lines:      {}", report.total_lines);
    println!(
        "  Unparsable Lines: {} ({}%)",
        report.failed_lines, report.error_percent
    );
    println!("  Total Time:       {:.3} s", report.total_time);

    if !report.records.is_empty() {
        println!("\n{}", style("Slowest URLs:").bold());
        for (i, record) in report.records.iter().enumerate() {
            println!(
                "  {}. [{:.3} s, {:.1}%] count={} avg={:.3} med={:.3} max={:.3} {}",
                i + 1,
                record.time_sum,
                record.time_perc,
                record.count,
                record.time_avg,
                record.time_med,
                record.time_max,
                style(&record.url).yellow()
            );
        }
    }

    println!(); // trailing newline
}

fn output_json(report: &Report) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, report).context("Failed to encode report")?;
    writeln!(stdout)?;
    Ok(())
}

fn output_table(report: &Report) {
    println!("url,count,count_perc,time_sum,time_perc,time_avg,time_max,time_med");
    for record in &report.records {
        println!(
            "{},{},{},{},{},{},{},{}",
            csv_field(&record.url),
            record.count,
            record.count_perc,
            record.time_sum,
            record.time_perc,
            record.time_avg,
            record.time_max,
            record.time_med
        );
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_names() {
        let names = [
            ("pretty", OutputFormat::Pretty),
            ("json", OutputFormat::Json),
            ("table", OutputFormat::Table),
        ];
        for (name, format) in names {
            assert_eq!(OutputFormat::from_str(name, true), Ok(format));
        }
        assert!(OutputFormat::from_str("yaml", true).is_err());
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("/api/v2/banner"), "/api/v2/banner");
        assert_eq!(csv_field("/a,b"), "\"/a,b\"");
        assert_eq!(csv_field("/a\"b"), "\"/a\"\"b\"");
    }
}
