use anyhow::{Context, Result};
use logdigest_core::{Config, Outcome, Pipeline};

/// Generate the HTML report for the latest log in `LOG_DIR`
pub fn generate(config: &Config, force: bool) -> Result<Outcome> {
    tracing::debug!(
        "Looking for {} logs in {}",
        config.log_prefix,
        config.log_dir.display()
    );

    let outcome = Pipeline::new(config)
        .run(force)
        .context("Failed to generate report")?;

    Ok(outcome)
}

pub fn execute(config: &Config, force: bool) -> Result<()> {
    tracing::info!("Start log analyzing...");

    match generate(config, force)? {
        Outcome::ReportWritten(path) => tracing::info!("Saved report to {}", path.display()),
        Outcome::ReportExists(path) => {
            tracing::info!("Report already exists: {}", path.display())
        }
        Outcome::NoLogFile => tracing::info!(
            "No log file to analyze in {}",
            config.log_dir.display()
        ),
        Outcome::NothingToAnalyze => tracing::info!("Log file is empty, nothing to analyze"),
    }

    Ok(())
}
