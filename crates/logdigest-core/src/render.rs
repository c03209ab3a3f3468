use crate::analysis::ReportRecord;
use crate::{Config, Error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

const DEFAULT_TEMPLATE: &str = include_str!("../templates/report.html");
const PLACEHOLDER: &str = "$table_json";

/// Writes report records into a static HTML template
pub struct ReportWriter {
    template: String,
}

impl ReportWriter {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Use `REPORT_TEMPLATE` when configured, the embedded template otherwise
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.report_template {
            Some(path) => {
                tracing::debug!("Loading report template: {}", path.display());
                Ok(Self::new(fs::read_to_string(path)?))
            }
            None => Ok(Self::default()),
        }
    }

    /// Substitute the JSON array of records for the first `$table_json`
    pub fn render(&self, records: &[ReportRecord]) -> Result<String> {
        let Some(at) = self.template.find(PLACEHOLDER) else {
            return Err(Error::Template(format!(
                "template has no {} placeholder",
                PLACEHOLDER
            )));
        };

        // Keep a URL containing "</script>" from closing the script block
        let json = serde_json::to_string(records)?.replace("</", "<\\/");

        let mut html = String::with_capacity(self.template.len() + json.len());
        html.push_str(&self.template[..at]);
        html.push_str(&json);
        html.push_str(&self.template[at + PLACEHOLDER.len()..]);
        Ok(html)
    }

    /// Render and write the report, replacing `path` only once fully written
    pub fn write(&self, records: &[ReportRecord], path: &Path) -> Result<()> {
        tracing::debug!("Writing report to: {}", path.display());

        let html = self.render(records)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(html.as_bytes())?;
        file.flush()?;
        file.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!(
            "Wrote report with {} URLs to {}",
            records.len(),
            path.display()
        );
        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}
