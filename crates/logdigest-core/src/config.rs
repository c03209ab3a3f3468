use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime settings for a digest run
///
/// Keys use the upper-case names operators put in the JSON config file.
/// Any key missing from the file keeps its default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of URLs kept in the report
    #[serde(rename = "REPORT_SIZE")]
    pub report_size: usize,

    /// Directory the HTML reports are written to
    #[serde(rename = "REPORT_DIR")]
    pub report_dir: PathBuf,

    /// Directory scanned for access logs
    #[serde(rename = "LOG_DIR")]
    pub log_dir: PathBuf,

    /// Optional file that receives a copy of the application log
    #[serde(rename = "LOG_FILE", skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,

    /// Log name prefix, e.g. `nginx-access-ui`
    #[serde(rename = "LOG_PREFIX")]
    pub log_prefix: String,

    /// Highest tolerated share of unparsable lines, in whole percent
    #[serde(rename = "MAX_ERROR_PERCENT")]
    pub max_error_percent: u32,

    /// HTML template with a `$table_json` placeholder
    #[serde(rename = "REPORT_TEMPLATE", skip_serializing_if = "Option::is_none")]
    pub report_template: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: 1000,
            report_dir: PathBuf::from("./reports"),
            log_dir: PathBuf::from("./log"),
            log_file: None,
            log_prefix: "nginx-access-ui".to_string(),
            max_error_percent: 1,
            report_template: None,
        }
    }
}

impl Config {
    /// Load settings from an external JSON file, merged over the defaults
    ///
    /// `None` yields the defaults. An empty file also yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        tracing::debug!("Loading config from: {}", path.display());

        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(Error::Config(format!(
                "config file must be a .json file: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!("Config file is empty, using defaults");
            return Ok(Self::default());
        }

        Self::from_json_str(&content)
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.report_size == 0 {
            return Err(Error::Config("REPORT_SIZE must be > 0".to_string()));
        }
        if self.log_prefix.is_empty() {
            return Err(Error::Config("LOG_PREFIX must be non-empty".to_string()));
        }
        // Log names are `<prefix>.<text><date>`, so the prefix cannot hold a dot
        if !self
            .log_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(Error::Config(format!(
                "LOG_PREFIX may only contain ASCII letters, digits and '-': {:?}",
                self.log_prefix
            )));
        }
        Ok(())
    }
}
