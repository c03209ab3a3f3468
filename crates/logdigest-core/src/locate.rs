use crate::{Error, Result};
use chrono::{Datelike, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref LOG_NAME_PATTERN: Regex = Regex::new(
        r"^(?P<name>[A-Za-z0-9-]+)\.(?:\S*?[^\d\s])?(?P<date>\d{8})(?:\.(?P<ext>gz|log|txt))?$"
    )
    .unwrap();
}

/// How the content of a log file is stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogExtension {
    /// `.gz`, decompressed while reading
    Gzip,
    /// `.log`, `.txt` or no extension at all
    Plain,
}

/// A log file whose name follows the `<name>.<text><YYYYMMDD>[.<ext>]` convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub date: NaiveDate,
    pub extension: LogExtension,
    pub path: PathBuf,
}

impl LogFile {
    /// File name of the report generated from this log, e.g. `report-2017.6.30.html`
    pub fn report_name(&self) -> String {
        format!(
            "report-{}.{}.{}.html",
            self.date.year(),
            self.date.month(),
            self.date.day()
        )
    }
}

/// Finds the most recent log with a given name prefix
pub struct LogLocator {
    prefix: String,
}

impl LogLocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Match a single file name against the naming convention and prefix
    ///
    /// Names whose embedded date is not a real calendar date are rejected.
    pub fn matches(&self, dir: &Path, file_name: &str) -> Option<LogFile> {
        let captures = LOG_NAME_PATTERN.captures(file_name)?;

        if &captures["name"] != self.prefix {
            return None;
        }

        let date = match NaiveDate::parse_from_str(&captures["date"], "%Y%m%d") {
            Ok(date) => date,
            Err(e) => {
                tracing::debug!("Skipping {}: invalid date ({})", file_name, e);
                return None;
            }
        };

        let extension = match captures.name("ext").map(|m| m.as_str()) {
            Some("gz") => LogExtension::Gzip,
            _ => LogExtension::Plain,
        };

        Some(LogFile {
            date,
            extension,
            path: dir.join(file_name),
        })
    }

    /// Return the matching log with the newest embedded date
    ///
    /// Entries are visited in file name order and only a strictly newer date
    /// replaces the current pick, so among logs sharing the newest date the
    /// lexicographically smallest name wins.
    pub fn latest(&self, dir: &Path) -> Result<Option<LogFile>> {
        tracing::debug!("Scanning log directory: {}", dir.display());

        if !dir.is_dir() {
            return Err(Error::NoSuchDirectory(dir.to_path_buf()));
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            // Non UTF-8 names cannot follow the convention
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();

        let mut latest: Option<LogFile> = None;
        for name in &names {
            if let Some(candidate) = self.matches(dir, name)
                && latest.as_ref().is_none_or(|l| candidate.date > l.date)
            {
                latest = Some(candidate);
            }
        }

        match &latest {
            Some(log) => tracing::info!("Latest log file: {}", log.path.display()),
            None => tracing::debug!(
                "No log named {} among {} files",
                self.prefix,
                names.len()
            ),
        }

        Ok(latest)
    }
}
