use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No such directory: {}", .0.display())]
    NoSuchDirectory(PathBuf),

    #[error(
        "Too many unparsable lines: {failed} of {total} ({percent}%, limit {max_percent}%)"
    )]
    TooManyUnparsable {
        failed: usize,
        total: usize,
        percent: u32,
        max_percent: u32,
    },

    #[error("Invalid report template: {0}")]
    Template(String),
}

pub type Result<T> = std::result::Result<T, Error>;
