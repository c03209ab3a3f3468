pub mod analysis;
pub mod config;
pub mod error;
pub mod locate;
pub mod parse;
pub mod pipeline;
pub mod reader;
pub mod render;

pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::{Outcome, Pipeline};
