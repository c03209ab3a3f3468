//! Subcommands of the `logdigest` binary, exposed so tests can drive them
//! without spawning a process.

pub mod commands;

pub use commands::show::OutputFormat;
