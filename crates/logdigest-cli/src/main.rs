use clap::{Parser, Subcommand};
use logdigest_cli::{OutputFormat, commands};
use logdigest_core::Config;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const LOG_TIME_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

#[derive(Parser)]
#[command(name = "logdigest")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Report the slowest URLs found in the latest web server access log",
    long_about = "logdigest finds the newest access log in LOG_DIR, aggregates request times \
                  per URL and writes a static HTML report of the slowest URLs to REPORT_DIR."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to an external JSON config file (defaults are used otherwise)
    #[arg(short, long, global = true, env = "LOGDIGEST_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the HTML report for the latest log (the default command)
    Report {
        /// Regenerate the report even if it already exists
        #[arg(long)]
        force: bool,
    },

    /// Print the slowest URLs of a log without writing a report
    Show {
        /// Log file to analyze (defaults to the latest log in LOG_DIR)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Number of URLs to print (defaults to REPORT_SIZE)
        #[arg(short, long)]
        top: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pretty")]
        format: OutputFormat,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, config_error) = match Config::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let (log_file, log_file_error) = match config.log_file.as_deref().map(open_log_file) {
        Some(Ok(file)) => (Some(file), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    // Initialize logging
    init_logging(cli.verbose, log_file);

    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Unexpected failure: {}", info);
    }));

    if let Some(e) = config_error {
        tracing::warn!("Ignoring config file, using defaults: {}", e);
    }
    if let (Some(e), Some(path)) = (log_file_error, &config.log_file) {
        tracing::warn!("Cannot open log file {}: {}", path.display(), e);
    }

    // Execute the command
    let result = match cli.command.unwrap_or(Commands::Report { force: false }) {
        Commands::Report { force } => commands::report::execute(&config, force),
        Commands::Show { file, top, format } => {
            commands::show::execute(&config, file.as_deref(), top, format)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_log_file(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn init_logging(verbose: bool, log_file: Option<File>) {
    use std::sync::Mutex;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt::time::ChronoLocal;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("logdigest=debug,logdigest_cli=debug,logdigest_core=debug")
        } else {
            EnvFilter::new("logdigest=info,logdigest_cli=info,logdigest_core=info")
        }
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
        .with_target(false);

    let file_layer = log_file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_timer(ChronoLocal::new(LOG_TIME_FORMAT.to_string()))
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();
}
