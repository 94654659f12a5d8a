//! Binary entry point for the d8rector CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Migrate every serialized unit under a directory, writing results back
//! d8rector process units/ --write
//!
//! # Preview one unit as PHP with a custom rule selection
//! d8rector --config d8rector.json process units/form.json --emit php
//!
//! # List the available rules
//! d8rector rules
//! ```
//!
//! Every command prints one JSON document on stdout. Logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use d8rector::cli::{load_config, run_process, run_rules, EmitFormat, ProcessOptions};
use d8rector_core::error::{OutputErrorCode, RectorError};
use d8rector_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Migrate Drupal 7 API usage to Drupal 8.
///
/// Input units are syntax trees serialized as JSON by an external PHP
/// parser. All output is JSON.
#[derive(Parser, Debug)]
#[command(name = "d8rector", version, about = "Migrate Drupal 7 API usage to Drupal 8")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Run configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the migration rules over serialized units.
    Process {
        /// Unit files, or directories searched recursively for `*.json`.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write migrated trees back to their files.
        #[arg(long)]
        write: bool,

        /// Extra output per unit.
        #[arg(long, value_enum, default_value = "json")]
        emit: EmitFormat,
    },
    /// List the available rules.
    Rules,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(cli) {
        Ok(code) => code,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::new(&err);

            // Errors go to stdout as JSON like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<ExitCode, RectorError> {
    let config = load_config(cli.global.config.as_deref())?;
    match cli.command {
        Command::Process { paths, write, emit } => {
            let response = run_process(&paths, &config, ProcessOptions { write, emit })?;
            print_response(&response)?;
            if response.summary.aborted > 0 {
                Ok(ExitCode::from(OutputErrorCode::RewriteAborted.code()))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
        Command::Rules => {
            let response = run_rules(&config)?;
            print_response(&response)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_response<T: serde::Serialize>(response: &T) -> Result<(), RectorError> {
    let mut stdout = io::stdout();
    emit_response(response, &mut stdout).map_err(|e| RectorError::io("<stdout>", e))?;
    stdout.flush().map_err(|e| RectorError::io("<stdout>", e))
}

// ============================================================================
// Tests
// ============================================================================
