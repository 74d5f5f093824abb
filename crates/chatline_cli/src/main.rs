//! chatline CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Configuration error
//! - 4: Responder error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chatline_core::ChatError;
use chatline_llm::LlmError;

mod commands;

use commands::{Cli, Commands, LogFormat};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const CONFIGURATION_ERROR: u8 = 3;
    pub const RESPONDER_ERROR: u8 = 4;
}

const DEFAULT_FILTER: &str = "chatline=info,warn";
const VERBOSE_FILTER: &str = "chatline=debug,tower_http=debug,warn";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCodes::INVALID_ARGS
            } else {
                ExitCodes::SUCCESS
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.log_format, cli.verbose);

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args).await,
        Commands::Chat(args) => commands::chat::execute(args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Initialize logging; `RUST_LOG` replaces the default directives
fn init_logging(format: LogFormat, verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let json = matches!(format, LogFormat::Json);

    let log_result = tracing_subscriber::registry()
        .with(filter)
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<ChatError>() {
        return match err {
            ChatError::Configuration(_) => ExitCodes::CONFIGURATION_ERROR,
            ChatError::Responder(_) => ExitCodes::RESPONDER_ERROR,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }
    if let Some(err) = e.downcast_ref::<LlmError>() {
        return match err {
            LlmError::NotConfigured | LlmError::Settings(_) => ExitCodes::CONFIGURATION_ERROR,
            _ => ExitCodes::RESPONDER_ERROR,
        };
    }
    ExitCodes::GENERAL_ERROR
}
