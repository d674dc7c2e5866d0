//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Installs the tracing subscriber
//! - Builds CliArgs and discovers Config
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;
use tessrun_utils::logging::init_tracing;

use super::args::{Cli, Commands};
use super::commands;
use crate::{CliArgs, Config, ExitCode, TessrunError};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the user-facing report to stderr, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }

    let cli_args = build_cli_args(&cli);
    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let err = TessrunError::from(err);
            eprintln!("{}", err.display_for_user());
            return Err(err.to_exit_code());
        }
    };

    let result = match &cli.command {
        Commands::Ocr(args) => commands::execute_ocr_command(args, &config, cli.json),
        Commands::Version => commands::execute_version_command(&config, cli.json),
        Commands::Langs => commands::execute_langs_command(&config, cli.json),
        Commands::Config => commands::execute_config_command(&config, cli.json),
    };

    if let Err(error) = result {
        if let Some(tessrun_error) = error.downcast_ref::<TessrunError>() {
            eprintln!("{}", tessrun_error.display_for_user());
            if cli.verbose {
                eprintln!("{tessrun_error}");
            }
            return Err(tessrun_error.to_exit_code());
        }

        eprintln!("Error: {error:#}");
        eprintln!("\nRun with --verbose for more detailed output");
        return Err(ExitCode::INTERNAL);
    }

    Ok(())
}

/// Map parsed flags onto the configuration layer's CLI overrides.
#[must_use]
pub fn build_cli_args(cli: &Cli) -> CliArgs {
    let mut cli_args = CliArgs {
        config_path: cli.config.clone(),
        executable: cli.executable.clone(),
        ..CliArgs::default()
    };

    if let Commands::Ocr(ocr) = &cli.command {
        cli_args.thread_limit = ocr.thread_limit;
        cli_args.timeout_secs = ocr.timeout;
        cli_args.temp_dir = ocr.temp_dir.clone();
        cli_args.lang = ocr.lang.clone();
        cli_args.psm = ocr.psm;
        cli_args.oem = ocr.oem;
        cli_args.tessdata_dir = ocr.tessdata_dir.clone();
        cli_args.config_file = ocr.config_file.clone();
        cli_args.variables = ocr.variables.clone();
    }

    cli_args
}
