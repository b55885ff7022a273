//! CLI entry point for the `aura` attribute augmenter.
//!
//! Parses arguments with clap, installs logging, configures the OpenAI
//! provider, resolves the run settings (interactively when arguments are
//! missing), and runs the pipeline. Errors are logged with their stable
//! codes and mapped to a failing exit status.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use aura_cli::{
    cli::{Cli, CliError, Console, connect_and_run, render_summary},
    logging::{self, LoggingError},
};
use aura_providers_openai::OpenAiProvider;
use tracing::{error, field};

/// Connect to the provider, resolve settings, run, and print the summary.
fn try_main(cli: Cli) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), BufWriter::new(stdout.lock()));

    let summary = connect_and_run(
        cli,
        || OpenAiProvider::from_env().map_err(CliError::from),
        &mut console,
    )
    .context("failed to augment attributes")?;
    render_summary(&summary, console.output()).context("failed to render summary")?;
    console.output().flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init_logging(cli.debug()) {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main(cli) {
        let cli_error = err.downcast_ref::<CliError>();
        if matches!(cli_error, Some(CliError::Cancelled)) {
            return ExitCode::FAILURE;
        }

        let (code, service_code) = cli_error
            .and_then(|cli_error| match cli_error {
                CliError::Core(core) => Some((Some(core.code()), core.service_code())),
                _ => None,
            })
            .unwrap_or((None, None));

        let code_field = code.map(|code| field::display(code.as_str()));
        let service_code_field = service_code.map(|code| field::display(code.as_str()));

        error!(
            error = %format!("{err:#}"),
            code = code_field,
            service_code = service_code_field,
            "command execution failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
