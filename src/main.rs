mod cli;
mod tracing_setup;

use anyhow::{Context, Result};
use ask::{Dispatcher, ProviderFactory, Renderer, Settings};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use cli::Cli;
use std::io::{IsTerminal, Read};
use std::process::ExitCode;
use tracing_setup::TracingConfig;

/// Conventional exit status for a process stopped by SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = tracing_setup::init(&TracingConfig { debug: cli.debug }) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let piped = match read_piped_stdin(&cli) {
        Ok(piped) => piped,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    let Some(prompt) = cli.prompt_text(piped) else {
        Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "no prompt given; pass it as arguments or pipe it on stdin",
            )
            .exit()
    };

    tokio::select! {
        result = run(cli, prompt) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            // Finish the partial line; no metrics for an interrupted answer
            eprintln!();
            ExitCode::from(EXIT_INTERRUPTED)
        }
    }
}

async fn run(cli: Cli, prompt: String) -> Result<()> {
    let mut settings = Settings::load()?;
    cli.apply_to(&mut settings);
    if let Err(e) = cli.check_backend(settings.backend) {
        e.exit()
    }

    // Missing credentials fail here, before anything is sent
    let provider = ProviderFactory::create(&settings)?;
    let dispatcher = Dispatcher::new(provider);

    let query = cli.query(prompt, &settings);

    let response = dispatcher.dispatch(&query).await?;
    let mut renderer = Renderer::new(std::io::stdout(), std::io::stderr());
    renderer.render(response, query.stream).await?;
    Ok(())
}

/// Piped stdin, read only when no prompt words were given.
fn read_piped_stdin(cli: &Cli) -> Result<Option<String>> {
    let stdin = std::io::stdin();
    if !cli.wants_stdin() || stdin.is_terminal() {
        return Ok(None);
    }

    let mut input = String::new();
    stdin
        .lock()
        .read_to_string(&mut input)
        .context("failed to read prompt from stdin")?;
    Ok(Some(input))
}
