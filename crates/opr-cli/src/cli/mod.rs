//! CLI argument parsing and command dispatch.

pub mod args;
pub mod commands;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config;
use crate::output::{self, OutputFormat};
use opr::OprError;

/// Run the CLI application.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let ctx = commands::Context {
        output_format: cli.output.unwrap_or(OutputFormat::Pretty),
        credentials_path: config::resolve_credentials_path(cli.credentials)?,
        api_url: cli.api_url,
        asn_url: cli.asn_url,
    };

    let outcome = match cli.command {
        Commands::Results(args) => commands::results::execute(ctx, args).await,
        Commands::Domains => commands::domains::execute(ctx).await,
        Commands::Asn(args) => commands::asn::execute(ctx, args).await,
        Commands::Config(args) => commands::config::execute(ctx, args),
    };

    finish(outcome)
}

/// Swallow broken pipes and attach the setup hint to credential errors.
fn finish(outcome: Result<()>) -> Result<()> {
    match outcome {
        Err(e) if output::is_broken_pipe(&e) => {
            debug!("stdout closed by reader");
            Ok(())
        }
        Err(e) => match e.downcast_ref::<OprError>().and_then(config::setup_hint) {
            Some(hint) => Err(anyhow::anyhow!("{e}\n\n{hint}")),
            None => Err(e),
        },
        Ok(()) => Ok(()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when run from tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
