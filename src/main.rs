use checkout_flow::interfaces::cli::{self, Cli};
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::io;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_new(&cli.log_level).into_diagnostic()?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let stdout = io::stdout();
    cli::run(&cli, stdout.lock()).await.into_diagnostic()?;

    Ok(())
}
