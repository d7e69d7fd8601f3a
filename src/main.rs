// Entrypoint for the `myrpl` CLI.
// Loads `.env`, sets up logging, then dispatches the subcommand.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use myrpl_cli::{cli::Args, commands, config::Config};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    commands::execute(args.command, &config)
}
