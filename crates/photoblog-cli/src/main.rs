//! photoblog - CLI tool for browsing a photo blog.
//!
//! This is a thin wrapper over the photoblog crates: it wires the HTTP
//! gateway into the partitioned cache and prints what the gallery and detail
//! views would display.

mod cli;
mod commands;
mod output;
mod settings;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    let settings = Settings::load(cli.config.as_deref(), cli.api_url.as_deref())?;

    match cli.command {
        Commands::Feed(args) => commands::feed::run(args, &settings).await,
        Commands::Post(args) => commands::post::run(args, &settings).await,
        Commands::Walk(args) => commands::walk::run(args, &settings).await,
        Commands::Info(args) => commands::info::run(args, &settings).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
