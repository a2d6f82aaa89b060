//! oslorego CLI - converts oslo.policy files into Rego modules.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr; stdout may carry the generated module.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oslorego=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert(args) => commands::convert::run(&args),
        Commands::Check(args) => commands::check::run(&args),
        Commands::Version => {
            println!("oslorego {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
