//! Convert command implementation.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::CompileOptions;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Path to the oslo.policy YAML or JSON file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file for the Rego module (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub options: CompileOptions,
}

/// Runs the convert command.
pub fn run(args: &ConvertArgs) -> Result<()> {
    info!(input = ?args.input, package = %args.options.package_name, "Converting policy file");

    let compiled = args.options.compiler().compile_file(&args.input)?;

    match &args.output {
        Some(path) => {
            compiled.write_to_file(path)?;
            info!(output = ?path, blocks = compiled.records().len(), "Wrote Rego module");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(compiled.render().as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}
