//! Check command implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::info;

use oslorego_compiler::RuleKind;

use super::CompileOptions;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Path to the oslo.policy YAML or JSON file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// List every generated block
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub options: CompileOptions,
}

/// Runs the check command.
pub fn run(args: &CheckArgs) -> Result<()> {
    info!(input = ?args.input, "Checking policy file");

    let compiled = args.options.compiler().compile_file(&args.input)?;
    let summary = compiled.summary();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("oslo.policy Check");
    println!("=================");
    println!("Input: {}", args.input.display());
    println!("Package: {}", summary.package);
    println!();

    if args.verbose {
        for record in compiled.records() {
            let kind = match record.kind {
                RuleKind::Action => "action",
                RuleKind::Alias => "alias ",
            };
            println!("  {kind} {} ({} assertion(s))", record.name, record.assertions.len());
        }
        println!();
    }

    println!("✓ {} policies compiled", summary.policies);
    println!("  Actions: {}", summary.actions);
    println!("  Aliases: {}", summary.aliases);
    println!("  Generated rules: {}", summary.generated_aliases);
    println!("  Blocks: {}", summary.blocks);

    Ok(())
}
