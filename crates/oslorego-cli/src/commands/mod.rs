//! CLI commands and argument parsing.

pub mod check;
pub mod convert;

use clap::{Args, Parser, Subcommand};

use oslorego_compiler::naming::DEFAULT_ALIAS_PREFIX;
use oslorego_compiler::package::DEFAULT_PACKAGE_NAME;
use oslorego_compiler::{Compiler, CompilerConfig};

/// oslorego - oslo.policy to Rego converter
#[derive(Parser)]
#[command(name = "oslorego")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Convert an oslo.policy file to Rego
    Convert(convert::ConvertArgs),

    /// Compile an oslo.policy file and report what would be generated
    Check(check::CheckArgs),

    /// Print version information
    Version,
}

/// Compiler options shared by the commands.
#[derive(Args)]
pub struct CompileOptions {
    /// Rego package name for the generated module
    #[arg(
        short,
        long,
        env = "OSLOREGO_PACKAGE_NAME",
        default_value = DEFAULT_PACKAGE_NAME
    )]
    pub package_name: String,

    /// Prefix for rule names generated from parenthesized groups
    #[arg(long, env = "OSLOREGO_ALIAS_PREFIX", default_value = DEFAULT_ALIAS_PREFIX)]
    pub alias_prefix: String,
}

impl CompileOptions {
    /// Builds a compiler from the options.
    pub fn compiler(&self) -> Compiler {
        Compiler::with_config(
            CompilerConfig::new()
                .with_package_name(&self.package_name)
                .with_alias_prefix(&self.alias_prefix),
        )
    }
}
