mod apply;
mod diff;
mod init;
mod plan;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "protoshift",
    version,
    about = "A declarative toolkit for refactoring and migrating Protocol Buffers",
    long_about = "protoshift rewrites package names, imports, service names, and \
                  language-binding options across a schema tree, keeping cross-file \
                  import references consistent. Every run produces a reviewable plan \
                  before anything is written."
)]
pub struct Cli {
    /// Path to protoshift.yaml (default: auto-detect)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Copy missing external imports to vendor/ during apply
    #[arg(long, global = true)]
    pub vendor_deps: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the plan and print a summary (no writes)
    Plan {
        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a unified diff of all pending rewrites
    Diff {
        /// Exit with code 1 if there are differences
        #[arg(long)]
        exit_code: bool,
    },
    /// Execute the plan, committing rewritten files under the target root
    Apply {
        /// Show what would be done without making changes
        #[arg(long)]
        dry_run: bool,
    },
    /// Print a sample configuration file
    Init,
}

/// Runs the CLI and returns the process exit code.
pub fn run() -> protoshift_core::Result<i32> {
    let cli = Cli::parse();
    let _guard = protoshift_core::logging::init("cli");

    match cli.command {
        Commands::Plan { json } => plan::run(cli.config.as_deref(), json),
        Commands::Diff { exit_code } => diff::run(cli.config.as_deref(), exit_code),
        Commands::Apply { dry_run } => {
            apply::run(cli.config.as_deref(), cli.vendor_deps, dry_run)
        }
        Commands::Init => init::run(),
    }
}
