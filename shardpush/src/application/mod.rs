pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use shardpush_core::error::Result;

/// Dispatch the parsed command line; returns the process exit code.
pub fn run() -> Result<u8> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            tree,
            repo,
            headroom_gb,
            level,
            upload_cmd,
            no_progress,
        } => handlers::handle_run(tree, repo, headroom_gb, level, upload_cmd, no_progress),
        Commands::Plan { tree } => handlers::handle_plan(tree),
        Commands::Status { staging } => handlers::handle_status(staging),
        Commands::Ls { archive } => handlers::handle_ls(archive),
    }
}
