// SPDX-License-Identifier: MIT

//! `scanctl`: the operator-facing client over the same `Store`/`Queue`
//! construction the daemon uses — enqueue/get/list/cancel/stats/health
//! (§2, §6), mirroring the job-orchestration lineage's own thin clap-based
//! CLI over its shared core types.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "scanctl", version = scan_daemon::config::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Enqueue a scan job.
    Enqueue(commands::enqueue::EnqueueArgs),
    /// Fetch a job by id.
    Get(commands::get::GetArgs),
    /// List jobs, optionally filtered.
    List(commands::list::ListArgs),
    /// Cancel a job that hasn't been leased yet.
    Cancel(commands::cancel::CancelArgs),
    /// Show queue-level stats.
    Stats,
    /// Check store/queue/agent reachability.
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let store = scan_daemon::build_store().await?;
    let queue = scan_daemon::build_queue(store.clone());

    match cli.command {
        Command::Enqueue(args) => commands::enqueue::run(&queue, args, cli.format).await,
        Command::Get(args) => commands::get::run(&queue, args, cli.format).await,
        Command::List(args) => commands::list::run(&queue, args, cli.format).await,
        Command::Cancel(args) => commands::cancel::run(&queue, args, cli.format).await,
        Command::Stats => commands::stats::run(&queue, cli.format).await,
        Command::Health => {
            let agents = scan_daemon::build_agents();
            commands::health::run(&store, &queue, &agents, cli.format).await
        }
    }
}
