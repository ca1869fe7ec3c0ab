// SPDX-License-Identifier: MIT

//! `scanctl enqueue` — build a [`scan_core::ScanRequest`] from CLI flags and
//! enqueue it as a `"scan"` job.

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use scan_core::{JobBuilder, Priority, ScanRequest, Severity};
use scan_queue::Queue;

use crate::output::{render, OutputFormat};

#[derive(Args, Debug)]
pub struct EnqueueArgs {
    /// Git URL of the repository to scan.
    pub repo_url: String,

    /// Branch or commit-ish; defaults to the repository's default branch.
    #[arg(long = "ref")]
    pub git_ref: Option<String>,

    #[arg(long)]
    pub commit: Option<String>,

    /// Restrict to these languages; omit to auto-select by detected language.
    #[arg(long, value_delimiter = ',')]
    pub languages: Vec<String>,

    /// Restrict to these file globs.
    #[arg(long, value_delimiter = ',')]
    pub files: Vec<String>,

    /// Explicit agent names to run; omit to auto-select by language.
    #[arg(long, value_delimiter = ',')]
    pub agents: Vec<String>,

    /// Scan-wide deadline in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Minimum severity to report; findings below this are still collected
    /// but callers may choose to filter on it downstream.
    #[arg(long)]
    pub severity_threshold: Option<String>,

    #[arg(long, value_enum, default_value = "medium")]
    pub priority: CliPriority,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
#[value(rename_all = "lower")]
pub enum CliPriority {
    Low,
    Medium,
    High,
}

impl From<CliPriority> for Priority {
    fn from(p: CliPriority) -> Self {
        match p {
            CliPriority::Low => Priority::Low,
            CliPriority::Medium => Priority::Medium,
            CliPriority::High => Priority::High,
        }
    }
}

fn parse_severity(s: &str) -> Result<Severity> {
    match s.to_ascii_lowercase().as_str() {
        "info" => Ok(Severity::Info),
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        other => anyhow::bail!("unknown severity: {other}"),
    }
}

pub async fn run(queue: &Queue, args: EnqueueArgs, format: OutputFormat) -> Result<()> {
    let mut request = ScanRequest::new(args.repo_url)
        .languages(args.languages)
        .files(args.files)
        .agents(args.agents);

    if let Some(git_ref) = args.git_ref {
        request = request.git_ref(git_ref);
    }
    if let Some(commit) = args.commit {
        request = request.commit(commit);
    }
    if let Some(secs) = args.timeout_secs {
        request = request.timeout(Some(Duration::from_secs(secs)));
    }
    if let Some(threshold) = args.severity_threshold {
        request = request.severity_threshold(Some(parse_severity(&threshold)?));
    }

    let job = JobBuilder::new()
        .type_tag("scan")
        .priority(args.priority.into())
        .timeout(request.timeout.unwrap_or(Duration::from_secs(600)))
        .payload(&request)?
        .build(chrono::Utc::now());

    let enqueued = queue.enqueue(job).await?;
    render(format, &enqueued, |job| format!("enqueued {} (priority={})", job.id, job.priority));
    Ok(())
}
