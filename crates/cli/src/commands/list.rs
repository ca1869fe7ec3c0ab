// SPDX-License-Identifier: MIT

//! `scanctl list` — scan and filter jobs. O(keys scanned); not for
//! high-frequency polling (§4.1's own caveat on `Queue::list`).

use anyhow::Result;
use clap::Args;
use scan_core::JobStatus;
use scan_queue::{ListFilter, Queue};

use crate::output::{render, OutputFormat};

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub type_tag: Option<String>,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

fn parse_status(s: &str) -> Result<JobStatus> {
    match s.to_ascii_lowercase().as_str() {
        "queued" => Ok(JobStatus::Queued),
        "running" => Ok(JobStatus::Running),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        "cancelled" => Ok(JobStatus::Cancelled),
        "retrying" => Ok(JobStatus::Retrying),
        other => anyhow::bail!("unknown status: {other}"),
    }
}

pub async fn run(queue: &Queue, args: ListArgs, format: OutputFormat) -> Result<()> {
    let mut filter = ListFilter::default();
    if let Some(status) = args.status {
        filter.status = Some(parse_status(&status)?);
    }
    filter.type_tag = args.type_tag;

    let jobs = queue.list(&filter, args.limit, args.offset).await?;
    render(format, &jobs, |jobs| {
        jobs.iter()
            .map(|job| format!("{}\t{}\t{}\t{}", job.id, job.type_tag, job.priority, job.status))
            .collect::<Vec<_>>()
            .join("\n")
    });
    Ok(())
}
