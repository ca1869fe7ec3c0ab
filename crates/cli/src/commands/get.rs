// SPDX-License-Identifier: MIT

//! `scanctl get <job-id>`.

use anyhow::Result;
use clap::Args;
use scan_queue::Queue;

use crate::output::{render, OutputFormat};

#[derive(Args, Debug)]
pub struct GetArgs {
    pub job_id: String,
}

pub async fn run(queue: &Queue, args: GetArgs, format: OutputFormat) -> Result<()> {
    let job = queue.get(&args.job_id).await?;
    render(format, &job, |job| {
        format!(
            "{} type={} priority={} status={} retries={}/{}",
            job.id, job.type_tag, job.priority, job.status, job.metadata.retry_count, job.metadata.max_retries
        )
    });
    Ok(())
}
