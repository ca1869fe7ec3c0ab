// SPDX-License-Identifier: MIT

//! `scanctl cancel <job-id>`.

use anyhow::Result;
use clap::Args;
use scan_queue::Queue;

use crate::output::{render, OutputFormat};

#[derive(Args, Debug)]
pub struct CancelArgs {
    pub job_id: String,
}

pub async fn run(queue: &Queue, args: CancelArgs, format: OutputFormat) -> Result<()> {
    let job = queue.cancel(&args.job_id).await?;
    render(format, &job, |job| format!("cancelled {}", job.id));
    Ok(())
}
