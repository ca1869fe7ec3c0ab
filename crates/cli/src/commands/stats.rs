// SPDX-License-Identifier: MIT

//! `scanctl stats` — per-priority depths, in-flight/scheduled/dead-letter
//! counts, and monotonic action counters.

use anyhow::Result;
use scan_queue::Queue;

use crate::output::{render, OutputFormat};

pub async fn run(queue: &Queue, format: OutputFormat) -> Result<()> {
    let stats = queue.stats().await?;
    render(format, &stats, |stats| {
        let tiers = ["high", "medium", "low"]
            .iter()
            .map(|tier| format!("{tier}={}", stats.priority_lengths.get(*tier).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "{tiers} in_flight={} scheduled={} dead_letter={} total_queued={}",
            stats.in_flight,
            stats.scheduled,
            stats.dead_letter,
            stats.total_queued()
        )
    });
    Ok(())
}
