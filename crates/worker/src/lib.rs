// SPDX-License-Identifier: MIT

//! The worker pool that drains the priority queue: a `JobHandler` registry,
//! cooperative polling routines per [`Worker`], and a [`WorkerPool`] owning N
//! workers in one process with coordinated start/stop.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod handler;
pub mod pool;
pub mod stats;
pub mod worker;

pub use config::{WorkerConfig, WorkerPoolConfig};
pub use handler::JobHandler;
pub use pool::WorkerPool;
pub use stats::WorkerStats;
pub use worker::Worker;

#[cfg(test)]
mod tests;
