// SPDX-License-Identifier: MIT

//! One module per `scanctl` subcommand, mirroring the queue's own
//! enqueue/get/list/cancel/stats/health surface (§6).

pub mod cancel;
pub mod enqueue;
pub mod get;
pub mod health;
pub mod list;
pub mod stats;
