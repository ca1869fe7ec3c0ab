// SPDX-License-Identifier: MIT

//! Global `tracing` subscriber installation: stderr always, plus a daily
//! rolling file under `SCAN_LOG_DIR` when set — the same two-sink pattern
//! the job-orchestration lineage's own daemon wires up.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Guard returned by [`init`]; must be held for the process lifetime or the
/// file appender's background flush thread is dropped and writes stop.
pub struct LogGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Install the global subscriber. `RUST_LOG` controls verbosity (default
/// `info`); `log_dir` enables an additional daily-rolling file sink.
pub fn init(log_dir: Option<&str>) -> LogGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "scan-daemon.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(filter).with(stderr_layer).with(file_layer).init();

    LogGuard { _file_guard: file_guard }
}
