// SPDX-License-Identifier: MIT

//! Text/JSON rendering shared across `scanctl` subcommands.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print `value` as pretty JSON, or via `text` in text mode.
pub fn render<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("failed to serialize output: {err}"),
        },
        OutputFormat::Text => println!("{}", text(value)),
    }
}
