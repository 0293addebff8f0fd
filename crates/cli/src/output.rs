// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print a value as pretty JSON, or as the text `render` produces
pub fn print<T: Serialize>(value: &T, format: OutputFormat, render: impl FnOnce(&T) -> String) {
    match format {
        OutputFormat::Text => println!("{}", render(value)),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

/// Print a list, one rendered line per item in text mode
pub fn print_list<T: Serialize>(
    items: &[T],
    format: OutputFormat,
    empty: &str,
    render: impl Fn(&T) -> String,
) {
    match format {
        OutputFormat::Text if items.is_empty() => println!("{}", empty),
        OutputFormat::Text => {
            for item in items {
                println!("{}", render(item));
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(items) {
                println!("{}", json);
            }
        }
    }
}
