#![warn(missing_docs)]

//! Shared logging helpers, CLI argument definitions, and tracing utilities for the dialogkit workspace.
//!
//! This crate consolidates logging infrastructure:
//! - [`fmt`]: Render tracing events to logfmt strings
//! - [`capture`]: Collect rendered events in memory
//! - CLI argument parsing for log level configuration

use std::env;

use clap::Args;
use tracing_subscriber::EnvFilter;

pub mod capture;
pub mod fmt;

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "dialogkit=trace,dialog_demo=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter directive for these flags, with precedence:
    /// - `--log-filter`
    /// - `--trace`/`--debug`/`--log-level` (crate-scoped)
    /// - `RUST_LOG` env
    /// - crate-scoped `info`
    pub fn spec(&self) -> String {
        if let Some(spec) = &self.log_filter {
            return spec.clone();
        }
        let level = if self.trace {
            Some("trace")
        } else if self.debug {
            Some("debug")
        } else {
            self.log_level.as_deref()
        };
        match level {
            Some(lvl) => level_spec_for(lvl),
            None => env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info")),
        }
    }

    /// `EnvFilter` built from [`LogArgs::spec`].
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::new(self.spec())
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &["dialogkit", "dialog_demo", "logging"]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}
