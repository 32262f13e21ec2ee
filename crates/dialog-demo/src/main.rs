#![warn(missing_docs)]

//! Entry point for the `dialog-demo` binary.

mod cli;
mod demo;
mod error;

use std::{io, process};

use clap::Parser;
use logging::capture::{self, LogBuffer};
use serde_json::{Value, json};
use tokio::runtime::Builder;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, registry};

use crate::{cli::Cli, error::Result};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, fire the dialog, and print the report.
fn run() -> Result<()> {
    let Cli {
        log,
        dialog,
        capture_logs,
    } = Cli::parse();
    let buffer = capture_logs.then(LogBuffer::default);
    registry()
        .with(log.env_filter())
        .with(fmt::layer().without_time().with_writer(io::stderr))
        .with(buffer.as_ref().map(capture::layer))
        .try_init()
        .ok();

    let runtime = Builder::new_current_thread().build()?;
    let report = runtime.block_on(demo::run(&dialog))?;

    let mut out = report.to_json();
    if let Some(buffer) = &buffer {
        out["logs"] = buffer
            .drain()
            .into_iter()
            .map(|l| json!({"level": l.level, "target": l.target, "message": l.message}))
            .collect::<Value>();
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
