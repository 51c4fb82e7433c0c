// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tether replay tool.
//
// Usage: tether-replay <script.json> [config.json]
//
// Initialises logging, loads configuration, and replays a recorded session
// through a message bridge and a gesture recognizer on a simulated page.

mod host;
mod replay;
mod script;

use std::path::PathBuf;
use std::process::ExitCode;

use tether_core::TetherConfig;
use tether_core::error::{Result, TetherError};

use script::Script;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "replay failed");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let mut args = std::env::args_os().skip(1).map(PathBuf::from);
    let script_path = args
        .next()
        .ok_or_else(|| TetherError::Config("usage: tether-replay <script.json> [config.json]".into()))?;
    let config = match args.next() {
        Some(path) => TetherConfig::load(&path)?,
        None => TetherConfig::default(),
    };

    tracing::info!(script = %script_path.display(), "Tether replay starting");
    let summary = replay::run(Script::load(&script_path)?, &config)?;
    tracing::info!(?summary, "replay finished");
    Ok(())
}
