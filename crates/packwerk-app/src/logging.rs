// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Logging setup for the packwerk binary.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// `verbose` lowers the default level to DEBUG; `json` switches to one JSON
/// object per line. `RUST_LOG` overrides the level either way. Logs go to
/// stderr, stdout carries the run summary.
pub fn init(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
