// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Operator-facing log output.

use tracing_subscriber::EnvFilter;

fn filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the process-wide subscriber.  `RUST_LOG` is honoured unless
/// `debug` is set.  Later calls are no-ops.
pub fn init(debug: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
