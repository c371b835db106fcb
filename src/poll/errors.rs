// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// A bounded wait ran out of time before its condition held.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (gave up after {}s and {ticks} checks)", .waited.as_secs())]
pub struct Timeout {
    pub message: String,
    pub waited: Duration,
    pub ticks: u64,
}
