// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use super::errors::Timeout;
use super::iclock::IClock;
use std::time::Duration;
use tracing::debug;

/// Period between two checks unless told otherwise.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

/// A bounded wait: a check period, an overall timeout and the message to
/// report when the timeout expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick {
    period: Duration,
    timeout: Duration,
    message: String,
}

impl ClockTick {
    pub fn new(timeout: Duration, message: impl Into<String>) -> Self {
        Self {
            period: DEFAULT_PERIOD,
            timeout,
            message: message.into(),
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Run `check` once per period until it yields a value.
    ///
    /// `check` is always run at least once.  An error returned by `check`
    /// aborts the wait immediately.  Once the timeout has elapsed without a
    /// value, the wait fails with [`Timeout`] converted into the caller's
    /// error type.
    pub fn wait<C, T, E, F>(&self, clock: &C, mut check: F) -> Result<T, E>
    where
        C: IClock + ?Sized,
        E: From<Timeout>,
        F: FnMut() -> Result<Option<T>, E>,
    {
        let start = clock.now();
        let mut ticks: u64 = 0;

        loop {
            ticks += 1;

            if let Some(v) = check()? {
                return Ok(v);
            }

            let waited = clock.now().saturating_duration_since(start);
            if waited >= self.timeout {
                return Err(Timeout {
                    message: self.message.clone(),
                    waited,
                    ticks,
                }
                .into());
            }

            debug!(tick = ticks, waited_secs = waited.as_secs(), "not there yet");

            // never overshoot the deadline by a whole period
            clock.sleep(self.period.min(self.timeout - waited));
        }
    }
}
