// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

use std::time::{Duration, Instant};

/// Interface to the time source used by polling loops.
pub trait IClock {
    /// Current monotonic instant
    fn now(&self) -> Instant;
    /// Block the caller for `d`
    fn sleep(&self, d: Duration);
}

/// Wall clock backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl IClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        std::thread::sleep(d)
    }
}

/// A clock that only moves when somebody sleeps on it.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ManualClock {
    origin: Instant,
    elapsed: std::cell::Cell<Duration>,
    sleeps: std::cell::Cell<u32>,
}

#[cfg(test)]
impl Default for ManualClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Default::default(),
            sleeps: Default::default(),
        }
    }
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }

    pub(crate) fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }
}

#[cfg(test)]
impl IClock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed.get()
    }

    fn sleep(&self, d: Duration) {
        self.elapsed.set(self.elapsed.get() + d);
        self.sleeps.set(self.sleeps.get() + 1);
    }
}
