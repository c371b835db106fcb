// Copyright 2026 Contributors to the sgx-deploy project.
// SPDX-License-Identifier: Apache-2.0

//! Bounded waits: check a condition on a fixed period until it holds or a
//! deadline passes.

pub use self::clocktick::ClockTick;
pub use self::clocktick::DEFAULT_PERIOD;
pub use self::errors::Timeout;
pub use self::iclock::IClock;
pub use self::iclock::SystemClock;

#[cfg(test)]
pub(crate) use self::iclock::ManualClock;

mod clocktick;
mod errors;
mod iclock;
