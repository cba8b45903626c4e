// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Sources of the current time.

#[cfg(with_testing)]
use std::sync::{Arc, Mutex, MutexGuard};

use crate::data_types::Timestamp;

/// A source of the current time.
pub trait Clock {
    /// Returns the current time.
    fn current_time(&self) -> Timestamp;
}

/// A clock that reads the system time.
#[derive(Clone, Copy, Default, Debug)]
pub struct WallClock;

impl Clock for WallClock {
    fn current_time(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock whose time only changes when set explicitly. All clones share the same time, and
/// setting it in one clone updates all the others.
#[cfg(with_testing)]
#[derive(Clone, Default, Debug)]
pub struct TestClock(Arc<Mutex<Timestamp>>);

#[cfg(with_testing)]
impl Clock for TestClock {
    fn current_time(&self) -> Timestamp {
        *self.lock()
    }
}

#[cfg(with_testing)]
impl TestClock {
    /// Creates a new clock with its time set to 0, i.e. the Unix epoch.
    pub fn new() -> Self {
        TestClock::default()
    }

    /// Creates a new clock showing `time`.
    pub fn starting_at(time: Timestamp) -> Self {
        TestClock(Arc::new(Mutex::new(time)))
    }

    /// Sets the current time.
    pub fn set(&self, time: Timestamp) {
        *self.lock() = time;
    }

    /// Advances the current time by `seconds`.
    pub fn add_secs(&self, seconds: u64) {
        let mut time = self.lock();
        *time = time.saturating_add_secs(seconds);
    }

    fn lock(&self) -> MutexGuard<Timestamp> {
        self.0.lock().expect("poisoned TestClock mutex")
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, TestClock};
    use crate::data_types::Timestamp;

    #[test]
    fn test_clock_clones_share_time() {
        let clock = TestClock::starting_at(Timestamp::from(100));
        let other = clock.clone();
        other.add_secs(5);
        assert_eq!(clock.current_time(), Timestamp::from(105));
        clock.set(Timestamp::from(7));
        assert_eq!(other.current_time(), Timestamp::from(7));
    }
}
