// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The temporal lifecycle of a poll.
//!
//! A poll has not started while its start time lies in the future, is ongoing from its start
//! time to its end time, both included, and has ended afterwards. Exactly one of the three
//! predicates holds for any poll at any time, provided that all of them are evaluated against
//! the same `now`.

use crate::data_types::{Poll, PollStatus, Timestamp};

/// Returns whether `poll` has not started yet at time `now`.
pub fn poll_not_started(poll: &Poll, now: Timestamp) -> bool {
    poll.start_time > now
}

/// Returns whether `poll` accepts votes at time `now`, as far as time is concerned.
pub fn poll_ongoing(poll: &Poll, now: Timestamp) -> bool {
    poll.start_time <= now && now <= poll.end_time
}

/// Returns whether `poll` is over at time `now`.
pub fn poll_ended(poll: &Poll, now: Timestamp) -> bool {
    poll.end_time < now
}

impl PollStatus {
    /// Returns the status of `poll` at time `now`.
    ///
    /// A poll whose end time precedes its start time never counts as ongoing: it is reported
    /// as not started before its start time and as ended from then on.
    pub fn at(poll: &Poll, now: Timestamp) -> PollStatus {
        if poll_not_started(poll, now) {
            PollStatus::NotStarted
        } else if poll_ongoing(poll, now) {
            PollStatus::Ongoing
        } else {
            PollStatus::Ended
        }
    }
}

impl Poll {
    /// Returns the status of the poll at time `now`.
    pub fn status_at(&self, now: Timestamp) -> PollStatus {
        PollStatus::at(self, now)
    }
}

#[cfg(test)]
#[path = "unit_tests/lifecycle_tests.rs"]
mod lifecycle_tests;
