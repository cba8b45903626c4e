// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core data-types of the voting contract client.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::identifiers::{Address, PollId};

/// A point in time, in seconds since the Unix epoch.
///
/// The contract measures time with block timestamps, which have a resolution of one second.
#[derive(
    Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Default, Debug, Serialize, Deserialize,
)]
#[cfg_attr(with_testing, derive(test_strategy::Arbitrary))]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Returns the current time according to the system clock.
    pub fn now() -> Timestamp {
        Timestamp(chrono::Utc::now().timestamp().try_into().unwrap_or(0))
    }

    /// Returns the number of seconds since the Unix epoch.
    pub const fn seconds(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp that is `seconds` later than `self`.
    pub const fn saturating_add_secs(&self, seconds: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(seconds))
    }
}

impl From<u64> for Timestamp {
    fn from(seconds: u64) -> Timestamp {
        Timestamp(seconds)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date_time = i64::try_from(self.0)
            .ok()
            .and_then(|seconds| chrono::DateTime::from_timestamp(seconds, 0));
        match date_time {
            Some(date_time) => date_time.format("%d/%m/%y - %H:%M").fmt(f),
            None => write!(f, "{}s", self.0),
        }
    }
}

/// One of the choices of a poll, with the number of votes it received so far.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Serialize, Deserialize)]
pub struct PollOption {
    pub name: String,
    pub vote_count: u64,
}

/// A snapshot of a poll, as stored by the contract.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    /// The options, in ballot order. An option's position is the index used to vote for it.
    pub options: Vec<PollOption>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub creator: Address,
    pub is_closed: bool,
    pub can_change_vote: bool,
    /// The addresses allowed to vote. `None` means everybody may vote.
    pub whitelisted_addresses: Option<Vec<Address>>,
}

impl Poll {
    /// Returns the sum of the votes of all options.
    pub fn total_votes(&self) -> u64 {
        self.options
            .iter()
            .fold(0u64, |total, option| total.saturating_add(option.vote_count))
    }

    /// Returns whether `voter` is allowed to vote in this poll.
    pub fn admits(&self, voter: &Address) -> bool {
        self.whitelisted_addresses
            .as_ref()
            .map_or(true, |whitelist| whitelist.contains(voter))
    }

    /// Returns the position of the option called `name`, if any.
    pub fn option_index(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|option| option.name == name)
    }
}

/// The lifecycle state of a poll at a given time.
///
/// The discriminants match the contract's `PollStatus` enum.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Debug, Serialize, Deserialize)]
#[cfg_attr(with_testing, derive(test_strategy::Arbitrary))]
pub enum PollStatus {
    NotStarted = 0,
    Ongoing = 1,
    Ended = 2,
}

impl PollStatus {
    /// All the statuses, in discriminant order.
    pub const ALL: [PollStatus; 3] = [
        PollStatus::NotStarted,
        PollStatus::Ongoing,
        PollStatus::Ended,
    ];

    /// Returns the discriminant used by the contract.
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Returns the status with the given discriminant.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }
}

impl Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PollStatus::NotStarted => "not started",
            PollStatus::Ongoing => "ongoing",
            PollStatus::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// The criteria accepted by the contract's `getPolls` view.
#[derive(Eq, PartialEq, Copy, Clone, Hash, Default, Debug, Serialize, Deserialize)]
pub struct PollFilter {
    /// Only return polls in this lifecycle state, evaluated against the block time.
    pub status: Option<PollStatus>,
    /// Only return polls created by this address.
    pub creator: Option<Address>,
}

impl PollFilter {
    /// A filter matching every poll.
    pub const ALL: PollFilter = PollFilter {
        status: None,
        creator: None,
    };

    /// A filter on the lifecycle state only.
    pub fn with_status(status: PollStatus) -> Self {
        PollFilter {
            status: Some(status),
            creator: None,
        }
    }
}

impl From<Option<PollStatus>> for PollFilter {
    fn from(status: Option<PollStatus>) -> Self {
        PollFilter {
            status,
            creator: None,
        }
    }
}

/// The parameters of a new poll.
#[derive(Eq, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    /// The option names, in ballot order.
    pub options: Vec<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub can_change_vote: bool,
    /// The addresses allowed to vote. An empty list opens the poll to everybody.
    #[serde(default)]
    pub voter_whitelist: Vec<Address>,
}

/// The new parameters of an existing poll.
///
/// Once a poll has started, the contract only applies the new end time.
#[derive(Eq, PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct ModifyPollRequest {
    pub question: String,
    pub options: Vec<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// The tally of one option, as aggregated by the contract.
#[derive(Eq, PartialEq, Clone, Hash, Debug, Serialize, Deserialize)]
pub struct OptionResult {
    pub name: String,
    pub vote_count: u64,
    /// The share of the votes, rounded down, in percent.
    pub percentage: u64,
}

/// How many accounts took part in a poll.
#[derive(Eq, PartialEq, Copy, Clone, Hash, Debug, Serialize, Deserialize)]
pub struct ParticipationStats {
    pub participant_count: u64,
    /// The share of the whitelisted voters who voted, in percent. Only known for polls with a
    /// whitelist.
    pub participation_percentage: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::{Poll, PollFilter, PollOption, PollStatus, Timestamp};
    use crate::identifiers::{Address, PollId};

    #[test]
    fn timestamp_display_uses_day_month_year() {
        // 2024-03-09 17:45:00 UTC
        let timestamp = Timestamp::from(1_710_006_300);
        assert_eq!(timestamp.to_string(), "09/03/24 - 17:45");
    }

    #[test]
    fn status_ordinals_round_trip() {
        for status in PollStatus::ALL {
            assert_eq!(PollStatus::from_ordinal(status.ordinal()), Some(status));
        }
        assert_eq!(PollStatus::from_ordinal(3), None);
    }

    #[test]
    fn options_are_found_by_name() {
        let poll = Poll {
            id: PollId(0),
            question: "Lunch?".to_owned(),
            options: ["Pizza", "Salad", "Pizza"]
                .into_iter()
                .map(|name| PollOption {
                    name: name.to_owned(),
                    vote_count: 1,
                })
                .collect(),
            start_time: Timestamp::from(0),
            end_time: Timestamp::from(10),
            creator: Address::test_address(1),
            is_closed: false,
            can_change_vote: false,
            whitelisted_addresses: None,
        };
        assert_eq!(poll.option_index("Pizza"), Some(0));
        assert_eq!(poll.option_index("Salad"), Some(1));
        assert_eq!(poll.option_index("Soup"), None);
        assert_eq!(poll.total_votes(), 3);
    }

    #[test]
    fn status_filters_leave_the_creator_open() {
        let filter = PollFilter::with_status(PollStatus::Ended);
        assert_eq!(filter.status, Some(PollStatus::Ended));
        assert_eq!(filter.creator, None);
        assert_eq!(filter, PollFilter::from(Some(PollStatus::Ended)));
        assert_eq!(PollFilter::from(None), PollFilter::ALL);
    }
}
