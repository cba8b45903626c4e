// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use test_case::test_case;
use test_strategy::proptest;

use super::*;
use crate::{
    data_types::PollOption,
    identifiers::{Address, PollId},
};

fn poll(start: u64, end: u64) -> Poll {
    Poll {
        id: PollId(0),
        question: "Q".to_owned(),
        options: ["A", "B"]
            .into_iter()
            .map(|name| PollOption {
                name: name.to_owned(),
                vote_count: 0,
            })
            .collect(),
        start_time: Timestamp::from(start),
        end_time: Timestamp::from(end),
        creator: Address::test_address(1),
        is_closed: false,
        can_change_vote: false,
        whitelisted_addresses: None,
    }
}

#[test_case(99 => PollStatus::NotStarted; "just before the start")]
#[test_case(100 => PollStatus::Ongoing; "at the start")]
#[test_case(150 => PollStatus::Ongoing; "in the middle")]
#[test_case(200 => PollStatus::Ongoing; "at the end")]
#[test_case(201 => PollStatus::Ended; "just after the end")]
fn status_around_the_boundaries(now: u64) -> PollStatus {
    PollStatus::at(&poll(100, 200), Timestamp::from(now))
}

#[test]
fn an_hour_long_poll() {
    let start = 1_700_000_000;
    let poll = poll(start, start + 3600);
    assert_eq!(
        poll.status_at(Timestamp::from(start + 1)),
        PollStatus::Ongoing
    );
    assert!(poll_ongoing(&poll, Timestamp::from(start + 1)));
    assert_eq!(
        poll.status_at(Timestamp::from(start + 3601)),
        PollStatus::Ended
    );
    assert!(poll_ended(&poll, Timestamp::from(start + 3601)));
}

#[test]
fn closing_does_not_affect_the_lifecycle() {
    let mut poll = poll(100, 200);
    poll.is_closed = true;
    assert_eq!(poll.status_at(Timestamp::from(150)), PollStatus::Ongoing);
}

#[proptest]
fn exactly_one_status_holds(
    start: u64,
    #[strategy(0..=u64::MAX - #start)] length: u64,
    now: u64,
) {
    let poll = poll(start, start + length);
    let now = Timestamp::from(now);
    let holding = [
        poll_not_started(&poll, now),
        poll_ongoing(&poll, now),
        poll_ended(&poll, now),
    ];
    assert_eq!(holding.iter().filter(|holds| **holds).count(), 1);

    let expected = PollStatus::ALL[holding.iter().position(|holds| *holds).unwrap()];
    assert_eq!(PollStatus::at(&poll, now), expected);
}
