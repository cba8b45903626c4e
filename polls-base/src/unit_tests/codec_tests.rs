// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use test_case::test_case;
use test_strategy::proptest;

use super::*;
use crate::{
    abi::{ContractType, VotingAbi, CAST_VOTE, CREATE_POLL, GET_POLL, GET_POLLS, GET_POLL_RESULTS},
    data_types::{
        CreatePollRequest, OptionResult, ParticipationStats, Poll, PollFilter, PollOption,
        PollStatus, Timestamp,
    },
    identifiers::{Address, PollId},
};

fn endpoint(name: &str) -> crate::abi::EndpointAbi {
    VotingAbi::endpoint(name).expect("the endpoint is declared")
}

fn sample_poll(id: u64) -> Poll {
    Poll {
        id: PollId(id),
        question: "Which colour?".to_owned(),
        options: vec![
            PollOption {
                name: "Red".to_owned(),
                vote_count: 3,
            },
            PollOption {
                name: "Blau".to_owned(),
                vote_count: 0,
            },
        ],
        start_time: Timestamp::from(1_700_000_000),
        end_time: Timestamp::from(1_700_003_600),
        creator: Address::test_address(1),
        is_closed: false,
        can_change_vote: true,
        whitelisted_addresses: Some(vec![Address::test_address(2), Address::test_address(3)]),
    }
}

fn request(voter_whitelist: Vec<Address>) -> CreatePollRequest {
    CreatePollRequest {
        question: "Q".to_owned(),
        options: vec!["A".to_owned(), "B".to_owned()],
        start_time: Timestamp::from(100),
        end_time: Timestamp::from(200),
        can_change_vote: false,
        voter_whitelist,
    }
}

#[test_case(ContractValue::U64(0) => Vec::<u8>::new(); "zero is empty")]
#[test_case(ContractValue::U64(258) => vec![1, 2]; "minimal big endian")]
#[test_case(ContractValue::U8(7) => vec![7]; "single byte")]
#[test_case(ContractValue::Bool(true) => vec![1]; "true")]
#[test_case(ContractValue::Bool(false) => Vec::<u8>::new(); "false")]
#[test_case(ContractValue::text("hi") => b"hi".to_vec(); "raw text")]
#[test_case(ContractValue::option(None) => Vec::<u8>::new(); "absent option")]
#[test_case(ContractValue::option(Some(ContractValue::U32(1))) => vec![1, 0, 0, 0, 1]; "present option")]
#[test_case(ContractValue::text_list(&["a", "bc"]) => vec![0, 0, 0, 1, b'a', 0, 0, 0, 2, b'b', b'c']; "list of texts")]
fn top_encoding(value: ContractValue) -> Vec<u8> {
    value.top_encode().unwrap()
}

#[test_case(ContractValue::U64(1) => vec![0, 0, 0, 0, 0, 0, 0, 1]; "fixed width")]
#[test_case(ContractValue::Bool(false) => vec![0]; "false")]
#[test_case(ContractValue::text("hi") => vec![0, 0, 0, 2, b'h', b'i']; "length prefixed text")]
#[test_case(ContractValue::option(None) => vec![0]; "absent option")]
#[test_case(ContractValue::List(Vec::new()) => vec![0, 0, 0, 0]; "empty list")]
fn nested_encoding(value: ContractValue) -> Vec<u8> {
    value.nested_encode().unwrap()
}

#[test]
fn status_filter_encoding() {
    assert_eq!(status_filter_argument(None).top_encode().unwrap(), b"");
    assert_eq!(
        status_filter_argument(Some(PollStatus::NotStarted))
            .top_encode()
            .unwrap(),
        [1, 0]
    );
    assert_eq!(
        status_filter_argument(Some(PollStatus::Ongoing))
            .top_encode()
            .unwrap(),
        [1, 1]
    );
    assert_eq!(
        status_filter_argument(Some(PollStatus::Ended))
            .top_encode()
            .unwrap(),
        [1, 2]
    );
}

#[test]
fn get_polls_always_sends_both_filters() {
    let creator = Address::test_address(9);
    let arguments = endpoint(GET_POLLS)
        .encode_arguments(&get_polls_arguments(&PollFilter::ALL))
        .unwrap();
    assert_eq!(arguments, vec![Vec::<u8>::new(), Vec::new()]);

    let filter = PollFilter {
        status: Some(PollStatus::Ended),
        creator: Some(creator),
    };
    let arguments = endpoint(GET_POLLS)
        .encode_arguments(&get_polls_arguments(&filter))
        .unwrap();
    let mut expected_creator = vec![1];
    expected_creator.extend_from_slice(creator.as_bytes());
    assert_eq!(arguments, vec![vec![1, 2], expected_creator]);
}

#[test]
fn empty_whitelist_is_left_out() {
    let arguments = create_poll_arguments(&request(Vec::new()));
    assert_eq!(arguments.len(), 5);

    let encoded = endpoint(CREATE_POLL).encode_arguments(&arguments).unwrap();
    assert_eq!(
        encoded,
        vec![b"Q".to_vec(), vec![0, 0, 0, 1, b'A', 0, 0, 0, 1, b'B'], vec![100], vec![200], vec![]]
    );
}

#[test]
fn whitelist_is_a_trailing_list_of_addresses() {
    let voters = vec![Address::test_address(4), Address::test_address(5)];
    let arguments = create_poll_arguments(&request(voters.clone()));
    assert_eq!(arguments.len(), 6);

    let encoded = endpoint(CREATE_POLL).encode_arguments(&arguments).unwrap();
    let whitelist = voters
        .iter()
        .flat_map(|voter| voter.as_bytes().to_vec())
        .collect::<Vec<_>>();
    assert_eq!(encoded[5], whitelist);
}

#[test]
fn arguments_are_checked_against_the_endpoint() {
    let cast_vote = endpoint(CAST_VOTE);
    assert_matches!(
        cast_vote.encode_arguments(&[ContractValue::U64(1)]),
        Err(EncodeError::ArgumentCount {
            endpoint: "castVote",
            expected: 2,
            actual: 1,
        })
    );
    assert_matches!(
        cast_vote.encode_arguments(&[ContractValue::U64(1), ContractValue::text("0")]),
        Err(EncodeError::ArgumentType {
            argument: "option_index",
            ..
        })
    );
    assert_eq!(
        cast_vote
            .encode_arguments(&cast_vote_arguments(PollId(3), 0))
            .unwrap(),
        vec![vec![3], vec![]]
    );
}

#[proptest]
fn option_lists_survive_encoding(
    #[strategy(proptest::collection::vec(".*", 0..=255))] options: Vec<String>,
) {
    let encoded = ContractValue::text_list(&options).top_encode().unwrap();
    let decoded = ContractValue::decode_top(&encoded, &ContractType::list(ContractType::Bytes))
        .unwrap();
    assert_eq!(Vec::<String>::from_contract_value(decoded).unwrap(), options);
}

#[proptest]
fn unsigned_integers_survive_top_encoding(value: u64) {
    let encoded = ContractValue::U64(value).top_encode().unwrap();
    assert_eq!(
        ContractValue::decode_top(&encoded, &ContractType::U64).unwrap(),
        ContractValue::U64(value)
    );
}

#[test]
fn polls_are_decoded_from_contract_results() {
    let poll = sample_poll(4);
    let encoded = ContractValue::from(&poll).top_encode().unwrap();
    let decoded: Poll = decode_response(&endpoint(GET_POLL), &[encoded]).unwrap();
    assert_eq!(decoded, poll);

    let mut open_poll = sample_poll(5);
    open_poll.whitelisted_addresses = None;
    open_poll.is_closed = true;
    let polls = vec![poll, open_poll];
    let encoded = ContractValue::List(polls.iter().map(ContractValue::from).collect())
        .top_encode()
        .unwrap();
    let decoded: Vec<Poll> = decode_response(&endpoint(GET_POLLS), &[encoded]).unwrap();
    assert_eq!(decoded, polls);
}

#[test]
fn missing_list_result_is_empty() {
    let decoded: Vec<Poll> = decode_response(&endpoint(GET_POLLS), &[]).unwrap();
    assert!(decoded.is_empty());
    let decoded: Vec<Poll> = decode_response(&endpoint(GET_POLLS), &[Vec::new()]).unwrap();
    assert!(decoded.is_empty());
}

#[test]
fn decode_errors_keep_the_raw_response() {
    let error = decode_response::<Poll>(&endpoint(GET_POLL), &[vec![0, 0]]).unwrap_err();
    assert_eq!(error.raw, vec![0, 0]);
    assert_matches!(error.kind, DecodeErrorKind::UnexpectedEnd { needed: 8, remaining: 2 });
    assert!(error.to_string().contains("0x0000"));

    let encoded = ContractValue::from(&sample_poll(1)).top_encode().unwrap();
    let error =
        decode_response::<Poll>(&endpoint(GET_POLL), &[encoded, vec![1]]).unwrap_err();
    assert_eq!(error.kind, DecodeErrorKind::TrailingItems(1));
}

#[test]
fn malformed_values_are_rejected() {
    assert_matches!(
        ContractValue::decode_top(&[1; 9], &ContractType::U64),
        Err(DecodeError {
            kind: DecodeErrorKind::IntegerTooLarge { width: 8, length: 9 },
            ..
        })
    );
    assert_matches!(
        ContractValue::decode_top(&[3], &VotingAbi::poll_status_type()),
        Err(DecodeError {
            kind: DecodeErrorKind::InvalidVariant(3),
            ..
        })
    );
    assert_matches!(
        ContractValue::decode_nested(&[2], &ContractType::Bool),
        Err(DecodeError {
            kind: DecodeErrorKind::InvalidBool(2),
            ..
        })
    );
    assert_matches!(
        ContractValue::decode_top(&[2, 0], &ContractType::option(ContractType::U8)),
        Err(DecodeError {
            kind: DecodeErrorKind::InvalidOptionTag(2),
            ..
        })
    );
    assert_matches!(
        ContractValue::decode_nested(&[0, 0, 0, 1, 0xff], &ContractType::Bytes)
            .map(String::from_contract_value),
        Ok(Err(DecodeErrorKind::InvalidUtf8))
    );
}

#[test]
fn poll_results_are_read_from_a_multi_value() {
    let items = vec![
        b"A".to_vec(),
        vec![3],
        vec![75],
        b"B".to_vec(),
        vec![1],
        vec![25],
    ];
    let results: Vec<OptionResult> = decode_response(&endpoint(GET_POLL_RESULTS), &items).unwrap();
    assert_eq!(
        results,
        vec![
            OptionResult {
                name: "A".to_owned(),
                vote_count: 3,
                percentage: 75,
            },
            OptionResult {
                name: "B".to_owned(),
                vote_count: 1,
                percentage: 25,
            },
        ]
    );

    let error =
        decode_response::<Vec<OptionResult>>(&endpoint(GET_POLL_RESULTS), &items[..4]).unwrap_err();
    assert_eq!(error.kind, DecodeErrorKind::TrailingItems(1));
}

#[test]
fn participation_stats_are_a_pair() {
    let stats = ParticipationStats {
        participant_count: 3,
        participation_percentage: Some(75),
    };
    let encoded = ContractValue::from(&stats).top_encode().unwrap();
    assert_eq!(
        encoded,
        vec![0, 0, 0, 0, 0, 0, 0, 3, 1, 0, 0, 0, 0, 0, 0, 0, 75]
    );
    let endpoint = endpoint(crate::abi::GET_POLL_PARTICIPATION_STATS);
    assert_eq!(
        decode_response::<ParticipationStats>(&endpoint, &[encoded]).unwrap(),
        stats
    );
}

#[test]
fn call_data_lists_hex_arguments() {
    let data = call_data(CAST_VOTE, &[vec![0x0a], Vec::new()]);
    assert_eq!(data, "castVote@0a@");
    assert_eq!(
        parse_call_data(&data).unwrap(),
        ("castVote".to_owned(), vec![vec![0x0a], Vec::new()])
    );
    assert_eq!(call_data(CAST_VOTE, &[]), "castVote");
    assert!(parse_call_data("castVote@zz").is_err());
}
