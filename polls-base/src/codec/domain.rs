// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Conversions between the domain types and [`ContractValue`]s.
//!
//! Decoding is the only way the client builds [`Poll`]s out of contract data.

use super::{ContractValue, DecodeError, DecodeErrorKind};
use crate::{
    abi::EndpointAbi,
    data_types::{
        CreatePollRequest, ModifyPollRequest, OptionResult, ParticipationStats, Poll, PollFilter,
        PollOption, PollStatus, Timestamp,
    },
    identifiers::{Address, PollId},
};

/// Types that can be rebuilt from a decoded [`ContractValue`].
pub trait FromContractValue: Sized {
    /// Converts `value`, failing if it does not have the expected shape.
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind>;
}

/// Decodes the single result of a call to `endpoint` as a `T`.
///
/// The error carries the raw result items, concatenated.
pub fn decode_response<T: FromContractValue>(
    endpoint: &EndpointAbi,
    return_data: &[Vec<u8>],
) -> Result<T, DecodeError> {
    let mut outputs = endpoint.decode_outputs(return_data)?.into_iter();
    let value = outputs.next().ok_or_else(|| {
        DecodeError::new(
            format!("results of `{}`", endpoint.name),
            DecodeErrorKind::UnexpectedShape {
                expected: "a result",
                found: "an endpoint without results".to_owned(),
            },
            return_data.concat(),
        )
    })?;
    T::from_contract_value(value).map_err(|kind| {
        DecodeError::new(
            format!("results of `{}`", endpoint.name),
            kind,
            return_data.concat(),
        )
    })
}

fn unexpected(expected: &'static str, value: &ContractValue) -> DecodeErrorKind {
    DecodeErrorKind::UnexpectedShape {
        expected,
        found: value.kind_name().to_owned(),
    }
}

/// Reads the fields of a struct or the elements of a tuple in order.
struct Fields(std::vec::IntoIter<ContractValue>);

impl Fields {
    fn of(
        value: ContractValue,
        expected: &'static str,
        count: usize,
    ) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::Struct(values) | ContractValue::Tuple(values)
                if values.len() == count =>
            {
                Ok(Fields(values.into_iter()))
            }
            value => Err(unexpected(expected, &value)),
        }
    }

    fn next<T: FromContractValue>(&mut self) -> Result<T, DecodeErrorKind> {
        // `Fields::of` checked the number of values.
        let value = self.0.next().ok_or_else(|| DecodeErrorKind::UnexpectedShape {
            expected: "another field",
            found: "the end of the value".to_owned(),
        })?;
        T::from_contract_value(value)
    }
}

impl FromContractValue for ContractValue {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        Ok(value)
    }
}

impl FromContractValue for String {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|_| DecodeErrorKind::InvalidUtf8)
            }
            value => Err(unexpected("text", &value)),
        }
    }
}

impl FromContractValue for u64 {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::U8(value) => Ok(value.into()),
            ContractValue::U32(value) => Ok(value.into()),
            ContractValue::U64(value) => Ok(value),
            value => Err(unexpected("unsigned integer", &value)),
        }
    }
}

impl FromContractValue for bool {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::Bool(value) => Ok(value),
            value => Err(unexpected("boolean", &value)),
        }
    }
}

impl FromContractValue for Address {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::Address(address) => Ok(address),
            value => Err(unexpected("address", &value)),
        }
    }
}

impl FromContractValue for Timestamp {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        u64::from_contract_value(value).map(Timestamp::from)
    }
}

impl FromContractValue for PollId {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        u64::from_contract_value(value).map(PollId)
    }
}

impl FromContractValue for PollStatus {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::Enum(ordinal) => {
                PollStatus::from_ordinal(ordinal).ok_or(DecodeErrorKind::InvalidVariant(ordinal))
            }
            value => Err(unexpected("poll status", &value)),
        }
    }
}

impl<T: FromContractValue> FromContractValue for Vec<T> {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::List(items) => items.into_iter().map(T::from_contract_value).collect(),
            value => Err(unexpected("list", &value)),
        }
    }
}

impl<T: FromContractValue> FromContractValue for Option<T> {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        match value {
            ContractValue::Option(inner) => inner
                .map(|value| T::from_contract_value(*value))
                .transpose(),
            value => Err(unexpected("option", &value)),
        }
    }
}

impl FromContractValue for PollOption {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        let mut fields = Fields::of(value, "PollOption", 2)?;
        Ok(PollOption {
            name: fields.next()?,
            vote_count: fields.next()?,
        })
    }
}

impl FromContractValue for Poll {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        let mut fields = Fields::of(value, "Poll", 9)?;
        Ok(Poll {
            id: fields.next()?,
            question: fields.next()?,
            options: fields.next()?,
            start_time: fields.next()?,
            end_time: fields.next()?,
            creator: fields.next()?,
            is_closed: fields.next()?,
            can_change_vote: fields.next()?,
            whitelisted_addresses: fields.next()?,
        })
    }
}

impl FromContractValue for OptionResult {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        let mut fields = Fields::of(value, "(name, vote count, percentage)", 3)?;
        Ok(OptionResult {
            name: fields.next()?,
            vote_count: fields.next()?,
            percentage: fields.next()?,
        })
    }
}

impl FromContractValue for ParticipationStats {
    fn from_contract_value(value: ContractValue) -> Result<Self, DecodeErrorKind> {
        let mut fields = Fields::of(value, "(participant count, percentage)", 2)?;
        Ok(ParticipationStats {
            participant_count: fields.next()?,
            participation_percentage: fields.next()?,
        })
    }
}

impl From<Timestamp> for ContractValue {
    fn from(timestamp: Timestamp) -> Self {
        ContractValue::U64(timestamp.seconds())
    }
}

impl From<PollId> for ContractValue {
    fn from(id: PollId) -> Self {
        ContractValue::U64(id.0)
    }
}

impl From<Address> for ContractValue {
    fn from(address: Address) -> Self {
        ContractValue::Address(address)
    }
}

impl From<PollStatus> for ContractValue {
    fn from(status: PollStatus) -> Self {
        ContractValue::Enum(status.ordinal())
    }
}

impl From<&PollOption> for ContractValue {
    fn from(option: &PollOption) -> Self {
        ContractValue::Struct(vec![
            ContractValue::text(&option.name),
            ContractValue::U64(option.vote_count),
        ])
    }
}

impl From<&Poll> for ContractValue {
    fn from(poll: &Poll) -> Self {
        ContractValue::Struct(vec![
            poll.id.into(),
            ContractValue::text(&poll.question),
            ContractValue::List(poll.options.iter().map(ContractValue::from).collect()),
            poll.start_time.into(),
            poll.end_time.into(),
            poll.creator.into(),
            ContractValue::Bool(poll.is_closed),
            ContractValue::Bool(poll.can_change_vote),
            ContractValue::option(
                poll.whitelisted_addresses
                    .as_deref()
                    .map(address_list),
            ),
        ])
    }
}

impl From<&OptionResult> for ContractValue {
    fn from(result: &OptionResult) -> Self {
        ContractValue::Tuple(vec![
            ContractValue::text(&result.name),
            ContractValue::U64(result.vote_count),
            ContractValue::U64(result.percentage),
        ])
    }
}

impl From<&ParticipationStats> for ContractValue {
    fn from(stats: &ParticipationStats) -> Self {
        ContractValue::Tuple(vec![
            ContractValue::U64(stats.participant_count),
            ContractValue::option(stats.participation_percentage.map(ContractValue::U64)),
        ])
    }
}

fn address_list(addresses: &[Address]) -> ContractValue {
    ContractValue::List(addresses.iter().copied().map(ContractValue::from).collect())
}

/// The arguments of `createPoll`.
///
/// The voter whitelist is a trailing optional argument: it is left out entirely when empty.
pub fn create_poll_arguments(request: &CreatePollRequest) -> Vec<ContractValue> {
    let mut arguments = vec![
        ContractValue::text(&request.question),
        ContractValue::text_list(&request.options),
        request.start_time.into(),
        request.end_time.into(),
        ContractValue::Bool(request.can_change_vote),
    ];
    if !request.voter_whitelist.is_empty() {
        arguments.push(address_list(&request.voter_whitelist));
    }
    arguments
}

/// The arguments of `modifyPoll`.
pub fn modify_poll_arguments(poll_id: PollId, request: &ModifyPollRequest) -> Vec<ContractValue> {
    vec![
        poll_id.into(),
        ContractValue::text(&request.question),
        ContractValue::text_list(&request.options),
        request.start_time.into(),
        request.end_time.into(),
    ]
}

/// The arguments of `castVote`. Option indices are sent as a single byte.
pub fn cast_vote_arguments(poll_id: PollId, option_index: u8) -> Vec<ContractValue> {
    vec![poll_id.into(), ContractValue::U8(option_index)]
}

/// The arguments of the views taking a poll identifier.
pub fn poll_id_arguments(poll_id: PollId) -> Vec<ContractValue> {
    vec![poll_id.into()]
}

/// The status filter of `getPolls`: the contract's `Option<PollStatus>`.
///
/// No filter is the empty argument; a filter is the byte `0x01` followed by the ordinal of
/// the status.
pub fn status_filter_argument(status: Option<PollStatus>) -> ContractValue {
    ContractValue::option(status.map(ContractValue::from))
}

/// The arguments of `getPolls`. Both filters are always sent, empty when absent.
pub fn get_polls_arguments(filter: &PollFilter) -> Vec<ContractValue> {
    vec![
        status_filter_argument(filter.status),
        ContractValue::option(filter.creator.map(ContractValue::from)),
    ]
}
