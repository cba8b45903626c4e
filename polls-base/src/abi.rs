// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The schema of the voting contract: the argument and result types of each endpoint.

use std::fmt;

use crate::codec::{ContractValue, DecodeError, DecodeErrorKind, EncodeError};

/// The `createPoll` endpoint.
pub const CREATE_POLL: &str = "createPoll";
/// The `getPolls` view.
pub const GET_POLLS: &str = "getPolls";
/// The `getPoll` view.
pub const GET_POLL: &str = "getPoll";
/// The `modifyPoll` endpoint.
pub const MODIFY_POLL: &str = "modifyPoll";
/// The `closePoll` endpoint.
pub const CLOSE_POLL: &str = "closePoll";
/// The `castVote` endpoint.
pub const CAST_VOTE: &str = "castVote";
/// The `getPollResults` view.
pub const GET_POLL_RESULTS: &str = "getPollResults";
/// The `getPollParticipationStats` view.
pub const GET_POLL_PARTICIPATION_STATS: &str = "getPollParticipationStats";

/// A type of the contract's type system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractType {
    /// An arbitrary byte string, e.g. UTF-8 text.
    Bytes,
    U8,
    U32,
    U64,
    Bool,
    Address,
    List(Box<ContractType>),
    Option(Box<ContractType>),
    /// A struct, whose fields are encoded one after the other.
    Struct {
        name: &'static str,
        fields: Vec<Field>,
    },
    Tuple(Vec<ContractType>),
    /// An enum without payloads, encoded as the index of its variant.
    Enum {
        name: &'static str,
        variants: &'static [&'static str],
    },
}

/// A named field of a [`ContractType::Struct`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: ContractType,
}

impl ContractType {
    /// Shorthand for [`ContractType::List`].
    pub fn list(item: ContractType) -> Self {
        ContractType::List(Box::new(item))
    }

    /// Shorthand for [`ContractType::Option`].
    pub fn option(inner: ContractType) -> Self {
        ContractType::Option(Box::new(inner))
    }

    /// Returns whether `value` can be sent where this type is expected.
    ///
    /// Unsigned integers may be narrower than the declared type: the top-level encoding of an
    /// integer does not depend on its width.
    pub fn accepts(&self, value: &ContractValue) -> bool {
        match (self, value) {
            (ContractType::Bytes, ContractValue::Bytes(_))
            | (ContractType::Bool, ContractValue::Bool(_))
            | (ContractType::Address, ContractValue::Address(_))
            | (ContractType::U8, ContractValue::U8(_))
            | (ContractType::U32, ContractValue::U8(_) | ContractValue::U32(_))
            | (
                ContractType::U64,
                ContractValue::U8(_) | ContractValue::U32(_) | ContractValue::U64(_),
            ) => true,
            (ContractType::List(item), ContractValue::List(values)) => {
                values.iter().all(|value| item.accepts(value))
            }
            (ContractType::Option(_), ContractValue::Option(None)) => true,
            (ContractType::Option(inner), ContractValue::Option(Some(value))) => {
                inner.accepts(value)
            }
            (ContractType::Struct { fields, .. }, ContractValue::Struct(values)) => {
                fields.len() == values.len()
                    && fields
                        .iter()
                        .zip(values)
                        .all(|(field, value)| field.ty.accepts(value))
            }
            (ContractType::Tuple(types), ContractValue::Tuple(values)) => {
                types.len() == values.len()
                    && types.iter().zip(values).all(|(ty, value)| ty.accepts(value))
            }
            (ContractType::Enum { variants, .. }, ContractValue::Enum(discriminant)) => {
                usize::from(*discriminant) < variants.len()
            }
            _ => false,
        }
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractType::Bytes => f.write_str("bytes"),
            ContractType::U8 => f.write_str("u8"),
            ContractType::U32 => f.write_str("u32"),
            ContractType::U64 => f.write_str("u64"),
            ContractType::Bool => f.write_str("bool"),
            ContractType::Address => f.write_str("Address"),
            ContractType::List(item) => write!(f, "List<{item}>"),
            ContractType::Option(inner) => write!(f, "Option<{inner}>"),
            ContractType::Struct { name, .. } | ContractType::Enum { name, .. } => {
                f.write_str(name)
            }
            ContractType::Tuple(types) => {
                f.write_str("(")?;
                for (index, ty) in types.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{ty}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Whether calling an endpoint may change the contract's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutability {
    /// A view, queried without a transaction.
    Readonly,
    /// An endpoint, called through a signed transaction.
    Mutable,
}

/// A declared argument of an endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputAbi {
    pub name: &'static str,
    pub ty: ContractType,
    /// Trailing optional arguments may be left out of the call entirely.
    pub optional: bool,
}

/// A declared result of an endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputAbi {
    pub ty: ContractType,
    /// A variable number of values, each of them flattened into one result item per
    /// tuple element.
    pub multi_result: bool,
}

/// The schema of one endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointAbi {
    pub name: &'static str,
    pub mutability: Mutability,
    pub inputs: Vec<InputAbi>,
    pub outputs: Vec<OutputAbi>,
}

impl EndpointAbi {
    /// Checks `arguments` against the declared inputs and returns their top-level encodings,
    /// in order.
    pub fn encode_arguments(
        &self,
        arguments: &[ContractValue],
    ) -> Result<Vec<Vec<u8>>, EncodeError> {
        let required = self.inputs.iter().filter(|input| !input.optional).count();
        if arguments.len() < required || arguments.len() > self.inputs.len() {
            return Err(EncodeError::ArgumentCount {
                endpoint: self.name,
                expected: self.inputs.len(),
                actual: arguments.len(),
            });
        }
        self.inputs
            .iter()
            .zip(arguments)
            .map(|(input, argument)| {
                if !input.ty.accepts(argument) {
                    return Err(EncodeError::ArgumentType {
                        endpoint: self.name,
                        argument: input.name,
                        expected: input.ty.to_string(),
                    });
                }
                argument.top_encode()
            })
            .collect()
    }

    /// Decodes the result items of a call, one value per declared output.
    ///
    /// A multi-result output becomes a [`ContractValue::List`] of its entries. A missing item
    /// decodes like an empty one, so that an absent list is an empty list.
    pub fn decode_outputs(
        &self,
        return_data: &[Vec<u8>],
    ) -> Result<Vec<ContractValue>, DecodeError> {
        let mut items = return_data.iter();
        let mut values = Vec::with_capacity(self.outputs.len());
        for output in &self.outputs {
            if output.multi_result {
                let remaining = items.by_ref().collect::<Vec<_>>();
                values.push(decode_multi_result(&output.ty, &remaining)?);
            } else {
                let item = items.next().map(Vec::as_slice).unwrap_or_default();
                values.push(ContractValue::decode_top(item, &output.ty)?);
            }
        }
        let surplus = items.count();
        if surplus > 0 {
            return Err(DecodeError::new(
                format!("results of `{}`", self.name),
                DecodeErrorKind::TrailingItems(surplus),
                return_data.concat(),
            ));
        }
        Ok(values)
    }
}

fn decode_multi_result(
    ty: &ContractType,
    items: &[&Vec<u8>],
) -> Result<ContractValue, DecodeError> {
    let entries = match ty {
        ContractType::Tuple(types) if types.is_empty() => Vec::new(),
        ContractType::Tuple(types) => {
            let incomplete = items.len() % types.len();
            if incomplete != 0 {
                return Err(DecodeError::new(
                    format!("multi-value of {ty}"),
                    DecodeErrorKind::TrailingItems(incomplete),
                    items.iter().flat_map(|item| item.iter().copied()).collect(),
                ));
            }
            items
                .chunks(types.len())
                .map(|chunk| {
                    let elements = types
                        .iter()
                        .zip(chunk)
                        .map(|(ty, item)| ContractValue::decode_top(item, ty))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(ContractValue::Tuple(elements))
                })
                .collect::<Result<Vec<_>, DecodeError>>()?
        }
        ty => items
            .iter()
            .map(|item| ContractValue::decode_top(item, ty))
            .collect::<Result<Vec<_>, _>>()?,
    };
    Ok(ContractValue::List(entries))
}

/// The endpoints of the voting contract.
pub struct VotingAbi;

impl VotingAbi {
    /// The variants of the contract's `PollStatus` enum.
    pub const POLL_STATUS_VARIANTS: &'static [&'static str] =
        &["NotStarted", "Ongoing", "Ended"];

    /// Returns the schema of the endpoint called `name`, if the contract has one.
    pub fn endpoint(name: &str) -> Option<EndpointAbi> {
        let endpoint = match name {
            CREATE_POLL => Self::create_poll(),
            GET_POLLS => Self::get_polls(),
            GET_POLL => Self::get_poll(),
            MODIFY_POLL => Self::modify_poll(),
            CLOSE_POLL => Self::close_poll(),
            CAST_VOTE => Self::cast_vote(),
            GET_POLL_RESULTS => Self::get_poll_results(),
            GET_POLL_PARTICIPATION_STATS => Self::get_poll_participation_stats(),
            _ => return None,
        };
        Some(endpoint)
    }

    /// The type `PollOption { name, vote_count }`.
    pub fn poll_option_type() -> ContractType {
        ContractType::Struct {
            name: "PollOption",
            fields: vec![
                field("name", ContractType::Bytes),
                field("vote_count", ContractType::U64),
            ],
        }
    }

    /// The type `Poll`, in the contract's field order.
    pub fn poll_type() -> ContractType {
        ContractType::Struct {
            name: "Poll",
            fields: vec![
                field("id", ContractType::U64),
                field("question", ContractType::Bytes),
                field("options", ContractType::list(Self::poll_option_type())),
                field("start_time", ContractType::U64),
                field("end_time", ContractType::U64),
                field("creator", ContractType::Address),
                field("is_closed", ContractType::Bool),
                field("can_change_vote", ContractType::Bool),
                field(
                    "whitelisted_addresses",
                    ContractType::option(ContractType::list(ContractType::Address)),
                ),
            ],
        }
    }

    /// The type `PollStatus`.
    pub fn poll_status_type() -> ContractType {
        ContractType::Enum {
            name: "PollStatus",
            variants: Self::POLL_STATUS_VARIANTS,
        }
    }

    fn create_poll() -> EndpointAbi {
        EndpointAbi {
            name: CREATE_POLL,
            mutability: Mutability::Mutable,
            inputs: vec![
                input("question", ContractType::Bytes),
                input("options", ContractType::list(ContractType::Bytes)),
                input("start_time", ContractType::U64),
                input("end_time", ContractType::U64),
                input("can_change_vote", ContractType::Bool),
                InputAbi {
                    name: "voter_whitelist",
                    ty: ContractType::list(ContractType::Address),
                    optional: true,
                },
            ],
            outputs: Vec::new(),
        }
    }

    fn get_polls() -> EndpointAbi {
        EndpointAbi {
            name: GET_POLLS,
            mutability: Mutability::Readonly,
            inputs: vec![
                input("status_filter", ContractType::option(Self::poll_status_type())),
                input("creator_filter", ContractType::option(ContractType::Address)),
            ],
            outputs: vec![output(ContractType::list(Self::poll_type()))],
        }
    }

    fn get_poll() -> EndpointAbi {
        EndpointAbi {
            name: GET_POLL,
            mutability: Mutability::Readonly,
            inputs: vec![input("poll_id", ContractType::U64)],
            outputs: vec![output(Self::poll_type())],
        }
    }

    fn modify_poll() -> EndpointAbi {
        EndpointAbi {
            name: MODIFY_POLL,
            mutability: Mutability::Mutable,
            inputs: vec![
                input("poll_id", ContractType::U64),
                input("new_question", ContractType::Bytes),
                input("new_options", ContractType::list(ContractType::Bytes)),
                input("new_start_time", ContractType::U64),
                input("new_end_time", ContractType::U64),
            ],
            outputs: Vec::new(),
        }
    }

    fn close_poll() -> EndpointAbi {
        EndpointAbi {
            name: CLOSE_POLL,
            mutability: Mutability::Mutable,
            inputs: vec![input("poll_id", ContractType::U64)],
            outputs: Vec::new(),
        }
    }

    fn cast_vote() -> EndpointAbi {
        EndpointAbi {
            name: CAST_VOTE,
            mutability: Mutability::Mutable,
            // The contract declares a `usize`, which is 32 bits wide on its VM.
            inputs: vec![
                input("poll_id", ContractType::U64),
                input("option_index", ContractType::U32),
            ],
            outputs: Vec::new(),
        }
    }

    fn get_poll_results() -> EndpointAbi {
        EndpointAbi {
            name: GET_POLL_RESULTS,
            mutability: Mutability::Readonly,
            inputs: vec![input("poll_id", ContractType::U64)],
            outputs: vec![OutputAbi {
                ty: ContractType::Tuple(vec![
                    ContractType::Bytes,
                    ContractType::U64,
                    ContractType::U64,
                ]),
                multi_result: true,
            }],
        }
    }

    fn get_poll_participation_stats() -> EndpointAbi {
        EndpointAbi {
            name: GET_POLL_PARTICIPATION_STATS,
            mutability: Mutability::Readonly,
            inputs: vec![input("poll_id", ContractType::U64)],
            outputs: vec![output(ContractType::Tuple(vec![
                ContractType::U64,
                ContractType::option(ContractType::U64),
            ]))],
        }
    }
}

fn field(name: &'static str, ty: ContractType) -> Field {
    Field { name, ty }
}

fn input(name: &'static str, ty: ContractType) -> InputAbi {
    InputAbi {
        name,
        ty,
        optional: false,
    }
}

fn output(ty: ContractType) -> OutputAbi {
    OutputAbi {
        ty,
        multi_result: false,
    }
}
