// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use polls_base::{
    codec::{DecodeError, EncodeError},
    identifiers::PollId,
};
use thiserror::Error;

use crate::gateway::ReturnCode;

/// A boxed error from one of the external collaborators.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur when talking to the voting contract.
#[derive(Debug, Error)]
pub enum PollClientError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error("the gateway failed to run `{function}`: {error}")]
    Gateway {
        function: &'static str,
        #[source]
        error: BoxedError,
    },

    #[error("poll {0} does not exist")]
    NotFound(PollId),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("the contract rejected `{function}` with return code `{code}`: {message}")]
    ContractRejected {
        function: &'static str,
        code: ReturnCode,
        message: String,
    },

    #[error("{message}")]
    Submission {
        /// The error message shown to the user for this kind of transaction.
        message: String,
        #[source]
        error: BoxedError,
    },

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Local inputs that are missing or invalid. Nothing is sent when one of these occurs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    #[error("no sender address is bound to the client")]
    MissingSender,

    #[error("the poll question is empty")]
    EmptyQuestion,

    #[error("the poll has no options")]
    NoOptions,

    #[error("option index {0} does not fit in a single byte")]
    OptionIndexTooLarge(usize),
}
