// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! A client for the voting contract.
//!
//! [`PollContractClient`] is the entry point: it reads polls through a [`LedgerGateway`] and
//! sends state-changing calls through a [`Signer`]. Both collaborators are supplied by the
//! caller.

pub mod client;
pub mod config;
mod error;
pub mod gateway;
pub mod query;
pub mod signer;
#[cfg(with_testing)]
pub mod test_utils;
pub mod transaction;

pub use crate::{
    client::PollContractClient,
    config::ContractConfig,
    error::{PollClientError, PreconditionError},
    gateway::LedgerGateway,
    signer::Signer,
};
