// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The read and broadcast interface of the ledger, and the JSON shapes it exchanges.

use std::fmt;

use async_trait::async_trait;
use polls_base::identifiers::Address;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, hex::Hex, serde_as};

use crate::transaction::Transaction;

/// Access to the ledger's nodes.
///
/// Implementations handle transport and retries. The client makes at most one call per
/// operation.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// The type of errors returned by the gateway.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs a read-only call of a contract view.
    async fn query_contract(&self, query: &ContractQuery) -> Result<QueryResponse, Self::Error>;

    /// Broadcasts a signed transaction.
    async fn submit_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionHash, Self::Error>;
}

/// A read-only call of a contract view.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuery {
    pub sc_address: Address,
    pub func_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Address>,
    /// The top-level encoded arguments.
    #[serde_as(as = "Vec<Hex>")]
    pub args: Vec<Vec<u8>>,
}

/// The outcome of a [`ContractQuery`].
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// The top-level encoded results, one item per result value.
    #[serde_as(as = "Vec<Base64>")]
    #[serde(default)]
    pub return_data: Vec<Vec<u8>>,
    pub return_code: ReturnCode,
    #[serde(default)]
    pub return_message: String,
}

impl QueryResponse {
    /// A successful response carrying `return_data`.
    pub fn ok(return_data: Vec<Vec<u8>>) -> Self {
        QueryResponse {
            return_data,
            return_code: ReturnCode::Ok,
            return_message: String::new(),
        }
    }

    /// A failed response.
    pub fn failed(return_code: ReturnCode, return_message: impl Into<String>) -> Self {
        QueryResponse {
            return_data: Vec::new(),
            return_code,
            return_message: return_message.into(),
        }
    }

    /// Returns whether the response carries no value at all.
    pub fn is_empty(&self) -> bool {
        self.return_data.iter().all(Vec::is_empty)
    }
}

/// The status of a contract call, as reported by the virtual machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnCode {
    #[serde(rename = "ok")]
    Ok,
    #[serde(rename = "function not found")]
    FunctionNotFound,
    #[serde(rename = "function wrong signature")]
    FunctionWrongSignature,
    #[serde(rename = "contract not found")]
    ContractNotFound,
    /// The contract signalled an error, e.g. a failed requirement or a missing storage entry.
    #[serde(rename = "user error")]
    UserError,
    #[serde(rename = "out of gas")]
    OutOfGas,
    #[serde(rename = "account collision")]
    AccountCollision,
    #[serde(rename = "out of funds")]
    OutOfFunds,
    #[serde(rename = "call stack overflow")]
    CallStackOverflow,
    #[serde(rename = "contract invalid")]
    ContractInvalid,
    #[serde(rename = "execution failed")]
    ExecutionFailed,
    #[serde(other)]
    Unknown,
}

impl ReturnCode {
    /// Returns the code as it appears in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnCode::Ok => "ok",
            ReturnCode::FunctionNotFound => "function not found",
            ReturnCode::FunctionWrongSignature => "function wrong signature",
            ReturnCode::ContractNotFound => "contract not found",
            ReturnCode::UserError => "user error",
            ReturnCode::OutOfGas => "out of gas",
            ReturnCode::AccountCollision => "account collision",
            ReturnCode::OutOfFunds => "out of funds",
            ReturnCode::CallStackOverflow => "call stack overflow",
            ReturnCode::ContractInvalid => "contract invalid",
            ReturnCode::ExecutionFailed => "execution failed",
            ReturnCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The hash of a broadcast transaction, in hexadecimal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionHash(pub String);

impl fmt::Display for TransactionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "unit_tests/gateway_tests.rs"]
mod gateway_tests;
