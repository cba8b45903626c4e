// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The signing and broadcasting interface of the user's wallet.

use std::fmt;

use async_trait::async_trait;
use polls_base::identifiers::PollId;
use serde::{Deserialize, Serialize};

use crate::transaction::Transaction;

/// A wallet that signs transactions and broadcasts them.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The type of errors returned by the signer.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Signs and broadcasts `transactions`, showing `display_info` to the user while they are
    /// processed.
    ///
    /// Fails when the sender of the transactions has no active session. Success only means
    /// that the transactions were handed over: they may still fail on the ledger.
    async fn sign_and_send(
        &self,
        transactions: Vec<Transaction>,
        display_info: &TransactionsDisplayInfo,
    ) -> Result<SessionId, Self::Error>;
}

/// The handle of a signing session, used to track the transactions it broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The messages shown to the user while a transaction is processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsDisplayInfo {
    pub processing_message: String,
    pub error_message: String,
    pub success_message: String,
}

impl TransactionsDisplayInfo {
    pub fn create_poll() -> Self {
        Self::new(
            "Creating poll...",
            "Poll could not be created.",
            "Poll created successfully!",
        )
    }

    pub fn cast_vote(poll_id: PollId) -> Self {
        Self::new(
            format!("Voting chosen option in poll {poll_id}..."),
            "Error during vote process",
            "Vote successfully stored!",
        )
    }

    pub fn close_poll(poll_id: PollId) -> Self {
        Self::new(
            format!("Closing poll {poll_id}..."),
            "Poll could not be closed.",
            "Poll closed successfully!",
        )
    }

    pub fn modify_poll(poll_id: PollId) -> Self {
        Self::new(
            format!("Modifying poll {poll_id}..."),
            "Poll could not be modified.",
            "Poll modified successfully!",
        )
    }

    fn new(
        processing_message: impl Into<String>,
        error_message: impl Into<String>,
        success_message: impl Into<String>,
    ) -> Self {
        TransactionsDisplayInfo {
            processing_message: processing_message.into(),
            error_message: error_message.into(),
            success_message: success_message.into(),
        }
    }
}
