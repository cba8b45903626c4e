// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! State-changing calls of the voting contract.

use std::sync::Arc;

use polls_base::{
    abi::{VotingAbi, CAST_VOTE, CLOSE_POLL, CREATE_POLL, MODIFY_POLL},
    codec::{self, ContractValue, EncodeError},
    data_types::{CreatePollRequest, ModifyPollRequest},
    ensure,
    identifiers::{Address, PollId},
};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as, DisplayFromStr};
use tracing::{debug, error, info, instrument};

use crate::{
    config::{ContractConfig, TRANSACTION_VERSION},
    error::{PollClientError, PreconditionError},
    signer::{SessionId, Signer, TransactionsDisplayInfo},
};

#[cfg(with_metrics)]
mod metrics {
    use std::sync::LazyLock;

    use polls_base::prometheus_util::register_int_counter_vec;
    use prometheus::IntCounterVec;

    pub static TRANSACTION_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
        register_int_counter_vec(
            "contract_transactions",
            "Number of contract calls handed to the signer",
            &["function", "outcome"],
        )
        .expect("Counter creation should not fail")
    });
}

/// An unsigned transaction calling the voting contract.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Left to the signer, which knows the sender's account state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
    /// The amount of native tokens transferred, in the smallest denomination.
    #[serde_as(as = "DisplayFromStr")]
    pub value: u128,
    pub receiver: Address,
    pub sender: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// The call data, `function@arg1@arg2...`.
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
    #[serde(rename = "chainID")]
    pub chain_id: String,
    pub version: u32,
}

impl Transaction {
    /// Creates a call of the configured contract that transfers no tokens.
    pub fn contract_call(config: &ContractConfig, sender: Address, call_data: String) -> Self {
        Transaction {
            nonce: None,
            value: 0,
            receiver: config.contract_address,
            sender,
            gas_price: config.gas_price,
            gas_limit: config.gas_limit,
            data: call_data.into_bytes(),
            chain_id: config.chain_id.clone(),
            version: TRANSACTION_VERSION,
        }
    }

    /// Returns the call data as text, if it is valid UTF-8.
    pub fn call_data(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }
}

/// Builds the transactions of the voting contract and hands them to a [`Signer`].
///
/// Nothing is retried, and nothing waits for the transactions to be executed.
pub struct ContractTransactionService<S> {
    signer: Arc<S>,
    config: ContractConfig,
}

impl<S> Clone for ContractTransactionService<S> {
    fn clone(&self) -> Self {
        ContractTransactionService {
            signer: self.signer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S: Signer> ContractTransactionService<S> {
    pub fn new(signer: Arc<S>, config: ContractConfig) -> Self {
        ContractTransactionService { signer, config }
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Creates a poll. The contract assigns its identifier.
    #[instrument(skip_all, fields(question = %request.question))]
    pub async fn create_poll(
        &self,
        request: &CreatePollRequest,
        sender: Option<Address>,
    ) -> Result<SessionId, PollClientError> {
        let sender = sender.ok_or(PreconditionError::MissingSender)?;
        check_poll_contents(&request.question, &request.options)?;
        self.submit(
            CREATE_POLL,
            sender,
            codec::create_poll_arguments(request),
            TransactionsDisplayInfo::create_poll(),
        )
        .await
    }

    /// Votes for the option at position `option_index` of the poll.
    #[instrument(skip_all, fields(%poll_id, option_index))]
    pub async fn cast_vote(
        &self,
        poll_id: PollId,
        option_index: usize,
        sender: Option<Address>,
    ) -> Result<SessionId, PollClientError> {
        let sender = sender.ok_or(PreconditionError::MissingSender)?;
        let option_index = u8::try_from(option_index)
            .map_err(|_| PreconditionError::OptionIndexTooLarge(option_index))?;
        self.submit(
            CAST_VOTE,
            sender,
            codec::cast_vote_arguments(poll_id, option_index),
            TransactionsDisplayInfo::cast_vote(poll_id),
        )
        .await
    }

    /// Closes a poll ahead of its end time. Only its creator may do so.
    #[instrument(skip_all, fields(%poll_id))]
    pub async fn close_poll(
        &self,
        poll_id: PollId,
        sender: Option<Address>,
    ) -> Result<SessionId, PollClientError> {
        let sender = sender.ok_or(PreconditionError::MissingSender)?;
        self.submit(
            CLOSE_POLL,
            sender,
            codec::poll_id_arguments(poll_id),
            TransactionsDisplayInfo::close_poll(poll_id),
        )
        .await
    }

    /// Changes a poll. Only its creator may do so.
    ///
    /// Before the poll starts, everything is replaced and the votes are reset. While it is
    /// ongoing, the contract only applies the new end time.
    #[instrument(skip_all, fields(%poll_id))]
    pub async fn modify_poll(
        &self,
        poll_id: PollId,
        request: &ModifyPollRequest,
        sender: Option<Address>,
    ) -> Result<SessionId, PollClientError> {
        let sender = sender.ok_or(PreconditionError::MissingSender)?;
        check_poll_contents(&request.question, &request.options)?;
        self.submit(
            MODIFY_POLL,
            sender,
            codec::modify_poll_arguments(poll_id, request),
            TransactionsDisplayInfo::modify_poll(poll_id),
        )
        .await
    }

    async fn submit(
        &self,
        function: &'static str,
        sender: Address,
        arguments: Vec<ContractValue>,
        display_info: TransactionsDisplayInfo,
    ) -> Result<SessionId, PollClientError> {
        let endpoint = VotingAbi::endpoint(function)
            .ok_or_else(|| EncodeError::UnknownEndpoint(function.to_owned()))?;
        let call_data = codec::call_data(function, &endpoint.encode_arguments(&arguments)?);
        debug!(%sender, %call_data, "submitting contract call");
        let transaction = Transaction::contract_call(&self.config, sender, call_data);

        let result = self
            .signer
            .sign_and_send(vec![transaction], &display_info)
            .await;

        #[cfg(with_metrics)]
        metrics::TRANSACTION_COUNT
            .with_label_values(&[function, if result.is_ok() { "ok" } else { "error" }])
            .inc();

        match result {
            Ok(session_id) => {
                info!(%session_id, "{}", display_info.processing_message);
                Ok(session_id)
            }
            Err(error) => {
                error!(%error, "{}", display_info.error_message);
                Err(PollClientError::Submission {
                    message: display_info.error_message,
                    error: Box::new(error),
                })
            }
        }
    }
}

fn check_poll_contents(question: &str, options: &[String]) -> Result<(), PreconditionError> {
    ensure!(!question.is_empty(), PreconditionError::EmptyQuestion);
    ensure!(!options.is_empty(), PreconditionError::NoOptions);
    Ok(())
}
