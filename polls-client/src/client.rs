// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The interface of the voting contract offered to applications.

use std::sync::Arc;

use polls_base::{
    data_types::{
        CreatePollRequest, ModifyPollRequest, OptionResult, ParticipationStats, Poll, PollFilter,
        PollStatus,
    },
    identifiers::{Address, PollId},
    lifecycle,
    time::{Clock, WallClock},
};

use crate::{
    config::ContractConfig,
    error::PollClientError,
    gateway::LedgerGateway,
    query::ContractQueryService,
    signer::{SessionId, Signer},
    transaction::ContractTransactionService,
};

/// A client of the voting contract, acting on behalf of an optional sender.
///
/// The sender is fixed at construction. Use [`Self::for_sender`] to act for another account:
/// the new client shares the gateway and the signer.
pub struct PollContractClient<G, S, C = WallClock> {
    queries: ContractQueryService<G>,
    transactions: ContractTransactionService<S>,
    sender: Option<Address>,
    clock: C,
}

impl<G, S> PollContractClient<G, S, WallClock>
where
    G: LedgerGateway,
    S: Signer,
{
    /// Creates a client of the contract described by `config`.
    pub fn new(
        gateway: Arc<G>,
        signer: Arc<S>,
        config: ContractConfig,
        sender: Option<Address>,
    ) -> Self {
        PollContractClient {
            queries: ContractQueryService::new(gateway, config.contract_address, sender),
            transactions: ContractTransactionService::new(signer, config),
            sender,
            clock: WallClock,
        }
    }
}

impl<G, S, C> PollContractClient<G, S, C>
where
    G: LedgerGateway,
    S: Signer,
    C: Clock + Clone,
{
    /// Replaces the clock used to evaluate the lifecycle of polls.
    pub fn with_clock<D: Clock + Clone>(self, clock: D) -> PollContractClient<G, S, D> {
        PollContractClient {
            queries: self.queries,
            transactions: self.transactions,
            sender: self.sender,
            clock,
        }
    }

    /// Returns a client acting on behalf of `sender`, sharing this client's collaborators.
    pub fn for_sender(&self, sender: Option<Address>) -> Self {
        PollContractClient {
            queries: ContractQueryService::new(
                self.queries.gateway().clone(),
                self.transactions.config().contract_address,
                sender,
            ),
            transactions: self.transactions.clone(),
            sender,
            clock: self.clock.clone(),
        }
    }

    /// Returns the address the client acts for, if any.
    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub fn config(&self) -> &ContractConfig {
        self.transactions.config()
    }

    pub async fn create_poll(
        &self,
        request: &CreatePollRequest,
    ) -> Result<SessionId, PollClientError> {
        self.transactions.create_poll(request, self.sender).await
    }

    pub async fn cast_vote(
        &self,
        poll_id: PollId,
        option_index: usize,
    ) -> Result<SessionId, PollClientError> {
        self.transactions
            .cast_vote(poll_id, option_index, self.sender)
            .await
    }

    pub async fn close_poll(&self, poll_id: PollId) -> Result<SessionId, PollClientError> {
        self.transactions.close_poll(poll_id, self.sender).await
    }

    pub async fn modify_poll(
        &self,
        poll_id: PollId,
        request: &ModifyPollRequest,
    ) -> Result<SessionId, PollClientError> {
        self.transactions
            .modify_poll(poll_id, request, self.sender)
            .await
    }

    pub async fn get_poll(&self, poll_id: PollId) -> Result<Poll, PollClientError> {
        self.queries.get_poll(poll_id).await
    }

    /// Returns all the polls, or only those in the lifecycle state `status`. Errors yield no
    /// polls.
    pub async fn get_polls(&self, status: Option<PollStatus>) -> Vec<Poll> {
        self.queries.get_polls(&PollFilter::from(status)).await
    }

    pub async fn try_get_polls(&self, filter: &PollFilter) -> Result<Vec<Poll>, PollClientError> {
        self.queries.try_get_polls(filter).await
    }

    pub async fn get_polls_by_creator(
        &self,
        creator: Address,
        status: Option<PollStatus>,
    ) -> Result<Vec<Poll>, PollClientError> {
        self.queries.get_polls_by_creator(creator, status).await
    }

    pub async fn get_poll_results(
        &self,
        poll_id: PollId,
    ) -> Result<Vec<OptionResult>, PollClientError> {
        self.queries.get_poll_results(poll_id).await
    }

    pub async fn get_poll_participation_stats(
        &self,
        poll_id: PollId,
    ) -> Result<ParticipationStats, PollClientError> {
        self.queries.get_poll_participation_stats(poll_id).await
    }

    pub fn poll_not_started(&self, poll: &Poll) -> bool {
        lifecycle::poll_not_started(poll, self.clock.current_time())
    }

    pub fn poll_ongoing(&self, poll: &Poll) -> bool {
        lifecycle::poll_ongoing(poll, self.clock.current_time())
    }

    pub fn poll_ended(&self, poll: &Poll) -> bool {
        lifecycle::poll_ended(poll, self.clock.current_time())
    }

    /// Returns the lifecycle state of `poll`, reading the clock once.
    pub fn poll_status(&self, poll: &Poll) -> PollStatus {
        PollStatus::at(poll, self.clock.current_time())
    }
}
