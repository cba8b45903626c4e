// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-ins for the ledger and the wallet, for tests.
//!
//! [`FakeVotingContract`] decodes the calls it receives with the contract's schema and applies
//! the contract's rules, using a [`TestClock`] as the block time. Like a real ledger, it accepts
//! every well-addressed transaction and records the ones the contract rejected: their effects
//! are only visible by querying the contract again.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

use async_trait::async_trait;
use polls_base::{
    abi::{
        EndpointAbi, Mutability, VotingAbi, CAST_VOTE, CLOSE_POLL, CREATE_POLL, GET_POLL,
        GET_POLLS, GET_POLL_PARTICIPATION_STATS, GET_POLL_RESULTS, MODIFY_POLL,
    },
    codec::{self, ContractValue, FromContractValue},
    data_types::{
        ModifyPollRequest, OptionResult, ParticipationStats, Poll, PollOption, PollStatus,
        Timestamp,
    },
    identifiers::{Address, PollId},
    time::{Clock, TestClock},
};
use thiserror::Error;

use crate::{
    gateway::{ContractQuery, LedgerGateway, QueryResponse, ReturnCode, TransactionHash},
    signer::{SessionId, Signer, TransactionsDisplayInfo},
    transaction::Transaction,
};

/// Errors of the fake ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FakeLedgerError {
    #[error("the ledger is unreachable")]
    Unreachable,
}

/// A failed contract call.
struct Failure {
    code: ReturnCode,
    message: String,
}

impl Failure {
    fn user(message: impl Into<String>) -> Self {
        Failure {
            code: ReturnCode::UserError,
            message: message.into(),
        }
    }
}

fn require(condition: bool, message: &str) -> Result<(), Failure> {
    if condition {
        Ok(())
    } else {
        Err(Failure::user(message))
    }
}

/// The storage of the contract.
#[derive(Default)]
struct ContractState {
    polls: BTreeMap<u64, Poll>,
    next_poll_id: u64,
    /// The current choice of each voter, for polls where votes may change.
    votes: BTreeMap<u64, BTreeMap<Address, usize>>,
    /// The voters of polls where votes may not change.
    voters: BTreeMap<u64, BTreeSet<Address>>,
}

impl ContractState {
    fn poll(&self, poll_id: PollId) -> Result<&Poll, Failure> {
        self.polls
            .get(&poll_id.0)
            .ok_or_else(|| Failure::user(format!("poll {poll_id} does not exist")))
    }

    fn poll_mut(&mut self, poll_id: PollId) -> Result<&mut Poll, Failure> {
        self.polls
            .get_mut(&poll_id.0)
            .ok_or_else(|| Failure::user(format!("poll {poll_id} does not exist")))
    }

    fn create_poll(&mut self, mut poll: Poll, now: Timestamp) -> Result<(), Failure> {
        require(poll.options.len() > 1, "there must be at least two options")?;
        require(
            poll.end_time > poll.start_time,
            "the end time must be after the start time",
        )?;
        require(poll.end_time > now, "the end time must be in the future")?;
        poll.id = PollId(self.next_poll_id);
        self.polls.insert(poll.id.0, poll);
        self.next_poll_id += 1;
        Ok(())
    }

    fn modify_poll(
        &mut self,
        caller: Address,
        now: Timestamp,
        poll_id: PollId,
        request: ModifyPollRequest,
    ) -> Result<(), Failure> {
        let poll = self.poll_mut(poll_id)?;
        require(poll.creator == caller, "only the creator can modify this poll")?;
        require(!poll.is_closed, "a closed poll cannot be modified")?;
        if now >= poll.start_time {
            require(now <= poll.end_time, "a poll that has ended cannot be modified")?;
            require(
                request.end_time > now,
                "the new end time must be in the future",
            )?;
            poll.end_time = request.end_time;
        } else {
            require(request.options.len() > 1, "there must be at least two options")?;
            require(
                request.end_time > request.start_time,
                "the end time must be after the start time",
            )?;
            require(request.end_time > now, "the end time must be in the future")?;
            poll.question = request.question;
            poll.options = new_options(request.options);
            poll.start_time = request.start_time;
            poll.end_time = request.end_time;
        }
        Ok(())
    }

    fn close_poll(&mut self, caller: Address, poll_id: PollId) -> Result<(), Failure> {
        let poll = self.poll_mut(poll_id)?;
        require(poll.creator == caller, "only the creator can close this poll")?;
        poll.is_closed = true;
        Ok(())
    }

    fn cast_vote(
        &mut self,
        caller: Address,
        now: Timestamp,
        poll_id: PollId,
        option_index: usize,
    ) -> Result<(), Failure> {
        let poll = self
            .polls
            .get_mut(&poll_id.0)
            .ok_or_else(|| Failure::user(format!("poll {poll_id} does not exist")))?;
        require(!poll.is_closed, "this poll is closed")?;
        require(
            PollStatus::at(poll, now) == PollStatus::Ongoing,
            "this poll is not active",
        )?;
        require(option_index < poll.options.len(), "invalid option index")?;
        require(poll.admits(&caller), "you are not in the voter whitelist")?;

        if poll.can_change_vote {
            let votes = self.votes.entry(poll_id.0).or_default();
            if let Some(previous) = votes.insert(caller, option_index) {
                let option = &mut poll.options[previous];
                require(option.vote_count > 0, "vote count mismatch")?;
                option.vote_count -= 1;
            }
        } else {
            let voters = self.voters.entry(poll_id.0).or_default();
            require(
                voters.insert(caller),
                "you already voted and votes cannot be changed",
            )?;
        }
        poll.options[option_index].vote_count += 1;
        Ok(())
    }

    fn results(&self, poll_id: PollId) -> Result<Vec<OptionResult>, Failure> {
        let poll = self.poll(poll_id)?;
        let total = poll.total_votes();
        Ok(poll
            .options
            .iter()
            .map(|option| OptionResult {
                name: option.name.clone(),
                vote_count: option.vote_count,
                percentage: if total > 0 {
                    option.vote_count * 100 / total
                } else {
                    0
                },
            })
            .collect())
    }

    fn participation(&self, poll_id: PollId) -> Result<ParticipationStats, Failure> {
        let poll = self.poll(poll_id)?;
        let participants = if poll.can_change_vote {
            self.votes.get(&poll_id.0).map_or(0, BTreeMap::len)
        } else {
            self.voters.get(&poll_id.0).map_or(0, BTreeSet::len)
        };
        let participant_count = participants as u64;
        let participation_percentage = poll
            .whitelisted_addresses
            .as_ref()
            .filter(|whitelist| !whitelist.is_empty())
            .map(|whitelist| participant_count * 100 / whitelist.len() as u64);
        Ok(ParticipationStats {
            participant_count,
            participation_percentage,
        })
    }
}

fn new_options(names: Vec<String>) -> Vec<PollOption> {
    names
        .into_iter()
        .map(|name| PollOption {
            name,
            vote_count: 0,
        })
        .collect()
}

/// The decoded arguments of a call, in order. Omitted optional arguments are `None`.
struct Arguments(std::vec::IntoIter<Option<ContractValue>>);

impl Arguments {
    fn decode(endpoint: &EndpointAbi, raw: &[Vec<u8>]) -> Result<Self, Failure> {
        require(
            raw.len() <= endpoint.inputs.len(),
            "wrong number of arguments",
        )?;
        let mut values = Vec::with_capacity(endpoint.inputs.len());
        for (index, input) in endpoint.inputs.iter().enumerate() {
            match raw.get(index) {
                Some(bytes) => {
                    let value = ContractValue::decode_top(bytes, &input.ty)
                        .map_err(|error| Failure::user(error.to_string()))?;
                    values.push(Some(value));
                }
                None if input.optional => values.push(None),
                None => return Err(Failure::user("wrong number of arguments")),
            }
        }
        Ok(Arguments(values.into_iter()))
    }

    fn next_optional<T: FromContractValue>(&mut self) -> Result<Option<T>, Failure> {
        self.0
            .next()
            .flatten()
            .map(|value| {
                T::from_contract_value(value).map_err(|kind| Failure::user(kind.to_string()))
            })
            .transpose()
    }

    fn next<T: FromContractValue>(&mut self) -> Result<T, Failure> {
        self.next_optional()?
            .ok_or_else(|| Failure::user("wrong number of arguments"))
    }
}

fn top_encode(value: &ContractValue) -> Result<Vec<u8>, Failure> {
    value.top_encode().map_err(|error| Failure {
        code: ReturnCode::ExecutionFailed,
        message: error.to_string(),
    })
}

/// An in-memory voting contract, reached as if through a ledger gateway.
pub struct FakeVotingContract {
    address: Address,
    clock: TestClock,
    state: Mutex<ContractState>,
    reachable: AtomicBool,
    query_count: AtomicUsize,
    transaction_count: AtomicUsize,
    rejections: Mutex<Vec<String>>,
}

impl FakeVotingContract {
    /// Creates an empty contract at `address`. Its block time is read from `clock`.
    pub fn new(address: Address, clock: TestClock) -> Self {
        FakeVotingContract {
            address,
            clock,
            state: Mutex::default(),
            reachable: AtomicBool::new(true),
            query_count: AtomicUsize::new(0),
            transaction_count: AtomicUsize::new(0),
            rejections: Mutex::default(),
        }
    }

    /// Makes every later call fail with [`FakeLedgerError::Unreachable`], or not.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Returns the number of queries received so far.
    pub fn query_count(&self) -> usize {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Returns the number of transactions received so far, including rejected ones.
    pub fn transaction_count(&self) -> usize {
        self.transaction_count.load(Ordering::SeqCst)
    }

    /// Returns the reasons of the transactions that the contract rejected so far, in order.
    pub fn rejections(&self) -> Vec<String> {
        self.rejections
            .lock()
            .expect("poisoned FakeVotingContract mutex")
            .clone()
    }

    /// Returns the stored state of a poll.
    pub fn poll(&self, poll_id: PollId) -> Option<Poll> {
        self.lock().polls.get(&poll_id.0).cloned()
    }

    fn lock(&self) -> MutexGuard<ContractState> {
        self.state.lock().expect("poisoned FakeVotingContract mutex")
    }

    fn endpoint(function: &str, mutability: Mutability) -> Result<EndpointAbi, Failure> {
        VotingAbi::endpoint(function)
            .filter(|endpoint| endpoint.mutability == mutability)
            .ok_or_else(|| Failure {
                code: ReturnCode::FunctionNotFound,
                message: format!("invalid function (not found): {function}"),
            })
    }

    fn run_view(&self, query: &ContractQuery) -> Result<Vec<Vec<u8>>, Failure> {
        if query.sc_address != self.address {
            return Err(Failure {
                code: ReturnCode::ContractNotFound,
                message: format!("no contract at {}", query.sc_address),
            });
        }
        let endpoint = Self::endpoint(&query.func_name, Mutability::Readonly)?;
        let mut arguments = Arguments::decode(&endpoint, &query.args)?;
        let now = self.clock.current_time();
        let state = self.lock();
        match endpoint.name {
            GET_POLLS => {
                let status: Option<PollStatus> = arguments.next()?;
                let creator: Option<Address> = arguments.next()?;
                let polls = state
                    .polls
                    .values()
                    .filter(|poll| {
                        status.map_or(true, |status| PollStatus::at(poll, now) == status)
                    })
                    .filter(|poll| creator.map_or(true, |creator| poll.creator == creator))
                    .map(ContractValue::from)
                    .collect();
                Ok(vec![top_encode(&ContractValue::List(polls))?])
            }
            GET_POLL => {
                let poll = state.poll(arguments.next()?)?;
                Ok(vec![top_encode(&ContractValue::from(poll))?])
            }
            GET_POLL_RESULTS => {
                let mut items = Vec::new();
                for result in state.results(arguments.next()?)? {
                    items.push(result.name.into_bytes());
                    items.push(top_encode(&ContractValue::U64(result.vote_count))?);
                    items.push(top_encode(&ContractValue::U64(result.percentage))?);
                }
                Ok(items)
            }
            GET_POLL_PARTICIPATION_STATS => {
                let stats = state.participation(arguments.next()?)?;
                Ok(vec![top_encode(&ContractValue::from(&stats))?])
            }
            function => Err(Failure::user(format!("unhandled view {function}"))),
        }
    }

    fn execute(&self, transaction: &Transaction) -> Result<(), Failure> {
        require(
            transaction.receiver == self.address,
            "the transaction does not target the contract",
        )?;
        require(transaction.value == 0, "the contract does not accept payments")?;
        let data = transaction
            .call_data()
            .ok_or_else(|| Failure::user("the call data is not valid UTF-8"))?;
        let (function, raw_arguments) =
            codec::parse_call_data(data).map_err(|error| Failure::user(error.to_string()))?;
        let endpoint = Self::endpoint(&function, Mutability::Mutable)?;
        let mut arguments = Arguments::decode(&endpoint, &raw_arguments)?;
        let caller = transaction.sender;
        let now = self.clock.current_time();
        let mut state = self.lock();
        match endpoint.name {
            CREATE_POLL => {
                let poll = Poll {
                    id: PollId(0),
                    question: arguments.next()?,
                    options: new_options(arguments.next()?),
                    start_time: arguments.next()?,
                    end_time: arguments.next()?,
                    creator: caller,
                    is_closed: false,
                    can_change_vote: arguments.next()?,
                    whitelisted_addresses: arguments.next_optional()?,
                };
                state.create_poll(poll, now)
            }
            MODIFY_POLL => {
                let poll_id = arguments.next()?;
                let request = ModifyPollRequest {
                    question: arguments.next()?,
                    options: arguments.next()?,
                    start_time: arguments.next()?,
                    end_time: arguments.next()?,
                };
                state.modify_poll(caller, now, poll_id, request)
            }
            CLOSE_POLL => state.close_poll(caller, arguments.next()?),
            CAST_VOTE => {
                let poll_id = arguments.next()?;
                let option_index = usize::try_from(arguments.next::<u64>()?)
                    .map_err(|_| Failure::user("invalid option index"))?;
                state.cast_vote(caller, now, poll_id, option_index)
            }
            function => Err(Failure::user(format!("unhandled endpoint {function}"))),
        }
    }
}

#[async_trait]
impl LedgerGateway for FakeVotingContract {
    type Error = FakeLedgerError;

    async fn query_contract(&self, query: &ContractQuery) -> Result<QueryResponse, Self::Error> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(FakeLedgerError::Unreachable);
        }
        Ok(match self.run_view(query) {
            Ok(return_data) => QueryResponse::ok(return_data),
            Err(failure) => QueryResponse::failed(failure.code, failure.message),
        })
    }

    async fn submit_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<TransactionHash, Self::Error> {
        let count = self.transaction_count.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(FakeLedgerError::Unreachable);
        }
        if let Err(failure) = self.execute(transaction) {
            self.rejections
                .lock()
                .expect("poisoned FakeVotingContract mutex")
                .push(failure.message);
        }
        Ok(TransactionHash(format!("{count:064x}")))
    }
}

/// Errors of the [`TestSigner`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TestSignerError {
    #[error("account {0} has no active session")]
    NoActiveSession(Address),

    #[error("broadcast failed: {0}")]
    Broadcast(String),
}

/// A wallet that forwards transactions to a gateway for the accounts logged into it.
pub struct TestSigner<G> {
    gateway: Arc<G>,
    accounts: Mutex<BTreeSet<Address>>,
    session_count: AtomicUsize,
    display_infos: Mutex<Vec<TransactionsDisplayInfo>>,
    transactions: Mutex<Vec<Transaction>>,
}

impl<G> TestSigner<G> {
    /// Creates a signer without any account.
    pub fn new(gateway: Arc<G>) -> Self {
        TestSigner {
            gateway,
            accounts: Mutex::default(),
            session_count: AtomicUsize::new(0),
            display_infos: Mutex::default(),
            transactions: Mutex::default(),
        }
    }

    /// Opens a session for `account`.
    pub fn log_in(&self, account: Address) {
        self.accounts
            .lock()
            .expect("poisoned TestSigner mutex")
            .insert(account);
    }

    /// Closes the session of `account`.
    pub fn log_out(&self, account: Address) {
        self.accounts
            .lock()
            .expect("poisoned TestSigner mutex")
            .remove(&account);
    }

    /// Returns the messages of every signing request so far.
    pub fn display_infos(&self) -> Vec<TransactionsDisplayInfo> {
        self.display_infos
            .lock()
            .expect("poisoned TestSigner mutex")
            .clone()
    }

    /// Returns every transaction signed so far.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions
            .lock()
            .expect("poisoned TestSigner mutex")
            .clone()
    }
}

#[async_trait]
impl<G: LedgerGateway> Signer for TestSigner<G> {
    type Error = TestSignerError;

    async fn sign_and_send(
        &self,
        transactions: Vec<Transaction>,
        display_info: &TransactionsDisplayInfo,
    ) -> Result<SessionId, Self::Error> {
        {
            let accounts = self.accounts.lock().expect("poisoned TestSigner mutex");
            if let Some(transaction) = transactions
                .iter()
                .find(|transaction| !accounts.contains(&transaction.sender))
            {
                return Err(TestSignerError::NoActiveSession(transaction.sender));
            }
        }
        self.display_infos
            .lock()
            .expect("poisoned TestSigner mutex")
            .push(display_info.clone());
        let session = self.session_count.fetch_add(1, Ordering::SeqCst) + 1;
        for transaction in transactions {
            self.transactions
                .lock()
                .expect("poisoned TestSigner mutex")
                .push(transaction.clone());
            self.gateway
                .submit_transaction(&transaction)
                .await
                .map_err(|error| TestSignerError::Broadcast(error.to_string()))?;
        }
        Ok(SessionId(format!("session-{session}")))
    }
}
