// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Read-only calls of the voting contract.

use std::sync::Arc;

use polls_base::{
    abi::{
        EndpointAbi, VotingAbi, GET_POLL, GET_POLLS, GET_POLL_PARTICIPATION_STATS,
        GET_POLL_RESULTS,
    },
    codec::{self, ContractValue, EncodeError, FromContractValue},
    data_types::{OptionResult, ParticipationStats, Poll, PollFilter, PollStatus},
    identifiers::{Address, PollId},
};
use tracing::{debug, instrument, warn};

use crate::{
    error::PollClientError,
    gateway::{ContractQuery, LedgerGateway, QueryResponse, ReturnCode},
};

#[cfg(with_metrics)]
mod metrics {
    use std::sync::LazyLock;

    use polls_base::prometheus_util::{
        exponential_bucket_latencies, register_histogram_vec, register_int_counter_vec,
    };
    use prometheus::{HistogramVec, IntCounterVec};

    pub static QUERY_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
        register_int_counter_vec(
            "contract_queries",
            "Number of contract views queried",
            &["function", "outcome"],
        )
        .expect("Counter creation should not fail")
    });

    pub static QUERY_LATENCY: LazyLock<HistogramVec> = LazyLock::new(|| {
        register_histogram_vec(
            "contract_query_latency_ms",
            "Time to get the response of a contract view, in milliseconds",
            &["function"],
            exponential_bucket_latencies(30_000.0),
        )
        .expect("Histogram creation should not fail")
    });
}

/// Queries the views of the voting contract through a [`LedgerGateway`].
pub struct ContractQueryService<G> {
    gateway: Arc<G>,
    contract: Address,
    caller: Option<Address>,
}

impl<G> Clone for ContractQueryService<G> {
    fn clone(&self) -> Self {
        ContractQueryService {
            gateway: self.gateway.clone(),
            contract: self.contract,
            caller: self.caller,
        }
    }
}

impl<G: LedgerGateway> ContractQueryService<G> {
    /// Creates a service querying the contract at `contract`.
    ///
    /// Queries are made on behalf of `caller`, if any. The views of the voting contract do
    /// not depend on it.
    pub fn new(gateway: Arc<G>, contract: Address, caller: Option<Address>) -> Self {
        ContractQueryService {
            gateway,
            contract,
            caller,
        }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Returns the poll with the given identifier.
    #[instrument(skip_all, fields(%poll_id))]
    pub async fn get_poll(&self, poll_id: PollId) -> Result<Poll, PollClientError> {
        let (endpoint, response) = self
            .query(GET_POLL, codec::poll_id_arguments(poll_id))
            .await?;
        match response.return_code {
            ReturnCode::Ok if response.is_empty() => Err(PollClientError::NotFound(poll_id)),
            ReturnCode::Ok => Ok(codec::decode_response(&endpoint, &response.return_data)?),
            // Reading a missing poll fails inside the contract.
            ReturnCode::UserError => Err(PollClientError::NotFound(poll_id)),
            code => Err(rejected(GET_POLL, code, response.return_message)),
        }
    }

    /// Returns the polls matching `filter`, in the contract's order.
    ///
    /// Errors are logged and yield no polls. See [`Self::try_get_polls`] to handle them.
    pub async fn get_polls(&self, filter: &PollFilter) -> Vec<Poll> {
        match self.try_get_polls(filter).await {
            Ok(polls) => polls,
            Err(error) => {
                warn!(%error, "unable to get the polls");
                Vec::new()
            }
        }
    }

    /// Returns the polls matching `filter`, in the contract's order.
    #[instrument(skip_all, fields(status = ?filter.status, creator = ?filter.creator))]
    pub async fn try_get_polls(&self, filter: &PollFilter) -> Result<Vec<Poll>, PollClientError> {
        self.query_value(GET_POLLS, codec::get_polls_arguments(filter))
            .await
    }

    /// Returns the polls created by `creator`, optionally in a given lifecycle state.
    pub async fn get_polls_by_creator(
        &self,
        creator: Address,
        status: Option<PollStatus>,
    ) -> Result<Vec<Poll>, PollClientError> {
        let filter = PollFilter {
            status,
            creator: Some(creator),
        };
        self.try_get_polls(&filter).await
    }

    /// Returns the tally of each option of a poll, in ballot order.
    #[instrument(skip_all, fields(%poll_id))]
    pub async fn get_poll_results(
        &self,
        poll_id: PollId,
    ) -> Result<Vec<OptionResult>, PollClientError> {
        self.query_poll_value(GET_POLL_RESULTS, poll_id).await
    }

    /// Returns how many accounts voted in a poll.
    #[instrument(skip_all, fields(%poll_id))]
    pub async fn get_poll_participation_stats(
        &self,
        poll_id: PollId,
    ) -> Result<ParticipationStats, PollClientError> {
        self.query_poll_value(GET_POLL_PARTICIPATION_STATS, poll_id)
            .await
    }

    /// Queries a view taking a poll identifier, mapping a failure inside the contract to
    /// [`PollClientError::NotFound`].
    async fn query_poll_value<T: FromContractValue>(
        &self,
        function: &'static str,
        poll_id: PollId,
    ) -> Result<T, PollClientError> {
        match self
            .query_value(function, codec::poll_id_arguments(poll_id))
            .await
        {
            Err(PollClientError::ContractRejected {
                code: ReturnCode::UserError,
                ..
            }) => Err(PollClientError::NotFound(poll_id)),
            result => result,
        }
    }

    async fn query_value<T: FromContractValue>(
        &self,
        function: &'static str,
        arguments: Vec<ContractValue>,
    ) -> Result<T, PollClientError> {
        let (endpoint, response) = self.query(function, arguments).await?;
        if response.return_code != ReturnCode::Ok {
            return Err(rejected(
                function,
                response.return_code,
                response.return_message,
            ));
        }
        Ok(codec::decode_response(&endpoint, &response.return_data)?)
    }

    /// Encodes the arguments of `function` and runs the query, without looking at the
    /// response.
    async fn query(
        &self,
        function: &'static str,
        arguments: Vec<ContractValue>,
    ) -> Result<(EndpointAbi, QueryResponse), PollClientError> {
        let endpoint = VotingAbi::endpoint(function)
            .ok_or_else(|| EncodeError::UnknownEndpoint(function.to_owned()))?;
        let query = ContractQuery {
            sc_address: self.contract,
            func_name: function.to_owned(),
            caller: self.caller,
            args: endpoint.encode_arguments(&arguments)?,
        };
        debug!(
            call_data = %codec::call_data(function, &query.args),
            "querying contract"
        );

        #[cfg(with_metrics)]
        let start = std::time::Instant::now();

        let result = self.gateway.query_contract(&query).await;

        #[cfg(with_metrics)]
        {
            metrics::QUERY_LATENCY
                .with_label_values(&[function])
                .observe(start.elapsed().as_secs_f64() * 1000.0);
            let outcome = match &result {
                Ok(response) => response.return_code.as_str(),
                Err(_) => "gateway error",
            };
            metrics::QUERY_COUNT
                .with_label_values(&[function, outcome])
                .inc();
        }

        let response = result.map_err(|error| PollClientError::Gateway {
            function,
            error: Box::new(error),
        })?;
        debug!(
            return_code = %response.return_code,
            items = response.return_data.len(),
            "contract responded"
        );
        Ok((endpoint, response))
    }
}

fn rejected(function: &'static str, code: ReturnCode, message: String) -> PollClientError {
    PollClientError::ContractRejected {
        function,
        code,
        message,
    }
}
