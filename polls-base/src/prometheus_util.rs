// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Helpers to register Prometheus metrics under the `polls` namespace.

use prometheus::{
    histogram_opts, register_histogram_vec, register_int_counter_vec, Error, HistogramVec,
    IntCounterVec, Opts,
};

const POLLS_NAMESPACE: &str = "polls";

/// Wrapper around the `register_int_counter_vec!` macro which also sets the namespace.
pub fn register_int_counter_vec(
    name: &str,
    description: &str,
    label_names: &[&str],
) -> Result<IntCounterVec, Error> {
    let counter_opts = Opts::new(name, description).namespace(POLLS_NAMESPACE);
    register_int_counter_vec!(counter_opts, label_names)
}

/// Wrapper around the `register_histogram_vec!` macro which also sets the namespace.
pub fn register_histogram_vec(
    name: &str,
    description: &str,
    label_names: &[&str],
    buckets: Option<Vec<f64>>,
) -> Result<HistogramVec, Error> {
    let histogram_opts = if let Some(buckets) = buckets {
        histogram_opts!(name, description, buckets).namespace(POLLS_NAMESPACE)
    } else {
        histogram_opts!(name, description).namespace(POLLS_NAMESPACE)
    };

    register_histogram_vec!(histogram_opts, label_names)
}

/// Returns latency buckets in milliseconds growing by a factor of two from 1 ms up to
/// `max_latency`.
pub fn exponential_bucket_latencies(max_latency: f64) -> Option<Vec<f64>> {
    let count = max_latency.max(1.0).log2().ceil() as usize + 1;
    prometheus::exponential_buckets(1.0, 2.0, count).ok()
}
