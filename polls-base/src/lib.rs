// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Base types for talking to the voting contract: domain entities, the contract's typed
//! argument encoding, the endpoint schema and the poll lifecycle rules.

pub mod abi;
pub mod codec;
pub mod data_types;
pub mod identifiers;
pub mod lifecycle;
#[cfg(with_metrics)]
pub mod prometheus_util;
pub mod time;
pub mod tracing;

/// Returns early with the given error if the condition does not hold.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            return Err($e);
        }
    };
}
