// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identifiers of accounts and polls.

use std::{fmt, str::FromStr};

use bech32::{FromBase32, ToBase32, Variant};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// The human-readable part of every textual account address.
pub const ADDRESS_HRP: &str = "erd";

/// The length in bytes of an account or contract address.
pub const ADDRESS_LENGTH: usize = 32;

/// An account or contract address on the ledger.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
#[cfg_attr(with_testing, derive(test_strategy::Arbitrary))]
pub struct Address([u8; ADDRESS_LENGTH]);

/// Errors that can occur when parsing an [`Address`].
#[derive(Debug, Error)]
pub enum AddressParseError {
    #[error("invalid bech32 string: {0}")]
    Bech32(#[from] bech32::Error),

    #[error("expected the `erd` prefix, found `{0}`")]
    WrongPrefix(String),

    #[error("expected a bech32 string, found a bech32m string")]
    WrongVariant,

    #[error("expected 32 bytes, found {0}")]
    WrongLength(usize),
}

impl Address {
    /// Creates an address from its raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Address(bytes)
    }

    /// Returns the raw bytes of the address.
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Builds an address from a slice, which must be exactly [`ADDRESS_LENGTH`] bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Result<Self, AddressParseError> {
        let bytes = <[u8; ADDRESS_LENGTH]>::try_from(bytes)
            .map_err(|_| AddressParseError::WrongLength(bytes.len()))?;
        Ok(Address(bytes))
    }

    /// Returns the bech32 representation of the address.
    pub fn to_bech32(&self) -> String {
        bech32::encode(ADDRESS_HRP, self.0.to_base32(), Variant::Bech32)
            .expect("the address prefix is a valid bech32 human-readable part")
    }

    /// Returns a deterministic address for tests.
    #[cfg(with_testing)]
    pub fn test_address(index: u8) -> Self {
        let mut bytes = [0; ADDRESS_LENGTH];
        bytes[0] = 0x5a;
        bytes[ADDRESS_LENGTH - 1] = index;
        Address(bytes)
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hrp, data, variant) = bech32::decode(s)?;
        if hrp != ADDRESS_HRP {
            return Err(AddressParseError::WrongPrefix(hrp));
        }
        if variant != Variant::Bech32 {
            return Err(AddressParseError::WrongVariant);
        }
        let bytes = Vec::<u8>::from_base32(&data)?;
        Address::try_from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bech32())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_bech32())
        } else {
            serializer.serialize_newtype_struct("Address", &self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_str(&s).map_err(serde::de::Error::custom)
        } else {
            #[derive(Deserialize)]
            #[serde(rename = "Address")]
            struct AddressBytes([u8; ADDRESS_LENGTH]);

            let AddressBytes(bytes) = AddressBytes::deserialize(deserializer)?;
            Ok(Address(bytes))
        }
    }
}

/// The identifier of a poll, assigned by the contract at creation time.
#[derive(
    Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash, Default, Debug, Serialize, Deserialize,
)]
#[cfg_attr(with_testing, derive(test_strategy::Arbitrary))]
#[serde(transparent)]
pub struct PollId(pub u64);

impl From<u64> for PollId {
    fn from(id: u64) -> Self {
        PollId(id)
    }
}

impl fmt::Display for PollId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[path = "unit_tests/identifiers_tests.rs"]
mod identifiers_tests;
