// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Where the voting contract lives and how to call it.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write as _},
    path::Path,
};

use polls_base::identifiers::Address;
use serde::{Deserialize, Serialize};

/// The gas limit of every contract call.
pub const DEFAULT_GAS_LIMIT: u64 = 10_000_000;

/// The minimum gas price accepted by the ledger.
pub const DEFAULT_GAS_PRICE: u64 = 1_000_000_000;

/// The version of the transaction format.
pub const TRANSACTION_VERSION: u32 = 1;

/// The voting contract deployed on devnet:
/// `erd1qqqqqqqqqqqqqpgqff0m7nfa4pnyew56qp4weaf5tmv7pd54hapss83dxl`.
pub const DEVNET_CONTRACT_ADDRESS: Address = Address::new([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x00, 0x4a, 0x5f, 0xbf, 0x4d, 0x3d, 0xa8,
    0x66, 0x4c, 0xba, 0x9a, 0x00, 0x6a, 0xec, 0xf5, 0x34, 0x5e, 0xd9, 0xe0, 0xb6, 0x95, 0xbf, 0x43,
]);

/// The configuration of a [`PollContractClient`](crate::PollContractClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// The address of the voting contract.
    pub contract_address: Address,
    /// The identifier of the chain, included in every transaction.
    pub chain_id: String,
    /// The URL of the API serving queries, for gateways that need one.
    pub api_url: String,
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    #[serde(default = "default_gas_price")]
    pub gas_price: u64,
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

fn default_gas_price() -> u64 {
    DEFAULT_GAS_PRICE
}

impl ContractConfig {
    /// Creates a configuration with the default gas settings.
    pub fn new(
        contract_address: Address,
        chain_id: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Self {
        ContractConfig {
            contract_address,
            chain_id: chain_id.into(),
            api_url: api_url.into(),
            gas_limit: DEFAULT_GAS_LIMIT,
            gas_price: DEFAULT_GAS_PRICE,
        }
    }

    /// The contract deployed on devnet.
    pub fn devnet() -> Self {
        Self::new(
            DEVNET_CONTRACT_ADDRESS,
            "D",
            "https://devnet-template-api.multiversx.com",
        )
    }

    pub fn read_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devnet_contract_address() {
        assert_eq!(
            ContractConfig::devnet().contract_address.to_string(),
            "erd1qqqqqqqqqqqqqpgqff0m7nfa4pnyew56qp4weaf5tmv7pd54hapss83dxl"
        );
    }

    #[test]
    fn config_file_round_trip() -> anyhow::Result<()> {
        let directory = tempfile::tempdir()?;
        let path = directory.path().join("contract.json");
        let mut config = ContractConfig::devnet();
        config.gas_limit = 20_000_000;
        config.write_to_file(&path)?;
        assert_eq!(ContractConfig::read_from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn gas_settings_have_defaults() -> anyhow::Result<()> {
        let json = format!(
            r#"{{"contract_address": "{}", "chain_id": "T", "api_url": "http://localhost"}}"#,
            DEVNET_CONTRACT_ADDRESS
        );
        let config: ContractConfig = serde_json::from_str(&json)?;
        assert_eq!(config.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(config.gas_price, DEFAULT_GAS_PRICE);
        Ok(())
    }
}
