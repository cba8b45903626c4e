// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use polls_base::identifiers::Address;
use serde_json::json;
use test_case::test_case;

use super::*;
use crate::{config::ContractConfig, transaction::Transaction};

#[test]
fn queries_use_the_proxy_field_names() -> anyhow::Result<()> {
    let contract = ContractConfig::devnet().contract_address;
    let query = ContractQuery {
        sc_address: contract,
        func_name: "getPolls".to_owned(),
        caller: None,
        args: vec![vec![1, 1], Vec::new()],
    };
    assert_eq!(
        serde_json::to_value(&query)?,
        json!({
            "scAddress": contract.to_string(),
            "funcName": "getPolls",
            "args": ["0101", ""],
        })
    );

    let caller = Address::test_address(1);
    let query = ContractQuery {
        caller: Some(caller),
        ..query
    };
    assert_eq!(serde_json::to_value(&query)?["caller"], json!(caller.to_string()));
    Ok(())
}

#[test]
fn responses_carry_base64_items() -> anyhow::Result<()> {
    let response: QueryResponse = serde_json::from_value(json!({
        "returnData": ["AQI=", ""],
        "returnCode": "ok",
        "returnMessage": "",
        "gasRemaining": 0,
    }))?;
    assert_eq!(response.return_data, vec![vec![1, 2], Vec::new()]);
    assert_eq!(response.return_code, ReturnCode::Ok);
    assert!(!response.is_empty());

    let response: QueryResponse = serde_json::from_value(json!({"returnCode": "ok"}))?;
    assert!(response.is_empty());
    Ok(())
}

#[test_case("ok" => ReturnCode::Ok)]
#[test_case("user error" => ReturnCode::UserError)]
#[test_case("function not found" => ReturnCode::FunctionNotFound)]
#[test_case("something new" => ReturnCode::Unknown)]
fn return_codes(code: &str) -> ReturnCode {
    let response: QueryResponse = serde_json::from_value(json!({
        "returnCode": code,
        "returnMessage": "",
    }))
    .unwrap();
    response.return_code
}

#[test]
fn transactions_use_the_proxy_field_names() -> anyhow::Result<()> {
    let config = ContractConfig::devnet();
    let sender = Address::test_address(7);
    let transaction = Transaction::contract_call(&config, sender, "closePoll@05".to_owned());
    let value = serde_json::to_value(&transaction)?;
    assert_eq!(
        value,
        json!({
            "value": "0",
            "receiver": config.contract_address.to_string(),
            "sender": sender.to_string(),
            "gasPrice": 1_000_000_000u64,
            "gasLimit": 10_000_000u64,
            "data": "Y2xvc2VQb2xsQDA1",
            "chainID": "D",
            "version": 1,
        })
    );
    assert_eq!(serde_json::from_value::<Transaction>(value)?, transaction);
    assert_eq!(transaction.call_data(), Some("closePoll@05"));
    Ok(())
}
