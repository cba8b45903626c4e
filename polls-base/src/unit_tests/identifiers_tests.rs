// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use assert_matches::assert_matches;
use bech32::{ToBase32, Variant};
use test_strategy::proptest;

use super::*;

const CONTRACT: &str = "erd1qqqqqqqqqqqqqpgqff0m7nfa4pnyew56qp4weaf5tmv7pd54hapss83dxl";

#[test]
fn parses_contract_address() {
    let address = CONTRACT.parse::<Address>().unwrap();
    assert_eq!(
        hex::encode(address.as_bytes()),
        "000000000000000005004a5fbf4d3da8664cba9a006aecf5345ed9e0b695bf43"
    );
    assert_eq!(address.to_string(), CONTRACT);
}

#[test]
fn rejects_other_prefixes() {
    let bytes = [7u8; ADDRESS_LENGTH];
    let foreign = bech32::encode("xyz", bytes.to_base32(), Variant::Bech32).unwrap();
    assert_matches!(
        foreign.parse::<Address>(),
        Err(AddressParseError::WrongPrefix(prefix)) if prefix == "xyz"
    );

    let bech32m = bech32::encode(ADDRESS_HRP, bytes.to_base32(), Variant::Bech32m).unwrap();
    assert_matches!(
        bech32m.parse::<Address>(),
        Err(AddressParseError::WrongVariant)
    );
}

#[test]
fn rejects_wrong_lengths_and_checksums() {
    let short = bech32::encode(ADDRESS_HRP, [1u8; 20].to_base32(), Variant::Bech32).unwrap();
    assert_matches!(
        short.parse::<Address>(),
        Err(AddressParseError::WrongLength(20))
    );

    let mut corrupted = CONTRACT.to_owned();
    corrupted.pop();
    corrupted.push('q');
    assert_matches!(
        corrupted.parse::<Address>(),
        Err(AddressParseError::Bech32(_))
    );
}

#[proptest]
fn bech32_round_trip(address: Address) {
    assert_eq!(address.to_string().parse::<Address>().unwrap(), address);
}

#[test]
fn serde_uses_bech32_in_json() {
    let address = Address::test_address(3);
    let json = serde_json::to_string(&address).unwrap();
    assert_eq!(json, format!("\"{}\"", address.to_bech32()));
    assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    assert!(serde_json::from_str::<Address>("\"not an address\"").is_err());
}

#[test]
fn poll_ids_are_plain_numbers() {
    assert_eq!(serde_json::to_string(&PollId(12)).unwrap(), "12");
    assert_eq!(PollId::from(12).to_string(), "12");
}
