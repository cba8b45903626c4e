// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The typed values exchanged with the contract and their binary encoding.
//!
//! Arguments and results use the *top-level* encoding, where a value fills a whole item and
//! needs no length prefix. Values inside lists, options and structs use the *nested* encoding,
//! which is self-delimiting.

mod decode;
mod domain;

use thiserror::Error;

pub use self::{decode::NestedReader, domain::*};
use crate::identifiers::Address;

/// A value of the contract's type system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractValue {
    Bytes(Vec<u8>),
    U8(u8),
    U32(u32),
    U64(u64),
    Bool(bool),
    Address(Address),
    List(Vec<ContractValue>),
    Option(Option<Box<ContractValue>>),
    /// The field values of a struct, in declaration order.
    Struct(Vec<ContractValue>),
    Tuple(Vec<ContractValue>),
    /// The index of a variant of an enum without payloads.
    Enum(u8),
}

/// Errors that can occur when encoding arguments.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("a length of {0} does not fit in the 32-bit length prefix")]
    LengthOverflow(usize),

    #[error("endpoint `{endpoint}` takes {expected} arguments, {actual} were given")]
    ArgumentCount {
        endpoint: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("argument `{argument}` of endpoint `{endpoint}` should be a {expected}")]
    ArgumentType {
        endpoint: &'static str,
        argument: &'static str,
        expected: String,
    },

    #[error("the contract has no endpoint `{0}`")]
    UnknownEndpoint(String),
}

/// The reason why a value could not be decoded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("input ended early: {needed} more bytes needed, {remaining} available")]
    UnexpectedEnd { needed: usize, remaining: usize },

    #[error("{0} unexpected bytes after the value")]
    TrailingBytes(usize),

    #[error("{0} unexpected result items")]
    TrailingItems(usize),

    #[error("{length} bytes do not fit in a {width}-byte integer")]
    IntegerTooLarge { width: usize, length: usize },

    #[error("value {value} is out of range for `{target}`")]
    OutOfRange { value: u64, target: &'static str },

    #[error("invalid boolean byte {0:#04x}")]
    InvalidBool(u8),

    #[error("invalid option tag {0:#04x}")]
    InvalidOptionTag(u8),

    #[error("invalid variant index {0}")]
    InvalidVariant(u8),

    #[error("an address must be 32 bytes long, found {0}")]
    InvalidAddressLength(usize),

    #[error("text is not valid UTF-8")]
    InvalidUtf8,

    #[error("expected a {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: String,
    },
}

/// A response that does not match the shape declared by the contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to decode {expected}: {kind} (raw response: 0x{})", hex::encode(.raw))]
pub struct DecodeError {
    /// A description of what was being decoded.
    pub expected: String,
    pub kind: DecodeErrorKind,
    /// The bytes that failed to decode, kept for diagnostics.
    pub raw: Vec<u8>,
}

impl DecodeError {
    /// Creates a new error for the given raw response.
    pub fn new(expected: impl Into<String>, kind: DecodeErrorKind, raw: Vec<u8>) -> Self {
        DecodeError {
            expected: expected.into(),
            kind,
            raw,
        }
    }
}

impl ContractValue {
    /// Creates a byte-string value from text.
    pub fn text(text: &str) -> Self {
        ContractValue::Bytes(text.as_bytes().to_vec())
    }

    /// Creates a list of byte strings from texts, preserving their order.
    pub fn text_list<S: AsRef<str>>(texts: &[S]) -> Self {
        ContractValue::List(
            texts
                .iter()
                .map(|text| ContractValue::text(text.as_ref()))
                .collect(),
        )
    }

    /// Creates an option value.
    pub fn option(value: Option<ContractValue>) -> Self {
        ContractValue::Option(value.map(Box::new))
    }

    /// Returns a short name of the kind of value, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ContractValue::Bytes(_) => "bytes",
            ContractValue::U8(_) => "u8",
            ContractValue::U32(_) => "u32",
            ContractValue::U64(_) => "u64",
            ContractValue::Bool(_) => "bool",
            ContractValue::Address(_) => "address",
            ContractValue::List(_) => "list",
            ContractValue::Option(_) => "option",
            ContractValue::Struct(_) => "struct",
            ContractValue::Tuple(_) => "tuple",
            ContractValue::Enum(_) => "enum",
        }
    }

    /// Returns the top-level encoding of the value.
    pub fn top_encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut output = Vec::new();
        match self {
            ContractValue::Bytes(bytes) => output.extend_from_slice(bytes),
            ContractValue::U8(value) => output.extend(minimal_be_bytes(u64::from(*value))),
            ContractValue::U32(value) => output.extend(minimal_be_bytes(u64::from(*value))),
            ContractValue::U64(value) => output.extend(minimal_be_bytes(*value)),
            ContractValue::Bool(true) => output.push(1),
            ContractValue::Bool(false) => {}
            ContractValue::Address(address) => output.extend_from_slice(address.as_bytes()),
            ContractValue::List(items) => {
                for item in items {
                    item.nested_encode_to(&mut output)?;
                }
            }
            ContractValue::Option(None) => {}
            ContractValue::Option(Some(value)) => {
                output.push(1);
                value.nested_encode_to(&mut output)?;
            }
            ContractValue::Struct(fields) | ContractValue::Tuple(fields) => {
                for field in fields {
                    field.nested_encode_to(&mut output)?;
                }
            }
            ContractValue::Enum(discriminant) => {
                output.extend(minimal_be_bytes(u64::from(*discriminant)))
            }
        }
        Ok(output)
    }

    /// Returns the nested encoding of the value.
    pub fn nested_encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut output = Vec::new();
        self.nested_encode_to(&mut output)?;
        Ok(output)
    }

    /// Appends the nested encoding of the value to `output`.
    pub fn nested_encode_to(&self, output: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            ContractValue::Bytes(bytes) => {
                output.extend_from_slice(&length_prefix(bytes.len())?);
                output.extend_from_slice(bytes);
            }
            ContractValue::U8(value) => output.push(*value),
            ContractValue::U32(value) => output.extend_from_slice(&value.to_be_bytes()),
            ContractValue::U64(value) => output.extend_from_slice(&value.to_be_bytes()),
            ContractValue::Bool(value) => output.push(u8::from(*value)),
            ContractValue::Address(address) => output.extend_from_slice(address.as_bytes()),
            ContractValue::List(items) => {
                output.extend_from_slice(&length_prefix(items.len())?);
                for item in items {
                    item.nested_encode_to(output)?;
                }
            }
            ContractValue::Option(None) => output.push(0),
            ContractValue::Option(Some(value)) => {
                output.push(1);
                value.nested_encode_to(output)?;
            }
            ContractValue::Struct(fields) | ContractValue::Tuple(fields) => {
                for field in fields {
                    field.nested_encode_to(output)?;
                }
            }
            ContractValue::Enum(discriminant) => output.push(*discriminant),
        }
        Ok(())
    }
}

/// Returns the big-endian bytes of `value` without leading zeros. Zero is the empty string.
fn minimal_be_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_significant = bytes
        .iter()
        .position(|byte| *byte != 0)
        .unwrap_or(bytes.len());
    bytes[first_significant..].to_vec()
}

fn length_prefix(length: usize) -> Result<[u8; 4], EncodeError> {
    let length = u32::try_from(length).map_err(|_| EncodeError::LengthOverflow(length))?;
    Ok(length.to_be_bytes())
}

/// Builds the data field of a transaction calling `function` with the given top-level encoded
/// arguments: the function name followed by each argument in hexadecimal, separated by `@`.
pub fn call_data(function: &str, arguments: &[Vec<u8>]) -> String {
    let mut data = String::from(function);
    for argument in arguments {
        data.push('@');
        data.push_str(&hex::encode(argument));
    }
    data
}

/// Splits the data field of a transaction into the function name and the raw arguments.
pub fn parse_call_data(data: &str) -> Result<(String, Vec<Vec<u8>>), DecodeError> {
    let mut parts = data.split('@');
    let function = parts.next().unwrap_or_default().to_owned();
    let arguments = parts
        .map(hex::decode)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|error| {
            DecodeError::new(
                "call data",
                DecodeErrorKind::UnexpectedShape {
                    expected: "hexadecimal arguments",
                    found: error.to_string(),
                },
                data.as_bytes().to_vec(),
            )
        })?;
    Ok((function, arguments))
}

#[cfg(test)]
#[path = "../unit_tests/codec_tests.rs"]
mod codec_tests;
