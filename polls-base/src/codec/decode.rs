// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use super::{ContractValue, DecodeError, DecodeErrorKind};
use crate::{
    abi::ContractType,
    identifiers::{Address, ADDRESS_LENGTH},
};

/// A cursor over nested-encoded values.
pub struct NestedReader<'a> {
    input: &'a [u8],
}

impl<'a> NestedReader<'a> {
    /// Creates a reader over `input`.
    pub fn new(input: &'a [u8]) -> Self {
        NestedReader { input }
    }

    /// Returns the number of bytes not consumed yet.
    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Reads one value of type `ty`.
    pub fn read(&mut self, ty: &ContractType) -> Result<ContractValue, DecodeErrorKind> {
        let value = match ty {
            ContractType::Bytes => {
                let length = self.read_length()?;
                ContractValue::Bytes(self.take(length)?.to_vec())
            }
            ContractType::U8 => ContractValue::U8(self.take_array::<1>()?[0]),
            ContractType::U32 => ContractValue::U32(u32::from_be_bytes(self.take_array()?)),
            ContractType::U64 => ContractValue::U64(u64::from_be_bytes(self.take_array()?)),
            ContractType::Bool => match self.take_array::<1>()?[0] {
                0 => ContractValue::Bool(false),
                1 => ContractValue::Bool(true),
                byte => return Err(DecodeErrorKind::InvalidBool(byte)),
            },
            ContractType::Address => {
                ContractValue::Address(Address::new(self.take_array::<ADDRESS_LENGTH>()?))
            }
            ContractType::List(item) => {
                let count = self.read_length()?;
                // Each item takes at least one byte, which bounds the allocation.
                let mut items = Vec::with_capacity(count.min(self.remaining()));
                for _ in 0..count {
                    items.push(self.read(item)?);
                }
                ContractValue::List(items)
            }
            ContractType::Option(inner) => match self.take_array::<1>()?[0] {
                0 => ContractValue::Option(None),
                1 => ContractValue::option(Some(self.read(inner)?)),
                tag => return Err(DecodeErrorKind::InvalidOptionTag(tag)),
            },
            ContractType::Struct { fields, .. } => ContractValue::Struct(
                fields
                    .iter()
                    .map(|field| self.read(&field.ty))
                    .collect::<Result<_, _>>()?,
            ),
            ContractType::Tuple(types) => ContractValue::Tuple(
                types
                    .iter()
                    .map(|ty| self.read(ty))
                    .collect::<Result<_, _>>()?,
            ),
            ContractType::Enum { variants, .. } => {
                let discriminant = self.take_array::<1>()?[0];
                check_variant(discriminant, variants)?;
                ContractValue::Enum(discriminant)
            }
        };
        Ok(value)
    }

    /// Fails unless every byte has been consumed.
    pub fn finish(self) -> Result<(), DecodeErrorKind> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(DecodeErrorKind::TrailingBytes(self.input.len()))
        }
    }

    fn read_length(&mut self) -> Result<usize, DecodeErrorKind> {
        let length = u32::from_be_bytes(self.take_array()?);
        usize::try_from(length).map_err(|_| DecodeErrorKind::OutOfRange {
            value: length.into(),
            target: "usize",
        })
    }

    fn take(&mut self, length: usize) -> Result<&'a [u8], DecodeErrorKind> {
        if self.input.len() < length {
            return Err(DecodeErrorKind::UnexpectedEnd {
                needed: length,
                remaining: self.input.len(),
            });
        }
        let (head, tail) = self.input.split_at(length);
        self.input = tail;
        Ok(head)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeErrorKind> {
        let mut array = [0; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }
}

impl ContractValue {
    /// Decodes a top-level encoded value of type `ty`.
    pub fn decode_top(bytes: &[u8], ty: &ContractType) -> Result<ContractValue, DecodeError> {
        decode_top_inner(bytes, ty)
            .map_err(|kind| DecodeError::new(ty.to_string(), kind, bytes.to_vec()))
    }

    /// Decodes a nested-encoded value of type `ty` that spans all of `bytes`.
    pub fn decode_nested(bytes: &[u8], ty: &ContractType) -> Result<ContractValue, DecodeError> {
        let decode = || -> Result<ContractValue, DecodeErrorKind> {
            let mut reader = NestedReader::new(bytes);
            let value = reader.read(ty)?;
            reader.finish()?;
            Ok(value)
        };
        decode().map_err(|kind| DecodeError::new(ty.to_string(), kind, bytes.to_vec()))
    }
}

fn decode_top_inner(bytes: &[u8], ty: &ContractType) -> Result<ContractValue, DecodeErrorKind> {
    let value = match ty {
        ContractType::Bytes => ContractValue::Bytes(bytes.to_vec()),
        ContractType::U8 => ContractValue::U8(narrow(top_decode_unsigned(bytes, 1)?, "u8")?),
        ContractType::U32 => ContractValue::U32(narrow(top_decode_unsigned(bytes, 4)?, "u32")?),
        ContractType::U64 => ContractValue::U64(top_decode_unsigned(bytes, 8)?),
        ContractType::Bool => match top_decode_unsigned(bytes, 1)? {
            0 => ContractValue::Bool(false),
            1 => ContractValue::Bool(true),
            _ => return Err(DecodeErrorKind::InvalidBool(bytes[bytes.len() - 1])),
        },
        ContractType::Address => {
            let address = Address::try_from_slice(bytes)
                .map_err(|_| DecodeErrorKind::InvalidAddressLength(bytes.len()))?;
            ContractValue::Address(address)
        }
        ContractType::List(item) => {
            let mut reader = NestedReader::new(bytes);
            let mut items = Vec::new();
            while reader.remaining() > 0 {
                let before = reader.remaining();
                items.push(reader.read(item)?);
                if reader.remaining() == before {
                    return Err(DecodeErrorKind::UnexpectedShape {
                        expected: "list items of non-zero size",
                        found: item.to_string(),
                    });
                }
            }
            ContractValue::List(items)
        }
        ContractType::Option(inner) => match bytes.split_first() {
            None => ContractValue::Option(None),
            Some((1, rest)) => {
                let mut reader = NestedReader::new(rest);
                let value = reader.read(inner)?;
                reader.finish()?;
                ContractValue::option(Some(value))
            }
            Some((tag, _)) => return Err(DecodeErrorKind::InvalidOptionTag(*tag)),
        },
        ContractType::Struct { .. } | ContractType::Tuple(_) => {
            let mut reader = NestedReader::new(bytes);
            let value = reader.read(ty)?;
            reader.finish()?;
            value
        }
        ContractType::Enum { variants, .. } => {
            let discriminant = narrow(top_decode_unsigned(bytes, 1)?, "u8")?;
            check_variant(discriminant, variants)?;
            ContractValue::Enum(discriminant)
        }
    };
    Ok(value)
}

/// Decodes a big-endian unsigned integer of at most `width` bytes. Leading zeros are accepted.
fn top_decode_unsigned(bytes: &[u8], width: usize) -> Result<u64, DecodeErrorKind> {
    if bytes.len() > width {
        return Err(DecodeErrorKind::IntegerTooLarge {
            width,
            length: bytes.len(),
        });
    }
    Ok(bytes
        .iter()
        .fold(0u64, |value, byte| (value << 8) | u64::from(*byte)))
}

fn narrow<T: TryFrom<u64>>(value: u64, target: &'static str) -> Result<T, DecodeErrorKind> {
    T::try_from(value).map_err(|_| DecodeErrorKind::OutOfRange { value, target })
}

fn check_variant(discriminant: u8, variants: &[&str]) -> Result<(), DecodeErrorKind> {
    if usize::from(discriminant) < variants.len() {
        Ok(())
    } else {
        Err(DecodeErrorKind::InvalidVariant(discriminant))
    }
}
