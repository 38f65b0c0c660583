//! Fixed-width identity types for on-chain entities
//!
//! Addresses are 20 bytes, hashes and signature scalars 32 bytes. Hex
//! parsing rejects any other length, so downstream code never re-validates
//! field widths.

use crate::errors::ParseIdError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

fn decode_fixed<const N: usize>(input: &str) -> Result<[u8; N], ParseIdError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    let bytes = hex::decode(digits).map_err(|_| ParseIdError::InvalidHex(input.to_string()))?;
    if bytes.len() != N {
        return Err(ParseIdError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; 20])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Parse from hex, with or without a `0x` prefix. Exactly 20 bytes.
    pub fn from_hex(input: &str) -> Result<Self, ParseIdError> {
        decode_fixed(input).map(Self)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseIdError> {
        if bytes.len() != Self::LEN {
            return Err(ParseIdError::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(D::Error::custom)
    }
}

/// A 32-byte hash or signature scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256([u8; 32]);

impl Hash256 {
    pub const LEN: usize = 32;

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse from hex, with or without a `0x` prefix. Exactly 32 bytes.
    pub fn from_hex(input: &str) -> Result<Self, ParseIdError> {
        decode_fixed(input).map(Self)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ParseIdError> {
        if bytes.len() != Self::LEN {
            return Err(ParseIdError::InvalidLength {
                expected: Self::LEN,
                actual: bytes.len(),
            });
        }
        let mut out = [0u8; 32];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Hash256 {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(D::Error::custom)
    }
}
