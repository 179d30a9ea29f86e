//! Packed multi-hop swap paths.
//!
//! A path is `token ‖ fee ‖ token ‖ fee ‖ … ‖ token` where every token is a
//! 20-byte address and every fee a 3-byte big-endian integer. A path with `n`
//! pools is therefore exactly `20 + 23 * n` bytes long.

use crate::error::DomainError;
use crate::fees::FeeAmount;
use crate::token::Address;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Bytes in an encoded address.
pub const ADDR_SIZE: usize = 20;
/// Bytes in an encoded fee.
pub const FEE_SIZE: usize = 3;
/// Offset of the next token inside a path.
pub const NEXT_OFFSET: usize = ADDR_SIZE + FEE_SIZE;
/// Length of a single-pool path.
pub const POP_OFFSET: usize = NEXT_OFFSET + ADDR_SIZE;
/// Minimum length of a path holding two or more pools.
pub const MULTIPLE_POOLS_MIN_LENGTH: usize = POP_OFFSET + NEXT_OFFSET;

/// One pool traversal of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hop {
    pub token_in: Address,
    pub fee: FeeAmount,
    pub token_out: Address,
}

impl Hop {
    pub fn new(token_in: Address, fee: FeeAmount, token_out: Address) -> Self {
        Self {
            token_in,
            fee,
            token_out,
        }
    }
}

/// An encoded swap path. Always holds at least one pool.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path(Vec<u8>);

impl Path {
    /// Encodes `tokens[0], fees[0], tokens[1], …`.
    pub fn encode(tokens: &[Address], fees: &[FeeAmount]) -> Result<Self, DomainError> {
        if fees.is_empty() {
            return Err(DomainError::EmptyPath);
        }
        if tokens.len() != fees.len() + 1 {
            return Err(DomainError::PathArity {
                tokens: tokens.len(),
                fees: fees.len(),
            });
        }

        let mut bytes = Vec::with_capacity(ADDR_SIZE + NEXT_OFFSET * fees.len());
        bytes.extend_from_slice(tokens[0].as_bytes());
        for (fee, token) in fees.iter().zip(&tokens[1..]) {
            bytes.extend_from_slice(&fee.pips().to_be_bytes()[1..]);
            bytes.extend_from_slice(token.as_bytes());
        }
        Ok(Self(bytes))
    }

    /// Encodes a chain of hops, checking that each hop starts at the
    /// previous hop's output token.
    pub fn from_hops(hops: &[Hop]) -> Result<Self, DomainError> {
        let first = hops.first().ok_or(DomainError::EmptyPath)?;
        let mut tokens = vec![first.token_in];
        let mut fees = Vec::with_capacity(hops.len());
        for (index, hop) in hops.iter().enumerate() {
            if index > 0 && hop.token_in != hops[index - 1].token_out {
                return Err(DomainError::BrokenPath(index));
            }
            fees.push(hop.fee);
            tokens.push(hop.token_out);
        }
        Self::encode(&tokens, &fees)
    }

    /// Wraps raw bytes after validating the length and every fee.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, DomainError> {
        let bytes = bytes.into();
        if bytes.len() < POP_OFFSET || (bytes.len() - ADDR_SIZE) % NEXT_OFFSET != 0 {
            return Err(DomainError::InvalidPathLength(bytes.len()));
        }
        let path = Self(bytes);
        for index in 0..path.num_pools() {
            path.fee_at(index * NEXT_OFFSET + ADDR_SIZE)?;
        }
        Ok(path)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: a path holds at least one pool.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn num_pools(&self) -> usize {
        (self.0.len() - ADDR_SIZE) / NEXT_OFFSET
    }

    pub fn has_multiple_pools(&self) -> bool {
        self.0.len() >= MULTIPLE_POOLS_MIN_LENGTH
    }

    /// Decodes the first pool as `(token_in, token_out, fee)`.
    pub fn decode_first_pool(&self) -> Result<Hop, DomainError> {
        let token_in = self.address_at(0);
        let fee = self.fee_at(ADDR_SIZE)?;
        let token_out = self.address_at(NEXT_OFFSET);
        Ok(Hop::new(token_in, fee, token_out))
    }

    /// The segment describing only the first pool.
    pub fn first_pool(&self) -> Path {
        Self(self.0[..POP_OFFSET].to_vec())
    }

    /// Drops the first token and fee, returning the remaining path.
    pub fn skip_token(&self) -> Result<Path, DomainError> {
        if !self.has_multiple_pools() {
            return Err(DomainError::EmptyPath);
        }
        Ok(Self(self.0[NEXT_OFFSET..].to_vec()))
    }

    /// All tokens along the path, in order.
    pub fn tokens(&self) -> Vec<Address> {
        (0..=self.num_pools())
            .map(|index| self.address_at(index * NEXT_OFFSET))
            .collect()
    }

    pub fn hops(&self) -> Result<Vec<Hop>, DomainError> {
        (0..self.num_pools())
            .map(|index| {
                let offset = index * NEXT_OFFSET;
                Ok(Hop::new(
                    self.address_at(offset),
                    self.fee_at(offset + ADDR_SIZE)?,
                    self.address_at(offset + NEXT_OFFSET),
                ))
            })
            .collect()
    }

    /// The same pools traversed in the opposite direction.
    pub fn reversed(&self) -> Result<Path, DomainError> {
        let mut tokens = self.tokens();
        tokens.reverse();
        let mut fees = self
            .hops()?
            .into_iter()
            .map(|hop| hop.fee)
            .collect::<Vec<_>>();
        fees.reverse();
        Self::encode(&tokens, &fees)
    }

    fn address_at(&self, offset: usize) -> Address {
        Address::from_slice(&self.0[offset..offset + ADDR_SIZE])
    }

    fn fee_at(&self, offset: usize) -> Result<FeeAmount, DomainError> {
        let raw = &self.0[offset..offset + FEE_SIZE];
        let pips = u32::from_be_bytes([0, raw[0], raw[1], raw[2]]);
        FeeAmount::from_pips(pips)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl FromStr for Path {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| DomainError::InvalidHex(e.to_string()))?;
        Self::from_bytes(bytes)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
