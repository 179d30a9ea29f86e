use crate::error::DomainError;
use primitive_types::H160;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 20-byte account or contract address.
pub type Address = H160;

/// ERC20 token metadata as registered on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    pub name: String,
}

impl Token {
    pub fn new(
        address: Address,
        symbol: impl Into<String>,
        decimals: u8,
        name: impl Into<String>,
    ) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
            name: name.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.symbol, self.address)
    }
}

/// Returns the two addresses in canonical (byte-lexicographic) order.
pub fn sort_tokens(a: Address, b: Address) -> Result<(Address, Address), DomainError> {
    if a == b {
        return Err(DomainError::IdenticalAddresses);
    }
    Ok(if a < b { (a, b) } else { (b, a) })
}

/// Parses a `0x`-prefixed (or bare) 40 hex digit address.
pub fn parse_address(s: &str) -> Result<Address, DomainError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| DomainError::InvalidHex(e.to_string()))?;
    if bytes.len() != 20 {
        return Err(DomainError::InvalidHex(format!(
            "expected 20 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}
