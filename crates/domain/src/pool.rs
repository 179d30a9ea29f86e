//! Deterministic pool and pair addresses.
//!
//! Pools are deployed by their factory with CREATE2, so their address can be
//! derived from the factory, the ordered token pair and the fee without any
//! lookup.

use crate::error::DomainError;
use crate::fees::FeeAmount;
use crate::token::{Address, sort_tokens};
use alloy_primitives::keccak256;
use serde::{Deserialize, Serialize};

/// Init code hash of the concentrated-liquidity pool contract.
pub const POOL_INIT_CODE_HASH: [u8; 32] = [
    0xe3, 0x4f, 0x19, 0x9b, 0x19, 0xb2, 0xb4, 0xf4, 0x7f, 0x68, 0x44, 0x26, 0x19, 0xd5, 0x55, 0x52,
    0x7d, 0x24, 0x4f, 0x78, 0xa3, 0x29, 0x7e, 0xa8, 0x93, 0x25, 0xf8, 0x43, 0xf8, 0x7b, 0x8b, 0x54,
];

/// Init code hash of the legacy constant-product pair contract.
pub const PAIR_INIT_CODE_HASH: [u8; 32] = [
    0x96, 0xe8, 0xac, 0x42, 0x77, 0x19, 0x8f, 0xf8, 0xb6, 0xf7, 0x85, 0x47, 0x8a, 0xa9, 0xa3, 0x9f,
    0x40, 0x3c, 0xb7, 0x68, 0xdd, 0x02, 0xcb, 0xee, 0x32, 0x6c, 0x3e, 0x7d, 0xa3, 0x48, 0x84, 0x5f,
];

/// Identifies a pool: ordered tokens plus fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolKey {
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeAmount,
}

impl PoolKey {
    /// Builds a key from tokens in any order.
    pub fn new(token_a: Address, token_b: Address, fee: FeeAmount) -> Result<Self, DomainError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        Ok(Self {
            token0,
            token1,
            fee,
        })
    }

    /// Builds a key from tokens that must already be in canonical order.
    pub fn sorted(token0: Address, token1: Address, fee: FeeAmount) -> Result<Self, DomainError> {
        if token0 >= token1 {
            return Err(DomainError::UnsortedTokens);
        }
        Ok(Self {
            token0,
            token1,
            fee,
        })
    }

    pub fn contains(&self, token: Address) -> bool {
        self.token0 == token || self.token1 == token
    }

    /// `keccak256(abi.encode(token0, token1, fee))`.
    pub fn salt(&self) -> [u8; 32] {
        let mut encoded = [0u8; 96];
        encoded[12..32].copy_from_slice(self.token0.as_bytes());
        encoded[44..64].copy_from_slice(self.token1.as_bytes());
        encoded[92..96].copy_from_slice(&self.fee.pips().to_be_bytes());
        keccak256(encoded).0
    }
}

/// Address of the pool `key` deployed by `factory`.
pub fn compute_pool_address(factory: Address, key: &PoolKey) -> Address {
    create2_address(factory, key.salt(), POOL_INIT_CODE_HASH)
}

/// Address of the legacy pair for `token_a`/`token_b` deployed by `factory`.
pub fn compute_pair_address(
    factory: Address,
    token_a: Address,
    token_b: Address,
) -> Result<Address, DomainError> {
    let (token0, token1) = sort_tokens(token_a, token_b)?;
    let mut packed = [0u8; 40];
    packed[..20].copy_from_slice(token0.as_bytes());
    packed[20..].copy_from_slice(token1.as_bytes());
    Ok(create2_address(
        factory,
        keccak256(packed).0,
        PAIR_INIT_CODE_HASH,
    ))
}

fn create2_address(deployer: Address, salt: [u8; 32], init_code_hash: [u8; 32]) -> Address {
    let mut preimage = [0u8; 85];
    preimage[0] = 0xff;
    preimage[1..21].copy_from_slice(deployer.as_bytes());
    preimage[21..53].copy_from_slice(&salt);
    preimage[53..].copy_from_slice(&init_code_hash);
    Address::from_slice(&keccak256(preimage)[12..])
}
