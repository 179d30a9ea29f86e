use crate::fees::FeeAmount;
use crate::math::full_math::mul_div;
use crate::math::q128;
use crate::pool::PoolKey;
use crate::token::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Identifies liquidity inside a pool: owner plus tick range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey {
    pub owner: Address,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionKey {
    pub fn new(owner: Address, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
        }
    }
}

/// A liquidity position tracked by the position manager, one per token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Permit nonce.
    pub nonce: u128,
    /// Address approved to manage the position.
    pub operator: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeAmount,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    /// Fee growth inside the range as of the last update.
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    /// Tokens owed to the position, collectable.
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

impl Position {
    pub fn pool_key(&self) -> PoolKey {
        PoolKey {
            token0: self.token0,
            token1: self.token1,
            fee: self.fee,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed0 == 0 && self.tokens_owed1 == 0
    }
}

/// Fees earned by `liquidity` since the fee growth checkpoint `last`.
///
/// Fee growth counters wrap, so the difference is taken modulo 2^256 and the
/// result is truncated to 128 bits.
pub fn fees_owed(fee_growth_inside_x128: U256, fee_growth_inside_last_x128: U256, liquidity: u128) -> u128 {
    let growth = fee_growth_inside_x128.overflowing_sub(fee_growth_inside_last_x128).0;
    // growth < 2^256 and liquidity < 2^128, so the quotient fits
    mul_div(growth, U256::from(liquidity), q128())
        .map(|owed| owed.low_u128())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fees_owed() {
        let growth = q128() * U256::from(3);
        assert_eq!(fees_owed(growth, U256::zero(), 10), 30);
        assert_eq!(fees_owed(growth, growth, 10), 0);

        // checkpoint ahead of the counter after it wrapped around
        let last = U256::MAX;
        assert_eq!(fees_owed(q128() - U256::one(), last, 1), 1);
    }

    #[test]
    fn test_position_is_cleared() {
        let mut position = Position {
            nonce: 0,
            operator: Address::zero(),
            token0: Address::from_low_u64_be(1),
            token1: Address::from_low_u64_be(2),
            fee: FeeAmount::Medium,
            tick_lower: -60,
            tick_upper: 60,
            liquidity: 0,
            fee_growth_inside0_last_x128: U256::zero(),
            fee_growth_inside1_last_x128: U256::zero(),
            tokens_owed0: 0,
            tokens_owed1: 0,
        };
        assert!(position.is_cleared());
        position.tokens_owed1 = 1;
        assert!(!position.is_cleared());
        assert_eq!(position.pool_key().fee, FeeAmount::Medium);
    }
}
