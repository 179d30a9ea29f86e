//! Fixed-point math shared by pools, the router and the position manager.
//!
//! Prices are Q64.96 square roots held in `U256`; every rounding direction
//! matches the on-chain libraries so that simulated balances are exact.

pub mod constant_product;
pub mod full_math;
pub mod liquidity_amounts;
pub mod liquidity_math;
pub mod price_tick;
pub mod sqrt_price_math;
pub mod swap_math;
pub mod tick_math;

use crate::error::DomainError;
use primitive_types::U256;

/// 2^96.
pub fn q96() -> U256 {
    U256::one() << 96
}

/// 2^128.
pub fn q128() -> U256 {
    U256::one() << 128
}

/// Narrows to `u128`, failing instead of truncating.
pub fn to_u128(value: U256) -> Result<u128, DomainError> {
    if value.bits() > 128 {
        return Err(DomainError::Overflow);
    }
    Ok(value.low_u128())
}

/// Checks that a value fits in 160 bits.
pub fn to_u160(value: U256) -> Result<U256, DomainError> {
    if value.bits() > 160 {
        return Err(DomainError::Overflow);
    }
    Ok(value)
}
