use super::tick_math::get_sqrt_ratio_at_tick;
use super::to_u160;
use crate::error::DomainError;
use primitive_types::{U256, U512};
use rust_decimal::Decimal;

const PRICE_SCALE: u32 = 18;

/// Returns `sqrt(reserve1 / reserve0) * 2^96`, rounded down.
pub fn encode_price_sqrt(reserve1: u128, reserve0: u128) -> Result<U256, DomainError> {
    if reserve0 == 0 {
        return Err(DomainError::DivisionByZero);
    }
    let ratio_x192 = (U512::from(reserve1) << 192) / U512::from(reserve0);
    let root = U256::try_from(ratio_x192.integer_sqrt()).map_err(|_| DomainError::Overflow)?;
    to_u160(root)
}

/// Price of token0 in token1 for a Q64.96 sqrt price, truncated to 18 decimals.
pub fn sqrt_price_to_price(sqrt_price_x96: U256) -> Result<Decimal, DomainError> {
    let squared = sqrt_price_x96.full_mul(sqrt_price_x96);
    let mut scaled = (squared * U512::exp10(PRICE_SCALE as usize)) >> 192;
    let mut scale = PRICE_SCALE;
    loop {
        if scaled.bits() <= 96 {
            let mantissa = scaled.low_u128() as i128;
            return Decimal::try_from_i128_with_scale(mantissa, scale)
                .map(|price| price.normalize())
                .map_err(|_| DomainError::Overflow);
        }
        if scale == 0 {
            return Err(DomainError::Overflow);
        }
        scaled /= U512::from(10u8);
        scale -= 1;
    }
}

/// Returns the price corresponding to a given tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: i32) -> Result<Decimal, DomainError> {
    sqrt_price_to_price(get_sqrt_ratio_at_tick(tick)?)
}
