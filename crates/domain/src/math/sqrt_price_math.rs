//! Token amounts between two sqrt prices and the price reached after moving an amount.

use super::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use super::{q96, to_u160};
use crate::error::DomainError;
use primitive_types::U256;

/// Next sqrt price after adding or removing `amount` of token0.
///
/// Always rounds up: the price moves less when adding and more when removing,
/// so the pool never gives away more than it receives.
pub fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, DomainError> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }
    let numerator1 = U256::from(liquidity) << 96;

    if add {
        if let Some(product) = amount.checked_mul(sqrt_price_x96) {
            if let Some(denominator) = numerator1.checked_add(product) {
                return mul_div_rounding_up(numerator1, sqrt_price_x96, denominator);
            }
        }
        let denominator = (numerator1 / sqrt_price_x96)
            .checked_add(amount)
            .ok_or(DomainError::Overflow)?;
        div_rounding_up(numerator1, denominator)
    } else {
        let product = amount
            .checked_mul(sqrt_price_x96)
            .ok_or(DomainError::Overflow)?;
        if numerator1 <= product {
            return Err(DomainError::Overflow);
        }
        let next = mul_div_rounding_up(numerator1, sqrt_price_x96, numerator1 - product)?;
        to_u160(next)
    }
}

/// Next sqrt price after adding or removing `amount` of token1. Rounds down.
pub fn get_next_sqrt_price_from_amount1_rounding_down(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, DomainError> {
    let liquidity = U256::from(liquidity);
    let fits_u160 = amount.bits() <= 160;

    if add {
        let quotient = if fits_u160 {
            (amount << 96) / liquidity
        } else {
            mul_div(amount, q96(), liquidity)?
        };
        let next = sqrt_price_x96
            .checked_add(quotient)
            .ok_or(DomainError::Overflow)?;
        to_u160(next)
    } else {
        let quotient = if fits_u160 {
            div_rounding_up(amount << 96, liquidity)?
        } else {
            mul_div_rounding_up(amount, q96(), liquidity)?
        };
        if sqrt_price_x96 <= quotient {
            return Err(DomainError::Overflow);
        }
        Ok(sqrt_price_x96 - quotient)
    }
}

/// Price after swapping `amount_in` into the pool.
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, DomainError> {
    if sqrt_price_x96.is_zero() || liquidity == 0 {
        return Err(DomainError::ZeroInput);
    }
    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Price after taking `amount_out` out of the pool.
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, DomainError> {
    if sqrt_price_x96.is_zero() || liquidity == 0 {
        return Err(DomainError::ZeroInput);
    }
    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_out, false)
    }
}

/// Amount of token0 between two prices:
/// `liquidity * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)`.
pub fn get_amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, DomainError> {
    let (lower, upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };
    if lower.is_zero() {
        return Err(DomainError::ZeroInput);
    }

    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = upper - lower;

    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower)
    } else {
        Ok(mul_div(numerator1, numerator2, upper)? / lower)
    }
}

/// Amount of token1 between two prices: `liquidity * (sqrt_b - sqrt_a)`.
pub fn get_amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, DomainError> {
    let (lower, upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };
    let liquidity = U256::from(liquidity);
    if round_up {
        mul_div_rounding_up(liquidity, upper - lower, q96())
    } else {
        mul_div(liquidity, upper - lower, q96())
    }
}
