//! Liquidity obtainable from token amounts for a price range.

use super::full_math::mul_div;
use super::{q96, to_u128};
use crate::error::DomainError;
use primitive_types::U256;

fn ordered(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// `amount0 * (sqrt_a * sqrt_b) / (sqrt_b - sqrt_a)`, rounded down.
pub fn get_liquidity_for_amount0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
) -> Result<u128, DomainError> {
    let (lower, upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let intermediate = mul_div(lower, upper, q96())?;
    to_u128(mul_div(amount0, intermediate, upper - lower)?)
}

/// `amount1 / (sqrt_b - sqrt_a)`, rounded down.
pub fn get_liquidity_for_amount1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: U256,
) -> Result<u128, DomainError> {
    let (lower, upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    to_u128(mul_div(amount1, q96(), upper - lower)?)
}

/// Maximum liquidity that both amounts can back at the current price.
pub fn get_liquidity_for_amounts(
    sqrt_ratio_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, DomainError> {
    let (lower, upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96);

    if sqrt_ratio_x96 <= lower {
        get_liquidity_for_amount0(lower, upper, amount0)
    } else if sqrt_ratio_x96 < upper {
        let liquidity0 = get_liquidity_for_amount0(sqrt_ratio_x96, upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(lower, sqrt_ratio_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount1(lower, upper, amount1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::price_tick::encode_price_sqrt;

    #[test]
    fn test_liquidity_in_range() {
        let price = encode_price_sqrt(1, 1).unwrap();
        let lower = encode_price_sqrt(100, 110).unwrap();
        let upper = encode_price_sqrt(110, 100).unwrap();
        let liquidity =
            get_liquidity_for_amounts(price, lower, upper, U256::from(100), U256::from(200))
                .unwrap();
        assert_eq!(liquidity, 2148);
    }

    #[test]
    fn test_liquidity_below_and_above_range() {
        let lower = encode_price_sqrt(100, 110).unwrap();
        let upper = encode_price_sqrt(110, 100).unwrap();

        let below = encode_price_sqrt(99, 110).unwrap();
        assert_eq!(
            get_liquidity_for_amounts(below, lower, upper, U256::from(100), U256::from(200))
                .unwrap(),
            1048
        );

        let above = encode_price_sqrt(111, 100).unwrap();
        assert_eq!(
            get_liquidity_for_amounts(above, lower, upper, U256::from(100), U256::from(200))
                .unwrap(),
            2097
        );
    }
}
