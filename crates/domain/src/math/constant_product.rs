//! Constant-product (`x * y = k`) pair accounting used by legacy pairs.

use crate::error::DomainError;
use primitive_types::U256;

/// LP tokens permanently locked by the first deposit.
pub const MINIMUM_LIQUIDITY: u64 = 1000;

/// LP tokens minted for the first deposit: `sqrt(amount0 * amount1) - MINIMUM_LIQUIDITY`.
pub fn initial_liquidity(amount0: U256, amount1: U256) -> Result<U256, DomainError> {
    let product = amount0.checked_mul(amount1).ok_or(DomainError::Overflow)?;
    product
        .integer_sqrt()
        .checked_sub(U256::from(MINIMUM_LIQUIDITY))
        .ok_or(DomainError::Overflow)
}

/// LP tokens minted for a deposit into a funded pair, proportional to the
/// smaller contribution.
pub fn proportional_liquidity(
    amount0: U256,
    amount1: U256,
    reserve0: U256,
    reserve1: U256,
    total_supply: U256,
) -> Result<U256, DomainError> {
    if reserve0.is_zero() || reserve1.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    let liquidity0 = amount0
        .checked_mul(total_supply)
        .ok_or(DomainError::Overflow)?
        / reserve0;
    let liquidity1 = amount1
        .checked_mul(total_supply)
        .ok_or(DomainError::Overflow)?
        / reserve1;
    Ok(liquidity0.min(liquidity1))
}

/// Token amounts released when burning `liquidity` out of `total_supply`.
pub fn burn_amounts(
    liquidity: U256,
    balance0: U256,
    balance1: U256,
    total_supply: U256,
) -> Result<(U256, U256), DomainError> {
    if total_supply.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    let amount0 = liquidity
        .checked_mul(balance0)
        .ok_or(DomainError::Overflow)?
        / total_supply;
    let amount1 = liquidity
        .checked_mul(balance1)
        .ok_or(DomainError::Overflow)?
        / total_supply;
    Ok((amount0, amount1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_liquidity_locks_minimum() {
        let liquidity = initial_liquidity(U256::from(10_000), U256::from(10_000)).unwrap();
        assert_eq!(liquidity, U256::from(9000));

        assert_eq!(
            initial_liquidity(U256::from(10), U256::from(10)),
            Err(DomainError::Overflow)
        );
    }

    #[test]
    fn test_proportional_liquidity() {
        // pair holds 10000/20000 with 14142 supply
        let minted = proportional_liquidity(
            U256::from(1000),
            U256::from(4000),
            U256::from(10_000),
            U256::from(20_000),
            U256::from(14_142),
        )
        .unwrap();
        assert_eq!(minted, U256::from(1414));
    }

    #[test]
    fn test_burn_amounts() {
        let (amount0, amount1) = burn_amounts(
            U256::from(9000),
            U256::from(10_000),
            U256::from(10_000),
            U256::from(10_000),
        )
        .unwrap();
        assert_eq!(amount0, U256::from(9000));
        assert_eq!(amount1, U256::from(9000));
    }
}
