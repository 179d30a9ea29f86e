//! 512-bit intermediate multiplication and division.

use crate::error::DomainError;
use primitive_types::{U256, U512};

/// `floor(a * b / denominator)` with a full 512-bit intermediate product.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, DomainError> {
    if denominator.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| DomainError::Overflow)
}

/// `ceil(a * b / denominator)`.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, DomainError> {
    let result = mul_div(a, b, denominator)?;
    if (a.full_mul(b) % U512::from(denominator)).is_zero() {
        Ok(result)
    } else {
        result.checked_add(U256::one()).ok_or(DomainError::Overflow)
    }
}

/// `ceil(x / y)`; the caller guarantees `y > 0`.
pub fn div_rounding_up(x: U256, y: U256) -> Result<U256, DomainError> {
    if y.is_zero() {
        return Err(DomainError::DivisionByZero);
    }
    let quotient = x / y;
    if (x % y).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}
