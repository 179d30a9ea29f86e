use crate::error::DomainError;

/// Applies a signed liquidity delta, failing on under- or overflow.
pub fn add_delta(x: u128, y: i128) -> Result<u128, DomainError> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or(DomainError::LiquiditySub)
    } else {
        x.checked_add(y as u128).ok_or(DomainError::LiquidityAdd)
    }
}
