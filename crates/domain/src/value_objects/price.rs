use crate::error::DomainError;
use crate::math::price_tick::{sqrt_price_to_price, tick_to_price};
use primitive_types::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price of token0 quoted in token1, in raw token units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    pub value: Decimal,
}

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    pub fn from_sqrt_price_x96(sqrt_price_x96: U256) -> Result<Self, DomainError> {
        Ok(Self::new(sqrt_price_to_price(sqrt_price_x96)?))
    }

    pub fn from_tick(tick: i32) -> Result<Self, DomainError> {
        Ok(Self::new(tick_to_price(tick)?))
    }

    pub fn invert(&self) -> Self {
        if self.value.is_zero() {
            return Self {
                value: Decimal::ZERO,
            };
        }
        Self {
            value: Decimal::ONE / self.value,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.round_sf(5).unwrap_or(self.value).normalize())
    }
}
