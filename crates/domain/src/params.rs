//! Call parameters accepted by the router, the position manager and the migrator.

use crate::fees::FeeAmount;
use crate::path::Path;
use crate::token::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Deadline that never expires.
pub const NO_DEADLINE: u64 = u64::MAX;

/// Swap a fixed input amount through one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: FeeAmount,
    /// Receiver of the output; the zero address means the router itself.
    pub recipient: Address,
    pub deadline: u64,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
    /// Price the swap may not cross; `None` swaps to the natural limit.
    pub sqrt_price_limit_x96: Option<U256>,
}

impl ExactInputSingleParams {
    pub fn new(
        token_in: Address,
        token_out: Address,
        fee: FeeAmount,
        recipient: Address,
        amount_in: U256,
    ) -> Self {
        Self {
            token_in,
            token_out,
            fee,
            recipient,
            deadline: NO_DEADLINE,
            amount_in,
            amount_out_minimum: U256::zero(),
            sqrt_price_limit_x96: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_amount_out_minimum(mut self, amount_out_minimum: U256) -> Self {
        self.amount_out_minimum = amount_out_minimum;
        self
    }

    #[must_use]
    pub fn with_sqrt_price_limit(mut self, sqrt_price_limit_x96: U256) -> Self {
        self.sqrt_price_limit_x96 = Some(sqrt_price_limit_x96);
        self
    }
}

/// Swap a fixed input amount along a multi-hop path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactInputParams {
    /// Path from the input token to the output token.
    pub path: Path,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_in: U256,
    pub amount_out_minimum: U256,
}

impl ExactInputParams {
    pub fn new(path: Path, recipient: Address, amount_in: U256) -> Self {
        Self {
            path,
            recipient,
            deadline: NO_DEADLINE,
            amount_in,
            amount_out_minimum: U256::zero(),
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_amount_out_minimum(mut self, amount_out_minimum: U256) -> Self {
        self.amount_out_minimum = amount_out_minimum;
        self
    }
}

/// Buy a fixed output amount through one pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputSingleParams {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: FeeAmount,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_out: U256,
    pub amount_in_maximum: U256,
    pub sqrt_price_limit_x96: Option<U256>,
}

impl ExactOutputSingleParams {
    pub fn new(
        token_in: Address,
        token_out: Address,
        fee: FeeAmount,
        recipient: Address,
        amount_out: U256,
        amount_in_maximum: U256,
    ) -> Self {
        Self {
            token_in,
            token_out,
            fee,
            recipient,
            deadline: NO_DEADLINE,
            amount_out,
            amount_in_maximum,
            sqrt_price_limit_x96: None,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_sqrt_price_limit(mut self, sqrt_price_limit_x96: U256) -> Self {
        self.sqrt_price_limit_x96 = Some(sqrt_price_limit_x96);
        self
    }
}

/// Buy a fixed output amount along a multi-hop path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExactOutputParams {
    /// Path from the output token back to the input token.
    pub path: Path,
    pub recipient: Address,
    pub deadline: u64,
    pub amount_out: U256,
    pub amount_in_maximum: U256,
}

impl ExactOutputParams {
    pub fn new(path: Path, recipient: Address, amount_out: U256, amount_in_maximum: U256) -> Self {
        Self {
            path,
            recipient,
            deadline: NO_DEADLINE,
            amount_out,
            amount_in_maximum,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: u64) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Open a new position and mint its token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintParams {
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeAmount,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseLiquidityParams {
    pub token_id: u64,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecreaseLiquidityParams {
    pub token_id: u64,
    pub liquidity: u128,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub deadline: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectParams {
    pub token_id: u64,
    /// Receiver of the collected tokens; zero means the manager itself.
    pub recipient: Address,
    pub amount0_max: u128,
    pub amount1_max: u128,
}

/// Move liquidity from a legacy pair into a concentrated-liquidity position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateParams {
    /// Legacy pair holding the liquidity.
    pub pair: Address,
    /// LP tokens to pull from the caller and burn.
    pub liquidity_to_migrate: U256,
    /// Share of the burned amounts to deposit, in percent (1..=100).
    pub percentage_to_migrate: u8,
    pub token0: Address,
    pub token1: Address,
    pub fee: FeeAmount,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: u64,
    /// Pay WSEI refunds out as native currency.
    pub refund_as_sei: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_param_builders() {
        let a = Address::from_low_u64_be(1);
        let b = Address::from_low_u64_be(2);
        let params = ExactInputSingleParams::new(a, b, FeeAmount::Medium, a, U256::from(3))
            .with_deadline(1)
            .with_amount_out_minimum(U256::one());
        assert_eq!(params.deadline, 1);
        assert_eq!(params.amount_out_minimum, U256::one());
        assert_eq!(params.sqrt_price_limit_x96, None);

        let exact_out =
            ExactOutputSingleParams::new(a, b, FeeAmount::Low, a, U256::one(), U256::from(3));
        assert_eq!(exact_out.deadline, NO_DEADLINE);
    }

    #[test]
    fn test_params_serialize() {
        let path = Path::encode(
            &[Address::from_low_u64_be(1), Address::from_low_u64_be(2)],
            &[FeeAmount::Medium],
        )
        .unwrap();
        let params = ExactInputParams::new(path, Address::zero(), U256::from(5));
        let json = serde_json::to_string(&params).unwrap();
        let back: ExactInputParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
