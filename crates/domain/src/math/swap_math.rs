//! A single swap step within one initialized-tick range.

use super::full_math::{mul_div, mul_div_rounding_up};
use super::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use crate::error::DomainError;
use primitive_types::U256;

/// Fee denominator: fees are expressed in pips (1e-6).
pub const FEE_DENOMINATOR: u32 = 1_000_000;

/// Result of [`compute_swap_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// Price reached at the end of the step.
    pub sqrt_price_next_x96: U256,
    /// Input consumed, excluding fee.
    pub amount_in: U256,
    /// Output produced.
    pub amount_out: U256,
    /// Fee taken from the input.
    pub fee_amount: U256,
}

/// Swaps as far as `amount_remaining` allows between the current and target price.
///
/// `exact_input` selects whether `amount_remaining` is an input budget
/// (fee included) or an outstanding output amount.
pub fn compute_swap_step(
    sqrt_ratio_current_x96: U256,
    sqrt_ratio_target_x96: U256,
    liquidity: u128,
    amount_remaining: U256,
    exact_input: bool,
    fee_pips: u32,
) -> Result<SwapStep, DomainError> {
    let zero_for_one = sqrt_ratio_current_x96 >= sqrt_ratio_target_x96;
    let fee = U256::from(fee_pips);
    let denominator = U256::from(FEE_DENOMINATOR);

    let mut amount_in = U256::zero();
    let mut amount_out = U256::zero();
    let sqrt_price_next_x96 = if exact_input {
        let remaining_less_fee = mul_div(amount_remaining, denominator - fee, denominator)?;
        amount_in = if zero_for_one {
            get_amount0_delta(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, true)?
        } else {
            get_amount1_delta(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, true)?
        };
        if remaining_less_fee >= amount_in {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_ratio_current_x96,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount1_delta(sqrt_ratio_target_x96, sqrt_ratio_current_x96, liquidity, false)?
        } else {
            get_amount0_delta(sqrt_ratio_current_x96, sqrt_ratio_target_x96, liquidity, false)?
        };
        if amount_remaining >= amount_out {
            sqrt_ratio_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_ratio_current_x96,
                liquidity,
                amount_remaining,
                zero_for_one,
            )?
        }
    };

    let reached_target = sqrt_ratio_target_x96 == sqrt_price_next_x96;

    if zero_for_one {
        if !(reached_target && exact_input) {
            amount_in =
                get_amount0_delta(sqrt_price_next_x96, sqrt_ratio_current_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_input) {
            amount_out =
                get_amount1_delta(sqrt_price_next_x96, sqrt_ratio_current_x96, liquidity, false)?;
        }
    } else {
        if !(reached_target && exact_input) {
            amount_in =
                get_amount1_delta(sqrt_ratio_current_x96, sqrt_price_next_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_input) {
            amount_out =
                get_amount0_delta(sqrt_ratio_current_x96, sqrt_price_next_x96, liquidity, false)?;
        }
    }

    // never hand out more than was asked for
    if !exact_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if exact_input && sqrt_price_next_x96 != sqrt_ratio_target_x96 {
        // the whole remainder is consumed, leftover after rounding goes to the fee
        amount_remaining - amount_in
    } else {
        mul_div_rounding_up(amount_in, fee, denominator - fee)?
    };

    Ok(SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}
