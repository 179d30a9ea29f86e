//! Swap router: single and multi-hop swaps with slippage bounds.
//!
//! Every swap is settled through the pool callback. Exact-input paths are
//! walked forwards, the router holding intermediate outputs and paying the
//! next pool itself. Exact-output paths are encoded in reverse and walked from
//! inside the callbacks: each callback swaps the next pool for exactly the
//! amount the current pool asks for, and the last one records the total input.

use crate::config::PeripheryConfig;
use crate::error::PeripheryError;
use crate::multicall::execute_batch;
use crate::payments::Payments;
use crate::validation::{check_deadline, verify_callback};
use periphery_domain::fees::FeeAmount;
use periphery_domain::math::tick_math::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use periphery_domain::params::{
    ExactInputParams, ExactInputSingleParams, ExactOutputParams, ExactOutputSingleParams,
};
use periphery_domain::path::Path;
use periphery_domain::pool::{PoolKey, compute_pool_address};
use periphery_domain::token::Address;
use periphery_domain::value_objects::TokenDelta;
use periphery_simulation::callback::SwapCallback;
use periphery_simulation::pool::SwapAmount;
use periphery_simulation::world::World;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Data the router passes through a pool to its own swap callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapCallbackData {
    /// Remaining path; its first pool is the one calling back.
    pub path: Path,
    /// Who pays the pool.
    pub payer: Address,
}

/// One router entry point, as composed in a multicall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterCall {
    ExactInputSingle(ExactInputSingleParams),
    ExactInput(ExactInputParams),
    ExactOutputSingle(ExactOutputSingleParams),
    ExactOutput(ExactOutputParams),
    UnwrapWsei {
        amount_minimum: U256,
        recipient: Address,
    },
    UnwrapWseiWithFee {
        amount_minimum: U256,
        recipient: Address,
        fee_bips: u32,
        fee_recipient: Address,
    },
    SweepToken {
        token: Address,
        amount_minimum: U256,
        recipient: Address,
    },
    SweepTokenWithFee {
        token: Address,
        amount_minimum: U256,
        recipient: Address,
        fee_bips: u32,
        fee_recipient: Address,
    },
    RefundSei,
}

/// Return value of a router entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterOutput {
    /// Amount received (exact input) or spent (exact output).
    Amount(U256),
    /// Payment helpers return nothing.
    Empty,
}

#[derive(Debug, Clone)]
pub struct SwapRouter {
    address: Address,
    config: PeripheryConfig,
    payments: Payments,
    /// Input of the last exact-output hop, read back after the callback chain.
    amount_in_cached: U256,
}

impl SwapRouter {
    pub fn new(address: Address, config: PeripheryConfig) -> Self {
        let payments = Payments::new(address, config.wsei);
        Self {
            address,
            config,
            payments,
            amount_in_cached: U256::MAX,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn factory(&self) -> Address {
        self.config.factory
    }

    pub fn wsei(&self) -> Address {
        self.config.wsei
    }

    pub fn payments(&self) -> &Payments {
        &self.payments
    }

    /// The zero address stands for the router itself.
    fn resolve_recipient(&self, recipient: Address) -> Address {
        if recipient.is_zero() {
            self.address
        } else {
            recipient
        }
    }

    fn pool_address(
        &self,
        token_a: Address,
        token_b: Address,
        fee: FeeAmount,
    ) -> Result<Address, PeripheryError> {
        let key = PoolKey::new(token_a, token_b, fee)?;
        Ok(compute_pool_address(self.config.factory, &key))
    }

    fn exact_input_internal(
        &mut self,
        world: &mut World,
        amount_in: U256,
        recipient: Address,
        sqrt_price_limit_x96: Option<U256>,
        data: SwapCallbackData,
    ) -> Result<U256, PeripheryError> {
        let recipient = self.resolve_recipient(recipient);
        let hop = data.path.decode_first_pool()?;
        let zero_for_one = hop.token_in < hop.token_out;
        let pool = self.pool_address(hop.token_in, hop.token_out, hop.fee)?;
        let limit = sqrt_price_limit_x96.unwrap_or_else(|| default_price_limit(zero_for_one));

        let (amount0, amount1) = world.swap(
            self.address,
            pool,
            recipient,
            zero_for_one,
            SwapAmount::ExactInput(amount_in),
            limit,
            &data,
            self,
        )?;
        let amount_out = if zero_for_one { amount1 } else { amount0 };
        debug!(pool = ?pool, amount_in = %amount_in, amount_out = %amount_out, "Exact input hop");
        Ok(amount_out.abs())
    }

    fn exact_output_internal(
        &mut self,
        world: &mut World,
        amount_out: U256,
        recipient: Address,
        sqrt_price_limit_x96: Option<U256>,
        data: SwapCallbackData,
    ) -> Result<U256, PeripheryError> {
        let recipient = self.resolve_recipient(recipient);
        // exact output paths run from the output token backwards
        let hop = data.path.decode_first_pool()?;
        let (token_out, token_in) = (hop.token_in, hop.token_out);
        let zero_for_one = token_in < token_out;
        let pool = self.pool_address(token_in, token_out, hop.fee)?;
        let limit = sqrt_price_limit_x96.unwrap_or_else(|| default_price_limit(zero_for_one));

        let (amount0, amount1) = world.swap(
            self.address,
            pool,
            recipient,
            zero_for_one,
            SwapAmount::ExactOutput(amount_out),
            limit,
            &data,
            self,
        )?;
        let (amount_in, amount_out_received) = if zero_for_one {
            (amount0.abs(), amount1.abs())
        } else {
            (amount1.abs(), amount0.abs())
        };
        // without a price limit the pool must deliver the full amount
        if sqrt_price_limit_x96.is_none() && amount_out_received != amount_out {
            return Err(PeripheryError::OutputNotReached);
        }
        debug!(pool = ?pool, amount_in = %amount_in, amount_out = %amount_out, "Exact output hop");
        Ok(amount_in)
    }

    /// Swaps `amount_in` of one token for as much as possible of another.
    pub fn exact_input_single(
        &mut self,
        world: &mut World,
        caller: Address,
        params: ExactInputSingleParams,
    ) -> Result<U256, PeripheryError> {
        check_deadline(world, params.deadline)?;
        let path = Path::encode(&[params.token_in, params.token_out], &[params.fee])?;
        let amount_out = self.exact_input_internal(
            world,
            params.amount_in,
            params.recipient,
            params.sqrt_price_limit_x96,
            SwapCallbackData {
                path,
                payer: caller,
            },
        )?;
        if amount_out < params.amount_out_minimum {
            return Err(PeripheryError::TooLittleReceived);
        }
        info!(
            token_in = ?params.token_in,
            token_out = ?params.token_out,
            amount_in = %params.amount_in,
            amount_out = %amount_out,
            "Exact input single swap"
        );
        Ok(amount_out)
    }

    /// Swaps `amount_in` along a path, paying each intermediate pool from
    /// the router's own balance.
    pub fn exact_input(
        &mut self,
        world: &mut World,
        caller: Address,
        params: ExactInputParams,
    ) -> Result<U256, PeripheryError> {
        check_deadline(world, params.deadline)?;
        let mut payer = caller;
        let mut path = params.path.clone();
        let mut amount = params.amount_in;

        loop {
            let has_multiple_pools = path.has_multiple_pools();
            let recipient = if has_multiple_pools {
                self.address
            } else {
                params.recipient
            };
            amount = self.exact_input_internal(
                world,
                amount,
                recipient,
                None,
                SwapCallbackData {
                    path: path.first_pool(),
                    payer,
                },
            )?;

            if !has_multiple_pools {
                break;
            }
            payer = self.address;
            path = path.skip_token()?;
        }

        if amount < params.amount_out_minimum {
            return Err(PeripheryError::TooLittleReceived);
        }
        info!(
            hops = params.path.num_pools(),
            amount_in = %params.amount_in,
            amount_out = %amount,
            "Exact input swap"
        );
        Ok(amount)
    }

    /// Buys exactly `amount_out`, spending at most `amount_in_maximum`.
    pub fn exact_output_single(
        &mut self,
        world: &mut World,
        caller: Address,
        params: ExactOutputSingleParams,
    ) -> Result<U256, PeripheryError> {
        check_deadline(world, params.deadline)?;
        let path = Path::encode(&[params.token_out, params.token_in], &[params.fee])?;
        let amount_in = self.exact_output_internal(
            world,
            params.amount_out,
            params.recipient,
            params.sqrt_price_limit_x96,
            SwapCallbackData {
                path,
                payer: caller,
            },
        )?;
        if amount_in > params.amount_in_maximum {
            return Err(PeripheryError::TooMuchRequested);
        }
        self.amount_in_cached = U256::MAX;
        info!(
            token_in = ?params.token_in,
            token_out = ?params.token_out,
            amount_in = %amount_in,
            amount_out = %params.amount_out,
            "Exact output single swap"
        );
        Ok(amount_in)
    }

    /// Buys exactly `amount_out` along a reversed path.
    pub fn exact_output(
        &mut self,
        world: &mut World,
        caller: Address,
        params: ExactOutputParams,
    ) -> Result<U256, PeripheryError> {
        check_deadline(world, params.deadline)?;
        self.exact_output_internal(
            world,
            params.amount_out,
            params.recipient,
            None,
            SwapCallbackData {
                path: params.path.clone(),
                payer: caller,
            },
        )?;

        let amount_in = self.amount_in_cached;
        self.amount_in_cached = U256::MAX;
        if amount_in > params.amount_in_maximum {
            return Err(PeripheryError::TooMuchRequested);
        }
        info!(
            hops = params.path.num_pools(),
            amount_in = %amount_in,
            amount_out = %params.amount_out,
            "Exact output swap"
        );
        Ok(amount_in)
    }

    /// Dispatches one entry point.
    pub fn call(
        &mut self,
        world: &mut World,
        caller: Address,
        call: RouterCall,
    ) -> Result<RouterOutput, PeripheryError> {
        let amount = match call {
            RouterCall::ExactInputSingle(params) => {
                self.exact_input_single(world, caller, params)?
            }
            RouterCall::ExactInput(params) => self.exact_input(world, caller, params)?,
            RouterCall::ExactOutputSingle(params) => {
                self.exact_output_single(world, caller, params)?
            }
            RouterCall::ExactOutput(params) => self.exact_output(world, caller, params)?,
            RouterCall::UnwrapWsei {
                amount_minimum,
                recipient,
            } => {
                self.payments.unwrap_wsei(world, amount_minimum, recipient)?;
                return Ok(RouterOutput::Empty);
            }
            RouterCall::UnwrapWseiWithFee {
                amount_minimum,
                recipient,
                fee_bips,
                fee_recipient,
            } => {
                self.payments.unwrap_wsei_with_fee(
                    world,
                    amount_minimum,
                    recipient,
                    fee_bips,
                    fee_recipient,
                )?;
                return Ok(RouterOutput::Empty);
            }
            RouterCall::SweepToken {
                token,
                amount_minimum,
                recipient,
            } => {
                self.payments
                    .sweep_token(world, token, amount_minimum, recipient)?;
                return Ok(RouterOutput::Empty);
            }
            RouterCall::SweepTokenWithFee {
                token,
                amount_minimum,
                recipient,
                fee_bips,
                fee_recipient,
            } => {
                self.payments.sweep_token_with_fee(
                    world,
                    token,
                    amount_minimum,
                    recipient,
                    fee_bips,
                    fee_recipient,
                )?;
                return Ok(RouterOutput::Empty);
            }
            RouterCall::RefundSei => {
                self.payments.refund_sei(world, caller)?;
                return Ok(RouterOutput::Empty);
            }
        };
        Ok(RouterOutput::Amount(amount))
    }

    /// Runs `calls` in order as one unit; the first failure undoes them all.
    pub fn multicall(
        &mut self,
        world: &mut World,
        caller: Address,
        calls: Vec<RouterCall>,
    ) -> Result<Vec<RouterOutput>, PeripheryError> {
        let saved = self.clone();
        let result = execute_batch(world, calls, |world, call| self.call(world, caller, call));
        if result.is_err() {
            *self = saved;
        }
        result
    }
}

impl SwapCallback for SwapRouter {
    type Data = SwapCallbackData;
    type Error = PeripheryError;

    fn swap_callback(
        &mut self,
        world: &mut World,
        pool: Address,
        amount0_delta: TokenDelta,
        amount1_delta: TokenDelta,
        data: &SwapCallbackData,
    ) -> Result<(), PeripheryError> {
        // swaps entirely within zero-liquidity regions are not supported
        if !amount0_delta.is_positive() && !amount1_delta.is_positive() {
            return Err(PeripheryError::ZeroAmount);
        }
        let hop = data.path.decode_first_pool()?;
        verify_callback(self.config.factory, hop.token_in, hop.token_out, hop.fee, pool)?;

        let (is_exact_input, amount_to_pay) = if amount0_delta.is_positive() {
            (hop.token_in < hop.token_out, amount0_delta.abs())
        } else {
            (hop.token_out < hop.token_in, amount1_delta.abs())
        };

        if is_exact_input {
            return self
                .payments
                .pay(world, hop.token_in, data.payer, pool, amount_to_pay);
        }

        if data.path.has_multiple_pools() {
            let next = SwapCallbackData {
                path: data.path.skip_token()?,
                payer: data.payer,
            };
            self.exact_output_internal(world, amount_to_pay, pool, None, next)?;
            Ok(())
        } else {
            self.amount_in_cached = amount_to_pay;
            // on the last hop of an exact output path token_out is the input
            self.payments
                .pay(world, hop.token_out, data.payer, pool, amount_to_pay)
        }
    }
}

/// Furthest price a swap may reach when the caller sets no limit.
fn default_price_limit(zero_for_one: bool) -> U256 {
    if zero_for_one {
        MIN_SQRT_RATIO + U256::one()
    } else {
        MAX_SQRT_RATIO - U256::one()
    }
}
