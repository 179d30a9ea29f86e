//! Concentrated-liquidity pool state.
//!
//! [`ConcentratedPool`] holds the price, the active liquidity, initialized
//! ticks and per-owner positions, and implements the pure state transitions.
//! Token movements and callbacks are driven by [`crate::world::World`].

use crate::error::ChainError;
use crate::tick::{TickInfo, TickTable};
use periphery_domain::error::DomainError;
use periphery_domain::math::full_math::mul_div;
use periphery_domain::math::liquidity_math::add_delta;
use periphery_domain::math::q128;
use periphery_domain::math::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use periphery_domain::math::swap_math::compute_swap_step;
use periphery_domain::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, get_sqrt_ratio_at_tick,
    get_tick_at_sqrt_ratio, max_liquidity_per_tick,
};
use periphery_domain::pool::PoolKey;
use periphery_domain::position::{PositionKey, fees_owed};
use periphery_domain::token::Address;
use periphery_domain::value_objects::TokenDelta;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current price, tick and reentrancy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    pub sqrt_price_x96: U256,
    pub tick: i32,
    /// False before initialization and while a callback is running.
    pub unlocked: bool,
}

/// Liquidity owned by one address over one tick range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionInfo {
    pub liquidity: u128,
    pub fee_growth_inside0_last_x128: U256,
    pub fee_growth_inside1_last_x128: U256,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

/// Amount a swap is specified in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapAmount {
    /// Spend exactly this much of the input token.
    ExactInput(U256),
    /// Receive exactly this much of the output token.
    ExactOutput(U256),
}

impl SwapAmount {
    pub fn value(&self) -> U256 {
        match self {
            SwapAmount::ExactInput(amount) | SwapAmount::ExactOutput(amount) => *amount,
        }
    }

    pub fn is_exact_input(&self) -> bool {
        matches!(self, SwapAmount::ExactInput(_))
    }
}

#[derive(Debug, Clone)]
pub struct ConcentratedPool {
    address: Address,
    key: PoolKey,
    tick_spacing: i32,
    max_liquidity_per_tick: u128,
    slot0: Slot0,
    fee_growth_global0_x128: U256,
    fee_growth_global1_x128: U256,
    liquidity: u128,
    ticks: TickTable,
    positions: HashMap<PositionKey, PositionInfo>,
}

impl ConcentratedPool {
    pub fn new(address: Address, key: PoolKey) -> Self {
        let tick_spacing = key.fee.tick_spacing();
        Self {
            address,
            key,
            tick_spacing,
            max_liquidity_per_tick: max_liquidity_per_tick(tick_spacing),
            slot0: Slot0 {
                sqrt_price_x96: U256::zero(),
                tick: 0,
                unlocked: false,
            },
            fee_growth_global0_x128: U256::zero(),
            fee_growth_global1_x128: U256::zero(),
            liquidity: 0,
            ticks: TickTable::default(),
            positions: HashMap::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn key(&self) -> &PoolKey {
        &self.key
    }

    pub fn tick_spacing(&self) -> i32 {
        self.tick_spacing
    }

    pub fn slot0(&self) -> Slot0 {
        self.slot0
    }

    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    pub fn fee_growth_global0_x128(&self) -> U256 {
        self.fee_growth_global0_x128
    }

    pub fn fee_growth_global1_x128(&self) -> U256 {
        self.fee_growth_global1_x128
    }

    pub fn tick(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(tick)
    }

    /// Position state; an unknown key reads as empty.
    pub fn position(&self, key: &PositionKey) -> PositionInfo {
        self.positions.get(key).cloned().unwrap_or_default()
    }

    pub fn is_initialized(&self) -> bool {
        !self.slot0.sqrt_price_x96.is_zero()
    }

    /// Sets the starting price. Can only be done once.
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<i32, ChainError> {
        if self.is_initialized() {
            return Err(ChainError::AlreadyInitialized);
        }
        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
        self.slot0 = Slot0 {
            sqrt_price_x96,
            tick,
            unlocked: true,
        };
        Ok(tick)
    }

    /// Takes the reentrancy lock.
    pub fn lock(&mut self) -> Result<(), ChainError> {
        if !self.is_initialized() {
            return Err(ChainError::PoolNotInitialized(self.address));
        }
        if !self.slot0.unlocked {
            return Err(ChainError::Locked);
        }
        self.slot0.unlocked = false;
        Ok(())
    }

    pub fn unlock(&mut self) {
        self.slot0.unlocked = true;
    }

    fn check_ticks(&self, tick_lower: i32, tick_upper: i32) -> Result<(), ChainError> {
        if tick_lower >= tick_upper {
            return Err(ChainError::TickOrder);
        }
        if tick_lower < MIN_TICK {
            return Err(ChainError::TickLowerTooLow);
        }
        if tick_upper > MAX_TICK {
            return Err(ChainError::TickUpperTooHigh);
        }
        for tick in [tick_lower, tick_upper] {
            if tick % self.tick_spacing != 0 {
                return Err(ChainError::TickNotSpaced {
                    tick,
                    spacing: self.tick_spacing,
                });
            }
        }
        Ok(())
    }

    /// Applies a liquidity change to a position and returns the token
    /// amounts it is worth: owed to the pool when adding (rounded up), owed
    /// to the owner when removing (rounded down).
    pub fn modify_position(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
    ) -> Result<(U256, U256), ChainError> {
        self.check_ticks(tick_lower, tick_upper)?;
        self.update_position(owner, tick_lower, tick_upper, liquidity_delta)?;

        if liquidity_delta == 0 {
            return Ok((U256::zero(), U256::zero()));
        }

        let magnitude = liquidity_delta.unsigned_abs();
        let round_up = liquidity_delta > 0;
        let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;
        let current = self.slot0;

        let amounts = if current.tick < tick_lower {
            (
                get_amount0_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
                U256::zero(),
            )
        } else if current.tick < tick_upper {
            let amount0 =
                get_amount0_delta(current.sqrt_price_x96, sqrt_upper, magnitude, round_up)?;
            let amount1 =
                get_amount1_delta(sqrt_lower, current.sqrt_price_x96, magnitude, round_up)?;
            self.liquidity = add_delta(self.liquidity, liquidity_delta)?;
            (amount0, amount1)
        } else {
            (
                U256::zero(),
                get_amount1_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
            )
        };
        Ok(amounts)
    }

    fn update_position(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
    ) -> Result<(), ChainError> {
        let key = PositionKey::new(owner, tick_lower, tick_upper);
        let mut position = self.position(&key);
        if liquidity_delta == 0 && position.liquidity == 0 {
            return Err(ChainError::NoPosition);
        }

        let tick = self.slot0.tick;
        let global0 = self.fee_growth_global0_x128;
        let global1 = self.fee_growth_global1_x128;

        let mut flipped_lower = false;
        let mut flipped_upper = false;
        if liquidity_delta != 0 {
            flipped_lower = self.ticks.update(
                tick_lower,
                tick,
                liquidity_delta,
                global0,
                global1,
                false,
                self.max_liquidity_per_tick,
            )?;
            flipped_upper = self.ticks.update(
                tick_upper,
                tick,
                liquidity_delta,
                global0,
                global1,
                true,
                self.max_liquidity_per_tick,
            )?;
        }

        let (inside0, inside1) =
            self.ticks
                .fee_growth_inside(tick_lower, tick_upper, tick, global0, global1);

        let owed0 = fees_owed(inside0, position.fee_growth_inside0_last_x128, position.liquidity);
        let owed1 = fees_owed(inside1, position.fee_growth_inside1_last_x128, position.liquidity);
        if liquidity_delta != 0 {
            position.liquidity = add_delta(position.liquidity, liquidity_delta)?;
        }
        position.fee_growth_inside0_last_x128 = inside0;
        position.fee_growth_inside1_last_x128 = inside1;
        position.tokens_owed0 = position.tokens_owed0.wrapping_add(owed0);
        position.tokens_owed1 = position.tokens_owed1.wrapping_add(owed1);
        self.positions.insert(key, position);

        if liquidity_delta < 0 {
            if flipped_lower {
                self.ticks.clear(tick_lower);
            }
            if flipped_upper {
                self.ticks.clear(tick_upper);
            }
        }
        Ok(())
    }

    /// Adds burned amounts to what the position may collect.
    pub fn credit_owed(&mut self, key: &PositionKey, amount0: U256, amount1: U256) {
        if let Some(position) = self.positions.get_mut(key) {
            position.tokens_owed0 = position.tokens_owed0.wrapping_add(amount0.low_u128());
            position.tokens_owed1 = position.tokens_owed1.wrapping_add(amount1.low_u128());
        }
    }

    /// Removes up to the requested amounts from what the position is owed.
    pub fn take_owed(&mut self, key: &PositionKey, requested0: u128, requested1: u128) -> (u128, u128) {
        match self.positions.get_mut(key) {
            Some(position) => {
                let amount0 = requested0.min(position.tokens_owed0);
                let amount1 = requested1.min(position.tokens_owed1);
                position.tokens_owed0 -= amount0;
                position.tokens_owed1 -= amount1;
                (amount0, amount1)
            }
            None => (0, 0),
        }
    }

    /// Moves the price, crossing initialized ticks, and returns the token
    /// deltas from the pool's point of view.
    ///
    /// Takes the reentrancy lock; the caller releases it after settlement.
    pub fn swap(
        &mut self,
        zero_for_one: bool,
        amount: SwapAmount,
        sqrt_price_limit_x96: U256,
    ) -> Result<(TokenDelta, TokenDelta), ChainError> {
        let amount_specified = amount.value();
        if amount_specified.is_zero() {
            return Err(ChainError::ZeroAmountSpecified);
        }
        let start = self.slot0;
        if !self.is_initialized() {
            return Err(ChainError::PoolNotInitialized(self.address));
        }
        if !start.unlocked {
            return Err(ChainError::Locked);
        }
        let limit_ok = if zero_for_one {
            sqrt_price_limit_x96 < start.sqrt_price_x96 && sqrt_price_limit_x96 > MIN_SQRT_RATIO
        } else {
            sqrt_price_limit_x96 > start.sqrt_price_x96 && sqrt_price_limit_x96 < MAX_SQRT_RATIO
        };
        if !limit_ok {
            return Err(ChainError::PriceLimit);
        }

        self.slot0.unlocked = false;
        let result = self.run_swap(zero_for_one, amount, sqrt_price_limit_x96);
        if result.is_err() {
            self.slot0.unlocked = true;
        }
        result
    }

    fn run_swap(
        &mut self,
        zero_for_one: bool,
        amount: SwapAmount,
        sqrt_price_limit_x96: U256,
    ) -> Result<(TokenDelta, TokenDelta), ChainError> {
        let exact_input = amount.is_exact_input();
        let amount_specified = amount.value();
        let fee = self.key.fee.pips();

        let mut remaining = amount_specified;
        let mut calculated = U256::zero();
        let mut sqrt_price = self.slot0.sqrt_price_x96;
        let mut tick = self.slot0.tick;
        let mut liquidity = self.liquidity;
        let mut fee_growth_global = if zero_for_one {
            self.fee_growth_global0_x128
        } else {
            self.fee_growth_global1_x128
        };

        while !remaining.is_zero() && sqrt_price != sqrt_price_limit_x96 {
            let step_start = sqrt_price;
            let (tick_next, initialized) = self.ticks.next_initialized_tick_within_one_word(
                tick,
                self.tick_spacing,
                zero_for_one,
            );
            let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
            let sqrt_price_next = get_sqrt_ratio_at_tick(tick_next)?;

            let beyond_limit = if zero_for_one {
                sqrt_price_next < sqrt_price_limit_x96
            } else {
                sqrt_price_next > sqrt_price_limit_x96
            };
            let target = if beyond_limit {
                sqrt_price_limit_x96
            } else {
                sqrt_price_next
            };

            let step =
                compute_swap_step(sqrt_price, target, liquidity, remaining, exact_input, fee)?;
            sqrt_price = step.sqrt_price_next_x96;

            if exact_input {
                remaining = remaining
                    .checked_sub(step.amount_in + step.fee_amount)
                    .ok_or(DomainError::Overflow)?;
                calculated = calculated
                    .checked_add(step.amount_out)
                    .ok_or(DomainError::Overflow)?;
            } else {
                remaining = remaining
                    .checked_sub(step.amount_out)
                    .ok_or(DomainError::Overflow)?;
                calculated = calculated
                    .checked_add(step.amount_in + step.fee_amount)
                    .ok_or(DomainError::Overflow)?;
            }

            if liquidity > 0 {
                let growth = mul_div(step.fee_amount, q128(), U256::from(liquidity))?;
                fee_growth_global = fee_growth_global.overflowing_add(growth).0;
            }

            if sqrt_price == sqrt_price_next {
                if initialized {
                    let (global0, global1) = if zero_for_one {
                        (fee_growth_global, self.fee_growth_global1_x128)
                    } else {
                        (self.fee_growth_global0_x128, fee_growth_global)
                    };
                    let mut liquidity_net = self.ticks.cross(tick_next, global0, global1);
                    if zero_for_one {
                        liquidity_net = -liquidity_net;
                    }
                    liquidity = add_delta(liquidity, liquidity_net)?;
                }
                tick = if zero_for_one { tick_next - 1 } else { tick_next };
            } else if sqrt_price != step_start {
                tick = get_tick_at_sqrt_ratio(sqrt_price)?;
            }
        }

        self.slot0.sqrt_price_x96 = sqrt_price;
        self.slot0.tick = tick;
        self.liquidity = liquidity;
        if zero_for_one {
            self.fee_growth_global0_x128 = fee_growth_global;
        } else {
            self.fee_growth_global1_x128 = fee_growth_global;
        }

        let (amount_in, amount_out) = if exact_input {
            (amount_specified - remaining, calculated)
        } else {
            (calculated, amount_specified - remaining)
        };
        Ok(if zero_for_one {
            (TokenDelta::Owed(amount_in), TokenDelta::Paid(amount_out))
        } else {
            (TokenDelta::Paid(amount_out), TokenDelta::Owed(amount_in))
        })
    }
}
