//! Initialized ticks of a pool.
//!
//! A tick is initialized exactly when it has an entry in the table. Searches
//! for the next initialized tick are bounded to one 256-tick word of the
//! compressed tick space, the same granularity as an on-chain tick bitmap,
//! so swaps are split into the same steps and round identically.

use crate::error::ChainError;
use periphery_domain::math::liquidity_math::add_delta;
use primitive_types::U256;
use std::collections::BTreeMap;

/// Per-tick liquidity and fee accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInfo {
    /// Total liquidity referencing this tick.
    pub liquidity_gross: u128,
    /// Liquidity added when crossing left to right.
    pub liquidity_net: i128,
    /// Fee growth on the other side of this tick relative to the current tick.
    pub fee_growth_outside0_x128: U256,
    pub fee_growth_outside1_x128: U256,
}

#[derive(Debug, Clone, Default)]
pub struct TickTable {
    ticks: BTreeMap<i32, TickInfo>,
}

impl TickTable {
    pub fn get(&self, tick: i32) -> Option<&TickInfo> {
        self.ticks.get(&tick)
    }

    pub fn is_initialized(&self, tick: i32) -> bool {
        self.ticks.contains_key(&tick)
    }

    /// Adds `liquidity_delta` at `tick` and reports whether the tick flipped
    /// between initialized and uninitialized.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        fee_growth_global0_x128: U256,
        fee_growth_global1_x128: U256,
        upper: bool,
        max_liquidity: u128,
    ) -> Result<bool, ChainError> {
        let mut info = self.ticks.get(&tick).cloned().unwrap_or_default();
        let gross_before = info.liquidity_gross;
        let gross_after = add_delta(gross_before, liquidity_delta)?;
        if gross_after > max_liquidity {
            return Err(ChainError::TickLiquidityOverflow);
        }

        let flipped = (gross_after == 0) != (gross_before == 0);

        if gross_before == 0 && tick <= tick_current {
            // all growth so far happened below the tick
            info.fee_growth_outside0_x128 = fee_growth_global0_x128;
            info.fee_growth_outside1_x128 = fee_growth_global1_x128;
        }

        info.liquidity_gross = gross_after;
        info.liquidity_net = if upper {
            info.liquidity_net.checked_sub(liquidity_delta)
        } else {
            info.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(ChainError::TickLiquidityOverflow)?;

        self.ticks.insert(tick, info);
        Ok(flipped)
    }

    pub fn clear(&mut self, tick: i32) {
        self.ticks.remove(&tick);
    }

    /// Flips the outside fee growth of `tick` and returns its net liquidity.
    pub fn cross(
        &mut self,
        tick: i32,
        fee_growth_global0_x128: U256,
        fee_growth_global1_x128: U256,
    ) -> i128 {
        match self.ticks.get_mut(&tick) {
            Some(info) => {
                info.fee_growth_outside0_x128 = fee_growth_global0_x128
                    .overflowing_sub(info.fee_growth_outside0_x128)
                    .0;
                info.fee_growth_outside1_x128 = fee_growth_global1_x128
                    .overflowing_sub(info.fee_growth_outside1_x128)
                    .0;
                info.liquidity_net
            }
            None => 0,
        }
    }

    /// Fee growth per unit of liquidity accumulated inside `[lower, upper)`.
    pub fn fee_growth_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        tick_current: i32,
        fee_growth_global0_x128: U256,
        fee_growth_global1_x128: U256,
    ) -> (U256, U256) {
        let lower = self.ticks.get(&tick_lower).cloned().unwrap_or_default();
        let upper = self.ticks.get(&tick_upper).cloned().unwrap_or_default();

        let (below0, below1) = if tick_current >= tick_lower {
            (lower.fee_growth_outside0_x128, lower.fee_growth_outside1_x128)
        } else {
            (
                fee_growth_global0_x128
                    .overflowing_sub(lower.fee_growth_outside0_x128)
                    .0,
                fee_growth_global1_x128
                    .overflowing_sub(lower.fee_growth_outside1_x128)
                    .0,
            )
        };
        let (above0, above1) = if tick_current < tick_upper {
            (upper.fee_growth_outside0_x128, upper.fee_growth_outside1_x128)
        } else {
            (
                fee_growth_global0_x128
                    .overflowing_sub(upper.fee_growth_outside0_x128)
                    .0,
                fee_growth_global1_x128
                    .overflowing_sub(upper.fee_growth_outside1_x128)
                    .0,
            )
        };

        (
            fee_growth_global0_x128
                .overflowing_sub(below0)
                .0
                .overflowing_sub(above0)
                .0,
            fee_growth_global1_x128
                .overflowing_sub(below1)
                .0
                .overflowing_sub(above1)
                .0,
        )
    }

    /// Next initialized tick at or below (`lte`) or strictly above `tick`,
    /// searching at most to the edge of the current bitmap word. Returns the
    /// word edge and `false` when nothing is initialized there.
    pub fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        tick_spacing: i32,
        lte: bool,
    ) -> (i32, bool) {
        let mut compressed = tick / tick_spacing;
        if tick < 0 && tick % tick_spacing != 0 {
            compressed -= 1;
        }

        if lte {
            let word_start = compressed - compressed.rem_euclid(256);
            let found = self
                .ticks
                .range(word_start * tick_spacing..=compressed * tick_spacing)
                .next_back()
                .map(|(tick, _)| *tick);
            match found {
                Some(next) => (next, true),
                None => (word_start * tick_spacing, false),
            }
        } else {
            let start = compressed + 1;
            let word_end = start + (255 - start.rem_euclid(256));
            let found = self
                .ticks
                .range(start * tick_spacing..=word_end * tick_spacing)
                .next()
                .map(|(tick, _)| *tick);
            match found {
                Some(next) => (next, true),
                None => (word_end * tick_spacing, false),
            }
        }
    }
}
