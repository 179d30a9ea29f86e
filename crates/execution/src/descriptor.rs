//! Human-readable metadata for position tokens.
//!
//! Prices are quoted so that WSEI, when present, is the quote token. Other
//! pairs keep the pool's token order: token1 quoted in token0.

use crate::error::PeripheryError;
use crate::position_manager::PositionManager;
use periphery_domain::math::tick_math::{max_usable_tick, min_usable_tick};
use periphery_domain::pool::compute_pool_address;
use periphery_domain::token::Address;
use periphery_domain::value_objects::Price;
use periphery_simulation::world::World;
use serde::{Deserialize, Serialize};

const NAME_PREFIX: &str = "Concentrated Liquidity";

/// Ratio priority of the wrapped native token.
pub const WSEI_PRIORITY: i32 = -100;

/// Token metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionDescriptor {
    wsei: Address,
    native_label: String,
}

impl PositionDescriptor {
    pub fn new(wsei: Address, native_label: impl Into<String>) -> Self {
        Self {
            wsei,
            native_label: native_label.into(),
        }
    }

    pub fn native_label(&self) -> &str {
        &self.native_label
    }

    pub fn token_ratio_priority(&self, token: Address) -> i32 {
        if token == self.wsei { WSEI_PRIORITY } else { 0 }
    }

    /// True when prices of the pool are shown as token0 per token1.
    pub fn flip_ratio(&self, token0: Address, token1: Address) -> bool {
        self.token_ratio_priority(token0) > self.token_ratio_priority(token1)
    }

    fn symbol(&self, world: &World, token: Address) -> String {
        if token == self.wsei {
            return self.native_label.clone();
        }
        world
            .ledger()
            .token(token)
            .map(|meta| meta.symbol.clone())
            .unwrap_or_else(|| format!("{token:?}"))
    }

    pub fn token_metadata(
        &self,
        world: &World,
        manager: &PositionManager,
        token_id: u64,
    ) -> Result<TokenMetadata, PeripheryError> {
        let position = manager.positions(token_id)?;
        let key = position.pool_key();
        let pool = compute_pool_address(manager.factory(), &key);
        let spacing = key.fee.tick_spacing();

        let flip = self.flip_ratio(key.token0, key.token1);
        let (quote, base) = if flip {
            (key.token0, key.token1)
        } else {
            (key.token1, key.token0)
        };
        let quote_symbol = self.symbol(world, quote);
        let base_symbol = self.symbol(world, base);

        let (lower, upper) = if flip {
            (
                tick_label(position.tick_upper, spacing, flip)?,
                tick_label(position.tick_lower, spacing, flip)?,
            )
        } else {
            (
                tick_label(position.tick_lower, spacing, flip)?,
                tick_label(position.tick_upper, spacing, flip)?,
            )
        };
        let fee = key.fee.percent_label();

        let name = format!("{NAME_PREFIX} - {fee} - {quote_symbol}/{base_symbol} - {lower}<>{upper}");
        let description = format!(
            "This token represents a liquidity position in a {NAME_PREFIX} {quote_symbol}-{base_symbol} pool. \
             The owner of this token can modify or redeem the position.\n\
             \n\
             Pool Address: {pool:?}\n\
             {quote_symbol} Address: {quote:?}\n\
             {base_symbol} Address: {base:?}\n\
             Fee Tier: {fee}\n\
             Token ID: {token_id}"
        );
        Ok(TokenMetadata { name, description })
    }

    /// Metadata of `token_id` as a JSON document.
    pub fn token_uri(
        &self,
        world: &World,
        manager: &PositionManager,
        token_id: u64,
    ) -> Result<String, PeripheryError> {
        let metadata = self.token_metadata(world, manager, token_id)?;
        Ok(serde_json::to_string(&metadata).unwrap_or_default())
    }
}

/// Price at `tick` in display order, or `MIN`/`MAX` at the usable edges.
fn tick_label(tick: i32, tick_spacing: i32, flip: bool) -> Result<String, PeripheryError> {
    if tick == min_usable_tick(tick_spacing) {
        return Ok(if flip { "MAX" } else { "MIN" }.to_string());
    }
    if tick == max_usable_tick(tick_spacing) {
        return Ok(if flip { "MIN" } else { "MAX" }.to_string());
    }
    let price = Price::from_tick(tick)?;
    Ok(if flip { price.invert() } else { price }.to_string())
}
