//! Legacy constant-product pairs.
//!
//! A pair's LP token is an ERC20 registered on the ledger at the pair's own
//! address. Deposits and withdrawals follow the "send first, then call"
//! pattern: tokens are transferred to the pair and `pair_mint`/`pair_burn`
//! settle against the recorded reserves.

use crate::error::ChainError;
use crate::event::{ChainEvent, EventData};
use crate::world::World;
use periphery_domain::math::constant_product::{
    MINIMUM_LIQUIDITY, burn_amounts, initial_liquidity, proportional_liquidity,
};
use periphery_domain::pool::compute_pair_address;
use periphery_domain::token::{Address, Token, sort_tokens};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyPair {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
}

impl World {
    /// Deploys the pair for `token_a`/`token_b` at its derived address.
    pub fn create_pair(&mut self, token_a: Address, token_b: Address) -> Result<Address, ChainError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        let factory = self.legacy_factory();
        let address = compute_pair_address(factory, token0, token1)?;
        if self.pairs.contains_key(&address) {
            return Err(ChainError::PairExists(address));
        }
        self.ledger
            .register_token(Token::new(address, "SLP", 18, "Legacy LP"));
        self.pairs.insert(
            address,
            LegacyPair {
                address,
                token0,
                token1,
                reserve0: U256::zero(),
                reserve1: U256::zero(),
            },
        );
        self.ledger.emit(ChainEvent::new(
            factory,
            EventData::PairCreated {
                token0,
                token1,
                pair: address,
            },
        ));
        info!(pair = ?address, "Created legacy pair");
        Ok(address)
    }

    pub fn get_pair(&self, token_a: Address, token_b: Address) -> Option<Address> {
        let address = compute_pair_address(self.legacy_factory(), token_a, token_b).ok()?;
        self.pairs.contains_key(&address).then_some(address)
    }

    pub fn pair(&self, address: Address) -> Result<&LegacyPair, ChainError> {
        self.pairs
            .get(&address)
            .ok_or(ChainError::PairNotFound(address))
    }

    /// Mints LP tokens to `to` for whatever was sent to the pair since the
    /// last sync. The first deposit locks `MINIMUM_LIQUIDITY` at the zero address.
    pub fn pair_mint(&mut self, pair: Address, to: Address) -> Result<U256, ChainError> {
        let state = self.pair(pair)?.clone();
        let balance0 = self.balance_of(state.token0, pair);
        let balance1 = self.balance_of(state.token1, pair);
        let amount0 = balance0.saturating_sub(state.reserve0);
        let amount1 = balance1.saturating_sub(state.reserve1);

        let total_supply = self.ledger.total_supply(pair);
        let liquidity = if total_supply.is_zero() {
            let liquidity = initial_liquidity(amount0, amount1)
                .map_err(|_| ChainError::InsufficientLiquidityMinted)?;
            self.ledger
                .mint(pair, Address::zero(), U256::from(MINIMUM_LIQUIDITY))?;
            liquidity
        } else {
            proportional_liquidity(amount0, amount1, state.reserve0, state.reserve1, total_supply)?
        };
        if liquidity.is_zero() {
            return Err(ChainError::InsufficientLiquidityMinted);
        }
        self.ledger.mint(pair, to, liquidity)?;
        self.sync_pair(pair, balance0, balance1);
        debug!(pair = ?pair, liquidity = %liquidity, "Legacy pair mint");
        Ok(liquidity)
    }

    /// Burns the LP tokens held by the pair itself and sends the underlying
    /// tokens to `to`. Returns the amounts in pair order.
    pub fn pair_burn(&mut self, pair: Address, to: Address) -> Result<(U256, U256), ChainError> {
        let state = self.pair(pair)?.clone();
        let balance0 = self.balance_of(state.token0, pair);
        let balance1 = self.balance_of(state.token1, pair);
        let liquidity = self.balance_of(pair, pair);
        let total_supply = self.ledger.total_supply(pair);

        let (amount0, amount1) = burn_amounts(liquidity, balance0, balance1, total_supply)?;
        if amount0.is_zero() || amount1.is_zero() {
            return Err(ChainError::InsufficientLiquidityBurned);
        }
        self.ledger.burn(pair, pair, liquidity)?;
        self.ledger.transfer(state.token0, pair, to, amount0)?;
        self.ledger.transfer(state.token1, pair, to, amount1)?;
        self.sync_pair(pair, balance0 - amount0, balance1 - amount1);
        debug!(
            pair = ?pair,
            liquidity = %liquidity,
            amount0 = %amount0,
            amount1 = %amount1,
            "Legacy pair burn"
        );
        Ok((amount0, amount1))
    }

    fn sync_pair(&mut self, pair: Address, reserve0: U256, reserve1: U256) {
        if let Some(state) = self.pairs.get_mut(&pair) {
            state.reserve0 = reserve0;
            state.reserve1 = reserve1;
        }
        self.ledger
            .emit(ChainEvent::new(pair, EventData::Sync { reserve0, reserve1 }));
    }
}
