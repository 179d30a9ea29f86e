//! Reference deployment used by the integration tests and the CLI demo.
//!
//! Three test tokens sorted by address, a funded wallet that provides
//! liquidity, and a trader. Pools are created at a 1:1 price with
//! full-range liquidity of 1,000,000 on each side.

use crate::config::{DEFAULT_NATIVE_LABEL, PeripheryConfig};
use crate::error::PeripheryError;
use crate::periphery::Periphery;
use crate::pool_initializer::create_and_initialize_pool_if_necessary;
use periphery_domain::fees::FeeAmount;
use periphery_domain::math::price_tick::encode_price_sqrt;
use periphery_domain::math::tick_math::{max_usable_tick, min_usable_tick};
use periphery_domain::params::{MintParams, NO_DEADLINE};
use periphery_domain::token::{Address, sort_tokens};
use periphery_simulation::world::World;
use primitive_types::U256;

/// Liquidity added on each side of a fixture pool.
pub const POOL_LIQUIDITY: u64 = 1_000_000;
/// Amount of each token the trader starts with.
pub const TRADER_BALANCE: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct CompleteFixture {
    pub periphery: Periphery,
    /// Liquidity provider holding the token supplies.
    pub wallet: Address,
    pub trader: Address,
    /// Test tokens in ascending address order.
    pub tokens: [Address; 3],
}

impl CompleteFixture {
    pub fn new() -> Result<Self, PeripheryError> {
        Self::with_native_label(DEFAULT_NATIVE_LABEL)
    }

    /// Fixture whose position metadata renders WSEI as `native_label`.
    pub fn with_native_label(native_label: &str) -> Result<Self, PeripheryError> {
        let mut world = World::new();
        let wallet = world.create_account();
        let trader = world.create_account();
        let native = U256::exp10(30);
        world.ledger_mut().credit_native(wallet, native);
        world.ledger_mut().credit_native(trader, native);

        let supply = U256::MAX / U256::from(2);
        let mut tokens = [
            world.deploy_token("TEST", 18, supply, wallet)?,
            world.deploy_token("TEST", 18, supply, wallet)?,
            world.deploy_token("TEST", 18, supply, wallet)?,
        ];
        tokens.sort();

        let config = PeripheryConfig::from_world(&world).with_native_label(native_label);
        let mut periphery = Periphery::with_config(world, config);
        let router = periphery.router().address();
        let manager = periphery.manager().address();
        let wsei = periphery.world().wsei();

        let ledger = periphery.world_mut().ledger_mut();
        for token in tokens.iter().copied().chain([wsei]) {
            for owner in [wallet, trader] {
                ledger.approve(token, owner, router, U256::MAX)?;
                ledger.approve(token, owner, manager, U256::MAX)?;
            }
        }
        for token in tokens {
            ledger.transfer(token, wallet, trader, U256::from(TRADER_BALANCE))?;
        }

        Ok(Self {
            periphery,
            wallet,
            trader,
            tokens,
        })
    }

    pub fn wsei(&self) -> Address {
        self.periphery.world().wsei()
    }

    pub fn router(&self) -> Address {
        self.periphery.router().address()
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.periphery.world().balance_of(token, owner)
    }

    /// Creates the medium-fee pool for the two tokens at 1:1 and adds
    /// full-range liquidity from the wallet. Returns the pool address.
    pub fn create_pool(
        &mut self,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, PeripheryError> {
        let (token0, token1) = sort_tokens(token_a, token_b)?;
        let fee = FeeAmount::Medium;
        let world = self.periphery.world_mut();
        let pool = create_and_initialize_pool_if_necessary(
            world,
            token0,
            token1,
            fee,
            encode_price_sqrt(1, 1)?,
        )?;

        let spacing = fee.tick_spacing();
        let liquidity = U256::from(POOL_LIQUIDITY);
        self.periphery.mint(
            self.wallet,
            U256::zero(),
            MintParams {
                token0,
                token1,
                fee,
                tick_lower: min_usable_tick(spacing),
                tick_upper: max_usable_tick(spacing),
                amount0_desired: liquidity,
                amount1_desired: liquidity,
                amount0_min: U256::zero(),
                amount1_min: U256::zero(),
                recipient: self.wallet,
                deadline: NO_DEADLINE,
            },
        )?;
        Ok(pool)
    }

    /// Like [`CompleteFixture::create_pool`] against WSEI, wrapping the
    /// wallet's native currency first.
    pub fn create_pool_wsei(&mut self, token: Address) -> Result<Address, PeripheryError> {
        let wallet = self.wallet;
        self.periphery
            .world_mut()
            .wsei_deposit(wallet, U256::from(POOL_LIQUIDITY))?;
        let wsei = self.wsei();
        self.create_pool(wsei, token)
    }
}
