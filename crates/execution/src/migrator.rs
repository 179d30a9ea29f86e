//! Migration of legacy pair liquidity into concentrated-liquidity positions.

use crate::config::PeripheryConfig;
use crate::error::PeripheryError;
use crate::multicall::execute_batch;
use crate::pool_initializer::create_and_initialize_pool_if_necessary;
use crate::position_manager::{MintResult, PositionManager};
use periphery_domain::error::DomainError;
use periphery_domain::fees::FeeAmount;
use periphery_domain::params::{MigrateParams, MintParams};
use periphery_domain::token::Address;
use periphery_simulation::world::World;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One migrator entry point, as composed in a multicall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigratorCall {
    CreateAndInitializePoolIfNecessary {
        token0: Address,
        token1: Address,
        fee: FeeAmount,
        sqrt_price_x96: U256,
    },
    Migrate(MigrateParams),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigratorOutput {
    Pool(Address),
    Migrated(MintResult),
}

#[derive(Debug, Clone)]
pub struct Migrator {
    address: Address,
    config: PeripheryConfig,
}

impl Migrator {
    pub fn new(address: Address, config: PeripheryConfig) -> Self {
        Self { address, config }
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

    pub fn create_and_initialize_pool_if_necessary(
        &self,
        world: &mut World,
        token0: Address,
        token1: Address,
        fee: FeeAmount,
        sqrt_price_x96: U256,
    ) -> Result<Address, PeripheryError> {
        create_and_initialize_pool_if_necessary(world, token0, token1, fee, sqrt_price_x96)
    }

    /// Burns `liquidity_to_migrate` of the caller's LP tokens, deposits the
    /// requested share of the proceeds into a new position for
    /// `params.recipient` and refunds everything not deposited.
    pub fn migrate(
        &self,
        world: &mut World,
        manager: &mut PositionManager,
        caller: Address,
        params: MigrateParams,
    ) -> Result<MintResult, PeripheryError> {
        if params.percentage_to_migrate == 0 {
            return Err(PeripheryError::PercentageTooSmall);
        }
        if params.percentage_to_migrate > 100 {
            return Err(PeripheryError::PercentageTooLarge);
        }

        let pair = world.pair(params.pair)?.clone();
        world.ledger_mut().transfer_from(
            pair.address,
            self.address,
            caller,
            pair.address,
            params.liquidity_to_migrate,
        )?;
        let (burned0, burned1) = world.pair_burn(pair.address, self.address)?;
        let (amount0, amount1) = if pair.token0 == params.token0 {
            (burned0, burned1)
        } else {
            (burned1, burned0)
        };

        let percentage = U256::from(params.percentage_to_migrate);
        let hundred = U256::from(100);
        let amount0_to_migrate = amount0
            .checked_mul(percentage)
            .ok_or(DomainError::Overflow)?
            / hundred;
        let amount1_to_migrate = amount1
            .checked_mul(percentage)
            .ok_or(DomainError::Overflow)?
            / hundred;

        let spender = manager.address();
        world
            .ledger_mut()
            .approve(params.token0, self.address, spender, amount0_to_migrate)?;
        world
            .ledger_mut()
            .approve(params.token1, self.address, spender, amount1_to_migrate)?;

        let minted = manager.mint(
            world,
            self.address,
            MintParams {
                token0: params.token0,
                token1: params.token1,
                fee: params.fee,
                tick_lower: params.tick_lower,
                tick_upper: params.tick_upper,
                amount0_desired: amount0_to_migrate,
                amount1_desired: amount1_to_migrate,
                amount0_min: params.amount0_min,
                amount1_min: params.amount1_min,
                recipient: params.recipient,
                deadline: params.deadline,
            },
        )?;

        self.settle_remainder(
            world,
            spender,
            params.token0,
            amount0,
            amount0_to_migrate,
            minted.amount0,
            &params,
        )?;
        self.settle_remainder(
            world,
            spender,
            params.token1,
            amount1,
            amount1_to_migrate,
            minted.amount1,
            &params,
        )?;

        info!(
            pair = ?pair.address,
            token_id = minted.token_id,
            liquidity = minted.liquidity,
            percentage = params.percentage_to_migrate,
            "Migrated legacy liquidity"
        );
        Ok(minted)
    }

    /// Clears the manager's leftover allowance and refunds what was burned
    /// but not deposited.
    #[allow(clippy::too_many_arguments)]
    fn settle_remainder(
        &self,
        world: &mut World,
        spender: Address,
        token: Address,
        burned: U256,
        to_migrate: U256,
        deposited: U256,
        params: &MigrateParams,
    ) -> Result<(), PeripheryError> {
        if deposited >= burned {
            return Ok(());
        }
        if deposited < to_migrate {
            world
                .ledger_mut()
                .approve(token, self.address, spender, U256::zero())?;
        }

        let refund = burned - deposited;
        if params.refund_as_sei && token == self.config.wsei {
            world.wsei_withdraw(self.address, refund)?;
            world.send_native(self.address, params.recipient, refund)?;
        } else {
            world
                .ledger_mut()
                .transfer(token, self.address, params.recipient, refund)?;
        }
        debug!(token = ?token, refund = %refund, "Refunded unmigrated amount");
        Ok(())
    }

    /// Dispatches one entry point.
    pub fn call(
        &self,
        world: &mut World,
        manager: &mut PositionManager,
        caller: Address,
        call: MigratorCall,
    ) -> Result<MigratorOutput, PeripheryError> {
        match call {
            MigratorCall::CreateAndInitializePoolIfNecessary {
                token0,
                token1,
                fee,
                sqrt_price_x96,
            } => self
                .create_and_initialize_pool_if_necessary(world, token0, token1, fee, sqrt_price_x96)
                .map(MigratorOutput::Pool),
            MigratorCall::Migrate(params) => self
                .migrate(world, manager, caller, params)
                .map(MigratorOutput::Migrated),
        }
    }

    /// Runs `calls` in order as one unit; the first failure undoes them all.
    pub fn multicall(
        &self,
        world: &mut World,
        manager: &mut PositionManager,
        caller: Address,
        calls: Vec<MigratorCall>,
    ) -> Result<Vec<MigratorOutput>, PeripheryError> {
        let saved = manager.clone();
        let result = execute_batch(world, calls, |world, call| {
            self.call(world, manager, caller, call)
        });
        if result.is_err() {
            *manager = saved;
        }
        result
    }
}
