//! Position manager: concentrated-liquidity positions held as transferable
//! tokens.
//!
//! The manager owns every pool position it creates and tracks, per token id,
//! the liquidity, the fee checkpoint and the tokens owed. Ownership and
//! approvals follow ERC721: the owner, the token's approved operator and any
//! operator approved for all of the owner's tokens may manage a position.

use crate::config::PeripheryConfig;
use crate::error::PeripheryError;
use crate::multicall::execute_batch;
use crate::payments::Payments;
use crate::pool_initializer::create_and_initialize_pool_if_necessary;
use crate::validation::{check_deadline, verify_callback};
use periphery_domain::error::DomainError;
use periphery_domain::fees::FeeAmount;
use periphery_domain::math::liquidity_amounts::get_liquidity_for_amounts;
use periphery_domain::math::tick_math::get_sqrt_ratio_at_tick;
use periphery_domain::params::{
    CollectParams, DecreaseLiquidityParams, IncreaseLiquidityParams, MintParams,
};
use periphery_domain::pool::{PoolKey, compute_pool_address};
use periphery_domain::position::{Position, PositionKey, fees_owed};
use periphery_domain::token::Address;
use periphery_simulation::callback::MintCallback;
use periphery_simulation::error::ChainError;
use periphery_simulation::event::{ChainEvent, EventData};
use periphery_simulation::world::World;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Data the manager passes through a pool to its own mint callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintCallbackData {
    pub key: PoolKey,
    pub payer: Address,
}

/// Result of [`PositionManager::mint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintResult {
    pub token_id: u64,
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// Result of [`PositionManager::increase_liquidity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncreaseResult {
    pub liquidity: u128,
    pub amount0: U256,
    pub amount1: U256,
}

/// Parameters of the internal add-liquidity step shared by mint and increase.
struct AddLiquidity {
    key: PoolKey,
    tick_lower: i32,
    tick_upper: i32,
    amount0_desired: U256,
    amount1_desired: U256,
    amount0_min: U256,
    amount1_min: U256,
}

/// One position manager entry point, as composed in a multicall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerCall {
    CreateAndInitializePoolIfNecessary {
        token0: Address,
        token1: Address,
        fee: FeeAmount,
        sqrt_price_x96: U256,
    },
    Mint(MintParams),
    IncreaseLiquidity(IncreaseLiquidityParams),
    DecreaseLiquidity(DecreaseLiquidityParams),
    Collect(CollectParams),
    Burn { token_id: u64 },
    Approve { approved: Address, token_id: u64 },
    SetApprovalForAll { operator: Address, approved: bool },
    TransferFrom {
        from: Address,
        to: Address,
        token_id: u64,
    },
    UnwrapWsei {
        amount_minimum: U256,
        recipient: Address,
    },
    SweepToken {
        token: Address,
        amount_minimum: U256,
        recipient: Address,
    },
    RefundSei,
}

/// Return value of a position manager entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManagerOutput {
    Pool(Address),
    Minted(MintResult),
    Increased(IncreaseResult),
    /// Token amounts released or collected.
    Amounts(U256, U256),
    Empty,
}

#[derive(Debug, Clone)]
pub struct PositionManager {
    address: Address,
    config: PeripheryConfig,
    payments: Payments,
    positions: BTreeMap<u64, Position>,
    owners: BTreeMap<u64, Address>,
    operator_approvals: HashSet<(Address, Address)>,
    next_id: u64,
}

impl PositionManager {
    pub fn new(address: Address, config: PeripheryConfig) -> Self {
        let payments = Payments::new(address, config.wsei);
        Self {
            address,
            config,
            payments,
            positions: BTreeMap::new(),
            owners: BTreeMap::new(),
            operator_approvals: HashSet::new(),
            next_id: 1,
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

    pub fn config(&self) -> &PeripheryConfig {
        &self.config
    }

    pub fn payments(&self) -> &Payments {
        &self.payments
    }

    // Queries

    /// Position stored under `token_id`.
    pub fn positions(&self, token_id: u64) -> Result<&Position, PeripheryError> {
        self.positions
            .get(&token_id)
            .ok_or(PeripheryError::InvalidTokenId)
    }

    pub fn owner_of(&self, token_id: u64) -> Result<Address, PeripheryError> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(PeripheryError::InvalidTokenId)
    }

    pub fn balance_of(&self, owner: Address) -> usize {
        self.owners.values().filter(|o| **o == owner).count()
    }

    /// Token ids owned by `owner`, ascending.
    pub fn tokens_of(&self, owner: Address) -> Vec<u64> {
        self.owners
            .iter()
            .filter(|(_, o)| **o == owner)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn total_supply(&self) -> usize {
        self.owners.len()
    }

    pub fn get_approved(&self, token_id: u64) -> Result<Address, PeripheryError> {
        Ok(self.positions(token_id)?.operator)
    }

    pub fn is_approved_for_all(&self, owner: Address, operator: Address) -> bool {
        self.operator_approvals.contains(&(owner, operator))
    }

    /// Owner, approved operator or operator for all of the owner's tokens.
    pub fn is_authorized(&self, spender: Address, token_id: u64) -> Result<bool, PeripheryError> {
        let owner = self.owner_of(token_id)?;
        Ok(spender == owner
            || self.get_approved(token_id)? == spender
            || self.is_approved_for_all(owner, spender))
    }

    fn require_authorized(&self, caller: Address, token_id: u64) -> Result<(), PeripheryError> {
        if !self.is_authorized(caller, token_id)? {
            return Err(PeripheryError::NotApproved);
        }
        Ok(())
    }

    fn position_mut(&mut self, token_id: u64) -> Result<&mut Position, PeripheryError> {
        self.positions
            .get_mut(&token_id)
            .ok_or(PeripheryError::InvalidTokenId)
    }

    // Pool initialization

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

    // Liquidity

    /// Adds liquidity worth at most the desired amounts to the manager's
    /// position in the pool, paid by `payer`.
    fn add_liquidity(
        &mut self,
        world: &mut World,
        payer: Address,
        params: AddLiquidity,
    ) -> Result<(u128, U256, U256), PeripheryError> {
        let pool = compute_pool_address(self.config.factory, &params.key);
        let state = world.pool(pool)?;
        if !state.is_initialized() {
            return Err(ChainError::PoolNotInitialized(pool).into());
        }
        let sqrt_price_x96 = state.slot0().sqrt_price_x96;

        let liquidity = get_liquidity_for_amounts(
            sqrt_price_x96,
            get_sqrt_ratio_at_tick(params.tick_lower)?,
            get_sqrt_ratio_at_tick(params.tick_upper)?,
            params.amount0_desired,
            params.amount1_desired,
        )?;

        let data = MintCallbackData {
            key: params.key,
            payer,
        };
        let manager = self.address;
        let (amount0, amount1) = world.mint(
            manager,
            pool,
            manager,
            params.tick_lower,
            params.tick_upper,
            liquidity,
            &data,
            self,
        )?;

        if amount0 < params.amount0_min || amount1 < params.amount1_min {
            return Err(PeripheryError::PriceSlippage);
        }
        Ok((liquidity, amount0, amount1))
    }

    /// Fee growth inside the manager's pool position for `position`'s range.
    fn pool_fee_growth(
        &self,
        world: &World,
        position: &Position,
    ) -> Result<(U256, U256), PeripheryError> {
        let pool = compute_pool_address(self.config.factory, &position.pool_key());
        let key = PositionKey::new(self.address, position.tick_lower, position.tick_upper);
        let info = world.pool(pool)?.position(&key);
        Ok((
            info.fee_growth_inside0_last_x128,
            info.fee_growth_inside1_last_x128,
        ))
    }

    /// Opens a position and mints its token to `params.recipient`.
    pub fn mint(
        &mut self,
        world: &mut World,
        caller: Address,
        params: MintParams,
    ) -> Result<MintResult, PeripheryError> {
        check_deadline(world, params.deadline)?;
        let key = PoolKey::sorted(params.token0, params.token1, params.fee)?;
        let (liquidity, amount0, amount1) = self.add_liquidity(
            world,
            caller,
            AddLiquidity {
                key,
                tick_lower: params.tick_lower,
                tick_upper: params.tick_upper,
                amount0_desired: params.amount0_desired,
                amount1_desired: params.amount1_desired,
                amount0_min: params.amount0_min,
                amount1_min: params.amount1_min,
            },
        )?;

        let token_id = self.next_id;
        self.next_id += 1;

        let mut position = Position {
            nonce: 0,
            operator: Address::zero(),
            token0: key.token0,
            token1: key.token1,
            fee: key.fee,
            tick_lower: params.tick_lower,
            tick_upper: params.tick_upper,
            liquidity,
            fee_growth_inside0_last_x128: U256::zero(),
            fee_growth_inside1_last_x128: U256::zero(),
            tokens_owed0: 0,
            tokens_owed1: 0,
        };
        let (inside0, inside1) = self.pool_fee_growth(world, &position)?;
        position.fee_growth_inside0_last_x128 = inside0;
        position.fee_growth_inside1_last_x128 = inside1;

        self.positions.insert(token_id, position);
        self.owners.insert(token_id, params.recipient);

        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::PositionTransfer {
                from: Address::zero(),
                to: params.recipient,
                token_id,
            },
        ));
        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::IncreaseLiquidity {
                token_id,
                liquidity,
                amount0,
                amount1,
            },
        ));
        info!(
            token_id,
            owner = ?params.recipient,
            liquidity,
            amount0 = %amount0,
            amount1 = %amount1,
            "Minted position"
        );
        Ok(MintResult {
            token_id,
            liquidity,
            amount0,
            amount1,
        })
    }

    /// Adds liquidity to an existing position, paid by `caller`.
    pub fn increase_liquidity(
        &mut self,
        world: &mut World,
        caller: Address,
        params: IncreaseLiquidityParams,
    ) -> Result<IncreaseResult, PeripheryError> {
        check_deadline(world, params.deadline)?;
        let position = self.positions(params.token_id)?.clone();

        let (liquidity, amount0, amount1) = self.add_liquidity(
            world,
            caller,
            AddLiquidity {
                key: position.pool_key(),
                tick_lower: position.tick_lower,
                tick_upper: position.tick_upper,
                amount0_desired: params.amount0_desired,
                amount1_desired: params.amount1_desired,
                amount0_min: params.amount0_min,
                amount1_min: params.amount1_min,
            },
        )?;

        let (inside0, inside1) = self.pool_fee_growth(world, &position)?;
        let stored = self.position_mut(params.token_id)?;
        accrue_fees(stored, inside0, inside1);
        stored.liquidity = stored
            .liquidity
            .checked_add(liquidity)
            .ok_or(DomainError::LiquidityAdd)?;

        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::IncreaseLiquidity {
                token_id: params.token_id,
                liquidity,
                amount0,
                amount1,
            },
        ));
        debug!(token_id = params.token_id, liquidity, "Increased liquidity");
        Ok(IncreaseResult {
            liquidity,
            amount0,
            amount1,
        })
    }

    /// Removes liquidity from a position. The released amounts are credited
    /// to the position and must be collected.
    pub fn decrease_liquidity(
        &mut self,
        world: &mut World,
        caller: Address,
        params: DecreaseLiquidityParams,
    ) -> Result<(U256, U256), PeripheryError> {
        self.require_authorized(caller, params.token_id)?;
        check_deadline(world, params.deadline)?;
        if params.liquidity == 0 {
            return Err(ChainError::ZeroLiquidity.into());
        }
        let position = self.positions(params.token_id)?.clone();
        if position.liquidity < params.liquidity {
            return Err(DomainError::LiquiditySub.into());
        }

        let pool = compute_pool_address(self.config.factory, &position.pool_key());
        let (amount0, amount1) = world.burn(
            self.address,
            pool,
            position.tick_lower,
            position.tick_upper,
            params.liquidity,
        )?;
        if amount0 < params.amount0_min || amount1 < params.amount1_min {
            return Err(PeripheryError::PriceSlippage);
        }

        let (inside0, inside1) = self.pool_fee_growth(world, &position)?;
        let stored = self.position_mut(params.token_id)?;
        accrue_fees(stored, inside0, inside1);
        stored.tokens_owed0 = stored.tokens_owed0.wrapping_add(amount0.low_u128());
        stored.tokens_owed1 = stored.tokens_owed1.wrapping_add(amount1.low_u128());
        stored.liquidity -= params.liquidity;

        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::DecreaseLiquidity {
                token_id: params.token_id,
                liquidity: params.liquidity,
                amount0,
                amount1,
            },
        ));
        debug!(token_id = params.token_id, liquidity = params.liquidity, "Decreased liquidity");
        Ok((amount0, amount1))
    }

    /// Pays out up to the requested amounts owed to a position, fees
    /// included.
    pub fn collect(
        &mut self,
        world: &mut World,
        caller: Address,
        params: CollectParams,
    ) -> Result<(U256, U256), PeripheryError> {
        self.require_authorized(caller, params.token_id)?;
        if params.amount0_max == 0 && params.amount1_max == 0 {
            return Err(PeripheryError::ZeroAmount);
        }
        let recipient = if params.recipient.is_zero() {
            self.address
        } else {
            params.recipient
        };
        let mut position = self.positions(params.token_id)?.clone();
        let pool = compute_pool_address(self.config.factory, &position.pool_key());

        if position.liquidity > 0 {
            // zero burn brings the pool's fee growth up to date
            world.burn(
                self.address,
                pool,
                position.tick_lower,
                position.tick_upper,
                0,
            )?;
            let (inside0, inside1) = self.pool_fee_growth(world, &position)?;
            accrue_fees(&mut position, inside0, inside1);
        }

        let amount0 = params.amount0_max.min(position.tokens_owed0);
        let amount1 = params.amount1_max.min(position.tokens_owed1);
        let (collected0, collected1) = world.collect(
            self.address,
            pool,
            recipient,
            position.tick_lower,
            position.tick_upper,
            amount0,
            amount1,
        )?;

        position.tokens_owed0 -= amount0;
        position.tokens_owed1 -= amount1;
        self.positions.insert(params.token_id, position);

        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::CollectPosition {
                token_id: params.token_id,
                recipient,
                amount0: collected0,
                amount1: collected1,
            },
        ));
        debug!(
            token_id = params.token_id,
            recipient = ?recipient,
            amount0 = collected0,
            amount1 = collected1,
            "Collected position"
        );
        Ok((U256::from(collected0), U256::from(collected1)))
    }

    /// Destroys the token of a position with no liquidity and nothing owed.
    pub fn burn(
        &mut self,
        world: &mut World,
        caller: Address,
        token_id: u64,
    ) -> Result<(), PeripheryError> {
        self.require_authorized(caller, token_id)?;
        if !self.positions(token_id)?.is_cleared() {
            return Err(PeripheryError::NotCleared);
        }
        let owner = self.owner_of(token_id)?;
        self.positions.remove(&token_id);
        self.owners.remove(&token_id);
        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::PositionTransfer {
                from: owner,
                to: Address::zero(),
                token_id,
            },
        ));
        info!(token_id, "Burned position");
        Ok(())
    }

    // Ownership

    /// Sets the single approved operator of `token_id`.
    pub fn approve(
        &mut self,
        world: &mut World,
        caller: Address,
        approved: Address,
        token_id: u64,
    ) -> Result<(), PeripheryError> {
        let owner = self.owner_of(token_id)?;
        if approved == owner {
            return Err(PeripheryError::ApprovalToOwner);
        }
        if caller != owner && !self.is_approved_for_all(owner, caller) {
            return Err(PeripheryError::NotApproved);
        }
        self.position_mut(token_id)?.operator = approved;
        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::PositionApproval {
                owner,
                approved,
                token_id,
            },
        ));
        Ok(())
    }

    pub fn set_approval_for_all(&mut self, caller: Address, operator: Address, approved: bool) {
        if approved {
            self.operator_approvals.insert((caller, operator));
        } else {
            self.operator_approvals.remove(&(caller, operator));
        }
    }

    /// Moves `token_id` from `from` to `to`, clearing its approval.
    pub fn transfer_from(
        &mut self,
        world: &mut World,
        caller: Address,
        from: Address,
        to: Address,
        token_id: u64,
    ) -> Result<(), PeripheryError> {
        self.require_authorized(caller, token_id)?;
        if self.owner_of(token_id)? != from {
            return Err(PeripheryError::NotTokenOwner);
        }
        if to.is_zero() {
            return Err(PeripheryError::TransferToZeroAddress);
        }
        self.position_mut(token_id)?.operator = Address::zero();
        self.owners.insert(token_id, to);
        world.ledger_mut().emit(ChainEvent::new(
            self.address,
            EventData::PositionTransfer { from, to, token_id },
        ));
        Ok(())
    }

    // Batching

    /// Dispatches one entry point.
    pub fn call(
        &mut self,
        world: &mut World,
        caller: Address,
        call: ManagerCall,
    ) -> Result<ManagerOutput, PeripheryError> {
        match call {
            ManagerCall::CreateAndInitializePoolIfNecessary {
                token0,
                token1,
                fee,
                sqrt_price_x96,
            } => self
                .create_and_initialize_pool_if_necessary(world, token0, token1, fee, sqrt_price_x96)
                .map(ManagerOutput::Pool),
            ManagerCall::Mint(params) => self.mint(world, caller, params).map(ManagerOutput::Minted),
            ManagerCall::IncreaseLiquidity(params) => self
                .increase_liquidity(world, caller, params)
                .map(ManagerOutput::Increased),
            ManagerCall::DecreaseLiquidity(params) => {
                let (amount0, amount1) = self.decrease_liquidity(world, caller, params)?;
                Ok(ManagerOutput::Amounts(amount0, amount1))
            }
            ManagerCall::Collect(params) => {
                let (amount0, amount1) = self.collect(world, caller, params)?;
                Ok(ManagerOutput::Amounts(amount0, amount1))
            }
            ManagerCall::Burn { token_id } => {
                self.burn(world, caller, token_id)?;
                Ok(ManagerOutput::Empty)
            }
            ManagerCall::Approve { approved, token_id } => {
                self.approve(world, caller, approved, token_id)?;
                Ok(ManagerOutput::Empty)
            }
            ManagerCall::SetApprovalForAll { operator, approved } => {
                self.set_approval_for_all(caller, operator, approved);
                Ok(ManagerOutput::Empty)
            }
            ManagerCall::TransferFrom { from, to, token_id } => {
                self.transfer_from(world, caller, from, to, token_id)?;
                Ok(ManagerOutput::Empty)
            }
            ManagerCall::UnwrapWsei {
                amount_minimum,
                recipient,
            } => {
                self.payments.unwrap_wsei(world, amount_minimum, recipient)?;
                Ok(ManagerOutput::Empty)
            }
            ManagerCall::SweepToken {
                token,
                amount_minimum,
                recipient,
            } => {
                self.payments
                    .sweep_token(world, token, amount_minimum, recipient)?;
                Ok(ManagerOutput::Empty)
            }
            ManagerCall::RefundSei => {
                self.payments.refund_sei(world, caller)?;
                Ok(ManagerOutput::Empty)
            }
        }
    }

    /// Runs `calls` in order as one unit; the first failure undoes them all.
    pub fn multicall(
        &mut self,
        world: &mut World,
        caller: Address,
        calls: Vec<ManagerCall>,
    ) -> Result<Vec<ManagerOutput>, PeripheryError> {
        let saved = self.clone();
        let result = execute_batch(world, calls, |world, call| self.call(world, caller, call));
        if result.is_err() {
            *self = saved;
        }
        result
    }
}

impl MintCallback for PositionManager {
    type Data = MintCallbackData;
    type Error = PeripheryError;

    fn mint_callback(
        &mut self,
        world: &mut World,
        pool: Address,
        amount0_owed: U256,
        amount1_owed: U256,
        data: &MintCallbackData,
    ) -> Result<(), PeripheryError> {
        verify_callback(
            self.config.factory,
            data.key.token0,
            data.key.token1,
            data.key.fee,
            pool,
        )?;
        if !amount0_owed.is_zero() {
            self.payments
                .pay(world, data.key.token0, data.payer, pool, amount0_owed)?;
        }
        if !amount1_owed.is_zero() {
            self.payments
                .pay(world, data.key.token1, data.payer, pool, amount1_owed)?;
        }
        Ok(())
    }
}

/// Credits fees earned since the position's checkpoint and moves the
/// checkpoint forward.
fn accrue_fees(position: &mut Position, inside0: U256, inside1: U256) {
    let owed0 = fees_owed(inside0, position.fee_growth_inside0_last_x128, position.liquidity);
    let owed1 = fees_owed(inside1, position.fee_growth_inside1_last_x128, position.liquidity);
    position.tokens_owed0 = position.tokens_owed0.wrapping_add(owed0);
    position.tokens_owed1 = position.tokens_owed1.wrapping_add(owed1);
    position.fee_growth_inside0_last_x128 = inside0;
    position.fee_growth_inside1_last_x128 = inside1;
}
