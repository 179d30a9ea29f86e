//! The in-memory chain: ledger, factories, pools, pairs and wrapped SEI.
//!
//! `World` is the only owner of pool state. Pool operations that pay out
//! before collecting (swaps and mints) call back into the caller through the
//! traits in [`crate::callback`] and verify the pool was paid afterwards.
//!
//! Operations are not atomic on their own. Callers that need revert
//! semantics take a [`World::snapshot`] and [`World::restore`] it on failure.

use crate::callback::{MintCallback, SwapCallback};
use crate::error::ChainError;
use crate::event::{ChainEvent, EventData};
use crate::ledger::Ledger;
use crate::pair::LegacyPair;
use crate::pool::{ConcentratedPool, SwapAmount};
use alloy_primitives::keccak256;
use periphery_domain::error::DomainError;
use periphery_domain::fees::FeeAmount;
use periphery_domain::pool::{PoolKey, compute_pool_address};
use periphery_domain::position::PositionKey;
use periphery_domain::token::{Address, Token};
use periphery_domain::value_objects::TokenDelta;
use primitive_types::U256;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Symbol of the wrapped native token.
pub const WSEI_SYMBOL: &str = "WSEI";

#[derive(Debug, Clone)]
pub struct World {
    pub(crate) ledger: Ledger,
    factory: Address,
    legacy_factory: Address,
    wsei: Address,
    pools: BTreeMap<Address, ConcentratedPool>,
    pub(crate) pairs: BTreeMap<Address, LegacyPair>,
    /// Contracts that only take plain native transfers from one sender.
    native_guards: HashMap<Address, Address>,
    block_timestamp: u64,
    nonce: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Deploys the factory, the legacy factory and WSEI.
    pub fn new() -> Self {
        let mut world = Self {
            ledger: Ledger::new(),
            factory: Address::zero(),
            legacy_factory: Address::zero(),
            wsei: Address::zero(),
            pools: BTreeMap::new(),
            pairs: BTreeMap::new(),
            native_guards: HashMap::new(),
            block_timestamp: 1,
            nonce: 0,
        };
        world.factory = world.next_address();
        world.legacy_factory = world.next_address();
        world.wsei = world.next_address();
        world
            .ledger
            .register_token(Token::new(world.wsei, WSEI_SYMBOL, 18, "Wrapped Sei"));
        info!(
            factory = ?world.factory,
            legacy_factory = ?world.legacy_factory,
            wsei = ?world.wsei,
            "Deployed core contracts"
        );
        world
    }

    fn next_address(&mut self) -> Address {
        self.nonce += 1;
        let mut preimage = [0u8; 16];
        preimage[..8].copy_from_slice(b"deployer");
        preimage[8..].copy_from_slice(&self.nonce.to_be_bytes());
        Address::from_slice(&keccak256(preimage)[12..])
    }

    /// Fresh externally owned account.
    pub fn create_account(&mut self) -> Address {
        self.next_address()
    }

    /// Fresh contract address for a periphery contract.
    pub fn deploy_contract(&mut self, name: &str) -> Address {
        let address = self.next_address();
        debug!(contract = name, address = ?address, "Deployed contract");
        address
    }

    /// Deploys an ERC20 and mints its whole supply to `owner`.
    pub fn deploy_token(
        &mut self,
        symbol: &str,
        decimals: u8,
        supply: U256,
        owner: Address,
    ) -> Result<Address, ChainError> {
        let address = self.next_address();
        self.ledger
            .register_token(Token::new(address, symbol, decimals, symbol));
        self.ledger.mint(address, owner, supply)?;
        debug!(token = ?address, symbol, "Deployed token");
        Ok(address)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn factory(&self) -> Address {
        self.factory
    }

    pub fn legacy_factory(&self) -> Address {
        self.legacy_factory
    }

    pub fn wsei(&self) -> Address {
        self.wsei
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.ledger.balance_of(token, owner)
    }

    pub fn native_balance(&self, owner: Address) -> U256 {
        self.ledger.native_balance(owner)
    }

    pub fn events(&self) -> &[ChainEvent] {
        self.ledger.events()
    }

    pub fn block_timestamp(&self) -> u64 {
        self.block_timestamp
    }

    pub fn set_block_timestamp(&mut self, timestamp: u64) {
        self.block_timestamp = timestamp;
    }

    /// Copy of the full state to roll back to.
    pub fn snapshot(&self) -> World {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: World) {
        *self = snapshot;
    }

    // Native currency

    /// Makes `contract` reject plain native transfers from anyone but `sender`.
    pub fn guard_native(&mut self, contract: Address, sender: Address) {
        self.native_guards.insert(contract, sender);
    }

    /// Plain native transfer, subject to the receiver's guard.
    pub fn send_native(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        if let Some(allowed) = self.native_guards.get(&to) {
            if *allowed != from {
                return Err(ChainError::NativeRejected { from, to });
            }
        }
        self.ledger.transfer_native(from, to, amount)
    }

    /// Native value attached to a call. Bypasses receive guards.
    pub fn attach_value(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        self.ledger.transfer_native(from, to, amount)
    }

    /// Wraps `amount` of `account`'s native currency into WSEI.
    pub fn wsei_deposit(&mut self, account: Address, amount: U256) -> Result<(), ChainError> {
        let wsei = self.wsei;
        self.ledger.transfer_native(account, wsei, amount)?;
        self.credit_wsei_deposit(account, amount)
    }

    /// Mints WSEI for `amount` of native value already attached to a call on
    /// the WSEI contract.
    pub fn credit_wsei_deposit(
        &mut self,
        account: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        let wsei = self.wsei;
        self.ledger.increase_balance(wsei, account, amount)?;
        self.ledger.emit(ChainEvent::deposit(wsei, account, amount));
        Ok(())
    }

    /// Unwraps `amount` of `account`'s WSEI back to native currency.
    pub fn wsei_withdraw(&mut self, account: Address, amount: U256) -> Result<(), ChainError> {
        let wsei = self.wsei;
        self.ledger.decrease_balance(wsei, account, amount)?;
        self.send_native(wsei, account, amount)?;
        self.ledger.emit(ChainEvent::withdrawal(wsei, account, amount));
        Ok(())
    }

    // Concentrated-liquidity factory

    /// Deploys the pool for `token_a`/`token_b` at its derived address.
    pub fn create_pool(
        &mut self,
        token_a: Address,
        token_b: Address,
        fee: FeeAmount,
    ) -> Result<Address, ChainError> {
        let key = PoolKey::new(token_a, token_b, fee)?;
        let address = compute_pool_address(self.factory, &key);
        if self.pools.contains_key(&address) {
            return Err(ChainError::PoolExists(address));
        }
        let pool = ConcentratedPool::new(address, key);
        let tick_spacing = pool.tick_spacing();
        self.pools.insert(address, pool);
        self.ledger.emit(ChainEvent::new(
            self.factory,
            EventData::PoolCreated {
                token0: key.token0,
                token1: key.token1,
                fee,
                tick_spacing,
                pool: address,
            },
        ));
        info!(pool = ?address, fee = %fee, "Created pool");
        Ok(address)
    }

    /// Address of the deployed pool, if any.
    pub fn get_pool(&self, token_a: Address, token_b: Address, fee: FeeAmount) -> Option<Address> {
        let key = PoolKey::new(token_a, token_b, fee).ok()?;
        let address = compute_pool_address(self.factory, &key);
        self.pools.contains_key(&address).then_some(address)
    }

    pub fn pool(&self, address: Address) -> Result<&ConcentratedPool, ChainError> {
        self.pools
            .get(&address)
            .ok_or(ChainError::PoolNotFound(address))
    }

    fn pool_mut(&mut self, address: Address) -> Result<&mut ConcentratedPool, ChainError> {
        self.pools
            .get_mut(&address)
            .ok_or(ChainError::PoolNotFound(address))
    }

    pub fn pools(&self) -> impl Iterator<Item = &ConcentratedPool> {
        self.pools.values()
    }

    pub fn initialize_pool(
        &mut self,
        pool: Address,
        sqrt_price_x96: U256,
    ) -> Result<i32, ChainError> {
        let tick = self.pool_mut(pool)?.initialize(sqrt_price_x96)?;
        self.ledger.emit(ChainEvent::new(
            pool,
            EventData::Initialize {
                sqrt_price_x96,
                tick,
            },
        ));
        debug!(pool = ?pool, tick, "Initialized pool");
        Ok(tick)
    }

    fn pool_tokens(&self, pool: Address) -> Result<(Address, Address), ChainError> {
        let key = self.pool(pool)?.key();
        Ok((key.token0, key.token1))
    }

    /// Runs `f` while holding the pool's reentrancy lock.
    fn with_pool_lock<T, E: From<ChainError>>(
        &mut self,
        pool: Address,
        f: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        self.pool_mut(pool)?.lock()?;
        let result = f(self);
        if let Ok(state) = self.pool_mut(pool) {
            state.unlock();
        }
        result
    }

    // Pool operations

    /// Swaps against `pool`, sends the output to `recipient` and asks
    /// `callback` for the input.
    #[allow(clippy::too_many_arguments)]
    pub fn swap<C: SwapCallback>(
        &mut self,
        sender: Address,
        pool: Address,
        recipient: Address,
        zero_for_one: bool,
        amount: SwapAmount,
        sqrt_price_limit_x96: U256,
        data: &C::Data,
        callback: &mut C,
    ) -> Result<(TokenDelta, TokenDelta), C::Error> {
        let (token0, token1) = self.pool_tokens(pool)?;
        let (amount0, amount1) =
            self.pool_mut(pool)?
                .swap(zero_for_one, amount, sqrt_price_limit_x96)?;

        let settled = self.settle_swap(
            pool,
            recipient,
            (token0, token1),
            zero_for_one,
            (amount0, amount1),
            data,
            callback,
        );
        if let Ok(state) = self.pool_mut(pool) {
            state.unlock();
        }
        settled?;

        let state = self.pool(pool)?;
        let slot0 = state.slot0();
        let liquidity = state.liquidity();
        self.ledger.emit(ChainEvent::new(
            pool,
            EventData::Swap {
                sender,
                recipient,
                amount0,
                amount1,
                sqrt_price_x96: slot0.sqrt_price_x96,
                liquidity,
                tick: slot0.tick,
            },
        ));
        debug!(
            pool = ?pool,
            amount0 = %amount0,
            amount1 = %amount1,
            tick = slot0.tick,
            "Pool swap"
        );
        Ok((amount0, amount1))
    }

    #[allow(clippy::too_many_arguments)]
    fn settle_swap<C: SwapCallback>(
        &mut self,
        pool: Address,
        recipient: Address,
        (token0, token1): (Address, Address),
        zero_for_one: bool,
        (amount0, amount1): (TokenDelta, TokenDelta),
        data: &C::Data,
        callback: &mut C,
    ) -> Result<(), C::Error> {
        let (token_in, amount_in, token_out, amount_out) = if zero_for_one {
            (token0, amount0, token1, amount1)
        } else {
            (token1, amount1, token0, amount0)
        };
        if amount_out.is_negative() {
            self.ledger
                .transfer(token_out, pool, recipient, amount_out.abs())?;
        }

        let before = self.ledger.balance_of(token_in, pool);
        callback.swap_callback(self, pool, amount0, amount1, data)?;
        let expected = before
            .checked_add(amount_in.abs())
            .ok_or(ChainError::Domain(DomainError::Overflow))?;
        if self.ledger.balance_of(token_in, pool) < expected {
            return Err(ChainError::InsufficientInputAmount.into());
        }
        Ok(())
    }

    /// Adds `amount` liquidity for `recipient` and asks `callback` to pay
    /// for it. Returns the amounts paid.
    #[allow(clippy::too_many_arguments)]
    pub fn mint<C: MintCallback>(
        &mut self,
        sender: Address,
        pool: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        data: &C::Data,
        callback: &mut C,
    ) -> Result<(U256, U256), C::Error> {
        if amount == 0 {
            return Err(ChainError::ZeroLiquidity.into());
        }
        let delta = i128::try_from(amount).map_err(|_| ChainError::Domain(DomainError::Overflow))?;
        let (token0, token1) = self.pool_tokens(pool)?;

        let (amount0, amount1) = self.with_pool_lock(pool, |world| -> Result<_, C::Error> {
            let (amount0, amount1) = world
                .pool_mut(pool)?
                .modify_position(recipient, tick_lower, tick_upper, delta)?;

            let before0 = world.ledger.balance_of(token0, pool);
            let before1 = world.ledger.balance_of(token1, pool);
            callback.mint_callback(world, pool, amount0, amount1, data)?;
            if !amount0.is_zero() && world.ledger.balance_of(token0, pool) < before0 + amount0 {
                return Err(ChainError::InsufficientMint0.into());
            }
            if !amount1.is_zero() && world.ledger.balance_of(token1, pool) < before1 + amount1 {
                return Err(ChainError::InsufficientMint1.into());
            }
            Ok((amount0, amount1))
        })?;

        self.ledger.emit(ChainEvent::new(
            pool,
            EventData::Mint {
                sender,
                owner: recipient,
                tick_lower,
                tick_upper,
                amount,
                amount0,
                amount1,
            },
        ));
        debug!(pool = ?pool, liquidity = amount, "Pool mint");
        Ok((amount0, amount1))
    }

    /// Removes `amount` liquidity from `owner`'s position. The released
    /// tokens become collectable; nothing is transferred.
    pub fn burn(
        &mut self,
        owner: Address,
        pool: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(U256, U256), ChainError> {
        let delta = i128::try_from(amount).map_err(|_| DomainError::Overflow)?;
        let (amount0, amount1) = self.with_pool_lock(pool, |world| {
            let state = world.pool_mut(pool)?;
            let (amount0, amount1) =
                state.modify_position(owner, tick_lower, tick_upper, -delta)?;
            if !amount0.is_zero() || !amount1.is_zero() {
                let key = PositionKey::new(owner, tick_lower, tick_upper);
                state.credit_owed(&key, amount0, amount1);
            }
            Ok::<_, ChainError>((amount0, amount1))
        })?;

        self.ledger.emit(ChainEvent::new(
            pool,
            EventData::Burn {
                owner,
                tick_lower,
                tick_upper,
                amount,
                amount0,
                amount1,
            },
        ));
        Ok((amount0, amount1))
    }

    /// Pays out up to the requested owed amounts of `owner`'s position.
    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        &mut self,
        owner: Address,
        pool: Address,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: u128,
        amount1_requested: u128,
    ) -> Result<(u128, u128), ChainError> {
        let (token0, token1) = self.pool_tokens(pool)?;
        let (amount0, amount1) = self.with_pool_lock(pool, |world| {
            let key = PositionKey::new(owner, tick_lower, tick_upper);
            let (amount0, amount1) =
                world
                    .pool_mut(pool)?
                    .take_owed(&key, amount0_requested, amount1_requested);
            if amount0 > 0 {
                world
                    .ledger
                    .transfer(token0, pool, recipient, U256::from(amount0))?;
            }
            if amount1 > 0 {
                world
                    .ledger
                    .transfer(token1, pool, recipient, U256::from(amount1))?;
            }
            Ok::<_, ChainError>((amount0, amount1))
        })?;

        self.ledger.emit(ChainEvent::new(
            pool,
            EventData::Collect {
                owner,
                recipient,
                tick_lower,
                tick_upper,
                amount0,
                amount1,
            },
        ));
        Ok((amount0, amount1))
    }
}
