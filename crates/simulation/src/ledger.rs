//! Token balances, allowances and native currency.

use crate::error::ChainError;
use crate::event::{ChainEvent, EventData};
use periphery_domain::error::DomainError;
use periphery_domain::token::{Address, Token};
use primitive_types::U256;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct TokenState {
    meta: Token,
    total_supply: U256,
}

/// ERC20 and native balances of every account, plus the event log.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    tokens: BTreeMap<Address, TokenState>,
    balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    native: HashMap<Address, U256>,
    events: Vec<ChainEvent>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_token(&mut self, meta: Token) {
        self.tokens.insert(
            meta.address,
            TokenState {
                meta,
                total_supply: U256::zero(),
            },
        );
    }

    pub fn token(&self, token: Address) -> Option<&Token> {
        self.tokens.get(&token).map(|state| &state.meta)
    }

    pub fn total_supply(&self, token: Address) -> U256 {
        self.tokens
            .get(&token)
            .map(|state| state.total_supply)
            .unwrap_or_default()
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.balances
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(token, owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Creates `amount` new tokens for `to`.
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), ChainError> {
        self.increase_balance(token, to, amount)?;
        self.emit(ChainEvent::transfer(token, Address::zero(), to, amount));
        Ok(())
    }

    /// Destroys `amount` tokens held by `from`.
    pub fn burn(&mut self, token: Address, from: Address, amount: U256) -> Result<(), ChainError> {
        self.decrease_balance(token, from, amount)?;
        self.emit(ChainEvent::transfer(token, from, Address::zero(), amount));
        Ok(())
    }

    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        self.ensure_token(token)?;
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(ChainError::InsufficientBalance {
                token,
                owner: from,
                needed: amount,
                available,
            });
        }
        self.balances.insert((token, from), available - amount);
        let credited = self.balance_of(token, to) + amount;
        self.balances.insert((token, to), credited);
        self.emit(ChainEvent::transfer(token, from, to, amount));
        Ok(())
    }

    /// Moves `amount` from `from` to `to` on behalf of `spender`.
    ///
    /// The allowance is not consumed when the owner spends its own tokens
    /// or when it is `U256::MAX`.
    pub fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        if spender != from {
            let allowed = self.allowance(token, from, spender);
            if allowed < amount {
                return Err(ChainError::InsufficientAllowance {
                    token,
                    owner: from,
                    spender,
                    needed: amount,
                    available: allowed,
                });
            }
            if allowed != U256::MAX {
                self.allowances
                    .insert((token, from, spender), allowed - amount);
            }
        }
        self.transfer(token, from, to, amount)
    }

    pub fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        self.ensure_token(token)?;
        self.allowances.insert((token, owner, spender), amount);
        self.emit(ChainEvent::new(
            token,
            EventData::Approval {
                owner,
                spender,
                value: amount,
            },
        ));
        Ok(())
    }

    pub fn native_balance(&self, owner: Address) -> U256 {
        self.native.get(&owner).copied().unwrap_or_default()
    }

    /// Credits native currency out of thin air; used to fund genesis accounts.
    pub fn credit_native(&mut self, owner: Address, amount: U256) {
        let balance = self.native_balance(owner) + amount;
        self.native.insert(owner, balance);
    }

    pub fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        let available = self.native_balance(from);
        if available < amount {
            return Err(ChainError::InsufficientNative {
                owner: from,
                needed: amount,
                available,
            });
        }
        self.native.insert(from, available - amount);
        self.credit_native(to, amount);
        Ok(())
    }

    pub fn emit(&mut self, event: ChainEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[ChainEvent] {
        &self.events
    }

    /// Adjusts a balance and the total supply without logging a transfer.
    pub(crate) fn increase_balance(
        &mut self,
        token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        let state = self
            .tokens
            .get_mut(&token)
            .ok_or(ChainError::UnknownToken(token))?;
        state.total_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or(DomainError::Overflow)?;
        let balance = self.balance_of(token, owner) + amount;
        self.balances.insert((token, owner), balance);
        Ok(())
    }

    pub(crate) fn decrease_balance(
        &mut self,
        token: Address,
        owner: Address,
        amount: U256,
    ) -> Result<(), ChainError> {
        self.ensure_token(token)?;
        let available = self.balance_of(token, owner);
        if available < amount {
            return Err(ChainError::InsufficientBalance {
                token,
                owner,
                needed: amount,
                available,
            });
        }
        self.balances.insert((token, owner), available - amount);
        if let Some(state) = self.tokens.get_mut(&token) {
            state.total_supply = state.total_supply.saturating_sub(amount);
        }
        Ok(())
    }

    fn ensure_token(&self, token: Address) -> Result<(), ChainError> {
        if self.tokens.contains_key(&token) {
            Ok(())
        } else {
            Err(ChainError::UnknownToken(token))
        }
    }
}
