//! Native-currency and token payment helpers shared by the router, the
//! position manager and the migrator.
//!
//! A contract holding tokens between steps of a batch uses these to pay pools,
//! unwrap WSEI, sweep leftovers and refund unused native value.

use crate::error::PeripheryError;
use periphery_domain::error::DomainError;
use periphery_domain::token::Address;
use periphery_simulation::world::World;
use primitive_types::U256;
use tracing::debug;

/// Largest fee that may be skimmed, in basis points.
pub const MAX_FEE_BIPS: u32 = 100;

const BIPS_DENOMINATOR: u32 = 10_000;

/// Payment routines bound to the contract that executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payments {
    /// The contract the helpers run as.
    this: Address,
    wsei: Address,
}

impl Payments {
    pub fn new(this: Address, wsei: Address) -> Self {
        Self { this, wsei }
    }

    pub fn address(&self) -> Address {
        self.this
    }

    /// Pays `value` of `token` from `payer` to `recipient`.
    ///
    /// WSEI is wrapped from the contract's native balance when it covers the
    /// amount. Tokens the contract holds itself are transferred directly;
    /// anything else is pulled from `payer` with its allowance.
    pub fn pay(
        &self,
        world: &mut World,
        token: Address,
        payer: Address,
        recipient: Address,
        value: U256,
    ) -> Result<(), PeripheryError> {
        if token == self.wsei && world.native_balance(self.this) >= value {
            world.wsei_deposit(self.this, value)?;
            world
                .ledger_mut()
                .transfer(self.wsei, self.this, recipient, value)?;
        } else if payer == self.this {
            world
                .ledger_mut()
                .transfer(token, self.this, recipient, value)?;
        } else {
            world
                .ledger_mut()
                .transfer_from(token, self.this, payer, recipient, value)?;
        }
        Ok(())
    }

    /// Unwraps the whole WSEI balance and sends it to `recipient` as native
    /// currency. Fails when the balance is below `amount_minimum`.
    pub fn unwrap_wsei(
        &self,
        world: &mut World,
        amount_minimum: U256,
        recipient: Address,
    ) -> Result<U256, PeripheryError> {
        let balance = world.balance_of(self.wsei, self.this);
        if balance < amount_minimum {
            return Err(PeripheryError::InsufficientWsei);
        }
        if !balance.is_zero() {
            world.wsei_withdraw(self.this, balance)?;
            world.send_native(self.this, recipient, balance)?;
            debug!(amount = %balance, recipient = ?recipient, "Unwrapped WSEI");
        }
        Ok(balance)
    }

    /// Like [`Payments::unwrap_wsei`], skimming `fee_bips` of the balance
    /// to `fee_recipient` first.
    pub fn unwrap_wsei_with_fee(
        &self,
        world: &mut World,
        amount_minimum: U256,
        recipient: Address,
        fee_bips: u32,
        fee_recipient: Address,
    ) -> Result<U256, PeripheryError> {
        check_fee_bips(fee_bips)?;
        let balance = world.balance_of(self.wsei, self.this);
        if balance < amount_minimum {
            return Err(PeripheryError::InsufficientWsei);
        }
        if !balance.is_zero() {
            world.wsei_withdraw(self.this, balance)?;
            let fee = skim(balance, fee_bips)?;
            if !fee.is_zero() {
                world.send_native(self.this, fee_recipient, fee)?;
            }
            world.send_native(self.this, recipient, balance - fee)?;
        }
        Ok(balance)
    }

    /// Sends the contract's whole balance of `token` to `recipient`.
    pub fn sweep_token(
        &self,
        world: &mut World,
        token: Address,
        amount_minimum: U256,
        recipient: Address,
    ) -> Result<U256, PeripheryError> {
        let balance = world.balance_of(token, self.this);
        if balance < amount_minimum {
            return Err(PeripheryError::InsufficientToken);
        }
        if !balance.is_zero() {
            world
                .ledger_mut()
                .transfer(token, self.this, recipient, balance)?;
        }
        Ok(balance)
    }

    pub fn sweep_token_with_fee(
        &self,
        world: &mut World,
        token: Address,
        amount_minimum: U256,
        recipient: Address,
        fee_bips: u32,
        fee_recipient: Address,
    ) -> Result<U256, PeripheryError> {
        check_fee_bips(fee_bips)?;
        let balance = world.balance_of(token, self.this);
        if balance < amount_minimum {
            return Err(PeripheryError::InsufficientToken);
        }
        if !balance.is_zero() {
            let fee = skim(balance, fee_bips)?;
            if !fee.is_zero() {
                world
                    .ledger_mut()
                    .transfer(token, self.this, fee_recipient, fee)?;
            }
            world
                .ledger_mut()
                .transfer(token, self.this, recipient, balance - fee)?;
        }
        Ok(balance)
    }

    /// Returns the contract's whole native balance to `caller`.
    pub fn refund_sei(&self, world: &mut World, caller: Address) -> Result<U256, PeripheryError> {
        let balance = world.native_balance(self.this);
        if !balance.is_zero() {
            world.send_native(self.this, caller, balance)?;
        }
        Ok(balance)
    }
}

fn check_fee_bips(fee_bips: u32) -> Result<(), PeripheryError> {
    if fee_bips == 0 || fee_bips > MAX_FEE_BIPS {
        return Err(PeripheryError::InvalidFeeBips);
    }
    Ok(())
}

/// `floor(amount * fee_bips / 10000)`.
fn skim(amount: U256, fee_bips: u32) -> Result<U256, PeripheryError> {
    let scaled = amount
        .checked_mul(U256::from(fee_bips))
        .ok_or(DomainError::Overflow)?;
    Ok(scaled / U256::from(BIPS_DENOMINATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use periphery_simulation::error::ChainError;

    struct Setup {
        world: World,
        payments: Payments,
        user: Address,
        token: Address,
    }

    fn setup() -> Setup {
        let mut world = World::new();
        let user = world.create_account();
        let this = world.deploy_contract("payments");
        world.guard_native(this, world.wsei());
        let token = world
            .deploy_token("TEST", 18, U256::from(1_000_000), user)
            .unwrap();
        world.ledger_mut().credit_native(user, U256::from(1_000_000));
        let payments = Payments::new(this, world.wsei());
        Setup {
            world,
            payments,
            user,
            token,
        }
    }

    #[test]
    fn test_skim() {
        assert_eq!(skim(U256::from(100), 100).unwrap(), U256::one());
        assert_eq!(skim(U256::from(99), 100).unwrap(), U256::zero());
        assert_eq!(skim(U256::from(10_000), 1).unwrap(), U256::one());
    }

    #[test]
    fn test_pay_pulls_with_allowance() {
        let Setup {
            mut world,
            payments,
            user,
            token,
        } = setup();
        let pool = world.create_account();
        let err = payments
            .pay(&mut world, token, user, pool, U256::from(10))
            .unwrap_err();
        assert!(matches!(
            err,
            PeripheryError::Chain(ChainError::InsufficientAllowance { .. })
        ));

        world
            .ledger_mut()
            .approve(token, user, payments.address(), U256::MAX)
            .unwrap();
        payments
            .pay(&mut world, token, user, pool, U256::from(10))
            .unwrap();
        assert_eq!(world.balance_of(token, pool), U256::from(10));
    }

    #[test]
    fn test_pay_wraps_native_for_wsei() {
        let Setup {
            mut world,
            payments,
            user,
            ..
        } = setup();
        let pool = world.create_account();
        let wsei = world.wsei();
        world
            .attach_value(user, payments.address(), U256::from(50))
            .unwrap();
        payments
            .pay(&mut world, wsei, user, pool, U256::from(50))
            .unwrap();
        assert_eq!(world.balance_of(wsei, pool), U256::from(50));
        assert_eq!(world.native_balance(payments.address()), U256::zero());
    }

    #[test]
    fn test_unwrap_wsei() {
        let Setup {
            mut world,
            payments,
            user,
            ..
        } = setup();
        let wsei = world.wsei();
        world.wsei_deposit(user, U256::from(100)).unwrap();
        world
            .ledger_mut()
            .transfer(wsei, user, payments.address(), U256::from(100))
            .unwrap();

        assert_eq!(
            payments.unwrap_wsei(&mut world, U256::from(101), user),
            Err(PeripheryError::InsufficientWsei)
        );
        let before = world.native_balance(user);
        let fee_recipient = world.create_account();
        payments
            .unwrap_wsei_with_fee(&mut world, U256::from(100), user, 100, fee_recipient)
            .unwrap();
        assert_eq!(world.native_balance(fee_recipient), U256::one());
        assert_eq!(world.native_balance(user), before + U256::from(99));
        assert_eq!(world.balance_of(wsei, payments.address()), U256::zero());
    }

    #[test]
    fn test_sweep_token_with_fee() {
        let Setup {
            mut world,
            payments,
            user,
            token,
        } = setup();
        world
            .ledger_mut()
            .transfer(token, user, payments.address(), U256::from(100))
            .unwrap();
        let fee_recipient = world.create_account();
        let recipient = world.create_account();

        assert_eq!(
            payments.sweep_token_with_fee(&mut world, token, U256::zero(), recipient, 0, fee_recipient),
            Err(PeripheryError::InvalidFeeBips)
        );
        assert_eq!(
            payments.sweep_token_with_fee(&mut world, token, U256::zero(), recipient, 101, fee_recipient),
            Err(PeripheryError::InvalidFeeBips)
        );
        assert_eq!(
            payments.sweep_token(&mut world, token, U256::from(101), recipient),
            Err(PeripheryError::InsufficientToken)
        );
        payments
            .sweep_token_with_fee(&mut world, token, U256::from(100), recipient, 100, fee_recipient)
            .unwrap();
        assert_eq!(world.balance_of(token, fee_recipient), U256::one());
        assert_eq!(world.balance_of(token, recipient), U256::from(99));
    }

    #[test]
    fn test_refund_sei() {
        let Setup {
            mut world,
            payments,
            user,
            ..
        } = setup();
        world
            .attach_value(user, payments.address(), U256::from(7))
            .unwrap();
        let before = world.native_balance(user);
        assert_eq!(payments.refund_sei(&mut world, user).unwrap(), U256::from(7));
        assert_eq!(world.native_balance(user), before + U256::from(7));
        assert_eq!(payments.refund_sei(&mut world, user).unwrap(), U256::zero());
    }
}
