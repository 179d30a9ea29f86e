//! Transaction boundary around the deployed periphery contracts.
//!
//! Every top-level call runs against a copy-on-failure snapshot of the whole
//! deployment: attached native value is moved to the target contract, the
//! call executes, and on any error the chain and every contract's storage are
//! restored exactly. Each call leaves a [`Receipt`].

use crate::config::PeripheryConfig;
use crate::descriptor::{PositionDescriptor, TokenMetadata};
use crate::error::PeripheryError;
use crate::migrator::{Migrator, MigratorCall, MigratorOutput};
use crate::position_manager::{
    IncreaseResult, ManagerCall, ManagerOutput, MintResult, PositionManager,
};
use crate::router::{RouterCall, RouterOutput, SwapRouter};
use chrono::{DateTime, Utc};
use periphery_domain::params::{
    CollectParams, DecreaseLiquidityParams, ExactInputParams, ExactInputSingleParams,
    ExactOutputParams, ExactOutputSingleParams, IncreaseLiquidityParams, MigrateParams,
    MintParams,
};
use periphery_domain::token::Address;
use periphery_simulation::event::ChainEvent;
use periphery_simulation::world::World;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// ERC20 and WSEI calls made directly by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenCall {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Transfer {
        token: Address,
        to: Address,
        amount: U256,
    },
    /// Wraps the attached value.
    WseiDeposit,
    WseiWithdraw { amount: U256 },
}

/// A top-level call submitted by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    Router(RouterCall),
    RouterMulticall(Vec<RouterCall>),
    Manager(ManagerCall),
    ManagerMulticall(Vec<ManagerCall>),
    Migrator(MigratorCall),
    MigratorMulticall(Vec<MigratorCall>),
    Token(TokenCall),
}

/// Result of a top-level call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutput {
    Router(RouterOutput),
    RouterBatch(Vec<RouterOutput>),
    Manager(ManagerOutput),
    ManagerBatch(Vec<ManagerOutput>),
    Migrator(MigratorOutput),
    MigratorBatch(Vec<MigratorOutput>),
    Token,
}

/// Outcome of a submitted call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxStatus {
    Success,
    /// Reverted with the given reason; no state changed.
    Reverted(String),
}

/// Record of one submitted call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    /// Receipt ID.
    pub id: Uuid,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
    /// Account that submitted the call.
    pub sender: Address,
    /// Contract called.
    pub to: Address,
    /// Native value attached.
    pub value: U256,
    /// Whether the call committed.
    pub status: TxStatus,
    /// Events emitted by the call; empty on revert.
    pub events: Vec<ChainEvent>,
    /// Serialized return value of a committed call.
    pub output: Option<serde_json::Value>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == TxStatus::Success
    }
}

/// The chain together with the periphery contracts deployed on it.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub world: World,
    pub router: SwapRouter,
    pub manager: PositionManager,
    pub migrator: Migrator,
}

impl Deployment {
    /// Deploys the router, position manager and migrator onto `world`.
    /// Each accepts plain native transfers from WSEI only.
    pub fn new(mut world: World, config: PeripheryConfig) -> Self {
        let router = world.deploy_contract("router");
        let manager = world.deploy_contract("position-manager");
        let migrator = world.deploy_contract("migrator");
        for contract in [router, manager, migrator] {
            world.guard_native(contract, config.wsei);
        }
        Self {
            router: SwapRouter::new(router, config.clone()),
            manager: PositionManager::new(manager, config.clone()),
            migrator: Migrator::new(migrator, config),
            world,
        }
    }
}

/// Deployed periphery with atomic call submission.
#[derive(Debug, Clone)]
pub struct Periphery {
    /// Chain and contract state.
    deployment: Deployment,
    /// Metadata renderer for position tokens.
    descriptor: PositionDescriptor,
    /// Deployment configuration.
    config: PeripheryConfig,
    /// Receipts of every submitted call, oldest first.
    receipts: Vec<Receipt>,
}

impl Periphery {
    /// Deploys the periphery onto `world` with the default native label.
    pub fn new(world: World) -> Self {
        let config = PeripheryConfig::from_world(&world);
        Self::with_config(world, config)
    }

    pub fn with_config(world: World, config: PeripheryConfig) -> Self {
        let descriptor = PositionDescriptor::new(config.wsei, config.native_label.clone());
        let deployment = Deployment::new(world, config.clone());
        info!(
            router = ?deployment.router.address(),
            manager = ?deployment.manager.address(),
            migrator = ?deployment.migrator.address(),
            "Deployed periphery"
        );
        Self {
            deployment,
            descriptor,
            config,
            receipts: Vec::new(),
        }
    }

    pub fn config(&self) -> &PeripheryConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.deployment.world
    }

    /// Direct chain access for setup outside of transactions.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.deployment.world
    }

    pub fn router(&self) -> &SwapRouter {
        &self.deployment.router
    }

    pub fn manager(&self) -> &PositionManager {
        &self.deployment.manager
    }

    pub fn migrator(&self) -> &Migrator {
        &self.deployment.migrator
    }

    pub fn descriptor(&self) -> &PositionDescriptor {
        &self.descriptor
    }

    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.receipts.last()
    }

    pub fn token_metadata(&self, token_id: u64) -> Result<TokenMetadata, PeripheryError> {
        self.descriptor
            .token_metadata(&self.deployment.world, &self.deployment.manager, token_id)
    }

    pub fn token_uri(&self, token_id: u64) -> Result<String, PeripheryError> {
        self.descriptor
            .token_uri(&self.deployment.world, &self.deployment.manager, token_id)
    }

    /// Runs `execute` as one transaction from `sender` to `to` carrying
    /// `value`, committing on success and restoring every contract on error.
    fn transact<T: Serialize>(
        &mut self,
        sender: Address,
        to: Address,
        value: U256,
        execute: impl FnOnce(&mut Deployment) -> Result<T, PeripheryError>,
    ) -> Result<T, PeripheryError> {
        let snapshot = self.deployment.clone();
        let events_before = self.deployment.world.events().len();

        let result = attach_and_execute(&mut self.deployment, sender, to, value, execute);

        let id = Uuid::new_v4();
        let (status, events, output) = match &result {
            Ok(output) => {
                let events = self.deployment.world.events()[events_before..].to_vec();
                info!(
                    tx = %id,
                    sender = ?sender,
                    to = ?to,
                    events = events.len(),
                    "Transaction committed"
                );
                (TxStatus::Success, events, serde_json::to_value(output).ok())
            }
            Err(err) => {
                self.deployment = snapshot;
                warn!(tx = %id, sender = ?sender, to = ?to, error = %err, "Transaction reverted");
                (TxStatus::Reverted(err.to_string()), Vec::new(), None)
            }
        };
        self.receipts.push(Receipt {
            id,
            submitted_at: Utc::now(),
            sender,
            to,
            value,
            status,
            events,
            output,
        });
        result
    }

    /// Address a call is sent to.
    fn target(&self, call: &Call) -> Address {
        match call {
            Call::Router(_) | Call::RouterMulticall(_) => self.deployment.router.address(),
            Call::Manager(_) | Call::ManagerMulticall(_) => self.deployment.manager.address(),
            Call::Migrator(_) | Call::MigratorMulticall(_) => self.deployment.migrator.address(),
            Call::Token(TokenCall::Approve { token, .. } | TokenCall::Transfer { token, .. }) => {
                *token
            }
            Call::Token(TokenCall::WseiDeposit | TokenCall::WseiWithdraw { .. }) => self.config.wsei,
        }
    }

    /// Submits `call` from `sender` with `value` native currency attached.
    pub fn submit(
        &mut self,
        sender: Address,
        value: U256,
        call: Call,
    ) -> Result<CallOutput, PeripheryError> {
        let to = self.target(&call);
        match call {
            Call::Token(token_call) => self.submit_token_call(sender, to, value, token_call),
            call => self.transact(sender, to, value, |d| match call {
                Call::Router(call) => d
                    .router
                    .call(&mut d.world, sender, call)
                    .map(CallOutput::Router),
                Call::RouterMulticall(calls) => d
                    .router
                    .multicall(&mut d.world, sender, calls)
                    .map(CallOutput::RouterBatch),
                Call::Manager(call) => d
                    .manager
                    .call(&mut d.world, sender, call)
                    .map(CallOutput::Manager),
                Call::ManagerMulticall(calls) => d
                    .manager
                    .multicall(&mut d.world, sender, calls)
                    .map(CallOutput::ManagerBatch),
                Call::Migrator(call) => d
                    .migrator
                    .call(&mut d.world, &mut d.manager, sender, call)
                    .map(CallOutput::Migrator),
                Call::MigratorMulticall(calls) => d
                    .migrator
                    .multicall(&mut d.world, &mut d.manager, sender, calls)
                    .map(CallOutput::MigratorBatch),
                Call::Token(_) => Ok(CallOutput::Token),
            }),
        }
    }

    fn submit_token_call(
        &mut self,
        sender: Address,
        to: Address,
        value: U256,
        call: TokenCall,
    ) -> Result<CallOutput, PeripheryError> {
        // only WSEI deposits are payable
        self.transact(sender, to, value, |d| {
            if call != TokenCall::WseiDeposit && !value.is_zero() {
                return Err(PeripheryError::NonPayable);
            }
            match call {
                TokenCall::Approve {
                    token,
                    spender,
                    amount,
                } => d.world.ledger_mut().approve(token, sender, spender, amount)?,
                TokenCall::Transfer { token, to, amount } => {
                    d.world.ledger_mut().transfer(token, sender, to, amount)?
                }
                TokenCall::WseiDeposit => d.world.credit_wsei_deposit(sender, value)?,
                TokenCall::WseiWithdraw { amount } => d.world.wsei_withdraw(sender, amount)?,
            }
            Ok(CallOutput::Token)
        })
    }

    // Typed entry points

    pub fn approve(
        &mut self,
        sender: Address,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), PeripheryError> {
        self.submit(
            sender,
            U256::zero(),
            Call::Token(TokenCall::Approve {
                token,
                spender,
                amount,
            }),
        )?;
        Ok(())
    }

    pub fn exact_input_single(
        &mut self,
        sender: Address,
        value: U256,
        params: ExactInputSingleParams,
    ) -> Result<U256, PeripheryError> {
        let to = self.deployment.router.address();
        self.transact(sender, to, value, |d| {
            d.router.exact_input_single(&mut d.world, sender, params)
        })
    }

    pub fn exact_input(
        &mut self,
        sender: Address,
        value: U256,
        params: ExactInputParams,
    ) -> Result<U256, PeripheryError> {
        let to = self.deployment.router.address();
        self.transact(sender, to, value, |d| {
            d.router.exact_input(&mut d.world, sender, params)
        })
    }

    pub fn exact_output_single(
        &mut self,
        sender: Address,
        value: U256,
        params: ExactOutputSingleParams,
    ) -> Result<U256, PeripheryError> {
        let to = self.deployment.router.address();
        self.transact(sender, to, value, |d| {
            d.router.exact_output_single(&mut d.world, sender, params)
        })
    }

    pub fn exact_output(
        &mut self,
        sender: Address,
        value: U256,
        params: ExactOutputParams,
    ) -> Result<U256, PeripheryError> {
        let to = self.deployment.router.address();
        self.transact(sender, to, value, |d| {
            d.router.exact_output(&mut d.world, sender, params)
        })
    }

    pub fn router_multicall(
        &mut self,
        sender: Address,
        value: U256,
        calls: Vec<RouterCall>,
    ) -> Result<Vec<RouterOutput>, PeripheryError> {
        let to = self.deployment.router.address();
        self.transact(sender, to, value, |d| {
            d.router.multicall(&mut d.world, sender, calls)
        })
    }

    pub fn mint(
        &mut self,
        sender: Address,
        value: U256,
        params: MintParams,
    ) -> Result<MintResult, PeripheryError> {
        let to = self.deployment.manager.address();
        self.transact(sender, to, value, |d| {
            d.manager.mint(&mut d.world, sender, params)
        })
    }

    pub fn increase_liquidity(
        &mut self,
        sender: Address,
        value: U256,
        params: IncreaseLiquidityParams,
    ) -> Result<IncreaseResult, PeripheryError> {
        let to = self.deployment.manager.address();
        self.transact(sender, to, value, |d| {
            d.manager.increase_liquidity(&mut d.world, sender, params)
        })
    }

    pub fn decrease_liquidity(
        &mut self,
        sender: Address,
        params: DecreaseLiquidityParams,
    ) -> Result<(U256, U256), PeripheryError> {
        let to = self.deployment.manager.address();
        self.transact(sender, to, U256::zero(), |d| {
            d.manager.decrease_liquidity(&mut d.world, sender, params)
        })
    }

    pub fn collect(
        &mut self,
        sender: Address,
        params: CollectParams,
    ) -> Result<(U256, U256), PeripheryError> {
        let to = self.deployment.manager.address();
        self.transact(sender, to, U256::zero(), |d| {
            d.manager.collect(&mut d.world, sender, params)
        })
    }

    pub fn migrate(
        &mut self,
        sender: Address,
        params: MigrateParams,
    ) -> Result<MintResult, PeripheryError> {
        let to = self.deployment.migrator.address();
        self.transact(sender, to, U256::zero(), |d| {
            d.migrator.migrate(&mut d.world, &mut d.manager, sender, params)
        })
    }
}

fn attach_and_execute<T>(
    deployment: &mut Deployment,
    sender: Address,
    to: Address,
    value: U256,
    execute: impl FnOnce(&mut Deployment) -> Result<T, PeripheryError>,
) -> Result<T, PeripheryError> {
    if !value.is_zero() {
        deployment.world.attach_value(sender, to, value)?;
    }
    execute(deployment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deployment_guards_native() {
        let periphery = Periphery::new(World::new());
        let router = periphery.router().address();
        assert_ne!(router, periphery.manager().address());
        assert_eq!(periphery.router().wsei(), periphery.world().wsei());
        assert_eq!(periphery.descriptor().native_label(), "SEI");
    }

    #[test]
    fn test_reverted_call_leaves_receipt_and_no_state() {
        let mut world = World::new();
        let user = world.create_account();
        world.ledger_mut().credit_native(user, U256::from(100));
        let mut periphery = Periphery::new(world);

        let err = periphery
            .submit(
                user,
                U256::from(10),
                Call::Router(RouterCall::UnwrapWsei {
                    amount_minimum: U256::one(),
                    recipient: user,
                }),
            )
            .unwrap_err();
        assert_eq!(err, PeripheryError::InsufficientWsei);
        assert_eq!(periphery.world().native_balance(user), U256::from(100));

        let receipt = periphery.last_receipt().unwrap();
        assert_eq!(receipt.status, TxStatus::Reverted("Insufficient WSEI".to_string()));
        assert!(receipt.events.is_empty());
    }

    #[test]
    fn test_wsei_deposit_call() {
        let mut world = World::new();
        let user = world.create_account();
        world.ledger_mut().credit_native(user, U256::from(100));
        let mut periphery = Periphery::new(world);

        periphery
            .submit(user, U256::from(40), Call::Token(TokenCall::WseiDeposit))
            .unwrap();
        let wsei = periphery.world().wsei();
        assert_eq!(periphery.world().balance_of(wsei, user), U256::from(40));
        assert_eq!(periphery.world().native_balance(user), U256::from(60));
        assert_eq!(periphery.world().native_balance(wsei), U256::from(40));
        let receipt = periphery.last_receipt().unwrap();
        assert!(receipt.is_success());
        assert_eq!(receipt.value, U256::from(40));
        assert_eq!(
            receipt.events,
            vec![ChainEvent::deposit(wsei, user, U256::from(40))]
        );

        assert_eq!(
            periphery.submit(
                user,
                U256::from(1),
                Call::Token(TokenCall::Transfer {
                    token: wsei,
                    to: user,
                    amount: U256::zero()
                })
            ),
            Err(PeripheryError::NonPayable)
        );
        assert_eq!(periphery.world().native_balance(user), U256::from(60));
        assert_eq!(periphery.last_receipt().unwrap().value, U256::one());
    }
}
