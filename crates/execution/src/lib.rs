//! Periphery contracts for concentrated-liquidity pools.
//!
//! This crate provides the user-facing contracts and their transaction boundary:
//! - Payment helpers for native currency, WSEI and token sweeps
//! - Swap router with single and multi-hop exact input and exact output swaps
//! - Atomic multicall batching
//! - Non-fungible position manager and position metadata
//! - Migration of legacy pair liquidity
//! - Snapshot-based transactions with receipts and a shared async handle

/// Prelude module for convenient imports.
pub mod prelude;

/// Deployment configuration.
pub mod config;
/// Position token metadata.
pub mod descriptor;
/// Periphery errors.
pub mod error;
/// Reference deployment for tests and demos.
pub mod fixture;
/// Legacy liquidity migration.
pub mod migrator;
/// Atomic call batches.
pub mod multicall;
/// Native and token payments.
pub mod payments;
/// Transaction boundary.
pub mod periphery;
/// Pool creation helper.
pub mod pool_initializer;
/// Position manager.
pub mod position_manager;
/// Swap router.
pub mod router;
/// Serialized shared handle.
pub mod sequencer;
/// Deadline and callback checks.
pub mod validation;
