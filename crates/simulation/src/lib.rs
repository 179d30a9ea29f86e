//! In-memory reference chain for the periphery.
//!
//! This crate provides the contracts the periphery talks to:
//! - ERC20 balances, allowances and native currency
//! - Wrapped SEI with 1:1 native backing
//! - The concentrated-liquidity factory and its pools
//! - The legacy constant-product factory and its pairs
//! - An event log and clone-based snapshots for reverts

/// Prelude module for convenient imports.
pub mod prelude;

/// Swap and mint callbacks.
pub mod callback;
/// Chain errors.
pub mod error;
/// Logged events.
pub mod event;
/// Token and native balances.
pub mod ledger;
/// Legacy pairs.
pub mod pair;
/// Concentrated-liquidity pool state.
pub mod pool;
/// Initialized ticks.
pub mod tick;
/// The chain itself.
pub mod world;
