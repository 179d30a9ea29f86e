//! Value types and fixed-point math for the concentrated-liquidity periphery.
//!
//! This crate has no notion of balances or state. It provides:
//! - Addresses, token metadata and fee tiers
//! - The packed multi-hop path codec
//! - Deterministic pool and pair address derivation
//! - Q64.96 math ports of the pool libraries
//! - Call parameters for the router, position manager and migrator

/// Prelude module for convenient imports.
pub mod prelude;

/// Domain errors.
pub mod error;
/// Fee tiers.
pub mod fees;
/// Fixed-point math.
pub mod math;
/// Call parameters.
pub mod params;
/// Multi-hop path codec.
pub mod path;
/// Pool keys and address derivation.
pub mod pool;
/// Liquidity positions.
pub mod position;
/// Addresses and token metadata.
pub mod token;
/// Small value objects.
pub mod value_objects;
