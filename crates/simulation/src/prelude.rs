//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use periphery_simulation::prelude::*;
//! ```

// Callbacks
pub use crate::callback::{MintCallback, SwapCallback};

// Errors
pub use crate::error::ChainError;

// Events
pub use crate::event::{ChainEvent, EventData};

// Ledger
pub use crate::ledger::Ledger;

// Pairs
pub use crate::pair::LegacyPair;

// Pools
pub use crate::pool::{ConcentratedPool, PositionInfo, Slot0, SwapAmount};

// Ticks
pub use crate::tick::{TickInfo, TickTable};

// World
pub use crate::world::{WSEI_SYMBOL, World};
