//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use periphery_execution::prelude::*;
//! ```

// Config
pub use crate::config::{DEFAULT_NATIVE_LABEL, PeripheryConfig};

// Descriptor
pub use crate::descriptor::{PositionDescriptor, TokenMetadata, WSEI_PRIORITY};

// Errors
pub use crate::error::PeripheryError;

// Fixture
pub use crate::fixture::{CompleteFixture, POOL_LIQUIDITY, TRADER_BALANCE};

// Migrator
pub use crate::migrator::{Migrator, MigratorCall, MigratorOutput};

// Multicall
pub use crate::multicall::execute_batch;

// Payments
pub use crate::payments::{MAX_FEE_BIPS, Payments};

// Periphery
pub use crate::periphery::{Call, CallOutput, Deployment, Periphery, Receipt, TokenCall, TxStatus};

// Pool initializer
pub use crate::pool_initializer::create_and_initialize_pool_if_necessary;

// Position manager
pub use crate::position_manager::{
    IncreaseResult, ManagerCall, ManagerOutput, MintCallbackData, MintResult, PositionManager,
};

// Router
pub use crate::router::{RouterCall, RouterOutput, SwapCallbackData, SwapRouter};

// Sequencer
pub use crate::sequencer::SharedPeriphery;

// Validation
pub use crate::validation::{check_deadline, verify_callback};
