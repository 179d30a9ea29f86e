//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use periphery_domain::prelude::*;
//! ```

pub use crate::error::DomainError;
pub use crate::fees::FeeAmount;
pub use crate::math::price_tick::encode_price_sqrt;
pub use crate::math::tick_math::{
    MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, max_usable_tick, min_usable_tick,
};
pub use crate::params::{
    CollectParams, DecreaseLiquidityParams, ExactInputParams, ExactInputSingleParams,
    ExactOutputParams, ExactOutputSingleParams, IncreaseLiquidityParams, MigrateParams,
    MintParams, NO_DEADLINE,
};
pub use crate::path::{Hop, Path};
pub use crate::pool::{PoolKey, compute_pair_address, compute_pool_address};
pub use crate::position::{Position, PositionKey};
pub use crate::token::{Address, Token, parse_address, sort_tokens};
pub use crate::value_objects::{Price, TokenDelta};
pub use primitive_types::U256;
