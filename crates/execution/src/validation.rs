//! Deadline and callback-caller checks.

use crate::error::PeripheryError;
use periphery_domain::fees::FeeAmount;
use periphery_domain::pool::{PoolKey, compute_pool_address};
use periphery_domain::token::Address;
use periphery_simulation::world::World;

/// Fails with "Transaction too old" once the block time passes `deadline`.
pub fn check_deadline(world: &World, deadline: u64) -> Result<(), PeripheryError> {
    if world.block_timestamp() > deadline {
        return Err(PeripheryError::TransactionTooOld);
    }
    Ok(())
}

/// Checks that `caller` is the pool deployed by `factory` for the given
/// tokens and fee, and returns its key.
pub fn verify_callback(
    factory: Address,
    token_a: Address,
    token_b: Address,
    fee: FeeAmount,
    caller: Address,
) -> Result<PoolKey, PeripheryError> {
    let key = PoolKey::new(token_a, token_b, fee)?;
    if compute_pool_address(factory, &key) != caller {
        return Err(PeripheryError::InvalidCallbackCaller);
    }
    Ok(key)
}
