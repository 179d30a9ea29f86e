//! Callbacks a pool makes into its caller while a swap or mint is in flight.
//!
//! A pool transfers its output first and then asks the caller to pay what it
//! owes. Implementors get mutable access to the whole [`World`] so they can
//! move tokens or start nested swaps from inside the callback.

use crate::error::ChainError;
use crate::world::World;
use periphery_domain::token::Address;
use periphery_domain::value_objects::TokenDelta;
use primitive_types::U256;

/// Receiver of `swap` callbacks.
pub trait SwapCallback {
    /// Opaque data passed through the pool unchanged.
    type Data;
    type Error: From<ChainError>;

    /// Called by `pool` after it has sent the output. Deltas are from the
    /// pool's point of view: the `Owed` side must be paid before returning.
    fn swap_callback(
        &mut self,
        world: &mut World,
        pool: Address,
        amount0_delta: TokenDelta,
        amount1_delta: TokenDelta,
        data: &Self::Data,
    ) -> Result<(), Self::Error>;
}

/// Receiver of `mint` callbacks.
pub trait MintCallback {
    type Data;
    type Error: From<ChainError>;

    /// Called by `pool` with the token amounts the new liquidity requires.
    fn mint_callback(
        &mut self,
        world: &mut World,
        pool: Address,
        amount0_owed: U256,
        amount1_owed: U256,
        data: &Self::Data,
    ) -> Result<(), Self::Error>;
}
