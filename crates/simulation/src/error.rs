//! Errors raised by the in-memory ledger, pools and pairs.

use periphery_domain::error::DomainError;
use periphery_domain::token::Address;
use primitive_types::U256;
use thiserror::Error;

/// Failures of ledger operations and pool state transitions.
///
/// Pool failures display the short reason codes used by the pool contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("unknown token {0:?}")]
    UnknownToken(Address),
    #[error("insufficient balance of {token:?} for {owner:?}: needed {needed}, available {available}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        needed: U256,
        available: U256,
    },
    #[error("insufficient allowance of {token:?} from {owner:?} to {spender:?}: needed {needed}, available {available}")]
    InsufficientAllowance {
        token: Address,
        owner: Address,
        spender: Address,
        needed: U256,
        available: U256,
    },
    #[error("insufficient native balance for {owner:?}: needed {needed}, available {available}")]
    InsufficientNative {
        owner: Address,
        needed: U256,
        available: U256,
    },

    #[error("{to:?} does not accept native currency from {from:?}")]
    NativeRejected { from: Address, to: Address },

    #[error("pool {0:?} does not exist")]
    PoolNotFound(Address),
    #[error("pool {0:?} already exists")]
    PoolExists(Address),
    #[error("pool {0:?} is not initialized")]
    PoolNotInitialized(Address),
    #[error("AI")]
    AlreadyInitialized,
    #[error("LOK")]
    Locked,
    #[error("AS")]
    ZeroAmountSpecified,
    #[error("SPL")]
    PriceLimit,
    #[error("IIA")]
    InsufficientInputAmount,
    #[error("M0")]
    InsufficientMint0,
    #[error("M1")]
    InsufficientMint1,
    #[error("TLU")]
    TickOrder,
    #[error("TLM")]
    TickLowerTooLow,
    #[error("TUM")]
    TickUpperTooHigh,
    #[error("tick {tick} is not a multiple of spacing {spacing}")]
    TickNotSpaced { tick: i32, spacing: i32 },
    #[error("LO")]
    TickLiquidityOverflow,
    #[error("NP")]
    NoPosition,
    #[error("zero liquidity")]
    ZeroLiquidity,

    #[error("pair {0:?} does not exist")]
    PairNotFound(Address),
    #[error("pair {0:?} already exists")]
    PairExists(Address),
    #[error("INSUFFICIENT_LIQUIDITY_MINTED")]
    InsufficientLiquidityMinted,
    #[error("INSUFFICIENT_LIQUIDITY_BURNED")]
    InsufficientLiquidityBurned,
}
