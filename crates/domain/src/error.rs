//! Errors raised by the value types and fixed-point math.

use thiserror::Error;

/// Failures of the pure domain layer.
///
/// The short upper-case messages mirror the revert reasons of the pool
/// libraries so that callers can match on them in receipts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A path must contain at least one pool.
    #[error("path contains no pool")]
    EmptyPath,
    /// The byte length of an encoded path is not `20 + 23 * n`.
    #[error("invalid path length {0}")]
    InvalidPathLength(usize),
    /// Token and fee lists do not describe the same number of hops.
    #[error("{tokens} tokens do not match {fees} fees")]
    PathArity {
        /// Number of tokens supplied.
        tokens: usize,
        /// Number of fees supplied.
        fees: usize,
    },
    /// A hop does not start where the previous one ended.
    #[error("hop {0} is not chained to the previous hop")]
    BrokenPath(usize),
    /// Fee is not one of the enabled tiers.
    #[error("unknown fee tier {0}")]
    UnknownFee(u32),
    /// Both sides of a pair are the same token.
    #[error("identical addresses")]
    IdenticalAddresses,
    /// Tokens were expected in canonical order.
    #[error("tokens not sorted")]
    UnsortedTokens,
    /// Hex input could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    /// Tick outside `[MIN_TICK, MAX_TICK]`.
    #[error("T")]
    TickOutOfRange(i32),
    /// Sqrt price outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
    #[error("R")]
    SqrtPriceOutOfRange,
    /// Liquidity underflow when applying a negative delta.
    #[error("LS")]
    LiquiditySub,
    /// Liquidity overflow when applying a positive delta.
    #[error("LA")]
    LiquidityAdd,
    /// Result does not fit the target width.
    #[error("arithmetic overflow")]
    Overflow,
    /// Denominator was zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Price or liquidity input was zero where a positive value is required.
    #[error("zero price or liquidity")]
    ZeroInput,
}
