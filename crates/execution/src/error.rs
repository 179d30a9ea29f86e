//! Errors raised by the periphery contracts.

use periphery_domain::error::DomainError;
use periphery_simulation::error::ChainError;
use thiserror::Error;

/// Failures of router, position manager and migrator calls.
///
/// Display strings are the revert reasons callers match on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeripheryError {
    /// A ledger, pool or pair operation failed.
    #[error(transparent)]
    Chain(#[from] ChainError),
    /// Invalid input to the value types or math.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Transaction too old")]
    TransactionTooOld,
    #[error("Too little received")]
    TooLittleReceived,
    #[error("Too much requested")]
    TooMuchRequested,
    /// An exact-output swap without a price limit stopped short of the amount.
    #[error("Output amount not reached")]
    OutputNotReached,
    #[error("Insufficient WSEI")]
    InsufficientWsei,
    #[error("Insufficient token")]
    InsufficientToken,
    #[error("Invalid fee bips")]
    InvalidFeeBips,
    #[error("Invalid callback caller")]
    InvalidCallbackCaller,
    /// Swap callback with nothing to pay, or a collect that asks for nothing.
    #[error("Zero amount")]
    ZeroAmount,

    #[error("Price slippage check")]
    PriceSlippage,
    #[error("Not approved")]
    NotApproved,
    #[error("Not cleared")]
    NotCleared,
    #[error("Invalid token ID")]
    InvalidTokenId,
    #[error("Not the token owner")]
    NotTokenOwner,
    #[error("Approval to current owner")]
    ApprovalToOwner,
    #[error("Transfer to the zero address")]
    TransferToZeroAddress,

    #[error("Percentage too small")]
    PercentageTooSmall,
    #[error("Percentage too large")]
    PercentageTooLarge,

    /// Native value attached to a call that cannot receive it.
    #[error("Non-payable call")]
    NonPayable,
}
