use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed token balance change of a pool.
///
/// Positive amounts are owed to the pool (the swapper pays them), negative
/// amounts leave the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenDelta {
    /// The pool must receive this amount.
    Owed(U256),
    /// The pool has paid out this amount.
    Paid(U256),
}

impl TokenDelta {
    pub fn zero() -> Self {
        TokenDelta::Owed(U256::zero())
    }

    /// Strictly positive: something is owed to the pool.
    pub fn is_positive(&self) -> bool {
        matches!(self, TokenDelta::Owed(amount) if !amount.is_zero())
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, TokenDelta::Paid(amount) if !amount.is_zero())
    }

    pub fn abs(&self) -> U256 {
        match self {
            TokenDelta::Owed(amount) | TokenDelta::Paid(amount) => *amount,
        }
    }
}

impl fmt::Display for TokenDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenDelta::Owed(amount) => write!(f, "{amount}"),
            TokenDelta::Paid(amount) if amount.is_zero() => write!(f, "0"),
            TokenDelta::Paid(amount) => write!(f, "-{amount}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_helpers() {
        assert!(TokenDelta::Owed(U256::from(3)).is_positive());
        assert!(!TokenDelta::zero().is_positive());
        assert!(!TokenDelta::Paid(U256::zero()).is_negative());
        assert!(TokenDelta::Paid(U256::one()).is_negative());
        assert_eq!(TokenDelta::Paid(U256::from(5)).to_string(), "-5");
        assert_eq!(TokenDelta::Paid(U256::from(5)).abs(), U256::from(5));
    }
}
