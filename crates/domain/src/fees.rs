use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fee tiers enabled on the factory, in hundredths of a bip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeeAmount {
    /// 0.05%, tick spacing 10.
    Low,
    /// 0.3%, tick spacing 60.
    Medium,
    /// 1%, tick spacing 200.
    High,
}

impl FeeAmount {
    pub const ALL: [FeeAmount; 3] = [FeeAmount::Low, FeeAmount::Medium, FeeAmount::High];

    /// Fee in pips (1e-6).
    pub fn pips(self) -> u32 {
        match self {
            FeeAmount::Low => 500,
            FeeAmount::Medium => 3000,
            FeeAmount::High => 10000,
        }
    }

    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeAmount::Low => 10,
            FeeAmount::Medium => 60,
            FeeAmount::High => 200,
        }
    }

    pub fn from_pips(pips: u32) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|fee| fee.pips() == pips)
            .ok_or(DomainError::UnknownFee(pips))
    }

    /// Human readable percentage, e.g. `0.3%`.
    pub fn percent_label(self) -> &'static str {
        match self {
            FeeAmount::Low => "0.05%",
            FeeAmount::Medium => "0.3%",
            FeeAmount::High => "1%",
        }
    }
}

impl TryFrom<u32> for FeeAmount {
    type Error = DomainError;

    fn try_from(pips: u32) -> Result<Self, Self::Error> {
        Self::from_pips(pips)
    }
}

impl fmt::Display for FeeAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pips())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_tiers() {
        assert_eq!(FeeAmount::Medium.pips(), 3000);
        assert_eq!(FeeAmount::Medium.tick_spacing(), 60);
        assert_eq!(FeeAmount::from_pips(500).unwrap(), FeeAmount::Low);
        assert_eq!(FeeAmount::try_from(10000).unwrap(), FeeAmount::High);
        assert_eq!(FeeAmount::from_pips(100), Err(DomainError::UnknownFee(100)));
        assert_eq!(FeeAmount::High.percent_label(), "1%");
    }
}
