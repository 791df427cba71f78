//! Share classes and their preference economics.
//!
//! A share class is immutable during a computation. Preferred classes carry a
//! liquidation preference (a multiple of invested capital, paid in seniority
//! order) and optionally participate in the residual alongside common, with or
//! without a cap. The waterfall engine is a closed function over these flags;
//! there is no subclassing.

use crate::types::{Money, Shares};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClass {
    pub name: String,
    pub is_preferred: bool,
    /// Multiple of invested capital paid before junior classes. Typically 1.
    pub liquidation_multiple: Decimal,
    /// Meaningful only when preferred.
    pub is_participating: bool,
    /// Ceiling on total payout as a multiple of invested capital. None = uncapped.
    pub participation_cap: Option<Decimal>,
    /// Original issuance price. None defaults to 1 for preference math.
    pub price_per_share: Option<Money>,
    /// Higher seniority is paid first.
    pub seniority: i32,
}

impl ShareClass {
    /// Plain common stock: no preference, lowest seniority.
    pub fn common(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_preferred: false,
            liquidation_multiple: Decimal::ZERO,
            is_participating: false,
            participation_cap: None,
            price_per_share: None,
            seniority: 0,
        }
    }

    pub fn issue_price(&self) -> Money {
        self.price_per_share.unwrap_or_else(Money::one)
    }

    /// Capital invested in this class: shares outstanding times issue price.
    pub fn invested(&self, total_shares: Shares) -> Money {
        Money::new(total_shares.value() * self.issue_price().value())
    }

    /// Liquidation preference owed before any junior class is paid.
    pub fn preference(&self, total_shares: Shares) -> Money {
        self.invested(total_shares).mul(self.liquidation_multiple)
    }

    /// Total payout ceiling for a capped participating class. None means the
    /// class is not participating or participates uncapped.
    pub fn participation_cap_amount(&self, total_shares: Shares) -> Option<Money> {
        if !self.is_participating {
            return None;
        }
        let cap = self.participation_cap?;
        Some(self.invested(total_shares).mul(cap))
    }
}
