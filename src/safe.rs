// 4.0 safe.rs: SAFE -> equity at a priced round. three candidate prices (cap,
// discount, round) and the lowest wins: lowest pps = most shares for the
// holder. pre vs post money differ only in the cap formula.

use crate::error::{EngineError, Result};
use crate::types::{Money, SafeId, Shares};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafeType {
    PreMoney,
    PostMoney,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeNote {
    pub id: SafeId,
    pub investment_amount: Money,
    /// None or zero means no cap candidate.
    pub valuation_cap: Option<Money>,
    /// Fraction in (0, 1): 0.20 = 20% discount. None or zero means no
    /// discount candidate.
    pub discount_rate: Option<Decimal>,
    pub safe_type: SafeType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRound {
    pub price_per_share: Money,
    pub pre_money_valuation: Money,
    pub amount_raised: Money,
}

/// Which candidate price won the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMethod {
    Cap,
    Discount,
    RoundPrice,
}

impl fmt::Display for ConversionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversionMethod::Cap => "cap",
            ConversionMethod::Discount => "discount",
            ConversionMethod::RoundPrice => "round_price",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeConversionResult {
    pub safe_id: SafeId,
    pub shares_issued: Shares,
    pub effective_pps: Money,
    pub conversion_method: ConversionMethod,
}

/// Converts a SAFE into shares, dispatching on its type.
///
/// `pre_money_shares` is the company's outstanding share count at conversion,
/// excluding shares from other un-converted SAFEs.
pub fn convert_safe(
    safe: &SafeNote,
    round: &FundingRound,
    pre_money_shares: Shares,
) -> Result<SafeConversionResult> {
    match safe.safe_type {
        SafeType::PreMoney => convert_safe_pre_money(safe, round, pre_money_shares),
        SafeType::PostMoney => convert_safe_post_money(safe, round, pre_money_shares),
    }
}

/// Pre-money conversion: the cap applies to the company valuation before the
/// SAFE investment, so the cap price is `valuation_cap / pre_money_shares`.
pub fn convert_safe_pre_money(
    safe: &SafeNote,
    round: &FundingRound,
    pre_money_shares: Shares,
) -> Result<SafeConversionResult> {
    validate(safe, pre_money_shares)?;

    let cap_pps = safe
        .valuation_cap
        .filter(|cap| !cap.is_zero())
        .map(|cap| Money::new(cap.value() / pre_money_shares.value()));

    finish(safe, round, cap_pps)
}

/// Post-money conversion: the cap fixes the holder's ownership at
/// `investment / valuation_cap`, which makes the cap price
/// `(valuation_cap - investment) / pre_money_shares`.
pub fn convert_safe_post_money(
    safe: &SafeNote,
    round: &FundingRound,
    pre_money_shares: Shares,
) -> Result<SafeConversionResult> {
    validate(safe, pre_money_shares)?;

    // 4.1: post-money cap pins ownership at invest/cap -> cap pps =
    // (cap - invest) / pre money shares
    let cap_pps = safe
        .valuation_cap
        .filter(|cap| !cap.is_zero())
        .map(|cap| {
            let company_cap = cap.sub(safe.investment_amount);
            Money::new(company_cap.value() / pre_money_shares.value())
        });

    finish(safe, round, cap_pps)
}

fn validate(safe: &SafeNote, pre_money_shares: Shares) -> Result<()> {
    if !safe.investment_amount.is_positive() {
        return Err(EngineError::validation(
            "investment_amount",
            "must be positive",
        ));
    }
    if !pre_money_shares.is_positive() {
        return Err(EngineError::DivisionByZero {
            field: "pre_money_shares",
        });
    }
    Ok(())
}

fn finish(
    safe: &SafeNote,
    round: &FundingRound,
    cap_pps: Option<Money>,
) -> Result<SafeConversionResult> {
    let round_pps = round.price_per_share;
    let mut effective_pps = round_pps;
    let mut method = ConversionMethod::RoundPrice;

    if let Some(cap_pps) = cap_pps {
        if cap_pps < effective_pps {
            effective_pps = cap_pps;
            method = ConversionMethod::Cap;
        }
    }

    if let Some(rate) = safe.discount_rate.filter(|r| !r.is_zero()) {
        let discount_pps = round_pps.mul(Decimal::ONE - rate);
        if discount_pps < effective_pps {
            effective_pps = discount_pps;
            method = ConversionMethod::Discount;
        }
    }

    // a post-money cap at or below the investment amount would price shares
    // at zero or less
    if !effective_pps.is_positive() {
        return Err(EngineError::validation(
            "valuation_cap",
            "effective price per share must be positive",
        ));
    }

    let shares_issued =
        Shares::new(safe.investment_amount.value() / effective_pps.value()).floor_4();

    Ok(SafeConversionResult {
        safe_id: safe.id.clone(),
        shares_issued,
        effective_pps,
        conversion_method: method,
    })
}
