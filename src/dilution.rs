// 5.0 dilution.rs: what-if for a priced round. implied pps = pre money val /
// existing shares, new investor shares = raised / pps floored to 4dp. pct
// rows floor independently, so the column can sum to 99.9996 instead of 100.
// callers tolerate +/- 0.01.

use crate::captable::{CapTableEntry, CapTableSnapshot, StakeholderShares};
use crate::error::{EngineError, Result};
use crate::types::{ownership_percent, Money, Shares};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundInput {
    pub round_name: String,
    pub pre_money_valuation: Money,
    pub amount_raised: Money,
    pub new_share_class: String,
    pub investor_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DilutionResult {
    pub round_name: String,
    pub pre_round: CapTableSnapshot,
    pub post_round: CapTableSnapshot,
    pub new_investor: CapTableEntry,
}

/// Models the dilution impact of a priced round on the current cap table.
pub fn model_dilution(existing: &[StakeholderShares], input: &RoundInput) -> Result<DilutionResult> {
    let total_existing: Shares = existing.iter().map(|s| s.shares).sum();
    if !total_existing.is_positive() {
        return Err(EngineError::DivisionByZero { field: "shares" });
    }
    if !input.pre_money_valuation.is_positive() {
        return Err(EngineError::validation(
            "pre_money_valuation",
            "must be positive",
        ));
    }

    let pps = Money::new(input.pre_money_valuation.value() / total_existing.value());
    let new_shares = Shares::new(input.amount_raised.value() / pps.value()).floor_4();
    let total_post = total_existing.add(new_shares);

    let pre_entries = existing
        .iter()
        .map(|s| entry(s, total_existing))
        .collect::<Vec<_>>();

    let mut post_entries = existing
        .iter()
        .map(|s| entry(s, total_post))
        .collect::<Vec<_>>();

    let new_investor = CapTableEntry {
        stakeholder_id: None,
        stakeholder_name: input.investor_name.clone(),
        share_class_name: input.new_share_class.clone(),
        shares: new_shares,
        ownership_pct: ownership_percent(new_shares, total_post),
    };
    post_entries.push(new_investor.clone());

    Ok(DilutionResult {
        round_name: input.round_name.clone(),
        pre_round: CapTableSnapshot {
            total_shares: total_existing,
            entries: pre_entries,
        },
        post_round: CapTableSnapshot {
            total_shares: total_post,
            entries: post_entries,
        },
        new_investor,
    })
}

fn entry(position: &StakeholderShares, total: Shares) -> CapTableEntry {
    CapTableEntry {
        stakeholder_id: Some(position.stakeholder_id.clone()),
        stakeholder_name: position.stakeholder_name.clone(),
        share_class_name: position.share_class_name.clone(),
        shares: position.shares,
        ownership_pct: ownership_percent(position.shares, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StakeholderId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn holder(id: &str, name: &str, shares: Decimal) -> StakeholderShares {
        StakeholderShares {
            stakeholder_id: StakeholderId(id.into()),
            stakeholder_name: name.into(),
            share_class_name: "Common".into(),
            shares: Shares::new(shares),
        }
    }

    fn series_a_input() -> RoundInput {
        RoundInput {
            round_name: "Series A".into(),
            pre_money_valuation: Money::new(dec!(15000000)),
            amount_raised: Money::new(dec!(5000000)),
            new_share_class: "Preferred A".into(),
            investor_name: "Acme VC".into(),
        }
    }

    #[test]
    fn standard_series_a() {
        // $5M at $15M pre on 10M shares: PPS = 1.50, new shares = 3,333,333.3333
        let existing = [
            holder("f1", "Alice", dec!(7000000)),
            holder("f2", "Bob", dec!(3000000)),
        ];

        let result = model_dilution(&existing, &series_a_input()).unwrap();

        assert_eq!(result.new_investor.shares.value(), dec!(3333333.3333));
        assert_eq!(result.new_investor.ownership_pct, dec!(24.9999));
        assert_eq!(result.post_round.total_shares.value(), dec!(13333333.3333));
        assert_eq!(result.round_name, "Series A");
    }

    #[test]
    fn seed_round_twenty_percent_dilution() {
        // $1M at $4M pre on 10M shares: PPS = 0.40, new shares = 2.5M = 20%
        let existing = [holder("f1", "Founder", dec!(10000000))];
        let input = RoundInput {
            round_name: "Seed".into(),
            pre_money_valuation: Money::new(dec!(4000000)),
            amount_raised: Money::new(dec!(1000000)),
            new_share_class: "Common".into(),
            investor_name: "Angel".into(),
        };

        let result = model_dilution(&existing, &input).unwrap();

        assert_eq!(result.new_investor.shares.value(), dec!(2500000));
        assert_eq!(result.new_investor.ownership_pct, dec!(20));
        assert_eq!(result.post_round.total_shares.value(), dec!(12500000));
    }

    #[test]
    fn founder_dilution_from_one_third_round() {
        let existing = [holder("f1", "Founder", dec!(10000000))];
        let input = RoundInput {
            round_name: "Series A".into(),
            pre_money_valuation: Money::new(dec!(10000000)),
            amount_raised: Money::new(dec!(5000000)),
            new_share_class: "Preferred A".into(),
            investor_name: "VC Fund".into(),
        };

        let result = model_dilution(&existing, &input).unwrap();

        assert_eq!(result.pre_round.entries[0].ownership_pct, dec!(100));
        assert_eq!(result.post_round.entries[0].ownership_pct, dec!(66.6666));
    }

    #[test]
    fn percentages_sum_within_tolerance() {
        let existing = [
            holder("f1", "Alice", dec!(7000000)),
            holder("f2", "Bob", dec!(3000000)),
        ];

        let result = model_dilution(&existing, &series_a_input()).unwrap();

        let total_pct: Decimal = result
            .post_round
            .entries
            .iter()
            .map(|e| e.ownership_pct)
            .sum();
        // per-entry floors can leave the sum a hair under 100
        assert!((total_pct - dec!(100)).abs() <= dec!(0.01));

        let pre_total: Shares = result.pre_round.entries.iter().map(|e| e.shares).sum();
        assert_eq!(pre_total, result.pre_round.total_shares);
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = model_dilution(&[], &series_a_input()).unwrap_err();
        assert_eq!(err.field(), "shares");
    }

    #[test]
    fn zero_pre_money_is_rejected() {
        let existing = [holder("f1", "Founder", dec!(1000))];
        let input = RoundInput {
            pre_money_valuation: Money::zero(),
            ..series_a_input()
        };
        let err = model_dilution(&existing, &input).unwrap_err();
        assert_eq!(err.field(), "pre_money_valuation");
    }
}
