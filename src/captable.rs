//! Cap-table snapshots: who owns what fraction of the company.
//!
//! A snapshot is assembled from per-stakeholder share positions. Duplicate
//! (stakeholder, share class) rows are merged, ownership percentages are
//! floored to 4 decimals per entry, and entries keep first-appearance order so
//! the same input always serializes to the same output.

use crate::types::{ownership_percent, Shares, StakeholderId};
use crate::vesting::Grant;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeholderShares {
    pub stakeholder_id: StakeholderId,
    pub stakeholder_name: String,
    pub share_class_name: String,
    pub shares: Shares,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapTableEntry {
    /// None for entries that do not correspond to a stored stakeholder yet,
    /// like a modeled round's incoming investor.
    pub stakeholder_id: Option<StakeholderId>,
    pub stakeholder_name: String,
    pub share_class_name: String,
    pub shares: Shares,
    pub ownership_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapTableSnapshot {
    pub total_shares: Shares,
    pub entries: Vec<CapTableEntry>,
}

/// Aggregates raw positions into a snapshot, merging duplicate
/// (stakeholder, share class) rows.
pub fn build_snapshot(positions: &[StakeholderShares]) -> CapTableSnapshot {
    let mut entries: Vec<CapTableEntry> = Vec::new();

    for pos in positions {
        match entries.iter_mut().find(|e| {
            e.stakeholder_id.as_ref() == Some(&pos.stakeholder_id)
                && e.share_class_name == pos.share_class_name
        }) {
            Some(entry) => entry.shares = entry.shares.add(pos.shares),
            None => entries.push(CapTableEntry {
                stakeholder_id: Some(pos.stakeholder_id.clone()),
                stakeholder_name: pos.stakeholder_name.clone(),
                share_class_name: pos.share_class_name.clone(),
                shares: pos.shares,
                ownership_pct: Decimal::ZERO,
            }),
        }
    }

    let total_shares: Shares = entries.iter().map(|e| e.shares).sum();
    for entry in &mut entries {
        entry.ownership_pct = ownership_percent(entry.shares, total_shares);
    }

    CapTableSnapshot {
        total_shares,
        entries,
    }
}

/// Outstanding shares ahead of a SAFE conversion: the sum of all grant
/// quantities. Other un-converted SAFEs contribute nothing by construction.
pub fn pre_money_shares(grants: &[Grant]) -> Shares {
    grants.iter().map(|g| g.quantity).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GrantId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn pos(id: &str, name: &str, class: &str, shares: Decimal) -> StakeholderShares {
        StakeholderShares {
            stakeholder_id: StakeholderId(id.into()),
            stakeholder_name: name.into(),
            share_class_name: class.into(),
            shares: Shares::new(shares),
        }
    }

    #[test]
    fn snapshot_totals_and_percentages() {
        let snapshot = build_snapshot(&[
            pos("f1", "Alice", "Common", dec!(6000000)),
            pos("f2", "Bob", "Common", dec!(4000000)),
        ]);

        assert_eq!(snapshot.total_shares.value(), dec!(10000000));
        assert_eq!(snapshot.entries[0].ownership_pct, dec!(60));
        assert_eq!(snapshot.entries[1].ownership_pct, dec!(40));
    }

    #[test]
    fn duplicate_rows_are_merged() {
        let snapshot = build_snapshot(&[
            pos("f1", "Alice", "Common", dec!(1000)),
            pos("f1", "Alice", "Common", dec!(500)),
            pos("f1", "Alice", "Preferred A", dec!(200)),
        ]);

        assert_eq!(snapshot.entries.len(), 2);
        assert_eq!(snapshot.entries[0].shares.value(), dec!(1500));
        assert_eq!(snapshot.entries[1].shares.value(), dec!(200));
    }

    #[test]
    fn entries_keep_input_order() {
        let snapshot = build_snapshot(&[
            pos("z", "Zoe", "Common", dec!(100)),
            pos("a", "Ann", "Common", dec!(100)),
        ]);

        assert_eq!(
            snapshot.entries[0].stakeholder_id,
            Some(StakeholderId("z".into()))
        );
        assert_eq!(
            snapshot.entries[1].stakeholder_id,
            Some(StakeholderId("a".into()))
        );
    }

    #[test]
    fn empty_table_has_zero_percentages() {
        let snapshot = build_snapshot(&[pos("f1", "Alice", "Common", dec!(0))]);
        assert!(snapshot.total_shares.is_zero());
        assert_eq!(snapshot.entries[0].ownership_pct, Decimal::ZERO);
    }

    #[test]
    fn pre_money_shares_sums_grants() {
        let grant = |id: &str, qty: Decimal| Grant {
            id: GrantId(id.into()),
            quantity: Shares::new(qty),
            grant_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vesting_schedule: None,
        };

        let total = pre_money_shares(&[grant("g1", dec!(7000000)), grant("g2", dec!(3000000))]);
        assert_eq!(total.value(), dec!(10000000));
    }
}
