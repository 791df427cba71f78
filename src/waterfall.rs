// 6.0 waterfall.rs: the deep end. seniority-ordered preferences first, then
// pro-rata residual with participation caps. non-participating preferred can
// flip to common when pro-rata beats the preference, and one flip changes
// everyone else's math -> bounded fixed point over the decision vector.
// strict improvement only, ties keep the preference.
//
// capped classes do NOT spill their excess back into the pool. total payout
// can come in under the exit in capped scenarios.

use crate::error::{EngineError, Result};
use crate::share_class::ShareClass;
use crate::types::{Money, Shares, StakeholderId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Decision rounds before giving up on a fixed point. Realistic cap tables
/// stabilize within a few rounds.
const MAX_CONVERSION_ROUNDS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderPosition {
    pub stakeholder_id: StakeholderId,
    pub stakeholder_name: String,
    pub shares: Shares,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareClassPosition {
    pub share_class: ShareClass,
    pub holders: Vec<HolderPosition>,
    pub total_shares: Shares,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallPayout {
    pub stakeholder_id: StakeholderId,
    pub stakeholder_name: String,
    pub share_class_name: String,
    pub shares: Shares,
    pub payout: Money,
    pub payout_per_share: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallResult {
    pub exit_valuation: Money,
    pub total_payout: Money,
    pub payouts: Vec<WaterfallPayout>,
    /// False when the conversion fixed point did not stabilize within the
    /// round limit; the payouts are then best-effort under the last decision
    /// vector.
    pub converged: bool,
}

// 6.0.1: payouts keyed per (class index, holder). a stakeholder holding
// several classes gets a separate line per class
type PayoutMap = HashMap<(usize, StakeholderId), Money>;

/// Computes the liquidation waterfall for a given exit valuation.
///
/// A position listing holders against zero outstanding shares is rejected as
/// a validation error; it means the caller aggregated the table wrong.
pub fn calculate_waterfall(
    positions: &[ShareClassPosition],
    exit_valuation: Money,
) -> Result<WaterfallResult> {
    for pos in positions {
        if pos.total_shares.is_zero() && !pos.holders.is_empty() {
            return Err(EngineError::validation(
                "total_shares",
                format!(
                    "class {} has holders but zero shares outstanding",
                    pos.share_class.name
                ),
            ));
        }
    }

    if !exit_valuation.is_positive() {
        return Ok(WaterfallResult {
            exit_valuation,
            total_payout: Money::zero(),
            payouts: Vec::new(),
            converged: true,
        });
    }

    let (converting, converged) = resolve_conversions(positions, exit_valuation);
    let payout_map = distribute(positions, exit_valuation, &converting);

    let mut payouts = Vec::new();
    let mut total_payout = Money::zero();

    for (idx, pos) in positions.iter().enumerate() {
        for holder in &pos.holders {
            let payout = payout_map
                .get(&(idx, holder.stakeholder_id.clone()))
                .copied()
                .unwrap_or_else(Money::zero);
            if !payout.is_positive() {
                continue;
            }

            let payout_per_share = if holder.shares.is_positive() {
                Money::new(payout.value() / holder.shares.value()).floor_4()
            } else {
                Money::zero()
            };

            payouts.push(WaterfallPayout {
                stakeholder_id: holder.stakeholder_id.clone(),
                stakeholder_name: holder.stakeholder_name.clone(),
                share_class_name: pos.share_class.name.clone(),
                shares: holder.shares,
                payout,
                payout_per_share,
            });
            total_payout = total_payout.add(payout);
        }
    }

    Ok(WaterfallResult {
        exit_valuation,
        total_payout,
        payouts,
        converged,
    })
}

/// Decides which non-participating preferred classes convert to common.
///
/// Each candidate compares its preference payout against its as-converted
/// payout, holding the other decisions fixed. Because one class converting
/// changes the pool for the rest, the pass repeats until no decision changes.
fn resolve_conversions(
    positions: &[ShareClassPosition],
    exit_valuation: Money,
) -> (Vec<bool>, bool) {
    let mut converting = vec![false; positions.len()];

    let candidates: Vec<usize> = positions
        .iter()
        .enumerate()
        .filter(|(_, p)| p.share_class.is_preferred && !p.share_class.is_participating)
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return (converting, true);
    }

    for _ in 0..MAX_CONVERSION_ROUNDS {
        let mut changed = false;

        for &idx in &candidates {
            let mut with_pref = converting.clone();
            with_pref[idx] = false;
            let pref_total = class_payout(positions, idx, &distribute(positions, exit_valuation, &with_pref));

            let mut with_conv = converting.clone();
            with_conv[idx] = true;
            let conv_total = class_payout(positions, idx, &distribute(positions, exit_valuation, &with_conv));

            // strict improvement only; a tie keeps the preference
            let should_convert = conv_total > pref_total;
            if should_convert != converting[idx] {
                converting[idx] = should_convert;
                changed = true;
            }
        }

        if !changed {
            return (converting, true);
        }
    }

    (converting, false)
}

/// Runs the payout distribution under a fixed conversion decision vector.
/// Converting classes forfeit their preference and join the common pool.
fn distribute(
    positions: &[ShareClassPosition],
    exit_valuation: Money,
    converting: &[bool],
) -> PayoutMap {
    let mut preferred: Vec<(usize, &ShareClassPosition)> = Vec::new();
    let mut common_pool: Vec<(usize, &ShareClassPosition)> = Vec::new();

    for (i, pos) in positions.iter().enumerate() {
        // empty class (no shares, no holders), nothing to distribute over
        if pos.total_shares.is_zero() {
            continue;
        }
        if pos.share_class.is_preferred && !converting[i] {
            preferred.push((i, pos));
        } else {
            common_pool.push((i, pos));
        }
    }

    // stable sort: equal seniority keeps input order
    preferred.sort_by(|(_, a), (_, b)| b.share_class.seniority.cmp(&a.share_class.seniority));

    let mut remaining = exit_valuation;
    let mut payouts = PayoutMap::new();
    let mut participating: Vec<(usize, &ShareClassPosition)> = Vec::new();

    // 6.1: phase 1: liquidation preferences, most senior first
    for &(idx, pos) in &preferred {
        if !remaining.is_positive() {
            break;
        }

        let preference = pos.share_class.preference(pos.total_shares);
        let paid = preference.min(remaining);
        remaining = remaining.sub(paid);

        allocate_pro_rata(idx, pos, paid, &mut payouts);

        if pos.share_class.is_participating {
            participating.push((idx, pos));
        }
    }

    // 6.2: phase 2: residual pro-rata over common pool + participating preferred
    if remaining.is_positive() {
        let participating_shares: Shares = common_pool
            .iter()
            .map(|(_, c)| c.total_shares)
            .chain(participating.iter().map(|(_, p)| p.total_shares))
            .sum();

        if participating_shares.is_positive() {
            for &(idx, pos) in &common_pool {
                let class_pool =
                    remaining.mul(pos.total_shares.value() / participating_shares.value());
                allocate_pro_rata(idx, pos, class_pool, &mut payouts);
            }

            for &(idx, pos) in &participating {
                let mut class_pool =
                    remaining.mul(pos.total_shares.value() / participating_shares.value());

                if let Some(cap) = pos.share_class.participation_cap_amount(pos.total_shares) {
                    let already_paid = class_payout_at(idx, pos, &payouts);
                    let max_additional = cap.sub(already_paid);
                    if !max_additional.is_positive() {
                        continue;
                    }
                    // capped excess is not redistributed to other classes
                    class_pool = class_pool.min(max_additional);
                }

                allocate_pro_rata(idx, pos, class_pool, &mut payouts);
            }
        }
    }

    payouts
}

fn allocate_pro_rata(idx: usize, pos: &ShareClassPosition, pool: Money, payouts: &mut PayoutMap) {
    for holder in &pos.holders {
        let fraction = holder.shares.value() / pos.total_shares.value();
        let payout = pool.mul(fraction).floor_4();
        let slot = payouts
            .entry((idx, holder.stakeholder_id.clone()))
            .or_insert_with(Money::zero);
        *slot = slot.add(payout);
    }
}

fn class_payout(positions: &[ShareClassPosition], idx: usize, payouts: &PayoutMap) -> Money {
    class_payout_at(idx, &positions[idx], payouts)
}

fn class_payout_at(idx: usize, pos: &ShareClassPosition, payouts: &PayoutMap) -> Money {
    pos.holders
        .iter()
        .map(|h| {
            payouts
                .get(&(idx, h.stakeholder_id.clone()))
                .copied()
                .unwrap_or_else(Money::zero)
        })
        .sum()
}
