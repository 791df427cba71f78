// 3.0 vesting.rs: cliff + periodic vesting. everything counts in complete
// calendar periods, not days. before the cliff: nothing. at the cliff: all
// accrued tranches land at once. shares floor to 4dp, pct to 2dp, so nobody
// gets credited ahead of schedule.

use crate::dates::{add_months, months_diff};
use crate::types::{floor_dp, GrantId, Shares};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VestingFrequency {
    Monthly,
    Quarterly,
    Annually,
}

impl VestingFrequency {
    /// Months per vesting tranche.
    pub fn months_per_period(&self) -> u32 {
        match self {
            VestingFrequency::Monthly => 1,
            VestingFrequency::Quarterly => 3,
            VestingFrequency::Annually => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccelerationTrigger {
    None,
    SingleTrigger,
    DoubleTrigger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VestingSchedule {
    pub cliff_months: u32,
    pub total_months: u32,
    pub frequency: VestingFrequency,
    pub acceleration_trigger: AccelerationTrigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grant {
    pub id: GrantId,
    pub quantity: Shares,
    pub grant_date: NaiveDate,
    /// None means the grant vested in full on its grant date.
    pub vesting_schedule: Option<VestingSchedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VestingStatus {
    pub grant_id: GrantId,
    pub as_of_date: NaiveDate,
    pub total_shares: Shares,
    pub vested_shares: Shares,
    pub unvested_shares: Shares,
    pub percent_vested: Decimal,
    pub cliff_date: NaiveDate,
    pub fully_vested_at: NaiveDate,
    pub is_fully_vested: bool,
}

/// Computes the vesting status of a grant as of a given date.
///
/// A grant without a schedule is treated as fully vested on its grant date.
pub fn calculate_vesting(grant: &Grant, as_of: NaiveDate) -> VestingStatus {
    let schedule = match &grant.vesting_schedule {
        Some(s) => s,
        None => return fully_vested(grant, as_of, grant.grant_date, grant.grant_date),
    };

    let cliff_date = add_months(grant.grant_date, schedule.cliff_months);
    let fully_vested_at = add_months(grant.grant_date, schedule.total_months);

    if as_of < cliff_date {
        return VestingStatus {
            grant_id: grant.id.clone(),
            as_of_date: as_of,
            total_shares: grant.quantity,
            vested_shares: Shares::zero(),
            unvested_shares: grant.quantity,
            percent_vested: Decimal::ZERO,
            cliff_date,
            fully_vested_at,
            is_fully_vested: false,
        };
    }

    if as_of >= fully_vested_at {
        return fully_vested(grant, as_of, cliff_date, fully_vested_at);
    }

    let periods_elapsed = count_periods(grant.grant_date, as_of, schedule.frequency);
    let total_periods = count_periods(grant.grant_date, fully_vested_at, schedule.frequency);

    // schedule shorter than one period: everything vests immediately
    if total_periods == 0 {
        return fully_vested(grant, as_of, cliff_date, fully_vested_at);
    }

    let vested_fraction = Decimal::from(periods_elapsed) / Decimal::from(total_periods);
    let vested_shares = Shares::new(grant.quantity.value() * vested_fraction).floor_4();

    VestingStatus {
        grant_id: grant.id.clone(),
        as_of_date: as_of,
        total_shares: grant.quantity,
        vested_shares,
        unvested_shares: grant.quantity.sub(vested_shares),
        percent_vested: floor_dp(vested_fraction * dec!(100), 2),
        cliff_date,
        fully_vested_at,
        is_fully_vested: false,
    }
}

/// Vesting status when acceleration fires: 100% vested as of the trigger date.
///
/// This is single-trigger semantics. Double-trigger grants go through the same
/// path; the caller invokes this only once both triggers have occurred.
pub fn calculate_accelerated_vesting(grant: &Grant, trigger_date: NaiveDate) -> VestingStatus {
    fully_vested(grant, trigger_date, grant.grant_date, trigger_date)
}

fn fully_vested(
    grant: &Grant,
    as_of: NaiveDate,
    cliff_date: NaiveDate,
    fully_vested_at: NaiveDate,
) -> VestingStatus {
    VestingStatus {
        grant_id: grant.id.clone(),
        as_of_date: as_of,
        total_shares: grant.quantity,
        vested_shares: grant.quantity,
        unvested_shares: Shares::zero(),
        percent_vested: dec!(100),
        cliff_date,
        fully_vested_at,
        is_fully_vested: true,
    }
}

// 3.1: quarterly = months/3, annual = months/12. integer division, partial
// periods don't count.
fn count_periods(start: NaiveDate, end: NaiveDate, frequency: VestingFrequency) -> u32 {
    months_diff(start, end) / frequency.months_per_period()
}
