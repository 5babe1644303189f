//! Individual protocol rules, in evaluation order.

use crate::config::{BaseflowGate, LowChanceLine, ShortageEws};
use crate::zones::{SupplyTier, ZoneCode};

/// Environmental release used by the fixed shortage option [cfs].
pub const FIXED_SHORTAGE_EWS: f64 = 300.0;

/// Wet-season months in which the low-chance percentile test is skipped.
fn is_wet_season_month(month: u32) -> bool {
    (6..=9).contains(&month)
}

/// Tributary conditions are normal or wetter.
pub fn tributary_normal_or_above(condition: f64, threshold: f64) -> bool {
    condition > threshold
}

/// Stage line for the low-chance test; `None` means the test always passes.
pub fn low_chance_line(
    month: u32,
    wsm1: f64,
    target_stage: Option<f64>,
    line: LowChanceLine,
) -> Option<f64> {
    match line {
        LowChanceLine::WaterShortage if is_wet_season_month(month) => Some(wsm1),
        LowChanceLine::WaterShortage => Some(wsm1 + 0.5),
        LowChanceLine::Disabled => None,
        LowChanceLine::Percentile(_) if is_wet_season_month(month) => None,
        LowChanceLine::Percentile(_) => target_stage,
    }
}

/// Stage is above the low-chance line.
pub fn low_chance_check(stage: f64, line: Option<f64>) -> bool {
    line.map_or(true, |l| stage > l)
}

/// The schedule suggests baseflow and the estuary needs lake water.
pub fn lors_baseflow_release(baseflow: f64, estuary_needs_water: bool) -> bool {
    baseflow > 0.0 && estuary_needs_water
}

/// Low-chance test, restricted to the late dry season when configured.
pub fn late_dry_low_chance(late_dry_season: bool, low_chance: bool, late_only: bool) -> bool {
    if late_only {
        late_dry_season && low_chance
    } else {
        low_chance
    }
}

/// Baseflow is scheduled although the low-chance test failed.
pub fn baseflow_without_low_chance(late_dry_low_chance: bool, baseflow: f64) -> bool {
    !late_dry_low_chance && baseflow > 0.0
}

/// The schedule and the low-chance test both call for baseflow.
pub fn all_conditions(lors_baseflow: bool, late_dry_low_chance: bool) -> bool {
    lors_baseflow && late_dry_low_chance
}

pub fn above_baseflow_band(zone: ZoneCode) -> bool {
    zone > ZoneCode::Baseflow
}

pub fn within_baseflow_band(zone: ZoneCode) -> bool {
    zone == ZoneCode::Baseflow
}

pub fn within_beneficial_use_band(zone: ZoneCode) -> bool {
    zone == ZoneCode::BeneficialUse
}

/// Baseflow is scheduled while the stage is in Zone D.
pub fn baseflow_in_zone_d(zone: ZoneCode, baseflow: f64) -> bool {
    zone.is_zone_d() && baseflow > 0.0
}

/// Whether the scheduled baseflow passes unrestricted.
pub fn unrestricted_baseflow(
    all_and_above_band: bool,
    baseflow_in_zone_d: bool,
    gate: BaseflowGate,
) -> bool {
    match gate {
        BaseflowGate::AllConditions => all_and_above_band,
        BaseflowGate::StageSubband => baseflow_in_zone_d,
    }
}

/// Baseflow after the protocol [cfs].
pub fn post_protocol_baseflow(
    unrestricted: bool,
    baseflow: f64,
    all_and_within_band: bool,
    cap: f64,
) -> f64 {
    if unrestricted {
        baseflow
    } else if all_and_within_band {
        baseflow.min(cap)
    } else {
        0.0
    }
}

/// No regulatory release or baseflow is scheduled at the west outlet.
///
/// Unless shortage releases are allowed, the stage must also be above the
/// water shortage band.
pub fn no_scheduled_flow(total: f64, zone: ZoneCode, shortage_ews: ShortageEws) -> bool {
    match shortage_ews {
        ShortageEws::None => total == 0.0 && zone > ZoneCode::WaterShortage,
        ShortageEws::Calibrated | ShortageEws::Fixed => total == 0.0,
    }
}

/// The estuary needs water and nothing is scheduled to reach it.
pub fn and_estuary_needs_water(estuary_needs_water: bool, no_scheduled_flow: bool) -> bool {
    estuary_needs_water && no_scheduled_flow
}

/// The above, with the low-chance test passing.
pub fn and_low_chance(late_dry_low_chance: bool, and_estuary_needs_water: bool) -> bool {
    late_dry_low_chance && and_estuary_needs_water
}

/// Final gate on the environmental release.
pub fn tributary_gate(
    and_low_chance: bool,
    tributary_normal: bool,
    late_dry_season: bool,
    bypass_late_dry_season: bool,
) -> bool {
    let tributaries = tributary_normal || (bypass_late_dry_season && late_dry_season);
    and_low_chance && tributaries
}

/// Fraction of the environmental release cut back in a shortage tier.
pub fn ews_cutback(tier: SupplyTier, cutbacks_pct: &[f64; 4]) -> Option<f64> {
    tier.select(cutbacks_pct).map(|pct| pct / 100.0)
}

/// Environmental release a shortage tier cuts back from [cfs].
pub fn shortage_base_release(option: ShortageEws, calibrated: f64) -> f64 {
    match option {
        ShortageEws::None => 0.0,
        ShortageEws::Calibrated => calibrated,
        ShortageEws::Fixed => FIXED_SHORTAGE_EWS,
    }
}

/// Environmental water supply after the protocol [cfs].
pub fn post_protocol_ews(
    gate: bool,
    cutback: Option<f64>,
    shortage_base: f64,
    calibrated: f64,
) -> f64 {
    if !gate {
        return 0.0;
    }
    match cutback {
        None => calibrated,
        Some(fraction) => (1.0 - fraction) * shortage_base,
    }
}
