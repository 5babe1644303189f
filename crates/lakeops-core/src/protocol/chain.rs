//! One day of the protocol rule chain.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::rules;
use super::salinity::SalinityOutlook;
use crate::config::ProtocolConfig;
use crate::zones::{SupplyTier, ZoneCode};

/// Everything the chain reads for one day.
#[derive(Debug, Clone)]
pub struct ProtocolInputs {
    pub date: NaiveDate,
    pub tributary_condition: f64,
    /// Stage on the previous row.
    pub stage: f64,
    /// Zone on the previous row.
    pub zone: ZoneCode,
    /// WSM1 line on the previous row.
    pub wsm1: f64,
    /// Target-stage curve value for the configured percentile.
    pub target_stage: Option<f64>,
    /// Scheduled regulatory release at the west outlet today [cfs].
    pub scheduled_release: f64,
    /// Scheduled baseflow at the west outlet today [cfs].
    pub scheduled_baseflow: f64,
    pub outlook: SalinityOutlook,
    pub late_dry_season: bool,
    /// Supply tier today.
    pub supply_tier: SupplyTier,
}

/// Every intermediate decision of the chain, in evaluation order.
///
/// Days the chain does not run keep the default: all flags false, all
/// flows zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProtocolDay {
    pub tributary_normal_or_above: bool,
    pub stage: f64,
    pub zone: ZoneCode,
    pub low_chance_line: Option<f64>,
    pub low_chance: bool,
    pub scheduled_release: f64,
    pub scheduled_baseflow: f64,
    pub scheduled_total: f64,
    pub estuary_needs_water: bool,
    pub lors_baseflow: bool,
    pub late_dry_low_chance: bool,
    pub baseflow_without_low_chance: bool,
    pub all_conditions: bool,
    pub above_baseflow_band: bool,
    pub within_baseflow_band: bool,
    pub within_beneficial_use_band: bool,
    pub all_and_above_band: bool,
    pub all_and_within_band: bool,
    pub baseflow_in_zone_d: bool,
    pub unrestricted_baseflow: bool,
    pub post_baseflow: f64,
    pub no_scheduled_flow: bool,
    pub and_estuary_needs_water: bool,
    pub and_low_chance: bool,
    pub tributary_gate: bool,
    pub ews_cutback: Option<f64>,
    pub shortage_base: f64,
    pub post_ews: f64,
    pub post_total: f64,
}

/// Run the chain for one day.
pub fn evaluate(inputs: &ProtocolInputs, config: &ProtocolConfig) -> ProtocolDay {
    let tributary_normal_or_above =
        rules::tributary_normal_or_above(inputs.tributary_condition, config.thc_threshold);

    let low_chance_line = rules::low_chance_line(
        inputs.date.month(),
        inputs.wsm1,
        inputs.target_stage,
        config.low_chance,
    );
    let low_chance = rules::low_chance_check(inputs.stage, low_chance_line);

    let scheduled_total = inputs.scheduled_release + inputs.scheduled_baseflow;
    let estuary_needs_water = inputs.outlook.needs_water(config.salinity_threshold);
    let lors_baseflow = rules::lors_baseflow_release(inputs.scheduled_baseflow, estuary_needs_water);
    let late_dry_low_chance = rules::late_dry_low_chance(
        inputs.late_dry_season,
        low_chance,
        config.late_dry_season_only,
    );
    let baseflow_without_low_chance =
        rules::baseflow_without_low_chance(late_dry_low_chance, inputs.scheduled_baseflow);
    let all_conditions = rules::all_conditions(lors_baseflow, late_dry_low_chance);

    let above_baseflow_band = rules::above_baseflow_band(inputs.zone);
    let within_baseflow_band = rules::within_baseflow_band(inputs.zone);
    let within_beneficial_use_band = rules::within_beneficial_use_band(inputs.zone);
    let all_and_above_band = all_conditions && above_baseflow_band;
    let all_and_within_band = all_conditions && !above_baseflow_band;
    let baseflow_in_zone_d = rules::baseflow_in_zone_d(inputs.zone, inputs.scheduled_baseflow);

    let unrestricted_baseflow =
        rules::unrestricted_baseflow(all_and_above_band, baseflow_in_zone_d, config.baseflow_gate);
    let post_baseflow = rules::post_protocol_baseflow(
        unrestricted_baseflow,
        inputs.scheduled_baseflow,
        all_and_within_band,
        config.baseflow_cap,
    );

    let no_scheduled_flow =
        rules::no_scheduled_flow(scheduled_total, inputs.zone, config.shortage_ews);
    let and_estuary_needs_water =
        rules::and_estuary_needs_water(estuary_needs_water, no_scheduled_flow);
    let and_low_chance = rules::and_low_chance(late_dry_low_chance, and_estuary_needs_water);
    let tributary_gate = rules::tributary_gate(
        and_low_chance,
        tributary_normal_or_above,
        inputs.late_dry_season,
        config.thc_bypass_late_dry_season,
    );

    let ews_cutback = rules::ews_cutback(inputs.supply_tier, &config.ews_cutbacks);
    let shortage_base = rules::shortage_base_release(config.shortage_ews, config.calibrated_ews);
    let post_ews =
        rules::post_protocol_ews(tributary_gate, ews_cutback, shortage_base, config.calibrated_ews);

    ProtocolDay {
        tributary_normal_or_above,
        stage: inputs.stage,
        zone: inputs.zone,
        low_chance_line,
        low_chance,
        scheduled_release: inputs.scheduled_release,
        scheduled_baseflow: inputs.scheduled_baseflow,
        scheduled_total,
        estuary_needs_water,
        lors_baseflow,
        late_dry_low_chance,
        baseflow_without_low_chance,
        all_conditions,
        above_baseflow_band,
        within_baseflow_band,
        within_beneficial_use_band,
        all_and_above_band,
        all_and_within_band,
        baseflow_in_zone_d,
        unrestricted_baseflow,
        post_baseflow,
        no_scheduled_flow,
        and_estuary_needs_water,
        and_low_chance,
        tributary_gate,
        ews_cutback,
        shortage_base,
        post_ews,
        post_total: post_baseflow + post_ews,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BaseflowGate;
    use approx::assert_relative_eq;

    fn inputs() -> ProtocolInputs {
        ProtocolInputs {
            date: NaiveDate::from_ymd_opt(2010, 4, 15).unwrap(),
            tributary_condition: 3.0,
            stage: 14.5,
            zone: ZoneCode::Baseflow,
            wsm1: 12.0,
            target_stage: Some(13.0),
            scheduled_release: 0.0,
            scheduled_baseflow: 600.0,
            outlook: SalinityOutlook::Flag(true),
            late_dry_season: true,
            supply_tier: SupplyTier::NONE,
        }
    }

    // -- Baseflow --

    #[test]
    fn baseflow_band_caps_baseflow() {
        let day = evaluate(&inputs(), &ProtocolConfig::default());
        assert!(day.all_conditions);
        assert!(day.all_and_within_band);
        assert!(!day.unrestricted_baseflow);
        assert_relative_eq!(day.post_baseflow, 450.0);
    }

    #[test]
    fn above_band_passes_baseflow_unrestricted() {
        let mut i = inputs();
        i.zone = ZoneCode::D2;
        let day = evaluate(&i, &ProtocolConfig::default());
        assert!(day.unrestricted_baseflow);
        assert_relative_eq!(day.post_baseflow, 600.0);
    }

    #[test]
    fn closed_lors_gate_never_unrestricted() {
        let config = ProtocolConfig::default();
        assert_eq!(config.baseflow_gate, BaseflowGate::AllConditions);
        for zone in [ZoneCode::Baseflow, ZoneCode::D1, ZoneCode::C, ZoneCode::A] {
            for (baseflow, flag) in [(0.0, true), (600.0, false)] {
                let mut i = inputs();
                i.zone = zone;
                i.scheduled_baseflow = baseflow;
                i.outlook = SalinityOutlook::Flag(flag);
                let day = evaluate(&i, &config);
                assert!(!day.lors_baseflow);
                assert!(!day.all_conditions);
                assert!(!day.unrestricted_baseflow);
                assert!(day.post_baseflow == 0.0 || day.post_baseflow <= config.baseflow_cap);
            }
        }
    }

    #[test]
    fn failed_low_chance_withholds_baseflow() {
        let mut i = inputs();
        i.stage = 12.9;
        let day = evaluate(&i, &ProtocolConfig::default());
        assert!(!day.low_chance);
        assert!(day.baseflow_without_low_chance);
        assert_relative_eq!(day.post_baseflow, 0.0);
    }

    // -- Environmental water supply --

    #[test]
    fn ews_released_when_nothing_scheduled() {
        let mut i = inputs();
        i.scheduled_baseflow = 0.0;
        let day = evaluate(&i, &ProtocolConfig::default());
        assert!(day.no_scheduled_flow);
        assert!(day.tributary_gate);
        assert_relative_eq!(day.post_ews, 650.0);
        assert_relative_eq!(day.post_total, 650.0);
    }

    #[test]
    fn dry_tributaries_block_ews() {
        let mut i = inputs();
        i.scheduled_baseflow = 0.0;
        i.tributary_condition = 1.0;
        let day = evaluate(&i, &ProtocolConfig::default());
        assert!(day.and_low_chance);
        assert!(!day.tributary_gate);
        assert_relative_eq!(day.post_ews, 0.0);
    }

    #[test]
    fn shortage_tier_cuts_back_ews() {
        let mut i = inputs();
        i.scheduled_baseflow = 0.0;
        i.supply_tier = SupplyTier::new(1).unwrap();
        let config = ProtocolConfig {
            shortage_ews: crate::config::ShortageEws::Fixed,
            ..ProtocolConfig::default()
        };
        let day = evaluate(&i, &config);
        assert_relative_eq!(day.post_ews, 300.0 * 0.85);
    }
}
