//! Water supply, supply augmentation and evapotranspiration terms.

use crate::config::{EtSource, LosaSupplyOption, WsaConfig, WsaOption};
use crate::zones::SupplyTier;

/// Largest supply allowed in a tier [acre-ft/day].
pub fn max_supply(tier: SupplyTier, demand: f64, cutbacks: &[f64; 4]) -> f64 {
    match tier.select(cutbacks) {
        Some(cutback) => demand * (1.0 - cutback),
        None => demand,
    }
}

/// Lake-side supply actually delivered [acre-ft/day].
pub fn losa_supply(
    tier: SupplyTier,
    demand: f64,
    max_supply: f64,
    option: LosaSupplyOption,
) -> f64 {
    match option {
        LosaSupplyOption::Unrestricted => demand,
        LosaSupplyOption::Cutback if tier.is_shortage() => demand.min(max_supply),
        LosaSupplyOption::Cutback => demand,
    }
}

/// Demand not supplied as a percentage of demand, 0 without demand.
pub fn demand_not_supplied(demand: f64, supplied: f64) -> f64 {
    if demand > 0.0 {
        (demand - supplied) / demand * 100.0
    } else {
        0.0
    }
}

/// Augmentation trigger stages `(upper, lower)` relative to WSM1 [ft].
pub fn augmentation_triggers(wsm1: f64, config: &WsaConfig) -> (f64, f64) {
    match config.option {
        WsaOption::Offset => (wsm1 + config.offset2, wsm1 + config.offset1),
        WsaOption::Trigger | WsaOption::Off => (wsm1 + config.trigger2, wsm1 + config.trigger1),
    }
}

/// Daily augmentation conditions shared by both supply areas.
#[derive(Debug, Clone, Copy)]
pub struct AugmentationDay {
    pub stage: f64,
    pub upper_trigger: f64,
    pub lower_trigger: f64,
    pub wca_stages_low: bool,
    pub seasonal_class: u8,
}

/// Water supply augmentation from one agricultural area [cfs].
///
/// Only runs while the conservation areas are too low to supply and the
/// outlook is no wetter than `max_seasonal_class`. Below the lower trigger
/// the lower cap applies, between the triggers the upper cap.
pub fn augmentation(
    day: &AugmentationDay,
    runoff: f64,
    pump: f64,
    lower_cap: f64,
    upper_cap: f64,
    config: &WsaConfig,
) -> f64 {
    if config.option == WsaOption::Off
        || !day.wca_stages_low
        || day.seasonal_class > config.max_seasonal_class
    {
        return 0.0;
    }
    let available = (runoff + pump).max(0.0);
    if day.stage <= day.lower_trigger {
        available.min(lower_cap)
    } else if day.stage <= day.upper_trigger {
        available.min(upper_cap)
    } else {
        0.0
    }
}

/// Daily ET depths [in/day].
#[derive(Debug, Clone, Copy, Default)]
pub struct EtDepths {
    pub open: f64,
    pub littoral: f64,
    pub dry: f64,
}

/// Lake evapotranspiration [acre-ft/day].
///
/// From depths, open water, littoral marsh and exposed lakebed each lose
/// their own depth; the exposed lakebed is the table footprint not wetted
/// at the current stage.
pub fn evapotranspiration(
    source: EtSource,
    volume: f64,
    depths: EtDepths,
    area: f64,
    marsh: f64,
    footprint: f64,
) -> f64 {
    match source {
        EtSource::Volume => volume,
        EtSource::Depths => {
            let dry = (footprint - area - marsh).max(0.0);
            (depths.open * area + depths.littoral * marsh + depths.dry * dry) / 12.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CUTBACKS: [f64; 4] = [0.1, 0.2, 0.3, 0.4];

    fn tier(t: u8) -> SupplyTier {
        SupplyTier::new(t).unwrap()
    }

    // -- Supply --

    #[test]
    fn max_supply_by_tier() {
        assert_relative_eq!(max_supply(tier(0), 100.0, &CUTBACKS), 100.0);
        assert_relative_eq!(max_supply(tier(3), 100.0, &CUTBACKS), 70.0);
    }

    #[test]
    fn cutback_option_limits_delivery() {
        assert_relative_eq!(losa_supply(tier(2), 100.0, 80.0, LosaSupplyOption::Cutback), 80.0);
        assert_relative_eq!(losa_supply(tier(0), 100.0, 80.0, LosaSupplyOption::Cutback), 100.0);
        assert_relative_eq!(losa_supply(tier(2), 100.0, 80.0, LosaSupplyOption::Unrestricted), 100.0);
    }

    #[test]
    fn demand_not_supplied_without_demand_is_zero() {
        assert_eq!(demand_not_supplied(0.0, 0.0), 0.0);
        assert_relative_eq!(demand_not_supplied(100.0, 75.0), 25.0);
    }

    // -- Augmentation --

    fn wsa() -> WsaConfig {
        WsaConfig {
            option: WsaOption::Trigger,
            mia_cap1: 100.0,
            mia_cap2: 300.0,
            ..WsaConfig::default()
        }
    }

    fn day(stage: f64) -> AugmentationDay {
        let (upper_trigger, lower_trigger) = augmentation_triggers(12.0, &wsa());
        AugmentationDay {
            stage,
            upper_trigger,
            lower_trigger,
            wca_stages_low: true,
            seasonal_class: 2,
        }
    }

    #[test]
    fn triggers_relative_to_wsm1() {
        assert_eq!(augmentation_triggers(12.0, &wsa()), (12.5, 12.0));
        let offset = WsaConfig {
            option: WsaOption::Offset,
            ..wsa()
        };
        assert_eq!(augmentation_triggers(12.0, &offset), (13.0, 12.0));
    }

    #[test]
    fn augmentation_caps_by_trigger_band() {
        let c = wsa();
        assert_relative_eq!(augmentation(&day(11.0), 200.0, 300.0, c.mia_cap1, c.mia_cap2, &c), 100.0);
        assert_relative_eq!(augmentation(&day(12.3), 200.0, 300.0, c.mia_cap1, c.mia_cap2, &c), 300.0);
        assert_relative_eq!(augmentation(&day(12.3), 50.0, 20.0, c.mia_cap1, c.mia_cap2, &c), 70.0);
        assert_relative_eq!(augmentation(&day(13.0), 200.0, 300.0, c.mia_cap1, c.mia_cap2, &c), 0.0);
    }

    #[test]
    fn augmentation_needs_low_wca_and_dry_outlook() {
        let c = wsa();
        let mut d = day(11.0);
        d.wca_stages_low = false;
        assert_eq!(augmentation(&d, 200.0, 300.0, 100.0, 300.0, &c), 0.0);
        let mut d = day(11.0);
        d.seasonal_class = 5;
        assert_eq!(augmentation(&d, 200.0, 300.0, 100.0, 300.0, &c), 0.0);
        let off = WsaConfig::default();
        assert_eq!(augmentation(&day(11.0), 200.0, 300.0, 100.0, 300.0, &off), 0.0);
    }

    // -- Evapotranspiration --

    #[test]
    fn et_from_depths_over_areas() {
        let depths = EtDepths {
            open: 0.24,
            littoral: 0.12,
            dry: 0.06,
        };
        let et = evapotranspiration(EtSource::Depths, 0.0, depths, 1000.0, 500.0, 2000.0);
        assert_relative_eq!(et, (240.0 + 60.0 + 30.0) / 12.0);
        assert_eq!(evapotranspiration(EtSource::Volume, 42.0, depths, 1.0, 1.0, 1.0), 42.0);
    }
}
