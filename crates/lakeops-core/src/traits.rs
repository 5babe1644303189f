//! Operating policy seam for the two primary outlets.
//!
//! The daily loop computes everything the schedule would release and hands
//! it to a `ReleasePolicy`, which decides the regulatory release actually
//! applied. Observed replay and parametric operation are the two policies;
//! the loop itself does not know which one is running.

use chrono::{Datelike, NaiveDate};

use crate::config::{OperatingMode, ParametricConfig, RegulatorySource, SimulationConfig};
use crate::outlets::Outlet;

/// What an outlet knows on one day when choosing its release.
#[derive(Debug, Clone, Copy)]
pub struct OutletDay {
    pub outlet: Outlet,
    pub date: NaiveDate,
    /// Stage on the previous row [ft NGVD].
    pub stage: f64,
    /// Scheduled release plus baseflow [cfs].
    pub computed: f64,
    /// Observed regulatory release [cfs].
    pub observed: f64,
    /// Observed test release [cfs], east outlet only.
    pub observed_test: f64,
    /// Lake total phosphorus [mg/L].
    pub lake_tp: Option<f64>,
}

/// Decides the regulatory release applied at a primary outlet.
pub trait ReleasePolicy {
    /// Regulatory release for the day [cfs].
    fn regulatory_release(&self, day: &OutletDay) -> f64;

    /// Short name used in log events.
    fn name(&self) -> &'static str;
}

/// Runs the regulation schedule, or replays an observed series where the
/// outlet is configured to.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleReplay {
    pub east: RegulatorySource,
    pub west: RegulatorySource,
    pub east_constant: f64,
    pub west_constant: f64,
}

impl ScheduleReplay {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            east: config.east.regulatory,
            west: config.west.regulatory,
            east_constant: config.east.constant_release,
            west_constant: config.west.constant_release,
        }
    }
}

impl ReleasePolicy for ScheduleReplay {
    fn regulatory_release(&self, day: &OutletDay) -> f64 {
        let (source, constant) = match day.outlet {
            Outlet::East => (self.east, self.east_constant),
            Outlet::West => (self.west, self.west_constant),
        };
        match source {
            RegulatorySource::Computed => day.computed,
            RegulatorySource::Observed => day.observed,
            RegulatorySource::ObservedTest => day.observed_test,
            RegulatorySource::Constant => constant,
        }
    }

    fn name(&self) -> &'static str {
        "schedule_replay"
    }
}

/// Stage and phosphorus driven monthly releases.
#[derive(Debug, Clone)]
pub struct Parametric {
    pub params: ParametricConfig,
}

impl Parametric {
    fn is_dry_month(month: u32) -> bool {
        matches!(month, 1..=4 | 11 | 12)
    }
}

impl ReleasePolicy for Parametric {
    fn regulatory_release(&self, day: &OutletDay) -> f64 {
        let p = &self.params;
        let (maximum, monthly) = match day.outlet {
            Outlet::East => (p.east_max, &p.east_monthly),
            Outlet::West => (p.west_max, &p.west_monthly),
        };
        if day.stage >= p.max_stage {
            return maximum;
        }
        if day.stage <= p.min_stage {
            return 0.0;
        }
        let month = day.date.month();
        let threshold = if Self::is_dry_month(month) { p.p1 } else { p.p2 };
        match day.lake_tp {
            Some(tp) if tp <= threshold => monthly[month as usize - 1],
            _ => 0.0,
        }
    }

    fn name(&self) -> &'static str {
        "parametric"
    }
}

/// Build the policy selected by the operating mode.
pub fn release_policy(config: &SimulationConfig) -> Box<dyn ReleasePolicy> {
    match config.mode {
        OperatingMode::ObservedReplay => Box::new(ScheduleReplay::from_config(config)),
        OperatingMode::Parametric => Box::new(Parametric {
            params: config.parametric.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(outlet: Outlet, month: u32, stage: f64, tp: Option<f64>) -> OutletDay {
        OutletDay {
            outlet,
            date: NaiveDate::from_ymd_opt(2010, month, 10).unwrap(),
            stage,
            computed: 100.0,
            observed: 200.0,
            observed_test: 300.0,
            lake_tp: tp,
        }
    }

    // -- Schedule replay --

    #[test]
    fn replay_selects_source_per_outlet() {
        let policy = ScheduleReplay {
            east: RegulatorySource::ObservedTest,
            west: RegulatorySource::Constant,
            east_constant: 0.0,
            west_constant: 42.0,
        };
        assert_eq!(policy.regulatory_release(&day(Outlet::East, 1, 14.0, None)), 300.0);
        assert_eq!(policy.regulatory_release(&day(Outlet::West, 1, 14.0, None)), 42.0);
    }

    #[test]
    fn default_config_runs_the_schedule() {
        let policy = release_policy(&crate::scenario::Scenario::steady(10).config);
        assert_eq!(policy.name(), "schedule_replay");
        assert_eq!(policy.regulatory_release(&day(Outlet::East, 1, 14.0, None)), 100.0);
    }

    // -- Parametric --

    fn parametric() -> Parametric {
        let mut params = ParametricConfig {
            p1: 0.1,
            p2: 0.05,
            ..ParametricConfig::default()
        };
        params.west_monthly[0] = 650.0;
        params.west_monthly[6] = 450.0;
        Parametric { params }
    }

    #[test]
    fn stage_limits_override_phosphorus() {
        let p = parametric();
        assert_eq!(p.regulatory_release(&day(Outlet::West, 1, 18.5, Some(1.0))), 7800.0);
        assert_eq!(p.regulatory_release(&day(Outlet::East, 1, 18.0, Some(1.0))), 7200.0);
        assert_eq!(p.regulatory_release(&day(Outlet::West, 1, 8.0, Some(0.0))), 0.0);
    }

    #[test]
    fn phosphorus_threshold_by_month() {
        let p = parametric();
        assert_eq!(p.regulatory_release(&day(Outlet::West, 1, 14.0, Some(0.08))), 650.0);
        assert_eq!(p.regulatory_release(&day(Outlet::West, 7, 14.0, Some(0.08))), 0.0);
        assert_eq!(p.regulatory_release(&day(Outlet::West, 7, 14.0, Some(0.05))), 450.0);
        assert_eq!(p.regulatory_release(&day(Outlet::West, 1, 14.0, None)), 0.0);
    }
}
