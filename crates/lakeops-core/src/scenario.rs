//! Self-contained synthetic scenarios.
//!
//! A steady scenario holds the lake in the beneficial use zone with every
//! forcing at zero, so nothing moves water in or out. Tests and the bench
//! binary start from it and change what they need.

use chrono::{Duration, NaiveDate};

use crate::config::SimulationConfig;
use crate::error::SimResult;
use crate::hypsometry::{HypsometryRow, StageStorageCurve};
use crate::inputs::{month_count, AugmentationRow, ObservedRow, SimulationInputs};
use crate::outputs::SimulationResult;
use crate::run;
use crate::tables::{
    EstuaryTurn, LevelRates, PulseTable, ReferenceTables, RegulationRates, TargetStageCurves,
    WeeklyDemand, DEMAND_WEEKS,
};
use crate::zones::ScheduleLines;

/// Stage the steady scenario starts from [ft NGVD].
pub const STEADY_STAGE: f64 = 13.0;

/// Regulation schedule used on every row of a synthetic scenario.
pub const SCHEDULE: ScheduleLines = ScheduleLines {
    a: 17.5,
    b: 17.0,
    c: 16.5,
    d3: 16.0,
    d2: 15.5,
    d1: 15.0,
    d0: 14.5,
    wsm1: 12.0,
    wsm2: 11.5,
    wsm3: 11.0,
    wsm4: 10.5,
};

/// Configuration, inputs and tables of one run.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub config: SimulationConfig,
    pub inputs: SimulationInputs,
    pub tables: ReferenceTables,
}

impl Scenario {
    /// A valid run of `n_days` (at least 3) from 2008-01-01 in which the
    /// stage never changes.
    pub fn steady(n_days: usize) -> Self {
        let start = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap_or(NaiveDate::MIN);
        let end = start + Duration::days(n_days.max(1) as i64 - 1);
        let config = SimulationConfig {
            start_date: start,
            end_date: end,
            beginning_stage: STEADY_STAGE,
            continuous: true,
            mode: Default::default(),
            stage_source: Default::default(),
            supply: Default::default(),
            decision_tree: Default::default(),
            multipliers: Default::default(),
            east: Default::default(),
            west: Default::default(),
            south: Default::default(),
            evapotranspiration: Default::default(),
            wsa: Default::default(),
            protocol: Default::default(),
            parametric: Default::default(),
        };
        let inputs = steady_inputs(&config);
        let tables = tables(&config);
        Self {
            config,
            inputs,
            tables,
        }
    }

    /// Move the end date, resizing every input series with its last value.
    pub fn with_days(mut self, n_days: usize) -> Self {
        self.config.end_date = self.config.start_date + Duration::days(n_days as i64 - 1);
        let rows = self.config.n_rows();
        let months = month_count(&self.config);
        let i = &mut self.inputs;
        resize(&mut i.schedule, rows);
        for series in [
            &mut i.net_inflow,
            &mut i.losa_demand,
            &mut i.east_runoff,
            &mut i.west_runoff,
            &mut i.rainfall,
            &mut i.et_volume,
            &mut i.storage_deviation,
        ] {
            resize(series, rows);
        }
        resize(&mut i.observed, rows);
        resize(&mut i.tributary_condition, n_days);
        resize(&mut i.seasonal_class, n_days);
        resize(&mut i.multi_seasonal_class, n_days);
        resize(&mut i.wca_stages_low, n_days);
        resize(&mut i.augmentation, n_days);
        resize(&mut i.estuary_needs_water, n_days);
        if let Some(tp) = i.lake_tp.as_mut() {
            resize(tp, n_days);
        }
        resize(&mut i.monthly_east_runoff, months);
        resize(&mut i.monthly_west_runoff, months);
        self.tables.estuary_turns = turns(&self.config);
        self
    }

    /// Run the scenario.
    pub fn run(&self) -> SimResult<SimulationResult> {
        run::simulate(&self.config, &self.inputs, &self.tables)
    }
}

fn resize<T: Clone>(series: &mut Vec<T>, n: usize) {
    match series.last().cloned() {
        Some(last) => series.resize(n, last),
        None => series.truncate(n),
    }
}

fn steady_inputs(config: &SimulationConfig) -> SimulationInputs {
    let rows = config.n_rows();
    let days = config.n_days();
    let months = month_count(config);
    SimulationInputs {
        schedule: vec![SCHEDULE; rows],
        net_inflow: vec![0.0; rows],
        losa_demand: vec![0.0; rows],
        east_runoff: vec![0.0; rows],
        west_runoff: vec![0.0; rows],
        rainfall: vec![0.0; rows],
        et_volume: vec![0.0; rows],
        storage_deviation: vec![0.0; rows],
        observed: vec![
            ObservedRow {
                stage: STEADY_STAGE,
                ..ObservedRow::default()
            };
            rows
        ],
        tributary_condition: vec![3.0; days],
        seasonal_class: vec![3; days],
        multi_seasonal_class: vec![3; days],
        wca_stages_low: vec![false; days],
        augmentation: vec![AugmentationRow::default(); days],
        estuary_needs_water: vec![false; days],
        lake_tp: None,
        monthly_east_runoff: vec![0.0; months],
        monthly_west_runoff: vec![0.0; months],
    }
}

/// Linear lake from 8 to 20 ft: 400,000 acre-ft and 10,000 acres of open
/// water per foot.
fn hypsometry() -> StageStorageCurve {
    let rows = (0..=12)
        .map(|k| {
            let depth = f64::from(k);
            HypsometryRow {
                stage: 8.0 + depth,
                storage: 500_000.0 + 400_000.0 * depth,
                area: 300_000.0 + 10_000.0 * depth,
                marsh: 20_000.0 + 5_000.0 * depth,
            }
        })
        .collect();
    // Rows strictly increase by construction.
    StageStorageCurve { rows }
}

/// Ten-day pulse rising to a peak on day 3.
fn pulse() -> Vec<[f64; 3]> {
    [0.5, 0.9, 1.4, 1.3, 1.2, 1.0, 0.9, 0.8, 0.6, 0.3]
        .iter()
        .map(|&v| [v, v, v])
        .collect()
}

fn turns(config: &SimulationConfig) -> Vec<EstuaryTurn> {
    config
        .years()
        .map(|year| EstuaryTurn {
            year,
            east: 1.0,
            west: 1.0,
        })
        .collect()
}

fn tables(config: &SimulationConfig) -> ReferenceTables {
    ReferenceTables {
        hypsometry: hypsometry(),
        pulses: PulseTable {
            east: pulse(),
            west: pulse(),
        },
        rates: RegulationRates {
            east: LevelRates {
                d1: 1170.0,
                d2: 1950.0,
                d3: 2800.0,
                c: 3500.0,
                b: 5000.0,
                a: 7200.0,
            },
            west: LevelRates {
                d1: 2800.0,
                d2: 4000.0,
                d3: 4500.0,
                c: 6500.0,
                b: 7000.0,
                a: 7800.0,
            },
        },
        estuary_turns: turns(config),
        target_stages: TargetStageCurves {
            may_first: vec![[11.0, 11.5, 11.75, 12.0, 12.25, 12.4, 12.5, 12.75]; 366],
            june_first: vec![[10.5, 11.0, 11.25, 11.5, 11.75, 11.9, 12.0, 12.25]; 366],
        },
        weekly_demand: WeeklyDemand(vec![vec![0.0]; DEMAND_WEEKS]),
        release_codes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_scenario_validates() {
        let s = Scenario::steady(10);
        assert!(s.config.validate().is_ok());
        assert!(s.inputs.validate(&s.config).is_ok());
        assert!(s.tables.validate(&s.config).is_ok());
    }

    #[test]
    fn resizing_keeps_alignment_across_years() {
        let s = Scenario::steady(10).with_days(800);
        assert_eq!(s.inputs.net_inflow.len(), 801);
        assert_eq!(s.inputs.seasonal_class.len(), 800);
        assert!(s.inputs.validate(&s.config).is_ok());
        assert!(s.tables.validate(&s.config).is_ok());
    }

    #[test]
    fn curve_from_rows_is_valid() {
        let rows = hypsometry().rows().to_vec();
        assert!(StageStorageCurve::new(rows).is_ok());
    }
}
