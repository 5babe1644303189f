//! Time-indexed state of a run.
//!
//! Every variable lives in a preallocated array owned by the daily loop.
//! Row-aligned arrays hold `n_days + 1` entries, day-aligned arrays hold
//! `n_days`. Loop step `i` writes row `today(i)` and reads row
//! `yesterday(i)`; nothing is ever written twice.

use crate::dectree::{BranchCodes, ReleaseLevel};
use crate::protocol::ProtocolDay;
use crate::zones::{SupplyTier, ZoneCode};

/// Row written by loop step `i`.
pub const fn today(i: usize) -> usize {
    i + 2
}

/// Row read as the previous day by loop step `i`.
pub const fn yesterday(i: usize) -> usize {
    i + 1
}

/// Per-row series of one primary outlet [cfs].
#[derive(Debug, Clone, Default)]
pub struct OutletSeries {
    pub multiplier: Vec<f64>,
    pub applied_multiplier: Vec<f64>,
    pub scheduled: Vec<f64>,
    /// Scheduled release net of basin runoff.
    pub need: Vec<f64>,
    /// Month-to-date sum of `need`.
    pub month_need: Vec<f64>,
    pub downstream_baseflow: Vec<f64>,
    pub backflow: Vec<f64>,
    pub net_runoff: Vec<f64>,
    pub upstream_baseflow: Vec<f64>,
    pub regulatory: Vec<f64>,
    pub downstream: Vec<f64>,
}

impl OutletSeries {
    fn zeros(n: usize) -> Self {
        Self {
            multiplier: vec![1.0; n],
            applied_multiplier: vec![1.0; n],
            scheduled: vec![0.0; n],
            need: vec![0.0; n],
            month_need: vec![0.0; n],
            downstream_baseflow: vec![0.0; n],
            backflow: vec![0.0; n],
            net_runoff: vec![0.0; n],
            upstream_baseflow: vec![0.0; n],
            regulatory: vec![0.0; n],
            downstream: vec![0.0; n],
        }
    }
}

/// Every intermediate and final variable of a run.
#[derive(Debug, Clone)]
pub struct SimulationState {
    // -- Lake --
    pub stage: Vec<f64>,
    pub storage: Vec<f64>,
    pub delta_storage: Vec<f64>,
    pub zone: Vec<ZoneCode>,
    pub fraction: Vec<f64>,
    /// Seven-day stage change ending on the row [ft].
    pub stage_rise: Vec<f64>,

    // -- Supply --
    pub supply_tier: Vec<SupplyTier>,
    pub max_supply: Vec<f64>,
    pub losa_supply: Vec<f64>,
    /// Net inflow after lake-side supply [acre-ft/day].
    pub net_inflow_after_supply: Vec<f64>,
    pub cutback: Vec<f64>,
    pub demand_not_supplied: Vec<f64>,

    // -- Releases --
    pub dec_tree_level: Vec<ReleaseLevel>,
    pub pulse_day: Vec<u32>,
    pub release_level: Vec<ReleaseLevel>,
    pub east: OutletSeries,
    pub west: OutletSeries,
    /// West baseflow after the protocol [cfs].
    pub west_baseflow: Vec<f64>,
    /// West environmental water supply [cfs].
    pub west_ews: Vec<f64>,
    pub south_wca: Vec<f64>,
    pub south_l8c51: Vec<f64>,
    /// East plus west regulatory volume [acre-ft/day].
    pub total_east_west: Vec<f64>,
    /// South regulatory volume [acre-ft/day].
    pub total_south: Vec<f64>,

    // -- Surface terms --
    pub area: Vec<f64>,
    pub marsh: Vec<f64>,
    pub rainfall: Vec<f64>,
    pub evapotranspiration: Vec<f64>,
    pub wsa_mia: Vec<f64>,
    pub wsa_nnr: Vec<f64>,

    // -- Day-aligned --
    pub branches: Vec<BranchCodes>,
    pub protocol: Vec<ProtocolDay>,
}

impl SimulationState {
    /// Allocate a state for `n_days` with rows 0 and 1 at the beginning
    /// stage and its storage.
    pub fn initialize(n_days: usize, beginning_stage: f64, beginning_storage: f64) -> Self {
        let n = n_days + 1;
        let mut stage = vec![0.0; n];
        let mut storage = vec![0.0; n];
        stage[..n.min(2)].fill(beginning_stage);
        storage[..n.min(2)].fill(beginning_storage);
        Self {
            stage,
            storage,
            delta_storage: vec![0.0; n],
            zone: vec![ZoneCode::default(); n],
            fraction: vec![0.0; n],
            stage_rise: vec![0.0; n],
            supply_tier: vec![SupplyTier::NONE; n],
            max_supply: vec![0.0; n],
            losa_supply: vec![0.0; n],
            net_inflow_after_supply: vec![0.0; n],
            cutback: vec![0.0; n],
            demand_not_supplied: vec![0.0; n],
            dec_tree_level: vec![ReleaseLevel::NoRelease; n],
            pulse_day: vec![0; n],
            release_level: vec![ReleaseLevel::NoRelease; n],
            east: OutletSeries::zeros(n),
            west: OutletSeries::zeros(n),
            west_baseflow: vec![0.0; n],
            west_ews: vec![0.0; n],
            south_wca: vec![0.0; n],
            south_l8c51: vec![0.0; n],
            total_east_west: vec![0.0; n],
            total_south: vec![0.0; n],
            area: vec![0.0; n],
            marsh: vec![0.0; n],
            rainfall: vec![0.0; n],
            evapotranspiration: vec![0.0; n],
            wsa_mia: vec![0.0; n],
            wsa_nnr: vec![0.0; n],
            branches: vec![BranchCodes::default(); n_days],
            protocol: vec![ProtocolDay::default(); n_days],
        }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.stage.len()
    }
}
