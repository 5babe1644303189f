//! Validated input series for a run.
//!
//! Row-aligned series have one entry per row (the day before the start date
//! plus every simulated day). Day-aligned series have one entry per
//! simulated day. Monthly series have one entry per calendar month touched
//! by the horizon.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::config::{OperatingMode, SimulationConfig};
use crate::error::{check_finite, check_len, SimError, SimResult};
use crate::zones::ScheduleLines;

/// Observed or externally simulated structure flows and climate for one row.
///
/// Flows are daily means [cfs]; ET depths are [in/day]; stage is [ft NGVD].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservedRow {
    pub east_backflow: f64,
    pub east_regulatory: f64,
    pub east_test: f64,
    pub east_downstream: f64,
    pub west_backflow: f64,
    pub west_regulatory: f64,
    pub west_downstream: f64,
    pub west_ews: f64,
    pub wca: f64,
    pub l8c51: f64,
    pub et_dry: f64,
    pub et_littoral: f64,
    pub et_open: f64,
    pub stage: f64,
}

impl ObservedRow {
    fn values(&self) -> [f64; 14] {
        [
            self.east_backflow,
            self.east_regulatory,
            self.east_test,
            self.east_downstream,
            self.west_backflow,
            self.west_regulatory,
            self.west_downstream,
            self.west_ews,
            self.wca,
            self.l8c51,
            self.et_dry,
            self.et_littoral,
            self.et_open,
            self.stage,
        ]
    }
}

/// Agricultural-area runoff and pumping available for supply augmentation [cfs].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationRow {
    pub mia_runoff: f64,
    pub mia_pump: f64,
    pub nnr_runoff: f64,
    pub nnr_pump: f64,
}

/// Every time series a run consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInputs {
    // -- Row-aligned --
    pub schedule: Vec<ScheduleLines>,
    /// Net inflow to the lake before water supply [acre-ft/day].
    pub net_inflow: Vec<f64>,
    /// Lake-side water supply demand [acre-ft/day].
    pub losa_demand: Vec<f64>,
    /// Basin runoff reaching the east downstream structure [cfs].
    pub east_runoff: Vec<f64>,
    /// Basin runoff reaching the west downstream structure [cfs].
    pub west_runoff: Vec<f64>,
    /// Rainfall on the lake [acre-ft/day].
    pub rainfall: Vec<f64>,
    /// Evapotranspiration volume [acre-ft/day].
    pub et_volume: Vec<f64>,
    /// Storage correction applied each day [acre-ft].
    pub storage_deviation: Vec<f64>,
    pub observed: Vec<ObservedRow>,

    // -- Day-aligned --
    /// Tributary hydrologic condition class.
    pub tributary_condition: Vec<f64>,
    /// Seasonal climate outlook class (1 very dry to 6 very wet).
    pub seasonal_class: Vec<u8>,
    /// Multi-seasonal climate outlook class (1 to 6).
    pub multi_seasonal_class: Vec<u8>,
    /// Whether the conservation-area stages are too low to supply water.
    pub wca_stages_low: Vec<bool>,
    pub augmentation: Vec<AugmentationRow>,
    /// Whether the west estuary needs lake water.
    pub estuary_needs_water: Vec<bool>,
    /// Lake total phosphorus [mg/L], required in parametric mode.
    #[serde(default)]
    pub lake_tp: Option<Vec<f64>>,

    // -- Monthly --
    /// Monthly mean east basin runoff [cfs].
    pub monthly_east_runoff: Vec<f64>,
    /// Monthly mean west basin runoff [cfs].
    pub monthly_west_runoff: Vec<f64>,
}

/// Number of calendar months spanned by a configuration's rows.
pub fn month_count(config: &SimulationConfig) -> usize {
    let start = config.start_date;
    let end = config.end_date;
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1;
    usize::try_from(months).unwrap_or(0)
}

impl SimulationInputs {
    /// Parse inputs from JSON. Alignment is checked by `validate`.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every series against the horizon of `config`.
    ///
    /// Validates:
    /// - row-aligned series have `n_days + 1` entries
    /// - day-aligned series have `n_days` entries
    /// - monthly series cover every month of the horizon
    /// - no NaN or infinite values
    /// - climate classes lie in 1..=6
    /// - schedule lines are ordered
    /// - the lake TP series is present in parametric mode
    pub fn validate(&self, config: &SimulationConfig) -> SimResult<()> {
        let n_rows = config.n_rows();
        let n_days = config.n_days();

        check_len("schedule", &self.schedule, n_rows)?;
        for (name, series) in [
            ("net_inflow", &self.net_inflow),
            ("losa_demand", &self.losa_demand),
            ("east_runoff", &self.east_runoff),
            ("west_runoff", &self.west_runoff),
            ("rainfall", &self.rainfall),
            ("et_volume", &self.et_volume),
            ("storage_deviation", &self.storage_deviation),
        ] {
            check_len(name, series, n_rows)?;
            check_finite(name, series)?;
        }
        check_len("observed", &self.observed, n_rows)?;
        for (row, obs) in self.observed.iter().enumerate() {
            if obs.values().iter().any(|v| !v.is_finite()) {
                return Err(SimError::config(
                    "observed",
                    format!("non-finite value at row {row}"),
                ));
            }
        }
        for (row, lines) in self.schedule.iter().enumerate() {
            lines.validate(row)?;
        }

        check_len("tributary_condition", &self.tributary_condition, n_days)?;
        check_finite("tributary_condition", &self.tributary_condition)?;
        check_len("seasonal_class", &self.seasonal_class, n_days)?;
        check_len("multi_seasonal_class", &self.multi_seasonal_class, n_days)?;
        check_len("wca_stages_low", &self.wca_stages_low, n_days)?;
        check_len("augmentation", &self.augmentation, n_days)?;
        check_len("estuary_needs_water", &self.estuary_needs_water, n_days)?;
        for (name, classes) in [
            ("seasonal_class", &self.seasonal_class),
            ("multi_seasonal_class", &self.multi_seasonal_class),
        ] {
            if let Some(&bad) = classes.iter().find(|c| !(1..=6).contains(*c)) {
                return Err(SimError::domain(name, f64::from(bad), 1.0, 6.0));
            }
        }

        match (&self.lake_tp, config.mode) {
            (Some(tp), _) => {
                check_len("lake_tp", tp, n_days)?;
                check_finite("lake_tp", tp)?;
            }
            (None, OperatingMode::Parametric) => {
                return Err(SimError::config(
                    "lake_tp",
                    "parametric mode needs the lake phosphorus series",
                ));
            }
            (None, OperatingMode::ObservedReplay) => {}
        }

        let months = month_count(config);
        for (name, series) in [
            ("monthly_east_runoff", &self.monthly_east_runoff),
            ("monthly_west_runoff", &self.monthly_west_runoff),
        ] {
            check_len(name, series, months)?;
            check_finite(name, series)?;
        }
        Ok(())
    }
}
