//! Static reference tables loaded before a run.
//!
//! All tables are read-only once validated. Lookups that can step outside
//! a table follow fixed rules: pulse rows wrap, day-of-year rows map leap
//! days onto their neighbour.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{SimulationConfig, TargetDate};
use crate::dectree::ReleaseCodeTables;
use crate::error::{check_finite, SimError, SimResult};
use crate::hypsometry::StageStorageCurve;
use crate::outlets::Outlet;

/// Percentiles available in the target-stage curves, in column order.
pub const TARGET_PERCENTILES: [u8; 8] = [10, 20, 25, 30, 40, 45, 50, 60];

/// Number of weeks a demand year is folded into.
pub const DEMAND_WEEKS: usize = 52;

/// Every reference table a run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub hypsometry: StageStorageCurve,
    pub pulses: PulseTable,
    pub rates: RegulationRates,
    pub estuary_turns: Vec<EstuaryTurn>,
    pub target_stages: TargetStageCurves,
    pub weekly_demand: WeeklyDemand,
    /// Overrides the built-in release-code table for the configured version.
    #[serde(default)]
    pub release_codes: Option<ReleaseCodeTables>,
}

impl ReferenceTables {
    /// Parse the tables from JSON. Validation needs the configuration and
    /// happens in [`ReferenceTables::validate`].
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate every table against the configuration.
    pub fn validate(&self, config: &SimulationConfig) -> SimResult<()> {
        self.pulses.validate()?;
        self.rates.validate()?;
        self.target_stages.validate()?;
        self.weekly_demand.validate(config.supply.demand_scenario)?;
        for year in config.years() {
            if !self.estuary_turns.iter().any(|t| t.year == year) {
                return Err(SimError::config(
                    "estuary_turns",
                    format!("no entry for {year}"),
                ));
            }
        }
        if let Some(codes) = &self.release_codes {
            codes.validate()?;
        }
        Ok(())
    }

    /// Estuary turn factors for a year, east then west.
    pub fn turn(&self, year: i32, outlet: Outlet) -> f64 {
        self.estuary_turns
            .iter()
            .find(|t| t.year == year)
            .map(|t| match outlet {
                Outlet::East => t.east,
                Outlet::West => t.west,
            })
            .unwrap_or(1.0)
    }
}

// -- Pulses --

/// Daily release pulse shapes for the D1, D2 and D3 levels, one row per
/// pulse day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseTable {
    pub east: Vec<[f64; 3]>,
    pub west: Vec<[f64; 3]>,
}

impl PulseTable {
    pub fn validate(&self) -> SimResult<()> {
        if self.east.is_empty() {
            return Err(SimError::config("pulses.east", "must have at least one row"));
        }
        if self.east.len() != self.west.len() {
            return Err(SimError::alignment("pulses.west", self.east.len(), self.west.len()));
        }
        for (name, rows) in [("pulses.east", &self.east), ("pulses.west", &self.west)] {
            let flat: Vec<f64> = rows.iter().flatten().copied().collect();
            check_finite(name, &flat)?;
            if flat.iter().any(|&v| v < 0.0) {
                return Err(SimError::config(name, "pulse values must be non-negative"));
            }
        }
        Ok(())
    }

    /// Pulse length in days.
    pub fn len(&self) -> usize {
        self.east.len()
    }

    pub fn is_empty(&self) -> bool {
        self.east.is_empty()
    }

    fn rows(&self, outlet: Outlet) -> &[[f64; 3]] {
        match outlet {
            Outlet::East => &self.east,
            Outlet::West => &self.west,
        }
    }

    /// Pulse row by zero-based index. Indices outside the table wrap, so
    /// `-1` is the last row.
    pub fn row(&self, outlet: Outlet, index: i64) -> [f64; 3] {
        let rows = self.rows(outlet);
        let len = rows.len() as i64;
        rows[index.rem_euclid(len) as usize]
    }

    /// Column means, used to normalise the pulse shapes.
    pub fn averages(&self, outlet: Outlet) -> [f64; 3] {
        let rows = self.rows(outlet);
        let n = rows.len() as f64;
        let mut sums = [0.0; 3];
        for row in rows {
            for (sum, v) in sums.iter_mut().zip(row) {
                *sum += v;
            }
        }
        sums.map(|s| s / n)
    }
}

// -- Regulation rates --

/// Nominal release rate of each regulatory level [cfs].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelRates {
    pub d1: f64,
    pub d2: f64,
    pub d3: f64,
    pub c: f64,
    pub b: f64,
    pub a: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegulationRates {
    pub east: LevelRates,
    pub west: LevelRates,
}

impl RegulationRates {
    pub fn validate(&self) -> SimResult<()> {
        for (name, r) in [("rates.east", &self.east), ("rates.west", &self.west)] {
            let values = [r.d1, r.d2, r.d3, r.c, r.b, r.a];
            check_finite(name, &values)?;
            if values.iter().any(|&v| v < 0.0) {
                return Err(SimError::config(name, "rates must be non-negative"));
            }
        }
        Ok(())
    }

    pub fn for_outlet(&self, outlet: Outlet) -> &LevelRates {
        match outlet {
            Outlet::East => &self.east,
            Outlet::West => &self.west,
        }
    }
}

/// Share of the regulatory release each estuary takes in a given year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstuaryTurn {
    pub year: i32,
    pub east: f64,
    pub west: f64,
}

// -- Target stages --

/// Target-stage curves, one row per day of year, one column per percentile
/// in `TARGET_PERCENTILES` order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetStageCurves {
    pub may_first: Vec<[f64; 8]>,
    pub june_first: Vec<[f64; 8]>,
}

impl TargetStageCurves {
    pub fn validate(&self) -> SimResult<()> {
        for (name, rows) in [
            ("target_stages.may_first", &self.may_first),
            ("target_stages.june_first", &self.june_first),
        ] {
            if rows.len() != 365 && rows.len() != 366 {
                return Err(SimError::alignment(name, 366, rows.len()));
            }
            let flat: Vec<f64> = rows.iter().flatten().copied().collect();
            check_finite(name, &flat)?;
        }
        Ok(())
    }

    /// Target stage on `date` for a percentile curve.
    ///
    /// Returns `None` for a percentile without a column.
    pub fn stage(&self, target: TargetDate, date: NaiveDate, percentile: u8) -> Option<f64> {
        let column = TARGET_PERCENTILES.iter().position(|&p| p == percentile)?;
        let rows = match target {
            TargetDate::MayFirst => &self.may_first,
            TargetDate::JuneFirst => &self.june_first,
        };
        let row = day_of_year_row(date, rows.len());
        rows.get(row).map(|r| r[column])
    }
}

/// Row of a day-of-year table for `date`.
///
/// A 365-row table serves Feb 29 from the Feb 28 row; a 366-row table skips
/// its Feb 29 row in common years.
pub fn day_of_year_row(date: NaiveDate, n_rows: usize) -> usize {
    let ord0 = date.ordinal0() as usize;
    let leap = date.leap_year();
    let row = match (n_rows, leap) {
        (365, true) if ord0 >= 59 => ord0 - 1,
        (366, false) if ord0 >= 59 => ord0 + 1,
        _ => ord0,
    };
    row.min(n_rows.saturating_sub(1))
}

// -- Demand --

/// Weekly water supply demand [acre-ft/week], one row per week and one
/// column per demand scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyDemand(pub Vec<Vec<f64>>);

impl WeeklyDemand {
    pub fn validate(&self, scenario: usize) -> SimResult<()> {
        if self.0.len() < DEMAND_WEEKS {
            return Err(SimError::alignment("weekly_demand", DEMAND_WEEKS, self.0.len()));
        }
        for (week, row) in self.0.iter().enumerate() {
            if row.len() <= scenario {
                return Err(SimError::config(
                    "supply.demand_scenario",
                    format!("week {} has no column {scenario}", week + 1),
                ));
            }
            check_finite("weekly_demand", row)?;
        }
        Ok(())
    }

    /// Demand for a one-based week of a scenario.
    pub fn week(&self, scenario: usize, week: usize) -> f64 {
        self.0
            .get(week.saturating_sub(1))
            .and_then(|row| row.get(scenario))
            .copied()
            .unwrap_or(0.0)
    }
}
