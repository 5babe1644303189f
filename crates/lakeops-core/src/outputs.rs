//! Row-per-day output table.

use chrono::NaiveDate;
use lakeops_macros::Record;
use serde::Serialize;

use crate::protocol::ProtocolDay;
use crate::state::SimulationState;

/// One simulated day as handed to downstream consumers.
///
/// Flows are daily means [cfs]; volumes are [acre-ft/day].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Record)]
pub struct SimulationDay {
    pub date: NaiveDate,
    pub stage: f64,
    pub storage: f64,
    pub delta_storage: f64,
    pub zone: u8,
    pub supply_tier: u8,
    pub release_level: u8,
    pub pulse_day: u32,
    pub east_regulatory: f64,
    pub east_downstream: f64,
    pub east_backflow: f64,
    pub west_regulatory: f64,
    pub west_downstream: f64,
    pub west_backflow: f64,
    pub west_baseflow: f64,
    pub west_ews: f64,
    pub south_wca: f64,
    pub south_l8c51: f64,
    pub losa_supply: f64,
    pub cutback: f64,
    pub demand_not_supplied: f64,
    pub evapotranspiration: f64,
    pub rainfall: f64,
}

impl SimulationDay {
    /// Read row `r` out of a finished state.
    pub fn from_state(state: &SimulationState, date: NaiveDate, r: usize) -> Self {
        Self {
            date,
            stage: state.stage[r],
            storage: state.storage[r],
            delta_storage: state.delta_storage[r],
            zone: state.zone[r].code(),
            supply_tier: state.supply_tier[r].get(),
            release_level: state.release_level[r].code(),
            pulse_day: state.pulse_day[r],
            east_regulatory: state.east.regulatory[r],
            east_downstream: state.east.downstream[r],
            east_backflow: state.east.backflow[r],
            west_regulatory: state.west.regulatory[r],
            west_downstream: state.west.downstream[r],
            west_backflow: state.west.backflow[r],
            west_baseflow: state.west_baseflow[r],
            west_ews: state.west_ews[r],
            south_wca: state.south_wca[r],
            south_l8c51: state.south_l8c51[r],
            losa_supply: state.losa_supply[r],
            cutback: state.cutback[r],
            demand_not_supplied: state.demand_not_supplied[r],
            evapotranspiration: state.evapotranspiration[r],
            rainfall: state.rainfall[r],
        }
    }
}

/// Everything a run returns.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// One entry per simulated day, `start_date` first.
    pub days: SimulationDaySeries,
    /// Protocol decisions; entry `i` belongs to the day written by loop
    /// step `i`, that is `days` entry `i + 1`.
    pub protocol: Vec<ProtocolDay>,
    /// Final state, for inspection of intermediate variables.
    pub state: SimulationState,
}

impl SimulationResult {
    /// Build the day table from rows 1 onward.
    pub fn from_state(state: SimulationState, dates: &[NaiveDate]) -> Self {
        let n_rows = state.n_rows();
        let mut days = SimulationDaySeries::with_capacity(n_rows.saturating_sub(1));
        for (r, &date) in dates.iter().enumerate().take(n_rows).skip(1) {
            days.push(&SimulationDay::from_state(&state, date, r));
        }
        Self {
            protocol: state.protocol.clone(),
            days,
            state,
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Serialize the day table as a JSON array of rows.
    pub fn to_json(&self) -> crate::error::SimResult<String> {
        let rows: Vec<SimulationDay> = (1..=self.days.len())
            .map(|r| SimulationDay::from_state(&self.state, self.days.date[r - 1], r))
            .collect();
        Ok(serde_json::to_string(&rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_table_skips_row_zero() {
        let state = SimulationState::initialize(3, 14.0, 1000.0);
        let start = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..4)
            .map(|k| start - chrono::Duration::days(1) + chrono::Duration::days(k))
            .collect();
        let result = SimulationResult::from_state(state, &dates);
        assert_eq!(result.len(), 3);
        assert_eq!(result.days.date[0], start);
        assert_eq!(result.days.stage[0], 14.0);
        assert_eq!(result.protocol.len(), 3);
    }

    #[test]
    fn column_names_follow_fields() {
        let names = SimulationDay::column_names();
        assert_eq!(names[0], "date");
        assert!(names.contains(&"west_ews"));
    }

    #[test]
    fn json_has_one_object_per_day() {
        let state = SimulationState::initialize(3, 14.0, 1000.0);
        let start = NaiveDate::from_ymd_opt(2008, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (-1..3).map(|k| start + chrono::Duration::days(k)).collect();
        let json = SimulationResult::from_state(state, &dates).to_json().unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["date"], "2008-01-01");
    }
}
