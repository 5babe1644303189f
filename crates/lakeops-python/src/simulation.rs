use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::convert::sim_error;

use lakeops_core::scenario::Scenario;
use lakeops_core::{simulate, ReferenceTables, SimulationConfig, SimulationInputs};

define_series_result! {
    /// Daily columns of a simulation run as numpy arrays.
    pub struct SimulationDays from lakeops_core::SimulationDaySeries {
        stage: f64,
        storage: f64,
        delta_storage: f64,
        zone: u8,
        supply_tier: u8,
        release_level: u8,
        pulse_day: u32,
        east_regulatory: f64,
        east_downstream: f64,
        east_backflow: f64,
        west_regulatory: f64,
        west_downstream: f64,
        west_backflow: f64,
        west_baseflow: f64,
        west_ews: f64,
        south_wca: f64,
        south_l8c51: f64,
        losa_supply: f64,
        cutback: f64,
        demand_not_supplied: f64,
        evapotranspiration: f64,
        rainfall: f64,
    }
}

/// Result of `simulate()`.
#[pyclass(frozen)]
pub struct SimulationRun {
    /// ISO dates, one per simulated day.
    #[pyo3(get)]
    pub dates: Vec<String>,
    #[pyo3(get)]
    pub days: Py<SimulationDays>,
    #[pyo3(get)]
    pub protocol: Py<PyDict>,
    json: String,
}

#[pymethods]
impl SimulationRun {
    fn __len__(&self) -> usize {
        self.dates.len()
    }

    /// Daily columns as a dict of numpy arrays, `date` included.
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = self.days.get().column_dict(py)?;
        dict.set_item("date", self.dates.clone())?;
        Ok(dict)
    }

    /// Daily rows as a JSON array.
    fn to_json(&self) -> &str {
        &self.json
    }
}

/// Run a simulation from three JSON documents.
#[pyfunction]
fn run_simulation(
    py: Python<'_>,
    config_json: &str,
    inputs_json: &str,
    tables_json: &str,
) -> PyResult<SimulationRun> {
    let config = SimulationConfig::from_json_str(config_json).map_err(sim_error)?;
    let inputs = SimulationInputs::from_json_str(inputs_json).map_err(sim_error)?;
    let tables = ReferenceTables::from_json_str(tables_json).map_err(sim_error)?;

    let result = py
        .allow_threads(|| simulate(&config, &inputs, &tables))
        .map_err(sim_error)?;

    let json = result.to_json().map_err(sim_error)?;
    let protocol = records_to_dict!(
        py, result.protocol,
        post_baseflow: f64, post_ews: f64, post_total: f64, scheduled_total: f64,
        low_chance: bool, estuary_needs_water: bool, all_conditions: bool,
        unrestricted_baseflow: bool,
    );
    Ok(SimulationRun {
        dates: result.days.date.iter().map(|d| d.to_string()).collect(),
        days: Py::new(py, SimulationDays::from_series(py, &result.days))?,
        protocol: protocol.unbind(),
        json,
    })
}

/// JSON documents `(config, inputs, tables)` of a steady synthetic scenario.
#[pyfunction]
#[pyo3(signature = (n_days=365))]
fn steady_scenario(n_days: usize) -> PyResult<(String, String, String)> {
    if n_days < 3 {
        return Err(pyo3::exceptions::PyValueError::new_err(
            "n_days must be at least 3",
        ));
    }
    let s = Scenario::steady(n_days);
    let to_json = |v: serde_json::Result<String>| {
        v.map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))
    };
    Ok((
        to_json(serde_json::to_string(&s.config))?,
        to_json(serde_json::to_string(&s.inputs))?,
        to_json(serde_json::to_string(&s.tables))?,
    ))
}

pub fn register<'py>(parent: &Bound<'py, PyModule>) -> PyResult<Bound<'py, PyModule>> {
    let m = PyModule::new(parent.py(), "simulation")?;
    m.add_function(wrap_pyfunction!(run_simulation, &m)?)?;
    m.add_function(wrap_pyfunction!(steady_scenario, &m)?)?;
    m.add_class::<SimulationRun>()?;
    m.add_class::<SimulationDays>()?;
    parent.add_submodule(&m)?;
    Ok(m)
}
