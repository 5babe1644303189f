use numpy::PyReadonlyArray1;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::convert::{checked_slice, contiguous_slice};

use lakeops_core::metrics::{self, StageFit};

/// Borrow both arrays, requiring equal lengths.
fn paired<'py>(
    observed: &'py PyReadonlyArray1<'py, f64>,
    simulated: &'py PyReadonlyArray1<'py, f64>,
) -> PyResult<(&'py [f64], &'py [f64])> {
    let obs = contiguous_slice(observed)?;
    let sim = checked_slice(simulated, obs.len(), "simulated")?;
    Ok((obs, sim))
}

#[pyfunction]
fn nse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = paired(&observed, &simulated)?;
    Ok(metrics::nse(obs, sim))
}

#[pyfunction]
fn kge(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = paired(&observed, &simulated)?;
    Ok(metrics::kge(obs, sim))
}

#[pyfunction]
fn pbias(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = paired(&observed, &simulated)?;
    Ok(metrics::pbias(obs, sim))
}

#[pyfunction]
fn rmse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = paired(&observed, &simulated)?;
    Ok(metrics::rmse(obs, sim))
}

#[pyfunction]
fn mae(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = paired(&observed, &simulated)?;
    Ok(metrics::mae(obs, sim))
}

/// Every score at once, plus the number of pairs used.
#[pyfunction]
fn stage_fit<'py>(
    py: Python<'py>,
    observed: PyReadonlyArray1<'py, f64>,
    simulated: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyDict>> {
    let (obs, sim) = paired(&observed, &simulated)?;
    let fit = StageFit::compute(obs, sim);
    let dict = PyDict::new(py);
    dict.set_item("nse", fit.nse)?;
    dict.set_item("kge", fit.kge)?;
    dict.set_item("rmse", fit.rmse)?;
    dict.set_item("mae", fit.mae)?;
    dict.set_item("pbias", fit.pbias)?;
    dict.set_item("n", fit.n)?;
    Ok(dict)
}

pub fn register<'py>(parent: &Bound<'py, PyModule>) -> PyResult<Bound<'py, PyModule>> {
    let m = PyModule::new(parent.py(), "metrics")?;
    m.add_function(wrap_pyfunction!(nse, &m)?)?;
    m.add_function(wrap_pyfunction!(kge, &m)?)?;
    m.add_function(wrap_pyfunction!(pbias, &m)?)?;
    m.add_function(wrap_pyfunction!(rmse, &m)?)?;
    m.add_function(wrap_pyfunction!(mae, &m)?)?;
    m.add_function(wrap_pyfunction!(stage_fit, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(m)
}
