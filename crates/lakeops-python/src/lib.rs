//! `lakeops._core`: Python entry points into the simulation engine.
#[macro_use]
mod macros;
mod convert;

mod metrics;
mod simulation;

use pyo3::prelude::*;

/// Alias `child` as `parent.child` in `sys.modules`, so that
/// `from lakeops._core.simulation import run_simulation` resolves.
fn alias_submodule(parent: &Bound<'_, PyModule>, child: &Bound<'_, PyModule>) -> PyResult<()> {
    let dotted = format!("{}.{}", parent.name()?, child.name()?);
    parent
        .py()
        .import("sys")?
        .getattr("modules")?
        .set_item(dotted, child)
}

#[pyfunction]
fn rust_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(rust_version, m)?)?;

    for sub in [simulation::register(m)?, metrics::register(m)?] {
        alias_submodule(m, &sub)?;
    }
    Ok(())
}
