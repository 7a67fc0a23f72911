//! Logging and diagnostics functions.

use lpbridge_highs::Engine;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::PyObject;
use crate::errors::telemetry_error_to_py;
use crate::highs::create_engine;

/// Enable structured logging for lpbridge.
///
/// When `level` is None, this reads `LPBRIDGE_TRACE` if set. If it is unset,
/// logging stays off. Returns True when logging is initialized, False if a
/// subscriber is already configured.
#[pyfunction]
#[pyo3(signature = (*, level=None))]
pub fn enable_logging(level: Option<String>) -> PyResult<bool> {
    lpbridge_highs::enable_logging(level.as_deref()).map_err(telemetry_error_to_py)
}

/// Return engine metadata for debugging and diagnostics.
#[pyfunction]
pub fn solver_info(py: Python<'_>) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    match create_engine() {
        Ok(engine) => {
            dict.set_item("engine", engine.name())?;
            dict.set_item("version", engine.version())?;
        }
        Err(err) => {
            dict.set_item("engine", py.None())?;
            dict.set_item("version", py.None())?;
            dict.set_item("error", err.to_string())?;
        }
    }
    dict.set_item("bindings_version", env!("CARGO_PKG_VERSION"))?;
    Ok(dict.unbind().into())
}

/// Register logging functions with the Python module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(pyo3::wrap_pyfunction!(enable_logging, m)?)?;
    m.add_function(pyo3::wrap_pyfunction!(solver_info, m)?)?;
    Ok(())
}
