//! The `_Highs` handle exposed to Python.
//!
//! Method names follow the engine's camelCase API. Every array argument is
//! copied into a [`HostArray`] and handed to the Rust handle as a borrowed
//! buffer, so dtype, length, and layout checks happen in one place.

use lpbridge_highs::{
    BridgeError, HighsInt, Highs, LogEvent, OptionType, OptionValue, Result as BridgeResult,
};
use pyo3::IntoPyObjectExt;
use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyFloat, PyInt, PyString};
use tracing::{debug, warn};

use crate::PyObject;
use crate::buffers::{
    checked_count, checked_index, extract_indices, extract_integrality, extract_values,
};
use crate::enums::{PyCallStatus, PyLogType, PyModelStatus, PyObjSense, PyVarType};
use crate::errors::{OptionTypeError, bridge_error_to_py};
use crate::solution::{PyBasis, PyInfo, PySolution};

#[cfg(not(feature = "native"))]
pub(crate) type EngineImpl = lpbridge_highs::ReferenceEngine;
#[cfg(feature = "native")]
pub(crate) type EngineImpl = lpbridge_highs::NativeEngine;

#[cfg(not(feature = "native"))]
pub(crate) fn create_engine() -> Result<EngineImpl, BridgeError> {
    Ok(EngineImpl::new())
}

#[cfg(feature = "native")]
pub(crate) fn create_engine() -> Result<EngineImpl, BridgeError> {
    EngineImpl::new()
}

/// Read a Python scalar as an option value of the matching variant.
fn option_value(value: &Bound<'_, PyAny>) -> PyResult<OptionValue> {
    // bool is a subclass of int, so it is tested first.
    if value.is_instance_of::<PyBool>() {
        return Ok(OptionValue::Bool(value.extract()?));
    }
    if value.is_instance_of::<PyInt>() {
        return Ok(OptionValue::Int(value.extract::<HighsInt>()?));
    }
    if value.is_instance_of::<PyFloat>() {
        return Ok(OptionValue::Double(value.extract()?));
    }
    if value.is_instance_of::<PyString>() {
        return Ok(OptionValue::String(value.extract()?));
    }
    Err(OptionTypeError::new_err(format!(
        "option values must be bool, int, float or str (got {})",
        value.get_type().name()?
    )))
}

fn option_value_to_py(py: Python<'_>, value: OptionValue) -> PyResult<PyObject> {
    match value {
        OptionValue::Bool(value) => value.into_py_any(py),
        OptionValue::Int(value) => value.into_py_any(py),
        OptionValue::Double(value) => value.into_py_any(py),
        OptionValue::String(value) => value.into_py_any(py),
    }
}

/// Python handle over one model, option store, and log callback.
#[pyclass(name = "_Highs", unsendable)]
pub struct PyHighs {
    inner: Highs<EngineImpl>,
}

impl PyHighs {
    /// Run `call`, reporting `kWarning` when it recorded a new diagnostic.
    fn status_of<F>(&mut self, call: F) -> PyResult<PyCallStatus>
    where
        F: FnOnce(&mut Highs<EngineImpl>) -> BridgeResult<()>,
    {
        let before = self.inner.warning_count();
        call(&mut self.inner).map_err(bridge_error_to_py)?;
        if self.inner.warning_count() > before {
            Ok(PyCallStatus::Warning)
        } else {
            Ok(PyCallStatus::Ok)
        }
    }
}

#[pymethods]
impl PyHighs {
    #[new]
    fn new() -> PyResult<Self> {
        let engine = create_engine().map_err(bridge_error_to_py)?;
        debug!(
            component = "python",
            operation = "init",
            status = "success",
            "Creating Python handle"
        );
        Ok(Self {
            inner: Highs::with_engine(engine),
        })
    }

    fn version(&self) -> String {
        self.inner.version()
    }

    // ---- model mutation ----

    #[pyo3(name = "addRow")]
    fn add_row(
        &mut self,
        lower: f64,
        upper: f64,
        num_new_nz: HighsInt,
        indices: &Bound<'_, PyAny>,
        values: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let nz = checked_count(num_new_nz, "num_new_nz")?;
        let indices = extract_indices(indices, "indices")?;
        let values = extract_values(values, "values")?;
        self.status_of(|highs| {
            highs.add_row(lower, upper, nz, indices.as_host(), values.as_host())
        })
    }

    #[pyo3(name = "addRows")]
    #[allow(clippy::too_many_arguments)]
    fn add_rows(
        &mut self,
        num_new_row: HighsInt,
        lower: &Bound<'_, PyAny>,
        upper: &Bound<'_, PyAny>,
        num_new_nz: HighsInt,
        starts: &Bound<'_, PyAny>,
        indices: &Bound<'_, PyAny>,
        values: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_new_row, "num_new_row")?;
        let nz = checked_count(num_new_nz, "num_new_nz")?;
        let lower = extract_values(lower, "lower")?;
        let upper = extract_values(upper, "upper")?;
        let starts = extract_indices(starts, "starts")?;
        let indices = extract_indices(indices, "indices")?;
        let values = extract_values(values, "values")?;
        self.status_of(|highs| {
            highs.add_rows(
                count,
                lower.as_host(),
                upper.as_host(),
                nz,
                starts.as_host(),
                indices.as_host(),
                values.as_host(),
            )
        })
    }

    #[pyo3(name = "addCol")]
    fn add_col(
        &mut self,
        cost: f64,
        lower: f64,
        upper: f64,
        num_new_nz: HighsInt,
        indices: &Bound<'_, PyAny>,
        values: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let nz = checked_count(num_new_nz, "num_new_nz")?;
        let indices = extract_indices(indices, "indices")?;
        let values = extract_values(values, "values")?;
        self.status_of(|highs| {
            highs.add_col(cost, lower, upper, nz, indices.as_host(), values.as_host())
        })
    }

    #[pyo3(name = "addCols")]
    #[allow(clippy::too_many_arguments)]
    fn add_cols(
        &mut self,
        num_new_col: HighsInt,
        costs: &Bound<'_, PyAny>,
        lower: &Bound<'_, PyAny>,
        upper: &Bound<'_, PyAny>,
        num_new_nz: HighsInt,
        starts: &Bound<'_, PyAny>,
        indices: &Bound<'_, PyAny>,
        values: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_new_col, "num_new_col")?;
        let nz = checked_count(num_new_nz, "num_new_nz")?;
        let costs = extract_values(costs, "costs")?;
        let lower = extract_values(lower, "lower")?;
        let upper = extract_values(upper, "upper")?;
        let starts = extract_indices(starts, "starts")?;
        let indices = extract_indices(indices, "indices")?;
        let values = extract_values(values, "values")?;
        self.status_of(|highs| {
            highs.add_cols(
                count,
                costs.as_host(),
                lower.as_host(),
                upper.as_host(),
                nz,
                starts.as_host(),
                indices.as_host(),
                values.as_host(),
            )
        })
    }

    #[pyo3(name = "addVar")]
    fn add_var(&mut self, lower: f64, upper: f64) -> PyResult<PyCallStatus> {
        self.status_of(|highs| highs.add_var(lower, upper))
    }

    #[pyo3(name = "addVars")]
    fn add_vars(
        &mut self,
        num_new_var: HighsInt,
        lower: &Bound<'_, PyAny>,
        upper: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_new_var, "num_new_var")?;
        let lower = extract_values(lower, "lower")?;
        let upper = extract_values(upper, "upper")?;
        self.status_of(|highs| highs.add_vars(count, lower.as_host(), upper.as_host()))
    }

    #[pyo3(name = "changeColCost")]
    fn change_col_cost(&mut self, col: i64, cost: f64) -> PyResult<PyCallStatus> {
        let col = checked_index(col, "col")?;
        self.status_of(|highs| highs.change_col_cost(col, cost))
    }

    #[pyo3(name = "changeColBounds")]
    fn change_col_bounds(&mut self, col: i64, lower: f64, upper: f64) -> PyResult<PyCallStatus> {
        let col = checked_index(col, "col")?;
        self.status_of(|highs| highs.change_col_bounds(col, lower, upper))
    }

    #[pyo3(name = "changeColIntegrality")]
    fn change_col_integrality(
        &mut self,
        col: i64,
        integrality: PyVarType,
    ) -> PyResult<PyCallStatus> {
        let col = checked_index(col, "col")?;
        self.status_of(|highs| highs.change_col_integrality(col, integrality.into()))
    }

    #[pyo3(name = "changeRowBounds")]
    fn change_row_bounds(&mut self, row: i64, lower: f64, upper: f64) -> PyResult<PyCallStatus> {
        let row = checked_index(row, "row")?;
        self.status_of(|highs| highs.change_row_bounds(row, lower, upper))
    }

    #[pyo3(name = "changeCoeff")]
    fn change_coeff(&mut self, row: i64, col: i64, value: f64) -> PyResult<PyCallStatus> {
        let row = checked_index(row, "row")?;
        let col = checked_index(col, "col")?;
        self.status_of(|highs| highs.change_coeff(row, col, value))
    }

    #[pyo3(name = "changeColsCost")]
    fn change_cols_cost(
        &mut self,
        num_set_entries: HighsInt,
        indices: &Bound<'_, PyAny>,
        cost: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_set_entries, "num_set_entries")?;
        let indices = extract_indices(indices, "indices")?;
        let cost = extract_values(cost, "cost")?;
        self.status_of(|highs| highs.change_cols_cost(count, indices.as_host(), cost.as_host()))
    }

    #[pyo3(name = "changeColsBounds")]
    fn change_cols_bounds(
        &mut self,
        num_set_entries: HighsInt,
        indices: &Bound<'_, PyAny>,
        lower: &Bound<'_, PyAny>,
        upper: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_set_entries, "num_set_entries")?;
        let indices = extract_indices(indices, "indices")?;
        let lower = extract_values(lower, "lower")?;
        let upper = extract_values(upper, "upper")?;
        self.status_of(|highs| {
            highs.change_cols_bounds(count, indices.as_host(), lower.as_host(), upper.as_host())
        })
    }

    #[pyo3(name = "changeColsIntegrality")]
    fn change_cols_integrality(
        &mut self,
        num_set_entries: HighsInt,
        indices: &Bound<'_, PyAny>,
        integrality: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_set_entries, "num_set_entries")?;
        let indices = extract_indices(indices, "indices")?;
        let integrality = extract_integrality(integrality, "integrality")?;
        self.status_of(|highs| {
            highs.change_cols_integrality(count, indices.as_host(), integrality.as_host())
        })
    }

    #[pyo3(name = "changeRowsBounds")]
    fn change_rows_bounds(
        &mut self,
        num_set_entries: HighsInt,
        indices: &Bound<'_, PyAny>,
        lower: &Bound<'_, PyAny>,
        upper: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_set_entries, "num_set_entries")?;
        let indices = extract_indices(indices, "indices")?;
        let lower = extract_values(lower, "lower")?;
        let upper = extract_values(upper, "upper")?;
        self.status_of(|highs| {
            highs.change_rows_bounds(count, indices.as_host(), lower.as_host(), upper.as_host())
        })
    }

    #[pyo3(name = "changeObjectiveSense")]
    fn change_objective_sense(&mut self, sense: PyObjSense) -> PyResult<PyCallStatus> {
        self.status_of(|highs| highs.change_objective_sense(sense.into()))
    }

    #[pyo3(name = "changeObjectiveOffset")]
    fn change_objective_offset(&mut self, offset: f64) -> PyResult<PyCallStatus> {
        self.status_of(|highs| highs.change_objective_offset(offset))
    }

    #[pyo3(name = "getObjectiveSense")]
    fn get_objective_sense(&self) -> PyObjSense {
        self.inner.get_objective_sense().into()
    }

    #[pyo3(name = "getObjectiveOffset")]
    fn get_objective_offset(&self) -> f64 {
        self.inner.get_objective_offset()
    }

    #[pyo3(name = "deleteVars")]
    fn delete_vars(
        &mut self,
        num_set_entries: HighsInt,
        indices: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_set_entries, "num_set_entries")?;
        let indices = extract_indices(indices, "indices")?;
        self.status_of(|highs| highs.delete_vars(count, indices.as_host()))
    }

    #[pyo3(name = "deleteRows")]
    fn delete_rows(
        &mut self,
        num_set_entries: HighsInt,
        indices: &Bound<'_, PyAny>,
    ) -> PyResult<PyCallStatus> {
        let count = checked_count(num_set_entries, "num_set_entries")?;
        let indices = extract_indices(indices, "indices")?;
        self.status_of(|highs| highs.delete_rows(count, indices.as_host()))
    }

    fn clear(&mut self) -> PyResult<PyCallStatus> {
        self.status_of(Highs::clear)
    }

    #[pyo3(name = "clearModel")]
    fn clear_model(&mut self) -> PyResult<PyCallStatus> {
        self.status_of(Highs::clear_model)
    }

    #[pyo3(name = "clearSolver")]
    fn clear_solver(&mut self) -> PyResult<PyCallStatus> {
        self.status_of(Highs::clear_solver)
    }

    // ---- solve and results ----

    fn run(&mut self) -> PyResult<PyCallStatus> {
        self.inner
            .run()
            .map(PyCallStatus::from)
            .map_err(bridge_error_to_py)
    }

    #[pyo3(name = "getModelStatus")]
    fn get_model_status(&self) -> PyModelStatus {
        self.inner.model_status().into()
    }

    #[pyo3(name = "modelStatusToString")]
    fn model_status_to_string(&self, status: PyModelStatus) -> &'static str {
        lpbridge_highs::ModelStatus::from(status).as_str()
    }

    #[pyo3(name = "getSolution")]
    fn get_solution(&self) -> PySolution {
        PySolution::from(self.inner.solution())
    }

    #[pyo3(name = "getBasis")]
    fn get_basis(&self) -> PyBasis {
        PyBasis::from(self.inner.basis())
    }

    #[pyo3(name = "getInfo")]
    fn get_info(&self) -> PyInfo {
        PyInfo::from(self.inner.info())
    }

    #[pyo3(name = "getObjectiveValue")]
    fn get_objective_value(&self) -> f64 {
        self.inner.objective_value()
    }

    #[pyo3(name = "getRunTime")]
    fn get_run_time(&self) -> f64 {
        self.inner.run_time()
    }

    #[pyo3(name = "getNumCol")]
    fn get_num_col(&self) -> usize {
        self.inner.num_col()
    }

    #[pyo3(name = "getNumRow")]
    fn get_num_row(&self) -> usize {
        self.inner.num_row()
    }

    #[pyo3(name = "getNumNz")]
    fn get_num_nz(&self) -> usize {
        self.inner.num_nz()
    }

    #[pyo3(name = "checkSolutionFeasibility")]
    fn check_solution_feasibility(&mut self) -> PyResult<PyCallStatus> {
        self.inner
            .check_solution_feasibility()
            .map(PyCallStatus::from)
            .map_err(bridge_error_to_py)
    }

    // ---- options ----

    /// Declared type of option `name`: "bool", "int", "double" or "string".
    #[pyo3(name = "getOptionType")]
    fn get_option_type(&self, name: &str) -> PyResult<&'static str> {
        self.inner
            .get_option_type(name)
            .map(OptionType::as_str)
            .map_err(bridge_error_to_py)
    }

    #[pyo3(name = "getOptionValue")]
    fn get_option_value(&self, py: Python<'_>, name: &str) -> PyResult<PyObject> {
        let value = self
            .inner
            .get_option_value(name)
            .map_err(bridge_error_to_py)?;
        option_value_to_py(py, value)
    }

    /// Set option `name`; the Python type must match the declared type
    /// (an int is not accepted for a double option).
    #[pyo3(name = "setOptionValue")]
    fn set_option_value(&mut self, name: &str, value: &Bound<'_, PyAny>) -> PyResult<PyCallStatus> {
        let value = option_value(value)?;
        self.status_of(|highs| highs.set_option_value(name, value))
    }

    #[pyo3(name = "resetOptions")]
    fn reset_options(&mut self) -> PyResult<PyCallStatus> {
        self.status_of(Highs::reset_options)
    }

    /// Current option values as a JSON object string.
    #[pyo3(name = "getOptionsJson")]
    fn get_options_json(&self) -> PyResult<String> {
        let options = self.inner.options_json().map_err(bridge_error_to_py)?;
        Ok(options.to_string())
    }

    // ---- log callback ----

    /// Install `callback(log_type, message, callback_data)` for engine log
    /// lines. Exceptions raised by the callback are reported as unraisable
    /// and do not abort the engine call.
    #[pyo3(name = "setLogCallback")]
    fn set_log_callback(
        &mut self,
        py: Python<'_>,
        callback: PyObject,
        callback_data: PyObject,
    ) -> PyResult<PyCallStatus> {
        if !callback.bind(py).is_callable() {
            return Err(PyTypeError::new_err("callback must be callable"));
        }
        let handler = move |event: LogEvent<'_, PyObject>| {
            Python::attach(|py| {
                let args = (
                    PyLogType::from(event.severity),
                    event.message,
                    event.context.clone_ref(py),
                );
                if let Err(err) = callback.call1(py, args) {
                    warn!(
                        component = "python",
                        operation = "log_callback",
                        status = "error",
                        %err,
                        "Log callback raised"
                    );
                    err.write_unraisable(py, Some(callback.bind(py)));
                }
            });
        };
        self.status_of(|highs| highs.set_log_callback(handler, callback_data))
    }

    #[pyo3(name = "clearLogCallback")]
    fn clear_log_callback(&mut self) -> PyResult<PyCallStatus> {
        self.status_of(Highs::clear_log_callback)
    }

    // ---- diagnostics ----

    /// The most recent warnings recorded since the last `takeWarnings`.
    #[pyo3(name = "getWarnings")]
    fn get_warnings(&self) -> Vec<String> {
        self.inner.warnings().iter().map(ToString::to_string).collect()
    }

    #[pyo3(name = "takeWarnings")]
    fn take_warnings(&mut self) -> Vec<String> {
        self.inner
            .take_warnings()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "_Highs(num_col={}, num_row={}, num_nz={}, model_status='{}')",
            self.inner.num_col(),
            self.inner.num_row(),
            self.inner.num_nz(),
            self.inner.model_status()
        )
    }
}

/// Register the handle class with the Python module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyHighs>()?;
    Ok(())
}
