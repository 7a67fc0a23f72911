//! Python snapshots of solution, basis, and solve information.
//!
//! Each accessor on the handle returns a copy, so a snapshot stays readable
//! after later edits invalidate the engine's results.

use lpbridge_highs::{Basis, BasisStatus, Info, Solution};
use pyo3::prelude::*;

use crate::enums::{PyBasisStatus, PySolutionStatus};

/// Primal and dual values; a vector reads as `None` while its validity flag
/// is unset.
#[pyclass(name = "HighsSolution", frozen)]
pub struct PySolution {
    inner: Solution,
}

impl From<&Solution> for PySolution {
    fn from(solution: &Solution) -> Self {
        Self {
            inner: solution.clone(),
        }
    }
}

#[pymethods]
impl PySolution {
    #[getter]
    fn value_valid(&self) -> bool {
        self.inner.value_valid()
    }

    #[getter]
    fn dual_valid(&self) -> bool {
        self.inner.dual_valid()
    }

    #[getter]
    fn col_value(&self) -> Option<Vec<f64>> {
        self.inner.col_value().map(<[f64]>::to_vec)
    }

    #[getter]
    fn row_value(&self) -> Option<Vec<f64>> {
        self.inner.row_value().map(<[f64]>::to_vec)
    }

    #[getter]
    fn col_dual(&self) -> Option<Vec<f64>> {
        self.inner.col_dual().map(<[f64]>::to_vec)
    }

    #[getter]
    fn row_dual(&self) -> Option<Vec<f64>> {
        self.inner.row_dual().map(<[f64]>::to_vec)
    }

    fn __repr__(&self) -> String {
        format!(
            "HighsSolution(value_valid={}, dual_valid={}, num_col={}, num_row={})",
            self.inner.value_valid(),
            self.inner.dual_valid(),
            self.inner.col_value().map_or(0, <[f64]>::len),
            self.inner.row_value().map_or(0, <[f64]>::len),
        )
    }
}

fn statuses(statuses: Option<&[BasisStatus]>) -> Option<Vec<PyBasisStatus>> {
    statuses.map(|statuses| statuses.iter().copied().map(PyBasisStatus::from).collect())
}

#[pyclass(name = "HighsBasis", frozen)]
pub struct PyBasis {
    inner: Basis,
}

impl From<&Basis> for PyBasis {
    fn from(basis: &Basis) -> Self {
        Self {
            inner: basis.clone(),
        }
    }
}

#[pymethods]
impl PyBasis {
    #[getter]
    fn valid(&self) -> bool {
        self.inner.valid()
    }

    #[getter]
    fn alien(&self) -> bool {
        self.inner.alien()
    }

    #[getter]
    fn was_alien(&self) -> bool {
        self.inner.was_alien()
    }

    #[getter]
    fn debug_id(&self) -> i64 {
        self.inner.debug_id()
    }

    #[getter]
    fn debug_update_count(&self) -> i64 {
        self.inner.debug_update_count()
    }

    #[getter]
    fn debug_origin_name(&self) -> &str {
        self.inner.debug_origin_name()
    }

    #[getter]
    fn col_status(&self) -> Option<Vec<PyBasisStatus>> {
        statuses(self.inner.col_status())
    }

    #[getter]
    fn row_status(&self) -> Option<Vec<PyBasisStatus>> {
        statuses(self.inner.row_status())
    }

    fn __repr__(&self) -> String {
        format!(
            "HighsBasis(valid={}, origin='{}')",
            self.inner.valid(),
            self.inner.debug_origin_name()
        )
    }
}

/// Scalar information about the last solve.
#[pyclass(name = "HighsInfo", frozen)]
pub struct PyInfo {
    inner: Info,
}

impl From<&Info> for PyInfo {
    fn from(info: &Info) -> Self {
        Self {
            inner: info.clone(),
        }
    }
}

#[pymethods]
impl PyInfo {
    #[getter]
    fn valid(&self) -> bool {
        self.inner.valid
    }

    #[getter]
    fn objective_function_value(&self) -> f64 {
        self.inner.objective_function_value
    }

    #[getter]
    fn simplex_iteration_count(&self) -> i64 {
        self.inner.simplex_iteration_count
    }

    #[getter]
    fn mip_node_count(&self) -> i64 {
        self.inner.mip_node_count
    }

    #[getter]
    fn mip_gap(&self) -> f64 {
        self.inner.mip_gap
    }

    #[getter]
    fn mip_dual_bound(&self) -> f64 {
        self.inner.mip_dual_bound
    }

    #[getter]
    fn primal_solution_status(&self) -> PySolutionStatus {
        self.inner.primal_solution_status.into()
    }

    #[getter]
    fn dual_solution_status(&self) -> PySolutionStatus {
        self.inner.dual_solution_status.into()
    }

    #[getter]
    fn basis_validity(&self) -> bool {
        self.inner.basis_validity
    }

    #[getter]
    fn num_primal_infeasibilities(&self) -> i64 {
        self.inner.num_primal_infeasibilities
    }

    #[getter]
    fn max_primal_infeasibility(&self) -> f64 {
        self.inner.max_primal_infeasibility
    }

    #[getter]
    fn sum_primal_infeasibilities(&self) -> f64 {
        self.inner.sum_primal_infeasibilities
    }

    /// The info record as a JSON string.
    fn to_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.inner)
            .map_err(|err| pyo3::exceptions::PyValueError::new_err(err.to_string()))
    }

    fn __repr__(&self) -> String {
        format!(
            "HighsInfo(valid={}, objective_function_value={}, simplex_iteration_count={})",
            self.inner.valid,
            self.inner.objective_function_value,
            self.inner.simplex_iteration_count
        )
    }
}

/// Register result classes with the Python module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySolution>()?;
    m.add_class::<PyBasis>()?;
    m.add_class::<PyInfo>()?;
    Ok(())
}
