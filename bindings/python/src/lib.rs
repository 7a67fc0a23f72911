//! Python bindings for lpbridge using PyO3.
//!
//! The extension module `_lpbridge` exposes a HiGHS-style `_Highs` handle.
//! Arrays cross the boundary through the buffer protocol or as plain
//! sequences; their dtype and length are checked by the Rust handle before
//! the engine sees them.

mod buffers;
mod enums;
mod errors;
mod highs;
mod logging;
mod solution;

use pyo3::prelude::*;

pub(crate) type PyObject = Py<PyAny>;

pub use enums::{
    PyBasisStatus, PyCallStatus, PyLogType, PyModelStatus, PyObjSense, PySolutionStatus,
    PyVarType,
};
pub use highs::PyHighs;
pub use solution::{PyBasis, PyInfo, PySolution};

#[pymodule]
fn _lpbridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    enums::register(m)?;
    errors::register(m)?;
    solution::register(m)?;
    highs::register(m)?;
    logging::register(m)?;

    m.add("kHighsInf", lpbridge_highs::INFINITY)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
