//! `LpBridgeError` exception hierarchy.
//!
//! Every `BridgeError` code maps to one subclass of `LpBridgeError`. The
//! subclasses are registered as module-level classes and as class attributes
//! on `LpBridgeError` keyed by code, so both `except BufferTypeError` and
//! `except LpBridgeError.BUFFER_TYPE_MISMATCH` work.

use lpbridge_highs::{BridgeError, TelemetryError};
use pyo3::exceptions::PyException;
use pyo3::prelude::*;

pyo3::create_exception!(
    lpbridge,
    LpBridgeError,
    PyException,
    "Base exception for all lpbridge errors."
);

// Buffer errors
pyo3::create_exception!(
    lpbridge,
    BufferTypeError,
    LpBridgeError,
    "Buffer element type does not match the argument."
);
pyo3::create_exception!(
    lpbridge,
    BufferLengthError,
    LpBridgeError,
    "Buffer length differs from the declared count."
);
pyo3::create_exception!(
    lpbridge,
    BufferShapeError,
    LpBridgeError,
    "Buffer must be one-dimensional."
);
pyo3::create_exception!(
    lpbridge,
    ArgumentArityError,
    LpBridgeError,
    "Per-entity array length differs from the entity count."
);
pyo3::create_exception!(
    lpbridge,
    SparseLayoutError,
    LpBridgeError,
    "Compressed sparse triple is malformed."
);

// Value errors
pyo3::create_exception!(
    lpbridge,
    EnumValueError,
    LpBridgeError,
    "Integer tag outside the enumeration."
);
pyo3::create_exception!(
    lpbridge,
    IndexInvalidError,
    LpBridgeError,
    "Index must be non-negative."
);

// Option errors
pyo3::create_exception!(
    lpbridge,
    UnknownOptionError,
    LpBridgeError,
    "No option with this name."
);
pyo3::create_exception!(
    lpbridge,
    OptionTypeError,
    LpBridgeError,
    "Option value has the wrong type."
);

// Engine errors
pyo3::create_exception!(
    lpbridge,
    EngineError,
    LpBridgeError,
    "The engine reported an error."
);

// Logging errors
pyo3::create_exception!(
    lpbridge,
    LoggingError,
    LpBridgeError,
    "Logging could not be initialized."
);

/// Convert a `BridgeError` into the matching `LpBridgeError` subclass.
pub fn bridge_error_to_py(err: BridgeError) -> PyErr {
    let msg = err.to_string();
    match err {
        BridgeError::TypeMismatch { .. } => BufferTypeError::new_err(msg),
        BridgeError::LengthMismatch { .. } => BufferLengthError::new_err(msg),
        BridgeError::ArityMismatch { .. } => ArgumentArityError::new_err(msg),
        BridgeError::InvalidSparseLayout { .. } => SparseLayoutError::new_err(msg),
        BridgeError::InvalidEnumValue { .. } => EnumValueError::new_err(msg),
        BridgeError::InvalidIndex { .. } => IndexInvalidError::new_err(msg),
        BridgeError::UnknownOption { .. } => UnknownOptionError::new_err(msg),
        BridgeError::OptionTypeMismatch { .. } => OptionTypeError::new_err(msg),
        BridgeError::EngineError { .. } => EngineError::new_err(msg),
    }
}

pub fn telemetry_error_to_py(err: TelemetryError) -> PyErr {
    LoggingError::new_err(err.to_string())
}

/// Register exception classes with the Python module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();

    m.add("LpBridgeError", py.get_type::<LpBridgeError>())?;
    m.add("BufferTypeError", py.get_type::<BufferTypeError>())?;
    m.add("BufferLengthError", py.get_type::<BufferLengthError>())?;
    m.add("BufferShapeError", py.get_type::<BufferShapeError>())?;
    m.add("ArgumentArityError", py.get_type::<ArgumentArityError>())?;
    m.add("SparseLayoutError", py.get_type::<SparseLayoutError>())?;
    m.add("EnumValueError", py.get_type::<EnumValueError>())?;
    m.add("IndexInvalidError", py.get_type::<IndexInvalidError>())?;
    m.add("UnknownOptionError", py.get_type::<UnknownOptionError>())?;
    m.add("OptionTypeError", py.get_type::<OptionTypeError>())?;
    m.add("EngineError", py.get_type::<EngineError>())?;
    m.add("LoggingError", py.get_type::<LoggingError>())?;

    let base = py.get_type::<LpBridgeError>();
    base.setattr("BUFFER_TYPE_MISMATCH", py.get_type::<BufferTypeError>())?;
    base.setattr("BUFFER_LENGTH_MISMATCH", py.get_type::<BufferLengthError>())?;
    base.setattr("BUFFER_SHAPE", py.get_type::<BufferShapeError>())?;
    base.setattr(
        "ARGUMENT_ARITY_MISMATCH",
        py.get_type::<ArgumentArityError>(),
    )?;
    base.setattr("SPARSE_INVALID_LAYOUT", py.get_type::<SparseLayoutError>())?;
    base.setattr("ENUM_INVALID_VALUE", py.get_type::<EnumValueError>())?;
    base.setattr("INDEX_INVALID", py.get_type::<IndexInvalidError>())?;
    base.setattr("OPTION_UNKNOWN", py.get_type::<UnknownOptionError>())?;
    base.setattr("OPTION_TYPE_MISMATCH", py.get_type::<OptionTypeError>())?;
    base.setattr("ENGINE_ERROR", py.get_type::<EngineError>())?;
    base.setattr("TELEMETRY", py.get_type::<LoggingError>())?;

    Ok(())
}
