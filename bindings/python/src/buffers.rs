//! Conversion of Python arrays into tagged host buffers.
//!
//! Objects exposing the buffer protocol (numpy arrays, `array.array`,
//! `bytes`) keep their own element type, so a float32 array handed to a
//! float64 argument is rejected by the boundary layer instead of being cast.
//! Plain sequences carry no dtype and are read as the argument's kind.

use lpbridge_highs::{ElementKind, HighsInt, HostBuffer};
use pyo3::buffer::{Element, PyBuffer};
use pyo3::prelude::*;

use crate::enums::PyVarType;
use crate::errors::{BufferShapeError, BufferTypeError, IndexInvalidError};

/// An owned copy of a host array with its element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum HostArray {
    F64(Vec<f64>),
    F32(Vec<f32>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    U8(Vec<u8>),
}

impl HostArray {
    pub fn as_host(&self) -> HostBuffer<'_> {
        match self {
            HostArray::F64(data) => HostBuffer::F64(data),
            HostArray::F32(data) => HostBuffer::F32(data),
            HostArray::I32(data) => HostBuffer::I32(data),
            HostArray::I64(data) => HostBuffer::I64(data),
            HostArray::U8(data) => HostBuffer::U8(data),
        }
    }
}

fn one_dimensional<T>(py: Python<'_>, buffer: PyBuffer<T>, name: &str) -> PyResult<Vec<T>>
where
    T: Element + Copy,
{
    if buffer.dimensions() != 1 {
        return Err(BufferShapeError::new_err(format!(
            "{name} must be a 1D array (got {} dimensions)",
            buffer.dimensions()
        )));
    }
    buffer.to_vec(py)
}

/// Copy `obj` out through the buffer protocol, keeping its dtype.
fn probe_buffer(obj: &Bound<'_, PyAny>, name: &str) -> PyResult<Option<HostArray>> {
    let py = obj.py();
    if let Ok(buffer) = PyBuffer::<f64>::get(obj) {
        return one_dimensional(py, buffer, name).map(|data| Some(HostArray::F64(data)));
    }
    if let Ok(buffer) = PyBuffer::<f32>::get(obj) {
        return one_dimensional(py, buffer, name).map(|data| Some(HostArray::F32(data)));
    }
    if let Ok(buffer) = PyBuffer::<i32>::get(obj) {
        return one_dimensional(py, buffer, name).map(|data| Some(HostArray::I32(data)));
    }
    if let Ok(buffer) = PyBuffer::<i64>::get(obj) {
        return one_dimensional(py, buffer, name).map(|data| Some(HostArray::I64(data)));
    }
    if let Ok(buffer) = PyBuffer::<u8>::get(obj) {
        return one_dimensional(py, buffer, name).map(|data| Some(HostArray::U8(data)));
    }
    Ok(None)
}

/// Extract `obj` as a host array; sequences are read as `kind`.
pub fn extract_array(obj: &Bound<'_, PyAny>, name: &str, kind: ElementKind) -> PyResult<HostArray> {
    if let Some(array) = probe_buffer(obj, name)? {
        return Ok(array);
    }
    let array = match kind {
        ElementKind::F64 => obj.extract().map(HostArray::F64),
        ElementKind::F32 => obj.extract().map(HostArray::F32),
        ElementKind::I32 => obj.extract().map(HostArray::I32),
        ElementKind::I64 => obj.extract().map(HostArray::I64),
        ElementKind::U8 => obj.extract().map(HostArray::U8),
    };
    array.map_err(|_| {
        BufferTypeError::new_err(format!(
            "{name} must be a 1D buffer or a sequence of {kind} values"
        ))
    })
}

pub fn extract_values(obj: &Bound<'_, PyAny>, name: &str) -> PyResult<HostArray> {
    extract_array(obj, name, ElementKind::F64)
}

pub fn extract_indices(obj: &Bound<'_, PyAny>, name: &str) -> PyResult<HostArray> {
    extract_array(obj, name, ElementKind::I32)
}

/// Integrality tags from a `uint8` buffer or a sequence of `HighsVarType`
/// members and integer tags.
pub fn extract_integrality(obj: &Bound<'_, PyAny>, name: &str) -> PyResult<HostArray> {
    if let Some(array) = probe_buffer(obj, name)? {
        return Ok(array);
    }
    let mut tags = Vec::new();
    for item in obj.try_iter()? {
        let item = item?;
        let tag = match item.extract::<PyVarType>() {
            Ok(kind) => kind as u8,
            Err(_) => item.extract::<u8>().map_err(|_| {
                BufferTypeError::new_err(format!(
                    "{name} entries must be HighsVarType members or integer tags"
                ))
            })?,
        };
        tags.push(tag);
    }
    Ok(HostArray::U8(tags))
}

/// A scalar index from Python, rejecting negative values.
pub fn checked_index(value: i64, name: &str) -> PyResult<usize> {
    usize::try_from(value).map_err(|_| {
        IndexInvalidError::new_err(format!("{name} must be non-negative (got {value})"))
    })
}

/// A count argument, which the engine API types as a `HighsInt`.
pub fn checked_count(value: HighsInt, name: &str) -> PyResult<usize> {
    usize::try_from(value).map_err(|_| {
        IndexInvalidError::new_err(format!("{name} must be non-negative (got {value})"))
    })
}
