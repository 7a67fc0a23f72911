//! Zero-copy typed views over caller-owned buffers.
//!
//! A host hands arrays across the boundary as [`HostBuffer`]s: borrowed
//! slices tagged with their element kind. [`BufferView`] checks the kind
//! (exactly, no widening or narrowing) and optionally the length before any
//! engine call, then exposes the caller's memory as a typed slice without
//! copying. Views borrow the caller's buffer and cannot outlive the call.

use crate::error::BridgeError;

/// Element kind of a host buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    F64,
    F32,
    I32,
    I64,
    U8,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::F64 => "float64",
            ElementKind::F32 => "float32",
            ElementKind::I32 => "int32",
            ElementKind::I64 => "int64",
            ElementKind::U8 => "uint8",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A borrowed caller buffer tagged with its element kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostBuffer<'a> {
    F64(&'a [f64]),
    F32(&'a [f32]),
    I32(&'a [i32]),
    I64(&'a [i64]),
    U8(&'a [u8]),
}

impl HostBuffer<'_> {
    pub fn kind(&self) -> ElementKind {
        match self {
            HostBuffer::F64(_) => ElementKind::F64,
            HostBuffer::F32(_) => ElementKind::F32,
            HostBuffer::I32(_) => ElementKind::I32,
            HostBuffer::I64(_) => ElementKind::I64,
            HostBuffer::U8(_) => ElementKind::U8,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HostBuffer::F64(data) => data.len(),
            HostBuffer::F32(data) => data.len(),
            HostBuffer::I32(data) => data.len(),
            HostBuffer::I64(data) => data.len(),
            HostBuffer::U8(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Element types a [`BufferView`] can expose.
pub trait Element: sealed::Sealed + Copy + 'static {
    const KIND: ElementKind;

    #[doc(hidden)]
    fn slice(buffer: HostBuffer<'_>) -> Option<&[Self]>;
}

macro_rules! host_element {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$variant;

            fn slice(buffer: HostBuffer<'_>) -> Option<&[Self]> {
                match buffer {
                    HostBuffer::$variant(data) => Some(data),
                    _ => None,
                }
            }
        }

        impl<'a> From<&'a [$ty]> for HostBuffer<'a> {
            fn from(data: &'a [$ty]) -> Self {
                HostBuffer::$variant(data)
            }
        }

        impl<'a, const N: usize> From<&'a [$ty; N]> for HostBuffer<'a> {
            fn from(data: &'a [$ty; N]) -> Self {
                HostBuffer::$variant(data.as_slice())
            }
        }

        impl<'a> From<&'a Vec<$ty>> for HostBuffer<'a> {
            fn from(data: &'a Vec<$ty>) -> Self {
                HostBuffer::$variant(data.as_slice())
            }
        }
    };
}

host_element!(f64, F64);
host_element!(f32, F32);
host_element!(i32, I32);
host_element!(i64, I64);
host_element!(u8, U8);

/// Typed read-only view over a host buffer, validated before use.
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a, T: Element> {
    argument: &'static str,
    data: &'a [T],
}

impl<'a, T: Element> BufferView<'a, T> {
    /// View `buffer` as `T`, rejecting any other element kind.
    pub fn typed(buffer: HostBuffer<'a>, argument: &'static str) -> Result<Self, BridgeError> {
        match T::slice(buffer) {
            Some(data) => Ok(Self { argument, data }),
            None => Err(BridgeError::TypeMismatch {
                argument,
                expected: T::KIND,
                found: buffer.kind(),
            }),
        }
    }

    /// View `buffer` as `T` holding exactly `len` elements.
    pub fn exact(
        buffer: HostBuffer<'a>,
        argument: &'static str,
        len: usize,
    ) -> Result<Self, BridgeError> {
        let view = Self::typed(buffer, argument)?;
        if view.data.len() != len {
            return Err(BridgeError::LengthMismatch {
                argument,
                expected: len,
                found: view.data.len(),
            });
        }
        Ok(view)
    }

    /// Check that this per-entity array holds `count` entries.
    pub fn with_arity(self, operation: &'static str, count: usize) -> Result<Self, BridgeError> {
        if self.data.len() != count {
            return Err(BridgeError::ArityMismatch {
                operation,
                argument: self.argument,
                expected: count,
                found: self.data.len(),
            });
        }
        Ok(self)
    }

    pub fn argument(&self) -> &'static str {
        self.argument
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_view_borrows_without_copy() {
        let values = vec![1.0_f64, 2.0, 3.0];
        let view = BufferView::<f64>::typed(HostBuffer::from(&values), "values").unwrap();
        assert_eq!(view.len(), 3);
        assert!(std::ptr::eq(view.as_slice().as_ptr(), values.as_ptr()));
    }

    #[test]
    fn element_kind_must_match_exactly() {
        let narrow = [1.0_f32, 2.0];
        let err = BufferView::<f64>::typed(HostBuffer::from(&narrow), "values").unwrap_err();
        assert_eq!(
            err,
            BridgeError::TypeMismatch {
                argument: "values",
                expected: ElementKind::F64,
                found: ElementKind::F32,
            }
        );

        let wide = [0_i64, 1];
        let err = BufferView::<i32>::typed(HostBuffer::from(&wide), "indices").unwrap_err();
        assert_eq!(err.code(), "BUFFER_TYPE_MISMATCH");
    }

    #[test]
    fn exact_length_is_enforced() {
        let indices = [0_i32, 1, 2];
        let err = BufferView::<i32>::exact(HostBuffer::from(&indices), "indices", 2).unwrap_err();
        assert_eq!(
            err,
            BridgeError::LengthMismatch {
                argument: "indices",
                expected: 2,
                found: 3,
            }
        );
        assert!(BufferView::<i32>::exact(HostBuffer::from(&indices), "indices", 3).is_ok());
    }

    #[test]
    fn arity_reports_operation() {
        let lower = [0.0_f64; 2];
        let view = BufferView::<f64>::typed(HostBuffer::from(&lower), "lower").unwrap();
        let err = view.with_arity("adding rows", 3).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::ArityMismatch {
                operation: "adding rows",
                argument: "lower",
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn empty_buffers_are_valid_views() {
        let empty: [u8; 0] = [];
        let view = BufferView::<u8>::exact(HostBuffer::from(&empty), "tags", 0).unwrap();
        assert!(view.is_empty());
    }
}
