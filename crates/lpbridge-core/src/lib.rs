//! Boundary data model for lpbridge.
//!
//! Host callers hand arrays across the boundary as borrowed [`HostBuffer`]s;
//! this crate validates them ([`BufferView`], [`SparseBatch`]) and holds the
//! engine-side [`Lp`] they mutate.

pub mod buffer;
pub mod error;
pub mod index_set;
pub mod model;
pub mod sparse;
pub mod types;

pub use buffer::{BufferView, Element, ElementKind, HostBuffer};
pub use error::BridgeError;
pub use index_set::{IndexSet, checked_indices};
pub use model::{CscInput, Lp, ModelError};
pub use sparse::{MatrixFormat, SparseBatch, SparseMatrix};
pub use types::{
    DEFAULT_INFINITE_BOUND, HighsInt, INFINITY, ObjSense, OptionType, OptionValue, VarType,
    is_infinite, normalize_infinite,
};
