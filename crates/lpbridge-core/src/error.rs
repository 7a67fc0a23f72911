//! Boundary error taxonomy.

use crate::buffer::ElementKind;
use crate::types::OptionType;

/// Errors surfaced to host callers of the boundary layer.
///
/// Every variant except [`BridgeError::EngineError`] is raised before the
/// engine is called, so the model and option store are untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// Buffer element type differs from the one the argument requires.
    TypeMismatch {
        argument: &'static str,
        expected: ElementKind,
        found: ElementKind,
    },
    /// A single buffer does not hold exactly the declared number of elements.
    LengthMismatch {
        argument: &'static str,
        expected: usize,
        found: usize,
    },
    /// A per-entity array of a plural operation disagrees with its count.
    ArityMismatch {
        operation: &'static str,
        argument: &'static str,
        expected: usize,
        found: usize,
    },
    /// Malformed compressed sparse `(starts, indices, values)` triple.
    InvalidSparseLayout {
        operation: &'static str,
        reason: String,
    },
    /// Integer tag outside the domain of a fixed enumeration.
    InvalidEnumValue {
        enumeration: &'static str,
        value: i64,
    },
    /// Negative entry in an index array.
    InvalidIndex {
        operation: &'static str,
        argument: &'static str,
        position: usize,
        value: i64,
    },
    UnknownOption {
        name: String,
    },
    /// Option accessed with a type other than the declared one.
    OptionTypeMismatch {
        name: String,
        declared: OptionType,
        requested: OptionType,
    },
    /// The engine reported an error for an operation.
    EngineError {
        operation: String,
        message: Option<String>,
    },
}

impl BridgeError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::TypeMismatch { .. } => "BUFFER_TYPE_MISMATCH",
            BridgeError::LengthMismatch { .. } => "BUFFER_LENGTH_MISMATCH",
            BridgeError::ArityMismatch { .. } => "ARGUMENT_ARITY_MISMATCH",
            BridgeError::InvalidSparseLayout { .. } => "SPARSE_INVALID_LAYOUT",
            BridgeError::InvalidEnumValue { .. } => "ENUM_INVALID_VALUE",
            BridgeError::InvalidIndex { .. } => "INDEX_INVALID",
            BridgeError::UnknownOption { .. } => "OPTION_UNKNOWN",
            BridgeError::OptionTypeMismatch { .. } => "OPTION_TYPE_MISMATCH",
            BridgeError::EngineError { .. } => "ENGINE_ERROR",
        }
    }

    /// True when the error was raised by the engine rather than by shape checks.
    pub fn is_engine_error(&self) -> bool {
        matches!(self, BridgeError::EngineError { .. })
    }

    pub(crate) fn sparse(operation: &'static str, reason: impl Into<String>) -> Self {
        BridgeError::InvalidSparseLayout {
            operation,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::TypeMismatch {
                argument,
                expected,
                found,
            } => write!(
                f,
                "[{}] Argument '{}' must be a {} buffer (got {})",
                self.code(),
                argument,
                expected,
                found
            ),
            BridgeError::LengthMismatch {
                argument,
                expected,
                found,
            } => write!(
                f,
                "[{}] Argument '{}' must hold {} elements (got {})",
                self.code(),
                argument,
                expected,
                found
            ),
            BridgeError::ArityMismatch {
                operation,
                argument,
                expected,
                found,
            } => write!(
                f,
                "[{}] {}: argument '{}' must hold {} entries (got {})",
                self.code(),
                operation,
                argument,
                expected,
                found
            ),
            BridgeError::InvalidSparseLayout { operation, reason } => {
                write!(f, "[{}] {}: {}", self.code(), operation, reason)
            }
            BridgeError::InvalidEnumValue { enumeration, value } => write!(
                f,
                "[{}] {} is not a valid {} value",
                self.code(),
                value,
                enumeration
            ),
            BridgeError::InvalidIndex {
                operation,
                argument,
                position,
                value,
            } => write!(
                f,
                "[{}] {}: '{}' holds negative index {} at position {}",
                self.code(),
                operation,
                argument,
                value,
                position
            ),
            BridgeError::UnknownOption { name } => {
                write!(f, "[{}] Unknown option '{}'", self.code(), name)
            }
            BridgeError::OptionTypeMismatch {
                name,
                declared,
                requested,
            } => write!(
                f,
                "[{}] Option '{}' is declared {} but was accessed as {}",
                self.code(),
                name,
                declared,
                requested
            ),
            BridgeError::EngineError { operation, message } => match message {
                Some(message) => write!(
                    f,
                    "[{}] Error when {}: {}",
                    self.code(),
                    operation,
                    message
                ),
                None => write!(f, "[{}] Error when {}", self.code(), operation),
            },
        }
    }
}

impl std::error::Error for BridgeError {}
