//! Translation of engine call statuses into boundary results.

use lpbridge_core::BridgeError;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::status::CallStatus;

/// A warning the engine reported for a call that still succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub operation: String,
    pub message: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "Warning when {}: {}", self.operation, message),
            None => write!(f, "Warning when {}", self.operation),
        }
    }
}

/// Most diagnostics a translator keeps; older ones are dropped first.
pub const MAX_RETAINED_WARNINGS: usize = 128;

/// Maps `(status, operation)` to success, success with a recorded
/// diagnostic, or [`BridgeError::EngineError`].
///
/// Errors are never downgraded and warnings never fail the call. Only the
/// latest [`MAX_RETAINED_WARNINGS`] diagnostics are kept.
#[derive(Debug, Clone, Default)]
pub struct StatusTranslator {
    warnings: Vec<Diagnostic>,
    recorded: u64,
}

impl StatusTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate `status`, passing `value` through on `Ok` and `Warning`.
    pub fn translate<T>(
        &mut self,
        status: CallStatus,
        operation: &str,
        message: Option<&str>,
        value: T,
    ) -> Result<T, BridgeError> {
        match status {
            CallStatus::Ok => {
                trace!(
                    component = "bridge",
                    operation,
                    status = "success",
                    "Engine call succeeded"
                );
                Ok(value)
            }
            CallStatus::Warning => {
                warn!(
                    component = "bridge",
                    operation,
                    status = "warn",
                    engine_message = message.unwrap_or(""),
                    "Engine reported a warning"
                );
                if self.warnings.len() == MAX_RETAINED_WARNINGS {
                    self.warnings.remove(0);
                }
                self.warnings.push(Diagnostic {
                    operation: operation.to_string(),
                    message: message.map(str::to_string),
                });
                self.recorded += 1;
                Ok(value)
            }
            CallStatus::Error => {
                warn!(
                    component = "bridge",
                    operation,
                    status = "error",
                    engine_message = message.unwrap_or(""),
                    "Engine reported an error"
                );
                Err(BridgeError::EngineError {
                    operation: operation.to_string(),
                    message: message.map(str::to_string),
                })
            }
        }
    }

    pub fn check(
        &mut self,
        status: CallStatus,
        operation: &str,
        message: Option<&str>,
    ) -> Result<(), BridgeError> {
        self.translate(status, operation, message, ())
    }

    /// Warnings recorded since the last [`StatusTranslator::take_warnings`].
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.warnings)
    }

    /// Warnings recorded over the translator's lifetime, including dropped
    /// and taken ones.
    pub fn warning_count(&self) -> u64 {
        self.recorded
    }

    pub fn clear(&mut self) {
        self.warnings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_value_through() {
        let mut translator = StatusTranslator::new();
        let value = translator
            .translate(CallStatus::Ok, "adding row", None, 42)
            .unwrap();
        assert_eq!(value, 42);
        assert!(translator.warnings().is_empty());
    }

    #[test]
    fn test_warning_passes_value_and_records_diagnostic() {
        let mut translator = StatusTranslator::new();
        let value = translator
            .translate(
                CallStatus::Warning,
                "running model",
                Some("time limit reached"),
                "done",
            )
            .unwrap();
        assert_eq!(value, "done");
        assert_eq!(translator.warnings().len(), 1);
        assert_eq!(
            translator.warnings()[0].to_string(),
            "Warning when running model: time limit reached"
        );

        let taken = translator.take_warnings();
        assert_eq!(taken.len(), 1);
        assert!(translator.warnings().is_empty());
    }

    #[test]
    fn test_retained_warnings_are_bounded() {
        let mut translator = StatusTranslator::new();
        for k in 0..1000 {
            let message = format!("warning {k}");
            translator
                .check(CallStatus::Warning, "changing column bounds", Some(&message))
                .unwrap();
        }
        assert_eq!(translator.warnings().len(), MAX_RETAINED_WARNINGS);
        assert_eq!(translator.warning_count(), 1000);
        assert_eq!(
            translator.warnings()[MAX_RETAINED_WARNINGS - 1].message.as_deref(),
            Some("warning 999")
        );
        assert_eq!(
            translator.warnings()[0].message.as_deref(),
            Some(format!("warning {}", 1000 - MAX_RETAINED_WARNINGS).as_str())
        );

        translator.take_warnings();
        assert!(translator.warnings().is_empty());
        assert_eq!(translator.warning_count(), 1000);
    }

    #[test]
    fn test_error_names_operation() {
        let mut translator = StatusTranslator::new();
        let err = translator
            .check(CallStatus::Error, "changing variable bounds", None)
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::EngineError {
                operation: "changing variable bounds".to_string(),
                message: None,
            }
        );
        assert!(err.to_string().contains("Error when changing variable bounds"));
        assert!(translator.warnings().is_empty());
    }
}
