//! Log callback plumbing between an engine and a host handler.
//!
//! Engines deliver log lines to a single [`LogSink`]. A [`Trampoline`]
//! adapts a host closure plus a user context value into that sink, so the
//! handler sees `(severity, message, &mut context)` for every event. The
//! message borrow ends when the handler returns.

use lpbridge_core::{BridgeError, HighsInt};
use serde::{Deserialize, Serialize};

/// Severity of an engine log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSeverity {
    Info,
    Detailed,
    Verbose,
    Warning,
    Error,
}

impl LogSeverity {
    pub fn code(self) -> HighsInt {
        match self {
            LogSeverity::Info => 1,
            LogSeverity::Detailed => 2,
            LogSeverity::Verbose => 3,
            LogSeverity::Warning => 4,
            LogSeverity::Error => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogSeverity::Info => "info",
            LogSeverity::Detailed => "detailed",
            LogSeverity::Verbose => "verbose",
            LogSeverity::Warning => "warning",
            LogSeverity::Error => "error",
        }
    }
}

impl TryFrom<HighsInt> for LogSeverity {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, BridgeError> {
        match value {
            1 => Ok(LogSeverity::Info),
            2 => Ok(LogSeverity::Detailed),
            3 => Ok(LogSeverity::Verbose),
            4 => Ok(LogSeverity::Warning),
            5 => Ok(LogSeverity::Error),
            other => Err(BridgeError::InvalidEnumValue {
                enumeration: "LogSeverity",
                value: i64::from(other),
            }),
        }
    }
}

impl std::fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One log event as seen by a host handler.
#[derive(Debug)]
pub struct LogEvent<'a, C> {
    pub severity: LogSeverity,
    pub message: &'a str,
    pub context: &'a mut C,
}

/// Receiver of engine log events, invoked synchronously on the engine's
/// call stack.
pub trait LogSink {
    fn log(&mut self, severity: LogSeverity, message: &str);
}

/// Forwards engine log events to a host handler together with its context.
pub struct Trampoline<C, F> {
    handler: F,
    context: C,
}

impl<C, F> Trampoline<C, F>
where
    F: FnMut(LogEvent<'_, C>),
{
    pub fn new(handler: F, context: C) -> Self {
        Self { handler, context }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }
}

impl<C, F> LogSink for Trampoline<C, F>
where
    F: FnMut(LogEvent<'_, C>),
{
    fn log(&mut self, severity: LogSeverity, message: &str) {
        (self.handler)(LogEvent {
            severity,
            message,
            context: &mut self.context,
        });
    }
}

impl<C, F> std::fmt::Debug for Trampoline<C, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trampoline")
            .field("context", &std::any::type_name::<C>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trampoline_passes_context_mutably() {
        let mut sink = Trampoline::new(
            |event: LogEvent<'_, Vec<String>>| {
                event
                    .context
                    .push(format!("{}:{}", event.severity, event.message));
            },
            Vec::new(),
        );
        sink.log(LogSeverity::Info, "Running");
        sink.log(LogSeverity::Warning, "Limit");
        assert_eq!(sink.context().len(), 2);
        assert_eq!(
            sink.into_context(),
            vec!["info:Running".to_string(), "warning:Limit".to_string()]
        );
    }

    #[test]
    fn test_trampoline_as_trait_object() {
        let mut count = 0usize;
        {
            let mut sink: Box<dyn LogSink + '_> = Box::new(Trampoline::new(
                |event: LogEvent<'_, &mut usize>| **event.context += 1,
                &mut count,
            ));
            sink.log(LogSeverity::Detailed, "a");
            sink.log(LogSeverity::Verbose, "b");
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_severity_codes() {
        assert_eq!(LogSeverity::Info.code(), 1);
        assert_eq!(LogSeverity::Error.code(), 5);
        assert_eq!(LogSeverity::try_from(4), Ok(LogSeverity::Warning));
        assert!(LogSeverity::try_from(0).is_err());
        assert!(LogSeverity::Warning > LogSeverity::Info);
    }
}
