//! Engine contract for lpbridge.
//!
//! # Overview
//!
//! - [`Engine`]: the operations a solver backend implements
//! - [`CallStatus`], [`ModelStatus`], [`BasisStatus`], [`SolutionStatus`]:
//!   status enumerations with the engine's integer codes
//! - [`StatusTranslator`]: turns call statuses into `Result`s and diagnostics
//! - [`OptionRegistry`]: typed option store used by engines
//! - [`Solution`], [`Basis`], [`Info`]: results of a solve
//! - [`LogSink`], [`Trampoline`]: log callback delivery
//! - [`SolverConfig`]: common settings applied as options

mod callback;
mod config;
mod engine;
mod options;
mod solution;
mod status;
mod translate;

pub use callback::{LogEvent, LogSeverity, LogSink, Trampoline};
pub use config::SolverConfig;
pub use engine::Engine;
pub use options::{OptionError, OptionRecord, OptionRegistry, OptionSpec};
pub use solution::{Basis, Info, Solution};
pub use status::{BasisStatus, CallStatus, ModelStatus, SolutionStatus};
pub use translate::{Diagnostic, MAX_RETAINED_WARNINGS, StatusTranslator};
