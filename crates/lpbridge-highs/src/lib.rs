//! HiGHS-style optimization handle for lpbridge.
//!
//! [`Highs`] is the boundary layer host callers talk to: it validates
//! caller buffers, forwards edits and option changes to an [`Engine`],
//! translates engine statuses into `Result`s, and routes engine log lines
//! to a registered callback.
//!
//! Two engines are available:
//!
//! - [`ReferenceEngine`] (default): pure Rust, solves LPs with a bounded
//!   simplex and MIPs by branch-and-bound.
//! - `NativeEngine` (feature `native`): the HiGHS C library via `highs-sys`.
//!
//! ```
//! use lpbridge_highs::{Highs, INFINITY};
//!
//! let mut highs = Highs::new();
//! highs.add_vars(2, &[0.0f64, 0.0], &[INFINITY, INFINITY])?;
//! highs.change_cols_cost(2, &[0i32, 1], &[1.0f64, 1.0])?;
//! highs.add_row(1.0, INFINITY, 2, &[0i32, 1], &[1.0f64, 1.0])?;
//! highs.run()?;
//! assert!((highs.objective_value() - 1.0).abs() < 1e-9);
//! # Ok::<(), lpbridge_highs::BridgeError>(())
//! ```

#[cfg(feature = "native")]
pub mod native;
pub mod reference;
pub mod session;
pub mod telemetry;

pub use lpbridge_core::{
    BridgeError, ElementKind, HighsInt, HostBuffer, INFINITY, Lp, ObjSense, OptionType,
    OptionValue, VarType,
};
pub use lpbridge_solver::{
    Basis, BasisStatus, CallStatus, Diagnostic, Engine, Info, LogEvent, LogSeverity,
    MAX_RETAINED_WARNINGS, ModelStatus, Solution, SolutionStatus, SolverConfig,
};
#[cfg(feature = "native")]
pub use native::NativeEngine;
pub use reference::ReferenceEngine;
pub use session::{Highs, Result};
pub use telemetry::{TelemetryError, enable_logging};
