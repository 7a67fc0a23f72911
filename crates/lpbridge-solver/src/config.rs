//! Solver configuration applied through the option bridge.

use lpbridge_core::{HighsInt, OptionValue};

/// Common solver settings, translated into engine options.
///
/// Every field is optional; `None` leaves the engine's current value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverConfig {
    /// Time limit in seconds. `None` means no limit.
    pub time_limit: Option<f64>,
    /// Relative MIP gap tolerance. `None` uses solver default.
    pub mip_gap: Option<f64>,
    /// Verbosity level: 0 silences output, higher values add development
    /// logging. `None` uses solver default.
    pub verbosity: Option<u32>,
    /// Enable/disable presolve. `None` uses solver default.
    pub presolve: Option<bool>,
    /// Number of threads to use. `None` uses solver default.
    pub threads: Option<u32>,
    /// Primal and dual feasibility tolerance. `None` uses solver default.
    pub tolerance: Option<f64>,
    /// Log solver output to console. `None` uses solver default.
    pub log_to_console: Option<bool>,
    /// Simplex iteration limit. `None` uses solver default.
    pub iteration_limit: Option<u32>,
    /// Solver choice (`"choose"`, `"simplex"`, `"ipm"`, `"pdlp"`).
    pub solver: Option<String>,
}

fn clamp_int(value: u32) -> HighsInt {
    HighsInt::try_from(value).unwrap_or(HighsInt::MAX)
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    /// Set the relative MIP gap tolerance.
    pub fn with_mip_gap(mut self, gap: f64) -> Self {
        self.mip_gap = Some(gap);
        self
    }

    /// Set the verbosity level.
    pub fn with_verbosity(mut self, level: u32) -> Self {
        self.verbosity = Some(level);
        self
    }

    /// Enable or disable presolve.
    pub fn with_presolve(mut self, enabled: bool) -> Self {
        self.presolve = Some(enabled);
        self
    }

    /// Set the number of threads.
    pub fn with_threads(mut self, count: u32) -> Self {
        self.threads = Some(count);
        self
    }

    /// Set the feasibility tolerance.
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = Some(tol);
        self
    }

    /// Enable or disable console logging.
    pub fn with_log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = Some(enabled);
        self
    }

    pub fn with_iteration_limit(mut self, limit: u32) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn with_solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = Some(solver.into());
        self
    }

    /// Check if this configuration is completely empty (all defaults).
    pub fn is_empty(&self) -> bool {
        self.time_limit.is_none()
            && self.mip_gap.is_none()
            && self.verbosity.is_none()
            && self.presolve.is_none()
            && self.threads.is_none()
            && self.tolerance.is_none()
            && self.log_to_console.is_none()
            && self.iteration_limit.is_none()
            && self.solver.is_none()
    }

    /// Engine option assignments for every field that is set.
    pub fn option_values(&self) -> Vec<(&'static str, OptionValue)> {
        let mut options = Vec::new();
        if let Some(seconds) = self.time_limit {
            options.push(("time_limit", OptionValue::Double(seconds)));
        }
        if let Some(gap) = self.mip_gap {
            options.push(("mip_rel_gap", OptionValue::Double(gap)));
        }
        if let Some(level) = self.verbosity {
            options.push(("output_flag", OptionValue::Bool(level > 0)));
            let dev_level = clamp_int(level.saturating_sub(1).min(3));
            options.push(("log_dev_level", OptionValue::Int(dev_level)));
        }
        if let Some(enabled) = self.presolve {
            let mode = if enabled { "on" } else { "off" };
            options.push(("presolve", OptionValue::from(mode)));
        }
        if let Some(count) = self.threads {
            options.push(("threads", OptionValue::Int(clamp_int(count))));
        }
        if let Some(tol) = self.tolerance {
            options.push(("primal_feasibility_tolerance", OptionValue::Double(tol)));
            options.push(("dual_feasibility_tolerance", OptionValue::Double(tol)));
        }
        if let Some(enabled) = self.log_to_console {
            options.push(("log_to_console", OptionValue::Bool(enabled)));
        }
        if let Some(limit) = self.iteration_limit {
            options.push(("simplex_iteration_limit", OptionValue::Int(clamp_int(limit))));
        }
        if let Some(solver) = &self.solver {
            options.push(("solver", OptionValue::String(solver.clone())));
        }
        options
    }
}
