//! The contract every optimization engine implements.

use std::borrow::Cow;

use lpbridge_core::{HighsInt, IndexSet, Lp, ObjSense, OptionType, SparseBatch, VarType};

use crate::callback::LogSink;
use crate::solution::{Basis, Info, Solution};
use crate::status::{CallStatus, ModelStatus};

/// An engine owning one model, one option store, and the results of its
/// last solve.
///
/// Inputs arrive already shape-checked by the boundary layer: buffers have
/// the right element type and arity, sparse batches are well formed, and
/// indices are non-negative. Range checks against the current dimensions
/// and value checks are the engine's own. Every mutation is atomic and
/// reports a [`CallStatus`]; a human-readable explanation of the last
/// non-`Ok` status is available from [`Engine::last_message`].
pub trait Engine {
    fn name(&self) -> &'static str;

    fn version(&self) -> String;

    /// Replace the model with a copy of `lp`.
    fn pass_model(&mut self, lp: &Lp) -> CallStatus;

    /// The current model.
    fn lp(&self) -> Cow<'_, Lp>;

    /// Append columns with costs, bounds, and their matrix entries
    /// (`matrix` is empty or holds one vector per column; indices are rows).
    fn add_cols(
        &mut self,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        matrix: &SparseBatch<'_>,
    ) -> CallStatus;

    /// Append zero-cost columns without matrix entries.
    fn add_vars(&mut self, lower: &[f64], upper: &[f64]) -> CallStatus;

    /// Append rows with bounds and their matrix entries (indices are columns).
    fn add_rows(&mut self, lower: &[f64], upper: &[f64], matrix: &SparseBatch<'_>) -> CallStatus;

    fn delete_cols(&mut self, set: &IndexSet) -> CallStatus;

    fn delete_rows(&mut self, set: &IndexSet) -> CallStatus;

    /// Overwrite or insert one matrix entry; `0.0` removes it.
    fn change_coeff(&mut self, row: usize, col: usize, value: f64) -> CallStatus;

    fn change_cols_cost(&mut self, cols: &[usize], cost: &[f64]) -> CallStatus;

    fn change_cols_bounds(&mut self, cols: &[usize], lower: &[f64], upper: &[f64]) -> CallStatus;

    fn change_cols_integrality(&mut self, cols: &[usize], integrality: &[VarType]) -> CallStatus;

    fn change_rows_bounds(&mut self, rows: &[usize], lower: &[f64], upper: &[f64]) -> CallStatus;

    fn change_objective_sense(&mut self, sense: ObjSense) -> CallStatus;

    fn change_objective_offset(&mut self, offset: f64) -> CallStatus;

    fn objective_sense(&self) -> ObjSense;

    fn objective_offset(&self) -> f64;

    fn num_col(&self) -> usize;

    fn num_row(&self) -> usize;

    fn num_nz(&self) -> usize;

    /// Reset model, solver state, and options.
    fn clear(&mut self) -> CallStatus;

    /// Reset model and solver state; options are kept.
    fn clear_model(&mut self) -> CallStatus;

    /// Discard solution, basis, and info; the model is kept.
    fn clear_solver(&mut self) -> CallStatus;

    /// Solve the current model. Log events are delivered synchronously
    /// before this returns.
    fn run(&mut self) -> CallStatus;

    fn model_status(&self) -> ModelStatus;

    fn solution(&self) -> &Solution;

    fn basis(&self) -> &Basis;

    fn info(&self) -> &Info;

    fn objective_value(&self) -> f64;

    /// Wall-clock seconds spent in the last `run`.
    fn run_time(&self) -> f64;

    /// Check the current primal solution against bounds and rows, updating
    /// the infeasibility fields of [`Info`].
    fn check_solution_feasibility(&mut self) -> CallStatus;

    /// Declared type of option `name`, or `None` when it does not exist.
    fn option_type(&self, name: &str) -> Option<OptionType>;

    /// Names of every option the engine exposes.
    fn option_names(&self) -> Vec<String>;

    fn get_bool_option(&self, name: &str) -> Option<bool>;

    fn get_int_option(&self, name: &str) -> Option<HighsInt>;

    fn get_double_option(&self, name: &str) -> Option<f64>;

    fn get_string_option(&self, name: &str) -> Option<String>;

    fn set_bool_option(&mut self, name: &str, value: bool) -> CallStatus;

    fn set_int_option(&mut self, name: &str, value: HighsInt) -> CallStatus;

    fn set_double_option(&mut self, name: &str, value: f64) -> CallStatus;

    fn set_string_option(&mut self, name: &str, value: &str) -> CallStatus;

    fn reset_options(&mut self) -> CallStatus;

    /// Install or remove the log sink. The previous sink is dropped.
    fn set_log_sink(&mut self, sink: Option<Box<dyn LogSink>>) -> CallStatus;

    /// Explanation attached to the most recent `Warning` or `Error`.
    fn last_message(&self) -> Option<&str>;
}
