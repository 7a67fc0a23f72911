//! The `Highs` handle: model mutation, option access, and log callbacks
//! over one engine.
//!
//! Every public method validates host arguments first (element types,
//! lengths, sparse layout, enum tags, index signs) and only then calls the
//! engine, so a rejected call leaves the model and the option store as they
//! were. Engine statuses go through a [`StatusTranslator`]: warnings are
//! recorded and the call succeeds, errors become
//! [`BridgeError::EngineError`] naming the operation.

use std::borrow::Cow;

use lpbridge_core::{
    BridgeError, BufferView, HighsInt, HostBuffer, IndexSet, Lp, ObjSense, OptionType,
    OptionValue, SparseBatch, VarType, checked_indices,
};
use lpbridge_solver::{
    Basis, CallStatus, Diagnostic, Engine, Info, LogEvent, ModelStatus, Solution, SolverConfig,
    StatusTranslator, Trampoline,
};
use tracing::{debug, trace};

use crate::reference::ReferenceEngine;

/// Result type of the boundary layer.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// One optimization session owning its engine, model, and options.
///
/// `E` defaults to the in-process [`ReferenceEngine`].
#[derive(Debug)]
pub struct Highs<E: Engine = ReferenceEngine> {
    engine: E,
    translator: StatusTranslator,
}

impl Highs<ReferenceEngine> {
    pub fn new() -> Self {
        Self::with_engine(ReferenceEngine::new())
    }
}

impl Default for Highs<ReferenceEngine> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sparse batch from a host triple, treating an absent triple as "no entries".
fn host_batch<'a>(
    operation: &'static str,
    count: usize,
    nz: usize,
    starts: HostBuffer<'a>,
    indices: HostBuffer<'a>,
    values: HostBuffer<'a>,
    inner_dim: usize,
) -> Result<SparseBatch<'a>> {
    let starts = BufferView::<HighsInt>::typed(starts, "starts")?;
    let indices = BufferView::<HighsInt>::typed(indices, "indices")?;
    let values = BufferView::<f64>::typed(values, "values")?;
    if nz == 0 && starts.is_empty() && indices.is_empty() && values.is_empty() {
        return Ok(SparseBatch::empty());
    }
    SparseBatch::new(
        operation,
        count,
        nz,
        starts.as_slice(),
        indices.as_slice(),
        values.as_slice(),
        inner_dim,
    )
}

fn per_entity<'a>(
    buffer: HostBuffer<'a>,
    argument: &'static str,
    operation: &'static str,
    count: usize,
) -> Result<&'a [f64]> {
    Ok(BufferView::<f64>::typed(buffer, argument)?
        .with_arity(operation, count)?
        .as_slice())
}

fn index_array<'a>(
    buffer: HostBuffer<'a>,
    operation: &'static str,
    count: usize,
) -> Result<&'a [HighsInt]> {
    Ok(BufferView::<HighsInt>::typed(buffer, "indices")?
        .with_arity(operation, count)?
        .as_slice())
}

impl<E: Engine> Highs<E> {
    pub fn with_engine(engine: E) -> Self {
        debug!(
            component = "bridge",
            operation = "init",
            status = "success",
            engine = engine.name(),
            version = %engine.version(),
            "Creating session"
        );
        Self {
            engine,
            translator: StatusTranslator::new(),
        }
    }

    /// The engine behind this handle.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn version(&self) -> String {
        self.engine.version()
    }

    fn check(&mut self, status: CallStatus, operation: &str) -> Result<()> {
        self.translator
            .check(status, operation, self.engine.last_message())
    }

    // ---- model mutation ----

    /// Append one row `lower <= sum(values[k] * x[indices[k]]) <= upper`.
    ///
    /// `nz` must equal the length of both `indices` and `values`.
    pub fn add_row<'a>(
        &mut self,
        lower: f64,
        upper: f64,
        nz: usize,
        indices: impl Into<HostBuffer<'a>>,
        values: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "adding row";
        let indices = BufferView::<HighsInt>::exact(indices.into(), "indices", nz)?;
        let values = BufferView::<f64>::exact(values.into(), "values", nz)?;
        let batch = SparseBatch::single(
            OPERATION,
            indices.as_slice(),
            values.as_slice(),
            self.engine.num_col(),
        )?;
        let status = self.engine.add_rows(&[lower], &[upper], &batch);
        self.check(status, OPERATION)
    }

    /// Append `count` rows whose entries are given row-wise by
    /// `(starts, indices, values)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_rows<'a>(
        &mut self,
        count: usize,
        lower: impl Into<HostBuffer<'a>>,
        upper: impl Into<HostBuffer<'a>>,
        nz: usize,
        starts: impl Into<HostBuffer<'a>>,
        indices: impl Into<HostBuffer<'a>>,
        values: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "adding rows";
        let lower = per_entity(lower.into(), "lower", OPERATION, count)?;
        let upper = per_entity(upper.into(), "upper", OPERATION, count)?;
        let batch = host_batch(
            OPERATION,
            count,
            nz,
            starts.into(),
            indices.into(),
            values.into(),
            self.engine.num_col(),
        )?;
        trace!(
            component = "bridge",
            operation = "add_rows",
            count,
            nnz = batch.num_nz(),
            "Adding rows"
        );
        let status = self.engine.add_rows(lower, upper, &batch);
        self.check(status, OPERATION)
    }

    /// Append one column with its cost, bounds, and entries (indices are rows).
    pub fn add_col<'a>(
        &mut self,
        cost: f64,
        lower: f64,
        upper: f64,
        nz: usize,
        indices: impl Into<HostBuffer<'a>>,
        values: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "adding col";
        let indices = BufferView::<HighsInt>::exact(indices.into(), "indices", nz)?;
        let values = BufferView::<f64>::exact(values.into(), "values", nz)?;
        let batch = SparseBatch::single(
            OPERATION,
            indices.as_slice(),
            values.as_slice(),
            self.engine.num_row(),
        )?;
        let status = self.engine.add_cols(&[cost], &[lower], &[upper], &batch);
        self.check(status, OPERATION)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_cols<'a>(
        &mut self,
        count: usize,
        cost: impl Into<HostBuffer<'a>>,
        lower: impl Into<HostBuffer<'a>>,
        upper: impl Into<HostBuffer<'a>>,
        nz: usize,
        starts: impl Into<HostBuffer<'a>>,
        indices: impl Into<HostBuffer<'a>>,
        values: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "adding cols";
        let cost = per_entity(cost.into(), "cost", OPERATION, count)?;
        let lower = per_entity(lower.into(), "lower", OPERATION, count)?;
        let upper = per_entity(upper.into(), "upper", OPERATION, count)?;
        let batch = host_batch(
            OPERATION,
            count,
            nz,
            starts.into(),
            indices.into(),
            values.into(),
            self.engine.num_row(),
        )?;
        trace!(
            component = "bridge",
            operation = "add_cols",
            count,
            nnz = batch.num_nz(),
            "Adding columns"
        );
        let status = self.engine.add_cols(cost, lower, upper, &batch);
        self.check(status, OPERATION)
    }

    /// Append one zero-cost column with no matrix entries.
    pub fn add_var(&mut self, lower: f64, upper: f64) -> Result<()> {
        let status = self.engine.add_vars(&[lower], &[upper]);
        self.check(status, "adding var")
    }

    pub fn add_vars<'a>(
        &mut self,
        count: usize,
        lower: impl Into<HostBuffer<'a>>,
        upper: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "adding vars";
        let lower = per_entity(lower.into(), "lower", OPERATION, count)?;
        let upper = per_entity(upper.into(), "upper", OPERATION, count)?;
        let status = self.engine.add_vars(lower, upper);
        self.check(status, OPERATION)
    }

    pub fn change_col_cost(&mut self, col: usize, cost: f64) -> Result<()> {
        let status = self.engine.change_cols_cost(&[col], &[cost]);
        self.check(status, "changing objective coefficient")
    }

    pub fn change_cols_cost<'a>(
        &mut self,
        count: usize,
        indices: impl Into<HostBuffer<'a>>,
        cost: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "changing objective coefficients";
        let raw = index_array(indices.into(), OPERATION, count)?;
        let cost = per_entity(cost.into(), "cost", OPERATION, count)?;
        let cols = checked_indices(OPERATION, "indices", raw)?;
        let status = self.engine.change_cols_cost(&cols, cost);
        self.check(status, OPERATION)
    }

    pub fn change_col_bounds(&mut self, col: usize, lower: f64, upper: f64) -> Result<()> {
        let status = self.engine.change_cols_bounds(&[col], &[lower], &[upper]);
        self.check(status, "changing variable bounds")
    }

    pub fn change_cols_bounds<'a>(
        &mut self,
        count: usize,
        indices: impl Into<HostBuffer<'a>>,
        lower: impl Into<HostBuffer<'a>>,
        upper: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "changing variable bounds";
        let raw = index_array(indices.into(), OPERATION, count)?;
        let lower = per_entity(lower.into(), "lower", OPERATION, count)?;
        let upper = per_entity(upper.into(), "upper", OPERATION, count)?;
        let cols = checked_indices(OPERATION, "indices", raw)?;
        let status = self.engine.change_cols_bounds(&cols, lower, upper);
        self.check(status, OPERATION)
    }

    pub fn change_col_integrality(&mut self, col: usize, integrality: VarType) -> Result<()> {
        let status = self.engine.change_cols_integrality(&[col], &[integrality]);
        self.check(status, "changing variable integrality")
    }

    /// Change integrality of `count` columns; tags are `0` (continuous) or
    /// `1` (integer).
    pub fn change_cols_integrality<'a>(
        &mut self,
        count: usize,
        indices: impl Into<HostBuffer<'a>>,
        integrality: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "changing variable integrality";
        let raw = index_array(indices.into(), OPERATION, count)?;
        let tags = BufferView::<u8>::typed(integrality.into(), "integrality")?
            .with_arity(OPERATION, count)?;
        let kinds = tags
            .as_slice()
            .iter()
            .map(|&tag| VarType::try_from(tag))
            .collect::<Result<Vec<_>>>()?;
        let cols = checked_indices(OPERATION, "indices", raw)?;
        let status = self.engine.change_cols_integrality(&cols, &kinds);
        self.check(status, OPERATION)
    }

    pub fn change_row_bounds(&mut self, row: usize, lower: f64, upper: f64) -> Result<()> {
        let status = self.engine.change_rows_bounds(&[row], &[lower], &[upper]);
        self.check(status, "changing row bounds")
    }

    pub fn change_rows_bounds<'a>(
        &mut self,
        count: usize,
        indices: impl Into<HostBuffer<'a>>,
        lower: impl Into<HostBuffer<'a>>,
        upper: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "changing row bounds";
        let raw = index_array(indices.into(), OPERATION, count)?;
        let lower = per_entity(lower.into(), "lower", OPERATION, count)?;
        let upper = per_entity(upper.into(), "upper", OPERATION, count)?;
        let rows = checked_indices(OPERATION, "indices", raw)?;
        let status = self.engine.change_rows_bounds(&rows, lower, upper);
        self.check(status, OPERATION)
    }

    /// Overwrite or insert one matrix coefficient; `0.0` removes it.
    pub fn change_coeff(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let status = self.engine.change_coeff(row, col, value);
        self.check(status, "changing coefficient")
    }

    pub fn change_objective_sense(&mut self, sense: ObjSense) -> Result<()> {
        let status = self.engine.change_objective_sense(sense);
        self.check(status, "changing objective sense")
    }

    pub fn change_objective_offset(&mut self, offset: f64) -> Result<()> {
        let status = self.engine.change_objective_offset(offset);
        self.check(status, "changing objective offset")
    }

    pub fn get_objective_sense(&self) -> ObjSense {
        self.engine.objective_sense()
    }

    pub fn get_objective_offset(&self) -> f64 {
        self.engine.objective_offset()
    }

    /// Delete a set of columns; survivors keep their relative order.
    pub fn delete_vars<'a>(
        &mut self,
        count: usize,
        indices: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "deleting columns";
        let raw = index_array(indices.into(), OPERATION, count)?;
        let set = IndexSet::from_host(OPERATION, "indices", raw)?;
        let status = self.engine.delete_cols(&set);
        self.check(status, OPERATION)
    }

    pub fn delete_rows<'a>(
        &mut self,
        count: usize,
        indices: impl Into<HostBuffer<'a>>,
    ) -> Result<()> {
        const OPERATION: &str = "deleting rows";
        let raw = index_array(indices.into(), OPERATION, count)?;
        let set = IndexSet::from_host(OPERATION, "indices", raw)?;
        let status = self.engine.delete_rows(&set);
        self.check(status, OPERATION)
    }

    /// Replace the model with a copy of `lp`.
    pub fn pass_model(&mut self, lp: &Lp) -> Result<()> {
        let status = self.engine.pass_model(lp);
        self.check(status, "passing model")
    }

    /// Reset model, solver state, options, and recorded warnings.
    pub fn clear(&mut self) -> Result<()> {
        self.translator.clear();
        let status = self.engine.clear();
        self.check(status, "clearing")
    }

    pub fn clear_model(&mut self) -> Result<()> {
        let status = self.engine.clear_model();
        self.check(status, "clearing model")
    }

    pub fn clear_solver(&mut self) -> Result<()> {
        let status = self.engine.clear_solver();
        self.check(status, "clearing solver")
    }

    // ---- solve and results ----

    /// Solve the current model.
    ///
    /// Returns the engine status: `Ok`, or `Warning` when the solve stopped
    /// early (time or iteration limit). Log callbacks fire before this
    /// returns.
    pub fn run(&mut self) -> Result<CallStatus> {
        debug!(
            component = "bridge",
            operation = "run",
            status = "start",
            num_col = self.engine.num_col(),
            num_row = self.engine.num_row(),
            num_nz = self.engine.num_nz(),
            "Running engine"
        );
        let status = self.engine.run();
        self.check(status, "running model")?;
        debug!(
            component = "bridge",
            operation = "run",
            status = status.as_str(),
            model_status = self.engine.model_status().as_str(),
            objective = self.engine.objective_value(),
            "Engine run finished"
        );
        Ok(status)
    }

    pub fn model_status(&self) -> ModelStatus {
        self.engine.model_status()
    }

    pub fn solution(&self) -> &Solution {
        self.engine.solution()
    }

    pub fn basis(&self) -> &Basis {
        self.engine.basis()
    }

    pub fn info(&self) -> &Info {
        self.engine.info()
    }

    pub fn objective_value(&self) -> f64 {
        self.engine.objective_value()
    }

    pub fn run_time(&self) -> f64 {
        self.engine.run_time()
    }

    /// The current model.
    pub fn lp(&self) -> Cow<'_, Lp> {
        self.engine.lp()
    }

    pub fn num_col(&self) -> usize {
        self.engine.num_col()
    }

    pub fn num_row(&self) -> usize {
        self.engine.num_row()
    }

    pub fn num_nz(&self) -> usize {
        self.engine.num_nz()
    }

    /// Recompute primal infeasibilities of the current solution into [`Info`].
    pub fn check_solution_feasibility(&mut self) -> Result<CallStatus> {
        let status = self.engine.check_solution_feasibility();
        self.check(status, "checking solution feasibility")?;
        Ok(status)
    }

    // ---- options ----

    pub fn get_option_type(&self, name: &str) -> Result<OptionType> {
        self.engine
            .option_type(name)
            .ok_or_else(|| BridgeError::UnknownOption {
                name: name.to_string(),
            })
    }

    /// Read option `name` through the getter of its declared type.
    pub fn get_option_value(&self, name: &str) -> Result<OptionValue> {
        let value = match self.get_option_type(name)? {
            OptionType::Bool => self.engine.get_bool_option(name).map(OptionValue::Bool),
            OptionType::Int => self.engine.get_int_option(name).map(OptionValue::Int),
            OptionType::Double => self.engine.get_double_option(name).map(OptionValue::Double),
            OptionType::String => self.engine.get_string_option(name).map(OptionValue::String),
        };
        value.ok_or_else(|| BridgeError::EngineError {
            operation: format!("getting option {name}"),
            message: self.engine.last_message().map(str::to_string),
        })
    }

    /// Set option `name`. The value's variant must match the declared type;
    /// range and allowed-value checks are the engine's.
    pub fn set_option_value(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let value = value.into();
        let declared = self.get_option_type(name)?;
        let requested = value.option_type();
        if declared != requested {
            return Err(BridgeError::OptionTypeMismatch {
                name: name.to_string(),
                declared,
                requested,
            });
        }
        let status = self.write_option(name, &value);
        trace!(
            component = "bridge",
            operation = "set_option",
            name,
            value = %value,
            status = status.as_str(),
            "Setting option"
        );
        self.check(status, &format!("setting option {name}"))
    }

    fn write_option(&mut self, name: &str, value: &OptionValue) -> CallStatus {
        match value {
            OptionValue::Bool(v) => self.engine.set_bool_option(name, *v),
            OptionValue::Int(v) => self.engine.set_int_option(name, *v),
            OptionValue::Double(v) => self.engine.set_double_option(name, *v),
            OptionValue::String(v) => self.engine.set_string_option(name, v),
        }
    }

    pub fn reset_options(&mut self) -> Result<()> {
        let status = self.engine.reset_options();
        self.check(status, "resetting options")
    }

    /// Apply every field of `config` that is set.
    ///
    /// All or nothing: if any option is rejected, the options already
    /// written are restored and the error is returned.
    pub fn apply_config(&mut self, config: &SolverConfig) -> Result<()> {
        let values = config.option_values();
        let mut previous = Vec::with_capacity(values.len());
        for (name, _) in &values {
            previous.push((*name, self.get_option_value(name)?));
        }
        for (applied, (name, value)) in values.into_iter().enumerate() {
            if let Err(err) = self.set_option_value(name, value) {
                for (name, value) in previous.iter().take(applied).rev() {
                    self.write_option(name, value);
                }
                debug!(
                    component = "bridge",
                    operation = "apply_config",
                    status = "error",
                    rejected = name,
                    restored = applied,
                    "Rolled back solver configuration"
                );
                return Err(err);
            }
        }
        debug!(
            component = "bridge",
            operation = "apply_config",
            status = "success",
            "Applied solver configuration"
        );
        Ok(())
    }

    /// Current option values as a JSON object keyed by option name.
    pub fn options_json(&self) -> Result<serde_json::Value> {
        let mut map = serde_json::Map::new();
        for name in self.engine.option_names() {
            let value = self.get_option_value(&name)?;
            map.insert(
                name,
                serde_json::to_value(&value).unwrap_or(serde_json::Value::Null),
            );
        }
        Ok(serde_json::Value::Object(map))
    }

    // ---- log callback ----

    /// Install `handler` to receive every log event together with
    /// `context`. A previous handler and its context are dropped.
    pub fn set_log_callback<C, F>(&mut self, handler: F, context: C) -> Result<()>
    where
        C: 'static,
        F: FnMut(LogEvent<'_, C>) + 'static,
    {
        let sink = Box::new(Trampoline::new(handler, context));
        let status = self.engine.set_log_sink(Some(sink));
        self.check(status, "setting log callback")
    }

    pub fn clear_log_callback(&mut self) -> Result<()> {
        let status = self.engine.set_log_sink(None);
        self.check(status, "clearing log callback")
    }

    // ---- diagnostics ----

    /// Warnings recorded since the last [`Highs::take_warnings`], at most
    /// [`MAX_RETAINED_WARNINGS`](lpbridge_solver::MAX_RETAINED_WARNINGS) of them.
    pub fn warnings(&self) -> &[Diagnostic] {
        self.translator.warnings()
    }

    pub fn take_warnings(&mut self) -> Vec<Diagnostic> {
        self.translator.take_warnings()
    }

    /// Warnings recorded over the session, including dropped and taken ones.
    pub fn warning_count(&self) -> u64 {
        self.translator.warning_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lpbridge_core::{ElementKind, INFINITY};

    #[test]
    fn test_add_row_rejects_nz_mismatch_before_engine() {
        let mut highs = Highs::new();
        highs.add_vars(2, &[0.0f64, 0.0], &[1.0f64, 1.0]).unwrap();
        let err = highs
            .add_row(0.0, 1.0, 3, &[0i32, 1], &[1.0f64, 1.0])
            .unwrap_err();
        assert_eq!(err.code(), "BUFFER_LENGTH_MISMATCH");
        assert_eq!(highs.num_row(), 0);
    }

    #[test]
    fn test_wrong_element_type_is_rejected() {
        let mut highs = Highs::new();
        let err = highs.add_vars(1, &[0.0f32], &[1.0f64]).unwrap_err();
        assert_eq!(
            err,
            BridgeError::TypeMismatch {
                argument: "lower",
                expected: ElementKind::F64,
                found: ElementKind::F32,
            }
        );
        assert_eq!(highs.num_col(), 0);
    }

    #[test]
    fn test_plural_arity_mismatch_leaves_model() {
        let mut highs = Highs::new();
        let err = highs.add_vars(3, &[0.0f64, 0.0], &[1.0f64, 1.0]).unwrap_err();
        assert_eq!(err.code(), "ARGUMENT_ARITY_MISMATCH");
        assert_eq!(highs.num_col(), 0);
    }

    #[test]
    fn test_empty_triple_adds_columns_without_entries() {
        let mut highs = Highs::new();
        let none_i: &[i32] = &[];
        let none_f: &[f64] = &[];
        highs
            .add_cols(
                2,
                &[1.0f64, 2.0],
                &[0.0f64, 0.0],
                &[INFINITY, INFINITY],
                0,
                none_i,
                none_i,
                none_f,
            )
            .unwrap();
        assert_eq!(highs.num_col(), 2);
        assert_eq!(highs.num_nz(), 0);
    }

    #[test]
    fn test_integrality_tag_out_of_domain() {
        let mut highs = Highs::new();
        highs.add_var(0.0, 10.0).unwrap();
        let err = highs
            .change_cols_integrality(1, &[0i32], &[2u8])
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::InvalidEnumValue {
                enumeration: "VarType",
                value: 2,
            }
        );
        assert_eq!(highs.lp().integrality(), &[VarType::Continuous]);
    }

    #[test]
    fn test_negative_index_never_reaches_engine() {
        let mut highs = Highs::new();
        highs.add_var(0.0, 1.0).unwrap();
        let err = highs.delete_vars(1, &[-1i32]).unwrap_err();
        assert_eq!(err.code(), "INDEX_INVALID");
        assert_eq!(highs.num_col(), 1);
    }

    #[test]
    fn test_unknown_and_mismatched_options() {
        let mut highs = Highs::new();
        assert_eq!(
            highs.get_option_value("no_such_option").unwrap_err().code(),
            "OPTION_UNKNOWN"
        );
        let err = highs.set_option_value("presolve", true).unwrap_err();
        assert_eq!(err.code(), "OPTION_TYPE_MISMATCH");
        assert_eq!(
            highs.get_option_value("presolve").unwrap(),
            OptionValue::from("choose")
        );
    }

    #[test]
    fn test_options_json_lists_every_option() {
        let highs = Highs::new();
        let json = highs.options_json().unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), highs.engine().option_names().len());
        assert!(object.contains_key("mip_rel_gap"));
    }
}
