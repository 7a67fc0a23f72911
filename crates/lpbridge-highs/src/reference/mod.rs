//! Pure-Rust engine implementing the [`Engine`] contract.
//!
//! Models are held column-wise, options live in an [`OptionRegistry`] with
//! the HiGHS names, and `run` solves LPs with a dense simplex and MIPs by
//! branch-and-bound on top of it. Log lines go to the installed sink while
//! `output_flag` is set and are always mirrored to `tracing`.

mod branch;
mod simplex;

use std::borrow::Cow;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use lpbridge_core::{
    DEFAULT_INFINITE_BOUND, HighsInt, INFINITY, IndexSet, Lp, ObjSense, OptionType, OptionValue,
    SparseBatch, VarType, normalize_infinite,
};
use lpbridge_solver::{
    Basis, CallStatus, Engine, Info, LogSeverity, LogSink, ModelStatus,
    OptionRegistry, Solution, SolutionStatus,
};
use tracing::{debug, trace, warn};

use branch::{MipParams, MipStop};
use simplex::{LpOutcome, SimplexParams};

const ENGINE_NAME: &str = "reference";

/// In-process engine with HiGHS option names and status semantics.
pub struct ReferenceEngine {
    lp: Lp,
    options: OptionRegistry,
    solution: Solution,
    basis: Basis,
    info: Info,
    model_status: ModelStatus,
    run_time: f64,
    sink: Option<Box<dyn LogSink>>,
    console: Box<dyn Write>,
    last_message: Option<String>,
    solve_count: i64,
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceEngine")
            .field("num_col", &self.lp.num_col())
            .field("num_row", &self.lp.num_row())
            .field("model_status", &self.model_status)
            .field("has_log_sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

/// First entity whose lower bound exceeds its upper bound.
fn inconsistent(
    entity: &str,
    indices: impl IntoIterator<Item = usize>,
    lower: &[f64],
    upper: &[f64],
) -> Option<String> {
    indices
        .into_iter()
        .zip(lower.iter().zip(upper))
        .find(|(_, (l, u))| l > u)
        .map(|(index, (l, u))| format!("{entity} {index} has inconsistent bounds [{l}, {u}]"))
}

impl ReferenceEngine {
    pub fn new() -> Self {
        debug!(
            component = "engine",
            operation = "init",
            status = "success",
            engine = ENGINE_NAME,
            "Creating reference engine"
        );
        Self {
            lp: Lp::new(),
            options: OptionRegistry::with_defaults(),
            solution: Solution::new(),
            basis: Basis::new(),
            info: Info::default(),
            model_status: ModelStatus::NotSet,
            run_time: 0.0,
            sink: None,
            console: Box::new(io::stdout()),
            last_message: None,
            solve_count: 0,
        }
    }

    /// Send `log_to_console` output to `writer` instead of stdout.
    pub fn set_console(&mut self, writer: impl Write + 'static) {
        self.console = Box::new(writer);
    }

    fn double_option(&self, name: &str, fallback: f64) -> f64 {
        self.options.get_double(name).unwrap_or(fallback)
    }

    fn infinite_bound(&self) -> f64 {
        self.double_option("infinite_bound", DEFAULT_INFINITE_BOUND)
    }

    fn normalized(&self, values: &[f64]) -> Vec<f64> {
        let threshold = self.infinite_bound();
        values
            .iter()
            .map(|&value| normalize_infinite(value, threshold))
            .collect()
    }

    fn check_costs(&self, cost: &[f64]) -> Result<(), String> {
        let limit = self.double_option("infinite_cost", DEFAULT_INFINITE_BOUND);
        match cost
            .iter()
            .position(|value| value.is_nan() || value.abs() >= limit)
        {
            Some(index) => Err(format!(
                "Column {index} has |cost| of {} >= infinite_cost {limit}",
                cost[index].abs()
            )),
            None => Ok(()),
        }
    }

    /// Deliver one log line to tracing, the sink, the console and the log file.
    fn emit(&mut self, severity: LogSeverity, message: &str) {
        match severity {
            LogSeverity::Warning | LogSeverity::Error => {
                warn!(component = "engine", severity = severity.as_str(), "{message}");
            }
            _ => debug!(component = "engine", severity = severity.as_str(), "{message}"),
        }
        if !self.options.get_bool("output_flag").unwrap_or(true) {
            return;
        }
        let dev_level = self.options.get_int("log_dev_level").unwrap_or(0);
        let visible = match severity {
            LogSeverity::Detailed => dev_level >= 1,
            LogSeverity::Verbose => dev_level >= 2,
            _ => true,
        };
        if !visible {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.log(severity, message);
        }
        if self.options.get_bool("log_to_console").unwrap_or(true) {
            if let Err(err) = writeln!(self.console, "{message}") {
                trace!(
                    component = "engine",
                    operation = "log_to_console",
                    status = "warn",
                    %err,
                    "Failed to write to console"
                );
            }
        }
        let path = self.options.get_string("log_file").unwrap_or("");
        if !path.is_empty() {
            let written = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| writeln!(file, "{message}"));
            if let Err(err) = written {
                warn!(
                    component = "engine",
                    operation = "log_file",
                    status = "warn",
                    path,
                    %err,
                    "Failed to append to log file"
                );
            }
        }
    }

    fn fail(&mut self, message: String) -> CallStatus {
        self.emit(LogSeverity::Error, &message);
        self.last_message = Some(message);
        CallStatus::Error
    }

    fn warning(&mut self, message: String) -> CallStatus {
        self.emit(LogSeverity::Warning, &message);
        self.last_message = Some(message);
        CallStatus::Warning
    }

    fn ok(&mut self) -> CallStatus {
        self.last_message = None;
        CallStatus::Ok
    }

    fn finish(&mut self, warning: Option<String>) -> CallStatus {
        match warning {
            Some(message) => self.warning(message),
            None => self.ok(),
        }
    }

    /// Discard everything derived from the previous solve.
    fn invalidate(&mut self) {
        self.model_status = ModelStatus::NotSet;
        self.solution.invalidate();
        self.basis.invalidate();
        self.info = Info::default();
    }

    fn set_option(&mut self, name: &str, value: OptionValue) -> CallStatus {
        match self.options.set(name, value) {
            Ok(()) => {
                trace!(
                    component = "engine",
                    operation = "set_option",
                    status = "success",
                    name,
                    "Option set"
                );
                self.ok()
            }
            Err(err) => self.fail(err.to_string()),
        }
    }

    fn simplex_params(&self, started: Instant) -> SimplexParams {
        let time_limit = self.double_option("time_limit", INFINITY);
        let deadline = Duration::try_from_secs_f64(time_limit)
            .ok()
            .and_then(|limit| started.checked_add(limit));
        let iteration_limit = self
            .options
            .get_int("simplex_iteration_limit")
            .unwrap_or(HighsInt::MAX);
        SimplexParams {
            infinite_bound: self.infinite_bound(),
            primal_tolerance: self.double_option("primal_feasibility_tolerance", 1e-7),
            dual_tolerance: self.double_option("dual_feasibility_tolerance", 1e-7),
            iteration_budget: u64::try_from(iteration_limit).unwrap_or(0),
            deadline,
        }
    }

    /// Count, maximum, and sum of primal infeasibilities of `col_value`.
    fn primal_infeasibilities(&self, col_value: &[f64]) -> (i64, f64, f64) {
        let tolerance = self.double_option("primal_feasibility_tolerance", 1e-7);
        let integrality = self.double_option("mip_feasibility_tolerance", 1e-6);
        let threshold = self.infinite_bound();
        let violation = |value: f64, lower: f64, upper: f64| {
            let lower = normalize_infinite(lower, threshold);
            let upper = normalize_infinite(upper, threshold);
            (lower - value).max(value - upper).max(0.0)
        };

        let mut violations: Vec<f64> = Vec::new();
        for (col, &value) in col_value.iter().enumerate() {
            let mut amount = violation(value, self.lp.col_lower()[col], self.lp.col_upper()[col]);
            if self.lp.integrality()[col] == VarType::Integer {
                let fraction = (value - value.round()).abs();
                if fraction > integrality {
                    amount = amount.max(fraction);
                }
            }
            violations.push(amount);
        }
        for (row, value) in self.lp.row_activity(col_value).into_iter().enumerate() {
            violations.push(violation(
                value,
                self.lp.row_lower()[row],
                self.lp.row_upper()[row],
            ));
        }

        let infeasible: Vec<f64> = violations.into_iter().filter(|&v| v > tolerance).collect();
        let max = infeasible.iter().copied().fold(0.0, f64::max);
        let sum = infeasible.iter().sum();
        (infeasible.len() as i64, max, sum)
    }

    fn record_infeasibilities(&mut self) {
        let counts = self
            .solution
            .col_value()
            .map(|col_value| self.primal_infeasibilities(col_value));
        if let Some((count, max, sum)) = counts {
            self.info.num_primal_infeasibilities = count;
            self.info.max_primal_infeasibility = max;
            self.info.sum_primal_infeasibilities = sum;
        }
    }

    fn solve_empty(&mut self) -> ModelStatus {
        let tolerance = self.double_option("primal_feasibility_tolerance", 1e-7);
        let threshold = self.infinite_bound();
        let admits_zero = self
            .lp
            .row_lower()
            .iter()
            .zip(self.lp.row_upper())
            .all(|(&l, &u)| {
                normalize_infinite(l, threshold) <= tolerance
                    && normalize_infinite(u, threshold) >= -tolerance
            });
        if !admits_zero {
            return ModelStatus::Infeasible;
        }
        let num_row = self.lp.num_row();
        self.solution = Solution::primal(Vec::new(), vec![0.0; num_row])
            .with_duals(Vec::new(), vec![0.0; num_row]);
        self.info.objective_function_value = self.lp.offset();
        self.info.primal_solution_status = SolutionStatus::Feasible;
        self.info.dual_solution_status = SolutionStatus::Feasible;
        ModelStatus::ModelEmpty
    }

    fn solve_lp(&mut self, params: &SimplexParams) -> ModelStatus {
        let run = simplex::solve(&self.lp, self.lp.col_lower(), self.lp.col_upper(), params);
        self.info.simplex_iteration_count = run.iterations as i64;
        match run.outcome {
            LpOutcome::Optimal(point) => {
                self.solution = Solution::primal(point.col_value, point.row_value)
                    .with_duals(point.col_dual, point.row_dual);
                self.basis = Basis::from_statuses(
                    point.col_status,
                    point.row_status,
                    self.solve_count,
                    "reference simplex",
                );
                self.info.objective_function_value = point.objective;
                self.info.primal_solution_status = SolutionStatus::Feasible;
                self.info.dual_solution_status = SolutionStatus::Feasible;
                self.info.basis_validity = true;
                ModelStatus::Optimal
            }
            LpOutcome::Infeasible => {
                self.info.primal_solution_status = SolutionStatus::Infeasible;
                ModelStatus::Infeasible
            }
            LpOutcome::Unbounded => ModelStatus::Unbounded,
            LpOutcome::IterationLimit => ModelStatus::IterationLimit,
            LpOutcome::TimeLimit => ModelStatus::TimeLimit,
        }
    }

    fn solve_mip(&mut self, params: &SimplexParams) -> ModelStatus {
        let mip = MipParams {
            relaxation: *params,
            integrality_tolerance: self.double_option("mip_feasibility_tolerance", 1e-6),
            relative_gap: self.double_option("mip_rel_gap", 1e-4),
        };
        let run = branch::solve(&self.lp, &mip);
        self.info.simplex_iteration_count = run.iterations as i64;
        self.info.mip_node_count = run.nodes;
        self.info.mip_dual_bound = run.dual_bound;
        if let Some(incumbent) = run.incumbent {
            let row_value = self.lp.row_activity(&incumbent.col_value);
            self.solution = Solution::primal(incumbent.col_value, row_value);
            self.info.objective_function_value = incumbent.objective;
            self.info.mip_gap = branch::relative_gap(incumbent.objective, run.dual_bound);
            self.info.primal_solution_status = SolutionStatus::Feasible;
        }
        match run.stop {
            MipStop::Optimal => ModelStatus::Optimal,
            MipStop::Infeasible => ModelStatus::Infeasible,
            MipStop::UnboundedOrInfeasible => ModelStatus::UnboundedOrInfeasible,
            MipStop::IterationLimit => ModelStatus::IterationLimit,
            MipStop::TimeLimit => ModelStatus::TimeLimit,
        }
    }
}

impl Engine for ReferenceEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn pass_model(&mut self, lp: &Lp) -> CallStatus {
        if let Err(message) = self.check_costs(lp.col_cost()) {
            return self.fail(message);
        }
        let mut model = lp.clone();
        let cols: Vec<usize> = (0..model.num_col()).collect();
        let rows: Vec<usize> = (0..model.num_row()).collect();
        let col_lower = self.normalized(model.col_lower());
        let col_upper = self.normalized(model.col_upper());
        let row_lower = self.normalized(model.row_lower());
        let row_upper = self.normalized(model.row_upper());
        let applied = model
            .matrix()
            .validate()
            .and_then(|()| model.change_cols_bounds(&cols, &col_lower, &col_upper))
            .and_then(|()| model.change_rows_bounds(&rows, &row_lower, &row_upper));
        if let Err(err) = applied {
            return self.fail(err.to_string());
        }
        let warning = inconsistent("Column", cols, &col_lower, &col_upper)
            .or_else(|| inconsistent("Row", rows, &row_lower, &row_upper));
        debug!(
            component = "engine",
            operation = "pass_model",
            status = "success",
            num_col = model.num_col(),
            num_row = model.num_row(),
            nnz = model.num_nz(),
            "Model passed"
        );
        self.lp = model;
        self.invalidate();
        self.finish(warning)
    }

    fn lp(&self) -> Cow<'_, Lp> {
        Cow::Borrowed(&self.lp)
    }

    fn add_cols(
        &mut self,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        matrix: &SparseBatch<'_>,
    ) -> CallStatus {
        if let Err(message) = self.check_costs(cost) {
            return self.fail(message);
        }
        let first = self.lp.num_col();
        let lower = self.normalized(lower);
        let upper = self.normalized(upper);
        if let Err(err) = self.lp.add_cols(cost, &lower, &upper, matrix) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        let warning = inconsistent("Column", first.., &lower, &upper);
        self.finish(warning)
    }

    fn add_vars(&mut self, lower: &[f64], upper: &[f64]) -> CallStatus {
        let cost = vec![0.0; lower.len()];
        self.add_cols(&cost, lower, upper, &SparseBatch::empty())
    }

    fn add_rows(&mut self, lower: &[f64], upper: &[f64], matrix: &SparseBatch<'_>) -> CallStatus {
        let first = self.lp.num_row();
        let lower = self.normalized(lower);
        let upper = self.normalized(upper);
        if let Err(err) = self.lp.add_rows(&lower, &upper, matrix) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        let warning = inconsistent("Row", first.., &lower, &upper);
        self.finish(warning)
    }

    fn delete_cols(&mut self, set: &IndexSet) -> CallStatus {
        if let Err(err) = self.lp.delete_cols(set) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        self.ok()
    }

    fn delete_rows(&mut self, set: &IndexSet) -> CallStatus {
        if let Err(err) = self.lp.delete_rows(set) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        self.ok()
    }

    fn change_coeff(&mut self, row: usize, col: usize, value: f64) -> CallStatus {
        if let Err(err) = self.lp.change_coeff(row, col, value) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        self.ok()
    }

    fn change_cols_cost(&mut self, cols: &[usize], cost: &[f64]) -> CallStatus {
        if let Err(message) = self.check_costs(cost) {
            return self.fail(message);
        }
        if let Err(err) = self.lp.change_cols_cost(cols, cost) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        self.ok()
    }

    fn change_cols_bounds(&mut self, cols: &[usize], lower: &[f64], upper: &[f64]) -> CallStatus {
        let lower = self.normalized(lower);
        let upper = self.normalized(upper);
        if let Err(err) = self.lp.change_cols_bounds(cols, &lower, &upper) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        let warning = inconsistent("Column", cols.iter().copied(), &lower, &upper);
        self.finish(warning)
    }

    fn change_cols_integrality(&mut self, cols: &[usize], integrality: &[VarType]) -> CallStatus {
        if let Err(err) = self.lp.change_cols_integrality(cols, integrality) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        self.ok()
    }

    fn change_rows_bounds(&mut self, rows: &[usize], lower: &[f64], upper: &[f64]) -> CallStatus {
        let lower = self.normalized(lower);
        let upper = self.normalized(upper);
        if let Err(err) = self.lp.change_rows_bounds(rows, &lower, &upper) {
            return self.fail(err.to_string());
        }
        self.invalidate();
        let warning = inconsistent("Row", rows.iter().copied(), &lower, &upper);
        self.finish(warning)
    }

    fn change_objective_sense(&mut self, sense: ObjSense) -> CallStatus {
        if sense != self.lp.sense() {
            self.lp.set_sense(sense);
            self.invalidate();
        }
        self.ok()
    }

    fn change_objective_offset(&mut self, offset: f64) -> CallStatus {
        let previous = self.lp.offset();
        if let Err(err) = self.lp.set_offset(offset) {
            return self.fail(err.to_string());
        }
        // The solution is unaffected; only the reported objective moves.
        if self.info.valid {
            self.info.objective_function_value += offset - previous;
            self.info.mip_dual_bound += offset - previous;
        }
        self.ok()
    }

    fn objective_sense(&self) -> ObjSense {
        self.lp.sense()
    }

    fn objective_offset(&self) -> f64 {
        self.lp.offset()
    }

    fn num_col(&self) -> usize {
        self.lp.num_col()
    }

    fn num_row(&self) -> usize {
        self.lp.num_row()
    }

    fn num_nz(&self) -> usize {
        self.lp.num_nz()
    }

    fn clear(&mut self) -> CallStatus {
        self.lp = Lp::new();
        self.options.reset();
        self.invalidate();
        self.ok()
    }

    fn clear_model(&mut self) -> CallStatus {
        self.lp = Lp::new();
        self.invalidate();
        self.ok()
    }

    fn clear_solver(&mut self) -> CallStatus {
        self.invalidate();
        self.ok()
    }

    fn run(&mut self) -> CallStatus {
        let started = Instant::now();
        self.invalidate();
        self.solve_count += 1;
        debug!(
            component = "engine",
            operation = "run",
            status = "start",
            num_col = self.lp.num_col(),
            num_row = self.lp.num_row(),
            nnz = self.lp.num_nz(),
            options = %self.options.to_json(),
            "Running reference engine"
        );

        let banner = format!("Running lpbridge {ENGINE_NAME} engine {}", self.version());
        self.emit(LogSeverity::Info, &banner);
        let num_integer = self
            .lp
            .integrality()
            .iter()
            .filter(|kind| kind.is_integer())
            .count();
        let mut summary = format!(
            "{} has {} rows; {} cols; {} nonzeros",
            if num_integer > 0 { "MIP" } else { "LP" },
            self.lp.num_row(),
            self.lp.num_col(),
            self.lp.num_nz()
        );
        if num_integer > 0 {
            summary.push_str(&format!("; {num_integer} integer variables"));
        }
        self.emit(LogSeverity::Info, &summary);
        let solver = self.options.get_string("solver").unwrap_or("choose");
        if !matches!(solver, "choose" | "simplex") {
            let note = format!("Solver option \"{solver}\" is served by the simplex method");
            self.emit(LogSeverity::Detailed, &note);
        }

        let params = self.simplex_params(started);
        let status = if self.lp.num_col() == 0 {
            self.solve_empty()
        } else if num_integer > 0 {
            self.solve_mip(&params)
        } else {
            self.solve_lp(&params)
        };
        self.model_status = status;
        self.info.valid = true;
        self.record_infeasibilities();
        self.run_time = started.elapsed().as_secs_f64();

        let report = format!("Model status        : {status}");
        self.emit(LogSeverity::Info, &report);
        if self.solution.value_valid() {
            let objective = format!(
                "Objective value     : {:.10e}",
                self.info.objective_function_value
            );
            self.emit(LogSeverity::Info, &objective);
        }
        let iterations = format!(
            "Simplex   iterations: {}",
            self.info.simplex_iteration_count
        );
        self.emit(LogSeverity::Detailed, &iterations);
        let timing = format!("Run time            : {:.4}", self.run_time);
        self.emit(LogSeverity::Info, &timing);
        debug!(
            component = "engine",
            operation = "run",
            status = "success",
            model_status = status.as_str(),
            iterations = self.info.simplex_iteration_count,
            run_time = self.run_time,
            "Reference engine finished"
        );

        if status.is_error() {
            self.last_message = Some(format!("Model status: {status}"));
            CallStatus::Error
        } else if status.is_limit() {
            self.last_message = Some(format!("Model status: {status}"));
            CallStatus::Warning
        } else {
            self.ok()
        }
    }

    fn model_status(&self) -> ModelStatus {
        self.model_status
    }

    fn solution(&self) -> &Solution {
        &self.solution
    }

    fn basis(&self) -> &Basis {
        &self.basis
    }

    fn info(&self) -> &Info {
        &self.info
    }

    fn objective_value(&self) -> f64 {
        self.info.objective_function_value
    }

    fn run_time(&self) -> f64 {
        self.run_time
    }

    fn check_solution_feasibility(&mut self) -> CallStatus {
        let Some(col_value) = self.solution.col_value() else {
            return self.warning("No primal solution to check".to_string());
        };
        let (count, max, sum) = self.primal_infeasibilities(col_value);
        self.info.num_primal_infeasibilities = count;
        self.info.max_primal_infeasibility = max;
        self.info.sum_primal_infeasibilities = sum;
        if count > 0 {
            self.warning(format!(
                "Solution has {count} primal infeasibilities (max {max:e}, sum {sum:e})"
            ))
        } else {
            self.ok()
        }
    }

    fn option_type(&self, name: &str) -> Option<OptionType> {
        self.options.option_type(name)
    }

    fn option_names(&self) -> Vec<String> {
        self.options
            .iter()
            .map(|record| record.name().to_string())
            .collect()
    }

    fn get_bool_option(&self, name: &str) -> Option<bool> {
        self.options.get_bool(name).ok()
    }

    fn get_int_option(&self, name: &str) -> Option<HighsInt> {
        self.options.get_int(name).ok()
    }

    fn get_double_option(&self, name: &str) -> Option<f64> {
        self.options.get_double(name).ok()
    }

    fn get_string_option(&self, name: &str) -> Option<String> {
        self.options.get_string(name).ok().map(str::to_string)
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> CallStatus {
        self.set_option(name, OptionValue::Bool(value))
    }

    fn set_int_option(&mut self, name: &str, value: HighsInt) -> CallStatus {
        self.set_option(name, OptionValue::Int(value))
    }

    fn set_double_option(&mut self, name: &str, value: f64) -> CallStatus {
        self.set_option(name, OptionValue::Double(value))
    }

    fn set_string_option(&mut self, name: &str, value: &str) -> CallStatus {
        self.set_option(name, OptionValue::from(value))
    }

    fn reset_options(&mut self) -> CallStatus {
        self.options.reset();
        self.ok()
    }

    fn set_log_sink(&mut self, sink: Option<Box<dyn LogSink>>) -> CallStatus {
        self.sink = sink;
        self.ok()
    }

    fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}
