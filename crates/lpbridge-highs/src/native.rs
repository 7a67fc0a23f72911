//! Engine backed by the HiGHS C library through `highs-sys`.
//!
//! This module contains the crate's only unsafe code. The HiGHS instance is
//! owned by [`NativeEngine`] and destroyed on drop; log lines reach Rust
//! through a C callback whose user data is a heap slot owned by the engine.
#![allow(unsafe_code)]

use std::borrow::Cow;
use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr::NonNull;

use lpbridge_core::{
    BridgeError, CscInput, HighsInt, IndexSet, Lp, MatrixFormat, ObjSense, OptionType,
    SparseBatch, VarType,
};
use lpbridge_solver::{
    Basis, BasisStatus, CallStatus, Engine, Info, LogSeverity, LogSink, ModelStatus, Solution,
    SolutionStatus,
};
use tracing::{debug, warn};

const ENGINE_NAME: &str = "highs";
/// `kHighsCallbackLogging`.
const LOGGING_CALLBACK: c_int = 0;
/// `kHighsMatrixFormatColwise`.
const MATRIX_COLWISE: HighsInt = 1;
/// `kHighsMaximumStringLength`.
const STRING_LENGTH: usize = 512;

/// Options exposed through [`Engine::option_names`].
const OPTION_NAMES: [&str; 17] = [
    "presolve",
    "solver",
    "parallel",
    "time_limit",
    "output_flag",
    "log_to_console",
    "log_dev_level",
    "simplex_iteration_limit",
    "primal_feasibility_tolerance",
    "dual_feasibility_tolerance",
    "mip_feasibility_tolerance",
    "mip_rel_gap",
    "infinite_cost",
    "infinite_bound",
    "random_seed",
    "threads",
    "log_file",
];

/// Receives HiGHS log lines; lives at a fixed heap address for the
/// lifetime of the engine.
struct LogSlot {
    sink: Option<Box<dyn LogSink>>,
    last_problem: Option<String>,
    panics: usize,
}

impl LogSlot {
    fn deliver(&mut self, severity: LogSeverity, message: &str) {
        match severity {
            LogSeverity::Warning | LogSeverity::Error => {
                warn!(component = "engine", severity = severity.as_str(), "{message}");
                self.last_problem = Some(message.to_string());
            }
            _ => debug!(component = "engine", severity = severity.as_str(), "{message}"),
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if catch_unwind(AssertUnwindSafe(|| sink.log(severity, message))).is_err() {
            self.panics += 1;
            warn!(
                component = "engine",
                operation = "log_callback",
                status = "error",
                panics = self.panics,
                "Log handler panicked; event dropped"
            );
        }
    }
}

unsafe extern "C" fn forward_log(
    callback_type: c_int,
    message: *const c_char,
    data_out: *const highs_sys::HighsCallbackDataOut,
    _data_in: *mut highs_sys::HighsCallbackDataIn,
    user_data: *mut c_void,
) {
    if callback_type != LOGGING_CALLBACK || message.is_null() || user_data.is_null() {
        return;
    }
    // SAFETY: user_data is the LogSlot registered in NativeEngine::new; it is
    // freed only after the HiGHS instance is destroyed.
    let slot = unsafe { &mut *user_data.cast::<LogSlot>() };
    let code = if data_out.is_null() {
        LogSeverity::Info.code()
    } else {
        // SAFETY: HiGHS passes a valid data_out for the duration of the call.
        unsafe { (*data_out).log_type }
    };
    let severity = LogSeverity::try_from(code).unwrap_or(LogSeverity::Info);
    // SAFETY: HiGHS passes a NUL-terminated message buffer.
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy();
    slot.deliver(severity, text.trim_end());
}

fn to_highs(values: &[usize]) -> Option<Vec<HighsInt>> {
    values.iter().map(|&v| HighsInt::try_from(v).ok()).collect()
}

fn count(value: usize) -> Option<HighsInt> {
    HighsInt::try_from(value).ok()
}

/// HiGHS instance implementing the [`Engine`] contract.
pub struct NativeEngine {
    highs: NonNull<c_void>,
    slot: NonNull<LogSlot>,
    solution: Solution,
    basis: Basis,
    info: Info,
    last_message: Option<String>,
    solve_count: i64,
}

impl std::fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEngine")
            .field("num_col", &self.num_col())
            .field("num_row", &self.num_row())
            .field("model_status", &self.model_status())
            .finish_non_exhaustive()
    }
}

impl Drop for NativeEngine {
    fn drop(&mut self) {
        // SAFETY: both pointers were created in `new` and are released once.
        unsafe {
            highs_sys::Highs_destroy(self.highs.as_ptr());
            drop(Box::from_raw(self.slot.as_ptr()));
        }
    }
}

impl NativeEngine {
    pub fn new() -> Result<Self, BridgeError> {
        // SAFETY: Highs_create has no preconditions.
        let raw = unsafe { highs_sys::Highs_create() };
        let highs = NonNull::new(raw).ok_or_else(|| BridgeError::EngineError {
            operation: "creating engine".to_string(),
            message: Some("Highs_create returned null".to_string()),
        })?;
        let slot = Box::new(LogSlot {
            sink: None,
            last_problem: None,
            panics: 0,
        });
        let slot = NonNull::from(Box::leak(slot));
        // SAFETY: the slot outlives the HiGHS instance (see Drop).
        let status = unsafe {
            let registered = highs_sys::Highs_setCallback(
                highs.as_ptr(),
                Some(forward_log),
                slot.as_ptr().cast::<c_void>(),
            );
            if registered == highs_sys::STATUS_OK {
                highs_sys::Highs_startCallback(highs.as_ptr(), LOGGING_CALLBACK)
            } else {
                registered
            }
        };
        let engine = Self {
            highs,
            slot,
            solution: Solution::new(),
            basis: Basis::new(),
            info: Info::default(),
            last_message: None,
            solve_count: 0,
        };
        if status != highs_sys::STATUS_OK {
            warn!(
                component = "engine",
                operation = "init",
                status = "warn",
                "Log callback could not be registered"
            );
        }
        debug!(
            component = "engine",
            operation = "init",
            status = "success",
            engine = ENGINE_NAME,
            version = %engine.version(),
            "Created HiGHS instance"
        );
        Ok(engine)
    }

    fn ptr(&self) -> *mut c_void {
        self.highs.as_ptr()
    }

    fn slot(&mut self) -> &mut LogSlot {
        // SAFETY: the slot is only touched from &mut self or from the
        // callback during a call made through &mut self.
        unsafe { self.slot.as_mut() }
    }

    /// Run one HiGHS call and record its status and message.
    fn invoke(
        &mut self,
        operation: &str,
        call: impl FnOnce(*mut c_void) -> HighsInt,
    ) -> CallStatus {
        self.slot().last_problem = None;
        let code = call(self.ptr());
        let status = CallStatus::try_from(code).unwrap_or(CallStatus::Error);
        let logged = self.slot().last_problem.take();
        self.last_message = match status {
            CallStatus::Ok => None,
            _ => Some(logged.unwrap_or_else(|| {
                format!("HiGHS returned {} from {operation}", status.as_str())
            })),
        };
        status
    }

    /// Invoke a call that changes the model; cached results are discarded
    /// unless the call failed.
    fn mutate(
        &mut self,
        operation: &str,
        call: impl FnOnce(*mut c_void) -> HighsInt,
    ) -> CallStatus {
        let status = self.invoke(operation, call);
        if !status.is_error() {
            self.invalidate();
        }
        status
    }

    fn fail(&mut self, message: String) -> CallStatus {
        warn!(component = "engine", status = "error", "{message}");
        self.last_message = Some(message);
        CallStatus::Error
    }

    fn invalidate(&mut self) {
        self.solution.invalidate();
        self.basis.invalidate();
        self.info = Info::default();
    }

    fn int_info(&self, name: &str) -> Option<HighsInt> {
        let c_name = CString::new(name).ok()?;
        let mut value: HighsInt = 0;
        // SAFETY: valid instance, NUL-terminated name, writable out pointer.
        let status =
            unsafe { highs_sys::Highs_getIntInfoValue(self.ptr(), c_name.as_ptr(), &raw mut value) };
        (status == highs_sys::STATUS_OK).then_some(value)
    }

    fn int64_info(&self, name: &str) -> Option<i64> {
        let c_name = CString::new(name).ok()?;
        let mut value: i64 = 0;
        // SAFETY: as in `int_info`.
        let status = unsafe {
            highs_sys::Highs_getInt64InfoValue(self.ptr(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value)
    }

    fn double_info(&self, name: &str) -> Option<f64> {
        let c_name = CString::new(name).ok()?;
        let mut value = 0.0;
        // SAFETY: as in `int_info`.
        let status = unsafe {
            highs_sys::Highs_getDoubleInfoValue(self.ptr(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value)
    }

    fn solution_status(&self, name: &str) -> SolutionStatus {
        self.int_info(name)
            .and_then(|code| SolutionStatus::try_from(code).ok())
            .unwrap_or(SolutionStatus::None)
    }

    /// Pull solution, basis, and info out of HiGHS after a solve.
    fn refresh_results(&mut self) {
        let num_col = self.num_col();
        let num_row = self.num_row();
        let primal = self.solution_status("primal_solution_status");
        let dual = self.solution_status("dual_solution_status");

        self.solution = if primal == SolutionStatus::None {
            Solution::new()
        } else {
            let mut col_value = vec![0.0; num_col];
            let mut col_dual = vec![0.0; num_col];
            let mut row_value = vec![0.0; num_row];
            let mut row_dual = vec![0.0; num_row];
            // SAFETY: every buffer holds num_col or num_row elements.
            unsafe {
                highs_sys::Highs_getSolution(
                    self.ptr(),
                    col_value.as_mut_ptr(),
                    col_dual.as_mut_ptr(),
                    row_value.as_mut_ptr(),
                    row_dual.as_mut_ptr(),
                );
            }
            let solution = Solution::primal(col_value, row_value);
            if dual == SolutionStatus::None {
                solution
            } else {
                solution.with_duals(col_dual, row_dual)
            }
        };

        let basis_valid = self.int_info("basis_validity").unwrap_or(0) == 1;
        self.basis = if basis_valid {
            let mut col_status: Vec<HighsInt> = vec![0; num_col];
            let mut row_status: Vec<HighsInt> = vec![0; num_row];
            // SAFETY: buffers sized to the model dimensions.
            unsafe {
                highs_sys::Highs_getBasis(
                    self.ptr(),
                    col_status.as_mut_ptr(),
                    row_status.as_mut_ptr(),
                );
            }
            let decode = |codes: Vec<HighsInt>| -> Vec<BasisStatus> {
                codes
                    .into_iter()
                    .map(|code| BasisStatus::try_from(code).unwrap_or(BasisStatus::Nonbasic))
                    .collect()
            };
            Basis::from_statuses(
                decode(col_status),
                decode(row_status),
                self.solve_count,
                "HiGHS",
            )
        } else {
            Basis::new()
        };

        self.info = Info {
            valid: true,
            // SAFETY: valid instance.
            objective_function_value: unsafe { highs_sys::Highs_getObjectiveValue(self.ptr()) },
            simplex_iteration_count: self
                .int_info("simplex_iteration_count")
                .map_or(0, i64::from),
            mip_node_count: self.int64_info("mip_node_count").unwrap_or(0),
            mip_gap: self.double_info("mip_gap").unwrap_or(f64::INFINITY),
            mip_dual_bound: self.double_info("mip_dual_bound").unwrap_or(f64::NAN),
            primal_solution_status: primal,
            dual_solution_status: dual,
            basis_validity: basis_valid,
            num_primal_infeasibilities: self
                .int_info("num_primal_infeasibilities")
                .map_or(-1, i64::from),
            max_primal_infeasibility: self
                .double_info("max_primal_infeasibility")
                .unwrap_or(0.0),
            sum_primal_infeasibilities: self
                .double_info("sum_primal_infeasibilities")
                .unwrap_or(0.0),
        };
    }

    fn option_name(name: &str) -> Option<CString> {
        CString::new(name).ok()
    }

    fn read_lp(&self) -> Option<Lp> {
        let num_col = self.num_col();
        let num_row = self.num_row();
        let num_nz = self.num_nz();
        let mut out_col = count(num_col)?;
        let mut out_row = count(num_row)?;
        let mut out_nz = count(num_nz)?;
        let mut sense: HighsInt = 1;
        let mut offset = 0.0;
        let mut col_cost = vec![0.0; num_col];
        let mut col_lower = vec![0.0; num_col];
        let mut col_upper = vec![0.0; num_col];
        let mut row_lower = vec![0.0; num_row];
        let mut row_upper = vec![0.0; num_row];
        let mut a_start: Vec<HighsInt> = vec![0; num_col + 1];
        let mut a_index: Vec<HighsInt> = vec![0; num_nz];
        let mut a_value = vec![0.0; num_nz];
        let mut integrality: Vec<HighsInt> = vec![0; num_col];
        // SAFETY: every buffer is sized from the dimensions HiGHS reports.
        let status = unsafe {
            highs_sys::Highs_getLp(
                self.ptr(),
                MATRIX_COLWISE,
                &raw mut out_col,
                &raw mut out_row,
                &raw mut out_nz,
                &raw mut sense,
                &raw mut offset,
                col_cost.as_mut_ptr(),
                col_lower.as_mut_ptr(),
                col_upper.as_mut_ptr(),
                row_lower.as_mut_ptr(),
                row_upper.as_mut_ptr(),
                a_start.as_mut_ptr(),
                a_index.as_mut_ptr(),
                a_value.as_mut_ptr(),
                integrality.as_mut_ptr(),
            )
        };
        if status == highs_sys::STATUS_ERROR {
            return None;
        }
        let integrality: Vec<VarType> = integrality
            .into_iter()
            .map(|code| VarType::try_from(code).unwrap_or(VarType::Continuous))
            .collect();
        Lp::from_csc(CscInput {
            num_col,
            num_row,
            sense: ObjSense::try_from(sense).unwrap_or(ObjSense::Minimize),
            offset,
            col_cost: &col_cost,
            col_lower: &col_lower,
            col_upper: &col_upper,
            row_lower: &row_lower,
            row_upper: &row_upper,
            a_start: &a_start[..num_col],
            a_index: &a_index,
            a_value: &a_value,
            integrality: &integrality,
        })
        .ok()
    }
}

impl Engine for NativeEngine {
    fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    fn version(&self) -> String {
        // SAFETY: the version getters have no preconditions.
        unsafe {
            format!(
                "{}.{}.{}",
                highs_sys::Highs_versionMajor(),
                highs_sys::Highs_versionMinor(),
                highs_sys::Highs_versionPatch()
            )
        }
    }

    fn pass_model(&mut self, lp: &Lp) -> CallStatus {
        let matrix = lp.matrix().to_format(MatrixFormat::ColWise);
        let (Some(num_col), Some(num_row), Some(num_nz), Some(start), Some(index)) = (
            count(lp.num_col()),
            count(lp.num_row()),
            count(lp.num_nz()),
            to_highs(matrix.start()),
            to_highs(matrix.index()),
        ) else {
            return self.fail("Model dimensions exceed the HighsInt range".to_string());
        };
        let integrality: Vec<HighsInt> = lp.integrality().iter().map(|v| v.code()).collect();
        self.mutate("passing model", |highs| {
            // SAFETY: all arrays match the declared dimensions.
            unsafe {
                highs_sys::Highs_passMip(
                    highs,
                    num_col,
                    num_row,
                    num_nz,
                    MATRIX_COLWISE,
                    lp.sense().code(),
                    lp.offset(),
                    lp.col_cost().as_ptr(),
                    lp.col_lower().as_ptr(),
                    lp.col_upper().as_ptr(),
                    lp.row_lower().as_ptr(),
                    lp.row_upper().as_ptr(),
                    start.as_ptr(),
                    index.as_ptr(),
                    matrix.value().as_ptr(),
                    integrality.as_ptr(),
                )
            }
        })
    }

    fn lp(&self) -> Cow<'_, Lp> {
        Cow::Owned(self.read_lp().unwrap_or_default())
    }

    fn add_cols(
        &mut self,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        matrix: &SparseBatch<'_>,
    ) -> CallStatus {
        let (Some(num_new), Some(num_nz)) = (count(cost.len()), count(matrix.num_nz())) else {
            return self.fail("Column count exceeds the HighsInt range".to_string());
        };
        self.mutate("adding cols", |highs| {
            // SAFETY: slices are validated by the boundary layer.
            unsafe {
                highs_sys::Highs_addCols(
                    highs,
                    num_new,
                    cost.as_ptr(),
                    lower.as_ptr(),
                    upper.as_ptr(),
                    num_nz,
                    matrix.starts().as_ptr(),
                    matrix.indices().as_ptr(),
                    matrix.values().as_ptr(),
                )
            }
        })
    }

    fn add_vars(&mut self, lower: &[f64], upper: &[f64]) -> CallStatus {
        let Some(num_new) = count(lower.len()) else {
            return self.fail("Column count exceeds the HighsInt range".to_string());
        };
        self.mutate("adding vars", |highs| {
            // SAFETY: lower and upper hold num_new values.
            unsafe { highs_sys::Highs_addVars(highs, num_new, lower.as_ptr(), upper.as_ptr()) }
        })
    }

    fn add_rows(&mut self, lower: &[f64], upper: &[f64], matrix: &SparseBatch<'_>) -> CallStatus {
        let (Some(num_new), Some(num_nz)) = (count(lower.len()), count(matrix.num_nz())) else {
            return self.fail("Row count exceeds the HighsInt range".to_string());
        };
        self.mutate("adding rows", |highs| {
            // SAFETY: slices are validated by the boundary layer.
            unsafe {
                highs_sys::Highs_addRows(
                    highs,
                    num_new,
                    lower.as_ptr(),
                    upper.as_ptr(),
                    num_nz,
                    matrix.starts().as_ptr(),
                    matrix.indices().as_ptr(),
                    matrix.values().as_ptr(),
                )
            }
        })
    }

    fn delete_cols(&mut self, set: &IndexSet) -> CallStatus {
        let (Some(entries), Some(num)) = (to_highs(set.as_slice()), count(set.len())) else {
            return self.fail("Column index exceeds the HighsInt range".to_string());
        };
        self.mutate("deleting columns", |highs| {
            // SAFETY: entries holds num indices.
            unsafe { highs_sys::Highs_deleteColsBySet(highs, num, entries.as_ptr()) }
        })
    }

    fn delete_rows(&mut self, set: &IndexSet) -> CallStatus {
        let (Some(entries), Some(num)) = (to_highs(set.as_slice()), count(set.len())) else {
            return self.fail("Row index exceeds the HighsInt range".to_string());
        };
        self.mutate("deleting rows", |highs| {
            // SAFETY: entries holds num indices.
            unsafe { highs_sys::Highs_deleteRowsBySet(highs, num, entries.as_ptr()) }
        })
    }

    fn change_coeff(&mut self, row: usize, col: usize, value: f64) -> CallStatus {
        let (Some(row), Some(col)) = (count(row), count(col)) else {
            return self.fail("Index exceeds the HighsInt range".to_string());
        };
        self.mutate("changing coefficient", |highs| {
            // SAFETY: scalar arguments only.
            unsafe { highs_sys::Highs_changeCoeff(highs, row, col, value) }
        })
    }

    fn change_cols_cost(&mut self, cols: &[usize], cost: &[f64]) -> CallStatus {
        let (Some(set), Some(num)) = (to_highs(cols), count(cols.len())) else {
            return self.fail("Column index exceeds the HighsInt range".to_string());
        };
        self.mutate("changing objective coefficients", |highs| {
            // SAFETY: set and cost hold num entries.
            unsafe { highs_sys::Highs_changeColsCostBySet(highs, num, set.as_ptr(), cost.as_ptr()) }
        })
    }

    fn change_cols_bounds(&mut self, cols: &[usize], lower: &[f64], upper: &[f64]) -> CallStatus {
        let (Some(set), Some(num)) = (to_highs(cols), count(cols.len())) else {
            return self.fail("Column index exceeds the HighsInt range".to_string());
        };
        self.mutate("changing variable bounds", |highs| {
            // SAFETY: set, lower, and upper hold num entries.
            unsafe {
                highs_sys::Highs_changeColsBoundsBySet(
                    highs,
                    num,
                    set.as_ptr(),
                    lower.as_ptr(),
                    upper.as_ptr(),
                )
            }
        })
    }

    fn change_cols_integrality(&mut self, cols: &[usize], integrality: &[VarType]) -> CallStatus {
        let (Some(set), Some(num)) = (to_highs(cols), count(cols.len())) else {
            return self.fail("Column index exceeds the HighsInt range".to_string());
        };
        let codes: Vec<HighsInt> = integrality.iter().map(|v| v.code()).collect();
        self.mutate("changing variable integrality", |highs| {
            // SAFETY: set and codes hold num entries.
            unsafe {
                highs_sys::Highs_changeColsIntegralityBySet(highs, num, set.as_ptr(), codes.as_ptr())
            }
        })
    }

    fn change_rows_bounds(&mut self, rows: &[usize], lower: &[f64], upper: &[f64]) -> CallStatus {
        let (Some(set), Some(num)) = (to_highs(rows), count(rows.len())) else {
            return self.fail("Row index exceeds the HighsInt range".to_string());
        };
        self.mutate("changing row bounds", |highs| {
            // SAFETY: set, lower, and upper hold num entries.
            unsafe {
                highs_sys::Highs_changeRowsBoundsBySet(
                    highs,
                    num,
                    set.as_ptr(),
                    lower.as_ptr(),
                    upper.as_ptr(),
                )
            }
        })
    }

    fn change_objective_sense(&mut self, sense: ObjSense) -> CallStatus {
        self.mutate("changing objective sense", |highs| {
            // SAFETY: scalar argument only.
            unsafe { highs_sys::Highs_changeObjectiveSense(highs, sense.code()) }
        })
    }

    fn change_objective_offset(&mut self, offset: f64) -> CallStatus {
        self.invoke("changing objective offset", |highs| {
            // SAFETY: scalar argument only.
            unsafe { highs_sys::Highs_changeObjectiveOffset(highs, offset) }
        })
    }

    fn objective_sense(&self) -> ObjSense {
        let mut sense: HighsInt = 1;
        // SAFETY: writable out pointer.
        unsafe { highs_sys::Highs_getObjectiveSense(self.ptr(), &raw mut sense) };
        ObjSense::try_from(sense).unwrap_or(ObjSense::Minimize)
    }

    fn objective_offset(&self) -> f64 {
        let mut offset = 0.0;
        // SAFETY: writable out pointer.
        unsafe { highs_sys::Highs_getObjectiveOffset(self.ptr(), &raw mut offset) };
        offset
    }

    fn num_col(&self) -> usize {
        // SAFETY: valid instance.
        usize::try_from(unsafe { highs_sys::Highs_getNumCol(self.ptr()) }).unwrap_or(0)
    }

    fn num_row(&self) -> usize {
        // SAFETY: valid instance.
        usize::try_from(unsafe { highs_sys::Highs_getNumRow(self.ptr()) }).unwrap_or(0)
    }

    fn num_nz(&self) -> usize {
        // SAFETY: valid instance.
        usize::try_from(unsafe { highs_sys::Highs_getNumNz(self.ptr()) }).unwrap_or(0)
    }

    fn clear(&mut self) -> CallStatus {
        // SAFETY: valid instance.
        self.mutate("clearing", |highs| unsafe { highs_sys::Highs_clear(highs) })
    }

    fn clear_model(&mut self) -> CallStatus {
        // SAFETY: valid instance.
        self.mutate("clearing model", |highs| unsafe {
            highs_sys::Highs_clearModel(highs)
        })
    }

    fn clear_solver(&mut self) -> CallStatus {
        // SAFETY: valid instance.
        self.mutate("clearing solver", |highs| unsafe {
            highs_sys::Highs_clearSolver(highs)
        })
    }

    fn run(&mut self) -> CallStatus {
        self.solve_count += 1;
        // SAFETY: valid instance; log callbacks re-enter through the slot.
        let status = self.invoke("running model", |highs| unsafe { highs_sys::Highs_run(highs) });
        if status.is_error() {
            self.invalidate();
        } else {
            self.refresh_results();
        }
        debug!(
            component = "engine",
            operation = "run",
            status = status.as_str(),
            model_status = self.model_status().as_str(),
            "HiGHS run finished"
        );
        status
    }

    fn model_status(&self) -> ModelStatus {
        // SAFETY: valid instance.
        let code = unsafe { highs_sys::Highs_getModelStatus(self.ptr()) };
        ModelStatus::try_from(code).unwrap_or(ModelStatus::Unknown)
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
        // SAFETY: valid instance.
        unsafe { highs_sys::Highs_getObjectiveValue(self.ptr()) }
    }

    fn run_time(&self) -> f64 {
        // SAFETY: valid instance.
        unsafe { highs_sys::Highs_getRunTime(self.ptr()) }
    }

    fn check_solution_feasibility(&mut self) -> CallStatus {
        if !self.solution.value_valid() {
            self.last_message = Some("No primal solution to check".to_string());
            return CallStatus::Warning;
        }
        let count = self
            .int_info("num_primal_infeasibilities")
            .map_or(0, i64::from);
        self.info.num_primal_infeasibilities = count;
        self.info.max_primal_infeasibility =
            self.double_info("max_primal_infeasibility").unwrap_or(0.0);
        self.info.sum_primal_infeasibilities =
            self.double_info("sum_primal_infeasibilities").unwrap_or(0.0);
        if count > 0 {
            self.last_message = Some(format!("Solution has {count} primal infeasibilities"));
            CallStatus::Warning
        } else {
            self.last_message = None;
            CallStatus::Ok
        }
    }

    fn option_type(&self, name: &str) -> Option<OptionType> {
        let c_name = Self::option_name(name)?;
        let mut code: HighsInt = -1;
        // SAFETY: NUL-terminated name, writable out pointer.
        let status =
            unsafe { highs_sys::Highs_getOptionType(self.ptr(), c_name.as_ptr(), &raw mut code) };
        if status != highs_sys::STATUS_OK {
            return None;
        }
        OptionType::try_from(code).ok()
    }

    fn option_names(&self) -> Vec<String> {
        OPTION_NAMES
            .iter()
            .filter(|name| self.option_type(name).is_some())
            .map(|name| name.to_string())
            .collect()
    }

    fn get_bool_option(&self, name: &str) -> Option<bool> {
        let c_name = Self::option_name(name)?;
        let mut value: HighsInt = 0;
        // SAFETY: as in `option_type`.
        let status = unsafe {
            highs_sys::Highs_getBoolOptionValue(self.ptr(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value != 0)
    }

    fn get_int_option(&self, name: &str) -> Option<HighsInt> {
        let c_name = Self::option_name(name)?;
        let mut value: HighsInt = 0;
        // SAFETY: as in `option_type`.
        let status = unsafe {
            highs_sys::Highs_getIntOptionValue(self.ptr(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value)
    }

    fn get_double_option(&self, name: &str) -> Option<f64> {
        let c_name = Self::option_name(name)?;
        let mut value = 0.0;
        // SAFETY: as in `option_type`.
        let status = unsafe {
            highs_sys::Highs_getDoubleOptionValue(self.ptr(), c_name.as_ptr(), &raw mut value)
        };
        (status == highs_sys::STATUS_OK).then_some(value)
    }

    fn get_string_option(&self, name: &str) -> Option<String> {
        let c_name = Self::option_name(name)?;
        let mut buffer = vec![0 as c_char; STRING_LENGTH];
        // SAFETY: HiGHS writes at most kHighsMaximumStringLength bytes.
        let status = unsafe {
            highs_sys::Highs_getStringOptionValue(self.ptr(), c_name.as_ptr(), buffer.as_mut_ptr())
        };
        if status != highs_sys::STATUS_OK {
            return None;
        }
        // SAFETY: the buffer is NUL-terminated by HiGHS and was zeroed.
        let value = unsafe { CStr::from_ptr(buffer.as_ptr()) };
        Some(value.to_string_lossy().into_owned())
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> CallStatus {
        let Some(c_name) = Self::option_name(name) else {
            return self.fail(format!("Option name {name:?} contains a NUL byte"));
        };
        self.invoke("setting option", |highs| {
            // SAFETY: NUL-terminated name.
            unsafe {
                highs_sys::Highs_setBoolOptionValue(highs, c_name.as_ptr(), HighsInt::from(value))
            }
        })
    }

    fn set_int_option(&mut self, name: &str, value: HighsInt) -> CallStatus {
        let Some(c_name) = Self::option_name(name) else {
            return self.fail(format!("Option name {name:?} contains a NUL byte"));
        };
        self.invoke("setting option", |highs| {
            // SAFETY: NUL-terminated name.
            unsafe { highs_sys::Highs_setIntOptionValue(highs, c_name.as_ptr(), value) }
        })
    }

    fn set_double_option(&mut self, name: &str, value: f64) -> CallStatus {
        let Some(c_name) = Self::option_name(name) else {
            return self.fail(format!("Option name {name:?} contains a NUL byte"));
        };
        self.invoke("setting option", |highs| {
            // SAFETY: NUL-terminated name.
            unsafe { highs_sys::Highs_setDoubleOptionValue(highs, c_name.as_ptr(), value) }
        })
    }

    fn set_string_option(&mut self, name: &str, value: &str) -> CallStatus {
        let (Some(c_name), Some(c_value)) = (Self::option_name(name), CString::new(value).ok())
        else {
            return self.fail(format!("Option {name:?} or its value contains a NUL byte"));
        };
        self.invoke("setting option", |highs| {
            // SAFETY: NUL-terminated name and value.
            unsafe { highs_sys::Highs_setStringOptionValue(highs, c_name.as_ptr(), c_value.as_ptr()) }
        })
    }

    fn reset_options(&mut self) -> CallStatus {
        // SAFETY: valid instance.
        self.invoke("resetting options", |highs| unsafe {
            highs_sys::Highs_resetOptions(highs)
        })
    }

    fn set_log_sink(&mut self, sink: Option<Box<dyn LogSink>>) -> CallStatus {
        self.slot().sink = sink;
        self.last_message = None;
        CallStatus::Ok
    }

    fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}
