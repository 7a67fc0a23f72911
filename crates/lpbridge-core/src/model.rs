//! The incremental LP/MIP model held by an engine.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::BridgeError;
use crate::index_set::IndexSet;
use crate::sparse::{MatrixFormat, SparseBatch, SparseMatrix};
use crate::types::{HighsInt, ObjSense, VarType};

/// Errors raised by the engine-side model when an edit cannot be applied.
///
/// Every mutation validates its whole input first, so a failed edit leaves
/// the model unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Row or column index at or beyond the current dimension.
    IndexOutOfRange {
        entity: &'static str,
        index: usize,
        dim: usize,
    },
    /// Parallel arrays handed to the engine disagree in length.
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// NaN in a cost, bound, or coefficient.
    NotANumber { field: &'static str, index: usize },
    /// Compressed matrix invariant violated.
    InvalidMatrix { reason: String },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::IndexOutOfRange { .. } => "MODEL_INDEX_OUT_OF_RANGE",
            ModelError::LengthMismatch { .. } => "MODEL_LENGTH_MISMATCH",
            ModelError::NotANumber { .. } => "MODEL_NOT_A_NUMBER",
            ModelError::InvalidMatrix { .. } => "MATRIX_INVALID",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::IndexOutOfRange { entity, index, dim } => write!(
                f,
                "[{}] {} index {} out of range (model has {})",
                self.code(),
                entity,
                index,
                dim
            ),
            ModelError::LengthMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "[{}] {} holds {} entries (expected {})",
                self.code(),
                field,
                found,
                expected
            ),
            ModelError::NotANumber { field, index } => {
                write!(f, "[{}] {} entry {} is NaN", self.code(), field, index)
            }
            ModelError::InvalidMatrix { reason } => {
                write!(f, "[{}] Matrix invalid: {}", self.code(), reason)
            }
        }
    }
}

impl std::error::Error for ModelError {}

/// Input data for building a complete model from CSC arrays.
///
/// `a_start` follows the engine convention: `num_col` entries, or
/// `num_col + 1` entries ending in the nonzero count.
#[derive(Debug, Clone, Copy)]
pub struct CscInput<'a> {
    pub num_col: usize,
    pub num_row: usize,
    pub sense: ObjSense,
    pub offset: f64,
    pub col_cost: &'a [f64],
    pub col_lower: &'a [f64],
    pub col_upper: &'a [f64],
    pub row_lower: &'a [f64],
    pub row_upper: &'a [f64],
    pub a_start: &'a [HighsInt],
    pub a_index: &'a [HighsInt],
    pub a_value: &'a [f64],
    /// Empty for a pure LP.
    pub integrality: &'a [VarType],
}

/// A linear program with optional integrality, stored column-wise.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Lp {
    model_name: String,
    sense: ObjSense,
    offset: f64,
    col_cost: Vec<f64>,
    col_lower: Vec<f64>,
    col_upper: Vec<f64>,
    row_lower: Vec<f64>,
    row_upper: Vec<f64>,
    integrality: Vec<VarType>,
    matrix: SparseMatrix,
}

fn check_len(field: &'static str, values: usize, expected: usize) -> Result<(), ModelError> {
    if values != expected {
        return Err(ModelError::LengthMismatch {
            field,
            expected,
            found: values,
        });
    }
    Ok(())
}

fn check_numbers(field: &'static str, values: &[f64]) -> Result<(), ModelError> {
    match values.iter().position(|value| value.is_nan()) {
        Some(index) => Err(ModelError::NotANumber { field, index }),
        None => Ok(()),
    }
}

fn check_range(entity: &'static str, indices: &[usize], dim: usize) -> Result<(), ModelError> {
    match indices.iter().find(|&&index| index >= dim) {
        Some(&index) => Err(ModelError::IndexOutOfRange { entity, index, dim }),
        None => Ok(()),
    }
}

fn retain_unmasked<T>(values: &mut Vec<T>, mask: &[bool]) {
    let mut position = 0;
    values.retain(|_| {
        let keep = !mask[position];
        position += 1;
        keep
    });
}

impl Lp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from CSC arrays, validating every shape up front.
    pub fn from_csc(input: CscInput<'_>) -> Result<Self, BridgeError> {
        const OPERATION: &str = "passing model";
        let CscInput {
            num_col,
            num_row,
            sense,
            offset,
            col_cost,
            col_lower,
            col_upper,
            row_lower,
            row_upper,
            a_start,
            a_index,
            a_value,
            integrality,
        } = input;

        let arity = |argument: &'static str, found: usize, expected: usize| {
            if found == expected {
                Ok(())
            } else {
                Err(BridgeError::ArityMismatch {
                    operation: OPERATION,
                    argument,
                    expected,
                    found,
                })
            }
        };
        arity("col_cost", col_cost.len(), num_col)?;
        arity("col_lower", col_lower.len(), num_col)?;
        arity("col_upper", col_upper.len(), num_col)?;
        arity("row_lower", row_lower.len(), num_row)?;
        arity("row_upper", row_upper.len(), num_row)?;
        if !integrality.is_empty() {
            arity("integrality", integrality.len(), num_col)?;
        }
        let batch = SparseBatch::new(
            OPERATION,
            num_col,
            a_index.len(),
            a_start,
            a_index,
            a_value,
            num_row,
        )?;

        let mut matrix = SparseMatrix::new(MatrixFormat::ColWise);
        matrix.append_empty_rows(num_row);
        matrix.append_cols(&batch);
        let integrality = if integrality.is_empty() {
            vec![VarType::Continuous; num_col]
        } else {
            integrality.to_vec()
        };
        trace!(
            component = "model",
            operation = "from_csc",
            status = "success",
            num_col,
            num_row,
            nnz = batch.num_nz(),
            "Built model from CSC arrays"
        );
        Ok(Lp {
            model_name: String::new(),
            sense,
            offset,
            col_cost: col_cost.to_vec(),
            col_lower: col_lower.to_vec(),
            col_upper: col_upper.to_vec(),
            row_lower: row_lower.to_vec(),
            row_upper: row_upper.to_vec(),
            integrality,
            matrix,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn set_model_name(&mut self, name: impl Into<String>) {
        self.model_name = name.into();
    }

    pub fn num_col(&self) -> usize {
        self.matrix.num_col()
    }

    pub fn num_row(&self) -> usize {
        self.matrix.num_row()
    }

    pub fn num_nz(&self) -> usize {
        self.matrix.num_nz()
    }

    pub fn sense(&self) -> ObjSense {
        self.sense
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn col_cost(&self) -> &[f64] {
        &self.col_cost
    }

    pub fn col_lower(&self) -> &[f64] {
        &self.col_lower
    }

    pub fn col_upper(&self) -> &[f64] {
        &self.col_upper
    }

    pub fn row_lower(&self) -> &[f64] {
        &self.row_lower
    }

    pub fn row_upper(&self) -> &[f64] {
        &self.row_upper
    }

    pub fn integrality(&self) -> &[VarType] {
        &self.integrality
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    /// True when any column is integer.
    pub fn is_mip(&self) -> bool {
        self.integrality.iter().any(|kind| kind.is_integer())
    }

    pub fn set_sense(&mut self, sense: ObjSense) {
        self.sense = sense;
    }

    pub fn set_offset(&mut self, offset: f64) -> Result<(), ModelError> {
        check_numbers("offset", &[offset])?;
        self.offset = offset;
        Ok(())
    }

    /// Append columns; `batch` holds their entries (indices are rows) or is empty.
    pub fn add_cols(
        &mut self,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        batch: &SparseBatch<'_>,
    ) -> Result<(), ModelError> {
        let count = cost.len();
        check_len("col_lower", lower.len(), count)?;
        check_len("col_upper", upper.len(), count)?;
        if batch.count() != 0 {
            check_len("col_starts", batch.count(), count)?;
        }
        if let Some(max) = batch.max_inner() {
            check_range("row", &[max], self.num_row())?;
        }
        check_numbers("col_cost", cost)?;
        check_numbers("col_lower", lower)?;
        check_numbers("col_upper", upper)?;
        check_numbers("matrix_value", batch.values())?;

        self.col_cost.extend_from_slice(cost);
        self.col_lower.extend_from_slice(lower);
        self.col_upper.extend_from_slice(upper);
        self.integrality
            .extend(std::iter::repeat_n(VarType::Continuous, count));
        if batch.count() == 0 {
            self.matrix.append_empty_cols(count);
        } else {
            self.matrix.append_cols(batch);
        }
        trace!(
            component = "model",
            operation = "add_cols",
            status = "success",
            added = count,
            nnz = batch.num_nz(),
            "Added columns"
        );
        Ok(())
    }

    /// Append rows; `batch` holds their entries (indices are columns).
    pub fn add_rows(
        &mut self,
        lower: &[f64],
        upper: &[f64],
        batch: &SparseBatch<'_>,
    ) -> Result<(), ModelError> {
        let count = lower.len();
        check_len("row_upper", upper.len(), count)?;
        if batch.count() != 0 {
            check_len("row_starts", batch.count(), count)?;
        }
        if let Some(max) = batch.max_inner() {
            check_range("column", &[max], self.num_col())?;
        }
        check_numbers("row_lower", lower)?;
        check_numbers("row_upper", upper)?;
        check_numbers("matrix_value", batch.values())?;

        self.row_lower.extend_from_slice(lower);
        self.row_upper.extend_from_slice(upper);
        if batch.count() == 0 {
            self.matrix.append_empty_rows(count);
        } else {
            self.matrix.append_rows(batch);
        }
        trace!(
            component = "model",
            operation = "add_rows",
            status = "success",
            added = count,
            nnz = batch.num_nz(),
            "Added rows"
        );
        Ok(())
    }

    pub fn delete_cols(&mut self, set: &IndexSet) -> Result<(), ModelError> {
        let dim = self.num_col();
        let mask = set.mask(dim).ok_or(ModelError::IndexOutOfRange {
            entity: "column",
            index: set.max().unwrap_or(dim),
            dim,
        })?;
        retain_unmasked(&mut self.col_cost, &mask);
        retain_unmasked(&mut self.col_lower, &mask);
        retain_unmasked(&mut self.col_upper, &mask);
        retain_unmasked(&mut self.integrality, &mask);
        self.matrix.delete_cols(&mask);
        Ok(())
    }

    pub fn delete_rows(&mut self, set: &IndexSet) -> Result<(), ModelError> {
        let dim = self.num_row();
        let mask = set.mask(dim).ok_or(ModelError::IndexOutOfRange {
            entity: "row",
            index: set.max().unwrap_or(dim),
            dim,
        })?;
        retain_unmasked(&mut self.row_lower, &mask);
        retain_unmasked(&mut self.row_upper, &mask);
        self.matrix.delete_rows(&mask);
        Ok(())
    }

    pub fn change_coeff(&mut self, row: usize, col: usize, value: f64) -> Result<(), ModelError> {
        check_range("row", &[row], self.num_row())?;
        check_range("column", &[col], self.num_col())?;
        check_numbers("matrix_value", &[value])?;
        self.matrix.set(row, col, value);
        Ok(())
    }

    pub fn change_cols_cost(&mut self, cols: &[usize], cost: &[f64]) -> Result<(), ModelError> {
        check_len("col_cost", cost.len(), cols.len())?;
        check_range("column", cols, self.num_col())?;
        check_numbers("col_cost", cost)?;
        for (&col, &value) in cols.iter().zip(cost) {
            self.col_cost[col] = value;
        }
        Ok(())
    }

    pub fn change_cols_bounds(
        &mut self,
        cols: &[usize],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<(), ModelError> {
        check_len("col_lower", lower.len(), cols.len())?;
        check_len("col_upper", upper.len(), cols.len())?;
        check_range("column", cols, self.num_col())?;
        check_numbers("col_lower", lower)?;
        check_numbers("col_upper", upper)?;
        for (k, &col) in cols.iter().enumerate() {
            self.col_lower[col] = lower[k];
            self.col_upper[col] = upper[k];
        }
        Ok(())
    }

    pub fn change_cols_integrality(
        &mut self,
        cols: &[usize],
        integrality: &[VarType],
    ) -> Result<(), ModelError> {
        check_len("integrality", integrality.len(), cols.len())?;
        check_range("column", cols, self.num_col())?;
        for (&col, &kind) in cols.iter().zip(integrality) {
            self.integrality[col] = kind;
        }
        Ok(())
    }

    pub fn change_rows_bounds(
        &mut self,
        rows: &[usize],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<(), ModelError> {
        check_len("row_lower", lower.len(), rows.len())?;
        check_len("row_upper", upper.len(), rows.len())?;
        check_range("row", rows, self.num_row())?;
        check_numbers("row_lower", lower)?;
        check_numbers("row_upper", upper)?;
        for (k, &row) in rows.iter().enumerate() {
            self.row_lower[row] = lower[k];
            self.row_upper[row] = upper[k];
        }
        Ok(())
    }

    /// Row activities `A x` for a full column vector.
    pub fn row_activity(&self, col_value: &[f64]) -> Vec<f64> {
        let mut activity = vec![0.0; self.num_row()];
        for (row, col, value) in self.matrix.entries() {
            activity[row] += value * col_value[col];
        }
        activity
    }

    /// Objective `c x + offset` for a full column vector.
    pub fn objective_value(&self, col_value: &[f64]) -> f64 {
        self.col_cost
            .iter()
            .zip(col_value)
            .map(|(cost, value)| cost * value)
            .sum::<f64>()
            + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::INFINITY;

    fn scenario_lp() -> Lp {
        Lp::from_csc(CscInput {
            num_col: 2,
            num_row: 2,
            sense: ObjSense::Minimize,
            offset: 0.0,
            col_cost: &[-1.0, -2.0],
            col_lower: &[0.0, 0.0],
            col_upper: &[INFINITY, 6.0],
            row_lower: &[3.0, -4.0],
            row_upper: &[10.0, 2.0],
            a_start: &[0, 2],
            a_index: &[0, 1, 0, 1],
            a_value: &[1.0, 1.0, 1.0, -1.0],
            integrality: &[],
        })
        .unwrap()
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn from_csc_builds_consistent_model() {
        let lp = scenario_lp();
        assert_eq!(lp.num_col(), 2);
        assert_eq!(lp.num_row(), 2);
        assert_eq!(lp.num_nz(), 4);
        assert_eq!(lp.matrix().get(1, 1), Some(-1.0));
        assert_eq!(lp.integrality(), &[VarType::Continuous; 2]);
        assert!(!lp.is_mip());
        lp.matrix().validate().unwrap();
    }

    #[test]
    fn from_csc_reports_arity() {
        let err = Lp::from_csc(CscInput {
            num_col: 2,
            num_row: 0,
            sense: ObjSense::Minimize,
            offset: 0.0,
            col_cost: &[1.0],
            col_lower: &[0.0, 0.0],
            col_upper: &[1.0, 1.0],
            row_lower: &[],
            row_upper: &[],
            a_start: &[0, 0],
            a_index: &[],
            a_value: &[],
            integrality: &[],
        })
        .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::ArityMismatch {
                argument: "col_cost",
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn add_and_delete_keep_dimensions_in_sync() {
        let mut lp = scenario_lp();
        let batch = SparseBatch::new("adding columns", 1, 2, &[0], &[0, 1], &[2.0, 3.0], 2)
            .unwrap();
        lp.add_cols(&[1.0], &[0.0], &[5.0], &batch).unwrap();
        assert_eq!(lp.num_col(), 3);
        assert_eq!(lp.num_nz(), 6);

        lp.delete_cols(&IndexSet::from_indices([0])).unwrap();
        assert_eq!(lp.num_col(), 2);
        assert_eq!(lp.col_cost(), &[-2.0, 1.0]);
        assert_eq!(lp.matrix().get(1, 1), Some(3.0));

        lp.delete_rows(&IndexSet::from_indices([0, 0])).unwrap();
        assert_eq!(lp.num_row(), 1);
        assert_eq!(lp.row_lower(), &[-4.0]);
        assert_eq!(lp.matrix().num_row(), 1);
        lp.matrix().validate().unwrap();
    }

    #[test]
    fn failed_edits_leave_model_unchanged() {
        let mut lp = scenario_lp();
        let before = lp.clone();
        let err = lp.delete_rows(&IndexSet::from_indices([1, 2])).unwrap_err();
        assert_eq!(
            err,
            ModelError::IndexOutOfRange {
                entity: "row",
                index: 2,
                dim: 2
            }
        );
        let err = lp
            .change_cols_bounds(&[0, 1], &[0.0, f64::NAN], &[1.0, 1.0])
            .unwrap_err();
        assert_eq!(err.code(), "MODEL_NOT_A_NUMBER");
        let err = lp.change_coeff(0, 9, 1.0).unwrap_err();
        assert!(err.to_string().contains("column index 9"));
        assert_eq!(lp, before);
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn change_operations_apply_in_place() {
        let mut lp = scenario_lp();
        lp.change_cols_cost(&[1], &[4.0]).unwrap();
        lp.change_cols_integrality(&[0], &[VarType::Integer]).unwrap();
        lp.change_rows_bounds(&[0], &[-INFINITY], &[8.0]).unwrap();
        lp.change_coeff(0, 0, 0.0).unwrap();
        assert_eq!(lp.col_cost(), &[-1.0, 4.0]);
        assert!(lp.is_mip());
        assert_eq!(lp.row_upper()[0], 8.0);
        assert_eq!(lp.num_nz(), 3);
        assert_eq!(lp.num_col(), 2);
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn activity_and_objective() {
        let lp = scenario_lp();
        assert_eq!(lp.row_activity(&[4.0, 6.0]), vec![10.0, -2.0]);
        assert_eq!(lp.objective_value(&[4.0, 6.0]), -16.0);
    }

    #[test]
    fn add_rows_without_entries() {
        let mut lp = scenario_lp();
        lp.add_rows(&[0.0, 1.0], &[1.0, 2.0], &SparseBatch::empty())
            .unwrap();
        assert_eq!(lp.num_row(), 4);
        assert_eq!(lp.num_nz(), 4);
        lp.matrix().validate().unwrap();
    }
}
