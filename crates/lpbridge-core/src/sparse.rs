//! Compressed sparse storage for the constraint matrix.
//!
//! [`SparseBatch`] validates a caller's `(starts, indices, values)` triple
//! describing new rows or columns. [`SparseMatrix`] is the engine-side
//! compressed matrix (CSC or CSR) those batches are appended to, with
//! deletion that compacts and renumbers survivors in their original order.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::model::ModelError;
use crate::types::HighsInt;

/// Orientation of a compressed matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixFormat {
    /// Compressed sparse column: the outer dimension is columns.
    #[default]
    ColWise,
    /// Compressed sparse row: the outer dimension is rows.
    RowWise,
}

impl MatrixFormat {
    /// Engine encoding (`kColwise = 1`, `kRowwise = 2`).
    pub fn code(self) -> HighsInt {
        match self {
            MatrixFormat::ColWise => 1,
            MatrixFormat::RowWise => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatrixFormat::ColWise => "colwise",
            MatrixFormat::RowWise => "rowwise",
        }
    }
}

const SINGLE_START: [HighsInt; 1] = [0];

/// A validated batch of compressed vectors borrowed from the caller.
///
/// `starts` holds one entry per vector; the end of the last vector is the
/// nonzero count. The batch never copies the caller's arrays.
#[derive(Debug, Clone, Copy)]
pub struct SparseBatch<'a> {
    starts: &'a [HighsInt],
    indices: &'a [HighsInt],
    values: &'a [f64],
}

impl<'a> SparseBatch<'a> {
    /// Validate `count` vectors holding `nz` nonzeros whose indices must lie
    /// in `[0, inner_dim)`.
    ///
    /// `starts` may hold `count` entries or `count + 1` entries ending in `nz`.
    pub fn new(
        operation: &'static str,
        count: usize,
        nz: usize,
        starts: &'a [HighsInt],
        indices: &'a [HighsInt],
        values: &'a [f64],
        inner_dim: usize,
    ) -> Result<Self, BridgeError> {
        if indices.len() != nz {
            return Err(BridgeError::sparse(
                operation,
                format!(
                    "indices holds {} entries but {} nonzeros were declared",
                    indices.len(),
                    nz
                ),
            ));
        }
        if values.len() != nz {
            return Err(BridgeError::sparse(
                operation,
                format!(
                    "values holds {} entries but {} nonzeros were declared",
                    values.len(),
                    nz
                ),
            ));
        }

        let starts = if starts.len() == count {
            starts
        } else if starts.len() == count + 1 {
            let last = starts[count];
            if usize::try_from(last).ok() != Some(nz) {
                return Err(BridgeError::sparse(
                    operation,
                    format!("final start {last} does not equal the nonzero count {nz}"),
                ));
            }
            &starts[..count]
        } else {
            return Err(BridgeError::sparse(
                operation,
                format!(
                    "starts holds {} entries; expected {} or {}",
                    starts.len(),
                    count,
                    count + 1
                ),
            ));
        };

        if count == 0 {
            if nz != 0 {
                return Err(BridgeError::sparse(
                    operation,
                    format!("{nz} nonzeros supplied for an empty batch"),
                ));
            }
            return Ok(Self::empty());
        }
        if starts[0] != 0 {
            return Err(BridgeError::sparse(
                operation,
                format!("starts[0] must be 0 (got {})", starts[0]),
            ));
        }

        let mut previous = 0usize;
        for (k, &raw) in starts.iter().enumerate() {
            let start = usize::try_from(raw).map_err(|_| {
                BridgeError::sparse(operation, format!("starts[{k}] is negative ({raw})"))
            })?;
            if start < previous {
                return Err(BridgeError::sparse(
                    operation,
                    format!("starts must be non-decreasing (starts[{k}] = {start} < {previous})"),
                ));
            }
            if start > nz {
                return Err(BridgeError::sparse(
                    operation,
                    format!("starts[{k}] = {start} exceeds the nonzero count {nz}"),
                ));
            }
            previous = start;
        }

        let batch = Self {
            starts,
            indices,
            values,
        };

        let mut last_seen = vec![usize::MAX; inner_dim];
        for k in 0..count {
            let (begin, end) = batch.bounds(k);
            for &raw in &indices[begin..end] {
                let inner = usize::try_from(raw).map_err(|_| {
                    BridgeError::sparse(operation, format!("vector {k} holds negative index {raw}"))
                })?;
                if inner >= inner_dim {
                    return Err(BridgeError::sparse(
                        operation,
                        format!("vector {k} holds index {inner} outside [0, {inner_dim})"),
                    ));
                }
                if last_seen[inner] == k {
                    return Err(BridgeError::sparse(
                        operation,
                        format!("vector {k} repeats index {inner}"),
                    ));
                }
                last_seen[inner] = k;
            }
        }

        Ok(batch)
    }

    /// Validate one vector given as parallel `indices` and `values`.
    pub fn single(
        operation: &'static str,
        indices: &'a [HighsInt],
        values: &'a [f64],
        inner_dim: usize,
    ) -> Result<Self, BridgeError> {
        Self::new(
            operation,
            1,
            indices.len(),
            &SINGLE_START,
            indices,
            values,
            inner_dim,
        )
    }

    /// A batch of zero vectors.
    pub fn empty() -> Self {
        Self {
            starts: &[],
            indices: &[],
            values: &[],
        }
    }

    pub fn count(&self) -> usize {
        self.starts.len()
    }

    pub fn num_nz(&self) -> usize {
        self.indices.len()
    }

    /// Start offsets, one per vector, in the engine's convention.
    pub fn starts(&self) -> &'a [HighsInt] {
        self.starts
    }

    pub fn indices(&self) -> &'a [HighsInt] {
        self.indices
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    fn bounds(&self, k: usize) -> (usize, usize) {
        let begin = self.starts[k] as usize;
        let end = self
            .starts
            .get(k + 1)
            .map_or(self.indices.len(), |&next| next as usize);
        (begin, end)
    }

    /// Entries of vector `k` as `(inner index, value)`.
    pub fn vector(&self, k: usize) -> impl Iterator<Item = (usize, f64)> + 'a {
        let (begin, end) = self.bounds(k);
        self.indices[begin..end]
            .iter()
            .zip(&self.values[begin..end])
            .map(|(&index, &value)| (index as usize, value))
    }

    /// Largest inner index referenced by the batch.
    pub fn max_inner(&self) -> Option<usize> {
        self.indices.iter().map(|&index| index as usize).max()
    }
}

/// Engine-side compressed sparse matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    format: MatrixFormat,
    num_row: usize,
    num_col: usize,
    start: Vec<usize>,
    index: Vec<usize>,
    value: Vec<f64>,
}

impl Default for SparseMatrix {
    fn default() -> Self {
        Self::new(MatrixFormat::ColWise)
    }
}

impl SparseMatrix {
    /// Create an empty `0 x 0` matrix.
    pub fn new(format: MatrixFormat) -> Self {
        Self {
            format,
            num_row: 0,
            num_col: 0,
            start: vec![0],
            index: Vec::new(),
            value: Vec::new(),
        }
    }

    /// Assemble a matrix from owned compressed arrays, checking every invariant.
    pub fn from_parts(
        format: MatrixFormat,
        num_row: usize,
        num_col: usize,
        start: Vec<usize>,
        index: Vec<usize>,
        value: Vec<f64>,
    ) -> Result<Self, ModelError> {
        let matrix = Self {
            format,
            num_row,
            num_col,
            start,
            index,
            value,
        };
        matrix.validate()?;
        Ok(matrix)
    }

    pub fn format(&self) -> MatrixFormat {
        self.format
    }

    pub fn num_row(&self) -> usize {
        self.num_row
    }

    pub fn num_col(&self) -> usize {
        self.num_col
    }

    pub fn num_nz(&self) -> usize {
        self.index.len()
    }

    pub fn start(&self) -> &[usize] {
        &self.start
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    fn outer_dim(&self) -> usize {
        match self.format {
            MatrixFormat::ColWise => self.num_col,
            MatrixFormat::RowWise => self.num_row,
        }
    }

    fn inner_dim(&self) -> usize {
        match self.format {
            MatrixFormat::ColWise => self.num_row,
            MatrixFormat::RowWise => self.num_col,
        }
    }

    fn grow_outer(&mut self, count: usize) {
        match self.format {
            MatrixFormat::ColWise => self.num_col += count,
            MatrixFormat::RowWise => self.num_row += count,
        }
    }

    fn grow_inner(&mut self, count: usize) {
        match self.format {
            MatrixFormat::ColWise => self.num_row += count,
            MatrixFormat::RowWise => self.num_col += count,
        }
    }

    fn locate(&self, row: usize, col: usize) -> (usize, usize) {
        match self.format {
            MatrixFormat::ColWise => (col, row),
            MatrixFormat::RowWise => (row, col),
        }
    }

    /// Inner indices and values of outer vector `k`.
    pub fn outer(&self, k: usize) -> (&[usize], &[f64]) {
        let range = self.start[k]..self.start[k + 1];
        (&self.index[range.clone()], &self.value[range])
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.num_row || col >= self.num_col {
            return None;
        }
        let (outer, inner) = self.locate(row, col);
        let (indices, values) = self.outer(outer);
        indices
            .iter()
            .position(|&index| index == inner)
            .map(|offset| values[offset])
    }

    /// All stored entries as `(row, col, value)`.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let format = self.format;
        (0..self.outer_dim()).flat_map(move |outer| {
            let (indices, values) = self.outer(outer);
            indices
                .iter()
                .zip(values)
                .map(move |(&inner, &value)| match format {
                    MatrixFormat::ColWise => (inner, outer, value),
                    MatrixFormat::RowWise => (outer, inner, value),
                })
        })
    }

    /// Copy of this matrix in `format`, transposing the storage if needed.
    pub fn to_format(&self, format: MatrixFormat) -> SparseMatrix {
        if self.format == format {
            return self.clone();
        }
        let outer_dim = self.inner_dim();
        let mut start = vec![0usize; outer_dim + 1];
        for &inner in &self.index {
            start[inner + 1] += 1;
        }
        for k in 0..outer_dim {
            start[k + 1] += start[k];
        }
        let mut next = start.clone();
        let mut index = vec![0usize; self.num_nz()];
        let mut value = vec![0.0; self.num_nz()];
        for old_outer in 0..self.outer_dim() {
            for p in self.start[old_outer]..self.start[old_outer + 1] {
                let inner = self.index[p];
                let dest = next[inner];
                index[dest] = old_outer;
                value[dest] = self.value[p];
                next[inner] += 1;
            }
        }
        SparseMatrix {
            format,
            num_row: self.num_row,
            num_col: self.num_col,
            start,
            index,
            value,
        }
    }

    /// Append columns described by `batch` (indices are rows).
    pub fn append_cols(&mut self, batch: &SparseBatch<'_>) {
        match self.format {
            MatrixFormat::ColWise => self.push_outer(batch),
            MatrixFormat::RowWise => self.push_inner(batch),
        }
    }

    /// Append rows described by `batch` (indices are columns).
    pub fn append_rows(&mut self, batch: &SparseBatch<'_>) {
        match self.format {
            MatrixFormat::ColWise => self.push_inner(batch),
            MatrixFormat::RowWise => self.push_outer(batch),
        }
    }

    /// Append `count` columns without entries.
    pub fn append_empty_cols(&mut self, count: usize) {
        match self.format {
            MatrixFormat::ColWise => {
                let nnz = self.num_nz();
                self.start.extend(std::iter::repeat_n(nnz, count));
                self.grow_outer(count);
            }
            MatrixFormat::RowWise => self.grow_inner(count),
        }
    }

    /// Append `count` rows without entries.
    pub fn append_empty_rows(&mut self, count: usize) {
        match self.format {
            MatrixFormat::ColWise => self.grow_inner(count),
            MatrixFormat::RowWise => {
                let nnz = self.num_nz();
                self.start.extend(std::iter::repeat_n(nnz, count));
                self.grow_outer(count);
            }
        }
    }

    /// Drop the columns flagged in `mask`, renumbering survivors in order.
    pub fn delete_cols(&mut self, mask: &[bool]) {
        match self.format {
            MatrixFormat::ColWise => self.delete_outer(mask),
            MatrixFormat::RowWise => self.delete_inner(mask),
        }
    }

    /// Drop the rows flagged in `mask`, renumbering survivors in order.
    pub fn delete_rows(&mut self, mask: &[bool]) {
        match self.format {
            MatrixFormat::ColWise => self.delete_inner(mask),
            MatrixFormat::RowWise => self.delete_outer(mask),
        }
    }

    fn push_outer(&mut self, batch: &SparseBatch<'_>) {
        for k in 0..batch.count() {
            for (inner, value) in batch.vector(k) {
                self.index.push(inner);
                self.value.push(value);
            }
            self.start.push(self.index.len());
        }
        self.grow_outer(batch.count());
    }

    fn push_inner(&mut self, batch: &SparseBatch<'_>) {
        let outer_dim = self.outer_dim();
        let base = self.inner_dim();
        let mut extra = vec![0usize; outer_dim];
        for k in 0..batch.count() {
            for (outer, _) in batch.vector(k) {
                extra[outer] += 1;
            }
        }

        let total = self.num_nz() + batch.num_nz();
        let mut start = Vec::with_capacity(outer_dim + 1);
        let mut index = vec![0usize; total];
        let mut value = vec![0.0; total];
        let mut cursor = vec![0usize; outer_dim];
        let mut offset = 0usize;
        start.push(0);
        for outer in 0..outer_dim {
            let (old_index, old_value) = self.outer(outer);
            let len = old_index.len();
            index[offset..offset + len].copy_from_slice(old_index);
            value[offset..offset + len].copy_from_slice(old_value);
            cursor[outer] = offset + len;
            offset += len + extra[outer];
            start.push(offset);
        }
        for k in 0..batch.count() {
            for (outer, entry) in batch.vector(k) {
                index[cursor[outer]] = base + k;
                value[cursor[outer]] = entry;
                cursor[outer] += 1;
            }
        }

        self.start = start;
        self.index = index;
        self.value = value;
        self.grow_inner(batch.count());
    }

    fn delete_outer(&mut self, mask: &[bool]) {
        let mut start = Vec::with_capacity(self.start.len());
        let mut index = Vec::with_capacity(self.index.len());
        let mut value = Vec::with_capacity(self.value.len());
        start.push(0);
        let mut removed = 0usize;
        for (outer, &drop) in mask.iter().enumerate() {
            if drop {
                removed += 1;
                continue;
            }
            let (old_index, old_value) = self.outer(outer);
            index.extend_from_slice(old_index);
            value.extend_from_slice(old_value);
            start.push(index.len());
        }
        self.start = start;
        self.index = index;
        self.value = value;
        match self.format {
            MatrixFormat::ColWise => self.num_col -= removed,
            MatrixFormat::RowWise => self.num_row -= removed,
        }
    }

    fn delete_inner(&mut self, mask: &[bool]) {
        let mut remap = vec![usize::MAX; mask.len()];
        let mut kept = 0usize;
        for (inner, &drop) in mask.iter().enumerate() {
            if !drop {
                remap[inner] = kept;
                kept += 1;
            }
        }

        let mut start = Vec::with_capacity(self.start.len());
        let mut index = Vec::with_capacity(self.index.len());
        let mut value = Vec::with_capacity(self.value.len());
        start.push(0);
        for outer in 0..self.outer_dim() {
            let (old_index, old_value) = self.outer(outer);
            for (&inner, &entry) in old_index.iter().zip(old_value) {
                let renumbered = remap[inner];
                if renumbered != usize::MAX {
                    index.push(renumbered);
                    value.push(entry);
                }
            }
            start.push(index.len());
        }
        self.start = start;
        self.index = index;
        self.value = value;
        match self.format {
            MatrixFormat::ColWise => self.num_row = kept,
            MatrixFormat::RowWise => self.num_col = kept,
        }
    }

    /// Overwrite, insert, or (for `0.0`) remove the entry at `(row, col)`.
    ///
    /// The caller guarantees both indices are in range.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let (outer, inner) = self.locate(row, col);
        let begin = self.start[outer];
        let end = self.start[outer + 1];
        let existing = self.index[begin..end]
            .iter()
            .position(|&index| index == inner)
            .map(|offset| begin + offset);

        match existing {
            Some(p) if value == 0.0 => {
                self.index.remove(p);
                self.value.remove(p);
                for start in &mut self.start[outer + 1..] {
                    *start -= 1;
                }
            }
            Some(p) => self.value[p] = value,
            None if value == 0.0 => {}
            None => {
                self.index.insert(end, inner);
                self.value.insert(end, value);
                for start in &mut self.start[outer + 1..] {
                    *start += 1;
                }
            }
        }
    }

    /// Check every structural invariant of the compressed arrays.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: String| Err(ModelError::InvalidMatrix { reason });
        let outer_dim = self.outer_dim();
        let inner_dim = self.inner_dim();
        if self.start.len() != outer_dim + 1 {
            return invalid(format!(
                "start holds {} entries; expected {}",
                self.start.len(),
                outer_dim + 1
            ));
        }
        if self.start[0] != 0 {
            return invalid(format!("start[0] must be 0 (got {})", self.start[0]));
        }
        if self.start.windows(2).any(|pair| pair[1] < pair[0]) {
            return invalid("start must be non-decreasing".to_string());
        }
        if self.index.len() != self.value.len() {
            return invalid(format!(
                "index holds {} entries but value holds {}",
                self.index.len(),
                self.value.len()
            ));
        }
        if self.start[outer_dim] != self.index.len() {
            return invalid(format!(
                "start[{}] = {} does not equal the nonzero count {}",
                outer_dim,
                self.start[outer_dim],
                self.index.len()
            ));
        }
        let mut last_seen = vec![usize::MAX; inner_dim];
        for outer in 0..outer_dim {
            let (indices, _) = self.outer(outer);
            for &inner in indices {
                if inner >= inner_dim {
                    return invalid(format!(
                        "vector {outer} holds index {inner} outside [0, {inner_dim})"
                    ));
                }
                if last_seen[inner] == outer {
                    return invalid(format!("vector {outer} repeats index {inner}"));
                }
                last_seen[inner] = outer;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OP: &str = "adding rows";

    #[allow(clippy::float_cmp)]
    #[test]
    fn batch_accepts_both_start_conventions() {
        let indices = [0, 1, 1];
        let values = [1.0, 2.0, 3.0];
        let short = SparseBatch::new(OP, 2, 3, &[0, 2], &indices, &values, 2).unwrap();
        let long = SparseBatch::new(OP, 2, 3, &[0, 2, 3], &indices, &values, 2).unwrap();
        assert_eq!(short.starts(), long.starts());
        assert_eq!(long.count(), 2);
        let second: Vec<(usize, f64)> = long.vector(1).collect();
        assert_eq!(second, vec![(1, 3.0)]);
    }

    #[test]
    fn batch_rejects_malformed_starts() {
        let indices = [0, 1];
        let values = [1.0, 1.0];
        let cases: [&[HighsInt]; 5] = [&[1, 2], &[0, 3], &[0, 1, 1, 2], &[0, 2, 1], &[0, -1]];
        for starts in cases {
            let err = SparseBatch::new(OP, 2, 2, starts, &indices, &values, 2).unwrap_err();
            assert_eq!(err.code(), "SPARSE_INVALID_LAYOUT", "starts {starts:?}");
        }
    }

    #[test]
    fn batch_rejects_wrong_terminator() {
        let err = SparseBatch::new(OP, 1, 2, &[0, 1], &[0, 1], &[1.0, 1.0], 2).unwrap_err();
        assert!(err.to_string().contains("final start 1"));
    }

    #[test]
    fn batch_rejects_bad_indices() {
        let values = [1.0, 1.0];
        let out_of_range = SparseBatch::new(OP, 1, 2, &[0], &[0, 5], &values, 3).unwrap_err();
        assert!(out_of_range.to_string().contains("outside [0, 3)"));
        let repeated = SparseBatch::new(OP, 1, 2, &[0], &[2, 2], &values, 3).unwrap_err();
        assert!(repeated.to_string().contains("repeats index 2"));
        let negative = SparseBatch::new(OP, 1, 2, &[0], &[-1, 0], &values, 3).unwrap_err();
        assert_eq!(negative.code(), "SPARSE_INVALID_LAYOUT");
        // The same index in different vectors is fine.
        assert!(SparseBatch::new(OP, 2, 2, &[0, 1], &[2, 2], &values, 3).is_ok());
    }

    #[test]
    fn batch_rejects_nonzero_count_disagreement() {
        let err = SparseBatch::new(OP, 1, 3, &[0], &[0, 1], &[1.0, 1.0], 3).unwrap_err();
        assert!(err.to_string().contains("indices holds 2 entries"));
        let err = SparseBatch::new(OP, 0, 1, &[], &[0], &[1.0], 3).unwrap_err();
        assert!(err.to_string().contains("empty batch"));
    }

    fn two_by_two() -> SparseMatrix {
        // [1 1]
        // [1 -1]
        SparseMatrix::from_parts(
            MatrixFormat::ColWise,
            2,
            2,
            vec![0, 2, 4],
            vec![0, 1, 0, 1],
            vec![1.0, 1.0, 1.0, -1.0],
        )
        .unwrap()
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn append_rows_to_colwise_matrix() {
        let mut matrix = two_by_two();
        let batch = SparseBatch::new(OP, 1, 1, &[0], &[1], &[7.0], 2).unwrap();
        matrix.append_rows(&batch);
        assert_eq!(matrix.num_row(), 3);
        assert_eq!(matrix.num_nz(), 5);
        assert_eq!(matrix.get(2, 1), Some(7.0));
        assert_eq!(matrix.get(2, 0), None);
        matrix.validate().unwrap();
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn append_cols_to_rowwise_matrix() {
        let mut matrix = two_by_two().to_format(MatrixFormat::RowWise);
        let batch = SparseBatch::new("adding columns", 1, 2, &[0], &[0, 1], &[3.0, 4.0], 2)
            .unwrap();
        matrix.append_cols(&batch);
        assert_eq!(matrix.num_col(), 3);
        assert_eq!(matrix.get(0, 2), Some(3.0));
        assert_eq!(matrix.get(1, 2), Some(4.0));
        assert_eq!(matrix.get(1, 1), Some(-1.0));
        matrix.validate().unwrap();
    }

    #[test]
    fn transpose_preserves_entries() {
        let matrix = two_by_two();
        let rowwise = matrix.to_format(MatrixFormat::RowWise);
        rowwise.validate().unwrap();
        let mut a: Vec<_> = matrix.entries().collect();
        let mut b: Vec<_> = rowwise.entries().collect();
        a.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
        b.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
        assert_eq!(a, b);
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn delete_rows_renumbers_survivors() {
        let mut matrix = two_by_two();
        let batch = SparseBatch::new(OP, 1, 2, &[0], &[0, 1], &[5.0, 6.0], 2).unwrap();
        matrix.append_rows(&batch);
        matrix.delete_rows(&[true, false, false]);
        assert_eq!(matrix.num_row(), 2);
        assert_eq!(matrix.get(0, 1), Some(-1.0));
        assert_eq!(matrix.get(1, 0), Some(5.0));
        assert_eq!(matrix.num_nz(), 4);
        matrix.validate().unwrap();
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn delete_cols_drops_their_entries() {
        let mut matrix = two_by_two();
        matrix.delete_cols(&[false, true]);
        assert_eq!(matrix.num_col(), 1);
        assert_eq!(matrix.num_nz(), 2);
        assert!(matrix.entries().all(|(_, col, _)| col == 0));
        matrix.validate().unwrap();
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn set_overwrites_inserts_and_removes() {
        let mut matrix = two_by_two();
        matrix.delete_cols(&[false, true]);
        matrix.append_empty_cols(1);
        assert_eq!(matrix.num_col(), 2);

        matrix.set(1, 1, 2.5);
        assert_eq!(matrix.get(1, 1), Some(2.5));
        matrix.set(1, 1, 3.5);
        assert_eq!(matrix.get(1, 1), Some(3.5));
        assert_eq!(matrix.num_nz(), 3);

        matrix.set(0, 0, 0.0);
        assert_eq!(matrix.get(0, 0), None);
        assert_eq!(matrix.num_nz(), 2);
        matrix.set(0, 1, 0.0);
        assert_eq!(matrix.num_nz(), 2);
        matrix.validate().unwrap();
    }

    #[test]
    fn from_parts_rejects_broken_invariants() {
        let err = SparseMatrix::from_parts(
            MatrixFormat::ColWise,
            1,
            1,
            vec![0, 2],
            vec![0, 0],
            vec![1.0, 1.0],
        )
        .unwrap_err();
        assert!(err.to_string().contains("repeats index 0"));
    }
}
