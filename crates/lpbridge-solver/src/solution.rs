//! Solution, basis, and solve information returned by an engine.

use serde::{Deserialize, Serialize};

use crate::status::{BasisStatus, SolutionStatus};

/// Primal and dual values of the last solve.
///
/// Values are only readable while the matching validity flag is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    value_valid: bool,
    dual_valid: bool,
    col_value: Vec<f64>,
    col_dual: Vec<f64>,
    row_value: Vec<f64>,
    row_dual: Vec<f64>,
}

impl Solution {
    /// A solution with no valid values.
    pub fn new() -> Self {
        Self::default()
    }

    /// A valid primal solution without duals.
    pub fn primal(col_value: Vec<f64>, row_value: Vec<f64>) -> Self {
        Self {
            value_valid: true,
            dual_valid: false,
            col_value,
            col_dual: Vec::new(),
            row_value,
            row_dual: Vec::new(),
        }
    }

    /// Attach valid duals to this solution.
    pub fn with_duals(mut self, col_dual: Vec<f64>, row_dual: Vec<f64>) -> Self {
        self.col_dual = col_dual;
        self.row_dual = row_dual;
        self.dual_valid = true;
        self
    }

    pub fn value_valid(&self) -> bool {
        self.value_valid
    }

    pub fn dual_valid(&self) -> bool {
        self.dual_valid
    }

    pub fn col_value(&self) -> Option<&[f64]> {
        self.value_valid.then_some(self.col_value.as_slice())
    }

    pub fn row_value(&self) -> Option<&[f64]> {
        self.value_valid.then_some(self.row_value.as_slice())
    }

    /// Column duals (reduced costs).
    pub fn col_dual(&self) -> Option<&[f64]> {
        self.dual_valid.then_some(self.col_dual.as_slice())
    }

    /// Row duals (shadow prices).
    pub fn row_dual(&self) -> Option<&[f64]> {
        self.dual_valid.then_some(self.row_dual.as_slice())
    }

    pub fn invalidate(&mut self) {
        *self = Self::default();
    }
}

/// Basis statuses of the last solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    valid: bool,
    alien: bool,
    was_alien: bool,
    debug_id: i64,
    debug_update_count: i64,
    debug_origin_name: String,
    col_status: Vec<BasisStatus>,
    row_status: Vec<BasisStatus>,
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            valid: false,
            alien: true,
            was_alien: true,
            debug_id: -1,
            debug_update_count: -1,
            debug_origin_name: "None".to_string(),
            col_status: Vec::new(),
            row_status: Vec::new(),
        }
    }
}

impl Basis {
    /// An invalid basis.
    pub fn new() -> Self {
        Self::default()
    }

    /// A valid basis produced by the engine.
    pub fn from_statuses(
        col_status: Vec<BasisStatus>,
        row_status: Vec<BasisStatus>,
        debug_id: i64,
        debug_origin_name: impl Into<String>,
    ) -> Self {
        Self {
            valid: true,
            alien: false,
            was_alien: false,
            debug_id,
            debug_update_count: 0,
            debug_origin_name: debug_origin_name.into(),
            col_status,
            row_status,
        }
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn alien(&self) -> bool {
        self.alien
    }

    pub fn was_alien(&self) -> bool {
        self.was_alien
    }

    pub fn debug_id(&self) -> i64 {
        self.debug_id
    }

    pub fn debug_update_count(&self) -> i64 {
        self.debug_update_count
    }

    pub fn debug_origin_name(&self) -> &str {
        &self.debug_origin_name
    }

    pub fn col_status(&self) -> Option<&[BasisStatus]> {
        self.valid.then_some(self.col_status.as_slice())
    }

    pub fn row_status(&self) -> Option<&[BasisStatus]> {
        self.valid.then_some(self.row_status.as_slice())
    }

    pub fn invalidate(&mut self) {
        *self = Self::default();
    }
}

/// Scalar information about the last solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub valid: bool,
    pub objective_function_value: f64,
    pub simplex_iteration_count: i64,
    pub mip_node_count: i64,
    pub mip_gap: f64,
    pub mip_dual_bound: f64,
    pub primal_solution_status: SolutionStatus,
    pub dual_solution_status: SolutionStatus,
    pub basis_validity: bool,
    /// `-1` until the primal solution has been checked.
    pub num_primal_infeasibilities: i64,
    pub max_primal_infeasibility: f64,
    pub sum_primal_infeasibilities: f64,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            valid: false,
            objective_function_value: 0.0,
            simplex_iteration_count: 0,
            mip_node_count: -1,
            mip_gap: f64::INFINITY,
            mip_dual_bound: f64::NEG_INFINITY,
            primal_solution_status: SolutionStatus::None,
            dual_solution_status: SolutionStatus::None,
            basis_validity: false,
            num_primal_infeasibilities: -1,
            max_primal_infeasibility: f64::INFINITY,
            sum_primal_infeasibilities: f64::INFINITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_solution_hides_values() {
        let solution = Solution::new();
        assert!(!solution.value_valid());
        assert!(solution.col_value().is_none());
        assert!(solution.row_dual().is_none());
    }

    #[test]
    fn test_primal_only_solution() {
        let solution = Solution::primal(vec![1.0, 2.0], vec![3.0]);
        assert_eq!(solution.col_value(), Some(&[1.0, 2.0][..]));
        assert_eq!(solution.row_value(), Some(&[3.0][..]));
        assert!(solution.col_dual().is_none());

        let solution = solution.with_duals(vec![0.0, 0.0], vec![-1.0]);
        assert!(solution.dual_valid());
        assert_eq!(solution.row_dual(), Some(&[-1.0][..]));
    }

    #[test]
    fn test_invalidate_resets_everything() {
        let mut solution = Solution::primal(vec![1.0], vec![]).with_duals(vec![0.0], vec![]);
        solution.invalidate();
        assert_eq!(solution, Solution::default());

        let mut basis = Basis::from_statuses(vec![BasisStatus::Basic], vec![], 3, "simplex");
        assert_eq!(basis.col_status(), Some(&[BasisStatus::Basic][..]));
        assert_eq!(basis.debug_origin_name(), "simplex");
        basis.invalidate();
        assert!(!basis.valid());
        assert!(basis.alien());
        assert_eq!(basis.debug_id(), -1);
        assert!(basis.col_status().is_none());
    }

    #[test]
    fn test_info_defaults_mark_unknown_counts() {
        let info = Info::default();
        assert!(!info.valid);
        assert_eq!(info.num_primal_infeasibilities, -1);
        assert_eq!(info.primal_solution_status, SolutionStatus::None);
    }
}
