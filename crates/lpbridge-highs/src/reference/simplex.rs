//! Dense two-phase primal simplex.
//!
//! Columns are substituted into non-negative variables `z` (shifted by a
//! finite lower bound, mirrored from a finite upper bound, or split when
//! free), finite column ranges become `z <= u - l` rows, and every row gets
//! a unit column: a slack for `<=` rows and an artificial otherwise. Phase 1
//! drives the artificials to zero, phase 2 optimizes with artificials barred
//! from entering. Bland's rule picks both the entering and leaving column.

use std::time::Instant;

use lpbridge_core::{Lp, normalize_infinite};
use lpbridge_solver::BasisStatus;

const PIVOT_TOLERANCE: f64 = 1e-9;

/// Limits and tolerances for one LP solve.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimplexParams {
    pub infinite_bound: f64,
    pub primal_tolerance: f64,
    pub dual_tolerance: f64,
    /// Pivots still allowed before the solve stops on the iteration limit.
    pub iteration_budget: u64,
    pub deadline: Option<Instant>,
}

impl SimplexParams {
    pub(crate) fn deadline_passed(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// An optimal vertex in the model's own variables.
#[derive(Debug, Clone)]
pub(crate) struct LpPoint {
    pub col_value: Vec<f64>,
    pub row_value: Vec<f64>,
    pub col_dual: Vec<f64>,
    pub row_dual: Vec<f64>,
    pub col_status: Vec<BasisStatus>,
    pub row_status: Vec<BasisStatus>,
    /// `c x + offset` in the model's sense.
    pub objective: f64,
}

#[derive(Debug, Clone)]
pub(crate) enum LpOutcome {
    Optimal(LpPoint),
    Infeasible,
    Unbounded,
    IterationLimit,
    TimeLimit,
}

#[derive(Debug, Clone)]
pub(crate) struct SimplexRun {
    pub outcome: LpOutcome,
    pub iterations: u64,
}

/// `x = offset + sum(coef * z)`.
#[derive(Debug, Clone)]
struct Substitution {
    offset: f64,
    terms: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Le,
    Ge,
    Eq,
}

/// Where a tableau row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Row(usize),
    Bound,
}

#[derive(Debug, Clone)]
struct StandardRow {
    coeffs: Vec<f64>,
    kind: RowKind,
    rhs: f64,
    origin: Origin,
    /// `-1.0` when the row was negated to make `rhs` non-negative.
    sign: f64,
}

enum Stop {
    Optimal,
    Unbounded,
    IterationLimit,
    TimeLimit,
}

struct Tableau {
    rows: Vec<Vec<f64>>,
    objective: Vec<f64>,
    basis: Vec<usize>,
    num_cols: usize,
    artificial_start: usize,
}

impl Tableau {
    fn rhs(&self, row: usize) -> f64 {
        self.rows[row][self.num_cols]
    }

    /// Reduced costs for `cost`, written into the objective row.
    fn price(&mut self, cost: &[f64]) {
        let mut objective = cost.to_vec();
        objective.push(0.0);
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let weight = cost[basic];
            if weight != 0.0 {
                for (entry, value) in objective.iter_mut().zip(row) {
                    *entry -= weight * value;
                }
            }
        }
        self.objective = objective;
    }

    fn pivot(&mut self, pivot_row: usize, entering: usize) {
        let pivot = self.rows[pivot_row][entering];
        for value in &mut self.rows[pivot_row] {
            *value /= pivot;
        }
        let source = self.rows[pivot_row].clone();
        for (index, row) in self.rows.iter_mut().enumerate() {
            if index == pivot_row {
                continue;
            }
            let factor = row[entering];
            if factor != 0.0 {
                for (value, &s) in row.iter_mut().zip(&source) {
                    *value -= factor * s;
                }
            }
        }
        let factor = self.objective[entering];
        if factor != 0.0 {
            for (value, &s) in self.objective.iter_mut().zip(&source) {
                *value -= factor * s;
            }
        }
        self.basis[pivot_row] = entering;
    }

    fn leaving_row(&self, entering: usize) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (row, values) in self.rows.iter().enumerate() {
            let coefficient = values[entering];
            if coefficient <= PIVOT_TOLERANCE {
                continue;
            }
            let ratio = self.rhs(row).max(0.0) / coefficient;
            best = match best {
                None => Some((row, ratio)),
                Some((current, current_ratio)) => {
                    if ratio < current_ratio - PIVOT_TOLERANCE
                        || (ratio <= current_ratio + PIVOT_TOLERANCE
                            && self.basis[row] < self.basis[current])
                    {
                        Some((row, ratio))
                    } else {
                        Some((current, current_ratio))
                    }
                }
            };
        }
        best.map(|(row, _)| row)
    }

    fn optimize(
        &mut self,
        allow_artificial: bool,
        params: &SimplexParams,
        iterations: &mut u64,
    ) -> Stop {
        let limit = if allow_artificial {
            self.num_cols
        } else {
            self.artificial_start
        };
        loop {
            if params.deadline_passed() {
                return Stop::TimeLimit;
            }
            let Some(entering) =
                (0..limit).find(|&col| self.objective[col] < -params.dual_tolerance)
            else {
                return Stop::Optimal;
            };
            if *iterations >= params.iteration_budget {
                return Stop::IterationLimit;
            }
            let Some(pivot_row) = self.leaving_row(entering) else {
                return Stop::Unbounded;
            };
            self.pivot(pivot_row, entering);
            *iterations += 1;
        }
    }
}

fn substitute(lower: &[f64], upper: &[f64]) -> (Vec<Substitution>, Vec<(usize, f64)>, usize) {
    let mut substitutions = Vec::with_capacity(lower.len());
    let mut ranges = Vec::new();
    let mut num_z = 0;
    for (&l, &u) in lower.iter().zip(upper) {
        let substitution = if l.is_finite() {
            if u.is_finite() {
                ranges.push((num_z, u - l));
            }
            Substitution {
                offset: l,
                terms: vec![(num_z, 1.0)],
            }
        } else if u.is_finite() {
            Substitution {
                offset: u,
                terms: vec![(num_z, -1.0)],
            }
        } else {
            num_z += 1;
            Substitution {
                offset: 0.0,
                terms: vec![(num_z - 1, 1.0), (num_z, -1.0)],
            }
        };
        num_z += 1;
        substitutions.push(substitution);
    }
    (substitutions, ranges, num_z)
}

fn push_row(
    rows: &mut Vec<StandardRow>,
    coeffs: &[f64],
    kind: RowKind,
    rhs: f64,
    origin: Origin,
) {
    let (coeffs, kind, rhs, sign) = if rhs < 0.0 {
        let flipped = match kind {
            RowKind::Le => RowKind::Ge,
            RowKind::Ge => RowKind::Le,
            RowKind::Eq => RowKind::Eq,
        };
        (coeffs.iter().map(|v| -v).collect::<Vec<f64>>(), flipped, -rhs, -1.0)
    } else {
        (coeffs.to_vec(), kind, rhs, 1.0)
    };
    rows.push(StandardRow {
        coeffs,
        kind,
        rhs,
        origin,
        sign,
    });
}

/// Solve the LP relaxation of `lp` with column bounds `lower`/`upper`.
///
/// Integrality is ignored. Bounds at or beyond `infinite_bound` are infinite.
pub(crate) fn solve(lp: &Lp, lower: &[f64], upper: &[f64], params: &SimplexParams) -> SimplexRun {
    let infinite = |v: f64| normalize_infinite(v, params.infinite_bound);
    let lower: Vec<f64> = lower.iter().map(|&v| infinite(v)).collect();
    let upper: Vec<f64> = upper.iter().map(|&v| infinite(v)).collect();
    let row_lower: Vec<f64> = lp.row_lower().iter().map(|&v| infinite(v)).collect();
    let row_upper: Vec<f64> = lp.row_upper().iter().map(|&v| infinite(v)).collect();

    let infeasible = SimplexRun {
        outcome: LpOutcome::Infeasible,
        iterations: 0,
    };
    let crossed = |l: &f64, u: &f64| l > u || *l == f64::INFINITY || *u == f64::NEG_INFINITY;
    if lower.iter().zip(&upper).any(|(l, u)| crossed(l, u))
        || row_lower.iter().zip(&row_upper).any(|(l, u)| crossed(l, u))
    {
        return infeasible;
    }

    let num_row = lp.num_row();
    let (substitutions, ranges, num_z) = substitute(&lower, &upper);

    let mut row_coeffs = vec![vec![0.0; num_z]; num_row];
    let mut row_constant = vec![0.0; num_row];
    for (row, col, value) in lp.matrix().entries() {
        let substitution = &substitutions[col];
        row_constant[row] += value * substitution.offset;
        for &(z, coef) in &substitution.terms {
            row_coeffs[row][z] += value * coef;
        }
    }

    let sense = lp.sense().sign();
    let mut z_cost = vec![0.0; num_z];
    for (substitution, &cost) in substitutions.iter().zip(lp.col_cost()) {
        for &(z, coef) in &substitution.terms {
            z_cost[z] += sense * cost * coef;
        }
    }

    let mut standard = Vec::new();
    for row in 0..num_row {
        let (l, u) = (row_lower[row], row_upper[row]);
        let coeffs = &row_coeffs[row];
        let origin = Origin::Row(row);
        if l == u {
            push_row(&mut standard, coeffs, RowKind::Eq, l - row_constant[row], origin);
            continue;
        }
        if l.is_finite() {
            push_row(&mut standard, coeffs, RowKind::Ge, l - row_constant[row], origin);
        }
        if u.is_finite() {
            push_row(&mut standard, coeffs, RowKind::Le, u - row_constant[row], origin);
        }
    }
    for &(z, width) in &ranges {
        let mut coeffs = vec![0.0; num_z];
        coeffs[z] = 1.0;
        push_row(&mut standard, &coeffs, RowKind::Le, width, Origin::Bound);
    }

    // Column layout: z, then slack/surplus, then artificials.
    let num_slack = standard.iter().filter(|r| r.kind != RowKind::Eq).count();
    let num_artificial = standard.iter().filter(|r| r.kind != RowKind::Le).count();
    let artificial_start = num_z + num_slack;
    let num_cols = artificial_start + num_artificial;

    let mut rows = Vec::with_capacity(standard.len());
    let mut basis = Vec::with_capacity(standard.len());
    let (mut next_slack, mut next_artificial) = (num_z, artificial_start);
    for row in &standard {
        let mut values = row.coeffs.clone();
        values.resize(num_cols + 1, 0.0);
        values[num_cols] = row.rhs;
        match row.kind {
            RowKind::Le => values[next_slack] = 1.0,
            RowKind::Ge => values[next_slack] = -1.0,
            RowKind::Eq => {}
        }
        let basic = if row.kind == RowKind::Le {
            next_slack
        } else {
            values[next_artificial] = 1.0;
            next_artificial += 1;
            next_artificial - 1
        };
        if row.kind != RowKind::Eq {
            next_slack += 1;
        }
        rows.push(values);
        basis.push(basic);
    }
    let unit = basis.clone();

    let mut tableau = Tableau {
        rows,
        objective: Vec::new(),
        basis,
        num_cols,
        artificial_start,
    };
    let mut iterations = 0;
    let stopped = |outcome: LpOutcome, iterations: u64| SimplexRun {
        outcome,
        iterations,
    };

    if num_artificial > 0 {
        let mut phase_one = vec![0.0; num_cols];
        for cost in &mut phase_one[artificial_start..] {
            *cost = 1.0;
        }
        tableau.price(&phase_one);
        match tableau.optimize(true, params, &mut iterations) {
            Stop::IterationLimit => return stopped(LpOutcome::IterationLimit, iterations),
            Stop::TimeLimit => return stopped(LpOutcome::TimeLimit, iterations),
            Stop::Optimal | Stop::Unbounded => {}
        }
        let infeasibility = -tableau.objective[num_cols];
        if infeasibility > params.primal_tolerance {
            return stopped(LpOutcome::Infeasible, iterations);
        }
        for row in 0..tableau.rows.len() {
            if tableau.basis[row] < artificial_start {
                continue;
            }
            if let Some(col) =
                (0..artificial_start).find(|&col| tableau.rows[row][col].abs() > PIVOT_TOLERANCE)
            {
                tableau.pivot(row, col);
            }
        }
    }

    let mut phase_two = z_cost.clone();
    phase_two.resize(num_cols, 0.0);
    tableau.price(&phase_two);
    match tableau.optimize(false, params, &mut iterations) {
        Stop::Optimal => {}
        Stop::Unbounded => return stopped(LpOutcome::Unbounded, iterations),
        Stop::IterationLimit => return stopped(LpOutcome::IterationLimit, iterations),
        Stop::TimeLimit => return stopped(LpOutcome::TimeLimit, iterations),
    }

    let mut z = vec![0.0; num_z];
    let mut is_basic = vec![false; num_cols];
    for (row, &basic) in tableau.basis.iter().enumerate() {
        is_basic[basic] = true;
        if basic < num_z {
            z[basic] = tableau.rhs(row).max(0.0);
        }
    }
    let col_value: Vec<f64> = substitutions
        .iter()
        .map(|s| s.offset + s.terms.iter().map(|&(k, coef)| coef * z[k]).sum::<f64>())
        .collect();
    let row_value = lp.row_activity(&col_value);

    let mut row_dual = vec![0.0; num_row];
    for (index, row) in standard.iter().enumerate() {
        if let Origin::Row(original) = row.origin {
            let multiplier = -tableau.objective[unit[index]];
            row_dual[original] += sense * row.sign * multiplier;
        }
    }
    let mut col_dual = lp.col_cost().to_vec();
    for (row, col, value) in lp.matrix().entries() {
        col_dual[col] -= value * row_dual[row];
    }

    let tolerance = params.primal_tolerance;
    let status_of = |value: f64, l: f64, u: f64, basic: bool| {
        if l.is_finite() && (value - l).abs() <= tolerance {
            BasisStatus::Lower
        } else if u.is_finite() && (value - u).abs() <= tolerance {
            BasisStatus::Upper
        } else if !basic && !l.is_finite() && !u.is_finite() && value.abs() <= tolerance {
            BasisStatus::Zero
        } else {
            BasisStatus::Basic
        }
    };
    let col_status = substitutions
        .iter()
        .enumerate()
        .map(|(col, s)| {
            let basic = s.terms.iter().any(|&(k, _)| is_basic[k]);
            status_of(col_value[col], lower[col], upper[col], basic)
        })
        .collect();
    let row_status = (0..num_row)
        .map(|row| status_of(row_value[row], row_lower[row], row_upper[row], true))
        .collect();

    let objective = lp.objective_value(&col_value);
    stopped(
        LpOutcome::Optimal(LpPoint {
            col_value,
            row_value,
            col_dual,
            row_dual,
            col_status,
            row_status,
            objective,
        }),
        iterations,
    )
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use lpbridge_core::{CscInput, INFINITY, ObjSense};

    fn params() -> SimplexParams {
        SimplexParams {
            infinite_bound: 1e20,
            primal_tolerance: 1e-7,
            dual_tolerance: 1e-7,
            iteration_budget: u64::MAX,
            deadline: None,
        }
    }

    fn build(
        sense: ObjSense,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        rows: &[(f64, f64, Vec<f64>)],
    ) -> Lp {
        let num_col = cost.len();
        let mut a_start = Vec::new();
        let mut a_index = Vec::new();
        let mut a_value = Vec::new();
        for col in 0..num_col {
            a_start.push(a_index.len() as i32);
            for (row, (_, _, coeffs)) in rows.iter().enumerate() {
                if coeffs[col] != 0.0 {
                    a_index.push(row as i32);
                    a_value.push(coeffs[col]);
                }
            }
        }
        let row_lower: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let row_upper: Vec<f64> = rows.iter().map(|r| r.1).collect();
        Lp::from_csc(CscInput {
            num_col,
            num_row: rows.len(),
            sense,
            offset: 0.0,
            col_cost: cost,
            col_lower: lower,
            col_upper: upper,
            row_lower: &row_lower,
            row_upper: &row_upper,
            a_start: &a_start,
            a_index: &a_index,
            a_value: &a_value,
            integrality: &[],
        })
        .unwrap()
    }

    fn optimal(run: SimplexRun) -> LpPoint {
        match run.outcome {
            LpOutcome::Optimal(point) => point,
            other => panic!("expected optimal, got {other:?}"),
        }
    }

    #[test]
    fn solves_ranged_rows_and_column_bounds() {
        let lp = build(
            ObjSense::Minimize,
            &[-1.0, -2.0],
            &[0.0, 0.0],
            &[INFINITY, 6.0],
            &[(3.0, 10.0, vec![1.0, 1.0]), (-4.0, 2.0, vec![1.0, -1.0])],
        );
        let point = optimal(solve(&lp, lp.col_lower(), lp.col_upper(), &params()));
        assert!((point.objective + 16.0).abs() < 1e-9);
        assert!((point.col_value[0] - 4.0).abs() < 1e-9);
        assert!((point.col_value[1] - 6.0).abs() < 1e-9);
        // Reduced costs satisfy c - A^T y.
        assert!((point.row_dual[0] + 1.0).abs() < 1e-9);
        assert!(point.col_dual[0].abs() < 1e-9);
        assert!((point.col_dual[1] + 1.0).abs() < 1e-9);
        assert_eq!(point.col_status[1], BasisStatus::Upper);
        assert_eq!(point.row_status[0], BasisStatus::Upper);
    }

    #[test]
    fn maximization_reports_duals_in_model_sense() {
        let lp = build(
            ObjSense::Maximize,
            &[1.0],
            &[0.0],
            &[INFINITY],
            &[(-INFINITY, 4.0, vec![1.0])],
        );
        let point = optimal(solve(&lp, lp.col_lower(), lp.col_upper(), &params()));
        assert!((point.objective - 4.0).abs() < 1e-9);
        assert!((point.row_dual[0] - 1.0).abs() < 1e-9);
        assert!(point.col_dual[0].abs() < 1e-9);
    }

    #[test]
    fn free_and_mirrored_columns() {
        // min x - y, x free with x >= -3 via row, y <= 5 with no lower bound
        // but y <= x + 1.
        let lp = build(
            ObjSense::Minimize,
            &[1.0, -1.0],
            &[-INFINITY, -INFINITY],
            &[INFINITY, 5.0],
            &[(-3.0, INFINITY, vec![1.0, 0.0]), (-INFINITY, 1.0, vec![-1.0, 1.0])],
        );
        let point = optimal(solve(&lp, lp.col_lower(), lp.col_upper(), &params()));
        // y - x <= 1 bounds the objective at -1.
        assert!((point.objective + 1.0).abs() < 1e-9);
    }

    #[test]
    fn detects_infeasible_and_unbounded() {
        let lp = build(
            ObjSense::Minimize,
            &[1.0],
            &[0.0],
            &[INFINITY],
            &[(-INFINITY, -1.0, vec![1.0])],
        );
        let run = solve(&lp, lp.col_lower(), lp.col_upper(), &params());
        assert!(matches!(run.outcome, LpOutcome::Infeasible));

        let lp = build(
            ObjSense::Minimize,
            &[-1.0],
            &[0.0],
            &[INFINITY],
            &[(0.0, INFINITY, vec![1.0])],
        );
        let run = solve(&lp, lp.col_lower(), lp.col_upper(), &params());
        assert!(matches!(run.outcome, LpOutcome::Unbounded));
    }

    #[test]
    fn crossed_bounds_are_infeasible() {
        let lp = build(ObjSense::Minimize, &[1.0], &[2.0], &[1.0], &[]);
        let run = solve(&lp, lp.col_lower(), lp.col_upper(), &params());
        assert!(matches!(run.outcome, LpOutcome::Infeasible));
        assert_eq!(run.iterations, 0);
    }

    #[test]
    fn iteration_budget_stops_the_solve() {
        let lp = build(
            ObjSense::Minimize,
            &[-1.0, -2.0],
            &[0.0, 0.0],
            &[INFINITY, 6.0],
            &[(3.0, 10.0, vec![1.0, 1.0]), (-4.0, 2.0, vec![1.0, -1.0])],
        );
        let limited = SimplexParams {
            iteration_budget: 0,
            ..params()
        };
        let run = solve(&lp, lp.col_lower(), lp.col_upper(), &limited);
        assert!(matches!(run.outcome, LpOutcome::IterationLimit));
        assert_eq!(run.iterations, 0);
    }

    #[test]
    fn expired_deadline_stops_the_solve() {
        let lp = build(ObjSense::Minimize, &[1.0], &[0.0], &[1.0], &[]);
        let expired = SimplexParams {
            deadline: Some(Instant::now()),
            ..params()
        };
        let run = solve(&lp, lp.col_lower(), lp.col_upper(), &expired);
        assert!(matches!(run.outcome, LpOutcome::TimeLimit));
    }
}
