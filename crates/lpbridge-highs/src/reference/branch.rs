//! Depth-first branch-and-bound over the simplex relaxation.

use lpbridge_core::Lp;

use super::simplex::{self, LpOutcome, SimplexParams};

const ABSOLUTE_GAP: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub(crate) struct MipParams {
    pub relaxation: SimplexParams,
    pub integrality_tolerance: f64,
    pub relative_gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MipStop {
    Optimal,
    Infeasible,
    UnboundedOrInfeasible,
    IterationLimit,
    TimeLimit,
}

#[derive(Debug, Clone)]
pub(crate) struct Incumbent {
    pub col_value: Vec<f64>,
    pub objective: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct MipRun {
    pub stop: MipStop,
    pub incumbent: Option<Incumbent>,
    /// Best proven bound in the model's sense.
    pub dual_bound: f64,
    pub nodes: i64,
    pub iterations: u64,
}

struct Node {
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// Parent relaxation value, minimization form.
    bound: f64,
}

fn allowance(best: f64, relative_gap: f64) -> f64 {
    (relative_gap * best.abs()).max(ABSOLUTE_GAP)
}

/// Relative gap between a primal value and a dual bound.
pub(crate) fn relative_gap(primal: f64, dual: f64) -> f64 {
    let difference = (primal - dual).abs();
    if difference <= f64::EPSILON {
        0.0
    } else if primal == 0.0 {
        f64::INFINITY
    } else {
        difference / primal.abs()
    }
}

/// Solve `lp` honouring the integrality of its columns.
pub(crate) fn solve(lp: &Lp, params: &MipParams) -> MipRun {
    let sense = lp.sense().sign();
    let tolerance = params.integrality_tolerance;
    let integer: Vec<bool> = lp.integrality().iter().map(|kind| kind.is_integer()).collect();

    let mut lower = lp.col_lower().to_vec();
    let mut upper = lp.col_upper().to_vec();
    for (col, _) in integer.iter().enumerate().filter(|(_, is_integer)| **is_integer) {
        lower[col] = (lower[col] - tolerance).ceil();
        upper[col] = (upper[col] + tolerance).floor();
    }

    let mut stack = vec![Node {
        lower,
        upper,
        bound: f64::NEG_INFINITY,
    }];
    let mut incumbent: Option<Incumbent> = None;
    let mut best = f64::INFINITY;
    let mut pruned = f64::INFINITY;
    let mut nodes = 0;
    let mut iterations = 0;
    let mut stop = None;

    while let Some(node) = stack.pop() {
        if incumbent.is_some() && node.bound >= best - allowance(best, params.relative_gap) {
            pruned = pruned.min(node.bound);
            continue;
        }
        if params.relaxation.deadline_passed() {
            stack.push(node);
            stop = Some(MipStop::TimeLimit);
            break;
        }
        let relaxation = SimplexParams {
            iteration_budget: params
                .relaxation
                .iteration_budget
                .saturating_sub(iterations),
            ..params.relaxation
        };
        let run = simplex::solve(lp, &node.lower, &node.upper, &relaxation);
        iterations += run.iterations;
        nodes += 1;

        let point = match run.outcome {
            LpOutcome::Optimal(point) => point,
            LpOutcome::Infeasible => continue,
            // A restriction of a bounded relaxation stays bounded, so this
            // can only come from the root.
            LpOutcome::Unbounded => {
                stop = Some(MipStop::UnboundedOrInfeasible);
                break;
            }
            LpOutcome::IterationLimit => {
                stack.push(node);
                stop = Some(MipStop::IterationLimit);
                break;
            }
            LpOutcome::TimeLimit => {
                stack.push(node);
                stop = Some(MipStop::TimeLimit);
                break;
            }
        };

        let value = sense * point.objective;
        if incumbent.is_some() && value >= best - allowance(best, params.relative_gap) {
            pruned = pruned.min(value);
            continue;
        }
        let fractional = integer.iter().enumerate().find_map(|(col, &is_integer)| {
            let x = point.col_value[col];
            (is_integer && (x - x.round()).abs() > tolerance).then_some((col, x))
        });
        match fractional {
            None => {
                let mut col_value = point.col_value;
                for (x, _) in col_value.iter_mut().zip(&integer).filter(|(_, i)| **i) {
                    *x = x.round();
                }
                let objective = lp.objective_value(&col_value);
                best = sense * objective;
                incumbent = Some(Incumbent {
                    col_value,
                    objective,
                });
            }
            Some((col, x)) => {
                let mut up = Node {
                    lower: node.lower.clone(),
                    upper: node.upper.clone(),
                    bound: value,
                };
                up.lower[col] = x.ceil();
                let mut down = node;
                down.upper[col] = x.floor();
                down.bound = value;
                stack.push(up);
                stack.push(down);
            }
        }
    }

    let open = stack.iter().map(|node| node.bound).fold(pruned, f64::min);
    let dual_bound = open.min(best);
    let stop = stop.unwrap_or(if incumbent.is_some() {
        MipStop::Optimal
    } else {
        MipStop::Infeasible
    });
    MipRun {
        stop,
        incumbent,
        dual_bound: sense * dual_bound,
        nodes,
        iterations,
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use lpbridge_core::{CscInput, INFINITY, ObjSense, VarType};

    fn params() -> MipParams {
        MipParams {
            relaxation: SimplexParams {
                infinite_bound: 1e20,
                primal_tolerance: 1e-7,
                dual_tolerance: 1e-7,
                iteration_budget: u64::MAX,
                deadline: None,
            },
            integrality_tolerance: 1e-6,
            relative_gap: 1e-4,
        }
    }

    /// max 5x + 4y s.t. 6x + 4y <= 24, x + 2y <= 6, x, y >= 0 integer.
    fn knapsack() -> Lp {
        Lp::from_csc(CscInput {
            num_col: 2,
            num_row: 2,
            sense: ObjSense::Maximize,
            offset: 0.0,
            col_cost: &[5.0, 4.0],
            col_lower: &[0.0, 0.0],
            col_upper: &[INFINITY, INFINITY],
            row_lower: &[-INFINITY, -INFINITY],
            row_upper: &[24.0, 6.0],
            a_start: &[0, 2],
            a_index: &[0, 1, 0, 1],
            a_value: &[6.0, 1.0, 4.0, 2.0],
            integrality: &[VarType::Integer, VarType::Integer],
        })
        .unwrap()
    }

    #[test]
    fn finds_integer_optimum_below_relaxation() {
        let run = solve(&knapsack(), &params());
        assert_eq!(run.stop, MipStop::Optimal);
        let incumbent = run.incumbent.unwrap();
        assert!((incumbent.objective - 20.0).abs() < 1e-9);
        assert!((incumbent.col_value[0] - 4.0).abs() < 1e-9);
        assert!(incumbent.col_value[1].abs() < 1e-9);
        assert!(run.nodes > 1);
        assert!(relative_gap(incumbent.objective, run.dual_bound) <= 1e-4);
    }

    #[test]
    fn integer_bounds_without_integer_points_are_infeasible() {
        let lp = Lp::from_csc(CscInput {
            num_col: 1,
            num_row: 0,
            sense: ObjSense::Minimize,
            offset: 0.0,
            col_cost: &[1.0],
            col_lower: &[0.2],
            col_upper: &[0.8],
            row_lower: &[],
            row_upper: &[],
            a_start: &[0],
            a_index: &[],
            a_value: &[],
            integrality: &[VarType::Integer],
        })
        .unwrap();
        let run = solve(&lp, &params());
        assert_eq!(run.stop, MipStop::Infeasible);
        assert!(run.incumbent.is_none());
    }

    #[test]
    fn iteration_budget_interrupts_search() {
        let mut limited = params();
        limited.relaxation.iteration_budget = 0;
        let run = solve(&knapsack(), &limited);
        assert_eq!(run.stop, MipStop::IterationLimit);
        assert!(run.incumbent.is_none());
        assert_eq!(run.dual_bound, f64::INFINITY);
    }

    #[test]
    fn gap_of_equal_values_is_zero() {
        assert_eq!(relative_gap(3.0, 3.0), 0.0);
        assert_eq!(relative_gap(0.0, -1.0), f64::INFINITY);
        assert!((relative_gap(10.0, 9.0) - 0.1).abs() < 1e-12);
    }
}
