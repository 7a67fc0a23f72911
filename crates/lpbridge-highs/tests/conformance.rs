//! End-to-end scenarios: build a model through the public API, run it, and
//! compare against hand-verified optima.

use lpbridge_highs::{BasisStatus, CallStatus, Highs, INFINITY, ModelStatus, OptionValue};

const TOLERANCE: f64 = 1e-4;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// min -x - 2y s.t. 3 <= x + y <= 10, -4 <= x - y <= 2, x >= 0, 0 <= y <= 6.
fn scenario_a() -> Highs {
    let mut highs = Highs::new();
    highs.set_option_value("output_flag", false).unwrap();
    highs
        .add_cols(
            2,
            &[-1.0f64, -2.0],
            &[0.0f64, 0.0],
            &[INFINITY, 6.0],
            0,
            &[] as &[i32],
            &[] as &[i32],
            &[] as &[f64],
        )
        .unwrap();
    highs
        .add_rows(
            2,
            &[3.0f64, -4.0],
            &[10.0f64, 2.0],
            4,
            &[0i32, 2],
            &[0i32, 1, 0, 1],
            &[1.0f64, 1.0, 1.0, -1.0],
        )
        .unwrap();
    highs
}

#[test]
fn test_scenario_a_continuous_lp() {
    init_tracing();
    let mut highs = scenario_a();
    assert_eq!(highs.num_col(), 2);
    assert_eq!(highs.num_row(), 2);
    assert_eq!(highs.num_nz(), 4);

    let status = highs.run().unwrap();
    assert_eq!(status, CallStatus::Ok);
    assert_eq!(highs.model_status(), ModelStatus::Optimal);
    assert!(
        (highs.objective_value() + 16.0).abs() < TOLERANCE,
        "Expected objective -16, got {}",
        highs.objective_value()
    );

    let solution = highs.solution();
    let col_value = solution.col_value().unwrap();
    assert!((col_value[0] - 4.0).abs() < TOLERANCE);
    assert!((col_value[1] - 6.0).abs() < TOLERANCE);
    let row_value = solution.row_value().unwrap();
    assert!((row_value[0] - 10.0).abs() < TOLERANCE);
    assert!((row_value[1] + 2.0).abs() < TOLERANCE);

    let row_dual = solution.row_dual().unwrap();
    assert!((row_dual[0] + 1.0).abs() < TOLERANCE);
    assert!(row_dual[1].abs() < TOLERANCE);

    let basis = highs.basis();
    assert!(basis.valid());
    assert_eq!(basis.col_status().unwrap()[1], BasisStatus::Upper);
    assert!(highs.info().valid);
    assert_eq!(highs.info().num_primal_infeasibilities, 0);
    assert!(highs.warnings().is_empty());
}

/// min x + 2y + 3z s.t. x + y >= 2, y + z >= 3, x + z >= 4, x, y, z >= 0.
///
/// The dual point (0, 2, 1) certifies the optimum 10.
fn scenario_b() -> Highs {
    let mut highs = Highs::new();
    highs.set_option_value("output_flag", false).unwrap();
    for cost in [1.0, 2.0, 3.0] {
        highs
            .add_col(cost, 0.0, INFINITY, 0, &[] as &[i32], &[] as &[f64])
            .unwrap();
    }
    highs.add_row(2.0, INFINITY, 2, &[0i32, 1], &[1.0f64, 1.0]).unwrap();
    highs.add_row(3.0, INFINITY, 2, &[1i32, 2], &[1.0f64, 1.0]).unwrap();
    highs.add_row(4.0, INFINITY, 2, &[0i32, 2], &[1.0f64, 1.0]).unwrap();
    highs
}

/// Select the first-order solver with presolve off.
fn use_pdlp_without_presolve(highs: &mut Highs) {
    highs.set_option_value("solver", "pdlp").unwrap();
    highs.set_option_value("presolve", "off").unwrap();
}

#[test]
fn test_scenario_b_three_variable_lp() {
    init_tracing();
    let mut highs = scenario_b();

    highs.run().unwrap();
    assert_eq!(highs.model_status(), ModelStatus::Optimal);
    assert!(
        (highs.objective_value() - 10.0).abs() < TOLERANCE,
        "Expected objective 10, got {}",
        highs.objective_value()
    );

    let row_value = highs.solution().row_value().unwrap();
    assert!(row_value[0] >= 2.0 - TOLERANCE);
    assert!(row_value[1] >= 3.0 - TOLERANCE);
    assert!(row_value[2] >= 4.0 - TOLERANCE);
}

#[test]
fn test_scenario_c_add_then_delete_var() {
    init_tracing();
    let mut highs = scenario_a();
    let before_cols = highs.num_col();
    let before_nz = highs.num_nz();

    highs.add_var(0.0, INFINITY).unwrap();
    let added = highs.num_col() - 1;
    highs.change_coeff(0, added, 5.0).unwrap();
    assert_eq!(highs.num_nz(), before_nz + 1);

    highs.delete_vars(1, &[added as i32]).unwrap();
    assert_eq!(highs.num_col(), before_cols);
    assert_eq!(highs.num_nz(), before_nz);
    assert!(
        highs
            .lp()
            .matrix()
            .entries()
            .all(|(_, col, _)| col < before_cols)
    );

    highs.run().unwrap();
    assert!((highs.objective_value() + 16.0).abs() < TOLERANCE);
}

#[test]
fn test_scenario_a_matches_after_clear_model_and_rebuild() {
    init_tracing();
    let mut highs = scenario_a();
    highs.run().unwrap();
    let first = highs.objective_value();

    let lp = highs.lp().into_owned();
    highs.clear_model().unwrap();
    assert_eq!(highs.num_col(), 0);
    highs.pass_model(&lp).unwrap();
    highs.run().unwrap();
    assert!((highs.objective_value() - first).abs() < TOLERANCE);
}

#[test]
fn test_scenarios_with_pdlp_and_presolve_off() {
    init_tracing();
    for (mut highs, expected) in [(scenario_a(), -16.0), (scenario_b(), 10.0)] {
        use_pdlp_without_presolve(&mut highs);

        let status = highs.run().unwrap();
        assert_eq!(status, CallStatus::Ok);
        assert_eq!(highs.model_status(), ModelStatus::Optimal);
        assert!(
            (highs.objective_value() - expected).abs() < TOLERANCE,
            "Expected objective {expected}, got {}",
            highs.objective_value()
        );
        assert!(highs.warnings().is_empty());
        assert_eq!(
            highs.get_option_value("solver").unwrap(),
            OptionValue::from("pdlp")
        );
        assert_eq!(
            highs.get_option_value("presolve").unwrap(),
            OptionValue::from("off")
        );
    }
}
