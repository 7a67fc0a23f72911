use lpbridge_highs::{BridgeError, Highs, INFINITY, MAX_RETAINED_WARNINGS, ObjSense, VarType};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Three free-standing columns with no rows.
fn three_columns() -> Highs {
    let mut highs = Highs::new();
    highs.set_option_value("output_flag", false).unwrap();
    highs
        .add_vars(3, &[0.0f64, 0.0, 0.0], &[10.0f64, 10.0, 10.0])
        .unwrap();
    highs
}

#[test]
fn test_add_rows_reflects_counts_and_order() {
    init_tracing();
    let mut highs = three_columns();
    // Row 0: x0 + 2 x2; row 1: empty; row 2: 3 x1.
    highs
        .add_rows(
            3,
            &[-INFINITY, 0.0, 1.0],
            &[4.0f64, 0.0, 2.0],
            3,
            &[0i32, 2, 2, 3],
            &[0i32, 2, 1],
            &[1.0f64, 2.0, 3.0],
        )
        .unwrap();
    assert_eq!(highs.num_row(), 3);
    assert_eq!(highs.num_nz(), 3);

    let lp = highs.lp().into_owned();
    assert_eq!(lp.matrix().get(0, 0), Some(1.0));
    assert_eq!(lp.matrix().get(0, 2), Some(2.0));
    assert_eq!(lp.matrix().get(1, 1), None);
    assert_eq!(lp.matrix().get(2, 1), Some(3.0));
    assert_eq!(lp.row_lower(), &[-INFINITY, 0.0, 1.0]);
    assert_eq!(lp.row_upper(), &[4.0, 0.0, 2.0]);
}

#[test]
fn test_invalid_sparse_layouts_leave_model_untouched() {
    init_tracing();
    let mut highs = three_columns();
    let cases: [(&[i32], &[i32], &[f64], usize); 6] = [
        // starts[0] != 0
        (&[1, 2], &[0, 1], &[1.0, 1.0], 2),
        // terminator disagrees with the nonzero count
        (&[0, 2, 1], &[0, 1, 2], &[1.0, 1.0, 1.0], 3),
        // start beyond the nonzero count
        (&[0, 3], &[0, 1], &[1.0, 1.0], 2),
        // inner index out of range
        (&[0, 1], &[0, 3], &[1.0, 1.0], 2),
        // duplicate index within one row
        (&[0, 2], &[1, 1, 0], &[1.0, 1.0, 1.0], 3),
        // values shorter than nz
        (&[0, 1], &[0, 1], &[1.0], 2),
    ];
    for (starts, indices, values, nz) in cases {
        let err = highs
            .add_rows(
                2,
                &[0.0f64, 0.0],
                &[1.0f64, 1.0],
                nz,
                starts,
                indices,
                values,
            )
            .unwrap_err();
        assert_eq!(err.code(), "SPARSE_INVALID_LAYOUT", "case {starts:?}");
        assert_eq!(highs.num_row(), 0);
        assert_eq!(highs.num_nz(), 0);
    }
}

#[test]
fn test_starts_with_terminator_are_accepted() {
    let mut highs = three_columns();
    highs
        .add_rows(
            2,
            &[0.0f64, 0.0],
            &[1.0f64, 1.0],
            2,
            &[0i32, 1, 2],
            &[0i32, 1],
            &[1.0f64, 1.0],
        )
        .unwrap();
    assert_eq!(highs.num_nz(), 2);
}

#[test]
fn test_plural_arity_is_checked_for_every_array() {
    let mut highs = three_columns();
    let err = highs
        .change_cols_bounds(2, &[0i32, 1], &[0.0f64, 0.0], &[1.0f64])
        .unwrap_err();
    assert_eq!(
        err,
        BridgeError::ArityMismatch {
            operation: "changing variable bounds",
            argument: "upper",
            expected: 2,
            found: 1,
        }
    );
    assert_eq!(highs.lp().col_upper(), &[10.0, 10.0, 10.0]);
}

#[test]
fn test_delete_rows_renumbers_survivors_in_order() {
    init_tracing();
    let mut highs = three_columns();
    // Row r holds the single entry (r, r % 3) with value r + 1.
    for row in 0..5i32 {
        highs
            .add_row(
                f64::from(row),
                INFINITY,
                1,
                &[row % 3],
                &[f64::from(row + 1)],
            )
            .unwrap();
    }
    // Duplicates are dropped: {1, 3} removes two rows.
    highs.delete_rows(3, &[3i32, 1, 3]).unwrap();
    assert_eq!(highs.num_row(), 3);
    assert_eq!(highs.num_nz(), 3);

    let lp = highs.lp().into_owned();
    assert_eq!(lp.row_lower(), &[0.0, 2.0, 4.0]);
    assert_eq!(lp.matrix().get(0, 0), Some(1.0));
    assert_eq!(lp.matrix().get(1, 2), Some(3.0));
    assert_eq!(lp.matrix().get(2, 1), Some(5.0));
    assert!(lp.matrix().entries().all(|(row, _, _)| row < 3));
}

#[test]
fn test_delete_vars_drops_their_entries() {
    let mut highs = three_columns();
    highs
        .add_row(0.0, 1.0, 3, &[0i32, 1, 2], &[1.0f64, 2.0, 3.0])
        .unwrap();
    highs.delete_vars(1, &[1i32]).unwrap();
    let lp = highs.lp().into_owned();
    assert_eq!(lp.num_col(), 2);
    assert_eq!(lp.matrix().get(0, 0), Some(1.0));
    assert_eq!(lp.matrix().get(0, 1), Some(3.0));
}

#[test]
fn test_out_of_range_index_is_engine_error() {
    init_tracing();
    let mut highs = three_columns();
    let err = highs.change_col_cost(7, 1.0).unwrap_err();
    assert!(err.is_engine_error());
    assert!(
        err.to_string()
            .contains("Error when changing objective coefficient"),
        "unexpected message: {err}"
    );
    assert_eq!(highs.lp().col_cost(), &[0.0, 0.0, 0.0]);

    let err = highs.delete_rows(1, &[0i32]).unwrap_err();
    match err {
        BridgeError::EngineError { operation, message } => {
            assert_eq!(operation, "deleting rows");
            assert!(message.is_some());
        }
        other => panic!("expected engine error, got {other}"),
    }
}

#[test]
fn test_inconsistent_bounds_warn_but_apply() {
    init_tracing();
    let mut highs = three_columns();
    highs.change_col_bounds(0, 3.0, 2.0).unwrap();
    assert_eq!(highs.lp().col_lower()[0], 3.0);
    let warnings = highs.take_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].operation, "changing variable bounds");
    assert!(
        warnings[0]
            .message
            .as_deref()
            .unwrap_or_default()
            .contains("inconsistent bounds")
    );
    assert!(highs.warnings().is_empty());
}

#[test]
fn test_repeated_warnings_keep_a_bounded_history() {
    init_tracing();
    let mut highs = three_columns();
    for _ in 0..1000 {
        highs.change_col_bounds(0, 2.0, 1.0).unwrap();
    }
    assert_eq!(highs.warnings().len(), MAX_RETAINED_WARNINGS);
    assert_eq!(highs.warning_count(), 1000);

    let before = highs.warning_count();
    highs.change_col_bounds(0, 0.0, 1.0).unwrap();
    assert_eq!(highs.warning_count(), before);
}

#[test]
fn test_change_coeff_overwrites_inserts_and_removes() {
    let mut highs = three_columns();
    highs
        .add_row(0.0, 1.0, 1, &[0i32], &[1.0f64])
        .unwrap();
    highs.change_coeff(0, 0, 4.0).unwrap();
    highs.change_coeff(0, 2, 2.0).unwrap();
    assert_eq!(highs.num_nz(), 2);
    assert_eq!(highs.num_row(), 1);
    assert_eq!(highs.lp().matrix().get(0, 0), Some(4.0));

    highs.change_coeff(0, 0, 0.0).unwrap();
    assert_eq!(highs.num_nz(), 1);
    assert_eq!(highs.lp().matrix().get(0, 0), None);
}

#[test]
fn test_integrality_objective_and_sense_changes() {
    let mut highs = three_columns();
    highs
        .change_cols_integrality(2, &[0i32, 2], &[1u8, 1])
        .unwrap();
    assert_eq!(
        highs.lp().integrality(),
        &[VarType::Integer, VarType::Continuous, VarType::Integer]
    );
    highs.change_col_integrality(2, VarType::Continuous).unwrap();
    assert!(!highs.lp().integrality()[2].is_integer());

    highs
        .change_cols_cost(3, &[0i32, 1, 2], &[1.0f64, 2.0, 3.0])
        .unwrap();
    assert_eq!(highs.lp().col_cost(), &[1.0, 2.0, 3.0]);

    highs.change_objective_sense(ObjSense::Maximize).unwrap();
    highs.change_objective_offset(1.5).unwrap();
    assert_eq!(highs.get_objective_sense(), ObjSense::Maximize);
    assert_eq!(highs.get_objective_offset(), 1.5);

    highs
        .add_row(-INFINITY, 5.0, 2, &[0i32, 1], &[1.0f64, 1.0])
        .unwrap();
    highs.change_row_bounds(0, 1.0, 4.0).unwrap();
    highs
        .change_rows_bounds(1, &[0i32], &[2.0f64], &[3.0f64])
        .unwrap();
    assert_eq!(highs.lp().row_lower(), &[2.0]);
    assert_eq!(highs.lp().row_upper(), &[3.0]);
}

#[test]
fn test_clear_model_is_idempotent() {
    let mut highs = three_columns();
    highs.set_option_value("time_limit", 5.0).unwrap();
    highs.clear_model().unwrap();
    highs.clear_model().unwrap();
    assert_eq!(highs.num_col(), 0);
    assert_eq!(highs.num_row(), 0);
    assert_eq!(highs.num_nz(), 0);
    // Options survive clear_model but not clear.
    assert_eq!(
        highs.get_option_value("time_limit").unwrap().as_double(),
        Some(5.0)
    );
    highs.clear().unwrap();
    assert_eq!(
        highs.get_option_value("time_limit").unwrap().as_double(),
        Some(INFINITY)
    );
}

#[test]
fn test_clear_solver_keeps_model() {
    let mut highs = three_columns();
    highs.change_cols_cost(1, &[0i32], &[1.0f64]).unwrap();
    highs.run().unwrap();
    assert!(highs.solution().value_valid());
    highs.clear_solver().unwrap();
    assert!(!highs.solution().value_valid());
    assert!(!highs.info().valid);
    assert_eq!(highs.num_col(), 3);
}
