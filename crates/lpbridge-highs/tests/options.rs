use lpbridge_highs::{
    BridgeError, Engine, Highs, INFINITY, OptionType, OptionValue, SolverConfig,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn test_each_option_type_round_trips() {
    init_tracing();
    let mut highs = Highs::new();
    let cases = [
        ("output_flag", OptionValue::Bool(false)),
        ("threads", OptionValue::Int(4)),
        ("time_limit", OptionValue::Double(12.5)),
        ("presolve", OptionValue::from("off")),
    ];
    for (name, value) in cases {
        assert_eq!(highs.get_option_type(name).unwrap(), value.option_type());
        highs.set_option_value(name, value.clone()).unwrap();
        assert_eq!(highs.get_option_value(name).unwrap(), value, "option {name}");
    }
    assert!(highs.warnings().is_empty());
}

#[test]
fn test_unknown_option_is_rejected_by_every_accessor() {
    let mut highs = Highs::new();
    for err in [
        highs.get_option_type("no_such_option").unwrap_err(),
        highs.get_option_value("no_such_option").unwrap_err(),
        highs.set_option_value("no_such_option", 1).unwrap_err(),
    ] {
        assert_eq!(
            err,
            BridgeError::UnknownOption {
                name: "no_such_option".to_string()
            }
        );
    }
}

#[test]
fn test_type_mismatch_leaves_value_unchanged() {
    let mut highs = Highs::new();
    let err = highs.set_option_value("time_limit", "soon").unwrap_err();
    assert_eq!(
        err,
        BridgeError::OptionTypeMismatch {
            name: "time_limit".to_string(),
            declared: OptionType::Double,
            requested: OptionType::String,
        }
    );
    assert_eq!(err.code(), "OPTION_TYPE_MISMATCH");
    // An integer is not silently widened to a double.
    assert!(highs.set_option_value("time_limit", 10).is_err());
    assert!(
        highs
            .get_option_value("time_limit")
            .unwrap()
            .as_double()
            .unwrap()
            .is_infinite()
    );
}

#[test]
fn test_out_of_range_values_are_engine_errors() {
    init_tracing();
    let mut highs = Highs::new();
    let err = highs.set_option_value("log_dev_level", 9).unwrap_err();
    assert!(err.is_engine_error());
    assert!(
        err.to_string()
            .starts_with("[ENGINE_ERROR] Error when setting option log_dev_level"),
        "unexpected message: {err}"
    );
    assert_eq!(
        highs.get_option_value("log_dev_level").unwrap(),
        OptionValue::Int(0)
    );

    let err = highs.set_option_value("presolve", "maybe").unwrap_err();
    assert!(err.is_engine_error());
    assert_eq!(
        highs.get_option_value("presolve").unwrap().as_str(),
        Some("choose")
    );

    assert!(highs.set_option_value("time_limit", -1.0).is_err());
}

#[test]
fn test_reset_options_restores_defaults_and_keeps_model() {
    let mut highs = Highs::new();
    highs.add_var(0.0, 1.0).unwrap();
    highs.set_option_value("mip_rel_gap", 0.5).unwrap();
    highs.set_option_value("solver", "ipm").unwrap();
    highs.reset_options().unwrap();
    assert_eq!(
        highs.get_option_value("mip_rel_gap").unwrap().as_double(),
        Some(1e-4)
    );
    assert_eq!(
        highs.get_option_value("solver").unwrap().as_str(),
        Some("choose")
    );
    assert_eq!(highs.num_col(), 1);
}

#[test]
fn test_apply_config_sets_mapped_options() {
    init_tracing();
    let mut highs = Highs::new();
    let config = SolverConfig::new()
        .with_time_limit(30.0)
        .with_mip_gap(0.01)
        .with_presolve(false)
        .with_verbosity(0)
        .with_threads(2)
        .with_tolerance(1e-6);
    highs.apply_config(&config).unwrap();

    let value = |highs: &Highs, name: &str| highs.get_option_value(name).unwrap();
    assert_eq!(value(&highs, "time_limit"), OptionValue::Double(30.0));
    assert_eq!(value(&highs, "mip_rel_gap"), OptionValue::Double(0.01));
    assert_eq!(value(&highs, "presolve"), OptionValue::from("off"));
    assert_eq!(value(&highs, "output_flag"), OptionValue::Bool(false));
    assert_eq!(value(&highs, "threads"), OptionValue::Int(2));
    assert_eq!(
        value(&highs, "primal_feasibility_tolerance"),
        OptionValue::Double(1e-6)
    );
    assert_eq!(
        value(&highs, "dual_feasibility_tolerance"),
        OptionValue::Double(1e-6)
    );
}

#[test]
fn test_apply_config_rejected_first_option_changes_nothing() {
    let mut highs = Highs::new();
    let config = SolverConfig::new().with_time_limit(-5.0).with_threads(3);
    assert!(highs.apply_config(&config).is_err());
    assert_eq!(
        highs.get_option_value("threads").unwrap(),
        OptionValue::Int(0)
    );
}

#[test]
fn test_apply_config_rolls_back_options_written_before_rejection() {
    init_tracing();
    let mut highs = Highs::new();
    highs.set_option_value("mip_rel_gap", 0.02).unwrap();
    let config = SolverConfig::new()
        .with_time_limit(10.0)
        .with_mip_gap(0.5)
        .with_tolerance(1e-12);

    let err = highs.apply_config(&config).unwrap_err();
    assert!(err.is_engine_error());
    assert_eq!(
        highs.get_option_value("time_limit").unwrap(),
        OptionValue::Double(INFINITY)
    );
    assert_eq!(
        highs.get_option_value("mip_rel_gap").unwrap(),
        OptionValue::Double(0.02)
    );
    assert_eq!(
        highs.get_option_value("primal_feasibility_tolerance").unwrap(),
        OptionValue::Double(1e-7)
    );
}

#[test]
fn test_options_json_reflects_current_values() {
    let mut highs = Highs::new();
    highs.set_option_value("random_seed", 7).unwrap();
    let json = highs.options_json().unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), highs.engine().option_names().len());
    assert!(object.contains_key("presolve"));
    assert!(object.contains_key("log_file"));
    assert_eq!(object["random_seed"].to_string(), "7");
}
