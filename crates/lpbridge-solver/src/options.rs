//! Typed option registry.
//!
//! Each option is registered once with a name, a declared type, a default,
//! and a numeric range or list of allowed strings. Reads and writes with a
//! type other than the declared one fail; values are never coerced.

use std::collections::BTreeMap;

use lpbridge_core::{HighsInt, INFINITY, OptionType, OptionValue};

/// Declared type, default, and admissible values of an option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionSpec {
    Bool {
        default: bool,
    },
    Int {
        default: HighsInt,
        min: HighsInt,
        max: HighsInt,
    },
    Double {
        default: f64,
        min: f64,
        max: f64,
    },
    /// An empty `allowed` list accepts any string.
    String {
        default: &'static str,
        allowed: &'static [&'static str],
    },
}

impl OptionSpec {
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionSpec::Bool { .. } => OptionType::Bool,
            OptionSpec::Int { .. } => OptionType::Int,
            OptionSpec::Double { .. } => OptionType::Double,
            OptionSpec::String { .. } => OptionType::String,
        }
    }

    pub fn default_value(&self) -> OptionValue {
        match self {
            OptionSpec::Bool { default } => OptionValue::Bool(*default),
            OptionSpec::Int { default, .. } => OptionValue::Int(*default),
            OptionSpec::Double { default, .. } => OptionValue::Double(*default),
            OptionSpec::String { default, .. } => OptionValue::String((*default).to_string()),
        }
    }
}

/// Errors raised by the option registry.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionError {
    Unknown {
        name: String,
    },
    WrongType {
        name: String,
        declared: OptionType,
        requested: OptionType,
    },
    OutOfRange {
        name: String,
        value: String,
        min: String,
        max: String,
    },
    NotAllowed {
        name: String,
        value: String,
        allowed: &'static [&'static str],
    },
    Duplicate {
        name: &'static str,
    },
}

impl OptionError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            OptionError::Unknown { .. } => "OPTION_UNKNOWN",
            OptionError::WrongType { .. } => "OPTION_WRONG_TYPE",
            OptionError::OutOfRange { .. } => "OPTION_OUT_OF_RANGE",
            OptionError::NotAllowed { .. } => "OPTION_NOT_ALLOWED",
            OptionError::Duplicate { .. } => "OPTION_DUPLICATE",
        }
    }
}

impl std::fmt::Display for OptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionError::Unknown { name } => {
                write!(f, "[{}] No option named '{}'", self.code(), name)
            }
            OptionError::WrongType {
                name,
                declared,
                requested,
            } => write!(
                f,
                "[{}] Option '{}' has type {}, not {}",
                self.code(),
                name,
                declared,
                requested
            ),
            OptionError::OutOfRange {
                name,
                value,
                min,
                max,
            } => write!(
                f,
                "[{}] Value {} for option '{}' is outside [{}, {}]",
                self.code(),
                value,
                name,
                min,
                max
            ),
            OptionError::NotAllowed {
                name,
                value,
                allowed,
            } => write!(
                f,
                "[{}] Value '{}' for option '{}' is not one of {}",
                self.code(),
                value,
                name,
                allowed.join(", ")
            ),
            OptionError::Duplicate { name } => {
                write!(f, "[{}] Option '{}' is already registered", self.code(), name)
            }
        }
    }
}

impl std::error::Error for OptionError {}

/// A registered option and its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionRecord {
    name: &'static str,
    description: &'static str,
    spec: OptionSpec,
    value: OptionValue,
}

impl OptionRecord {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn spec(&self) -> &OptionSpec {
        &self.spec
    }

    pub fn option_type(&self) -> OptionType {
        self.spec.option_type()
    }

    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    pub fn is_default(&self) -> bool {
        self.value == self.spec.default_value()
    }
}

const ON_OFF_CHOOSE: &[&str] = &["off", "choose", "on"];
const SOLVERS: &[&str] = &["choose", "simplex", "ipm", "pdlp"];

/// Option store keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionRegistry {
    records: BTreeMap<&'static str, OptionRecord>,
}

impl OptionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The option set registered by the engines, at their defaults.
    ///
    /// The reference engine checks and stores `presolve`, `solver`,
    /// `parallel`, `threads` and `random_seed` without its solve depending
    /// on them.
    pub fn with_defaults() -> Self {
        let entries: [(&'static str, &'static str, OptionSpec); 17] = [
            (
                "presolve",
                "Presolve option: \"off\", \"choose\" or \"on\"",
                OptionSpec::String {
                    default: "choose",
                    allowed: ON_OFF_CHOOSE,
                },
            ),
            (
                "solver",
                "Solver option: \"simplex\", \"choose\", \"ipm\" or \"pdlp\"",
                OptionSpec::String {
                    default: "choose",
                    allowed: SOLVERS,
                },
            ),
            (
                "parallel",
                "Parallel option: \"off\", \"choose\" or \"on\"",
                OptionSpec::String {
                    default: "choose",
                    allowed: ON_OFF_CHOOSE,
                },
            ),
            (
                "time_limit",
                "Time limit (seconds)",
                OptionSpec::Double {
                    default: INFINITY,
                    min: 0.0,
                    max: INFINITY,
                },
            ),
            (
                "output_flag",
                "Enables or disables solver output",
                OptionSpec::Bool { default: true },
            ),
            (
                "log_to_console",
                "Enables or disables console logging",
                OptionSpec::Bool { default: true },
            ),
            (
                "log_dev_level",
                "Output development messages: 0 => none; 1 => info; 2 => verbose",
                OptionSpec::Int {
                    default: 0,
                    min: 0,
                    max: 3,
                },
            ),
            (
                "simplex_iteration_limit",
                "Iteration limit for simplex solver",
                OptionSpec::Int {
                    default: HighsInt::MAX,
                    min: 0,
                    max: HighsInt::MAX,
                },
            ),
            (
                "primal_feasibility_tolerance",
                "Primal feasibility tolerance",
                OptionSpec::Double {
                    default: 1e-7,
                    min: 1e-10,
                    max: INFINITY,
                },
            ),
            (
                "dual_feasibility_tolerance",
                "Dual feasibility tolerance",
                OptionSpec::Double {
                    default: 1e-7,
                    min: 1e-10,
                    max: INFINITY,
                },
            ),
            (
                "mip_feasibility_tolerance",
                "MIP integrality tolerance",
                OptionSpec::Double {
                    default: 1e-6,
                    min: 1e-10,
                    max: INFINITY,
                },
            ),
            (
                "mip_rel_gap",
                "Tolerance on relative gap, |ub-lb|/|ub|, to determine whether optimality has been reached for a MIP instance",
                OptionSpec::Double {
                    default: 1e-4,
                    min: 0.0,
                    max: INFINITY,
                },
            ),
            (
                "infinite_cost",
                "Limit on |cost coefficient|: values greater than or equal to this will be treated as infinite",
                OptionSpec::Double {
                    default: 1e20,
                    min: 1e15,
                    max: INFINITY,
                },
            ),
            (
                "infinite_bound",
                "Limit on |constraint bound|: values greater than or equal to this will be treated as infinite",
                OptionSpec::Double {
                    default: 1e20,
                    min: 1e15,
                    max: INFINITY,
                },
            ),
            (
                "random_seed",
                "Random seed used in HiGHS",
                OptionSpec::Int {
                    default: 0,
                    min: 0,
                    max: HighsInt::MAX,
                },
            ),
            (
                "threads",
                "Number of threads used by HiGHS (0: automatic)",
                OptionSpec::Int {
                    default: 0,
                    min: 0,
                    max: HighsInt::MAX,
                },
            ),
            (
                "log_file",
                "Log file",
                OptionSpec::String {
                    default: "",
                    allowed: &[],
                },
            ),
        ];

        let mut registry = Self::new();
        for (name, description, spec) in entries {
            let value = spec.default_value();
            registry.records.insert(
                name,
                OptionRecord {
                    name,
                    description,
                    spec,
                    value,
                },
            );
        }
        registry
    }

    /// Register a new option at its default value.
    pub fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        spec: OptionSpec,
    ) -> Result<(), OptionError> {
        if self.records.contains_key(name) {
            return Err(OptionError::Duplicate { name });
        }
        let value = spec.default_value();
        self.records.insert(
            name,
            OptionRecord {
                name,
                description,
                spec,
                value,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, name: &str) -> Option<&OptionRecord> {
        self.records.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionRecord> {
        self.records.values()
    }

    pub fn option_type(&self, name: &str) -> Option<OptionType> {
        self.record(name).map(OptionRecord::option_type)
    }

    pub fn get(&self, name: &str) -> Result<&OptionValue, OptionError> {
        self.record(name)
            .map(OptionRecord::value)
            .ok_or_else(|| OptionError::Unknown {
                name: name.to_string(),
            })
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        requested: OptionType,
        extract: impl FnOnce(&'a OptionValue) -> Option<T>,
    ) -> Result<T, OptionError> {
        let value = self.get(name)?;
        extract(value).ok_or_else(|| OptionError::WrongType {
            name: name.to_string(),
            declared: value.option_type(),
            requested,
        })
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, OptionError> {
        self.typed(name, OptionType::Bool, OptionValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Result<HighsInt, OptionError> {
        self.typed(name, OptionType::Int, OptionValue::as_int)
    }

    pub fn get_double(&self, name: &str) -> Result<f64, OptionError> {
        self.typed(name, OptionType::Double, OptionValue::as_double)
    }

    pub fn get_string(&self, name: &str) -> Result<&str, OptionError> {
        self.typed(name, OptionType::String, OptionValue::as_str)
    }

    /// Set `name` to `value` after checking its type and admissible values.
    ///
    /// On error the current value is unchanged.
    pub fn set(&mut self, name: &str, value: OptionValue) -> Result<(), OptionError> {
        let record = self
            .records
            .get_mut(name)
            .ok_or_else(|| OptionError::Unknown {
                name: name.to_string(),
            })?;
        let out_of_range = |min: String, max: String| OptionError::OutOfRange {
            name: name.to_string(),
            value: value.to_string(),
            min,
            max,
        };
        match (&record.spec, &value) {
            (OptionSpec::Bool { .. }, OptionValue::Bool(_)) => {}
            (OptionSpec::Int { min, max, .. }, OptionValue::Int(v)) => {
                if v < min || v > max {
                    return Err(out_of_range(min.to_string(), max.to_string()));
                }
            }
            (OptionSpec::Double { min, max, .. }, OptionValue::Double(v)) => {
                if v.is_nan() || v < min || v > max {
                    return Err(out_of_range(min.to_string(), max.to_string()));
                }
            }
            (OptionSpec::String { allowed, .. }, OptionValue::String(v)) => {
                if !allowed.is_empty() && !allowed.iter().any(|candidate| *candidate == v.as_str())
                {
                    return Err(OptionError::NotAllowed {
                        name: name.to_string(),
                        value: v.clone(),
                        allowed: *allowed,
                    });
                }
            }
            (spec, _) => {
                return Err(OptionError::WrongType {
                    name: name.to_string(),
                    declared: spec.option_type(),
                    requested: value.option_type(),
                });
            }
        }
        record.value = value;
        Ok(())
    }

    /// Restore every option to its default.
    pub fn reset(&mut self) {
        for record in self.records.values_mut() {
            record.value = record.spec.default_value();
        }
    }

    /// Snapshot of all current values as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .records
            .values()
            .map(|record| {
                let value = serde_json::to_value(&record.value).unwrap_or(serde_json::Value::Null);
                (record.name.to_string(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_registered_with_types() {
        let registry = OptionRegistry::with_defaults();
        assert_eq!(registry.len(), 17);
        assert_eq!(registry.option_type("presolve"), Some(OptionType::String));
        assert_eq!(registry.option_type("output_flag"), Some(OptionType::Bool));
        assert_eq!(registry.option_type("threads"), Some(OptionType::Int));
        assert_eq!(registry.option_type("time_limit"), Some(OptionType::Double));
        assert_eq!(registry.option_type("no_such_option"), None);
        assert_eq!(registry.get_string("presolve").unwrap(), "choose");
        assert!(registry.get_double("time_limit").unwrap().is_infinite());
        assert!(registry.iter().all(OptionRecord::is_default));
    }

    #[test]
    fn test_wrong_type_is_rejected_without_coercion() {
        let mut registry = OptionRegistry::with_defaults();
        let err = registry
            .set("time_limit", OptionValue::Int(10))
            .unwrap_err();
        assert_eq!(
            err,
            OptionError::WrongType {
                name: "time_limit".to_string(),
                declared: OptionType::Double,
                requested: OptionType::Int,
            }
        );
        assert!(registry.get_double("time_limit").unwrap().is_infinite());
        assert_eq!(registry.get_int("time_limit").unwrap_err().code(), "OPTION_WRONG_TYPE");
    }

    #[test]
    fn test_range_and_allowed_values() {
        let mut registry = OptionRegistry::with_defaults();
        let err = registry
            .set("log_dev_level", OptionValue::Int(9))
            .unwrap_err();
        assert_eq!(err.code(), "OPTION_OUT_OF_RANGE");
        let err = registry
            .set("presolve", OptionValue::from("sometimes"))
            .unwrap_err();
        assert_eq!(err.code(), "OPTION_NOT_ALLOWED");
        let err = registry
            .set("mip_rel_gap", OptionValue::Double(f64::NAN))
            .unwrap_err();
        assert_eq!(err.code(), "OPTION_OUT_OF_RANGE");
        registry
            .set("log_file", OptionValue::from("anything.log"))
            .unwrap();
        assert_eq!(registry.get_string("log_file").unwrap(), "anything.log");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut registry = OptionRegistry::with_defaults();
        registry.set("presolve", OptionValue::from("off")).unwrap();
        registry.set("threads", OptionValue::Int(4)).unwrap();
        assert!(!registry.record("presolve").unwrap().is_default());
        registry.reset();
        assert_eq!(registry.get_string("presolve").unwrap(), "choose");
        assert_eq!(registry.get_int("threads").unwrap(), 0);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = OptionRegistry::new();
        assert!(registry.is_empty());
        registry
            .register("flag", "A flag", OptionSpec::Bool { default: false })
            .unwrap();
        let err = registry
            .register("flag", "Again", OptionSpec::Bool { default: true })
            .unwrap_err();
        assert_eq!(err, OptionError::Duplicate { name: "flag" });
    }

    #[test]
    fn test_json_snapshot() {
        let registry = OptionRegistry::with_defaults();
        let json = registry.to_json();
        assert_eq!(json["presolve"], "choose");
        assert_eq!(json["output_flag"], true);
        assert_eq!(json["threads"], 0);
    }
}
