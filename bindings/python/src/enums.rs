//! Python enum wrappers for the engine's fixed enumerations.
//!
//! Each wrapper keeps the engine's integer code as its discriminant so
//! `int(ObjSense.kMaximize) == -1` holds on the Python side.

use lpbridge_highs::{
    BasisStatus, CallStatus, LogSeverity, ModelStatus, ObjSense, SolutionStatus, VarType,
};
use pyo3::prelude::*;

/// Declare a Python enum mirroring a Rust enum variant-for-variant.
macro_rules! mirror_enum {
    (
        $(#[$meta:meta])*
        $py_name:literal, $wrapper:ident <=> $inner:ident {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[pyclass(name = $py_name, eq, eq_int)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $wrapper {
            $(
                #[pyo3(name = $label)]
                $variant = $code,
            )+
        }

        impl From<$wrapper> for $inner {
            fn from(value: $wrapper) -> Self {
                match value {
                    $($wrapper::$variant => $inner::$variant,)+
                }
            }
        }

        impl From<$inner> for $wrapper {
            fn from(value: $inner) -> Self {
                match value {
                    $($inner::$variant => $wrapper::$variant,)+
                }
            }
        }
    };
}

mirror_enum! {
    /// Objective sense.
    "ObjSense", PyObjSense <=> ObjSense {
        Minimize = 1 => "kMinimize",
        Maximize = -1 => "kMaximize",
    }
}

mirror_enum! {
    /// Column integrality.
    "HighsVarType", PyVarType <=> VarType {
        Continuous = 0 => "kContinuous",
        Integer = 1 => "kInteger",
    }
}

mirror_enum! {
    /// Ternary call status.
    "HighsStatus", PyCallStatus <=> CallStatus {
        Error = -1 => "kError",
        Ok = 0 => "kOk",
        Warning = 1 => "kWarning",
    }
}

mirror_enum! {
    /// Outcome of the last `run`.
    "HighsModelStatus", PyModelStatus <=> ModelStatus {
        NotSet = 0 => "kNotset",
        LoadError = 1 => "kLoadError",
        ModelError = 2 => "kModelError",
        PresolveError = 3 => "kPresolveError",
        SolveError = 4 => "kSolveError",
        PostsolveError = 5 => "kPostsolveError",
        ModelEmpty = 6 => "kModelEmpty",
        Optimal = 7 => "kOptimal",
        Infeasible = 8 => "kInfeasible",
        UnboundedOrInfeasible = 9 => "kUnboundedOrInfeasible",
        Unbounded = 10 => "kUnbounded",
        ObjectiveBound = 11 => "kObjectiveBound",
        ObjectiveTarget = 12 => "kObjectiveTarget",
        TimeLimit = 13 => "kTimeLimit",
        IterationLimit = 14 => "kIterationLimit",
        Unknown = 15 => "kUnknown",
    }
}

mirror_enum! {
    /// Severity passed to log callbacks.
    "HighsLogType", PyLogType <=> LogSeverity {
        Info = 1 => "kInfo",
        Detailed = 2 => "kDetailed",
        Verbose = 3 => "kVerbose",
        Warning = 4 => "kWarning",
        Error = 5 => "kError",
    }
}

mirror_enum! {
    "HighsBasisStatus", PyBasisStatus <=> BasisStatus {
        Lower = 0 => "kLower",
        Basic = 1 => "kBasic",
        Upper = 2 => "kUpper",
        Zero = 3 => "kZero",
        Nonbasic = 4 => "kNonbasic",
    }
}

mirror_enum! {
    "SolutionStatus", PySolutionStatus <=> SolutionStatus {
        None = 0 => "kSolutionStatusNone",
        Infeasible = 1 => "kSolutionStatusInfeasible",
        Feasible = 2 => "kSolutionStatusFeasible",
    }
}

#[pymethods]
impl PyModelStatus {
    /// Human-readable status text, as printed in engine logs.
    fn __str__(&self) -> &'static str {
        ModelStatus::from(*self).as_str()
    }
}

/// Register enum classes with the Python module.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyObjSense>()?;
    m.add_class::<PyVarType>()?;
    m.add_class::<PyCallStatus>()?;
    m.add_class::<PyModelStatus>()?;
    m.add_class::<PyLogType>()?;
    m.add_class::<PyBasisStatus>()?;
    m.add_class::<PySolutionStatus>()?;
    Ok(())
}
