//! Engine status enumerations.
//!
//! Integer codes follow the engine's C API so values can cross the FFI and
//! host boundaries unchanged.

use lpbridge_core::{BridgeError, HighsInt};
use serde::{Deserialize, Serialize};

/// Ternary status returned by every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Error,
    Ok,
    Warning,
}

impl CallStatus {
    pub fn code(self) -> HighsInt {
        match self {
            CallStatus::Error => -1,
            CallStatus::Ok => 0,
            CallStatus::Warning => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CallStatus::Error => "error",
            CallStatus::Ok => "ok",
            CallStatus::Warning => "warning",
        }
    }

    /// Combine two statuses; the result is never better than either input.
    pub fn worst(self, other: CallStatus) -> CallStatus {
        match (self, other) {
            (CallStatus::Error, _) | (_, CallStatus::Error) => CallStatus::Error,
            (CallStatus::Warning, _) | (_, CallStatus::Warning) => CallStatus::Warning,
            _ => CallStatus::Ok,
        }
    }

    pub fn is_ok(self) -> bool {
        matches!(self, CallStatus::Ok)
    }

    pub fn is_error(self) -> bool {
        matches!(self, CallStatus::Error)
    }
}

impl TryFrom<HighsInt> for CallStatus {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, BridgeError> {
        match value {
            -1 => Ok(CallStatus::Error),
            0 => Ok(CallStatus::Ok),
            1 => Ok(CallStatus::Warning),
            other => Err(BridgeError::InvalidEnumValue {
                enumeration: "CallStatus",
                value: i64::from(other),
            }),
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Model status after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    #[default]
    NotSet,
    LoadError,
    ModelError,
    PresolveError,
    SolveError,
    PostsolveError,
    ModelEmpty,
    Optimal,
    Infeasible,
    UnboundedOrInfeasible,
    Unbounded,
    ObjectiveBound,
    ObjectiveTarget,
    TimeLimit,
    IterationLimit,
    Unknown,
}

const MODEL_STATUSES: [ModelStatus; 16] = [
    ModelStatus::NotSet,
    ModelStatus::LoadError,
    ModelStatus::ModelError,
    ModelStatus::PresolveError,
    ModelStatus::SolveError,
    ModelStatus::PostsolveError,
    ModelStatus::ModelEmpty,
    ModelStatus::Optimal,
    ModelStatus::Infeasible,
    ModelStatus::UnboundedOrInfeasible,
    ModelStatus::Unbounded,
    ModelStatus::ObjectiveBound,
    ModelStatus::ObjectiveTarget,
    ModelStatus::TimeLimit,
    ModelStatus::IterationLimit,
    ModelStatus::Unknown,
];

impl ModelStatus {
    pub fn code(self) -> HighsInt {
        MODEL_STATUSES
            .iter()
            .position(|&status| status == self)
            .map_or(-1, |position| position as HighsInt)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelStatus::NotSet => "Not Set",
            ModelStatus::LoadError => "Load error",
            ModelStatus::ModelError => "Model error",
            ModelStatus::PresolveError => "Presolve error",
            ModelStatus::SolveError => "Solve error",
            ModelStatus::PostsolveError => "Postsolve error",
            ModelStatus::ModelEmpty => "Empty",
            ModelStatus::Optimal => "Optimal",
            ModelStatus::Infeasible => "Infeasible",
            ModelStatus::UnboundedOrInfeasible => "Primal infeasible or unbounded",
            ModelStatus::Unbounded => "Unbounded",
            ModelStatus::ObjectiveBound => "Bound on objective reached",
            ModelStatus::ObjectiveTarget => "Target for objective reached",
            ModelStatus::TimeLimit => "Time limit reached",
            ModelStatus::IterationLimit => "Iteration limit reached",
            ModelStatus::Unknown => "Unknown",
        }
    }

    /// True when the solve stopped on a user limit rather than a conclusion.
    pub fn is_limit(self) -> bool {
        matches!(
            self,
            ModelStatus::TimeLimit
                | ModelStatus::IterationLimit
                | ModelStatus::ObjectiveBound
                | ModelStatus::ObjectiveTarget
        )
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            ModelStatus::LoadError
                | ModelStatus::ModelError
                | ModelStatus::PresolveError
                | ModelStatus::SolveError
                | ModelStatus::PostsolveError
        )
    }
}

impl TryFrom<HighsInt> for ModelStatus {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, BridgeError> {
        usize::try_from(value)
            .ok()
            .and_then(|index| MODEL_STATUSES.get(index).copied())
            .ok_or(BridgeError::InvalidEnumValue {
                enumeration: "ModelStatus",
                value: i64::from(value),
            })
    }
}

impl std::fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a column or row in a basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasisStatus {
    /// Nonbasic at its lower bound.
    Lower,
    Basic,
    /// Nonbasic at its upper bound.
    Upper,
    /// Free nonbasic at zero.
    Zero,
    Nonbasic,
}

impl BasisStatus {
    pub fn code(self) -> HighsInt {
        match self {
            BasisStatus::Lower => 0,
            BasisStatus::Basic => 1,
            BasisStatus::Upper => 2,
            BasisStatus::Zero => 3,
            BasisStatus::Nonbasic => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BasisStatus::Lower => "lower",
            BasisStatus::Basic => "basic",
            BasisStatus::Upper => "upper",
            BasisStatus::Zero => "zero",
            BasisStatus::Nonbasic => "nonbasic",
        }
    }
}

impl TryFrom<HighsInt> for BasisStatus {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, BridgeError> {
        match value {
            0 => Ok(BasisStatus::Lower),
            1 => Ok(BasisStatus::Basic),
            2 => Ok(BasisStatus::Upper),
            3 => Ok(BasisStatus::Zero),
            4 => Ok(BasisStatus::Nonbasic),
            other => Err(BridgeError::InvalidEnumValue {
                enumeration: "BasisStatus",
                value: i64::from(other),
            }),
        }
    }
}

impl std::fmt::Display for BasisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quality of a primal or dual solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionStatus {
    #[default]
    None,
    Infeasible,
    Feasible,
}

impl SolutionStatus {
    pub fn code(self) -> HighsInt {
        match self {
            SolutionStatus::None => 0,
            SolutionStatus::Infeasible => 1,
            SolutionStatus::Feasible => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolutionStatus::None => "none",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::Feasible => "feasible",
        }
    }
}

impl TryFrom<HighsInt> for SolutionStatus {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, BridgeError> {
        match value {
            0 => Ok(SolutionStatus::None),
            1 => Ok(SolutionStatus::Infeasible),
            2 => Ok(SolutionStatus::Feasible),
            other => Err(BridgeError::InvalidEnumValue {
                enumeration: "SolutionStatus",
                value: i64::from(other),
            }),
        }
    }
}

impl std::fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_status_codes() {
        assert_eq!(CallStatus::Error.code(), -1);
        assert_eq!(CallStatus::Ok.code(), 0);
        assert_eq!(CallStatus::Warning.code(), 1);
        assert_eq!(CallStatus::try_from(1), Ok(CallStatus::Warning));
        assert!(CallStatus::try_from(2).is_err());
    }

    #[test]
    fn test_call_status_worst_only_degrades() {
        use CallStatus as S;
        assert_eq!(S::Ok.worst(S::Ok), S::Ok);
        assert_eq!(S::Ok.worst(S::Warning), S::Warning);
        assert_eq!(S::Warning.worst(S::Ok), S::Warning);
        assert_eq!(S::Warning.worst(S::Error), S::Error);
        assert_eq!(S::Error.worst(S::Ok), S::Error);
    }

    #[test]
    fn test_model_status_codes_round_trip() {
        for code in 0..16 {
            let status = ModelStatus::try_from(code).unwrap();
            assert_eq!(status.code(), code);
        }
        assert_eq!(ModelStatus::Optimal.code(), 7);
        assert_eq!(ModelStatus::Unknown.code(), 15);
        assert!(ModelStatus::try_from(16).is_err());
        assert!(ModelStatus::try_from(-1).is_err());
    }

    #[test]
    fn test_model_status_classification() {
        assert!(ModelStatus::TimeLimit.is_limit());
        assert!(ModelStatus::IterationLimit.is_limit());
        assert!(!ModelStatus::Optimal.is_limit());
        assert!(ModelStatus::SolveError.is_error());
        assert!(!ModelStatus::Infeasible.is_error());
        assert_eq!(ModelStatus::default(), ModelStatus::NotSet);
    }

    #[test]
    fn test_basis_and_solution_status_codes() {
        assert_eq!(BasisStatus::try_from(3), Ok(BasisStatus::Zero));
        assert_eq!(BasisStatus::Nonbasic.code(), 4);
        assert_eq!(SolutionStatus::Feasible.code(), 2);
        assert!(SolutionStatus::try_from(3).is_err());
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&ModelStatus::UnboundedOrInfeasible).unwrap();
        assert_eq!(json, "\"unbounded_or_infeasible\"");
        let back: CallStatus = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(back, CallStatus::Warning);
    }
}
