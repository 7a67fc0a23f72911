//! Scalar types shared by the boundary layer and the engines.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Integer type the engine uses for counts and indices.
pub type HighsInt = i32;

/// Sentinel for an unbounded cost or bound. Compared by value.
pub const INFINITY: f64 = f64::INFINITY;

/// Default magnitude at or beyond which the engine treats a value as infinite.
pub const DEFAULT_INFINITE_BOUND: f64 = 1e20;

/// Whether `value` is the unbounded sentinel in either direction.
pub fn is_infinite(value: f64) -> bool {
    value.abs() == INFINITY
}

/// Map values at or beyond `threshold` onto the infinity sentinel.
pub fn normalize_infinite(value: f64, threshold: f64) -> f64 {
    if value >= threshold {
        INFINITY
    } else if value <= -threshold {
        -INFINITY
    } else {
        value
    }
}

/// Objective sense, encoded as the engine encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjSense {
    #[default]
    Minimize,
    Maximize,
}

impl ObjSense {
    pub fn code(self) -> HighsInt {
        match self {
            ObjSense::Minimize => 1,
            ObjSense::Maximize => -1,
        }
    }

    /// Multiplier turning the objective into a minimization.
    pub fn sign(self) -> f64 {
        match self {
            ObjSense::Minimize => 1.0,
            ObjSense::Maximize => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ObjSense::Minimize => "minimize",
            ObjSense::Maximize => "maximize",
        }
    }
}

impl TryFrom<HighsInt> for ObjSense {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ObjSense::Minimize),
            -1 => Ok(ObjSense::Maximize),
            other => Err(BridgeError::InvalidEnumValue {
                enumeration: "ObjSense",
                value: i64::from(other),
            }),
        }
    }
}

impl std::fmt::Display for ObjSense {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Column integrality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    #[default]
    Continuous,
    Integer,
}

impl VarType {
    pub fn code(self) -> HighsInt {
        match self {
            VarType::Continuous => 0,
            VarType::Integer => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VarType::Continuous => "continuous",
            VarType::Integer => "integer",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(self, VarType::Integer)
    }
}

impl TryFrom<HighsInt> for VarType {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VarType::Continuous),
            1 => Ok(VarType::Integer),
            other => Err(BridgeError::InvalidEnumValue {
                enumeration: "VarType",
                value: i64::from(other),
            }),
        }
    }
}

impl TryFrom<u8> for VarType {
    type Error = BridgeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        VarType::try_from(HighsInt::from(value))
    }
}

impl std::fmt::Display for VarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declared type of an engine option, fixed when the option is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    Bool,
    Int,
    Double,
    String,
}

impl OptionType {
    pub fn code(self) -> HighsInt {
        match self {
            OptionType::Bool => 0,
            OptionType::Int => 1,
            OptionType::Double => 2,
            OptionType::String => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Bool => "bool",
            OptionType::Int => "int",
            OptionType::Double => "double",
            OptionType::String => "string",
        }
    }
}

impl TryFrom<HighsInt> for OptionType {
    type Error = BridgeError;

    fn try_from(value: HighsInt) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OptionType::Bool),
            1 => Ok(OptionType::Int),
            2 => Ok(OptionType::Double),
            3 => Ok(OptionType::String),
            other => Err(BridgeError::InvalidEnumValue {
                enumeration: "OptionType",
                value: i64::from(other),
            }),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An option value crossing the boundary, tagged with its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(HighsInt),
    Double(f64),
    String(String),
}

impl OptionValue {
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionValue::Bool(_) => OptionType::Bool,
            OptionValue::Int(_) => OptionType::Int,
            OptionValue::Double(_) => OptionType::Double,
            OptionValue::String(_) => OptionType::String,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<HighsInt> {
        match self {
            OptionValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            OptionValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<HighsInt> for OptionValue {
    fn from(value: HighsInt) -> Self {
        OptionValue::Int(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Double(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Bool(value) => write!(f, "{value}"),
            OptionValue::Int(value) => write!(f, "{value}"),
            OptionValue::Double(value) => write!(f, "{value}"),
            OptionValue::String(value) => write!(f, "{value}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_sense_codes_follow_engine_encoding() {
        assert_eq!(ObjSense::Minimize.code(), 1);
        assert_eq!(ObjSense::Maximize.code(), -1);
        assert_eq!(ObjSense::try_from(-1), Ok(ObjSense::Maximize));
        assert_eq!(ObjSense::try_from(1), Ok(ObjSense::Minimize));
    }

    #[test]
    fn obj_sense_rejects_unknown_code() {
        let err = ObjSense::try_from(0).unwrap_err();
        assert_eq!(err.code(), "ENUM_INVALID_VALUE");
        assert!(err.to_string().contains("ObjSense"));
    }

    #[test]
    fn var_type_rejects_tags_outside_domain() {
        assert_eq!(VarType::try_from(0_i32), Ok(VarType::Continuous));
        assert_eq!(VarType::try_from(1u8), Ok(VarType::Integer));
        assert!(matches!(
            VarType::try_from(2_i32),
            Err(BridgeError::InvalidEnumValue {
                enumeration: "VarType",
                value: 2
            })
        ));
    }

    #[test]
    fn option_value_reports_its_type() {
        assert_eq!(OptionValue::from(true).option_type(), OptionType::Bool);
        assert_eq!(OptionValue::from(3).option_type(), OptionType::Int);
        assert_eq!(OptionValue::from(0.5).option_type(), OptionType::Double);
        assert_eq!(OptionValue::from("on").option_type(), OptionType::String);
        assert_eq!(OptionValue::from(3).as_double(), None);
    }

    #[test]
    fn infinite_bound_normalization() {
        assert!(is_infinite(INFINITY));
        assert!(is_infinite(-INFINITY));
        assert!(!is_infinite(1e30));
        assert_eq!(normalize_infinite(1e20, DEFAULT_INFINITE_BOUND), INFINITY);
        assert_eq!(normalize_infinite(-2e20, DEFAULT_INFINITE_BOUND), -INFINITY);
        assert_eq!(normalize_infinite(5.0, DEFAULT_INFINITE_BOUND), 5.0);
    }

    #[test]
    fn option_value_serializes_untagged() {
        let json = serde_json::to_string(&OptionValue::Double(1.5)).unwrap();
        assert_eq!(json, "1.5");
        let sense = serde_json::to_string(&ObjSense::Maximize).unwrap();
        assert_eq!(sense, "\"maximize\"");
    }
}
