use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Internal value kind of a mocked property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Str,
    Int,
    /// Never produced from a wire type; only set by hand-written mock configuration.
    Float,
    Bool,
    List,
    Dict,
    File,
}

impl ValueType {
    /// Maps an OpenAPI/Swagger `type` token onto the internal value kind.
    ///
    /// `number` collapses into `int`, the same as `integer`.
    pub fn from_wire(token: &str) -> Result<Self> {
        match token {
            "string" => Ok(ValueType::Str),
            "integer" | "number" => Ok(ValueType::Int),
            "boolean" => Ok(ValueType::Bool),
            "array" => Ok(ValueType::List),
            "object" => Ok(ValueType::Dict),
            "file" => Ok(ValueType::File),
            other => Err(Error::UnsupportedWireType(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Str => "str",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::List => "list",
            ValueType::Dict => "dict",
            ValueType::File => "file",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ValueType::List | ValueType::Dict)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    /// Accepts the internal tokens (`str`, `int`, ...) as written in mock configuration.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "str" => Ok(ValueType::Str),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "bool" => Ok(ValueType::Bool),
            "list" => Ok(ValueType::List),
            "dict" => Ok(ValueType::Dict),
            "file" => Ok(ValueType::File),
            other => Err(Error::UnsupportedWireType(other.to_string())),
        }
    }
}
