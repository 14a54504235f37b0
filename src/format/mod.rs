//! Declarative value formats used to validate and synthesize mock values.
//!
//! - [`value`] - regex and value generation per type family
//! - [`engine`] - value generation and variable binding
//! - [`matcher`] - checking observed values against a format

pub mod engine;
pub mod matcher;
pub mod value;

use crate::{template::FormatLibrary, value_type::ValueType, Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use engine::FormatEngine;
pub use value::ValueFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatStrategy {
    ByDataType,
    FromEnums,
    Customize,
    FromTemplate,
}

/// Digit-count bounds of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digit {
    #[serde(default = "Digit::default_integer")]
    pub integer: u32,
    #[serde(default)]
    pub decimal: u32,
}

impl Digit {
    const DEFAULT_INTEGER: u32 = 128;

    fn default_integer() -> u32 {
        Self::DEFAULT_INTEGER
    }

    pub fn new(integer: u32, decimal: u32) -> Self {
        Self { integer, decimal }
    }

    pub fn big_decimal() -> Self {
        Self::new(Self::DEFAULT_INTEGER, Self::DEFAULT_INTEGER)
    }

    fn validate(&self, key: &str) -> Result<()> {
        if self.integer == 0 {
            return Err(Error::invalid_format(
                format!("{key}.digit.integer"),
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for Digit {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTEGER, 0)
    }
}

/// String length bounds, or numeric value bounds for numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_equal: Option<i64>,
}

impl Size {
    pub fn between(min_value: i64, max_value: i64) -> Self {
        Self {
            max_value: Some(max_value),
            min_value: Some(min_value),
            only_equal: None,
        }
    }

    pub fn at_most(max_value: i64) -> Self {
        Self {
            max_value: Some(max_value),
            ..Default::default()
        }
    }

    pub fn exactly(value: i64) -> Self {
        Self {
            only_equal: Some(value),
            ..Default::default()
        }
    }

    /// Effective `(min, max)` with `only_equal` taking precedence.
    pub fn bounds(&self) -> (Option<i64>, Option<i64>) {
        match self.only_equal {
            Some(value) => (Some(value), Some(value)),
            None => (self.min_value, self.max_value),
        }
    }

    fn validate(&self, key: &str) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(Error::invalid_format(
                    format!("{key}.size"),
                    format!("min_value {min} is greater than max_value {max}"),
                ));
            }
        }
        Ok(())
    }
}

/// Named value slot of a customize template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// Type family used when `value_format` formats by data type.
    #[serde(default = "Variable::default_value_type")]
    pub value_type: ValueType,
    pub value_format: Format,
}

impl Variable {
    fn default_value_type() -> ValueType {
        ValueType::Str
    }

    pub fn new(name: impl Into<String>, value_type: ValueType, value_format: Format) -> Self {
        Self {
            name: name.into(),
            value_type,
            value_format,
        }
    }

    pub fn validate(&self, key: &str) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_format(format!("{key}.name"), "cannot be empty"));
        }
        self.value_format
            .validate(&format!("{key}.{}.value_format", self.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub strategy: FormatStrategy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digit: Option<Digit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub customize: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub use_name: String,
}

impl Format {
    fn with_strategy(strategy: FormatStrategy) -> Self {
        Self {
            strategy,
            digit: None,
            size: None,
            enums: Vec::new(),
            customize: String::new(),
            variables: Vec::new(),
            use_name: String::new(),
        }
    }

    pub fn by_data_type() -> Self {
        Self::with_strategy(FormatStrategy::ByDataType)
    }

    pub fn from_enums(enums: Vec<String>) -> Self {
        Self {
            enums,
            ..Self::with_strategy(FormatStrategy::FromEnums)
        }
    }

    pub fn customize(template: impl Into<String>, variables: Vec<Variable>) -> Self {
        Self {
            customize: template.into(),
            variables,
            ..Self::with_strategy(FormatStrategy::Customize)
        }
    }

    pub fn from_template(use_name: impl Into<String>) -> Self {
        Self {
            use_name: use_name.into(),
            ..Self::with_strategy(FormatStrategy::FromTemplate)
        }
    }

    pub fn with_digit(mut self, digit: Digit) -> Self {
        self.digit = Some(digit);
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    /// Digit constraint in effect for `value_format`.
    pub fn effective_digit(&self, value_format: ValueFormat) -> Digit {
        self.digit.unwrap_or_else(|| value_format.default_digit())
    }

    pub fn effective_size(&self) -> Size {
        self.size.unwrap_or_default()
    }

    /// Checks the settings each strategy depends on. `key` prefixes error locations.
    pub fn validate(&self, key: &str) -> Result<()> {
        match self.strategy {
            FormatStrategy::FromEnums if self.enums.is_empty() => {
                return Err(Error::invalid_format(format!("{key}.enums"), "cannot be empty"));
            }
            FormatStrategy::Customize if self.customize.is_empty() => {
                return Err(Error::invalid_format(
                    format!("{key}.customize"),
                    "cannot be empty",
                ));
            }
            FormatStrategy::FromTemplate if self.use_name.is_empty() => {
                return Err(Error::invalid_format(
                    format!("{key}.use_name"),
                    "cannot be empty",
                ));
            }
            _ => {}
        }

        if let Some(digit) = &self.digit {
            digit.validate(key)?;
        }
        if let Some(size) = &self.size {
            size.validate(key)?;
        }
        for variable in &self.variables {
            variable.validate(&format!("{key}.variables"))?;
        }
        Ok(())
    }

    /// Human readable expectation, used in validation failure messages.
    pub fn expect_format_log_msg(&self, declared: ValueType) -> String {
        match self.strategy {
            FormatStrategy::ByDataType => format!("*{declared}* type data"),
            FormatStrategy::FromEnums => format!("one of the enums value *{:?}*", self.enums),
            FormatStrategy::Customize => format!(
                "like format as *{}*. Please refer to the property *variables* to know the details of variable settings.",
                self.customize
            ),
            FormatStrategy::FromTemplate => {
                format!("the format *{}* from the template configuration", self.use_name)
            }
        }
    }
}

/// Generates one value for `format`; `template` supplies shared formats and variables.
pub fn generate_value(
    format: &Format,
    declared: ValueType,
    template: Option<&FormatLibrary>,
) -> Result<Value> {
    FormatEngine::new(template).generate(format, declared)
}

/// Whether `value` conforms to `format`. Non-matching values yield `Ok(false)`.
pub fn value_matches_format(
    format: &Format,
    declared: ValueType,
    value: &Value,
    template: Option<&FormatLibrary>,
) -> Result<bool> {
    FormatEngine::new(template).matches(format, declared, value)
}

/// Text form of a value as matched by regex based formats.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
