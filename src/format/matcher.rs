use super::{
    engine::{segments, FormatEngine, Segment},
    stringify, Format, FormatStrategy, ValueFormat,
};
use crate::{value_type::ValueType, Error, Result};
use regex::RegexBuilder;
use serde_json::Value;
use std::collections::HashMap;

/// True when `pattern` matches the whole of `text`.
fn full_match(pattern: &str, text: &str, case_insensitive: bool) -> Result<bool> {
    let regex = RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(case_insensitive)
        .build()?;
    Ok(regex.is_match(text))
}

impl FormatEngine<'_> {
    /// Whether `value` conforms to `format`; `declared` picks the type family of
    /// formats by data type.
    pub fn matches(&mut self, format: &Format, declared: ValueType, value: &Value) -> Result<bool> {
        let text = stringify(value);
        let matched = match format.strategy {
            FormatStrategy::ByDataType => {
                let value_format = ValueFormat::from_value_type(declared)?;
                let size = format.effective_size();
                // Any text is a string; only its length is constrained.
                let shaped = value_format == ValueFormat::String
                    || full_match(
                        &value_format.generate_regex(&size, &format.effective_digit(value_format)),
                        &text,
                        false,
                    )?;
                shaped && value_format.within_bounds(&text, &size)
            }
            FormatStrategy::FromEnums => {
                matches!(value, Value::String(s) if format.enums.contains(s))
            }
            FormatStrategy::Customize => {
                let pattern = self.pattern(format, declared)?;
                full_match(&pattern, &text, true)?
            }
            FormatStrategy::FromTemplate => {
                return self.with_template_format(&format.use_name, |engine, shared| {
                    engine.matches(shared, declared, value)
                })
            }
        };
        if !matched {
            tracing::debug!(
                "Value '{text}' does not match, expected {}",
                format.expect_format_log_msg(declared)
            );
        }
        Ok(matched)
    }

    /// Regex fragment accepting every value `format` can produce.
    pub fn pattern(&mut self, format: &Format, declared: ValueType) -> Result<String> {
        match format.strategy {
            FormatStrategy::ByDataType => {
                let value_format = ValueFormat::from_value_type(declared)?;
                Ok(value_format.generate_regex(
                    &format.effective_size(),
                    &format.effective_digit(value_format),
                ))
            }
            FormatStrategy::FromEnums => {
                if format.enums.is_empty() {
                    return Err(Error::invalid_format("enums", "cannot be empty"));
                }
                let alternatives: Vec<String> =
                    format.enums.iter().map(|value| regex::escape(value)).collect();
                Ok(format!("(?:{})", alternatives.join("|")))
            }
            FormatStrategy::Customize => {
                let mut sub_patterns: HashMap<&str, String> = HashMap::new();
                let mut pattern = String::new();
                for segment in segments(&format.customize) {
                    let name = match segment {
                        Segment::Literal(text) => {
                            pattern.push_str(&regex::escape(text));
                            continue;
                        }
                        Segment::Placeholder(name) => name,
                    };
                    if !sub_patterns.contains_key(name) {
                        let sub_pattern = self.with_variable(format, name, |engine, variable| {
                            engine.pattern(&variable.value_format, variable.value_type)
                        })?;
                        sub_patterns.insert(name, sub_pattern);
                    }
                    if let Some(sub_pattern) = sub_patterns.get(name) {
                        pattern.push_str(&format!("(?:{sub_pattern})"));
                    }
                }
                Ok(pattern)
            }
            FormatStrategy::FromTemplate => self
                .with_template_format(&format.use_name, |engine, shared| {
                    engine.pattern(shared, declared)
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        format::{value_matches_format, Digit, Size, Variable},
        template::{FormatEntity, FormatLibrary},
    };
    use serde_json::json;

    fn enums(values: &[&str]) -> Format {
        Format::from_enums(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_customize_match() {
        let format = Format::customize(
            "<a>-<b>",
            vec![
                Variable::new("a", ValueType::Str, enums(&["X"])),
                Variable::new("b", ValueType::Str, enums(&["Y"])),
            ],
        );
        assert!(value_matches_format(&format, ValueType::Str, &json!("X-Y"), None).unwrap());
        assert!(value_matches_format(&format, ValueType::Str, &json!("x-y"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("Z-Y"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("X-Y-"), None).unwrap());
    }

    #[test]
    fn test_customize_literals_are_escaped() {
        let format = Format::customize(
            "v1.<n>",
            vec![Variable::new(
                "n",
                ValueType::Int,
                Format::by_data_type().with_digit(Digit::new(2, 0)),
            )],
        );
        assert!(value_matches_format(&format, ValueType::Str, &json!("v1.42"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("v1x42"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("v1.420"), None).unwrap());
    }

    #[test]
    fn test_string_max_length() {
        let format = Format::by_data_type().with_size(Size::at_most(3));
        assert!(value_matches_format(&format, ValueType::Str, &json!("abc"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("abcd"), None).unwrap());
    }

    #[test]
    fn test_large_string_lengths() {
        let format = Format::by_data_type().with_size(Size::at_most(100_000));
        assert!(value_matches_format(&format, ValueType::Str, &json!("abc"), None).unwrap());

        let format = Format::by_data_type().with_size(Size::between(100_000, 200_000));
        assert!(!value_matches_format(&format, ValueType::Str, &json!("abc"), None).unwrap());
        let long = "x".repeat(150_000);
        assert!(value_matches_format(&format, ValueType::Str, &json!(long), None).unwrap());
    }

    #[test]
    fn test_numbers() {
        let format = Format::by_data_type().with_size(Size::between(1, 100));
        assert!(value_matches_format(&format, ValueType::Int, &json!(42), None).unwrap());
        assert!(value_matches_format(&format, ValueType::Int, &json!("42"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Int, &json!(101), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Int, &json!(-1), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Int, &json!("4a"), None).unwrap());

        let format = Format::by_data_type().with_digit(Digit::new(3, 2));
        assert!(value_matches_format(&format, ValueType::Float, &json!(12.5), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Float, &json!(12.555), None).unwrap());
    }

    #[test]
    fn test_boolean_and_enums() {
        let format = Format::by_data_type();
        assert!(value_matches_format(&format, ValueType::Bool, &json!(true), None).unwrap());
        assert!(value_matches_format(&format, ValueType::Bool, &json!("FALSE"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Bool, &json!("no"), None).unwrap());

        let format = enums(&["TYPE_1", "TYPE_2"]);
        assert!(value_matches_format(&format, ValueType::Str, &json!("TYPE_2"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("TYPE_3"), None).unwrap());

        let format = enums(&["1"]);
        assert!(!value_matches_format(&format, ValueType::Str, &json!(1), None).unwrap());
    }

    #[test]
    fn test_from_template_match() {
        let library = FormatLibrary {
            entities: vec![FormatEntity {
                name: "region".to_string(),
                config: enums(&["eu", "us"]),
            }],
            variables: vec![],
        };
        let format = Format::from_template("region");
        assert!(value_matches_format(&format, ValueType::Str, &json!("eu"), Some(&library)).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("ap"), Some(&library)).unwrap());

        let nested = Format::customize(
            "<r>-1",
            vec![Variable::new("r", ValueType::Str, Format::from_template("region"))],
        );
        assert!(value_matches_format(&nested, ValueType::Str, &json!("us-1"), Some(&library)).unwrap());
    }

    #[test]
    fn test_enum_values_are_escaped() {
        let format = Format::customize(
            "<a>",
            vec![Variable::new("a", ValueType::Str, enums(&["a.b", "c+"]))],
        );
        assert!(value_matches_format(&format, ValueType::Str, &json!("c+"), None).unwrap());
        assert!(!value_matches_format(&format, ValueType::Str, &json!("axb"), None).unwrap());
    }
}
