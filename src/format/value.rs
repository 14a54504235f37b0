use super::{Digit, Size};
use crate::{value_type::ValueType, Error, Result};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Largest integer-part digit count used when synthesizing numbers.
const MAX_GENERATED_INTEGER_DIGITS: u32 = 15;
/// Largest fraction digit count used when synthesizing decimals.
const MAX_GENERATED_DECIMAL_DIGITS: u32 = 4;
/// Default span of generated numbers when no size is given.
const DEFAULT_NUMBER_SPAN: i64 = 9999;
/// Default string length when no size is given.
const DEFAULT_STRING_LENGTH: (i64, i64) = (1, 10);

/// Type family a format by data type applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    String,
    Integer,
    BigDecimal,
    Boolean,
}

impl ValueFormat {
    pub fn from_value_type(value_type: ValueType) -> Result<Self> {
        match value_type {
            ValueType::Str => Ok(ValueFormat::String),
            ValueType::Int => Ok(ValueFormat::Integer),
            ValueType::Float => Ok(ValueFormat::BigDecimal),
            ValueType::Bool => Ok(ValueFormat::Boolean),
            other => Err(Error::UnsupportedFormatType(other.to_string())),
        }
    }

    pub fn default_digit(&self) -> Digit {
        match self {
            ValueFormat::BigDecimal => Digit::big_decimal(),
            _ => Digit::default(),
        }
    }

    /// Regex for the text form of a value of this family (unanchored).
    pub fn generate_regex(&self, size: &Size, digit: &Digit) -> String {
        match self {
            ValueFormat::String => match size.only_equal {
                Some(length) => format!("(?s:.){{{}}}", length.max(0)),
                None => {
                    let min = size.min_value.unwrap_or(0).max(0);
                    match size.max_value {
                        Some(max) => format!("(?s:.){{{},{}}}", min, max.max(min)),
                        None => format!("(?s:.){{{min},}}"),
                    }
                }
            },
            ValueFormat::Integer => {
                format!("{}\\d{{1,{}}}", sign_pattern(size), integer_digits(size, digit))
            }
            ValueFormat::BigDecimal => {
                let integer = format!("{}\\d{{1,{}}}", sign_pattern(size), integer_digits(size, digit));
                if digit.decimal == 0 {
                    integer
                } else {
                    format!("{integer}(?:\\.\\d{{1,{}}})?", digit.decimal)
                }
            }
            ValueFormat::Boolean => "(?i:true|false)".to_string(),
        }
    }

    /// Range check against `size`: character count for strings, numeric value for
    /// numbers, always true for booleans.
    pub fn within_bounds(&self, text: &str, size: &Size) -> bool {
        let (min, max) = size.bounds();
        let measure = match self {
            ValueFormat::String => text.chars().count() as f64,
            ValueFormat::Integer | ValueFormat::BigDecimal => match text.parse::<f64>() {
                Ok(number) => number,
                Err(_) => return false,
            },
            ValueFormat::Boolean => return true,
        };
        min.map_or(true, |min| measure >= min as f64) && max.map_or(true, |max| measure <= max as f64)
    }

    pub fn generate_value<R: Rng>(&self, size: &Size, digit: &Digit, rng: &mut R) -> Value {
        match self {
            ValueFormat::String => {
                let (min, max) = match size.bounds() {
                    (None, None) => DEFAULT_STRING_LENGTH,
                    (min, max) => {
                        let min = min.unwrap_or(DEFAULT_STRING_LENGTH.0.min(max.unwrap_or(0)));
                        let min = min.max(0);
                        (min, max.unwrap_or(min + DEFAULT_STRING_LENGTH.1).max(min))
                    }
                };
                let length = rng.gen_range(min..=max) as usize;
                let text: String = (0..length).map(|_| char::from(rng.sample(Alphanumeric))).collect();
                Value::String(text)
            }
            ValueFormat::Integer => {
                let (min, max) = number_range(size, digit.integer.min(MAX_GENERATED_INTEGER_DIGITS));
                Value::from(rng.gen_range(min..=max))
            }
            ValueFormat::BigDecimal => {
                let (min, max) = number_range(size, digit.integer.min(MAX_GENERATED_INTEGER_DIGITS));
                let decimals = digit.decimal.min(MAX_GENERATED_DECIMAL_DIGITS);
                if decimals == 0 {
                    return Value::from(rng.gen_range(min..=max));
                }
                let decimals = rng.gen_range(1..=decimals);
                let scale = 10i128.pow(decimals);
                let scaled = rng.gen_range(min as i128 * scale..=max as i128 * scale);
                let text = format!(
                    "{}{}.{:0width$}",
                    if scaled < 0 { "-" } else { "" },
                    scaled.abs() / scale,
                    scaled.abs() % scale,
                    width = decimals as usize
                );
                text.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::from(min))
            }
            ValueFormat::Boolean => Value::Bool(rng.gen()),
        }
    }
}

fn sign_pattern(size: &Size) -> &'static str {
    match size.bounds().0 {
        Some(min) if min >= 0 => "",
        _ => "-?",
    }
}

fn digit_count(value: i64) -> u32 {
    value.unsigned_abs().checked_ilog10().map_or(1, |log| log + 1)
}

/// Integer-part digit count allowed by `digit`, narrowed by any numeric bounds.
fn integer_digits(size: &Size, digit: &Digit) -> u32 {
    let allowed = digit.integer.max(1);
    match size.bounds() {
        (Some(min), Some(max)) => allowed.min(digit_count(min).max(digit_count(max))),
        _ => allowed,
    }
}

/// Inclusive integer range for generated numbers.
fn number_range(size: &Size, digits: u32) -> (i64, i64) {
    let cap = 10i64.pow(digits.max(1)) - 1;
    let (min, max) = size.bounds();
    let min = match (min, max) {
        (Some(min), _) => min,
        (None, Some(max)) => max.min(0).saturating_sub(DEFAULT_NUMBER_SPAN),
        (None, None) => 0,
    }
    .max(-cap);
    let max = max
        .unwrap_or_else(|| min.max(0).saturating_add(DEFAULT_NUMBER_SPAN))
        .min(cap);
    (min, max.max(min))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn full_match(pattern: &str, text: &str) -> bool {
        Regex::new(&format!("^(?:{pattern})$")).unwrap().is_match(text)
    }

    #[test]
    fn test_from_value_type() {
        assert_eq!(ValueFormat::from_value_type(ValueType::Str).unwrap(), ValueFormat::String);
        assert_eq!(ValueFormat::from_value_type(ValueType::Int).unwrap(), ValueFormat::Integer);
        assert_eq!(
            ValueFormat::from_value_type(ValueType::Float).unwrap(),
            ValueFormat::BigDecimal
        );
        assert_eq!(ValueFormat::from_value_type(ValueType::Bool).unwrap(), ValueFormat::Boolean);
        assert!(matches!(
            ValueFormat::from_value_type(ValueType::List),
            Err(Error::UnsupportedFormatType(t)) if t == "list"
        ));
    }

    #[test]
    fn test_string_regex() {
        let pattern = ValueFormat::String.generate_regex(&Size::at_most(3), &Digit::default());
        assert_eq!(pattern, "(?s:.){0,3}");
        assert!(full_match(&pattern, "abc"));
        assert!(!full_match(&pattern, "abcd"));

        let pattern = ValueFormat::String.generate_regex(&Size::exactly(2), &Digit::default());
        assert!(full_match(&pattern, "ab"));
        assert!(!full_match(&pattern, "a"));
    }

    #[test]
    fn test_integer_regex() {
        let pattern = ValueFormat::Integer.generate_regex(&Size::default(), &Digit::new(3, 0));
        assert!(full_match(&pattern, "-123"));
        assert!(!full_match(&pattern, "1234"));
        assert!(!full_match(&pattern, "1.5"));

        let pattern = ValueFormat::Integer.generate_regex(&Size::between(0, 50), &Digit::default());
        assert_eq!(pattern, "\\d{1,2}");
        assert!(!full_match(&pattern, "-1"));
    }

    #[test]
    fn test_decimal_regex() {
        let pattern = ValueFormat::BigDecimal.generate_regex(&Size::default(), &Digit::new(3, 2));
        assert!(full_match(&pattern, "12.34"));
        assert!(full_match(&pattern, "-12"));
        assert!(!full_match(&pattern, "12.345"));
    }

    #[test]
    fn test_boolean_regex() {
        let pattern = ValueFormat::Boolean.generate_regex(&Size::default(), &Digit::default());
        assert!(full_match(&pattern, "True"));
        assert!(full_match(&pattern, "false"));
        assert!(!full_match(&pattern, "yes"));
    }

    #[test]
    fn test_within_bounds() {
        let size = Size::between(1, 10);
        assert!(ValueFormat::Integer.within_bounds("10", &size));
        assert!(!ValueFormat::Integer.within_bounds("11", &size));
        assert!(!ValueFormat::BigDecimal.within_bounds("0.5", &size));
        assert!(ValueFormat::String.within_bounds("anything", &size));
        assert!(!ValueFormat::String.within_bounds("", &size));
        assert!(!ValueFormat::String.within_bounds("eleven char", &size));
        assert!(ValueFormat::String.within_bounds("äöü", &Size::exactly(3)));
        assert!(ValueFormat::Boolean.within_bounds("true", &size));
    }

    #[test]
    fn test_generated_values_fit_their_regex() {
        let mut rng = rand::thread_rng();
        let cases = [
            (ValueFormat::String, Size::default(), Digit::default()),
            (ValueFormat::String, Size::between(2, 4), Digit::default()),
            (ValueFormat::String, Size::exactly(5), Digit::default()),
            (ValueFormat::Integer, Size::default(), Digit::default()),
            (ValueFormat::Integer, Size::between(-20, 20), Digit::default()),
            (ValueFormat::Integer, Size::at_most(-10), Digit::default()),
            (ValueFormat::BigDecimal, Size::at_most(-10), Digit::new(6, 2)),
            (ValueFormat::Integer, Size::default(), Digit::new(2, 0)),
            (ValueFormat::BigDecimal, Size::default(), Digit::big_decimal()),
            (ValueFormat::BigDecimal, Size::between(-5, 5), Digit::new(3, 2)),
            (ValueFormat::Boolean, Size::default(), Digit::default()),
        ];
        for (value_format, size, digit) in cases {
            let pattern = value_format.generate_regex(&size, &digit);
            for _ in 0..50 {
                let value = value_format.generate_value(&size, &digit, &mut rng);
                let text = crate::format::stringify(&value);
                assert!(
                    full_match(&pattern, &text) && value_format.within_bounds(&text, &size),
                    "{value_format:?} generated {text} which does not match {pattern}"
                );
            }
        }
    }
}
