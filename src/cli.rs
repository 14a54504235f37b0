use crate::{response::ResponseStrategy, value_type::ValueType, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve every operation of a Swagger 2 / OpenAPI 3 document into mock properties
    Resolve {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = ResponseStrategy::Object)]
        strategy: ResponseStrategy,

        /// Output file; printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate a value from a format of the template configuration
    Generate {
        #[arg(short, long)]
        config: PathBuf,

        /// Name of the format entity
        #[arg(short, long)]
        name: String,

        #[arg(short = 't', long = "type", default_value = "str")]
        value_type: ValueType,
    },
    /// Check a value against a format of the template configuration
    Check {
        #[arg(short, long)]
        config: PathBuf,

        /// Name of the format entity
        #[arg(short, long)]
        name: String,

        #[arg(short = 't', long = "type", default_value = "str")]
        value_type: ValueType,

        /// Value to check, taken as literal text
        #[arg(long)]
        value: String,

        /// Parse `--value` as JSON (numbers, booleans, quoted strings)
        #[arg(long)]
        json: bool,
    },
}

/// The value `check` matches: literal text, or a JSON document when `json` is set.
pub fn check_value(value: String, json: bool) -> Result<Value> {
    if json {
        Ok(serde_json::from_str(&value)?)
    } else {
        Ok(Value::String(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn parse_check(args: &[&str]) -> (String, bool) {
        let args = Args::try_parse_from(args).unwrap();
        match args.command {
            Command::Check { value, json, .. } => (value, json),
            other => panic!("expected check, got {other:?}"),
        }
    }

    #[test]
    fn test_check_value_is_text_by_default() {
        let (value, json) = parse_check(&["ome", "check", "-c", "t.yaml", "-n", "code", "--value", "123"]);
        assert!(!json);
        assert_eq!(check_value(value, json).unwrap(), Value::String("123".to_string()));
    }

    #[test]
    fn test_check_value_as_json() {
        let (value, json) =
            parse_check(&["ome", "check", "-c", "t.yaml", "-n", "code", "--value", "123", "--json"]);
        assert!(json);
        assert_eq!(check_value(value, json).unwrap(), Value::from(123));
        assert!(matches!(
            check_value("not json".to_string(), true),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_verbosity_is_global() {
        let args = Args::try_parse_from(["ome", "generate", "-c", "t.yaml", "-n", "code", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Command::Generate { value_type: ValueType::Str, .. }));
    }
}
