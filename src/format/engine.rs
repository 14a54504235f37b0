use super::{stringify, Format, FormatStrategy, ValueFormat, Variable};
use crate::{template::FormatLibrary, value_type::ValueType, Error, Result};
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(\w{1,128})>").expect("placeholder pattern is valid"));

/// Piece of a customize template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Segment<'f> {
    Literal(&'f str),
    Placeholder(&'f str),
}

pub(crate) fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Literal(&template[last..whole.start()]));
        }
        segments.push(Segment::Placeholder(name.as_str()));
        last = whole.end();
    }
    if last < template.len() {
        segments.push(Segment::Literal(&template[last..]));
    }
    segments
}

/// Distinct placeholder names in order of first appearance.
pub fn placeholder_names(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for segment in segments(template) {
        if let Segment::Placeholder(name) = segment {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Evaluates formats against an optional template library.
///
/// Template formats and template variables being expanded are tracked so a
/// self-referencing library fails with [`Error::CyclicFormatReference`].
pub struct FormatEngine<'t> {
    template: Option<&'t FormatLibrary>,
    chain: Vec<String>,
}

impl<'t> FormatEngine<'t> {
    pub fn new(template: Option<&'t FormatLibrary>) -> Self {
        Self {
            template,
            chain: Vec::new(),
        }
    }

    pub fn generate(&mut self, format: &Format, declared: ValueType) -> Result<Value> {
        match format.strategy {
            FormatStrategy::ByDataType => {
                let value_format = ValueFormat::from_value_type(declared)?;
                Ok(value_format.generate_value(
                    &format.effective_size(),
                    &format.effective_digit(value_format),
                    &mut rand::thread_rng(),
                ))
            }
            FormatStrategy::FromEnums => format
                .enums
                .choose(&mut rand::thread_rng())
                .map(|value| Value::String(value.clone()))
                .ok_or_else(|| Error::invalid_format("enums", "cannot be empty")),
            FormatStrategy::Customize => {
                let mut generated: HashMap<&str, String> = HashMap::new();
                let mut output = String::new();
                for segment in segments(&format.customize) {
                    let name = match segment {
                        Segment::Literal(text) => {
                            output.push_str(text);
                            continue;
                        }
                        Segment::Placeholder(name) => name,
                    };
                    if let Some(text) = generated.get(name) {
                        output.push_str(text);
                        continue;
                    }
                    let value = self.with_variable(format, name, |engine, variable| {
                        engine.generate(&variable.value_format, variable.value_type)
                    })?;
                    let text = stringify(&value);
                    output.push_str(&text);
                    generated.insert(name, text);
                }
                Ok(Value::String(output))
            }
            FormatStrategy::FromTemplate => self
                .with_template_format(&format.use_name, |engine, shared| {
                    engine.generate(shared, declared)
                }),
        }
    }

    /// Binds `name` to the format's own variable, or to the template's when the
    /// format declares none. Either scope must hold exactly one definition.
    pub(crate) fn with_variable<T>(
        &mut self,
        format: &Format,
        name: &str,
        walk: impl FnOnce(&mut Self, &Variable) -> Result<T>,
    ) -> Result<T> {
        let local: Vec<&Variable> = format.variables.iter().filter(|v| v.name == name).collect();
        match local.as_slice() {
            [variable] => return walk(self, variable),
            [] => {}
            defined => {
                return Err(Error::AmbiguousVariableBinding {
                    name: name.to_string(),
                    found: defined.len(),
                })
            }
        }

        let shared: Vec<&Variable> = self
            .template
            .map(|template| template.variables_named(name).collect())
            .unwrap_or_default();
        match shared.as_slice() {
            [variable] => {
                let variable = *variable;
                self.guarded(format!("<{name}>"), |engine| walk(engine, variable))
            }
            defined => Err(Error::AmbiguousVariableBinding {
                name: name.to_string(),
                found: defined.len(),
            }),
        }
    }

    pub(crate) fn with_template_format<T>(
        &mut self,
        use_name: &str,
        walk: impl FnOnce(&mut Self, &'t Format) -> Result<T>,
    ) -> Result<T> {
        let shared = self
            .template
            .and_then(|template| template.get_format(use_name))
            .ok_or_else(|| Error::MissingTemplateFormat(use_name.to_string()))?;
        tracing::trace!("Using template format '{use_name}'");
        self.guarded(use_name.to_string(), |engine| walk(engine, shared))
    }

    fn guarded<T>(&mut self, entry: String, walk: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.chain.contains(&entry) {
            let mut chain = self.chain.clone();
            chain.push(entry.clone());
            return Err(Error::CyclicFormatReference { name: entry, chain });
        }
        self.chain.push(entry);
        let result = walk(self);
        self.chain.pop();
        result
    }
}
