use crate::{value_type::ValueType, Result};
use serde_json::{Map, Value};

/// Transient view over a raw schema fragment, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode<'a> {
    Empty,
    Reference(&'a str),
    Scalar {
        value_type: ValueType,
        enums: Vec<String>,
    },
    Array {
        items: Option<&'a Value>,
    },
    Object(ObjectSchema<'a>),
    AdditionalProperties(&'a Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSchema<'a> {
    pub properties: Option<&'a Map<String, Value>>,
    /// `None` when the object declares no `required` list at all.
    pub required: Option<Vec<&'a str>>,
}

impl<'a> ObjectSchema<'a> {
    pub fn from_fragment(fragment: &'a Value) -> Self {
        let properties = fragment.get("properties").and_then(Value::as_object);
        let required = fragment
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect());
        Self {
            properties,
            required,
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| required.contains(&name))
    }

    /// Properties in declaration order; empty when none are declared.
    pub fn properties(&self) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.properties.into_iter().flat_map(|p| p.iter())
    }

    pub fn has_properties(&self) -> bool {
        self.properties.is_some_and(|p| !p.is_empty())
    }
}

impl<'a> SchemaNode<'a> {
    pub fn parse(fragment: &'a Value) -> Result<Self> {
        let Some(object) = fragment.as_object() else {
            return Ok(SchemaNode::Empty);
        };
        if object.is_empty() {
            return Ok(SchemaNode::Empty);
        }

        if let Some(reference) = object
            .get("$ref")
            .and_then(Value::as_str)
            .filter(|r| !r.is_empty())
        {
            return Ok(SchemaNode::Reference(reference));
        }

        match object.get("type").and_then(Value::as_str) {
            Some("array") => Ok(SchemaNode::Array {
                items: object.get("items").filter(|items| !items.is_null()),
            }),
            Some("object") => Ok(Self::parse_object(fragment)),
            Some(token) => Ok(SchemaNode::Scalar {
                value_type: ValueType::from_wire(token)?,
                enums: Self::enum_values(fragment),
            }),
            None if object.contains_key("properties")
                || object.contains_key("additionalProperties") =>
            {
                Ok(Self::parse_object(fragment))
            }
            None => Ok(SchemaNode::Empty),
        }
    }

    fn parse_object(fragment: &'a Value) -> Self {
        match fragment.get("additionalProperties") {
            Some(additional) if additional.is_object() => {
                SchemaNode::AdditionalProperties(additional)
            }
            _ => SchemaNode::Object(ObjectSchema::from_fragment(fragment)),
        }
    }

    fn enum_values(fragment: &Value) -> Vec<String> {
        fragment
            .get("enum")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
