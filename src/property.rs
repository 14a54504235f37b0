use crate::{format::Format, value_type::ValueType};
use serde::{Deserialize, Serialize};

/// Name carried by the placeholder node the builder emits for an empty schema body.
pub const EMPTY_PROPERTY_NAME: &str = "THIS_IS_EMPTY";

fn is_false(value: &bool) -> bool {
    !*value
}

/// One named (or anonymous) value of a mocked request or response shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PropertyDetail>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_empty: bool,
}

impl PropertyDetail {
    pub fn new(name: impl Into<String>, required: bool, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            required,
            value_type: Some(value_type),
            ..Default::default()
        }
    }

    /// Placeholder for an empty or absent schema body, resolved by [`process_empty_body`].
    pub fn empty_marker() -> Self {
        Self {
            name: EMPTY_PROPERTY_NAME.to_string(),
            required: false,
            ..Default::default()
        }
    }

    pub fn with_items(mut self, items: Vec<PropertyDetail>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn is_empty_marker(&self) -> bool {
        self.name == EMPTY_PROPERTY_NAME && self.value_type.is_none()
    }

    /// Rewrites empty markers in this subtree.
    ///
    /// A marker itself loses its name and becomes `is_empty`. A node whose direct
    /// child is a marker drops all of its items and becomes `is_empty`; the flag is
    /// not carried any further up.
    pub fn normalize_empty_body(mut self) -> Self {
        if self.is_empty_marker() {
            self.name.clear();
            self.is_empty = true;
            return self;
        }
        if let Some(items) = self.items.take() {
            if items.iter().any(PropertyDetail::is_empty_marker) {
                self.items = Some(Vec::new());
                self.is_empty = true;
            } else {
                self.items = Some(process_empty_body(items));
            }
        }
        self
    }
}

pub fn process_empty_body(properties: Vec<PropertyDetail>) -> Vec<PropertyDetail> {
    properties
        .into_iter()
        .map(PropertyDetail::normalize_empty_body)
        .collect()
}
