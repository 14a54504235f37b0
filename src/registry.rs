use crate::document::OpenApiVersion;
use serde_json::{Map, Value};

/// Raw schema fragments addressable by `$ref`, loaded once per document.
///
/// `section` is the document-level key the fragments were loaded from
/// (`definitions` for Swagger 2, `components` for OpenAPI 3). References
/// spelled with that leading segment have it stripped before lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentDefinitions {
    section: Option<String>,
    definitions: Map<String, Value>,
}

impl ComponentDefinitions {
    pub fn new(definitions: Map<String, Value>) -> Self {
        Self {
            section: None,
            definitions,
        }
    }

    pub fn with_section(section: impl Into<String>, definitions: Map<String, Value>) -> Self {
        Self {
            section: Some(section.into()),
            definitions,
        }
    }

    pub fn from_document(document: &Value, version: OpenApiVersion) -> Self {
        let section = version.definitions_key();
        let definitions = document
            .get(section)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        tracing::debug!(
            "Loaded {} component definitions from section '{section}'",
            definitions.len()
        );
        Self::with_section(section, definitions)
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn definitions(&self) -> &Map<String, Value> {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
