use crate::{registry::ComponentDefinitions, Error, Result};
use serde_json::Value;

const REF_KEY: &str = "$ref";
const ADDITIONAL_PROPERTIES_KEY: &str = "additionalProperties";

/// Where a schema fragment keeps its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `{"$ref": "..."}`
    Ref,
    /// `{"additionalProperties": {"$ref": "..."}}`
    AdditionalProperties,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Ref => "ref",
            ReferenceKind::AdditionalProperties => "additionalProperties",
        }
    }
}

fn direct_ref(fragment: &Value) -> Option<&str> {
    fragment
        .get(REF_KEY)
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
}

pub fn has_ref(fragment: &Value) -> Option<ReferenceKind> {
    if direct_ref(fragment).is_some() {
        return Some(ReferenceKind::Ref);
    }
    fragment
        .get(ADDITIONAL_PROPERTIES_KEY)
        .and_then(direct_ref)
        .map(|_| ReferenceKind::AdditionalProperties)
}

pub fn get_ref(fragment: &Value) -> Result<&str> {
    match has_ref(fragment) {
        Some(ReferenceKind::Ref) => direct_ref(fragment).ok_or(Error::NoReferenceFound),
        Some(ReferenceKind::AdditionalProperties) => fragment
            .get(ADDITIONAL_PROPERTIES_KEY)
            .and_then(direct_ref)
            .ok_or(Error::NoReferenceFound),
        None => Err(Error::NoReferenceFound),
    }
}

/// Splits a reference into lookup segments, dropping the `#` anchor and the
/// registry's own section name.
fn reference_segments(reference: &str, section: Option<&str>) -> Vec<String> {
    let mut segments: Vec<String> = reference
        .trim_start_matches('#')
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect();
    if let (Some(first), Some(section)) = (segments.first(), section) {
        if first == section {
            segments.remove(0);
        }
    }
    segments
}

fn walk_segments<'a>(mut current: &'a Value, segments: &[String], reference: &str) -> Result<&'a Value> {
    for segment in segments {
        current = current
            .get(segment.as_str())
            .ok_or_else(|| Error::UnresolvableReference(reference.to_string()))?;
    }
    Ok(current)
}

/// Walks `definitions` along a reference path such as `#/components/schemas/Foo`.
pub fn resolve_path<'a>(definitions: &'a ComponentDefinitions, reference: &str) -> Result<&'a Value> {
    let segments = reference_segments(reference, definitions.section());
    let (first, rest) = segments
        .split_first()
        .ok_or_else(|| Error::UnresolvableReference(reference.to_string()))?;

    let root = definitions
        .get(first)
        .ok_or_else(|| Error::UnresolvableReference(reference.to_string()))?;
    let resolved = walk_segments(root, rest, reference)?;
    tracing::debug!("Resolved reference '{reference}'");
    Ok(resolved)
}

/// Walks a whole document from its root, for references outside the schema
/// registry such as `#/parameters/Limit`.
pub fn resolve_in_document<'a>(document: &'a Value, reference: &str) -> Result<&'a Value> {
    let segments = reference_segments(reference, None);
    if segments.is_empty() {
        return Err(Error::UnresolvableReference(reference.to_string()));
    }
    walk_segments(document, &segments, reference)
}

/// Resolves whichever reference `fragment` carries.
pub fn resolve<'a>(definitions: &'a ComponentDefinitions, fragment: &Value) -> Result<&'a Value> {
    let reference = get_ref(fragment)?;
    resolve_path(definitions, reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definitions() -> ComponentDefinitions {
        let doc = json!({
            "schemas": {
                "Foo": {"type": "object", "properties": {"id": {"type": "integer"}}},
                "a/b": {"type": "string"},
            }
        });
        ComponentDefinitions::with_section("components", doc.as_object().cloned().unwrap())
    }

    #[test]
    fn test_has_ref() {
        assert_eq!(has_ref(&json!({"$ref": "#/Foo"})), Some(ReferenceKind::Ref));
        assert_eq!(has_ref(&json!({"$ref": ""})), None);
        assert_eq!(has_ref(&json!({"$ref": null})), None);
        assert_eq!(
            has_ref(&json!({"type": "object", "additionalProperties": {"$ref": "#/Foo"}})),
            Some(ReferenceKind::AdditionalProperties)
        );
        assert_eq!(has_ref(&json!({"additionalProperties": {"$ref": ""}})), None);
        assert_eq!(has_ref(&json!({"type": "string"})), None);
    }

    #[test]
    fn test_get_ref() {
        assert_eq!(get_ref(&json!({"$ref": "reference value"})).unwrap(), "reference value");
        assert_eq!(
            get_ref(&json!({"additionalProperties": {"$ref": "reference value"}})).unwrap(),
            "reference value"
        );
        assert!(matches!(get_ref(&json!({})), Err(Error::NoReferenceFound)));
    }

    #[test]
    fn test_resolve_with_section_prefix() {
        let defs = definitions();
        let resolved = resolve(&defs, &json!({"$ref": "#/components/schemas/Foo"})).unwrap();
        assert_eq!(resolved["type"], "object");
    }

    #[test]
    fn test_resolve_escaped_segment() {
        let defs = definitions();
        let resolved = resolve_path(&defs, "#/components/schemas/a~1b").unwrap();
        assert_eq!(resolved["type"], "string");
    }

    #[test]
    fn test_resolve_bare_registry() {
        let defs = ComponentDefinitions::new(
            json!({"Foo": {"type": "string"}}).as_object().cloned().unwrap(),
        );
        assert_eq!(resolve_path(&defs, "#/Foo").unwrap()["type"], "string");
    }

    #[test]
    fn test_unresolvable_reference() {
        let defs = definitions();
        let err = resolve_path(&defs, "#/components/schemas/Missing").unwrap_err();
        assert!(matches!(err, Error::UnresolvableReference(r) if r == "#/components/schemas/Missing"));
        assert!(matches!(
            resolve_path(&defs, "#/"),
            Err(Error::UnresolvableReference(_))
        ));
    }

    #[test]
    fn test_resolve_in_document() {
        let doc = json!({"parameters": {"Limit": {"name": "limit", "in": "query"}}});
        assert_eq!(resolve_in_document(&doc, "#/parameters/Limit").unwrap()["name"], "limit");
        assert!(matches!(
            resolve_in_document(&doc, "#/parameters/Offset"),
            Err(Error::UnresolvableReference(_))
        ));
    }

    #[test]
    fn test_resolve_without_reference() {
        let defs = definitions();
        assert!(matches!(
            resolve(&defs, &json!({"type": "string"})),
            Err(Error::NoReferenceFound)
        ));
    }
}
