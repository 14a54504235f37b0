use crate::{
    format::Format,
    property::{process_empty_body, PropertyDetail},
    reference::{self, ReferenceKind},
    registry::ComponentDefinitions,
    schema::{ObjectSchema, SchemaNode},
    value_type::ValueType,
    Error, Result,
};
use serde_json::Value;

/// Outcome of resolving a root schema: a referenced object expands into its
/// property list, anything else into a single property tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedSchema {
    Property(PropertyDetail),
    Properties(Vec<PropertyDetail>),
}

/// Owns the component definitions of one document and resolves schemas against them.
#[derive(Debug, Clone, Default)]
pub struct SchemaResolver {
    definitions: ComponentDefinitions,
}

impl SchemaResolver {
    pub fn new(definitions: ComponentDefinitions) -> Self {
        Self { definitions }
    }

    pub fn set_component_definitions(&mut self, definitions: ComponentDefinitions) {
        self.definitions = definitions;
    }

    pub fn component_definitions(&self) -> &ComponentDefinitions {
        &self.definitions
    }

    pub fn builder(&self) -> PropertyTreeBuilder<'_> {
        PropertyTreeBuilder::new(&self.definitions)
    }

    pub fn resolve_schema(&self, root: &Value) -> Result<ResolvedSchema> {
        let mut builder = self.builder();
        if reference::has_ref(root) == Some(ReferenceKind::Ref) {
            let properties = builder.reference_properties(reference::get_ref(root)?, false)?;
            return Ok(ResolvedSchema::Properties(process_empty_body(properties)));
        }
        let property = builder.build(root, "", true)?;
        Ok(ResolvedSchema::Property(property.normalize_empty_body()))
    }
}

/// Recursive walker turning raw schema fragments into [`PropertyDetail`] trees.
///
/// The chain of references currently being expanded is kept so that a
/// self-referencing document fails with [`Error::CyclicSchemaReference`].
pub struct PropertyTreeBuilder<'a> {
    definitions: &'a ComponentDefinitions,
    chain: Vec<String>,
}

impl<'a> PropertyTreeBuilder<'a> {
    pub fn new(definitions: &'a ComponentDefinitions) -> Self {
        Self {
            definitions,
            chain: Vec::new(),
        }
    }

    pub fn build(&mut self, fragment: &Value, name: &str, required: bool) -> Result<PropertyDetail> {
        match SchemaNode::parse(fragment)? {
            SchemaNode::Empty => Ok(PropertyDetail::empty_marker()),
            SchemaNode::Reference(reference) => self.reference_node(reference, name, required, false),
            SchemaNode::Scalar { value_type, enums } => {
                let property = PropertyDetail::new(name, required, value_type);
                if enums.is_empty() {
                    Ok(property)
                } else {
                    Ok(property.with_format(Format::from_enums(enums)))
                }
            }
            SchemaNode::Array { items } => {
                let items = match items {
                    None => vec![PropertyDetail::empty_marker()],
                    Some(items) => match SchemaNode::parse(items)? {
                        SchemaNode::Reference(reference) => self.reference_items(reference)?,
                        _ => vec![self.build(items, "", true)?],
                    },
                };
                Ok(PropertyDetail::new(name, required, ValueType::List).with_items(items))
            }
            SchemaNode::Object(object) => {
                let items = self.object_items(&object, false)?;
                Ok(PropertyDetail::new(name, required, ValueType::Dict).with_items(items))
            }
            SchemaNode::AdditionalProperties(additional) => match SchemaNode::parse(additional)? {
                // Keyed values default to required unless the object lists its own.
                SchemaNode::Reference(reference) => {
                    self.reference_node(reference, name, required, true)
                }
                _ => self.build(additional, name, required),
            },
        }
    }

    /// Properties of the object a reference points at, each flagged by the
    /// object's own `required` list.
    pub fn reference_properties(
        &mut self,
        reference: &str,
        required_when_undeclared: bool,
    ) -> Result<Vec<PropertyDetail>> {
        self.expand(reference, |builder, resolved| match SchemaNode::parse(resolved)? {
            SchemaNode::Object(object) => builder.object_items(&object, required_when_undeclared),
            _ => Ok(vec![builder.build(resolved, "", true)?]),
        })
    }

    fn reference_node(
        &mut self,
        reference: &str,
        name: &str,
        required: bool,
        required_when_undeclared: bool,
    ) -> Result<PropertyDetail> {
        self.expand(reference, |builder, resolved| match SchemaNode::parse(resolved)? {
            SchemaNode::Object(object) => {
                let items = builder.object_items(&object, required_when_undeclared)?;
                Ok(PropertyDetail::new(name, required, ValueType::Dict).with_items(items))
            }
            _ => builder.build(resolved, name, required),
        })
    }

    fn reference_items(&mut self, reference: &str) -> Result<Vec<PropertyDetail>> {
        self.reference_properties(reference, false)
    }

    fn object_items(
        &mut self,
        object: &ObjectSchema<'_>,
        required_when_undeclared: bool,
    ) -> Result<Vec<PropertyDetail>> {
        if !object.has_properties() {
            return Ok(vec![PropertyDetail::empty_marker()]);
        }
        object
            .properties()
            .map(|(name, fragment)| {
                let required = match object.required {
                    Some(_) => object.is_required(name),
                    None => required_when_undeclared,
                };
                self.build(fragment, name, required)
            })
            .collect()
    }

    fn expand<T>(
        &mut self,
        reference: &str,
        walk: impl FnOnce(&mut Self, &'a Value) -> Result<T>,
    ) -> Result<T> {
        if self.chain.iter().any(|r| r == reference) {
            let mut chain = self.chain.clone();
            chain.push(reference.to_string());
            return Err(Error::CyclicSchemaReference {
                reference: reference.to_string(),
                chain,
            });
        }

        let definitions = self.definitions;
        let resolved = reference::resolve_path(definitions, reference)?;
        tracing::debug!("Expanding reference '{reference}' at depth {}", self.chain.len());

        self.chain.push(reference.to_string());
        let result = walk(self, resolved);
        self.chain.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn foo_resolver() -> SchemaResolver {
        let defs = json!({
            "Foo": {
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "integer"}, "name": {"type": "string"}},
            }
        });
        SchemaResolver::new(ComponentDefinitions::new(defs.as_object().cloned().unwrap()))
    }

    #[test]
    fn test_scalar_nodes() {
        let resolver = foo_resolver();
        for (wire, expected) in [
            ("string", ValueType::Str),
            ("integer", ValueType::Int),
            ("number", ValueType::Int),
            ("boolean", ValueType::Bool),
            ("file", ValueType::File),
        ] {
            let ResolvedSchema::Property(property) =
                resolver.resolve_schema(&json!({"type": wire})).unwrap()
            else {
                panic!("expected a single property");
            };
            assert_eq!(property.value_type, Some(expected));
            assert_eq!(property.items, None);
            assert!(property.required);
            assert_eq!(property.name, "");
        }
    }

    #[test]
    fn test_array_of_reference_is_flattened() {
        let resolver = foo_resolver();
        let root = json!({"type": "array", "items": {"$ref": "#/Foo"}});
        let ResolvedSchema::Property(property) = resolver.resolve_schema(&root).unwrap() else {
            panic!("expected a single property");
        };
        assert_eq!(property.value_type, Some(ValueType::List));
        assert_eq!(
            property.items,
            Some(vec![
                PropertyDetail::new("id", true, ValueType::Int),
                PropertyDetail::new("name", false, ValueType::Str),
            ])
        );
    }

    #[test]
    fn test_array_of_scalar() {
        let resolver = foo_resolver();
        let root = json!({"type": "array", "items": {"type": "integer"}});
        let ResolvedSchema::Property(property) = resolver.resolve_schema(&root).unwrap() else {
            panic!("expected a single property");
        };
        assert_eq!(property.items, Some(vec![PropertyDetail::new("", true, ValueType::Int)]));
    }

    #[test]
    fn test_root_reference_expands_properties() {
        let resolver = foo_resolver();
        let resolved = resolver.resolve_schema(&json!({"$ref": "#/Foo"})).unwrap();
        assert_eq!(
            resolved,
            ResolvedSchema::Properties(vec![
                PropertyDetail::new("id", true, ValueType::Int),
                PropertyDetail::new("name", false, ValueType::Str),
            ])
        );
    }

    #[test]
    fn test_additional_properties_reference_defaults_to_required() {
        let defs = json!({
            "Tag": {"type": "object", "properties": {"label": {"type": "string"}}},
        });
        let resolver =
            SchemaResolver::new(ComponentDefinitions::new(defs.as_object().cloned().unwrap()));
        let ResolvedSchema::Property(property) = resolver
            .resolve_schema(&json!({"type": "object", "additionalProperties": {"$ref": "#/Tag"}}))
            .unwrap()
        else {
            panic!("expected a single property");
        };
        assert_eq!(property.items, Some(vec![PropertyDetail::new("label", true, ValueType::Str)]));

        let resolver = foo_resolver();
        let ResolvedSchema::Property(property) = resolver
            .resolve_schema(&json!({"type": "object", "additionalProperties": {"$ref": "#/Foo"}}))
            .unwrap()
        else {
            panic!("expected a single property");
        };
        assert_eq!(
            property.items,
            Some(vec![
                PropertyDetail::new("id", true, ValueType::Int),
                PropertyDetail::new("name", false, ValueType::Str),
            ])
        );
    }

    #[test]
    fn test_enum_scalar_carries_format() {
        let resolver = foo_resolver();
        let root = json!({"type": "string", "enum": ["A", "B"]});
        let ResolvedSchema::Property(property) = resolver.resolve_schema(&root).unwrap() else {
            panic!("expected a single property");
        };
        assert_eq!(
            property.format,
            Some(Format::from_enums(vec!["A".to_string(), "B".to_string()]))
        );
    }

    #[test]
    fn test_cyclic_reference_is_reported() {
        let defs = json!({
            "A": {"type": "object", "properties": {"b": {"$ref": "#/B"}}},
            "B": {"type": "object", "properties": {"a": {"$ref": "#/A"}}},
        });
        let resolver = SchemaResolver::new(ComponentDefinitions::new(defs.as_object().cloned().unwrap()));
        let err = resolver.resolve_schema(&json!({"$ref": "#/A"})).unwrap_err();
        match err {
            Error::CyclicSchemaReference { reference, chain } => {
                assert_eq!(reference, "#/A");
                assert_eq!(chain, vec!["#/A", "#/B", "#/A"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sibling_references_are_not_cycles() {
        let defs = json!({
            "Domain": {"type": "object", "properties": {"domain": {"type": "string"}}},
            "Urls": {
                "type": "object",
                "required": ["homePage", "detailInfo"],
                "properties": {
                    "homePage": {"$ref": "#/Domain"},
                    "detailInfo": {"$ref": "#/Domain"},
                },
            },
        });
        let resolver = SchemaResolver::new(ComponentDefinitions::new(defs.as_object().cloned().unwrap()));
        let ResolvedSchema::Properties(properties) =
            resolver.resolve_schema(&json!({"$ref": "#/Urls"})).unwrap()
        else {
            panic!("expected properties");
        };
        assert_eq!(properties.len(), 2);
        assert!(properties.iter().all(|p| p.value_type == Some(ValueType::Dict) && p.required));
    }

    #[test]
    fn test_unresolvable_reference_propagates() {
        let resolver = foo_resolver();
        let root = json!({"type": "array", "items": {"$ref": "#/Missing"}});
        assert!(matches!(
            resolver.resolve_schema(&root),
            Err(Error::UnresolvableReference(r)) if r == "#/Missing"
        ));
    }
}
