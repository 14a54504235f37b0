use crate::{
    builder::{PropertyTreeBuilder, SchemaResolver},
    property::PropertyDetail,
    reference::{self, ReferenceKind},
    registry::ComponentDefinitions,
    response::{ResponseProperty, ResponseStrategy},
    schema::SchemaNode,
    value_type::ValueType,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "options", "head", "patch"];

/// Content types tried in order when picking an OpenAPI 3 media type.
pub const SUPPORTED_CONTENT_TYPES: [&str; 4] = [
    "application/json",
    "application/octet-stream",
    "text/plain",
    "*/*",
];

const SUCCESS_STATUS: &str = "200";
static EMPTY_SCHEMA: Value = Value::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpenApiVersion {
    V2,
    V3,
}

impl OpenApiVersion {
    /// Reads the `swagger` (2.x) or `openapi` (3.x) field of a document.
    pub fn detect(document: &Value) -> Result<Self> {
        match document.get("swagger").or_else(|| document.get("openapi")) {
            Some(Value::String(version)) => Self::from_version(version),
            Some(other) => Self::from_version(&other.to_string()),
            None => Err(Error::UnsupportedOpenApiVersion(
                "document has no 'swagger' or 'openapi' field".to_string(),
            )),
        }
    }

    pub fn from_version(version: &str) -> Result<Self> {
        let major = version.split('.').next().unwrap_or_default().trim();
        match major {
            "2" => Ok(OpenApiVersion::V2),
            "3" => Ok(OpenApiVersion::V3),
            _ => Err(Error::UnsupportedOpenApiVersion(version.to_string())),
        }
    }

    /// Document-level key holding the reusable schema fragments.
    pub fn definitions_key(&self) -> &'static str {
        match self {
            OpenApiVersion::V2 => "definitions",
            OpenApiVersion::V3 => "components",
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PropertyDetail>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiOperation {
    pub path: String,
    pub http_method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<RequestParameter>,
    /// `None` when the operation declares no 200 response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseProperty>,
}

impl ApiOperation {
    /// Identifier such as `get_v1_users_{id}`, relative to `base_path`.
    pub fn api_key(&self, base_path: &str) -> String {
        let path = self.path.strip_prefix(base_path).unwrap_or(&self.path);
        format!(
            "{}_{}",
            self.http_method,
            path.trim_start_matches('/').replace('/', "_")
        )
    }
}

fn select_media_type(content: &Value) -> Option<&Value> {
    SUPPORTED_CONTENT_TYPES
        .iter()
        .find_map(|content_type| content.get(*content_type))
        .or_else(|| content.as_object().and_then(|media| media.values().next()))
}

/// Walks the paths of one Swagger 2 / OpenAPI 3 document.
pub struct DocumentParser<'d> {
    document: &'d Value,
    version: OpenApiVersion,
    resolver: SchemaResolver,
}

impl<'d> DocumentParser<'d> {
    pub fn new(document: &'d Value) -> Result<Self> {
        let version = OpenApiVersion::detect(document)?;
        let definitions = ComponentDefinitions::from_document(document, version);
        Ok(Self {
            document,
            version,
            resolver: SchemaResolver::new(definitions),
        })
    }

    pub fn version(&self) -> OpenApiVersion {
        self.version
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    /// Swagger 2 `basePath`; empty for OpenAPI 3.
    pub fn base_path(&self) -> &str {
        match self.version {
            OpenApiVersion::V2 => self
                .document
                .get("basePath")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            OpenApiVersion::V3 => "",
        }
    }

    pub fn parse(&self, strategy: ResponseStrategy) -> Result<Vec<ApiOperation>> {
        let Some(paths) = self.document.get("paths").and_then(Value::as_object) else {
            tracing::warn!("Document has no paths");
            return Ok(Vec::new());
        };

        let mut operations = Vec::new();
        for (path, item) in paths {
            let item = self.dereference(item)?;
            let Some(item) = item.as_object() else {
                continue;
            };
            for (method, operation) in item {
                if !HTTP_METHODS.contains(&method.as_str()) {
                    continue;
                }
                operations.push(self.process_operation(path, method, operation, strategy)?);
            }
        }
        tracing::info!(
            "Parsed {} operations from {} paths ({:?})",
            operations.len(),
            paths.len(),
            self.version
        );
        Ok(operations)
    }

    fn process_operation(
        &self,
        path: &str,
        method: &str,
        operation: &'d Value,
        strategy: ResponseStrategy,
    ) -> Result<ApiOperation> {
        tracing::debug!("Processing {} {path}", method.to_uppercase());
        let tags = operation
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        let response = match self.response_schema(operation)? {
            Some(schema) => Some(strategy.resolve_response(&self.resolver, schema)?),
            None => {
                tracing::warn!(
                    "{} {path} has no {SUCCESS_STATUS} response, skipping its response",
                    method.to_uppercase()
                );
                None
            }
        };

        Ok(ApiOperation {
            path: path.to_string(),
            http_method: method.to_string(),
            tags,
            parameters: self.parameters(method, operation)?,
            response,
        })
    }

    /// Schema of the 200 response. A response without a body yields an empty schema.
    fn response_schema(&self, operation: &'d Value) -> Result<Option<&'d Value>> {
        let Some(response) = operation
            .get("responses")
            .and_then(|responses| responses.get(SUCCESS_STATUS))
        else {
            return Ok(None);
        };
        let response = self.dereference(response)?;
        let schema = match self.version {
            OpenApiVersion::V2 => response.get("schema"),
            OpenApiVersion::V3 => response
                .get("content")
                .and_then(select_media_type)
                .and_then(|media| media.get("schema")),
        };
        Ok(Some(schema.unwrap_or(&EMPTY_SCHEMA)))
    }

    fn parameters(&self, method: &str, operation: &'d Value) -> Result<Vec<RequestParameter>> {
        let mut builder = self.resolver.builder();
        let mut parameters = Vec::new();

        for parameter in operation
            .get("parameters")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let parameter = self.dereference(parameter)?;
            let name = parameter.get("name").and_then(Value::as_str).unwrap_or_default();
            let required = parameter
                .get("required")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            match (self.version, parameter.get("schema")) {
                (OpenApiVersion::V2, Some(schema)) => {
                    parameters.extend(self.body_parameters(&mut builder, name, required, schema)?)
                }
                (OpenApiVersion::V2, None) => parameters.push(parameter_from_schema(
                    &mut builder,
                    name,
                    required,
                    parameter,
                )?),
                (OpenApiVersion::V3, schema) => parameters.push(parameter_from_schema(
                    &mut builder,
                    name,
                    required,
                    schema.unwrap_or(&EMPTY_SCHEMA),
                )?),
            }
        }

        if self.version == OpenApiVersion::V3 && method != "get" {
            if let Some(body) = operation.get("requestBody") {
                let body = self.dereference(body)?;
                let required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
                if let Some(schema) = body
                    .get("content")
                    .and_then(select_media_type)
                    .and_then(|media| media.get("schema"))
                {
                    parameters.extend(self.body_parameters(&mut builder, "body", required, schema)?);
                }
            }
        }
        Ok(parameters)
    }

    /// A body whose schema is an object (directly or through a reference)
    /// becomes one parameter per property.
    fn body_parameters(
        &self,
        builder: &mut PropertyTreeBuilder<'_>,
        name: &str,
        required: bool,
        schema: &Value,
    ) -> Result<Vec<RequestParameter>> {
        let resolved = match reference::has_ref(schema) {
            Some(ReferenceKind::Ref) => reference::resolve_path(
                self.resolver.component_definitions(),
                reference::get_ref(schema)?,
            )?,
            _ => schema,
        };
        match SchemaNode::parse(resolved)? {
            SchemaNode::Object(object) if object.has_properties() => object
                .properties()
                .map(|(property, fragment)| {
                    parameter_from_schema(builder, property, object.is_required(property), fragment)
                })
                .collect(),
            _ => Ok(vec![parameter_from_schema(builder, name, required, schema)?]),
        }
    }

    fn dereference(&self, fragment: &'d Value) -> Result<&'d Value> {
        if reference::has_ref(fragment) != Some(ReferenceKind::Ref) {
            return Ok(fragment);
        }
        reference::resolve_in_document(self.document, reference::get_ref(fragment)?)
    }
}

fn parameter_from_schema(
    builder: &mut PropertyTreeBuilder<'_>,
    name: &str,
    required: bool,
    schema: &Value,
) -> Result<RequestParameter> {
    let detail = builder.build(schema, name, required)?.normalize_empty_body();
    Ok(RequestParameter {
        name: name.to_string(),
        required,
        value_type: detail.value_type,
        default: schema.get("default").cloned(),
        items: detail.items,
    })
}

/// Parses every operation of `document`, shaping responses with `strategy`.
pub fn parse_document(document: &Value, strategy: ResponseStrategy) -> Result<Vec<ApiOperation>> {
    DocumentParser::new(document)?.parse(strategy)
}
