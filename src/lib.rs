pub mod builder;
pub mod cli;
pub mod document;
pub mod error;
pub mod format;
pub mod property;
pub mod reference;
pub mod registry;
pub mod response;
pub mod schema;
pub mod template;
pub mod value_type;

pub use builder::{ResolvedSchema, SchemaResolver};
pub use document::{parse_document, ApiOperation, OpenApiVersion, RequestParameter};
pub use error::Error;
pub use format::{generate_value, value_matches_format, Format, FormatStrategy};
pub use property::{process_empty_body, PropertyDetail};
pub use registry::ComponentDefinitions;
pub use response::{ResponseProperty, ResponseStrategy};
pub use template::{FormatLibrary, TemplateConfig};
pub use value_type::ValueType;

pub type Result<T> = std::result::Result<T, Error>;
