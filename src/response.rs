use crate::{
    builder::{PropertyTreeBuilder, SchemaResolver},
    property::PropertyDetail,
    reference, Error, Result,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Container shape of a mocked HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStrategy {
    String,
    File,
    Object,
}

impl fmt::Display for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseStrategy::String => f.write_str("string"),
            ResponseStrategy::File => f.write_str("file"),
            ResponseStrategy::Object => f.write_str("object"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Used by [`ResponseStrategy::Object`].
    Properties(Vec<PropertyDetail>),
    /// Used by every other strategy; keyed by property name, or `"0"` for a bare root.
    Keyed(IndexMap<String, PropertyDetail>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseProperty {
    pub strategy: ResponseStrategy,
    pub data: ResponseData,
}

impl ResponseProperty {
    pub fn push_property(&mut self, property: PropertyDetail) -> Result<()> {
        match (&self.strategy, &mut self.data) {
            (ResponseStrategy::Object, ResponseData::Properties(properties)) => {
                properties.push(property);
                Ok(())
            }
            _ => Err(Error::ResponseShapeMismatch(self.strategy)),
        }
    }

    pub fn insert_property(&mut self, key: impl Into<String>, property: PropertyDetail) -> Result<()> {
        match (&self.strategy, &mut self.data) {
            (ResponseStrategy::Object, _) | (_, ResponseData::Properties(_)) => {
                Err(Error::ResponseShapeMismatch(self.strategy))
            }
            (_, ResponseData::Keyed(map)) => {
                map.insert(key.into(), property);
                Ok(())
            }
        }
    }

    pub fn normalize_empty_body(self) -> Self {
        let data = match self.data {
            ResponseData::Properties(properties) => {
                ResponseData::Properties(crate::property::process_empty_body(properties))
            }
            ResponseData::Keyed(map) => ResponseData::Keyed(
                map.into_iter()
                    .map(|(k, v)| (k, v.normalize_empty_body()))
                    .collect(),
            ),
        };
        Self {
            strategy: self.strategy,
            data,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ResponseData::Properties(properties) => properties.len(),
            ResponseData::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseStrategy {
    pub fn initial_response_data(self) -> ResponseProperty {
        let data = match self {
            ResponseStrategy::Object => ResponseData::Properties(Vec::new()),
            _ => ResponseData::Keyed(IndexMap::new()),
        };
        ResponseProperty {
            strategy: self,
            data,
        }
    }

    /// Resolves a response schema into this strategy's container and normalizes empty bodies.
    pub fn resolve_response(self, resolver: &SchemaResolver, schema: &Value) -> Result<ResponseProperty> {
        let mut builder = resolver.builder();
        let response = if reference::has_ref(schema).is_some() {
            self.process_response_from_reference(&mut builder, schema)?
        } else {
            self.process_response_from_data(&mut builder, schema)?
        };
        Ok(response.normalize_empty_body())
    }

    /// One entry per property of the referenced object. Without a `required`
    /// list on that object every property counts as required.
    pub fn process_response_from_reference(
        self,
        builder: &mut PropertyTreeBuilder<'_>,
        data: &Value,
    ) -> Result<ResponseProperty> {
        let mut response = self.initial_response_data();
        let properties = builder.reference_properties(reference::get_ref(data)?, true)?;
        for property in properties {
            match self {
                ResponseStrategy::Object => response.push_property(property)?,
                _ => {
                    let key = property.name.clone();
                    response.insert_property(key, property)?
                }
            }
        }
        Ok(response)
    }

    pub fn process_response_from_data(
        self,
        builder: &mut PropertyTreeBuilder<'_>,
        data: &Value,
    ) -> Result<ResponseProperty> {
        let mut response = self.initial_response_data();
        let property = builder.build(data, "", true)?;
        match self {
            ResponseStrategy::Object => response.push_property(property)?,
            _ => response.insert_property("0", property)?,
        }
        Ok(response)
    }
}
