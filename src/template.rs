use crate::{
    format::{Format, Variable},
    Error, Result,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named format shared through the template configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatEntity {
    pub name: String,
    pub config: Format,
}

/// Formats and variables any property format may delegate to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatLibrary {
    #[serde(default)]
    pub entities: Vec<FormatEntity>,
    #[serde(default)]
    pub variables: Vec<Variable>,
}

impl FormatLibrary {
    pub fn get_format(&self, name: &str) -> Option<&Format> {
        self.entities
            .iter()
            .find(|entity| entity.name == name)
            .map(|entity| &entity.config)
    }

    pub fn get_variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|variable| variable.name == name)
    }

    pub fn variables_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Variable> {
        self.variables.iter().filter(move |variable| variable.name == name)
    }

    pub fn validate(&self) -> Result<()> {
        for (index, entity) in self.entities.iter().enumerate() {
            if entity.name.is_empty() {
                return Err(Error::invalid_format(
                    format!("common_config.format.entities[{index}].name"),
                    "cannot be empty",
                ));
            }
            if self.entities[..index].iter().any(|e| e.name == entity.name) {
                return Err(Error::invalid_format(
                    format!("common_config.format.entities[{index}].name"),
                    format!("format '{}' is defined more than once", entity.name),
                ));
            }
            entity
                .config
                .validate(&format!("common_config.format.entities.{}", entity.name))?;
        }
        for variable in &self.variables {
            variable.validate("common_config.format.variables")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateCommonConfig {
    #[serde(default)]
    pub format: FormatLibrary,
}

/// APIs a template applies to, either plain names or grouped by tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplyApis {
    Named(Vec<String>),
    Tagged(Vec<IndexMap<String, Vec<String>>>),
}

impl Default for ApplyApis {
    fn default() -> Self {
        ApplyApis::Named(Vec::new())
    }
}

impl ApplyApis {
    /// `(tag, api)` pairs in declaration order; untagged entries carry no tag.
    pub fn entries(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            ApplyApis::Named(apis) => apis.iter().map(|api| (None, api.as_str())).collect(),
            ApplyApis::Tagged(groups) => groups
                .iter()
                .flat_map(|group| group.iter())
                .flat_map(|(tag, apis)| apis.iter().map(move |api| (Some(tag.as_str()), api.as_str())))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ApplyApis::Named(apis) => apis.is_empty(),
            ApplyApis::Tagged(groups) => groups.iter().all(|group| group.values().all(Vec::is_empty)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateApply {
    #[serde(default)]
    pub api: ApplyApis,
}

/// Top level template configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub activate: bool,
    #[serde(default)]
    pub apply: TemplateApply,
    #[serde(default)]
    pub common_config: TemplateCommonConfig,
}

impl TemplateConfig {
    pub fn formats(&self) -> &FormatLibrary {
        &self.common_config.format
    }

    pub fn get_format(&self, name: &str) -> Option<&Format> {
        self.formats().get_format(name)
    }

    pub fn validate(&self) -> Result<()> {
        self.formats().validate()
    }
}
