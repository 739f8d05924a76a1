use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::validate::ValidationPolicy;

/// Top-level project configuration loaded from `.oasir.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OasirConfig {
    pub input: String,
    pub naming: NamingConfig,
    /// Extra entries for the type table, keyed `type`, `format` or `type:format`.
    pub type_mappings: IndexMap<String, String>,
    /// Map from resolved operationId to a custom alias.
    pub aliases: IndexMap<String, String>,
    pub validation: ValidationPolicy,
}

impl Default for OasirConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            naming: NamingConfig::default(),
            type_mappings: IndexMap::new(),
            aliases: IndexMap::new(),
            validation: ValidationPolicy::default(),
        }
    }
}

/// Identifier naming options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix for model names that collide with a reserved word or primitive.
    pub safe_prefix: String,
    pub model_name_prefix: Option<String>,
    pub model_name_suffix: Option<String>,
    pub property_naming: PropertyNaming,
    /// Added to the built-in reserved words.
    pub reserved_words: Vec<String>,
    /// Added to the built-in primitive type names.
    pub primitives: Vec<String>,
    /// Schema name → class name, bypassing all other model naming.
    pub model_name_mappings: IndexMap<String, String>,
    pub api_name_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            safe_prefix: "Model".to_string(),
            model_name_prefix: None,
            model_name_suffix: None,
            property_naming: PropertyNaming::default(),
            reserved_words: Vec::new(),
            primitives: Vec::new(),
            model_name_mappings: IndexMap::new(),
            api_name_suffix: "Api".to_string(),
        }
    }
}

/// How property names are styled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum PropertyNaming {
    #[serde(rename = "original")]
    Original,
    #[default]
    #[serde(rename = "camelCase")]
    CamelCase,
    #[serde(rename = "PascalCase")]
    PascalCase,
    #[serde(rename = "snake_case")]
    SnakeCase,
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oasir.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OasirConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OasirConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oasir configuration
input: openapi.yaml
validation: lenient     # lenient | strict

naming:
  safe_prefix: Model
  property_naming: camelCase   # original | camelCase | PascalCase | snake_case
  # model_name_prefix: Api
  # model_name_suffix: Dto
  reserved_words: []
  model_name_mappings: {}
    # LegacyPet: Pet

type_mappings: {}
  # string:uuid: UUID
  # date-time: string

aliases: {}
  # createChatCompletion: chat     # operationId → custom name
"#
}
