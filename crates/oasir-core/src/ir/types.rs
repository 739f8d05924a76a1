use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use super::model::IrModel;
use super::operations::IrOperation;
use super::security::IrSecurityScheme;

/// `x-*` keys and their values, in declaration order, never interpreted.
pub type VendorExtensions = IndexMap<String, serde_json::Value>;

/// A fully resolved, generator-ready intermediate representation of an OpenAPI spec.
///
/// Every collection is deterministically ordered: models by schema name,
/// operation groups by tag, security schemes by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrSpec {
    pub info: IrInfo,
    pub servers: Vec<IrServer>,
    pub models: Vec<IrModel>,
    pub operation_groups: Vec<IrOperationGroup>,
    pub security_schemes: Vec<IrSecurityScheme>,
}

impl IrSpec {
    /// Look a model up by class name.
    pub fn model(&self, class_name: &str) -> Option<&IrModel> {
        self.models.iter().find(|m| m.class_name == class_name)
    }

    /// Walk `parent` edges from `class_name`, nearest first. Stops at a
    /// missing parent or when a cycle closes.
    pub fn ancestors<'a>(&'a self, class_name: &str) -> Vec<&'a IrModel> {
        let mut chain = Vec::new();
        let mut seen = HashSet::from([class_name.to_string()]);
        let mut current = self.model(class_name).and_then(|m| m.parent.as_deref());
        while let Some(parent) = current {
            if !seen.insert(parent.to_string()) {
                break;
            }
            let Some(model) = self.model(parent) else {
                break;
            };
            chain.push(model);
            current = model.parent.as_deref();
        }
        chain
    }

    pub fn operations(&self) -> impl Iterator<Item = &IrOperation> {
        self.operation_groups.iter().flat_map(|g| g.operations.iter())
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrInfo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

/// A server URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrServer {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations sharing a tag, in resolution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrOperationGroup {
    pub tag: NormalizedName,
    /// API class name for the tag, e.g. `PetsApi`.
    pub class_name: String,
    pub operations: Vec<IrOperation>,
}

/// A name with multiple casing variants pre-computed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedName {
    pub original: String,
    pub camel_case: String,
    pub pascal_case: String,
    pub snake_case: String,
    pub lower_case: String,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}
