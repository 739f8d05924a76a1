use std::collections::BTreeSet;

use serde::Serialize;

use super::property::{IrEnum, IrProperty, IrValidation, ScalarKind};
use super::types::VendorExtensions;

/// What a named schema resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModelKind {
    Object,
    Array { items: Box<IrProperty> },
    Enum(IrEnum),
    Primitive { scalar: ScalarKind },
    /// No type, no properties, no enum: composition-only or empty schemas.
    Untyped,
}

/// One explicit or inferred discriminator entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedModel {
    pub mapping_name: String,
    pub model_name: String,
}

/// Where a discriminator's value→model table came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "entries", rename_all = "camelCase")]
pub enum DiscriminatorMapping {
    Absent,
    Explicit(Vec<MappedModel>),
    Inferred(Vec<MappedModel>),
}

impl DiscriminatorMapping {
    pub fn entries(&self) -> &[MappedModel] {
        match self {
            DiscriminatorMapping::Absent => &[],
            DiscriminatorMapping::Explicit(entries) | DiscriminatorMapping::Inferred(entries) => {
                entries
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrDiscriminator {
    pub property_name: String,
    pub mapping: DiscriminatorMapping,
}

/// A named component schema, ready for rendering.
///
/// Cross-model edges (`parent`, composition members, discriminator targets,
/// model-typed properties) are class names, never embedded models.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrModel {
    /// Schema name as declared under `components.schemas`.
    pub name: String,
    pub class_name: String,
    pub class_var_name: String,
    pub class_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub kind: ModelKind,
    pub data_type: String,

    pub vars: Vec<IrProperty>,
    pub mandatory: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<IrProperty>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub all_of: Vec<String>,
    pub one_of: Vec<String>,
    pub one_of_models: Vec<String>,
    pub any_of: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<IrDiscriminator>,

    pub imports: BTreeSet<String>,

    pub nullable: bool,
    pub deprecated: bool,
    pub validation: IrValidation,
    #[serde(skip_serializing_if = "VendorExtensions::is_empty")]
    pub vendor_extensions: VendorExtensions,
}

impl IrModel {
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, ModelKind::Enum(_))
    }

    pub fn required_vars(&self) -> impl Iterator<Item = &IrProperty> {
        self.vars.iter().filter(|v| v.required)
    }

    pub fn optional_vars(&self) -> impl Iterator<Item = &IrProperty> {
        self.vars.iter().filter(|v| !v.required)
    }

    pub fn read_only_vars(&self) -> impl Iterator<Item = &IrProperty> {
        self.vars.iter().filter(|v| v.read_only)
    }
}
