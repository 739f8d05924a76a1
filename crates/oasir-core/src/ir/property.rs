use serde::Serialize;

use super::types::VendorExtensions;

/// Formats that carry a dedicated semantic category in addition to the
/// mapped type string. At most one applies to a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticFormat {
    Date,
    DateTime,
    Uuid,
    Uri,
    Email,
    Password,
    Binary,
    Byte,
}

impl SemanticFormat {
    pub fn from_format(format: &str) -> Option<Self> {
        match format {
            "date" => Some(Self::Date),
            "date-time" => Some(Self::DateTime),
            "uuid" => Some(Self::Uuid),
            "uri" => Some(Self::Uri),
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            "binary" => Some(Self::Binary),
            "byte" => Some(Self::Byte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::DateTime => "date-time",
            Self::Uuid => "uuid",
            Self::Uri => "uri",
            Self::Email => "email",
            Self::Password => "password",
            Self::Binary => "binary",
            Self::Byte => "byte",
        }
    }
}

/// The scalar type underneath an enum or a primitive model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Integer,
    Number,
    Boolean,
}

/// One enum member.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrEnumValue {
    /// Sanitized member identifier, e.g. `PLUS1` for `+1`.
    pub name: String,
    /// Literal text with `'` escaped for single-quoted string literals.
    pub value: String,
    /// The value as declared.
    pub literal: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrEnum {
    pub enum_name: String,
    pub base: ScalarKind,
    pub values: Vec<IrEnumValue>,
}

/// Primary semantic category of a property. Exactly one applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PropertyKind {
    String,
    Integer,
    Number,
    Boolean,
    Array { items: Box<IrProperty> },
    Map { values: Box<IrProperty> },
    ModelRef { model: String },
    Enum(IrEnum),
    FreeForm,
    Any,
}

impl PropertyKind {
    pub fn is_container(&self) -> bool {
        matches!(self, PropertyKind::Array { .. } | PropertyKind::Map { .. })
    }
}

/// Validation constraints, copied from the schema without interpretation.
///
/// Exclusive bounds are normalized: a 3.1 `exclusiveMinimum: 5` becomes
/// `minimum: 5, exclusiveMinimum: true`, matching the 3.0 spelling. When an
/// inclusive bound sits beside a 3.1 exclusive value, the tighter one is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    pub unique_items: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
}

impl IrValidation {
    /// True iff any constraint is present.
    pub fn is_present(&self) -> bool {
        self.pattern.is_some()
            || self.minimum.is_some()
            || self.maximum.is_some()
            || self.multiple_of.is_some()
            || self.min_length.is_some()
            || self.max_length.is_some()
            || self.min_items.is_some()
            || self.max_items.is_some()
            || self.unique_items
            || self.min_properties.is_some()
            || self.max_properties.is_some()
    }
}

/// A schema used as a field, parameter value, response body, or container item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrProperty {
    pub base_name: String,
    pub name: String,
    pub name_in_camel_case: String,
    pub name_in_pascal_case: String,
    pub name_in_snake_case: String,
    pub name_in_lower_case: String,

    /// Resolved target type string. Never empty.
    pub data_type: String,
    /// Element type for containers, otherwise the same as `data_type`.
    pub base_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_api_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,

    pub kind: PropertyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SemanticFormat>,
    pub is_primitive_type: bool,

    pub required: bool,
    pub nullable: bool,
    pub deprecated: bool,
    pub read_only: bool,
    pub write_only: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,

    pub validation: IrValidation,
    pub has_validation: bool,

    #[serde(skip_serializing_if = "VendorExtensions::is_empty")]
    pub vendor_extensions: VendorExtensions,
}

impl IrProperty {
    pub fn is_model(&self) -> bool {
        matches!(self.kind, PropertyKind::ModelRef { .. })
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Referenced model name of this property, or of its item/value.
    pub fn complex_type(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::ModelRef { model } => Some(model),
            PropertyKind::Array { items } => items.complex_type(),
            PropertyKind::Map { values } => values.complex_type(),
            _ => None,
        }
    }

    pub fn enum_info(&self) -> Option<&IrEnum> {
        match &self.kind {
            PropertyKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&IrProperty> {
        match &self.kind {
            PropertyKind::Array { items } => Some(items),
            _ => None,
        }
    }
}
