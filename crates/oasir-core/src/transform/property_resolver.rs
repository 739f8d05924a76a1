use log::debug;

use crate::ir::{
    IrEnum, IrEnumValue, IrProperty, IrValidation, PropertyKind, ScalarKind, SemanticFormat,
    VendorExtensions,
};
use crate::parse::Extensions;
use crate::parse::schema::{AdditionalProperties, ExclusiveBound, Schema, SchemaOrRef, SchemaType, ref_tail};

use super::name_normalizer::{Normalizer, enum_member_name, escape_literal};
use super::type_mapper::TypeMapper;

/// Resolves schema nodes used as fields, parameters and bodies into
/// [`IrProperty`] values.
///
/// A `$ref` is always resolved by name. Inline objects are not promoted to
/// models; they degrade to free-form.
#[derive(Debug, Clone, Copy)]
pub struct PropertyResolver<'a> {
    naming: &'a Normalizer,
    types: &'a TypeMapper,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(naming: &'a Normalizer, types: &'a TypeMapper) -> Self {
        Self { naming, types }
    }

    pub fn naming(&self) -> &'a Normalizer {
        self.naming
    }

    pub fn types(&self) -> &'a TypeMapper {
        self.types
    }

    pub fn resolve(&self, name: &str, schema: &SchemaOrRef, required: bool) -> IrProperty {
        let mut prop = self.skeleton(name, required);
        match schema {
            SchemaOrRef::Ref { ref_path } => {
                self.set_model_ref(&mut prop, ref_tail(ref_path));
            }
            SchemaOrRef::Schema(schema) => {
                self.copy_metadata(&mut prop, schema);
                self.classify(&mut prop, name, schema);
            }
        }
        prop
    }

    /// A property of the universal "any" type.
    pub fn any(&self, name: &str, required: bool) -> IrProperty {
        self.skeleton(name, required)
    }

    /// Inline type declaration used for composition members: the first
    /// referenced `allOf` branch when there is one, otherwise the mapped type.
    pub fn type_declaration(&self, schema: &Schema) -> String {
        if let Some(parent) = schema.first_all_of_ref() {
            return self.naming.model_name(ref_tail(parent));
        }
        let schema_type = schema.primary_type().map(|t| t.as_str()).unwrap_or("");
        self.types.map(schema_type, schema.format.as_deref()).target
    }

    fn skeleton(&self, name: &str, required: bool) -> IrProperty {
        let var_name = self.naming.var_name(name);
        let normalized = self.naming.normalize(name);
        let any = self.types.any_type();
        IrProperty {
            base_name: name.to_string(),
            name_in_lower_case: var_name.to_lowercase(),
            name: var_name,
            name_in_camel_case: normalized.camel_case,
            name_in_pascal_case: normalized.pascal_case,
            name_in_snake_case: normalized.snake_case,
            data_type: any.clone(),
            base_type: any,
            open_api_type: None,
            data_format: None,
            kind: PropertyKind::Any,
            format: None,
            is_primitive_type: false,
            required,
            nullable: false,
            deprecated: false,
            read_only: false,
            write_only: false,
            title: None,
            description: None,
            example: None,
            default_value: None,
            validation: IrValidation::default(),
            has_validation: false,
            vendor_extensions: VendorExtensions::new(),
        }
    }

    fn copy_metadata(&self, prop: &mut IrProperty, schema: &Schema) {
        prop.nullable = schema.is_nullable();
        prop.deprecated = schema.deprecated.unwrap_or(false);
        prop.read_only = schema.read_only.unwrap_or(false);
        prop.write_only = schema.write_only.unwrap_or(false);
        prop.title = schema.title.clone();
        prop.description = schema.description.clone();
        prop.example = schema.example.clone();
        prop.default_value = schema.default_value.clone();
        prop.open_api_type = schema.primary_type().map(|t| t.as_str().to_string());
        prop.data_format = schema.format.clone();
        prop.validation = validation_of(schema);
        prop.has_validation = prop.validation.is_present();
        prop.vendor_extensions = vendor_extensions(&schema.extensions);
    }

    fn classify(&self, prop: &mut IrProperty, name: &str, schema: &Schema) {
        let primary = schema.primary_type();

        if !schema.enum_values.is_empty() && primary.is_none_or(is_scalar) {
            self.set_enum(prop, name, schema);
            return;
        }

        match primary {
            Some(SchemaType::Array) => self.set_array(prop, name, schema),
            Some(SchemaType::Object) => self.set_object(prop, name, schema),
            Some(scalar) => self.set_scalar(prop, scalar, schema.format.as_deref()),
            None if !schema.properties.is_empty() || schema.additional_properties.is_some() => {
                self.set_object(prop, name, schema)
            }
            None if schema.items.is_some() => self.set_array(prop, name, schema),
            None => {
                if let Some(parent) = schema.first_all_of_ref() {
                    self.set_model_ref(prop, ref_tail(parent));
                } else if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
                    debug!("inline composition for `{name}` resolved as any");
                }
            }
        }
    }

    fn set_model_ref(&self, prop: &mut IrProperty, schema_name: &str) {
        let model = self.naming.model_name(schema_name);
        prop.data_type = model.clone();
        prop.base_type = model.clone();
        prop.kind = PropertyKind::ModelRef { model };
        prop.is_primitive_type = false;
    }

    fn set_scalar(&self, prop: &mut IrProperty, scalar: SchemaType, format: Option<&str>) {
        let mapped = self.types.map(scalar.as_str(), format);
        prop.kind = match scalar {
            SchemaType::Integer => PropertyKind::Integer,
            SchemaType::Number => PropertyKind::Number,
            SchemaType::Boolean => PropertyKind::Boolean,
            _ => PropertyKind::String,
        };
        if scalar == SchemaType::String {
            prop.format = mapped.format;
        }
        prop.is_primitive_type = prop.format != Some(SemanticFormat::Binary);
        prop.data_type = mapped.target.clone();
        prop.base_type = mapped.target;
    }

    fn set_enum(&self, prop: &mut IrProperty, name: &str, schema: &Schema) {
        let info = enum_of(format!("{}Enum", self.naming.model_name(name)), schema);
        let mapped = self.types.map(scalar_name(info.base), schema.format.as_deref());
        prop.data_type = mapped.target.clone();
        prop.base_type = mapped.target;
        prop.is_primitive_type = true;
        prop.kind = PropertyKind::Enum(info);
    }

    fn set_array(&self, prop: &mut IrProperty, name: &str, schema: &Schema) {
        let item_name = format!("{name}Item");
        let items = match &schema.items {
            Some(items) => self.resolve(&item_name, items, false),
            None => self.any(&item_name, false),
        };
        prop.data_type = self.types.array_of(&items.data_type);
        prop.base_type = items.data_type.clone();
        prop.is_primitive_type = false;
        prop.kind = PropertyKind::Array {
            items: Box::new(items),
        };
    }

    fn set_object(&self, prop: &mut IrProperty, name: &str, schema: &Schema) {
        if !schema.properties.is_empty() {
            debug!("inline object `{name}` resolved as free-form");
            self.set_free_form(prop);
            return;
        }
        let values = match &schema.additional_properties {
            Some(AdditionalProperties::Schema(values)) => self.resolve("value", values, false),
            Some(AdditionalProperties::Bool(true)) => self.any("value", false),
            Some(AdditionalProperties::Bool(false)) | None => {
                self.set_free_form(prop);
                return;
            }
        };
        prop.data_type = self.types.map_of(&values.data_type);
        prop.base_type = values.data_type.clone();
        prop.is_primitive_type = false;
        prop.kind = PropertyKind::Map {
            values: Box::new(values),
        };
    }

    fn set_free_form(&self, prop: &mut IrProperty) {
        let target = self.types.map("object", None).target;
        prop.data_type = target.clone();
        prop.base_type = target;
        prop.kind = PropertyKind::FreeForm;
    }
}

fn is_scalar(t: SchemaType) -> bool {
    matches!(
        t,
        SchemaType::String | SchemaType::Integer | SchemaType::Number | SchemaType::Boolean
    )
}

pub(crate) fn scalar_kind(t: SchemaType) -> ScalarKind {
    match t {
        SchemaType::Integer => ScalarKind::Integer,
        SchemaType::Number => ScalarKind::Number,
        SchemaType::Boolean => ScalarKind::Boolean,
        _ => ScalarKind::String,
    }
}

fn literal_kind(value: &serde_json::Value) -> ScalarKind {
    match value {
        serde_json::Value::Bool(_) => ScalarKind::Boolean,
        serde_json::Value::Number(n) if n.is_f64() => ScalarKind::Number,
        serde_json::Value::Number(_) => ScalarKind::Integer,
        _ => ScalarKind::String,
    }
}

fn literal_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Enum members of a schema; the base kind falls back to the first literal
/// when the schema is untyped.
pub(crate) fn enum_of(enum_name: String, schema: &Schema) -> IrEnum {
    let base = match schema.primary_type() {
        Some(t) => scalar_kind(t),
        None => schema.enum_values.first().map(literal_kind).unwrap_or(ScalarKind::String),
    };
    IrEnum {
        enum_name,
        base,
        values: schema
            .enum_values
            .iter()
            .map(|literal| {
                let text = literal_text(literal);
                IrEnumValue {
                    name: enum_member_name(&text),
                    value: escape_literal(&text),
                    literal: literal.clone(),
                }
            })
            .collect(),
    }
}

pub(crate) fn scalar_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "string",
        ScalarKind::Integer => "integer",
        ScalarKind::Number => "number",
        ScalarKind::Boolean => "boolean",
    }
}

/// Constraints with both exclusive-bound dialects folded into the 3.0 form.
pub(crate) fn validation_of(schema: &Schema) -> IrValidation {
    let (minimum, exclusive_minimum) = bound(schema.minimum, schema.exclusive_minimum, true);
    let (maximum, exclusive_maximum) = bound(schema.maximum, schema.exclusive_maximum, false);
    IrValidation {
        pattern: schema.pattern.clone(),
        minimum,
        maximum,
        exclusive_minimum,
        exclusive_maximum,
        multiple_of: schema.multiple_of,
        min_length: schema.min_length,
        max_length: schema.max_length,
        min_items: schema.min_items,
        max_items: schema.max_items,
        unique_items: schema.unique_items.unwrap_or(false),
        min_properties: schema.min_properties,
        max_properties: schema.max_properties,
    }
}

/// Fold an inclusive bound and a 3.1 exclusive value into one bound. When
/// both are present the tighter one wins, and an exclusive value wins a tie.
fn bound(
    inclusive: Option<f64>,
    exclusive: Option<ExclusiveBound>,
    lower: bool,
) -> (Option<f64>, bool) {
    match (inclusive, exclusive) {
        (_, Some(ExclusiveBound::Flag(flag))) => (inclusive, flag),
        (Some(i), Some(ExclusiveBound::Value(e))) => {
            let exclusive_is_tighter = if lower { e >= i } else { e <= i };
            if exclusive_is_tighter {
                (Some(e), true)
            } else {
                (Some(i), false)
            }
        }
        (None, Some(ExclusiveBound::Value(e))) => (Some(e), true),
        (_, None) => (inclusive, false),
    }
}

/// The `x-*` subset of an object's unmodelled keys.
pub(crate) fn vendor_extensions(extensions: &Extensions) -> VendorExtensions {
    extensions
        .iter()
        .filter(|(key, _)| key.starts_with("x-"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
