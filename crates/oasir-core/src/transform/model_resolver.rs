use std::collections::{BTreeSet, HashSet};

use log::{debug, warn};

use crate::ir::{
    DiscriminatorMapping, IrDiscriminator, IrModel, IrProperty, IrValidation, MappedModel,
    ModelKind, VendorExtensions,
};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::schema::{AdditionalProperties, Schema, SchemaOrRef, SchemaType, ref_tail};
use crate::parse::spec::OpenApiSpec;

use super::property_resolver::{
    PropertyResolver, enum_of, scalar_kind, scalar_name, validation_of, vendor_extensions,
};

/// Turns each component schema into exactly one [`IrModel`].
///
/// Referenced schemas are never expanded into the model that references
/// them, so self-referential and mutually-referential schemas terminate.
#[derive(Debug, Clone, Copy)]
pub struct ModelResolver<'a> {
    properties: PropertyResolver<'a>,
    refs: RefResolver<'a>,
}

impl<'a> ModelResolver<'a> {
    pub fn new(properties: PropertyResolver<'a>, refs: RefResolver<'a>) -> Self {
        Self { properties, refs }
    }

    /// All component schemas, ordered by schema name.
    pub fn resolve_all(&self, spec: &'a OpenApiSpec) -> Vec<IrModel> {
        let mut schemas: Vec<_> = spec.schemas().collect();
        schemas.sort_by(|a, b| a.0.cmp(b.0));
        schemas
            .into_iter()
            .map(|(name, schema)| self.resolve(name, schema))
            .collect()
    }

    pub fn resolve(&self, name: &str, schema: &'a SchemaOrRef) -> IrModel {
        let naming = self.properties.naming();
        let class_name = naming.model_name(name);
        let mut model = IrModel {
            name: name.to_string(),
            class_var_name: naming.var_name(name),
            class_filename: class_name.clone(),
            class_name: class_name.clone(),
            title: None,
            description: None,
            kind: ModelKind::Untyped,
            data_type: self.properties.types().any_type(),
            vars: Vec::new(),
            mandatory: Vec::new(),
            additional_properties: None,
            parent: None,
            all_of: Vec::new(),
            one_of: Vec::new(),
            one_of_models: Vec::new(),
            any_of: Vec::new(),
            discriminator: None,
            imports: BTreeSet::new(),
            nullable: false,
            deprecated: false,
            validation: IrValidation::default(),
            vendor_extensions: VendorExtensions::new(),
        };

        let body = match self.refs.schema_body(schema) {
            Ok(body) => body,
            Err(e) => {
                warn!("schema `{name}` treated as untyped: {e}");
                return model;
            }
        };

        model.title = body.title.clone();
        model.description = body.description.clone();
        model.nullable = body.is_nullable();
        model.deprecated = body.deprecated.unwrap_or(false);
        model.validation = validation_of(body);
        model.vendor_extensions = vendor_extensions(&body.extensions);

        self.resolve_vars(&mut model, body);
        self.resolve_composition(&mut model, body);
        self.resolve_kind(&mut model, body);
        model.discriminator = self.discriminator(body);
        model.imports = self.imports(&model);
        model
    }

    fn resolve_vars(&self, model: &mut IrModel, body: &Schema) {
        let mut seen = HashSet::new();
        self.splice_vars(model, body, &mut seen);
        for branch in body.all_of.iter().filter_map(SchemaOrRef::as_schema) {
            if !branch.properties.is_empty() {
                self.splice_vars(model, branch, &mut seen);
            }
        }
        model.vars.sort_by(|a, b| a.base_name.cmp(&b.base_name));
        model.mandatory = model.required_vars().map(|v| v.base_name.clone()).collect();

        model.additional_properties = match &body.additional_properties {
            Some(AdditionalProperties::Schema(values)) => Some(Box::new(
                self.properties.resolve("additionalProperties", values, false),
            )),
            Some(AdditionalProperties::Bool(true)) => {
                Some(Box::new(self.properties.any("additionalProperties", false)))
            }
            Some(AdditionalProperties::Bool(false)) | None => None,
        };
    }

    /// Append `schema`'s properties; a base name already seen keeps its
    /// first definition.
    fn splice_vars(&self, model: &mut IrModel, schema: &Schema, seen: &mut HashSet<String>) {
        for prop_name in schema.properties.keys() {
            if !seen.insert(prop_name.clone()) {
                debug!("{}: duplicate property `{prop_name}` ignored", model.name);
                continue;
            }
            let required = schema.required.contains(prop_name);
            let prop = self
                .properties
                .resolve(prop_name, &schema.properties[prop_name], required);
            model.vars.push(prop);
        }
    }

    fn resolve_composition(&self, model: &mut IrModel, body: &Schema) {
        let naming = self.properties.naming();
        model.one_of = body.one_of.iter().map(|m| self.member_name(m)).collect();
        model.any_of = body.any_of.iter().map(|m| self.member_name(m)).collect();
        model.all_of = body
            .all_of
            .iter()
            .filter_map(SchemaOrRef::ref_name)
            .map(|r| naming.model_name(r))
            .collect();
        model.parent = model.all_of.first().cloned();

        let models: BTreeSet<&String> = model
            .one_of
            .iter()
            .filter(|name| !self.is_primitive(name))
            .collect();
        model.one_of_models = models.into_iter().cloned().collect();
    }

    fn member_name(&self, member: &SchemaOrRef) -> String {
        match member {
            SchemaOrRef::Ref { ref_path } => self.properties.naming().model_name(ref_tail(ref_path)),
            SchemaOrRef::Schema(schema) => self.properties.type_declaration(schema),
        }
    }

    fn resolve_kind(&self, model: &mut IrModel, body: &Schema) {
        let types = self.properties.types();
        let primary = body.primary_type();
        let scalar = primary.filter(|t| {
            matches!(
                t,
                SchemaType::String | SchemaType::Integer | SchemaType::Number | SchemaType::Boolean
            )
        });

        if !body.enum_values.is_empty() && (primary.is_none() || scalar.is_some()) {
            let info = enum_of(model.class_name.clone(), body);
            model.data_type = types.map(scalar_name(info.base), body.format.as_deref()).target;
            model.kind = ModelKind::Enum(info);
            return;
        }

        let untyped = primary.is_none();
        if primary == Some(SchemaType::Array) || (untyped && body.items.is_some()) {
            let items = match &body.items {
                Some(items) => self.properties.resolve("items", items, false),
                None => self.properties.any("items", false),
            };
            model.data_type = types.array_of(&items.data_type);
            model.kind = ModelKind::Array {
                items: Box::new(items),
            };
        } else if primary == Some(SchemaType::Object)
            || (untyped && (!model.vars.is_empty() || model.additional_properties.is_some()))
        {
            model.data_type = model.class_name.clone();
            model.kind = ModelKind::Object;
        } else if let Some(scalar) = scalar {
            model.data_type = types.map(scalar.as_str(), body.format.as_deref()).target;
            model.kind = ModelKind::Primitive {
                scalar: scalar_kind(scalar),
            };
        } else {
            model.data_type = self.properties.type_declaration(body);
        }
    }

    fn discriminator(&self, body: &Schema) -> Option<IrDiscriminator> {
        let discriminator = body.discriminator.as_ref()?;
        let naming = self.properties.naming();

        let mapping = if !discriminator.mapping.is_empty() {
            DiscriminatorMapping::Explicit(
                discriminator
                    .mapping
                    .iter()
                    .map(|(value, target)| MappedModel {
                        mapping_name: value.clone(),
                        model_name: naming.model_name(ref_tail(target)),
                    })
                    .collect(),
            )
        } else {
            let members = if body.one_of.is_empty() { &body.any_of } else { &body.one_of };
            let inferred: Vec<MappedModel> = members
                .iter()
                .filter_map(SchemaOrRef::ref_name)
                .map(|schema_name| MappedModel {
                    mapping_name: schema_name.to_string(),
                    model_name: naming.model_name(schema_name),
                })
                .collect();
            if inferred.is_empty() {
                DiscriminatorMapping::Absent
            } else {
                DiscriminatorMapping::Inferred(inferred)
            }
        };

        Some(IrDiscriminator {
            property_name: discriminator.property_name.clone(),
            mapping,
        })
    }

    fn imports(&self, model: &IrModel) -> BTreeSet<String> {
        let property_models = model
            .vars
            .iter()
            .chain(model.additional_properties.as_deref())
            .chain(match &model.kind {
                ModelKind::Array { items } => Some(items.as_ref()),
                _ => None,
            })
            .filter_map(IrProperty::complex_type);

        property_models
            .chain(model.one_of.iter().map(String::as_str))
            .chain(model.any_of.iter().map(String::as_str))
            .chain(model.all_of.iter().map(String::as_str))
            .filter(|name| *name != model.class_name && !self.is_primitive(name))
            .map(str::to_string)
            .collect()
    }

    fn is_primitive(&self, name: &str) -> bool {
        self.properties.types().is_primitive(name) || self.properties.naming().is_primitive(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{PropertyKind, ScalarKind};
    use crate::parse::from_yaml;
    use crate::transform::name_normalizer::Normalizer;
    use crate::transform::type_mapper::TypeMapper;

    fn models(components: &str) -> Vec<IrModel> {
        let yaml = format!(
            "openapi: \"3.0.3\"\ninfo: {{ title: t, version: \"1\" }}\npaths: {{}}\ncomponents:\n  schemas:\n{components}"
        );
        let spec = from_yaml(&yaml).unwrap();
        let naming = Normalizer::default();
        let types = TypeMapper::default();
        let resolver = ModelResolver::new(
            PropertyResolver::new(&naming, &types),
            RefResolver::new(&spec),
        );
        resolver.resolve_all(&spec)
    }

    fn find<'m>(models: &'m [IrModel], name: &str) -> &'m IrModel {
        models.iter().find(|m| m.name == name).unwrap()
    }

    #[test]
    fn models_are_sorted_by_schema_name() {
        let models = models(
            r#"
    Zebra: { type: object }
    apple: { type: string }
    Mango: { type: integer }
"#,
        );
        let names: Vec<_> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Mango", "Zebra", "apple"]);
        assert_eq!(find(&models, "apple").kind, ModelKind::Primitive { scalar: ScalarKind::String });
    }

    #[test]
    fn object_vars_sorted_with_required() {
        let models = models(
            r#"
    Pet:
      type: object
      required: [name]
      properties:
        tag: { type: string }
        name: { type: string }
        id: { type: integer, format: int64 }
"#,
        );
        let pet = find(&models, "Pet");
        assert_eq!(pet.kind, ModelKind::Object);
        let vars: Vec<_> = pet.vars.iter().map(|v| v.base_name.as_str()).collect();
        assert_eq!(vars, ["id", "name", "tag"]);
        assert_eq!(pet.mandatory, ["name"]);
        assert!(pet.vars[1].required);
        assert!(pet.imports.is_empty());
    }

    #[test]
    fn all_of_sets_parent_and_splices_inline_properties() {
        let models = models(
            r#"
    Pet:
      type: object
      properties:
        name: { type: string }
    Dog:
      allOf:
        - $ref: '#/components/schemas/Pet'
        - type: object
          required: [age]
          properties:
            age: { type: integer }
"#,
        );
        let dog = find(&models, "Dog");
        assert_eq!(dog.parent.as_deref(), Some("Pet"));
        assert_eq!(dog.all_of, ["Pet"]);
        assert_eq!(dog.kind, ModelKind::Object);
        assert_eq!(dog.vars.len(), 1);
        assert_eq!(dog.vars[0].base_name, "age");
        assert!(dog.vars[0].required);
        assert!(dog.imports.contains("Pet"));
    }

    #[test]
    fn spliced_vars_are_sorted_across_branches() {
        let models = models(
            r#"
    Tagged:
      type: object
      required: [zeta]
      properties:
        zeta: { type: string }
        id: { type: integer, readOnly: true }
      allOf:
        - type: object
          required: [alpha]
          properties:
            alpha: { type: string }
            zeta: { type: integer }
"#,
        );
        let tagged = find(&models, "Tagged");
        let vars: Vec<_> = tagged.vars.iter().map(|v| v.base_name.as_str()).collect();
        assert_eq!(vars, ["alpha", "id", "zeta"]);
        assert_eq!(tagged.mandatory, ["alpha", "zeta"]);
        assert_eq!(tagged.vars[2].data_type, "string");

        let required: Vec<_> = tagged.required_vars().map(|v| v.base_name.as_str()).collect();
        assert_eq!(required, ["alpha", "zeta"]);
        let optional: Vec<_> = tagged.optional_vars().map(|v| v.base_name.as_str()).collect();
        assert_eq!(optional, ["id"]);
        let read_only: Vec<_> = tagged.read_only_vars().map(|v| v.base_name.as_str()).collect();
        assert_eq!(read_only, ["id"]);
        assert!(!tagged.is_enum());
    }

    #[test]
    fn one_of_with_discriminator() {
        let models = models(
            r#"
    Cat: { type: object }
    Dog: { type: object }
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Dog'
        - $ref: '#/components/schemas/Cat'
        - type: string
        - $ref: '#/components/schemas/Dog'
      discriminator:
        propertyName: petType
    Shape:
      oneOf:
        - $ref: '#/components/schemas/Cat'
      discriminator:
        propertyName: kind
        mapping:
          cat: '#/components/schemas/Cat'
"#,
        );
        let pet = find(&models, "Pet");
        assert_eq!(pet.one_of, ["Dog", "Cat", "string", "Dog"]);
        assert_eq!(pet.one_of_models, ["Cat", "Dog"]);
        assert_eq!(pet.kind, ModelKind::Untyped);
        let discriminator = pet.discriminator.as_ref().unwrap();
        assert_eq!(discriminator.property_name, "petType");
        assert!(matches!(discriminator.mapping, DiscriminatorMapping::Inferred(_)));
        assert_eq!(discriminator.mapping.entries()[0].mapping_name, "Dog");

        let shape = find(&models, "Shape");
        let mapping = &shape.discriminator.as_ref().unwrap().mapping;
        assert_eq!(
            mapping,
            &DiscriminatorMapping::Explicit(vec![MappedModel {
                mapping_name: "cat".into(),
                model_name: "Cat".into(),
            }])
        );
    }

    #[test]
    fn enum_model_uses_class_name() {
        let models = models("    status: { type: string, enum: [active, '+1'] }\n");
        let status = find(&models, "status");
        let ModelKind::Enum(info) = &status.kind else {
            panic!("expected enum, got {:?}", status.kind);
        };
        assert!(status.is_enum());
        assert_eq!(info.enum_name, "Status");
        assert_eq!(info.values[1].name, "PLUS1");
        assert_eq!(status.data_type, "string");
    }

    #[test]
    fn self_reference_is_not_expanded() {
        let models = models(
            r#"
    Node:
      type: object
      properties:
        children:
          type: array
          items: { $ref: '#/components/schemas/Node' }
        parent: { $ref: '#/components/schemas/Node' }
"#,
        );
        assert_eq!(models.len(), 1);
        let node = &models[0];
        assert_eq!(node.vars[0].data_type, "Array<Node>");
        assert_eq!(node.vars[1].kind, PropertyKind::ModelRef { model: "Node".into() });
        assert!(node.imports.is_empty());
    }

    #[test]
    fn aliases_follow_the_target_body() {
        let models = models(
            r#"
    Pet: { type: object, properties: { name: { type: string } } }
    Animal: { $ref: '#/components/schemas/Pet' }
    Loop: { $ref: '#/components/schemas/Loop' }
"#,
        );
        assert_eq!(find(&models, "Animal").vars[0].base_name, "name");
        assert_eq!(find(&models, "Loop").kind, ModelKind::Untyped);
        assert_eq!(find(&models, "Loop").data_type, "any");
    }

    #[test]
    fn array_and_map_models() {
        let models = models(
            r#"
    Pets: { type: array, items: { $ref: '#/components/schemas/Pet' } }
    Pet: { type: object }
    Counts: { type: object, additionalProperties: { type: integer } }
"#,
        );
        let pets = find(&models, "Pets");
        assert_eq!(pets.data_type, "Array<Pet>");
        assert!(pets.imports.contains("Pet"));
        let counts = find(&models, "Counts");
        assert_eq!(counts.kind, ModelKind::Object);
        assert_eq!(counts.additional_properties.as_ref().unwrap().data_type, "number");
    }
}
