use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::warn;

use crate::ir::{
    HttpMethod, IrOperation, IrParameter, IrProperty, IrResponse, IrResponseHeader,
    IrSecurityRequirement, ParamLocation, StatusClass,
};
use crate::parse::operation::{Operation, PathItem, RequestBody, Response};
use crate::parse::parameter::{Parameter, ParameterLocation};
use crate::parse::ref_resolve::RefResolver;
use crate::parse::security::SecurityRequirement;
use crate::parse::spec::OpenApiSpec;

use super::conflicts::dedup_params;
use super::name_normalizer::{synthesize_operation_id, to_camel_case, to_snake_case};
use super::property_resolver::{PropertyResolver, vendor_extensions};

/// Turns each (path, method) pair into an [`IrOperation`].
#[derive(Debug, Clone, Copy)]
pub struct OperationResolver<'a> {
    properties: PropertyResolver<'a>,
    refs: RefResolver<'a>,
    aliases: &'a IndexMap<String, String>,
}

impl<'a> OperationResolver<'a> {
    pub fn new(
        properties: PropertyResolver<'a>,
        refs: RefResolver<'a>,
        aliases: &'a IndexMap<String, String>,
    ) -> Self {
        Self {
            properties,
            refs,
            aliases,
        }
    }

    /// Every operation, by path then by the fixed method order.
    pub fn resolve_all(&self, spec: &'a OpenApiSpec) -> Vec<IrOperation> {
        let mut paths: Vec<(&String, &PathItem)> = spec.paths.iter().collect();
        paths.sort_by(|a, b| a.0.cmp(b.0));

        let mut operations = Vec::new();
        for (path, item) in paths {
            for (method, op) in item.operations() {
                operations.push(self.resolve(path, item, method, op, spec.security.as_ref()));
            }
        }
        operations
    }

    pub fn resolve(
        &self,
        path: &str,
        item: &'a PathItem,
        method: HttpMethod,
        op: &'a Operation,
        default_security: Option<&Vec<SecurityRequirement>>,
    ) -> IrOperation {
        let original_id = op.operation_id.clone().filter(|id| !id.is_empty());
        let raw_id = original_id
            .clone()
            .unwrap_or_else(|| synthesize_operation_id(method.as_str(), path));
        let operation_id = self.aliases.get(&raw_id).cloned().unwrap_or(raw_id);
        let location = format!("{} {}", method.as_str(), path);

        let mut all_params: Vec<IrParameter> = Vec::new();
        for param in item.parameters.iter().chain(&op.parameters) {
            match self.refs.parameter(param) {
                Ok(param) => all_params.push(self.parameter(param)),
                Err(e) => warn!("{location}: skipping parameter: {e}"),
            }
        }

        let mut consumes = Vec::new();
        let mut is_multipart = false;
        if let Some(body) = &op.request_body {
            match self.refs.request_body(body) {
                Ok(body) => {
                    consumes = body.content.keys().cloned().collect();
                    is_multipart = consumes.iter().any(|ct| ct.starts_with("multipart/"));
                    all_params.extend(self.body_param(body));
                }
                Err(e) => warn!("{location}: skipping request body: {e}"),
            }
        }

        let responses = self.responses(&location, op);
        let return_property = responses
            .iter()
            .find(|r| r.status_class == StatusClass::Success && r.schema.is_some())
            .and_then(|r| r.schema.clone());
        let mut produces: Vec<String> = Vec::new();
        for content_type in responses.iter().flat_map(|r| &r.content_types) {
            if !produces.contains(content_type) {
                produces.push(content_type.clone());
            }
        }

        let security = op.security.as_ref().or(default_security);
        let auth_methods = security
            .into_iter()
            .flatten()
            .flat_map(|requirement| requirement.iter())
            .map(|(name, scopes)| IrSecurityRequirement {
                name: name.clone(),
                scopes: scopes.clone(),
            })
            .collect();

        let tags = if op.tags.is_empty() {
            vec!["default".to_string()]
        } else {
            op.tags.clone()
        };

        let camel = to_camel_case(&operation_id);
        let mut operation = IrOperation {
            operation_id_snake_case: to_snake_case(&operation_id),
            operation_id_lower_case: operation_id.to_lowercase(),
            nickname: camel.clone(),
            operation_id_camel_case: camel,
            operation_id,
            operation_id_original: original_id,
            path: path.to_string(),
            http_method: method,
            tag: tags[0].clone(),
            tags,
            summary: op.summary.clone(),
            notes: op.description.clone(),
            deprecated: op.deprecated.unwrap_or(false),
            all_params,
            path_params: Vec::new(),
            query_params: Vec::new(),
            header_params: Vec::new(),
            cookie_params: Vec::new(),
            body_param: None,
            required_params: Vec::new(),
            optional_params: Vec::new(),
            responses,
            return_property,
            auth_methods,
            consumes,
            produces,
            is_multipart,
            imports: BTreeSet::new(),
            vendor_extensions: vendor_extensions(&op.extensions),
        };
        dedup_params(&mut operation);
        operation.imports = self.imports(&operation);
        operation
    }

    fn parameter(&self, param: &Parameter) -> IrParameter {
        let location = match param.location {
            ParameterLocation::Path => ParamLocation::Path,
            ParameterLocation::Query => ParamLocation::Query,
            ParameterLocation::Header => ParamLocation::Header,
            ParameterLocation::Cookie => ParamLocation::Cookie,
        };
        let required = param.required || location == ParamLocation::Path;
        let schema = match &param.schema {
            Some(schema) => self.properties.resolve(&param.name, schema, required),
            None => self.properties.any(&param.name, required),
        };
        let style = param.style.clone().unwrap_or_else(|| {
            match location {
                ParamLocation::Query | ParamLocation::Cookie => "form",
                _ => "simple",
            }
            .to_string()
        });
        let param_name = self.properties.naming().param_name(&param.name);
        let normalized = self.properties.naming().normalize(&param.name);

        IrParameter {
            base_name: param.name.clone(),
            name_in_camel_case: param_name.clone(),
            name_in_pascal_case: normalized.pascal_case,
            name_in_snake_case: normalized.snake_case,
            name_in_lower_case: param_name.to_lowercase(),
            param_name,
            location,
            required,
            deprecated: param.deprecated.unwrap_or(false),
            description: param.description.clone(),
            explode: param.explode.unwrap_or(style == "form"),
            style: Some(style),
            example: param.example.clone(),
            content_type: None,
            schema,
            vendor_extensions: vendor_extensions(&param.extensions),
        }
    }

    /// The `body` pseudo-parameter, from the first content type with a schema.
    fn body_param(&self, body: &RequestBody) -> Option<IrParameter> {
        let (content_type, schema) = body
            .content
            .iter()
            .find_map(|(ct, media)| media.schema.as_ref().map(|s| (ct, s)))?;
        let schema = self.properties.resolve("body", schema, body.required);
        Some(IrParameter {
            base_name: "body".to_string(),
            param_name: "body".to_string(),
            name_in_camel_case: "body".to_string(),
            name_in_pascal_case: "Body".to_string(),
            name_in_snake_case: "body".to_string(),
            name_in_lower_case: "body".to_string(),
            location: ParamLocation::Body,
            required: body.required,
            deprecated: false,
            description: body.description.clone(),
            style: None,
            explode: false,
            example: None,
            content_type: Some(content_type.clone()),
            schema,
            vendor_extensions: Default::default(),
        })
    }

    /// Responses sorted by status code.
    fn responses(&self, location: &str, op: &'a Operation) -> Vec<IrResponse> {
        let mut codes: Vec<&String> = op.responses.keys().collect();
        codes.sort();
        codes
            .into_iter()
            .filter_map(|code| match self.refs.response(&op.responses[code]) {
                Ok(response) => Some(self.response(location, code, response)),
                Err(e) => {
                    warn!("{location}: skipping response {code}: {e}");
                    None
                }
            })
            .collect()
    }

    fn response(&self, location: &str, code: &str, response: &'a Response) -> IrResponse {
        let schema = response
            .content
            .values()
            .find_map(|media| media.schema.as_ref())
            .map(|schema| self.properties.resolve("response", schema, false));

        let mut names: Vec<&String> = response.headers.keys().collect();
        names.sort();
        let headers = names
            .into_iter()
            .filter_map(|name| match self.refs.header(&response.headers[name]) {
                Ok(header) => Some(IrResponseHeader {
                    name: name.clone(),
                    description: header.description.clone(),
                    required: header.required,
                    schema: match &header.schema {
                        Some(schema) => self.properties.resolve(name, schema, header.required),
                        None => self.properties.any(name, header.required),
                    },
                }),
                Err(e) => {
                    warn!("{location}: skipping header {name} of response {code}: {e}");
                    None
                }
            })
            .collect();

        IrResponse {
            code: code.to_string(),
            status_class: StatusClass::from_code(code),
            description: response.description.clone(),
            schema,
            content_types: response.content.keys().cloned().collect(),
            headers,
            vendor_extensions: vendor_extensions(&response.extensions),
        }
    }

    fn imports(&self, op: &IrOperation) -> BTreeSet<String> {
        let types = self.properties.types();
        op.all_params
            .iter()
            .map(|p| &p.schema)
            .chain(op.return_property.as_ref())
            .filter_map(IrProperty::complex_type)
            .filter(|name| !types.is_primitive(name))
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::from_yaml;
    use crate::transform::name_normalizer::Normalizer;
    use crate::transform::type_mapper::TypeMapper;

    const SPEC: &str = r##"
openapi: "3.0.3"
info: { title: t, version: "1" }
security:
  - apiKey: []
paths:
  /pets/{petId}:
    parameters:
      - { name: petId, in: path, schema: { type: string } }
      - $ref: '#/components/parameters/Missing'
    get:
      tags: [pets]
      parameters:
        - { name: verbose, in: query, schema: { type: boolean } }
      responses:
        default:
          description: error
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Error' }
        "404": { description: missing }
        "201":
          description: created
          content:
            application/xml:
              schema: { $ref: '#/components/schemas/Pet' }
        200:
          $ref: '#/components/responses/PetResponse'
    put:
      operationId: updatePet
      security: []
      requestBody:
        required: true
        content:
          application/octet-stream: {}
          multipart/form-data:
            schema: { $ref: '#/components/schemas/PetForm' }
      responses:
        "204": { description: updated }
  /pets:
    post:
      operationId: createPet
      security:
        - oauth: [write, read]
      requestBody:
        $ref: '#/components/requestBodies/NewPet'
      responses:
        "201": { description: ok }
components:
  schemas:
    Pet: { type: object }
    Error: { type: object }
    PetForm: { type: object }
  requestBodies:
    NewPet:
      content:
        application/json:
          schema: { type: array, items: { $ref: '#/components/schemas/Pet' } }
  responses:
    PetResponse:
      description: ok
      headers:
        X-Rate-Limit: { schema: { type: integer } }
      content:
        application/json:
          schema: { $ref: '#/components/schemas/Pet' }
"##;

    fn operations() -> Vec<IrOperation> {
        let spec = from_yaml(SPEC).unwrap();
        let naming = Normalizer::default();
        let types = TypeMapper::default();
        let aliases = IndexMap::from([("updatePet".to_string(), "replacePet".to_string())]);
        OperationResolver::new(
            PropertyResolver::new(&naming, &types),
            RefResolver::new(&spec),
            &aliases,
        )
        .resolve_all(&spec)
    }

    #[test]
    fn operations_follow_path_and_method_order() {
        let ops = operations();
        let ids: Vec<_> = ops.iter().map(|o| o.operation_id.as_str()).collect();
        assert_eq!(ids, ["createPet", "getPetsPetId", "replacePet"]);
        assert_eq!(ops[1].operation_id_original, None);
        assert_eq!(ops[2].operation_id_original.as_deref(), Some("updatePet"));
        assert_eq!(ops[1].tag, "pets");
        assert_eq!(ops[0].tag, "default");
    }

    #[test]
    fn parameters_are_bucketed() {
        let ops = operations();
        let get = &ops[1];
        let names: Vec<_> = get.all_params.iter().map(|p| p.param_name.as_str()).collect();
        assert_eq!(names, ["petId", "verbose"]);
        assert!(get.path_params[0].required);
        assert_eq!(get.query_params[0].style.as_deref(), Some("form"));
        assert!(get.query_params[0].explode);
        assert_eq!(get.required_params.len(), 1);
        assert_eq!(get.optional_params.len(), 1);
    }

    #[test]
    fn responses_sorted_and_return_type_from_first_success() {
        let ops = operations();
        let get = &ops[1];
        let codes: Vec<_> = get.responses.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["200", "201", "404", "default"]);
        assert_eq!(get.return_type(), Some("Pet"));
        assert_eq!(get.produces, ["application/json", "application/xml"]);
        assert_eq!(get.responses[0].headers[0].schema.data_type, "number");
        assert_eq!(get.responses[3].status_class, StatusClass::Default);
        assert!(get.imports.contains("Pet"));
        assert!(!get.imports.contains("Error"));
    }

    #[test]
    fn lowest_success_code_wins_regardless_of_declaration_order() {
        let spec = from_yaml(
            r##"
openapi: "3.0.3"
info: { title: t, version: "1" }
paths:
  /reactions:
    post:
      operationId: react
      parameters:
        - { name: "+1", in: query, schema: { type: integer } }
        - { name: "-1", in: query, schema: { type: integer } }
      responses:
        "404": { description: missing }
        "201":
          description: created
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Error' }
        "200":
          description: ok
          content:
            application/json:
              schema: { $ref: '#/components/schemas/Pet' }
components:
  schemas:
    Pet: { type: object }
    Error: { type: object }
"##,
        )
        .unwrap();
        let naming = Normalizer::default();
        let types = TypeMapper::default();
        let aliases = IndexMap::new();
        let ops = OperationResolver::new(
            PropertyResolver::new(&naming, &types),
            RefResolver::new(&spec),
            &aliases,
        )
        .resolve_all(&spec);

        let react = &ops[0];
        let codes: Vec<_> = react.responses.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["200", "201", "404"]);
        assert_eq!(react.return_type(), Some("Pet"));
        assert_eq!(react.responses[1].schema.as_ref().unwrap().data_type, "ModelError");

        let plus = &react.query_params[0];
        let minus = &react.query_params[1];
        assert_eq!(plus.param_name, "plus1");
        assert_eq!(plus.name_in_pascal_case, "Plus1");
        assert_eq!(plus.name_in_snake_case, "plus1");
        assert_eq!(minus.name_in_pascal_case, "Minus1");
    }

    #[test]
    fn request_bodies() {
        let ops = operations();
        let put = &ops[2];
        let body = put.body_param.as_ref().unwrap();
        assert!(body.is_body_param());
        assert_eq!(body.content_type.as_deref(), Some("multipart/form-data"));
        assert_eq!(body.data_type(), "PetForm");
        assert!(put.is_multipart);
        assert_eq!(put.consumes, ["application/octet-stream", "multipart/form-data"]);

        let post = &ops[0];
        let body = post.body_param.as_ref().unwrap();
        assert_eq!(body.data_type(), "Array<Pet>");
        assert!(post.imports.contains("Pet"));
    }

    #[test]
    fn security_falls_back_to_document_level() {
        let ops = operations();
        assert_eq!(
            ops[0].auth_methods,
            [IrSecurityRequirement {
                name: "oauth".into(),
                scopes: vec!["write".into(), "read".into()],
            }]
        );
        assert_eq!(ops[1].auth_methods[0].name, "apiKey");
        assert!(ops[2].auth_methods.is_empty());
    }
}
