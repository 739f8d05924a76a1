use std::collections::HashSet;

use super::operation::{Header, HeaderOrRef, RequestBody, RequestBodyOrRef, Response, ResponseOrRef};
use super::parameter::{Parameter, ParameterOrRef};
use super::schema::{Schema, SchemaOrRef};
use super::spec::{Components, OpenApiSpec};
use crate::error::ResolveError;

/// Looks up `#/components/...` targets by borrowing from the document.
///
/// Schema references are never inlined: models refer to each other by name,
/// which is what keeps self-referential and mutually-referential schemas
/// finite. Only parameters, request bodies, responses and headers are
/// dereferenced, since the IR embeds them into each operation.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    components: Option<&'a Components>,
}

impl<'a> RefResolver<'a> {
    pub fn new(spec: &'a OpenApiSpec) -> Self {
        Self {
            components: spec.components.as_ref(),
        }
    }

    /// Whether `#/components/schemas/<name>` exists.
    pub fn has_schema(&self, ref_path: &str) -> bool {
        parse_ref_name(ref_path, "schemas")
            .ok()
            .and_then(|name| self.components?.schemas.get(name))
            .is_some()
    }

    /// Follow a chain of schema aliases (`Foo: {$ref: Bar}`) to the first
    /// inline body.
    pub fn schema_body(&self, schema_or_ref: &'a SchemaOrRef) -> Result<&'a Schema, ResolveError> {
        let mut current = schema_or_ref;
        let mut visited = HashSet::new();
        loop {
            match current {
                SchemaOrRef::Schema(schema) => return Ok(schema),
                SchemaOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "schemas")?;
                    current = self
                        .components
                        .and_then(|c| c.schemas.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn parameter(&self, param: &'a ParameterOrRef) -> Result<&'a Parameter, ResolveError> {
        let mut current = param;
        let mut visited = HashSet::new();
        loop {
            match current {
                ParameterOrRef::Parameter(p) => return Ok(p),
                ParameterOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "parameters")?;
                    current = self
                        .components
                        .and_then(|c| c.parameters.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn request_body(
        &self,
        body: &'a RequestBodyOrRef,
    ) -> Result<&'a RequestBody, ResolveError> {
        let mut current = body;
        let mut visited = HashSet::new();
        loop {
            match current {
                RequestBodyOrRef::RequestBody(rb) => return Ok(rb),
                RequestBodyOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "requestBodies")?;
                    current = self
                        .components
                        .and_then(|c| c.request_bodies.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn response(&self, resp: &'a ResponseOrRef) -> Result<&'a Response, ResolveError> {
        let mut current = resp;
        let mut visited = HashSet::new();
        loop {
            match current {
                ResponseOrRef::Response(r) => return Ok(r),
                ResponseOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "responses")?;
                    current = self
                        .components
                        .and_then(|c| c.responses.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }

    pub fn header(&self, header: &'a HeaderOrRef) -> Result<&'a Header, ResolveError> {
        let mut current = header;
        let mut visited = HashSet::new();
        loop {
            match current {
                HeaderOrRef::Header(h) => return Ok(h),
                HeaderOrRef::Ref { ref_path } => {
                    if !visited.insert(ref_path.as_str()) {
                        return Err(ResolveError::CircularRef(ref_path.clone()));
                    }
                    let name = parse_ref_name(ref_path, "headers")?;
                    current = self
                        .components
                        .and_then(|c| c.headers.get(name))
                        .ok_or_else(|| ResolveError::RefTargetNotFound(ref_path.clone()))?;
                }
            }
        }
    }
}

/// Parse a `$ref` path like `#/components/schemas/Foo` and extract the name.
pub fn parse_ref_name<'a>(
    ref_path: &'a str,
    expected_section: &str,
) -> Result<&'a str, ResolveError> {
    let stripped = ref_path
        .strip_prefix("#/components/")
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let (section, name) = stripped
        .split_once('/')
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    if section != expected_section {
        return Err(ResolveError::InvalidRefFormat(format!(
            "expected section '{}', got '{}' in {}",
            expected_section, section, ref_path
        )));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const ALIASES: &str = r##"
openapi: "3.0.3"
info: { title: t, version: "1" }
paths: {}
components:
  schemas:
    Pet:
      type: object
    Animal:
      $ref: "#/components/schemas/Pet"
    Creature:
      $ref: "#/components/schemas/Animal"
    Loop:
      $ref: "#/components/schemas/Loop"
  parameters:
    Limit:
      name: limit
      in: query
      schema: { type: integer }
"##;

    #[test]
    fn parse_ref_name_checks_section() {
        assert_eq!(
            parse_ref_name("#/components/schemas/Pet", "schemas").unwrap(),
            "Pet"
        );
        assert!(parse_ref_name("#/components/parameters/Pet", "schemas").is_err());
        assert!(parse_ref_name("other.yaml#/Pet", "schemas").is_err());
    }

    #[test]
    fn schema_alias_chain_reaches_body() {
        let spec = parse::from_yaml(ALIASES).unwrap();
        let resolver = RefResolver::new(&spec);
        let creature = &spec.components.as_ref().unwrap().schemas["Creature"];
        let body = resolver.schema_body(creature).unwrap();
        assert!(body.schema_type.is_some());
    }

    #[test]
    fn schema_alias_cycle_is_reported() {
        let spec = parse::from_yaml(ALIASES).unwrap();
        let resolver = RefResolver::new(&spec);
        let looped = &spec.components.as_ref().unwrap().schemas["Loop"];
        assert!(matches!(
            resolver.schema_body(looped),
            Err(ResolveError::CircularRef(_))
        ));
    }

    #[test]
    fn parameter_ref_is_looked_up() {
        let spec = parse::from_yaml(ALIASES).unwrap();
        let resolver = RefResolver::new(&spec);
        let param_ref = ParameterOrRef::Ref {
            ref_path: "#/components/parameters/Limit".into(),
        };
        assert_eq!(resolver.parameter(&param_ref).unwrap().name, "limit");

        let missing = ParameterOrRef::Ref {
            ref_path: "#/components/parameters/Offset".into(),
        };
        assert!(matches!(
            resolver.parameter(&missing),
            Err(ResolveError::RefTargetNotFound(_))
        ));
    }
}
