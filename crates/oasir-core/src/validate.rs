use std::collections::{BTreeSet, HashMap};
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::parse::operation::{MediaType, Operation, PathItem};
use crate::parse::parameter::ParameterLocation;
use crate::parse::ref_resolve::{RefResolver, parse_ref_name};
use crate::parse::schema::{AdditionalProperties, SchemaOrRef};
use crate::parse::spec::OpenApiSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A structural problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Where in the document, e.g. `GET /pets/{petId}` or `components.schemas.Pet`.
    pub location: String,
    pub message: String,
}

impl ValidationIssue {
    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        }
    }

    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}: {}", self.location, self.message)
    }
}

/// What happens when validation reports errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Errors abort the pass.
    Strict,
    /// Issues are logged and resolution proceeds.
    #[default]
    Lenient,
}

/// Check a document for problems the resolver would otherwise paper over.
pub fn validate(spec: &OpenApiSpec) -> Vec<ValidationIssue> {
    let resolver = RefResolver::new(spec);
    let mut issues = Vec::new();
    let mut used_schemas: Vec<&str> = Vec::new();

    for (name, schema) in spec.schemas() {
        let mut refs = Vec::new();
        schema_refs(schema, &mut refs);
        check_schema_refs(&resolver, &format!("components.schemas.{name}"), &refs, &mut issues);
    }

    let mut seen_ids: HashMap<&str, String> = HashMap::new();
    for (path, item) in &spec.paths {
        for (method, op) in item.operations() {
            let location = format!("{} {}", method.as_str(), path);
            let refs = check_operation(&resolver, &location, path, item, op, &mut issues);
            used_schemas.extend(refs);

            if let Some(id) = op.operation_id.as_deref() {
                if let Some(first) = seen_ids.get(id) {
                    issues.push(ValidationIssue::error(
                        &location,
                        format!("duplicate operationId `{id}` (first declared at {first})"),
                    ));
                } else {
                    seen_ids.insert(id, location);
                }
            }
        }
    }

    for name in unused_schemas(spec, used_schemas) {
        issues.push(ValidationIssue::warning(
            format!("components.schemas.{name}"),
            format!("Unused model: {name}"),
        ));
    }

    issues
}

/// Apply `policy` to a set of issues: log them, and fail under
/// [`ValidationPolicy::Strict`] when any is an error.
pub fn enforce(policy: ValidationPolicy, issues: Vec<ValidationIssue>) -> Result<(), TransformError> {
    for issue in &issues {
        warn!("{issue}");
    }
    if policy == ValidationPolicy::Strict && issues.iter().any(ValidationIssue::is_error) {
        return Err(TransformError::Validation(issues));
    }
    Ok(())
}

/// Validates one operation and returns the schema refs it uses.
fn check_operation<'a>(
    resolver: &RefResolver<'a>,
    location: &str,
    path: &str,
    item: &'a PathItem,
    op: &'a Operation,
    issues: &mut Vec<ValidationIssue>,
) -> Vec<&'a str> {
    let mut refs = Vec::new();
    let mut path_params = BTreeSet::new();

    for param in item.parameters.iter().chain(&op.parameters) {
        match resolver.parameter(param) {
            Ok(param) => {
                if param.location == ParameterLocation::Path {
                    path_params.insert(param.name.as_str());
                }
                if let Some(schema) = &param.schema {
                    schema_refs(schema, &mut refs);
                }
            }
            Err(e) => issues.push(ValidationIssue::error(location, e.to_string())),
        }
    }

    for var in template_variables(path) {
        if !path_params.contains(var) {
            issues.push(ValidationIssue::error(
                location,
                format!("path variable `{{{var}}}` has no matching path parameter"),
            ));
        }
    }

    if let Some(body) = &op.request_body {
        match resolver.request_body(body) {
            Ok(body) => content_refs(body.content.values(), &mut refs),
            Err(e) => issues.push(ValidationIssue::error(location, e.to_string())),
        }
    }

    for (code, response) in &op.responses {
        match resolver.response(response) {
            Ok(response) => {
                content_refs(response.content.values(), &mut refs);
                for header in response.headers.values() {
                    match resolver.header(header) {
                        Ok(header) => {
                            if let Some(schema) = &header.schema {
                                schema_refs(schema, &mut refs);
                            }
                        }
                        Err(e) => issues.push(ValidationIssue::error(
                            format!("{location} {code}"),
                            e.to_string(),
                        )),
                    }
                }
            }
            Err(e) => issues.push(ValidationIssue::error(format!("{location} {code}"), e.to_string())),
        }
    }

    check_schema_refs(resolver, location, &refs, issues);
    refs
}

fn check_schema_refs(
    resolver: &RefResolver<'_>,
    location: &str,
    refs: &[&str],
    issues: &mut Vec<ValidationIssue>,
) {
    for ref_path in refs {
        if !resolver.has_schema(ref_path) {
            issues.push(ValidationIssue::error(
                location,
                format!("unresolved reference `{ref_path}`"),
            ));
        }
    }
}

/// Schemas not reachable from any operation, sorted by name.
fn unused_schemas<'a>(spec: &'a OpenApiSpec, seeds: Vec<&'a str>) -> Vec<&'a str> {
    let Some(components) = spec.components.as_ref() else {
        return Vec::new();
    };
    let mut reachable = BTreeSet::new();
    let mut pending = seeds;
    while let Some(ref_path) = pending.pop() {
        let Ok(name) = parse_ref_name(ref_path, "schemas") else {
            continue;
        };
        if !reachable.insert(name) {
            continue;
        }
        if let Some(schema) = components.schemas.get(name) {
            schema_refs(schema, &mut pending);
        }
    }
    let mut unused: Vec<&str> = components
        .schemas
        .keys()
        .map(String::as_str)
        .filter(|name| !reachable.contains(name))
        .collect();
    unused.sort_unstable();
    unused
}

fn content_refs<'a>(content: impl Iterator<Item = &'a MediaType>, out: &mut Vec<&'a str>) {
    for media in content {
        if let Some(schema) = &media.schema {
            schema_refs(schema, out);
        }
    }
}

/// Every `$ref` inside a schema tree, in document order.
fn schema_refs<'a>(schema: &'a SchemaOrRef, out: &mut Vec<&'a str>) {
    let schema = match schema {
        SchemaOrRef::Ref { ref_path } => {
            out.push(ref_path);
            return;
        }
        SchemaOrRef::Schema(schema) => schema,
    };
    for prop in schema.properties.values() {
        schema_refs(prop, out);
    }
    if let Some(items) = &schema.items {
        schema_refs(items, out);
    }
    if let Some(AdditionalProperties::Schema(values)) = &schema.additional_properties {
        schema_refs(values, out);
    }
    for branch in schema.all_of.iter().chain(&schema.one_of).chain(&schema.any_of) {
        schema_refs(branch, out);
    }
    if let Some(discriminator) = &schema.discriminator {
        out.extend(
            discriminator
                .mapping
                .values()
                .filter(|target| target.starts_with("#/"))
                .map(String::as_str),
        );
    }
}

/// `{name}` segments of a path template.
fn template_variables(path: &str) -> Vec<&str> {
    path.split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}').map(|(var, _)| var))
        .collect()
}
