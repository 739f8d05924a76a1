pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod schema;
pub mod security;
pub mod spec;

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Keys of an object that the typed model does not capture.
pub type Extensions = IndexMap<String, serde_json::Value>;

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Read and parse a spec file, choosing the decoder by extension.
pub fn load_file(path: &Path) -> Result<OpenApiSpec, ParseError> {
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json(&content),
        _ => from_yaml(&content),
    }
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    if !spec.openapi.starts_with("3.") {
        return Err(ParseError::UnsupportedVersion(spec.openapi.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_swagger_2() {
        let err = from_yaml("openapi: \"2.0\"\ninfo: { title: t, version: \"1\" }\n").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_file(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
    }
}
