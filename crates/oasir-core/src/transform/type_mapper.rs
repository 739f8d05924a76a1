use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ir::SemanticFormat;

/// Caller-supplied mapping consulted before the table: `(type, format)` → target.
pub type TypeOverride = Arc<dyn Fn(&str, Option<&str>) -> Option<String> + Send + Sync>;

/// Target names that never need an import.
pub const DEFAULT_IMPORT_PRIMITIVES: &[&str] =
    &["string", "number", "boolean", "any", "void", "null", "Date", "Blob"];

/// Result of mapping a schema `(type, format)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedType {
    pub target: String,
    pub format: Option<SemanticFormat>,
}

/// Maps schema types to target-language type strings.
///
/// Lookup order is override, `type:format`, `format`, `type`, and finally the
/// type string itself. Never fails.
#[derive(Clone)]
pub struct TypeMapper {
    table: IndexMap<String, String>,
    override_fn: Option<TypeOverride>,
    primitives: HashSet<String>,
}

impl fmt::Debug for TypeMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMapper")
            .field("table", &self.table)
            .field("override_fn", &self.override_fn.as_ref().map(|_| "<fn>"))
            .field("primitives", &self.primitives)
            .finish()
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        let table = [
            ("integer", "number"),
            ("number", "number"),
            ("boolean", "boolean"),
            ("string", "string"),
            ("string:date", "Date"),
            ("string:date-time", "Date"),
            ("string:binary", "Blob"),
            ("array", "Array"),
            ("object", "any"),
            ("", "any"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self {
            table,
            override_fn: None,
            primitives: DEFAULT_IMPORT_PRIMITIVES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl TypeMapper {
    /// Add or replace table entries.
    pub fn with_mappings(mut self, mappings: &IndexMap<String, String>) -> Self {
        for (key, target) in mappings {
            self.table.insert(key.clone(), target.clone());
        }
        self
    }

    pub fn with_override(mut self, f: TypeOverride) -> Self {
        self.override_fn = Some(f);
        self
    }

    pub fn map(&self, schema_type: &str, format: Option<&str>) -> MappedType {
        MappedType {
            target: self.lookup(schema_type, format),
            format: format.and_then(SemanticFormat::from_format),
        }
    }

    fn lookup(&self, schema_type: &str, format: Option<&str>) -> String {
        if let Some(target) = self.override_fn.as_ref().and_then(|f| f(schema_type, format)) {
            return target;
        }
        if let Some(format) = format {
            if let Some(target) = self.table.get(&format!("{schema_type}:{format}")) {
                return target.clone();
            }
            if let Some(target) = self.table.get(format) {
                return target.clone();
            }
        }
        self.table
            .get(schema_type)
            .cloned()
            .unwrap_or_else(|| schema_type.to_string())
    }

    /// The universal "anything" type.
    pub fn any_type(&self) -> String {
        self.lookup("", None)
    }

    pub fn array_of(&self, item: &str) -> String {
        format!("Array<{item}>")
    }

    pub fn map_of(&self, value: &str) -> String {
        format!("{{ [key: string]: {value}; }}")
    }

    /// Whether a target type name is built in, and so never imported.
    pub fn is_primitive(&self, name: &str) -> bool {
        self.primitives.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let t = TypeMapper::default();
        assert_eq!(t.map("integer", Some("int64")).target, "number");
        assert_eq!(t.map("string", Some("date-time")).target, "Date");
        assert_eq!(t.map("string", Some("binary")).target, "Blob");
        assert_eq!(t.map("string", Some("uuid")).target, "string");
        assert_eq!(t.map("object", None).target, "any");
        assert_eq!(t.map("", None).target, "any");
        assert_eq!(t.map("decimal", None).target, "decimal");
    }

    #[test]
    fn test_semantic_format() {
        let t = TypeMapper::default();
        assert_eq!(t.map("string", Some("uuid")).format, Some(SemanticFormat::Uuid));
        assert_eq!(t.map("integer", Some("int32")).format, None);
    }

    #[test]
    fn test_lookup_order() {
        let mappings = IndexMap::from([
            ("uuid".to_string(), "Uuid".to_string()),
            ("string:uuid".to_string(), "UUID".to_string()),
            ("integer".to_string(), "bigint".to_string()),
        ]);
        let t = TypeMapper::default().with_mappings(&mappings);
        assert_eq!(t.map("string", Some("uuid")).target, "UUID");
        assert_eq!(t.map("number", Some("uuid")).target, "Uuid");
        assert_eq!(t.map("integer", None).target, "bigint");

        let t = t.with_override(Arc::new(|ty, _| (ty == "integer").then(|| "int".to_string())));
        assert_eq!(t.map("integer", None).target, "int");
        assert_eq!(t.map("string", Some("uuid")).target, "UUID");
    }

    #[test]
    fn test_containers_and_primitives() {
        let t = TypeMapper::default();
        assert_eq!(t.array_of("Pet"), "Array<Pet>");
        assert_eq!(t.map_of("number"), "{ [key: string]: number; }");
        assert!(t.is_primitive("Date"));
        assert!(!t.is_primitive("Pet"));
    }
}
