use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::{NamingConfig, PropertyNaming};
use crate::ir::NormalizedName;

/// TypeScript keywords, API-method locals, and browser built-ins that must
/// not be used verbatim as identifiers. Matched case-insensitively.
pub const DEFAULT_RESERVED_WORDS: &[&str] = &[
    // locals used inside generated API methods
    "varlocalpath",
    "queryparameters",
    "headerparams",
    "formparams",
    "useformdata",
    "varlocaldeferred",
    "requestoptions",
    // language keywords
    "abstract",
    "await",
    "boolean",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "double",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "final",
    "finally",
    "float",
    "for",
    "function",
    "goto",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "int",
    "interface",
    "let",
    "long",
    "native",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "short",
    "static",
    "super",
    "switch",
    "synchronized",
    "this",
    "throw",
    "transient",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "volatile",
    "while",
    "with",
    "yield",
    // browser built-ins
    "blob",
    "file",
    "date",
    "error",
    "map",
    "set",
    "array",
    "object",
];

/// Built-in type names of the target language. Matched case-sensitively.
pub const DEFAULT_PRIMITIVES: &[&str] = &[
    "string",
    "String",
    "boolean",
    "Boolean",
    "Double",
    "Integer",
    "Long",
    "Float",
    "Object",
    "Array",
    "ReadonlyArray",
    "Date",
    "number",
    "any",
    "File",
    "Error",
    "Map",
    "Set",
];

/// Naming hooks for one resolution pass.
///
/// Reserved words and primitives are injected at construction and owned by
/// the instance; nothing here is global or mutable.
#[derive(Debug, Clone)]
pub struct Normalizer {
    reserved: HashSet<String>,
    primitives: HashSet<String>,
    safe_prefix: String,
    model_prefix: String,
    model_suffix: String,
    model_mappings: IndexMap<String, String>,
    property_naming: PropertyNaming,
    api_suffix: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&NamingConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: &NamingConfig) -> Self {
        let reserved = DEFAULT_RESERVED_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(config.reserved_words.iter().map(|w| w.to_lowercase()))
            .collect();
        let primitives = DEFAULT_PRIMITIVES
            .iter()
            .map(|p| p.to_string())
            .chain(config.primitives.iter().cloned())
            .collect();
        Self {
            reserved,
            primitives,
            safe_prefix: config.safe_prefix.clone(),
            model_prefix: config.model_name_prefix.clone().unwrap_or_default(),
            model_suffix: config.model_name_suffix.clone().unwrap_or_default(),
            model_mappings: config.model_name_mappings.clone(),
            property_naming: config.property_naming,
            api_suffix: config.api_name_suffix.clone(),
        }
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(&word.to_lowercase())
    }

    pub fn is_primitive(&self, name: &str) -> bool {
        self.primitives.contains(name)
    }

    /// Class name for a schema name.
    ///
    /// Explicit mappings win outright. Otherwise prefix and suffix are
    /// applied, the result is PascalCased, and a name that is reserved, a
    /// primitive, or starts with a digit gets the safe prefix.
    pub fn model_name(&self, name: &str) -> String {
        if let Some(mapped) = self.model_mappings.get(name) {
            return mapped.clone();
        }
        let name = lexical_exception(name).unwrap_or(name);
        let mut decorated = name.to_string();
        if !self.model_prefix.is_empty() {
            decorated = format!("{}_{}", self.model_prefix, decorated);
        }
        if !self.model_suffix.is_empty() {
            decorated = format!("{}_{}", decorated, self.model_suffix);
        }
        let stripped: String = decorated
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '|' | ' '))
            .collect();
        let pascal = to_pascal_case(&stripped);
        if pascal.is_empty() {
            return self.safe_prefix.clone();
        }
        if self.is_reserved(&pascal) || starts_with_digit(&pascal) || self.is_primitive(&pascal) {
            return format!("{}{}", self.safe_prefix, pascal);
        }
        pascal
    }

    /// Field identifier, styled per the configured property naming.
    ///
    /// Names with a leading or trailing underscore keep their sanitized form
    /// so that `_id` and `id` stay distinct.
    pub fn var_name(&self, name: &str) -> String {
        let sanitized = sanitize_name(name);
        if sanitized.starts_with('_') || sanitized.ends_with('_') {
            return sanitized;
        }
        let styled = match self.property_naming {
            PropertyNaming::Original => sanitized,
            PropertyNaming::CamelCase => to_camel_case(&sanitized),
            PropertyNaming::PascalCase => to_pascal_case(&sanitized),
            PropertyNaming::SnakeCase => to_snake_case(&sanitized),
        };
        self.escape_identifier(styled)
    }

    /// Parameter identifier: always camelCase, independent of property naming.
    pub fn param_name(&self, name: &str) -> String {
        let sanitized = sanitize_name(name);
        if sanitized.starts_with('_') || sanitized.ends_with('_') {
            return sanitized;
        }
        self.escape_identifier(to_camel_case(&sanitized))
    }

    /// API class name for a tag, e.g. `pet-store` → `PetStoreApi`.
    pub fn api_name(&self, tag: &str) -> String {
        format!("{}{}", to_pascal_case(&sanitize_name(tag)), self.api_suffix)
    }

    /// All casing variants of a name.
    pub fn normalize(&self, name: &str) -> NormalizedName {
        let source = lexical_exception(name).unwrap_or(name);
        NormalizedName {
            original: name.to_string(),
            camel_case: to_camel_case(source),
            pascal_case: to_pascal_case(source),
            snake_case: to_snake_case(source),
            lower_case: name.to_lowercase(),
        }
    }

    fn escape_identifier(&self, name: String) -> String {
        if name.is_empty() {
            return "_".to_string();
        }
        if self.is_reserved(&name) || starts_with_digit(&name) || self.is_primitive(&name) {
            return format!("_{name}");
        }
        name
    }
}

/// `+1` and `-1` (reaction names) cannot survive sanitization.
fn lexical_exception(name: &str) -> Option<&'static str> {
    match name {
        "+1" => Some("plus1"),
        "-1" => Some("minus1"),
        _ => None,
    }
}

fn starts_with_digit(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_name(name: &str) -> String {
    if let Some(exception) = lexical_exception(name) {
        return exception.to_string();
    }
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Split an identifier into words.
///
/// A boundary is any non-alphanumeric character or a lowercase letter
/// followed by an uppercase one. Runs of capitals stay in one word.
pub fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in s.chars() {
        if !ch.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_ascii_lowercase();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// First word lowercased, the rest title-cased. Inputs without any word
/// are returned unchanged.
pub fn to_camel_case(s: &str) -> String {
    let words = split_words(s);
    let Some((first, rest)) = words.split_first() else {
        return s.to_string();
    };
    let mut out = first.to_lowercase();
    for word in rest {
        out.push_str(&title_case(word));
    }
    out
}

pub fn to_pascal_case(s: &str) -> String {
    split_words(s).iter().map(|w| title_case(w)).collect()
}

pub fn to_snake_case(s: &str) -> String {
    split_words(s)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Enum member identifier for a literal value.
///
/// Uppercases, turns space/dash/dot into `_` and `+` into `PLUS`, prefixes a
/// leading digit with `_`, drops anything else that is not a letter, digit
/// or underscore, and falls back to `VALUE` when nothing is left.
pub fn enum_member_name(value: &str) -> String {
    let mut name = value
        .to_uppercase()
        .replace([' ', '-', '.'], "_")
        .replace('+', "PLUS");
    if starts_with_digit(&name) {
        name.insert(0, '_');
    }
    let valid: String = name
        .chars()
        .enumerate()
        .filter(|(i, c)| c.is_ascii_alphabetic() || *c == '_' || (*i > 0 && c.is_ascii_digit()))
        .map(|(_, c)| c)
        .collect();
    if valid.is_empty() {
        "VALUE".to_string()
    } else {
        valid
    }
}

/// Escape `'` for single-quoted string literals.
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "\\'")
}

/// Operation id for an operation that declares none: lowercase method
/// followed by the PascalCased path, e.g. `GET /pets/{petId}` → `getPetsPetId`.
pub fn synthesize_operation_id(method: &str, path: &str) -> String {
    let flattened = path.replace('/', "_").replace(['{', '}'], "").replace('-', "_");
    format!("{}{}", method.to_lowercase(), to_pascal_case(&flattened))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("petStore-api_v2"), vec!["pet", "Store", "api", "v2"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTPServer"]);
        assert!(split_words("--").is_empty());
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_camel_case("list_models"), "listModels");
        assert_eq!(to_camel_case("ListModels"), "listModels");
        assert_eq!(to_pascal_case("pet-store"), "PetStore");
        assert_eq!(to_snake_case("createChatCompletion"), "create_chat_completion");
        assert_eq!(to_camel_case(""), "");
    }

    #[test]
    fn test_model_name_escaping() {
        let n = Normalizer::default();
        assert_eq!(n.model_name("pet"), "Pet");
        assert_eq!(n.model_name("Date"), "ModelDate");
        assert_eq!(n.model_name("object"), "ModelObject");
        assert_eq!(n.model_name("3dModel"), "Model3dModel");
        assert_eq!(n.model_name("Pet.v2"), "Petv2");
        assert_eq!(n.model_name("$$$"), "Model");
    }

    #[test]
    fn test_model_name_mapping_and_affixes() {
        let config = NamingConfig {
            model_name_prefix: Some("Api".into()),
            model_name_mappings: IndexMap::from([("Legacy".to_string(), "Modern".to_string())]),
            ..NamingConfig::default()
        };
        let n = Normalizer::new(&config);
        assert_eq!(n.model_name("pet"), "ApiPet");
        assert_eq!(n.model_name("Legacy"), "Modern");
    }

    #[test]
    fn test_var_name() {
        let n = Normalizer::default();
        assert_eq!(n.var_name("first-name"), "firstName");
        assert_eq!(n.var_name("_id"), "_id");
        assert_eq!(n.var_name("default"), "_default");
        assert_eq!(n.var_name("+1"), "plus1");
        assert_eq!(n.var_name("-1"), "minus1");
        assert_eq!(n.var_name("2fa"), "_2fa");
        assert_eq!(n.var_name("string"), "_string");
        assert_eq!(n.var_name("any"), "_any");
        assert_eq!(n.var_name("number"), "_number");
        assert_eq!(n.param_name("boolean"), "_boolean");
    }

    #[test]
    fn test_var_name_respects_property_naming() {
        let config = NamingConfig {
            property_naming: PropertyNaming::SnakeCase,
            ..NamingConfig::default()
        };
        assert_eq!(Normalizer::new(&config).var_name("petId"), "pet_id");
    }

    #[test]
    fn test_enum_member_name() {
        assert_eq!(enum_member_name("A"), "A");
        assert_eq!(enum_member_name("+1"), "PLUS1");
        assert_eq!(enum_member_name("in-progress"), "IN_PROGRESS");
        assert_eq!(enum_member_name("1.5"), "_1_5");
        assert_eq!(enum_member_name("héllo"), "HLLO");
        assert_eq!(enum_member_name("!!"), "VALUE");
    }

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("it's"), "it\\'s");
    }

    #[test]
    fn test_synthesize_operation_id() {
        assert_eq!(synthesize_operation_id("GET", "/pets"), "getPets");
        assert_eq!(
            synthesize_operation_id("DELETE", "/pets/{petId}/vet-visits"),
            "deletePetsPetIdVetVisits"
        );
    }

    #[test]
    fn test_api_name() {
        let n = Normalizer::default();
        assert_eq!(n.api_name("pet-store"), "PetStoreApi");
        assert_eq!(n.api_name("default"), "DefaultApi");
    }
}
