use std::collections::BTreeSet;

use serde::Serialize;

use super::property::IrProperty;
use super::types::VendorExtensions;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

/// Parameter location. `Body` is the synthesized request-body parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
    Body,
}

/// A resolved parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrParameter {
    pub base_name: String,
    /// Target identifier; also the deduplication key within an operation.
    pub param_name: String,
    pub name_in_camel_case: String,
    pub name_in_pascal_case: String,
    pub name_in_snake_case: String,
    pub name_in_lower_case: String,
    pub location: ParamLocation,
    pub required: bool,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub explode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Request content type, set for the body parameter only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub schema: IrProperty,
    #[serde(skip_serializing_if = "VendorExtensions::is_empty")]
    pub vendor_extensions: VendorExtensions,
}

impl IrParameter {
    pub fn is_body_param(&self) -> bool {
        self.location == ParamLocation::Body
    }

    pub fn data_type(&self) -> &str {
        &self.schema.data_type
    }
}

/// Status class of a response code, by its leading character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusClass {
    #[serde(rename = "1xx")]
    Informational,
    #[serde(rename = "2xx")]
    Success,
    #[serde(rename = "3xx")]
    Redirection,
    #[serde(rename = "4xx")]
    ClientError,
    #[serde(rename = "5xx")]
    ServerError,
    #[serde(rename = "default")]
    Default,
}

impl StatusClass {
    /// `default` and unrecognised prefixes both classify as `Default`.
    pub fn from_code(code: &str) -> Self {
        match code.as_bytes().first() {
            _ if code == "default" => StatusClass::Default,
            Some(b'1') => StatusClass::Informational,
            Some(b'2') => StatusClass::Success,
            Some(b'3') => StatusClass::Redirection,
            Some(b'4') => StatusClass::ClientError,
            Some(b'5') => StatusClass::ServerError,
            _ => StatusClass::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrResponseHeader {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    pub schema: IrProperty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrResponse {
    pub code: String,
    pub status_class: StatusClass,
    pub description: String,
    /// Body schema of the first declared content type that has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<IrProperty>,
    pub content_types: Vec<String>,
    pub headers: Vec<IrResponseHeader>,
    #[serde(skip_serializing_if = "VendorExtensions::is_empty")]
    pub vendor_extensions: VendorExtensions,
}

/// One (scheme, requirement) binding on an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrSecurityRequirement {
    pub name: String,
    pub scopes: Vec<String>,
}

/// A fully resolved API operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrOperation {
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id_original: Option<String>,
    pub operation_id_camel_case: String,
    pub operation_id_snake_case: String,
    pub operation_id_lower_case: String,
    pub nickname: String,

    pub path: String,
    pub http_method: HttpMethod,
    pub tag: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub deprecated: bool,

    pub all_params: Vec<IrParameter>,
    pub path_params: Vec<IrParameter>,
    pub query_params: Vec<IrParameter>,
    pub header_params: Vec<IrParameter>,
    pub cookie_params: Vec<IrParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_param: Option<IrParameter>,
    pub required_params: Vec<IrParameter>,
    pub optional_params: Vec<IrParameter>,

    pub responses: Vec<IrResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_property: Option<IrProperty>,

    pub auth_methods: Vec<IrSecurityRequirement>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    pub is_multipart: bool,

    pub imports: BTreeSet<String>,
    #[serde(skip_serializing_if = "VendorExtensions::is_empty")]
    pub vendor_extensions: VendorExtensions,
}

impl IrOperation {
    pub fn return_type(&self) -> Option<&str> {
        self.return_property.as_ref().map(|p| p.data_type.as_str())
    }

    pub fn return_base_type(&self) -> Option<&str> {
        self.return_property.as_ref().map(|p| p.base_type.as_str())
    }
}
