use serde::Serialize;

use super::types::VendorExtensions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyIn {
    Query,
    Header,
    Cookie,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scheme", rename_all = "camelCase")]
pub enum HttpAuth {
    Basic,
    Bearer {
        #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
    },
    /// Any other registered HTTP auth scheme, lowercased.
    Other { name: String },
}

/// The OAuth2 flow projected onto the IR. Only one flow is kept per scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OAuthFlowKind {
    AuthorizationCode,
    Implicit,
    Password,
    ClientCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrScope {
    pub scope: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SecurityKind {
    ApiKey {
        #[serde(rename = "keyParamName")]
        param_name: String,
        location: ApiKeyIn,
    },
    Http {
        scheme: HttpAuth,
    },
    #[serde(rename = "oauth2", rename_all = "camelCase")]
    OAuth2 {
        flow: Option<OAuthFlowKind>,
        authorization_url: Option<String>,
        token_url: Option<String>,
        refresh_url: Option<String>,
        scopes: Vec<IrScope>,
    },
    #[serde(rename_all = "camelCase")]
    OpenIdConnect {
        open_id_connect_url: Option<String>,
    },
    #[serde(rename = "mutualTLS")]
    MutualTls,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrSecurityScheme {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: SecurityKind,
    #[serde(skip_serializing_if = "VendorExtensions::is_empty")]
    pub vendor_extensions: VendorExtensions,
}
