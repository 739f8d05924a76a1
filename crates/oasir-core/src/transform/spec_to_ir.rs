use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::config::{NamingConfig, OasirConfig};
use crate::error::TransformError;
use crate::ir::grouping::group_by_tag;
use crate::ir::*;
use crate::parse::ref_resolve::RefResolver;
use crate::parse::security::{ApiKeyLocation, OAuthFlow, SecurityScheme, SecuritySchemeType};
use crate::parse::spec::OpenApiSpec;
use crate::validate::{ValidationPolicy, enforce, validate};

use super::conflicts::resolve_operation_id_collisions;
use super::model_resolver::ModelResolver;
use super::name_normalizer::Normalizer;
use super::operation_resolver::OperationResolver;
use super::property_resolver::{PropertyResolver, vendor_extensions};
use super::type_mapper::{TypeMapper, TypeOverride};

/// Options controlling naming, type mapping and validation for one pass.
#[derive(Clone, Default)]
pub struct TransformOptions {
    pub naming: NamingConfig,
    /// Extra type table entries, keyed `type`, `format` or `type:format`.
    pub type_mappings: IndexMap<String, String>,
    /// Consulted before the type table.
    pub type_override: Option<TypeOverride>,
    /// Resolved operationId → alias.
    pub aliases: IndexMap<String, String>,
    pub validation: ValidationPolicy,
    /// Set when the caller has already validated and reported the document.
    pub skip_validation: bool,
}

impl fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformOptions")
            .field("naming", &self.naming)
            .field("type_mappings", &self.type_mappings)
            .field("type_override", &self.type_override.as_ref().map(|_| "<fn>"))
            .field("aliases", &self.aliases)
            .field("validation", &self.validation)
            .field("skip_validation", &self.skip_validation)
            .finish()
    }
}

impl From<&OasirConfig> for TransformOptions {
    fn from(config: &OasirConfig) -> Self {
        Self {
            naming: config.naming.clone(),
            type_mappings: config.type_mappings.clone(),
            type_override: None,
            aliases: config.aliases.clone(),
            validation: config.validation,
            skip_validation: false,
        }
    }
}

/// Transform a parsed OpenAPI spec into the fully resolved IR.
pub fn transform(spec: &OpenApiSpec) -> Result<IrSpec, TransformError> {
    transform_with_options(spec, &TransformOptions::default())
}

/// Transform with explicit options.
pub fn transform_with_options(
    spec: &OpenApiSpec,
    options: &TransformOptions,
) -> Result<IrSpec, TransformError> {
    // Phase 1: Validate and apply the policy
    if !options.skip_validation {
        enforce(options.validation, validate(spec))?;
    }

    let naming = Normalizer::new(&options.naming);
    let mut types = TypeMapper::default().with_mappings(&options.type_mappings);
    if let Some(type_override) = &options.type_override {
        types = types.with_override(type_override.clone());
    }
    let refs = RefResolver::new(spec);
    let properties = PropertyResolver::new(&naming, &types);

    // Phase 2: Component schemas to models
    let models = ModelResolver::new(properties, refs).resolve_all(spec);
    debug!("resolved {} models", models.len());

    // Phase 3: Operations, deduplicated parameters included
    let operations = OperationResolver::new(properties, refs, &options.aliases).resolve_all(spec);
    debug!("resolved {} operations", operations.len());

    // Phase 4: Group by tag and make ids unique within each group
    let mut operation_groups = group_by_tag(operations, &naming);
    for group in &mut operation_groups {
        resolve_operation_id_collisions(&mut group.operations);
    }

    // Phase 5: Info, servers and security schemes
    let info = IrInfo {
        title: spec.info.title.clone(),
        description: spec.info.description.clone(),
        version: spec.info.version.clone(),
        license_name: spec.info.license.as_ref().map(|l| l.name.clone()),
        license_url: spec.info.license.as_ref().and_then(|l| l.url.clone()),
        contact_email: spec.info.contact.as_ref().and_then(|c| c.email.clone()),
    };

    let servers = spec
        .servers
        .iter()
        .map(|s| IrServer {
            url: s.url.clone(),
            description: s.description.clone(),
        })
        .collect();

    let mut schemes: Vec<(&String, &SecurityScheme)> = spec
        .components
        .iter()
        .flat_map(|c| c.security_schemes.iter())
        .collect();
    schemes.sort_by(|a, b| a.0.cmp(b.0));
    let security_schemes = schemes
        .into_iter()
        .map(|(name, scheme)| security_scheme(name, scheme))
        .collect();

    Ok(IrSpec {
        info,
        servers,
        models,
        operation_groups,
        security_schemes,
    })
}

fn security_scheme(name: &str, scheme: &SecurityScheme) -> IrSecurityScheme {
    let kind = match scheme.scheme_type {
        SecuritySchemeType::ApiKey => SecurityKind::ApiKey {
            param_name: scheme.name.clone().unwrap_or_default(),
            location: match scheme.location {
                Some(ApiKeyLocation::Query) => ApiKeyIn::Query,
                Some(ApiKeyLocation::Cookie) => ApiKeyIn::Cookie,
                Some(ApiKeyLocation::Header) | None => ApiKeyIn::Header,
            },
        },
        SecuritySchemeType::Http => {
            let auth = scheme.scheme.as_deref().unwrap_or_default().to_lowercase();
            SecurityKind::Http {
                scheme: match auth.as_str() {
                    "basic" => HttpAuth::Basic,
                    "bearer" => HttpAuth::Bearer {
                        bearer_format: scheme.bearer_format.clone(),
                    },
                    _ => HttpAuth::Other { name: auth },
                },
            }
        }
        SecuritySchemeType::OAuth2 => oauth2(scheme),
        SecuritySchemeType::OpenIdConnect => SecurityKind::OpenIdConnect {
            open_id_connect_url: scheme.open_id_connect_url.clone(),
        },
        SecuritySchemeType::MutualTls => SecurityKind::MutualTls,
    };

    IrSecurityScheme {
        name: name.to_string(),
        description: scheme.description.clone(),
        kind,
        vendor_extensions: vendor_extensions(&scheme.extensions),
    }
}

/// Project the first declared flow, in the order authorizationCode,
/// implicit, password, clientCredentials.
fn oauth2(scheme: &SecurityScheme) -> SecurityKind {
    let flows = scheme.flows.as_ref();
    let candidates: [(OAuthFlowKind, Option<&OAuthFlow>); 4] = [
        (
            OAuthFlowKind::AuthorizationCode,
            flows.and_then(|f| f.authorization_code.as_ref()),
        ),
        (OAuthFlowKind::Implicit, flows.and_then(|f| f.implicit.as_ref())),
        (OAuthFlowKind::Password, flows.and_then(|f| f.password.as_ref())),
        (
            OAuthFlowKind::ClientCredentials,
            flows.and_then(|f| f.client_credentials.as_ref()),
        ),
    ];

    let Some((kind, flow)) = candidates
        .into_iter()
        .find_map(|(kind, flow)| flow.map(|flow| (kind, flow)))
    else {
        return SecurityKind::OAuth2 {
            flow: None,
            authorization_url: None,
            token_url: None,
            refresh_url: None,
            scopes: Vec::new(),
        };
    };

    let mut scopes: Vec<IrScope> = flow
        .scopes
        .iter()
        .map(|(scope, description)| IrScope {
            scope: scope.clone(),
            description: description.clone(),
        })
        .collect();
    scopes.sort_by(|a, b| a.scope.cmp(&b.scope));

    SecurityKind::OAuth2 {
        flow: Some(kind),
        authorization_url: flow.authorization_url.clone(),
        token_url: flow.token_url.clone(),
        refresh_url: flow.refresh_url.clone(),
        scopes,
    }
}
