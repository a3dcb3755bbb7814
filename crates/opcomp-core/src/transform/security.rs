use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use indexmap::IndexMap;

use crate::ir::{
    ApiKeyLocation, AuthInstruction, HttpAuthScheme, OAuthFlowInfo, ParameterLocation,
    ParameterSet, SecurityPlan, SecurityScheme, SecuritySchemeKind, ValidationIssue,
};
use crate::parse::security::{self as raw, SecurityRequirement, SecuritySchemeType};
use crate::parse::spec::OpenApiSpec;

use super::json_pointer;

/// Named security schemes, normalized across OpenAPI 3 and Swagger 2.
#[derive(Debug, Clone, Default)]
pub struct SecurityCatalog {
    schemes: IndexMap<String, SecurityScheme>,
    /// Schemes that were declared but could not be used.
    pub issues: Vec<ValidationIssue>,
}

impl SecurityCatalog {
    pub fn from_spec(spec: &OpenApiSpec) -> Self {
        let (declared, section) = match spec.components {
            Some(ref components) if !spec.is_swagger2() => (
                &components.security_schemes,
                vec!["components", "securitySchemes"],
            ),
            _ => (&spec.security_definitions, vec!["securityDefinitions"]),
        };

        let mut catalog = SecurityCatalog::default();
        for (name, scheme) in declared {
            match normalize_scheme(name, scheme) {
                Ok(normalized) => {
                    catalog.schemes.insert(name.clone(), normalized);
                }
                Err(message) => {
                    let mut pointer = section.clone();
                    pointer.push(name.as_str());
                    catalog.issues.push(ValidationIssue::warning(
                        format!("security scheme `{name}` ignored: {message}"),
                        json_pointer(&pointer),
                    ));
                }
            }
        }
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&SecurityScheme> {
        self.schemes.get(name)
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

/// Normalize one declared scheme. The error is a human-readable reason.
pub fn normalize_scheme(name: &str, scheme: &raw::SecurityScheme) -> Result<SecurityScheme, String> {
    let kind = match &scheme.scheme_type {
        SecuritySchemeType::ApiKey => {
            let location = scheme.location.ok_or("apiKey scheme has no `in`")?;
            let param_name = scheme.name.clone().ok_or("apiKey scheme has no `name`")?;
            SecuritySchemeKind::ApiKey {
                location,
                param_name,
            }
        }
        SecuritySchemeType::Http => {
            let http_scheme = scheme.scheme.as_deref().ok_or("http scheme has no `scheme`")?;
            SecuritySchemeKind::Http {
                scheme: HttpAuthScheme::parse(http_scheme),
                bearer_format: scheme.bearer_format.clone(),
            }
        }
        SecuritySchemeType::Basic => SecuritySchemeKind::Http {
            scheme: HttpAuthScheme::Basic,
            bearer_format: None,
        },
        SecuritySchemeType::OAuth2 => SecuritySchemeKind::OAuth2 {
            flows: oauth_flows(scheme),
        },
        SecuritySchemeType::OpenIdConnect => SecuritySchemeKind::OpenIdConnect {
            url: scheme
                .open_id_connect_url
                .clone()
                .ok_or("openIdConnect scheme has no `openIdConnectUrl`")?,
        },
        SecuritySchemeType::MutualTls => return Err("mutualTLS is not supported".to_string()),
        SecuritySchemeType::Unknown(other) => {
            return Err(format!("unknown scheme type `{other}`"));
        }
    };
    Ok(SecurityScheme {
        name: name.to_string(),
        kind,
    })
}

fn oauth_flows(scheme: &raw::SecurityScheme) -> Vec<OAuthFlowInfo> {
    let info = |flow: &str, f: &raw::OAuthFlow| OAuthFlowInfo {
        flow: flow.to_string(),
        authorization_url: f.authorization_url.clone(),
        token_url: f.token_url.clone(),
        scopes: f.scopes.keys().cloned().collect(),
    };

    if let Some(ref flows) = scheme.flows {
        return [
            ("implicit", &flows.implicit),
            ("password", &flows.password),
            ("clientCredentials", &flows.client_credentials),
            ("authorizationCode", &flows.authorization_code),
        ]
        .into_iter()
        .filter_map(|(name, flow)| flow.as_ref().map(|f| info(name, f)))
        .collect();
    }

    // Swagger 2 declares a single flow inline
    let Some(ref flow) = scheme.flow else {
        return Vec::new();
    };
    let flow = match flow.as_str() {
        "application" => "clientCredentials",
        "accessCode" => "authorizationCode",
        other => other,
    };
    vec![OAuthFlowInfo {
        flow: flow.to_string(),
        authorization_url: scheme.authorization_url.clone(),
        token_url: scheme.token_url.clone(),
        scopes: scheme.scopes.keys().cloned().collect(),
    }]
}

/// An operation's own `security`, even when empty, replaces the document's.
pub fn effective_requirements<'a>(
    global: Option<&'a [SecurityRequirement]>,
    operation: Option<&'a [SecurityRequirement]>,
) -> &'a [SecurityRequirement] {
    operation.or(global).unwrap_or_default()
}

/// Turn the first requirement alternative into authentication instructions.
///
/// `fallback_api_key_header` enables the legacy fallback: when no declared
/// scheme applies, a configured bearer token and the named API key header
/// are still sent. A matched scheme that emits nothing (a query key already
/// declared as a parameter) still counts as applied.
pub fn resolve_security(
    requirements: &[SecurityRequirement],
    catalog: &SecurityCatalog,
    parameters: &ParameterSet,
    fallback_api_key_header: Option<&str>,
) -> SecurityPlan {
    let mut plan = SecurityPlan {
        ignored_alternatives: requirements.len().saturating_sub(1),
        ..SecurityPlan::default()
    };

    let mut applied = false;
    if let Some(requirement) = requirements.first() {
        for (name, scopes) in requirement {
            let Some(scheme) = catalog.get(name) else {
                plan.unknown_schemes.push(name.clone());
                continue;
            };
            applied = true;
            if let Some(instruction) = instruction_for(scheme, scopes, parameters) {
                plan.instructions.push(instruction);
            }
        }
    }

    if !applied {
        if let Some(header) = fallback_api_key_header {
            plan.instructions.push(AuthInstruction::LegacyFallback {
                bearer: true,
                api_key_header: Some(header.to_string()),
            });
        }
    }
    plan
}

fn instruction_for(
    scheme: &SecurityScheme,
    scopes: &[String],
    parameters: &ParameterSet,
) -> Option<AuthInstruction> {
    let name = scheme.name.clone();
    let instruction = match &scheme.kind {
        SecuritySchemeKind::ApiKey {
            location: ApiKeyLocation::Header,
            param_name,
        } => AuthInstruction::HeaderApiKey {
            scheme: name,
            header_name: param_name.clone(),
        },
        SecuritySchemeKind::ApiKey {
            location: ApiKeyLocation::Query,
            param_name,
        } => {
            if parameters.find(param_name, ParameterLocation::Query).is_some() {
                log::debug!("query key `{param_name}` is already a declared parameter");
                return None;
            }
            AuthInstruction::QueryApiKey {
                scheme: name,
                param_name: param_name.clone(),
            }
        }
        SecuritySchemeKind::ApiKey {
            location: ApiKeyLocation::Cookie,
            param_name,
        } => AuthInstruction::CookieApiKey {
            scheme: name,
            cookie_name: param_name.clone(),
        },
        SecuritySchemeKind::Http {
            scheme: http,
            bearer_format,
        } => match http {
            HttpAuthScheme::Basic => AuthInstruction::Basic { scheme: name },
            HttpAuthScheme::Bearer => AuthInstruction::Bearer {
                scheme: name,
                prefix: bearer_format.clone().unwrap_or_else(|| "Bearer".to_string()),
            },
            HttpAuthScheme::Digest => AuthInstruction::Digest { scheme: name },
            HttpAuthScheme::Other(other) => {
                log::debug!("http scheme `{other}` has no instruction");
                return None;
            }
        },
        SecuritySchemeKind::OAuth2 { .. } | SecuritySchemeKind::OpenIdConnect { .. } => {
            AuthInstruction::AccessToken {
                scheme: name,
                scopes: scopes.to_vec(),
            }
        }
    };
    Some(instruction)
}

/// `Authorization` value for HTTP basic auth.
pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

/// `Authorization` value for a bearer or access token.
pub fn bearer_authorization(prefix: &str, token: &str) -> String {
    format!("{prefix} {token}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::parse::parameter::ParameterOrRef;
    use crate::transform::params::{build_parameter_set, merge_parameters};

    const SPEC: &str = r#"
openapi: 3.0.3
info: {title: Test, version: "1"}
paths: {}
security:
  - bearer: []
components:
  securitySchemes:
    bearer: {type: http, scheme: Bearer, bearerFormat: JWT}
    basic: {type: http, scheme: basic}
    digest: {type: http, scheme: digest}
    headerKey: {type: apiKey, in: header, name: X-API-Key}
    queryKey: {type: apiKey, in: query, name: api_key}
    cookieKey: {type: apiKey, in: cookie, name: session}
    oauth:
      type: oauth2
      flows:
        clientCredentials:
          tokenUrl: https://example.com/token
          scopes: {read: Read access, write: Write access}
    oidc: {type: openIdConnect, openIdConnectUrl: https://example.com/.well-known}
    mtls: {type: mutualTLS}
    broken: {type: apiKey, in: header}
"#;

    fn catalog() -> SecurityCatalog {
        SecurityCatalog::from_spec(&parse::from_yaml(SPEC).unwrap())
    }

    fn requirements(yaml: &str) -> Vec<SecurityRequirement> {
        serde_yaml_ng::from_str(yaml).unwrap()
    }

    #[test]
    fn test_catalog_normalizes_schemes() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 8);
        assert_eq!(
            catalog.get("bearer").unwrap().kind,
            SecuritySchemeKind::Http {
                scheme: HttpAuthScheme::Bearer,
                bearer_format: Some("JWT".to_string()),
            }
        );
        let SecuritySchemeKind::OAuth2 { flows } = &catalog.get("oauth").unwrap().kind else {
            panic!("expected oauth2");
        };
        assert_eq!(flows[0].flow, "clientCredentials");
        assert_eq!(flows[0].scopes, vec!["read", "write"]);

        let paths: Vec<&str> = catalog.issues.iter().map(|i| i.spec_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "#/components/securitySchemes/mtls",
                "#/components/securitySchemes/broken"
            ]
        );
    }

    #[test]
    fn test_swagger2_definitions() {
        let spec = parse::from_yaml(
            r#"
swagger: "2.0"
info: {title: t, version: "1"}
paths: {}
securityDefinitions:
  basicAuth: {type: basic}
  petstore_auth:
    type: oauth2
    flow: accessCode
    authorizationUrl: https://example.com/auth
    tokenUrl: https://example.com/token
    scopes: {"write:pets": modify pets}
"#,
        )
        .unwrap();
        let catalog = SecurityCatalog::from_spec(&spec);
        assert_eq!(
            catalog.get("basicAuth").unwrap().kind,
            SecuritySchemeKind::Http {
                scheme: HttpAuthScheme::Basic,
                bearer_format: None,
            }
        );
        let SecuritySchemeKind::OAuth2 { flows } = &catalog.get("petstore_auth").unwrap().kind
        else {
            panic!("expected oauth2");
        };
        assert_eq!(flows[0].flow, "authorizationCode");
        assert_eq!(flows[0].scopes, vec!["write:pets"]);
    }

    #[test]
    fn test_operation_security_replaces_global() {
        let global = requirements("[{bearer: []}]");
        let empty: Vec<SecurityRequirement> = Vec::new();
        let own = requirements("[{basic: []}]");

        assert_eq!(
            effective_requirements(Some(global.as_slice()), None),
            global.as_slice()
        );
        assert!(effective_requirements(Some(global.as_slice()), Some(empty.as_slice())).is_empty());
        assert_eq!(
            effective_requirements(Some(global.as_slice()), Some(own.as_slice())),
            own.as_slice()
        );
        assert!(effective_requirements(None, None).is_empty());
    }

    #[test]
    fn test_first_alternative_only() {
        let reqs = requirements("[{headerKey: [], cookieKey: []}, {basic: []}]");
        let plan = resolve_security(&reqs, &catalog(), &ParameterSet::default(), None);
        assert_eq!(
            plan.instructions,
            vec![
                AuthInstruction::HeaderApiKey {
                    scheme: "headerKey".to_string(),
                    header_name: "X-API-Key".to_string(),
                },
                AuthInstruction::CookieApiKey {
                    scheme: "cookieKey".to_string(),
                    cookie_name: "session".to_string(),
                },
            ]
        );
        assert_eq!(plan.ignored_alternatives, 1);
    }

    #[test]
    fn test_http_and_token_schemes() {
        let reqs = requirements("[{bearer: [], basic: [], digest: [], oauth: [read], oidc: []}]");
        let plan = resolve_security(&reqs, &catalog(), &ParameterSet::default(), None);
        assert_eq!(
            plan.instructions,
            vec![
                AuthInstruction::Bearer {
                    scheme: "bearer".to_string(),
                    prefix: "JWT".to_string(),
                },
                AuthInstruction::Basic {
                    scheme: "basic".to_string()
                },
                AuthInstruction::Digest {
                    scheme: "digest".to_string()
                },
                AuthInstruction::AccessToken {
                    scheme: "oauth".to_string(),
                    scopes: vec!["read".to_string()],
                },
                AuthInstruction::AccessToken {
                    scheme: "oidc".to_string(),
                    scopes: Vec::new(),
                },
            ]
        );
    }

    #[test]
    fn test_query_key_not_emitted_twice() {
        let reqs = requirements("[{queryKey: []}]");
        let plan = resolve_security(&reqs, &catalog(), &ParameterSet::default(), None);
        assert_eq!(plan.instructions.len(), 1);

        let plan = resolve_security(&reqs, &catalog(), &api_key_query_param(), None);
        assert!(plan.instructions.is_empty());
    }

    fn api_key_query_param() -> ParameterSet {
        let params: Vec<ParameterOrRef> =
            serde_yaml_ng::from_str("[{name: api_key, in: query, schema: {type: string}}]")
                .unwrap();
        let merged = merge_parameters(&[], &params).unwrap();
        build_parameter_set(&merged).unwrap()
    }

    #[test]
    fn test_declared_query_key_suppresses_fallback() {
        let reqs = requirements("[{queryKey: []}]");
        let plan = resolve_security(&reqs, &catalog(), &api_key_query_param(), Some("X-API-Key"));
        assert!(plan.is_empty());
        assert!(!plan.uses_fallback());
        assert!(plan.unknown_schemes.is_empty());
    }

    #[test]
    fn test_unknown_schemes_and_fallback() {
        let reqs = requirements("[{nope: []}]");
        let plan = resolve_security(&reqs, &catalog(), &ParameterSet::default(), Some("X-Key"));
        assert_eq!(plan.unknown_schemes, vec!["nope"]);
        assert!(plan.uses_fallback());

        let plan = resolve_security(&[], &catalog(), &ParameterSet::default(), None);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_authorization_values() {
        insta::assert_snapshot!(
            basic_authorization("Aladdin", "open sesame"),
            @"Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
        assert_eq!(bearer_authorization("Bearer", "abc"), "Bearer abc");
    }
}
