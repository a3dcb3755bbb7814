use serde::Serialize;

pub use crate::parse::security::ApiKeyLocation;

/// The `scheme` of an `http` security scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpAuthScheme {
    Basic,
    Bearer,
    Digest,
    Other(String),
}

impl HttpAuthScheme {
    /// Scheme names are case-insensitive (RFC 7235).
    pub fn parse(scheme: &str) -> Self {
        match scheme.to_ascii_lowercase().as_str() {
            "basic" => HttpAuthScheme::Basic,
            "bearer" => HttpAuthScheme::Bearer,
            "digest" => HttpAuthScheme::Digest,
            other => HttpAuthScheme::Other(other.to_string()),
        }
    }
}

/// One OAuth2 flow, normalized across OpenAPI 3 and Swagger 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OAuthFlowInfo {
    /// `implicit`, `password`, `clientCredentials` or `authorizationCode`.
    pub flow: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SecuritySchemeKind {
    ApiKey {
        location: ApiKeyLocation,
        param_name: String,
    },
    Http {
        scheme: HttpAuthScheme,
        #[serde(skip_serializing_if = "Option::is_none")]
        bearer_format: Option<String>,
    },
    OAuth2 {
        flows: Vec<OAuthFlowInfo>,
    },
    OpenIdConnect {
        url: String,
    },
}

/// A named security scheme from the document's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityScheme {
    pub name: String,
    pub kind: SecuritySchemeKind,
}

/// A single step the generated client performs to authenticate a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthInstruction {
    /// Set `header_name` from the configured key, when one is configured.
    HeaderApiKey { scheme: String, header_name: String },
    /// Add `param_name` to the query parameters.
    QueryApiKey { scheme: String, param_name: String },
    /// Append `cookie_name=<key>` to the Cookie header join.
    CookieApiKey { scheme: String, cookie_name: String },
    /// `Authorization: Basic base64(user:pass)`.
    Basic { scheme: String },
    /// `Authorization: <prefix> <token>`.
    Bearer { scheme: String, prefix: String },
    /// Recognized, not implemented: emits nothing at runtime.
    Digest { scheme: String },
    /// OAuth2 / OpenID Connect access token sent as `Bearer <token>`.
    /// Scopes are informational only.
    AccessToken { scheme: String, scopes: Vec<String> },
    /// No scheme applied: use a generically configured bearer token and/or
    /// header API key when present.
    LegacyFallback {
        bearer: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        api_key_header: Option<String>,
    },
}

/// Authentication plan for one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityPlan {
    pub instructions: Vec<AuthInstruction>,
    /// Names of schemes in the chosen alternative that had no catalog entry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_schemes: Vec<String>,
    /// OR-alternatives after the first one, which are never explored.
    pub ignored_alternatives: usize,
}

impl SecurityPlan {
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn uses_fallback(&self) -> bool {
        self.instructions
            .iter()
            .any(|i| matches!(i, AuthInstruction::LegacyFallback { .. }))
    }
}
