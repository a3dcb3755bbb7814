use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A security scheme type.
///
/// `Basic` only appears in Swagger 2 `securityDefinitions`; OpenAPI 3 spells
/// it as `http` with `scheme: basic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
    Basic,
    OAuth2,
    OpenIdConnect,
    MutualTls,
    Unknown(String),
}

impl From<String> for SecuritySchemeType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "apiKey" => SecuritySchemeType::ApiKey,
            "http" => SecuritySchemeType::Http,
            "basic" => SecuritySchemeType::Basic,
            "oauth2" => SecuritySchemeType::OAuth2,
            "openIdConnect" => SecuritySchemeType::OpenIdConnect,
            "mutualTLS" => SecuritySchemeType::MutualTls,
            _ => SecuritySchemeType::Unknown(value),
        }
    }
}

impl From<SecuritySchemeType> for String {
    fn from(value: SecuritySchemeType) -> Self {
        match value {
            SecuritySchemeType::ApiKey => "apiKey".to_string(),
            SecuritySchemeType::Http => "http".to_string(),
            SecuritySchemeType::Basic => "basic".to_string(),
            SecuritySchemeType::OAuth2 => "oauth2".to_string(),
            SecuritySchemeType::OpenIdConnect => "openIdConnect".to_string(),
            SecuritySchemeType::MutualTls => "mutualTLS".to_string(),
            SecuritySchemeType::Unknown(other) => other,
        }
    }
}

/// Location of an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Query,
    Header,
    Cookie,
}

/// OAuth2 flows configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OAuthFlows {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(rename = "clientCredentials", skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(rename = "authorizationCode", skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
}

/// A single OAuth2 flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OAuthFlow {
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(rename = "refreshUrl", skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: IndexMap<String, String>,
}

/// A security scheme definition, shared by OpenAPI 3 `securitySchemes` and
/// Swagger 2 `securityDefinitions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiKeyLocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,

    #[serde(rename = "openIdConnectUrl", skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,

    // Swagger 2 single-flow oauth2 fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(rename = "authorizationUrl", skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenUrl", skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scopes: IndexMap<String, String>,
}

/// A security requirement: map of scheme name → required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;
