use std::path::PathBuf;

use thiserror::Error;

use crate::ir::ParameterLocation;
use crate::parse::operation::HttpMethod;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid reference format: {0}")]
    InvalidRefFormat(String),

    #[error("reference target not found: {0}")]
    RefTargetNotFound(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
}

/// Errors that abort a whole compilation run.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("document has no `paths` object")]
    MissingPaths,
}

/// Why a single operation produced no method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("operation has no operationId")]
    MissingOperationId,

    #[error("operationId `{0}` does not sanitize to a valid identifier")]
    InvalidOperationId(String),

    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),

    #[error("path parameter `{0}` has no schema")]
    PathParameterWithoutSchema(String),

    #[error("path parameter `{0}` is declared as not required")]
    PathParameterNotRequired(String),

    #[error("path parameter `{0}` does not resolve to a supported type")]
    UnresolvedPathParameterType(String),

    #[error("{location} parameter `{name}` does not resolve to a supported type")]
    UnresolvedParameterType {
        name: String,
        location: ParameterLocation,
    },

    #[error("path placeholder `{{{0}}}` has no matching path parameter")]
    UndeclaredPathPlaceholder(String),

    #[error("path parameter `{0}` has no matching placeholder in the path")]
    UnusedPathParameter(String),

    #[error("path placeholder `{{{0}}}` appears more than once")]
    DuplicatePathPlaceholder(String),

    #[error("{0} declares a request body without any content")]
    MissingRequestBody(HttpMethod),

    #[error("{0} operations may not declare a request body")]
    RequestBodyNotAllowed(HttpMethod),
}
