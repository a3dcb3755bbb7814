use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::transform::CompileOptions;

/// Top-level project configuration loaded from `.opcomp.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpcompConfig {
    pub input: String,
    pub naming: NamingConfig,
    pub models: ModelsConfig,
    pub auth: AuthConfig,
    pub output: OutputConfig,
}

impl Default for OpcompConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            naming: NamingConfig::default(),
            models: ModelsConfig::default(),
            auth: AuthConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Method naming.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Map from sanitized operationId to custom method name.
    pub aliases: IndexMap<String, String>,
    /// Derive a route-based name for operations without an operationId
    /// instead of skipping them.
    pub derive_missing_operation_ids: bool,
}

/// Which models resolver the CLI injects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverKind {
    /// References are never resolved; bodies fall back to generic shapes.
    #[default]
    None,
    /// References resolve against the document's own schemas.
    Components,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub resolver: ResolverKind,
    /// Directory model imports are relative to.
    pub import_dir: PathBuf,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverKind::None,
            import_dir: PathBuf::from("models"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Send a configured bearer token / API key header on operations that
    /// declare no security of their own.
    pub legacy_fallback: bool,
    pub api_key_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            legacy_fallback: true,
            api_key_header: "X-API-Key".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

impl From<&OpcompConfig> for CompileOptions {
    fn from(config: &OpcompConfig) -> Self {
        Self {
            aliases: config.naming.aliases.clone(),
            derive_missing_operation_ids: config.naming.derive_missing_operation_ids,
            legacy_fallback: config.auth.legacy_fallback,
            api_key_header: config.auth.api_key_header.clone(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".opcomp.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OpcompConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# opcomp configuration
input: openapi.yaml

naming:
  derive_missing_operation_ids: false   # true: name id-less operations after their route
  aliases: {}
    # get_user: fetchUser               # sanitized operationId → method name

models:
  resolver: none          # none | components
  import_dir: models

auth:
  legacy_fallback: true   # bearer / API key fallback for operations without `security`
  api_key_header: X-API-Key

output:
  format: json            # json | yaml
"#
}
