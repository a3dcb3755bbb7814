pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod ref_resolve;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod security;
pub mod spec;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// Parse an OpenAPI or Swagger document from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_yaml_ng::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

/// Parse an OpenAPI or Swagger document from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let spec: OpenApiSpec = serde_json::from_str(input)?;
    validate_version(&spec)?;
    Ok(spec)
}

fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    match (spec.openapi.as_deref(), spec.swagger.as_deref()) {
        (Some(v), _) if v.starts_with("3.") => Ok(()),
        (Some(v), _) => Err(ParseError::UnsupportedVersion(v.to_string())),
        (None, Some("2.0")) => Ok(()),
        (None, Some(v)) => Err(ParseError::UnsupportedVersion(v.to_string())),
        (None, None) => Err(ParseError::MissingField("openapi".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_swagger2() {
        let spec = from_yaml("swagger: '2.0'\ninfo: {title: t, version: '1'}\npaths: {}\n").unwrap();
        assert!(spec.is_swagger2());
        assert_eq!(spec.version(), "2.0");
    }

    #[test]
    fn test_rejects_unknown_versions() {
        assert!(matches!(
            from_yaml("openapi: 2.5.0\npaths: {}\n"),
            Err(ParseError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            from_yaml("paths: {}\n"),
            Err(ParseError::MissingField(_))
        ));
    }

    #[test]
    fn test_json_input() {
        let spec = from_json(r#"{"openapi": "3.0.3", "info": {"title": "t", "version": "1"}}"#)
            .unwrap();
        assert!(spec.paths.is_none());
    }
}
