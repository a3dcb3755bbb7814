use serde::{Deserialize, Serialize};

use super::schema::{Schema, SchemaOrRef, SchemaType, TypeSet};

/// Parameter location as written in the document.
///
/// Swagger 2 `body`/`formData` and anything else unrecognised land in
/// `Unsupported` rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
    Unsupported(String),
}

impl From<String> for ParameterLocation {
    fn from(value: String) -> Self {
        match value.as_str() {
            "query" => ParameterLocation::Query,
            "header" => ParameterLocation::Header,
            "path" => ParameterLocation::Path,
            "cookie" => ParameterLocation::Cookie,
            _ => ParameterLocation::Unsupported(value),
        }
    }
}

impl ParameterLocation {
    /// A Swagger 2 `in: body` parameter, which carries the request body.
    pub fn is_body(&self) -> bool {
        matches!(self, ParameterLocation::Unsupported(other) if other == "body")
    }
}

impl From<ParameterLocation> for String {
    fn from(value: ParameterLocation) -> Self {
        match value {
            ParameterLocation::Query => "query".to_string(),
            ParameterLocation::Header => "header".to_string(),
            ParameterLocation::Path => "path".to_string(),
            ParameterLocation::Cookie => "cookie".to_string(),
            ParameterLocation::Unsupported(other) => other,
        }
    }
}

/// An API parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Kept optional so an explicit `required: false` on a path parameter
    /// can be told apart from an omitted flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,

    // Swagger 2 inline typing
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub legacy_type: Option<SchemaType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaOrRef>>,

    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
}

impl Parameter {
    /// The schema describing this parameter's value.
    ///
    /// OpenAPI 3 documents carry a `schema`; Swagger 2 documents describe the
    /// type inline, which is lifted into an equivalent schema here.
    pub fn effective_schema(&self) -> Option<SchemaOrRef> {
        if let Some(ref schema) = self.schema {
            return Some(schema.clone());
        }
        let legacy_type = self.legacy_type.clone()?;
        Some(SchemaOrRef::Schema(Box::new(Schema {
            schema_type: Some(TypeSet::Single(legacy_type)),
            format: self.format.clone(),
            items: self.items.clone(),
            ..Schema::default()
        })))
    }
}

/// A reference or inline parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Parameter(Parameter),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_location_is_kept() {
        let p: Parameter = serde_yaml_ng::from_str("name: payload\nin: body\n").unwrap();
        assert_eq!(
            p.location,
            ParameterLocation::Unsupported("body".to_string())
        );
    }

    #[test]
    fn test_swagger2_inline_type() {
        let yaml = r#"
name: tags
in: query
type: array
items:
  type: string
collectionFormat: pipes
"#;
        let p: Parameter = serde_yaml_ng::from_str(yaml).unwrap();
        let schema = p.effective_schema().unwrap();
        let schema = schema.as_schema().unwrap();
        assert_eq!(
            schema.schema_type,
            Some(TypeSet::Single(SchemaType::Array))
        );
        assert!(schema.items.is_some());
        assert_eq!(p.collection_format.as_deref(), Some("pipes"));
    }

    #[test]
    fn test_required_flag_tristate() {
        let p: Parameter = serde_yaml_ng::from_str("name: id\nin: path\n").unwrap();
        assert_eq!(p.required, None);
        let p: Parameter =
            serde_yaml_ng::from_str("name: id\nin: path\nrequired: false\n").unwrap();
        assert_eq!(p.required, Some(false));
    }
}
