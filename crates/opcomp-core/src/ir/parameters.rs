use std::fmt;

use serde::Serialize;

use super::types::{NormalizedName, TypeDescriptor};
use crate::parse::schema::SchemaOrRef;

/// Where a parameter travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OpenAPI 3 `style` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    Simple,
    Form,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
    Label,
    Matrix,
}

impl ParameterStyle {
    pub fn parse(style: &str) -> Option<Self> {
        match style {
            "simple" => Some(ParameterStyle::Simple),
            "form" => Some(ParameterStyle::Form),
            "spaceDelimited" => Some(ParameterStyle::SpaceDelimited),
            "pipeDelimited" => Some(ParameterStyle::PipeDelimited),
            "deepObject" => Some(ParameterStyle::DeepObject),
            "label" => Some(ParameterStyle::Label),
            "matrix" => Some(ParameterStyle::Matrix),
            _ => None,
        }
    }

    /// Default style for a location: `form` for query and cookie, `simple`
    /// for path and header.
    pub fn default_for(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Query | ParameterLocation::Cookie => ParameterStyle::Form,
            ParameterLocation::Path | ParameterLocation::Header => ParameterStyle::Simple,
        }
    }

    /// `explode` defaults to true only for `form`.
    pub fn default_explode(self) -> bool {
        self == ParameterStyle::Form
    }
}

/// Identity of a parameter within one operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterKey {
    pub name: String,
    pub location: ParameterLocation,
}

/// Which slot of the request the encoded value is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationTarget {
    PathSegment,
    QueryString,
    Header,
    Cookie,
}

impl From<ParameterLocation> for LocationTarget {
    fn from(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Path => LocationTarget::PathSegment,
            ParameterLocation::Query => LocationTarget::QueryString,
            ParameterLocation::Header => LocationTarget::Header,
            ParameterLocation::Cookie => LocationTarget::Cookie,
        }
    }
}

/// How a value is flattened for its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum EncodingShape {
    /// The stringified value under the parameter's own key.
    Scalar,
    /// Array items joined with `separator` under the parameter's own key.
    Joined { separator: String },
    /// The parameter name repeated once per array item.
    RepeatedKey,
    /// One `name[property]` entry per object property.
    DeepObject,
    /// One entry per object property, keyed by the property name itself.
    FlattenedProperties,
    /// Object flattened to `key,value,key,value` under the parameter's key.
    KeyValueList { separator: String },
    /// Object flattened to `key=value` pairs joined with `separator`.
    KeyValuePairs { separator: String },
}

impl EncodingShape {
    /// Whether this shape yields more than one entry for the target.
    pub fn is_multi_entry(&self) -> bool {
        matches!(
            self,
            EncodingShape::RepeatedKey
                | EncodingShape::DeepObject
                | EncodingShape::FlattenedProperties
        )
    }
}

/// The serialization plan for one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingPlan {
    pub style: ParameterStyle,
    pub explode: bool,
    pub target: LocationTarget,
    pub shape: EncodingShape,
}

/// A merged, validated parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ident: NormalizedName,
    pub location: ParameterLocation,
    pub required: bool,
    pub type_descriptor: TypeDescriptor,
    pub style: ParameterStyle,
    pub explode: bool,
    pub encoding: EncodingPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub deprecated: bool,
    /// The schema as declared, after parameter-level `$ref` inlining.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

impl Parameter {
    pub fn key(&self) -> ParameterKey {
        ParameterKey {
            name: self.name.clone(),
            location: self.location,
        }
    }
}

/// Merged parameters partitioned by location, each list in merge order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParameterSet {
    pub path: Vec<Parameter>,
    pub query: Vec<Parameter>,
    pub header: Vec<Parameter>,
    pub cookie: Vec<Parameter>,
}

impl ParameterSet {
    pub fn push(&mut self, param: Parameter) {
        match param.location {
            ParameterLocation::Path => self.path.push(param),
            ParameterLocation::Query => self.query.push(param),
            ParameterLocation::Header => self.header.push(param),
            ParameterLocation::Cookie => self.cookie.push(param),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.path
            .iter()
            .chain(&self.query)
            .chain(&self.header)
            .chain(&self.cookie)
    }

    pub fn len(&self) -> usize {
        self.path.len() + self.query.len() + self.header.len() + self.cookie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, name: &str, location: ParameterLocation) -> Option<&Parameter> {
        let list = match location {
            ParameterLocation::Path => &self.path,
            ParameterLocation::Query => &self.query,
            ParameterLocation::Header => &self.header,
            ParameterLocation::Cookie => &self.cookie,
        };
        list.iter().find(|p| p.name == name)
    }
}
