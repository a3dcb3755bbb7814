use serde::Serialize;

use super::parameters::ParameterSet;
use super::security::SecurityPlan;
use super::types::{NormalizedName, TypeDescriptor};
use crate::parse::schema::SchemaOrRef;

pub use crate::parse::operation::HttpMethod;

/// A fully compiled operation, ready for a renderer. Never mutated after
/// compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescriptor {
    pub name: NormalizedName,
    pub operation_id: String,
    pub method: HttpMethod,
    pub path: PathTemplate,
    pub parameters: ParameterSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyPlan>,
    pub response: ResponseInfo,
    pub security: SecurityPlan,
    pub paginated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub deprecated: bool,
}

/// A path template split into literal text and interpolation slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathTemplate {
    pub raw: String,
    pub segments: Vec<PathSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathSegment {
    Literal { text: String },
    /// Filled from the path parameter named `param`; `ident` is its
    /// sanitized identifier.
    Slot { param: String, ident: NormalizedName },
}

impl PathTemplate {
    /// Names of the parameters interpolated into this template, in order.
    pub fn slots(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            PathSegment::Slot { param, .. } => Some(param.as_str()),
            PathSegment::Literal { .. } => None,
        })
    }

    /// Render the template, substituting each slot with `fill`.
    pub fn render(&self, mut fill: impl FnMut(&str, &NormalizedName) -> String) -> String {
        let mut out = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                PathSegment::Literal { text } => out.push_str(text),
                PathSegment::Slot { param, ident } => out.push_str(&fill(param, ident)),
            }
        }
        out
    }
}

/// Request media types known to the negotiator, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Multipart,
    FormUrlEncoded,
    Json,
    TextPlain,
    TextHtml,
    Xml,
    Other,
}

/// The negotiated request content types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentTypeInfo {
    /// Every declared content type, highest priority first.
    pub available: Vec<String>,
    pub selected: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaOrRef>,
}

/// What the generated method accepts as its body argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Multipart field and file bag.
    FieldBag,
    /// Flat string-keyed map.
    FormMap,
    /// Raw string passed through unchanged.
    RawString,
    /// A resolved model type, encoded with its own encode operation.
    Model { type_name: String, is_list: bool },
    /// A generic structured value, encoded as JSON.
    Generic { value_type: TypeDescriptor },
}

/// How the payload becomes bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyEncoding {
    /// Left to the transport, which also sets the boundary.
    Multipart,
    /// Percent-encoded `key=value` pairs joined by `&`.
    FormUrlEncoded,
    Passthrough,
    ModelEncode,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodyPlan {
    pub content: ContentTypeInfo,
    pub kind: ContentKind,
    pub payload: Payload,
    pub encoding: BodyEncoding,
    /// `None` when the transport must set `Content-Type` itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type_header: Option<String>,
    pub required: bool,
    /// Set when the encoding only approximates the declared media type
    /// (XML bodies encoded as JSON).
    pub approximate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    Void,
    Object,
    Array,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseHeaderInfo {
    pub name: String,
    pub header_type: TypeDescriptor,
    /// Headers are optional unless explicitly marked required.
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseInfo {
    pub kind: ResponseKind,
    /// The status code the classification was taken from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Resolved model type name, element type for arrays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub is_list: bool,
    pub body_type: TypeDescriptor,
    pub headers: Vec<ResponseHeaderInfo>,
}

impl ResponseInfo {
    pub fn void() -> Self {
        Self {
            kind: ResponseKind::Void,
            status: None,
            content_type: None,
            model: None,
            is_list: false,
            body_type: TypeDescriptor::Any,
            headers: Vec::new(),
        }
    }

    /// When true the renderer wraps the return value in a `(data, headers)` pair.
    pub fn has_headers(&self) -> bool {
        !self.headers.is_empty()
    }
}
