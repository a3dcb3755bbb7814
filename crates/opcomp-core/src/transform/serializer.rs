//! Parameter serialization per OpenAPI 3 `style` / `explode`.
//!
//! [`plan_encoding`] derives the static plan stored on each compiled
//! parameter; [`serialize_parameter`] applies the same rules to a concrete
//! JSON value and is what generated clients are expected to reproduce.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::ir::{
    EncodingPlan, EncodingShape, LocationTarget, Parameter, ParameterLocation, ParameterStyle,
    TypeDescriptor,
};

/// Unreserved characters per RFC 3986 stay literal; everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueShape {
    Scalar,
    Array,
    Object,
}

/// Build the encoding plan for a parameter of type `td`.
pub fn plan_encoding(
    location: ParameterLocation,
    style: ParameterStyle,
    explode: bool,
    td: &TypeDescriptor,
) -> EncodingPlan {
    let value_shape = match td {
        TypeDescriptor::Array(_) => ValueShape::Array,
        TypeDescriptor::Object(_) => ValueShape::Object,
        _ => ValueShape::Scalar,
    };
    let target = LocationTarget::from(location);
    EncodingPlan {
        style,
        explode,
        target,
        shape: shape_for(value_shape, style, explode, target),
    }
}

fn shape_for(
    value: ValueShape,
    style: ParameterStyle,
    explode: bool,
    target: LocationTarget,
) -> EncodingShape {
    let shape = match value {
        ValueShape::Scalar => EncodingShape::Scalar,
        ValueShape::Array => match (style, explode) {
            (ParameterStyle::SpaceDelimited, _) => joined(" "),
            (ParameterStyle::PipeDelimited, _) => joined("|"),
            (ParameterStyle::Form, true) => EncodingShape::RepeatedKey,
            // form without explode, simple, and every unmatched style
            _ => joined(","),
        },
        ValueShape::Object => match (style, explode) {
            (ParameterStyle::DeepObject, _) => EncodingShape::DeepObject,
            (ParameterStyle::Form, true) => EncodingShape::FlattenedProperties,
            (ParameterStyle::Simple, true) => EncodingShape::KeyValuePairs {
                separator: ",".to_string(),
            },
            _ => EncodingShape::KeyValueList {
                separator: ",".to_string(),
            },
        },
    };

    // Only the query string can hold several entries for one parameter.
    if target == LocationTarget::QueryString || !shape.is_multi_entry() {
        return shape;
    }
    match shape {
        EncodingShape::RepeatedKey => joined(","),
        _ => EncodingShape::KeyValuePairs {
            separator: ",".to_string(),
        },
    }
}

fn joined(separator: &str) -> EncodingShape {
    EncodingShape::Joined {
        separator: separator.to_string(),
    }
}

/// A parameter value flattened for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializedParameter {
    /// One string under one key (path slot, header, cookie or query entry).
    Single { key: String, value: String },
    /// The same key once per value.
    Repeated { key: String, values: Vec<String> },
    /// Independent key/value entries merged into the query string.
    Entries(Vec<(String, String)>),
}

impl SerializedParameter {
    /// Flatten into `(key, value)` pairs.
    pub fn into_entries(self) -> Vec<(String, String)> {
        match self {
            SerializedParameter::Single { key, value } => vec![(key, value)],
            SerializedParameter::Repeated { key, values } => {
                values.into_iter().map(|v| (key.clone(), v)).collect()
            }
            SerializedParameter::Entries(entries) => entries,
        }
    }

    /// The single string value, if this is a single-entry encoding.
    pub fn as_single(&self) -> Option<&str> {
        match self {
            SerializedParameter::Single { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Serialize `value` for `param` using the parameter's style and explode.
///
/// The shape is taken from the value itself, so generic (`Any`) parameters
/// serialize the same way as declared arrays and objects.
pub fn serialize_parameter(param: &Parameter, value: &Value) -> SerializedParameter {
    encode_value(
        &param.name,
        LocationTarget::from(param.location),
        param.style,
        param.explode,
        value,
    )
}

fn encode_value(
    name: &str,
    target: LocationTarget,
    style: ParameterStyle,
    explode: bool,
    value: &Value,
) -> SerializedParameter {
    let single = |value: String| SerializedParameter::Single {
        key: name.to_string(),
        value,
    };

    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(stringify).collect();
            match shape_for(ValueShape::Array, style, explode, target) {
                EncodingShape::RepeatedKey => SerializedParameter::Repeated {
                    key: name.to_string(),
                    values: items,
                },
                EncodingShape::Joined { separator } => single(items.join(&separator)),
                _ => single(items.join(",")),
            }
        }
        Value::Object(map) => {
            let pairs: Vec<(String, String)> =
                map.iter().map(|(k, v)| (k.clone(), stringify(v))).collect();
            match shape_for(ValueShape::Object, style, explode, target) {
                EncodingShape::DeepObject => SerializedParameter::Entries(
                    pairs
                        .into_iter()
                        .map(|(k, v)| (format!("{name}[{k}]"), v))
                        .collect(),
                ),
                EncodingShape::FlattenedProperties => SerializedParameter::Entries(pairs),
                EncodingShape::KeyValuePairs { separator } => single(
                    pairs
                        .iter()
                        .map(|(k, v)| format!("{k}={v}"))
                        .collect::<Vec<_>>()
                        .join(&separator),
                ),
                EncodingShape::KeyValueList { separator } => single(
                    pairs
                        .iter()
                        .flat_map(|(k, v)| [k.as_str(), v.as_str()])
                        .collect::<Vec<_>>()
                        .join(&separator),
                ),
                _ => single(value.to_string()),
            }
        }
        other => single(stringify(other)),
    }
}

/// Stringify a scalar; nested composites fall back to their JSON text.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Percent-encode a single URI component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Build a `Cookie` header: one `name=value` pair per cookie with the value
/// percent-encoded, joined by `; `.
pub fn cookie_header<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name.as_ref(), encode_component(value.as_ref())))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Encode an `application/x-www-form-urlencoded` body.
pub fn encode_form<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_component(key.as_ref()),
                encode_component(value.as_ref())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
