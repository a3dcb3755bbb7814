use indexmap::IndexMap;

use crate::error::SkipReason;
use crate::ir::{
    Parameter, ParameterKey, ParameterLocation, ParameterSet, ParameterStyle, TypeDescriptor,
};
use crate::parse::parameter::{self as raw, ParameterOrRef};

use super::name_normalizer::normalize_name;
use super::schema_resolver::schema_or_ref_to_type;
use super::serializer::plan_encoding;

/// Path-level and operation-level parameters merged by `(name, location)`.
#[derive(Debug, Clone, Default)]
pub struct MergedParameters {
    pub params: IndexMap<ParameterKey, raw::Parameter>,
    /// A Swagger 2 `in: body` parameter, which never joins `params`.
    pub body: Option<raw::Parameter>,
}

/// Merge the two declaration lists. Later entries overwrite earlier ones
/// with the same key, so operation-level declarations always win; an
/// overwritten entry keeps its original position.
///
/// Parameters in any location other than path/query/header/cookie are
/// dropped.
pub fn merge_parameters(
    path_level: &[ParameterOrRef],
    op_level: &[ParameterOrRef],
) -> Result<MergedParameters, SkipReason> {
    let mut merged = MergedParameters::default();

    for param_or_ref in path_level.iter().chain(op_level) {
        let param = match param_or_ref {
            ParameterOrRef::Parameter(p) => p,
            ParameterOrRef::Ref { ref_path } => {
                return Err(SkipReason::UnresolvedReference(ref_path.clone()));
            }
        };
        let location = match &param.location {
            raw::ParameterLocation::Path => ParameterLocation::Path,
            raw::ParameterLocation::Query => ParameterLocation::Query,
            raw::ParameterLocation::Header => ParameterLocation::Header,
            raw::ParameterLocation::Cookie => ParameterLocation::Cookie,
            location if location.is_body() => {
                merged.body = Some(param.clone());
                continue;
            }
            raw::ParameterLocation::Unsupported(other) => {
                log::debug!("dropping parameter `{}` in `{other}`", param.name);
                continue;
            }
        };
        let key = ParameterKey {
            name: param.name.clone(),
            location,
        };
        merged.params.insert(key, param.clone());
    }

    Ok(merged)
}

/// Validate and type every merged parameter, partitioned by location.
pub fn build_parameter_set(merged: &MergedParameters) -> Result<ParameterSet, SkipReason> {
    let mut set = ParameterSet::default();
    for (key, param) in &merged.params {
        set.push(build_parameter(param, key.location)?);
    }
    Ok(set)
}

/// Turn one raw parameter into its compiled form.
///
/// Path parameters must be fully typed and are always required. Elsewhere
/// an unresolved scalar is fatal for the operation while an array or object
/// with unresolved parts degrades to a generic container.
pub fn build_parameter(
    param: &raw::Parameter,
    location: ParameterLocation,
) -> Result<Parameter, SkipReason> {
    let schema = param.effective_schema();

    let (type_descriptor, required) = match location {
        ParameterLocation::Path => {
            let Some(ref schema) = schema else {
                return Err(SkipReason::PathParameterWithoutSchema(param.name.clone()));
            };
            if param.required == Some(false) {
                return Err(SkipReason::PathParameterNotRequired(param.name.clone()));
            }
            let td = schema_or_ref_to_type(schema);
            if td.is_composite() || !td.is_fully_resolved() {
                return Err(SkipReason::UnresolvedPathParameterType(param.name.clone()));
            }
            (td, true)
        }
        _ => {
            let td = schema
                .as_ref()
                .map(schema_or_ref_to_type)
                .unwrap_or(TypeDescriptor::Unresolved);
            let td = if td.is_composite() {
                td.degrade()
            } else if td.is_fully_resolved() {
                td
            } else {
                return Err(SkipReason::UnresolvedParameterType {
                    name: param.name.clone(),
                    location,
                });
            };
            (td, param.required.unwrap_or(false))
        }
    };

    let (style, explode) = resolve_style(param, location);
    let encoding = plan_encoding(location, style, explode, &type_descriptor);

    Ok(Parameter {
        name: param.name.clone(),
        ident: normalize_name(&param.name),
        location,
        required,
        type_descriptor,
        style,
        explode,
        encoding,
        description: param.description.clone(),
        deprecated: param.deprecated.unwrap_or(false),
        schema,
    })
}

/// Style and explode, honouring explicit values, then Swagger 2
/// `collectionFormat`, then the location defaults.
fn resolve_style(param: &raw::Parameter, location: ParameterLocation) -> (ParameterStyle, bool) {
    let legacy = param
        .collection_format
        .as_deref()
        .and_then(collection_format_style);

    let style = match param.style.as_deref().map(ParameterStyle::parse) {
        Some(Some(style)) => style,
        Some(None) => {
            log::debug!(
                "unknown style on parameter `{}`, using the {location} default",
                param.name
            );
            ParameterStyle::default_for(location)
        }
        None => legacy
            .map(|(style, _)| style)
            .unwrap_or_else(|| ParameterStyle::default_for(location)),
    };

    let explode = param
        .explode
        .or_else(|| {
            legacy
                .filter(|(legacy_style, _)| *legacy_style == style)
                .map(|(_, explode)| explode)
        })
        .unwrap_or_else(|| style.default_explode());

    (style, explode)
}

/// Map a Swagger 2 `collectionFormat` onto OpenAPI 3 style/explode.
fn collection_format_style(format: &str) -> Option<(ParameterStyle, bool)> {
    match format {
        "csv" => Some((ParameterStyle::Form, false)),
        "ssv" => Some((ParameterStyle::SpaceDelimited, false)),
        "pipes" => Some((ParameterStyle::PipeDelimited, false)),
        "multi" => Some((ParameterStyle::Form, true)),
        _ => None,
    }
}
