use indexmap::IndexMap;

use crate::error::SkipReason;
use crate::ir::{ResponseHeaderInfo, ResponseInfo, ResponseKind, TypeDescriptor};
use crate::parse::media_type::MediaType;
use crate::parse::response::{HeaderOrRef, Response, ResponseOrRef};
use crate::parse::schema::{SchemaOrRef, SchemaType, TypeSet};
use crate::resolver::{ModelsResolver, model_ref};

use super::schema_resolver::{scalar_slot_type, schema_or_ref_to_type};

/// Success codes inspected, in order, when there is no `204`.
const SUCCESS_CODES: [&str; 3] = ["200", "201", "202"];

/// Pick the response that determines the shape: an explicit `204`, else the
/// first present of `200`/`201`/`202`.
pub fn select_response(
    responses: &IndexMap<String, ResponseOrRef>,
) -> Option<(&str, &ResponseOrRef)> {
    std::iter::once("204")
        .chain(SUCCESS_CODES)
        .find_map(|code| responses.get_key_value(code))
        .map(|(code, resp)| (code.as_str(), resp))
}

/// Classify an operation's success response.
///
/// A reference the document could not resolve skips the operation; a body
/// reference the models resolver does not know degrades to a generic shape.
pub async fn classify_response<R: ModelsResolver>(
    responses: &IndexMap<String, ResponseOrRef>,
    resolver: &R,
) -> Result<ResponseInfo, SkipReason> {
    let Some((status, response)) = select_response(responses) else {
        return Ok(ResponseInfo {
            headers: collect_headers(responses, None),
            ..ResponseInfo::void()
        });
    };
    let response = match response {
        ResponseOrRef::Response(r) => r,
        ResponseOrRef::Ref { ref_path } => {
            return Err(SkipReason::UnresolvedReference(ref_path.clone()));
        }
    };

    let mut info = ResponseInfo {
        status: Some(status.to_string()),
        headers: collect_headers(responses, Some(status)),
        ..ResponseInfo::void()
    };
    if status == "204" {
        return Ok(info);
    }

    let Some((content_type, schema)) = response_body(response) else {
        return Ok(info);
    };
    info.content_type = Some(content_type.to_string());

    let Some(schema) = schema else {
        info.kind = ResponseKind::Object;
        return Ok(info);
    };

    if let Some((ref_path, is_list)) = model_ref(schema) {
        let model = resolver.resolve_ref_to_type(ref_path).await;
        info.kind = if is_list {
            ResponseKind::Array
        } else {
            ResponseKind::Object
        };
        info.is_list = is_list;
        info.body_type = match (&model, is_list) {
            (Some(name), false) => TypeDescriptor::Model(name.clone()),
            (Some(name), true) => {
                TypeDescriptor::Array(Box::new(TypeDescriptor::Model(name.clone())))
            }
            (None, false) => generic_object(),
            (None, true) => TypeDescriptor::Array(Box::new(generic_object())),
        };
        if model.is_none() {
            log::debug!("no model for `{ref_path}`, using a generic shape");
        }
        info.model = model;
        return Ok(info);
    }

    let body_type = match schema_or_ref_to_type(schema) {
        TypeDescriptor::Unresolved | TypeDescriptor::Ref(_) => TypeDescriptor::Any,
        other => other.degrade(),
    };
    if is_array_schema(schema) || matches!(body_type, TypeDescriptor::Array(_)) {
        info.kind = ResponseKind::Array;
        info.is_list = true;
    } else {
        info.kind = ResponseKind::Object;
    }
    info.body_type = body_type;
    Ok(info)
}

/// The body's content type and schema: JSON when declared, else the first
/// entry. Swagger 2 responses carry their schema directly and count as JSON.
fn response_body(response: &Response) -> Option<(&str, Option<&SchemaOrRef>)> {
    if let Some(schema) = &response.schema {
        return Some(("application/json", Some(schema)));
    }
    let (content_type, media): (&String, &MediaType) = response
        .content
        .get_key_value("application/json")
        .or_else(|| response.content.first())?;
    Some((content_type.as_str(), media.schema.as_ref()))
}

/// Headers declared by any response definition, the selected one first and
/// the rest in declaration order. A name keeps its first declaration.
fn collect_headers(
    responses: &IndexMap<String, ResponseOrRef>,
    selected: Option<&str>,
) -> Vec<ResponseHeaderInfo> {
    let first = selected.and_then(|code| responses.get(code));
    let others = responses
        .iter()
        .filter(|(code, _)| Some(code.as_str()) != selected)
        .map(|(_, resp)| resp);

    let mut headers: Vec<ResponseHeaderInfo> = Vec::new();
    for response in first.into_iter().chain(others) {
        let ResponseOrRef::Response(response) = response else {
            continue;
        };
        for (name, header) in &response.headers {
            if headers.iter().any(|h| h.name.eq_ignore_ascii_case(name)) {
                continue;
            }
            match header {
                HeaderOrRef::Header(h) => headers.push(ResponseHeaderInfo {
                    name: name.clone(),
                    header_type: scalar_slot_type(h.effective_schema().as_ref()),
                    required: h.required,
                }),
                HeaderOrRef::Ref { ref_path } => {
                    log::debug!("dropping unresolved response header `{name}` ({ref_path})");
                }
            }
        }
    }
    headers
}

fn is_array_schema(schema: &SchemaOrRef) -> bool {
    schema
        .as_schema()
        .is_some_and(|s| matches!(s.schema_type, Some(TypeSet::Single(SchemaType::Array))))
}

fn generic_object() -> TypeDescriptor {
    TypeDescriptor::Object(IndexMap::new())
}
