use indexmap::IndexMap;

use crate::ir::{BodyEncoding, ContentKind, ContentTypeInfo, Payload, RequestBodyPlan, TypeDescriptor};
use crate::parse::media_type::MediaType;
use crate::parse::request_body::RequestBody;
use crate::parse::schema::SchemaOrRef;
use crate::resolver::{ModelsResolver, resolve_schema_model};

use super::schema_resolver::schema_or_ref_to_type;

impl ContentKind {
    /// Classify a media type, ignoring parameters such as `charset`.
    pub fn of(media_type: &str) -> Self {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "multipart/form-data" => ContentKind::Multipart,
            "application/x-www-form-urlencoded" => ContentKind::FormUrlEncoded,
            "application/json" => ContentKind::Json,
            "text/plain" => ContentKind::TextPlain,
            "text/html" => ContentKind::TextHtml,
            "application/xml" => ContentKind::Xml,
            _ => ContentKind::Other,
        }
    }

    /// Position in the negotiation order; lower wins.
    fn priority(self) -> u8 {
        match self {
            ContentKind::Multipart => 0,
            ContentKind::FormUrlEncoded => 1,
            ContentKind::Json => 2,
            ContentKind::TextPlain => 3,
            ContentKind::TextHtml => 4,
            ContentKind::Xml => 5,
            ContentKind::Other => 6,
        }
    }
}

/// Order the declared content types by priority and select the first.
///
/// Unrecognised types keep their declaration order after the known ones.
/// Returns `None` when nothing is declared.
pub fn negotiate(content: &IndexMap<String, MediaType>) -> Option<ContentTypeInfo> {
    let mut available: Vec<&String> = content.keys().collect();
    // stable sort: ties keep declaration order
    available.sort_by_key(|ct| ContentKind::of(ct).priority());

    let selected = available.first()?.to_string();
    let schema = content.get(&selected).and_then(|mt| mt.schema.clone());
    Some(ContentTypeInfo {
        available: available.into_iter().cloned().collect(),
        selected,
        schema,
    })
}

/// Negotiate a request body and derive how its payload is represented and
/// encoded. Returns `None` when the body declares no content.
pub async fn plan_request_body<R: ModelsResolver>(
    body: &RequestBody,
    resolver: &R,
) -> Option<RequestBodyPlan> {
    let content = negotiate(&body.content)?;
    let kind = ContentKind::of(&content.selected);
    let mut approximate = false;

    let (payload, encoding) = match kind {
        ContentKind::Multipart => (Payload::FieldBag, BodyEncoding::Multipart),
        ContentKind::FormUrlEncoded => (Payload::FormMap, BodyEncoding::FormUrlEncoded),
        ContentKind::TextPlain | ContentKind::TextHtml => {
            (Payload::RawString, BodyEncoding::Passthrough)
        }
        ContentKind::Json => structured_payload(content.schema.as_ref(), resolver).await,
        ContentKind::Xml => {
            if is_bare_string(content.schema.as_ref()) {
                (Payload::RawString, BodyEncoding::Passthrough)
            } else {
                approximate = true;
                structured_payload(content.schema.as_ref(), resolver).await
            }
        }
        ContentKind::Other => match model_payload(content.schema.as_ref(), resolver).await {
            Some(model) => (model, BodyEncoding::ModelEncode),
            None => (Payload::RawString, BodyEncoding::Passthrough),
        },
    };

    let content_type_header = match kind {
        ContentKind::Multipart => None,
        _ => Some(content.selected.clone()),
    };

    Some(RequestBodyPlan {
        content,
        kind,
        payload,
        encoding,
        content_type_header,
        required: body.required,
        approximate,
        description: body.description.clone(),
    })
}

/// A model when the resolver knows the schema, otherwise a generic value
/// encoded as JSON.
async fn structured_payload<R: ModelsResolver>(
    schema: Option<&SchemaOrRef>,
    resolver: &R,
) -> (Payload, BodyEncoding) {
    if let Some(model) = model_payload(schema, resolver).await {
        return (model, BodyEncoding::ModelEncode);
    }
    let value_type = schema
        .map(schema_or_ref_to_type)
        .map(|td| match td {
            TypeDescriptor::Unresolved | TypeDescriptor::Ref(_) => TypeDescriptor::Any,
            other => other.degrade(),
        })
        .unwrap_or(TypeDescriptor::Any);
    (Payload::Generic { value_type }, BodyEncoding::Json)
}

async fn model_payload<R: ModelsResolver>(
    schema: Option<&SchemaOrRef>,
    resolver: &R,
) -> Option<Payload> {
    let model = resolve_schema_model(resolver, schema?).await?;
    Some(Payload::Model {
        type_name: model.type_name,
        is_list: model.is_list,
    })
}

fn is_bare_string(schema: Option<&SchemaOrRef>) -> bool {
    schema
        .and_then(SchemaOrRef::as_schema)
        .is_some_and(|s| s.is_bare_string())
}
