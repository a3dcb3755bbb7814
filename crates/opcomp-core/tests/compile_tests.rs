use std::path::PathBuf;

use opcomp_core::error::SkipReason;
use opcomp_core::ir::*;
use opcomp_core::parse;
use opcomp_core::parse::spec::OpenApiSpec;
use opcomp_core::transform::serialize_parameter;
use opcomp_core::{CompileOptions, ComponentsResolver, NoopResolver, compile};

const USERS: &str = include_str!("fixtures/users.yaml");
const STORE: &str = include_str!("fixtures/store.yaml");
const PETSTORE_V2: &str = include_str!("fixtures/petstore-swagger2.yaml");

async fn compile_with_components(spec: &OpenApiSpec) -> CompiledSpec {
    let resolver = ComponentsResolver::new(spec, "models");
    compile(spec, &resolver, &CompileOptions::default())
        .await
        .expect("should compile")
}

fn method<'a>(compiled: &'a CompiledSpec, name: &str) -> &'a MethodDescriptor {
    compiled
        .methods
        .iter()
        .find(|m| m.operation_id == name)
        .unwrap_or_else(|| panic!("should have {name}"))
}

fn skip_reason<'a>(compiled: &'a CompiledSpec, method: HttpMethod, path: &str) -> &'a SkipReason {
    &compiled
        .skipped
        .iter()
        .find(|s| s.method == method && s.path == path)
        .unwrap_or_else(|| panic!("{method} {path} should be skipped"))
        .reason
}

#[tokio::test]
async fn compile_users_end_to_end() {
    let spec = parse::from_yaml(USERS).unwrap();
    let compiled = compile(&spec, &NoopResolver, &CompileOptions::default())
        .await
        .unwrap();

    assert_eq!(compiled.methods.len(), 1);
    assert!(compiled.skipped.is_empty());
    let get_user = &compiled.methods[0];

    assert_eq!(get_user.name.camel_case, "getUser");
    assert_eq!(get_user.method, HttpMethod::Get);
    assert_eq!(get_user.summary.as_deref(), Some("Fetch one user"));

    assert_eq!(get_user.parameters.path.len(), 1);
    let id = &get_user.parameters.path[0];
    assert!(id.required);
    assert_eq!(
        id.type_descriptor,
        TypeDescriptor::Primitive(PrimitiveKind::String)
    );
    assert_eq!(id.encoding.target, LocationTarget::PathSegment);

    assert_eq!(get_user.parameters.query.len(), 1);
    let page = &get_user.parameters.query[0];
    assert!(!page.required);
    assert_eq!(
        page.type_descriptor,
        TypeDescriptor::Primitive(PrimitiveKind::Integer)
    );
    assert_eq!((page.style, page.explode), (ParameterStyle::Form, true));

    assert_eq!(get_user.response.kind, ResponseKind::Object);
    assert!(!get_user.response.has_headers());
    assert!(!get_user.paginated, "page without limit is not pagination");
    assert!(get_user.request_body.is_none());

    let rendered = get_user
        .path
        .render(|_, ident| format!("{{{}}}", ident.snake_case));
    assert_eq!(rendered, "/users/{id}");
}

#[tokio::test]
async fn compile_store_outcomes() {
    let spec = parse::from_yaml(STORE).unwrap();
    let compiled = compile_with_components(&spec).await;

    let compiled_ids: Vec<&str> = compiled
        .methods
        .iter()
        .map(|m| m.operation_id.as_str())
        .collect();
    assert_eq!(
        compiled_ids,
        vec![
            "listOrders",
            "createOrder",
            "deleteOrder",
            "replaceOrder",
            "patchOrder",
            "uploadAttachment",
        ]
    );

    assert_eq!(
        skip_reason(&compiled, HttpMethod::Get, "/orders/{orderId}/notes/{noteId}"),
        &SkipReason::UndeclaredPathPlaceholder("noteId".to_string())
    );
    assert_eq!(
        skip_reason(&compiled, HttpMethod::Get, "/search"),
        &SkipReason::UnresolvedParameterType {
            name: "q".to_string(),
            location: ParameterLocation::Query,
        }
    );
    assert_eq!(
        skip_reason(&compiled, HttpMethod::Delete, "/search"),
        &SkipReason::RequestBodyNotAllowed(HttpMethod::Delete)
    );

    let imports: Vec<&PathBuf> = compiled.imports.iter().collect();
    assert_eq!(imports, vec![&PathBuf::from("models/order")]);
}

#[tokio::test]
async fn operation_parameters_override_path_parameters() {
    let spec = parse::from_yaml(STORE).unwrap();
    let compiled = compile_with_components(&spec).await;
    let list = method(&compiled, "listOrders");

    let status = list
        .parameters
        .find("status", ParameterLocation::Query)
        .unwrap();
    assert_eq!(status.description.as_deref(), Some("operation-level filter"));
    assert_eq!(status.style, ParameterStyle::PipeDelimited);
    assert_eq!(
        status.encoding.shape,
        EncodingShape::Joined {
            separator: "|".to_string()
        }
    );

    // path-level header first, then the $ref'd header from the operation
    let headers: Vec<&str> = list.parameters.header.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(headers, vec!["X-Tenant", "X-Trace"]);
    assert!(list.parameters.header[0].required);

    let filter = list
        .parameters
        .find("filter", ParameterLocation::Query)
        .unwrap();
    assert_eq!(filter.encoding.shape, EncodingShape::DeepObject);
    let TypeDescriptor::Object(props) = &filter.type_descriptor else {
        panic!("expected object");
    };
    assert_eq!(props["total"], TypeDescriptor::Any);

    assert!(list.paginated);
}

#[tokio::test]
async fn response_classification() {
    let spec = parse::from_yaml(STORE).unwrap();
    let compiled = compile_with_components(&spec).await;

    let list = method(&compiled, "listOrders");
    assert_eq!(list.response.kind, ResponseKind::Array);
    assert_eq!(list.response.model.as_deref(), Some("Order"));
    let header_names: Vec<&str> = list
        .response
        .headers
        .iter()
        .map(|h| h.name.as_str())
        .collect();
    assert_eq!(header_names, vec!["X-Total-Count", "X-Next"]);
    assert!(list.response.headers[0].required);
    assert!(!list.response.headers[1].required);

    // 204 wins over a 200 with content, and its headers still wrap the result
    let delete = method(&compiled, "deleteOrder");
    assert_eq!(delete.response.kind, ResponseKind::Void);
    assert!(delete.response.has_headers());

    let replace = method(&compiled, "replaceOrder");
    assert_eq!(replace.response.kind, ResponseKind::Void);
    assert!(!replace.response.has_headers());
    assert_ne!(delete.response, replace.response);

    let create = method(&compiled, "createOrder");
    assert_eq!(create.response.kind, ResponseKind::Object);
    assert_eq!(
        create.response.body_type,
        TypeDescriptor::Model("Order".to_string())
    );
}

#[tokio::test]
async fn request_body_negotiation() {
    let spec = parse::from_yaml(STORE).unwrap();
    let compiled = compile_with_components(&spec).await;

    let create = method(&compiled, "createOrder").request_body.as_ref().unwrap();
    assert!(create.required);
    assert_eq!(create.encoding, BodyEncoding::ModelEncode);

    let replace = method(&compiled, "replaceOrder").request_body.as_ref().unwrap();
    assert_eq!(
        replace.content.available,
        vec!["application/json", "text/plain", "application/xml"]
    );
    assert_eq!(replace.content.selected, "application/json");
    assert_eq!(
        replace.payload,
        Payload::Model {
            type_name: "Order".to_string(),
            is_list: false,
        }
    );

    let patch = method(&compiled, "patchOrder").request_body.as_ref().unwrap();
    assert_eq!(patch.encoding, BodyEncoding::Json);

    let upload = method(&compiled, "uploadAttachment");
    let body = upload.request_body.as_ref().unwrap();
    assert_eq!(body.kind, ContentKind::Multipart);
    assert_eq!(body.payload, Payload::FieldBag);
    assert_eq!(body.content_type_header, None);
    assert_eq!(upload.parameters.cookie.len(), 1);
    assert_eq!(upload.response.kind, ResponseKind::Void);
}

#[tokio::test]
async fn security_precedence() {
    let spec = parse::from_yaml(STORE).unwrap();
    let compiled = compile_with_components(&spec).await;

    // inherits the root requirement
    let list = method(&compiled, "listOrders");
    assert_eq!(
        list.security.instructions,
        vec![AuthInstruction::Bearer {
            scheme: "bearerAuth".to_string(),
            prefix: "Bearer".to_string(),
        }]
    );

    // own list replaces the root one; only the first alternative is used
    let create = method(&compiled, "createOrder");
    assert_eq!(
        create.security.instructions,
        vec![AuthInstruction::HeaderApiKey {
            scheme: "apiKey".to_string(),
            header_name: "X-API-Key".to_string(),
        }]
    );
    assert_eq!(create.security.ignored_alternatives, 1);
    assert!(compiled.issues.iter().any(|i| {
        i.severity == Severity::Info && i.spec_path == "#/paths/~1orders/post/security"
    }));

    // an explicit empty list opts out entirely, without the legacy fallback
    let delete = method(&compiled, "deleteOrder");
    assert!(delete.security.is_empty());
    assert!(!delete.security.uses_fallback());
}

#[tokio::test]
async fn skipped_operations_are_reported() {
    let spec = parse::from_yaml(STORE).unwrap();
    let compiled = compile(&spec, &NoopResolver, &CompileOptions::default())
        .await
        .unwrap();

    assert_eq!(compiled.skipped.len(), 3);
    let pointers: Vec<&str> = compiled
        .issues
        .iter()
        .filter(|i| i.severity == Severity::Warning)
        .map(|i| i.spec_path.as_str())
        .collect();
    assert_eq!(
        pointers,
        vec![
            "#/paths/~1orders~1{orderId}~1notes~1{noteId}/get",
            "#/paths/~1search/get",
            "#/paths/~1search/delete",
        ]
    );
    // no resolver: no model imports
    assert!(compiled.imports.is_empty());
    let list = method(&compiled, "listOrders");
    assert_eq!(list.response.model, None);
    assert_eq!(list.response.kind, ResponseKind::Array);
}

#[tokio::test]
async fn compile_swagger2() {
    let spec = parse::from_yaml(PETSTORE_V2).unwrap();
    let compiled = compile_with_components(&spec).await;

    assert_eq!(
        skip_reason(&compiled, HttpMethod::Delete, "/pet/{petId}"),
        &SkipReason::RequestBodyNotAllowed(HttpMethod::Delete)
    );

    let add_pet = method(&compiled, "addPet");
    let body = add_pet.request_body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(
        body.content.available,
        vec!["application/json", "application/xml"]
    );
    assert_eq!(
        body.payload,
        Payload::Model {
            type_name: "Pet".to_string(),
            is_list: false,
        }
    );
    assert_eq!(add_pet.response.kind, ResponseKind::Void);
    assert_eq!(
        add_pet.security.instructions,
        vec![AuthInstruction::AccessToken {
            scheme: "petstore_auth".to_string(),
            scopes: vec!["write:pets".to_string()],
        }]
    );

    let find = method(&compiled, "findPetsByStatus");
    let status = find
        .parameters
        .find("status", ParameterLocation::Query)
        .unwrap();
    assert_eq!(status.encoding.shape, EncodingShape::RepeatedKey);
    assert!(find.paginated, "offset + limit");
    assert_eq!(find.response.kind, ResponseKind::Array);
    assert_eq!(find.response.model.as_deref(), Some("Pet"));
    assert_eq!(
        find.security.instructions,
        vec![AuthInstruction::QueryApiKey {
            scheme: "api_key".to_string(),
            param_name: "api_key".to_string(),
        }]
    );

    let get_pet = method(&compiled, "getPetById");
    assert_eq!(
        get_pet.parameters.path[0].type_descriptor,
        TypeDescriptor::Primitive(PrimitiveKind::Integer)
    );
    assert_eq!(
        get_pet.response.headers[0].header_type,
        TypeDescriptor::Primitive(PrimitiveKind::Integer)
    );
    assert!(get_pet.security.uses_fallback());

    // formData parameters are dropped, leaving a bodiless POST
    let upload = method(&compiled, "uploadFile");
    assert!(upload.request_body.is_none());
    assert_eq!(upload.parameters.len(), 1);

    let imports: Vec<&PathBuf> = compiled.imports.iter().collect();
    assert_eq!(imports, vec![&PathBuf::from("models/pet")]);
}

#[tokio::test]
async fn descriptors_serialize() {
    let spec = parse::from_yaml(USERS).unwrap();
    let compiled = compile(&spec, &NoopResolver, &CompileOptions::default())
        .await
        .unwrap();
    let json = serde_json::to_value(&compiled).unwrap();

    let method = &json["methods"][0];
    assert_eq!(method["method"], "get");
    assert_eq!(method["path"]["raw"], "/users/{id}");
    assert_eq!(method["response"]["kind"], "object");
    assert_eq!(method["parameters"]["query"][0]["name"], "page");
    assert_eq!(json["skipped"], serde_json::json!([]));
}

#[tokio::test]
async fn compiled_parameters_serialize_by_style() {
    let spec = parse::from_yaml(STORE).unwrap();
    let compiled = compile(&spec, &NoopResolver, &CompileOptions::default())
        .await
        .unwrap();
    let list = method(&compiled, "listOrders");

    let status = list.parameters.find("status", ParameterLocation::Query).unwrap();
    let encoded = serialize_parameter(status, &serde_json::json!(["open", "paid"]));
    assert_eq!(encoded.as_single(), Some("open|paid"));

    let filter = list.parameters.find("filter", ParameterLocation::Query).unwrap();
    let encoded = serialize_parameter(filter, &serde_json::json!({"customer": "ada", "total": 3}));
    assert_eq!(encoded.as_single(), None);
    assert_eq!(
        encoded.into_entries(),
        vec![
            ("filter[customer]".to_string(), "ada".to_string()),
            ("filter[total]".to_string(), "3".to_string()),
        ]
    );

    let tenant = &list.parameters.header[0];
    let encoded = serialize_parameter(tenant, &serde_json::json!("acme"));
    assert_eq!(encoded.as_single(), Some("acme"));
}
