use opcomp_core::transform::name_normalizer::{
    normalize_name, route_to_name, sanitize_operation_id,
};

#[test]
fn test_operation_id_to_method_name() {
    let id = sanitize_operation_id("createChatCompletion").unwrap();
    let n = normalize_name(&id);
    assert_eq!(n.pascal_case, "CreateChatCompletion");
    assert_eq!(n.camel_case, "createChatCompletion");
    assert_eq!(n.snake_case, "create_chat_completion");
    assert_eq!(n.screaming_snake, "CREATE_CHAT_COMPLETION");
}

#[test]
fn test_punctuated_operation_ids() {
    assert_eq!(sanitize_operation_id("users.get").as_deref(), Some("users_get"));
    assert_eq!(
        sanitize_operation_id("pet-store/find by id").as_deref(),
        Some("pet_store_find_by_id")
    );
    let n = normalize_name(&sanitize_operation_id("pet-store/find").unwrap());
    assert_eq!(n.camel_case, "petStoreFind");
}

#[test]
fn test_leading_digit_gets_underscore() {
    assert_eq!(sanitize_operation_id("2fa-verify").as_deref(), Some("_2fa_verify"));
}

#[test]
fn test_unusable_operation_ids() {
    assert_eq!(sanitize_operation_id(""), None);
    assert_eq!(sanitize_operation_id("   "), None);
    assert_eq!(sanitize_operation_id("--/"), None);
}

#[test]
fn test_route_names_for_missing_ids() {
    assert_eq!(route_to_name("GET", "/orders"), "listOrders");
    assert_eq!(route_to_name("GET", "/orders/{orderId}"), "getOrder");
    assert_eq!(route_to_name("POST", "/orders/{orderId}/notes"), "createOrdersNotes");
    assert_eq!(route_to_name("DELETE", "/categories/{id}"), "deleteCategory");
}
