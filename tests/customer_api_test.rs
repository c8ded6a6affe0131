use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

mod common;
use common::{create_customer, create_ride, create_vehicle, id_of, send, setup_test_app, setup_test_db};

#[tokio::test]
async fn test_create_assigns_identity_and_created() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let customer = create_customer(&app, "Ada", Some("ada@example.com")).await;
    assert!(Uuid::parse_str(id_of(&customer)).is_ok());
    assert_eq!(customer["first_name"], "Ada");
    assert_eq!(customer["email"], "ada@example.com");
    assert!(customer["created"].is_string());

    let (status, body) = send(&app, "GET", &format!("/customers/{}", id_of(&customer)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, customer);
}

#[tokio::test]
async fn test_list_and_filter() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    create_customer(&app, "Ada", None).await;
    let grace = create_customer(&app, "Grace", None).await;
    create_customer(&app, "Ada", Some("second.ada@example.com")).await;

    let (status, body) = send(&app, "GET", "/customers/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(&app, "GET", "/customers/?first_name=Ada", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Parameters that are not fields are ignored
    let (status, body) = send(&app, "GET", "/customers/?first_name=Grace&nickname=x", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, "GET", "/customers/?first_name=Nobody", None).await;
    assert_eq!(body, json!([]));

    let created = grace["created"].as_str().unwrap();
    let (status, body) = send(&app, "GET", &format!("/customers/?created={created}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], grace["id"]);

    let (status, _) = send(&app, "GET", "/customers/?created=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);
    let uri = format!("/customers/{}", Uuid::new_v4());

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({"phone": "1"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_is_not_found_with_detail() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let (status, body) = send(&app, "GET", "/customers/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "customer not found"}));

    let (status, body) = send(&app, "PUT", "/customers/42", Some(json!({"first_name": "Ada"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());

    let (status, body) = send(&app, "PATCH", "/rides/not-a-uuid", Some(json!({"status": "active"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "ride not found");

    let (status, _) = send(&app, "DELETE", "/vehicles/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_are_field_maps() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let (status, body) = send(&app, "POST", "/customers/", Some(json!({"email": "nope"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["first_name"], json!(["This field is required."]));
    assert_eq!(body["last_name"], json!(["This field is required."]));
    assert_eq!(body["email"], json!(["Enter a valid email address."]));

    let (_, body) = send(&app, "GET", "/customers/", None).await;
    assert_eq!(body, json!([]), "nothing is written on validation failure");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let (status, body) = send(&app, "POST", "/customers/", Some(json!({"first_name": 42}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let first = create_customer(&app, "Ada", Some("ada@example.com")).await;
    let (status, body) = send(
        &app,
        "POST",
        "/customers/",
        Some(json!({"first_name": "Eve", "last_name": "Copy", "email": "ada@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["email"], json!(["customer with this email already exists."]));

    // Re-sending one's own email is not a duplicate
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/customers/{}", id_of(&first)),
        Some(json!({"email": "ada@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let customer = create_customer(&app, "Ada", Some("ada@example.com")).await;
    let uri = format!("/customers/{}", id_of(&customer));

    let (status, body) = send(&app, "PATCH", &uri, Some(json!({"phone": "555-0199"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "555-0199");
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["created"], customer["created"]);

    // Explicit null clears a nullable field
    let (status, body) = send(&app, "PATCH", &uri, Some(json!({"email": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], json!(null));
}

#[tokio::test]
async fn test_replace_requires_required_fields() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let customer = create_customer(&app, "Ada", None).await;
    let uri = format!("/customers/{}", id_of(&customer));

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"first_name": "Augusta"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["last_name"], json!(["This field is required."]));

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"first_name": "Augusta", "last_name": "King"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Augusta");
    assert_eq!(body["last_name"], "King");
    assert_eq!(body["id"], customer["id"]);
}

#[tokio::test]
async fn test_delete_then_gone() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let customer = create_customer(&app, "Ada", None).await;
    let uri = format!("/customers/{}", id_of(&customer));

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, json!(null));

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_clears_ride_customer() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let customer = create_customer(&app, "Ada", None).await;
    let vehicle = create_vehicle(&app, "AB-123", 0).await;
    let (status, ride) = send(
        &app,
        "POST",
        "/rides/",
        Some(json!({
            "vehicle": vehicle["id"],
            "customer": customer["id"],
            "start_date": "2024-01-10",
            "end_date": "2024-01-15"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ride["customer"], customer["id"]);
    let untouched = create_ride(&app, &vehicle, "2024-02-01", "2024-02-02").await;

    let (status, _) = send(&app, "DELETE", &format!("/customers/{}", id_of(&customer)), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, ride) = send(&app, "GET", &format!("/rides/{}", id_of(&ride)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ride["customer"], json!(null));

    let (status, _) = send(&app, "GET", &format!("/rides/{}", id_of(&untouched)), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_collection_requires_id_for_writes() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    for method in ["PUT", "PATCH", "DELETE"] {
        let (status, body) = send(&app, method, "/customers/", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], format!("PK is required for {method} requests."));
    }
}

#[tokio::test]
async fn test_openapi_document_served() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let app = setup_test_app(db);

    let (status, body) = send(&app, "GET", "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    let paths = body["paths"].as_object().unwrap();
    for path in ["/customers/", "/customers/{id}", "/vehicles/{id}", "/rides/", "/availability/"] {
        assert!(paths.contains_key(path), "{path} missing from document");
    }
}
