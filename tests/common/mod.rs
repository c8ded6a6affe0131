#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use car_rental::{app, migration::Migrator};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use serde_json::{Value, json};
use tower::ServiceExt;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// A database without tables: any query against it fails.
pub async fn setup_empty_db() -> Result<DatabaseConnection, DbErr> {
    Database::connect("sqlite::memory:").await
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    app::router(db)
}

/// Send one request and decode the JSON body (`Value::Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn create_customer(app: &Router, first_name: &str, email: Option<&str>) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/customers/",
        Some(json!({
            "first_name": first_name,
            "last_name": "Tester",
            "email": email,
            "phone": "555-0100"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

pub async fn create_vehicle(app: &Router, registration: &str, odometer: i32) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/vehicles/",
        Some(json!({
            "make": "Toyota",
            "model": "Corolla",
            "year": 2020,
            "registration": registration,
            "seats": 5,
            "fuel": "gasoline",
            "odometer": odometer
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

pub async fn create_ride(app: &Router, vehicle: &Value, start_date: &str, end_date: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/rides/",
        Some(json!({
            "vehicle": vehicle["id"],
            "start_date": start_date,
            "end_date": end_date
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

pub fn id_of(record: &Value) -> &str {
    record["id"].as_str().unwrap()
}
