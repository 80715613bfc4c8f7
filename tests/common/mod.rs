#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use registrar::router::init_router;
use registrar::state::AppState;
use registrar_config::{CorsConfig, JwtConfig, RegistrationConfig, StorageConfig};
use registrar_core::password::hash_password;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "testpass123";

pub fn setup_test_app(pool: PgPool) -> Router {
    let upload_dir = std::env::temp_dir().join(format!("registrar-test-{}", Uuid::new_v4()));
    let storage = StorageConfig::from_lookup(|key| match key {
        "UPLOAD_DIR" => Some(upload_dir.display().to_string()),
        _ => None,
    });

    let state = AppState::new(
        pool,
        JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry: 3600,
        },
        CorsConfig {
            allowed_origins: vec![],
        },
        storage,
        RegistrationConfig::default(),
    );
    init_router(state)
}

/// Sends a request and returns the status with the decoded JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

pub fn generate_unique_username() -> String {
    format!("user_{}", &Uuid::new_v4().simple().to_string()[..12])
}

pub fn profile_json(first_name: &str, last_name: &str) -> Value {
    json!({
        "first_name": first_name,
        "middle_name": null,
        "last_name": last_name,
        "date_of_birth": "2004-05-17",
        "gender": "F",
        "contact_number": "09171234567",
        "email": format!("{}@example.com", first_name.to_lowercase()),
        "address": "12 Mabini St, Quezon City",
        "guardian_name": "Lita Santos",
        "guardian_contact": "09170000000"
    })
}

pub struct TestStudent {
    pub token: String,
    pub user_id: String,
    /// Profile row ID
    pub student_id: String,
    /// Human-readable `YYYY-NNNN` ID
    pub student_number: String,
}

/// Registers a student with a profile through the API.
pub async fn register_student(app: &Router, first_name: &str) -> TestStudent {
    let username = generate_unique_username();
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": PASSWORD,
            "password_confirm": PASSWORD,
            "profile": profile_json(first_name, "Santos"),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

    TestStudent {
        token: body["access_token"].as_str().unwrap().to_string(),
        user_id: body["user"]["id"].as_str().unwrap().to_string(),
        student_id: body["student"]["id"].as_str().unwrap().to_string(),
        student_number: body["student"]["student_id"].as_str().unwrap().to_string(),
    }
}

pub struct TestStaff {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

/// Staff accounts are never self-registered; insert one directly and log in.
pub async fn create_staff(pool: &PgPool, app: &Router) -> TestStaff {
    let username = generate_unique_username();
    let user_id = Uuid::new_v4();
    let hashed = hash_password(PASSWORD).unwrap();

    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash, role)
        VALUES ($1, $2, $3, $4, 'staff')
        "#,
    )
    .bind(user_id)
    .bind(&username)
    .bind(format!("{}@example.com", username))
    .bind(hashed)
    .execute(pool)
    .await
    .unwrap();

    let token = login(app, &username, PASSWORD).await;
    TestStaff {
        token,
        user_id,
        username,
    }
}

pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

/// Creates a program as staff and returns its ID.
pub async fn create_program(app: &Router, staff_token: &str, code: &str, fee_cents: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/programs",
        Some(staff_token),
        Some(json!({
            "code": code,
            "name": format!("Program {}", code),
            "program_type": "undergraduate",
            "description": "Test program",
            "duration_years": 4,
            "tuition_fee_cents": fee_cents
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create program failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

/// Creates an active first-semester school year as staff and returns its ID.
pub async fn create_school_year(app: &Router, staff_token: &str, year_start: i32) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/school-years",
        Some(staff_token),
        Some(json!({
            "year_start": year_start,
            "year_end": year_start + 1,
            "semester": "1st",
            "enrollment_start": format!("{}-06-01", year_start),
            "enrollment_end": format!("{}-08-31", year_start)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create school year failed: {body}");
    body["id"].as_str().unwrap().to_string()
}

/// Student requests an enrollment for themselves; returns the response body.
pub async fn request_enrollment(
    app: &Router,
    token: &str,
    program_id: &str,
    school_year_id: &str,
) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/enrollments",
        Some(token),
        Some(json!({
            "program_id": program_id,
            "school_year_id": school_year_id,
            "year_level": 1
        })),
    )
    .await
}
