mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use common::{
    PASSWORD, create_staff, generate_unique_username, login, profile_json, register_student,
    send, setup_test_app,
};
use registrar_models::identifiers::is_valid_student_id;
use serde_json::{Value, json};
use sqlx::PgPool;
use std::ops::Range;

#[sqlx::test(migrations = "./migrations")]
async fn test_register_creates_account_and_profile(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let username = generate_unique_username();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": "ana@example.com",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
            "profile": profile_json("Ana", "Santos"),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].as_str().is_some());
    assert_eq!(body["user"]["username"], username);
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password_hash").is_none());

    let student_id = body["student"]["student_id"].as_str().unwrap();
    assert!(is_valid_student_id(student_id), "bad student id {student_id}");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_username_conflicts(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let username = generate_unique_username();
    let payload = json!({
        "username": username,
        "email": "ana@example.com",
        "password": PASSWORD,
        "password_confirm": PASSWORD,
        "profile": profile_json("Ana", "Santos"),
    });

    let (status, _) = send(&app, "POST", "/api/auth/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "POST", "/api/auth/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("username"));

    // The failed attempt must not leave a second profile behind.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_password_mismatch(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": generate_unique_username(),
            "email": "ana@example.com",
            "password": PASSWORD,
            "password_confirm": "something-else",
            "profile": profile_json("Ana", "Santos"),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("Passwords do not match"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_missing_profile(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": generate_unique_username(),
            "email": "ana@example.com",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("profile"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_and_me(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], staff.username);
    assert_eq!(body["user"]["role"], "staff");
    assert!(body["student"].is_null());
    let permissions: Vec<&str> = body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert!(permissions.contains(&"enrollments:review"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_invalid_credentials(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": staff.username, "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid username or password");

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_registered_student_can_log_in(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let student = register_student(&app, "Ana").await;

    let username: String = sqlx::query_scalar("SELECT username FROM users WHERE id = $1::uuid")
        .bind(&student.user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let token = login(&app, &username, PASSWORD).await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student"]["student_id"], student.student_number);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_me_requires_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let student = register_student(&app, "Ana").await;

    let (status, body) = send(&app, "POST", "/api/auth/logout", Some(&student.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}

/// Gives every suffix in `suffixes` of `year` to a placeholder student.
async fn occupy_student_ids(pool: &PgPool, year: i32, suffixes: Range<i32>) {
    sqlx::query(
        r#"
        WITH filler AS (
            INSERT INTO users (id, username, email, password_hash, role)
            SELECT gen_random_uuid(), 'filler_' || n, 'filler@example.com', 'x', 'student'::user_role
            FROM generate_series($2::int, $3::int - 1) AS n
            RETURNING id, username
        )
        INSERT INTO students (id, user_id, student_id, first_name, last_name, date_of_birth,
            gender, contact_number, email, address, guardian_name, guardian_contact)
        SELECT gen_random_uuid(), id,
            $1::text || '-' || LPAD(SUBSTRING(username FROM 8), 4, '0'),
            'Filler', 'Student', DATE '2004-01-01', 'O'::gender, '09170000000',
            'filler@example.com', 'Somewhere', 'Guardian', '09170000000'
        FROM filler
        "#,
    )
    .bind(year.to_string())
    .bind(suffixes.start)
    .bind(suffixes.end)
    .execute(pool)
    .await
    .unwrap();
}

async fn register(app: &axum::Router, username: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "email": "ana@example.com",
            "password": PASSWORD,
            "password_confirm": PASSWORD,
            "profile": profile_json("Ana", "Santos"),
        })),
    )
    .await
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_fails_when_student_ids_run_out(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    occupy_student_ids(&pool, Utc::now().year(), 0..10_000).await;
    let username = generate_unique_username();

    let (status, body) = register(&app, &username).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{body}");
    assert_eq!(
        body["error"],
        "Could not assign a unique student ID after 25 attempts. Please try again later."
    );

    // The account is rolled back with the profile.
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1")
        .bind(&username)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 0);

    let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(students, 10_000);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_retries_past_taken_student_ids(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let year = Utc::now().year();
    occupy_student_ids(&pool, year, 0..5_000).await;

    let (status, body) = register(&app, &generate_unique_username()).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let student_id = body["student"]["student_id"].as_str().unwrap();
    let (prefix, suffix) = student_id.split_once('-').unwrap();
    assert_eq!(prefix, year.to_string());
    assert!(suffix.parse::<u32>().unwrap() >= 5_000, "reused {student_id}");
}
