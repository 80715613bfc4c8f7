mod common;

use axum::http::StatusCode;
use common::{
    create_program, create_school_year, create_staff, register_student, send, setup_test_app,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
async fn test_program_crud(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;

    let id = create_program(&app, &staff.token, "BSCS", 2_500_000).await;

    let (status, body) = send(&app, "GET", &format!("/api/programs/{id}"), Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], "BSCS");
    assert_eq!(body["enrollment_count"], 0);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/programs/{id}"),
        Some(&staff.token),
        Some(json!({ "name": "BS Computer Science", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "BS Computer Science");
    assert_eq!(body["code"], "BSCS");
    assert_eq!(body["is_active"], false);

    let (status, _) = send(&app, "DELETE", &format!("/api/programs/{id}"), Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/programs/{id}"), Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_program_code_is_unique(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;
    create_program(&app, &staff.token, "BSIT", 100).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/programs",
        Some(&staff.token),
        Some(json!({
            "code": "BSIT",
            "name": "Another",
            "program_type": "undergraduate",
            "duration_years": 4,
            "tuition_fee_cents": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A program with this code already exists");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_program_filters(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;
    create_program(&app, &staff.token, "BSCS", 100).await;
    let nursing = create_program(&app, &staff.token, "BSN", 100).await;
    send(
        &app,
        "PUT",
        &format!("/api/programs/{nursing}"),
        Some(&staff.token),
        Some(json!({ "is_active": false, "program_type": "vocational" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/programs?status=active", Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = body.as_array().unwrap().iter().map(|p| p["code"].as_str().unwrap()).collect();
    assert_eq!(codes, vec!["BSCS"]);

    let (_, body) = send(&app, "GET", "/api/programs?type=vocational", Some(&staff.token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["code"], "BSN");

    // Wildcards in the search term match literally.
    let (_, body) = send(&app, "GET", "/api/programs?search=%25", Some(&staff.token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = send(&app, "GET", "/api/programs?search=bscs&status=", Some(&staff.token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_students_cannot_manage_catalog(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let student = register_student(&app, "Ana").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/programs",
        Some(&student.token),
        Some(json!({
            "code": "BSCS",
            "name": "BS Computer Science",
            "program_type": "undergraduate",
            "duration_years": 4,
            "tuition_fee_cents": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("programs:manage"));

    let (status, _) = send(&app, "GET", "/api/programs", Some(&student.token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/students", Some(&student.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_school_year_crud(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;

    let id = create_school_year(&app, &staff.token, 2024).await;

    let (status, body) = send(&app, "GET", &format!("/api/school-years/{id}"), Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "SY 2024-2025 (1st Semester)");
    assert_eq!(body["semester"], "1st");

    // The merged result is checked, not just the submitted fields.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/school-years/{id}"),
        Some(&staff.token),
        Some(json!({ "year_end": 2023 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/school-years/{id}"),
        Some(&staff.token),
        Some(json!({ "semester": "2nd", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "SY 2024-2025 (2nd Semester)");

    let (_, body) = send(&app, "GET", "/api/school-years?is_active=true", Some(&staff.token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &format!("/api/school-years/{id}"), Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_school_year_rejects_bad_dates(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/school-years",
        Some(&staff.token),
        Some(json!({
            "year_start": 2024,
            "year_end": 2024,
            "semester": "1st",
            "enrollment_start": "2024-06-01",
            "enrollment_end": "2024-08-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("year_end"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_school_year_term_is_unique(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;
    create_school_year(&app, &staff.token, 2024).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/school-years",
        Some(&staff.token),
        Some(json!({
            "year_start": 2024,
            "year_end": 2025,
            "semester": "1st",
            "enrollment_start": "2024-06-01",
            "enrollment_end": "2024-08-31"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_student_directory(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let staff = create_staff(&pool, &app).await;
    let ana = register_student(&app, "Ana").await;
    register_student(&app, "Bea").await;

    let (status, body) = send(&app, "GET", "/api/students", Some(&staff.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/students?search={}", ana.student_number),
        Some(&staff.token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["first_name"], "Ana");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/students/{}", ana.student_id),
        Some(&staff.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["student_id"], ana.student_number);
}
