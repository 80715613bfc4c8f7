use anyhow::anyhow;
use registrar_core::AppError;
use registrar_db::{is_unique_violation, unique_constraint};
use registrar_models::WorkflowError;

const DUPLICATE_ENROLLMENT: &str = "enrollments_student_program_school_year_key";

/// Conflict message naming the entity behind a unique constraint.
fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_key") => "A user with this username already exists",
        Some("programs_code_key") => "A program with this code already exists",
        Some("school_years_term_key") => "This school year and semester already exists",
        Some("students_user_id_key") => "This account already has a student profile",
        _ => "A database conflict occurred. Please try again.",
    }
}

/// Maps a failed write to a response: unique violations become 409 with a
/// message naming the entity, anything else is a database error.
pub fn map_write_error(err: sqlx::Error, context: &'static str) -> AppError {
    if !is_unique_violation(&err) {
        return AppError::database(anyhow::Error::from(err).context(context));
    }

    let constraint = unique_constraint(&err);
    tracing::warn!(constraint = ?constraint, "Unique constraint violated");

    if constraint == Some(DUPLICATE_ENROLLMENT) {
        return WorkflowError::DuplicateEnrollment.into_app_error();
    }
    AppError::conflict(anyhow!(conflict_message(constraint)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_conflict_messages_name_the_entity() {
        assert_eq!(
            conflict_message(Some("programs_code_key")),
            "A program with this code already exists"
        );
        assert_eq!(
            conflict_message(Some("users_username_key")),
            "A user with this username already exists"
        );
        assert_eq!(
            conflict_message(Some("something_else")),
            "A database conflict occurred. Please try again."
        );
        assert_eq!(
            conflict_message(None),
            "A database conflict occurred. Please try again."
        );
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = map_write_error(sqlx::Error::RowNotFound, "Failed to insert program");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
