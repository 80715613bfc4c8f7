use anyhow::{Context, anyhow};
use chrono::{Datelike, Utc};
use rand::Rng;
use registrar_core::AppError;
use registrar_models::identifiers::{STUDENT_SUFFIX_SPACE, format_student_id};
use registrar_models::students::{StudentFilterParams, StudentProfileDto};
use registrar_models::{IdError, Student, StudentId, UserId};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};

use crate::metrics;
use crate::utils::db_errors::map_write_error;
use crate::utils::query::contains_pattern;

pub(crate) const STUDENT_COLUMNS: &str = "id, user_id, student_id, first_name, middle_name, \
    last_name, date_of_birth, gender, contact_number, email, address, guardian_name, \
    guardian_contact, profile_picture, created_at, updated_at";

fn draw_suffix() -> u16 {
    rand::thread_rng().gen_range(0..STUDENT_SUFFIX_SPACE)
}

pub struct StudentService;

impl StudentService {
    /// Creates the profile for `user_id` and assigns it a `YYYY-NNNN` student
    /// ID. Each candidate is inserted with `ON CONFLICT (student_id) DO
    /// NOTHING`, so the uniqueness check and the assignment are one
    /// statement. Gives up after `max_attempts` collisions.
    #[instrument(skip(conn, dto))]
    pub async fn create_profile(
        conn: &mut PgConnection,
        user_id: UserId,
        dto: &StudentProfileDto,
        max_attempts: u32,
    ) -> Result<Student, AppError> {
        let sql = format!(
            r#"
            INSERT INTO students (id, user_id, student_id, first_name, middle_name, last_name,
                date_of_birth, gender, contact_number, email, address, guardian_name,
                guardian_contact)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (student_id) DO NOTHING
            RETURNING {STUDENT_COLUMNS}
            "#
        );
        let year = Utc::now().year();

        for attempt in 1..=max_attempts {
            let candidate = format_student_id(year, draw_suffix());

            let inserted = sqlx::query_as::<_, Student>(&sql)
                .bind(StudentId::new())
                .bind(user_id)
                .bind(&candidate)
                .bind(dto.first_name.trim())
                .bind(dto.normalized_middle_name())
                .bind(dto.last_name.trim())
                .bind(dto.date_of_birth)
                .bind(dto.gender)
                .bind(dto.contact_number.trim())
                .bind(dto.email.trim())
                .bind(dto.address.trim())
                .bind(dto.guardian_name.trim())
                .bind(dto.guardian_contact.trim())
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| map_write_error(e, "Failed to create student profile"))?;

            match inserted {
                Some(student) => {
                    info!(student_id = %student.student_id, attempt, "Student profile created");
                    metrics::track_student_registered();
                    return Ok(student);
                }
                None => {
                    warn!(candidate = %candidate, attempt, "Student ID collision");
                    metrics::track_id_collision("student_id");
                }
            }
        }

        warn!(attempts = max_attempts, "Student ID keyspace exhausted");
        Err(IdError::ExhaustedKeyspace {
            attempts: max_attempts,
        }
        .into_app_error())
    }

    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        id: StudentId,
        dto: &StudentProfileDto,
    ) -> Result<Student, AppError> {
        let sql = format!(
            r#"
            UPDATE students
            SET first_name = $1, middle_name = $2, last_name = $3, date_of_birth = $4,
                gender = $5, contact_number = $6, email = $7, address = $8,
                guardian_name = $9, guardian_contact = $10, updated_at = NOW()
            WHERE id = $11
            RETURNING {STUDENT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(dto.first_name.trim())
            .bind(dto.normalized_middle_name())
            .bind(dto.last_name.trim())
            .bind(dto.date_of_birth)
            .bind(dto.gender)
            .bind(dto.contact_number.trim())
            .bind(dto.email.trim())
            .bind(dto.address.trim())
            .bind(dto.guardian_name.trim())
            .bind(dto.guardian_contact.trim())
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to update student profile")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db))]
    pub async fn set_profile_picture(
        db: &PgPool,
        id: StudentId,
        url: &str,
    ) -> Result<Student, AppError> {
        let sql = format!(
            "UPDATE students SET profile_picture = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING {STUDENT_COLUMNS}"
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(url)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to update profile picture")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db))]
    pub async fn find_by_user(db: &PgPool, user_id: UserId) -> Result<Option<Student>, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE user_id = $1");

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student profile")
            .map_err(AppError::database)?;

        Ok(student)
    }

    #[instrument(skip(db))]
    pub async fn get_student(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch student")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("Student not found")))
    }

    #[instrument(skip(db))]
    pub async fn list_students(
        db: &PgPool,
        filters: &StudentFilterParams,
    ) -> Result<Vec<Student>, AppError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE TRUE"
        ));

        if let Some(search) = &filters.search {
            let pattern = contains_pattern(search);
            query
                .push(" AND (student_id ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(gender) = filters.gender {
            query.push(" AND gender = ").push_bind(gender);
        }

        query.push(" ORDER BY last_name, first_name");

        let students = query
            .build_query_as::<Student>()
            .fetch_all(db)
            .await
            .context("Failed to fetch students")
            .map_err(AppError::database)?;

        Ok(students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_models::identifiers::is_valid_student_id;

    #[test]
    fn test_drawn_suffixes_format_as_valid_student_ids() {
        for _ in 0..1000 {
            let suffix = draw_suffix();
            assert!(suffix < STUDENT_SUFFIX_SPACE);
            assert!(is_valid_student_id(&format_student_id(2024, suffix)));
        }
    }
}
