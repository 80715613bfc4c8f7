//! Enrollment seeding.
//!
//! Enrollment IDs come from the same per-year counter the API uses: the
//! whole batch reserves a block of sequence numbers in one statement.

use chrono::{Datelike, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use registrar_models::identifiers::{enrollment_id_pattern, format_enrollment_id};
use registrar_models::ids::{EnrollmentId, ProgramId, SchoolYearId, StudentId};
use registrar_models::{EnrollmentStatus, UserId};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::{EnrollmentMix, EnrollmentSeed};
use super::{SEED_USERNAME_PREFIX, SeedResult};

const RESERVE_SEQUENCE: &str = r#"
    INSERT INTO enrollment_sequences (year, last_value)
    SELECT $1, COALESCE(MAX(CAST(SUBSTRING(enrollment_id FROM 10) AS INTEGER)), 0) + $3
    FROM enrollments
    WHERE enrollment_id LIKE $2
    ON CONFLICT (year) DO UPDATE SET last_value = enrollment_sequences.last_value + $3
    RETURNING last_value
"#;

/// Up to `mix.enrollments_per_student` distinct (program, school year)
/// pairs per student.
pub fn generate_enrollments(
    student_ids: &[StudentId],
    programs: &[(ProgramId, i64)],
    school_year_ids: &[SchoolYearId],
    mix: EnrollmentMix,
) -> Vec<EnrollmentSeed> {
    let pairs: Vec<(ProgramId, i64, SchoolYearId)> = programs
        .iter()
        .flat_map(|&(program_id, fee)| {
            school_year_ids
                .iter()
                .map(move |&school_year_id| (program_id, fee, school_year_id))
        })
        .collect();

    student_ids
        .par_iter()
        .flat_map_iter(|&student_id| {
            let mut rng = rand::thread_rng();
            let chosen: Vec<_> = pairs
                .choose_multiple(&mut rng, mix.enrollments_per_student)
                .copied()
                .collect();
            chosen
                .into_iter()
                .map(|(program_id, total_fee_cents, school_year_id)| EnrollmentSeed {
                    student_id,
                    program_id,
                    school_year_id,
                    year_level: rng.gen_range(1..=4),
                    status: mix.status_for(rng.gen_range(0..100)),
                    total_fee_cents,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Seeds enrollments and returns how many were created. Reviewed ones are
/// attributed to any staff account, or left without a reviewer if there is
/// none.
pub async fn seed_enrollments(
    db: &PgPool,
    student_ids: &[StudentId],
    program_ids: &[ProgramId],
    school_year_ids: &[SchoolYearId],
    mix: EnrollmentMix,
) -> SeedResult<usize> {
    let start_time = Instant::now();

    let programs: Vec<(ProgramId, i64)> =
        sqlx::query_as("SELECT id, tuition_fee_cents FROM programs WHERE id = ANY($1)")
            .bind(
                program_ids
                    .iter()
                    .map(|id| id.into_inner())
                    .collect::<Vec<_>>(),
            )
            .fetch_all(db)
            .await?;

    let enrollments = generate_enrollments(student_ids, &programs, school_year_ids, mix);
    println!("📝 Seeding {} enrollments...", enrollments.len());
    if enrollments.is_empty() {
        return Ok(0);
    }

    let reviewer: Option<UserId> =
        sqlx::query_scalar("SELECT id FROM users WHERE role = 'staff' ORDER BY created_at LIMIT 1")
            .fetch_optional(db)
            .await?;

    let year = Utc::now().year();
    let mut tx = db.begin().await?;

    let last: i32 = sqlx::query_scalar(RESERVE_SEQUENCE)
        .bind(year)
        .bind(enrollment_id_pattern(year))
        .bind(enrollments.len() as i32)
        .fetch_one(&mut *tx)
        .await?;
    let first = last - enrollments.len() as i32 + 1;

    let mut rows = Vec::with_capacity(enrollments.len());
    for (offset, enrollment) in enrollments.iter().enumerate() {
        let enrollment_id = format_enrollment_id(year, first + offset as i32)?;
        rows.push((EnrollmentId::new(), enrollment_id, enrollment));
    }

    // 10 params per enrollment
    const BATCH_SIZE: usize = 2000;
    for chunk in rows.chunks(BATCH_SIZE) {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO enrollments (id, enrollment_id, student_id, program_id, school_year_id, \
             year_level, status, total_fee_cents, reviewed_by, reviewed_at) ",
        );
        query.push_values(chunk, |mut row, (id, enrollment_id, enrollment)| {
            let reviewed = enrollment.status != EnrollmentStatus::Pending;
            row.push_bind(*id)
                .push_bind(enrollment_id)
                .push_bind(enrollment.student_id)
                .push_bind(enrollment.program_id)
                .push_bind(enrollment.school_year_id)
                .push_bind(enrollment.year_level)
                .push_bind(enrollment.status)
                .push_bind(enrollment.total_fee_cents)
                .push_bind(reviewer.filter(|_| reviewed))
                .push_bind(reviewed.then(Utc::now));
        });
        query.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} enrollments in {:?}",
        rows.len(),
        start_time.elapsed()
    );

    Ok(rows.len())
}

/// Deletes enrollments that belong to seeded students.
pub async fn clear_enrollments(db: &PgPool) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded enrollments...");

    let result = sqlx::query(
        r#"
        DELETE FROM enrollments e
        USING students s, users u
        WHERE e.student_id = s.id AND s.user_id = u.id AND u.username LIKE $1
        "#,
    )
    .bind(format!("{}%", SEED_USERNAME_PREFIX))
    .execute(db)
    .await?
    .rows_affected();

    println!(
        "   ✓ Deleted {} enrollments in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_pairs_are_distinct_per_student() {
        let students: Vec<StudentId> = (0..50).map(|_| StudentId::new()).collect();
        let programs = vec![(ProgramId::new(), 100), (ProgramId::new(), 200)];
        let years = vec![SchoolYearId::new(), SchoolYearId::new()];
        let mix = EnrollmentMix {
            enrollments_per_student: 3,
            ..Default::default()
        };

        let enrollments = generate_enrollments(&students, &programs, &years, mix);
        assert_eq!(enrollments.len(), 150);

        let keys: HashSet<_> = enrollments
            .iter()
            .map(|e| (e.student_id, e.program_id, e.school_year_id))
            .collect();
        assert_eq!(keys.len(), enrollments.len());
        assert!(enrollments.iter().all(|e| (1..=5).contains(&e.year_level)));
    }

    #[test]
    fn test_fewer_pairs_than_requested() {
        let students = vec![StudentId::new()];
        let programs = vec![(ProgramId::new(), 100)];
        let years = vec![SchoolYearId::new()];
        let mix = EnrollmentMix {
            enrollments_per_student: 5,
            ..Default::default()
        };
        assert_eq!(generate_enrollments(&students, &programs, &years, mix).len(), 1);
    }
}
