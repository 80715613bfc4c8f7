//! Fake data for local development.
//!
//! Seeded rows are recognisable so they can be cleared without touching
//! real data: program codes start with [`SEED_PROGRAM_PREFIX`] and account
//! usernames with [`SEED_USERNAME_PREFIX`]. School years are upserted on
//! their term and never cleared.

mod enrollments;
mod models;
mod programs;
mod school_years;
mod students;

use std::time::Instant;

use registrar_core::password::hash_password;
use registrar_models::ids::{ProgramId, SchoolYearId, StudentId};
use sqlx::PgPool;

pub use enrollments::{clear_enrollments, seed_enrollments};
pub use models::{EnrollmentMix, SeedConfig};
pub use programs::{clear_programs, seed_programs};
pub use school_years::seed_school_years;
pub use students::{clear_students, seed_students};

pub const SEED_PROGRAM_PREFIX: &str = "SEED-";
pub const SEED_USERNAME_PREFIX: &str = "seed_";
/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "password123";

pub type SeedResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Seeds programs, school years, students and their enrollments.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> SeedResult<()> {
    let start_time = Instant::now();
    println!("🌱 Seeding database...\n");

    let program_ids = seed_programs(db, config.programs).await?;
    let school_year_ids = seed_school_years(db, config.first_year, config.years).await?;

    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.error.to_string())?;
    let student_ids = seed_students(db, config.students, &password_hash).await?;

    let enrollments = seed_enrollments(
        db,
        &student_ids,
        &program_ids,
        &school_year_ids,
        config.enrollment_mix,
    )
    .await?;

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!("   Programs:     {}", program_ids.len());
    println!("   School years: {}", school_year_ids.len());
    println!("   Students:     {}", student_ids.len());
    println!("   Enrollments:  {}", enrollments);
    println!("   Password for all seeded accounts: {}", SEED_PASSWORD);

    Ok(())
}

pub async fn seed_programs_only(db: &PgPool, count: usize) -> SeedResult<Vec<ProgramId>> {
    seed_programs(db, count).await
}

pub async fn seed_school_years_only(
    db: &PgPool,
    first_year: i32,
    years: usize,
) -> SeedResult<Vec<SchoolYearId>> {
    seed_school_years(db, first_year, years).await
}

pub async fn seed_students_only(db: &PgPool, count: usize) -> SeedResult<Vec<StudentId>> {
    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.error.to_string())?;
    seed_students(db, count, &password_hash).await
}

/// Removes seeded accounts and programs. Enrollments and notifications that
/// reference them go with them.
pub async fn clear_all(db: &PgPool) -> SeedResult<()> {
    let start_time = Instant::now();
    println!("🧹 Clearing seeded data...\n");

    clear_enrollments(db).await?;
    clear_students(db).await?;
    clear_programs(db).await?;

    println!("\n✅ Cleared seeded data in {:?}", start_time.elapsed());
    Ok(())
}
