//! School year seeding.

use chrono::NaiveDate;
use registrar_models::Semester;
use registrar_models::ids::SchoolYearId;
use sqlx::PgPool;
use std::time::Instant;

use super::SeedResult;
use super::models::SchoolYearSeed;

/// Both regular semesters for each year starting at `first_year`, with the
/// usual enrollment windows (June to August, then November to January).
pub fn generate_school_years(first_year: i32, years: usize) -> Vec<SchoolYearSeed> {
    (0..years as i32)
        .flat_map(|offset| {
            let year = first_year + offset;
            [
                (Semester::First, ymd(year, 6, 1), ymd(year, 8, 31)),
                (Semester::Second, ymd(year, 11, 1), ymd(year + 1, 1, 15)),
            ]
            .into_iter()
            .filter_map(move |(semester, start, end)| {
                Some(SchoolYearSeed {
                    year_start: year,
                    semester,
                    enrollment_start: start?,
                    enrollment_end: end?,
                })
            })
        })
        .collect()
}

fn ymd(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Upserts active school years on their term, so re-running is harmless.
pub async fn seed_school_years(
    db: &PgPool,
    first_year: i32,
    years: usize,
) -> SeedResult<Vec<SchoolYearId>> {
    let start_time = Instant::now();
    let seeds = generate_school_years(first_year, years);
    println!("📅 Seeding {} school years...", seeds.len());

    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(seeds.len());

    for seed in &seeds {
        let id: SchoolYearId = sqlx::query_scalar(
            r#"
            INSERT INTO school_years (id, year_start, year_end, semester, is_active,
                enrollment_start, enrollment_end)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6)
            ON CONFLICT (year_start, year_end, semester)
                DO UPDATE SET is_active = TRUE
            RETURNING id
            "#,
        )
        .bind(SchoolYearId::new())
        .bind(seed.year_start)
        .bind(seed.year_start + 1)
        .bind(seed.semester)
        .bind(seed.enrollment_start)
        .bind(seed.enrollment_end)
        .fetch_one(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;

    println!(
        "   ✓ Upserted {} school years in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}
