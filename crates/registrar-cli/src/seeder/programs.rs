//! Program seeding.

use fake::Fake;
use fake::faker::company::en::Industry;
use rand::Rng;
use rayon::prelude::*;
use registrar_models::ProgramType;
use registrar_models::ids::ProgramId;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Instant;

use super::models::ProgramSeed;
use super::{SEED_PROGRAM_PREFIX, SeedResult};

const PROGRAM_TYPES: [(ProgramType, &str, i32); 3] = [
    (ProgramType::Undergraduate, "Bachelor of Science in", 4),
    (ProgramType::Graduate, "Master of Science in", 2),
    (ProgramType::Vocational, "Certificate in", 1),
];

/// Generates program data in parallel using Rayon. Codes continue from
/// `offset` so repeated runs do not collide.
pub fn generate_programs(count: usize, offset: usize) -> Vec<ProgramSeed> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = rand::thread_rng();
            let (program_type, title, duration_years) = PROGRAM_TYPES[i % PROGRAM_TYPES.len()];
            let field: String = Industry().fake();
            // Whole pesos, between 15k and 80k.
            let tuition_fee_cents = rng.gen_range(15_000..=80_000) * 100;

            ProgramSeed {
                id: ProgramId::new(),
                code: format!("{}{:04}", SEED_PROGRAM_PREFIX, offset + i + 1),
                name: format!("{} {}", title, field),
                program_type,
                description: format!("Seeded {} program", program_type_label(program_type)),
                duration_years,
                tuition_fee_cents,
            }
        })
        .collect()
}

fn program_type_label(program_type: ProgramType) -> &'static str {
    match program_type {
        ProgramType::Undergraduate => "undergraduate",
        ProgramType::Graduate => "graduate",
        ProgramType::Vocational => "vocational",
    }
}

/// Seeds active programs into the database.
pub async fn seed_programs(db: &PgPool, count: usize) -> SeedResult<Vec<ProgramId>> {
    let start_time = Instant::now();
    println!("📚 Seeding {} programs...", count);

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM programs WHERE code LIKE $1")
        .bind(format!("{}%", SEED_PROGRAM_PREFIX))
        .fetch_one(db)
        .await?;

    let programs = generate_programs(count, existing as usize);
    let mut tx = db.begin().await?;

    // 7 params per program
    const BATCH_SIZE: usize = 1000;
    for chunk in programs.chunks(BATCH_SIZE) {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO programs (id, code, name, program_type, description, duration_years, tuition_fee_cents) ",
        );
        query.push_values(chunk, |mut row, program| {
            row.push_bind(program.id)
                .push_bind(&program.code)
                .push_bind(&program.name)
                .push_bind(program.program_type)
                .push_bind(&program.description)
                .push_bind(program.duration_years)
                .push_bind(program.tuition_fee_cents);
        });
        query.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} programs in {:?}",
        programs.len(),
        start_time.elapsed()
    );

    Ok(programs.into_iter().map(|p| p.id).collect())
}

/// Deletes seeded programs; their enrollments cascade.
pub async fn clear_programs(db: &PgPool) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded programs...");

    let result = sqlx::query("DELETE FROM programs WHERE code LIKE $1")
        .bind(format!("{}%", SEED_PROGRAM_PREFIX))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} programs in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_programs_are_valid() {
        let programs = generate_programs(9, 3);
        assert_eq!(programs.len(), 9);
        for program in &programs {
            assert!(program.code.starts_with(SEED_PROGRAM_PREFIX));
            assert!(program.code.len() <= 20);
            assert!((1..=10).contains(&program.duration_years));
            assert!(program.tuition_fee_cents >= 0);
        }
        assert_eq!(programs[0].code, "SEED-0004");
        let mut codes: Vec<_> = programs.iter().map(|p| p.code.clone()).collect();
        codes.dedup();
        assert_eq!(codes.len(), 9);
    }
}
