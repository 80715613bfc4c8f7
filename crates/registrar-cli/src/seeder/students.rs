//! Student seeding: an account plus a profile per student.
//!
//! Student IDs are drawn without replacement from the suffixes still free
//! for the current year, so a batch never collides with itself or with
//! students registered through the API.

use chrono::{Datelike, NaiveDate, Utc};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, StreetName};
use fake::faker::name::en::{FirstName, LastName, Name};
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use registrar_models::identifiers::{STUDENT_SUFFIX_SPACE, format_student_id};
use registrar_models::ids::{StudentId, UserId};
use registrar_models::{Gender, Role};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashSet;
use std::time::Instant;

use super::models::StudentSeed;
use super::{SEED_USERNAME_PREFIX, SeedResult};

const GENDERS: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

fn phone_number(rng: &mut impl Rng) -> String {
    format!("09{:09}", rng.gen_range(0..1_000_000_000u32))
}

fn birth_date(rng: &mut impl Rng) -> NaiveDate {
    let year = rng.gen_range(1995..=2007);
    let ordinal = rng.gen_range(1..=365);
    NaiveDate::from_yo_opt(year, ordinal).unwrap_or_default()
}

/// Lowercase ASCII letters only, so usernames pass validation.
fn slug(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Picks `count` unused suffixes for `year` at random.
pub fn pick_student_numbers(
    year: i32,
    taken: &HashSet<String>,
    count: usize,
) -> Option<Vec<String>> {
    let mut free: Vec<String> = (0..STUDENT_SUFFIX_SPACE)
        .map(|suffix| format_student_id(year, suffix))
        .filter(|id| !taken.contains(id))
        .collect();
    if free.len() < count {
        return None;
    }
    free.shuffle(&mut rand::thread_rng());
    free.truncate(count);
    Some(free)
}

/// Generates student data in parallel using Rayon.
pub fn generate_students(student_numbers: Vec<String>) -> Vec<StudentSeed> {
    student_numbers
        .into_par_iter()
        .map(|student_number| {
            let mut rng = rand::thread_rng();
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let username = format!(
                "{}{}.{}.{}",
                SEED_USERNAME_PREFIX,
                slug(&first_name),
                slug(&last_name),
                student_number
            );
            let address = format!(
                "{} {}, {}",
                BuildingNumber().fake::<String>(),
                StreetName().fake::<String>(),
                CityName().fake::<String>()
            );

            StudentSeed {
                user_id: UserId::new(),
                student_id: StudentId::new(),
                email: format!("{}@example.com", username),
                username,
                student_number,
                first_name,
                last_name,
                date_of_birth: birth_date(&mut rng),
                gender: GENDERS[rng.gen_range(0..GENDERS.len())],
                contact_number: phone_number(&mut rng),
                address,
                guardian_name: Name().fake(),
                guardian_contact: phone_number(&mut rng),
            }
        })
        .collect()
}

pub async fn seed_students(
    db: &PgPool,
    count: usize,
    password_hash: &str,
) -> SeedResult<Vec<StudentId>> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", count);

    let year = Utc::now().year();
    let taken: HashSet<String> =
        sqlx::query_scalar::<_, String>("SELECT student_id FROM students WHERE student_id LIKE $1")
            .bind(format!("{}-%", year))
            .fetch_all(db)
            .await?
            .into_iter()
            .collect();

    let student_numbers = pick_student_numbers(year, &taken, count).ok_or_else(|| {
        format!(
            "Only {} student IDs left for {}",
            STUDENT_SUFFIX_SPACE as usize - taken.len(),
            year
        )
    })?;

    let students = generate_students(student_numbers);

    let mut tx = db.begin().await?;

    // 11 params per profile
    const BATCH_SIZE: usize = 2000;
    for chunk in students.chunks(BATCH_SIZE) {
        insert_users_chunk(&mut tx, chunk, password_hash).await?;
        insert_profiles_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        students.len(),
        start_time.elapsed()
    );

    Ok(students.into_iter().map(|s| s.student_id).collect())
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
    password_hash: &str,
) -> SeedResult<()> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO users (id, username, email, password_hash, role) ");
    query.push_values(students, |mut row, student| {
        row.push_bind(student.user_id)
            .push_bind(&student.username)
            .push_bind(&student.email)
            .push_bind(password_hash)
            .push_bind(Role::Student);
    });
    query.build().execute(&mut **tx).await?;
    Ok(())
}

async fn insert_profiles_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> SeedResult<()> {
    let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO students (id, user_id, student_id, first_name, last_name, date_of_birth, \
         gender, contact_number, email, address, guardian_name, guardian_contact) ",
    );
    query.push_values(students, |mut row, student| {
        row.push_bind(student.student_id)
            .push_bind(student.user_id)
            .push_bind(&student.student_number)
            .push_bind(&student.first_name)
            .push_bind(&student.last_name)
            .push_bind(student.date_of_birth)
            .push_bind(student.gender)
            .push_bind(&student.contact_number)
            .push_bind(&student.email)
            .push_bind(&student.address)
            .push_bind(&student.guardian_name)
            .push_bind(&student.guardian_contact);
    });
    query.build().execute(&mut **tx).await?;
    Ok(())
}

/// Deletes seeded accounts; profiles, enrollments and notifications cascade.
pub async fn clear_students(db: &PgPool) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded students...");

    let result = sqlx::query("DELETE FROM users WHERE username LIKE $1")
        .bind(format!("{}%", SEED_USERNAME_PREFIX))
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} accounts in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use registrar_models::identifiers::is_valid_student_id;

    #[test]
    fn test_pick_skips_taken_numbers() {
        let taken: HashSet<String> = (0..9_990u16).map(|s| format_student_id(2024, s)).collect();
        let picked = pick_student_numbers(2024, &taken, 10).unwrap();
        assert_eq!(picked.len(), 10);
        assert!(picked.iter().all(|id| !taken.contains(id)));
        assert!(pick_student_numbers(2024, &taken, 11).is_none());
    }

    #[test]
    fn test_generated_students_are_valid() {
        let numbers = pick_student_numbers(2024, &HashSet::new(), 20).unwrap();
        let students = generate_students(numbers);
        assert_eq!(students.len(), 20);

        let usernames: HashSet<_> = students.iter().map(|s| s.username.as_str()).collect();
        assert_eq!(usernames.len(), 20);

        for student in &students {
            assert!(is_valid_student_id(&student.student_number));
            assert!(student.username.starts_with(SEED_USERNAME_PREFIX));
            assert!(
                student
                    .username
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            );
            assert!(student.contact_number.len() <= 20);
            assert!(student.date_of_birth < Utc::now().date_naive());
        }
    }
}
