use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use registrar_cli::seeder::{self, EnrollmentMix, SeedConfig};
use registrar_config::DatabaseConfig;
use registrar_core::password::hash_password;
use registrar_models::{Role, UserId};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "registrar-cli")]
#[command(about = "Registrar CLI - Administrative tools for Registrar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a staff account (staff cannot self-register)
    CreateStaff {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed programs, school years, students, and enrollments
    Seed {
        /// Number of students to create
        #[arg(short = 's', long, default_value = "100")]
        students: usize,

        /// Number of programs to create
        #[arg(long, default_value = "8")]
        programs: usize,

        /// First school year to create
        #[arg(long, default_value = "2024")]
        first_year: i32,

        /// Consecutive school years to create, two semesters each
        #[arg(long, default_value = "2")]
        years: usize,

        /// Enrollments per student
        #[arg(long, default_value = "1")]
        enrollments: usize,

        /// Percentage of enrollments seeded as approved
        #[arg(long, default_value = "50")]
        approved: u8,

        /// Percentage of enrollments seeded as rejected
        #[arg(long, default_value = "10")]
        rejected: u8,
    },
    /// Seed only programs
    SeedPrograms {
        #[arg(short = 'n', long, default_value = "8")]
        programs: usize,
    },
    /// Seed only school years
    SeedSchoolYears {
        #[arg(long, default_value = "2024")]
        first_year: i32,

        #[arg(long, default_value = "2")]
        years: usize,
    },
    /// Seed only students (accounts and profiles)
    SeedStudents {
        #[arg(short = 's', long, default_value = "100")]
        students: usize,
    },
    /// Clear all seeded data (keeps school years and real accounts)
    ClearSeed,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn connect() -> CliResult<PgPool> {
    let config = DatabaseConfig::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.url)
        .await
        .map_err(|e| format!("Failed to connect to database: {}", e))?;
    Ok(pool)
}

async fn run(command: Commands) -> CliResult<()> {
    let pool = connect().await?;

    match command {
        Commands::CreateStaff {
            username,
            email,
            password,
        } => handle_create_staff(&pool, username, email, password).await,
        Commands::Seed {
            students,
            programs,
            first_year,
            years,
            enrollments,
            approved,
            rejected,
        } => {
            let config = SeedConfig::new(students)
                .with_programs(programs)
                .with_school_years(first_year, years)
                .with_enrollment_mix(EnrollmentMix {
                    enrollments_per_student: enrollments,
                    approved_percent: approved,
                    rejected_percent: rejected,
                });
            seeder::seed_all(&pool, config).await
        }
        Commands::SeedPrograms { programs } => {
            let ids = seeder::seed_programs_only(&pool, programs).await?;
            println!("✅ Created {} programs", ids.len());
            Ok(())
        }
        Commands::SeedSchoolYears { first_year, years } => {
            let ids = seeder::seed_school_years_only(&pool, first_year, years).await?;
            println!("✅ Upserted {} school years", ids.len());
            Ok(())
        }
        Commands::SeedStudents { students } => {
            let ids = seeder::seed_students_only(&pool, students).await?;
            println!("✅ Created {} students", ids.len());
            println!("   Password: {}", seeder::SEED_PASSWORD);
            Ok(())
        }
        Commands::ClearSeed => seeder::clear_all(&pool).await,
    }
}

async fn handle_create_staff(
    pool: &PgPool,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> CliResult<()> {
    let username = match username {
        Some(username) => username,
        None => Input::new().with_prompt("Username").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    if password.len() < 8 {
        return Err("Password must be at least 8 characters".into());
    }

    create_staff(pool, username.trim(), email.trim(), &password).await?;

    println!("\n✅ Staff account created successfully!");
    println!("   Username: {}", username.trim());
    println!("   Email: {}", email.trim());
    Ok(())
}

async fn create_staff(db: &PgPool, username: &str, email: &str, password: &str) -> CliResult<UserId> {
    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (id, username, email, password_hash, role)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT (username) DO NOTHING
         RETURNING id",
    )
    .bind(UserId::new())
    .bind(username)
    .bind(email)
    .bind(&hashed_password)
    .bind(Role::Staff)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this username already exists".into())
}
