use anyhow::{Context, anyhow};
use registrar_auth::create_access_token;
use registrar_config::{JwtConfig, RegistrationConfig};
use registrar_core::{AppError, hash_password, verify_password};
use registrar_models::auth::{AuthResponse, LoginRequest, RegisterRequest};
use registrar_models::{Role, User, UserId};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::metrics;
use crate::modules::students::service::StudentService;
use crate::utils::db_errors::map_write_error;

pub(crate) const USER_COLUMNS: &str = "id, username, email, role, created_at, updated_at";

const TOKEN_TYPE: &str = "Bearer";

#[derive(sqlx::FromRow)]
struct UserWithPassword {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

pub struct AuthService;

impl AuthService {
    /// Creates the account and its student profile in one transaction and
    /// signs the caller in.
    #[instrument(skip(db, dto, jwt_config, registration), fields(username = %dto.username))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
        registration: &RegistrationConfig,
    ) -> Result<AuthResponse, AppError> {
        let password_hash = hash_password(&dto.password)?;

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(UserId::new())
        .bind(dto.username.trim())
        .bind(dto.email.trim())
        .bind(&password_hash)
        .bind(Role::Student)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to create user"))?;

        let student = StudentService::create_profile(
            &mut *tx,
            user.id,
            &dto.profile,
            registration.student_id_max_attempts,
        )
        .await?;

        tx.commit()
            .await
            .context("Failed to commit registration")
            .map_err(AppError::database)?;

        info!(user_id = %user.id, student_id = %student.student_id, "Student registered");
        Self::issue(user, Some(student), jwt_config)
    }

    #[instrument(skip(db, dto, jwt_config), fields(username = %dto.username))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let invalid = || AppError::unauthorized("Invalid username or password".to_string());

        let record = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = $1"
        ))
        .bind(dto.username.trim())
        .fetch_optional(db)
        .await
        .context("Failed to fetch user")
        .map_err(AppError::database)?;

        let Some(record) = record else {
            warn!("Login attempt for unknown username");
            metrics::track_login(false);
            return Err(invalid());
        };

        if !verify_password(&dto.password, &record.password_hash)? {
            warn!(user_id = %record.user.id, "Login attempt with wrong password");
            metrics::track_login(false);
            return Err(invalid());
        }

        metrics::track_login(true);
        let student = StudentService::find_by_user(db, record.user.id).await?;
        Self::issue(record.user, student, jwt_config)
    }

    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user")
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    fn issue(
        user: User,
        student: Option<registrar_models::Student>,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let access_token = create_access_token(
            user.id.into_inner(),
            &user.username,
            user.role.as_str(),
            user.role.permissions(),
            jwt_config,
        )?;

        Ok(AuthResponse {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: jwt_config.access_token_expiry,
            user,
            student,
        })
    }
}
