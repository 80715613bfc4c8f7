use anyhow::{Context, anyhow};
use registrar_core::AppError;
use registrar_core::file_storage::{FileStorage, StorageError};
use registrar_models::students::StudentProfileDto;
use registrar_models::{Student, UserId, WorkflowError};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::modules::students::service::StudentService;

pub struct ProfileService;

impl ProfileService {
    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: UserId) -> Result<Student, AppError> {
        StudentService::find_by_user(db, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Student profile not found")))
    }

    /// Updates the caller's profile, or creates it (with a fresh student ID)
    /// when the account has none yet. The flag is `true` on creation.
    #[instrument(skip(db, dto))]
    pub async fn save_profile(
        db: &PgPool,
        user_id: UserId,
        dto: &StudentProfileDto,
        max_attempts: u32,
    ) -> Result<(Student, bool), AppError> {
        if let Some(existing) = StudentService::find_by_user(db, user_id).await? {
            let student = StudentService::update_profile(db, existing.id, dto).await?;
            info!(student_id = %student.student_id, "Student profile updated");
            return Ok((student, false));
        }

        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;
        let student = StudentService::create_profile(&mut conn, user_id, dto, max_attempts).await?;
        Ok((student, true))
    }

    /// Stores a new picture and points the profile at it. The previous file
    /// is removed once the profile no longer references it.
    #[instrument(skip(db, storage, content))]
    pub async fn replace_picture(
        db: &PgPool,
        storage: &dyn FileStorage,
        user_id: UserId,
        content_type: &str,
        content: &[u8],
    ) -> Result<Student, AppError> {
        let student = StudentService::find_by_user(db, user_id)
            .await?
            .ok_or_else(|| WorkflowError::ProfileRequired.into_app_error())?;

        let extension = storage.extension_for(content_type).map_err(storage_error)?;
        let key = format!(
            "students/{}-{}.{}",
            student.student_id,
            uuid::Uuid::new_v4().simple(),
            extension
        );

        storage.save(&key, content).await.map_err(storage_error)?;
        let url = storage.get_url(&key).map_err(storage_error)?;

        let updated = match StudentService::set_profile_picture(db, student.id, &url).await {
            Ok(updated) => updated,
            Err(err) => {
                if let Err(cleanup) = storage.delete(&key).await {
                    warn!(key = %key, error = %cleanup, "Failed to remove orphaned upload");
                }
                return Err(err);
            }
        };

        if let Some(old_key) = student
            .profile_picture
            .as_deref()
            .and_then(|old| storage.key_from_url(old))
        {
            if let Err(err) = storage.delete(&old_key).await {
                warn!(key = %old_key, error = %err, "Failed to remove previous profile picture");
            }
        }

        info!(student_id = %updated.student_id, key = %key, "Profile picture replaced");
        Ok(updated)
    }
}

fn storage_error(err: StorageError) -> AppError {
    match err {
        StorageError::InvalidFileSize { .. } | StorageError::InvalidMimeType { .. } => {
            AppError::unprocessable(err)
        }
        StorageError::InvalidKey(_) => AppError::bad_request(err),
        StorageError::IoError(_) => AppError::internal(err),
    }
}
