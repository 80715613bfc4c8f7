use std::sync::Arc;

use registrar_config::{CorsConfig, JwtConfig, RegistrationConfig, StorageConfig};
use registrar_core::file_storage::{FileStorage, LocalFileStorage};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub storage_config: StorageConfig,
    pub registration: RegistrationConfig,
    pub storage: Arc<dyn FileStorage>,
}

impl AppState {
    /// Wires a state around an existing pool, storing uploads on local disk.
    pub fn new(
        db: PgPool,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        storage_config: StorageConfig,
        registration: RegistrationConfig,
    ) -> Self {
        let storage = LocalFileStorage::with_max_size(
            storage_config.upload_dir.clone(),
            storage_config.media_base_url.clone(),
            storage_config.max_bytes,
        );

        Self {
            db,
            jwt_config,
            cors_config,
            storage_config,
            registration,
            storage: Arc::new(storage),
        }
    }
}

pub fn init_app_state(db: PgPool) -> AppState {
    AppState::new(
        db,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
        StorageConfig::from_env(),
        RegistrationConfig::from_env(),
    )
}
