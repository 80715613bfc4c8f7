//! # Registrar Config
//!
//! Configuration types for the Registrar API, loaded from environment variables.
//!
//! - [`jwt`]: JWT signing secret and token lifetime
//! - [`cors`]: allowed CORS origins
//! - [`database`]: connection string and pool size
//! - [`server`]: bind address, metrics port and observability toggle
//! - [`storage`]: upload directory and public media URL
//! - [`registration`]: student ID generation limits
//!
//! Every config exposes `from_env()` plus `from_lookup()`, which takes any
//! `Fn(&str) -> Option<String>` so tests can feed values without touching the
//! process environment.
//!
//! # Example
//!
//! ```ignore
//! use registrar_config::{JwtConfig, StorageConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let storage = StorageConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod registration;
pub mod server;
pub mod storage;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use registration::RegistrationConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;

/// Reads `key` through `lookup` and parses it, falling back to `default` when
/// the variable is missing or does not parse.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
pub(crate) fn map_lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}
