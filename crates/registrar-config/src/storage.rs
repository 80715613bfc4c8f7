//! Upload storage settings.
//!
//! - `UPLOAD_DIR`: directory profile pictures are written to (default `storage/uploads`)
//! - `MEDIA_BASE_URL`: public URL prefix the directory is served under (default `/media`)
//! - `UPLOAD_MAX_BYTES`: upload size limit (default 5 MiB)

use std::path::PathBuf;

use crate::{env_lookup, parse_or};

pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub media_base_url: String,
    pub max_bytes: usize,
}

impl StorageConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("storage/uploads")),
            media_base_url: lookup("MEDIA_BASE_URL").unwrap_or_else(|| "/media".to_string()),
            max_bytes: parse_or(&lookup, "UPLOAD_MAX_BYTES", DEFAULT_UPLOAD_MAX_BYTES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map_lookup;

    #[test]
    fn test_defaults() {
        let config = StorageConfig::from_lookup(map_lookup(&[]));
        assert_eq!(config.upload_dir, PathBuf::from("storage/uploads"));
        assert_eq!(config.media_base_url, "/media");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = StorageConfig::from_lookup(map_lookup(&[
            ("UPLOAD_DIR", "/var/lib/registrar"),
            ("MEDIA_BASE_URL", "https://cdn.example.com/media"),
            ("UPLOAD_MAX_BYTES", "1024"),
        ]));
        assert_eq!(config.upload_dir, PathBuf::from("/var/lib/registrar"));
        assert_eq!(config.media_base_url, "https://cdn.example.com/media");
        assert_eq!(config.max_bytes, 1024);
    }
}
