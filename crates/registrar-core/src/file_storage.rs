//! File storage for uploaded profile pictures.
//!
//! Handlers talk to the [`FileStorage`] trait so the local-disk backend can be
//! swapped for an object store without touching business logic.
//!
//! # Example
//!
//! ```ignore
//! use registrar_core::file_storage::{FileStorage, LocalFileStorage};
//! use std::path::PathBuf;
//!
//! let storage = LocalFileStorage::new(PathBuf::from("./uploads"), "/media".to_string());
//!
//! let key = storage.save("students/2024-0042.png", &bytes).await?;
//! let url = storage.get_url(&key)?;
//! storage.delete(&key).await?;
//! ```

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::fs;

pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Abstract trait for file storage backends.
pub trait FileStorage: Send + Sync {
    /// Save file content under `key` and return the key.
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String>;

    /// Delete a file by key. Missing files are not an error.
    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()>;

    /// Public URL for a stored key.
    fn get_url(&self, key: &str) -> Result<String, StorageError>;

    /// Reverse of [`FileStorage::get_url`]; `None` when the URL does not belong to this backend.
    fn key_from_url(&self, url: &str) -> Option<String>;

    /// Checks the MIME type and returns the file extension to store it under.
    fn extension_for(&self, content_type: &str) -> Result<&'static str, StorageError>;
}

/// Error type for file storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// File exceeds maximum allowed size.
    InvalidFileSize { max_bytes: usize },

    /// MIME type not allowed.
    InvalidMimeType {
        received: String,
        allowed: Vec<String>,
    },

    /// I/O error (file system or similar).
    IoError(std::io::Error),

    /// Invalid storage key format.
    InvalidKey(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFileSize { max_bytes } => {
                write!(f, "File exceeds maximum size of {} bytes", max_bytes)
            }
            Self::InvalidMimeType { received, allowed } => {
                write!(
                    f,
                    "MIME type '{}' not allowed. Allowed types: {}",
                    received,
                    allowed.join(", ")
                )
            }
            Self::IoError(e) => write!(f, "I/O error: {}", e),
            Self::InvalidKey(msg) => write!(f, "Invalid storage key: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

const IMAGE_TYPES: [(&str, &str); 3] = [
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
];

/// Local filesystem-based storage. Files are served back by a static file
/// service mounted at `base_url`.
#[derive(Clone, Debug)]
pub struct LocalFileStorage {
    base_dir: PathBuf,
    base_url: String,
    max_file_size: usize,
}

impl LocalFileStorage {
    pub fn new(base_dir: PathBuf, base_url: String) -> Self {
        Self::with_max_size(base_dir, base_url, 5 * 1024 * 1024)
    }

    pub fn with_max_size(base_dir: PathBuf, base_url: String, max_file_size: usize) -> Self {
        Self {
            base_dir,
            base_url,
            max_file_size,
        }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Rejects empty keys, path traversal, and anything outside `[A-Za-z0-9-_./]`.
    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") || key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Key must not be empty, contain '..', or start with '/'".to_string(),
            ));
        }

        if !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '/' || c == '.')
        {
            return Err(StorageError::InvalidKey(
                "Key contains invalid characters".to_string(),
            ));
        }

        Ok(())
    }
}

impl FileStorage for LocalFileStorage {
    fn save<'a>(&'a self, key: &'a str, content: &'a [u8]) -> StorageFuture<'a, String> {
        Box::pin(async move {
            Self::validate_key(key)?;

            if content.len() > self.max_file_size {
                return Err(StorageError::InvalidFileSize {
                    max_bytes: self.max_file_size,
                });
            }

            let file_path = self.base_dir.join(key);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).await?;
            }
            fs::write(&file_path, content).await?;

            Ok(key.to_string())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            Self::validate_key(key)?;

            match fs::remove_file(self.base_dir.join(key)).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn get_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/", self.base_url.trim_end_matches('/'));
        url.strip_prefix(&prefix)
            .filter(|key| Self::validate_key(key).is_ok())
            .map(str::to_string)
    }

    fn extension_for(&self, content_type: &str) -> Result<&'static str, StorageError> {
        IMAGE_TYPES
            .iter()
            .find(|(mime, _)| *mime == content_type)
            .map(|(_, ext)| *ext)
            .ok_or_else(|| StorageError::InvalidMimeType {
                received: content_type.to_string(),
                allowed: IMAGE_TYPES.iter().map(|(mime, _)| mime.to_string()).collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage() -> LocalFileStorage {
        LocalFileStorage::new(PathBuf::from("./uploads"), "/media".to_string())
    }

    #[test]
    fn test_validate_key_accepts_valid_keys() {
        assert!(LocalFileStorage::validate_key("students/2024-0042.png").is_ok());
        assert!(LocalFileStorage::validate_key("students/abc_123.webp").is_ok());
    }

    #[test]
    fn test_validate_key_rejects_path_traversal() {
        assert!(LocalFileStorage::validate_key("../../../etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("..\\windows\\system32").is_err());
    }

    #[test]
    fn test_validate_key_rejects_absolute_paths() {
        assert!(LocalFileStorage::validate_key("/etc/passwd").is_err());
        assert!(LocalFileStorage::validate_key("\\windows\\system32").is_err());
    }

    #[test]
    fn test_url_round_trip() {
        let storage = storage();
        let url = storage.get_url("students/2024-0042.png").unwrap();
        assert_eq!(url, "/media/students/2024-0042.png");
        assert_eq!(
            storage.key_from_url(&url).as_deref(),
            Some("students/2024-0042.png")
        );
    }

    #[test]
    fn test_get_url_handles_trailing_slash() {
        let storage = LocalFileStorage::new(
            PathBuf::from("./uploads"),
            "http://localhost:3000/media/".to_string(),
        );
        let url = storage.get_url("students/a.png").unwrap();
        assert_eq!(url, "http://localhost:3000/media/students/a.png");
    }

    #[test]
    fn test_key_from_foreign_url_is_none() {
        assert!(storage().key_from_url("https://cdn.example.com/a.png").is_none());
        assert!(storage().key_from_url("/media/../secret").is_none());
    }

    #[test]
    fn test_extension_for_images() {
        let storage = storage();
        assert_eq!(storage.extension_for("image/png").unwrap(), "png");
        assert_eq!(storage.extension_for("image/jpeg").unwrap(), "jpg");
        assert!(matches!(
            storage.extension_for("application/pdf"),
            Err(StorageError::InvalidMimeType { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_rejects_oversized_file() {
        let storage = LocalFileStorage::with_max_size(
            std::env::temp_dir().join("registrar-storage-test"),
            "/media".to_string(),
            4,
        );
        let result = storage.save("students/big.png", b"12345").await;
        assert!(matches!(
            result,
            Err(StorageError::InvalidFileSize { max_bytes: 4 })
        ));
    }

    #[tokio::test]
    async fn test_save_and_delete() {
        let dir = std::env::temp_dir().join(format!("registrar-{}", uuid::Uuid::new_v4()));
        let storage = LocalFileStorage::new(dir.clone(), "/media".to_string());

        let key = storage.save("students/pic.png", b"png-bytes").await.unwrap();
        assert!(dir.join(&key).exists());

        storage.delete(&key).await.unwrap();
        assert!(!dir.join(&key).exists());

        // deleting twice is fine
        storage.delete(&key).await.unwrap();
    }
}
