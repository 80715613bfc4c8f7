//! # Registrar Core
//!
//! Core types, errors, and utilities for the Registrar API.
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`password`]: Password hashing and verification
//! - [`permissions`]: Permission names granted by each role
//! - [`file_storage`]: Storage backends for uploaded files
//! - [`serde`]: Deserialization helpers for query strings
//!
//! # Example
//!
//! ```ignore
//! use registrar_core::errors::AppError;
//! use registrar_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Program not found"));
//! let hash = hash_password("secure_password")?;
//! ```

pub mod errors;
pub mod file_storage;
pub mod password;
pub mod permissions;
pub mod serde;

pub use errors::AppError;
pub use password::{hash_password, verify_password};
