//! # Registrar Auth
//!
//! Access-token claims and the functions that sign and verify them.
//!
//! Tokens carry the user's role name and the permission strings that role
//! expands to, so request handlers authorize without a database round trip.
//!
//! ```ignore
//! use registrar_auth::{create_access_token, verify_token};
//! use registrar_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "jdoe", "student", permissions, &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
