//! Helpers shared by the feature services.

pub mod db_errors;
pub mod query;
