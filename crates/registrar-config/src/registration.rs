use crate::{env_lookup, parse_or};

/// Limits for student ID assignment at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Random suffixes tried before giving up with a keyspace error.
    pub student_id_max_attempts: u32,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            student_id_max_attempts: 25,
        }
    }
}

impl RegistrationConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let attempts = parse_or(&lookup, "STUDENT_ID_MAX_ATTEMPTS", 25u32);
        Self {
            // zero attempts would make every registration fail
            student_id_max_attempts: attempts.max(1),
        }
    }
}
