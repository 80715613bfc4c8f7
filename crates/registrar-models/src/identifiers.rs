//! Human-readable identifiers.
//!
//! - Student IDs are `YYYY-NNNN`: the registration year plus a random
//!   four-digit suffix.
//! - Enrollment IDs are `ENR-YYYY-NNNNN`: the creation year plus a per-year
//!   sequence number, zero padded to five digits so IDs sort lexicographically.
//!
//! Allocation itself needs the database and lives in the API crate; this
//! module owns the formats and the errors.

use registrar_core::AppError;
use thiserror::Error;

/// Number of distinct student ID suffixes per year.
pub const STUDENT_SUFFIX_SPACE: u16 = 10_000;

/// Highest enrollment sequence number that fits the five-digit format.
pub const ENROLLMENT_SEQUENCE_MAX: i32 = 99_999;

const ENROLLMENT_PREFIX: &str = "ENR";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error(
        "Could not assign a unique student ID after {attempts} attempts. Please try again later."
    )]
    ExhaustedKeyspace { attempts: u32 },

    #[error("Enrollment ID sequence for {year} is exhausted")]
    SequenceExhausted { year: i32 },

    #[error("Malformed identifier '{0}'")]
    Malformed(String),
}

impl IdError {
    pub fn into_app_error(self) -> AppError {
        match self {
            IdError::ExhaustedKeyspace { .. } | IdError::SequenceExhausted { .. } => {
                AppError::unavailable(self)
            }
            IdError::Malformed(_) => AppError::bad_request(self),
        }
    }
}

pub fn format_student_id(year: i32, suffix: u16) -> String {
    format!("{year}-{suffix:04}")
}

/// `^\d{4}-\d{4}$`
pub fn is_valid_student_id(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 9
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

/// Formats `ENR-{year}-{n:05}`; `n` must be in `1..=99_999`.
pub fn format_enrollment_id(year: i32, n: i32) -> Result<String, IdError> {
    if n > ENROLLMENT_SEQUENCE_MAX {
        return Err(IdError::SequenceExhausted { year });
    }
    if n < 1 {
        return Err(IdError::Malformed(format!("{ENROLLMENT_PREFIX}-{year}-{n}")));
    }
    Ok(format!("{ENROLLMENT_PREFIX}-{year}-{n:05}"))
}

/// `LIKE` pattern matching every enrollment ID of `year`.
pub fn enrollment_id_pattern(year: i32) -> String {
    format!("{ENROLLMENT_PREFIX}-{year}-%")
}

/// Splits an enrollment ID into `(year, sequence)`.
pub fn parse_enrollment_id(value: &str) -> Result<(i32, i32), IdError> {
    let malformed = || IdError::Malformed(value.to_string());

    let mut parts = value.split('-');
    let (Some(prefix), Some(year), Some(seq), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(malformed());
    };

    if prefix != ENROLLMENT_PREFIX
        || year.len() != 4
        || seq.len() != 5
        || !year.bytes().chain(seq.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }

    let year = year.parse().map_err(|_| malformed())?;
    let seq: i32 = seq.parse().map_err(|_| malformed())?;
    if seq == 0 {
        return Err(malformed());
    }
    Ok((year, seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_student_id_pads_suffix() {
        assert_eq!(format_student_id(2024, 7731), "2024-7731");
        assert_eq!(format_student_id(2024, 7), "2024-0007");
        assert_eq!(format_student_id(2025, 0), "2025-0000");
    }

    #[test]
    fn test_formatted_student_ids_are_valid() {
        for suffix in [0, 1, 42, 999, 9999] {
            assert!(is_valid_student_id(&format_student_id(2024, suffix)));
        }
    }

    #[test]
    fn test_is_valid_student_id_rejects_bad_shapes() {
        for bad in ["", "2024-123", "2024-12345", "24-1234", "2024_1234", "abcd-1234", "2024-12a4"] {
            assert!(!is_valid_student_id(bad), "{bad} should be invalid");
        }
    }

    #[test]
    fn test_format_enrollment_id() {
        assert_eq!(format_enrollment_id(2024, 1).unwrap(), "ENR-2024-00001");
        assert_eq!(format_enrollment_id(2024, 12345).unwrap(), "ENR-2024-12345");
        assert_eq!(format_enrollment_id(2024, 99_999).unwrap(), "ENR-2024-99999");
    }

    #[test]
    fn test_format_enrollment_id_overflow() {
        assert_eq!(
            format_enrollment_id(2024, 100_000),
            Err(IdError::SequenceExhausted { year: 2024 })
        );
        assert!(matches!(
            format_enrollment_id(2024, 0),
            Err(IdError::Malformed(_))
        ));
    }

    #[test]
    fn test_enrollment_ids_sort_in_sequence_order() {
        let mut ids: Vec<String> = [10, 2, 100, 1]
            .iter()
            .map(|n| format_enrollment_id(2024, *n).unwrap())
            .collect();
        ids.sort();
        assert_eq!(
            ids,
            ["ENR-2024-00001", "ENR-2024-00002", "ENR-2024-00010", "ENR-2024-00100"]
        );
    }

    #[test]
    fn test_parse_enrollment_id() {
        assert_eq!(parse_enrollment_id("ENR-2024-00042").unwrap(), (2024, 42));
        for bad in [
            "ENR-2024-42",
            "ENX-2024-00042",
            "ENR-2024-00042-1",
            "ENR-24-00042",
            "ENR-2024-0004a",
            "ENR-2024-00000",
            "",
        ] {
            assert!(parse_enrollment_id(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_pattern_matches_prefix() {
        assert_eq!(enrollment_id_pattern(2031), "ENR-2031-%");
    }

    #[test]
    fn test_error_statuses() {
        let err = IdError::ExhaustedKeyspace { attempts: 25 }.into_app_error();
        assert_eq!(err.status, 503);
        assert!(err.error.to_string().contains("25 attempts"));

        let err = IdError::SequenceExhausted { year: 2024 }.into_app_error();
        assert_eq!(err.status, 503);

        let err = IdError::Malformed("x".into()).into_app_error();
        assert_eq!(err.status, 400);
    }
}
