//! School years and semesters.
//!
//! A school year is unique per `(year_start, year_end, semester)` and sorts
//! newest first. The enrollment window dates are informational; enrollment
//! creation only checks `is_active`.

use crate::ids::SchoolYearId;
use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::serde::{deserialize_optional_bool, deserialize_optional_enum};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "semester")]
pub enum Semester {
    #[sqlx(rename = "1st")]
    #[serde(rename = "1st")]
    First,
    #[sqlx(rename = "2nd")]
    #[serde(rename = "2nd")]
    Second,
    #[sqlx(rename = "summer")]
    #[serde(rename = "summer")]
    Summer,
}

impl Semester {
    pub fn label(&self) -> &'static str {
        match self {
            Semester::First => "1st Semester",
            Semester::Second => "2nd Semester",
            Semester::Summer => "Summer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SchoolYear {
    pub id: SchoolYearId,
    pub year_start: i32,
    pub year_end: i32,
    pub semester: Semester,
    pub is_active: bool,
    pub enrollment_start: NaiveDate,
    pub enrollment_end: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl SchoolYear {
    pub fn label(&self) -> String {
        school_year_label(self.year_start, self.year_end, self.semester)
    }
}

/// `SY 2024-2025 (1st Semester)`
pub fn school_year_label(year_start: i32, year_end: i32, semester: Semester) -> String {
    format!("SY {}-{} ({})", year_start, year_end, semester.label())
}

/// School year as returned by the API, with its display label.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SchoolYearResponse {
    #[serde(flatten)]
    pub school_year: SchoolYear,
    #[schema(example = "SY 2024-2025 (1st Semester)")]
    pub label: String,
}

impl From<SchoolYear> for SchoolYearResponse {
    fn from(school_year: SchoolYear) -> Self {
        let label = school_year.label();
        Self { school_year, label }
    }
}

/// Cross-field rules shared by create and update.
pub fn check_school_year_dates(
    year_start: i32,
    year_end: i32,
    enrollment_start: NaiveDate,
    enrollment_end: NaiveDate,
) -> Result<(), &'static str> {
    if year_end <= year_start {
        return Err("year_end must be greater than year_start");
    }
    if enrollment_start > enrollment_end {
        return Err("enrollment_start must be on or before enrollment_end");
    }
    Ok(())
}

fn validate_create_dates(dto: &CreateSchoolYearDto) -> Result<(), ValidationError> {
    check_school_year_dates(
        dto.year_start,
        dto.year_end,
        dto.enrollment_start,
        dto.enrollment_end,
    )
    .map_err(|msg| ValidationError::new("school_year_dates").with_message(msg.into()))
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateSchoolYearDto {
    #[validate(range(min = 1900, max = 9999))]
    pub year_start: i32,
    #[validate(range(min = 1900, max = 9999))]
    pub year_end: i32,
    pub semester: Semester,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub enrollment_start: NaiveDate,
    pub enrollment_end: NaiveDate,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSchoolYearDto {
    #[validate(range(min = 1900, max = 9999))]
    pub year_start: Option<i32>,
    #[validate(range(min = 1900, max = 9999))]
    pub year_end: Option<i32>,
    pub semester: Option<Semester>,
    pub is_active: Option<bool>,
    pub enrollment_start: Option<NaiveDate>,
    pub enrollment_end: Option<NaiveDate>,
}

impl UpdateSchoolYearDto {
    /// Applies the update over `current` and checks the merged result.
    pub fn merged_dates_check(&self, current: &SchoolYear) -> Result<(), &'static str> {
        check_school_year_dates(
            self.year_start.unwrap_or(current.year_start),
            self.year_end.unwrap_or(current.year_end),
            self.enrollment_start.unwrap_or(current.enrollment_start),
            self.enrollment_end.unwrap_or(current.enrollment_end),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct SchoolYearFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_optional_enum")]
    pub semester: Option<Semester>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_dto() -> CreateSchoolYearDto {
        CreateSchoolYearDto {
            year_start: 2024,
            year_end: 2025,
            semester: Semester::First,
            is_active: true,
            enrollment_start: date(2024, 6, 1),
            enrollment_end: date(2024, 8, 15),
        }
    }

    fn school_year() -> SchoolYear {
        SchoolYear {
            id: SchoolYearId::new(),
            year_start: 2024,
            year_end: 2025,
            semester: Semester::Summer,
            is_active: true,
            enrollment_start: date(2025, 4, 1),
            enrollment_end: date(2025, 4, 30),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            school_year_label(2024, 2025, Semester::First),
            "SY 2024-2025 (1st Semester)"
        );
        assert_eq!(
            school_year_label(2024, 2025, Semester::Second),
            "SY 2024-2025 (2nd Semester)"
        );
        assert_eq!(school_year().label(), "SY 2024-2025 (Summer)");
    }

    #[test]
    fn test_semester_wire_format() {
        assert_eq!(serde_json::to_string(&Semester::First).unwrap(), r#""1st""#);
        let s: Semester = serde_json::from_str(r#""summer""#).unwrap();
        assert_eq!(s, Semester::Summer);
    }

    #[test]
    fn test_create_validation() {
        assert!(create_dto().validate().is_ok());

        let mut same_year = create_dto();
        same_year.year_end = 2024;
        assert!(same_year.validate().is_err());

        let mut window = create_dto();
        window.enrollment_end = date(2024, 5, 1);
        assert!(window.validate().is_err());

        let mut one_day = create_dto();
        one_day.enrollment_end = one_day.enrollment_start;
        assert!(one_day.validate().is_ok());
    }

    #[test]
    fn test_update_merges_before_checking() {
        let current = school_year();

        let ok = UpdateSchoolYearDto {
            year_end: Some(2026),
            ..Default::default()
        };
        assert!(ok.merged_dates_check(&current).is_ok());

        let bad = UpdateSchoolYearDto {
            year_start: Some(2025),
            ..Default::default()
        };
        assert!(bad.merged_dates_check(&current).is_err());

        let bad_window = UpdateSchoolYearDto {
            enrollment_start: Some(date(2025, 5, 1)),
            ..Default::default()
        };
        assert!(bad_window.merged_dates_check(&current).is_err());
    }

    #[test]
    fn test_response_includes_label() {
        let json = serde_json::to_value(SchoolYearResponse::from(school_year())).unwrap();
        assert_eq!(json["label"], "SY 2024-2025 (Summer)");
        assert_eq!(json["semester"], "summer");
    }
}
