//! Student profiles.
//!
//! A profile is one-to-one with a user account and carries the
//! human-readable student ID assigned at creation. Default ordering is last
//! name, then first name.

use crate::ids::{StudentId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use registrar_core::serde::{deserialize_optional_enum, deserialize_optional_string};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "gender")]
pub enum Gender {
    #[sqlx(rename = "M")]
    #[serde(rename = "M")]
    Male,
    #[sqlx(rename = "F")]
    #[serde(rename = "F")]
    Female,
    #[sqlx(rename = "O")]
    #[serde(rename = "O")]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserId,
    /// Human-readable `YYYY-NNNN` identifier
    #[schema(example = "2024-7731")]
    pub student_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub guardian_name: String,
    pub guardian_contact: String,
    /// Public URL of the uploaded picture
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// `first [middle] last`
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, self.middle_name.as_deref(), &self.last_name)
    }
}

pub fn full_name(first: &str, middle: Option<&str>, last: &str) -> String {
    match middle.map(str::trim).filter(|m| !m.is_empty()) {
        Some(middle) => format!("{first} {middle} {last}"),
        None => format!("{first} {last}"),
    }
}

fn validate_past_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < Utc::now().date_naive() {
        Ok(())
    } else {
        Err(ValidationError::new("date_of_birth")
            .with_message("Date of birth must be in the past".into()))
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("This field may not be blank".into()))
    } else {
        Ok(())
    }
}

/// Editable profile fields, used both at registration and for `PUT /profile`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct StudentProfileDto {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub middle_name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "validate_past_date"))]
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    #[validate(length(min = 1, max = 20))]
    #[schema(example = "+63 912 345 6789")]
    pub contact_number: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1), custom(function = "validate_not_blank"))]
    pub address: String,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub guardian_name: String,
    #[validate(length(min = 1, max = 20))]
    pub guardian_contact: String,
}

impl StudentProfileDto {
    /// Middle name with blanks collapsed to `None`.
    pub fn normalized_middle_name(&self) -> Option<String> {
        self.middle_name
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct StudentFilterParams {
    /// Case-insensitive match on student ID, first/last name or email
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_enum")]
    pub gender: Option<Gender>,
}
