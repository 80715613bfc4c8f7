//! Academic programs. Default ordering is by name.

use crate::ids::ProgramId;
use chrono::{DateTime, Utc};
use registrar_core::serde::{deserialize_optional_enum, deserialize_optional_string};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "program_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    Undergraduate,
    Graduate,
    Vocational,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Program {
    pub id: ProgramId,
    #[schema(example = "BSCS")]
    pub code: String,
    pub name: String,
    pub program_type: ProgramType,
    pub description: String,
    pub duration_years: i32,
    /// Tuition in integer cents
    pub tuition_fee_cents: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ProgramWithStats {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub program: Program,
    pub enrollment_count: i64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProgramDto {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub program_type: ProgramType,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, max = 10))]
    pub duration_years: i32,
    #[validate(range(min = 0))]
    pub tuition_fee_cents: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProgramDto {
    #[validate(length(min = 1, max = 20))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub program_type: Option<ProgramType>,
    pub description: Option<String>,
    #[validate(range(min = 1, max = 10))]
    pub duration_years: Option<i32>,
    #[validate(range(min = 0))]
    pub tuition_fee_cents: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Active,
    Inactive,
}

impl ProgramStatus {
    pub fn is_active(self) -> bool {
        self == ProgramStatus::Active
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct ProgramFilterParams {
    /// Case-insensitive match on code, name or description
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub search: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_optional_enum")]
    pub program_type: Option<ProgramType>,
    #[serde(default, deserialize_with = "deserialize_optional_enum")]
    pub status: Option<ProgramStatus>,
}
