//! Data models for database seeding configuration.

use chrono::NaiveDate;
use registrar_models::ids::{ProgramId, SchoolYearId, StudentId, UserId};
use registrar_models::{EnrollmentStatus, Gender, ProgramType, Semester};

pub struct ProgramSeed {
    pub id: ProgramId,
    pub code: String,
    pub name: String,
    pub program_type: ProgramType,
    pub description: String,
    pub duration_years: i32,
    pub tuition_fee_cents: i64,
}

pub struct SchoolYearSeed {
    pub year_start: i32,
    pub semester: Semester,
    pub enrollment_start: NaiveDate,
    pub enrollment_end: NaiveDate,
}

/// A student account together with its profile.
pub struct StudentSeed {
    pub user_id: UserId,
    pub student_id: StudentId,
    pub username: String,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub guardian_name: String,
    pub guardian_contact: String,
}

pub struct EnrollmentSeed {
    pub student_id: StudentId,
    pub program_id: ProgramId,
    pub school_year_id: SchoolYearId,
    pub year_level: i16,
    pub status: EnrollmentStatus,
    pub total_fee_cents: i64,
}

/// Share of seeded enrollments left in each status, in percent. Whatever
/// is not approved or rejected stays pending.
#[derive(Clone, Copy, Debug)]
pub struct EnrollmentMix {
    pub enrollments_per_student: usize,
    pub approved_percent: u8,
    pub rejected_percent: u8,
}

impl Default for EnrollmentMix {
    fn default() -> Self {
        Self {
            enrollments_per_student: 1,
            approved_percent: 50,
            rejected_percent: 10,
        }
    }
}

impl EnrollmentMix {
    /// Maps a roll in `0..100` to a status.
    pub fn status_for(&self, roll: u8) -> EnrollmentStatus {
        let approved = self.approved_percent.min(100);
        let rejected = self.rejected_percent.min(100 - approved);
        if roll < approved {
            EnrollmentStatus::Approved
        } else if roll < approved + rejected {
            EnrollmentStatus::Rejected
        } else {
            EnrollmentStatus::Pending
        }
    }
}

/// Complete configuration for database seeding.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub students: usize,
    pub programs: usize,
    /// First `year_start` of the seeded school years
    pub first_year: i32,
    /// Consecutive years to seed, each with both semesters
    pub years: usize,
    pub enrollment_mix: EnrollmentMix,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            students: 100,
            programs: 8,
            first_year: 2024,
            years: 2,
            enrollment_mix: EnrollmentMix::default(),
        }
    }
}

impl SeedConfig {
    /// Creates a seed configuration for `students` students with defaults
    /// for everything else.
    pub fn new(students: usize) -> Self {
        Self {
            students,
            ..Default::default()
        }
    }

    pub fn with_programs(mut self, programs: usize) -> Self {
        self.programs = programs;
        self
    }

    pub fn with_school_years(mut self, first_year: i32, years: usize) -> Self {
        self.first_year = first_year;
        self.years = years;
        self
    }

    pub fn with_enrollment_mix(mut self, mix: EnrollmentMix) -> Self {
        self.enrollment_mix = mix;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mix() {
        let mix = EnrollmentMix {
            enrollments_per_student: 1,
            approved_percent: 50,
            rejected_percent: 10,
        };
        assert_eq!(mix.status_for(0), EnrollmentStatus::Approved);
        assert_eq!(mix.status_for(49), EnrollmentStatus::Approved);
        assert_eq!(mix.status_for(50), EnrollmentStatus::Rejected);
        assert_eq!(mix.status_for(59), EnrollmentStatus::Rejected);
        assert_eq!(mix.status_for(60), EnrollmentStatus::Pending);
        assert_eq!(mix.status_for(99), EnrollmentStatus::Pending);
    }

    #[test]
    fn test_status_mix_clamps_overflowing_percentages() {
        let mix = EnrollmentMix {
            enrollments_per_student: 1,
            approved_percent: 90,
            rejected_percent: 90,
        };
        assert_eq!(mix.status_for(95), EnrollmentStatus::Rejected);
        assert_eq!(mix.status_for(99), EnrollmentStatus::Rejected);
    }

    #[test]
    fn test_builder() {
        let config = SeedConfig::new(10)
            .with_programs(3)
            .with_school_years(2030, 1);
        assert_eq!(config.students, 10);
        assert_eq!(config.programs, 3);
        assert_eq!(config.first_year, 2030);
        assert_eq!(config.years, 1);
    }
}
