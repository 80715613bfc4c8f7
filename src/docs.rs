use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use registrar_models::auth::{
    AuthResponse, LoginRequest, MeResponse, MessageResponse, RegisterRequest,
};
use registrar_models::dashboard::{Dashboard, StaffDashboard, StudentDashboard};
use registrar_models::enrollments::{
    ApproveEnrollmentDto, CreateEnrollmentDto, Enrollment, EnrollmentDetails, EnrollmentStatus,
    EnrollmentView, RejectEnrollmentDto, UpdateEnrollmentDto,
};
use registrar_models::notifications::{
    MarkReadResponse, Notification, NotificationListResponse, NotificationType,
};
use registrar_models::programs::{
    CreateProgramDto, Program, ProgramStatus, ProgramType, ProgramWithStats, UpdateProgramDto,
};
use registrar_models::school_years::{
    CreateSchoolYearDto, SchoolYearResponse, Semester, UpdateSchoolYearDto,
};
use registrar_models::students::{Gender, Student, StudentProfileDto};
use registrar_models::users::{Role, User};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::profile::controller::PictureUpload;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::me,
        crate::modules::profile::controller::get_profile,
        crate::modules::profile::controller::save_profile,
        crate::modules::profile::controller::upload_picture,
        crate::modules::programs::controller::list_programs,
        crate::modules::programs::controller::create_program,
        crate::modules::programs::controller::get_program,
        crate::modules::programs::controller::update_program,
        crate::modules::programs::controller::delete_program,
        crate::modules::school_years::controller::list_school_years,
        crate::modules::school_years::controller::create_school_year,
        crate::modules::school_years::controller::get_school_year,
        crate::modules::school_years::controller::update_school_year,
        crate::modules::school_years::controller::delete_school_year,
        crate::modules::students::controller::list_students,
        crate::modules::students::controller::get_student,
        crate::modules::enrollments::controller::list_enrollments,
        crate::modules::enrollments::controller::create_enrollment,
        crate::modules::enrollments::controller::get_enrollment,
        crate::modules::enrollments::controller::update_enrollment,
        crate::modules::enrollments::controller::delete_enrollment,
        crate::modules::enrollments::controller::approve_enrollment,
        crate::modules::enrollments::controller::reject_enrollment,
        crate::modules::notifications::controller::list_notifications,
        crate::modules::notifications::controller::mark_notification_read,
        crate::modules::notifications::controller::mark_all_notifications_read,
        crate::modules::dashboard::controller::get_dashboard,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            MeResponse,
            User,
            Role,
            Student,
            Gender,
            StudentProfileDto,
            PictureUpload,
            Program,
            ProgramType,
            ProgramStatus,
            ProgramWithStats,
            CreateProgramDto,
            UpdateProgramDto,
            SchoolYearResponse,
            Semester,
            CreateSchoolYearDto,
            UpdateSchoolYearDto,
            Enrollment,
            EnrollmentDetails,
            EnrollmentStatus,
            EnrollmentView,
            CreateEnrollmentDto,
            UpdateEnrollmentDto,
            ApproveEnrollmentDto,
            RejectEnrollmentDto,
            Notification,
            NotificationType,
            NotificationListResponse,
            MarkReadResponse,
            Dashboard,
            StaffDashboard,
            StudentDashboard,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and session endpoints"),
        (name = "Profile", description = "The caller's own student profile"),
        (name = "Programs", description = "Academic program catalogue"),
        (name = "School Years", description = "School years and semesters"),
        (name = "Students", description = "Student directory for staff"),
        (name = "Enrollments", description = "Enrollment requests and their review"),
        (name = "Notifications", description = "Per-user enrollment notifications"),
        (name = "Dashboard", description = "Role-specific summaries")
    ),
    info(
        title = "Registrar API",
        version = "0.1.0",
        description = "Student enrollment and registrar service built with Rust, Axum, and PostgreSQL.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
