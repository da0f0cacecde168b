use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::{LoginRequest, LoginResponse, MessageResponse};
use crate::modules::classes::model::{
    Class, ClassDetail, ClassStatus, ClassSummary, ClassWithCount, CreateClassDto,
    DeletionSummary, UpdateClassDto,
};
use crate::modules::contacts::model::{Contact, ContactType, CreateContactDto};
use crate::modules::health::controller::HealthResponse;
use crate::modules::students::model::{
    CreateStudentDto, Student, StudentDetail, StudentWithContacts, UpdateStudentDto,
};
use crate::modules::users::model::{CreateUserDto, UpdateUserDto, User, UserRole};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::health_check,
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::get_profile,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::classes::controller::create_class,
        crate::modules::classes::controller::get_classes,
        crate::modules::classes::controller::get_class,
        crate::modules::classes::controller::update_class,
        crate::modules::classes::controller::delete_class,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::contacts::controller::create_contact,
        crate::modules::contacts::controller::get_contacts,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageResponse,
            LoginRequest,
            LoginResponse,
            User,
            UserRole,
            CreateUserDto,
            UpdateUserDto,
            Class,
            ClassStatus,
            ClassSummary,
            ClassWithCount,
            ClassDetail,
            CreateClassDto,
            UpdateClassDto,
            DeletionSummary,
            Student,
            StudentWithContacts,
            StudentDetail,
            CreateStudentDto,
            UpdateStudentDto,
            Contact,
            ContactType,
            CreateContactDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Login and current user"),
        (name = "Users", description = "User management (admin only)"),
        (name = "Classes", description = "Class management"),
        (name = "Students", description = "Student management"),
        (name = "Contacts", description = "Contact log per student")
    ),
    info(
        title = "Classlog API",
        version = "0.1.0",
        description = "School contact management: classes, students, and the log of contacts with their families.",
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
