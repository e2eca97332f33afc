//! OpenAPI documentation served through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, case_handler, dashboard_handler, password_handler, user_handler,
};
use crate::domain::{
    AssignmentStats, BulkAssignmentResult, BulkRoleAssignment, Case, CaseRecord, CaseStats,
    CreateUser, DashboardMetrics, DateField, DateSource, DocketEntry, Filing, LabelCount,
    PasswordReport, ResolvedDate, ResolvedStatus, Role, RoleAssignment, RoleRecord, RoleStats,
    SearchSummary, SortOrder, StatusEvent, StatusSource, Strength, UpdateUser, UserList,
    UserResponse, UserStats,
};
use crate::services::TokenResponse;
use crate::types::{MessageResponse, PaginationMeta};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Juzgado",
        version = "0.1.0",
        description = "Case search, dashboard and user administration for a judicial office",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:3000", description = "Local development server")),
    paths(
        auth_handler::login,
        auth_handler::logout,
        auth_handler::me,
        password_handler::validate_password_strength,
        case_handler::search_by_case_number,
        case_handler::filter_by_status,
        case_handler::search_by_party_name,
        case_handler::assigned_cases,
        dashboard_handler::dashboard,
        user_handler::list_users,
        user_handler::create_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::list_roles,
        user_handler::role_stats,
        user_handler::change_role,
        user_handler::assign_roles,
    ),
    components(
        schemas(
            Case,
            Filing,
            DocketEntry,
            StatusEvent,
            CaseRecord,
            CaseStats,
            ResolvedStatus,
            StatusSource,
            ResolvedDate,
            DateSource,
            SearchSummary,
            SortOrder,
            DateField,
            PaginationMeta,
            case_handler::CasePage,
            case_handler::StatusFilterPage,
            case_handler::AssignedCasesPage,
            AssignmentStats,
            DashboardMetrics,
            LabelCount,
            PasswordReport,
            Strength,
            password_handler::PasswordCheckRequest,
            Role,
            RoleRecord,
            RoleStats,
            RoleAssignment,
            BulkRoleAssignment,
            BulkAssignmentResult,
            UserResponse,
            UserStats,
            UserList,
            CreateUser,
            UpdateUser,
            auth_handler::LoginRequest,
            TokenResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Sessions and password checks"),
        (name = "Cases", description = "Case search and filtering"),
        (name = "Dashboard", description = "Landing metrics"),
        (name = "Users", description = "Account administration (admin only)")
    )
)]
pub struct ApiDoc;

/// Bearer scheme for the session token. Browsers send the cookie instead.
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
                        .description(Some("Session token from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
