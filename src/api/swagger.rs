use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Field Force Service API",
        version = "1.0.0",
        description = "Field-force management backend: users, clients, meetings, attendance and reimbursement claims.\n\n**Authentication:** protected endpoints require a JWT Bearer token obtained from /auth/login."
    ),
    paths(
        // Auth endpoints
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::logout,

        // Health
        crate::api::health::health_check,

        // Attendance
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,

        // Reimbursement
        crate::api::reimbursement::create_claim,
    ),
    components(
        schemas(
            // Auth
            crate::services::auth_service::LoginRequest,
            crate::services::auth_service::RegisterRequest,
            crate::services::auth_service::AuthResponse,
            crate::models::user::UserPublic,
            crate::models::user::Role,

            // Health
            crate::api::health::HealthResponse,

            // Reimbursement
            crate::models::reimbursement::CreateClaimRequest,
            crate::models::reimbursement::ClaimResponse,
            crate::models::reimbursement::ClaimStatus,
            crate::models::user::UserBrief,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and logout."),
        (name = "Health", description = "Service health check."),
        (name = "Attendance", description = "Daily check-in and check-out."),
        (name = "Reimbursement", description = "Expense claims and admin decisions."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token"))
                        .build(),
                ),
            );
        }
    }
}
