use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::Config;
use crate::database::MongoDB;
use crate::services::auth_service;
use crate::services::auth_service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::utils::error::AppError;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let email = request.email.as_deref().unwrap_or("N/A");
    log::info!("📝 POST /auth/register - email: {}", email);

    let response = auth_service::register(&db, &config, &request).await?;

    Ok(HttpResponse::Created().json(response))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    db: web::Data<MongoDB>,
    config: web::Data<Config>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🔐 POST /auth/login - email: {}", request.email);

    let response = auth_service::login(&db, &config, &request).await?;

    log::info!("✅ Login successful: {}", request.email);
    Ok(HttpResponse::Ok().json(response))
}

/// Sessions are stateless; logout only clears the cookie transport when the
/// client used it. A bearer token stays valid until it expires.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Logged out"),
        (status = 401, description = "No token provided")
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(req: HttpRequest) -> HttpResponse {
    let mut response = HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    }));

    if req.cookie("token").is_some() {
        let mut removal = Cookie::new("token", "");
        removal.set_path("/");
        removal.make_removal();
        if let Err(e) = response.add_cookie(&removal) {
            log::warn!("⚠️  Failed to attach removal cookie: {}", e);
        }
    }

    response
}
