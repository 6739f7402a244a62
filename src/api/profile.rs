use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::models::AuthUser;
use crate::services::auth_service;
use crate::utils::error::AppError;

/// GET /profile - the caller's own record, password excluded.
pub async fn get_profile(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let profile = auth_service::get_profile(&db, &user.id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Profile fetched successfully",
        "user": profile
    })))
}
