use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::models::AuthUser;
use crate::services::attendance_service;
use crate::utils::error::AppError;

#[utoipa::path(
    post,
    path = "/attendance/checkin",
    tag = "Attendance",
    responses(
        (status = 200, description = "Check-in successful"),
        (status = 400, description = "Already checked in or day already completed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_in(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    attendance_service::check_in(&db, &user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Check-in successful"
    })))
}

#[utoipa::path(
    post,
    path = "/attendance/checkout",
    tag = "Attendance",
    responses(
        (status = 200, description = "Check-out successful"),
        (status = 400, description = "Not checked in or already checked out")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_out(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    attendance_service::check_out(&db, &user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Check-out successful"
    })))
}
