use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::models::{AuthUser, CreateMeetingRequest, UpdateMeetingRequest};
use crate::services::meeting_service;
use crate::utils::error::AppError;
use crate::utils::ids::parse_object_id;

/// POST /meetings - the referenced client must exist
pub async fn create_meeting(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateMeetingRequest>,
) -> Result<HttpResponse, AppError> {
    let meeting = meeting_service::create_meeting(&db, &user, &body).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Meeting created successfully",
        "meeting": meeting
    })))
}

/// GET /meetings - admin sees all, manager only their own
pub async fn get_meetings(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let meetings = meeting_service::list_meetings(&db, &user).await?;
    let total = meetings.len();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "meetings": meetings,
        "total": total
    })))
}

/// GET /meetings/{id} - populated client/manager/employee
pub async fn get_meeting(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "meeting")?;
    let meeting = meeting_service::get_meeting(&db, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "meeting": meeting
    })))
}

/// PUT /meetings/{id} - partial merge
pub async fn update_meeting(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<UpdateMeetingRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "meeting")?;
    let meeting = meeting_service::update_meeting(&db, &id, &body).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Meeting updated successfully",
        "meeting": meeting
    })))
}

/// DELETE /meetings/{id} - admin only (role gate on the route)
pub async fn delete_meeting(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "meeting")?;
    meeting_service::delete_meeting(&db, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Meeting deleted successfully"
    })))
}
