use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::models::{AuthUser, CreateClientRequest, UpdateClientRequest};
use crate::services::{client_service, meeting_service};
use crate::utils::error::AppError;
use crate::utils::ids::parse_object_id;

/// POST /clients
pub async fn create_client(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateClientRequest>,
) -> Result<HttpResponse, AppError> {
    let client = client_service::create_client(&db, &user, &body).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "message": "Client created successfully",
        "client": client
    })))
}

/// GET /clients - admin sees all, manager only their own
pub async fn get_clients(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let clients = client_service::list_clients(&db, &user).await?;
    let total = clients.len();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "clients": clients,
        "total": total
    })))
}

/// GET /clients/{id}
pub async fn get_client(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "client")?;
    let client = client_service::get_client(&db, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "client": client
    })))
}

/// PUT /clients/{id} - partial merge
pub async fn update_client(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<UpdateClientRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "client")?;
    let client = client_service::update_client(&db, &id, &body).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Client updated successfully",
        "client": client
    })))
}

/// DELETE /clients/{id} - admin only (role gate on the route)
pub async fn delete_client(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "client")?;
    client_service::delete_client(&db, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Client deleted successfully"
    })))
}

/// GET /clients/{id}/meetings
pub async fn get_client_meetings(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "client")?;

    let client = client_service::get_client(&db, &id).await?;
    let meetings = meeting_service::list_for_client(&db, &id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "client": client,
        "meetings": meetings
    })))
}
