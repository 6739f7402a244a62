use actix_web::{web, HttpResponse};

use crate::database::MongoDB;
use crate::models::{AuthUser, ClaimResponse, CreateClaimRequest, UpdateClaimStatusRequest};
use crate::services::reimbursement_service;
use crate::utils::error::AppError;
use crate::utils::ids::parse_object_id;

#[utoipa::path(
    post,
    path = "/reimbursement/create",
    tag = "Reimbursement",
    request_body = CreateClaimRequest,
    responses(
        (status = 201, description = "Claim created", body = ClaimResponse),
        (status = 400, description = "Missing fields or non-positive amount")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_claim(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateClaimRequest>,
) -> Result<HttpResponse, AppError> {
    let claim = reimbursement_service::create_claim(&db, &user, &body).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "claim": claim
    })))
}

/// GET /reimbursement/my-claims
pub async fn my_claims(
    user: web::ReqData<AuthUser>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    let claims = reimbursement_service::my_claims(&db, &user).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "claims": claims
    })))
}

/// GET /reimbursement/all - admin only, claimant populated
pub async fn all_claims(db: web::Data<MongoDB>) -> Result<HttpResponse, AppError> {
    let claims = reimbursement_service::all_claims(&db).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "claims": claims
    })))
}

/// PUT /reimbursement/update/{id} - admin status decision
pub async fn update_claim_status(
    path: web::Path<String>,
    db: web::Data<MongoDB>,
    body: web::Json<UpdateClaimStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = parse_object_id(&path.into_inner(), "claim")?;
    let claim = reimbursement_service::update_claim_status(&db, &id, &body).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "claim": claim
    })))
}
