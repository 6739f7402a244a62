use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::options::ReturnDocument;

use crate::database::MongoDB;
use crate::models::{
    AuthUser, ClaimResponse, ClaimStatus, CreateClaimRequest, Reimbursement,
    UpdateClaimStatusRequest,
};
use crate::services::auth_service;
use crate::utils::error::AppError;
use crate::utils::ids::parse_object_id;

const COLLECTION: &str = "reimbursements";

pub(crate) fn validate_amount(amount: f64) -> Result<(), AppError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation(
            "Amount must be a positive number".to_string(),
        ));
    }
    Ok(())
}

pub async fn create_claim(
    db: &MongoDB,
    caller: &AuthUser,
    request: &CreateClaimRequest,
) -> Result<ClaimResponse, AppError> {
    let (amount, description, date) = match (&request.amount, &request.description, request.date) {
        (Some(amount), Some(description), Some(date)) => (*amount, description, date),
        _ => return Err(AppError::Validation("All fields are required".to_string())),
    };

    validate_amount(amount)?;

    let meeting = match &request.meeting {
        Some(meeting) => Some(parse_object_id(meeting, "meeting")?),
        None => None,
    };

    let mut claim = Reimbursement {
        id: None,
        employee_id: caller.id,
        amount,
        description: description.clone(),
        date: BsonDateTime::from_chrono(date),
        bill_image: request.bill_image.clone(),
        meeting,
        distance_km: request.distance_km,
        status: ClaimStatus::Pending,
        admin_remark: None,
        created_at: BsonDateTime::now(),
    };

    let collection = db.collection::<Reimbursement>(COLLECTION);
    let result = collection.insert_one(&claim).await?;
    claim.id = result.inserted_id.as_object_id();

    log::info!("✅ Claim created by {} for {:.2}", caller.email, amount);

    Ok(ClaimResponse::new(claim, None))
}

/// The claimant's own claims, unpopulated.
pub async fn my_claims(db: &MongoDB, caller: &AuthUser) -> Result<Vec<ClaimResponse>, AppError> {
    let collection = db.collection::<Reimbursement>(COLLECTION);

    let mut cursor = collection.find(doc! { "employee_id": caller.id }).await?;
    let mut claims = Vec::new();

    while let Some(result) = cursor.next().await {
        claims.push(ClaimResponse::new(result?, None));
    }

    Ok(claims)
}

/// Every claim, with the claimant populated. Admin-only via the role gate.
pub async fn all_claims(db: &MongoDB) -> Result<Vec<ClaimResponse>, AppError> {
    let collection = db.collection::<Reimbursement>(COLLECTION);

    let mut cursor = collection.find(doc! {}).await?;
    let mut claims = Vec::new();

    while let Some(result) = cursor.next().await {
        let claim = result?;
        let employee = auth_service::user_brief(db, &claim.employee_id).await?;
        claims.push(ClaimResponse::new(claim, employee));
    }

    Ok(claims)
}

/// Admin status decision. The status value itself is validated at the
/// boundary by the closed `ClaimStatus` enum; transitions in any direction
/// remain allowed (an admin may flip approved back to pending).
pub async fn update_claim_status(
    db: &MongoDB,
    id: &ObjectId,
    request: &UpdateClaimStatusRequest,
) -> Result<ClaimResponse, AppError> {
    let collection = db.collection::<Reimbursement>(COLLECTION);

    let mut update = doc! { "status": request.status.to_string() };
    if let Some(remark) = &request.admin_remark {
        update.insert("admin_remark", remark);
    }

    let claim = collection
        .find_one_and_update(doc! { "_id": id }, doc! { "$set": update })
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))?;

    Ok(ClaimResponse::new(claim, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_amounts_pass() {
        assert!(validate_amount(0.01).is_ok());
        assert!(validate_amount(1500.0).is_ok());
    }

    #[test]
    fn non_positive_amounts_fail() {
        assert!(matches!(validate_amount(0.0), Err(AppError::Validation(_))));
        assert!(matches!(
            validate_amount(-25.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_amount(f64::NAN),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn status_update_rejects_unknown_status_values() {
        let err = serde_json::from_str::<UpdateClaimStatusRequest>(r#"{"status":"paid"}"#);
        assert!(err.is_err());

        let ok: UpdateClaimStatusRequest =
            serde_json::from_str(r#"{"status":"approved","admin_remark":"ok"}"#).unwrap();
        assert_eq!(ok.status, ClaimStatus::Approved);
        assert_eq!(ok.admin_remark.as_deref(), Some("ok"));
    }
}
