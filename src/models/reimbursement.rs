use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::user::UserBrief;

/// Claim status is a closed set; unknown strings in a status update are
/// rejected at deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimStatus::Pending => write!(f, "pending"),
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// An expense reimbursement claim. Created by the claimant; status and
/// remark mutated only by an admin; never deleted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Reimbursement {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub employee_id: ObjectId,
    pub amount: f64,
    pub description: String,
    pub date: BsonDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub status: ClaimStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_remark: Option<String>,
    pub created_at: BsonDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateClaimRequest {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub bill_image: Option<String>,
    pub meeting: Option<String>,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateClaimStatusRequest {
    pub status: ClaimStatus,
    pub admin_remark: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClaimResponse {
    pub id: String,
    pub employee_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<UserBrief>,
    pub amount: f64,
    pub description: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub status: ClaimStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_remark: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ClaimResponse {
    pub fn new(claim: Reimbursement, employee: Option<UserBrief>) -> Self {
        Self {
            id: claim.id.map(|id| id.to_hex()).unwrap_or_default(),
            employee_id: claim.employee_id.to_hex(),
            employee,
            amount: claim.amount,
            description: claim.description,
            date: claim.date.to_chrono(),
            bill_image: claim.bill_image,
            meeting: claim.meeting.map(|id| id.to_hex()),
            distance_km: claim.distance_km,
            status: claim.status,
            admin_remark: claim.admin_remark,
            created_at: claim.created_at.to_chrono(),
        }
    }
}
