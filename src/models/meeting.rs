use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::client::ClientBrief;
use crate::models::user::UserBrief;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MeetingStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeetingStatus::Scheduled => write!(f, "scheduled"),
            MeetingStatus::Completed => write!(f, "completed"),
            MeetingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A scheduled field visit tying a client to a manager and optionally an
/// employee. The referenced client must exist at creation time.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Meeting {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub client: ObjectId,
    pub manager: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<ObjectId>,
    pub meeting_date: BsonDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub status: MeetingStatus,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateMeetingRequest {
    pub client: Option<String>,
    pub employee: Option<String>,
    pub meeting_date: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<MeetingStatus>,
}

/// Partial update: absent fields keep their stored value. `manager` may be
/// set to reassign the meeting to another manager.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateMeetingRequest {
    pub client: Option<String>,
    pub manager: Option<String>,
    pub employee: Option<String>,
    pub meeting_date: Option<DateTime<Utc>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<MeetingStatus>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MeetingResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<UserBrief>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<UserBrief>,
    pub meeting_date: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub status: MeetingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingResponse {
    pub fn new(
        meeting: Meeting,
        client: Option<ClientBrief>,
        manager: Option<UserBrief>,
        employee: Option<UserBrief>,
    ) -> Self {
        Self {
            id: meeting.id.map(|id| id.to_hex()).unwrap_or_default(),
            client,
            manager,
            employee,
            meeting_date: meeting.meeting_date.to_chrono(),
            latitude: meeting.latitude,
            longitude: meeting.longitude,
            status: meeting.status,
            created_at: meeting.created_at.to_chrono(),
            updated_at: meeting.updated_at.to_chrono(),
        }
    }
}
