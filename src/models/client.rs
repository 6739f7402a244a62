use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::models::user::UserBrief;

/// A prospect/customer tracked by field staff.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Client {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_by: ObjectId,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateClientRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct UpdateClientRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserBrief>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClientResponse {
    pub fn new(client: Client, created_by: Option<UserBrief>) -> Self {
        Self {
            id: client.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: client.name,
            phone: client.phone,
            latitude: client.latitude,
            longitude: client.longitude,
            created_by,
            created_at: client.created_at.to_chrono(),
            updated_at: client.updated_at.to_chrono(),
        }
    }
}

/// Compact client reference used when populating meetings.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ClientBrief {
    pub id: String,
    pub name: String,
    pub phone: String,
}

impl From<&Client> for ClientBrief {
    fn from(client: &Client) -> Self {
        Self {
            id: client.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: client.name.clone(),
            phone: client.phone.clone(),
        }
    }
}
