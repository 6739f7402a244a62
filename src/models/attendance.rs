use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// One check-in/check-out pair per user per calendar day. `date` is the
/// local-midnight day marker; together with `user` it is covered by a unique
/// index, so two concurrent check-ins cannot both insert.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Attendance {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in: Option<BsonDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_out: Option<BsonDateTime>,
    pub date: BsonDateTime,
}
