use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::MongoDB;

/// Liveness report. `database` reflects an actual round-trip to MongoDB, so
/// a deployment probe pointed here catches a lost store connection, not
/// just a running process.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
}

pub(crate) fn overall_status(db_ok: bool) -> (&'static str, &'static str) {
    if db_ok {
        ("healthy", "connected")
    } else {
        ("degraded", "unreachable")
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(db: web::Data<MongoDB>) -> HttpResponse {
    let db_ok = db.ping().await.is_ok();
    let (status, database) = overall_status(db_ok);

    let body = HealthResponse {
        status: status.to_string(),
        database: database.to_string(),
        service: "fieldforce-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    };

    if db_ok {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_when_database_responds() {
        assert_eq!(overall_status(true), ("healthy", "connected"));
    }

    #[test]
    fn degraded_when_database_is_gone() {
        assert_eq!(overall_status(false), ("degraded", "unreachable"));
    }
}
