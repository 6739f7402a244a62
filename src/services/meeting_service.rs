use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};

use crate::database::MongoDB;
use crate::models::{
    AuthUser, CreateMeetingRequest, Meeting, MeetingResponse, MeetingStatus, Role,
    UpdateMeetingRequest,
};
use crate::services::{auth_service, client_service};
use crate::utils::error::AppError;
use crate::utils::ids::parse_object_id;

const COLLECTION: &str = "meetings";

/// Field-level merge document for meeting updates. Reference fields are
/// parsed up front so garbage ids fail with a 400 before anything is
/// written.
pub(crate) fn build_update_doc(request: &UpdateMeetingRequest) -> Result<Document, AppError> {
    let mut update = doc! { "updated_at": BsonDateTime::now() };

    if let Some(client) = &request.client {
        update.insert("client", parse_object_id(client, "client")?);
    }
    if let Some(manager) = &request.manager {
        update.insert("manager", parse_object_id(manager, "manager")?);
    }
    if let Some(employee) = &request.employee {
        update.insert("employee", parse_object_id(employee, "employee")?);
    }
    if let Some(meeting_date) = request.meeting_date {
        update.insert("meeting_date", BsonDateTime::from_chrono(meeting_date));
    }
    if let Some(latitude) = request.latitude {
        update.insert("latitude", latitude);
    }
    if let Some(longitude) = request.longitude {
        update.insert("longitude", longitude);
    }
    if let Some(status) = request.status {
        update.insert("status", status.to_string());
    }

    Ok(update)
}

async fn populate(db: &MongoDB, meeting: Meeting) -> Result<MeetingResponse, AppError> {
    let client = client_service::client_brief(db, &meeting.client).await?;
    let manager = auth_service::user_brief(db, &meeting.manager).await?;
    let employee = match meeting.employee {
        Some(id) => auth_service::user_brief(db, &id).await?,
        None => None,
    };

    Ok(MeetingResponse::new(meeting, client, manager, employee))
}

pub async fn create_meeting(
    db: &MongoDB,
    caller: &AuthUser,
    request: &CreateMeetingRequest,
) -> Result<MeetingResponse, AppError> {
    let (client, meeting_date, latitude, longitude) = match (
        &request.client,
        request.meeting_date,
        request.latitude,
        request.longitude,
    ) {
        (Some(client), Some(date), Some(lat), Some(lon)) => (client, date, lat, lon),
        _ => return Err(AppError::Validation("Required fields missing".to_string())),
    };

    let client_id = parse_object_id(client, "client")?;

    // The referenced client must exist before anything is inserted
    if client_service::client_brief(db, &client_id).await?.is_none() {
        return Err(AppError::NotFound("Client not found".to_string()));
    }

    let employee_id = match &request.employee {
        Some(employee) => Some(parse_object_id(employee, "employee")?),
        None => None,
    };

    let mut meeting = Meeting {
        id: None,
        client: client_id,
        manager: caller.id,
        employee: employee_id,
        meeting_date: BsonDateTime::from_chrono(meeting_date),
        latitude,
        longitude,
        status: request.status.unwrap_or(MeetingStatus::Scheduled),
        created_at: BsonDateTime::now(),
        updated_at: BsonDateTime::now(),
    };

    let collection = db.collection::<Meeting>(COLLECTION);
    let result = collection.insert_one(&meeting).await?;
    meeting.id = result.inserted_id.as_object_id();

    log::info!(
        "✅ Meeting created for client {} by {}",
        client_id.to_hex(),
        caller.email
    );

    populate(db, meeting).await
}

/// Admin sees every meeting, a manager only those they manage. Matches the
/// client list policy so the two entity lists never disagree on visibility.
pub async fn list_meetings(
    db: &MongoDB,
    caller: &AuthUser,
) -> Result<Vec<MeetingResponse>, AppError> {
    let collection = db.collection::<Meeting>(COLLECTION);

    let filter = match caller.role {
        Role::Admin => doc! {},
        _ => doc! { "manager": caller.id },
    };

    let mut cursor = collection.find(filter).await?;
    let mut meetings = Vec::new();

    while let Some(result) = cursor.next().await {
        meetings.push(populate(db, result?).await?);
    }

    Ok(meetings)
}

/// Meetings for one client, populated. The caller is expected to have
/// checked the client exists.
pub async fn list_for_client(
    db: &MongoDB,
    client_id: &ObjectId,
) -> Result<Vec<MeetingResponse>, AppError> {
    let collection = db.collection::<Meeting>(COLLECTION);

    let mut cursor = collection.find(doc! { "client": client_id }).await?;
    let mut meetings = Vec::new();

    while let Some(result) = cursor.next().await {
        meetings.push(populate(db, result?).await?);
    }

    Ok(meetings)
}

pub async fn get_meeting(db: &MongoDB, id: &ObjectId) -> Result<MeetingResponse, AppError> {
    let collection = db.collection::<Meeting>(COLLECTION);

    let meeting = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Meeting not found".to_string()))?;

    populate(db, meeting).await
}

pub async fn update_meeting(
    db: &MongoDB,
    id: &ObjectId,
    request: &UpdateMeetingRequest,
) -> Result<MeetingResponse, AppError> {
    let collection = db.collection::<Meeting>(COLLECTION);

    let update = build_update_doc(request)?;

    if collection.find_one(doc! { "_id": id }).await?.is_none() {
        return Err(AppError::NotFound("Meeting not found".to_string()));
    }

    collection
        .update_one(doc! { "_id": id }, doc! { "$set": update })
        .await?;

    get_meeting(db, id).await
}

pub async fn delete_meeting(db: &MongoDB, id: &ObjectId) -> Result<(), AppError> {
    let collection = db.collection::<Meeting>(COLLECTION);

    let result = collection.delete_one(doc! { "_id": id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Meeting not found".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_update() -> UpdateMeetingRequest {
        UpdateMeetingRequest {
            client: None,
            manager: None,
            employee: None,
            meeting_date: None,
            latitude: None,
            longitude: None,
            status: None,
        }
    }

    #[test]
    fn update_doc_only_carries_present_fields() {
        let request = UpdateMeetingRequest {
            status: Some(MeetingStatus::Completed),
            ..empty_update()
        };

        let update = build_update_doc(&request).unwrap();

        assert_eq!(update.get_str("status").unwrap(), "completed");
        assert!(!update.contains_key("client"));
        assert!(!update.contains_key("meeting_date"));
        assert!(!update.contains_key("latitude"));
    }

    #[test]
    fn update_doc_rejects_garbage_reference_ids() {
        let request = UpdateMeetingRequest {
            client: Some("nope".to_string()),
            ..empty_update()
        };

        assert!(matches!(
            build_update_doc(&request),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn update_doc_parses_valid_reference_ids() {
        let employee = ObjectId::new();
        let request = UpdateMeetingRequest {
            employee: Some(employee.to_hex()),
            ..empty_update()
        };

        let update = build_update_doc(&request).unwrap();
        assert_eq!(update.get_object_id("employee").unwrap(), employee);
    }

    #[test]
    fn update_doc_carries_a_manager_reassignment() {
        let manager = ObjectId::new();
        let request = UpdateMeetingRequest {
            manager: Some(manager.to_hex()),
            ..empty_update()
        };

        let update = build_update_doc(&request).unwrap();
        assert_eq!(update.get_object_id("manager").unwrap(), manager);
    }

    use crate::config::Config;
    use crate::models::CreateClientRequest;
    use crate::services::auth_service::{LoginRequest, RegisterRequest};

    async fn test_db(tag: &str) -> (MongoDB, String) {
        let name = format!("fieldforce_test_{}_{}", tag, ObjectId::new().to_hex());
        let uri = format!("mongodb://localhost:27017/{}", name);
        let db = MongoDB::new(&uri).await.expect("local mongod required");
        (db, name)
    }

    async fn drop_db(name: &str) {
        if let Ok(client) = mongodb::Client::with_uri_str("mongodb://localhost:27017").await {
            let _ = client.database(name).drop().await;
        }
    }

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "mongodb://localhost:27017".to_string(),
            jwt_secret: "unit-test-secret".to_string(),
            jwt_ttl_secs: 3600,
        }
    }

    fn caller(role: Role) -> AuthUser {
        AuthUser {
            id: ObjectId::new(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role,
            phone: "9876543210".to_string(),
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn create_against_missing_client_inserts_nothing() {
        let (db, name) = test_db("missing_client").await;

        let request = CreateMeetingRequest {
            client: Some(ObjectId::new().to_hex()),
            employee: None,
            meeting_date: Some(chrono::Utc::now()),
            latitude: Some(28.61),
            longitude: Some(77.20),
            status: None,
        };

        let err = create_meeting(&db, &caller(Role::Manager), &request)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let count = db
            .collection::<Meeting>(COLLECTION)
            .count_documents(doc! {})
            .await
            .unwrap();
        assert_eq!(count, 0);

        drop_db(&name).await;
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn registration_to_populated_meeting_flow() {
        let (db, name) = test_db("full_flow").await;
        let config = test_config();

        auth_service::register(
            &db,
            &config,
            &RegisterRequest {
                name: Some("Asha".to_string()),
                email: Some("asha@example.com".to_string()),
                password: Some("secret123".to_string()),
                role: Some(Role::Manager),
                phone: Some("9876543210".to_string()),
            },
        )
        .await
        .unwrap();

        let login = auth_service::login(
            &db,
            &config,
            &LoginRequest {
                email: "asha@example.com".to_string(),
                password: "secret123".to_string(),
            },
        )
        .await
        .unwrap();

        let claims = auth_service::verify_token(&config, &login.token).unwrap();
        let manager = auth_service::find_auth_user(&db, &claims.sub)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(manager.role, Role::Manager);

        let client = crate::services::client_service::create_client(
            &db,
            &manager,
            &CreateClientRequest {
                name: Some("Acme Traders".to_string()),
                phone: Some("9876500000".to_string()),
                latitude: Some(28.61),
                longitude: Some(77.20),
            },
        )
        .await
        .unwrap();

        let created = create_meeting(
            &db,
            &manager,
            &CreateMeetingRequest {
                client: Some(client.id.clone()),
                employee: None,
                meeting_date: Some(chrono::Utc::now()),
                latitude: Some(28.61),
                longitude: Some(77.20),
                status: None,
            },
        )
        .await
        .unwrap();

        let id = parse_object_id(&created.id, "meeting").unwrap();
        let fetched = get_meeting(&db, &id).await.unwrap();

        assert_eq!(fetched.status, MeetingStatus::Scheduled);
        assert_eq!(fetched.client.unwrap().id, client.id);
        assert_eq!(fetched.manager.unwrap().id, manager.id.to_hex());

        drop_db(&name).await;
    }
}
