use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};

use crate::database::MongoDB;
use crate::models::{
    AuthUser, Client, ClientBrief, ClientResponse, CreateClientRequest, Role, UpdateClientRequest,
    UserBrief,
};
use crate::services::auth_service;
use crate::utils::error::AppError;

const COLLECTION: &str = "clients";

pub(crate) fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), AppError> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::Validation(
            "Latitude must be between -90 and 90".to_string(),
        ));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::Validation(
            "Longitude must be between -180 and 180".to_string(),
        ));
    }
    Ok(())
}

/// Field-level merge document: only fields present in the request overwrite
/// stored values.
pub(crate) fn build_update_doc(request: &UpdateClientRequest) -> Document {
    let mut update = doc! { "updated_at": BsonDateTime::now() };

    if let Some(name) = &request.name {
        update.insert("name", name);
    }
    if let Some(phone) = &request.phone {
        update.insert("phone", phone);
    }
    if let Some(latitude) = request.latitude {
        update.insert("latitude", latitude);
    }
    if let Some(longitude) = request.longitude {
        update.insert("longitude", longitude);
    }

    update
}

pub async fn create_client(
    db: &MongoDB,
    caller: &AuthUser,
    request: &CreateClientRequest,
) -> Result<ClientResponse, AppError> {
    let (name, phone, latitude, longitude) = match (
        &request.name,
        &request.phone,
        request.latitude,
        request.longitude,
    ) {
        (Some(name), Some(phone), Some(lat), Some(lon)) => (name, phone, lat, lon),
        _ => return Err(AppError::Validation("All fields are required".to_string())),
    };

    validate_coordinates(latitude, longitude)?;

    let mut client = Client {
        id: None,
        name: name.clone(),
        phone: phone.clone(),
        latitude,
        longitude,
        created_by: caller.id,
        created_at: BsonDateTime::now(),
        updated_at: BsonDateTime::now(),
    };

    let collection = db.collection::<Client>(COLLECTION);
    let result = collection.insert_one(&client).await?;
    client.id = result.inserted_id.as_object_id();

    log::info!("✅ Client created: {} by {}", client.name, caller.email);

    Ok(ClientResponse::new(client, Some(UserBrief::from(caller))))
}

/// Admin sees every client, a manager only those they created. Managers
/// never see each other's books; this is the authorization-sensitive rule
/// beyond the role gate.
pub async fn list_clients(db: &MongoDB, caller: &AuthUser) -> Result<Vec<ClientResponse>, AppError> {
    let collection = db.collection::<Client>(COLLECTION);

    let filter = match caller.role {
        Role::Admin => doc! {},
        _ => doc! { "created_by": caller.id },
    };

    let mut cursor = collection.find(filter).await?;
    let mut clients = Vec::new();

    while let Some(result) = cursor.next().await {
        let client = result?;
        let created_by = auth_service::user_brief(db, &client.created_by).await?;
        clients.push(ClientResponse::new(client, created_by));
    }

    Ok(clients)
}

pub async fn get_client(db: &MongoDB, id: &ObjectId) -> Result<ClientResponse, AppError> {
    let collection = db.collection::<Client>(COLLECTION);

    let client = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    let created_by = auth_service::user_brief(db, &client.created_by).await?;

    Ok(ClientResponse::new(client, created_by))
}

pub async fn update_client(
    db: &MongoDB,
    id: &ObjectId,
    request: &UpdateClientRequest,
) -> Result<ClientResponse, AppError> {
    let collection = db.collection::<Client>(COLLECTION);

    let existing = collection
        .find_one(doc! { "_id": id })
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    // Bounds apply to whichever coordinates the merge will end up storing
    validate_coordinates(
        request.latitude.unwrap_or(existing.latitude),
        request.longitude.unwrap_or(existing.longitude),
    )?;

    collection
        .update_one(doc! { "_id": id }, doc! { "$set": build_update_doc(request) })
        .await?;

    get_client(db, id).await
}

/// Compact client lookup used when populating meetings and for the
/// client-existence check at meeting creation.
pub async fn client_brief(db: &MongoDB, id: &ObjectId) -> Result<Option<ClientBrief>, AppError> {
    let collection = db.collection::<Client>(COLLECTION);
    let client = collection.find_one(doc! { "_id": id }).await?;
    Ok(client.as_ref().map(ClientBrief::from))
}

pub async fn delete_client(db: &MongoDB, id: &ObjectId) -> Result<(), AppError> {
    let collection = db.collection::<Client>(COLLECTION);

    let result = collection.delete_one(doc! { "_id": id }).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound("Client not found".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_within_bounds_pass() {
        assert!(validate_coordinates(28.61, 77.20).is_ok());
        assert!(validate_coordinates(-90.0, 180.0).is_ok());
        assert!(validate_coordinates(90.0, -180.0).is_ok());
    }

    #[test]
    fn coordinates_outside_bounds_fail() {
        assert!(matches!(
            validate_coordinates(90.5, 0.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_coordinates(0.0, -180.1),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn update_doc_only_carries_present_fields() {
        let request = UpdateClientRequest {
            name: Some("X".to_string()),
            phone: None,
            latitude: None,
            longitude: None,
        };

        let update = build_update_doc(&request);

        assert_eq!(update.get_str("name").unwrap(), "X");
        assert!(!update.contains_key("phone"));
        assert!(!update.contains_key("latitude"));
        assert!(!update.contains_key("longitude"));
        // updated_at always moves forward
        assert!(update.contains_key("updated_at"));
    }

    #[test]
    fn update_doc_carries_all_present_fields() {
        let request = UpdateClientRequest {
            name: Some("Acme".to_string()),
            phone: Some("9876543210".to_string()),
            latitude: Some(12.97),
            longitude: Some(77.59),
        };

        let update = build_update_doc(&request);

        assert_eq!(update.get_str("phone").unwrap(), "9876543210");
        assert_eq!(update.get_f64("latitude").unwrap(), 12.97);
        assert_eq!(update.get_f64("longitude").unwrap(), 77.59);
    }
}
