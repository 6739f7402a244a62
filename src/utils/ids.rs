use mongodb::bson::oid::ObjectId;

use crate::utils::error::AppError;

/// Parses a path/body id into an ObjectId, mapping garbage input to a 400
/// instead of a driver error.
pub fn parse_object_id(id: &str, what: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::Validation(format!("Invalid {} ID", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_hex() {
        let oid = ObjectId::new();
        assert_eq!(parse_object_id(&oid.to_hex(), "client").unwrap(), oid);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_object_id("not-an-id", "client").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
