use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::MongoDB;
use crate::models::{AuthUser, Role, User, UserBrief, UserPublic};
use crate::utils::error::{is_duplicate_key_error, AppError};

const COLLECTION: &str = "users";

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Canonical auth response: the token travels in the body (bearer flow),
/// never only in a cookie.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: UserPublic,
}

/// Signs a token carrying the subject id and role, expiring after the
/// configured TTL.
pub fn generate_token(config: &Config, user_id: &ObjectId, role: Role) -> Result<String, AppError> {
    let iat = Utc::now().timestamp() as usize;
    let exp = (Utc::now().timestamp() + config.jwt_ttl_secs) as usize;

    let claims = Claims {
        sub: user_id.to_hex(),
        role,
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::Database(format!("Failed to generate token: {}", e)))
}

/// Verifies signature and expiry. Malformed input is a typed failure, never
/// a panic. The 403 here is deliberate: a token was presented, it just
/// wasn't acceptable.
pub fn verify_token(config: &Config, token: &str) -> Result<Claims, AppError> {
    let validation = Validation::new(Algorithm::HS256);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Forbidden("Invalid or expired token".to_string()))
}

// User registration
pub async fn register(
    db: &MongoDB,
    config: &Config,
    request: &RegisterRequest,
) -> Result<AuthResponse, AppError> {
    let (name, email, password, role, phone) = match (
        &request.name,
        &request.email,
        &request.password,
        request.role,
        &request.phone,
    ) {
        (Some(name), Some(email), Some(password), Some(role), Some(phone)) => {
            (name, email, password, role, phone)
        }
        _ => return Err(AppError::Validation("All fields are required".to_string())),
    };

    let collection = db.collection::<User>(COLLECTION);

    if collection.find_one(doc! { "email": email }).await?.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let hashed_password = hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Database(format!("Failed to hash password: {}", e)))?;

    let mut new_user = User {
        id: None,
        name: name.clone(),
        email: email.clone(),
        password: hashed_password,
        role,
        phone: phone.clone(),
        created_at: BsonDateTime::now(),
        updated_at: BsonDateTime::now(),
    };

    let result = match collection.insert_one(&new_user).await {
        Ok(result) => result,
        // The unique email index backstops the pre-check under concurrency
        Err(e) if is_duplicate_key_error(&e) => {
            return Err(AppError::Conflict("User already exists".to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let user_id = result
        .inserted_id
        .as_object_id()
        .ok_or_else(|| AppError::Database("Inserted user has no ObjectId".to_string()))?;
    new_user.id = Some(user_id);

    let token = generate_token(config, &user_id, role)?;

    log::info!("✅ User registered successfully: {} ({})", email, role);

    Ok(AuthResponse {
        success: true,
        message: "User registered successfully".to_string(),
        token,
        user: UserPublic::from(&new_user),
    })
}

// User login
pub async fn login(
    db: &MongoDB,
    config: &Config,
    request: &LoginRequest,
) -> Result<AuthResponse, AppError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let collection = db.collection::<User>(COLLECTION);

    let user = collection
        .find_one(doc! { "email": &request.email })
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = verify(&request.password, &user.password)
        .map_err(|e| AppError::Database(format!("Password verification error: {}", e)))?;

    if !valid {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let user_id = user
        .id
        .ok_or_else(|| AppError::Database("Stored user has no ObjectId".to_string()))?;

    let token = generate_token(config, &user_id, user.role)?;

    Ok(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserPublic::from(&user),
    })
}

/// Loads the identity for a verified token subject, password excluded by
/// construction. An unparseable or unknown subject resolves to `None`.
pub async fn find_auth_user(db: &MongoDB, subject: &str) -> Result<Option<AuthUser>, AppError> {
    let user_id = match ObjectId::parse_str(subject) {
        Ok(id) => id,
        Err(_) => return Ok(None),
    };

    let collection = db.collection::<User>(COLLECTION);
    let user = collection.find_one(doc! { "_id": user_id }).await?;

    Ok(user.map(|u| AuthUser {
        id: user_id,
        name: u.name,
        email: u.email,
        role: u.role,
        phone: u.phone,
    }))
}

/// Compact user lookup used when populating entity responses.
pub async fn user_brief(db: &MongoDB, id: &ObjectId) -> Result<Option<UserBrief>, AppError> {
    let collection = db.collection::<User>(COLLECTION);
    let user = collection.find_one(doc! { "_id": id }).await?;
    Ok(user.map(|u| UserBrief::from(&u)))
}

/// Caller's own record, for GET /profile.
pub async fn get_profile(db: &MongoDB, user_id: &ObjectId) -> Result<UserPublic, AppError> {
    let collection = db.collection::<User>(COLLECTION);

    let user = collection
        .find_one(doc! { "_id": user_id })
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(UserPublic::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(ttl: i64) -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "mongodb://localhost/test".to_string(),
            jwt_secret: "unit-test-secret".to_string(),
            jwt_ttl_secs: ttl,
        }
    }

    #[test]
    fn token_round_trip_preserves_subject_and_role() {
        let config = test_config(3600);
        let user_id = ObjectId::new();

        let token = generate_token(&config, &user_id, Role::Manager).unwrap();
        let claims = verify_token(&config, &token).unwrap();

        assert_eq!(claims.sub, user_id.to_hex());
        assert_eq!(claims.role, Role::Manager);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_signature_fails_verification() {
        let config = test_config(3600);
        let token = generate_token(&config, &ObjectId::new(), Role::Admin).unwrap();

        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'a' { 'b' } else { 'a' });

        let err = verify_token(&config, &tampered).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let config = test_config(3600);
        let token = generate_token(&config, &ObjectId::new(), Role::Employee).unwrap();

        let mut other = test_config(3600);
        other.jwt_secret = "some-other-secret".to_string();

        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn expired_token_fails_verification() {
        // jsonwebtoken applies 60s of leeway, so expire well past it
        let config = test_config(-3600);
        let token = generate_token(&config, &ObjectId::new(), Role::Employee).unwrap();

        let err = verify_token(&config, &token).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn malformed_token_is_a_typed_failure() {
        let config = test_config(3600);
        assert!(verify_token(&config, "not-a-jwt").is_err());
        assert!(verify_token(&config, "").is_err());
    }

    #[test]
    fn password_hash_verifies_and_differs_from_plaintext() {
        let plaintext = "secret123";
        let hashed = hash(plaintext, 4).unwrap();

        assert_ne!(hashed, plaintext);
        assert!(verify(plaintext, &hashed).unwrap());
        assert!(!verify("wrong-password", &hashed).unwrap());
    }

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

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Asha".to_string()),
            email: Some(email.to_string()),
            password: Some("secret123".to_string()),
            role: Some(Role::Manager),
            phone: Some("9876543210".to_string()),
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn duplicate_email_registration_conflicts() {
        let (db, name) = test_db("dup_email").await;
        let config = test_config(3600);

        register(&db, &config, &register_request("asha@example.com"))
            .await
            .unwrap();

        // Same email, every other field different
        let second = RegisterRequest {
            name: Some("Someone Else".to_string()),
            password: Some("other-password".to_string()),
            role: Some(Role::Employee),
            phone: Some("9123456780".to_string()),
            ..register_request("asha@example.com")
        };
        let err = register(&db, &config, &second).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        drop_db(&name).await;
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn login_round_trips_the_registration_password() {
        let (db, name) = test_db("login").await;
        let config = test_config(3600);

        register(&db, &config, &register_request("ravi@example.com"))
            .await
            .unwrap();

        let ok = login(
            &db,
            &config,
            &LoginRequest {
                email: "ravi@example.com".to_string(),
                password: "secret123".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(!ok.token.is_empty());

        let err = login(
            &db,
            &config,
            &LoginRequest {
                email: "ravi@example.com".to_string(),
                password: "wrong-password".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        drop_db(&name).await;
    }
}
