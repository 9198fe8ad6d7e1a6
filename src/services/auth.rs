//! Authentication service: password hashing, session tokens, register, login.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::{Credentials, User, UserResponse};

/// Claims embedded in a session token. The user id is the sole claim beyond
/// the timestamps; validity is signature plus expiry, nothing server-side.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Sign a session token for the given user id.
pub fn issue_session_token(
    user_id: Uuid,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))
}

/// Validate a session token's signature and expiry, returning the claims.
/// Any failure collapses to [`AppError::Unauthorized`].
pub fn validate_session_token(token: &str, jwt_secret: &str) -> Result<SessionClaims, AppError> {
    let decoding_key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<SessionClaims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Create a new user with a hashed password.
///
/// The existence check gives a friendly error on the common path; the UNIQUE
/// constraint on `users.username` is what actually decides a concurrent race,
/// and its violation maps to the same "already exists" error.
pub async fn register(pool: &PgPool, input: &Credentials) -> Result<UserResponse, AppError> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&input.username)
            .fetch_one(pool)
            .await?;
    if exists {
        return Err(AppError::Conflict("Username already exists".to_string()));
    }

    let password_hash = hash_password(&input.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(&input.username)
    .bind(&password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("Username already exists".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(UserResponse::from(user))
}

/// Authenticate a user by username and password.
///
/// Unknown username and wrong password take the identical error path so the
/// response cannot be used to enumerate accounts.
pub async fn authenticate(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    Ok(user)
}

/// Find a user by ID.
pub async fn find_user_by_id(pool: &PgPool, id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_and_verify() {
        let password = "pw123";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("pw123").unwrap();
        let second = hash_password("pw123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn token_issue_and_validate() {
        let secret = "test-secret-key";
        let user_id = Uuid::new_v4();

        let token = issue_session_token(user_id, secret, 3600).unwrap();
        let claims = validate_session_token(&token, secret).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert!(claims.exp - claims.iat == 3600);
    }

    #[test]
    fn garbage_token_rejected() {
        let result = validate_session_token("garbage.token.here", "secret");
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue_session_token(Uuid::new_v4(), "right-secret", 3600).unwrap();
        let result = validate_session_token(&token, "wrong-secret");
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[test]
    fn expired_token_rejected() {
        // Issue a token that expired well beyond the default leeway window.
        let token = issue_session_token(Uuid::new_v4(), "secret", -3600).unwrap();
        let result = validate_session_token(&token, "secret");
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
