use std::sync::Arc;
use std::time::Duration;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::admin_user::{self, Entity as AdminUserEntity, Model as AdminUser};

/// Claim structure for JWT session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (admin user ID)
    pub username: String, // Login name
    pub role: String,     // Role ("admin")
    pub jti: String,      // JWT ID (unique identifier for this token)
    pub iat: i64,         // Issued at time
    pub exp: i64,         // Expiration time
    pub nbf: i64,         // Not valid before time
    pub iss: String,      // Issuer
    pub aud: String,      // Audience
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        jwt_issuer: String,
        jwt_audience: String,
        token_expiration: Duration,
    ) -> Self {
        Self {
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_expiration,
        }
    }
}

/// Token revocation list entry
#[derive(Clone, Debug)]
struct RevokedToken {
    jti: String,
    expiry: DateTime<Utc>,
}

/// Session store: issues, verifies, and revokes admin session tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    pub config: AuthConfig,
    db: Arc<DatabaseConnection>,
    revoked_tokens: Arc<RwLock<Vec<RevokedToken>>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(config: AuthConfig, db: Arc<DatabaseConnection>) -> Self {
        Self {
            config,
            db,
            revoked_tokens: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Verify credentials against the admin_users table and issue a session token.
    pub async fn issue(&self, credentials: &LoginCredentials) -> Result<SessionToken, AuthError> {
        let user = AdminUserEntity::find()
            .filter(admin_user::Column::Username.eq(credentials.username.as_str()))
            .filter(admin_user::Column::IsActive.eq(true))
            .one(&*self.db)
            .await
            .map_err(|e| AuthError::InternalError(e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&credentials.password, &user.password_hash)? {
            warn!(username = %credentials.username, "login failed: bad password");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_for_user(&user)
    }

    /// Issue a token for an already-authenticated admin user.
    pub fn issue_for_user(&self, user: &AdminUser) -> Result<SessionToken, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(SessionToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_expiration.as_secs() as i64,
        })
    }

    /// Validate a session token and extract the claims
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.jwt_issuer.as_str()]);
        validation.set_audience(&[self.config.jwt_audience.as_str()]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

        if self.is_token_revoked(&claims.jti).await {
            return Err(AuthError::RevokedToken);
        }

        Ok(claims)
    }

    /// Revoke a session token (logout)
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let claims = self.verify(token).await?;

        let expiry = DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now);
        debug!(jti = %claims.jti, "revoking session token");

        let mut revoked = self.revoked_tokens.write().await;
        revoked.push(RevokedToken {
            jti: claims.jti,
            expiry,
        });

        // Drop entries that have expired on their own
        let now = Utc::now();
        revoked.retain(|t| t.expiry > now);

        Ok(())
    }

    async fn is_token_revoked(&self, token_id: &str) -> bool {
        let revoked = self.revoked_tokens.read().await;
        revoked.iter().any(|t| t.jti == token_id)
    }
}

/// Hash a password for storage using Argon2 with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::InternalError(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AuthError::InternalError(format!("stored hash is invalid: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Token has been revoked")]
    RevokedToken,
    #[error("Missing authorization header")]
    MissingToken,
    #[error("Token creation failed: {0}")]
    TokenCreation(String),
    #[error("Internal auth error: {0}")]
    InternalError(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::TokenCreation(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

/// Authenticated admin identity extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
    pub token_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<Arc<AuthService>>()
            .cloned()
            .ok_or_else(|| {
                AuthError::InternalError("AuthService missing from request extensions".to_string())
            })?;

        let token = bearer_token(parts).ok_or(AuthError::MissingToken)?;
        let claims = auth.verify(&token).await?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthenticatedUser {
            user_id,
            username: claims.username,
            role: claims.role,
            token_id: claims.jti,
        })
    }
}

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> AuthService {
        let config = AuthConfig::new(
            "unit_test_secret_key_that_is_definitely_long_enough_for_hs256_q7x9v2m4p8".into(),
            "foodstore-api".into(),
            "foodstore-admin".into(),
            Duration::from_secs(3600),
        );
        AuthService::new(config, Arc::new(DatabaseConnection::Disconnected))
    }

    fn test_user() -> AdminUser {
        AdminUser {
            id: Uuid::new_v4(),
            username: "admin".into(),
            password_hash: String::new(),
            display_name: "Admin".into(),
            role: "admin".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn issued_token_verifies() {
        let service = test_service();
        let user = test_user();

        let token = service.issue_for_user(&user).unwrap();
        let claims = service.verify(&token.access_token).await.unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn revoked_token_is_rejected() {
        let service = test_service();
        let token = service.issue_for_user(&test_user()).unwrap();

        service.revoke(&token.access_token).await.unwrap();

        let err = service.verify(&token.access_token).await.unwrap_err();
        assert!(matches!(err, AuthError::RevokedToken));
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let service = test_service();
        let err = service.verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("s3cret-pass").unwrap();
        assert!(verify_password("s3cret-pass", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }
}
