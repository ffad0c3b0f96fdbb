//! Authentication service for login, token generation, and password utilities.

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{debug, info, warn};

use crate::constants::ERR_INVALID_CREDENTIALS;
use crate::errors::ApiError;
use crate::models::{Claims, LoginRequest, User, UserResponse};
use crate::services::UserService;
use crate::utils::mask_username;

/// Token signing parameters.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiration_hours: i64,
}

/// Service for authentication operations.
pub struct AuthService {
    users: Arc<UserService>,
    jwt: JwtSettings,
}

impl AuthService {
    pub fn new(users: Arc<UserService>, jwt: JwtSettings) -> Self {
        Self { users, jwt }
    }

    /// Authenticate by email or user name and return a JWT token.
    ///
    /// Unknown login and wrong password fail with the same message.
    pub async fn login(&self, req: LoginRequest) -> Result<(UserResponse, String), ApiError> {
        let user = self
            .users
            .find_by_login_details(&req.login)
            .await?
            .ok_or_else(|| {
                warn!("Login failed: no user for {}", mask_username(&req.login));
                ApiError::Unauthorized(ERR_INVALID_CREDENTIALS.to_string())
            })?;

        if !verify_password(&req.password, &user.password)? {
            warn!("Login failed: wrong password for user {}", user.id);
            return Err(ApiError::Unauthorized(ERR_INVALID_CREDENTIALS.to_string()));
        }

        let token = generate_token(&user, &self.jwt)?;
        info!("User {} logged in", user.id);

        Ok((user.into(), token))
    }
}

/// Hash a password using bcrypt.
pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    Ok(hash(password, cost)?)
}

/// Verify a password against a bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    Ok(verify(password, hash)?)
}

/// Generate a JWT token for a user.
pub fn generate_token(user: &User, settings: &JwtSettings) -> Result<String, ApiError> {
    let now = Utc::now().timestamp().max(0) as usize;
    let ttl_seconds = usize::try_from(settings.expiration_hours)
        .unwrap_or(0)
        .saturating_mul(3600);
    let exp = now.saturating_add(ttl_seconds);

    let claims = Claims {
        sub: user.id.to_hex(),
        email: user.email.clone(),
        role: user.role,
        exp,
        iat: now,
    };

    debug!("Generated token for user {} with role {}", user.id, user.role);

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a token's signature and expiry and return its claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
