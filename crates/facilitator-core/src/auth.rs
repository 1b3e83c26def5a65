//! Dashboard accounts and bearer tokens.
//!
//! Passwords are stored as bcrypt hashes; hashing and verification run on
//! the blocking pool. Tokens are HS256 JWTs carrying the user id, email and
//! role. Every credential or token failure surfaces as
//! [`CoreError::Unauthorized`] without saying which part was wrong.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use facilitator_types::{LoginRequest, LoginResponse, RegisterRequest, User, UserId, UserRole};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::error::CoreError;
use crate::store::UserStore;

/// Message returned for every failed login.
const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Settings for password hashing and token signing.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
    /// Bcrypt work factor.
    pub bcrypt_cost: u32,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

/// Claims carried by a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: UserId,
    /// User email at issue time.
    pub email: String,
    /// User role at issue time.
    pub role: UserRole,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Registration, login and token verification.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_secs: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    /// Create an auth service over `users`.
    pub fn new(users: Arc<dyn UserStore>, config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            users,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            token_ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Create a new account. Fails with [`CoreError::Conflict`] if the
    /// email is already registered.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, CoreError> {
        let request = RegisterRequest {
            email: normalize_email(&request.email),
            ..request
        };
        request.validate()?;

        let password_hash = self.hash(request.password).await?;
        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: request.email,
            password_hash,
            role: request.role.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let user = self.users.insert(&user).await?;
        info!(user = %user.id, role = %user.role, "Account registered");
        Ok(user)
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, CoreError> {
        let request = LoginRequest {
            email: normalize_email(&request.email),
            ..request
        };
        request
            .validate()
            .map_err(|e| {
                debug!(error = %e, "Malformed login body");
                CoreError::Unauthorized(INVALID_CREDENTIALS.to_owned())
            })?;

        let Some(user) = self.users.find_by_email(&request.email).await? else {
            debug!("Login for unknown email");
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        };

        if !self.verify(request.password, user.password_hash.clone()).await? {
            debug!(user = %user.id, "Login with wrong password");
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.to_owned()));
        }

        let access_token = self.issue_token(&user)?;
        info!(user = %user.id, "Login succeeded");
        Ok(LoginResponse { access_token, user })
    }

    /// Verify a bearer token and load the account it names.
    pub async fn authenticate(&self, token: &str) -> Result<User, CoreError> {
        let claims = self.decode_token(token)?;
        self.users
            .find(claims.sub)
            .await?
            .ok_or_else(|| CoreError::Unauthorized("account no longer exists".to_owned()))
    }

    /// The authenticated account.
    pub const fn me(user: User) -> User {
        user
    }

    /// Sign a token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<String, CoreError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            iat,
            exp: iat.saturating_add(self.token_ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CoreError::Internal(format!("token signing failed: {e}")))
    }

    /// Decode and verify a token's signature and expiry.
    pub fn decode_token(&self, token: &str) -> Result<Claims, CoreError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => debug!("Token expired"),
                    _ => warn!(error = %e, "Token validation failed"),
                }
                CoreError::Unauthorized("invalid or expired token".to_owned())
            })
    }

    /// Hash `password` with the configured cost.
    pub async fn hash(&self, password: String) -> Result<String, CoreError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| CoreError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
    }

    async fn verify(&self, password: String, hash: String) -> Result<bool, CoreError> {
        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| CoreError::Internal(format!("verification task failed: {e}")))?;
        match outcome {
            Ok(matches) => Ok(matches),
            Err(e) => {
                warn!(error = %e, "Stored password hash is unreadable");
                Ok(false)
            }
        }
    }
}

/// Emails are compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
