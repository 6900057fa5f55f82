/// Signed session tokens
///
/// A signed-in user's session is a compact HS256 JWT kept in a cookie. The
/// token only carries the user id; everything else about the user is loaded
/// from the database on each request, so deleting a user ends their session
/// on the next request even though the token itself is still valid.
///
/// # Claims
///
/// - `sub`: user id, as a decimal string
/// - `iss`: always `"pingcrm"`
/// - `iat` / `nbf`: issue time
/// - `exp`: expiry (default 7 days)
///
/// # Example
///
/// ```
/// use pingcrm_shared::auth::session::{create_session_token, validate_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-session-secret-of-at-least-32-bytes";
///
/// let token = create_session_token(&SessionClaims::new(42)?, secret)?;
/// let claims = validate_session_token(&token, secret)?;
///
/// assert_eq!(claims.user_id()?, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer stamped on every session token
pub const SESSION_ISSUER: &str = "pingcrm";

/// Default session lifetime in days
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,

    /// Token was not issued by this application
    #[error("Invalid session issuer")]
    InvalidIssuer,

    /// Bad signature, malformed token or unusable subject
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Session token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject - user id
    pub sub: String,

    /// Issuer - always "pingcrm"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl SessionClaims {
    /// Claims for `user_id` with the default lifetime
    pub fn new(user_id: i64) -> Result<Self, SessionError> {
        Self::with_expiration(user_id, Duration::days(DEFAULT_SESSION_TTL_DAYS))
    }

    /// Claims for `user_id` expiring after `expires_in`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CreateError` if the expiry is out of range
    pub fn with_expiration(user_id: i64, expires_in: Duration) -> Result<Self, SessionError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(expires_in)
            .ok_or_else(|| SessionError::CreateError(format!("Session lifetime out of range: {expires_in}")))?;

        Ok(Self {
            sub: user_id.to_string(),
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        })
    }

    /// Seconds from issue to expiry
    pub fn lifetime_seconds(&self) -> i64 {
        self.exp - self.iat
    }

    /// The signed-in user's id
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Invalid` if the subject is not an integer
    pub fn user_id(&self) -> Result<i64, SessionError> {
        self.sub
            .parse()
            .map_err(|_| SessionError::Invalid(format!("Subject is not a user id: {}", self.sub)))
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs session claims with HS256
///
/// # Errors
///
/// Returns `SessionError::CreateError` if encoding fails
pub fn create_session_token(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature, expiry, not-before and issuer of a session token
///
/// # Errors
///
/// - `SessionError::Expired` when `exp` has passed
/// - `SessionError::InvalidIssuer` when `iss` is not `"pingcrm"`
/// - `SessionError::Invalid` for everything else
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => SessionError::Expired,
        ErrorKind::InvalidIssuer => SessionError::InvalidIssuer,
        _ => SessionError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
