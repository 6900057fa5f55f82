/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: signed session tokens carried in the session cookie
///
/// # Example
///
/// ```
/// use pingcrm_shared::auth::password::{hash_password, verify_password};
/// use pingcrm_shared::auth::session::{create_session_token, SessionClaims};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("secret")?;
/// assert!(verify_password("secret", &hash)?);
///
/// let token = create_session_token(&SessionClaims::new(1)?, "a-session-secret-of-at-least-32-bytes")?;
/// assert!(!token.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod session;
