/// Bearer token issuance and validation
///
/// Tokens are HS256 (HMAC-SHA256) JWTs binding a request to an identity.
/// They carry only the subject and timing claims; no password material or
/// secrets ever go into the payload.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: fixed window from issuance (30 minutes by default)
/// - **Validation**: signature, expiration, not-before and issuer, zero leeway
/// - **Revocation**: none; expiry is the only invalidation mechanism
///
/// # Example
///
/// ```
/// use taskden_shared::auth::jwt::{HmacTokenSigner, TokenSigner};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer = HmacTokenSigner::new("a-secret-of-at-least-thirty-two-bytes!");
/// let user_id = Uuid::new_v4();
///
/// let issued = signer.issue(user_id)?;
/// let claims = signer.validate(&issued.access_token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "taskden";

/// Default access token lifetime in minutes
pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Bad signature, wrong issuer, or malformed token
    #[error("Invalid token: {0}")]
    Invalid(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// JWT claims structure
///
/// - `sub`: Subject (identity key)
/// - `iss`: Issuer (always "taskden")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - identity key of the authenticated user
    pub sub: Uuid,

    /// Issuer - Always "taskden"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims issued at `issued_at` and valid for `ttl`
    pub fn new(subject: Uuid, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        let expiration = issued_at + ttl;

        Self {
            sub: subject,
            iss: ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
            nbf: issued_at.timestamp(),
        }
    }

    /// Checks if token has expired
    ///
    /// A token is valid only while the current time is strictly before `exp`.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// A freshly issued bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedToken {
    /// Encoded JWT
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,

    /// Lifetime in seconds
    pub expires_in: i64,
}

/// Signs and verifies bearer tokens
pub trait TokenSigner: Send + Sync + 'static {
    /// Issues a token for `subject` starting now
    fn issue(&self, subject: Uuid) -> Result<IssuedToken, JwtError>;

    /// Verifies signature and timing and returns the claims
    fn validate(&self, token: &str) -> Result<Claims, JwtError>;
}

/// HMAC-SHA256 implementation of [`TokenSigner`]
#[derive(Clone)]
pub struct HmacTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for HmacTokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacTokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl HmacTokenSigner {
    /// Creates a signer with the default 30 minute lifetime
    ///
    /// The secret should be at least 32 bytes; the API config refuses to
    /// start with anything shorter.
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::minutes(DEFAULT_TTL_MINUTES))
    }

    /// Creates a signer with a custom token lifetime
    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a token as if the clock read `issued_at`
    pub fn issue_at(&self, subject: Uuid, issued_at: DateTime<Utc>) -> Result<IssuedToken, JwtError> {
        let claims = Claims::new(subject, issued_at, self.ttl);
        let header = Header::new(Algorithm::HS256);

        let access_token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.ttl.num_seconds(),
        })
    }
}

impl TokenSigner for HmacTokenSigner {
    fn issue(&self, subject: Uuid) -> Result<IssuedToken, JwtError> {
        self.issue_at(subject, Utc::now())
    }

    fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            }
        })?;

        // jsonwebtoken still accepts `exp == now`
        if token_data.claims.is_expired() {
            return Err(JwtError::Expired);
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Utc::now(), Duration::minutes(30));

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(!claims.is_expired());

        let at_expiry = Claims::new(
            user_id,
            Utc::now() - Duration::minutes(30),
            Duration::minutes(30),
        );
        assert!(at_expiry.is_expired());
    }

    #[test]
    fn test_issue_and_validate() {
        let signer = HmacTokenSigner::new(SECRET);
        let user_id = Uuid::new_v4();

        let issued = signer.issue(user_id).expect("Should issue token");
        assert_eq!(issued.token_type, "bearer");
        assert_eq!(issued.expires_in, 1800);

        let claims = signer.validate(&issued.access_token).expect("Should validate");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let issued = HmacTokenSigner::new(SECRET).issue(Uuid::new_v4()).unwrap();
        let other = HmacTokenSigner::new("another-secret-key-at-least-32-bytes");

        assert!(matches!(
            other.validate(&issued.access_token),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_expired_token() {
        let signer = HmacTokenSigner::new(SECRET);
        let user_id = Uuid::new_v4();

        // Valid just before the window closes
        let fresh = signer
            .issue_at(user_id, Utc::now() - Duration::minutes(29))
            .unwrap();
        assert_eq!(signer.validate(&fresh.access_token).unwrap().sub, user_id);

        // Rejected once the 30 minute window has passed
        let stale = signer
            .issue_at(user_id, Utc::now() - Duration::minutes(31))
            .unwrap();
        assert!(matches!(
            signer.validate(&stale.access_token),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_validate_rejects_token_at_exact_expiry() {
        let signer = HmacTokenSigner::new(SECRET);
        let user_id = Uuid::new_v4();

        for _ in 0..20 {
            let issued = signer.issue_at(user_id, Utc::now() - signer.ttl).unwrap();
            assert!(matches!(
                signer.validate(&issued.access_token),
                Err(JwtError::Expired)
            ));
        }

        // Just inside the window is still valid
        let edge = signer
            .issue_at(user_id, Utc::now() - signer.ttl + Duration::seconds(2))
            .unwrap();
        assert_eq!(signer.validate(&edge.access_token).unwrap().sub, user_id);
    }

    #[test]
    fn test_validate_malformed_token() {
        let signer = HmacTokenSigner::new(SECRET);

        assert!(matches!(signer.validate("not-a-jwt"), Err(JwtError::Invalid(_))));
        assert!(matches!(signer.validate(""), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_validate_tampered_token() {
        let signer = HmacTokenSigner::new(SECRET);
        let issued = signer.issue(Uuid::new_v4()).unwrap();
        let other = signer.issue(Uuid::new_v4()).unwrap();
        let forged_payload = other.access_token.split('.').nth(1).unwrap();

        let mut parts: Vec<&str> = issued.access_token.split('.').collect();
        parts[1] = forged_payload;
        let forged = parts.join(".");

        // Valid payload from another token, but signature belongs to the first
        assert!(matches!(signer.validate(&forged), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let claims = Claims {
            iss: "someone-else".to_string(),
            ..Claims::new(Uuid::new_v4(), Utc::now(), Duration::minutes(5))
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let signer = HmacTokenSigner::new(SECRET);
        assert!(matches!(signer.validate(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_payload_has_no_secret_material() {
        let signer = HmacTokenSigner::new(SECRET);
        let issued = signer.issue(Uuid::new_v4()).unwrap();
        assert!(!issued.access_token.contains(SECRET));

        let claims = signer.validate(&issued.access_token).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn test_debug_redacts_keys() {
        let signer = HmacTokenSigner::new(SECRET);
        let debug = format!("{:?}", signer);
        assert!(!debug.contains(SECRET));
    }
}
