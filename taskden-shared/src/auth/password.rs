/// Password hashing behind the [`PasswordHasher`] capability
///
/// The gateway only ever talks to the trait, so tests can swap in a cheap
/// fake. The production implementation is [`Argon2Hasher`].
///
/// # Security
///
/// - **Algorithm**: Argon2id (memory-hard, salted)
/// - **Memory**: 64 MB (65536 KB) by default
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash in PHC string format
///
/// Verification is constant-time with respect to the hash comparison.
///
/// # Example
///
/// ```
/// use taskden_shared::auth::password::{Argon2Hasher, PasswordHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Argon2Hasher::new()?;
/// let hash = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify("super_secret_password_123", &hash)?);
/// assert!(!hasher.verify("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, Params, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// One-way, salted password hashing
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hashes a plaintext password into a self-describing string
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Checks a plaintext password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch; `Err` only for unusable hashes.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id implementation of [`PasswordHasher`]
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Creates a hasher with the default cost parameters (64 MB, t=3, p=4)
    pub fn new() -> Result<Self, PasswordError> {
        Self::with_params(65536, 3, 4)
    }

    /// Creates a hasher with explicit cost parameters
    ///
    /// # Arguments
    ///
    /// * `m_cost` - Memory in KiB (at least 8 × `p_cost`)
    /// * `t_cost` - Number of passes
    /// * `p_cost` - Parallel lanes
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(m_cost)
            .t_cost(t_cost)
            .p_cost(p_cost)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

        // Parameters come from the PHC string, not from self
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
        }
    }
}

/// Validates a candidate password against the configured minimum length
///
/// The core only demands a non-empty password; `min_length` lets deployments
/// tighten that. Length is counted in characters, not bytes.
///
/// # Example
///
/// ```
/// use taskden_shared::auth::password::validate_password;
///
/// assert!(validate_password("pw123", 1).is_ok());
/// assert!(validate_password("", 1).is_err());
/// assert!(validate_password("short", 8).is_err());
/// ```
pub fn validate_password(password: &str, min_length: usize) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password must not be empty".to_string());
    }

    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {} characters long",
            min_length
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(1024, 1, 1).expect("valid params")
    }

    #[test]
    fn test_default_hash_parameters() {
        let hasher = Argon2Hasher::new().expect("default params");
        let hash = hasher.hash("test_password_123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = fast_hasher().hash("pw123-plaintext").unwrap();
        assert!(!hash.contains("pw123-plaintext"));
    }

    #[test]
    fn test_hash_produces_different_salts() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("same_password").unwrap();
        let hash2 = hasher.hash("same_password").unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_correct_and_incorrect() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct_password").unwrap();

        assert!(hasher.verify("correct_password", &hash).unwrap());
        assert!(!hasher.verify("wrong_password", &hash).unwrap());
        assert!(!hasher.verify("", &hash).unwrap());
    }

    #[test]
    fn test_verify_uses_embedded_parameters() {
        let hash = fast_hasher().hash("pw").unwrap();
        let other = Argon2Hasher::with_params(2048, 2, 1).unwrap();

        assert!(other.verify("pw", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = fast_hasher();
        assert!(hasher.verify("password", "invalid_hash").is_err());
        assert!(hasher.verify("password", "$argon2id$invalid").is_err());
    }

    #[test]
    fn test_invalid_params_rejected() {
        // m_cost must be at least 8 * p_cost
        assert!(Argon2Hasher::with_params(8, 1, 4).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("x", 1).is_ok());
        assert!(validate_password("pw123", 5).is_ok());

        let err = validate_password("", 1).unwrap_err();
        assert!(err.contains("must not be empty"));

        let err = validate_password("pw123", 8).unwrap_err();
        assert!(err.contains("at least 8 characters"));

        // Multi-byte characters count once
        assert!(validate_password("密码", 2).is_ok());
    }
}
