/// Signup, login and per-request authorization
///
/// The gateway sits between the HTTP layer and the credential store. It owns
/// the password policy, runs hashing off the async executor, and turns a
/// bearer token back into a live identity.
///
/// # Failure uniformity
///
/// `login` answers `CoreError::InvalidCredentials` for both an unknown email
/// and a wrong password. An unknown email still pays for one verification
/// against a throwaway hash, so timing does not reveal registration.
/// `authorize` answers `InvalidToken` or `ExpiredToken`;
/// the HTTP layer collapses all three into one 401.

use std::sync::Arc;

use tokio::sync::OnceCell;

use super::{
    jwt::{IssuedToken, TokenSigner},
    password::{validate_password, PasswordHasher},
};
use crate::error::{CoreError, CoreResult};
use crate::models::user::{CredentialStore, NewUser, User};

// Verified against when the email is unknown
const DUMMY_PASSWORD: &str = "taskden-timing-equalizer";

/// Authentication gateway
#[derive(Clone)]
pub struct AuthGateway {
    credentials: Arc<CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn TokenSigner>,
    min_password_length: usize,
    dummy_hash: Arc<OnceCell<String>>,
}

impl std::fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGateway")
            .field("min_password_length", &self.min_password_length)
            .finish_non_exhaustive()
    }
}

impl AuthGateway {
    /// Creates a gateway that accepts any non-empty password
    pub fn new(
        credentials: Arc<CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self {
            credentials,
            hasher,
            signer,
            min_password_length: 1,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Raises the minimum password length
    pub fn with_min_password_length(mut self, min_length: usize) -> Self {
        self.min_password_length = min_length.max(1);
        self
    }

    /// Credential store backing this gateway
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Registers a new identity
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` for a blank email or a password below policy
    /// - `CoreError::AlreadyExists` if the email is taken
    /// - `CoreError::Internal` if hashing fails
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> CoreResult<User> {
        if email.trim().is_empty() {
            return Err(CoreError::Validation("Email must not be empty".to_string()));
        }
        validate_password(password, self.min_password_length).map_err(CoreError::Validation)?;

        let password_hash = self.hash(password).await?;

        let user = self
            .credentials
            .insert(NewUser {
                email: email.to_string(),
                password_hash,
                name,
            })
            .await?;

        let users = self.credentials.len().await;
        tracing::info!(
            user_id = %user.id,
            users = users,
            "user signed up"
        );
        Ok(user)
    }

    /// Exchanges email and password for a bearer token
    ///
    /// # Errors
    ///
    /// - `CoreError::InvalidCredentials` for an unknown email or wrong password
    /// - `CoreError::Internal` if verification or signing fails
    pub async fn login(&self, email: &str, password: &str) -> CoreResult<IssuedToken> {
        let credential = match self.credentials.find_credential(email).await {
            Some(credential) => credential,
            None => {
                tracing::debug!("login for unknown email");
                let dummy = self
                    .dummy_hash
                    .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
                    .await?
                    .clone();
                self.verify(password, dummy).await?;
                return Err(CoreError::InvalidCredentials);
            }
        };

        if !self.verify(password, credential.password_hash).await? {
            tracing::debug!(user_id = %credential.user.id, "login with wrong password");
            return Err(CoreError::InvalidCredentials);
        }

        let token = self.signer.issue(credential.user.id)?;
        tracing::info!(user_id = %credential.user.id, "user logged in");
        Ok(token)
    }

    /// Resolves a bearer token to the identity it was issued for
    ///
    /// # Errors
    ///
    /// - `CoreError::ExpiredToken` once the lifetime has elapsed
    /// - `CoreError::InvalidToken` for a bad token or an unknown subject
    pub async fn authorize(&self, token: &str) -> CoreResult<User> {
        let claims = self.signer.validate(token)?;

        self.credentials
            .find_by_id(claims.sub)
            .await
            .ok_or(CoreError::InvalidToken)
    }

    async fn hash(&self, password: &str) -> CoreResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| CoreError::Internal(format!("hashing task failed: {}", e)))?
            .map_err(CoreError::from)
    }

    async fn verify(&self, password: &str, hash: String) -> CoreResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| CoreError::Internal(format!("verification task failed: {}", e)))?
            .map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{HmacTokenSigner, JwtError};
    use crate::auth::password::{Argon2Hasher, PasswordError};
    use chrono::{Duration, Utc};

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    /// Reversible stand-in; only for tests
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, PasswordError> {
            Ok(format!("plain${}", password))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
            hash.strip_prefix("plain$")
                .map(|stored| stored == password)
                .ok_or_else(|| PasswordError::InvalidHash(hash.to_string()))
        }
    }

    fn gateway() -> (AuthGateway, Arc<HmacTokenSigner>) {
        let signer = Arc::new(HmacTokenSigner::new(SECRET));
        let gateway = AuthGateway::new(
            Arc::new(CredentialStore::new()),
            Arc::new(PlainHasher),
            signer.clone(),
        );
        (gateway, signer)
    }

    #[tokio::test]
    async fn test_signup_login_authorize() {
        let (gateway, _) = gateway();

        let user = gateway
            .signup("alice@example.com", "pw123", Some("Alice".to_string()))
            .await
            .unwrap();
        let token = gateway.login("alice@example.com", "pw123").await.unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 30 * 60);

        let resolved = gateway.authorize(&token.access_token).await.unwrap();
        assert_eq!(resolved, user);
    }

    #[tokio::test]
    async fn test_signup_stores_hash_not_plaintext() {
        let (gateway, _) = gateway();
        gateway.signup("bob@example.com", "pw123", None).await.unwrap();

        let cred = gateway
            .credentials()
            .find_credential("bob@example.com")
            .await
            .unwrap();
        assert_ne!(cred.password_hash, "pw123");
    }

    #[tokio::test]
    async fn test_signup_duplicate() {
        let (gateway, _) = gateway();
        gateway.signup("carol@example.com", "pw", None).await.unwrap();

        let err = gateway
            .signup("carol@example.com", "other", None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_signup_rejects_empty_inputs() {
        let (gateway, _) = gateway();

        let err = gateway.signup("", "pw", None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = gateway.signup("dan@example.com", "", None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        assert!(gateway.credentials().is_empty().await);
    }

    #[tokio::test]
    async fn test_min_password_length_policy() {
        let (gateway, _) = gateway();
        let gateway = gateway.with_min_password_length(8);

        let err = gateway.signup("erin@example.com", "short", None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        assert!(gateway
            .signup("erin@example.com", "long-enough", None)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_login_failures_are_uniform() {
        let (gateway, _) = gateway();
        gateway.signup("frank@example.com", "right", None).await.unwrap();

        let wrong_password = gateway.login("frank@example.com", "wrong").await.unwrap_err();
        let unknown_email = gateway.login("nobody@example.com", "right").await.unwrap_err();

        assert_eq!(wrong_password, CoreError::InvalidCredentials);
        assert_eq!(unknown_email, wrong_password);
    }

    /// Plain hasher that counts verifications
    #[derive(Default)]
    struct CountingHasher {
        verifies: std::sync::atomic::AtomicUsize,
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, PasswordError> {
            PlainHasher.hash(password)
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
            self.verifies
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            PlainHasher.verify(password, hash)
        }
    }

    #[tokio::test]
    async fn test_unknown_email_still_verifies() {
        let hasher = Arc::new(CountingHasher::default());
        let gateway = AuthGateway::new(
            Arc::new(CredentialStore::new()),
            hasher.clone(),
            Arc::new(HmacTokenSigner::new(SECRET)),
        );
        gateway.signup("jo@example.com", "pw", None).await.unwrap();

        let count = || hasher.verifies.load(std::sync::atomic::Ordering::SeqCst);

        gateway.login("jo@example.com", "wrong").await.unwrap_err();
        assert_eq!(count(), 1);

        // Same amount of hashing work when nobody is registered under the email
        for _ in 0..2 {
            let err = gateway.login("nobody@example.com", "pw").await.unwrap_err();
            assert_eq!(err, CoreError::InvalidCredentials);
        }
        assert_eq!(count(), 3);

        // The throwaway password never authenticates anyone
        let err = gateway
            .login("nobody@example.com", DUMMY_PASSWORD)
            .await
            .unwrap_err();
        assert_eq!(err, CoreError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_authorize_expired_token() {
        let (gateway, signer) = gateway();
        let user = gateway.signup("gina@example.com", "pw", None).await.unwrap();

        let stale = signer
            .issue_at(user.id, Utc::now() - Duration::minutes(31))
            .unwrap();
        let err = gateway.authorize(&stale.access_token).await.unwrap_err();
        assert_eq!(err, CoreError::ExpiredToken);

        let fresh = signer
            .issue_at(user.id, Utc::now() - Duration::minutes(29))
            .unwrap();
        assert!(gateway.authorize(&fresh.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_unknown_subject() {
        let (gateway, signer) = gateway();

        let orphan = signer.issue(uuid::Uuid::new_v4()).unwrap();
        let err = gateway.authorize(&orphan.access_token).await.unwrap_err();
        assert_eq!(err, CoreError::InvalidToken);
    }

    #[tokio::test]
    async fn test_authorize_foreign_signature() {
        let (gateway, _) = gateway();
        let user = gateway.signup("hank@example.com", "pw", None).await.unwrap();

        let foreign = HmacTokenSigner::new("another-secret-that-is-also-32-bytes-long");
        let token = foreign.issue(user.id).unwrap();

        let err = gateway.authorize(&token.access_token).await.unwrap_err();
        assert_eq!(err, CoreError::InvalidToken);
        assert_eq!(
            CoreError::from(JwtError::Invalid("x".into())),
            CoreError::InvalidToken
        );
    }

    #[tokio::test]
    async fn test_with_argon2() {
        let gateway = AuthGateway::new(
            Arc::new(CredentialStore::new()),
            Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()),
            Arc::new(HmacTokenSigner::new(SECRET)),
        );

        gateway.signup("ivy@example.com", "pw123", None).await.unwrap();
        assert!(gateway.login("ivy@example.com", "pw123").await.is_ok());
        assert_eq!(
            gateway.login("ivy@example.com", "pw124").await.unwrap_err(),
            CoreError::InvalidCredentials
        );
    }
}
