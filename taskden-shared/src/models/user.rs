/// Identity records and the credential store
///
/// One record per registered email. The store keeps the password hash next
/// to the public [`User`] record but only hands it out through
/// [`CredentialStore::find_credential`], which the auth gateway uses for
/// verification.
///
/// # Email policy
///
/// Emails are case-insensitive: they are trimmed and lower-cased before any
/// insert or lookup, so `Alice@Example.com` and `alice@example.com` are the
/// same identity.
///
/// # Example
///
/// ```
/// use taskden_shared::models::user::{CredentialStore, NewUser};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = CredentialStore::new();
///
/// let user = store.insert(NewUser {
///     email: "Alice@Example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     name: Some("Alice".to_string()),
/// }).await?;
///
/// assert_eq!(user.email, "alice@example.com");
/// assert!(store.find_credential("ALICE@example.com").await.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Public identity record
///
/// Never carries the password hash, so it is safe to serialize into
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Identity key (UUID v4); token subject and todo owner
    pub id: Uuid,

    /// Normalized email address, unique across all users
    pub email: String,

    /// Optional display name
    pub name: Option<String>,

    /// When the identity was registered
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new identity
///
/// Takes the hash, not the plaintext password.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address (normalized on insert)
    pub email: String,

    /// Password hash produced by a `PasswordHasher`
    pub password_hash: String,

    /// Optional display name
    pub name: Option<String>,
}

/// A user together with their stored password hash
#[derive(Clone)]
pub struct Credential {
    /// Public record
    pub user: User,

    /// Stored password hash
    pub password_hash: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user", &self.user)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Default)]
struct Credentials {
    by_id: HashMap<Uuid, Credential>,
    by_email: HashMap<String, Uuid>,
}

/// In-memory credential store
///
/// All state sits behind a single `RwLock`; each operation is one critical
/// section, so a duplicate check and its insert can never interleave with
/// another registration.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<Credentials>,
}

/// Normalizes an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl CredentialStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new identity
    ///
    /// # Errors
    ///
    /// - `CoreError::Validation` if the email is blank or the hash is empty
    /// - `CoreError::AlreadyExists` if the email is already registered
    pub async fn insert(&self, data: NewUser) -> CoreResult<User> {
        let email = normalize_email(&data.email);
        if email.is_empty() {
            return Err(CoreError::Validation("Email must not be empty".to_string()));
        }
        if data.password_hash.is_empty() {
            return Err(CoreError::Validation(
                "Password hash must not be empty".to_string(),
            ));
        }

        let name = data
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let mut inner = self.inner.write().await;
        if inner.by_email.contains_key(&email) {
            return Err(CoreError::AlreadyExists(
                "Email already registered".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.clone(),
            name,
            created_at: Utc::now(),
        };

        inner.by_email.insert(email, user.id);
        inner.by_id.insert(
            user.id,
            Credential {
                user: user.clone(),
                password_hash: data.password_hash,
            },
        );

        tracing::debug!(user_id = %user.id, "identity registered");
        Ok(user)
    }

    /// Looks up a user and their hash by email
    pub async fn find_credential(&self, email: &str) -> Option<Credential> {
        let email = normalize_email(email);
        let inner = self.inner.read().await;

        inner
            .by_email
            .get(&email)
            .and_then(|id| inner.by_id.get(id))
            .cloned()
    }

    /// Finds a user by identity key
    pub async fn find_by_id(&self, id: Uuid) -> Option<User> {
        self.inner
            .read()
            .await
            .by_id
            .get(&id)
            .map(|c| c.user.clone())
    }

    /// Number of registered identities
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// True when nobody has registered yet
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
