/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing behind the `PasswordHasher` trait
/// - [`jwt`]: HS256 bearer token issuance and validation behind `TokenSigner`
/// - [`gateway`]: signup, login and per-request authorization
/// - [`middleware`]: request-level auth context and bearer header parsing
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Tokens**: HS256, 30 minute lifetime, zero leeway, no revocation
/// - **Uniform failures**: unknown email and wrong password are indistinguishable
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskden_shared::auth::{
///     gateway::AuthGateway, jwt::HmacTokenSigner, password::Argon2Hasher,
/// };
/// use taskden_shared::models::user::CredentialStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let gateway = AuthGateway::new(
///     Arc::new(CredentialStore::new()),
///     Arc::new(Argon2Hasher::new()?),
///     Arc::new(HmacTokenSigner::new("a-secret-of-at-least-thirty-two-bytes!")),
/// );
///
/// gateway.signup("alice@example.com", "pw123", None).await?;
/// let token = gateway.login("alice@example.com", "pw123").await?;
/// let user = gateway.authorize(&token.access_token).await?;
/// assert_eq!(user.email, "alice@example.com");
/// # Ok(())
/// # }
/// ```

pub mod gateway;
pub mod jwt;
pub mod middleware;
pub mod password;
