//! Credential verification: Basic header → stored principal.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::{verify_blocking, AuthError, BasicCredentials, Principal, SecretVerifier};

/// Failure of the user lookup collaborator itself (not "user not found").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct LookupError(pub String);

/// Resolves a principal by email address.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, LookupError>;
}

#[async_trait]
impl<L> UserLookup for Arc<L>
where
    L: UserLookup + ?Sized,
{
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, LookupError> {
        (**self).find_by_email(email).await
    }
}

/// Authenticates requests from their raw `Authorization` header.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserLookup>,
    secrets: Arc<dyn SecretVerifier>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserLookup>, secrets: Arc<dyn SecretVerifier>) -> Self {
        Self { users, secrets }
    }

    /// Resolve the principal behind `header`.
    ///
    /// - absent/malformed header → [`AuthError::Missing`]
    /// - unknown email or wrong secret → [`AuthError::InvalidCredentials`]
    /// - lookup collaborator failure → [`AuthError::Lookup`]
    /// - hashing task failure → [`AuthError::Verification`]
    pub async fn verify(&self, header: Option<&str>) -> Result<Principal, AuthError> {
        let credentials = BasicCredentials::parse(header)?;

        let principal = self
            .users
            .find_by_email(&credentials.email)
            .await
            .map_err(|e| AuthError::Lookup(e.to_string()))?
            .ok_or_else(|| {
                tracing::warn!(email = %credentials.email, "user not found");
                AuthError::InvalidCredentials
            })?;

        let matches = verify_blocking(
            self.secrets.clone(),
            credentials.secret,
            principal.password_hash.clone(),
        )
        .await
        .map_err(|e| AuthError::Verification(e.to_string()))?;

        if !matches {
            tracing::warn!(user_id = %principal.id, "authentication failure");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::debug!(user_id = %principal.id, "authenticated");
        Ok(principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;

    use coursehub_core::UserId;

    use crate::{BcryptHasher, SecretHasher};

    struct MapLookup(HashMap<String, Principal>);

    #[async_trait]
    impl UserLookup for MapLookup {
        async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, LookupError> {
            Ok(self.0.get(email).cloned())
        }
    }

    struct BrokenLookup;

    #[async_trait]
    impl UserLookup for BrokenLookup {
        async fn find_by_email(&self, _email: &str) -> Result<Option<Principal>, LookupError> {
            Err(LookupError("connection refused".to_string()))
        }
    }

    fn verifier() -> CredentialVerifier {
        let hasher = Arc::new(BcryptHasher::fastest());
        let now = Utc::now();
        let joe = Principal {
            id: UserId::new(1),
            first_name: "Joe".to_string(),
            last_name: "Smith".to_string(),
            email_address: "joe@smith.com".to_string(),
            password_hash: hasher.hash("joepassword").unwrap(),
            created_at: now,
            updated_at: now,
        };
        let users = MapLookup(HashMap::from([(joe.email_address.clone(), joe)]));
        CredentialVerifier::new(Arc::new(users), hasher)
    }

    fn header(email: &str, secret: &str) -> String {
        BasicCredentials::new(email, secret).to_header_value()
    }

    #[tokio::test]
    async fn valid_credentials_resolve_the_principal() {
        let principal = verifier()
            .verify(Some(&header("joe@smith.com", "joepassword")))
            .await
            .unwrap();
        assert_eq!(principal.id, UserId::new(1));
    }

    #[tokio::test]
    async fn absent_header_is_missing() {
        assert_eq!(verifier().verify(None).await, Err(AuthError::Missing));
    }

    #[tokio::test]
    async fn unknown_user_is_invalid() {
        let result = verifier()
            .verify(Some(&header("sally@jones.com", "joepassword")))
            .await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let result = verifier()
            .verify(Some(&header("joe@smith.com", "wrong")))
            .await;
        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    struct PanickingVerifier;

    impl SecretVerifier for PanickingVerifier {
        fn verify(&self, _plain: &str, _hash: &crate::PasswordHash) -> bool {
            panic!("hasher crashed")
        }
    }

    #[tokio::test]
    async fn crashed_secret_check_is_not_a_credential_error() {
        let joe_lookup = verifier().users;
        let v = CredentialVerifier::new(joe_lookup, Arc::new(PanickingVerifier));
        let result = v.verify(Some(&header("joe@smith.com", "joepassword"))).await;
        assert!(matches!(result, Err(AuthError::Verification(_))));
    }

    #[tokio::test]
    async fn lookup_failure_is_not_a_credential_error() {
        let v = CredentialVerifier::new(Arc::new(BrokenLookup), Arc::new(BcryptHasher::fastest()));
        let result = v.verify(Some(&header("joe@smith.com", "x"))).await;
        assert!(matches!(result, Err(AuthError::Lookup(_))));
    }
}
