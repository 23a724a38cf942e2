//! Password hashing backed by bcrypt.
//!
//! Stored hashes are standard modular-crypt strings (`$2b$<cost>$...`), so
//! the cost a hash was produced with travels with it. bcrypt is CPU-bound:
//! async callers go through [`hash_blocking`] and [`verify_blocking`], which
//! move the work onto the blocking thread pool.

use std::sync::Arc;

use thiserror::Error;

const MIN_COST: u32 = 4;
const MAX_COST: u32 = 31;

/// An encoded password hash as stored alongside a principal.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an already-encoded hash (e.g. loaded from the database).
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password hashing failed: {0}")]
pub struct HashError(pub String);

/// Produces password hashes for new accounts.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<PasswordHash, HashError>;
}

/// Checks a plaintext secret against a stored hash.
///
/// A hash that cannot be parsed never verifies.
pub trait SecretVerifier: Send + Sync {
    fn verify(&self, plain: &str, hash: &PasswordHash) -> bool;
}

/// bcrypt with a configurable work factor.
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// `cost` is clamped to the range bcrypt accepts (4..=31).
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_COST, MAX_COST),
        }
    }

    /// Cheapest work factor; only meant for tests.
    pub fn fastest() -> Self {
        Self::new(MIN_COST)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl SecretHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<PasswordHash, HashError> {
        bcrypt::hash(plain, self.cost)
            .map(PasswordHash)
            .map_err(|e| HashError(e.to_string()))
    }
}

impl SecretVerifier for BcryptHasher {
    fn verify(&self, plain: &str, hash: &PasswordHash) -> bool {
        bcrypt::verify(plain, hash.as_str()).unwrap_or(false)
    }
}

/// Hash `plain` on the blocking pool.
pub async fn hash_blocking(
    hasher: Arc<dyn SecretHasher>,
    plain: String,
) -> Result<PasswordHash, HashError> {
    tokio::task::spawn_blocking(move || hasher.hash(&plain))
        .await
        .map_err(|e| HashError(format!("spawn_blocking failed: {e}")))?
}

/// Verify `plain` against `hash` on the blocking pool.
pub async fn verify_blocking(
    secrets: Arc<dyn SecretVerifier>,
    plain: String,
    hash: PasswordHash,
) -> Result<bool, HashError> {
    tokio::task::spawn_blocking(move || secrets.verify(&plain, &hash))
        .await
        .map_err(|e| HashError(format!("spawn_blocking failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> BcryptHasher {
        BcryptHasher::fastest()
    }

    #[test]
    fn verifies_the_original_secret() {
        let h = hasher();
        let hash = h.hash("s3cret").unwrap();
        assert!(h.verify("s3cret", &hash));
    }

    #[test]
    fn rejects_a_different_secret() {
        let h = hasher();
        let hash = h.hash("s3cret").unwrap();
        assert!(!h.verify("s3cret ", &hash));
        assert!(!h.verify("", &hash));
    }

    #[test]
    fn salts_every_hash() {
        let h = hasher();
        assert_ne!(h.hash("same").unwrap(), h.hash("same").unwrap());
    }

    #[test]
    fn hash_is_modular_crypt_and_carries_its_cost() {
        let hash = BcryptHasher::new(5).hash("pw").unwrap();
        assert!(hash.as_str().starts_with("$2b$05$"), "{}", hash.as_str());
        // A hasher configured with another cost still reads the stored one.
        assert!(BcryptHasher::new(10).verify("pw", &hash));
    }

    #[test]
    fn cost_is_clamped_to_the_bcrypt_range() {
        assert_eq!(BcryptHasher::new(0).cost(), 4);
        assert_eq!(BcryptHasher::new(99).cost(), 31);
        assert_eq!(BcryptHasher::default().cost(), bcrypt::DEFAULT_COST);
    }

    #[test]
    fn malformed_hashes_never_verify() {
        let h = hasher();
        for encoded in ["", "plain", "$2b$", "$2b$04$short", "sha256$1$00$00"] {
            assert!(!h.verify("pw", &PasswordHash::from_encoded(encoded)), "{encoded}");
        }
    }

    #[test]
    fn debug_output_is_redacted() {
        let hash = hasher().hash("pw").unwrap();
        assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
    }

    #[tokio::test]
    async fn blocking_helpers_round_trip_off_the_async_runtime() {
        let h = Arc::new(hasher());
        let hash = hash_blocking(h.clone(), "pw".to_string()).await.unwrap();
        assert!(verify_blocking(h.clone(), "pw".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_blocking(h, "nope".to_string(), hash).await.unwrap());
    }
}
