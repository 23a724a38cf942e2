//! Store and credential wiring shared by every handler.

use std::sync::Arc;

use coursehub_auth::{CredentialVerifier, BcryptHasher, SecretHasher, SecretVerifier};
use coursehub_infra::{CourseStore, InMemoryDatabase, PostgresStore, StoreError, UserStore, UserStoreLookup};

use crate::config::ApiConfig;

/// Everything a handler needs, injected as an `Extension`.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub courses: Arc<dyn CourseStore>,
    pub hasher: Arc<dyn SecretHasher>,
    pub verifier: CredentialVerifier,
}

impl AppServices {
    pub fn new<H>(users: Arc<dyn UserStore>, courses: Arc<dyn CourseStore>, hasher: Arc<H>) -> Self
    where
        H: SecretHasher + SecretVerifier + 'static,
    {
        let verifier = CredentialVerifier::new(
            Arc::new(UserStoreLookup(users.clone())),
            hasher.clone() as Arc<dyn SecretVerifier>,
        );
        Self {
            users,
            courses,
            hasher,
            verifier,
        }
    }

    /// In-memory stores (dev/tests).
    pub fn in_memory() -> Self {
        Self::in_memory_with_hasher(BcryptHasher::default())
    }

    /// In-memory stores with a chosen bcrypt cost (tests use the cheapest).
    pub fn in_memory_with_hasher(hasher: BcryptHasher) -> Self {
        let db = Arc::new(InMemoryDatabase::new());
        Self::new(db.clone(), db, Arc::new(hasher))
    }

    pub fn postgres(store: PostgresStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, Arc::new(BcryptHasher::default()))
    }
}

/// Build services from configuration: Postgres when a database is
/// configured, in-memory otherwise.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    match &config.database {
        Some(db) => {
            let store = PostgresStore::connect(&db.url, db.max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!(max_connections = db.max_connections, "using postgres stores");
            Ok(AppServices::postgres(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            Ok(AppServices::in_memory())
        }
    }
}
