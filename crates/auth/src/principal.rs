use chrono::{DateTime, Utc};

use coursehub_core::{Entity, UserId};

use crate::PasswordHash;

/// A stored user account, as resolved for authentication.
///
/// `password_hash` never leaves the process: API responses are built from
/// the public fields only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password_hash: PasswordHash,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Principal {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
