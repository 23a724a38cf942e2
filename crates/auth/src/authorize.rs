use thiserror::Error;

use coursehub_core::Owned;

use crate::Principal;

/// Message returned to clients when a mutation is refused.
pub const NOT_OWNER_MESSAGE: &str = "Not authorized to update record.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("Not authorized to update record.")]
    NotOwner,
}

/// Authorize a principal to mutate `resource`.
///
/// Strict single-owner equality: no roles, no delegation. The caller must
/// have fetched `resource` already; a missing resource is not this check's
/// concern.
///
/// - No IO
/// - No panics
pub fn authorize<R: Owned>(principal: &Principal, resource: &R) -> Result<(), AuthzError> {
    if resource.owner_id() == principal.id {
        Ok(())
    } else {
        Err(AuthzError::NotOwner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    use coursehub_core::{Entity, UserId};

    use crate::PasswordHash;

    struct Thing {
        id: u8,
        owner: UserId,
    }

    impl Entity for Thing {
        type Id = u8;

        fn id(&self) -> &Self::Id {
            &self.id
        }
    }

    impl Owned for Thing {
        fn owner_id(&self) -> UserId {
            self.owner
        }
    }

    fn principal(id: i64) -> Principal {
        let now = Utc::now();
        Principal {
            id: UserId::new(id),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email_address: "a@b.com".to_string(),
            password_hash: PasswordHash::from_encoded("x"),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_may_mutate() {
        let thing = Thing { id: 1, owner: UserId::new(3) };
        assert_eq!(authorize(&principal(3), &thing), Ok(()));
    }

    #[test]
    fn non_owner_is_refused_with_the_fixed_message() {
        let thing = Thing { id: 1, owner: UserId::new(3) };
        let err = authorize(&principal(4), &thing).unwrap_err();
        assert_eq!(err, AuthzError::NotOwner);
        assert_eq!(err.to_string(), NOT_OWNER_MESSAGE);
    }

    proptest! {
        #[test]
        fn authorized_iff_ids_match(owner in 1i64..1000, requester in 1i64..1000) {
            let thing = Thing { id: 0, owner: UserId::new(owner) };
            prop_assert_eq!(authorize(&principal(requester), &thing).is_ok(), owner == requester);
        }
    }
}
