use coursehub_auth::Principal;
use coursehub_core::UserId;

/// The authenticated user for a request.
///
/// Inserted by the auth middleware on protected routes; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    principal: Principal,
}

impl CurrentUser {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn id(&self) -> UserId {
        self.principal.id
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
