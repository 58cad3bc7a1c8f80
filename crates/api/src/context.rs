use inventoryflow_auth::Role;
use inventoryflow_core::OwnerId;

/// Authenticated owner of a request.
///
/// Inserted by the auth middleware; every protected handler scopes its store
/// calls with `owner_id()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerContext {
    owner_id: OwnerId,
    roles: Vec<Role>,
}

impl OwnerContext {
    pub fn new(owner_id: OwnerId, roles: Vec<Role>) -> Self {
        Self { owner_id, roles }
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}
