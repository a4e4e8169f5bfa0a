use serde::{Deserialize, Serialize};

use crate::domain::user::User;

string_enum! {
    /// Authorization role carried by every user account.
    pub enum Role {
        /// Platform operator; not bound to any store.
        SuperAdmin => "SUPER_ADMIN",
        /// Owner/administrator of a single store.
        StoreAdmin => "STORE_ADMIN",
        /// Store employee with catalog and order access.
        Staff => "STAFF",
        /// Shopper registered with a single store.
        Customer => "CUSTOMER",
    }
}

/// Roles allowed to run the day-to-day back office.
pub const STAFF_ROLES: &[Role] = &[Role::SuperAdmin, Role::StoreAdmin, Role::Staff];

/// Roles allowed to change store-wide settings.
pub const ADMIN_ROLES: &[Role] = &[Role::SuperAdmin, Role::StoreAdmin];

impl Role {
    pub fn is_any(&self, roles: &[Role]) -> bool {
        roles.contains(self)
    }
}

/// Identity stored in the session once a user has logged in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub store_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for AuthenticatedUser {
    fn from(value: &User) -> Self {
        Self {
            id: value.id,
            store_id: value.store_id,
            name: value.name.clone(),
            email: value.email.clone(),
            role: value.role,
        }
    }
}

/// Tenant capability derived from a session.
///
/// Repositories apply the `store_id` filter from this value; it cannot be
/// built from request input, only from an [`AuthenticatedUser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreScope {
    store_id: Option<i32>,
}

impl StoreScope {
    /// Derive the scope for `user`, or `None` when a store-bound role has no store.
    pub fn for_user(user: &AuthenticatedUser) -> Option<Self> {
        match (user.role, user.store_id) {
            (Role::SuperAdmin, _) => Some(Self { store_id: None }),
            (_, Some(store_id)) => Some(Self {
                store_id: Some(store_id),
            }),
            (_, None) => None,
        }
    }

    /// Scope for a store that was just resolved server-side (for example at
    /// registration or store creation).
    pub(crate) fn for_store(store_id: i32) -> Self {
        Self {
            store_id: Some(store_id),
        }
    }

    /// The store filter to apply, `None` meaning platform-wide.
    pub fn store_id(&self) -> Option<i32> {
        self.store_id
    }

    /// Whether a record owned by `store_id` is visible in this scope.
    pub fn allows(&self, store_id: i32) -> bool {
        self.store_id.is_none_or(|own| own == store_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, store_id: Option<i32>) -> AuthenticatedUser {
        AuthenticatedUser {
            id: 1,
            store_id,
            name: "Tester".to_string(),
            email: "tester@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn super_admin_gets_platform_scope() {
        let scope = StoreScope::for_user(&user(Role::SuperAdmin, None)).expect("scope");
        assert_eq!(scope.store_id(), None);
        assert!(scope.allows(42));
    }

    #[test]
    fn store_roles_are_bound_to_their_store() {
        let scope = StoreScope::for_user(&user(Role::Staff, Some(7))).expect("scope");
        assert_eq!(scope.store_id(), Some(7));
        assert!(scope.allows(7));
        assert!(!scope.allows(8));
    }

    #[test]
    fn store_role_without_store_has_no_scope() {
        assert!(StoreScope::for_user(&user(Role::StoreAdmin, None)).is_none());
    }

    #[test]
    fn roles_round_trip_through_strings() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().ok(), Some(*role));
        }
        assert!("OWNER".parse::<Role>().is_err());
    }
}
