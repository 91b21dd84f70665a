use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Vendor,
    Admin,
}

/// An authenticated identity and the roles granted to it. Every actor holds
/// `Role::User` implicitly; `Role::Vendor` is added when a vendor profile is
/// created and is never revoked.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: Uuid,
    pub roles: HashSet<Role>,
}

impl Actor {
    pub fn new(id: Uuid, granted: impl IntoIterator<Item = Role>) -> Self {
        let mut roles: HashSet<Role> = granted.into_iter().collect();
        roles.insert(Role::User);
        Self { id, roles }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// One granted role, persisted as a row in `user_roles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: Role,
    #[serde(with = "chrono::serde::ts_microseconds")]
    pub granted_at: DateTime<Utc>,
}

impl RoleAssignment {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            role,
            granted_at: Utc::now(),
        }
    }
}
