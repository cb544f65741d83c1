//! The user directory collaborator: resolves doctor and patient ids to
//! accounts and display names.

use std::collections::{BTreeSet, HashMap};

use access_policy::{Role, UserId};
use serde::{Deserialize, Serialize};

/// The directory's view of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl UserRecord {
    pub fn new(id: UserId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

pub trait UserDirectory: Send + Sync {
    fn lookup(&self, id: UserId) -> Option<UserRecord>;
}

/// Fixed in-memory directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    users: HashMap<UserId, UserRecord>,
}

impl MemoryDirectory {
    pub fn new(users: impl IntoIterator<Item = UserRecord>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

impl UserDirectory for MemoryDirectory {
    fn lookup(&self, id: UserId) -> Option<UserRecord> {
        self.users.get(&id).cloned()
    }
}
