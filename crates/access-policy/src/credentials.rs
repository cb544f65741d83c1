//! Role and context tags, and the credential set handed over by the identity layer.
//!
//! Roles say what an account *is* (a doctor, a patient); contexts say in which
//! capacity the caller is *acting* for this request. A doctor who is also a
//! patient of the clinic signs in under either the STAFF or the PATIENT context.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Opaque identifier of an account (the caller, a doctor or a patient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Patient,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Doctor, Role::Nurse, Role::Patient];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
            Role::Patient => "PATIENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `doctor`, `DOCTOR` and the authority form `ROLE_DOCTOR`.
impl FromStr for Role {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == name)
            .ok_or_else(|| PolicyError::UnknownName {
                kind: "role",
                value: s.to_string(),
            })
    }
}

/// Capacity the caller is acting in for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Context {
    Staff,
    Patient,
}

impl Context {
    pub const ALL: [Context; 2] = [Context::Staff, Context::Patient];

    pub fn as_str(self) -> &'static str {
        match self {
            Context::Staff => "STAFF",
            Context::Patient => "PATIENT",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `staff`, `STAFF` and the authority form `CONTEXT_STAFF`.
impl FromStr for Context {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("CONTEXT_").unwrap_or(&upper);
        Context::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| PolicyError::UnknownName {
                kind: "context",
                value: s.to_string(),
            })
    }
}

/// The caller's credentials for one request. Immutable once built; the core
/// trusts it as-is and never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    #[serde(default)]
    pub contexts: BTreeSet<Context>,
    pub subject_id: UserId,
}

impl CredentialSet {
    /// Credentials with no roles and no contexts. Such a caller is denied by
    /// every well-formed rule.
    pub fn new(subject_id: UserId) -> Self {
        Self {
            roles: BTreeSet::new(),
            contexts: BTreeSet::new(),
            subject_id,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.contexts.insert(context);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_context(&self, context: Context) -> bool {
        self.contexts.contains(&context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_authority_prefixes() {
        assert_eq!("ROLE_NURSE".parse::<Role>().unwrap(), Role::Nurse);
        assert_eq!("doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert_eq!("CONTEXT_PATIENT".parse::<Context>().unwrap(), Context::Patient);
        assert!("janitor".parse::<Role>().is_err());
        assert!("CONTEXT_ADMIN".parse::<Context>().is_err());
    }

    #[test]
    fn serializes_as_upper_case_tags() {
        let creds = CredentialSet::new(UserId(7))
            .with_role(Role::Patient)
            .with_context(Context::Patient);
        let json = serde_json::to_string(&creds).unwrap();
        assert_eq!(
            json,
            r#"{"roles":["PATIENT"],"contexts":["PATIENT"],"subject_id":7}"#
        );
    }
}
