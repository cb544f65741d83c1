//! Boolean rule trees over role and context predicates.
//!
//! A rule is a small expression tree: leaves test the credential set, and
//! `AllOf`/`AnyOf` nodes combine sub-rules. Rules are configuration data,
//! built once at startup and shared read-only afterwards.

use serde::{Deserialize, Serialize};

use crate::credentials::{Context, CredentialSet, Role};
use crate::error::{PolicyError, Result};

/// An access rule.
///
/// Serialized externally tagged with snake_case tags, e.g.
/// `{"all_of": [{"has_role": "ADMIN"}, {"has_context": "STAFF"}]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The caller holds this role.
    HasRole(Role),
    /// The caller holds at least one of these roles.
    HasAnyRole(Vec<Role>),
    /// The caller is acting in this context.
    HasContext(Context),
    /// Every sub-rule holds.
    AllOf(Vec<Rule>),
    /// At least one sub-rule holds.
    AnyOf(Vec<Rule>),
}

impl Rule {
    pub fn has_any_role(roles: impl IntoIterator<Item = Role>) -> Self {
        Rule::HasAnyRole(roles.into_iter().collect())
    }

    pub fn all_of(rules: impl IntoIterator<Item = Rule>) -> Self {
        Rule::AllOf(rules.into_iter().collect())
    }

    pub fn any_of(rules: impl IntoIterator<Item = Rule>) -> Self {
        Rule::AnyOf(rules.into_iter().collect())
    }

    /// `AllOf(HasRole(role), HasContext(context))`, the shape most clinic rules take.
    pub fn role_in_context(role: Role, context: Context) -> Self {
        Rule::all_of([Rule::HasRole(role), Rule::HasContext(context)])
    }

    /// Check that no combinator or role list in the tree is empty.
    ///
    /// [`evaluate`] already denies on such nodes; validating up front turns a
    /// silent deny into a startup failure.
    pub fn validate(&self) -> Result<()> {
        match self {
            Rule::HasRole(_) | Rule::HasContext(_) => Ok(()),
            Rule::HasAnyRole(roles) if roles.is_empty() => Err(PolicyError::EmptyRoleSet),
            Rule::HasAnyRole(_) => Ok(()),
            Rule::AllOf(rules) if rules.is_empty() => Err(PolicyError::EmptyCombinator("AllOf")),
            Rule::AnyOf(rules) if rules.is_empty() => Err(PolicyError::EmptyCombinator("AnyOf")),
            Rule::AllOf(rules) | Rule::AnyOf(rules) => rules.iter().try_for_each(Rule::validate),
        }
    }
}

/// Decide whether `credentials` satisfy `rule`.
///
/// `AllOf` stops at the first false child and `AnyOf` at the first true one.
/// Empty `AllOf`, `AnyOf` and `HasAnyRole` nodes evaluate to `false`.
pub fn evaluate(rule: &Rule, credentials: &CredentialSet) -> bool {
    match rule {
        Rule::HasRole(role) => credentials.has_role(*role),
        Rule::HasAnyRole(roles) => roles.iter().any(|r| credentials.has_role(*r)),
        Rule::HasContext(context) => credentials.has_context(*context),
        Rule::AllOf(rules) => !rules.is_empty() && rules.iter().all(|r| evaluate(r, credentials)),
        Rule::AnyOf(rules) => rules.iter().any(|r| evaluate(r, credentials)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::UserId;

    #[test]
    fn empty_combinators_deny() {
        let creds = CredentialSet::new(UserId(1))
            .with_role(Role::Admin)
            .with_context(Context::Staff);
        assert!(!evaluate(&Rule::AllOf(vec![]), &creds));
        assert!(!evaluate(&Rule::AnyOf(vec![]), &creds));
        assert!(!evaluate(&Rule::HasAnyRole(vec![]), &creds));
    }

    #[test]
    fn validate_finds_nested_empty_node() {
        let rule = Rule::any_of([
            Rule::HasRole(Role::Doctor),
            Rule::all_of([Rule::HasContext(Context::Staff), Rule::AnyOf(vec![])]),
        ]);
        assert!(matches!(
            rule.validate(),
            Err(PolicyError::EmptyCombinator("AnyOf"))
        ));
    }

    #[test]
    fn json_shape() {
        let rule = Rule::role_in_context(Role::Admin, Context::Staff);
        let json = serde_json::to_string(&rule).unwrap();
        assert_eq!(json, r#"{"all_of":[{"has_role":"ADMIN"},{"has_context":"STAFF"}]}"#);
    }
}
