//! Error types for rule validation and rule table loading.

use thiserror::Error;

use crate::table::Operation;

/// Configuration errors. These surface when a rule table is built, never
/// while a request is being evaluated.
#[derive(Error, Debug)]
pub enum PolicyError {
    /// An `AllOf` or `AnyOf` node has no children.
    #[error("Empty {0} combinator in rule")]
    EmptyCombinator(&'static str),

    /// A `HasAnyRole` leaf lists no roles.
    #[error("HasAnyRole with an empty role list")]
    EmptyRoleSet,

    /// The table has no rule for an operation.
    #[error("No rule configured for operation {0}")]
    MissingRule(Operation),

    /// A role, context or operation name could not be parsed.
    #[error("Unknown {kind}: '{value}'")]
    UnknownName { kind: &'static str, value: String },

    /// The rule table JSON could not be parsed (includes unknown rule tags).
    #[error("Rule table parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Convenience alias used throughout access-policy.
pub type Result<T> = std::result::Result<T, PolicyError>;
