//! # access-policy
//!
//! Declarative access rules for the clinic scheduling core.
//!
//! Every request carries a [`CredentialSet`] (role tags, context tags and the
//! caller's subject id) supplied by the identity layer. Each gated operation
//! maps to a [`Rule`] tree, and [`evaluate`] decides whether the credential set
//! satisfies it. Evaluation is pure: the same rule and credentials always give
//! the same answer, and malformed rules deny rather than allow.
//!
//! ## Quick start
//!
//! ```rust
//! use access_policy::{evaluate, Context, CredentialSet, Role, Rule, UserId};
//!
//! let rule = Rule::all_of([Rule::HasRole(Role::Admin), Rule::HasContext(Context::Staff)]);
//! let admin = CredentialSet::new(UserId(1))
//!     .with_role(Role::Admin)
//!     .with_context(Context::Staff);
//!
//! assert!(evaluate(&rule, &admin));
//! ```
//!
//! ## Modules
//!
//! - [`credentials`]: Role/context tags and the per-request credential set
//! - [`rule`]: Rule tree, evaluation and validation
//! - [`table`]: Operation → rule mapping with the clinic defaults
//! - [`error`]: Configuration error types

pub mod credentials;
pub mod error;
pub mod rule;
pub mod table;

pub use credentials::{Context, CredentialSet, Role, UserId};
pub use error::PolicyError;
pub use rule::{evaluate, Rule};
pub use table::{Operation, RuleTable};
