//! Tests for rule evaluation against credential sets.

use access_policy::{evaluate, Context, CredentialSet, Role, Rule, UserId};

/// Helper to build a credential set from role and context lists.
fn creds(roles: &[Role], contexts: &[Context]) -> CredentialSet {
    let mut c = CredentialSet::new(UserId(42));
    for r in roles {
        c = c.with_role(*r);
    }
    for ctx in contexts {
        c = c.with_context(*ctx);
    }
    c
}

fn patient_or_admin() -> Rule {
    Rule::any_of([
        Rule::all_of([Rule::HasRole(Role::Patient), Rule::HasContext(Context::Patient)]),
        Rule::all_of([Rule::HasRole(Role::Admin), Rule::HasContext(Context::Staff)]),
    ])
}

// ── Leaves ──────────────────────────────────────────────────────────────────

#[test]
fn has_role_matches_only_held_role() {
    let doctor = creds(&[Role::Doctor], &[Context::Staff]);
    assert!(evaluate(&Rule::HasRole(Role::Doctor), &doctor));
    assert!(!evaluate(&Rule::HasRole(Role::Nurse), &doctor));
}

#[test]
fn has_any_role_needs_one_intersection() {
    let nurse = creds(&[Role::Nurse], &[Context::Staff]);
    assert!(evaluate(&Rule::has_any_role([Role::Doctor, Role::Nurse]), &nurse));
    assert!(!evaluate(&Rule::has_any_role([Role::Doctor, Role::Admin]), &nurse));
}

#[test]
fn has_context_is_independent_of_roles() {
    // A doctor booking their own check-up acts in the PATIENT context.
    let doctor_as_patient = creds(&[Role::Doctor, Role::Patient], &[Context::Patient]);
    assert!(evaluate(&Rule::HasContext(Context::Patient), &doctor_as_patient));
    assert!(!evaluate(&Rule::HasContext(Context::Staff), &doctor_as_patient));
}

// ── Combinators ─────────────────────────────────────────────────────────────

#[test]
fn all_of_false_when_any_child_false() {
    let rule = Rule::all_of([Rule::HasRole(Role::Admin), Rule::HasContext(Context::Staff)]);
    assert!(!evaluate(&rule, &creds(&[Role::Admin], &[Context::Patient])));
    assert!(!evaluate(&rule, &creds(&[Role::Doctor], &[Context::Staff])));
    assert!(evaluate(&rule, &creds(&[Role::Admin], &[Context::Staff])));
}

#[test]
fn any_of_true_when_one_child_true() {
    let rule = Rule::any_of([Rule::HasRole(Role::Admin), Rule::HasRole(Role::Nurse)]);
    assert!(evaluate(&rule, &creds(&[Role::Nurse], &[])));
    assert!(!evaluate(&rule, &creds(&[Role::Patient], &[])));
}

#[test]
fn patient_in_patient_context_passes_patient_or_admin_rule() {
    let patient = creds(&[Role::Patient], &[Context::Patient]);
    assert!(evaluate(&patient_or_admin(), &patient));
}

#[test]
fn admin_in_staff_context_passes_patient_or_admin_rule() {
    let admin = creds(&[Role::Admin], &[Context::Staff]);
    assert!(evaluate(&patient_or_admin(), &admin));
}

#[test]
fn patient_role_in_staff_context_is_denied() {
    // Role and context must line up inside the same AllOf branch.
    let mixed = creds(&[Role::Patient], &[Context::Staff]);
    assert!(!evaluate(&patient_or_admin(), &mixed));
}

#[test]
fn empty_credentials_denied_everywhere() {
    let nobody = creds(&[], &[]);
    assert!(!evaluate(&patient_or_admin(), &nobody));
    assert!(!evaluate(&Rule::HasContext(Context::Staff), &nobody));
}

// ── Fail-closed configuration ───────────────────────────────────────────────

#[test]
fn empty_all_of_does_not_default_allow() {
    let admin = creds(&[Role::Admin], &[Context::Staff]);
    assert!(!evaluate(&Rule::AllOf(vec![]), &admin));
}

#[test]
fn empty_any_of_nested_in_all_of_denies() {
    let admin = creds(&[Role::Admin], &[Context::Staff]);
    let rule = Rule::all_of([Rule::HasRole(Role::Admin), Rule::AnyOf(vec![])]);
    assert!(!evaluate(&rule, &admin));
}

#[test]
fn unknown_rule_tag_is_rejected_when_parsing() {
    let json = r#"{"has_department": "cardiology"}"#;
    assert!(serde_json::from_str::<Rule>(json).is_err());
}
