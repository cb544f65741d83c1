//! The fixed mapping from gated operations to their access rules.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::credentials::{Context, CredentialSet, Role};
use crate::error::{PolicyError, Result};
use crate::rule::{evaluate, Rule};

/// A named gate point. Each one has exactly one rule in a [`RuleTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    CreateAppointment,
    UpdateAppointment,
    DeleteAppointment,
    ListForPatient,
    ListForDoctor,
    ListAll,
    GetAvailability,
    SubmitNote,
    SubmitResult,
    ReadNote,
    ReadResult,
    AdminArea,
    DoctorArea,
    NurseArea,
    PatientArea,
}

impl Operation {
    pub const ALL: [Operation; 15] = [
        Operation::CreateAppointment,
        Operation::UpdateAppointment,
        Operation::DeleteAppointment,
        Operation::ListForPatient,
        Operation::ListForDoctor,
        Operation::ListAll,
        Operation::GetAvailability,
        Operation::SubmitNote,
        Operation::SubmitResult,
        Operation::ReadNote,
        Operation::ReadResult,
        Operation::AdminArea,
        Operation::DoctorArea,
        Operation::NurseArea,
        Operation::PatientArea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::CreateAppointment => "create_appointment",
            Operation::UpdateAppointment => "update_appointment",
            Operation::DeleteAppointment => "delete_appointment",
            Operation::ListForPatient => "list_for_patient",
            Operation::ListForDoctor => "list_for_doctor",
            Operation::ListAll => "list_all",
            Operation::GetAvailability => "get_availability",
            Operation::SubmitNote => "submit_note",
            Operation::SubmitResult => "submit_result",
            Operation::ReadNote => "read_note",
            Operation::ReadResult => "read_result",
            Operation::AdminArea => "admin_area",
            Operation::DoctorArea => "doctor_area",
            Operation::NurseArea => "nurse_area",
            Operation::PatientArea => "patient_area",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = PolicyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('-', "_");
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| PolicyError::UnknownName {
                kind: "operation",
                value: s.to_string(),
            })
    }
}

/// Validated Operation → Rule mapping. Every operation has a rule and no
/// rule contains an empty node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleTable {
    rules: BTreeMap<Operation, Rule>,
}

impl RuleTable {
    /// Build a table from an explicit rule set.
    ///
    /// # Errors
    /// `PolicyError::MissingRule` if an operation has no rule; the validation
    /// error of the first malformed rule otherwise.
    pub fn from_rules(rules: BTreeMap<Operation, Rule>) -> Result<Self> {
        if let Some(missing) = Operation::ALL.into_iter().find(|op| !rules.contains_key(op)) {
            return Err(PolicyError::MissingRule(missing));
        }
        for rule in rules.values() {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// Parse a JSON object of `operation → rule` overrides and layer it on top
    /// of [`RuleTable::clinic_default`].
    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: BTreeMap<Operation, Rule> = serde_json::from_str(json)?;
        let mut rules = Self::clinic_default().rules;
        rules.extend(overrides);
        Self::from_rules(rules)
    }

    /// The clinic's standing access rules.
    pub fn clinic_default() -> Self {
        use Context as C;
        use Role as R;

        let staff = |roles: &[Role]| {
            Rule::all_of([Rule::has_any_role(roles.iter().copied()), Rule::HasContext(C::Staff)])
        };
        let patient_self = || Rule::role_in_context(R::Patient, C::Patient);

        let care_team_or_patient = Rule::any_of([staff(&[R::Doctor, R::Nurse]), patient_self()]);
        let any_staff = staff(&[R::Doctor, R::Nurse, R::Admin]);

        let rules = BTreeMap::from([
            (Operation::AdminArea, Rule::role_in_context(R::Admin, C::Staff)),
            (Operation::DoctorArea, staff(&[R::Doctor, R::Admin])),
            (Operation::NurseArea, staff(&[R::Nurse, R::Admin])),
            (
                Operation::PatientArea,
                Rule::any_of([patient_self(), Rule::role_in_context(R::Admin, C::Staff)]),
            ),
            (Operation::CreateAppointment, care_team_or_patient.clone()),
            (Operation::UpdateAppointment, care_team_or_patient.clone()),
            (Operation::DeleteAppointment, care_team_or_patient),
            (Operation::ListForDoctor, any_staff.clone()),
            (Operation::ListAll, any_staff.clone()),
            (Operation::ListForPatient, Rule::any_of([any_staff, patient_self()])),
            (
                Operation::GetAvailability,
                Rule::any_of([Rule::HasContext(C::Staff), Rule::HasContext(C::Patient)]),
            ),
            (Operation::SubmitNote, Rule::role_in_context(R::Nurse, C::Staff)),
            (Operation::SubmitResult, Rule::role_in_context(R::Doctor, C::Staff)),
            (Operation::ReadNote, staff(&[R::Nurse, R::Doctor])),
            (
                Operation::ReadResult,
                Rule::any_of([Rule::role_in_context(R::Doctor, C::Staff), patient_self()]),
            ),
        ]);

        Self { rules }
    }

    pub fn rule(&self, operation: Operation) -> &Rule {
        // Construction guarantees an entry for every operation.
        &self.rules[&operation]
    }

    /// Evaluate the rule registered for `operation`.
    pub fn permits(&self, operation: Operation, credentials: &CredentialSet) -> bool {
        evaluate(self.rule(operation), credentials)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::clinic_default()
    }
}
