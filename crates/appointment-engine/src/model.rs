//! Appointment records and the request/response shapes around them.

use std::fmt;

use access_policy::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned appointment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub u64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored booking. `end - start` equals the configured slot length for as
/// long as the record is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: UserId,
    pub doctor_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Nurse's note. Only readable by the care team.
    #[serde(default)]
    pub staff_note: Option<String>,
    /// Doctor's result. Readable by the care team and the patient.
    #[serde(default)]
    pub result: Option<String>,
}

/// A booking that has passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub patient_id: UserId,
    pub doctor_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Caller input for create and update. Every field is optional at this layer
/// so that missing input can be reported as a validation failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    #[serde(default)]
    pub patient_id: Option<UserId>,
    #[serde(default)]
    pub doctor_id: Option<UserId>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// An appointment as returned to callers, with display names filled in.
/// Notes and results are deliberately absent; they have their own reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: AppointmentId,
    pub patient_id: UserId,
    pub doctor_id: UserId,
    pub patient_name: String,
    pub doctor_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Free appointment start times for one doctor on one clinic day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub doctor_id: UserId,
    pub date: NaiveDate,
    /// Clinic-local `HH:MM` start times, ascending.
    pub slots: Vec<String>,
}

/// Payload for submitting a nurse note or a doctor result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalEntry {
    pub appointment_id: AppointmentId,
    pub contents: String,
}
