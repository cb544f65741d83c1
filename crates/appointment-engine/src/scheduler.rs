//! Scheduling operations over an appointment store and a user directory.
//!
//! [`Scheduler`] applies the booking invariants: exact slot length, known
//! doctor and patient, and buffered non-overlap per doctor. It does not look
//! at credentials. The caller's standing arrives as an explicit [`Capacity`]
//! resolved by [`crate::gate::AccessGate`].

use access_policy::{Role, UserId};
use chrono::{DateTime, NaiveDate, Utc};

use crate::availability;
use crate::config::ClinicSchedule;
use crate::conflict::ensure_slot_free;
use crate::directory::{UserDirectory, UserRecord};
use crate::error::{Result, SchedulingError};
use crate::model::{
    Appointment, AppointmentId, AppointmentRequest, AppointmentView, AvailabilityResult,
    ClinicalEntry, NewAppointment,
};
use crate::store::{AppointmentRepository, AppointmentStore};

/// The standing in which an authorized caller acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Acting as a patient: limited to their own appointments.
    Patient(UserId),
    /// Acting as clinic staff.
    Staff,
}

impl Capacity {
    /// Whether this capacity may act on an appointment belonging to `patient_id`.
    pub fn may_act_for(self, patient_id: UserId) -> bool {
        match self {
            Capacity::Patient(me) => me == patient_id,
            Capacity::Staff => true,
        }
    }
}

pub struct Scheduler<S, D> {
    store: S,
    directory: D,
    schedule: ClinicSchedule,
}

impl<S: AppointmentStore, D: UserDirectory> Scheduler<S, D> {
    pub fn new(store: S, directory: D, schedule: ClinicSchedule) -> Self {
        Self {
            store,
            directory,
            schedule,
        }
    }

    pub fn schedule(&self) -> &ClinicSchedule {
        &self.schedule
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Book a new appointment.
    ///
    /// A patient always books for themselves; staff must name the patient.
    ///
    /// # Errors
    /// - `Unauthorized` if a patient names someone else as the patient.
    /// - `Validation` for missing fields, a wrong duration or an unknown
    ///   doctor/patient.
    /// - `Conflict` if the slot collides with a buffered booking.
    pub fn create(&self, capacity: Capacity, request: AppointmentRequest) -> Result<AppointmentView> {
        let patient_id = match capacity {
            Capacity::Patient(me) => match request.patient_id {
                Some(other) if other != me => return Err(SchedulingError::Unauthorized),
                _ => me,
            },
            Capacity::Staff => request
                .patient_id
                .ok_or_else(|| SchedulingError::Validation("patient_id is required".into()))?,
        };
        let doctor_id = request
            .doctor_id
            .ok_or_else(|| SchedulingError::Validation("doctor_id is required".into()))?;
        let (start, end) = self.validated_interval(request.start, request.end)?;
        let patient = self.resolve_patient(patient_id)?;
        let doctor = self.resolve_doctor(doctor_id)?;

        let created = self.store.transaction(|repo| {
            ensure_slot_free(&*repo, &self.schedule, doctor_id, start, end, None)?;
            repo.insert(NewAppointment {
                patient_id,
                doctor_id,
                start,
                end,
                reason: request.reason,
            })
        })?;

        tracing::info!(
            appointment = %created.id,
            doctor = %doctor_id,
            patient = %patient_id,
            start = %created.start,
            "appointment booked"
        );
        Ok(view_with(&created, &patient, &doctor))
    }

    /// Move an appointment (and, for staff, reassign doctor or patient).
    ///
    /// The conflict check ignores the appointment being updated. Notes and
    /// results are carried over unchanged. An absent `reason` keeps the
    /// current one.
    ///
    /// # Errors
    /// As [`Scheduler::create`], plus `NotFound` for an unknown id (staff) and
    /// `Unauthorized` when a patient touches an appointment that is not theirs
    /// or tries to change its doctor or patient.
    pub fn update(
        &self,
        capacity: Capacity,
        id: AppointmentId,
        request: AppointmentRequest,
    ) -> Result<AppointmentView> {
        let (start, end) = self.validated_interval(request.start, request.end)?;

        let (saved, patient, doctor) = self.store.transaction(|repo| {
            let existing = self.find_for(&*repo, capacity, id)?;

            if let Capacity::Patient(me) = capacity {
                let reassigns_patient = request.patient_id.is_some_and(|p| p != me);
                let reassigns_doctor = request.doctor_id.is_some_and(|d| d != existing.doctor_id);
                if reassigns_patient || reassigns_doctor {
                    return Err(SchedulingError::Unauthorized);
                }
            }

            let patient = self.resolve_patient(request.patient_id.unwrap_or(existing.patient_id))?;
            let doctor = self.resolve_doctor(request.doctor_id.unwrap_or(existing.doctor_id))?;
            ensure_slot_free(&*repo, &self.schedule, doctor.id, start, end, Some(id))?;

            let saved = repo.save(Appointment {
                patient_id: patient.id,
                doctor_id: doctor.id,
                start,
                end,
                reason: request.reason.or(existing.reason.clone()),
                ..existing
            })?;
            Ok((saved, patient, doctor))
        })?;

        tracing::info!(appointment = %id, doctor = %doctor.id, start = %saved.start, "appointment updated");
        Ok(view_with(&saved, &patient, &doctor))
    }

    /// Cancel an appointment. Staff may cancel any; a patient only their own.
    pub fn delete(&self, capacity: Capacity, id: AppointmentId) -> Result<()> {
        self.store.transaction(|repo| {
            self.find_for(&*repo, capacity, id)?;
            repo.delete(id)
        })?;
        tracing::info!(appointment = %id, "appointment cancelled");
        Ok(())
    }

    pub fn list_for_patient(&self, patient_id: UserId) -> Result<Vec<AppointmentView>> {
        let list = self.store.read(|repo| repo.find_by_patient_id(patient_id))?;
        Ok(self.views(&list))
    }

    pub fn list_for_doctor(&self, doctor_id: UserId) -> Result<Vec<AppointmentView>> {
        let list = self.store.read(|repo| repo.find_by_doctor_id(doctor_id))?;
        Ok(self.views(&list))
    }

    pub fn list_all(&self) -> Result<Vec<AppointmentView>> {
        let list = self.store.read(|repo| repo.find_all())?;
        Ok(self.views(&list))
    }

    /// Free slot starts for `doctor_id` on clinic date `date`.
    pub fn availability(&self, doctor_id: UserId, date: NaiveDate) -> Result<AvailabilityResult> {
        let (lo, hi) = availability::fetch_window(&self.schedule, date)?;
        let nearby = self
            .store
            .read(|repo| repo.find_by_doctor_id_and_start_between(doctor_id, lo, hi))?;
        availability::day_availability(&self.schedule, &nearby, doctor_id, date)
    }

    /// Record the nurse's note on an appointment, replacing any earlier one.
    pub fn submit_note(&self, entry: ClinicalEntry) -> Result<()> {
        self.store.transaction(|repo| {
            let mut appointment = require(&*repo, entry.appointment_id)?;
            appointment.staff_note = Some(entry.contents);
            repo.save(appointment).map(|_| ())
        })?;
        tracing::info!(appointment = %entry.appointment_id, "staff note recorded");
        Ok(())
    }

    /// Record the doctor's result on an appointment, replacing any earlier one.
    pub fn submit_result(&self, entry: ClinicalEntry) -> Result<()> {
        self.store.transaction(|repo| {
            let mut appointment = require(&*repo, entry.appointment_id)?;
            appointment.result = Some(entry.contents);
            repo.save(appointment).map(|_| ())
        })?;
        tracing::info!(appointment = %entry.appointment_id, "result recorded");
        Ok(())
    }

    pub fn read_note(&self, id: AppointmentId) -> Result<Option<String>> {
        self.store.read(|repo| require(repo, id).map(|a| a.staff_note))
    }

    /// A patient may read only the result of their own appointment.
    pub fn read_result(&self, capacity: Capacity, id: AppointmentId) -> Result<Option<String>> {
        self.store
            .read(|repo| self.find_for(repo, capacity, id).map(|a| a.result))
    }

    // ── helpers ─────────────────────────────────────────────────────────────

    /// Both ends present and exactly one slot apart.
    fn validated_interval(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(SchedulingError::Validation("start and end are required".into()));
        };
        self.schedule.ensure_slot_length(start, end)?;
        Ok((start, end))
    }

    fn resolve_patient(&self, id: UserId) -> Result<UserRecord> {
        self.directory
            .lookup(id)
            .ok_or_else(|| SchedulingError::Validation(format!("invalid patient_id {id}")))
    }

    fn resolve_doctor(&self, id: UserId) -> Result<UserRecord> {
        self.directory
            .lookup(id)
            .filter(|u| u.has_role(Role::Doctor))
            .ok_or_else(|| SchedulingError::Validation(format!("invalid doctor_id {id}")))
    }

    /// Fetch an appointment the capacity may act on.
    ///
    /// Patients get `Unauthorized` both for other patients' appointments and
    /// for ids that do not exist, so existence is not revealed.
    fn find_for(
        &self,
        repo: &impl AppointmentRepository,
        capacity: Capacity,
        id: AppointmentId,
    ) -> Result<Appointment> {
        match (repo.find_by_id(id)?, capacity) {
            (Some(a), c) if c.may_act_for(a.patient_id) => Ok(a),
            (Some(_), _) | (None, Capacity::Patient(_)) => Err(SchedulingError::Unauthorized),
            (None, Capacity::Staff) => Err(SchedulingError::NotFound(format!("appointment {id}"))),
        }
    }

    fn views(&self, list: &[Appointment]) -> Vec<AppointmentView> {
        list.iter()
            .map(|a| {
                let patient_name = self.display_name(a.patient_id);
                let doctor_name = self.display_name(a.doctor_id);
                AppointmentView {
                    id: a.id,
                    patient_id: a.patient_id,
                    doctor_id: a.doctor_id,
                    patient_name,
                    doctor_name,
                    start: a.start,
                    end: a.end,
                    reason: a.reason.clone(),
                }
            })
            .collect()
    }

    /// Accounts removed from the directory still list, under their id.
    fn display_name(&self, id: UserId) -> String {
        self.directory
            .lookup(id)
            .map_or_else(|| format!("#{id}"), |u| u.display_name())
    }
}

fn require(repo: &impl AppointmentRepository, id: AppointmentId) -> Result<Appointment> {
    repo.find_by_id(id)?
        .ok_or_else(|| SchedulingError::NotFound(format!("appointment {id}")))
}

fn view_with(a: &Appointment, patient: &UserRecord, doctor: &UserRecord) -> AppointmentView {
    AppointmentView {
        id: a.id,
        patient_id: a.patient_id,
        doctor_id: a.doctor_id,
        patient_name: patient.display_name(),
        doctor_name: doctor.display_name(),
        start: a.start,
        end: a.end,
        reason: a.reason.clone(),
    }
}
