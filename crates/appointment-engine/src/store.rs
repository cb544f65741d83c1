//! The appointment store collaborator and an in-memory implementation.
//!
//! The engine never holds appointments itself. It borrows an
//! [`AppointmentRepository`] from an [`AppointmentStore`] for the length of a
//! closure: [`AppointmentStore::read`] for queries and
//! [`AppointmentStore::transaction`] for anything that checks-then-writes.

use std::collections::BTreeMap;

use access_policy::UserId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::ClinicSchedule;
use crate::error::{Result, SchedulingError};
use crate::model::{Appointment, AppointmentId, NewAppointment};

/// Query and write access to appointments within one consistent view.
///
/// Every list is ordered by start time, then id.
pub trait AppointmentRepository {
    fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>>;

    fn find_by_patient_id(&self, patient_id: UserId) -> Result<Vec<Appointment>>;

    fn find_by_doctor_id(&self, doctor_id: UserId) -> Result<Vec<Appointment>>;

    /// Appointments of `doctor_id` whose start lies in `[lo, hi]`.
    fn find_by_doctor_id_and_start_between(
        &self,
        doctor_id: UserId,
        lo: DateTime<Utc>,
        hi: DateTime<Utc>,
    ) -> Result<Vec<Appointment>>;

    fn find_all(&self) -> Result<Vec<Appointment>>;

    /// Store a new booking and assign its id.
    fn insert(&mut self, appointment: NewAppointment) -> Result<Appointment>;

    /// Replace an existing booking.
    ///
    /// # Errors
    /// `SchedulingError::NotFound` if no record has `appointment.id`.
    fn save(&mut self, appointment: Appointment) -> Result<Appointment>;

    /// # Errors
    /// `SchedulingError::NotFound` if no record has `id`.
    fn delete(&mut self, id: AppointmentId) -> Result<()>;
}

/// A transactional appointment store shared by all requests.
pub trait AppointmentStore: Send + Sync {
    type Repo: AppointmentRepository;

    /// Run read-only queries against a consistent snapshot.
    fn read<T>(&self, f: impl FnOnce(&Self::Repo) -> Result<T>) -> Result<T>;

    /// Run `f` serializably. If `f` fails, none of its writes are kept.
    fn transaction<T>(&self, f: impl FnOnce(&mut Self::Repo) -> Result<T>) -> Result<T>;
}

/// Appointment tables held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    appointments: BTreeMap<AppointmentId, Appointment>,
    next_id: u64,
}

impl MemoryTables {
    fn sorted(mut list: Vec<Appointment>) -> Vec<Appointment> {
        list.sort_by_key(|a| (a.start, a.id));
        list
    }

    fn filtered(&self, keep: impl Fn(&Appointment) -> bool) -> Vec<Appointment> {
        Self::sorted(self.appointments.values().filter(|a| keep(a)).cloned().collect())
    }
}

impl AppointmentRepository for MemoryTables {
    fn find_by_id(&self, id: AppointmentId) -> Result<Option<Appointment>> {
        Ok(self.appointments.get(&id).cloned())
    }

    fn find_by_patient_id(&self, patient_id: UserId) -> Result<Vec<Appointment>> {
        Ok(self.filtered(|a| a.patient_id == patient_id))
    }

    fn find_by_doctor_id(&self, doctor_id: UserId) -> Result<Vec<Appointment>> {
        Ok(self.filtered(|a| a.doctor_id == doctor_id))
    }

    fn find_by_doctor_id_and_start_between(
        &self,
        doctor_id: UserId,
        lo: DateTime<Utc>,
        hi: DateTime<Utc>,
    ) -> Result<Vec<Appointment>> {
        Ok(self.filtered(|a| a.doctor_id == doctor_id && a.start >= lo && a.start <= hi))
    }

    fn find_all(&self) -> Result<Vec<Appointment>> {
        Ok(self.filtered(|_| true))
    }

    fn insert(&mut self, new: NewAppointment) -> Result<Appointment> {
        let id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| SchedulingError::Store("appointment ids exhausted".into()))?;
        self.next_id = id;
        let appointment = Appointment {
            id: AppointmentId(id),
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            start: new.start,
            end: new.end,
            reason: new.reason,
            staff_note: None,
            result: None,
        };
        self.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    fn save(&mut self, appointment: Appointment) -> Result<Appointment> {
        match self.appointments.get_mut(&appointment.id) {
            Some(slot) => {
                *slot = appointment.clone();
                Ok(appointment)
            }
            None => Err(SchedulingError::NotFound(format!("appointment {}", appointment.id))),
        }
    }

    fn delete(&mut self, id: AppointmentId) -> Result<()> {
        self.appointments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| SchedulingError::NotFound(format!("appointment {id}")))
    }
}

/// In-process [`AppointmentStore`]. Transactions take the write lock, so
/// check-then-write sequences never interleave; reads share the lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing bookings (ids kept as given). New ids
    /// continue after the largest seeded one.
    ///
    /// # Errors
    /// `SchedulingError::Validation` if any booking is not exactly one
    /// `schedule` slot long. Conflict and availability lookups only reach
    /// back one slot plus buffer, so a longer record would go unseen.
    pub fn with_appointments(
        appointments: impl IntoIterator<Item = Appointment>,
        schedule: &ClinicSchedule,
    ) -> Result<Self> {
        let mut seeded: BTreeMap<AppointmentId, Appointment> = BTreeMap::new();
        for appointment in appointments {
            if appointment.end - appointment.start != schedule.slot() {
                return Err(SchedulingError::Validation(format!(
                    "appointment {} must be exactly {} minutes long",
                    appointment.id,
                    schedule.slot().num_minutes()
                )));
            }
            seeded.insert(appointment.id, appointment);
        }
        let next_id = seeded.keys().next_back().map_or(0, |id| id.0);
        Ok(Self {
            tables: RwLock::new(MemoryTables {
                appointments: seeded,
                next_id,
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.tables.read().appointments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AppointmentStore for MemoryStore {
    type Repo = MemoryTables;

    fn read<T>(&self, f: impl FnOnce(&MemoryTables) -> Result<T>) -> Result<T> {
        f(&self.tables.read())
    }

    fn transaction<T>(&self, f: impl FnOnce(&mut MemoryTables) -> Result<T>) -> Result<T> {
        let mut tables = self.tables.write();
        let snapshot = tables.clone();
        let outcome = f(&mut tables);
        if outcome.is_err() {
            *tables = snapshot;
        }
        outcome
    }
}
