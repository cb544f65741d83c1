//! Policy-gated entry points to the scheduler.
//!
//! Every call names its [`Operation`], is checked against the rule table, and
//! only then reaches the [`Scheduler`]. Denials happen before any store
//! access, so a denied call has no observable effect. Record-level ownership
//! checks (a patient touching someone else's appointment) happen inside the
//! scheduler's transaction, before any write.

use access_policy::{Context, CredentialSet, Operation, RuleTable, UserId};
use chrono::NaiveDate;

use crate::directory::UserDirectory;
use crate::error::{Result, SchedulingError};
use crate::model::{
    AppointmentId, AppointmentRequest, AppointmentView, AvailabilityResult, ClinicalEntry,
};
use crate::scheduler::{Capacity, Scheduler};
use crate::store::AppointmentStore;

pub struct AccessGate<S, D> {
    rules: RuleTable,
    scheduler: Scheduler<S, D>,
}

impl<S: AppointmentStore, D: UserDirectory> AccessGate<S, D> {
    pub fn new(rules: RuleTable, scheduler: Scheduler<S, D>) -> Self {
        Self { rules, scheduler }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn scheduler(&self) -> &Scheduler<S, D> {
        &self.scheduler
    }

    /// Check `operation`'s rule and resolve the capacity the caller acts in.
    ///
    /// The PATIENT context wins over STAFF when both are present. A caller
    /// with neither context is denied even if a rule would let them through.
    pub fn authorize(&self, operation: Operation, credentials: &CredentialSet) -> Result<Capacity> {
        let capacity = if !self.rules.permits(operation, credentials) {
            None
        } else if credentials.has_context(Context::Patient) {
            Some(Capacity::Patient(credentials.subject_id))
        } else if credentials.has_context(Context::Staff) {
            Some(Capacity::Staff)
        } else {
            None
        };

        capacity.ok_or_else(|| {
            tracing::warn!(
                %operation,
                subject = %credentials.subject_id,
                "access denied"
            );
            SchedulingError::Unauthorized
        })
    }

    pub fn create_appointment(
        &self,
        credentials: &CredentialSet,
        request: AppointmentRequest,
    ) -> Result<AppointmentView> {
        let capacity = self.authorize(Operation::CreateAppointment, credentials)?;
        self.scheduler.create(capacity, request)
    }

    pub fn update_appointment(
        &self,
        credentials: &CredentialSet,
        id: AppointmentId,
        request: AppointmentRequest,
    ) -> Result<AppointmentView> {
        let capacity = self.authorize(Operation::UpdateAppointment, credentials)?;
        self.scheduler.update(capacity, id, request)
    }

    pub fn delete_appointment(&self, credentials: &CredentialSet, id: AppointmentId) -> Result<()> {
        let capacity = self.authorize(Operation::DeleteAppointment, credentials)?;
        self.scheduler.delete(capacity, id)
    }

    /// A patient may only list their own appointments.
    pub fn list_for_patient(
        &self,
        credentials: &CredentialSet,
        patient_id: UserId,
    ) -> Result<Vec<AppointmentView>> {
        let capacity = self.authorize(Operation::ListForPatient, credentials)?;
        self.require_self(capacity, credentials, patient_id)?;
        self.scheduler.list_for_patient(patient_id)
    }

    pub fn list_for_doctor(
        &self,
        credentials: &CredentialSet,
        doctor_id: UserId,
    ) -> Result<Vec<AppointmentView>> {
        self.authorize(Operation::ListForDoctor, credentials)?;
        self.scheduler.list_for_doctor(doctor_id)
    }

    pub fn list_all(&self, credentials: &CredentialSet) -> Result<Vec<AppointmentView>> {
        self.authorize(Operation::ListAll, credentials)?;
        self.scheduler.list_all()
    }

    pub fn availability(
        &self,
        credentials: &CredentialSet,
        doctor_id: UserId,
        date: NaiveDate,
    ) -> Result<AvailabilityResult> {
        self.authorize(Operation::GetAvailability, credentials)?;
        self.scheduler.availability(doctor_id, date)
    }

    pub fn submit_note(&self, credentials: &CredentialSet, entry: ClinicalEntry) -> Result<()> {
        self.authorize(Operation::SubmitNote, credentials)?;
        self.scheduler.submit_note(entry)
    }

    pub fn submit_result(&self, credentials: &CredentialSet, entry: ClinicalEntry) -> Result<()> {
        self.authorize(Operation::SubmitResult, credentials)?;
        self.scheduler.submit_result(entry)
    }

    pub fn read_note(&self, credentials: &CredentialSet, id: AppointmentId) -> Result<Option<String>> {
        self.authorize(Operation::ReadNote, credentials)?;
        self.scheduler.read_note(id)
    }

    pub fn read_result(
        &self,
        credentials: &CredentialSet,
        id: AppointmentId,
    ) -> Result<Option<String>> {
        let capacity = self.authorize(Operation::ReadResult, credentials)?;
        self.scheduler.read_result(capacity, id)
    }

    fn require_self(
        &self,
        capacity: Capacity,
        credentials: &CredentialSet,
        target: UserId,
    ) -> Result<()> {
        if capacity.may_act_for(target) {
            return Ok(());
        }
        tracing::warn!(
            subject = %credentials.subject_id,
            target = %target,
            "identity mismatch on self-scoped read"
        );
        Err(SchedulingError::Unauthorized)
    }
}
