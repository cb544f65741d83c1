//! # appointment-engine
//!
//! Buffered appointment scheduling for a clinic, gated by declarative access
//! rules.
//!
//! Bookings are fixed-length slots. Each booking reserves a buffer of idle
//! time before and after itself, and no other booking for the same doctor may
//! overlap that buffered span. Availability is computed per clinic day in the
//! clinic's timezone and reported as local `HH:MM` start times. Every entry
//! point goes through [`AccessGate`], which evaluates the operation's rule
//! from [`access_policy`] before the scheduler touches the store.
//!
//! ## Modules
//!
//! - [`interval`]: Half-open overlap test and buffer expansion
//! - [`dst`]: DST policies for resolving clinic-local times
//! - [`config`]: Scheduling constants and clinic hours
//! - [`model`]: Appointment records, requests and responses
//! - [`store`]: Appointment store collaborator and in-memory store
//! - [`directory`]: User directory collaborator
//! - [`conflict`]: Buffered conflict detection
//! - [`availability`]: Per-day availability grids
//! - [`scheduler`]: Scheduling operations
//! - [`gate`]: Policy-gated entry points
//! - [`error`]: Error types

pub mod availability;
pub mod config;
pub mod conflict;
pub mod directory;
pub mod dst;
pub mod error;
pub mod gate;
pub mod interval;
pub mod model;
pub mod scheduler;
pub mod store;

pub use config::{ClinicSchedule, SchedulingConfig};
pub use conflict::find_conflicts;
pub use directory::{MemoryDirectory, UserDirectory, UserRecord};
pub use dst::DstPolicy;
pub use error::{ConfigError, SchedulingError};
pub use gate::AccessGate;
pub use interval::{expand_by_buffer, overlaps, TimeBlock};
pub use model::{
    Appointment, AppointmentId, AppointmentRequest, AppointmentView, AvailabilityResult,
    ClinicalEntry,
};
pub use scheduler::{Capacity, Scheduler};
pub use store::{AppointmentRepository, AppointmentStore, MemoryStore};

/// A clinic gate over the in-memory store and directory.
pub type MemoryClinic = AccessGate<MemoryStore, MemoryDirectory>;

/// Build a [`MemoryClinic`] from a resolved schedule and rules.
pub fn memory_clinic(
    schedule: ClinicSchedule,
    rules: access_policy::RuleTable,
    store: MemoryStore,
    directory: MemoryDirectory,
) -> MemoryClinic {
    AccessGate::new(rules, Scheduler::new(store, directory, schedule))
}
