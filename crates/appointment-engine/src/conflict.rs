//! Buffered conflict detection for a proposed booking.
//!
//! Every existing appointment is widened by the buffer on both sides before
//! the overlap test, so two bookings for the same doctor always keep at least
//! one buffer of idle time between them. Touching a buffered edge is allowed.

use access_policy::UserId;
use chrono::{DateTime, Duration, Utc};

use crate::config::ClinicSchedule;
use crate::error::{Result, SchedulingError};
use crate::interval::TimeBlock;
use crate::model::{Appointment, AppointmentId};
use crate::store::AppointmentRepository;

/// A detected collision between a proposal and an existing booking's buffered span.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub appointment_id: AppointmentId,
    pub blocked: TimeBlock,
    pub overlap_minutes: i64,
}

/// Find every existing booking whose buffered span overlaps `[start, end)`.
///
/// `exclude` skips one record, so that an update is not checked against itself.
pub fn find_conflicts(
    existing: &[Appointment],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    buffer: Duration,
    exclude: Option<AppointmentId>,
) -> Vec<Conflict> {
    existing
        .iter()
        .filter(|a| Some(a.id) != exclude)
        .filter_map(|a| {
            let blocked = TimeBlock::buffered(a, buffer);
            if !blocked.overlaps(start, end) {
                return None;
            }
            let overlap_minutes = (end.min(blocked.end) - start.max(blocked.start)).num_minutes();
            Some(Conflict {
                appointment_id: a.id,
                blocked,
                overlap_minutes,
            })
        })
        .collect()
}

/// Range of start instants to fetch when checking a proposal.
///
/// Covers the proposal's clinic-calendar day widened by the buffer on both
/// sides, and further widened so any booking whose buffered span can reach
/// `[start, end)` is included.
pub fn conflict_window(
    schedule: &ClinicSchedule,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (day_start, day_end) = schedule.calendar_day(schedule.local_date(start))?;
    let reach = schedule.slot() + schedule.buffer();
    let lo = (day_start - schedule.buffer()).min(start - reach);
    let hi = (day_end + schedule.buffer()).max(end + schedule.buffer());
    Ok((lo, hi))
}

/// Fail with `SchedulingError::Conflict` if `[start, end)` collides with any
/// buffered booking of `doctor_id`.
///
/// Must run inside the same store transaction as the write it guards.
pub fn ensure_slot_free(
    repo: &impl AppointmentRepository,
    schedule: &ClinicSchedule,
    doctor_id: UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<AppointmentId>,
) -> Result<()> {
    let (lo, hi) = conflict_window(schedule, start, end)?;
    let nearby = repo.find_by_doctor_id_and_start_between(doctor_id, lo, hi)?;

    match find_conflicts(&nearby, start, end, schedule.buffer(), exclude).first() {
        None => Ok(()),
        Some(conflict) => {
            tracing::warn!(
                doctor = %doctor_id,
                existing = %conflict.appointment_id,
                overlap_minutes = conflict.overlap_minutes,
                "proposed slot collides with buffered booking"
            );
            Err(SchedulingError::Conflict(
                "doctor not available: slot conflicts with another appointment's buffer".into(),
            ))
        }
    }
}
