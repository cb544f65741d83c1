//! Per-day availability grids for one doctor.
//!
//! Opening hours are resolved in the clinic timezone and converted to
//! absolute instants. Candidate starts are walked from opening time in grid
//! steps; a candidate is free when its whole slot avoids every buffered
//! booking. Free starts are reported back as clinic-local `HH:MM` labels.
//!
//! The computation is a pure function of the bookings, the date and the
//! configuration, so repeated calls with no writes in between agree.

use access_policy::UserId;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::config::ClinicSchedule;
use crate::error::Result;
use crate::interval::{overlaps, TimeBlock};
use crate::model::{Appointment, AvailabilityResult};

/// Range of start instants to fetch from the store for `date`.
///
/// Anything overlapping `[open - buffer, close + buffer]` starts no earlier
/// than one slot before that range.
pub fn fetch_window(schedule: &ClinicSchedule, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let (open, close) = schedule.opening_hours(date)?;
    let lo = open - schedule.buffer() - schedule.slot();
    let hi = close + schedule.buffer();
    Ok((lo, hi))
}

/// Buffered exclusion zones for the bookings that reach into
/// `[open - buffer, close + buffer]`, ordered by start.
pub fn busy_blocks(
    existing: &[Appointment],
    open: DateTime<Utc>,
    close: DateTime<Utc>,
    buffer: Duration,
) -> Vec<TimeBlock> {
    let (lo, hi) = (open - buffer, close + buffer);
    let mut blocks: Vec<TimeBlock> = existing
        .iter()
        .filter(|a| overlaps(a.start, a.end, lo, hi))
        .map(|a| TimeBlock::buffered(a, buffer))
        .collect();
    blocks.sort_by_key(|b| (b.start, b.end));
    blocks
}

/// Grid-aligned slot starts in `[open, close]` whose slot is clear of `blocks`.
pub fn free_slot_starts(
    blocks: &[TimeBlock],
    open: DateTime<Utc>,
    close: DateTime<Utc>,
    slot: Duration,
    step: Duration,
) -> Vec<DateTime<Utc>> {
    let mut free = Vec::new();
    let mut t = open;
    while t + slot <= close {
        let end = t + slot;
        if !blocks.iter().any(|b| b.overlaps(t, end)) {
            free.push(t);
        }
        t += step;
    }
    free
}

/// Compute the availability of `doctor_id` on clinic date `date` given the
/// doctor's bookings around that day.
pub fn day_availability(
    schedule: &ClinicSchedule,
    existing: &[Appointment],
    doctor_id: UserId,
    date: NaiveDate,
) -> Result<AvailabilityResult> {
    let (open, close) = schedule.opening_hours(date)?;
    let blocks = busy_blocks(existing, open, close, schedule.buffer());
    let starts = free_slot_starts(&blocks, open, close, schedule.slot(), schedule.grid_step());

    tracing::debug!(
        doctor = %doctor_id,
        %date,
        busy = blocks.len(),
        free = starts.len(),
        "computed availability"
    );

    Ok(AvailabilityResult {
        doctor_id,
        date,
        slots: starts
            .into_iter()
            .map(|t| schedule.local_time_label(t))
            .collect(),
    })
}
