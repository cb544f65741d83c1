//! Half-open interval arithmetic over absolute instants.
//!
//! Every interval is `[start, end)`. Intervals that merely touch
//! (`a.end == b.start`) do NOT overlap. All instants are UTC, so no civil-time
//! arithmetic happens here.

use chrono::{DateTime, Duration, Utc};

use crate::model::Appointment;

/// Two intervals overlap iff `a_start < b_end && b_start < a_end`.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Widen `[start, end)` by `buffer` on both sides.
pub fn expand_by_buffer(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    buffer: Duration,
) -> (DateTime<Utc>, DateTime<Utc>) {
    (start - buffer, end + buffer)
}

/// The exclusion zone around an existing booking. Only lives for the length
/// of a conflict or availability computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBlock {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeBlock {
    /// The appointment's span widened by `buffer` before and after.
    pub fn buffered(appointment: &Appointment, buffer: Duration) -> Self {
        let (start, end) = expand_by_buffer(appointment.start, appointment.end, buffer);
        Self { start, end }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        overlaps(start, end, self.start, self.end)
    }
}
