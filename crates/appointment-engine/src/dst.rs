//! DST transition policies for resolving clinic-local times.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulingError};

/// Longest DST gap searched when shifting forward (Lord Howe style half hours
/// and the usual one hour both fit).
const MAX_GAP_MINUTES: i64 = 180;

/// Policy for local clinic times that fall into a DST gap.
///
/// Ambiguous times (the repeated hour when clocks go back) always resolve to
/// the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Refuse times in the DST gap (e.g., 2:30 AM during spring forward)
    Skip,
    /// Shift to the first valid local minute after the gap
    ShiftForward,
    /// Keep the UTC offset that was in force before the transition
    #[default]
    WallClock,
}

/// Resolve a clinic-local wall time to an absolute instant.
///
/// # Errors
/// Returns `SchedulingError::Validation` when `policy` is `Skip` and the time
/// does not exist in `tz`.
pub fn resolve_local(tz: Tz, local: NaiveDateTime, policy: DstPolicy) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => Err(SchedulingError::Validation(format!(
                "local time {local} does not exist in {tz}"
            ))),
            DstPolicy::ShiftForward => (1..=MAX_GAP_MINUTES)
                .find_map(|m| tz.from_local_datetime(&(local + Duration::minutes(m))).earliest())
                .map(|dt| dt.with_timezone(&Utc))
                .ok_or_else(|| {
                    SchedulingError::Validation(format!("no valid local time after {local} in {tz}"))
                }),
            DstPolicy::WallClock => {
                // Transitions are months apart, so a day earlier is before the gap.
                let before = tz.from_utc_datetime(&(local - Duration::days(1)));
                let offset = i64::from(before.offset().fix().local_minus_utc());
                Ok(Utc.from_utc_datetime(&(local - Duration::seconds(offset))))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // New York springs forward 2026-03-08 02:00 EST -> 03:00 EDT.
    const NY: Tz = chrono_tz::America::New_York;

    #[test]
    fn ordinary_time_is_unaffected_by_policy() {
        for policy in [DstPolicy::Skip, DstPolicy::ShiftForward, DstPolicy::WallClock] {
            let got = resolve_local(NY, local(2026, 3, 16, 9, 0), policy).unwrap();
            assert_eq!(got, utc(2026, 3, 16, 13, 0));
        }
    }

    #[test]
    fn gap_time_is_refused_by_skip() {
        let err = resolve_local(NY, local(2026, 3, 8, 2, 30), DstPolicy::Skip).unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(_)));
    }

    #[test]
    fn gap_time_shifts_to_end_of_gap() {
        let got = resolve_local(NY, local(2026, 3, 8, 2, 30), DstPolicy::ShiftForward).unwrap();
        // 03:00 EDT
        assert_eq!(got, utc(2026, 3, 8, 7, 0));
    }

    #[test]
    fn gap_time_keeps_standard_offset_under_wall_clock() {
        let got = resolve_local(NY, local(2026, 3, 8, 2, 30), DstPolicy::WallClock).unwrap();
        // 02:30 at UTC-5
        assert_eq!(got, utc(2026, 3, 8, 7, 30));
    }

    #[test]
    fn ambiguous_time_takes_earlier_instant() {
        // 2026-11-01 01:30 happens twice in New York; the first is EDT.
        let got = resolve_local(NY, local(2026, 11, 1, 1, 30), DstPolicy::WallClock).unwrap();
        assert_eq!(got, utc(2026, 11, 1, 5, 30));
    }
}
