//! Scheduling configuration.
//!
//! [`SchedulingConfig`] is the serializable form read once at startup;
//! [`SchedulingConfig::resolve`] validates it into a [`ClinicSchedule`], which
//! is what the engine carries around. Nothing here reads the environment.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{ConfigError, Result, SchedulingError};

/// Upper bound for any configured duration.
const MAX_MINUTES: i64 = 24 * 60;

/// Clinic scheduling constants as written in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulingConfig {
    /// Exact length of every appointment.
    pub slot_minutes: i64,
    /// Idle time required before and after every appointment.
    pub buffer_minutes: i64,
    /// Spacing of candidate start times in availability grids.
    pub grid_step_minutes: i64,
    #[serde(with = "hhmm")]
    pub day_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub day_end: NaiveTime,
    /// IANA timezone of the clinic (e.g., "America/New_York").
    pub timezone: String,
    pub dst_policy: DstPolicy,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            slot_minutes: 60,
            buffer_minutes: 15,
            grid_step_minutes: 15,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            timezone: "America/New_York".to_string(),
            dst_policy: DstPolicy::default(),
        }
    }
}

impl SchedulingConfig {
    /// Parse a JSON config; absent fields take their defaults. The result is
    /// checked with [`SchedulingConfig::resolve`] before it is returned.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.resolve()?;
        Ok(config)
    }

    /// Validate and convert into the engine's working form.
    ///
    /// # Errors
    /// `ConfigError::InvalidDuration` for a non-positive slot or grid step, a
    /// negative buffer or any duration longer than a day;
    /// `ConfigError::InvalidHours` when the day is empty or shorter than one
    /// slot; `ConfigError::InvalidTimezone` for an unknown IANA name.
    pub fn resolve(&self) -> std::result::Result<ClinicSchedule, ConfigError> {
        if self.slot_minutes <= 0 {
            return Err(ConfigError::InvalidDuration(format!(
                "slot_minutes must be positive, got {}",
                self.slot_minutes
            )));
        }
        if self.grid_step_minutes <= 0 {
            return Err(ConfigError::InvalidDuration(format!(
                "grid_step_minutes must be positive, got {}",
                self.grid_step_minutes
            )));
        }
        if self.buffer_minutes < 0 {
            return Err(ConfigError::InvalidDuration(format!(
                "buffer_minutes must not be negative, got {}",
                self.buffer_minutes
            )));
        }
        for (name, value) in [
            ("slot_minutes", self.slot_minutes),
            ("buffer_minutes", self.buffer_minutes),
            ("grid_step_minutes", self.grid_step_minutes),
        ] {
            if value > MAX_MINUTES {
                return Err(ConfigError::InvalidDuration(format!(
                    "{name} must be at most {MAX_MINUTES}, got {value}"
                )));
            }
        }
        if self.day_start >= self.day_end {
            return Err(ConfigError::InvalidHours(format!(
                "day_start {} is not before day_end {}",
                self.day_start, self.day_end
            )));
        }
        let slot = Duration::minutes(self.slot_minutes);
        if self.day_end - self.day_start < slot {
            return Err(ConfigError::InvalidHours(format!(
                "a {}-minute slot does not fit between {} and {}",
                self.slot_minutes, self.day_start, self.day_end
            )));
        }
        let tz: Tz = self
            .timezone
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))?;

        Ok(ClinicSchedule {
            slot,
            buffer: Duration::minutes(self.buffer_minutes),
            grid_step: Duration::minutes(self.grid_step_minutes),
            day_start: self.day_start,
            day_end: self.day_end,
            tz,
            dst_policy: self.dst_policy,
        })
    }
}

/// Validated scheduling constants plus the clinic timezone.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicSchedule {
    slot: Duration,
    buffer: Duration,
    grid_step: Duration,
    day_start: NaiveTime,
    day_end: NaiveTime,
    tz: Tz,
    dst_policy: DstPolicy,
}

impl ClinicSchedule {
    pub fn slot(&self) -> Duration {
        self.slot
    }

    pub fn buffer(&self) -> Duration {
        self.buffer
    }

    pub fn grid_step(&self) -> Duration {
        self.grid_step
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// # Errors
    /// `SchedulingError::Validation` unless `end - start` is exactly one slot.
    pub fn ensure_slot_length(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        if end - start == self.slot {
            return Ok(());
        }
        Err(SchedulingError::Validation(format!(
            "appointment must be exactly {} minutes long",
            self.slot.num_minutes()
        )))
    }

    /// `date @ DAY_START` and `date @ DAY_END` in the clinic zone, as instants.
    pub fn opening_hours(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let open = resolve_local(self.tz, date.and_time(self.day_start), self.dst_policy)?;
        let close = resolve_local(self.tz, date.and_time(self.day_end), self.dst_policy)?;
        Ok((open, close))
    }

    /// Local midnight of `date` to local midnight of the following day.
    pub fn calendar_day(&self, date: NaiveDate) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let next = date.succ_opt().unwrap_or(date);
        let start = resolve_local(self.tz, date.and_time(NaiveTime::MIN), DstPolicy::ShiftForward)?;
        let end = resolve_local(self.tz, next.and_time(NaiveTime::MIN), DstPolicy::ShiftForward)?;
        Ok((start, end))
    }

    /// The clinic-calendar date an instant falls on.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Clinic-local time of day, formatted `HH:MM`.
    pub fn local_time_label(&self, instant: DateTime<Utc>) -> String {
        instant.with_timezone(&self.tz).format("%H:%M").to_string()
    }
}

/// `HH:MM` (seconds optional on input) for clinic opening times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve() {
        let schedule = SchedulingConfig::default().resolve().unwrap();
        assert_eq!(schedule.slot(), Duration::minutes(60));
        assert_eq!(schedule.buffer(), Duration::minutes(15));
        assert_eq!(schedule.grid_step(), Duration::minutes(15));
        assert_eq!(schedule.timezone(), chrono_tz::America::New_York);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = SchedulingConfig::from_json(r#"{"slot_minutes": 90, "day_end": "18:30"}"#).unwrap();
        assert_eq!(config.slot_minutes, 90);
        assert_eq!(config.buffer_minutes, 15);
        assert_eq!(config.day_end, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(SchedulingConfig::from_json(r#"{"slot_length": 90}"#).is_err());
    }

    #[test]
    fn from_json_rejects_values_resolve_would_reject() {
        let err = SchedulingConfig::from_json(r#"{"slot_minutes": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDuration(_)), "{err}");
        let err = SchedulingConfig::from_json(r#"{"timezone": "Nowhere/Atlantis"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimezone(_)), "{err}");
    }

    #[test]
    fn slot_length_must_match_exactly() {
        let schedule = SchedulingConfig::default().resolve().unwrap();
        let start = DateTime::parse_from_rfc3339("2026-01-12T15:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(schedule.ensure_slot_length(start, start + Duration::minutes(60)).is_ok());
        let err = schedule
            .ensure_slot_length(start, start + Duration::minutes(61))
            .unwrap_err();
        assert!(err.to_string().contains("exactly 60 minutes"), "{err}");
    }

    #[test]
    fn rejects_bad_timezone() {
        let config = SchedulingConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..SchedulingConfig::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidTimezone(_))));
    }

    #[test]
    fn rejects_zero_grid_step() {
        let config = SchedulingConfig {
            grid_step_minutes: 0,
            ..SchedulingConfig::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidDuration(_))));
    }

    #[test]
    fn rejects_slot_longer_than_day() {
        let config = SchedulingConfig {
            slot_minutes: 9 * 60,
            ..SchedulingConfig::default()
        };
        assert!(matches!(config.resolve(), Err(ConfigError::InvalidHours(_))));
    }

    #[test]
    fn opening_hours_follow_clinic_zone() {
        let schedule = SchedulingConfig::default().resolve().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
        let (open, close) = schedule.opening_hours(date).unwrap();
        // EST is UTC-5 in January.
        assert_eq!(open.to_rfc3339(), "2026-01-12T14:00:00+00:00");
        assert_eq!(close.to_rfc3339(), "2026-01-12T22:00:00+00:00");
        assert_eq!(schedule.local_time_label(open), "09:00");
    }
}
