use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Step between candidate booking start times.
pub const SLOT_GRANULARITY_MINUTES: i32 = 30;

/// Assumed length of an appointment when the stored row has no duration.
pub const DEFAULT_APPOINTMENT_DURATION_MINUTES: i32 = 60;

/// Parse "HH:MM" (or "HH:MM:SS" as stored by Postgres time columns) into
/// minutes since midnight. Returns None for anything malformed.
pub fn parse_hhmm(value: &str) -> Option<i32> {
    let mut parts = value.split(':');
    let hours: i32 = parts.next()?.trim().parse().ok()?;
    let minutes: i32 = parts.next()?.trim().parse().ok()?;

    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    Some(hours * 60 + minutes)
}

/// Serde adapter for the "HH:MM" wire format used by the booking UI.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// A half-open time range within a single day, in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkInterval {
    pub start: i32,
    pub end: i32,
}

impl WorkInterval {
    pub fn from_hhmm(start: &str, end: &str) -> Option<Self> {
        Some(Self {
            start: parse_hhmm(start)?,
            end: parse_hhmm(end)?,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Most restrictive combination: latest start, earliest end.
    pub fn intersect(&self, other: &WorkInterval) -> Option<WorkInterval> {
        let merged = WorkInterval {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        };
        merged.is_valid().then_some(merged)
    }
}

/// One weekday's configured hours as stored in the `work_hours` JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayHours {
    pub start: String,
    pub end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl DayHours {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            enabled: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// Minutes interval for this day; None when disabled, malformed, or
    /// start >= end (degrades to "closed" rather than erroring).
    pub fn interval(&self) -> Option<WorkInterval> {
        if !self.is_enabled() {
            return None;
        }
        WorkInterval::from_hhmm(&self.start, &self.end).filter(|interval| interval.is_valid())
    }
}

/// Weekly schedule keyed by lowercase weekday name; a missing day means
/// not working that day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekSchedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<DayHours>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<DayHours>,
}

impl WeekSchedule {
    /// Mon-Fri 08:00-18:00, weekend closed. Used whenever a dentist or
    /// clinic has no schedule configured.
    pub fn standard_week() -> Self {
        Self {
            sunday: None,
            monday: Some(DayHours::new("08:00", "18:00")),
            tuesday: Some(DayHours::new("08:00", "18:00")),
            wednesday: Some(DayHours::new("08:00", "18:00")),
            thursday: Some(DayHours::new("08:00", "18:00")),
            friday: Some(DayHours::new("08:00", "18:00")),
            saturday: None,
        }
    }

    /// Day lookup by index, 0 = Sunday through 6 = Saturday.
    pub fn day(&self, weekday: u32) -> Option<&DayHours> {
        match weekday {
            0 => self.sunday.as_ref(),
            1 => self.monday.as_ref(),
            2 => self.tuesday.as_ref(),
            3 => self.wednesday.as_ref(),
            4 => self.thursday.as_ref(),
            5 => self.friday.as_ref(),
            6 => self.saturday.as_ref(),
            _ => None,
        }
    }

    pub fn interval_for(&self, weekday: u32) -> Option<WorkInterval> {
        self.day(weekday).and_then(DayHours::interval)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedRange {
    pub start: String,
    pub end: String,
}

impl BlockedRange {
    /// Minutes pair, inclusive of both boundaries. Malformed or inverted
    /// ranges are ignored.
    pub fn minutes(&self) -> Option<(i32, i32)> {
        let start = parse_hhmm(&self.start)?;
        let end = parse_hhmm(&self.end)?;
        (start <= end).then_some((start, end))
    }
}

/// Clinic-wide closures, stored as the `schedule_blocks` clinic setting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulePolicy {
    pub blocked_days: Vec<u32>,
    pub blocked_time_ranges: Vec<BlockedRange>,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self {
            blocked_days: vec![0, 6],
            blocked_time_ranges: vec![
                BlockedRange {
                    start: "00:00".to_string(),
                    end: "08:00".to_string(),
                },
                BlockedRange {
                    start: "18:00".to_string(),
                    end: "23:59".to_string(),
                },
            ],
        }
    }
}

impl SchedulePolicy {
    pub fn is_day_blocked(&self, weekday: u32) -> bool {
        self.blocked_days.contains(&weekday)
    }

    pub fn blocked_minutes(&self) -> Vec<(i32, i32)> {
        self.blocked_time_ranges
            .iter()
            .filter_map(BlockedRange::minutes)
            .collect()
    }
}

/// The slice of an appointment row the engine needs for conflict checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookedAppointment {
    pub dentist_id: Option<Uuid>,
    pub time: String,
    pub duration: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

impl BookedAppointment {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Occupied minutes as a half-open [start, end) pair; None when the
    /// stored time cannot be parsed.
    pub fn occupied(&self) -> Option<(i32, i32)> {
        let start = parse_hhmm(&self.time)?;
        let duration = self.duration.unwrap_or(DEFAULT_APPOINTMENT_DURATION_MINUTES);
        Some((start, start + duration))
    }
}

/// One bookable candidate start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub available: bool,
}

/// A dentist's id, display name and configured hours as read from the
/// `dentists` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DentistSchedule {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub work_hours: Option<WeekSchedule>,
}

/// Per-dentist slot list for a single date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DentistAvailability {
    pub dentist_id: Uuid,
    pub dentist_name: String,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQueryRequest {
    pub date: NaiveDate,
    pub dentist_id: Option<Uuid>,
    pub duration: Option<i32>,
}
