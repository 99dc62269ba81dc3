//! Slot computation for a clinic day.
//!
//! Pure functions over already-fetched data: clinic closure policy, weekly
//! work hours and the day's booked appointments go in, an ordered list of
//! candidate slots comes out. No I/O happens here; callers read the inputs
//! fresh per request and treat the result as the bookable grid for one date.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use crate::models::{
    BookedAppointment, DentistAvailability, DentistSchedule, SchedulePolicy, Slot, WeekSchedule,
    WorkInterval,
};

/// Everything needed to compute the slot grid for one dentist (or for the
/// clinic as a whole when `dentist_id` is None, in which case every booked
/// appointment counts as occupying time).
#[derive(Debug, Clone)]
pub struct SlotComputation<'a> {
    pub date: NaiveDate,
    pub policy: &'a SchedulePolicy,
    /// Configured weekly hours of the dentist in question; None falls back
    /// to the standard week.
    pub dentist_hours: Option<&'a WeekSchedule>,
    /// Clinic-wide baseline hours; when present the working window is the
    /// intersection of both schedules.
    pub clinic_hours: Option<&'a WeekSchedule>,
    pub dentist_id: Option<Uuid>,
    pub bookings: &'a [BookedAppointment],
    pub duration_minutes: i32,
    pub granularity_minutes: i32,
}

/// Weekday as stored in clinic settings: 0 = Sunday through 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u32 {
    match date.weekday() {
        Weekday::Sun => 0,
        Weekday::Mon => 1,
        Weekday::Tue => 2,
        Weekday::Wed => 3,
        Weekday::Thu => 4,
        Weekday::Fri => 5,
        Weekday::Sat => 6,
    }
}

/// Compute the candidate slot grid for one date.
///
/// A slot is available only when the weekday is not clinic-blocked, it lies
/// inside the effective working window, it does not fall in a blocked time
/// range (boundaries inclusive) and its occupied duration does not overlap
/// any non-cancelled booking. Candidates are generated at granularity steps
/// across the whole window; the requested duration only affects conflict
/// checks, not which candidates exist. All comparisons are integer minutes
/// on wall-clock local times.
pub fn compute_slots(input: &SlotComputation) -> Vec<Slot> {
    if input.granularity_minutes <= 0 || input.duration_minutes < 0 {
        return Vec::new();
    }

    let weekday = weekday_index(input.date);
    if input.policy.is_day_blocked(weekday) {
        return Vec::new();
    }

    let window = match effective_window(input, weekday) {
        Some(window) => window,
        None => return Vec::new(),
    };

    let blocked = input.policy.blocked_minutes();

    let mut slots = Vec::new();
    let mut cursor = window.start;

    while cursor < window.end {
        let in_blocked_range = blocked
            .iter()
            .any(|&(start, end)| cursor >= start && cursor <= end);

        let has_conflict = booking_conflicts(
            input.bookings,
            input.dentist_id,
            cursor,
            input.duration_minutes,
        );

        slots.push(Slot {
            time: minutes_to_time(cursor),
            available: !in_blocked_range && !has_conflict,
        });

        cursor += input.granularity_minutes;
    }

    slots
}

/// Per-dentist slot grids for a clinic on one date, in the given dentist
/// order. Each dentist only conflicts with their own bookings.
pub fn compute_clinic_availability(
    date: NaiveDate,
    policy: &SchedulePolicy,
    clinic_hours: Option<&WeekSchedule>,
    dentists: &[DentistSchedule],
    bookings: &[BookedAppointment],
    duration_minutes: i32,
    granularity_minutes: i32,
) -> Vec<DentistAvailability> {
    dentists
        .iter()
        .map(|dentist| {
            let input = SlotComputation {
                date,
                policy,
                dentist_hours: dentist.work_hours.as_ref(),
                clinic_hours,
                dentist_id: Some(dentist.id),
                bookings,
                duration_minutes,
                granularity_minutes,
            };

            DentistAvailability {
                dentist_id: dentist.id,
                dentist_name: dentist
                    .full_name
                    .clone()
                    .unwrap_or_else(|| "Dentist".to_string()),
                slots: compute_slots(&input),
            }
        })
        .collect()
}

/// Whether an appointment occupying `[start, start + duration)` minutes
/// would collide with any non-cancelled booking in the list, restricted to
/// one dentist's bookings when an id is given. This is the same overlap
/// test the slot grid uses, shared so booking validation cannot drift from
/// what the grid showed the user.
pub fn booking_conflicts(
    bookings: &[BookedAppointment],
    dentist_id: Option<Uuid>,
    start_minutes: i32,
    duration_minutes: i32,
) -> bool {
    let end_minutes = start_minutes + duration_minutes;

    bookings
        .iter()
        .filter(|booking| !booking.is_cancelled())
        .filter(|booking| match dentist_id {
            Some(dentist_id) => booking.dentist_id == Some(dentist_id),
            None => true,
        })
        .filter_map(BookedAppointment::occupied)
        .any(|(start, end)| start_minutes < end && end_minutes > start)
}

/// The working window for a weekday: dentist hours (standard week when not
/// configured) intersected with the clinic baseline when one exists. An
/// empty intersection means no bookable hours.
fn effective_window(input: &SlotComputation, weekday: u32) -> Option<WorkInterval> {
    let fallback;
    let dentist_hours = match input.dentist_hours {
        Some(schedule) => schedule,
        None => {
            fallback = WeekSchedule::standard_week();
            &fallback
        }
    };

    let dentist_interval = dentist_hours.interval_for(weekday)?;

    match input.clinic_hours {
        Some(clinic) => {
            let clinic_interval = clinic.interval_for(weekday)?;
            dentist_interval.intersect(&clinic_interval)
        }
        None => Some(dentist_interval),
    }
}

fn minutes_to_time(total: i32) -> NaiveTime {
    let hours = (total / 60).rem_euclid(24) as u32;
    let minutes = total.rem_euclid(60) as u32;
    NaiveTime::from_hms_opt(hours, minutes, 0).unwrap_or(NaiveTime::MIN)
}
