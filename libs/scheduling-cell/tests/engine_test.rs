use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use scheduling_cell::engine::{compute_clinic_availability, compute_slots, SlotComputation};
use scheduling_cell::models::{
    BlockedRange, BookedAppointment, DayHours, DentistSchedule, SchedulePolicy, Slot, WeekSchedule,
};

fn open_policy() -> SchedulePolicy {
    SchedulePolicy {
        blocked_days: vec![],
        blocked_time_ranges: vec![],
    }
}

fn week(start: &str, end: &str) -> WeekSchedule {
    WeekSchedule {
        sunday: Some(DayHours::new(start, end)),
        monday: Some(DayHours::new(start, end)),
        tuesday: Some(DayHours::new(start, end)),
        wednesday: Some(DayHours::new(start, end)),
        thursday: Some(DayHours::new(start, end)),
        friday: Some(DayHours::new(start, end)),
        saturday: Some(DayHours::new(start, end)),
    }
}

fn booking(dentist_id: Option<Uuid>, time: &str, duration: i32, status: &str) -> BookedAppointment {
    BookedAppointment {
        dentist_id,
        time: time.to_string(),
        duration: Some(duration),
        status: Some(status.to_string()),
    }
}

fn slot_at<'a>(slots: &'a [Slot], time: &str) -> &'a Slot {
    let wanted = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
    slots
        .iter()
        .find(|slot| slot.time == wanted)
        .unwrap_or_else(|| panic!("no slot generated at {}", time))
}

fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
}

fn saturday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
}

#[test]
fn test_blocked_weekday_yields_no_slots() {
    let hours = week("08:00", "18:00");
    let input = SlotComputation {
        date: saturday(),
        policy: &SchedulePolicy::default(),
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: None,
        bookings: &[],
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    assert!(compute_slots(&input).is_empty());
}

#[test]
fn test_effective_window_is_intersection_of_both_schedules() {
    let dentist_hours = week("09:00", "17:00");
    let clinic_hours = week("08:00", "12:00");

    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: Some(&dentist_hours),
        clinic_hours: Some(&clinic_hours),
        dentist_id: None,
        bookings: &[],
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    let slots = compute_slots(&input);

    let first = slots.first().expect("window should not be empty");
    let last = slots.last().unwrap();
    assert_eq!(first.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(last.time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());
    assert!(slots.iter().all(|slot| slot.available));
}

#[test]
fn test_empty_intersection_yields_no_slots() {
    let dentist_hours = week("14:00", "18:00");
    let clinic_hours = week("08:00", "12:00");

    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: Some(&dentist_hours),
        clinic_hours: Some(&clinic_hours),
        dentist_id: None,
        bookings: &[],
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    assert!(compute_slots(&input).is_empty());
}

#[test]
fn test_conflict_exclusion_uses_half_open_overlap() {
    let hours = week("09:00", "12:00");
    let bookings = vec![booking(None, "10:00", 60, "scheduled")];

    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: None,
        bookings: &bookings,
        duration_minutes: 30,
        granularity_minutes: 15,
    };

    let slots = compute_slots(&input);

    // A 30-minute request ending exactly at the booking start does not collide
    assert!(slot_at(&slots, "09:30").available);
    assert!(!slot_at(&slots, "09:45").available);
    assert!(!slot_at(&slots, "10:00").available);
    assert!(!slot_at(&slots, "10:15").available);
    assert!(!slot_at(&slots, "10:30").available);
    assert!(!slot_at(&slots, "10:45").available);
    assert!(slot_at(&slots, "11:00").available);
}

#[test]
fn test_blocked_range_boundaries_are_inclusive() {
    let hours = week("09:00", "17:00");
    let policy = SchedulePolicy {
        blocked_days: vec![],
        blocked_time_ranges: vec![BlockedRange {
            start: "12:00".to_string(),
            end: "13:00".to_string(),
        }],
    };

    let input = SlotComputation {
        date: wednesday(),
        policy: &policy,
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: None,
        bookings: &[],
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    let slots = compute_slots(&input);

    assert!(slot_at(&slots, "11:30").available);
    assert!(!slot_at(&slots, "12:00").available);
    assert!(!slot_at(&slots, "12:30").available);
    assert!(!slot_at(&slots, "13:00").available);
    assert!(slot_at(&slots, "13:30").available);
}

#[test]
fn test_identical_inputs_give_identical_ordered_output() {
    let hours = week("08:00", "18:00");
    let bookings = vec![
        booking(None, "09:00", 60, "scheduled"),
        booking(None, "14:00", 30, "confirmed"),
    ];

    let input = SlotComputation {
        date: wednesday(),
        policy: &SchedulePolicy::default(),
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: None,
        bookings: &bookings,
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    let first = compute_slots(&input);
    let second = compute_slots(&input);

    assert_eq!(first, second);
    assert!(first.windows(2).all(|pair| pair[0].time < pair[1].time));
}

#[test]
fn test_cancelled_bookings_do_not_occupy_time() {
    let hours = week("09:00", "12:00");
    let bookings = vec![booking(None, "10:00", 60, "cancelled")];

    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: None,
        bookings: &bookings,
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    let slots = compute_slots(&input);
    assert!(slots.iter().all(|slot| slot.available));
}

#[test]
fn test_bookings_of_other_dentists_are_ignored() {
    let dentist = Uuid::new_v4();
    let other = Uuid::new_v4();
    let hours = week("09:00", "12:00");
    let bookings = vec![
        booking(Some(other), "10:00", 60, "scheduled"),
        booking(Some(dentist), "11:00", 30, "scheduled"),
    ];

    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: Some(dentist),
        bookings: &bookings,
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    let slots = compute_slots(&input);

    assert!(slot_at(&slots, "10:00").available);
    assert!(!slot_at(&slots, "11:00").available);
}

#[test]
fn test_malformed_interval_degrades_to_no_slots() {
    // start >= end is treated as "closed", not an error
    let mut hours = WeekSchedule::default();
    hours.wednesday = Some(DayHours::new("18:00", "08:00"));

    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: None,
        bookings: &[],
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    assert!(compute_slots(&input).is_empty());
}

#[test]
fn test_slot_generation_ignores_duration_at_closing_time() {
    // Candidates near closing are still generated even though the requested
    // duration would run past the end of the window
    let hours = week("09:00", "10:00");

    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: Some(&hours),
        clinic_hours: None,
        dentist_id: None,
        bookings: &[],
        duration_minutes: 60,
        granularity_minutes: 30,
    };

    let slots = compute_slots(&input);

    assert_eq!(slots.len(), 2);
    assert!(slot_at(&slots, "09:30").available);
}

#[test]
fn test_default_week_is_used_when_no_hours_configured() {
    let input = SlotComputation {
        date: wednesday(),
        policy: &open_policy(),
        dentist_hours: None,
        clinic_hours: None,
        dentist_id: None,
        bookings: &[],
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    let slots = compute_slots(&input);

    assert_eq!(
        slots.first().unwrap().time,
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    );
    assert_eq!(
        slots.last().unwrap().time,
        NaiveTime::from_hms_opt(17, 30, 0).unwrap()
    );
}

#[test]
fn test_default_policy_wednesday_scenario() {
    // Default closures (Sat/Sun, 00:00-08:00, 18:00-23:59), standard week,
    // one 09:00 booking of an hour, 30-minute requests. Derived from the
    // boundary-inclusive blocked ranges and the half-open overlap rule:
    // 08:00 sits on the blocked-range boundary, 09:00 and 09:30 collide
    // with the booking, everything else is free.
    let bookings = vec![booking(None, "09:00", 60, "scheduled")];

    let input = SlotComputation {
        date: wednesday(),
        policy: &SchedulePolicy::default(),
        dentist_hours: None,
        clinic_hours: None,
        dentist_id: None,
        bookings: &bookings,
        duration_minutes: 30,
        granularity_minutes: 30,
    };

    let slots = compute_slots(&input);

    assert_eq!(slots.len(), 20);
    for slot in &slots {
        let expected = !matches!(
            slot.time.format("%H:%M").to_string().as_str(),
            "08:00" | "09:00" | "09:30"
        );
        assert_eq!(
            slot.available,
            expected,
            "slot {} availability mismatch",
            slot.time
        );
    }
}

#[test]
fn test_per_dentist_availability_keeps_dentist_order_and_own_conflicts() {
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let dentists = vec![
        DentistSchedule {
            id: first,
            full_name: Some("Dr. Ana Souza".to_string()),
            work_hours: Some(week("09:00", "12:00")),
        },
        DentistSchedule {
            id: second,
            full_name: None,
            work_hours: Some(week("09:00", "12:00")),
        },
    ];
    let bookings = vec![booking(Some(first), "09:00", 60, "scheduled")];

    let availability = compute_clinic_availability(
        wednesday(),
        &open_policy(),
        None,
        &dentists,
        &bookings,
        30,
        30,
    );

    assert_eq!(availability.len(), 2);
    assert_eq!(availability[0].dentist_id, first);
    assert_eq!(availability[0].dentist_name, "Dr. Ana Souza");
    assert_eq!(availability[1].dentist_name, "Dentist");

    assert!(!slot_at(&availability[0].slots, "09:00").available);
    assert!(slot_at(&availability[1].slots, "09:00").available);
}
