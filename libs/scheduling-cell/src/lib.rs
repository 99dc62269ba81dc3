pub mod engine;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use engine::{booking_conflicts, compute_clinic_availability, compute_slots, SlotComputation};
pub use models::{
    BookedAppointment, DentistAvailability, DentistSchedule, SchedulePolicy, Slot,
    SlotQueryRequest, WeekSchedule, WorkInterval,
};
pub use services::AvailabilityService;
