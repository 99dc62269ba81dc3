pub mod clinic;
pub mod settings;

pub use clinic::ClinicService;
pub use settings::SettingsService;
