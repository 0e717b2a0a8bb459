pub mod directory;
pub mod schedule;

pub use directory::DoctorDirectoryService;
pub use schedule::ScheduleService;
