pub mod audit;
pub mod booking;
pub mod conflict;
pub mod lifecycle;
pub mod notify;
pub mod timeslot;

pub use audit::AuditTrailService;
pub use booking::AppointmentBookingService;
pub use conflict::ConflictDetectionService;
pub use lifecycle::AppointmentLifecycleService;
pub use notify::NotificationService;
