use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub user_id: String,
    pub full_name: String,
    pub specialization: String,
    /// Doctor-controlled "accepting bookings" switch.
    pub is_available: bool,
    /// Account-level flag maintained by administration.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// A doctor is bookable only when both flags are set.
    pub fn is_bookable(&self) -> bool {
        self.is_available && self.is_active
    }
}

/// One recurring weekly availability window. A doctor holds at most one
/// active entry per `day_of_week` (0 = Sunday .. 6 = Saturday).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
}

/// The resolved working window for a concrete date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListing {
    pub doctors: Vec<Doctor>,
    pub specializations: Vec<String>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Doctor does not work on {weekday}")]
    NoScheduleForWeekday { weekday: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}
