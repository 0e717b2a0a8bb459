use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// Durations accepted for both booking and rescheduling.
pub const ALLOWED_DURATIONS: [i32; 4] = [15, 30, 45, 60];

/// Maximum simultaneously pending (scheduled/confirmed, future)
/// appointments one patient may hold.
pub const MAX_PENDING_APPOINTMENTS: usize = 5;

pub const MIN_REASON_LEN: usize = 10;
pub const MIN_CANCELLATION_REASON_LEN: usize = 5;
pub const MIN_MEDICAL_NOTES_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: NaiveDate,
    /// Wall-clock start, `HH:MM`. Appointments never cross midnight.
    pub appointment_time: String,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub notes: Option<String>,
    pub follow_up_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Whether this status occupies the doctor's calendar for conflict
    /// purposes.
    pub fn is_blocking(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled
                | AppointmentStatus::Confirmed
                | AppointmentStatus::InProgress
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed
                | AppointmentStatus::Cancelled
                | AppointmentStatus::NoShow
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::InProgress => write!(f, "in_progress"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::NoShow => write!(f, "no_show"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    FirstVisit,
    FollowUp,
    Emergency,
    Routine,
    Telemedicine,
}

impl AppointmentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "first_visit" => Some(AppointmentType::FirstVisit),
            "follow_up" => Some(AppointmentType::FollowUp),
            "emergency" => Some(AppointmentType::Emergency),
            "routine" => Some(AppointmentType::Routine),
            "telemedicine" => Some(AppointmentType::Telemedicine),
            _ => None,
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::FirstVisit => write!(f, "first_visit"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::Emergency => write!(f, "emergency"),
            AppointmentType::Routine => write!(f, "routine"),
            AppointmentType::Telemedicine => write!(f, "telemedicine"),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Booking request as it arrives on the wire. Fields are optional so
/// missing input surfaces as a policy message instead of a framework
/// deserialization error; validation happens in one place before any
/// domain logic runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Option<Uuid>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub duration_minutes: Option<i32>,
    pub appointment_type: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelAppointmentRequest {
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    /// Absent means "keep the current duration".
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAppointmentRequest {
    pub medical_notes: Option<String>,
    pub follow_up_required: Option<String>,
}

/// A booking request that survived input validation (steps 1-4 of the
/// policy pipeline): fields are present, well-formed and normalized.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: i32,
    pub appointment_type: AppointmentType,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDisplay {
    pub name: String,
    pub specialization: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub appointment: Appointment,
    pub doctor: DoctorDisplay,
    pub estimated_end_time: String,
}

/// One side of a reschedule, for the response and the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotChange {
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleResponse {
    pub appointment: Appointment,
    pub previous: SlotChange,
    pub new: SlotChange,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

/// Every rejection carries its own user-facing message; the wording is
/// part of the API contract, not an implementation detail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    #[error("Appointment reason must be at least 10 characters")]
    ReasonTooShort,

    #[error("Duration must be 15, 30, 45 or 60 minutes")]
    InvalidDuration,

    #[error("Invalid appointment type")]
    InvalidAppointmentType,

    #[error("Invalid or past appointment date")]
    InvalidDate,

    #[error("Invalid time. Expected format: HH:MM")]
    InvalidTime,

    #[error("Appointments must be between 7:00 AM and 6:00 PM")]
    OutsideBusinessHours,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor is not currently available")]
    DoctorNotAvailable,

    #[error("Doctor does not work on {weekday}")]
    DoctorNotWorking { weekday: String },

    #[error("Doctor sees patients from {start} to {end}")]
    OutsideDoctorHours { start: String, end: String },

    #[error("Time conflict: the doctor already has an appointment from {start} to {end}")]
    SlotConflict { start: String, end: String },

    #[error("Maximum of 5 pending appointments per patient")]
    BookingCapExceeded,

    #[error("Patient record not found")]
    PatientNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("Appointment cannot be modified in its current status: {0}")]
    InvalidStatusTransition(AppointmentStatus),

    #[error("Only upcoming appointments can be rescheduled")]
    NotUpcoming,

    #[error("Cancellation reason must be at least 5 characters")]
    CancellationReasonTooShort,

    #[error("Medical notes must be at least 10 characters")]
    MedicalNotesTooShort,

    #[error("Not authorized to modify this appointment")]
    Unauthorized,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
