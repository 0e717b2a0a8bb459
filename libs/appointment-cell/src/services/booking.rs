use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::models::{Doctor, DoctorError, ScheduleWindow};
use doctor_cell::services::{DoctorDirectoryService, ScheduleService};
use patient_cell::models::PatientError;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::supabase::{DbError, SupabaseClient};
use shared_models::auth::User;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentType, BookingResponse,
    CancelAppointmentRequest, CompleteAppointmentRequest, CreateAppointmentRequest,
    DoctorDisplay, RescheduleAppointmentRequest, RescheduleResponse, SlotChange,
    ValidatedBooking, ALLOWED_DURATIONS, MAX_PENDING_APPOINTMENTS,
    MIN_CANCELLATION_REASON_LEN, MIN_MEDICAL_NOTES_LEN, MIN_REASON_LEN,
};
use crate::services::audit::{AuditRecord, AuditTrailService};
use crate::services::conflict::ConflictDetectionService;
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::notify::NotificationService;
use crate::services::timeslot;

pub struct AppointmentBookingService {
    supabase: Arc<SupabaseClient>,
    directory: DoctorDirectoryService,
    schedule: ScheduleService,
    conflicts: ConflictDetectionService,
    patients: PatientService,
    lifecycle: AppointmentLifecycleService,
    audit: AuditTrailService,
    notifications: NotificationService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            directory: DoctorDirectoryService::new(Arc::clone(&supabase)),
            schedule: ScheduleService::new(Arc::clone(&supabase)),
            conflicts: ConflictDetectionService::new(Arc::clone(&supabase)),
            patients: PatientService::new(Arc::clone(&supabase)),
            lifecycle: AppointmentLifecycleService::new(),
            audit: AuditTrailService::new(Arc::clone(&supabase)),
            notifications: NotificationService::new(Arc::clone(&supabase)),
            supabase,
        }
    }

    /// Book a new appointment for the authenticated patient. Runs the
    /// full policy pipeline: input validation, doctor and schedule
    /// resolution, conflict detection, booking cap, then the insert.
    pub async fn create_appointment(
        &self,
        user: &User,
        request: CreateAppointmentRequest,
    ) -> Result<BookingResponse, AppointmentError> {
        info!("Booking appointment for user {}", user.id);

        let slot = validate_create_request(&request)?;

        let patient = self
            .patients
            .resolve_for_user(&user.id)
            .await
            .map_err(map_patient_error)?;

        let doctor = self
            .directory
            .get_doctor(slot.doctor_id)
            .await
            .map_err(map_doctor_error)?;
        if !doctor.is_bookable() {
            return Err(AppointmentError::DoctorNotAvailable);
        }

        let window = self
            .schedule
            .resolve_window(doctor.id, slot.date)
            .await
            .map_err(map_doctor_error)?;
        check_window_containment(&slot.time, slot.duration_minutes, &window)?;

        self.conflicts
            .check_slot(doctor.id, slot.date, &slot.time, slot.duration_minutes, None)
            .await?;

        self.check_booking_cap(patient.id).await?;

        let appointment = self.insert_appointment(patient.id, &doctor, &slot).await?;

        self.audit
            .record(AuditRecord {
                user_id: user.id.clone(),
                role: user.role.clone(),
                action: "create_appointment",
                table_name: "appointments",
                record_id: appointment.id,
                old_data: None,
                new_data: Some(json!({
                    "doctor_id": appointment.doctor_id,
                    "appointment_date": appointment.appointment_date,
                    "appointment_time": appointment.appointment_time,
                    "duration_minutes": appointment.duration_minutes,
                })),
            })
            .await;

        let estimated_end_time = timeslot::add_minutes(&slot.time, slot.duration_minutes)
            .ok_or_else(|| {
                AppointmentError::DatabaseError("Failed to compute end time".to_string())
            })?;

        info!(
            "Appointment {} booked with doctor {} on {} at {}",
            appointment.id, doctor.id, slot.date, slot.time
        );

        Ok(BookingResponse {
            appointment,
            doctor: DoctorDisplay {
                name: doctor.full_name,
                specialization: doctor.specialization,
            },
            estimated_end_time,
        })
    }

    /// Cancel an appointment. Legal while it still occupies the
    /// calendar; requires a reason and records who cancelled.
    pub async fn cancel_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Cancelling appointment {}", appointment_id);

        let reason = request
            .cancellation_reason
            .as_deref()
            .map(str::trim)
            .unwrap_or("");
        if reason.len() < MIN_CANCELLATION_REASON_LEN {
            return Err(AppointmentError::CancellationReasonTooShort);
        }

        let appointment = self.get_appointment(appointment_id).await?;
        let actor_role = self.authorize_participant(user, &appointment).await?;

        if !self.lifecycle.can_cancel(&appointment.status) {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        let now = Utc::now();
        let updated = self
            .update_appointment_record(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Cancelled.to_string(),
                    "cancellation_reason": reason,
                    "cancelled_by": actor_role,
                    "cancelled_at": now.to_rfc3339(),
                    "updated_at": now.to_rfc3339(),
                }),
            )
            .await?;

        self.audit
            .record(AuditRecord {
                user_id: user.id.clone(),
                role: user.role.clone(),
                action: "cancel_appointment",
                table_name: "appointments",
                record_id: appointment_id,
                old_data: Some(json!({ "status": appointment.status.to_string() })),
                new_data: Some(json!({
                    "status": updated.status.to_string(),
                    "cancellation_reason": reason,
                    "cancelled_by": actor_role,
                })),
            })
            .await;

        info!("Appointment {} cancelled by {}", appointment_id, actor_role);
        Ok(updated)
    }

    /// Move an appointment to a new slot. The new slot passes the same
    /// checks as a fresh booking, with the appointment itself excluded
    /// from its own conflict set. Rescheduling does not add an
    /// appointment, so the booking cap is not re-checked.
    pub async fn reschedule_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<RescheduleResponse, AppointmentError> {
        debug!("Rescheduling appointment {}", appointment_id);

        let appointment = self.get_appointment(appointment_id).await?;
        self.authorize_participant(user, &appointment).await?;

        if !self.lifecycle.can_reschedule(&appointment.status) {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }
        if appointment.appointment_date < Utc::now().date_naive() {
            return Err(AppointmentError::NotUpcoming);
        }

        let (date_str, time) = match (&request.appointment_date, &request.appointment_time) {
            (Some(date), Some(time)) => (date.as_str(), time.as_str()),
            _ => {
                return Err(AppointmentError::MissingFields(
                    "appointment_date, appointment_time".to_string(),
                ))
            }
        };
        let duration_minutes = request
            .duration_minutes
            .unwrap_or(appointment.duration_minutes);

        if !ALLOWED_DURATIONS.contains(&duration_minutes) {
            return Err(AppointmentError::InvalidDuration);
        }
        if !timeslot::is_valid_date(date_str) {
            return Err(AppointmentError::InvalidDate);
        }
        if !timeslot::is_valid_time(time) {
            return Err(AppointmentError::InvalidTime);
        }
        if !timeslot::is_business_hours(time) {
            return Err(AppointmentError::OutsideBusinessHours);
        }

        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| AppointmentError::InvalidDate)?;

        let doctor = self
            .directory
            .get_doctor(appointment.doctor_id)
            .await
            .map_err(map_doctor_error)?;
        if !doctor.is_bookable() {
            return Err(AppointmentError::DoctorNotAvailable);
        }

        let window = self
            .schedule
            .resolve_window(doctor.id, date)
            .await
            .map_err(map_doctor_error)?;
        check_window_containment(time, duration_minutes, &window)?;

        self.conflicts
            .check_slot(doctor.id, date, time, duration_minutes, Some(appointment_id))
            .await?;

        let previous = SlotChange {
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time.clone(),
            duration_minutes: appointment.duration_minutes,
        };
        let new = SlotChange {
            appointment_date: date,
            appointment_time: time.to_string(),
            duration_minutes,
        };

        let updated = self
            .update_appointment_record(
                appointment_id,
                json!({
                    "appointment_date": date,
                    "appointment_time": time,
                    "duration_minutes": duration_minutes,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await?;

        self.audit
            .record(AuditRecord {
                user_id: user.id.clone(),
                role: user.role.clone(),
                action: "reschedule_appointment",
                table_name: "appointments",
                record_id: appointment_id,
                old_data: Some(json!(previous)),
                new_data: Some(json!(new)),
            })
            .await;

        info!(
            "Appointment {} rescheduled to {} at {}",
            appointment_id, date, time
        );

        Ok(RescheduleResponse {
            appointment: updated,
            previous,
            new,
        })
    }

    /// Close out a visit with the doctor's notes and notify the
    /// patient. Only the assigned doctor or an admin may complete.
    pub async fn complete_appointment(
        &self,
        user: &User,
        appointment_id: Uuid,
        request: CompleteAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Completing appointment {}", appointment_id);

        let notes = request
            .medical_notes
            .as_deref()
            .map(str::trim)
            .unwrap_or("");
        if notes.len() < MIN_MEDICAL_NOTES_LEN {
            return Err(AppointmentError::MedicalNotesTooShort);
        }
        let follow_up = request
            .follow_up_required
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let appointment = self.get_appointment(appointment_id).await?;

        let actor_role = self.authorize_participant(user, &appointment).await?;
        if actor_role == "patient" {
            return Err(AppointmentError::Unauthorized);
        }

        if !self.lifecycle.can_complete(&appointment.status) {
            return Err(AppointmentError::InvalidStatusTransition(appointment.status));
        }

        let updated = self
            .update_appointment_record(
                appointment_id,
                json!({
                    "status": AppointmentStatus::Completed.to_string(),
                    "notes": notes,
                    "follow_up_notes": follow_up,
                    "updated_at": Utc::now().to_rfc3339(),
                }),
            )
            .await?;

        self.audit
            .record(AuditRecord {
                user_id: user.id.clone(),
                role: user.role.clone(),
                action: "complete_appointment",
                table_name: "appointments",
                record_id: appointment_id,
                old_data: Some(json!({ "status": appointment.status.to_string() })),
                new_data: Some(json!({ "status": updated.status.to_string() })),
            })
            .await;

        // Best-effort: completion stands even if the notice fails.
        self.notifications
            .send_completion_notice(updated.patient_id, updated.id, follow_up)
            .await;

        info!("Appointment {} completed", appointment_id);
        Ok(updated)
    }

    /// Fetch an appointment, enforcing that the caller participates in
    /// it (or is an admin).
    pub async fn get_appointment_authorized(
        &self,
        user: &User,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.get_appointment(appointment_id).await?;
        self.authorize_participant(user, &appointment).await?;
        Ok(appointment)
    }

    /// A patient's agenda, newest day first. Callers must own the
    /// record or be an admin.
    pub async fn list_patient_appointments(
        &self,
        user: &User,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if !user.is_admin() {
            let patient = self
                .patients
                .resolve_for_user(&user.id)
                .await
                .map_err(|_| AppointmentError::Unauthorized)?;
            if patient.id != patient_id {
                return Err(AppointmentError::Unauthorized);
            }
        }

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=appointment_date.desc,appointment_time.asc",
            patient_id
        );
        self.fetch_appointments(&path).await
    }

    /// A doctor's agenda for one date (or all upcoming), time-ordered.
    pub async fn list_doctor_appointments(
        &self,
        user: &User,
        doctor_id: Uuid,
        date: Option<NaiveDate>,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        if !user.is_admin() {
            let doctor = self
                .directory
                .get_doctor_for_user(&user.id)
                .await
                .map_err(|_| AppointmentError::Unauthorized)?;
            if doctor.id != doctor_id {
                return Err(AppointmentError::Unauthorized);
            }
        }

        let mut path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&order=appointment_date.asc,appointment_time.asc",
            doctor_id
        );
        if let Some(date) = date {
            path.push_str(&format!("&appointment_date=eq.{}", date));
        }
        if let Some(status) = status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        self.fetch_appointments(&path).await
    }

    // ==============================================================================
    // PRIVATE HELPERS
    // ==============================================================================

    async fn get_appointment(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e))
        })
    }

    async fn fetch_appointments(&self, path: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| {
                AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e))
            })
    }

    /// Resolve the caller to a role over this appointment: the owning
    /// patient, the assigned doctor, or an admin. Anything else is an
    /// authorization failure, checked before any mutation.
    async fn authorize_participant(
        &self,
        user: &User,
        appointment: &Appointment,
    ) -> Result<&'static str, AppointmentError> {
        if user.is_admin() {
            return Ok("admin");
        }

        if user.is_patient() {
            let patient = self.patients.resolve_for_user(&user.id).await.map_err(|e| {
                match e {
                    PatientError::NotFound => AppointmentError::Unauthorized,
                    PatientError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
                }
            })?;
            if patient.id == appointment.patient_id {
                return Ok("patient");
            }
        } else if user.is_doctor() {
            let doctor = self
                .directory
                .get_doctor_for_user(&user.id)
                .await
                .map_err(|e| match e {
                    DoctorError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
                    _ => AppointmentError::Unauthorized,
                })?;
            if doctor.id == appointment.doctor_id {
                return Ok("doctor");
            }
        }

        Err(AppointmentError::Unauthorized)
    }

    /// Booking cap: pending (scheduled/confirmed) appointments from
    /// today onward, counted per patient.
    async fn check_booking_cap(&self, patient_id: Uuid) -> Result<(), AppointmentError> {
        let today = Utc::now().date_naive();
        let path = format!(
            "/rest/v1/appointments?select=id&patient_id=eq.{}&status=in.(scheduled,confirmed)&appointment_date=gte.{}",
            patient_id, today
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        debug!(
            "Patient {} holds {}/{} pending appointments",
            patient_id,
            result.len(),
            MAX_PENDING_APPOINTMENTS
        );

        if result.len() >= MAX_PENDING_APPOINTMENTS {
            return Err(AppointmentError::BookingCapExceeded);
        }

        Ok(())
    }

    async fn insert_appointment(
        &self,
        patient_id: Uuid,
        doctor: &Doctor,
        slot: &ValidatedBooking,
    ) -> Result<Appointment, AppointmentError> {
        let now = Utc::now();
        let body = json!({
            "patient_id": patient_id,
            "doctor_id": doctor.id,
            "appointment_date": slot.date,
            "appointment_time": slot.time,
            "duration_minutes": slot.duration_minutes,
            "status": AppointmentStatus::Scheduled.to_string(),
            "appointment_type": slot.appointment_type.to_string(),
            "reason": slot.reason,
            "reminder_sent": false,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/appointments", Some(body), Some(headers))
            .await
            .map_err(|e| match e {
                // The store's no-overlap exclusion constraint is the
                // backstop for the check-then-insert race: a concurrent
                // booking that won the slot surfaces here as a conflict,
                // not as an infrastructure failure.
                DbError::Conflict(detail) => {
                    warn!("Insert lost the slot race for doctor {}: {}", doctor.id, detail);
                    AppointmentError::SlotConflict {
                        start: slot.time.clone(),
                        end: timeslot::add_minutes(&slot.time, slot.duration_minutes)
                            .unwrap_or_else(|| slot.time.clone()),
                    }
                }
                other => AppointmentError::DatabaseError(other.to_string()),
            })?;

        let row = result.into_iter().next().ok_or_else(|| {
            AppointmentError::DatabaseError("Insert returned no row".to_string())
        })?;

        serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse created appointment: {}", e))
        })
    }

    async fn update_appointment_record(
        &self,
        appointment_id: Uuid,
        update: Value,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::PATCH, &path, Some(update), Some(headers))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        serde_json::from_value(row).map_err(|e| {
            AppointmentError::DatabaseError(format!("Failed to parse updated appointment: {}", e))
        })
    }
}

// ==============================================================================
// PURE VALIDATION
// ==============================================================================

/// Steps 1-4 of the booking pipeline: presence, reason length, duration
/// and type membership, date/time formats, business hours. Runs before
/// any store access.
pub fn validate_create_request(
    request: &CreateAppointmentRequest,
) -> Result<ValidatedBooking, AppointmentError> {
    let (doctor_id, date_str, time, reason) = match (
        request.doctor_id,
        request.appointment_date.as_deref(),
        request.appointment_time.as_deref(),
        request.reason.as_deref(),
    ) {
        (Some(doctor_id), Some(date), Some(time), Some(reason)) => {
            (doctor_id, date, time, reason)
        }
        _ => {
            return Err(AppointmentError::MissingFields(
                "doctor_id, appointment_date, appointment_time, reason".to_string(),
            ))
        }
    };

    let reason = reason.trim();
    if reason.len() < MIN_REASON_LEN {
        return Err(AppointmentError::ReasonTooShort);
    }

    let duration_minutes = request.duration_minutes.unwrap_or(30);
    if !ALLOWED_DURATIONS.contains(&duration_minutes) {
        return Err(AppointmentError::InvalidDuration);
    }

    let appointment_type = match request.appointment_type.as_deref() {
        None => AppointmentType::Routine,
        Some(raw) => {
            AppointmentType::parse(raw).ok_or(AppointmentError::InvalidAppointmentType)?
        }
    };

    if !timeslot::is_valid_date(date_str) {
        return Err(AppointmentError::InvalidDate);
    }
    if !timeslot::is_valid_time(time) {
        return Err(AppointmentError::InvalidTime);
    }
    if !timeslot::is_business_hours(time) {
        return Err(AppointmentError::OutsideBusinessHours);
    }

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppointmentError::InvalidDate)?;

    Ok(ValidatedBooking {
        doctor_id,
        date,
        time: time.to_string(),
        duration_minutes,
        appointment_type,
        reason: reason.to_string(),
    })
}

/// Step 7: the candidate interval must sit fully inside the doctor's
/// window for that weekday.
fn check_window_containment(
    time: &str,
    duration_minutes: i32,
    window: &ScheduleWindow,
) -> Result<(), AppointmentError> {
    let start = timeslot::parse_minutes(time).ok_or(AppointmentError::InvalidTime)?;
    let end = start + duration_minutes;

    let window_start = timeslot::parse_minutes(&window.start_time).ok_or_else(|| {
        AppointmentError::DatabaseError("Malformed schedule start_time".to_string())
    })?;
    let window_end = timeslot::parse_minutes(&window.end_time).ok_or_else(|| {
        AppointmentError::DatabaseError("Malformed schedule end_time".to_string())
    })?;

    if start < window_start || end > window_end {
        return Err(AppointmentError::OutsideDoctorHours {
            start: timeslot::format_minutes(window_start),
            end: timeslot::format_minutes(window_end),
        });
    }

    Ok(())
}

fn map_doctor_error(e: DoctorError) -> AppointmentError {
    match e {
        DoctorError::NotFound => AppointmentError::DoctorNotFound,
        DoctorError::NoScheduleForWeekday { weekday } => {
            AppointmentError::DoctorNotWorking { weekday }
        }
        DoctorError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
    }
}

fn map_patient_error(e: PatientError) -> AppointmentError {
    match e {
        PatientError::NotFound => AppointmentError::PatientNotFound,
        PatientError::DatabaseError(msg) => AppointmentError::DatabaseError(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            doctor_id: Some(Uuid::new_v4()),
            appointment_date: Some("2099-06-01".to_string()),
            appointment_time: Some("09:00".to_string()),
            duration_minutes: Some(30),
            appointment_type: Some("routine".to_string()),
            reason: Some("Persistent morning headaches".to_string()),
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        let validated = validate_create_request(&base_request()).unwrap();
        assert_eq!(validated.duration_minutes, 30);
        assert_eq!(validated.appointment_type, AppointmentType::Routine);
        assert_eq!(validated.time, "09:00");
    }

    #[test]
    fn missing_fields_rejected_with_field_list() {
        let request = CreateAppointmentRequest {
            doctor_id: None,
            ..base_request()
        };
        let err = validate_create_request(&request).unwrap_err();
        assert!(matches!(err, AppointmentError::MissingFields(_)));
    }

    #[test]
    fn reason_boundary_is_ten_characters() {
        let mut request = base_request();

        request.reason = Some("123456789".to_string());
        assert_eq!(
            validate_create_request(&request).unwrap_err(),
            AppointmentError::ReasonTooShort
        );

        request.reason = Some("1234567890".to_string());
        assert!(validate_create_request(&request).is_ok());
    }

    #[test]
    fn reason_is_trimmed_before_measuring() {
        let mut request = base_request();
        request.reason = Some("   12345678   ".to_string());
        assert_eq!(
            validate_create_request(&request).unwrap_err(),
            AppointmentError::ReasonTooShort
        );
    }

    #[test]
    fn duration_defaults_to_thirty_and_rejects_off_menu() {
        let mut request = base_request();

        request.duration_minutes = None;
        assert_eq!(validate_create_request(&request).unwrap().duration_minutes, 30);

        for bad in [0, 10, 20, 90, 120, -15] {
            request.duration_minutes = Some(bad);
            assert_eq!(
                validate_create_request(&request).unwrap_err(),
                AppointmentError::InvalidDuration
            );
        }
    }

    #[test]
    fn type_defaults_to_routine_and_rejects_unknown() {
        let mut request = base_request();

        request.appointment_type = None;
        assert_eq!(
            validate_create_request(&request).unwrap().appointment_type,
            AppointmentType::Routine
        );

        request.appointment_type = Some("surgery".to_string());
        assert_eq!(
            validate_create_request(&request).unwrap_err(),
            AppointmentError::InvalidAppointmentType
        );
    }

    #[test]
    fn past_dates_and_bad_times_rejected() {
        let mut request = base_request();

        request.appointment_date = Some("2020-01-01".to_string());
        assert_eq!(
            validate_create_request(&request).unwrap_err(),
            AppointmentError::InvalidDate
        );

        request.appointment_date = Some("2099-06-01".to_string());
        request.appointment_time = Some("9am".to_string());
        assert_eq!(
            validate_create_request(&request).unwrap_err(),
            AppointmentError::InvalidTime
        );
    }

    #[test]
    fn outside_business_hours_rejected() {
        let mut request = base_request();
        request.appointment_time = Some("06:30".to_string());
        assert_eq!(
            validate_create_request(&request).unwrap_err(),
            AppointmentError::OutsideBusinessHours
        );
    }

    #[test]
    fn window_containment_matches_doctor_hours() {
        let window = ScheduleWindow {
            start_time: "08:00:00".to_string(),
            end_time: "17:00:00".to_string(),
        };

        assert!(check_window_containment("08:00", 30, &window).is_ok());
        assert!(check_window_containment("16:30", 30, &window).is_ok());

        // 16:45 + 30 runs past the 17:00 close.
        let err = check_window_containment("16:45", 30, &window).unwrap_err();
        assert_eq!(
            err,
            AppointmentError::OutsideDoctorHours {
                start: "08:00".to_string(),
                end: "17:00".to_string()
            }
        );

        assert!(check_window_containment("07:45", 30, &window).is_err());
    }
}
