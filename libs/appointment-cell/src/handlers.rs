use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentStatus, CancelAppointmentRequest, CompleteAppointmentRequest,
    CreateAppointmentRequest, RescheduleAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;

#[derive(Debug, Deserialize)]
pub struct DoctorAgendaQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
}

/// Policy rejections keep their specific wording; infrastructure
/// failures collapse to a generic retryable message so callers never
/// mistake a store hiccup for a business rule.
fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::DatabaseError(msg) => {
            tracing::error!("Appointment store failure: {}", msg);
            AppError::Internal(
                "Something went wrong while processing the appointment. Please try again."
                    .to_string(),
            )
        }
        AppointmentError::SlotConflict { .. } => AppError::Conflict(e.to_string()),
        AppointmentError::NotFound
        | AppointmentError::DoctorNotFound
        | AppointmentError::PatientNotFound => AppError::NotFound(e.to_string()),
        AppointmentError::Unauthorized => AppError::Auth(e.to_string()),
        other => AppError::BadRequest(other.to_string()),
    }
}

/// Book a new appointment. Only patients book; doctors and admins
/// manage existing appointments through the lifecycle endpoints.
#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if !user.is_patient() {
        return Err(AppError::Auth(
            "Only patients can book appointments".to_string(),
        ));
    }

    let booking_service = AppointmentBookingService::new(&state);

    let booked = booking_service
        .create_appointment(&user, request)
        .await
        .map_err(map_appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "appointment": booked.appointment,
                "doctor": booked.doctor,
                "estimated_end_time": booked.estimated_end_time
            },
            "message": "Appointment booked successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .get_appointment_authorized(&user, appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .cancel_appointment(&user, appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": { "appointment": appointment },
        "message": "Appointment cancelled successfully"
    })))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let outcome = booking_service
        .reschedule_appointment(&user, appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "appointment": outcome.appointment,
            "previous": outcome.previous,
            "new": outcome.new
        },
        "message": "Appointment rescheduled successfully"
    })))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppConfig>>,
    Path(appointment_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<CompleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointment = booking_service
        .complete_appointment(&user, appointment_id, request)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": { "appointment": appointment },
        "message": "Appointment completed successfully"
    })))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(patient_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .list_patient_appointments(&user, patient_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": { "appointments": appointments }
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(params): Query<DoctorAgendaQuery>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let booking_service = AppointmentBookingService::new(&state);

    let appointments = booking_service
        .list_doctor_appointments(&user, doctor_id, params.date, params.status)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "data": { "appointments": appointments }
    })))
}
