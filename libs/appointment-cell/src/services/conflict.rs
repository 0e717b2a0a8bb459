use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, AppointmentError};
use crate::services::timeslot;

pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Check a candidate `[start, start+duration)` slot against the
    /// doctor's bookings on that date. Only blocking statuses count;
    /// cancelled, completed and no-show rows never block. The first
    /// collision rejects with the colliding window so the caller can
    /// name it in the error message. `exclude_appointment_id` removes
    /// the appointment being rescheduled from its own conflict set.
    pub async fn check_slot(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        start_time: &str,
        duration_minutes: i32,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        debug!(
            "Checking conflicts for doctor {} on {} at {} ({} min)",
            doctor_id, date, start_time, duration_minutes
        );

        let start =
            timeslot::parse_minutes(start_time).ok_or(AppointmentError::InvalidTime)?;
        let end = start + duration_minutes;

        let booked = self
            .booked_appointments(doctor_id, date, exclude_appointment_id)
            .await?;

        for appointment in booked {
            let booked_start =
                timeslot::parse_minutes(&appointment.appointment_time).ok_or_else(|| {
                    AppointmentError::DatabaseError(format!(
                        "Malformed appointment_time on appointment {}",
                        appointment.id
                    ))
                })?;
            let booked_end = booked_start + appointment.duration_minutes;

            if timeslot::overlaps(start, end, booked_start, booked_end) {
                warn!(
                    "Conflict detected for doctor {} on {}: candidate {}-{} hits appointment {}",
                    doctor_id,
                    date,
                    start_time,
                    timeslot::format_minutes(end),
                    appointment.id
                );
                return Err(AppointmentError::SlotConflict {
                    start: timeslot::format_minutes(booked_start),
                    end: timeslot::format_minutes(booked_end),
                });
            }
        }

        Ok(())
    }

    /// Blocking appointments for (doctor, date); the status predicate is
    /// pushed into the store query rather than filtered client-side.
    async fn booked_appointments(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&status=in.(scheduled,confirmed,in_progress)&order=appointment_time.asc",
            doctor_id, date
        );

        if let Some(exclude_id) = exclude_appointment_id {
            path.push_str(&format!("&id=neq.{}", exclude_id));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
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
}
