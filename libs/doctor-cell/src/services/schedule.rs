use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{DoctorError, ScheduleWindow, WeeklySchedule};

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Weekday index for a calendar date, 0 = Sunday .. 6 = Saturday.
/// The date is a plain calendar value; deriving the weekday never goes
/// through local time, so the result cannot drift across timezones.
pub fn day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

pub fn weekday_name(day: i32) -> &'static str {
    WEEKDAY_NAMES[day.rem_euclid(7) as usize]
}

/// Resolves a doctor's recurring weekly availability for concrete dates.
pub struct ScheduleService {
    supabase: Arc<SupabaseClient>,
}

impl ScheduleService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// The doctor's working window on `date`, or a definite
    /// "does not work on <Weekday>" rejection. A weekday should hold at
    /// most one active entry; if the store disagrees, the first row by
    /// start_time wins so the pick stays deterministic.
    pub async fn resolve_window(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<ScheduleWindow, DoctorError> {
        let day = day_of_week(date);
        debug!("Resolving schedule for doctor {} on {} (day {})", doctor_id, date, day);

        let path = format!(
            "/rest/v1/doctor_schedules?doctor_id=eq.{}&day_of_week=eq.{}&is_active=eq.true&order=start_time.asc&limit=1",
            doctor_id, day
        );

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or_else(|| {
            DoctorError::NoScheduleForWeekday {
                weekday: weekday_name(day).to_string(),
            }
        })?;

        let schedule: WeeklySchedule = serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse schedule: {}", e)))?;

        Ok(ScheduleWindow {
            start_time: schedule.start_time,
            end_time: schedule.end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_index_is_sunday_based() {
        // 2025-06-02 is a Monday, 2025-06-01 a Sunday.
        let monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2025, 6, 7).unwrap();

        assert_eq!(day_of_week(monday), 1);
        assert_eq!(day_of_week(sunday), 0);
        assert_eq!(day_of_week(saturday), 6);
    }

    #[test]
    fn weekday_names_line_up() {
        assert_eq!(weekday_name(0), "Sunday");
        assert_eq!(weekday_name(3), "Wednesday");
        assert_eq!(weekday_name(6), "Saturday");
    }
}
