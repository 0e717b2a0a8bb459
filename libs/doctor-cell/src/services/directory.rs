use std::collections::BTreeSet;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{Doctor, DoctorError, DoctorListing};

/// Read side of the clinic directory. Profile administration lives
/// elsewhere; the booking core only ever queries.
pub struct DoctorDirectoryService {
    supabase: Arc<SupabaseClient>,
}

impl DoctorDirectoryService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Fetch a doctor by id. Bookability (`is_available && is_active`)
    /// is the caller's check; absence is a distinct not-found.
    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor profile: {}", doctor_id);

        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(DoctorError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    /// Resolve the doctor record behind an authenticated user account.
    pub async fn get_doctor_for_user(&self, user_id: &str) -> Result<Doctor, DoctorError> {
        debug!("Resolving doctor record for user: {}", user_id);

        let path = format!(
            "/rest/v1/doctors?user_id=eq.{}",
            urlencoding::encode(user_id)
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(DoctorError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    /// List bookable doctors, optionally narrowed to one specialization,
    /// plus the distinct specialization names for the browse filter.
    pub async fn list_doctors(
        &self,
        specialization: Option<&str>,
    ) -> Result<DoctorListing, DoctorError> {
        let mut path =
            "/rest/v1/doctors?is_available=eq.true&is_active=eq.true&order=full_name.asc"
                .to_string();
        if let Some(spec) = specialization {
            path.push_str(&format!("&specialization=eq.{}", urlencoding::encode(spec)));
        }

        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let doctors: Vec<Doctor> = result
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctors: {}", e)))?;

        let specializations = self.list_specializations().await?;

        Ok(DoctorListing {
            doctors,
            specializations,
        })
    }

    async fn list_specializations(&self) -> Result<Vec<String>, DoctorError> {
        let path = "/rest/v1/doctors?select=specialization&is_available=eq.true";
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let unique: BTreeSet<String> = result
            .iter()
            .filter_map(|row| row["specialization"].as_str())
            .map(str::to_string)
            .collect();

        Ok(unique.into_iter().collect())
    }
}
