use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_database::supabase::SupabaseClient;

use crate::models::{Patient, PatientError};

/// Maps authenticated accounts to patient records. Profile mutation is
/// owned by registration, not by the booking core.
pub struct PatientService {
    supabase: Arc<SupabaseClient>,
}

impl PatientService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn resolve_for_user(&self, user_id: &str) -> Result<Patient, PatientError> {
        debug!("Resolving patient record for user: {}", user_id);

        let path = format!(
            "/rest/v1/patients?user_id=eq.{}",
            urlencoding::encode(user_id)
        );
        let result: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::DatabaseError(e.to_string()))?;

        let row = result.into_iter().next().ok_or(PatientError::NotFound)?;

        serde_json::from_value(row)
            .map_err(|e| PatientError::DatabaseError(format!("Failed to parse patient: {}", e)))
    }
}
