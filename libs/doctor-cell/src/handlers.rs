use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::error::AppError;

use crate::models::DoctorError;
use crate::services::DoctorDirectoryService;

#[derive(Debug, Deserialize)]
pub struct DoctorListQuery {
    pub specialization: Option<String>,
}

/// Public directory listing for the patient-facing browse page.
#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<DoctorListQuery>,
) -> Result<Json<Value>, AppError> {
    let directory = DoctorDirectoryService::new(Arc::new(SupabaseClient::new(&state)));

    let listing = directory
        .list_doctors(params.specialization.as_deref())
        .await
        .map_err(|e| match e {
            DoctorError::DatabaseError(msg) => {
                tracing::error!("Doctor listing failed: {}", msg);
                AppError::Internal("Failed to fetch doctors. Please try again.".to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "doctors": listing.doctors,
            "specializations": listing.specializations
        }
    })))
}
