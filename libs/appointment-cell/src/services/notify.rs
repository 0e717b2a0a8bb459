use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

/// Best-effort patient notifications. Delivery failure is logged and
/// swallowed; completing a visit must not depend on it.
pub struct NotificationService {
    supabase: Arc<SupabaseClient>,
}

impl NotificationService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn send_completion_notice(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
        follow_up: Option<&str>,
    ) {
        debug!(
            "Sending completion notice to patient {} for appointment {}",
            patient_id, appointment_id
        );

        let message = match follow_up {
            Some(note) => format!(
                "Your appointment has been completed. Follow-up: {}",
                note
            ),
            None => "Your appointment has been completed.".to_string(),
        };

        let body = json!({
            "patient_id": patient_id,
            "appointment_id": appointment_id,
            "kind": "appointment_completed",
            "message": message,
            "created_at": Utc::now().to_rfc3339(),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        if let Err(e) = self
            .supabase
            .request_with_headers::<Vec<Value>>(
                Method::POST,
                "/rest/v1/notifications",
                Some(body),
                Some(headers),
            )
            .await
        {
            warn!(
                "Completion notice for appointment {} failed to send: {}",
                appointment_id, e
            );
        }
    }
}
