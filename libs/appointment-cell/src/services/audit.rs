use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

/// One append-only event: who did what to which row, with before/after
/// snapshots where the operation has them.
#[derive(Debug, Clone)]
pub struct AuditRecord {
    pub user_id: String,
    pub role: Option<String>,
    pub action: &'static str,
    pub table_name: &'static str,
    pub record_id: Uuid,
    pub old_data: Option<Value>,
    pub new_data: Option<Value>,
}

/// Writes the audit trail. Every appointment mutation must emit an
/// entry, but delivery is best-effort: a failed write is logged and
/// never rolls back the mutation it describes.
pub struct AuditTrailService {
    supabase: Arc<SupabaseClient>,
}

impl AuditTrailService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn record(&self, entry: AuditRecord) {
        debug!(
            action = entry.action,
            record_id = %entry.record_id,
            user_id = %entry.user_id,
            "Writing audit entry"
        );

        let body = json!({
            "user_id": entry.user_id,
            "role": entry.role,
            "action": entry.action,
            "table_name": entry.table_name,
            "record_id": entry.record_id,
            "old_data": entry.old_data,
            "new_data": entry.new_data,
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
                "/rest/v1/audit_logs",
                Some(body),
                Some(headers),
            )
            .await
        {
            warn!(
                "Audit log write failed for {} on record {}: {}",
                entry.action, entry.record_id, e
            );
        }
    }
}
