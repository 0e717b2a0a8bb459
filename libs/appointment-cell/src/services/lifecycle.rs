use tracing::{debug, warn};

use crate::models::{AppointmentError, AppointmentStatus};

/// Pure state machine for an appointment's life. Confirm/in-progress
/// triggers live outside the core; this service only rules on legality.
pub struct AppointmentLifecycleService;

impl AppointmentLifecycleService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a single-step status transition.
    pub fn validate_status_transition(
        &self,
        current_status: &AppointmentStatus,
        new_status: &AppointmentStatus,
    ) -> Result<(), AppointmentError> {
        debug!(
            "Validating status transition from {} to {}",
            current_status, new_status
        );

        if !self.get_valid_transitions(current_status).contains(new_status) {
            warn!(
                "Invalid status transition attempted: {} -> {}",
                current_status, new_status
            );
            return Err(AppointmentError::InvalidStatusTransition(*current_status));
        }

        Ok(())
    }

    pub fn get_valid_transitions(
        &self,
        current_status: &AppointmentStatus,
    ) -> Vec<AppointmentStatus> {
        match current_status {
            AppointmentStatus::Scheduled => vec![
                AppointmentStatus::Confirmed,
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::Confirmed => vec![
                AppointmentStatus::InProgress,
                AppointmentStatus::Cancelled,
            ],
            AppointmentStatus::InProgress => vec![
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
            ],
            // Terminal states.
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => vec![],
        }
    }

    /// Cancellation is legal while the appointment still occupies the
    /// calendar: scheduled, confirmed or in progress.
    pub fn can_cancel(&self, status: &AppointmentStatus) -> bool {
        status.is_blocking()
    }

    /// A visit may be completed from any non-terminal status; walk-ins
    /// are completed without ever passing through in_progress.
    pub fn can_complete(&self, status: &AppointmentStatus) -> bool {
        status.is_blocking()
    }

    /// Rescheduling keeps the current status; it only requires the
    /// appointment not to have reached a terminal state.
    pub fn can_reschedule(&self, status: &AppointmentStatus) -> bool {
        !status.is_terminal()
    }
}

impl Default for AppointmentLifecycleService {
    fn default() -> Self {
        Self::new()
    }
}
