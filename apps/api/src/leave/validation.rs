use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::leave::LeaveStatus;

const MAX_REASON_CHARS: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct NewLeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

impl NewLeaveRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.end_date < self.start_date {
            return Err(AppError::Validation(format!(
                "end_date {} is before start_date {}",
                self.end_date, self.start_date
            )));
        }
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation("reason cannot be empty".to_string()));
        }
        if reason.chars().count() > MAX_REASON_CHARS {
            return Err(AppError::Validation(format!(
                "reason cannot exceed {MAX_REASON_CHARS} characters"
            )));
        }
        Ok(())
    }

    /// Inclusive day count.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// A decision must be final, and only pending requests can be decided.
pub fn check_decision(current_status: &str, decision: LeaveStatus) -> Result<(), AppError> {
    if decision == LeaveStatus::Pending {
        return Err(AppError::Validation(
            "status must be Approved or Rejected".to_string(),
        ));
    }
    if current_status != LeaveStatus::Pending.as_str() {
        return Err(AppError::Conflict(format!(
            "leave request is already {current_status}"
        )));
    }
    Ok(())
}
