//! Client-side input checks.

use thiserror::Error;

use crate::api::{NewMachine, NewTask, ProductionLog, TaskEdit};
use crate::model::Precedence;

/// Input rejected before any request is sent.
///
/// The `Display` text is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ValidationError {
    #[error("Task name is required.")]
    MissingTaskName,
    #[error("Duration must be greater than zero.")]
    NonPositiveDuration,
    #[error("Machine name is required.")]
    MissingMachineName,
    #[error("No details provided for update.")]
    NoDetailsProvided,
    #[error("Status is required.")]
    MissingStatus,
    #[error("Task ids must be positive integers.")]
    NonPositiveTaskId,
    #[error("Capacity must be at least 1.")]
    NonPositiveCapacity,
    #[error("Resource description is required.")]
    MissingResource,
    #[error("Product count cannot be negative.")]
    NegativeProductCount,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check_duration(hours: f64) -> Result<(), ValidationError> {
    // NaN fails the comparison too.
    if hours.is_finite() && hours > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveDuration)
    }
}

/// Name, positive duration and machine are all required.
pub fn validate_new_task(task: &NewTask) -> Result<(), ValidationError> {
    if blank(&task.name) {
        return Err(ValidationError::MissingTaskName);
    }
    check_duration(task.duration_hours)?;
    if blank(&task.machine_name) {
        return Err(ValidationError::MissingMachineName);
    }
    Ok(())
}

/// At least one field, and every present field valid.
pub fn validate_task_edit(edit: &TaskEdit) -> Result<(), ValidationError> {
    if edit.is_empty() {
        return Err(ValidationError::NoDetailsProvided);
    }
    if edit.name.as_deref().is_some_and(blank) {
        return Err(ValidationError::MissingTaskName);
    }
    if let Some(hours) = edit.duration_hours {
        check_duration(hours)?;
    }
    if edit.machine_name.as_deref().is_some_and(blank) {
        return Err(ValidationError::MissingMachineName);
    }
    Ok(())
}

/// Rejects blank statuses only.
pub fn validate_status(status: &str) -> Result<(), ValidationError> {
    if blank(status) {
        return Err(ValidationError::MissingStatus);
    }
    Ok(())
}

/// Both ids must be positive.
pub fn validate_precedence(rule: &Precedence) -> Result<(), ValidationError> {
    if rule.predecessor_id <= 0 || rule.successor_id <= 0 {
        return Err(ValidationError::NonPositiveTaskId);
    }
    Ok(())
}

/// Non-blank name and capacity of at least 1.
pub fn validate_new_machine(machine: &NewMachine) -> Result<(), ValidationError> {
    if blank(&machine.name) {
        return Err(ValidationError::MissingMachineName);
    }
    if machine.capacity < 1 {
        return Err(ValidationError::NonPositiveCapacity);
    }
    Ok(())
}

/// Positive task id, non-blank resource, non-negative count.
pub fn validate_production_log(log: &ProductionLog) -> Result<(), ValidationError> {
    if log.task_id <= 0 {
        return Err(ValidationError::NonPositiveTaskId);
    }
    if blank(&log.resource_used) {
        return Err(ValidationError::MissingResource);
    }
    if log.product_count < 0 {
        return Err(ValidationError::NegativeProductCount);
    }
    Ok(())
}
