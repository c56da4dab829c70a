//! Per-step error policy for teardown mutations
//!
//! Best-effort teardown favors maximal cleanup over strict atomicity: a
//! step whose target may legitimately already be gone logs a warning and
//! lets the pipeline continue. Steps that later stages depend on are not
//! routed through here at all; their errors propagate with `?` and abort
//! the run.

use anyhow::Result;
use tracing::{error, warn};

/// Severity at which a tolerated failure is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Non-blocking step; failure is expected to be recoverable or moot
    Warning,
    /// The final step of the run; nothing left to protect, but the
    /// failure is the run's headline outcome
    Error,
}

/// Tagged outcome of one guarded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The operation succeeded
    Success,
    /// The operation failed and the failure was absorbed
    Tolerated { reason: String },
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, StepOutcome::Success)
    }
}

/// Classify the result of a tolerable mutation, logging any failure at
/// the given severity and absorbing it.
pub fn attempt<T>(result: Result<T>, operation: &str, severity: Severity) -> StepOutcome {
    match result {
        Ok(_) => StepOutcome::Success,
        Err(e) => {
            match severity {
                Severity::Warning => warn!(operation = %operation, error = ?e, "Step failed, continuing"),
                Severity::Error => error!(operation = %operation, error = ?e, "Step failed"),
            }
            StepOutcome::Tolerated {
                reason: e.to_string(),
            }
        }
    }
}

/// Shorthand for the common warning-severity case.
pub fn tolerate<T>(result: Result<T>, operation: &str) -> StepOutcome {
    attempt(result, operation, Severity::Warning)
}

/// Absorb any failure of an entire best-effort stage at warning severity.
///
/// Used for stages whose provider feature may be entirely unavailable in
/// some deployments; even unexpected errors must not abort the run.
pub fn best_effort<T>(result: Result<T>, stage: &str) -> StepOutcome {
    match result {
        Ok(_) => StepOutcome::Success,
        Err(e) => {
            warn!(stage = %stage, error = ?e, "Best-effort stage failed, continuing");
            StepOutcome::Tolerated {
                reason: e.to_string(),
            }
        }
    }
}
