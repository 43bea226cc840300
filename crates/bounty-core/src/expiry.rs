//! Deadline checks.
//!
//! Expiry is derived, never stored: a task keeps its status after a deadline
//! passes, and the next lifecycle operation that needs the deadline refuses
//! to act. All checks are `now > reference + duration`; a zero duration
//! disables the check.

use crate::params::Params;
use crate::task::Task;
use crate::types::Timestamp;

fn past_deadline(now: Timestamp, reference: Timestamp, duration_secs: u64) -> bool {
    if duration_secs == 0 {
        return false;
    }
    let duration = i64::try_from(duration_secs).unwrap_or(i64::MAX);
    now > reference.saturating_add(duration)
}

/// An OPEN task can no longer be claimed. Measured from `created_at`.
pub fn is_expired(task: &Task, params: &Params, now: Timestamp) -> bool {
    past_deadline(now, task.created_at, params.task_expiry)
}

/// The claimant missed the submission window. Measured from `updated_at`,
/// which a claim sets to the claim time.
pub fn is_claim_expired(task: &Task, params: &Params, now: Timestamp) -> bool {
    task.claimant.is_some() && past_deadline(now, task.updated_at, params.claim_deadline)
}

/// The creator missed the review window. Measured from `updated_at`, which a
/// submit sets to the submission time.
pub fn is_submission_expired(task: &Task, params: &Params, now: Timestamp) -> bool {
    task.claimant.is_some() && past_deadline(now, task.updated_at, params.submission_deadline)
}
