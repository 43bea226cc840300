//! The fixed table of legal status changes.
//!
//! Lifecycle operations layer their own guards (actor, field presence) on top
//! of this table; generic updates are gated by it directly.

use crate::task::TaskStatus;

/// Every legal `(from, to)` edge. No other status change is permitted.
pub const VALID_TRANSITIONS: [(TaskStatus, TaskStatus); 10] = [
    (TaskStatus::Undefined, TaskStatus::Open),
    (TaskStatus::Open, TaskStatus::Claimed),
    (TaskStatus::Open, TaskStatus::Closed),
    (TaskStatus::Claimed, TaskStatus::Submitted),
    // claim reverted
    (TaskStatus::Claimed, TaskStatus::Open),
    (TaskStatus::Submitted, TaskStatus::Approved),
    (TaskStatus::Submitted, TaskStatus::Rejected),
    // re-claimed after rejection
    (TaskStatus::Rejected, TaskStatus::Claimed),
    // reopened after rejection
    (TaskStatus::Rejected, TaskStatus::Open),
    (TaskStatus::Approved, TaskStatus::Closed),
];

pub fn is_valid_transition(from: TaskStatus, to: TaskStatus) -> bool {
    VALID_TRANSITIONS.iter().any(|&(f, t)| f == from && t == to)
}

/// All statuses reachable from `from` in one hop, in table order.
pub fn transitions_from(from: TaskStatus) -> Vec<TaskStatus> {
    VALID_TRANSITIONS
        .iter()
        .filter(|(f, _)| *f == from)
        .map(|&(_, t)| t)
        .collect()
}
