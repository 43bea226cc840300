use thiserror::Error;

use crate::task::{TaskStatus, ValidationError};
use crate::types::TaskId;

/// Coarse error classes exposed to callers.
///
/// Every `BountyError` maps onto exactly one kind; front-ends use this to pick
/// a response code without matching on individual variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A principal string failed identity validation.
    InvalidAddress,
    /// The referenced record does not exist.
    NotFound,
    /// The acting principal does not hold the required role.
    Unauthorized,
    /// Business-rule violation.
    InvalidRequest,
    /// Store or codec fault unrelated to caller input.
    Internal,
}

#[derive(Debug, Error)]
pub enum BountyError {
    // ── Caller input ─────────────────────────────────────────────────────────
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid coin: {0}")]
    InvalidCoin(String),

    // ── Lookup ───────────────────────────────────────────────────────────────
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("reward for task {0} not found")]
    RewardNotFound(TaskId),

    // ── Role checks ──────────────────────────────────────────────────────────
    #[error("incorrect owner: only the task creator may perform this action")]
    NotTaskCreator,

    #[error("only the task claimant may submit proof")]
    NotTaskClaimant,

    #[error("only the params authority may update params")]
    NotAuthority,

    // ── Lifecycle guards ─────────────────────────────────────────────────────
    #[error("task is not in {expected} status (current: {actual})")]
    WrongStatus { expected: TaskStatus, actual: TaskStatus },

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: TaskStatus, to: TaskStatus },

    #[error("creator cannot claim own task")]
    CreatorCannotClaim,

    #[error("task already has a claimant")]
    TaskAlreadyClaimed,

    #[error("cannot delete task in {0} status")]
    CannotDelete(TaskStatus),

    #[error("task has expired")]
    TaskExpired,

    #[error("claim deadline has passed")]
    ClaimExpired,

    #[error("submission review deadline has passed")]
    SubmissionExpired,

    #[error("invalid proof: {0}")]
    InvalidProof(String),

    #[error("rejection reason must not be empty")]
    EmptyRejectionReason,

    #[error("tasks are approved only through approve, not update")]
    ApproveViaUpdate,

    #[error("task ids exhausted")]
    TaskIdsExhausted,

    // ── Rewards ──────────────────────────────────────────────────────────────
    #[error("reward does not match task: {0}")]
    RewardMismatch(String),

    #[error("reward for task {0} already exists")]
    RewardAlreadyExists(TaskId),

    #[error("recipients and weights length mismatch: {recipients} recipients, {weights} weights")]
    SplitLengthMismatch { recipients: usize, weights: usize },

    #[error("reward split overflowed")]
    SplitOverflow,

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("invalid task: {0}")]
    InvalidTask(#[from] ValidationError),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("invalid genesis: {0}")]
    InvalidGenesis(String),

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl BountyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BountyError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            BountyError::TaskNotFound(_) | BountyError::RewardNotFound(_) => ErrorKind::NotFound,
            BountyError::NotTaskCreator
            | BountyError::NotTaskClaimant
            | BountyError::NotAuthority => ErrorKind::Unauthorized,
            BountyError::Serialization(_)
            | BountyError::Storage(_)
            | BountyError::TaskIdsExhausted => ErrorKind::Internal,
            _ => ErrorKind::InvalidRequest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(BountyError::InvalidAddress("x".into()).kind(), ErrorKind::InvalidAddress);
        assert_eq!(BountyError::TaskNotFound(3).kind(), ErrorKind::NotFound);
        assert_eq!(BountyError::NotTaskCreator.kind(), ErrorKind::Unauthorized);
        assert_eq!(BountyError::CreatorCannotClaim.kind(), ErrorKind::InvalidRequest);
        assert_eq!(
            BountyError::InvalidTask(ValidationError::EmptyTitle).kind(),
            ErrorKind::InvalidRequest
        );
        assert_eq!(BountyError::Storage("io".into()).kind(), ErrorKind::Internal);
        assert_eq!(BountyError::TaskIdsExhausted.kind(), ErrorKind::Internal);
        assert_eq!(BountyError::ApproveViaUpdate.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn messages_name_the_rule() {
        let e = BountyError::WrongStatus {
            expected: TaskStatus::Submitted,
            actual: TaskStatus::Open,
        };
        assert_eq!(e.to_string(), "task is not in submitted status (current: open)");
    }
}
