//! bounty-core::task
//!
//! The task record, its status enum, submitted proofs, and the field-level
//! validator that every mutation must pass before it is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::constants::REJECTION_PREFIX;
use crate::error::BountyError;
use crate::params::Params;
use crate::types::{AccountId, Coin, TaskId, Timestamp};

// ── TaskStatus ───────────────────────────────────────────────────────────────

/// Lifecycle phase of a task.
///
/// `Undefined` is the zero value a record has before creation; no persisted
/// task may carry it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskStatus {
    Undefined = 0,
    Open = 1,
    Claimed = 2,
    Submitted = 3,
    Approved = 4,
    Rejected = 5,
    Closed = 6,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 7] = [
        TaskStatus::Undefined,
        TaskStatus::Open,
        TaskStatus::Claimed,
        TaskStatus::Submitted,
        TaskStatus::Approved,
        TaskStatus::Rejected,
        TaskStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Undefined => "undefined",
            TaskStatus::Open => "open",
            TaskStatus::Claimed => "claimed",
            TaskStatus::Submitted => "submitted",
            TaskStatus::Approved => "approved",
            TaskStatus::Rejected => "rejected",
            TaskStatus::Closed => "closed",
        }
    }

    /// Case-insensitive lookup; unknown names map to `Undefined`.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "open" => TaskStatus::Open,
            "claimed" => TaskStatus::Claimed,
            "submitted" => TaskStatus::Submitted,
            "approved" => TaskStatus::Approved,
            "rejected" => TaskStatus::Rejected,
            "closed" => TaskStatus::Closed,
            _ => TaskStatus::Undefined,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        Self::ALL.get(v as usize).copied()
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── TaskProof ────────────────────────────────────────────────────────────────

/// Evidence of completion supplied with a submit message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProof {
    /// Content hash of the evidence.
    pub hash: String,
    /// Must be one of `Params::proof_types`.
    pub proof_type: String,
    /// Optional inline payload (URL, short text, CID, ...).
    pub data: Option<String>,
    /// When the evidence was produced, as claimed by the submitter.
    pub timestamp: Timestamp,
}

impl TaskProof {
    pub fn validate(&self, params: &Params) -> Result<(), BountyError> {
        if self.hash.trim().is_empty() {
            return Err(BountyError::InvalidProof("proof hash is required".into()));
        }
        if !params.is_proof_type_allowed(&self.proof_type) {
            return Err(BountyError::InvalidProof(format!(
                "proof type {:?} is not allowed (allowed: {})",
                self.proof_type,
                params.proof_types.join(", ")
            )));
        }
        if self.timestamp <= 0 {
            return Err(BountyError::InvalidProof("proof timestamp must be positive".into()));
        }
        Ok(())
    }
}

/// Renders as `<hash>:<type>:<timestamp>[:<data>]`.
impl fmt::Display for TaskProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hash, self.proof_type, self.timestamp)?;
        if let Some(data) = self.data.as_deref().filter(|d| !d.is_empty()) {
            write!(f, ":{data}")?;
        }
        Ok(())
    }
}

/// What a task currently holds in its proof slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofRecord {
    /// Accepted for review by a submit.
    Submitted(TaskProof),
    /// Replaced by the creator's rejection.
    Rejected { reason: String },
}

impl ProofRecord {
    pub fn rejection(reason: impl Into<String>) -> Self {
        ProofRecord::Rejected { reason: reason.into() }
    }

    pub fn submitted(&self) -> Option<&TaskProof> {
        match self {
            ProofRecord::Submitted(p) => Some(p),
            ProofRecord::Rejected { .. } => None,
        }
    }
}

impl fmt::Display for ProofRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofRecord::Submitted(p) => write!(f, "{p}"),
            ProofRecord::Rejected { reason } => write!(f, "{REJECTION_PREFIX}{reason}"),
        }
    }
}

// ── Task ─────────────────────────────────────────────────────────────────────

/// A unit of work with a bounty attached.
///
/// Stored whole in the `tasks` tree; every operation reads, replaces and
/// re-validates the full record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub creator: String,
    pub title: String,
    pub description: String,
    pub bounty: Coin,
    pub status: TaskStatus,
    /// Set by claim; cleared only through a creator update.
    pub claimant: Option<String>,
    pub proof: Option<ProofRecord>,
    /// Set by approve.
    pub approver: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// A fresh OPEN task as produced by `CreateTask`.
    pub fn new_open(
        id: TaskId,
        creator: String,
        title: String,
        description: String,
        bounty: Coin,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            creator,
            title,
            description,
            bounty,
            status: TaskStatus::Open,
            claimant: None,
            proof: None,
            approver: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_claimant(&self, who: &str) -> bool {
        self.claimant.as_deref() == Some(who)
    }

    /// Check every persisted-task invariant, returning the first violation.
    ///
    /// Order: title, description, bounty, status, creator, timestamps,
    /// claimant, approver.
    pub fn validate(&self, params: &Params) -> Result<(), ValidationError> {
        let title_len = self.title.chars().count() as u64;
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if title_len > params.max_title_length {
            return Err(ValidationError::TitleTooLong { max: params.max_title_length, got: title_len });
        }

        let desc_len = self.description.chars().count() as u64;
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if desc_len > params.max_description_length {
            return Err(ValidationError::DescriptionTooLong {
                max: params.max_description_length,
                got: desc_len,
            });
        }

        if self.bounty.is_zero() {
            return Err(ValidationError::ZeroBounty);
        }
        if self.bounty.denom != params.denom() {
            return Err(ValidationError::WrongBountyDenom {
                expected: params.denom().to_string(),
                got: self.bounty.denom.clone(),
            });
        }
        if self.bounty.amount < params.min_bounty.amount {
            return Err(ValidationError::BountyBelowMin {
                min: params.min_bounty.amount,
                got: self.bounty.amount,
            });
        }
        if self.bounty.amount > params.max_bounty.amount {
            return Err(ValidationError::BountyAboveMax {
                max: params.max_bounty.amount,
                got: self.bounty.amount,
            });
        }

        if self.status == TaskStatus::Undefined {
            return Err(ValidationError::UndefinedStatus);
        }

        if self.creator.is_empty() {
            return Err(ValidationError::EmptyCreator);
        }
        AccountId::from_b58(&self.creator)
            .map_err(|e| ValidationError::InvalidCreator(e.to_string()))?;

        if self.created_at <= 0 {
            return Err(ValidationError::NonPositiveCreatedAt(self.created_at));
        }
        if self.updated_at < self.created_at {
            return Err(ValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }

        if let Some(claimant) = &self.claimant {
            AccountId::from_b58(claimant)
                .map_err(|e| ValidationError::InvalidClaimant(e.to_string()))?;
        }
        if let Some(approver) = &self.approver {
            AccountId::from_b58(approver)
                .map_err(|e| ValidationError::InvalidApprover(e.to_string()))?;
        }
        Ok(())
    }
}

/// A single violated task invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("title exceeds maximum length of {max} characters (got {got})")]
    TitleTooLong { max: u64, got: u64 },

    #[error("description cannot be empty")]
    EmptyDescription,

    #[error("description exceeds maximum length of {max} characters (got {got})")]
    DescriptionTooLong { max: u64, got: u64 },

    #[error("bounty must be positive")]
    ZeroBounty,

    #[error("bounty denom must be {expected} (got {got})")]
    WrongBountyDenom { expected: String, got: String },

    #[error("bounty {got} is below the minimum of {min}")]
    BountyBelowMin { min: u128, got: u128 },

    #[error("bounty {got} exceeds the maximum of {max}")]
    BountyAboveMax { max: u128, got: u128 },

    #[error("task status must be defined")]
    UndefinedStatus,

    #[error("creator cannot be empty")]
    EmptyCreator,

    #[error("invalid creator address: {0}")]
    InvalidCreator(String),

    #[error("created_at must be positive (got {0})")]
    NonPositiveCreatedAt(Timestamp),

    #[error("updated_at {updated_at} is before created_at {created_at}")]
    UpdatedBeforeCreated { created_at: Timestamp, updated_at: Timestamp },

    #[error("invalid claimant address: {0}")]
    InvalidClaimant(String),

    #[error("invalid approver address: {0}")]
    InvalidApprover(String),
}
