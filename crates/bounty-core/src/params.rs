use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AUTO_APPROVE_THRESHOLD, DEFAULT_CLAIM_DEADLINE_SECS, DEFAULT_DENOM,
    DEFAULT_MAX_BOUNTY, DEFAULT_MAX_DESCRIPTION_LENGTH, DEFAULT_MAX_TITLE_LENGTH,
    DEFAULT_MIN_BOUNTY, DEFAULT_PROOF_TYPES, DEFAULT_SUBMISSION_DEADLINE_SECS,
    DEFAULT_TASK_EXPIRY_SECS,
};
use crate::error::BountyError;
use crate::types::Coin;

/// Module-wide policy values.
///
/// Set once at genesis and replaced only through the authority-gated
/// `UpdateParams` message. Every lifecycle operation reads the current value
/// from the store; nothing caches it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub min_bounty: Coin,
    pub max_bounty: Coin,
    pub max_title_length: u64,
    pub max_description_length: u64,
    /// Allowed `TaskProof::proof_type` values.
    pub proof_types: Vec<String>,
    pub auto_approve_threshold: u64,
    /// Seconds after creation an OPEN task stays claimable. 0 disables.
    pub task_expiry: u64,
    /// Seconds after claiming the claimant has to submit. 0 disables.
    pub claim_deadline: u64,
    /// Seconds after submission the creator has to review. 0 disables.
    pub submission_deadline: u64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_bounty: Coin::new(DEFAULT_MIN_BOUNTY, DEFAULT_DENOM),
            max_bounty: Coin::new(DEFAULT_MAX_BOUNTY, DEFAULT_DENOM),
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
            max_description_length: DEFAULT_MAX_DESCRIPTION_LENGTH,
            proof_types: DEFAULT_PROOF_TYPES.iter().map(|s| s.to_string()).collect(),
            auto_approve_threshold: DEFAULT_AUTO_APPROVE_THRESHOLD,
            task_expiry: DEFAULT_TASK_EXPIRY_SECS,
            claim_deadline: DEFAULT_CLAIM_DEADLINE_SECS,
            submission_deadline: DEFAULT_SUBMISSION_DEADLINE_SECS,
        }
    }
}

impl Params {
    /// The denom every bounty must be expressed in.
    pub fn denom(&self) -> &str {
        &self.min_bounty.denom
    }

    pub fn is_proof_type_allowed(&self, proof_type: &str) -> bool {
        self.proof_types.iter().any(|t| t == proof_type)
    }

    pub fn validate(&self) -> Result<(), BountyError> {
        if self.min_bounty.is_zero() {
            return Err(BountyError::InvalidParams("min bounty must be positive".into()));
        }
        if self.max_bounty.is_zero() {
            return Err(BountyError::InvalidParams("max bounty must be positive".into()));
        }
        if self.min_bounty.amount > self.max_bounty.amount {
            return Err(BountyError::InvalidParams(
                "min bounty cannot be greater than max bounty".into(),
            ));
        }
        if self.min_bounty.denom != self.max_bounty.denom {
            return Err(BountyError::InvalidParams(
                "min and max bounty must have the same denom".into(),
            ));
        }
        if !Coin::is_valid_denom(&self.min_bounty.denom) {
            return Err(BountyError::InvalidParams(format!(
                "invalid bounty denom {:?}",
                self.min_bounty.denom
            )));
        }
        if self.max_title_length == 0 {
            return Err(BountyError::InvalidParams("max title length must be positive".into()));
        }
        if self.max_description_length == 0 {
            return Err(BountyError::InvalidParams(
                "max description length must be positive".into(),
            ));
        }
        if self.proof_types.is_empty() {
            return Err(BountyError::InvalidParams(
                "at least one proof type must be specified".into(),
            ));
        }
        if self.proof_types.iter().any(|t| t.is_empty()) {
            return Err(BountyError::InvalidParams("proof types must not be empty".into()));
        }
        if self.auto_approve_threshold == 0 {
            return Err(BountyError::InvalidParams(
                "auto approve threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}
