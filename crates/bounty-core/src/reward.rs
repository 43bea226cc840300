//! bounty-core::reward
//!
//! Reward records and the pure functions around them: construction,
//! cross-validation against the originating task, score-weighted amounts,
//! weighted splitting and the auto-approval predicate.

use serde::{Deserialize, Serialize};

use crate::error::BountyError;
use crate::params::Params;
use crate::task::{Task, TaskProof, TaskStatus};
use crate::types::{Balance, Coin, TaskId, Timestamp};

/// Value paid out for an approved task. Written once by approve, never
/// modified or deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReward {
    pub task_id: TaskId,
    pub claimant: String,
    pub amount: Coin,
    pub timestamp: Timestamp,
    /// Opaque reference to the approving action.
    pub tx_hash: String,
}

pub fn create_reward(
    task_id: TaskId,
    claimant: impl Into<String>,
    bounty: Coin,
    tx_hash: impl Into<String>,
    timestamp: Timestamp,
) -> TaskReward {
    TaskReward {
        task_id,
        claimant: claimant.into(),
        amount: bounty,
        timestamp,
        tx_hash: tx_hash.into(),
    }
}

/// Check a reward against the task it pays for.
///
/// `task` is the staged post-approval record: the check runs after the status
/// is set to APPROVED in the staged copy and before anything is committed.
pub fn validate_reward_distribution(task: &Task, reward: &TaskReward) -> Result<(), BountyError> {
    if task.status != TaskStatus::Approved {
        return Err(BountyError::WrongStatus {
            expected: TaskStatus::Approved,
            actual: task.status,
        });
    }
    if reward.task_id != task.id {
        return Err(BountyError::RewardMismatch(format!(
            "reward task id {} does not match task {}",
            reward.task_id, task.id
        )));
    }
    if !task.is_claimant(&reward.claimant) {
        return Err(BountyError::RewardMismatch(format!(
            "reward claimant {} is not the task claimant",
            reward.claimant
        )));
    }
    if reward.amount != task.bounty {
        return Err(BountyError::RewardMismatch(format!(
            "reward amount {} does not equal bounty {}",
            reward.amount, task.bounty
        )));
    }
    Ok(())
}

/// Quality-weighted payout for `task`.
///
/// `performance_score` is clamped to `[0, 1]` (NaN counts as 0). The result is
/// `floor(bounty * score)`, never above the bounty. A score of at least 0.5
/// is guaranteed `min_bounty`.
pub fn calculate_reward_amount(task: &Task, params: &Params, performance_score: f64) -> Coin {
    let score = if performance_score.is_nan() {
        0.0
    } else {
        performance_score.clamp(0.0, 1.0)
    };
    let bounty = task.bounty.amount;
    let mut amount = ((bounty as f64) * score).floor() as Balance;
    amount = amount.min(bounty);
    if score >= 0.5 && amount < params.min_bounty.amount {
        amount = params.min_bounty.amount;
    }
    Coin::new(amount, task.bounty.denom.clone())
}

/// Split `reward` across `recipients` in proportion to `weights`.
///
/// Each share is `floor(amount * weight / total_weight)`. Zero shares are
/// dropped and the flooring remainder is not redistributed, so the shares may
/// sum to slightly less than `reward.amount`.
pub fn split_task_reward(
    reward: &TaskReward,
    recipients: &[String],
    weights: &[u64],
) -> Result<Vec<TaskReward>, BountyError> {
    if recipients.len() != weights.len() {
        return Err(BountyError::SplitLengthMismatch {
            recipients: recipients.len(),
            weights: weights.len(),
        });
    }
    let total: Balance = weights.iter().map(|w| *w as Balance).sum();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut shares = Vec::with_capacity(recipients.len());
    for (recipient, weight) in recipients.iter().zip(weights) {
        let share = reward
            .amount
            .amount
            .checked_mul(*weight as Balance)
            .ok_or(BountyError::SplitOverflow)?
            / total;
        if share == 0 {
            continue;
        }
        shares.push(TaskReward {
            task_id: reward.task_id,
            claimant: recipient.clone(),
            amount: Coin::new(share, reward.amount.denom.clone()),
            timestamp: reward.timestamp,
            tx_hash: reward.tx_hash.clone(),
        });
    }
    Ok(shares)
}

/// Whether a submission has gathered enough approvals to be approved without
/// the creator. Pure predicate: the caller still has to run approve.
pub fn check_auto_approval(
    task: &Task,
    params: &Params,
    proof: &TaskProof,
    approval_count: u64,
) -> bool {
    params.auto_approve_threshold > 0
        && task.status == TaskStatus::Submitted
        && proof.validate(params).is_ok()
        && approval_count >= params.auto_approve_threshold
}
