use serde::{Deserialize, Serialize};

use crate::params::Params;
use crate::reward::TaskReward;
use crate::task::{ProofRecord, TaskProof, TaskStatus};
use crate::types::{Coin, TaskId};

/// Replacement field values for a generic creator edit.
///
/// The whole set is applied at once; `id`, `creator` and `created_at` are
/// never taken from here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: String,
    pub description: String,
    pub bounty: Coin,
    pub status: TaskStatus,
    pub claimant: Option<String>,
    pub proof: Option<ProofRecord>,
    pub approver: Option<String>,
}

// ── Msg ──────────────────────────────────────────────────────────────────────

/// Every state-changing operation on the task module is one of these.
/// The acting principal travels alongside, not inside, the message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Msg {
    // ── Creator ──────────────────────────────────────────────────────────────

    /// Open a new task. The sender becomes the creator.
    CreateTask {
        title: String,
        description: String,
        bounty: Coin,
    },

    /// Replace a task's mutable fields. Status changes go through the
    /// transition table.
    UpdateTask {
        id: TaskId,
        update: TaskUpdate,
    },

    /// Remove an OPEN or CLOSED task.
    DeleteTask {
        id: TaskId,
    },

    // ── Lifecycle ────────────────────────────────────────────────────────────

    ClaimTask {
        id: TaskId,
    },

    SubmitTask {
        id: TaskId,
        proof: TaskProof,
    },

    /// Approve a submission and pay the bounty to the claimant.
    ApproveTask {
        id: TaskId,
        tx_hash: String,
    },

    RejectTask {
        id: TaskId,
        reason: String,
    },

    // ── Governance ───────────────────────────────────────────────────────────

    /// Replace module params. Only the configured authority may send this.
    UpdateParams {
        params: Params,
    },
}

impl Msg {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Msg::CreateTask { .. } => "create_task",
            Msg::UpdateTask { .. } => "update_task",
            Msg::DeleteTask { .. } => "delete_task",
            Msg::ClaimTask { .. } => "claim_task",
            Msg::SubmitTask { .. } => "submit_task",
            Msg::ApproveTask { .. } => "approve_task",
            Msg::RejectTask { .. } => "reject_task",
            Msg::UpdateParams { .. } => "update_params",
        }
    }
}

/// What a successfully applied message produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MsgResponse {
    Created { id: TaskId },
    Updated { id: TaskId, status: TaskStatus },
    Deleted { id: TaskId },
    Approved { reward: TaskReward },
    ParamsUpdated,
}
