use std::sync::Arc;

use bounty_core::error::BountyError;
use bounty_core::expiry::{is_claim_expired, is_expired, is_submission_expired};
use bounty_core::msg::{Msg, MsgResponse, TaskUpdate};
use bounty_core::params::Params;
use bounty_core::query::{filter_tasks, sort_tasks, SortDirection, SortField, TaskFilter};
use bounty_core::reward::{create_reward, validate_reward_distribution, TaskReward};
use bounty_core::task::{ProofRecord, Task, TaskProof, TaskStatus};
use bounty_core::transition::is_valid_transition;
use bounty_core::types::{validate_address, Coin, TaskId, Timestamp};
use tracing::{debug, info};

use crate::db::{StagedWrites, StateDb};

/// Engine-level settings that are not module params.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// The only principal allowed to replace params.
    pub authority: String,
}

// ── TaskEngine ───────────────────────────────────────────────────────────────

/// The task lifecycle engine.
///
/// Every operation reads the current task and params from the store, checks
/// the acting principal, the operation guard and the relevant deadline,
/// stages the mutated records, re-validates them and commits. A failed call
/// leaves the store untouched.
pub struct TaskEngine {
    pub db: Arc<StateDb>,
    pub config: EngineConfig,
}

impl TaskEngine {
    pub fn new(db: Arc<StateDb>, config: EngineConfig) -> Self {
        Self { db, config }
    }

    /// Dispatch one message from `sender` at time `now`.
    pub fn apply(&self, sender: &str, msg: &Msg, now: Timestamp) -> Result<MsgResponse, BountyError> {
        debug!(msg = msg.name(), sender, now, "applying message");
        match msg {
            Msg::CreateTask { title, description, bounty } => {
                let id = self.create_task(sender, title, description, bounty.clone(), now)?;
                Ok(MsgResponse::Created { id })
            }
            Msg::UpdateTask { id, update } => {
                let status = self.update_task(*id, sender, update.clone(), now)?;
                Ok(MsgResponse::Updated { id: *id, status })
            }
            Msg::DeleteTask { id } => {
                self.delete_task(*id, sender)?;
                Ok(MsgResponse::Deleted { id: *id })
            }
            Msg::ClaimTask { id } => {
                self.claim_task(*id, sender, now)?;
                Ok(MsgResponse::Updated { id: *id, status: TaskStatus::Claimed })
            }
            Msg::SubmitTask { id, proof } => {
                self.submit_task(*id, sender, proof.clone(), now)?;
                Ok(MsgResponse::Updated { id: *id, status: TaskStatus::Submitted })
            }
            Msg::ApproveTask { id, tx_hash } => {
                let reward = self.approve_task(*id, sender, tx_hash, now)?;
                Ok(MsgResponse::Approved { reward })
            }
            Msg::RejectTask { id, reason } => {
                self.reject_task(*id, sender, reason, now)?;
                Ok(MsgResponse::Updated { id: *id, status: TaskStatus::Rejected })
            }
            Msg::UpdateParams { params } => {
                self.update_params(sender, params.clone())?;
                Ok(MsgResponse::ParamsUpdated)
            }
        }
    }

    // ── Creator operations ───────────────────────────────────────────────────

    /// Open a new task owned by `creator`. Returns the assigned id.
    pub fn create_task(
        &self,
        creator: &str,
        title: &str,
        description: &str,
        bounty: Coin,
        now: Timestamp,
    ) -> Result<TaskId, BountyError> {
        let creator = validate_address(creator)?;
        let params = self.db.get_params()?;
        let id = self.db.peek_task_seq()?;

        let mut task = Task::new_open(id, creator, title.into(), description.into(), bounty, now);
        task.status = TaskStatus::Undefined;
        transition(&mut task, TaskStatus::Open)?;
        task.validate(&params)?;

        let next = id.checked_add(1).ok_or(BountyError::TaskIdsExhausted)?;
        self.db.commit(&StagedWrites {
            tasks: vec![task.clone()],
            task_seq: Some(next),
            ..Default::default()
        })?;

        info!(task_id = id, creator = %task.creator, bounty = %task.bounty, "task created");
        Ok(id)
    }

    /// Replace the mutable fields of a task. The new status must be an edge
    /// of the transition table from the current one, and APPROVED is only
    /// reachable through `approve_task`.
    pub fn update_task(
        &self,
        id: TaskId,
        creator: &str,
        update: TaskUpdate,
        now: Timestamp,
    ) -> Result<TaskStatus, BountyError> {
        let creator = validate_address(creator)?;
        let current = self.load_task(id)?;
        require_creator(&current, &creator)?;
        let params = self.db.get_params()?;

        let mut task = Task {
            id: current.id,
            creator: current.creator.clone(),
            title: update.title,
            description: update.description,
            bounty: update.bounty,
            status: current.status,
            claimant: update.claimant,
            proof: update.proof,
            approver: update.approver,
            created_at: current.created_at,
            updated_at: now,
        };
        if update.status == TaskStatus::Approved {
            return Err(BountyError::ApproveViaUpdate);
        }
        transition(&mut task, update.status)?;
        task.validate(&params)?;

        self.db.commit(&StagedWrites { tasks: vec![task.clone()], ..Default::default() })?;

        info!(task_id = id, from = %current.status, to = %task.status, "task updated");
        Ok(task.status)
    }

    /// Remove a task. Only OPEN and CLOSED tasks may be deleted.
    pub fn delete_task(&self, id: TaskId, creator: &str) -> Result<(), BountyError> {
        let creator = validate_address(creator)?;
        let task = self.load_task(id)?;
        require_creator(&task, &creator)?;
        if !matches!(task.status, TaskStatus::Open | TaskStatus::Closed) {
            return Err(BountyError::CannotDelete(task.status));
        }

        self.db.commit(&StagedWrites { removed_tasks: vec![id], ..Default::default() })?;

        info!(task_id = id, status = %task.status, "task deleted");
        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────────────────

    pub fn claim_task(&self, id: TaskId, claimant: &str, now: Timestamp) -> Result<(), BountyError> {
        let claimant = validate_address(claimant)?;
        let mut task = self.load_task(id)?;
        require_status(&task, TaskStatus::Open)?;
        if task.creator == claimant {
            return Err(BountyError::CreatorCannotClaim);
        }
        if task.claimant.is_some() {
            return Err(BountyError::TaskAlreadyClaimed);
        }
        let params = self.db.get_params()?;
        if is_expired(&task, &params, now) {
            return Err(BountyError::TaskExpired);
        }

        transition(&mut task, TaskStatus::Claimed)?;
        task.claimant = Some(claimant);
        task.updated_at = now;
        task.validate(&params)?;

        self.db.commit(&StagedWrites { tasks: vec![task.clone()], ..Default::default() })?;

        info!(task_id = id, claimant = ?task.claimant, "task claimed");
        Ok(())
    }

    pub fn submit_task(
        &self,
        id: TaskId,
        claimant: &str,
        proof: TaskProof,
        now: Timestamp,
    ) -> Result<(), BountyError> {
        let claimant = validate_address(claimant)?;
        let mut task = self.load_task(id)?;
        require_status(&task, TaskStatus::Claimed)?;
        if !task.is_claimant(&claimant) {
            return Err(BountyError::NotTaskClaimant);
        }
        let params = self.db.get_params()?;
        proof.validate(&params)?;
        if is_claim_expired(&task, &params, now) {
            return Err(BountyError::ClaimExpired);
        }

        transition(&mut task, TaskStatus::Submitted)?;
        let rendered = proof.to_string();
        task.proof = Some(ProofRecord::Submitted(proof));
        task.updated_at = now;
        task.validate(&params)?;

        self.db.commit(&StagedWrites { tasks: vec![task], ..Default::default() })?;

        info!(task_id = id, %claimant, proof = %rendered, "task submitted");
        Ok(())
    }

    /// Approve a submission. The APPROVED task and its reward are committed
    /// together or not at all.
    pub fn approve_task(
        &self,
        id: TaskId,
        approver: &str,
        tx_hash: &str,
        now: Timestamp,
    ) -> Result<TaskReward, BountyError> {
        let approver = validate_address(approver)?;
        let mut task = self.load_task(id)?;
        require_status(&task, TaskStatus::Submitted)?;
        require_creator(&task, &approver)?;
        let params = self.db.get_params()?;
        if is_submission_expired(&task, &params, now) {
            return Err(BountyError::SubmissionExpired);
        }
        if self.db.reward_exists(id)? {
            return Err(BountyError::RewardAlreadyExists(id));
        }
        let claimant = task
            .claimant
            .clone()
            .ok_or_else(|| BountyError::RewardMismatch("submitted task has no claimant".into()))?;

        transition(&mut task, TaskStatus::Approved)?;
        task.approver = Some(approver);
        task.updated_at = now;

        let reward = create_reward(id, claimant, task.bounty.clone(), tx_hash, now);
        validate_reward_distribution(&task, &reward)?;
        task.validate(&params)?;

        self.db.commit(&StagedWrites {
            tasks: vec![task],
            rewards: vec![reward.clone()],
            ..Default::default()
        })?;

        info!(task_id = id, claimant = %reward.claimant, amount = %reward.amount, "task approved");
        Ok(reward)
    }

    /// Reject a submission. The proof slot is replaced by the rejection
    /// reason; the claimant stays recorded.
    pub fn reject_task(
        &self,
        id: TaskId,
        rejecter: &str,
        reason: &str,
        now: Timestamp,
    ) -> Result<(), BountyError> {
        let rejecter = validate_address(rejecter)?;
        let mut task = self.load_task(id)?;
        require_status(&task, TaskStatus::Submitted)?;
        require_creator(&task, &rejecter)?;
        if reason.trim().is_empty() {
            return Err(BountyError::EmptyRejectionReason);
        }
        let params = self.db.get_params()?;
        if is_submission_expired(&task, &params, now) {
            return Err(BountyError::SubmissionExpired);
        }

        transition(&mut task, TaskStatus::Rejected)?;
        task.proof = Some(ProofRecord::rejection(reason));
        task.updated_at = now;
        task.validate(&params)?;

        self.db.commit(&StagedWrites { tasks: vec![task], ..Default::default() })?;

        info!(task_id = id, reason, "task rejected");
        Ok(())
    }

    // ── Governance ───────────────────────────────────────────────────────────

    pub fn update_params(&self, authority: &str, params: Params) -> Result<(), BountyError> {
        let authority = validate_address(authority)?;
        if authority != self.config.authority {
            return Err(BountyError::NotAuthority);
        }
        params.validate()?;

        self.db.commit(&StagedWrites { params: Some(params), ..Default::default() })?;

        info!(%authority, "params updated");
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn params(&self) -> Result<Params, BountyError> {
        self.db.get_params()
    }

    pub fn task(&self, id: TaskId) -> Result<Task, BountyError> {
        self.load_task(id)
    }

    /// All tasks matching `filter`, in id order unless `sort` is given.
    pub fn tasks(
        &self,
        filter: &TaskFilter,
        sort: Option<(SortField, SortDirection)>,
    ) -> Result<Vec<Task>, BountyError> {
        let mut tasks = filter_tasks(&self.db.all_tasks()?, filter);
        if let Some((field, direction)) = sort {
            sort_tasks(&mut tasks, field, direction);
        }
        Ok(tasks)
    }

    pub fn reward(&self, task_id: TaskId) -> Result<TaskReward, BountyError> {
        self.db.get_reward(task_id)?.ok_or(BountyError::RewardNotFound(task_id))
    }

    pub fn rewards(&self) -> Result<Vec<TaskReward>, BountyError> {
        self.db.all_rewards()
    }

    pub fn rewards_by_claimant(&self, claimant: &str) -> Result<Vec<TaskReward>, BountyError> {
        let claimant = validate_address(claimant)?;
        Ok(self
            .db
            .all_rewards()?
            .into_iter()
            .filter(|r| r.claimant == claimant)
            .collect())
    }

    fn load_task(&self, id: TaskId) -> Result<Task, BountyError> {
        self.db.get_task(id)?.ok_or(BountyError::TaskNotFound(id))
    }
}

// ── Guards ───────────────────────────────────────────────────────────────────

/// Move `task` to `to` if the transition table allows it.
fn transition(task: &mut Task, to: TaskStatus) -> Result<(), BountyError> {
    if !is_valid_transition(task.status, to) {
        return Err(BountyError::InvalidTransition { from: task.status, to });
    }
    task.status = to;
    Ok(())
}

fn require_status(task: &Task, expected: TaskStatus) -> Result<(), BountyError> {
    if task.status != expected {
        return Err(BountyError::WrongStatus { expected, actual: task.status });
    }
    Ok(())
}

fn require_creator(task: &Task, who: &str) -> Result<(), BountyError> {
    if task.creator != who {
        return Err(BountyError::NotTaskCreator);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounty_core::error::ErrorKind;
    use bounty_core::types::AccountId;

    const T0: Timestamp = 1_700_000_000;

    fn addr(b: u8) -> String {
        AccountId::from_bytes([b; 32]).to_b58()
    }

    fn engine() -> TaskEngine {
        let db = StateDb::open_temporary().unwrap();
        db.commit(&StagedWrites { params: Some(Params::default()), ..Default::default() })
            .unwrap();
        TaskEngine::new(Arc::new(db), EngineConfig { authority: addr(99) })
    }

    fn proof() -> TaskProof {
        TaskProof { hash: "abc123".into(), proof_type: "text".into(), data: None, timestamp: T0 }
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let e = engine();
        let a = e.create_task(&addr(1), "a", "d", Coin::new(1_000, "stake"), T0).unwrap();
        let b = e.create_task(&addr(1), "b", "d", Coin::new(1_000, "stake"), T0).unwrap();
        assert_eq!((a, b), (0, 1));

        e.delete_task(b, &addr(1)).unwrap();
        let c = e.create_task(&addr(1), "c", "d", Coin::new(1_000, "stake"), T0).unwrap();
        assert_eq!(c, 2);
    }

    #[test]
    fn exhausted_id_counter_is_an_error_not_a_wrap() {
        let e = engine();
        let first = e.create_task(&addr(1), "a", "d", Coin::new(1_000, "stake"), T0).unwrap();
        e.db.commit(&StagedWrites { task_seq: Some(u64::MAX), ..Default::default() }).unwrap();

        let err = e.create_task(&addr(1), "b", "d", Coin::new(1_000, "stake"), T0).unwrap_err();
        assert!(matches!(err, BountyError::TaskIdsExhausted));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(e.db.peek_task_seq().unwrap(), u64::MAX);
        assert_eq!(e.task(first).unwrap().title, "a");
        assert!(e.task(u64::MAX).is_err());
    }

    #[test]
    fn create_rejects_invalid_input_without_consuming_an_id() {
        let e = engine();
        let err = e.create_task("not-an-address", "t", "d", Coin::new(1_000, "stake"), T0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAddress);

        let err = e.create_task(&addr(1), "t", "d", Coin::new(999, "stake"), T0).unwrap_err();
        assert!(matches!(err, BountyError::InvalidTask(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        assert_eq!(e.db.peek_task_seq().unwrap(), 0);
    }

    #[test]
    fn apply_dispatches_messages() {
        let e = engine();
        let resp = e
            .apply(
                &addr(1),
                &Msg::CreateTask {
                    title: "t".into(),
                    description: "d".into(),
                    bounty: Coin::new(1_000, "stake"),
                },
                T0,
            )
            .unwrap();
        assert_eq!(resp, MsgResponse::Created { id: 0 });

        let resp = e.apply(&addr(2), &Msg::ClaimTask { id: 0 }, T0 + 1).unwrap();
        assert_eq!(resp, MsgResponse::Updated { id: 0, status: TaskStatus::Claimed });

        e.apply(&addr(2), &Msg::SubmitTask { id: 0, proof: proof() }, T0 + 2).unwrap();
        let resp = e
            .apply(&addr(1), &Msg::ApproveTask { id: 0, tx_hash: "h".into() }, T0 + 3)
            .unwrap();
        match resp {
            MsgResponse::Approved { reward } => assert_eq!(reward.claimant, addr(2)),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn guards_check_status_before_role() {
        let e = engine();
        let id = e.create_task(&addr(1), "t", "d", Coin::new(1_000, "stake"), T0).unwrap();
        let err = e.approve_task(id, &addr(3), "h", T0).unwrap_err();
        assert!(matches!(
            err,
            BountyError::WrongStatus { expected: TaskStatus::Submitted, actual: TaskStatus::Open }
        ));
    }

    #[test]
    fn claim_twice_is_refused() {
        let e = engine();
        let id = e.create_task(&addr(1), "t", "d", Coin::new(1_000, "stake"), T0).unwrap();
        e.claim_task(id, &addr(2), T0).unwrap();
        let err = e.claim_task(id, &addr(3), T0).unwrap_err();
        assert!(matches!(err, BountyError::WrongStatus { .. }));
        assert_eq!(e.task(id).unwrap().claimant, Some(addr(2)));
    }

    #[test]
    fn missing_records_are_not_found() {
        let e = engine();
        assert_eq!(e.task(7).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(e.reward(7).unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(e.claim_task(7, &addr(2), T0).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn rewards_by_claimant_filters() {
        let e = engine();
        for claimant in [2u8, 3, 2] {
            let id = e.create_task(&addr(1), "t", "d", Coin::new(1_000, "stake"), T0).unwrap();
            e.claim_task(id, &addr(claimant), T0).unwrap();
            e.submit_task(id, &addr(claimant), proof(), T0).unwrap();
            e.approve_task(id, &addr(1), "h", T0).unwrap();
        }
        assert_eq!(e.rewards().unwrap().len(), 3);
        let mine: Vec<_> = e.rewards_by_claimant(&addr(2)).unwrap().iter().map(|r| r.task_id).collect();
        assert_eq!(mine, vec![0, 2]);
    }
}
