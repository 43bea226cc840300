use bounty_core::error::BountyError;
use bounty_core::params::Params;
use bounty_core::reward::TaskReward;
use bounty_core::task::Task;
use bounty_core::types::TaskId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::path::Path;
use tracing::debug;

const PARAMS_KEY: &[u8] = b"params";
const TASK_SEQ_KEY: &[u8] = b"task_seq";
const AUTHORITY_KEY: &[u8] = b"authority";

/// Persistent module state backed by sled (pure-Rust, no C dependencies).
///
/// Named trees:
///   tasks   : TaskId big-endian → bincode(Task)
///   rewards : TaskId big-endian → bincode(TaskReward)
///   params  : "params"          → bincode(Params)
///   meta    : utf8 key bytes    → raw bytes (task sequence, authority)
///
/// Big-endian keys make tree iteration ascend by task id.
pub struct StateDb {
    db: sled::Db,
    tasks: sled::Tree,
    rewards: sled::Tree,
    params: sled::Tree,
    meta: sled::Tree,
}

/// Writes produced by one operation, applied by `StateDb::commit` as a single
/// all-or-nothing transaction across every tree.
#[derive(Default, Debug)]
pub struct StagedWrites {
    pub tasks: Vec<Task>,
    pub removed_tasks: Vec<TaskId>,
    pub rewards: Vec<TaskReward>,
    pub params: Option<Params>,
    pub task_seq: Option<u64>,
    pub authority: Option<String>,
}

impl StagedWrites {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
            && self.removed_tasks.is_empty()
            && self.rewards.is_empty()
            && self.params.is_none()
            && self.task_seq.is_none()
            && self.authority.is_none()
    }
}

fn task_key(id: TaskId) -> [u8; 8] {
    id.to_be_bytes()
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, BountyError> {
    bincode::serialize(value).map_err(|e| BountyError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, BountyError> {
    bincode::deserialize(bytes).map_err(|e| BountyError::Serialization(e.to_string()))
}

impl StateDb {
    /// Open or create the state database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BountyError> {
        let db = sled::open(path).map_err(|e| BountyError::Storage(e.to_string()))?;
        Self::from_db(db)
    }

    /// In-memory database removed on drop. Used by tests and dry runs.
    pub fn open_temporary() -> Result<Self, BountyError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| BountyError::Storage(e.to_string()))?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> Result<Self, BountyError> {
        let tasks   = db.open_tree("tasks").map_err(|e| BountyError::Storage(e.to_string()))?;
        let rewards = db.open_tree("rewards").map_err(|e| BountyError::Storage(e.to_string()))?;
        let params  = db.open_tree("params").map_err(|e| BountyError::Storage(e.to_string()))?;
        let meta    = db.open_tree("meta").map_err(|e| BountyError::Storage(e.to_string()))?;
        Ok(Self { db, tasks, rewards, params, meta })
    }

    // ── Tasks ────────────────────────────────────────────────────────────────

    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, BountyError> {
        match self.tasks.get(task_key(id)).map_err(|e| BountyError::Storage(e.to_string()))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn task_exists(&self, id: TaskId) -> Result<bool, BountyError> {
        self.tasks.contains_key(task_key(id)).map_err(|e| BountyError::Storage(e.to_string()))
    }

    /// Visit every task in ascending id order until `visit` returns `false`.
    pub fn walk_tasks<F>(&self, mut visit: F) -> Result<(), BountyError>
    where
        F: FnMut(Task) -> bool,
    {
        for item in self.tasks.iter() {
            let (_, bytes) = item.map_err(|e| BountyError::Storage(e.to_string()))?;
            if !visit(decode(&bytes)?) {
                break;
            }
        }
        Ok(())
    }

    pub fn all_tasks(&self) -> Result<Vec<Task>, BountyError> {
        let mut out = Vec::new();
        self.walk_tasks(|t| {
            out.push(t);
            true
        })?;
        Ok(out)
    }

    // ── Rewards ──────────────────────────────────────────────────────────────

    pub fn get_reward(&self, task_id: TaskId) -> Result<Option<TaskReward>, BountyError> {
        match self.rewards.get(task_key(task_id)).map_err(|e| BountyError::Storage(e.to_string()))? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn reward_exists(&self, task_id: TaskId) -> Result<bool, BountyError> {
        self.rewards.contains_key(task_key(task_id)).map_err(|e| BountyError::Storage(e.to_string()))
    }

    pub fn all_rewards(&self) -> Result<Vec<TaskReward>, BountyError> {
        let mut out = Vec::new();
        for item in self.rewards.iter() {
            let (_, bytes) = item.map_err(|e| BountyError::Storage(e.to_string()))?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    // ── Params ───────────────────────────────────────────────────────────────

    /// Current params. Missing params mean the store was never initialised,
    /// which is a storage fault rather than a caller error.
    pub fn get_params(&self) -> Result<Params, BountyError> {
        match self.params.get(PARAMS_KEY).map_err(|e| BountyError::Storage(e.to_string()))? {
            Some(bytes) => decode(&bytes),
            None => Err(BountyError::Storage("params not initialised".into())),
        }
    }

    pub fn has_params(&self) -> Result<bool, BountyError> {
        self.params.contains_key(PARAMS_KEY).map_err(|e| BountyError::Storage(e.to_string()))
    }

    // ── Meta ─────────────────────────────────────────────────────────────────

    /// The id the next created task will receive.
    pub fn peek_task_seq(&self) -> Result<u64, BountyError> {
        match self.meta.get(TASK_SEQ_KEY).map_err(|e| BountyError::Storage(e.to_string()))? {
            Some(bytes) => {
                let arr = <[u8; 8]>::try_from(&bytes[..])
                    .map_err(|_| BountyError::Serialization("corrupt task sequence".into()))?;
                Ok(u64::from_be_bytes(arr))
            }
            None => Ok(0),
        }
    }

    pub fn get_authority(&self) -> Result<Option<String>, BountyError> {
        match self.meta.get(AUTHORITY_KEY).map_err(|e| BountyError::Storage(e.to_string()))? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| BountyError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    // ── Commit ───────────────────────────────────────────────────────────────

    /// Apply every staged write atomically. Either all trees change or none.
    pub fn commit(&self, staged: &StagedWrites) -> Result<(), BountyError> {
        if staged.is_empty() {
            return Ok(());
        }

        // Encode up front so the transaction body cannot fail on codec errors.
        let task_rows = staged
            .tasks
            .iter()
            .map(|t| Ok((task_key(t.id), encode(t)?)))
            .collect::<Result<Vec<_>, BountyError>>()?;
        let reward_rows = staged
            .rewards
            .iter()
            .map(|r| Ok((task_key(r.task_id), encode(r)?)))
            .collect::<Result<Vec<_>, BountyError>>()?;
        let removed: Vec<[u8; 8]> = staged.removed_tasks.iter().map(|id| task_key(*id)).collect();
        let params_row = staged.params.as_ref().map(encode).transpose()?;
        let seq_row = staged.task_seq.map(u64::to_be_bytes);

        (&self.tasks, &self.rewards, &self.params, &self.meta)
            .transaction(|(tasks, rewards, params, meta)| {
                for (key, value) in &task_rows {
                    tasks.insert(&key[..], value.as_slice())?;
                }
                for key in &removed {
                    tasks.remove(&key[..])?;
                }
                for (key, value) in &reward_rows {
                    rewards.insert(&key[..], value.as_slice())?;
                }
                if let Some(value) = &params_row {
                    params.insert(PARAMS_KEY, value.as_slice())?;
                }
                if let Some(seq) = &seq_row {
                    meta.insert(TASK_SEQ_KEY, &seq[..])?;
                }
                if let Some(authority) = &staged.authority {
                    meta.insert(AUTHORITY_KEY, authority.as_bytes())?;
                }
                Ok::<(), ConflictableTransactionError<BountyError>>(())
            })
            .map_err(|e: TransactionError<BountyError>| BountyError::Storage(e.to_string()))?;

        debug!(
            tasks = task_rows.len(),
            removed = removed.len(),
            rewards = reward_rows.len(),
            params = params_row.is_some(),
            "committed staged writes"
        );
        Ok(())
    }

    /// Flush all pending writes to disk.
    pub fn flush(&self) -> Result<(), BountyError> {
        self.db.flush().map_err(|e| BountyError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounty_core::types::{AccountId, Coin};

    fn task(id: TaskId) -> Task {
        Task::new_open(
            id,
            AccountId::from_bytes([1; 32]).to_b58(),
            format!("task {id}"),
            "description".into(),
            Coin::new(1_000, "stake"),
            100,
        )
    }

    #[test]
    fn commit_writes_every_tree() {
        let db = StateDb::open_temporary().unwrap();
        assert_eq!(db.peek_task_seq().unwrap(), 0);
        assert!(!db.has_params().unwrap());

        let staged = StagedWrites {
            tasks: vec![task(0), task(1)],
            params: Some(Params::default()),
            task_seq: Some(2),
            ..Default::default()
        };
        db.commit(&staged).unwrap();

        assert_eq!(db.get_task(1).unwrap(), Some(task(1)));
        assert_eq!(db.get_params().unwrap(), Params::default());
        assert_eq!(db.peek_task_seq().unwrap(), 2);
        assert!(db.get_reward(0).unwrap().is_none());
        assert!(!db.reward_exists(0).unwrap());
        assert!(db.has_params().unwrap());

        let reward = bounty_core::reward::create_reward(
            0,
            AccountId::from_bytes([2; 32]).to_b58(),
            Coin::new(1_000, "stake"),
            "tx",
            200,
        );
        db.commit(&StagedWrites { rewards: vec![reward.clone()], ..Default::default() }).unwrap();
        assert!(db.reward_exists(0).unwrap());
        assert_eq!(db.get_reward(0).unwrap(), Some(reward));
    }

    #[test]
    fn walk_ascends_by_id_and_stops_early() {
        let db = StateDb::open_temporary().unwrap();
        let staged = StagedWrites {
            tasks: vec![task(300), task(2), task(256)],
            ..Default::default()
        };
        db.commit(&staged).unwrap();

        let ids: Vec<_> = db.all_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![2, 256, 300]);

        let mut seen = Vec::new();
        db.walk_tasks(|t| {
            seen.push(t.id);
            false
        })
        .unwrap();
        assert_eq!(seen, vec![2]);
    }

    #[test]
    fn remove_and_missing_params() {
        let db = StateDb::open_temporary().unwrap();
        db.commit(&StagedWrites { tasks: vec![task(5)], ..Default::default() }).unwrap();
        assert!(db.task_exists(5).unwrap());
        db.commit(&StagedWrites { removed_tasks: vec![5], ..Default::default() }).unwrap();
        assert!(!db.task_exists(5).unwrap());

        assert!(matches!(db.get_params(), Err(BountyError::Storage(_))));
    }

    #[test]
    fn authority_round_trip() {
        let db = StateDb::open_temporary().unwrap();
        assert_eq!(db.get_authority().unwrap(), None);
        let gov = AccountId::from_bytes([9; 32]).to_b58();
        db.commit(&StagedWrites { authority: Some(gov.clone()), ..Default::default() }).unwrap();
        assert_eq!(db.get_authority().unwrap(), Some(gov));
    }
}
