use std::collections::HashSet;
use std::path::Path;

use bounty_core::error::BountyError;
use bounty_core::params::Params;
use bounty_core::task::Task;
use serde::{Deserialize, Serialize};

/// Snapshot of the task module: params, every task, and the id counter.
///
/// Loaded from JSON at `init` and produced again by `export`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    #[serde(default)]
    pub task_list: Vec<Task>,
    /// The id the next created task will receive. Every listed id is below it.
    #[serde(default)]
    pub task_count: u64,
}

impl GenesisState {
    /// Reject duplicate ids, ids at or past the counter, bad params and any
    /// task that breaks a persisted-task invariant.
    pub fn validate(&self) -> Result<(), BountyError> {
        self.params.validate()?;

        let mut seen = HashSet::with_capacity(self.task_list.len());
        for task in &self.task_list {
            if !seen.insert(task.id) {
                return Err(BountyError::InvalidGenesis(format!(
                    "duplicated id for task: {}",
                    task.id
                )));
            }
            if task.id >= self.task_count {
                return Err(BountyError::InvalidGenesis(format!(
                    "task id {} should be lower than task count {}",
                    task.id, self.task_count
                )));
            }
            task.validate(&self.params).map_err(|e| {
                BountyError::InvalidGenesis(format!("task {}: {e}", task.id))
            })?;
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, BountyError> {
        serde_json::from_str(json).map_err(|e| BountyError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, BountyError> {
        serde_json::to_string_pretty(self).map_err(|e| BountyError::Serialization(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, BountyError> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            BountyError::InvalidGenesis(format!("read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_json(&raw)
    }
}
