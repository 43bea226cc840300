use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskStatus};
use crate::types::Balance;

/// Conjunctive task filter. Unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFilter {
    pub creator: Option<String>,
    pub claimant: Option<String>,
    pub approver: Option<String>,
    /// `Undefined` disables the status match.
    pub status: Option<TaskStatus>,
    /// 0 disables the lower bound.
    pub min_bounty: Balance,
    /// 0 disables the upper bound.
    pub max_bounty: Balance,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(creator) = &self.creator {
            if &task.creator != creator {
                return false;
            }
        }
        if let Some(claimant) = &self.claimant {
            if !task.is_claimant(claimant) {
                return false;
            }
        }
        if let Some(approver) = &self.approver {
            if task.approver.as_ref() != Some(approver) {
                return false;
            }
        }
        match self.status {
            Some(status) if status != TaskStatus::Undefined && task.status != status => {
                return false;
            }
            _ => {}
        }
        if self.min_bounty > 0 && task.bounty.amount < self.min_bounty {
            return false;
        }
        if self.max_bounty > 0 && task.bounty.amount > self.max_bounty {
            return false;
        }
        true
    }
}

pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    tasks.iter().filter(|t| filter.matches(t)).cloned().collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[default]
    Id,
    Bounty,
    Status,
    CreatedAt,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort in place: equal keys keep their relative order in both
/// directions.
pub fn sort_tasks(tasks: &mut [Task], field: SortField, direction: SortDirection) {
    tasks.sort_by(|a, b| {
        let ord = match field {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Bounty => a.bounty.amount.cmp(&b.bounty.amount),
            SortField::Status => a.status.cmp(&b.status),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

impl SortField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "id" => Some(SortField::Id),
            "bounty" => Some(SortField::Bounty),
            "status" => Some(SortField::Status),
            "created_at" | "createdat" => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

impl SortDirection {
    pub fn from_desc(desc: bool) -> Self {
        if desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }
}
