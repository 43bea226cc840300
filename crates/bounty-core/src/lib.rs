pub mod constants;
pub mod error;
pub mod expiry;
pub mod msg;
pub mod params;
pub mod query;
pub mod reward;
pub mod task;
pub mod transition;
pub mod types;

pub use error::{BountyError, ErrorKind};
pub use msg::{Msg, MsgResponse, TaskUpdate};
pub use params::Params;
pub use reward::TaskReward;
pub use task::{ProofRecord, Task, TaskProof, TaskStatus, ValidationError};
pub use types::*;
