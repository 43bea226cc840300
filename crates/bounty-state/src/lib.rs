pub mod db;
pub mod engine;

pub use db::{StagedWrites, StateDb};
pub use engine::{EngineConfig, TaskEngine};
