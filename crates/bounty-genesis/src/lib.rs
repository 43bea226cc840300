//! bounty-genesis
//!
//! Seeds a fresh `StateDb` from a `GenesisState` and exports the current
//! store back into one. Import writes directly into the store without going
//! through the task engine: listed tasks keep their ids, statuses and
//! timestamps, and the id counter is restored so new tasks never reuse an id.

pub mod state;

pub use state::GenesisState;

use bounty_core::error::BountyError;
use bounty_core::types::validate_address;
use bounty_state::{StagedWrites, StateDb};
use tracing::info;

/// Validate `genesis` and write it, together with the params `authority`,
/// into an empty `StateDb` in one commit.
///
/// Fails with `InvalidGenesis` if the store already holds params.
pub fn init_genesis(
    db: &StateDb,
    genesis: &GenesisState,
    authority: &str,
) -> Result<(), BountyError> {
    if db.has_params()? {
        return Err(BountyError::InvalidGenesis("state is already initialised".into()));
    }
    let authority = validate_address(authority)?;
    genesis.validate()?;

    info!(
        tasks = genesis.task_list.len(),
        task_count = genesis.task_count,
        denom = genesis.params.denom(),
        "applying task genesis"
    );

    db.commit(&StagedWrites {
        tasks: genesis.task_list.clone(),
        params: Some(genesis.params.clone()),
        task_seq: Some(genesis.task_count),
        authority: Some(authority.clone()),
        ..Default::default()
    })?;

    info!(%authority, "genesis complete");
    Ok(())
}

/// Params, every task in id order, and the id counter.
pub fn export_genesis(db: &StateDb) -> Result<GenesisState, BountyError> {
    Ok(GenesisState {
        params: db.get_params()?,
        task_list: db.all_tasks()?,
        task_count: db.peek_task_seq()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounty_core::params::Params;
    use bounty_core::task::{Task, TaskStatus};
    use bounty_core::types::{AccountId, Coin};
    use bounty_state::{EngineConfig, TaskEngine};
    use std::sync::Arc;

    fn addr(b: u8) -> String {
        AccountId::from_bytes([b; 32]).to_b58()
    }

    fn task(id: u64, status: TaskStatus) -> Task {
        let mut t = Task::new_open(
            id,
            addr(1),
            format!("task {id}"),
            "imported".into(),
            Coin::new(2_500, "stake"),
            1_000,
        );
        t.status = status;
        if status == TaskStatus::Claimed {
            t.claimant = Some(addr(2));
            t.updated_at = 1_500;
        }
        t
    }

    fn sample() -> GenesisState {
        GenesisState {
            params: Params { task_expiry: 0, ..Params::default() },
            task_list: vec![task(0, TaskStatus::Open), task(4, TaskStatus::Claimed)],
            task_count: 7,
        }
    }

    #[test]
    fn export_after_import_round_trips() {
        let dir = std::env::temp_dir()
            .join(format!("bounty_genesis_round_trip_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let db = StateDb::open(&dir).unwrap();

        init_genesis(&db, &sample(), &addr(9)).expect("genesis must succeed");
        assert_eq!(export_genesis(&db).unwrap(), sample());

        let json = export_genesis(&db).unwrap().to_json().unwrap();
        assert_eq!(GenesisState::from_json(&json).unwrap(), sample());

        drop(db);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn imported_counter_drives_new_ids() {
        let db = Arc::new(StateDb::open_temporary().unwrap());
        init_genesis(&db, &sample(), &addr(9)).unwrap();

        let engine = TaskEngine::new(db.clone(), EngineConfig { authority: addr(9) });
        let id = engine
            .create_task(&addr(3), "new", "after import", Coin::new(1_000, "stake"), 2_000)
            .unwrap();
        assert_eq!(id, 7);

        // imported tasks are served by the engine unchanged
        assert_eq!(engine.task(4).unwrap().claimant, Some(addr(2)));
        assert_eq!(export_genesis(&db).unwrap().task_count, 8);
    }

    #[test]
    fn second_init_and_invalid_genesis_are_refused() {
        let db = StateDb::open_temporary().unwrap();

        let mut bad = sample();
        bad.task_count = 4;
        assert!(matches!(
            init_genesis(&db, &bad, &addr(9)),
            Err(BountyError::InvalidGenesis(_))
        ));
        assert!(!db.has_params().unwrap());
        assert_eq!(db.get_authority().unwrap(), None);

        init_genesis(&db, &sample(), &addr(9)).unwrap();
        assert!(matches!(
            init_genesis(&db, &sample(), &addr(8)),
            Err(BountyError::InvalidGenesis(_))
        ));
        assert_eq!(db.get_authority().unwrap(), Some(addr(9)));
    }

    #[test]
    fn params_and_authority_land_together() {
        let db = StateDb::open_temporary().unwrap();

        let err = init_genesis(&db, &sample(), "not-an-address").unwrap_err();
        assert!(matches!(err, BountyError::InvalidAddress(_)));
        assert!(!db.has_params().unwrap());

        init_genesis(&db, &sample(), &addr(9)).unwrap();
        assert!(db.has_params().unwrap());
        assert_eq!(db.get_authority().unwrap(), Some(addr(9)));
    }

    #[test]
    fn exhausted_counter_refuses_new_tasks() {
        let db = Arc::new(StateDb::open_temporary().unwrap());
        let genesis = GenesisState { task_count: u64::MAX, ..sample() };
        init_genesis(&db, &genesis, &addr(9)).unwrap();

        let engine = TaskEngine::new(db.clone(), EngineConfig { authority: addr(9) });
        let err = engine
            .create_task(&addr(3), "new", "after import", Coin::new(1_000, "stake"), 2_000)
            .unwrap_err();
        assert!(matches!(err, BountyError::TaskIdsExhausted));

        // nothing written: task 0 survives and the counter is unchanged
        assert_eq!(engine.task(0).unwrap().title, "task 0");
        assert!(engine.task(u64::MAX).is_err());
        assert_eq!(db.peek_task_seq().unwrap(), u64::MAX);
    }
}
