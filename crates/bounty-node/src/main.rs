//! bountyd: command-line front-end for a local task-bounty store.
//!
//! Each invocation opens the state database, applies one message or runs one
//! query, prints the result as JSON on stdout and exits. Logs go to stderr.
//!
//! Usage:
//!   bountyd init     --authority <b58> [--genesis <file>]
//!   bountyd address  <seed>
//!   bountyd create   --from <b58> --title <t> --description <d> --bounty 1000stake
//!   bountyd claim    --from <b58> <id>
//!   bountyd submit   --from <b58> <id> --hash <h> --proof-type text [--data <d>]
//!   bountyd approve  --from <b58> <id>
//!   bountyd reject   --from <b58> <id> --reason <r>
//!   bountyd list     [--creator ..] [--status open] [--sort bounty --desc]
//!   bountyd export   [--out <file>]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use bounty_core::msg::{Msg, MsgResponse, TaskUpdate};
use bounty_core::params::Params;
use bounty_core::query::{SortDirection, SortField, TaskFilter};
use bounty_core::task::{TaskProof, TaskStatus};
use bounty_core::types::{AccountId, Balance, Coin, TaskId, Timestamp};
use bounty_genesis::{export_genesis, init_genesis, GenesisState};
use bounty_state::{EngineConfig, StateDb, TaskEngine};

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bountyd", version, about = "Task bounty lifecycle: create, claim, submit, approve")]
struct Args {
    /// Directory for the persistent state database.
    #[arg(long, global = true, default_value = "~/.bountyd/data")]
    data_dir: PathBuf,

    /// Acting principal (base-58 address).
    #[arg(long, global = true)]
    from: Option<String>,

    /// Override the current time (Unix seconds).
    #[arg(long, global = true)]
    now: Option<Timestamp>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialise a fresh database from a genesis file (or defaults).
    Init {
        /// Principal allowed to update params.
        #[arg(long)]
        authority: String,
        /// Genesis JSON. Default params and no tasks when omitted.
        #[arg(long)]
        genesis: Option<PathBuf>,
    },

    /// Derive a deterministic address from a seed string.
    Address { seed: String },

    /// Open a new task.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Bounty as amount+denom, e.g. `1000stake`.
        #[arg(long)]
        bounty: Coin,
    },

    /// Edit a task and move it to a new status. Omitted fields keep their
    /// current value.
    Update {
        id: TaskId,
        /// Target status name (open, claimed, closed, ...). Must be a legal
        /// transition from the current status.
        #[arg(long)]
        status: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        bounty: Option<Coin>,
        /// Drop the claimant and proof, e.g. when reopening a rejected task.
        #[arg(long, default_value_t = false)]
        clear_claim: bool,
    },

    /// Remove an OPEN or CLOSED task.
    Delete { id: TaskId },

    Claim { id: TaskId },

    Submit {
        id: TaskId,
        #[arg(long)]
        hash: String,
        #[arg(long)]
        proof_type: String,
        #[arg(long)]
        data: Option<String>,
    },

    Approve { id: TaskId },

    Reject {
        id: TaskId,
        #[arg(long)]
        reason: String,
    },

    /// Print one task.
    Show { id: TaskId },

    /// List tasks, optionally filtered and sorted.
    List {
        #[arg(long)]
        creator: Option<String>,
        #[arg(long)]
        claimant: Option<String>,
        #[arg(long)]
        approver: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 0)]
        min_bounty: Balance,
        #[arg(long, default_value_t = 0)]
        max_bounty: Balance,
        /// id, bounty, status or created_at.
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value_t = false)]
        desc: bool,
    },

    /// Print the reward paid for a task.
    Reward { id: TaskId },

    /// List rewards, optionally for one claimant.
    Rewards {
        #[arg(long)]
        claimant: Option<String>,
    },

    /// Print the current params.
    Params,

    /// Replace params from a JSON file. Authority only.
    SetParams { file: PathBuf },

    /// Write the current state as genesis JSON.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

// ── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,bounty=debug")),
        )
        .init();

    let args = Args::parse();
    let now = args.now.unwrap_or_else(|| chrono::Utc::now().timestamp());

    if let Command::Address { seed } = &args.command {
        return print_json(&serde_json::json!({ "address": address_from_seed(seed) }));
    }

    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let db = Arc::new(StateDb::open(&data_dir).context("opening state database")?);

    if let Command::Init { authority, genesis } = &args.command {
        return init(&db, authority, genesis.as_deref());
    }

    let authority = db
        .get_authority()?
        .ok_or_else(|| anyhow!("state is not initialised; run `bountyd init` first"))?;
    let engine = TaskEngine::new(Arc::clone(&db), EngineConfig { authority });

    let result = run(&engine, &args, now);
    db.flush().context("flushing state database")?;
    result
}

fn init(db: &StateDb, authority: &str, genesis: Option<&Path>) -> anyhow::Result<()> {
    let authority = bounty_core::types::validate_address(authority)?;
    let state = match genesis {
        Some(path) => GenesisState::load(path)
            .with_context(|| format!("loading genesis from {}", path.display()))?,
        None => GenesisState::default(),
    };
    init_genesis(db, &state, &authority).context("applying genesis")?;
    db.flush()?;
    info!(%authority, tasks = state.task_list.len(), "database initialised");
    print_json(&serde_json::json!({
        "authority": authority,
        "tasks": state.task_list.len(),
        "task_count": state.task_count,
    }))
}

fn run(engine: &TaskEngine, args: &Args, now: Timestamp) -> anyhow::Result<()> {
    match &args.command {
        Command::Init { .. } | Command::Address { .. } => Ok(()),

        Command::Create { title, description, bounty } => {
            let msg = Msg::CreateTask {
                title: title.clone(),
                description: description.clone(),
                bounty: bounty.clone(),
            };
            match send(engine, args, &msg, now)? {
                MsgResponse::Created { id } => print_json(&engine.task(id)?),
                other => bail!("unexpected response {other:?}"),
            }
        }

        Command::Update { id, title, description, bounty, status, clear_claim } => {
            let current = engine.task(*id)?;
            let status = parse_status(status)?;
            let update = TaskUpdate {
                title: title.clone().unwrap_or(current.title),
                description: description.clone().unwrap_or(current.description),
                bounty: bounty.clone().unwrap_or(current.bounty),
                status,
                claimant: if *clear_claim { None } else { current.claimant },
                proof: if *clear_claim { None } else { current.proof },
                approver: current.approver,
            };
            send(engine, args, &Msg::UpdateTask { id: *id, update }, now)?;
            print_json(&engine.task(*id)?)
        }

        Command::Delete { id } => {
            send(engine, args, &Msg::DeleteTask { id: *id }, now)?;
            print_json(&serde_json::json!({ "deleted": id }))
        }

        Command::Claim { id } => {
            send(engine, args, &Msg::ClaimTask { id: *id }, now)?;
            print_json(&engine.task(*id)?)
        }

        Command::Submit { id, hash, proof_type, data } => {
            let proof = TaskProof {
                hash: hash.clone(),
                proof_type: proof_type.clone(),
                data: data.clone(),
                timestamp: now,
            };
            send(engine, args, &Msg::SubmitTask { id: *id, proof }, now)?;
            print_json(&engine.task(*id)?)
        }

        Command::Approve { id } => {
            let approver = sender(args)?;
            let tx_hash = approval_tx_hash(*id, approver, now);
            match send(engine, args, &Msg::ApproveTask { id: *id, tx_hash }, now)? {
                MsgResponse::Approved { reward } => print_json(&reward),
                other => bail!("unexpected response {other:?}"),
            }
        }

        Command::Reject { id, reason } => {
            send(engine, args, &Msg::RejectTask { id: *id, reason: reason.clone() }, now)?;
            let task = engine.task(*id)?;
            print_json(&serde_json::json!({
                "task": task,
                "proof": task.proof.as_ref().map(ToString::to_string),
            }))
        }

        Command::Show { id } => print_json(&engine.task(*id)?),

        Command::List {
            creator,
            claimant,
            approver,
            status,
            min_bounty,
            max_bounty,
            sort,
            desc,
        } => {
            let filter = TaskFilter {
                creator: creator.clone(),
                claimant: claimant.clone(),
                approver: approver.clone(),
                status: status.as_deref().map(parse_status).transpose()?,
                min_bounty: *min_bounty,
                max_bounty: *max_bounty,
            };
            let sort = match sort {
                Some(name) => {
                    let field = SortField::from_name(name)
                        .ok_or_else(|| anyhow!("unknown sort field {name:?}"))?;
                    Some((field, SortDirection::from_desc(*desc)))
                }
                None if *desc => Some((SortField::Id, SortDirection::Descending)),
                None => None,
            };
            print_json(&engine.tasks(&filter, sort)?)
        }

        Command::Reward { id } => print_json(&engine.reward(*id)?),

        Command::Rewards { claimant } => match claimant {
            Some(c) => print_json(&engine.rewards_by_claimant(c)?),
            None => print_json(&engine.rewards()?),
        },

        Command::Params => print_json(&engine.params()?),

        Command::SetParams { file } => {
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("reading params from {}", file.display()))?;
            let params: Params = serde_json::from_str(&raw).context("parsing params JSON")?;
            send(engine, args, &Msg::UpdateParams { params }, now)?;
            print_json(&engine.params()?)
        }

        Command::Export { out } => {
            let json = export_genesis(&engine.db)?.to_json()?;
            match out {
                Some(path) => {
                    std::fs::write(path, &json)
                        .with_context(|| format!("writing genesis to {}", path.display()))?;
                    info!(path = %path.display(), "genesis exported");
                    Ok(())
                }
                None => {
                    println!("{json}");
                    Ok(())
                }
            }
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn sender(args: &Args) -> anyhow::Result<&str> {
    args.from
        .as_deref()
        .ok_or_else(|| anyhow!("--from <address> is required for this command"))
}

/// Apply `msg` as the `--from` principal, logging rejections.
fn send(engine: &TaskEngine, args: &Args, msg: &Msg, now: Timestamp) -> anyhow::Result<MsgResponse> {
    let from = sender(args)?;
    match engine.apply(from, msg, now) {
        Ok(resp) => Ok(resp),
        Err(e) => {
            warn!(msg = msg.name(), kind = ?e.kind(), error = %e, "message rejected");
            Err(e).with_context(|| format!("{} failed", msg.name()))
        }
    }
}

fn parse_status(name: &str) -> anyhow::Result<TaskStatus> {
    match TaskStatus::from_name(name) {
        TaskStatus::Undefined => bail!("unknown task status {name:?}"),
        status => Ok(status),
    }
}

/// `blake3(task_id ‖ approver ‖ now)` as hex.
fn approval_tx_hash(id: TaskId, approver: &str, now: Timestamp) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&id.to_be_bytes());
    hasher.update(approver.as_bytes());
    hasher.update(&now.to_be_bytes());
    hex::encode(hasher.finalize().as_bytes())
}

fn address_from_seed(seed: &str) -> String {
    AccountId::from_bytes(*blake3::hash(seed.as_bytes()).as_bytes()).to_b58()
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
