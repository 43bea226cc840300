//! End-to-end smoke test for bountyd.
//!
//! Drives the real binary against a fresh data directory through a full
//! create → claim → submit → approve cycle plus a rejection, and checks the
//! JSON it prints.
//!
//! Run with:
//!   cargo test -p bounty-node --test smoke

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const T0: i64 = 1_700_000_000;

// ── Data dir lifecycle ───────────────────────────────────────────────────────

struct DataDir(PathBuf);

impl DataDir {
    fn fresh(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("bountyd_smoke_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        DataDir(dir)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for DataDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

// ── Process helpers ──────────────────────────────────────────────────────────

fn bountyd(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bountyd"))
        .arg("--data-dir")
        .arg(dir)
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("spawn bountyd")
}

/// Run a command that must succeed and parse its stdout as JSON.
fn ok(dir: &Path, args: &[&str]) -> serde_json::Value {
    let out = bountyd(dir, args);
    assert!(
        out.status.success(),
        "bountyd {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

fn address(dir: &Path, seed: &str) -> String {
    ok(dir, &["address", seed])["address"]
        .as_str()
        .expect("address string")
        .to_string()
}

fn at(offset: i64) -> String {
    (T0 + offset).to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn approve_cycle_pays_the_claimant() {
    let data = DataDir::fresh("approve");
    let dir = data.path();
    let gov = address(dir, "governance");
    let alice = address(dir, "alice");
    let bob = address(dir, "bob");

    ok(dir, &["init", "--authority", &gov]);

    let task = ok(
        dir,
        &[
            "--from", &alice, "--now", &at(0),
            "create", "--title", "Port the parser", "--description", "Rewrite in Rust",
            "--bounty", "1000stake",
        ],
    );
    assert_eq!(task["id"], 0);
    assert_eq!(task["status"], "Open");

    let task = ok(dir, &["--from", &bob, "--now", &at(10), "claim", "0"]);
    assert_eq!(task["claimant"], bob.as_str());

    let task = ok(
        dir,
        &["--from", &bob, "--now", &at(20), "submit", "0", "--hash", "abc123", "--proof-type", "url"],
    );
    assert_eq!(task["status"], "Submitted");

    let reward = ok(dir, &["--from", &alice, "--now", &at(30), "approve", "0"]);
    assert_eq!(reward["claimant"], bob.as_str());
    assert_eq!(reward["amount"]["amount"], 1000);
    assert_eq!(reward["amount"]["denom"], "stake");
    assert_eq!(reward["tx_hash"].as_str().map(str::len), Some(64));

    let rewards = ok(dir, &["rewards", "--claimant", &bob]);
    assert_eq!(rewards.as_array().map(Vec::len), Some(1));

    let exported = ok(dir, &["export"]);
    assert_eq!(exported["task_count"], 1);
    assert_eq!(exported["task_list"][0]["status"], "Approved");
}

#[test]
fn rejection_and_guards_surface_as_failures() {
    let data = DataDir::fresh("reject");
    let dir = data.path();
    let gov = address(dir, "governance");
    let alice = address(dir, "alice");
    let bob = address(dir, "bob");

    ok(dir, &["init", "--authority", &gov]);
    ok(
        dir,
        &[
            "--from", &alice, "--now", &at(0),
            "create", "--title", "Write docs", "--description", "CLI reference",
            "--bounty", "2000stake",
        ],
    );

    let own_claim = bountyd(dir, &["--from", &alice, "--now", &at(1), "claim", "0"]);
    assert!(!own_claim.status.success());
    assert!(String::from_utf8_lossy(&own_claim.stderr).contains("creator cannot claim own task"));

    ok(dir, &["--from", &bob, "--now", &at(2), "claim", "0"]);
    ok(
        dir,
        &["--from", &bob, "--now", &at(3), "submit", "0", "--hash", "h", "--proof-type", "text"],
    );
    let rejected = ok(
        dir,
        &["--from", &alice, "--now", &at(4), "reject", "0", "--reason", "insufficient evidence"],
    );
    assert_eq!(rejected["task"]["status"], "Rejected");
    assert_eq!(rejected["proof"], "REJECTED: insufficient evidence");

    let missing = bountyd(dir, &["reward", "0"]);
    assert!(!missing.status.success());

    let reopened = ok(
        dir,
        &["--from", &alice, "--now", &at(5), "update", "0", "--status", "open", "--clear-claim"],
    );
    assert_eq!(reopened["status"], "Open");
    assert!(reopened["claimant"].is_null());

    let same_status = bountyd(
        dir,
        &["--from", &alice, "--now", &at(6), "update", "0", "--status", "open", "--title", "Docs"],
    );
    assert!(!same_status.status.success());
    assert!(String::from_utf8_lossy(&same_status.stderr).contains("invalid status transition"));
}

#[test]
fn list_refuses_unknown_status_names() {
    let data = DataDir::fresh("list");
    let dir = data.path();
    let gov = address(dir, "governance");
    let alice = address(dir, "alice");

    ok(dir, &["init", "--authority", &gov]);
    ok(
        dir,
        &[
            "--from", &alice, "--now", &at(0),
            "create", "--title", "Triage", "--description", "Label open issues",
            "--bounty", "1000stake",
        ],
    );

    let open = ok(dir, &["list", "--status", "open"]);
    assert_eq!(open.as_array().map(Vec::len), Some(1));
    let closed = ok(dir, &["list", "--status", "closed"]);
    assert_eq!(closed.as_array().map(Vec::len), Some(0));

    let bogus = bountyd(dir, &["list", "--status", "bogus"]);
    assert!(!bogus.status.success());
    assert!(String::from_utf8_lossy(&bogus.stderr).contains("unknown task status"));
}

#[test]
fn init_records_the_params_authority() {
    let data = DataDir::fresh("authority");
    let dir = data.path();
    let gov = address(dir, "governance");
    let alice = address(dir, "alice");

    let bad = bountyd(dir, &["init", "--authority", "not-an-address"]);
    assert!(!bad.status.success());

    // a refused init leaves the store initialisable
    ok(dir, &["init", "--authority", &gov]);

    let params_file = dir.join("params.json");
    let mut params = ok(dir, &["params"]);
    params["min_bounty"]["amount"] = serde_json::json!(2000);
    std::fs::write(&params_file, params.to_string()).expect("write params");
    let params_path = params_file.to_string_lossy().to_string();

    let denied = bountyd(dir, &["--from", &alice, "set-params", &params_path]);
    assert!(!denied.status.success());

    let updated = ok(dir, &["--from", &gov, "set-params", &params_path]);
    assert_eq!(updated["min_bounty"]["amount"], 2000);
}

#[test]
fn commands_require_an_initialised_store() {
    let data = DataDir::fresh("uninit");
    let out = bountyd(data.path(), &["params"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("bountyd init"));
}
