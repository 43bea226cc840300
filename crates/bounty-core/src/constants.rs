//! ─── TaskBounty module constants ──────────────────────────────────────────────
//!
//! Genesis defaults for `Params`. Every value here can be replaced later by
//! the params authority; nothing in the lifecycle logic reads these directly.

// ── Bounty bounds ────────────────────────────────────────────────────────────

/// Default policy denom for bounties.
pub const DEFAULT_DENOM: &str = "stake";

/// Smallest bounty a task may carry.
pub const DEFAULT_MIN_BOUNTY: u128 = 1_000;

/// Largest bounty a task may carry.
pub const DEFAULT_MAX_BOUNTY: u128 = 1_000_000;

// ── Text limits ──────────────────────────────────────────────────────────────

pub const DEFAULT_MAX_TITLE_LENGTH: u64 = 100;
pub const DEFAULT_MAX_DESCRIPTION_LENGTH: u64 = 1_000;

// ── Proofs ───────────────────────────────────────────────────────────────────

/// Proof kinds accepted out of the box.
pub const DEFAULT_PROOF_TYPES: [&str; 3] = ["ipfs", "url", "text"];

/// Independent approvals needed before a submission qualifies for auto-approval.
pub const DEFAULT_AUTO_APPROVE_THRESHOLD: u64 = 5;

/// Prefix written into a task's proof when the creator rejects a submission.
pub const REJECTION_PREFIX: &str = "REJECTED: ";

// ── Deadlines (seconds; 0 disables the check) ────────────────────────────────

const DAY_SECS: u64 = 86_400;

/// An OPEN task can no longer be claimed this long after creation.
pub const DEFAULT_TASK_EXPIRY_SECS: u64 = 30 * DAY_SECS;

/// A claimant must submit within this window after claiming.
pub const DEFAULT_CLAIM_DEADLINE_SECS: u64 = 7 * DAY_SECS;

/// The creator must approve or reject within this window after submission.
pub const DEFAULT_SUBMISSION_DEADLINE_SECS: u64 = 14 * DAY_SECS;
