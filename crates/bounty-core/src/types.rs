use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BountyError;

/// Token amount in the smallest unit of a denom.
pub type Balance = u128;

/// Unix timestamp (seconds, UTC). Always supplied by the caller (block time).
pub type Timestamp = i64;

/// Sequential task identifier, assigned at creation.
pub type TaskId = u64;

// ── AccountId ────────────────────────────────────────────────────────────────

/// Length in bytes of a canonical account identifier.
pub const ACCOUNT_ID_LEN: usize = 32;

/// 32-byte principal identifier, written as base-58 on the wire.
///
/// The ledger only ever compares principals for equality; this type exists so
/// that malformed strings are rejected before any lifecycle guard runs.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; ACCOUNT_ID_LEN]);

impl AccountId {
    pub fn from_bytes(b: [u8; ACCOUNT_ID_LEN]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; ACCOUNT_ID_LEN] {
        &self.0
    }

    /// Base-58 encoded string representation.
    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    /// Decode a base-58 string, requiring exactly 32 bytes.
    pub fn from_b58(s: &str) -> Result<Self, BountyError> {
        if s.is_empty() {
            return Err(BountyError::InvalidAddress("empty address string".into()));
        }
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| BountyError::InvalidAddress(format!("{s}: {e}")))?;
        if bytes.len() != ACCOUNT_ID_LEN {
            return Err(BountyError::InvalidAddress(format!(
                "{s}: expected {ACCOUNT_ID_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; ACCOUNT_ID_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", &self.to_b58()[..8])
    }
}

/// Resolve a principal string to its canonical form.
///
/// Returns the canonical base-58 rendering, which is what gets stored and
/// compared. A string that decodes but is not canonical (e.g. leading-zero
/// variants) is normalised here.
pub fn validate_address(addr: &str) -> Result<String, BountyError> {
    AccountId::from_b58(addr).map(|id| id.to_b58())
}

// ── Coin ─────────────────────────────────────────────────────────────────────

/// An amount of a single denom, e.g. `1000stake`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct Coin {
    pub denom: String,
    pub amount: Balance,
}

impl Coin {
    pub fn new(amount: Balance, denom: impl Into<String>) -> Self {
        Self { denom: denom.into(), amount }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// A denom must start with a letter and contain only letters, digits or `/`.
    pub fn is_valid_denom(denom: &str) -> bool {
        let mut chars = denom.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '/')
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = BountyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| BountyError::InvalidCoin(format!("{s}: missing denom")))?;
        let (amount, denom) = s.split_at(split);
        if amount.is_empty() {
            return Err(BountyError::InvalidCoin(format!("{s}: missing amount")));
        }
        if !Coin::is_valid_denom(denom) {
            return Err(BountyError::InvalidCoin(format!("{s}: invalid denom {denom:?}")));
        }
        let amount = amount
            .parse::<Balance>()
            .map_err(|e| BountyError::InvalidCoin(format!("{s}: {e}")))?;
        Ok(Coin::new(amount, denom))
    }
}
