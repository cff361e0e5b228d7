// 💸 Transaction - one movement of money against an account
// New rows are appended by the balance simulator with a generated id and an
// RFC 3339 timestamp; seeded rows come straight from transactions.csv.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Status written on a committed balance adjustment.
pub const TXN_SUCCESS: &str = "success";
/// Status written on a rejected debit (audit trail policy).
pub const TXN_FAILED: &str = "failed";

// ============================================================================
// DIRECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        }
    }

    /// Parse user input ("credit"/"debit", case-insensitive).
    pub fn parse(s: &str) -> Option<Direction> {
        match s.to_lowercase().as_str() {
            "credit" | "deposit" => Some(Direction::Credit),
            "debit" | "withdraw" => Some(Direction::Debit),
            _ => None,
        }
    }

    /// Apply this direction to a balance.
    pub fn apply(&self, balance: f64, amount: f64) -> f64 {
        match self {
            Direction::Credit => balance + amount,
            Direction::Debit => balance - amount,
        }
    }
}

// ============================================================================
// TRANSACTION RECORD
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub txn_id: String,
    pub account_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub txn_type: String,
    pub amount: f64,
    pub txn_time: String,
    pub status: String,
}

impl Transaction {
    /// Build a simulator transaction with a fresh id and timestamp.
    pub fn record(
        account_id: &str,
        customer_id: Option<&str>,
        direction: Direction,
        amount: f64,
        status: &str,
    ) -> Self {
        Transaction {
            txn_id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            customer_id: customer_id.map(|s| s.to_string()),
            txn_type: direction.as_str().to_string(),
            amount,
            txn_time: Utc::now().to_rfc3339(),
            status: status.to_string(),
        }
    }
}
