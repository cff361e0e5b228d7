// 💳 Account - balance-carrying record, one per account_id
// The minimum balance floor lives here; the store enforces it on every
// debit before anything is written.

use serde::{Deserialize, Serialize};

/// Minimum permissible balance after any credit/debit operation.
pub const MIN_BALANCE: f64 = 1000.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub customer_id: String,
    pub account_type: String,
    pub account_balance: f64,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl Account {
    /// Would a debit of `amount` keep the balance at or above the floor?
    pub fn can_debit(&self, amount: f64) -> bool {
        self.account_balance - amount >= MIN_BALANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(balance: f64) -> Account {
        Account {
            account_id: "ACC001".into(),
            customer_id: "CUST001".into(),
            account_type: "Savings".into(),
            account_balance: balance,
            last_updated: None,
        }
    }

    #[test]
    fn test_can_debit_respects_floor() {
        let acc = account(1500.0);
        assert!(acc.can_debit(400.0)); // 1100 >= 1000
        assert!(acc.can_debit(500.0)); // exactly 1000 is allowed
        assert!(!acc.can_debit(501.0)); // 999 < 1000
        assert!(!acc.can_debit(1000.0));
    }
}
