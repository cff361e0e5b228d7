// 💳 CreditCard - limit and usage per account

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub card_id: String,
    pub account_id: String,
    #[serde(default)]
    pub card_type: Option<String>,
    pub card_limit: f64,
    pub outstanding_balance: f64,
}

impl CreditCard {
    /// Fraction of the limit currently used (0.0 when the limit is zero).
    pub fn utilization(&self) -> f64 {
        if self.card_limit <= 0.0 {
            return 0.0;
        }
        self.outstanding_balance / self.card_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilization() {
        let card = CreditCard {
            card_id: "CC001".into(),
            account_id: "ACC001".into(),
            card_type: Some("Platinum".into()),
            card_limit: 200_000.0,
            outstanding_balance: 50_000.0,
        };
        assert!((card.utilization() - 0.25).abs() < f64::EPSILON);
    }
}
