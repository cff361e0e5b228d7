// 🏦 Loan - principal, rate and health indicators per customer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: String,
    pub customer_id: String,
    pub loan_type: String,
    pub loan_amount: f64,
    pub interest_rate: f64,
    pub loan_status: String,
    #[serde(default)]
    pub branch: Option<String>,
}

impl Loan {
    /// Active and approved loans count as open exposure.
    pub fn is_open(&self) -> bool {
        matches!(self.loan_status.as_str(), "Active" | "Approved")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_open() {
        let mut loan = Loan {
            loan_id: "LN001".into(),
            customer_id: "CUST001".into(),
            loan_type: "Home".into(),
            loan_amount: 2_500_000.0,
            interest_rate: 8.4,
            loan_status: "Active".into(),
            branch: None,
        };
        assert!(loan.is_open());
        loan.loan_status = "Closed".into();
        assert!(!loan.is_open());
    }
}
