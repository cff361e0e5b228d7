// 🧑 Customer - demographic record, joined to accounts by customer_id

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    pub city: String,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub join_date: Option<String>,
}
