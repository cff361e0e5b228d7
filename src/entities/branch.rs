// 🏢 Branch - location and performance metrics
// Branches join to customers by city (there is no branch_id on customers).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub branch_id: String,
    pub branch_name: String,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}
