// 🎫 SupportTicket - issue tracking per customer
// date_closed stays null while the ticket is open; the resolution-time
// insight only looks at closed tickets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportTicket {
    pub ticket_id: String,
    pub customer_id: String,
    pub issue_category: String,
    #[serde(default)]
    pub priority: Option<String>,
    pub status: String,
    #[serde(default)]
    pub support_agent: Option<String>,
    pub date_opened: String,
    #[serde(default)]
    pub date_closed: Option<String>,
    #[serde(default)]
    pub customer_rating: Option<i64>,
}

impl SupportTicket {
    pub fn is_closed(&self) -> bool {
        self.date_closed.is_some()
    }
}
