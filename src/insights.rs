// 🧠 Analytical Insights - 15 named, versioned query templates
// Static, read-only, parameter-free SQL over the seven tables. Each
// template carries a stable key so the CLI and API can address it, and a
// version number so a changed query is visible as a contract change.

use crate::db::Database;
use crate::error::{StoreError, StoreResult};
use crate::schema::Row;
use crate::store::sql_to_json;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Insight {
    /// Stable key ("Q1".."Q15")
    pub key: &'static str,
    pub title: &'static str,
    pub version: u32,
    #[serde(skip)]
    pub sql: &'static str,
}

/// Columns in SELECT order plus the result rows.
#[derive(Debug, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

const fn insight(key: &'static str, title: &'static str, sql: &'static str) -> Insight {
    Insight {
        key,
        title,
        version: 1,
        sql,
    }
}

pub const INSIGHTS: &[Insight] = &[
    insight(
        "Q1",
        "Customers per city with average balance",
        "SELECT c.city,
                COUNT(*) AS total_customers,
                ROUND(AVG(a.account_balance), 2) AS avg_balance
         FROM customers c
         JOIN accounts a ON c.customer_id = a.customer_id
         GROUP BY c.city
         ORDER BY avg_balance DESC",
    ),
    insight(
        "Q2",
        "Account type holding the highest total balance",
        "SELECT a.account_type,
                SUM(a.account_balance) AS total_balance
         FROM accounts a
         GROUP BY a.account_type
         ORDER BY total_balance DESC",
    ),
    insight(
        "Q3",
        "Top 10 customers by account balance",
        "SELECT c.customer_id, c.name, c.city, a.account_balance
         FROM customers c
         JOIN accounts a ON c.customer_id = a.customer_id
         ORDER BY a.account_balance DESC
         LIMIT 10",
    ),
    insight(
        "Q4",
        "Customers joined in 2023 with balance above 100000",
        "SELECT c.customer_id, c.name, c.city, c.join_date, a.account_balance
         FROM customers c
         JOIN accounts a ON c.customer_id = a.customer_id
         WHERE c.join_date LIKE '2023%' AND a.account_balance > 100000",
    ),
    insight(
        "Q5",
        "Total transaction volume by type",
        "SELECT txn_type, SUM(amount) AS total_volume
         FROM transactions
         GROUP BY txn_type
         ORDER BY total_volume DESC",
    ),
    insight(
        "Q6",
        "Accounts with more than 3 failed transactions in a month",
        "SELECT account_id,
                strftime('%Y-%m', txn_time) AS month,
                COUNT(*) AS failed_count
         FROM transactions
         WHERE LOWER(status) = 'failed'
         GROUP BY account_id, month
         HAVING COUNT(*) > 3",
    ),
    insight(
        "Q7",
        "Top 5 branches by transaction volume (last 6 months)",
        "SELECT b.branch_name, SUM(t.amount) AS total_volume
         FROM transactions t
         JOIN customers c ON t.customer_id = c.customer_id
         JOIN branches b ON c.city = b.city
         WHERE DATE(t.txn_time) >= DATE('now', '-6 months')
         GROUP BY b.branch_name
         ORDER BY total_volume DESC
         LIMIT 5",
    ),
    insight(
        "Q8",
        "Accounts with at least 5 high-value transactions (above 200000)",
        "SELECT account_id, COUNT(*) AS high_value_count
         FROM transactions
         WHERE amount > 200000
         GROUP BY account_id
         HAVING COUNT(*) >= 5",
    ),
    insight(
        "Q9",
        "Average loan amount and interest rate by loan type",
        "SELECT loan_type,
                AVG(loan_amount) AS avg_amount,
                AVG(interest_rate) AS avg_rate
         FROM loans
         GROUP BY loan_type",
    ),
    insight(
        "Q10",
        "Customers holding more than one active or approved loan",
        "SELECT customer_id, COUNT(*) AS open_loans
         FROM loans
         WHERE loan_status IN ('Active', 'Approved')
         GROUP BY customer_id
         HAVING COUNT(*) > 1",
    ),
    insight(
        "Q11",
        "Top 5 customers by outstanding loan amount",
        "SELECT customer_id, SUM(loan_amount) AS total_outstanding
         FROM loans
         WHERE loan_status != 'Closed'
         GROUP BY customer_id
         ORDER BY total_outstanding DESC
         LIMIT 5",
    ),
    insight(
        "Q12",
        "Branch with the highest total account balance",
        "SELECT b.branch_name, SUM(a.account_balance) AS total_balance
         FROM accounts a
         JOIN customers c ON a.customer_id = c.customer_id
         JOIN branches b ON c.city = b.city
         GROUP BY b.branch_name
         ORDER BY total_balance DESC
         LIMIT 1",
    ),
    insight(
        "Q13",
        "Branch performance summary",
        "SELECT b.branch_name,
                COUNT(DISTINCT c.customer_id) AS total_customers,
                COUNT(DISTINCT l.loan_id) AS total_loans,
                COALESCE(SUM(t.amount), 0) AS transaction_volume
         FROM branches b
         LEFT JOIN customers c ON c.city = b.city
         LEFT JOIN loans l ON l.branch = b.branch_name
         LEFT JOIN transactions t ON t.customer_id = c.customer_id
         GROUP BY b.branch_name",
    ),
    insight(
        "Q14",
        "Issue categories with the longest average resolution time",
        "SELECT issue_category,
                AVG(julianday(date_closed) - julianday(date_opened)) AS avg_days
         FROM support_tickets
         WHERE date_closed IS NOT NULL
         GROUP BY issue_category
         ORDER BY avg_days DESC",
    ),
    insight(
        "Q15",
        "Support agents resolving the most critical tickets (rating >= 4)",
        "SELECT support_agent, COUNT(*) AS resolved_critical
         FROM support_tickets
         WHERE priority = 'Critical' AND customer_rating >= 4
         GROUP BY support_agent
         ORDER BY resolved_critical DESC",
    ),
];

/// Look up a template by key ("Q1".."Q15").
pub fn find(key: &str) -> Option<&'static Insight> {
    INSIGHTS.iter().find(|i| i.key.eq_ignore_ascii_case(key))
}

/// Execute one insight and return its column-ordered result set.
pub fn run_insight(db: &Database, key: &str) -> StoreResult<ResultSet> {
    let template = find(key).ok_or_else(|| StoreError::not_found("insights", key))?;
    run_sql(db, template.sql)
}

fn run_sql(db: &Database, sql: &str) -> StoreResult<ResultSet> {
    let mut stmt = db.conn().prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let rows = stmt
        .query_map([], |row| {
            let mut map = Row::new();
            for (i, name) in columns.iter().enumerate() {
                map.insert(name.clone(), sql_to_json(row.get_ref(i)?));
            }
            Ok(map)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ResultSet { columns, rows })
}

// ============================================================================
// TESTS
// ============================================================================
