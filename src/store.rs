// ✏️ Data Access & Validation Layer
// All reads and writes against the relational store go through here. The
// one domain invariant (accounts.account_balance >= MIN_BALANCE) is
// enforced on every debit before anything is committed.

use crate::db::Database;
use crate::entities::{Account, Direction, Transaction, MIN_BALANCE, TXN_FAILED, TXN_SUCCESS};
use crate::error::{StoreError, StoreResult};
use crate::schema::{self, Row, Table};
use chrono::Utc;
use rusqlite::{params, params_from_iter, types};
use serde_json::Value;

// ============================================================================
// VALUE CONVERSION (serde_json <-> SQLite)
// ============================================================================

/// JSON value -> owned SQLite value for parameter binding.
pub(crate) fn json_to_sql(value: &Value) -> types::Value {
    match value {
        Value::Null => types::Value::Null,
        Value::Bool(b) => types::Value::Integer(*b as i64),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                types::Value::Integer(i)
            } else {
                types::Value::Real(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => types::Value::Text(s.clone()),
        other => types::Value::Text(other.to_string()),
    }
}

/// SQLite cell -> JSON value for row maps and API responses.
pub(crate) fn sql_to_json(value: types::ValueRef<'_>) -> Value {
    match value {
        types::ValueRef::Null => Value::Null,
        types::ValueRef::Integer(i) => Value::from(i),
        types::ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        types::ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        types::ValueRef::Blob(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// One predicate in a filter conjunction. Eq compares a column to a value,
/// Min/Max bound a numeric column from below/above (inclusive).
#[derive(Debug, Clone)]
pub enum Filter {
    Eq { column: String, value: Value },
    Min { column: String, value: f64 },
    Max { column: String, value: f64 },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn min(column: impl Into<String>, value: f64) -> Filter {
        Filter::Min {
            column: column.into(),
            value,
        }
    }

    pub fn max(column: impl Into<String>, value: f64) -> Filter {
        Filter::Max {
            column: column.into(),
            value,
        }
    }

    fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. } | Filter::Min { column, .. } | Filter::Max { column, .. } => {
                column
            }
        }
    }

    /// SQL fragment and bound parameter for this predicate. The column is
    /// validated against the table schema, so interpolating its name is safe.
    fn to_sql(&self, table: Table) -> StoreResult<(String, types::Value)> {
        let column = table
            .column(self.column())
            .ok_or_else(|| {
                StoreError::validation(
                    self.column(),
                    format!("unknown filter column for table '{}'", table.name()),
                )
            })?;

        match self {
            Filter::Eq { value, .. } => {
                let coerced = schema::coerce_field(column, value)?;
                Ok((format!("{} = ?", column.name), json_to_sql(&coerced)))
            }
            Filter::Min { value, .. } => {
                Ok((format!("{} >= ?", column.name), types::Value::Real(*value)))
            }
            Filter::Max { value, .. } => {
                Ok((format!("{} <= ?", column.name), types::Value::Real(*value)))
            }
        }
    }
}

// ============================================================================
// READ
// ============================================================================

/// Rows matching the conjunction of `filters`; an empty slice returns the
/// whole table in schema column order.
pub fn list(db: &Database, table: Table, filters: &[Filter]) -> StoreResult<Vec<Row>> {
    let columns = table.column_names();
    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), table.name());

    let mut clauses = Vec::new();
    let mut bindings = Vec::new();
    for filter in filters {
        let (clause, binding) = filter.to_sql(table)?;
        clauses.push(clause);
        bindings.push(binding);
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(&format!(" ORDER BY {}", table.primary_key()));

    let mut stmt = db.conn().prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(bindings), |row| {
            let mut map = Row::new();
            for (i, name) in columns.iter().enumerate() {
                map.insert(name.to_string(), sql_to_json(row.get_ref(i)?));
            }
            Ok(map)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Fetch a single row by primary key.
pub fn get(db: &Database, table: Table, id: &str) -> StoreResult<Option<Row>> {
    let rows = list(db, table, &[Filter::eq(table.primary_key(), id)])?;
    Ok(rows.into_iter().next())
}

// ============================================================================
// CREATE / UPDATE / DELETE
// ============================================================================

/// Insert a new row after full validation (required fields, known columns,
/// type coercion). A duplicate primary key is reported as a validation error.
pub fn create(db: &Database, table: Table, fields: &Row) -> StoreResult<()> {
    let clean = schema::validate_row(table, fields)?;

    let columns = table.column_names();
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name(),
        columns.join(", "),
        placeholders.join(", ")
    );

    let bindings: Vec<types::Value> = columns
        .iter()
        .map(|name| json_to_sql(clean.get(*name).unwrap_or(&Value::Null)))
        .collect();

    let result = db.conn().execute(&sql, params_from_iter(bindings));
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(StoreError::validation(
                table.primary_key(),
                "a row with this id already exists",
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Partial update by primary key. Only supplied fields change; the primary
/// key itself cannot be rewritten.
pub fn update(db: &Database, table: Table, id: &str, fields: &Row) -> StoreResult<()> {
    let clean = schema::validate_partial(table, fields)?;

    let mut assignments = Vec::new();
    let mut bindings = Vec::new();
    // Deterministic statement shape: walk columns in schema order
    for column in table.columns() {
        if let Some(value) = clean.get(column.name) {
            assignments.push(format!("{} = ?", column.name));
            bindings.push(json_to_sql(value));
        }
    }
    bindings.push(types::Value::Text(id.to_string()));

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table.name(),
        assignments.join(", "),
        table.primary_key()
    );

    let affected = db.conn().execute(&sql, params_from_iter(bindings))?;
    if affected == 0 {
        return Err(StoreError::not_found(table.name(), id));
    }
    Ok(())
}

/// Hard row removal, no cascade.
pub fn delete(db: &Database, table: Table, id: &str) -> StoreResult<()> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = ?",
        table.name(),
        table.primary_key()
    );
    let affected = db.conn().execute(&sql, params![id])?;
    if affected == 0 {
        return Err(StoreError::not_found(table.name(), id));
    }
    Ok(())
}

// ============================================================================
// BALANCE SIMULATOR
// ============================================================================

/// Outcome of a committed balance adjustment.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BalanceAdjustment {
    pub account_id: String,
    pub direction: Direction,
    pub amount: f64,
    pub previous_balance: f64,
    pub new_balance: f64,
    pub txn_id: String,
}

fn load_account(db: &Database, account_id: &str) -> StoreResult<Account> {
    let mut stmt = db.conn().prepare(
        "SELECT account_id, customer_id, account_type, account_balance, last_updated
         FROM accounts WHERE account_id = ?1",
    )?;
    let mut rows = stmt.query_map(params![account_id], |row| {
        Ok(Account {
            account_id: row.get(0)?,
            customer_id: row.get(1)?,
            account_type: row.get(2)?,
            account_balance: row.get(3)?,
            last_updated: row.get(4)?,
        })
    })?;

    match rows.next() {
        Some(account) => Ok(account?),
        None => Err(StoreError::not_found("accounts", account_id)),
    }
}

fn insert_transaction(conn: &rusqlite::Connection, txn: &Transaction) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO transactions (txn_id, account_id, customer_id, txn_type, amount, txn_time, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            txn.txn_id,
            txn.account_id,
            txn.customer_id,
            txn.txn_type,
            txn.amount,
            txn.txn_time,
            txn.status,
        ],
    )?;
    Ok(())
}

/// Credit or debit an account.
///
/// A credit always succeeds. A debit that would leave the balance below
/// MIN_BALANCE is rejected: the stored balance is untouched and exactly one
/// `failed` transaction row is appended as an audit trail. On success the
/// new balance and a `success` transaction row are committed atomically.
pub fn adjust_balance(
    db: &Database,
    account_id: &str,
    amount: f64,
    direction: Direction,
) -> StoreResult<BalanceAdjustment> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(StoreError::validation(
            "amount",
            "amount must be a positive number",
        ));
    }

    let account = load_account(db, account_id)?;
    let new_balance = direction.apply(account.account_balance, amount);

    if direction == Direction::Debit && new_balance < MIN_BALANCE {
        let failed = Transaction::record(
            account_id,
            Some(&account.customer_id),
            direction,
            amount,
            TXN_FAILED,
        );
        insert_transaction(db.conn(), &failed)?;
        return Err(StoreError::InsufficientBalance {
            balance: account.account_balance,
            requested: amount,
            floor: MIN_BALANCE,
        });
    }

    let success = Transaction::record(
        account_id,
        Some(&account.customer_id),
        direction,
        amount,
        TXN_SUCCESS,
    );

    // Balance write and transaction append commit together or not at all
    let tx = db.conn().unchecked_transaction()?;
    tx.execute(
        "UPDATE accounts SET account_balance = ?1, last_updated = ?2 WHERE account_id = ?3",
        params![new_balance, Utc::now().to_rfc3339(), account_id],
    )?;
    insert_transaction(&tx, &success)?;
    tx.commit()?;

    Ok(BalanceAdjustment {
        account_id: account_id.to_string(),
        direction,
        amount,
        previous_balance: account.account_balance,
        new_balance,
        txn_id: success.txn_id,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, Value)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// In-memory database with one customer and one account at `balance`.
    fn fixture(balance: f64) -> Database {
        let db = Database::in_memory().unwrap();
        create(
            &db,
            Table::Customers,
            &row(&[
                ("customer_id", json!("CUST001")),
                ("name", json!("Asha Verma")),
                ("city", json!("Mumbai")),
                ("age", json!(34)),
            ]),
        )
        .unwrap();
        create(
            &db,
            Table::Accounts,
            &row(&[
                ("account_id", json!("ACC001")),
                ("customer_id", json!("CUST001")),
                ("account_type", json!("Savings")),
                ("account_balance", json!(balance)),
            ]),
        )
        .unwrap();
        db
    }

    fn balance_of(db: &Database, account_id: &str) -> f64 {
        let account = load_account(db, account_id).unwrap();
        account.account_balance
    }

    fn txn_count(db: &Database) -> i64 {
        db.count(Table::Transactions).unwrap()
    }

    // ------------------------------------------------------------------
    // CRUD
    // ------------------------------------------------------------------

    #[test]
    fn test_create_then_list_round_trip() {
        let db = fixture(5000.0);
        let rows = list(
            &db,
            Table::Accounts,
            &[Filter::eq("account_id", "ACC001")],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["customer_id"], json!("CUST001"));
        assert_eq!(rows[0]["account_balance"], json!(5000.0));
    }

    #[test]
    fn test_create_missing_required_field() {
        let db = Database::in_memory().unwrap();
        let result = create(
            &db,
            Table::Accounts,
            &row(&[("account_id", json!("ACC002"))]),
        );
        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }

    #[test]
    fn test_create_non_numeric_balance() {
        let db = Database::in_memory().unwrap();
        let result = create(
            &db,
            Table::Accounts,
            &row(&[
                ("account_id", json!("ACC002")),
                ("customer_id", json!("CUST001")),
                ("account_type", json!("Savings")),
                ("account_balance", json!("not a number")),
            ]),
        );
        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }

    #[test]
    fn test_create_duplicate_id() {
        let db = fixture(5000.0);
        let result = create(
            &db,
            Table::Accounts,
            &row(&[
                ("account_id", json!("ACC001")),
                ("customer_id", json!("CUST001")),
                ("account_type", json!("Current")),
                ("account_balance", json!(2000.0)),
            ]),
        );
        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }

    #[test]
    fn test_update_partial_leaves_other_fields() {
        let db = fixture(5000.0);
        update(
            &db,
            Table::Accounts,
            "ACC001",
            &row(&[("account_type", json!("Current"))]),
        )
        .unwrap();

        let acc = get(&db, Table::Accounts, "ACC001").unwrap().unwrap();
        assert_eq!(acc["account_type"], json!("Current"));
        // Untouched fields unchanged
        assert_eq!(acc["account_balance"], json!(5000.0));
        assert_eq!(acc["customer_id"], json!("CUST001"));
    }

    #[test]
    fn test_update_missing_id() {
        let db = fixture(5000.0);
        let result = update(
            &db,
            Table::Accounts,
            "ACC404",
            &row(&[("account_type", json!("Current"))]),
        );
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_delete_then_list_empty() {
        let db = fixture(5000.0);
        delete(&db, Table::Accounts, "ACC001").unwrap();
        let rows = list(
            &db,
            Table::Accounts,
            &[Filter::eq("account_id", "ACC001")],
        )
        .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_delete_missing_id() {
        let db = fixture(5000.0);
        let result = delete(&db, Table::Accounts, "ACC404");
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    // ------------------------------------------------------------------
    // Filters
    // ------------------------------------------------------------------

    #[test]
    fn test_list_empty_filter_returns_all() {
        let db = fixture(5000.0);
        create(
            &db,
            Table::Accounts,
            &row(&[
                ("account_id", json!("ACC002")),
                ("customer_id", json!("CUST001")),
                ("account_type", json!("Current")),
                ("account_balance", json!(80_000.0)),
            ]),
        )
        .unwrap();

        assert_eq!(list(&db, Table::Accounts, &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_list_range_filters() {
        let db = fixture(5000.0);
        create(
            &db,
            Table::Accounts,
            &row(&[
                ("account_id", json!("ACC002")),
                ("customer_id", json!("CUST001")),
                ("account_type", json!("Current")),
                ("account_balance", json!(80_000.0)),
            ]),
        )
        .unwrap();

        let rows = list(
            &db,
            Table::Accounts,
            &[Filter::min("account_balance", 10_000.0)],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["account_id"], json!("ACC002"));

        let rows = list(
            &db,
            Table::Accounts,
            &[
                Filter::min("account_balance", 1000.0),
                Filter::max("account_balance", 10_000.0),
            ],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["account_id"], json!("ACC001"));
    }

    #[test]
    fn test_list_unknown_filter_column() {
        let db = fixture(5000.0);
        let result = list(&db, Table::Accounts, &[Filter::eq("shoe_size", 44)]);
        assert!(matches!(result, Err(StoreError::Validation { .. })));
    }

    // ------------------------------------------------------------------
    // Balance simulator
    // ------------------------------------------------------------------

    #[test]
    fn test_credit_always_succeeds() {
        let db = fixture(1500.0);
        let adj = adjust_balance(&db, "ACC001", 400.0, Direction::Credit).unwrap();
        assert_eq!(adj.previous_balance, 1500.0);
        assert_eq!(adj.new_balance, 1900.0);
        assert_eq!(balance_of(&db, "ACC001"), 1900.0);
        assert_eq!(txn_count(&db), 1);
    }

    #[test]
    fn test_debit_to_exact_floor_is_allowed() {
        let db = fixture(1500.0);
        adjust_balance(&db, "ACC001", 500.0, Direction::Debit).unwrap();
        assert_eq!(balance_of(&db, "ACC001"), 1000.0);
    }

    #[test]
    fn test_rejected_debit_leaves_balance_and_appends_failed_row() {
        let db = fixture(1500.0);
        let result = adjust_balance(&db, "ACC001", 1000.0, Direction::Debit);
        assert!(matches!(
            result,
            Err(StoreError::InsufficientBalance { balance, .. }) if balance == 1500.0
        ));
        assert_eq!(balance_of(&db, "ACC001"), 1500.0);

        // Audit trail policy: exactly one failed transaction row
        let failed = list(
            &db,
            Table::Transactions,
            &[Filter::eq("status", TXN_FAILED)],
        )
        .unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["account_id"], json!("ACC001"));
        assert_eq!(failed[0]["txn_type"], json!("debit"));
    }

    #[test]
    fn test_adjust_balance_scenario() {
        // Account at 1500: debit 1000 rejected, debit 400 accepted -> 1100,
        // debit 200 rejected (would yield 900 < 1000).
        let db = fixture(1500.0);

        assert!(adjust_balance(&db, "ACC001", 1000.0, Direction::Debit).is_err());
        assert_eq!(balance_of(&db, "ACC001"), 1500.0);

        let adj = adjust_balance(&db, "ACC001", 400.0, Direction::Debit).unwrap();
        assert_eq!(adj.new_balance, 1100.0);
        assert_eq!(balance_of(&db, "ACC001"), 1100.0);

        assert!(adjust_balance(&db, "ACC001", 200.0, Direction::Debit).is_err());
        assert_eq!(balance_of(&db, "ACC001"), 1100.0);

        // One success row plus two failed rows
        let success = list(
            &db,
            Table::Transactions,
            &[Filter::eq("status", TXN_SUCCESS)],
        )
        .unwrap();
        assert_eq!(success.len(), 1);
        assert_eq!(
            list(&db, Table::Transactions, &[Filter::eq("status", TXN_FAILED)])
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_floor_holds_after_any_sequence() {
        let db = fixture(2500.0);
        let moves = [
            (300.0, Direction::Debit),
            (900.0, Direction::Debit),
            (5000.0, Direction::Debit),
            (250.0, Direction::Credit),
            (600.0, Direction::Debit),
            (10_000.0, Direction::Debit),
        ];
        for (amount, direction) in moves {
            let _ = adjust_balance(&db, "ACC001", amount, direction);
            assert!(balance_of(&db, "ACC001") >= MIN_BALANCE);
        }
    }

    #[test]
    fn test_adjust_unknown_account() {
        let db = fixture(1500.0);
        let result = adjust_balance(&db, "ACC404", 100.0, Direction::Credit);
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        // No transaction rows for an unknown account
        assert_eq!(txn_count(&db), 0);
    }

    #[test]
    fn test_adjust_rejects_bad_amounts() {
        let db = fixture(1500.0);
        for bad in [0.0, -50.0, f64::NAN, f64::INFINITY] {
            let result = adjust_balance(&db, "ACC001", bad, Direction::Credit);
            assert!(matches!(result, Err(StoreError::Validation { .. })));
        }
        assert_eq!(txn_count(&db), 0);
    }

    #[test]
    fn test_success_transaction_links_customer() {
        let db = fixture(1500.0);
        adjust_balance(&db, "ACC001", 100.0, Direction::Credit).unwrap();
        let rows = list(&db, Table::Transactions, &[]).unwrap();
        assert_eq!(rows[0]["customer_id"], json!("CUST001"));
        assert_eq!(rows[0]["amount"], json!(100.0));
    }
}
