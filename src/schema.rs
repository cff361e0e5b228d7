// 📐 Shape Layer - Table registry and field validation
// Seven tables, fixed schemas. Every row that enters the store goes through
// validate_row / coerce_field here first.

use crate::error::{StoreError, StoreResult};
use serde_json::Value;
use std::collections::HashMap;

/// A row as it travels through the store layer: column name -> JSON value.
pub type Row = HashMap<String, Value>;

// ============================================================================
// COLUMN METADATA
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
}

impl ColumnKind {
    /// SQLite column type for CREATE TABLE
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
}

const fn col(name: &'static str, kind: ColumnKind, required: bool) -> Column {
    Column {
        name,
        kind,
        required,
    }
}

// ============================================================================
// TABLE REGISTRY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Customers,
    Accounts,
    Transactions,
    Loans,
    Branches,
    CreditCards,
    SupportTickets,
}

use ColumnKind::{Integer, Real, Text};

const CUSTOMER_COLUMNS: &[Column] = &[
    col("customer_id", Text, true),
    col("name", Text, true),
    col("gender", Text, false),
    col("age", Integer, false),
    col("city", Text, true),
    col("account_type", Text, false),
    col("join_date", Text, false),
];

const ACCOUNT_COLUMNS: &[Column] = &[
    col("account_id", Text, true),
    col("customer_id", Text, true),
    col("account_type", Text, true),
    col("account_balance", Real, true),
    col("last_updated", Text, false),
];

const TRANSACTION_COLUMNS: &[Column] = &[
    col("txn_id", Text, true),
    col("account_id", Text, true),
    col("customer_id", Text, false),
    col("txn_type", Text, true),
    col("amount", Real, true),
    col("txn_time", Text, true),
    col("status", Text, true),
];

const LOAN_COLUMNS: &[Column] = &[
    col("loan_id", Text, true),
    col("customer_id", Text, true),
    col("loan_type", Text, true),
    col("loan_amount", Real, true),
    col("interest_rate", Real, true),
    col("loan_status", Text, true),
    col("branch", Text, false),
];

const BRANCH_COLUMNS: &[Column] = &[
    col("branch_id", Text, true),
    col("branch_name", Text, true),
    col("city", Text, true),
    col("region", Text, false),
    col("rating", Real, false),
];

const CREDIT_CARD_COLUMNS: &[Column] = &[
    col("card_id", Text, true),
    col("account_id", Text, true),
    col("card_type", Text, false),
    col("card_limit", Real, true),
    col("outstanding_balance", Real, true),
];

const SUPPORT_TICKET_COLUMNS: &[Column] = &[
    col("ticket_id", Text, true),
    col("customer_id", Text, true),
    col("issue_category", Text, true),
    col("priority", Text, false),
    col("status", Text, true),
    col("support_agent", Text, false),
    col("date_opened", Text, true),
    col("date_closed", Text, false),
    col("customer_rating", Integer, false),
];

impl Table {
    /// All tables, in seed order
    pub fn all() -> [Table; 7] {
        [
            Table::Customers,
            Table::Accounts,
            Table::Transactions,
            Table::Loans,
            Table::Branches,
            Table::CreditCards,
            Table::SupportTickets,
        ]
    }

    /// SQL table name
    pub fn name(&self) -> &'static str {
        match self {
            Table::Customers => "customers",
            Table::Accounts => "accounts",
            Table::Transactions => "transactions",
            Table::Loans => "loans",
            Table::Branches => "branches",
            Table::CreditCards => "credit_cards",
            Table::SupportTickets => "support_tickets",
        }
    }

    /// Primary key column
    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::Customers => "customer_id",
            Table::Accounts => "account_id",
            Table::Transactions => "txn_id",
            Table::Loans => "loan_id",
            Table::Branches => "branch_id",
            Table::CreditCards => "card_id",
            Table::SupportTickets => "ticket_id",
        }
    }

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Table::Customers => CUSTOMER_COLUMNS,
            Table::Accounts => ACCOUNT_COLUMNS,
            Table::Transactions => TRANSACTION_COLUMNS,
            Table::Loans => LOAN_COLUMNS,
            Table::Branches => BRANCH_COLUMNS,
            Table::CreditCards => CREDIT_CARD_COLUMNS,
            Table::SupportTickets => SUPPORT_TICKET_COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Column names in schema order (used for exports and SELECTs)
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns().iter().map(|c| c.name).collect()
    }

    /// Parse a table name as it appears in CLI args and URLs
    pub fn parse(name: &str) -> StoreResult<Table> {
        Table::all()
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }
}

// ============================================================================
// FIELD VALIDATION & COERCION
// ============================================================================

/// Coerce a JSON value to the column's kind.
///
/// Form and query-string input arrives as strings, so numeric columns accept
/// numeric strings ("1500.50") as well as JSON numbers. Anything else is a
/// ValidationError.
pub fn coerce_field(column: &Column, value: &Value) -> StoreResult<Value> {
    if value.is_null() {
        if column.required {
            return Err(StoreError::validation(
                column.name,
                "required field is null",
            ));
        }
        return Ok(Value::Null);
    }

    match column.kind {
        ColumnKind::Text => match value {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            other => Err(StoreError::validation(
                column.name,
                format!("expected text, got {other}"),
            )),
        },
        ColumnKind::Integer => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            Value::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| {
                StoreError::validation(column.name, format!("expected an integer, got '{s}'"))
            }),
            other => Err(StoreError::validation(
                column.name,
                format!("expected an integer, got {other}"),
            )),
        },
        ColumnKind::Real => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(|f| serde_json::json!(f))
                .map_err(|_| {
                    StoreError::validation(column.name, format!("expected a number, got '{s}'"))
                }),
            other => Err(StoreError::validation(
                column.name,
                format!("expected a number, got {other}"),
            )),
        },
    }
}

/// Validate a full row for insertion: unknown columns rejected, required
/// columns present, every value coerced to its column kind.
pub fn validate_row(table: Table, fields: &Row) -> StoreResult<Row> {
    for key in fields.keys() {
        if table.column(key).is_none() {
            return Err(StoreError::validation(
                key.clone(),
                format!("unknown column for table '{}'", table.name()),
            ));
        }
    }

    let mut clean = Row::new();
    for column in table.columns() {
        match fields.get(column.name) {
            Some(value) => {
                clean.insert(column.name.to_string(), coerce_field(column, value)?);
            }
            None if column.required => {
                return Err(StoreError::validation(column.name, "required field missing"));
            }
            None => {
                clean.insert(column.name.to_string(), Value::Null);
            }
        }
    }
    Ok(clean)
}

/// Validate a partial update: only the supplied fields are checked, the
/// primary key cannot be rewritten.
pub fn validate_partial(table: Table, fields: &Row) -> StoreResult<Row> {
    if fields.is_empty() {
        return Err(StoreError::validation("fields", "no fields to update"));
    }

    let mut clean = Row::new();
    for (key, value) in fields {
        if key == table.primary_key() {
            return Err(StoreError::validation(
                key.clone(),
                "primary key cannot be updated",
            ));
        }
        let column = table.column(key).ok_or_else(|| {
            StoreError::validation(key.clone(), format!("unknown column for table '{}'", table.name()))
        })?;
        clean.insert(key.clone(), coerce_field(column, value)?);
    }
    Ok(clean)
}

// ============================================================================
// TESTS
// ============================================================================
