// BankSight - Core Library
// CRUD data access, balance simulation, seeding, insight queries and CSV
// export over a single-file SQLite store. Used by the CLI, the API server
// and the tests.

pub mod db;
pub mod entities;
pub mod error;
pub mod export;
pub mod insights;
pub mod schema;
pub mod seed;
pub mod store;

// Re-export commonly used types
pub use db::Database;
pub use entities::{
    Account, Branch, CreditCard, Customer, Direction, Loan, SupportTicket, Transaction,
    MIN_BALANCE, TXN_FAILED, TXN_SUCCESS,
};
pub use error::{StoreError, StoreResult};
pub use export::{export_table, result_set_to_csv, table_to_csv, write_csv};
pub use insights::{find as find_insight, run_insight, Insight, ResultSet, INSIGHTS};
pub use schema::{Column, ColumnKind, Row, Table};
pub use seed::{seed_database, SeedReport};
pub use store::{
    adjust_balance, create, delete, get, list, update, BalanceAdjustment, Filter,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
