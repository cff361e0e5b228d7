// 🗄️ Database handle - explicit open/close lifecycle over SQLite
// The connection is never an ambient singleton: callers open a Database and
// pass it to the store/seed/insight functions.

use crate::error::StoreResult;
use crate::schema::Table;
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

/// Owned handle to the single-file relational store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Database> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// In-memory database, used by tests and throwaway sessions.
    pub fn in_memory() -> Result<Database> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Borrow the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Explicitly close the handle, surfacing any flush error.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("failed to close database")
    }

    /// Create the seven tables and their indexes if they do not exist.
    pub fn init_schema(&self) -> Result<()> {
        // WAL mode for crash recovery (no-op for in-memory databases)
        let _ = self.conn.pragma_update(None, "journal_mode", "WAL");

        for table in Table::all() {
            let columns: Vec<String> = table
                .columns()
                .iter()
                .map(|c| {
                    if c.name == table.primary_key() {
                        format!("{} {} PRIMARY KEY", c.name, c.kind.sql_type())
                    } else {
                        format!("{} {}", c.name, c.kind.sql_type())
                    }
                })
                .collect();

            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                table.name(),
                columns.join(", ")
            );
            self.conn
                .execute(&ddl, [])
                .with_context(|| format!("failed to create table {}", table.name()))?;
        }

        // Lookup indexes for the joins the insight queries lean on
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_accounts_customer ON accounts(customer_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_txn_account ON transactions(account_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_txn_customer ON transactions(customer_id)",
            [],
        )?;
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_loans_customer ON loans(customer_id)",
            [],
        )?;

        Ok(())
    }

    /// Row count for one table.
    pub fn count(&self, table: Table) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }

    /// True when no table has any rows yet (fresh database, needs seeding).
    pub fn is_empty(&self) -> StoreResult<bool> {
        for table in Table::all() {
            if self.count(table)? > 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Names of the tables present in the database file.
    pub fn table_names(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}
