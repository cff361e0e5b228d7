// 📂 First-run seeding - flat files in data/ -> relational tables
// CSV for customers/accounts/transactions, JSON (array or NDJSON) for the
// rest. Records pass through the typed entities and then the store layer,
// so malformed seed data hits the same validation as user input.

use crate::db::Database;
use crate::entities::{Account, Branch, CreditCard, Customer, Loan, SupportTicket, Transaction};
use crate::schema::{Row, Table};
use crate::store;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// What got loaded, table by table, plus non-fatal warnings (missing files,
/// files that failed to parse).
#[derive(Debug, Default)]
pub struct SeedReport {
    pub counts: Vec<(&'static str, usize)>,
    pub warnings: Vec<String>,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

/// Serialize an entity into a store row.
fn to_row<T: Serialize>(entity: &T) -> Result<Row> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => anyhow::bail!("entity did not serialize to an object: {other}"),
    }
}

/// Read a CSV file into typed records.
fn load_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.with_context(|| format!("bad record in {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

/// Read a JSON file into typed records. Supports a standard JSON array or
/// newline-delimited JSON; bad NDJSON lines are skipped.
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let values: Vec<Value> = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(single) => vec![single],
        Err(_) => {
            // NDJSON fallback
            raw.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .filter_map(|line| serde_json::from_str(line).ok())
                .collect()
        }
    };

    let mut records = Vec::new();
    for value in values {
        let record: T = serde_json::from_value(value)
            .with_context(|| format!("bad record in {}", path.display()))?;
        records.push(record);
    }
    Ok(records)
}

fn insert_all<T: Serialize>(
    db: &Database,
    table: Table,
    records: &[T],
) -> Result<usize> {
    let mut inserted = 0;
    for record in records {
        let row = to_row(record)?;
        store::create(db, table, &row)
            .with_context(|| format!("failed to insert into {}", table.name()))?;
        inserted += 1;
    }
    Ok(inserted)
}

/// Load one seed file, tolerating absence and parse failures. `load` does
/// the reading and inserting; errors become warnings so the remaining
/// tables still seed.
fn seed_file<F>(report: &mut SeedReport, dir: &Path, file: &str, table: Table, load: F)
where
    F: FnOnce(&Path) -> Result<usize>,
{
    let path = dir.join(file);
    if !path.exists() {
        report.warnings.push(format!(
            "{file} not found in {} - table '{}' not seeded",
            dir.display(),
            table.name()
        ));
        return;
    }
    match load(&path) {
        Ok(count) => report.counts.push((table.name(), count)),
        Err(e) => report.warnings.push(format!("failed to load {file}: {e:#}")),
    }
}

/// Populate a fresh database from the flat files in `data_dir`.
///
/// Expected files: customers.csv, accounts.csv, transactions.csv,
/// branches.json, loans.json, credit_cards.json, support_tickets.json.
/// Missing files are reported and skipped.
pub fn seed_database(db: &Database, data_dir: &Path) -> Result<SeedReport> {
    anyhow::ensure!(
        data_dir.exists(),
        "data directory not found at {}",
        data_dir.display()
    );

    let mut report = SeedReport::default();

    seed_file(&mut report, data_dir, "customers.csv", Table::Customers, |p| {
        let records: Vec<Customer> = load_csv(p)?;
        insert_all(db, Table::Customers, &records)
    });
    seed_file(&mut report, data_dir, "accounts.csv", Table::Accounts, |p| {
        let records: Vec<Account> = load_csv(p)?;
        insert_all(db, Table::Accounts, &records)
    });
    seed_file(
        &mut report,
        data_dir,
        "transactions.csv",
        Table::Transactions,
        |p| {
            let records: Vec<Transaction> = load_csv(p)?;
            insert_all(db, Table::Transactions, &records)
        },
    );
    seed_file(&mut report, data_dir, "branches.json", Table::Branches, |p| {
        let records: Vec<Branch> = load_json(p)?;
        insert_all(db, Table::Branches, &records)
    });
    seed_file(&mut report, data_dir, "loans.json", Table::Loans, |p| {
        let records: Vec<Loan> = load_json(p)?;
        insert_all(db, Table::Loans, &records)
    });
    seed_file(
        &mut report,
        data_dir,
        "credit_cards.json",
        Table::CreditCards,
        |p| {
            let records: Vec<CreditCard> = load_json(p)?;
            insert_all(db, Table::CreditCards, &records)
        },
    );
    seed_file(
        &mut report,
        data_dir,
        "support_tickets.json",
        Table::SupportTickets,
        |p| {
            let records: Vec<SupportTicket> = load_json(p)?;
            insert_all(db, Table::SupportTickets, &records)
        },
    );

    Ok(report)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn sample_data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "customers.csv",
            "customer_id,name,gender,age,city,account_type,join_date\n\
             CUST001,Asha Verma,F,34,Mumbai,Savings,2023-02-11\n\
             CUST002,Rohan Iyer,M,41,Delhi,Current,2022-07-30\n",
        );
        write_file(
            dir.path(),
            "accounts.csv",
            "account_id,customer_id,account_type,account_balance,last_updated\n\
             ACC001,CUST001,Savings,125000.50,2024-01-05T10:00:00Z\n\
             ACC002,CUST002,Current,4300.00,2024-01-06T09:30:00Z\n",
        );
        write_file(
            dir.path(),
            "transactions.csv",
            "txn_id,account_id,customer_id,txn_type,amount,txn_time,status\n\
             TXN001,ACC001,CUST001,credit,5000,2024-01-10T12:00:00Z,success\n\
             TXN002,ACC002,CUST002,debit,750,2024-01-11T15:20:00Z,failed\n",
        );
        write_file(
            dir.path(),
            "branches.json",
            r#"[{"branch_id":"BR01","branch_name":"Fort","city":"Mumbai","region":"West","rating":4.2}]"#,
        );
        // NDJSON with one bad line that must be skipped
        write_file(
            dir.path(),
            "loans.json",
            "{\"loan_id\":\"LN01\",\"customer_id\":\"CUST001\",\"loan_type\":\"Home\",\"loan_amount\":2500000,\"interest_rate\":8.4,\"loan_status\":\"Active\",\"branch\":\"Fort\"}\n\
             not json at all\n\
             {\"loan_id\":\"LN02\",\"customer_id\":\"CUST002\",\"loan_type\":\"Auto\",\"loan_amount\":600000,\"interest_rate\":9.1,\"loan_status\":\"Closed\"}\n",
        );
        dir
    }

    #[test]
    fn test_seed_loads_csv_and_json() {
        let dir = sample_data_dir();
        let db = Database::in_memory().unwrap();
        let report = seed_database(&db, dir.path()).unwrap();

        assert_eq!(db.count(Table::Customers).unwrap(), 2);
        assert_eq!(db.count(Table::Accounts).unwrap(), 2);
        assert_eq!(db.count(Table::Transactions).unwrap(), 2);
        assert_eq!(db.count(Table::Branches).unwrap(), 1);
        // Bad NDJSON line skipped
        assert_eq!(db.count(Table::Loans).unwrap(), 2);
        assert_eq!(report.total(), 9);
    }

    #[test]
    fn test_seed_reports_missing_files() {
        let dir = sample_data_dir();
        let db = Database::in_memory().unwrap();
        let report = seed_database(&db, dir.path()).unwrap();

        // credit_cards.json and support_tickets.json were never written
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().any(|w| w.contains("credit_cards")));
        assert_eq!(db.count(Table::CreditCards).unwrap(), 0);
    }

    #[test]
    fn test_seed_missing_data_dir_fails() {
        let db = Database::in_memory().unwrap();
        let result = seed_database(&db, Path::new("/definitely/not/here"));
        assert!(result.is_err());
    }

    #[test]
    fn test_seeded_rows_visible_through_store() {
        let dir = sample_data_dir();
        let db = Database::in_memory().unwrap();
        seed_database(&db, dir.path()).unwrap();

        let rows = store::list(
            &db,
            Table::Customers,
            &[store::Filter::eq("city", "Mumbai")],
        )
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], serde_json::json!("Asha Verma"));
    }
}
