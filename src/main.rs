// BankSight CLI - init/browse/insight/export/adjust against the local store

use anyhow::{bail, Context, Result};
use banksight::{
    adjust_balance, export_table, insights, run_insight, seed_database, store, Database,
    Direction, Row, Table,
};
use std::env;
use std::path::{Path, PathBuf};

const DEFAULT_DB: &str = "banksight.db";
const DEFAULT_DATA_DIR: &str = "data";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("init") => run_init(
            args.get(1).map(PathBuf::from).unwrap_or_else(|| DEFAULT_DATA_DIR.into()),
            args.get(2).map(PathBuf::from).unwrap_or_else(|| DEFAULT_DB.into()),
        ),
        Some("tables") => run_tables(db_arg(&args, 1)),
        Some("show") => match args.get(1) {
            Some(table) => run_show(table, db_arg(&args, 2)),
            None => bail!("usage: banksight show <table> [db]"),
        },
        Some("insight") => match args.get(1) {
            Some(key) => run_insight_cmd(key, db_arg(&args, 2)),
            None => bail!("usage: banksight insight <Q1..Q15> [db]"),
        },
        Some("export") => match (args.get(1), args.get(2)) {
            (Some(table), Some(out)) => run_export(table, Path::new(out), db_arg(&args, 3)),
            _ => bail!("usage: banksight export <table> <out.csv> [db]"),
        },
        Some("adjust") => match (args.get(1), args.get(2), args.get(3)) {
            (Some(account), Some(amount), Some(direction)) => {
                run_adjust(account, amount, direction, db_arg(&args, 4))
            }
            _ => bail!("usage: banksight adjust <account_id> <amount> <credit|debit> [db]"),
        },
        _ => {
            print_usage();
            Ok(())
        }
    }
}

fn db_arg(args: &[String], index: usize) -> PathBuf {
    args.get(index)
        .map(PathBuf::from)
        .unwrap_or_else(|| DEFAULT_DB.into())
}

fn print_usage() {
    println!("🏦 BankSight - transaction intelligence over SQLite");
    println!();
    println!("Usage:");
    println!("  banksight init [data_dir] [db]                    create and seed the database");
    println!("  banksight tables [db]                             list tables with row counts");
    println!("  banksight show <table> [db]                       print a table");
    println!("  banksight insight <Q1..Q15> [db]                  run one analytical insight");
    println!("  banksight export <table> <out.csv> [db]           export a table to CSV");
    println!("  banksight adjust <account> <amount> <credit|debit> [db]");
    println!();
    println!("Insights:");
    for template in insights::INSIGHTS {
        println!("  {:>4}  {}", template.key, template.title);
    }
}

fn run_init(data_dir: PathBuf, db_path: PathBuf) -> Result<()> {
    println!("🗄️  Initializing database at {}", db_path.display());

    let existed = db_path.exists();
    let db = Database::open(&db_path)?;

    if existed && !db.is_empty()? {
        println!("✓ Database already seeded - nothing to do");
        return Ok(());
    }

    println!("📂 Seeding from {}...", data_dir.display());
    let report = seed_database(&db, &data_dir)?;

    for (table, count) in &report.counts {
        println!("✓ {table}: {count} rows");
    }
    for warning in &report.warnings {
        eprintln!("⚠️  {warning}");
    }
    println!("🎉 Seed complete: {} rows total", report.total());

    db.close()?;
    Ok(())
}

fn run_tables(db_path: PathBuf) -> Result<()> {
    let db = open_existing(&db_path)?;
    println!("📊 Tables in {}", db_path.display());
    for table in Table::all() {
        println!("  {:<16} {} rows", table.name(), db.count(table)?);
    }
    Ok(())
}

fn run_show(table_name: &str, db_path: PathBuf) -> Result<()> {
    let db = open_existing(&db_path)?;
    let table = Table::parse(table_name)?;
    let rows = store::list(&db, table, &[])?;

    let columns: Vec<String> = table.column_names().iter().map(|c| c.to_string()).collect();
    print_rows(&columns, &rows);
    println!("({} rows)", rows.len());
    Ok(())
}

fn run_insight_cmd(key: &str, db_path: PathBuf) -> Result<()> {
    let db = open_existing(&db_path)?;
    let template = insights::find(key)
        .with_context(|| format!("no insight with key '{key}' (expected Q1..Q15)"))?;

    println!("🧠 {} (v{}): {}", template.key, template.version, template.title);
    let result = run_insight(&db, key)?;
    print_rows(&result.columns, &result.rows);
    println!("({} rows)", result.rows.len());
    Ok(())
}

fn run_export(table_name: &str, out: &Path, db_path: PathBuf) -> Result<()> {
    let db = open_existing(&db_path)?;
    let table = Table::parse(table_name)?;
    let count = export_table(&db, table, out)?;
    println!("⬇️  Exported {} rows from {} to {}", count, table.name(), out.display());
    Ok(())
}

fn run_adjust(account: &str, amount: &str, direction: &str, db_path: PathBuf) -> Result<()> {
    let db = open_existing(&db_path)?;
    let amount: f64 = amount
        .parse()
        .with_context(|| format!("amount must be a number, got '{amount}'"))?;
    let direction = Direction::parse(direction)
        .with_context(|| format!("direction must be credit or debit, got '{direction}'"))?;

    match adjust_balance(&db, account, amount, direction) {
        Ok(adj) => {
            println!(
                "✅ {} {:.2} on {}: balance {:.2} -> {:.2} (txn {})",
                adj.direction.as_str(),
                adj.amount,
                adj.account_id,
                adj.previous_balance,
                adj.new_balance,
                adj.txn_id
            );
        }
        Err(e) => {
            // Rejections are user-visible messages, not process failures
            eprintln!("❌ {e}");
        }
    }
    Ok(())
}

fn open_existing(db_path: &Path) -> Result<Database> {
    if !db_path.exists() {
        bail!(
            "database not found at {} - run: banksight init",
            db_path.display()
        );
    }
    Database::open(db_path)
}

fn print_rows(columns: &[String], rows: &[Row]) {
    println!("{}", columns.join(" | "));
    for row in rows {
        let line: Vec<String> = columns
            .iter()
            .map(|c| match row.get(c) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        println!("{}", line.join(" | "));
    }
}
