//! # acbill
//!
//! Command-line front end for the billing core.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         acbill Startup                                  │
//! │                                                                         │
//! │  1. Initialize tracing (logging) on stderr                              │
//! │  2. Parse arguments                                                     │
//! │  3. Load AppConfig from the environment                                 │
//! │  4. Open the database and apply migrations (not for `words`)            │
//! │  5. Run the command, print the result on stdout                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Environment Variables
//! - `ACBILL_DATABASE_PATH`: SQLite file (default: ./acbill.db)
//! - `COMPANY_*`, `BANK_*`, `PAYMENT_TERMS`: invoice header and footer
//! - `RUST_LOG`: log filter (default: info,acbill=debug,sqlx=warn)

mod args;
mod config;

use acbill_core::validation::{parse_decimal, validate_uuid};
use acbill_core::{decimal_in_words, Bill, BillDraft, BillUpdate};
use acbill_db::Database;
use anyhow::{anyhow, Context};
use args::{Cli, Command};
use chrono::{Local, NaiveDate};
use clap::Parser;
use config::AppConfig;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Command::Words { amount } = &cli.command {
        println!("{}", words(amount)?);
        return Ok(());
    }

    let config = AppConfig::load()?;
    let db_config = config.db_config(cli.db.as_deref());
    debug!(path = %db_config.database_path.display(), "Opening database");

    let db = Database::new(db_config)
        .await
        .context("failed to open database")?;
    let result = run(&db, &config, cli.command).await;
    db.close().await;
    result
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so that command output on stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,acbill=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(db: &Database, config: &AppConfig, command: Command) -> anyhow::Result<()> {
    match command {
        Command::NextNumber { date } => {
            let number = db.invoice_counters().peek(today_or(date)).await?;
            println!("{number}");
        }

        Command::Create { input, date } => {
            let draft: BillDraft = read_json(&input, "bill draft")?;
            let bill = db.bills().create(draft, today_or(date)).await?;
            println!("{}", serde_json::to_string_pretty(&bill)?);
        }

        Command::Show { bill } => {
            let bill = find(db, &bill).await?;
            println!("{}", serde_json::to_string_pretty(&bill)?);
        }

        Command::List { status, limit } => {
            let bills = db.bills().list(status, limit).await?;
            for bill in &bills {
                println!("{}", summary_line(bill));
            }
            info!(count = bills.len(), "Listed bills");
        }

        Command::Status {
            bill_number,
            status,
        } => {
            let bill = db.bills().update_status(&bill_number, status).await?;
            println!("{} {}", bill.bill_number, bill.status);
        }

        Command::Update { bill_number, input } => {
            let update: BillUpdate = read_json(&input, "bill update")?;
            let bill = db.bills().update_details(&bill_number, update).await?;
            println!("{}", serde_json::to_string_pretty(&bill)?);
        }

        Command::Delete { bill_number } => {
            db.bills().delete(&bill_number).await?;
            println!("{bill_number} deleted");
        }

        Command::Pdf { bill_number, out } => {
            let bill = find(db, &bill_number).await?;
            let bytes = acbill_pdf::render_invoice(&bill, &config.company)?;
            let path = out.unwrap_or_else(|| acbill_pdf::file_name(&bill.bill_number).into());

            std::fs::write(&path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(bill_number = %bill.bill_number, path = %path.display(), "Invoice written");
            println!("{}", path.display());
        }

        Command::Words { amount } => println!("{}", words(&amount)?),
    }

    Ok(())
}

/// Looks a bill up by storage id when `key` is a UUID, else by bill number.
async fn find(db: &Database, key: &str) -> anyhow::Result<Bill> {
    let bill = if validate_uuid(key).is_ok() {
        db.bills().get_by_id(key).await?
    } else {
        db.bills().get_by_number(key).await?
    };
    bill.ok_or_else(|| anyhow!("bill {key} not found"))
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid {what}", path.display()))
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn words(amount: &str) -> anyhow::Result<String> {
    let value = parse_decimal(amount).ok_or_else(|| anyhow!("'{amount}' is not a number"))?;
    Ok(decimal_in_words(value)?)
}

fn summary_line(bill: &Bill) -> String {
    let customer = bill.bill_to.as_ref().map(|p| p.name.as_str()).unwrap_or("-");
    format!(
        "{:<14} {}  {:<9} {:>14}  {}",
        bill.bill_number,
        bill.bill_date.format("%d/%m/%Y"),
        bill.status.as_str(),
        bill.grand_total.grouped(),
        customer
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use acbill_core::fiscal::{FiscalYear, InvoiceNumber};
    use acbill_core::{BillParty, LineItem};
    use chrono::Utc;
    use rust_decimal::Decimal;

    #[test]
    fn test_words_command() {
        assert_eq!(words("1500").unwrap(), "One Thousand Five Hundred Rupees Only");
        assert_eq!(words("0").unwrap(), "Zero");
        assert!(words("-1").is_err());
        assert!(words("abc").is_err());
    }

    #[tokio::test]
    async fn test_find_by_number_or_id() {
        let db = Database::new(acbill_db::DbConfig::in_memory()).await.unwrap();
        let draft = BillDraft {
            items: vec![LineItem::with_amount("Service", Decimal::new(99_900, 2))],
            ..BillDraft::default()
        };
        let bill = db
            .bills()
            .create(draft, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(find(&db, "2025-26/001").await.unwrap().id, bill.id);
        assert_eq!(find(&db, &bill.id).await.unwrap().bill_number, "2025-26/001");
        assert!(find(&db, "2025-26/002").await.is_err());
        assert!(find(&db, "00000000-0000-4000-8000-000000000000").await.is_err());
    }

    #[test]
    fn test_read_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.json");
        std::fs::write(
            &path,
            r#"{"billTo": {"name": "Skyline Camp"}, "details": {"paymentTerms": "Immediate"}}"#,
        )
        .unwrap();

        let update: BillUpdate = read_json(&path, "bill update").unwrap();
        assert_eq!(update.bill_to.as_ref().unwrap().name, "Skyline Camp");
        assert_eq!(update.details.payment_terms.as_deref(), Some("Immediate"));

        std::fs::write(&path, "not json").unwrap();
        let err = read_json::<BillUpdate>(&path, "bill update").unwrap_err();
        assert!(err.to_string().contains("is not a valid bill update"));

        assert!(read_json::<BillDraft>(&dir.path().join("missing.json"), "bill draft").is_err());
    }

    #[test]
    fn test_today_or_prefers_given_date() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        assert_eq!(today_or(Some(date)), date);
    }

    #[test]
    fn test_summary_line() {
        let draft = BillDraft {
            bill_date: NaiveDate::from_ymd_opt(2025, 7, 1),
            bill_to: Some(BillParty {
                name: "Skyline Labour Camp".to_string(),
                address: None,
                gstin: None,
            }),
            items: vec![LineItem::with_amount("Service", Decimal::new(150_040, 2))],
            ..BillDraft::default()
        };
        let bill = Bill::finalize(
            "id",
            InvoiceNumber::new(FiscalYear::starting(2025), 7),
            draft,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            Utc::now(),
        )
        .unwrap();

        let line = summary_line(&bill);
        assert!(line.starts_with("2025-26/007"));
        assert!(line.contains("01/07/2025"));
        assert!(line.contains("draft"));
        assert!(line.contains("1,500.00"));
        assert!(line.ends_with("Skyline Labour Camp"));
    }
}
