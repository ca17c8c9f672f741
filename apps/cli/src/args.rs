//! Command-line arguments.

use acbill_core::BillStatus;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rows shown by `acbill list` unless `--limit` says otherwise.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

#[derive(Debug, Parser)]
#[command(name = "acbill", version)]
#[command(about = "AC service billing: invoice numbers, totals, PDF invoices")]
pub struct Cli {
    /// Database file (default: $ACBILL_DATABASE_PATH or ./acbill.db)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Show the number the next bill will get, without using it
    NextNumber {
        /// Date deciding the fiscal year (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Create and number a bill from a JSON draft
    Create {
        #[arg(short, long, value_name = "DRAFT.json")]
        input: PathBuf,

        /// Creation date deciding the fiscal year (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Print a bill as JSON, looked up by number or id
    Show { bill: String },

    /// List bills, newest first
    List {
        #[arg(long)]
        status: Option<BillStatus>,

        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: u32,
    },

    /// Move a bill to another status (draft, sent, paid, cancelled)
    Status {
        bill_number: String,
        status: BillStatus,
    },

    /// Replace a bill's customer and details from a JSON file
    Update {
        bill_number: String,

        #[arg(short, long, value_name = "UPDATE.json")]
        input: PathBuf,
    },

    /// Delete a bill; its number is not reused
    Delete { bill_number: String },

    /// Write the invoice PDF
    Pdf {
        bill_number: String,

        /// Output file (default: Invoice-<number>.pdf)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write an amount out in words
    Words {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("acbill").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_next_number_with_date() {
        let cli = parse(&["--db", "bills.db", "next-number", "--date", "2026-03-31"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some("bills.db"));
        assert_eq!(
            cli.command,
            Command::NextNumber {
                date: NaiveDate::from_ymd_opt(2026, 3, 31)
            }
        );
    }

    #[test]
    fn test_db_flag_after_subcommand() {
        let cli = parse(&["show", "2025-26/014", "-d", "other.db"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some("other.db"));
    }

    #[test]
    fn test_create_requires_input() {
        assert!(parse(&["create"]).is_err());

        let cli = parse(&["create", "-i", "draft.json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Create {
                input: PathBuf::from("draft.json"),
                date: None
            }
        );
    }

    #[test]
    fn test_status_command() {
        let cli = parse(&["status", "2025-26/014", "paid"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Status {
                bill_number: "2025-26/014".to_string(),
                status: BillStatus::Paid
            }
        );

        assert!(parse(&["status", "2025-26/014", "settled"]).is_err());
    }

    #[test]
    fn test_list_filter_and_limit() {
        let cli = parse(&["list", "--status", "draft"]).unwrap();
        assert_eq!(
            cli.command,
            Command::List {
                status: Some(BillStatus::Draft),
                limit: DEFAULT_LIST_LIMIT
            }
        );

        let cli = parse(&["list", "--limit", "5"]).unwrap();
        assert_eq!(cli.command, Command::List { status: None, limit: 5 });
    }

    #[test]
    fn test_update_delete_and_pdf() {
        let cli = parse(&["update", "2025-26/001", "--input", "update.json"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Update {
                bill_number: "2025-26/001".to_string(),
                input: PathBuf::from("update.json")
            }
        );

        let cli = parse(&["delete", "2025-26/001"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Delete {
                bill_number: "2025-26/001".to_string()
            }
        );

        let cli = parse(&["pdf", "2025-26/001", "--out", "/tmp/inv.pdf"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Pdf {
                bill_number: "2025-26/001".to_string(),
                out: Some(PathBuf::from("/tmp/inv.pdf"))
            }
        );
    }

    #[test]
    fn test_words_accepts_negative_amount() {
        let cli = parse(&["words", "-5"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Words {
                amount: "-5".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["refund"]).is_err());
        assert!(parse(&["show"]).is_err());
        assert!(parse(&["show", "a", "b"]).is_err());
        assert!(parse(&["next-number", "--date", "31/03/2026"]).is_err());
        assert!(parse(&["list", "--status"]).is_err());
    }
}
