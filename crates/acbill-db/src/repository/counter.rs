//! # Invoice Counter Repository
//!
//! One row per fiscal year holding the last sequence handed out.
//!
//! ## Serialized Assignment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request A                          Request B                           │
//! │  BEGIN                              BEGIN                               │
//! │  UPDATE invoice_counters            │                                   │
//! │     SET last_sequence + 1           │                                   │
//! │     RETURNING 14  ◄── write lock    UPDATE ... (waits on busy_timeout)  │
//! │  INSERT bill 2025-26/014            │                                   │
//! │  COMMIT ─────────────────────────►  RETURNING 15                        │
//! │                                     INSERT bill 2025-26/015             │
//! │                                     COMMIT                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first bill of a fiscal year finds no row. The row is then seeded
//! from the bill numbers already stored, so a database that predates the
//! counter table keeps its sequence.

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use acbill_core::fiscal::{highest_sequence, next_in_fiscal_year, FiscalYear, InvoiceNumber};

/// Repository for per-fiscal-year invoice counters.
#[derive(Debug, Clone)]
pub struct InvoiceCounterRepository {
    pool: SqlitePool,
}

impl InvoiceCounterRepository {
    /// Creates a new InvoiceCounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceCounterRepository { pool }
    }

    /// Previews the number the next bill created on `today` would get.
    ///
    /// Nothing is reserved: two callers may see the same preview.
    pub async fn peek(&self, today: NaiveDate) -> DbResult<InvoiceNumber> {
        let fiscal_year = FiscalYear::containing(today);
        let mut conn = self.pool.acquire().await?;

        let from_counter = Self::last_sequence(&mut conn, fiscal_year)
            .await?
            .map(|last| InvoiceNumber::new(fiscal_year, last).successor());
        let from_bills = next_in_fiscal_year(fiscal_year, bill_numbers(&mut conn, fiscal_year).await?);

        Ok(from_counter.map_or(from_bills, |counted| counted.max(from_bills)))
    }

    /// Last sequence issued in `fiscal_year`, if any bill was numbered
    /// through the counter.
    pub async fn current(&self, fiscal_year: FiscalYear) -> DbResult<Option<u32>> {
        let mut conn = self.pool.acquire().await?;
        Self::last_sequence(&mut conn, fiscal_year).await
    }

    /// Reserves the next number in its own transaction.
    ///
    /// A number reserved this way and never used leaves a gap.
    pub async fn next(&self, fiscal_year: FiscalYear) -> DbResult<InvoiceNumber> {
        let mut tx = self.pool.begin().await?;
        let number = Self::next_in_tx(&mut tx, fiscal_year).await?;
        tx.commit().await?;
        Ok(number)
    }

    /// Takes the next number inside the caller's transaction.
    ///
    /// ## How It Works
    /// 1. Increment-and-read the counter row (takes the write lock)
    /// 2. No row? Scan this fiscal year's bill numbers, compute max+1 and
    ///    insert the row with that value
    ///
    /// Rolling back the transaction gives the number back.
    pub async fn next_in_tx(
        conn: &mut SqliteConnection,
        fiscal_year: FiscalYear,
    ) -> DbResult<InvoiceNumber> {
        let key = fiscal_year.to_string();

        let bumped: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE invoice_counters
            SET last_sequence = last_sequence + 1,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE fiscal_year = ?1
            RETURNING last_sequence
            "#,
        )
        .bind(&key)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(sequence) = bumped {
            let number = InvoiceNumber::new(fiscal_year, to_sequence(sequence)?);
            debug!(fiscal_year = %key, number = %number, "Invoice number taken from counter");
            return Ok(number);
        }

        let existing = bill_numbers(&mut *conn, fiscal_year).await?;
        let number = next_in_fiscal_year(fiscal_year, &existing);

        sqlx::query(
            r#"
            INSERT INTO invoice_counters (fiscal_year, last_sequence)
            VALUES (?1, ?2)
            "#,
        )
        .bind(&key)
        .bind(i64::from(number.sequence()))
        .execute(&mut *conn)
        .await?;

        debug!(
            fiscal_year = %key,
            number = %number,
            existing = existing.len(),
            "Invoice counter seeded from stored bills"
        );
        Ok(number)
    }

    /// Raises the counter to the highest stored bill number.
    ///
    /// Used after a duplicate-number failure: some bill got in without
    /// going through the counter.
    pub async fn resync_in_tx(conn: &mut SqliteConnection, fiscal_year: FiscalYear) -> DbResult<()> {
        let existing = bill_numbers(&mut *conn, fiscal_year).await?;
        let Some(highest) = highest_sequence(fiscal_year, &existing) else {
            return Ok(());
        };

        sqlx::query(
            r#"
            INSERT INTO invoice_counters (fiscal_year, last_sequence)
            VALUES (?1, ?2)
            ON CONFLICT (fiscal_year) DO UPDATE SET
                last_sequence = MAX(last_sequence, excluded.last_sequence),
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            "#,
        )
        .bind(fiscal_year.to_string())
        .bind(i64::from(highest))
        .execute(&mut *conn)
        .await?;

        debug!(fiscal_year = %fiscal_year, highest, "Invoice counter resynced");
        Ok(())
    }

    async fn last_sequence(
        conn: &mut SqliteConnection,
        fiscal_year: FiscalYear,
    ) -> DbResult<Option<u32>> {
        let last: Option<i64> = sqlx::query_scalar(
            "SELECT last_sequence FROM invoice_counters WHERE fiscal_year = ?1",
        )
        .bind(fiscal_year.to_string())
        .fetch_optional(&mut *conn)
        .await?;

        last.map(to_sequence).transpose()
    }
}

/// Stored bill numbers that start with `"{fiscal_year}/"`.
async fn bill_numbers(conn: &mut SqliteConnection, fiscal_year: FiscalYear) -> DbResult<Vec<String>> {
    let numbers: Vec<String> =
        sqlx::query_scalar("SELECT bill_number FROM bills WHERE bill_number LIKE ?1")
            .bind(format!("{fiscal_year}/%"))
            .fetch_all(&mut *conn)
            .await?;
    Ok(numbers)
}

fn to_sequence(value: i64) -> DbResult<u32> {
    u32::try_from(value)
        .map_err(|_| DbError::corrupt("invoice_counters", format!("sequence {value} out of range")))
}

// =============================================================================
// Unit Tests
// =============================================================================
