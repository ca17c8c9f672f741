//! # Bill Repository
//!
//! Database operations for bills and their line items.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Bill Lifecycle                                    │
//! │                                                                         │
//! │  1. CREATE (one transaction)                                           │
//! │     ├── InvoiceCounterRepository::next_in_tx() → 2025-26/014           │
//! │     ├── Bill::finalize() → totals + amount in words                    │
//! │     └── INSERT bills + bill_items                                      │
//! │         (duplicate number? resync counter, retry)                      │
//! │                                                                         │
//! │  2. EDIT METADATA                                                      │
//! │     └── update_details() → bill_to, project, WO, notes...              │
//! │         (number and totals never change)                               │
//! │                                                                         │
//! │  3. STATUS                                                             │
//! │     └── update_status() → draft → sent → paid / cancelled              │
//! │                                                                         │
//! │  4. (OPTIONAL) DELETE                                                  │
//! │     └── delete() → row gone, number NOT reused                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::counter::InvoiceCounterRepository;
use acbill_core::fiscal::FiscalYear;
use acbill_core::{
    Bill, BillDetails, BillDraft, BillParty, BillStatus, BillUpdate, LineItem, Money,
};

const BILL_COLUMNS: &str = r#"
    id, bill_number, bill_date,
    bill_to_name, bill_to_address, bill_to_gstin,
    project_name, reference_no, customer_wo_number, customer_wo_date,
    payment_terms, notes,
    subtotal_paise, rounding_adjustment_paise, grand_total_paise,
    amount_in_words, status, created_at, updated_at
"#;

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct BillRow {
    id: String,
    bill_number: String,
    bill_date: NaiveDate,
    bill_to_name: Option<String>,
    bill_to_address: Option<String>,
    bill_to_gstin: Option<String>,
    project_name: Option<String>,
    reference_no: Option<String>,
    customer_wo_number: Option<String>,
    customer_wo_date: Option<NaiveDate>,
    payment_terms: Option<String>,
    notes: Option<String>,
    subtotal_paise: i64,
    rounding_adjustment_paise: i64,
    grand_total_paise: i64,
    amount_in_words: String,
    status: BillStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BillRow {
    fn into_bill(self, items: Vec<LineItem>) -> Bill {
        let bill_to = self.bill_to_name.map(|name| BillParty {
            name,
            address: self.bill_to_address,
            gstin: self.bill_to_gstin,
        });

        Bill {
            id: self.id,
            bill_number: self.bill_number,
            bill_date: self.bill_date,
            bill_to,
            details: BillDetails {
                project_name: self.project_name,
                reference_no: self.reference_no,
                customer_wo_number: self.customer_wo_number,
                customer_wo_date: self.customer_wo_date,
                payment_terms: self.payment_terms,
                notes: self.notes,
            },
            items,
            subtotal: Money::from_paise(self.subtotal_paise),
            rounding_adjustment: Money::from_paise(self.rounding_adjustment_paise),
            grand_total: Money::from_paise(self.grand_total_paise),
            amount_in_words: self.amount_in_words,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    description: String,
    sac_code: Option<String>,
    unit: String,
    quantity: Option<String>,
    rate: Option<String>,
    amount: Option<String>,
}

impl ItemRow {
    fn into_item(self) -> DbResult<LineItem> {
        Ok(LineItem {
            description: self.description,
            sac_code: self.sac_code,
            unit: self.unit,
            quantity: parse_stored_decimal("quantity", self.quantity)?,
            rate: parse_stored_decimal("rate", self.rate)?,
            amount: parse_stored_decimal("amount", self.amount)?,
        })
    }
}

fn parse_stored_decimal(column: &str, raw: Option<String>) -> DbResult<Option<Decimal>> {
    raw.map(|text| {
        Decimal::from_str(&text)
            .map_err(|e| DbError::corrupt("bill_items", format!("{column} '{text}': {e}")))
    })
    .transpose()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for bill database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.bills();
///
/// let bill = repo.create(draft, today).await?;
/// let same = repo.get_by_number(&bill.bill_number).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BillRepository {
    pool: SqlitePool,
    create_attempts: u32,
}

impl BillRepository {
    /// Creates a new BillRepository.
    pub fn new(pool: SqlitePool, create_attempts: u32) -> Self {
        BillRepository {
            pool,
            create_attempts: create_attempts.max(1),
        }
    }

    /// Numbers, finalizes and stores a new bill.
    ///
    /// ## What This Does
    /// 1. Picks the fiscal year from `today`
    /// 2. Opens a transaction and takes the next number from the counter
    /// 3. Finalizes the draft (validation, totals, words)
    /// 4. Inserts the bill and its items, commits
    ///
    /// A duplicate bill number rolls the attempt back, resyncs the counter
    /// with the stored bills and tries again, up to the configured number
    /// of attempts. Any other failure aborts with nothing persisted.
    pub async fn create(&self, draft: BillDraft, today: NaiveDate) -> DbResult<Bill> {
        let fiscal_year = FiscalYear::containing(today);
        let mut attempt = 1;

        loop {
            match self.try_create(&draft, fiscal_year, today, attempt > 1).await {
                Err(err) if err.is_duplicate_bill_number() && attempt < self.create_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.create_attempts,
                        error = %err,
                        "Invoice number collision, retrying"
                    );
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn try_create(
        &self,
        draft: &BillDraft,
        fiscal_year: FiscalYear,
        today: NaiveDate,
        resync: bool,
    ) -> DbResult<Bill> {
        let mut tx = self.pool.begin().await?;

        if resync {
            InvoiceCounterRepository::resync_in_tx(&mut tx, fiscal_year).await?;
        }
        let number = InvoiceCounterRepository::next_in_tx(&mut tx, fiscal_year).await?;

        let bill = Bill::finalize(
            Uuid::new_v4().to_string(),
            number,
            draft.clone(),
            today,
            Utc::now(),
        )?;

        insert_bill(&mut tx, &bill).await?;
        tx.commit().await?;

        info!(
            id = %bill.id,
            bill_number = %bill.bill_number,
            grand_total = %bill.grand_total.grouped(),
            items = bill.items.len(),
            "Bill created"
        );
        Ok(bill)
    }

    /// Gets a bill by its storage ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE id = ?1");
        let row: Option<BillRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.with_items(row).await?)),
            None => Ok(None),
        }
    }

    /// Gets a bill by its invoice number.
    pub async fn get_by_number(&self, bill_number: &str) -> DbResult<Option<Bill>> {
        let sql = format!("SELECT {BILL_COLUMNS} FROM bills WHERE bill_number = ?1");
        let row: Option<BillRow> = sqlx::query_as(&sql)
            .bind(bill_number)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.with_items(row).await?)),
            None => Ok(None),
        }
    }

    /// Lists bills, newest first, optionally filtered by status.
    pub async fn list(&self, status: Option<BillStatus>, limit: u32) -> DbResult<Vec<Bill>> {
        let sql = format!(
            "SELECT {BILL_COLUMNS} FROM bills
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY created_at DESC, bill_number DESC
             LIMIT ?2"
        );
        let rows: Vec<BillRow> = sqlx::query_as(&sql)
            .bind(status)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), status = ?status, "Listed bills");

        let mut bills = Vec::with_capacity(rows.len());
        for row in rows {
            bills.push(self.with_items(row).await?);
        }
        Ok(bills)
    }

    /// All stored invoice numbers, in no particular order.
    pub async fn all_numbers(&self) -> DbResult<Vec<String>> {
        let numbers: Vec<String> = sqlx::query_scalar("SELECT bill_number FROM bills")
            .fetch_all(&self.pool)
            .await?;
        Ok(numbers)
    }

    /// Total number of stored bills.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bills")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Replaces a bill's editable metadata.
    ///
    /// Only `bill_to` and [`BillDetails`] columns are written; the number,
    /// items and totals stay as issued.
    pub async fn update_details(&self, bill_number: &str, update: BillUpdate) -> DbResult<Bill> {
        let mut bill = self.require(bill_number).await?;
        bill.apply_update(update, Utc::now())?;

        let party = bill.bill_to.as_ref();
        let result = sqlx::query(
            r#"
            UPDATE bills SET
                bill_to_name = ?2,
                bill_to_address = ?3,
                bill_to_gstin = ?4,
                project_name = ?5,
                reference_no = ?6,
                customer_wo_number = ?7,
                customer_wo_date = ?8,
                payment_terms = ?9,
                notes = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(&bill.id)
        .bind(party.map(|p| p.name.as_str()))
        .bind(party.and_then(|p| p.address.as_deref()))
        .bind(party.and_then(|p| p.gstin.as_deref()))
        .bind(bill.details.project_name.as_deref())
        .bind(bill.details.reference_no.as_deref())
        .bind(bill.details.customer_wo_number.as_deref())
        .bind(bill.details.customer_wo_date)
        .bind(bill.details.payment_terms.as_deref())
        .bind(bill.details.notes.as_deref())
        .bind(bill.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", bill_number));
        }

        debug!(bill_number = %bill.bill_number, "Bill details updated");
        Ok(bill)
    }

    /// Moves a bill to a new status.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] if no such bill (or it changed concurrently)
    /// - [`DbError::Domain`] if the lifecycle forbids the move
    pub async fn update_status(&self, bill_number: &str, status: BillStatus) -> DbResult<Bill> {
        let mut bill = self.require(bill_number).await?;
        let previous = bill.status;
        bill.transition(status, Utc::now())?;

        let result = sqlx::query(
            r#"
            UPDATE bills SET
                status = ?2,
                updated_at = ?3
            WHERE id = ?1 AND status = ?4
            "#,
        )
        .bind(&bill.id)
        .bind(bill.status)
        .bind(bill.updated_at)
        .bind(previous)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", bill_number));
        }

        info!(
            bill_number = %bill.bill_number,
            from = %previous,
            to = %bill.status,
            "Bill status changed"
        );
        Ok(bill)
    }

    /// Deletes a bill and its items.
    ///
    /// The invoice counter is left alone, so the number is never issued
    /// again.
    pub async fn delete(&self, bill_number: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM bills WHERE bill_number = ?1")
            .bind(bill_number)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bill", bill_number));
        }

        info!(bill_number, "Bill deleted");
        Ok(())
    }

    async fn require(&self, bill_number: &str) -> DbResult<Bill> {
        self.get_by_number(bill_number)
            .await?
            .ok_or_else(|| DbError::not_found("Bill", bill_number))
    }

    async fn with_items(&self, row: BillRow) -> DbResult<Bill> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT description, sac_code, unit, quantity, rate, amount
            FROM bill_items
            WHERE bill_id = ?1
            ORDER BY position
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(ItemRow::into_item)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(row.into_bill(items))
    }
}

/// Inserts a finalized bill and its items on the given connection.
async fn insert_bill(conn: &mut SqliteConnection, bill: &Bill) -> DbResult<()> {
    debug!(id = %bill.id, bill_number = %bill.bill_number, "Inserting bill");

    let party = bill.bill_to.as_ref();
    sqlx::query(
        r#"
        INSERT INTO bills (
            id, bill_number, bill_date,
            bill_to_name, bill_to_address, bill_to_gstin,
            project_name, reference_no, customer_wo_number, customer_wo_date,
            payment_terms, notes,
            subtotal_paise, rounding_adjustment_paise, grand_total_paise,
            amount_in_words, status, created_at, updated_at
        ) VALUES (
            ?1, ?2, ?3,
            ?4, ?5, ?6,
            ?7, ?8, ?9, ?10,
            ?11, ?12,
            ?13, ?14, ?15,
            ?16, ?17, ?18, ?19
        )
        "#,
    )
    .bind(&bill.id)
    .bind(&bill.bill_number)
    .bind(bill.bill_date)
    .bind(party.map(|p| p.name.as_str()))
    .bind(party.and_then(|p| p.address.as_deref()))
    .bind(party.and_then(|p| p.gstin.as_deref()))
    .bind(bill.details.project_name.as_deref())
    .bind(bill.details.reference_no.as_deref())
    .bind(bill.details.customer_wo_number.as_deref())
    .bind(bill.details.customer_wo_date)
    .bind(bill.details.payment_terms.as_deref())
    .bind(bill.details.notes.as_deref())
    .bind(bill.subtotal.paise())
    .bind(bill.rounding_adjustment.paise())
    .bind(bill.grand_total.paise())
    .bind(&bill.amount_in_words)
    .bind(bill.status)
    .bind(bill.created_at)
    .bind(bill.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &bill.bill_number),
        other => other,
    })?;

    for (position, item) in bill.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO bill_items (
                bill_id, position, description, sac_code, unit,
                quantity, rate, amount
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&bill.id)
        .bind(position as i64)
        .bind(&item.description)
        .bind(item.sac_code.as_deref())
        .bind(item.unit_label())
        .bind(item.quantity.map(|d| d.to_string()))
        .bind(item.rate.map(|d| d.to_string()))
        .bind(item.amount.map(|d| d.to_string()))
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
