//! # Repository Module
//!
//! Database repository implementations for acbill.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.bills().create(draft, today)                               │
//! │       ▼                                                                 │
//! │  BillRepository ───────────► InvoiceCounterRepository                  │
//! │  ├── create()                 ├── next_in_tx()  (same transaction)     │
//! │  ├── get_by_number()          ├── resync_in_tx()                       │
//! │  ├── list()                   └── peek()                               │
//! │  ├── update_details()                                                  │
//! │  ├── update_status()                                                   │
//! │  └── delete()                                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BillRepository`](bill::BillRepository) - Bill creation, lookup, edits
//! - [`InvoiceCounterRepository`](counter::InvoiceCounterRepository) - Per fiscal year numbering

pub mod bill;
pub mod counter;
