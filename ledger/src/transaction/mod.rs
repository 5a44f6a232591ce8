//! # Transaction Module
//!
//! Ledger entries: who borrowed or lent how much, with whom, and whether it
//! has been settled.
//!
//! ## Architecture
//!
//! ```text
//! types.rs     TransactionType (B/L) and TransactionStatus (Unpaid/Paid)
//! builder.rs   Transaction record and the TransactionDraft that precedes it
//! store.rs     LedgerStore: durable insert, lookup, per-user listing
//! lifecycle.rs TransactionManager: creation and settlement
//! ```
//!
//! ## Design Decisions
//!
//! - Identifiers are random UUIDv4, so concurrent inserts never collide
//!   without coordination.
//! - Amounts are `f64` values as supplied by the client. `kind` carries the
//!   direction; the sign of `amount` is not enforced.
//! - `status` is the only field that changes after insertion.

pub mod builder;
pub mod lifecycle;
pub mod store;
pub mod types;

pub use builder::{Transaction, TransactionDraft, ValidatedDraft};
pub use lifecycle::TransactionManager;
pub use store::LedgerStore;
pub use types::{TransactionStatus, TransactionType};
