// Copyright (c) 2026 PeerLedger Contributors. MIT License.
// See LICENSE for details.

//! # PeerLedger: Core Library
//!
//! A peer-to-peer lending ledger with a credit score derived from how a
//! user's volume splits between borrowing and lending. Users record that
//! they borrowed from or lent to someone, settle those entries later, and
//! ask for a score.
//!
//! ## Architecture
//!
//! - **account**: Registered users and Argon2id credential checks.
//! - **transaction**: Ledger entries, the ledger store, and settlement.
//! - **credit**: Volume aggregation and band scoring.
//! - **service**: The façade a transport shell calls into.
//! - **storage**: sled persistence behind an explicit `LedgerDb` handle.
//! - **config**: Scoring constants, tree names, runtime knobs.
//! - **error**: The error taxonomy every operation returns.
//!
//! Nothing in this crate knows about HTTP. The `peerledger-node` binary
//! wraps [`service::LedgerService`] in an axum router.
//!
//! ## Example
//!
//! ```
//! use peerledger::config::LedgerConfig;
//! use peerledger::service::LedgerService;
//! use peerledger::storage::LedgerDb;
//! use peerledger::transaction::{TransactionDraft, TransactionStatus, TransactionType};
//!
//! let service = LedgerService::new(LedgerDb::open_temporary().unwrap(), &LedgerConfig::default());
//! let draft = |kind, amount| {
//!     TransactionDraft::new()
//!         .user_id(1)
//!         .kind(kind)
//!         .amount(amount)
//!         .status(TransactionStatus::Unpaid)
//! };
//! service.create_transaction(draft(TransactionType::Borrow, 300.0)).unwrap();
//! service.create_transaction(draft(TransactionType::Lend, 700.0)).unwrap();
//!
//! assert_eq!(service.compute_credit_score(1).unwrap(), 2500);
//! ```

pub mod account;
pub mod config;
pub mod credit;
pub mod error;
pub mod service;
pub mod storage;
pub mod transaction;

pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use service::LedgerService;
