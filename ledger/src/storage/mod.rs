//! # Storage Module
//!
//! Persistence for accounts and ledger entries. Everything durable goes
//! through [`LedgerDb`], a thin typed layer over sled. Higher layers (the
//! account store, the ledger store) hold a clone of the same handle; there
//! is no process-wide database singleton.

pub mod db;

pub use db::{DbError, DbResult, LedgerDb};
