//! # Credit Scoring
//!
//! A user's score is derived from how their transaction volume splits
//! between borrowing and lending. Scoring is a read-only pipeline:
//!
//! ```text
//! LedgerStore ──list_by_user──► Aggregator ──VolumeBreakdown──► Scorer ──► CreditScore
//! ```
//!
//! Nothing here writes to storage; concurrent inserts for the same user may
//! or may not be reflected in a score computed at the same moment.

pub mod aggregate;
pub mod score;

pub use aggregate::{breakdown, round_to, Aggregator, VolumeBreakdown};
pub use score::{CreditScore, Scorer};
