//! # Ledger Configuration & Constants
//!
//! Every tunable number in PeerLedger lives here. The scoring constants in
//! particular are part of the external contract: clients compare scores over
//! time, so changing a band or the tolerance silently re-rates every user.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Ledger format version. Bump when the on-disk record layout changes.
pub const LEDGER_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Credit Scoring
// ---------------------------------------------------------------------------

/// Band centers, iterated from highest to lowest. A percentage lands in a
/// band when it is within [`BAND_TOLERANCE`] of the center.
pub const BAND_CENTERS: [f64; 10] = [100.0, 90.0, 80.0, 70.0, 60.0, 50.0, 40.0, 30.0, 20.0, 10.0];

/// Maximum distance from a band center that still counts as a match.
///
/// Wider than half the band spacing, so neighbouring bands overlap. The
/// scorer resolves overlaps last-match-wins.
pub const BAND_TOLERANCE: f64 = 9.9;

/// Borrow score step. Band `idx` yields `BORROW_SCORE_STEP * (idx + 1)`.
pub const BORROW_SCORE_STEP: u32 = 100;

/// Lend score ceiling. Band `idx` yields `LEND_SCORE_BASE - idx * LEND_SCORE_STEP`.
pub const LEND_SCORE_BASE: u32 = 2000;

/// Lend score step.
pub const LEND_SCORE_STEP: u32 = 100;

/// Decimal places kept when rounding borrow/lend percentages.
pub const PERCENT_PRECISION: usize = 1;

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Minimum accepted plaintext credential length at provisioning time.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum username length in bytes.
pub const MAX_USERNAME_LENGTH: usize = 200;

/// Maximum length of the free-text `reason` on a transaction, in bytes.
/// Matches the column width of the legacy schema.
pub const MAX_REASON_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// sled tree holding accounts keyed by big-endian account id.
pub const TREE_ACCOUNTS: &str = "accounts";

/// sled tree mapping usernames to account ids.
pub const TREE_USERNAMES: &str = "usernames";

/// sled tree holding transactions keyed by transaction id.
pub const TREE_TRANSACTIONS: &str = "transactions";

/// sled tree indexing transaction ids by owning user.
pub const TREE_USER_TRANSACTIONS: &str = "user_transactions";

// ---------------------------------------------------------------------------
// Network Defaults
// ---------------------------------------------------------------------------

/// Default HTTP API port.
pub const DEFAULT_API_PORT: u16 = 5000;

/// Default metrics (Prometheus) port.
pub const DEFAULT_METRICS_PORT: u16 = 5001;

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Runtime knobs for the ledger core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Minimum plaintext credential length accepted by account provisioning.
    pub min_password_length: usize,
    /// Flush sled to disk after every mutating write.
    pub flush_on_write: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            min_password_length: MIN_PASSWORD_LENGTH,
            flush_on_write: true,
        }
    }
}
