//! Core type definitions for ledger transactions.
//!
//! These enums are part of the wire contract: existing clients send
//! `"B"`/`"L"` for the transaction type and `"Paid"`/`"Unpaid"` for the
//! status, so the serde representation is pinned to those literals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Direction of a ledger entry from the owning user's point of view.
///
/// The type alone carries direction. Amounts are conventionally positive
/// magnitudes, but the sign is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// The owning user received money from the counterparty.
    #[serde(rename = "B", alias = "Borrow")]
    Borrow,
    /// The owning user gave money to the counterparty.
    #[serde(rename = "L", alias = "Lend")]
    Lend,
}

impl TransactionType {
    /// Single-letter code used on the wire.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Borrow => "B",
            Self::Lend => "L",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Borrow => write!(f, "Borrow"),
            Self::Lend => write!(f, "Lend"),
        }
    }
}

impl FromStr for TransactionType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B" | "Borrow" => Ok(Self::Borrow),
            "L" | "Lend" => Ok(Self::Lend),
            other => Err(LedgerError::Validation(format!(
                "unknown transaction_type: {other}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// Settlement state of a transaction.
///
/// The only legal transition is `Unpaid -> Paid`. Re-applying `Paid` is a
/// no-op; nothing ever moves a record back to `Unpaid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    /// Obligation outstanding.
    Unpaid,
    /// Obligation settled.
    Paid,
}

impl TransactionStatus {
    /// Returns the status after applying `next`, or `None` if the move
    /// would go backwards.
    pub fn transition(self, next: TransactionStatus) -> Option<TransactionStatus> {
        match (self, next) {
            (Self::Paid, Self::Unpaid) => None,
            (_, next) => Some(next),
        }
    }

    /// Returns `true` once the obligation is settled.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "Unpaid"),
            Self::Paid => write!(f, "Paid"),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unpaid" => Ok(Self::Unpaid),
            "Paid" => Ok(Self::Paid),
            other => Err(LedgerError::Validation(format!(
                "unknown transaction_status: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_wire_codes() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Borrow).unwrap(),
            "\"B\""
        );
        assert_eq!(serde_json::to_string(&TransactionType::Lend).unwrap(), "\"L\"");

        let parsed: TransactionType = serde_json::from_str("\"L\"").unwrap();
        assert_eq!(parsed, TransactionType::Lend);
        let aliased: TransactionType = serde_json::from_str("\"Borrow\"").unwrap();
        assert_eq!(aliased, TransactionType::Borrow);
    }

    #[test]
    fn transaction_type_rejects_unknown_code() {
        assert!(serde_json::from_str::<TransactionType>("\"X\"").is_err());
        assert!("X".parse::<TransactionType>().is_err());
        assert_eq!("B".parse::<TransactionType>().unwrap().code(), "B");
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [TransactionStatus::Unpaid, TransactionStatus::Paid] {
            let parsed: TransactionStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_never_moves_backwards() {
        use TransactionStatus::*;
        assert_eq!(Unpaid.transition(Paid), Some(Paid));
        assert_eq!(Paid.transition(Paid), Some(Paid));
        assert_eq!(Unpaid.transition(Unpaid), Some(Unpaid));
        assert_eq!(Paid.transition(Unpaid), None);
    }

    #[test]
    fn settled_flag() {
        assert!(TransactionStatus::Paid.is_settled());
        assert!(!TransactionStatus::Unpaid.is_settled());
    }
}
