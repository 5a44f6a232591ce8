//! Error types for the ledger core.
//!
//! Every operation exposed by [`crate::service::LedgerService`] returns a
//! [`LedgerError`]. Lower layers keep their own error enums
//! ([`crate::storage::DbError`], [`crate::account::CredentialError`]) and are
//! folded into [`LedgerError::Storage`] at the boundary, so callers only ever
//! match on the six members of the taxonomy.

use thiserror::Error;

use crate::account::CredentialError;
use crate::storage::DbError;

/// Errors surfaced by the ledger core.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced identifier does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Credential mismatch or unknown principal. Deliberately carries no
    /// detail so the two cases cannot be told apart.
    #[error("unauthorized")]
    Unauthorized,

    /// A query matched no records.
    #[error("no records found: {0}")]
    EmptyResult(String),

    /// Scoring was attempted with zero transaction volume.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The persistence layer failed. The message is for logs only.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Convenience alias used throughout the crate.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Stable discriminant of a [`LedgerError`], for transport shells that map
/// errors onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    EmptyResult,
    InsufficientData,
    Storage,
}

impl LedgerError {
    /// Returns the taxonomy member this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::EmptyResult(_) => ErrorKind::EmptyResult,
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Message safe to hand to a client.
    ///
    /// Storage failures collapse to a fixed string; sled paths and bincode
    /// diagnostics stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DbError> for LedgerError {
    fn from(err: DbError) -> Self {
        tracing::error!(error = %err, "storage failure");
        LedgerError::Storage(err.to_string())
    }
}

impl From<CredentialError> for LedgerError {
    fn from(err: CredentialError) -> Self {
        tracing::error!(error = %err, "credential hashing failure");
        LedgerError::Storage(err.to_string())
    }
}
