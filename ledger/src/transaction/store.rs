//! The ledger of record: durable storage of every [`Transaction`].

use tracing::{debug, info};
use uuid::Uuid;

use super::builder::{Transaction, TransactionDraft};
use super::types::TransactionStatus;
use crate::account::AccountId;
use crate::error::{LedgerError, LedgerResult};
use crate::storage::LedgerDb;

/// Owns every [`Transaction`] record.
///
/// Records reference accounts by id only; the store never consults the
/// account tree.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    db: LedgerDb,
}

impl LedgerStore {
    pub fn new(db: LedgerDb) -> Self {
        Self { db }
    }

    /// Validate, stamp and persist a draft. Returns the new id.
    pub fn insert(&self, draft: TransactionDraft) -> LedgerResult<Uuid> {
        self.insert_record(draft).map(|tx| tx.id)
    }

    /// Same as [`insert`](Self::insert) but hands back the stored record.
    pub(crate) fn insert_record(&self, draft: TransactionDraft) -> LedgerResult<Transaction> {
        let tx = Transaction::from_draft(draft.validate()?);
        self.db.put_transaction(&tx)?;
        info!(
            tx_id = %tx.id,
            user_id = tx.user_id,
            kind = tx.kind.code(),
            status = %tx.status,
            "transaction recorded"
        );
        Ok(tx)
    }

    pub fn get(&self, id: &Uuid) -> LedgerResult<Transaction> {
        self.db
            .get_transaction(id)?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {id}")))
    }

    /// Every transaction owned by `user_id`, oldest first.
    ///
    /// A user with no records yields [`LedgerError::EmptyResult`], not an
    /// empty list.
    pub fn list_by_user(&self, user_id: AccountId) -> LedgerResult<Vec<Transaction>> {
        let mut records = self.db.transactions_for_user(user_id)?;
        if records.is_empty() {
            return Err(LedgerError::EmptyResult(format!(
                "no transactions for user {user_id}"
            )));
        }
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.id.cmp(&b.id)));
        debug!(user_id, count = records.len(), "listed transactions");
        Ok(records)
    }

    /// Move a transaction to `status`.
    ///
    /// Re-applying the current status is a no-op. Asking a settled record
    /// to go back to `Unpaid` fails with [`LedgerError::Validation`]; if the
    /// record is settled concurrently, the settled state is kept.
    pub fn update_status(&self, id: &Uuid, status: TransactionStatus) -> LedgerResult<Transaction> {
        let current = self.get(id)?;
        if current.status.transition(status).is_none() {
            return Err(LedgerError::Validation(format!(
                "transaction {id} cannot move from {} to {status}",
                current.status
            )));
        }

        self.db
            .update_transaction(id, |tx| {
                tx.status = tx.status.transition(status).unwrap_or(tx.status);
            })?
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {id}")))
    }

    /// Total number of records across all users.
    pub fn transaction_count(&self) -> usize {
        self.db.transaction_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::transaction::TransactionType;

    fn store() -> LedgerStore {
        LedgerStore::new(LedgerDb::open_temporary().unwrap())
    }

    fn draft(user_id: AccountId, kind: TransactionType, amount: f64) -> TransactionDraft {
        TransactionDraft::new()
            .user_id(user_id)
            .kind(kind)
            .amount(amount)
            .status(TransactionStatus::Unpaid)
    }

    #[test]
    fn insert_then_get() {
        let store = store();
        let id = store
            .insert(draft(1, TransactionType::Borrow, 75.0).counterparty(2).reason("books"))
            .unwrap();

        let tx = store.get(&id).unwrap();
        assert_eq!(tx.id, id);
        assert_eq!(tx.user_id, 1);
        assert_eq!(tx.counterparty, Some(2));
        assert_eq!(tx.reason.as_deref(), Some("books"));
        assert_eq!(store.transaction_count(), 1);
    }

    #[test]
    fn insert_rejects_incomplete_draft() {
        let store = store();
        let incomplete = TransactionDraft::new().user_id(1).amount(5.0);
        let err = store.insert(incomplete).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.transaction_count(), 0);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let err = store().get(&Uuid::new_v4()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn list_is_partitioned_and_ordered() {
        let store = store();
        let first = store.insert(draft(1, TransactionType::Borrow, 1.0)).unwrap();
        let second = store.insert(draft(1, TransactionType::Lend, 2.0)).unwrap();
        store.insert(draft(2, TransactionType::Lend, 3.0)).unwrap();

        let listed = store.list_by_user(1).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].timestamp <= listed[1].timestamp);
        let ids: Vec<Uuid> = listed.iter().map(|t| t.id).collect();
        assert!(ids.contains(&first) && ids.contains(&second));
    }

    #[test]
    fn empty_listing_is_an_error() {
        let err = store().list_by_user(5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);
    }

    #[test]
    fn update_status_settles() {
        let store = store();
        let id = store.insert(draft(1, TransactionType::Borrow, 10.0)).unwrap();

        let settled = store.update_status(&id, TransactionStatus::Paid).unwrap();
        assert_eq!(settled.status, TransactionStatus::Paid);
        assert_eq!(store.get(&id).unwrap().status, TransactionStatus::Paid);
    }

    #[test]
    fn update_status_never_reverts() {
        let store = store();
        let id = store.insert(draft(1, TransactionType::Borrow, 10.0)).unwrap();
        store.update_status(&id, TransactionStatus::Paid).unwrap();

        let err = store.update_status(&id, TransactionStatus::Unpaid).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.get(&id).unwrap().status, TransactionStatus::Paid);
    }

    #[test]
    fn update_status_unknown_is_not_found() {
        let err = store()
            .update_status(&Uuid::new_v4(), TransactionStatus::Paid)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
