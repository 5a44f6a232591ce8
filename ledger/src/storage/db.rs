//! # LedgerDb: Persistent Storage Engine
//!
//! The persistence layer for PeerLedger, built on sled's embedded key-value
//! store. All on-disk data flows through this module.
//!
//! ## Tree Layout
//!
//! | Tree                | Key                                  | Value                 |
//! |---------------------|--------------------------------------|-----------------------|
//! | `accounts`          | `account_id` (8B BE)                 | `bincode(Account)`     |
//! | `usernames`         | `username` (UTF-8)                   | `account_id` (8B BE)   |
//! | `transactions`      | `transaction_id` (16B UUID)          | `bincode(Transaction)` |
//! | `user_transactions` | `user_id` (8B BE) ‖ `tx_id` (16B)    | empty                 |
//!
//! The user index uses fixed-width keys, so a prefix scan over the 8-byte
//! user id yields exactly that user's entries.
//!
//! ## Atomicity
//!
//! Inserting a transaction writes the record and its index entry in one
//! sled transaction; account creation does the same for the username
//! reservation and the account record. Single-record updates go through a
//! compare-and-swap loop, so a concurrent reader sees either the old or the
//! new encoding, never a blend.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Transactional, Tree};
use std::path::Path;
use uuid::Uuid;

use crate::account::{Account, AccountId};
use crate::config::{TREE_ACCOUNTS, TREE_TRANSACTIONS, TREE_USERNAMES, TREE_USER_TRANSACTIONS};
use crate::transaction::Transaction;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),
}

pub type DbResult<T> = Result<T, DbError>;

fn encode<T: Serialize>(value: &T) -> DbResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| DbError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> DbResult<T> {
    bincode::deserialize(bytes).map_err(|e| DbError::Serialization(e.to_string()))
}

fn from_tx_error(err: TransactionError<DbError>) -> DbError {
    match err {
        TransactionError::Abort(inner) => inner,
        TransactionError::Storage(e) => DbError::Sled(e),
    }
}

/// Builds the `user_transactions` key for one entry.
fn user_index_key(user_id: AccountId, tx_id: &Uuid) -> [u8; 24] {
    let mut key = [0u8; 24];
    key[..8].copy_from_slice(&user_id.to_be_bytes());
    key[8..].copy_from_slice(tx_id.as_bytes());
    key
}

/// Read-modify-write of a single record with compare-and-swap.
///
/// Returns `None` if the key does not exist. On a lost race the record is
/// re-read and `mutate` applied again to the fresh value.
fn update_record<T, F>(tree: &Tree, key: &[u8], mutate: F) -> DbResult<Option<T>>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&mut T),
{
    loop {
        let Some(current) = tree.get(key)? else {
            return Ok(None);
        };
        let mut record: T = decode(&current)?;
        mutate(&mut record);
        let updated = encode(&record)?;

        match tree.compare_and_swap(key, Some(&current), Some(updated))? {
            Ok(()) => return Ok(Some(record)),
            Err(_) => continue,
        }
    }
}

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Persistent storage engine for PeerLedger.
///
/// Wraps a sled `Db` instance and exposes typed accessors for accounts and
/// transactions. All serialization uses bincode.
///
/// # Thread Safety
///
/// sled trees support lock-free concurrent reads and serialized writes.
/// `LedgerDb` is cheap to clone and every clone shares the same database.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    /// The underlying sled database handle.
    db: Db,
    /// Accounts indexed by big-endian id.
    accounts: Tree,
    /// Username -> account id.
    usernames: Tree,
    /// Transactions indexed by UUID bytes.
    transactions: Tree,
    /// (user id, transaction id) presence index.
    user_transactions: Tree,
    /// Flush after each mutating call.
    flush_on_write: bool,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when the last handle is
    /// dropped. Intended for tests.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let accounts = db.open_tree(TREE_ACCOUNTS)?;
        let usernames = db.open_tree(TREE_USERNAMES)?;
        let transactions = db.open_tree(TREE_TRANSACTIONS)?;
        let user_transactions = db.open_tree(TREE_USER_TRANSACTIONS)?;

        Ok(Self {
            db,
            accounts,
            usernames,
            transactions,
            user_transactions,
            flush_on_write: false,
        })
    }

    /// Enables or disables the post-write flush.
    pub fn with_flush_on_write(mut self, flush: bool) -> Self {
        self.flush_on_write = flush;
        self
    }

    fn after_write(&self) -> DbResult<()> {
        if self.flush_on_write {
            self.db.flush()?;
        }
        Ok(())
    }

    // -- Account operations -------------------------------------------------

    /// Allocate a fresh account id. Monotonic, not necessarily contiguous.
    pub fn next_account_id(&self) -> DbResult<AccountId> {
        Ok(self.db.generate_id()?)
    }

    /// Persist a new account and reserve its username atomically.
    ///
    /// Fails with [`DbError::DuplicateKey`] if the username is taken; in
    /// that case nothing is written.
    pub fn create_account(&self, account: &Account) -> DbResult<()> {
        let name_key = account.username.as_bytes();
        let id_key = account.id.to_be_bytes();
        let bytes = encode(account)?;

        (&self.usernames, &self.accounts)
            .transaction(|(usernames, accounts)| {
                if usernames.get(name_key)?.is_some() {
                    return Err(ConflictableTransactionError::Abort(DbError::DuplicateKey(
                        account.username.clone(),
                    )));
                }
                usernames.insert(name_key, &id_key[..])?;
                accounts.insert(&id_key[..], bytes.as_slice())?;
                Ok(())
            })
            .map_err(from_tx_error)?;

        self.after_write()
    }

    /// Retrieve an account by id.
    pub fn get_account(&self, id: AccountId) -> DbResult<Option<Account>> {
        match self.accounts.get(id.to_be_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Resolve a username to its account id.
    pub fn get_account_id_by_username(&self, username: &str) -> DbResult<Option<AccountId>> {
        match self.usernames.get(username.as_bytes())? {
            Some(bytes) => {
                let id = AccountId::from_be_bytes(
                    bytes
                        .as_ref()
                        .try_into()
                        .map_err(|_| DbError::Serialization("invalid account id bytes".into()))?,
                );
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Atomically apply `mutate` to an existing account.
    ///
    /// Returns the updated account, or `None` if the id is unknown. The
    /// username is not re-indexed, so `mutate` must leave it unchanged.
    pub fn update_account<F>(&self, id: AccountId, mutate: F) -> DbResult<Option<Account>>
    where
        F: Fn(&mut Account),
    {
        let updated = update_record(&self.accounts, &id.to_be_bytes(), mutate)?;
        if updated.is_some() {
            self.after_write()?;
        }
        Ok(updated)
    }

    // -- Transaction operations ---------------------------------------------

    /// Persist a transaction and its user index entry atomically.
    pub fn put_transaction(&self, tx: &Transaction) -> DbResult<()> {
        let key = tx.id.as_bytes();
        let index_key = user_index_key(tx.user_id, &tx.id);
        let bytes = encode(tx)?;

        (&self.transactions, &self.user_transactions)
            .transaction(|(records, index)| {
                records.insert(&key[..], bytes.as_slice())?;
                index.insert(&index_key[..], Vec::<u8>::new())?;
                Ok::<(), ConflictableTransactionError<DbError>>(())
            })
            .map_err(from_tx_error)?;

        self.after_write()
    }

    /// Retrieve a transaction by id.
    pub fn get_transaction(&self, id: &Uuid) -> DbResult<Option<Transaction>> {
        match self.transactions.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Atomically apply `mutate` to an existing transaction.
    ///
    /// Returns the updated record, or `None` if the id is unknown. `id`,
    /// `user_id` and `timestamp` are immutable; `mutate` must not touch them.
    pub fn update_transaction<F>(&self, id: &Uuid, mutate: F) -> DbResult<Option<Transaction>>
    where
        F: Fn(&mut Transaction),
    {
        let updated = update_record(&self.transactions, id.as_bytes(), mutate)?;
        if updated.is_some() {
            self.after_write()?;
        }
        Ok(updated)
    }

    /// All transactions owned by `user_id`, in index (id) order.
    ///
    /// Returns an empty vector for users with no entries. Entries inserted
    /// concurrently for the same user may or may not be included.
    pub fn transactions_for_user(&self, user_id: AccountId) -> DbResult<Vec<Transaction>> {
        let mut out = Vec::new();
        for entry in self.user_transactions.scan_prefix(user_id.to_be_bytes()) {
            let (key, _) = entry?;
            let tx_id = Uuid::from_slice(&key[8..])
                .map_err(|e| DbError::Serialization(e.to_string()))?;
            if let Some(tx) = self.get_transaction(&tx_id)? {
                out.push(tx);
            }
        }
        Ok(out)
    }

    // -- Utility operations -------------------------------------------------

    /// Number of accounts stored.
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of transactions stored.
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Force a flush of all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
