//! Scoped host transactions
//!
//! Mutating host operations run inside a named transaction. The host supplies
//! a [`TransactionProvider`]; the adapter wraps each transaction in a
//! [`TransactionScope`], which commits only when told to and rolls back on
//! every other exit path, including a panic unwinding through the operation.

use tracing::{debug, warn};

use crate::error::TransactionError;

/// An open transaction on the host document.
pub trait HostTransaction: Send {
    /// Make the transaction's changes permanent.
    fn commit(self: Box<Self>) -> Result<(), TransactionError>;

    /// Discard the transaction's changes.
    fn rollback(self: Box<Self>);
}

/// Opens transactions on the host thread.
pub trait TransactionProvider: Send + Sync {
    /// Begin a transaction named `name`.
    fn begin(&self, name: &str) -> Result<Box<dyn HostTransaction>, TransactionError>;
}

/// Provider for hosts that have no transactional model.
///
/// Every transaction it opens commits trivially.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTransactions;

struct NoopTransaction;

impl HostTransaction for NoopTransaction {
    fn commit(self: Box<Self>) -> Result<(), TransactionError> {
        Ok(())
    }

    fn rollback(self: Box<Self>) {}
}

impl TransactionProvider for NoTransactions {
    fn begin(&self, _name: &str) -> Result<Box<dyn HostTransaction>, TransactionError> {
        Ok(Box::new(NoopTransaction))
    }
}

/// RAII guard over an open transaction.
///
/// Dropping the scope without calling [`commit`](Self::commit) rolls back.
pub struct TransactionScope {
    name: String,
    txn: Option<Box<dyn HostTransaction>>,
}

impl TransactionScope {
    /// Open a transaction through `provider`.
    pub fn begin(provider: &dyn TransactionProvider, name: &str) -> Result<Self, TransactionError> {
        let txn = provider.begin(name)?;
        debug!(target: "hostbridge::txn", transaction = name, "Transaction opened");
        Ok(TransactionScope {
            name: name.to_string(),
            txn: Some(txn),
        })
    }

    /// Transaction name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Commit and consume the scope.
    pub fn commit(mut self) -> Result<(), TransactionError> {
        match self.txn.take() {
            Some(txn) => {
                txn.commit()?;
                debug!(target: "hostbridge::txn", transaction = %self.name, "Transaction committed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        if let Some(txn) = self.txn.take() {
            warn!(target: "hostbridge::txn", transaction = %self.name, "Transaction rolled back");
            txn.rollback();
        }
    }
}

impl std::fmt::Debug for TransactionScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionScope")
            .field("name", &self.name)
            .field("open", &self.txn.is_some())
            .finish()
    }
}
