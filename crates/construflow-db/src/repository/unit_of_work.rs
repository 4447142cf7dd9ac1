//! # Unit of Work
//!
//! Stages whole collections in memory and writes them in one atomic batch.
//!
//! ```text
//! let mut uow = db.unit_of_work();
//! uow.stage(&db.sales(), &sales)?;        ─┐
//! uow.stage(&db.products(), &products)?;   ├─ encoded, nothing written yet
//! uow.stage(&db.ledger(), &ledger)?;      ─┘
//! uow.commit().await?;                    ── put_many: all or nothing
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

use construflow_core::SessionUser;

use super::{Collection, SessionStore};
use crate::error::DbResult;
use crate::store::{keys, KeyValueStore};

#[derive(Debug)]
pub struct UnitOfWork {
    store: Arc<dyn KeyValueStore>,
    staged: Vec<(String, String)>,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        UnitOfWork {
            store,
            staged: Vec::new(),
        }
    }

    /// Stages the full new contents of `collection`.
    ///
    /// Staging the same key twice keeps the later value.
    pub fn stage<T>(&mut self, collection: &Collection<T>, records: &[T]) -> DbResult<&mut Self>
    where
        T: Serialize + DeserializeOwned,
    {
        let raw = collection.encode(records)?;
        Ok(self.stage_raw(collection.key(), raw))
    }

    /// Stages the logged-in user, e.g. next to the users collection at setup.
    pub fn stage_session(&mut self, user: &SessionUser) -> DbResult<&mut Self> {
        let raw = SessionStore::encode(user)?;
        Ok(self.stage_raw(keys::SESSION, raw))
    }

    fn stage_raw(&mut self, key: &str, raw: String) -> &mut Self {
        match self.staged.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = raw,
            None => self.staged.push((key.to_string(), raw)),
        }
        self
    }

    pub fn staged_keys(&self) -> Vec<&str> {
        self.staged.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Writes every staged collection in one batch.
    ///
    /// On error nothing was written. An empty unit of work is a no-op.
    pub async fn commit(self) -> DbResult<()> {
        if self.staged.is_empty() {
            return Ok(());
        }

        debug!(keys = ?self.staged_keys(), "Committing unit of work");

        self.store.put_many(&self.staged).await.map_err(|e| {
            error!(error = %e, "Unit of work commit failed");
            e
        })
    }

    /// Writes the staged collections and deletes every other key, in one
    /// batch. On error the store keeps its previous contents.
    pub async fn commit_replacing_all(self) -> DbResult<()> {
        debug!(keys = ?self.staged_keys(), "Committing unit of work over an empty store");

        self.store.reset_to(&self.staged).await.map_err(|e| {
            error!(error = %e, "Unit of work reset failed");
            e
        })
    }
}
