//! Lazily resolved relations
//!
//! A relation read is always asynchronous. The first read for a given
//! foreign key fetches the related record; later reads for the same key are
//! served from the per-instance cache without I/O. Changing the foreign key
//! makes the next read fetch again.

use std::fmt;

use tokio::sync::Mutex;

use core_kernel::EntityId;

use crate::crm::Crm;
use crate::entity::Entity;
use crate::error::CrmError;

/// Per-instance cache for one foreign-key relation
pub struct Related<T> {
    cache: Mutex<Option<(EntityId, T)>>,
}

impl<T> Related<T> {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(None),
        }
    }

    /// Forgets the cached record
    pub fn invalidate(&mut self) {
        *self.cache.get_mut() = None;
    }

    /// Returns the foreign key the cache was filled for, if any
    pub fn cached_id(&self) -> Option<EntityId> {
        self.cache
            .try_lock()
            .ok()
            .and_then(|cache| cache.as_ref().map(|(id, _)| id.clone()))
    }
}

impl<T: Entity + Clone> Related<T> {
    /// Resolves the relation for the current foreign key
    ///
    /// `None` when nothing is linked, without a remote call. A related record
    /// that no longer exists surfaces as the remote not-found error.
    pub async fn resolve(&self, crm: &Crm, foreign_key: Option<EntityId>) -> Result<Option<T>, CrmError> {
        let Some(id) = foreign_key else {
            return Ok(None);
        };

        let mut cache = self.cache.lock().await;
        if let Some((cached_id, value)) = cache.as_ref() {
            if *cached_id == id {
                return Ok(Some(value.clone()));
            }
        }

        tracing::debug!(entity = %T::TYPE, id = %id, "Resolving relation");
        let value = crm.manager::<T>().get(&id).await?;
        *cache = Some((id, value.clone()));
        Ok(Some(value))
    }
}

impl<T> Default for Related<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Clones start with an empty cache
impl<T> Clone for Related<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Related<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Related")
            .field("cached_id", &self.cached_id())
            .finish()
    }
}
