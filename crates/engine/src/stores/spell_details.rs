//! Spell detail storage for the session.
//!
//! Details never change within a session, so entries are never invalidated.

use std::sync::Arc;

use spellbook_domain::{SpellDetail, SpellId};

use crate::infrastructure::cache::MemoCache;
use crate::infrastructure::ports::{DataError, SpellDataPort};

/// Lazily populated store of spell details.
pub struct SpellDetailStore {
    data: Arc<dyn SpellDataPort>,
    inner: MemoCache<SpellId, SpellDetail>,
}

impl SpellDetailStore {
    pub fn new(data: Arc<dyn SpellDataPort>) -> Self {
        Self {
            data,
            inner: MemoCache::new(),
        }
    }

    /// Cached detail, or fetched and stored on first access.
    ///
    /// Concurrent requests for one uncached id share a single fetch. A
    /// failed fetch leaves nothing behind.
    pub async fn get(&self, spell_id: &SpellId) -> Result<SpellDetail, DataError> {
        self.inner
            .get_or_try_init(spell_id.clone(), || async {
                tracing::debug!(spell_id = %spell_id, "Fetching spell detail");
                self.data.fetch_spell_detail(spell_id).await
            })
            .await
    }

    /// Detail if already cached; never fetches.
    pub fn peek(&self, spell_id: &SpellId) -> Option<SpellDetail> {
        self.inner.get(spell_id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
