//! Spell catalog storage for the session.

use std::sync::Arc;

use tokio::sync::OnceCell;

use spellbook_domain::Spell;

use crate::infrastructure::ports::{DataError, SpellDataPort};

/// The full catalog, fetched on first use and kept for the session.
pub struct CatalogStore {
    data: Arc<dyn SpellDataPort>,
    catalog: OnceCell<Arc<Vec<Spell>>>,
}

impl CatalogStore {
    pub fn new(data: Arc<dyn SpellDataPort>) -> Self {
        Self {
            data,
            catalog: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<Arc<Vec<Spell>>, DataError> {
        self.catalog
            .get_or_try_init(|| async {
                let spells = self.data.fetch_all_spells().await?;
                tracing::info!(spells = spells.len(), "Loaded spell catalog");
                Ok::<_, DataError>(Arc::new(spells))
            })
            .await
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.initialized()
    }
}
