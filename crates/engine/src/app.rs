//! Application state and composition.

use std::sync::Arc;

use anyhow::Context;

use crate::infrastructure::{
    config::{AppConfig, DataSourceKind},
    in_memory::InMemorySpellData,
    ports::SpellDataPort,
    resilient::RetryingSpellData,
    spell_api::SpellApiClient,
};
use crate::stores::{CatalogStore, SpellDetailStore};
use crate::use_cases::{CharacterSession, SpellFilterPipeline};

/// Main application state.
///
/// Holds the data source, the session stores and the use cases built on them.
pub struct App {
    pub data: Arc<dyn SpellDataPort>,
    pub stores: Stores,
    pub use_cases: UseCases,
}

/// Values fetched once and kept for the session.
pub struct Stores {
    pub catalog: Arc<CatalogStore>,
    pub details: Arc<SpellDetailStore>,
}

/// Container for all use cases.
pub struct UseCases {
    pub session: Arc<CharacterSession>,
    pub spell_filter: Arc<SpellFilterPipeline>,
}

impl App {
    pub fn new(data: Arc<dyn SpellDataPort>, enforce_slot_cap: bool) -> Self {
        let catalog = Arc::new(CatalogStore::new(data.clone()));
        let details = Arc::new(SpellDetailStore::new(data.clone()));

        let session = Arc::new(CharacterSession::new(
            data.clone(),
            catalog.clone(),
            enforce_slot_cap,
        ));
        let spell_filter = Arc::new(SpellFilterPipeline::new(data.clone(), catalog.clone()));

        Self {
            data,
            stores: Stores { catalog, details },
            use_cases: UseCases {
                session,
                spell_filter,
            },
        }
    }

    /// Build the configured data source and compose the application on it.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let data: Arc<dyn SpellDataPort> = match config.data_source {
            DataSourceKind::Http => {
                let client = SpellApiClient::new(&config.api_url, config.http_timeout)
                    .with_token(config.api_token.clone());
                tracing::info!(
                    api_url = %config.api_url,
                    max_retries = config.retry.max_retries,
                    base_delay_ms = config.retry.base_delay_ms,
                    "Using spell data service"
                );
                Arc::new(RetryingSpellData::new(Arc::new(client), config.retry.clone()))
            }
            DataSourceKind::Memory => {
                let source = InMemorySpellData::load(&config.seed_path)
                    .await
                    .with_context(|| {
                        format!("loading seed data from {}", config.seed_path.display())
                    })?;
                Arc::new(source)
            }
        };
        Ok(Self::new(data, config.enforce_slot_cap))
    }
}
