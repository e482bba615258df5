//! Known spells use cases.
//!
//! Add and remove go through the data source first; the local ledger only
//! changes once the write has succeeded.

mod error;
mod ledger;

pub use error::LedgerError;
pub use ledger::KnownSpellLedger;

use std::sync::Arc;

use spellbook_domain::{CharacterId, SpellId};

use crate::infrastructure::ports::{DataError, SpellDataPort};
use crate::stores::CatalogStore;

pub struct KnownSpells {
    data: Arc<dyn SpellDataPort>,
    catalog: Arc<CatalogStore>,
}

impl KnownSpells {
    pub fn new(data: Arc<dyn SpellDataPort>, catalog: Arc<CatalogStore>) -> Self {
        Self { data, catalog }
    }

    pub async fn load(&self, character_id: CharacterId) -> Result<KnownSpellLedger, DataError> {
        let spells = self.data.fetch_known_spells(character_id).await?;
        Ok(KnownSpellLedger::new(character_id, spells))
    }

    /// Persist a new known spell and return the updated ledger.
    ///
    /// The ledger is re-read from the data source after the write. If that
    /// read fails the spell is appended locally instead.
    pub async fn add(
        &self,
        ledger: &KnownSpellLedger,
        spell_id: &SpellId,
    ) -> Result<KnownSpellLedger, LedgerError> {
        let character_id = ledger.character_id();
        if ledger.contains(spell_id) {
            tracing::debug!(character_id = %character_id, spell_id = %spell_id, "Spell already known");
            return Ok(ledger.clone());
        }

        let catalog = self.catalog.get().await?;
        let spell = catalog
            .iter()
            .find(|spell| &spell.id == spell_id)
            .cloned()
            .ok_or_else(|| LedgerError::UnknownSpell(spell_id.clone()))?;

        self.data.add_known_spell(character_id, spell_id).await?;
        tracing::info!(character_id = %character_id, spell_id = %spell_id, "Learned spell");

        match self.load(character_id).await {
            Ok(refreshed) => Ok(refreshed),
            Err(e) => {
                tracing::warn!(
                    character_id = %character_id,
                    error = %e,
                    "Known spell refresh failed; appending locally"
                );
                Ok(ledger.with_spell(spell))
            }
        }
    }

    /// Delete a known spell. On failure the caller keeps its ledger.
    pub async fn remove(
        &self,
        ledger: &KnownSpellLedger,
        spell_id: &SpellId,
    ) -> Result<KnownSpellLedger, LedgerError> {
        let character_id = ledger.character_id();
        if !ledger.contains(spell_id) {
            return Err(LedgerError::NotKnown(spell_id.clone()));
        }

        self.data.remove_known_spell(character_id, spell_id).await?;
        tracing::info!(character_id = %character_id, spell_id = %spell_id, "Forgot spell");
        Ok(ledger.without(spell_id))
    }
}
