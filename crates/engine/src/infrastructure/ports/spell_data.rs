//! The spell-data service port.

use async_trait::async_trait;
use spellbook_domain::{
    Character, CharacterId, CharacterName, ClassLevels, Spell, SpellDetail, SpellId, SlotTables,
};

use super::error::DataError;

/// Catalog, membership lists, slot tables and per-character persistence.
///
/// Game-rule content lives behind this port; the engine never decides which
/// spells exist or which class may learn them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpellDataPort: Send + Sync {
    // Characters
    async fn fetch_characters(&self) -> Result<Vec<Character>, DataError>;

    /// Slot tables for a character. HTTP backends resolve the levels
    /// server-side from `character_id`; embedded sources use `class_levels`.
    async fn fetch_slot_tables(
        &self,
        character_id: CharacterId,
        class_levels: &ClassLevels,
    ) -> Result<SlotTables, DataError>;

    /// Replace name and class levels in one write. Either everything is
    /// stored or nothing is.
    async fn save_class_levels(
        &self,
        character_id: CharacterId,
        name: &CharacterName,
        class_levels: &ClassLevels,
    ) -> Result<(), DataError>;

    // Known spells
    async fn fetch_known_spells(&self, character_id: CharacterId) -> Result<Vec<Spell>, DataError>;
    async fn add_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError>;
    async fn remove_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError>;

    // Catalog
    async fn fetch_all_spells(&self) -> Result<Vec<Spell>, DataError>;
    async fn fetch_spells_by_class(&self, class: &str) -> Result<Vec<Spell>, DataError>;
    async fn fetch_spells_by_subclass(&self, subclass: &str) -> Result<Vec<Spell>, DataError>;
    async fn fetch_spell_detail(&self, spell_id: &SpellId) -> Result<SpellDetail, DataError>;
}
