//! Shared helpers for engine tests.
//!
//! Mock-based tests use `MockSpellDataPort`. Tests about the ordering of
//! overlapping requests need to decide when each request completes, which
//! is what [`GatedSpellData`] is for.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use spellbook_domain::{
    slot_tables_for, Character, CharacterId, CharacterName, ClassLevels, SlotTables, Spell,
    SpellDetail, SpellId, SpellLevel,
};

use crate::infrastructure::ports::{DataError, SpellDataPort};

// =============================================================================
// Builders
// =============================================================================

pub fn spell(id: &str, name: &str, level: u8) -> Spell {
    Spell::new(SpellId::new(id).unwrap(), name, SpellLevel::new(level).unwrap())
}

pub fn spell_id(value: &str) -> SpellId {
    SpellId::new(value).unwrap()
}

pub fn character(name: &str, levels: &[(&str, u8)]) -> Character {
    Character::new(CharacterName::new(name).unwrap())
        .with_class_levels(ClassLevels::from_pairs(levels.iter().copied()).unwrap())
}

pub fn ids(spells: &[Spell]) -> Vec<&str> {
    spells.iter().map(|s| s.id.as_str()).collect()
}

/// A small SRD-like catalog.
pub fn srd_catalog() -> Vec<Spell> {
    vec![
        spell("fireball", "Fireball", 3),
        spell("detect-magic", "Detect Magic", 1)
            .with_concentration(true)
            .with_ritual(true),
        spell("fire-bolt", "Fire Bolt", 0),
        spell("cure-wounds", "Cure Wounds", 1),
        spell("shield", "Shield", 1),
        spell("misty-step", "Misty Step", 2),
    ]
}

// =============================================================================
// Gated data source
// =============================================================================

type Gate = oneshot::Receiver<Result<Vec<Spell>, DataError>>;

/// Data source whose gated lookups wait until the test releases them.
///
/// Gated keys are `class:<name>` for class membership and `known:<id>` for
/// known-spell lists. Every gated call reports its key on the `started`
/// channel before waiting. Ungated known-spell lookups answer from the
/// in-memory lists; slot tables follow the 5e progression.
pub struct GatedSpellData {
    catalog: Vec<Spell>,
    characters: Vec<Character>,
    known: Mutex<HashMap<CharacterId, Vec<Spell>>>,
    gates: Mutex<HashMap<String, Gate>>,
    started: mpsc::UnboundedSender<String>,
}

impl GatedSpellData {
    pub fn new(catalog: Vec<Spell>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (started, started_rx) = mpsc::unbounded_channel();
        (
            Self {
                catalog,
                characters: Vec::new(),
                known: Mutex::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
                started,
            },
            started_rx,
        )
    }

    pub fn with_character(mut self, character: Character, known: Vec<Spell>) -> Self {
        self.known.lock().unwrap().insert(character.id(), known);
        self.characters.push(character);
        self
    }

    /// Hold the next lookup for `key` until the returned sender fires.
    pub fn gate(&self, key: impl Into<String>) -> oneshot::Sender<Result<Vec<Spell>, DataError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.into(), rx);
        tx
    }

    async fn wait_for(&self, key: String) -> Option<Result<Vec<Spell>, DataError>> {
        let gate = self.gates.lock().unwrap().remove(&key);
        let gate = gate?;
        let _ = self.started.send(key.clone());
        Some(
            gate.await
                .unwrap_or_else(|_| Err(DataError::unavailable("gate", "sender dropped"))),
        )
    }
}

fn unsupported<T>(operation: &'static str) -> Result<T, DataError> {
    Err(DataError::unavailable(operation, "not supported by the gated source"))
}

#[async_trait]
impl SpellDataPort for GatedSpellData {
    async fn fetch_characters(&self) -> Result<Vec<Character>, DataError> {
        Ok(self.characters.clone())
    }

    async fn fetch_slot_tables(
        &self,
        _character_id: CharacterId,
        class_levels: &ClassLevels,
    ) -> Result<SlotTables, DataError> {
        Ok(slot_tables_for(class_levels))
    }

    async fn save_class_levels(
        &self,
        _character_id: CharacterId,
        _name: &CharacterName,
        _class_levels: &ClassLevels,
    ) -> Result<(), DataError> {
        Ok(())
    }

    async fn fetch_known_spells(&self, character_id: CharacterId) -> Result<Vec<Spell>, DataError> {
        if let Some(gated) = self.wait_for(format!("known:{}", character_id)).await {
            return gated;
        }
        Ok(self
            .known
            .lock()
            .unwrap()
            .get(&character_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        let spell = self
            .catalog
            .iter()
            .find(|spell| &spell.id == spell_id)
            .cloned()
            .ok_or_else(|| DataError::not_found("Spell", spell_id.to_string()))?;
        self.known
            .lock()
            .unwrap()
            .entry(character_id)
            .or_default()
            .push(spell);
        Ok(())
    }

    async fn remove_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        if let Some(spells) = self.known.lock().unwrap().get_mut(&character_id) {
            spells.retain(|spell| &spell.id != spell_id);
        }
        Ok(())
    }

    async fn fetch_all_spells(&self) -> Result<Vec<Spell>, DataError> {
        Ok(self.catalog.clone())
    }

    async fn fetch_spells_by_class(&self, class: &str) -> Result<Vec<Spell>, DataError> {
        match self.wait_for(format!("class:{}", class)).await {
            Some(gated) => gated,
            None => unsupported("fetch_spells_by_class"),
        }
    }

    async fn fetch_spells_by_subclass(&self, _subclass: &str) -> Result<Vec<Spell>, DataError> {
        unsupported("fetch_spells_by_subclass")
    }

    async fn fetch_spell_detail(&self, _spell_id: &SpellId) -> Result<SpellDetail, DataError> {
        unsupported("fetch_spell_detail")
    }
}
