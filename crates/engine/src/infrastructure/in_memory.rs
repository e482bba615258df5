//! Embedded spell-data source.
//!
//! Serves the whole port from an SRD-format spell file, for offline use and
//! for tests. Slot tables are computed locally with the 5e multiclass rule.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use uuid::Uuid;

use spellbook_domain::common::StringExt;
use spellbook_domain::{
    slot_tables_for, Character, CharacterId, CharacterName, ClassLevels, Spell, SpellDetail,
    SpellId, SpellLevel, SlotTables,
};

use crate::infrastructure::ports::{DataError, SpellDataPort};

/// Errors from reading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse seed data: {0}")]
    Parse(String),
}

/// Spell-data source held entirely in memory.
pub struct InMemorySpellData {
    catalog: Vec<Spell>,
    details: HashMap<SpellId, SpellDetail>,
    class_members: HashMap<String, Vec<SpellId>>,
    subclass_members: HashMap<String, Vec<SpellId>>,
    characters: DashMap<CharacterId, Character>,
    /// Known spells per character, in insertion order
    known: DashMap<CharacterId, Vec<SpellId>>,
}

impl InMemorySpellData {
    /// Load a seed file from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SeedError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        let source = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            spells = source.catalog.len(),
            characters = source.characters.len(),
            "Loaded spell seed data"
        );
        Ok(source)
    }

    /// Parse either a bare SRD spell array or `{"spells": [...], "characters": [...]}`.
    pub fn from_json_str(raw: &str) -> Result<Self, SeedError> {
        let seed: SeedFile =
            serde_json::from_str(raw).map_err(|e| SeedError::Parse(e.to_string()))?;
        let (spells, characters) = match seed {
            SeedFile::Spells(spells) => (spells, Vec::new()),
            SeedFile::Bundle { spells, characters } => (spells, characters),
        };

        let mut source = Self::empty();
        for seed_spell in spells {
            source.insert_seed_spell(seed_spell)?;
        }
        for seed_character in characters {
            let (character, spells) = seed_character.into_domain()?;
            let character_id = character.id();
            source.insert_character(character);
            for spell_id in spells {
                if !source.details.contains_key(&spell_id) {
                    return Err(SeedError::Parse(format!("Unknown spell index: {}", spell_id)));
                }
                let mut known = source.known.entry(character_id).or_default();
                if !known.contains(&spell_id) {
                    known.push(spell_id);
                }
            }
        }
        Ok(source)
    }

    fn empty() -> Self {
        Self {
            catalog: Vec::new(),
            details: HashMap::new(),
            class_members: HashMap::new(),
            subclass_members: HashMap::new(),
            characters: DashMap::new(),
            known: DashMap::new(),
        }
    }

    /// Add a character (replacing any with the same id).
    pub fn insert_character(&self, character: Character) {
        self.known.entry(character.id()).or_default();
        self.characters.insert(character.id(), character);
    }

    pub fn with_character(self, character: Character) -> Self {
        self.insert_character(character);
        self
    }

    fn insert_seed_spell(&mut self, seed: SeedSpell) -> Result<(), SeedError> {
        let id = SpellId::new(seed.index).map_err(|e| SeedError::Parse(e.to_string()))?;
        if self.details.contains_key(&id) {
            return Err(SeedError::Parse(format!("Duplicate spell index: {}", id)));
        }
        let level = SpellLevel::new(seed.level).map_err(|e| SeedError::Parse(e.to_string()))?;

        for class in &seed.classes {
            self.class_members
                .entry(class.name.trim().to_lowercase())
                .or_default()
                .push(id.clone());
        }
        for subclass in &seed.subclasses {
            self.subclass_members
                .entry(subclass.name.trim().to_lowercase())
                .or_default()
                .push(id.clone());
        }

        self.catalog.push(
            Spell::new(id.clone(), seed.name.clone(), level)
                .with_concentration(seed.concentration)
                .with_ritual(seed.ritual),
        );
        self.details.insert(
            id.clone(),
            SpellDetail {
                id,
                name: seed.name,
                level,
                range: seed.range,
                casting_time: seed.casting_time,
                duration: seed.duration,
                components: seed.components,
                material: seed.material.into_option(),
                description: seed.desc,
                higher_level: seed.higher_level,
                concentration: seed.concentration,
                ritual: seed.ritual,
                school: seed.school.map(|school| school.name).into_option(),
                attack_type: seed.attack_type.into_option(),
            },
        );
        Ok(())
    }

    fn spells_in(&self, ids: Option<&Vec<SpellId>>) -> Vec<Spell> {
        let Some(ids) = ids else {
            return Vec::new();
        };
        self.catalog
            .iter()
            .filter(|spell| ids.contains(&spell.id))
            .cloned()
            .collect()
    }

    fn require_character(&self, character_id: CharacterId) -> Result<(), DataError> {
        if self.characters.contains_key(&character_id) {
            Ok(())
        } else {
            Err(DataError::not_found("Character", character_id))
        }
    }
}

// =============================================================================
// Seed file format (SRD spells.json)
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SeedFile {
    Spells(Vec<SeedSpell>),
    Bundle {
        spells: Vec<SeedSpell>,
        #[serde(default)]
        characters: Vec<SeedCharacter>,
    },
}

#[derive(Debug, Deserialize)]
struct SeedSpell {
    index: String,
    name: String,
    level: u8,
    #[serde(default)]
    desc: Vec<String>,
    #[serde(default)]
    higher_level: Vec<String>,
    #[serde(default)]
    range: String,
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    ritual: bool,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    concentration: bool,
    #[serde(default)]
    casting_time: String,
    #[serde(default)]
    attack_type: Option<String>,
    #[serde(default)]
    school: Option<NamedRef>,
    #[serde(default)]
    classes: Vec<NamedRef>,
    #[serde(default)]
    subclasses: Vec<NamedRef>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeedCharacter {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    #[serde(default)]
    class_levels: ClassLevels,
    #[serde(default)]
    spells: Vec<String>,
}

impl SeedCharacter {
    fn into_domain(self) -> Result<(Character, Vec<SpellId>), SeedError> {
        let name = CharacterName::new(self.name).map_err(|e| SeedError::Parse(e.to_string()))?;
        let id = self.id.map(CharacterId::from_uuid).unwrap_or_default();
        let spells = self
            .spells
            .into_iter()
            .map(SpellId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| SeedError::Parse(e.to_string()))?;
        let character = Character::new(name)
            .with_id(id)
            .with_class_levels(self.class_levels);
        Ok((character, spells))
    }
}

#[async_trait]
impl SpellDataPort for InMemorySpellData {
    async fn fetch_characters(&self) -> Result<Vec<Character>, DataError> {
        let mut characters: Vec<Character> = self
            .characters
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        characters.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Ok(characters)
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
        character_id: CharacterId,
        name: &CharacterName,
        class_levels: &ClassLevels,
    ) -> Result<(), DataError> {
        let mut character = self
            .characters
            .get_mut(&character_id)
            .ok_or_else(|| DataError::not_found("Character", character_id))?;
        character.replace_class_levels(name.clone(), class_levels.clone());
        Ok(())
    }

    async fn fetch_known_spells(&self, character_id: CharacterId) -> Result<Vec<Spell>, DataError> {
        self.require_character(character_id)?;
        let ids = self
            .known
            .get(&character_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.catalog.iter().find(|spell| &spell.id == id).cloned())
            .collect())
    }

    async fn add_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        self.require_character(character_id)?;
        if !self.details.contains_key(spell_id) {
            return Err(DataError::not_found("Spell", spell_id));
        }
        let mut known = self.known.entry(character_id).or_default();
        if !known.contains(spell_id) {
            known.push(spell_id.clone());
        }
        Ok(())
    }

    async fn remove_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        self.require_character(character_id)?;
        if let Some(mut known) = self.known.get_mut(&character_id) {
            known.retain(|id| id != spell_id);
        }
        Ok(())
    }

    async fn fetch_all_spells(&self) -> Result<Vec<Spell>, DataError> {
        Ok(self.catalog.clone())
    }

    async fn fetch_spells_by_class(&self, class: &str) -> Result<Vec<Spell>, DataError> {
        Ok(self.spells_in(self.class_members.get(&class.trim().to_lowercase())))
    }

    async fn fetch_spells_by_subclass(&self, subclass: &str) -> Result<Vec<Spell>, DataError> {
        Ok(self.spells_in(self.subclass_members.get(&subclass.trim().to_lowercase())))
    }

    async fn fetch_spell_detail(&self, spell_id: &SpellId) -> Result<SpellDetail, DataError> {
        self.details
            .get(spell_id)
            .cloned()
            .ok_or_else(|| DataError::not_found("Spell", spell_id))
    }
}
