//! Spell entities as served by the spell-data service.
//!
//! `Spell` is the catalog summary used for listing, filtering and casting.
//! `SpellDetail` is the full reference record, fetched on demand and cached.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::SpellId;

/// Highest spell level in the slot progression.
pub const MAX_SPELL_LEVEL: u8 = 9;

/// A spell in the catalog.
///
/// Immutable once fetched; the catalog is the only source of these values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    /// Unique identifier for this spell
    pub id: SpellId,
    /// Display name of the spell
    pub name: String,
    /// Spell level (cantrip = 0)
    pub level: SpellLevel,
    /// Whether this spell requires concentration
    #[serde(default)]
    pub concentration: bool,
    /// Whether this spell can be cast as a ritual
    #[serde(default)]
    pub ritual: bool,
}

impl Spell {
    pub fn new(id: SpellId, name: impl Into<String>, level: SpellLevel) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            concentration: false,
            ritual: false,
        }
    }

    pub fn with_concentration(mut self, concentration: bool) -> Self {
        self.concentration = concentration;
        self
    }

    pub fn with_ritual(mut self, ritual: bool) -> Self {
        self.ritual = ritual;
        self
    }

    pub fn is_cantrip(&self) -> bool {
        self.level.is_cantrip()
    }
}

/// Spell level representation.
///
/// Serialized as the plain level number; `0` is a cantrip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SpellLevel {
    /// Cantrip (level 0 spell, can be cast at will)
    Cantrip,
    /// Leveled spell (1-9)
    Level(u8),
}

impl SpellLevel {
    /// Create a spell level, rejecting anything above 9.
    pub fn new(level: u8) -> Result<Self, DomainError> {
        match level {
            0 => Ok(SpellLevel::Cantrip),
            1..=MAX_SPELL_LEVEL => Ok(SpellLevel::Level(level)),
            _ => Err(DomainError::validation(format!(
                "Spell level must be between 0 and {}, got {}",
                MAX_SPELL_LEVEL, level
            ))),
        }
    }

    /// Convert to numeric level (cantrip = 0).
    pub fn as_number(&self) -> u8 {
        match self {
            SpellLevel::Cantrip => 0,
            SpellLevel::Level(n) => *n,
        }
    }

    /// Check if this is a cantrip.
    pub fn is_cantrip(&self) -> bool {
        matches!(self, SpellLevel::Cantrip)
    }
}

impl TryFrom<u8> for SpellLevel {
    type Error = DomainError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<SpellLevel> for u8 {
    fn from(level: SpellLevel) -> Self {
        level.as_number()
    }
}

impl fmt::Display for SpellLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellLevel::Cantrip => write!(f, "Cantrip"),
            SpellLevel::Level(n) => write!(f, "Lv {}", n),
        }
    }
}

/// The full reference record for a spell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpellDetail {
    /// The spell this record describes
    pub id: SpellId,
    pub name: String,
    pub level: SpellLevel,
    /// Range of the spell (e.g., "150 feet", "Self")
    pub range: String,
    /// How long it takes to cast (e.g., "1 action")
    pub casting_time: String,
    /// How long the spell lasts (e.g., "Instantaneous")
    pub duration: String,
    /// Component letters ("V", "S", "M")
    #[serde(default)]
    pub components: Vec<String>,
    /// Material component text, when the spell has one
    pub material: Option<String>,
    /// Description paragraphs, in order
    #[serde(default)]
    pub description: Vec<String>,
    /// Paragraphs describing effects when cast with a higher slot, in order
    #[serde(default)]
    pub higher_level: Vec<String>,
    #[serde(default)]
    pub concentration: bool,
    #[serde(default)]
    pub ritual: bool,
    /// School of magic (e.g., "Evocation")
    pub school: Option<String>,
    /// "ranged" / "melee" when the spell makes an attack roll
    pub attack_type: Option<String>,
}

impl SpellDetail {
    /// Components joined for display ("V, S, M").
    pub fn components_display(&self) -> String {
        self.components.join(", ")
    }

    pub fn has_higher_level_effects(&self) -> bool {
        !self.higher_level.is_empty()
    }
}
