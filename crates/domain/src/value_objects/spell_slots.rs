//! Spell slot pools.
//!
//! A character has two independently recovering pools:
//! - the full-caster pool, restored only by a long rest
//! - the pact-magic pool, restored by short and long rests
//!
//! Pools are always derived from slot tables with [`derive_slot_pools`]; they
//! are rebuilt rather than patched when the character or its levels change.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::{Spell, MAX_SPELL_LEVEL};
use crate::error::DomainError;

/// Which pool a slot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceClass {
    /// Spell slots restored on a long rest
    FullCaster,
    /// Warlock pact-magic slots restored on any rest
    Pact,
}

impl ResourceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceClass::FullCaster => "full",
            ResourceClass::Pact => "pact",
        }
    }

    /// Whether a short rest restores this pool.
    pub fn recovers_on_short_rest(&self) -> bool {
        matches!(self, ResourceClass::Pact)
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResourceClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "full-caster" | "full_caster" | "fullcaster" => Ok(Self::FullCaster),
            "pact" | "warlock" => Ok(Self::Pact),
            other => Err(DomainError::parse(format!("Unknown resource class: {}", other))),
        }
    }
}

/// Slot capacity per level, as produced by the slot progression tables.
pub type SlotTable = BTreeMap<u8, u8>;

/// Slot tables for both resource classes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTables {
    #[serde(default)]
    pub full_caster_slots: SlotTable,
    #[serde(default)]
    pub pact_slots: SlotTable,
}

impl SlotTables {
    pub fn table(&self, resource_class: ResourceClass) -> &SlotTable {
        match resource_class {
            ResourceClass::FullCaster => &self.full_caster_slots,
            ResourceClass::Pact => &self.pact_slots,
        }
    }
}

/// One slot level of a pool. Invariant: `used <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotLevel {
    level: u8,
    max: u8,
    used: u8,
}

impl SlotLevel {
    /// Create a fresh slot level with nothing expended.
    pub fn new(level: u8, max: u8) -> Self {
        Self { level, max, used: 0 }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn used(&self) -> u8 {
        self.used
    }

    /// Slots still available at this level.
    pub fn remaining(&self) -> u8 {
        self.max - self.used
    }

    pub fn is_exhausted(&self) -> bool {
        self.used >= self.max
    }

    /// Expend one slot.
    ///
    /// With `enforce_cap` an exhausted level is rejected; without it the count
    /// saturates at `max`.
    pub fn expend(&mut self, enforce_cap: bool) -> Result<(), DomainError> {
        if self.is_exhausted() {
            if enforce_cap {
                return Err(DomainError::slots_exhausted(self.level, self.used, self.max));
            }
            return Ok(());
        }
        self.used += 1;
        Ok(())
    }

    pub fn restore(&mut self) {
        self.used = 0;
    }
}

impl fmt::Display for SlotLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lv {}: {}/{}", self.level, self.remaining(), self.max)
    }
}

/// Slots of a single resource class, keyed by slot level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPool {
    resource_class: ResourceClass,
    levels: BTreeMap<u8, SlotLevel>,
}

impl SlotPool {
    pub fn empty(resource_class: ResourceClass) -> Self {
        Self {
            resource_class,
            levels: BTreeMap::new(),
        }
    }

    /// Build a pool with `used = 0` at every level of the table.
    ///
    /// Levels outside 1-9 and zero-capacity entries do not become keys.
    pub fn from_table(resource_class: ResourceClass, table: &SlotTable) -> Self {
        let levels = table
            .iter()
            .filter(|(level, max)| (1..=MAX_SPELL_LEVEL).contains(*level) && **max > 0)
            .map(|(level, max)| (*level, SlotLevel::new(*level, *max)))
            .collect();
        Self {
            resource_class,
            levels,
        }
    }

    pub fn resource_class(&self) -> ResourceClass {
        self.resource_class
    }

    pub fn get(&self, level: u8) -> Option<&SlotLevel> {
        self.levels.get(&level)
    }

    pub fn contains(&self, level: u8) -> bool {
        self.levels.contains_key(&level)
    }

    /// Slot levels in ascending order.
    pub fn levels(&self) -> impl Iterator<Item = &SlotLevel> {
        self.levels.values()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Expend one slot at `level`.
    pub fn expend(&mut self, level: u8, enforce_cap: bool) -> Result<(), DomainError> {
        let pool = self.resource_class;
        self.levels
            .get_mut(&level)
            .ok_or_else(|| DomainError::slot_unavailable(pool.as_str(), level))?
            .expend(enforce_cap)
    }

    /// Set `used = 0` at every level.
    pub fn restore_all(&mut self) {
        for slot in self.levels.values_mut() {
            slot.restore();
        }
    }
}

/// Both pools of one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotPools {
    pub full_caster: SlotPool,
    pub pact: SlotPool,
}

impl SlotPools {
    pub fn empty() -> Self {
        Self {
            full_caster: SlotPool::empty(ResourceClass::FullCaster),
            pact: SlotPool::empty(ResourceClass::Pact),
        }
    }

    pub fn pool(&self, resource_class: ResourceClass) -> &SlotPool {
        match resource_class {
            ResourceClass::FullCaster => &self.full_caster,
            ResourceClass::Pact => &self.pact,
        }
    }

    pub fn pool_mut(&mut self, resource_class: ResourceClass) -> &mut SlotPool {
        match resource_class {
            ResourceClass::FullCaster => &mut self.full_caster,
            ResourceClass::Pact => &mut self.pact,
        }
    }

    /// Restore every pool the rest recovers.
    pub fn recover(&mut self, rest: RestType) {
        for resource_class in [ResourceClass::FullCaster, ResourceClass::Pact] {
            if rest == RestType::Long || resource_class.recovers_on_short_rest() {
                self.pool_mut(resource_class).restore_all();
            }
        }
    }
}

/// Rest type for resource recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RestType {
    /// Short rest (typically 1 hour)
    Short,
    /// Long rest (typically 8 hours)
    Long,
}

impl fmt::Display for RestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestType::Short => write!(f, "short rest"),
            RestType::Long => write!(f, "long rest"),
        }
    }
}

impl Default for SlotPools {
    fn default() -> Self {
        Self::empty()
    }
}

/// Build both pools from slot tables. Pure: the same tables give the same pools.
pub fn derive_slot_pools(tables: &SlotTables) -> SlotPools {
    SlotPools {
        full_caster: SlotPool::from_table(ResourceClass::FullCaster, &tables.full_caster_slots),
        pact: SlotPool::from_table(ResourceClass::Pact, &tables.pact_slots),
    }
}

/// The slot the user picked to cast with.
///
/// Level 0 is the cantrip sentinel: it never touches a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSelection {
    pub resource_class: ResourceClass,
    pub level: u8,
}

impl SlotSelection {
    pub fn new(resource_class: ResourceClass, level: u8) -> Self {
        Self {
            resource_class,
            level,
        }
    }

    /// The cantrip selection.
    pub fn cantrips() -> Self {
        Self::new(ResourceClass::FullCaster, 0)
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    /// Whether `spell` may be cast with this selection.
    ///
    /// The cantrip selection only offers cantrips. A leveled slot offers
    /// leveled spells up to its level; cantrips never spend a slot.
    pub fn admits(&self, spell: &Spell) -> bool {
        let spell_level = spell.level.as_number();
        if self.is_cantrip() {
            return spell_level == 0;
        }
        spell_level > 0 && spell_level <= self.level
    }
}

impl fmt::Display for SlotSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cantrip() {
            write!(f, "cantrips")
        } else {
            write!(f, "{} level {}", self.resource_class, self.level)
        }
    }
}
