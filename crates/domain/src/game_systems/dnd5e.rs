//! D&D 5th Edition spell slot progression.

use crate::value_objects::{ClassLevels, SlotTable, SlotTables};

/// How a class gains spell slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasterType {
    /// Full caster (Wizard, Cleric, Druid, Sorcerer, Bard)
    Full,
    /// Half caster (Paladin, Ranger)
    Half,
    /// Third caster (Eldritch Knight, Arcane Trickster)
    Third,
    /// Pact magic (Warlock)
    Pact,
}

impl CasterType {
    /// Levels this class contributes to the multiclass caster level.
    pub fn effective_caster_levels(&self, class_level: u8) -> u8 {
        match self {
            CasterType::Full => class_level,
            CasterType::Half => class_level / 2,
            CasterType::Third => class_level / 3,
            CasterType::Pact => 0, // Warlock slots are tracked in their own pool
        }
    }
}

pub fn caster_type(class: &str) -> Option<CasterType> {
    match class.trim().to_lowercase().as_str() {
        "wizard" | "cleric" | "druid" | "sorcerer" | "bard" => Some(CasterType::Full),
        "paladin" | "ranger" => Some(CasterType::Half),
        "warlock" => Some(CasterType::Pact),
        "eldritch knight" | "arcane trickster" => Some(CasterType::Third),
        _ => None,
    }
}

/// Combined caster level across all non-pact spellcasting classes.
pub fn caster_level(class_levels: &ClassLevels) -> u8 {
    class_levels
        .iter()
        .filter_map(|(class, level)| {
            caster_type(class).map(|caster| caster.effective_caster_levels(level))
        })
        .fold(0u8, u8::saturating_add)
}

/// Slots of the long-rest pool.
///
/// A character with a single spellcasting class uses that class's own table;
/// with several, the combined caster level indexes the full-caster table.
pub fn spellcasting_slots(class_levels: &ClassLevels) -> SlotTable {
    let casters: Vec<(CasterType, u8)> = class_levels
        .iter()
        .filter_map(|(class, level)| caster_type(class).map(|caster| (caster, level)))
        .filter(|(caster, _)| *caster != CasterType::Pact)
        .collect();

    match casters.as_slice() {
        [] => SlotTable::new(),
        [(CasterType::Half, level)] => half_caster_slots(*level),
        [(CasterType::Third, level)] => third_caster_slots(*level),
        [(_, level)] => full_caster_slots(*level),
        _ => full_caster_slots(caster_level(class_levels).min(20)),
    }
}

/// Slots of the pact-magic pool, indexed by warlock level.
pub fn pact_slots(class_levels: &ClassLevels) -> SlotTable {
    let warlock_level = class_levels
        .iter()
        .filter(|(class, _)| caster_type(class) == Some(CasterType::Pact))
        .map(|(_, level)| level)
        .max()
        .unwrap_or(0);
    warlock_slots(warlock_level)
}

pub fn slot_tables_for(class_levels: &ClassLevels) -> SlotTables {
    SlotTables {
        full_caster_slots: spellcasting_slots(class_levels),
        pact_slots: pact_slots(class_levels),
    }
}

/// Subclasses with their own spell list, per class.
pub fn subclass_options(class: &str) -> &'static [&'static str] {
    match class.trim().to_lowercase().as_str() {
        "cleric" => &["life"],
        "druid" => &["land"],
        "paladin" => &["devotion"],
        "sorcerer" => &["draconic"],
        "warlock" => &["fiend"],
        _ => &[],
    }
}

// Spell slot progression tables

fn table_row(rows: &[(u8, &[u8])], level: u8) -> SlotTable {
    rows.iter()
        .find(|(l, _)| *l == level)
        .map(|(_, s)| {
            s.iter()
                .enumerate()
                .map(|(i, &count)| ((i + 1) as u8, count))
                .collect()
        })
        .unwrap_or_default()
}

fn full_caster_slots(level: u8) -> SlotTable {
    let slots: &[(u8, &[u8])] = &[
        (1, &[2]),
        (2, &[3]),
        (3, &[4, 2]),
        (4, &[4, 3]),
        (5, &[4, 3, 2]),
        (6, &[4, 3, 3]),
        (7, &[4, 3, 3, 1]),
        (8, &[4, 3, 3, 2]),
        (9, &[4, 3, 3, 3, 1]),
        (10, &[4, 3, 3, 3, 2]),
        (11, &[4, 3, 3, 3, 2, 1]),
        (12, &[4, 3, 3, 3, 2, 1]),
        (13, &[4, 3, 3, 3, 2, 1, 1]),
        (14, &[4, 3, 3, 3, 2, 1, 1]),
        (15, &[4, 3, 3, 3, 2, 1, 1, 1]),
        (16, &[4, 3, 3, 3, 2, 1, 1, 1]),
        (17, &[4, 3, 3, 3, 2, 1, 1, 1, 1]),
        (18, &[4, 3, 3, 3, 3, 1, 1, 1, 1]),
        (19, &[4, 3, 3, 3, 3, 2, 1, 1, 1]),
        (20, &[4, 3, 3, 3, 3, 2, 2, 1, 1]),
    ];
    table_row(slots, level)
}

fn half_caster_slots(level: u8) -> SlotTable {
    // Half casters get slots at half rate (starting at level 2)
    let slots: &[(u8, &[u8])] = &[
        (2, &[2]),
        (3, &[3]),
        (4, &[3]),
        (5, &[4, 2]),
        (6, &[4, 2]),
        (7, &[4, 3]),
        (8, &[4, 3]),
        (9, &[4, 3, 2]),
        (10, &[4, 3, 2]),
        (11, &[4, 3, 3]),
        (12, &[4, 3, 3]),
        (13, &[4, 3, 3, 1]),
        (14, &[4, 3, 3, 1]),
        (15, &[4, 3, 3, 2]),
        (16, &[4, 3, 3, 2]),
        (17, &[4, 3, 3, 3, 1]),
        (18, &[4, 3, 3, 3, 1]),
        (19, &[4, 3, 3, 3, 2]),
        (20, &[4, 3, 3, 3, 2]),
    ];
    table_row(slots, level)
}

fn third_caster_slots(level: u8) -> SlotTable {
    let slots: &[(u8, &[u8])] = &[
        (3, &[2]),
        (4, &[3]),
        (5, &[3]),
        (6, &[3]),
        (7, &[4, 2]),
        (8, &[4, 2]),
        (9, &[4, 2]),
        (10, &[4, 3]),
        (11, &[4, 3]),
        (12, &[4, 3]),
        (13, &[4, 3, 2]),
        (14, &[4, 3, 2]),
        (15, &[4, 3, 2]),
        (16, &[4, 3, 3]),
        (17, &[4, 3, 3]),
        (18, &[4, 3, 3]),
        (19, &[4, 3, 3, 1]),
        (20, &[4, 3, 3, 1]),
    ];
    table_row(slots, level)
}

fn warlock_slots(level: u8) -> SlotTable {
    // Fewer slots, all at the highest slot level available
    let (count, slot_level) = match level {
        1 => (1, 1),
        2 => (2, 1),
        3..=4 => (2, 2),
        5..=6 => (2, 3),
        7..=8 => (2, 4),
        9..=10 => (2, 5),
        11..=16 => (3, 5),
        17..=20 => (4, 5),
        _ => (0, 0),
    };

    let mut slots = SlotTable::new();
    if count > 0 {
        slots.insert(slot_level, count);
    }
    slots
}
