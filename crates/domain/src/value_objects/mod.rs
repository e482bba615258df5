//! Value objects - Immutable objects defined by their attributes

mod class_levels;
mod names;
mod spell_filter;
mod spell_slots;

// Character progression
pub use class_levels::{parse_assignment, parse_level, ClassLevels, MAX_CLASS_LEVEL, MIN_CLASS_LEVEL};
pub use names::CharacterName;

// Spell slots and casting selection
pub use spell_slots::{
    derive_slot_pools, ResourceClass, RestType, SlotLevel, SlotPool, SlotPools, SlotSelection,
    SlotTable, SlotTables,
};

// Spell filtering
pub use spell_filter::{compare_spells, filter_spells, sort_spells, MembershipFilter, SpellFilter};
