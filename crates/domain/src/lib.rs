//! Spellbook domain: spells, characters, slot pools and spell filters.
//!
//! Everything here is pure. Talking to the spell-data service, caching and
//! ordering of asynchronous results live in `spellbook-engine`.

pub mod common;
pub mod entities;
pub mod error;
pub mod game_systems;
pub mod ids;
pub mod value_objects;

pub use entities::{Character, Spell, SpellDetail, SpellLevel, MAX_SPELL_LEVEL};

pub use error::DomainError;

pub use game_systems::{caster_type, slot_tables_for, subclass_options, CasterType};

pub use ids::{CharacterId, SpellId};

pub use value_objects::{
    compare_spells, derive_slot_pools, filter_spells, parse_assignment, parse_level, sort_spells,
    CharacterName, ClassLevels, MembershipFilter, ResourceClass, RestType, SlotLevel, SlotPool,
    SlotPools, SlotSelection, SlotTable, SlotTables, SpellFilter, MAX_CLASS_LEVEL,
    MIN_CLASS_LEVEL,
};
