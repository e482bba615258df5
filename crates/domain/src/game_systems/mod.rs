//! Game-rule tables used by the spellbook.
//!
//! Only D&D 5th Edition is supported: its slot progression feeds the
//! in-memory spell-data source, and its subclass list feeds the filter UI.

mod dnd5e;

pub use dnd5e::{
    caster_level, caster_type, pact_slots, slot_tables_for, spellcasting_slots, subclass_options,
    CasterType,
};
