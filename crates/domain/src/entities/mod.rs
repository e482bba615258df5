//! Domain entities - Core business objects with identity

mod character;
mod spell;

pub use character::Character;
pub use spell::{Spell, SpellDetail, SpellLevel, MAX_SPELL_LEVEL};
