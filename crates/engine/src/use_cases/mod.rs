//! Use cases - User story orchestration.
//!
//! Each module covers one area of the spellbook. `session` composes the
//! others around the selected character.

pub mod casting;
pub mod known_spells;
pub mod session;
pub mod spell_filter;

pub use casting::{CastOutcome, CastingError, CastingResourceManager};
pub use known_spells::{KnownSpellLedger, KnownSpells, LedgerError};
pub use session::{
    CharacterSession, LevelsSaved, Notice, SessionError, SessionOutcome, Severity,
};
pub use spell_filter::{FilterOutcome, SpellFilterPipeline};
