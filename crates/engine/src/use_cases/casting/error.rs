//! Casting operation errors.

use spellbook_domain::{DomainError, SlotSelection, SpellId};

/// Errors that can occur while selecting slots and casting.
#[derive(Debug, thiserror::Error)]
pub enum CastingError {
    #[error("No slot selected")]
    NoSelection,

    #[error("{spell_id} cannot be cast with {selection}")]
    NotCastable {
        spell_id: SpellId,
        selection: SlotSelection,
    },

    /// Missing pool level or exhausted slots
    #[error("Slot error: {0}")]
    Slot(#[from] DomainError),
}
