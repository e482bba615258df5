//! Known-spell ledger errors.

use spellbook_domain::SpellId;

use crate::infrastructure::ports::DataError;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Spell not in catalog: {0}")]
    UnknownSpell(SpellId),

    #[error("Spell is not known by this character: {0}")]
    NotKnown(SpellId),

    #[error("Data error: {0}")]
    Data(#[from] DataError),
}
