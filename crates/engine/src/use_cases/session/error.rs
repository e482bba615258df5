//! Character session errors.

use spellbook_domain::{DomainError, SpellId};

use crate::infrastructure::ports::DataError;
use crate::use_cases::casting::CastingError;
use crate::use_cases::known_spells::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No character selected")]
    NoCharacter,

    #[error("Unknown character: {0}")]
    UnknownCharacter(String),

    #[error("{0} is not a known spell")]
    SpellNotKnown(SpellId),

    /// Rejected before reaching the data source
    #[error("Invalid input: {0}")]
    Validation(#[from] DomainError),

    #[error(transparent)]
    Casting(#[from] CastingError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Data source unavailable: {0}")]
    Data(#[from] DataError),
}
