//! Port traits for infrastructure boundaries.
//!
//! The spell-data service is the only external dependency of the engine, so
//! it is the only abstraction here. Everything else is concrete types.

mod error;
mod spell_data;

pub use error::DataError;
pub use spell_data::SpellDataPort;

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use spell_data::MockSpellDataPort;
