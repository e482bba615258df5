//! Spellbook engine library.
//!
//! Spell slots, spell filters and known spells for one character session.
//!
//! ## Structure
//!
//! - `use_cases/` - Casting, filtering, known spells and the character session
//! - `stores/` - Session-lifetime catalog and spell detail caches
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - Command-line entry point
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Shared helpers for engine tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
