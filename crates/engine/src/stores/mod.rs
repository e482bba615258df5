//! In-memory state storage modules.
//!
//! Stores hold session state that never goes back to the spell-data service:
//! - `SpellDetailStore` - per-spell reference records, fetched once
//! - `CatalogStore` - the full spell catalog, fetched once

pub mod catalog;
pub mod spell_details;

// Re-export store types
pub use catalog::CatalogStore;
pub use spell_details::SpellDetailStore;
