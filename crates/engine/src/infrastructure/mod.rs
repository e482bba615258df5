//! Infrastructure implementations.
//!
//! Contains port trait implementations for the spell-data service and the
//! runtime plumbing around them.

pub mod cache;
pub mod config;
pub mod in_memory;
pub mod ports;
pub mod resilient;
pub mod spell_api;
