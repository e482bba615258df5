//! Small pure helpers shared by the domain and engine crates.
//!
//! No I/O here; everything is a plain function over strings.

pub mod collation;
pub mod string;

pub use collation::{collation_key, compare_names};
pub use string::{none_if_blank, some_if_not_blank, StringExt};
