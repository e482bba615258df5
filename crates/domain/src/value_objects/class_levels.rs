//! Class levels of a character.
//!
//! A character may multiclass, so levels are kept per class. Class names are
//! normalized to lowercase; every level is in `1..=20`. The mapping is only
//! ever replaced as a whole (see `Character::replace_class_levels`).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

pub const MIN_CLASS_LEVEL: u8 = 1;
pub const MAX_CLASS_LEVEL: u8 = 20;

/// Mapping from lowercase class name to class level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u8>", into = "BTreeMap<String, u8>")]
pub struct ClassLevels(BTreeMap<String, u8>);

impl ClassLevels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(class, level)` pairs, validating each one.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        let mut levels = Self::new();
        for (class, level) in pairs {
            levels.set(class, level)?;
        }
        Ok(levels)
    }

    /// Set the level of a class, adding the class if it is new.
    pub fn set(&mut self, class: impl Into<String>, level: u8) -> Result<(), DomainError> {
        let class = normalize_class(class)?;
        validate_level(level)?;
        self.0.insert(class, level);
        Ok(())
    }

    /// Builder form of [`ClassLevels::set`].
    pub fn with(mut self, class: impl Into<String>, level: u8) -> Result<Self, DomainError> {
        self.set(class, level)?;
        Ok(self)
    }

    /// Apply a `class=level` assignment typed by the user.
    pub fn apply_assignment(&mut self, input: &str) -> Result<(), DomainError> {
        let (class, level) = parse_assignment(input)?;
        self.0.insert(class, level);
        Ok(())
    }

    pub fn get(&self, class: &str) -> Option<u8> {
        self.0.get(&class.trim().to_lowercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(class, level)| (class.as_str(), *level))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Sum of all class levels.
    pub fn total_level(&self) -> u32 {
        self.0.values().map(|level| u32::from(*level)).sum()
    }
}

/// Parse a class level typed by the user (e.g. in the level editor).
pub fn parse_level(input: &str) -> Result<u8, DomainError> {
    let trimmed = input.trim();
    let level: i64 = trimmed.parse().map_err(|_| {
        DomainError::validation(format!("Level must be a number, got '{}'", trimmed))
    })?;
    match u8::try_from(level) {
        Ok(level) => {
            validate_level(level)?;
            Ok(level)
        }
        Err(_) => Err(level_out_of_range(level)),
    }
}

/// Parse a `class=level` pair.
pub fn parse_assignment(input: &str) -> Result<(String, u8), DomainError> {
    let (class, level) = input.split_once('=').ok_or_else(|| {
        DomainError::validation(format!("Expected class=level, got '{}'", input.trim()))
    })?;
    Ok((normalize_class(class)?, parse_level(level)?))
}

fn normalize_class(class: impl Into<String>) -> Result<String, DomainError> {
    let class = class.into().trim().to_lowercase();
    if class.is_empty() {
        return Err(DomainError::validation("Class name cannot be empty"));
    }
    Ok(class)
}

fn validate_level(level: u8) -> Result<(), DomainError> {
    if !(MIN_CLASS_LEVEL..=MAX_CLASS_LEVEL).contains(&level) {
        return Err(level_out_of_range(level));
    }
    Ok(())
}

fn level_out_of_range(level: impl fmt::Display) -> DomainError {
    DomainError::validation(format!(
        "Class level must be between {} and {}, got {}",
        MIN_CLASS_LEVEL, MAX_CLASS_LEVEL, level
    ))
}

impl TryFrom<BTreeMap<String, u8>> for ClassLevels {
    type Error = DomainError;

    fn try_from(map: BTreeMap<String, u8>) -> Result<Self, Self::Error> {
        Self::from_pairs(map)
    }
}

impl From<ClassLevels> for BTreeMap<String, u8> {
    fn from(levels: ClassLevels) -> Self {
        levels.0
    }
}

impl FromStr for ClassLevels {
    type Err = DomainError;

    /// Parse whitespace- or comma-separated `class=level` pairs.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut levels = Self::new();
        for part in s.split(|c: char| c == ',' || c.is_whitespace()) {
            if part.is_empty() {
                continue;
            }
            levels.apply_assignment(part)?;
        }
        Ok(levels)
    }
}

impl fmt::Display for ClassLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(no classes)");
        }
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(class, level)| format!("{} {}", class, level))
            .collect();
        write!(f, "{}", parts.join(" / "))
    }
}
