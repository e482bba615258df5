//! Spell filter inputs and the pure filtering pipeline.
//!
//! A [`SpellFilter`] is an immutable snapshot of everything the user typed or
//! toggled. Local predicates are evaluated here; class and subclass filters
//! need the spell-data service, so the caller resolves them into a member set
//! and passes it to [`filter_spells`].

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::common::{compare_names, none_if_blank};
use crate::entities::{Spell, SpellLevel};
use crate::error::DomainError;
use crate::ids::SpellId;

/// Which remote membership list restricts the result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MembershipFilter {
    Class(String),
    Subclass(String),
}

impl MembershipFilter {
    pub fn name(&self) -> &str {
        match self {
            MembershipFilter::Class(name) | MembershipFilter::Subclass(name) => name,
        }
    }
}

/// Filter inputs. All are optional and compose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellFilter {
    search: Option<String>,
    level: Option<SpellLevel>,
    concentration_only: bool,
    ritual_only: bool,
    class: Option<String>,
    subclass: Option<String>,
}

impl SpellFilter {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    /// Case-insensitive name substring. Blank input clears the search.
    pub fn with_search(mut self, search: impl AsRef<str>) -> Self {
        self.search = none_if_blank(search.as_ref()).map(str::to_lowercase);
        self
    }

    pub fn with_level(mut self, level: Option<SpellLevel>) -> Self {
        self.level = level;
        self
    }

    pub fn with_concentration_only(mut self, concentration_only: bool) -> Self {
        self.concentration_only = concentration_only;
        self
    }

    pub fn with_ritual_only(mut self, ritual_only: bool) -> Self {
        self.ritual_only = ritual_only;
        self
    }

    /// Set the class filter. Clearing the class also clears the subclass,
    /// since a subclass only makes sense under its class.
    pub fn with_class(mut self, class: Option<&str>) -> Self {
        self.class = class.and_then(none_if_blank).map(str::to_lowercase);
        if self.class.is_none() {
            self.subclass = None;
        }
        self
    }

    pub fn with_subclass(mut self, subclass: Option<&str>) -> Self {
        self.subclass = subclass.and_then(none_if_blank).map(str::to_lowercase);
        self
    }

    /// Apply one `key=value` pair typed by the user.
    ///
    /// Keys: `search`, `level` (`any`, `cantrip` or 0-9), `concentration`,
    /// `ritual` (`yes`/`no`), `class`, `subclass` (empty value clears).
    pub fn with_assignment(self, input: &str) -> Result<Self, DomainError> {
        let (key, value) = input.split_once('=').ok_or_else(|| {
            DomainError::validation(format!("Expected key=value, got '{}'", input.trim()))
        })?;
        let value = value.trim();
        match key.trim().to_lowercase().as_str() {
            "search" | "name" => Ok(self.with_search(value)),
            "level" => Ok(self.with_level(parse_level_filter(value)?)),
            "concentration" => Ok(self.with_concentration_only(parse_yes_no(value)?)),
            "ritual" => Ok(self.with_ritual_only(parse_yes_no(value)?)),
            "class" => Ok(self.with_class(Some(value))),
            "subclass" => Ok(self.with_subclass(Some(value))),
            other => Err(DomainError::validation(format!(
                "Unknown filter key: {}",
                other
            ))),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn level(&self) -> Option<SpellLevel> {
        self.level
    }

    pub fn concentration_only(&self) -> bool {
        self.concentration_only
    }

    pub fn ritual_only(&self) -> bool {
        self.ritual_only
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn subclass(&self) -> Option<&str> {
        self.subclass.as_deref()
    }

    /// The membership list to consult. A subclass takes precedence and the
    /// class is then ignored entirely.
    pub fn membership(&self) -> Option<MembershipFilter> {
        if let Some(subclass) = &self.subclass {
            return Some(MembershipFilter::Subclass(subclass.clone()));
        }
        self.class.clone().map(MembershipFilter::Class)
    }

    /// Local predicates: name substring, exact level, concentration, ritual.
    pub fn matches_local(&self, spell: &Spell) -> bool {
        if let Some(search) = &self.search {
            if !spell.name.to_lowercase().contains(search.as_str()) {
                return false;
            }
        }
        if let Some(level) = self.level {
            if spell.level != level {
                return false;
            }
        }
        if self.concentration_only && !spell.concentration {
            return false;
        }
        if self.ritual_only && !spell.ritual {
            return false;
        }
        true
    }
}

fn parse_level_filter(value: &str) -> Result<Option<SpellLevel>, DomainError> {
    match value.to_lowercase().as_str() {
        "" | "any" | "all" => Ok(None),
        "cantrip" => Ok(Some(SpellLevel::Cantrip)),
        other => {
            let level: u8 = other.parse().map_err(|_| {
                DomainError::validation(format!("Level must be 0-9 or 'any', got '{}'", other))
            })?;
            SpellLevel::new(level).map(Some)
        }
    }
}

fn parse_yes_no(value: &str) -> Result<bool, DomainError> {
    match value.to_lowercase().as_str() {
        "yes" | "y" | "true" | "on" => Ok(true),
        "" | "no" | "n" | "false" | "off" => Ok(false),
        other => Err(DomainError::validation(format!(
            "Expected yes or no, got '{}'",
            other
        ))),
    }
}

/// Run the full pipeline over `catalog`.
///
/// `members` is the resolved membership list for `filter.membership()`, or
/// `None` when no class or subclass filter is set. The result is sorted with
/// [`compare_spells`].
pub fn filter_spells(
    catalog: &[Spell],
    filter: &SpellFilter,
    members: Option<&HashSet<SpellId>>,
) -> Vec<Spell> {
    let mut result: Vec<Spell> = catalog
        .iter()
        .filter(|spell| filter.matches_local(spell))
        .filter(|spell| members.map_or(true, |set| set.contains(&spell.id)))
        .cloned()
        .collect();
    sort_spells(&mut result);
    result
}

/// Display order: level, then locale-aware name, then raw name, then id.
pub fn compare_spells(left: &Spell, right: &Spell) -> Ordering {
    left.level
        .cmp(&right.level)
        .then_with(|| compare_names(&left.name, &right.name))
        .then_with(|| left.id.cmp(&right.id))
}

pub fn sort_spells(spells: &mut [Spell]) {
    spells.sort_by(compare_spells);
}
