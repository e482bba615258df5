//! Character session.
//!
//! The single owner of the selected character: its slot pools, slot
//! selection and known-spell ledger. Selecting a character replaces all of
//! it at once. Overlapping selections follow latest-wins, and writes that
//! complete after the character changed are discarded.

mod error;
mod notice;

pub use error::SessionError;
pub use notice::{Notice, Severity};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use spellbook_domain::{
    Character, CharacterId, CharacterName, ClassLevels, ResourceClass, SlotPools, SlotSelection,
    Spell, SpellFilter, SpellId,
};

use crate::infrastructure::ports::{DataError, SpellDataPort};
use crate::stores::CatalogStore;
use crate::use_cases::casting::{CastOutcome, CastingResourceManager};
use crate::use_cases::known_spells::{KnownSpellLedger, KnownSpells};

// =============================================================================
// Result Types
// =============================================================================

/// Result of an operation whose answer may arrive after it stopped mattering.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome<T> {
    Applied(T),
    /// Another selection won while this operation was in flight
    Superseded,
}

impl<T> SessionOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            SessionOutcome::Applied(value) => Some(value),
            SessionOutcome::Superseded => None,
        }
    }
}

/// Result of saving class levels.
#[derive(Debug, Clone)]
pub struct LevelsSaved {
    pub character: Character,
    /// Set when the levels were stored but the new slot tables could not be
    /// fetched. Pools are empty until the character is selected again.
    pub slot_error: Option<DataError>,
}

// =============================================================================
// State
// =============================================================================

#[derive(Debug, Clone)]
struct ActiveCharacter {
    character: Character,
    casting: CastingResourceManager,
    known: KnownSpellLedger,
}

#[derive(Debug, Default)]
struct SessionState {
    /// Ticket of the selection currently shown
    applied_seq: u64,
    active: Option<ActiveCharacter>,
}

/// Snapshot taken before an await, checked again before applying.
struct Generation {
    seq: u64,
    character_id: CharacterId,
}

// =============================================================================
// Use Case
// =============================================================================

pub struct CharacterSession {
    data: Arc<dyn SpellDataPort>,
    known_spells: KnownSpells,
    enforce_cap: bool,
    sequence: AtomicU64,
    roster: RwLock<Vec<Character>>,
    state: RwLock<SessionState>,
}

impl CharacterSession {
    pub fn new(data: Arc<dyn SpellDataPort>, catalog: Arc<CatalogStore>, enforce_cap: bool) -> Self {
        Self {
            known_spells: KnownSpells::new(Arc::clone(&data), catalog),
            data,
            enforce_cap,
            sequence: AtomicU64::new(0),
            roster: RwLock::new(Vec::new()),
            state: RwLock::new(SessionState::default()),
        }
    }

    // -------------------------------------------------------------------------
    // Characters
    // -------------------------------------------------------------------------

    /// Fetch the characters to choose from and remember them for selection.
    pub async fn list_characters(&self) -> Result<Vec<Character>, SessionError> {
        let characters = self.data.fetch_characters().await?;
        *self.roster.write().await = characters.clone();
        Ok(characters)
    }

    /// The last fetched character list.
    pub async fn roster(&self) -> Vec<Character> {
        self.roster.read().await.clone()
    }

    /// Select by 1-based position in the roster.
    pub async fn select_index(
        &self,
        position: usize,
    ) -> Result<SessionOutcome<Character>, SessionError> {
        let character_id = self
            .roster_entry(|roster| {
                position
                    .checked_sub(1)
                    .and_then(|index| roster.get(index))
                    .map(Character::id)
            })
            .await?
            .ok_or_else(|| SessionError::UnknownCharacter(format!("#{}", position)))?;
        self.select_character(character_id).await
    }

    /// Make `character_id` the active character.
    ///
    /// Slot tables and known spells are fetched together; the previous
    /// character stays active until both arrive. If another selection was
    /// issued meanwhile this one is dropped.
    pub async fn select_character(
        &self,
        character_id: CharacterId,
    ) -> Result<SessionOutcome<Character>, SessionError> {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let character = self
            .roster_entry(|roster| roster.iter().find(|c| c.id() == character_id).cloned())
            .await?
            .ok_or_else(|| SessionError::UnknownCharacter(character_id.to_string()))?;

        let (casting, known) = tokio::join!(
            CastingResourceManager::initialize(
                self.data.as_ref(),
                character_id,
                character.class_levels(),
                self.enforce_cap,
            ),
            self.known_spells.load(character_id),
        );

        let mut state = self.state.write().await;
        if ticket != self.sequence.load(Ordering::SeqCst) || ticket <= state.applied_seq {
            tracing::debug!(
                character_id = %character_id,
                ticket,
                "Discarding superseded character selection"
            );
            return Ok(SessionOutcome::Superseded);
        }

        let casting = casting?;
        let known = known?;
        tracing::info!(
            character_id = %character_id,
            name = %character.name(),
            known_spells = known.len(),
            "Selected character"
        );
        state.applied_seq = ticket;
        state.active = Some(ActiveCharacter {
            character: character.clone(),
            casting,
            known,
        });
        Ok(SessionOutcome::Applied(character))
    }

    pub async fn active_character(&self) -> Option<Character> {
        self.state
            .read()
            .await
            .active
            .as_ref()
            .map(|active| active.character.clone())
    }

    /// Look something up in the roster, fetching it first if still empty.
    async fn roster_entry<T>(
        &self,
        lookup: impl Fn(&[Character]) -> Option<T>,
    ) -> Result<Option<T>, SessionError> {
        {
            let roster = self.roster.read().await;
            if !roster.is_empty() {
                return Ok(lookup(roster.as_slice()));
            }
        }
        let roster = self.list_characters().await?;
        Ok(lookup(roster.as_slice()))
    }

    // -------------------------------------------------------------------------
    // Slots and casting
    // -------------------------------------------------------------------------

    async fn read_active<T>(
        &self,
        read: impl FnOnce(&ActiveCharacter) -> T,
    ) -> Result<T, SessionError> {
        let state = self.state.read().await;
        state.active.as_ref().map(read).ok_or(SessionError::NoCharacter)
    }

    async fn update_active<T>(
        &self,
        update: impl FnOnce(&mut ActiveCharacter) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut state = self.state.write().await;
        let active = state.active.as_mut().ok_or(SessionError::NoCharacter)?;
        update(active)
    }

    pub async fn pools(&self) -> Result<SlotPools, SessionError> {
        self.read_active(|active| active.casting.pools().clone()).await
    }

    pub async fn selection(&self) -> Result<Option<SlotSelection>, SessionError> {
        self.read_active(|active| active.casting.selection()).await
    }

    /// Toggle the slot selection. Level 0 selects cantrips.
    pub async fn select_slot(
        &self,
        resource_class: ResourceClass,
        level: u8,
    ) -> Result<Option<SlotSelection>, SessionError> {
        self.update_active(|active| Ok(active.casting.select_slot(resource_class, level)?))
            .await
    }

    /// Cast a known spell with the selected slot.
    pub async fn cast(&self, spell_id: &SpellId) -> Result<CastOutcome, SessionError> {
        self.update_active(|active| {
            let spell = active
                .known
                .get(spell_id)
                .cloned()
                .ok_or_else(|| SessionError::SpellNotKnown(spell_id.clone()))?;
            let outcome = active.casting.cast_spell(&spell)?;
            tracing::info!(
                character_id = %active.character.id(),
                spell_id = %spell_id,
                outcome = ?outcome,
                "Cast spell"
            );
            Ok(outcome)
        })
        .await
    }

    /// Spend the selected slot without naming a spell.
    pub async fn cast_selected(&self) -> Result<CastOutcome, SessionError> {
        self.update_active(|active| Ok(active.casting.cast()?)).await
    }

    pub async fn short_rest(&self) -> Result<(), SessionError> {
        self.update_active(|active| {
            active.casting.short_rest();
            tracing::info!(character_id = %active.character.id(), "Short rest");
            Ok(())
        })
        .await
    }

    pub async fn long_rest(&self) -> Result<(), SessionError> {
        self.update_active(|active| {
            active.casting.long_rest();
            tracing::info!(character_id = %active.character.id(), "Long rest");
            Ok(())
        })
        .await
    }

    /// Known spells castable with the selected slot.
    pub async fn castable(&self) -> Result<Vec<Spell>, SessionError> {
        self.read_active(|active| {
            active
                .casting
                .castable(active.known.spells())
                .into_iter()
                .cloned()
                .collect()
        })
        .await
    }

    // -------------------------------------------------------------------------
    // Known spells
    // -------------------------------------------------------------------------

    pub async fn known(&self) -> Result<KnownSpellLedger, SessionError> {
        self.read_active(|active| active.known.clone()).await
    }

    /// Known spells passing the local predicates of `filter`.
    pub async fn known_view(&self, filter: &SpellFilter) -> Result<Vec<Spell>, SessionError> {
        self.read_active(|active| active.known.view(filter)).await
    }

    async fn generation(&self) -> Result<(Generation, KnownSpellLedger), SessionError> {
        let state = self.state.read().await;
        let active = state.active.as_ref().ok_or(SessionError::NoCharacter)?;
        Ok((
            Generation {
                seq: state.applied_seq,
                character_id: active.character.id(),
            },
            active.known.clone(),
        ))
    }

    /// Apply `apply` to the active character if it is still the one
    /// `generation` was taken from.
    async fn apply_if_current<T>(
        &self,
        generation: &Generation,
        apply: impl FnOnce(&mut ActiveCharacter) -> T,
    ) -> SessionOutcome<T> {
        let mut state = self.state.write().await;
        let seq = state.applied_seq;
        match state.active.as_mut() {
            Some(active)
                if seq == generation.seq && active.character.id() == generation.character_id =>
            {
                SessionOutcome::Applied(apply(active))
            }
            _ => {
                tracing::debug!(
                    character_id = %generation.character_id,
                    "Character changed while request was in flight; discarding result"
                );
                SessionOutcome::Superseded
            }
        }
    }

    pub async fn add_spell(
        &self,
        spell_id: &SpellId,
    ) -> Result<SessionOutcome<KnownSpellLedger>, SessionError> {
        let (generation, ledger) = self.generation().await?;
        let updated = self.known_spells.add(&ledger, spell_id).await?;
        Ok(self
            .apply_if_current(&generation, |active| {
                active.known = updated.clone();
                updated
            })
            .await)
    }

    /// Forget a known spell. The ledger is untouched if the data source
    /// refuses.
    pub async fn remove_spell(
        &self,
        spell_id: &SpellId,
    ) -> Result<SessionOutcome<KnownSpellLedger>, SessionError> {
        let (generation, ledger) = self.generation().await?;
        let updated = self.known_spells.remove(&ledger, spell_id).await?;
        Ok(self
            .apply_if_current(&generation, |active| {
                active.known = updated.clone();
                updated
            })
            .await)
    }

    // -------------------------------------------------------------------------
    // Class levels
    // -------------------------------------------------------------------------

    /// Rename and/or change class levels of the active character.
    ///
    /// Every assignment (`class=level`) is validated before anything is
    /// sent. The save is all-or-nothing: on failure the character keeps its
    /// previous name and levels. When the levels changed, the slot pools are
    /// rebuilt from the new levels, all slots unspent; a rename alone keeps
    /// the pools and the selection.
    pub async fn save_levels(
        &self,
        name: Option<&str>,
        assignments: &[String],
    ) -> Result<SessionOutcome<LevelsSaved>, SessionError> {
        let (generation, character) = {
            let state = self.state.read().await;
            let active = state.active.as_ref().ok_or(SessionError::NoCharacter)?;
            (
                Generation {
                    seq: state.applied_seq,
                    character_id: active.character.id(),
                },
                active.character.clone(),
            )
        };

        let (name, class_levels) = prepare_levels(&character, name, assignments)?;
        let levels_changed = class_levels != *character.class_levels();
        self.data
            .save_class_levels(generation.character_id, &name, &class_levels)
            .await?;
        tracing::info!(
            character_id = %generation.character_id,
            class_levels = %class_levels,
            "Saved class levels"
        );

        let mut saved = character;
        saved.replace_class_levels(name, class_levels);
        self.update_roster(&saved).await;

        let casting = if levels_changed {
            Some(
                CastingResourceManager::initialize(
                    self.data.as_ref(),
                    generation.character_id,
                    saved.class_levels(),
                    self.enforce_cap,
                )
                .await,
            )
        } else {
            None
        };
        let character_id = generation.character_id;
        let enforce_cap = self.enforce_cap;

        Ok(self
            .apply_if_current(&generation, move |active| {
                active.character = saved.clone();
                let slot_error = match casting {
                    None => None,
                    Some(Ok(casting)) => {
                        active.casting = casting;
                        None
                    }
                    Some(Err(e)) => {
                        tracing::warn!(
                            character_id = %character_id,
                            error = %e,
                            "Slot tables unavailable after saving levels"
                        );
                        active.casting = CastingResourceManager::empty(enforce_cap);
                        Some(e)
                    }
                };
                LevelsSaved {
                    character: saved,
                    slot_error,
                }
            })
            .await)
    }

    async fn update_roster(&self, character: &Character) {
        let mut roster = self.roster.write().await;
        if let Some(entry) = roster.iter_mut().find(|c| c.id() == character.id()) {
            *entry = character.clone();
        }
    }
}

/// Validate a rename and level assignments against the current character.
fn prepare_levels(
    character: &Character,
    name: Option<&str>,
    assignments: &[String],
) -> Result<(CharacterName, ClassLevels), SessionError> {
    let name = match name {
        Some(name) => CharacterName::new(name)?,
        None => character.name().clone(),
    };
    let mut class_levels = character.class_levels().clone();
    for assignment in assignments {
        class_levels.apply_assignment(assignment)?;
    }
    Ok((name, class_levels))
}
