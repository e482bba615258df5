//! Casting resources.
//!
//! Owns the two slot pools of the selected character and the current slot
//! selection. Pools are only ever built from slot tables; a new character
//! or new class levels means a new `CastingResourceManager`.

mod error;

pub use error::CastingError;

use spellbook_domain::{
    derive_slot_pools, CharacterId, ClassLevels, DomainError, ResourceClass, RestType, SlotPool,
    SlotPools, SlotSelection, SlotTables, Spell,
};

use crate::infrastructure::ports::{DataError, SpellDataPort};

/// What a successful cast did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastOutcome {
    /// Cantrip cast; no slot was spent
    Cantrip,
    /// One slot was spent
    SlotExpended {
        resource_class: ResourceClass,
        level: u8,
        remaining: u8,
    },
}

/// Slot pools plus the slot picked for the next cast.
#[derive(Debug, Clone)]
pub struct CastingResourceManager {
    pools: SlotPools,
    selection: Option<SlotSelection>,
    enforce_cap: bool,
}

impl CastingResourceManager {
    /// A manager with empty pools (no character selected).
    pub fn empty(enforce_cap: bool) -> Self {
        Self {
            pools: SlotPools::empty(),
            selection: None,
            enforce_cap,
        }
    }

    /// Build fresh pools from slot tables, nothing expended.
    pub fn from_tables(tables: &SlotTables, enforce_cap: bool) -> Self {
        Self {
            pools: derive_slot_pools(tables),
            selection: None,
            enforce_cap,
        }
    }

    /// Query the slot tables for `class_levels` and build fresh pools.
    ///
    /// Missing tables give empty pools; only a failing data source is an error.
    pub async fn initialize(
        data: &dyn SpellDataPort,
        character_id: CharacterId,
        class_levels: &ClassLevels,
        enforce_cap: bool,
    ) -> Result<Self, DataError> {
        let tables = data.fetch_slot_tables(character_id, class_levels).await?;
        tracing::debug!(
            character_id = %character_id,
            full_caster_levels = tables.full_caster_slots.len(),
            pact_levels = tables.pact_slots.len(),
            "Derived slot pools"
        );
        Ok(Self::from_tables(&tables, enforce_cap))
    }

    pub fn pools(&self) -> &SlotPools {
        &self.pools
    }

    pub fn pool(&self, resource_class: ResourceClass) -> &SlotPool {
        self.pools.pool(resource_class)
    }

    pub fn selection(&self) -> Option<SlotSelection> {
        self.selection
    }

    /// Toggle the slot selection.
    ///
    /// Picking the current selection again clears it. Level 0 selects
    /// cantrips and needs no pool level.
    pub fn select_slot(
        &mut self,
        resource_class: ResourceClass,
        level: u8,
    ) -> Result<Option<SlotSelection>, CastingError> {
        let requested = if level == 0 {
            SlotSelection::cantrips()
        } else {
            if !self.pools.pool(resource_class).contains(level) {
                return Err(DomainError::slot_unavailable(resource_class.as_str(), level).into());
            }
            SlotSelection::new(resource_class, level)
        };

        self.selection = if self.selection == Some(requested) {
            None
        } else {
            Some(requested)
        };
        Ok(self.selection)
    }

    /// Spend the selected slot and clear the selection.
    ///
    /// A cantrip selection spends nothing. A rejected cast (exhausted level)
    /// changes nothing, the selection included.
    pub fn cast(&mut self) -> Result<CastOutcome, CastingError> {
        let selection = self.selection.ok_or(CastingError::NoSelection)?;
        if selection.is_cantrip() {
            self.selection = None;
            return Ok(CastOutcome::Cantrip);
        }

        let pool = self.pools.pool_mut(selection.resource_class);
        pool.expend(selection.level, self.enforce_cap)?;
        let remaining = pool
            .get(selection.level)
            .map(|slot| slot.remaining())
            .unwrap_or(0);
        self.selection = None;
        Ok(CastOutcome::SlotExpended {
            resource_class: selection.resource_class,
            level: selection.level,
            remaining,
        })
    }

    /// Cast `spell` with the current selection, if the selection admits it.
    pub fn cast_spell(&mut self, spell: &Spell) -> Result<CastOutcome, CastingError> {
        let selection = self.selection.ok_or(CastingError::NoSelection)?;
        if !selection.admits(spell) {
            return Err(CastingError::NotCastable {
                spell_id: spell.id.clone(),
                selection,
            });
        }
        self.cast()
    }

    /// Restore the pact pool only.
    pub fn short_rest(&mut self) {
        self.pools.recover(RestType::Short);
    }

    /// Restore both pools.
    pub fn long_rest(&mut self) {
        self.pools.recover(RestType::Long);
    }

    /// Known spells castable with the current selection. Empty without one.
    pub fn castable<'a>(&self, known: &'a [Spell]) -> Vec<&'a Spell> {
        match self.selection {
            Some(selection) => known.iter().filter(|spell| selection.admits(spell)).collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSpellDataPort;
    use spellbook_domain::{SlotTable, SpellId, SpellLevel};

    fn table(entries: &[(u8, u8)]) -> SlotTable {
        entries.iter().copied().collect()
    }

    fn wizard_five() -> SlotTables {
        SlotTables {
            full_caster_slots: table(&[(1, 4), (2, 3), (3, 2)]),
            pact_slots: SlotTable::new(),
        }
    }

    fn spell(id: &str, level: u8) -> Spell {
        Spell::new(SpellId::new(id).unwrap(), id, SpellLevel::new(level).unwrap())
    }

    fn used(manager: &CastingResourceManager, resource_class: ResourceClass, level: u8) -> u8 {
        manager.pool(resource_class).get(level).unwrap().used()
    }

    #[tokio::test]
    async fn initialize_builds_pools_from_data_source() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_slot_tables()
            .withf(|_, levels| levels.get("wizard") == Some(5))
            .returning(|_, _| Ok(wizard_five()));

        let levels = ClassLevels::new().with("wizard", 5).unwrap();
        let manager =
            CastingResourceManager::initialize(&mock, CharacterId::new(), &levels, true)
                .await
                .unwrap();

        let full: Vec<(u8, u8, u8)> = manager
            .pool(ResourceClass::FullCaster)
            .levels()
            .map(|s| (s.level(), s.max(), s.used()))
            .collect();
        assert_eq!(full, vec![(1, 4, 0), (2, 3, 0), (3, 2, 0)]);
        assert!(manager.pool(ResourceClass::Pact).is_empty());
    }

    #[tokio::test]
    async fn initialize_propagates_data_failure() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_slot_tables()
            .returning(|_, _| Err(DataError::unavailable("fetch_slot_tables", "refused")));

        let result = CastingResourceManager::initialize(
            &mock,
            CharacterId::new(),
            &ClassLevels::new(),
            true,
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn selecting_twice_toggles_off() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        let selected = manager.select_slot(ResourceClass::FullCaster, 2).unwrap();
        assert_eq!(selected, Some(SlotSelection::new(ResourceClass::FullCaster, 2)));
        assert_eq!(manager.select_slot(ResourceClass::FullCaster, 2).unwrap(), None);
    }

    #[test]
    fn selecting_another_slot_replaces_selection() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        manager.select_slot(ResourceClass::FullCaster, 1).unwrap();
        manager.select_slot(ResourceClass::FullCaster, 3).unwrap();
        assert_eq!(
            manager.selection(),
            Some(SlotSelection::new(ResourceClass::FullCaster, 3))
        );
    }

    #[test]
    fn selecting_missing_level_is_rejected() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        let err = manager.select_slot(ResourceClass::Pact, 1).unwrap_err();
        assert!(matches!(
            err,
            CastingError::Slot(DomainError::SlotUnavailable { level: 1, .. })
        ));
        assert_eq!(manager.selection(), None);
    }

    #[test]
    fn cast_spends_slot_and_clears_selection() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        manager.select_slot(ResourceClass::FullCaster, 2).unwrap();
        let outcome = manager.cast().unwrap();
        assert_eq!(
            outcome,
            CastOutcome::SlotExpended {
                resource_class: ResourceClass::FullCaster,
                level: 2,
                remaining: 2
            }
        );
        assert_eq!(manager.selection(), None);
        assert_eq!(used(&manager, ResourceClass::FullCaster, 2), 1);
    }

    #[test]
    fn cantrip_cast_never_touches_pools() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        let before = manager.pools().clone();
        manager.select_slot(ResourceClass::FullCaster, 0).unwrap();
        assert_eq!(manager.cast().unwrap(), CastOutcome::Cantrip);
        assert_eq!(manager.pools(), &before);
        assert_eq!(manager.selection(), None);
    }

    #[test]
    fn cast_without_selection_is_rejected() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        assert!(matches!(manager.cast(), Err(CastingError::NoSelection)));
    }

    #[test]
    fn exhausted_level_rejects_cast_and_keeps_selection() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        for _ in 0..2 {
            manager.select_slot(ResourceClass::FullCaster, 3).unwrap();
            manager.cast().unwrap();
        }
        manager.select_slot(ResourceClass::FullCaster, 3).unwrap();
        let err = manager.cast().unwrap_err();
        assert!(matches!(
            err,
            CastingError::Slot(DomainError::SlotsExhausted { level: 3, used: 2, max: 2 })
        ));
        assert_eq!(used(&manager, ResourceClass::FullCaster, 3), 2);
        assert!(manager.selection().is_some());
    }

    #[test]
    fn uncapped_casts_saturate_at_max() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), false);
        for _ in 0..5 {
            manager.select_slot(ResourceClass::FullCaster, 3).unwrap();
            manager.cast().unwrap();
        }
        let slot = manager.pool(ResourceClass::FullCaster).get(3).unwrap();
        assert_eq!(slot.used(), slot.max());
    }

    #[test]
    fn short_rest_restores_pact_only_long_rest_restores_all() {
        let tables = SlotTables {
            full_caster_slots: table(&[(1, 3)]),
            pact_slots: table(&[(3, 2)]),
        };
        let mut manager = CastingResourceManager::from_tables(&tables, true);
        manager.select_slot(ResourceClass::FullCaster, 1).unwrap();
        manager.cast().unwrap();
        manager.select_slot(ResourceClass::Pact, 3).unwrap();
        manager.cast().unwrap();

        manager.short_rest();
        assert_eq!(used(&manager, ResourceClass::FullCaster, 1), 1);
        assert_eq!(used(&manager, ResourceClass::Pact, 3), 0);

        manager.long_rest();
        assert_eq!(used(&manager, ResourceClass::FullCaster, 1), 0);
    }

    #[test]
    fn castable_follows_selection() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        let known = vec![spell("fire-bolt", 0), spell("shield", 1), spell("fireball", 3)];
        assert!(manager.castable(&known).is_empty());

        manager.select_slot(ResourceClass::FullCaster, 1).unwrap();
        let ids: Vec<&str> = manager.castable(&known).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["shield"]);

        manager.select_slot(ResourceClass::FullCaster, 0).unwrap();
        let ids: Vec<&str> = manager.castable(&known).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["fire-bolt"]);
    }

    #[test]
    fn cast_spell_checks_eligibility() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        manager.select_slot(ResourceClass::FullCaster, 1).unwrap();
        let err = manager.cast_spell(&spell("fireball", 3)).unwrap_err();
        assert!(matches!(err, CastingError::NotCastable { .. }));
        assert_eq!(used(&manager, ResourceClass::FullCaster, 1), 0);

        manager.cast_spell(&spell("shield", 1)).unwrap();
        assert_eq!(used(&manager, ResourceClass::FullCaster, 1), 1);
    }

    #[test]
    fn cantrip_under_leveled_slot_spends_nothing() {
        let mut manager = CastingResourceManager::from_tables(&wizard_five(), true);
        manager.select_slot(ResourceClass::FullCaster, 3).unwrap();
        assert!(manager.castable(&[spell("fire-bolt", 0)]).is_empty());

        let err = manager.cast_spell(&spell("fire-bolt", 0)).unwrap_err();
        assert!(matches!(err, CastingError::NotCastable { .. }));
        assert_eq!(used(&manager, ResourceClass::FullCaster, 3), 0);
        assert_eq!(
            manager.selection(),
            Some(SlotSelection::new(ResourceClass::FullCaster, 3))
        );
    }

    #[test]
    fn used_never_exceeds_max_under_any_sequence() {
        let tables = SlotTables {
            full_caster_slots: table(&[(1, 2), (2, 1)]),
            pact_slots: table(&[(1, 1)]),
        };
        for enforce_cap in [true, false] {
            let mut manager = CastingResourceManager::from_tables(&tables, enforce_cap);
            for step in 0..40u32 {
                match step % 7 {
                    0 | 1 | 3 => {
                        let _ = manager.select_slot(ResourceClass::FullCaster, 1 + (step % 2) as u8);
                        let _ = manager.cast();
                    }
                    2 | 4 => {
                        let _ = manager.select_slot(ResourceClass::Pact, 1);
                        let _ = manager.cast();
                    }
                    5 => manager.short_rest(),
                    _ => {
                        if step % 3 == 0 {
                            manager.long_rest();
                        }
                    }
                }
                for resource_class in [ResourceClass::FullCaster, ResourceClass::Pact] {
                    assert!(manager
                        .pool(resource_class)
                        .levels()
                        .all(|slot| slot.used() <= slot.max()));
                }
            }
            manager.long_rest();
            assert!(manager.pools().full_caster.levels().all(|s| s.used() == 0));
            assert!(manager.pools().pact.levels().all(|s| s.used() == 0));
        }
    }
}
