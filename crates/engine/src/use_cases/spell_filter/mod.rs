//! Spell filter pipeline.
//!
//! Runs a [`SpellFilter`] over the session catalog: local predicates first,
//! then the remote class or subclass membership list, then display order.
//! Applications may overlap; only the most recently issued one is allowed to
//! replace the displayed results.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use spellbook_domain::{filter_spells, MembershipFilter, Spell, SpellFilter, SpellId};

use crate::infrastructure::ports::{DataError, SpellDataPort};
use crate::stores::CatalogStore;

/// What became of one filter application.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Results replaced the displayed set
    Applied(Vec<Spell>),
    /// A newer application was issued while this one was in flight
    Superseded,
}

#[derive(Debug, Default)]
struct DisplayedResults {
    applied_seq: u64,
    filter: SpellFilter,
    results: Vec<Spell>,
}

pub struct SpellFilterPipeline {
    data: Arc<dyn SpellDataPort>,
    catalog: Arc<CatalogStore>,
    sequence: AtomicU64,
    state: RwLock<DisplayedResults>,
}

impl SpellFilterPipeline {
    pub fn new(data: Arc<dyn SpellDataPort>, catalog: Arc<CatalogStore>) -> Self {
        Self {
            data,
            catalog,
            sequence: AtomicU64::new(0),
            state: RwLock::new(DisplayedResults::default()),
        }
    }

    /// Run `filter` and display the result unless a newer application
    /// started in the meantime.
    ///
    /// A failure of the newest application is returned and the previously
    /// displayed results stay as they were. A failure of a superseded
    /// application is dropped like any other superseded result.
    pub async fn apply(&self, filter: SpellFilter) -> Result<FilterOutcome, DataError> {
        let ticket = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let computed = self.run(&filter).await;

        let mut state = self.state.write().await;
        if ticket != self.sequence.load(Ordering::SeqCst) || ticket <= state.applied_seq {
            tracing::debug!(
                ticket,
                newest = self.sequence.load(Ordering::SeqCst),
                "Discarding superseded filter result"
            );
            return Ok(FilterOutcome::Superseded);
        }

        let results = computed.map_err(|e| {
            tracing::warn!(error = %e, "Filter application failed; keeping previous results");
            e
        })?;
        tracing::debug!(ticket, results = results.len(), "Applied spell filter");
        state.applied_seq = ticket;
        state.filter = filter;
        state.results = results.clone();
        Ok(FilterOutcome::Applied(results))
    }

    /// Re-run the displayed filter.
    pub async fn refresh(&self) -> Result<FilterOutcome, DataError> {
        let filter = self.current_filter().await;
        self.apply(filter).await
    }

    /// Compute the result set for `filter` without touching displayed state.
    pub async fn run(&self, filter: &SpellFilter) -> Result<Vec<Spell>, DataError> {
        let catalog = self.catalog.get().await?;
        let members = match filter.membership() {
            Some(membership) => Some(self.fetch_members(&membership).await?),
            None => None,
        };
        Ok(filter_spells(&catalog, filter, members.as_ref()))
    }

    async fn fetch_members(
        &self,
        membership: &MembershipFilter,
    ) -> Result<HashSet<SpellId>, DataError> {
        let spells = match membership {
            MembershipFilter::Subclass(subclass) => {
                self.data.fetch_spells_by_subclass(subclass).await?
            }
            MembershipFilter::Class(class) => self.data.fetch_spells_by_class(class).await?,
        };
        Ok(spells.into_iter().map(|spell| spell.id).collect())
    }

    pub async fn current_results(&self) -> Vec<Spell> {
        self.state.read().await.results.clone()
    }

    pub async fn current_filter(&self) -> SpellFilter {
        self.state.read().await.filter.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSpellDataPort;
    use crate::test_fixtures::{ids, spell, srd_catalog, GatedSpellData};
    use spellbook_domain::SpellLevel;

    fn pipeline(data: impl SpellDataPort + 'static) -> Arc<SpellFilterPipeline> {
        let data: Arc<dyn SpellDataPort> = Arc::new(data);
        let catalog = Arc::new(CatalogStore::new(Arc::clone(&data)));
        Arc::new(SpellFilterPipeline::new(data, catalog))
    }

    fn applied(outcome: FilterOutcome) -> Vec<Spell> {
        match outcome {
            FilterOutcome::Applied(spells) => spells,
            FilterOutcome::Superseded => panic!("expected applied result"),
        }
    }

    #[tokio::test]
    async fn empty_filter_returns_sorted_catalog() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells().returning(|| Ok(srd_catalog()));
        let pipeline = pipeline(mock);

        let results = applied(pipeline.apply(SpellFilter::new()).await.unwrap());
        assert_eq!(
            ids(&results),
            vec![
                "fire-bolt",
                "cure-wounds",
                "detect-magic",
                "shield",
                "misty-step",
                "fireball"
            ]
        );
    }

    #[tokio::test]
    async fn ritual_filter_keeps_rituals_only() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells().returning(|| {
            Ok(vec![
                spell("fireball", "Fireball", 3),
                spell("detect-magic", "Detect Magic", 1).with_ritual(true),
            ])
        });
        let pipeline = pipeline(mock);

        let filter = SpellFilter::new().with_ritual_only(true);
        let results = applied(pipeline.apply(filter).await.unwrap());
        assert_eq!(ids(&results), vec!["detect-magic"]);
    }

    #[tokio::test]
    async fn subclass_overrides_class() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells().returning(|| Ok(srd_catalog()));
        mock.expect_fetch_spells_by_subclass()
            .withf(|subclass| subclass == "draconic")
            .times(2)
            .returning(|_| Ok(vec![spell("shield", "Shield", 1), spell("fireball", "Fireball", 3)]));
        mock.expect_fetch_spells_by_class().times(0);
        let pipeline = pipeline(mock);

        let both = SpellFilter::new()
            .with_class(Some("wizard"))
            .with_subclass(Some("draconic"));
        let subclass_only = SpellFilter::new().with_subclass(Some("draconic"));

        let with_class = applied(pipeline.apply(both).await.unwrap());
        let without_class = applied(pipeline.apply(subclass_only).await.unwrap());
        assert_eq!(with_class, without_class);
        assert_eq!(ids(&with_class), vec!["shield", "fireball"]);
    }

    #[tokio::test]
    async fn class_membership_combines_with_local_predicates() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells().returning(|| Ok(srd_catalog()));
        mock.expect_fetch_spells_by_class()
            .withf(|class| class == "wizard")
            .returning(|_| {
                Ok(vec![
                    spell("fireball", "Fireball", 3),
                    spell("detect-magic", "Detect Magic", 1),
                    spell("shield", "Shield", 1),
                ])
            });
        let pipeline = pipeline(mock);

        let filter = SpellFilter::new()
            .with_class(Some("wizard"))
            .with_level(Some(SpellLevel::Level(1)));
        let results = applied(pipeline.apply(filter).await.unwrap());
        assert_eq!(ids(&results), vec!["detect-magic", "shield"]);
    }

    #[tokio::test]
    async fn repeated_application_is_idempotent() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells().times(1).returning(|| Ok(srd_catalog()));
        let pipeline = pipeline(mock);

        let filter = SpellFilter::new().with_search("fire");
        let first = applied(pipeline.apply(filter.clone()).await.unwrap());
        let second = applied(pipeline.apply(filter).await.unwrap());
        assert_eq!(first, second);
        assert_eq!(ids(&second), vec!["fire-bolt", "fireball"]);
        assert_eq!(applied(pipeline.refresh().await.unwrap()), second);
    }

    #[tokio::test]
    async fn failed_membership_fetch_keeps_previous_results() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells().returning(|| Ok(srd_catalog()));
        mock.expect_fetch_spells_by_class()
            .returning(|_| Err(DataError::unavailable("fetch_spells_by_class", "timeout")));
        let pipeline = pipeline(mock);

        let shown = applied(pipeline.apply(SpellFilter::new().with_search("fire")).await.unwrap());
        let result = pipeline
            .apply(SpellFilter::new().with_class(Some("wizard")))
            .await;

        assert!(result.is_err());
        assert_eq!(pipeline.current_results().await, shown);
        assert_eq!(pipeline.current_filter().await.search(), Some("fire"));
    }

    #[tokio::test]
    async fn slow_older_result_never_overwrites_newer() {
        let (data, mut started) = GatedSpellData::new(srd_catalog());
        let wizard = data.gate("class:wizard");
        let cleric = data.gate("class:cleric");
        let pipeline = pipeline(data);

        let older = {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .apply(SpellFilter::new().with_class(Some("wizard")))
                    .await
            })
        };
        assert_eq!(started.recv().await.as_deref(), Some("class:wizard"));

        cleric
            .send(Ok(vec![spell("cure-wounds", "Cure Wounds", 1)]))
            .unwrap();
        let newer = pipeline
            .apply(SpellFilter::new().with_class(Some("cleric")))
            .await
            .unwrap();
        assert_eq!(ids(&applied(newer)), vec!["cure-wounds"]);

        wizard
            .send(Ok(vec![spell("fireball", "Fireball", 3)]))
            .unwrap();
        assert_eq!(older.await.unwrap().unwrap(), FilterOutcome::Superseded);

        assert_eq!(ids(&pipeline.current_results().await), vec!["cure-wounds"]);
        assert_eq!(pipeline.current_filter().await.class(), Some("cleric"));
    }

    #[tokio::test]
    async fn superseded_failure_is_discarded() {
        let (data, mut started) = GatedSpellData::new(srd_catalog());
        let wizard = data.gate("class:wizard");
        let cleric = data.gate("class:cleric");
        let pipeline = pipeline(data);

        let older = {
            let pipeline = Arc::clone(&pipeline);
            tokio::spawn(async move {
                pipeline
                    .apply(SpellFilter::new().with_class(Some("wizard")))
                    .await
            })
        };
        assert_eq!(started.recv().await.as_deref(), Some("class:wizard"));

        cleric.send(Ok(vec![spell("shield", "Shield", 1)])).unwrap();
        pipeline
            .apply(SpellFilter::new().with_class(Some("cleric")))
            .await
            .unwrap();

        wizard
            .send(Err(DataError::unavailable("fetch_spells_by_class", "timeout")))
            .unwrap();
        assert_eq!(older.await.unwrap(), Ok(FilterOutcome::Superseded));
        assert_eq!(ids(&pipeline.current_results().await), vec!["shield"]);
    }
}
