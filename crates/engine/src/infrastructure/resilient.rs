//! Retrying spell-data wrapper with exponential backoff
//!
//! Wraps any SpellDataPort implementation with retry logic to handle
//! transient failures. Only `DataError::Unavailable` is retried.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use spellbook_domain::{
    Character, CharacterId, CharacterName, ClassLevels, Spell, SpellDetail, SpellId, SlotTables,
};

use crate::infrastructure::ports::{DataError, SpellDataPort};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Base delay in milliseconds before first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) for randomizing delays
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 250,
            max_delay_ms: 5000,
            jitter_factor: 0.2,
        }
    }
}

/// Wrapper that adds retry logic to any spell-data source
pub struct RetryingSpellData {
    inner: Arc<dyn SpellDataPort>,
    config: RetryConfig,
}

impl RetryingSpellData {
    pub fn new(inner: Arc<dyn SpellDataPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Calculate delay for a given attempt number using exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        // Exponential: base * 2^(attempt-1)
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }

    async fn execute_with_retry<T, F, Fut>(
        &self,
        operation_name: &'static str,
        operation: F,
    ) -> Result<T, DataError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, DataError>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(
                            attempt = attempt + 1,
                            operation = operation_name,
                            "Spell data request succeeded after retry"
                        );
                    }
                    return Ok(value);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        tracing::debug!(
                            error = %e,
                            operation = operation_name,
                            "Spell data request failed with non-retryable error"
                        );
                        return Err(e);
                    }

                    if attempt < self.config.max_retries {
                        let delay = self.calculate_delay(attempt + 1);
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = self.config.max_retries,
                            delay_ms = delay,
                            error = %e,
                            operation = operation_name,
                            "Spell data request failed, retrying"
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }

                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| DataError::unavailable(operation_name, "Unknown error"));
        tracing::error!(
            attempts = self.config.max_retries + 1,
            error = %error,
            operation = operation_name,
            "Spell data request failed after all retry attempts"
        );
        Err(error)
    }
}

#[async_trait]
impl SpellDataPort for RetryingSpellData {
    async fn fetch_characters(&self) -> Result<Vec<Character>, DataError> {
        self.execute_with_retry("fetch_characters", || self.inner.fetch_characters())
            .await
    }

    async fn fetch_slot_tables(
        &self,
        character_id: CharacterId,
        class_levels: &ClassLevels,
    ) -> Result<SlotTables, DataError> {
        self.execute_with_retry("fetch_slot_tables", || {
            self.inner.fetch_slot_tables(character_id, class_levels)
        })
        .await
    }

    async fn save_class_levels(
        &self,
        character_id: CharacterId,
        name: &CharacterName,
        class_levels: &ClassLevels,
    ) -> Result<(), DataError> {
        self.execute_with_retry("save_class_levels", || {
            self.inner.save_class_levels(character_id, name, class_levels)
        })
        .await
    }

    async fn fetch_known_spells(&self, character_id: CharacterId) -> Result<Vec<Spell>, DataError> {
        self.execute_with_retry("fetch_known_spells", || {
            self.inner.fetch_known_spells(character_id)
        })
        .await
    }

    async fn add_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        self.execute_with_retry("add_known_spell", || {
            self.inner.add_known_spell(character_id, spell_id)
        })
        .await
    }

    async fn remove_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        self.execute_with_retry("remove_known_spell", || {
            self.inner.remove_known_spell(character_id, spell_id)
        })
        .await
    }

    async fn fetch_all_spells(&self) -> Result<Vec<Spell>, DataError> {
        self.execute_with_retry("fetch_all_spells", || self.inner.fetch_all_spells())
            .await
    }

    async fn fetch_spells_by_class(&self, class: &str) -> Result<Vec<Spell>, DataError> {
        self.execute_with_retry("fetch_spells_by_class", || {
            self.inner.fetch_spells_by_class(class)
        })
        .await
    }

    async fn fetch_spells_by_subclass(&self, subclass: &str) -> Result<Vec<Spell>, DataError> {
        self.execute_with_retry("fetch_spells_by_subclass", || {
            self.inner.fetch_spells_by_subclass(subclass)
        })
        .await
    }

    async fn fetch_spell_detail(&self, spell_id: &SpellId) -> Result<SpellDetail, DataError> {
        self.execute_with_retry("fetch_spell_detail", || {
            self.inner.fetch_spell_detail(spell_id)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockSpellDataPort;
    use mockall::Sequence;
    use spellbook_domain::SpellLevel;

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            base_delay_ms: 1, // Fast for tests
            max_delay_ms: 10,
            jitter_factor: 0.0,
        }
    }

    fn fireball() -> Spell {
        Spell::new(
            SpellId::new("fireball").unwrap(),
            "Fireball",
            SpellLevel::Level(3),
        )
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells()
            .times(1)
            .returning(|| Ok(vec![fireball()]));
        let client = RetryingSpellData::new(Arc::new(mock), fast_config(3));

        let spells = client.fetch_all_spells().await.unwrap();
        assert_eq!(spells.len(), 1);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let mut mock = MockSpellDataPort::new();
        let mut seq = Sequence::new();
        mock.expect_fetch_all_spells()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|| Err(DataError::unavailable("fetch_all_spells", "connection reset")));
        mock.expect_fetch_all_spells()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![fireball()]));
        let client = RetryingSpellData::new(Arc::new(mock), fast_config(3));

        assert!(client.fetch_all_spells().await.is_ok());
    }

    #[tokio::test]
    async fn fails_after_max_retries() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_fetch_all_spells()
            .times(3)
            .returning(|| Err(DataError::unavailable("fetch_all_spells", "down")));
        let client = RetryingSpellData::new(Arc::new(mock), fast_config(2));

        let err = client.fetch_all_spells().await.unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn no_retry_on_rejected_request() {
        let mut mock = MockSpellDataPort::new();
        mock.expect_remove_known_spell()
            .times(1)
            .returning(|_, _| Err(DataError::rejected("remove_known_spell", "401 Unauthorized")));
        let client = RetryingSpellData::new(Arc::new(mock), fast_config(3));

        let result = client
            .remove_known_spell(CharacterId::new(), &SpellId::new("fireball").unwrap())
            .await;
        assert!(matches!(result, Err(DataError::Rejected { .. })));
    }

    #[test]
    fn exponential_backoff() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay_ms: 250,
            max_delay_ms: 3000,
            jitter_factor: 0.0, // No jitter for predictable test
        };
        let client = RetryingSpellData::new(Arc::new(MockSpellDataPort::new()), config);

        assert_eq!(client.calculate_delay(1), 250);
        assert_eq!(client.calculate_delay(2), 500);
        assert_eq!(client.calculate_delay(3), 1000);
        assert_eq!(client.calculate_delay(4), 2000);
        // 4000, capped
        assert_eq!(client.calculate_delay(5), 3000);
    }
}
