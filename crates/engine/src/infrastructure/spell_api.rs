//! Spell-data service HTTP client
//!
//! Implements the SpellDataPort trait over the backend's REST/JSON API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use spellbook_domain::common::StringExt;
use spellbook_domain::{
    Character, CharacterId, CharacterName, ClassLevels, Spell, SpellDetail, SpellId, SpellLevel,
    SlotTables,
};

use crate::infrastructure::ports::{DataError, SpellDataPort};

/// Client for the spell-data REST API
#[derive(Clone)]
pub struct SpellApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl SpellApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.into_option();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Response, DataError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| DataError::unavailable(operation, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(status_error(operation, status, error_text))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<T, DataError> {
        let response = self.send(operation, self.client.get(self.url(path))).await?;
        response
            .json()
            .await
            .map_err(|e| DataError::invalid_response(operation, e))
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T, DataError> {
        let response = self
            .send(operation, self.client.post(self.url(path)).json(body))
            .await?;
        response
            .json()
            .await
            .map_err(|e| DataError::invalid_response(operation, e))
    }

    async fn fetch_spell_list(
        &self,
        operation: &'static str,
        path: &str,
    ) -> Result<Vec<Spell>, DataError> {
        let dtos: Vec<SpellSummaryDto> = self.get_json(operation, path).await?;
        dtos.into_iter()
            .map(|dto| dto.into_domain(operation))
            .collect()
    }
}

fn status_error(operation: &'static str, status: StatusCode, body: String) -> DataError {
    let message = format!("{}: {}", status, body.trim());
    if status == StatusCode::NOT_FOUND {
        return DataError::not_found("Resource", message);
    }
    if status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
    {
        DataError::unavailable(operation, message)
    } else {
        DataError::rejected(operation, message)
    }
}

/// Path segment for a class or subclass name.
fn path_segment(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct CharacterRefBody {
    id: Uuid,
}

#[derive(Debug, Serialize)]
struct KnownSpellBody<'a> {
    id: Uuid,
    index: &'a str,
}

#[derive(Debug, Serialize)]
struct SaveCharacterBody<'a> {
    id: Uuid,
    name: &'a str,
    class_levels: BTreeMap<String, u8>,
}

#[derive(Debug, Deserialize)]
struct CharacterDto {
    id: Uuid,
    name: String,
    #[serde(default)]
    class_levels: BTreeMap<String, u8>,
}

impl CharacterDto {
    fn into_domain(self) -> Result<Character, DataError> {
        let name = CharacterName::new(self.name)
            .map_err(|e| DataError::invalid_response("fetch_characters", e))?;
        let class_levels = ClassLevels::try_from(self.class_levels)
            .map_err(|e| DataError::invalid_response("fetch_characters", e))?;
        Ok(Character::new(name)
            .with_id(CharacterId::from_uuid(self.id))
            .with_class_levels(class_levels))
    }
}

#[derive(Debug, Deserialize)]
struct SlotTablesDto {
    #[serde(default)]
    full_caster_slots: Option<BTreeMap<u8, u8>>,
    #[serde(default)]
    warlock_slots: Option<BTreeMap<u8, u8>>,
}

impl From<SlotTablesDto> for SlotTables {
    fn from(dto: SlotTablesDto) -> Self {
        SlotTables {
            full_caster_slots: dto.full_caster_slots.unwrap_or_default(),
            pact_slots: dto.warlock_slots.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpellSummaryDto {
    index: String,
    name: String,
    level: u8,
    #[serde(default)]
    concentration: bool,
    #[serde(default)]
    ritual: bool,
}

impl SpellSummaryDto {
    fn into_domain(self, operation: &'static str) -> Result<Spell, DataError> {
        let id = SpellId::new(self.index).map_err(|e| DataError::invalid_response(operation, e))?;
        let level =
            SpellLevel::new(self.level).map_err(|e| DataError::invalid_response(operation, e))?;
        Ok(Spell::new(id, self.name, level)
            .with_concentration(self.concentration)
            .with_ritual(self.ritual))
    }
}

#[derive(Debug, Deserialize)]
struct SpellDetailDto {
    name: String,
    level: u8,
    #[serde(default)]
    range: String,
    #[serde(default)]
    casting_time: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    components: Option<Vec<String>>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    desc: Option<Vec<String>>,
    #[serde(default)]
    higher_level: Option<Vec<String>>,
    #[serde(default)]
    concentration: bool,
    #[serde(default)]
    ritual: bool,
    #[serde(default)]
    attack_type: Option<String>,
    /// Either `{"name": "Evocation", ...}` or a plain string. List fields may
    /// arrive as `null`.
    #[serde(default)]
    school: Option<serde_json::Value>,
}

impl SpellDetailDto {
    fn into_domain(self, id: SpellId) -> Result<SpellDetail, DataError> {
        let level = SpellLevel::new(self.level)
            .map_err(|e| DataError::invalid_response("fetch_spell_detail", e))?;
        let school = match self.school {
            Some(serde_json::Value::String(name)) => Some(name),
            Some(serde_json::Value::Object(fields)) => fields
                .get("name")
                .and_then(|name| name.as_str())
                .map(str::to_string),
            _ => None,
        };
        Ok(SpellDetail {
            id,
            name: self.name,
            level,
            range: self.range,
            casting_time: self.casting_time,
            duration: self.duration,
            components: self.components.unwrap_or_default(),
            material: self.material.into_option(),
            description: self.desc.unwrap_or_default(),
            higher_level: self.higher_level.unwrap_or_default(),
            concentration: self.concentration,
            ritual: self.ritual,
            school: school.into_option(),
            attack_type: self.attack_type.into_option(),
        })
    }
}

#[async_trait]
impl SpellDataPort for SpellApiClient {
    async fn fetch_characters(&self) -> Result<Vec<Character>, DataError> {
        let dtos: Vec<CharacterDto> = self.get_json("fetch_characters", "/api/characters").await?;
        dtos.into_iter().map(CharacterDto::into_domain).collect()
    }

    async fn fetch_slot_tables(
        &self,
        character_id: CharacterId,
        _class_levels: &ClassLevels,
    ) -> Result<SlotTables, DataError> {
        let body = CharacterRefBody {
            id: character_id.to_uuid(),
        };
        let dto: SlotTablesDto = self
            .post_json("fetch_slot_tables", "/api/characters/slots", &body)
            .await?;
        Ok(dto.into())
    }

    async fn save_class_levels(
        &self,
        character_id: CharacterId,
        name: &CharacterName,
        class_levels: &ClassLevels,
    ) -> Result<(), DataError> {
        let body = SaveCharacterBody {
            id: character_id.to_uuid(),
            name: name.as_str(),
            class_levels: class_levels.clone().into(),
        };
        self.send(
            "save_class_levels",
            self.client.put(self.url("/api/characters")).json(&body),
        )
        .await?;
        Ok(())
    }

    async fn fetch_known_spells(&self, character_id: CharacterId) -> Result<Vec<Spell>, DataError> {
        let body = CharacterRefBody {
            id: character_id.to_uuid(),
        };
        let dtos: Option<Vec<SpellSummaryDto>> = self
            .post_json("fetch_known_spells", "/api/characters/spells/list", &body)
            .await?;
        dtos.unwrap_or_default()
            .into_iter()
            .map(|dto| dto.into_domain("fetch_known_spells"))
            .collect()
    }

    async fn add_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        let body = KnownSpellBody {
            id: character_id.to_uuid(),
            index: spell_id.as_str(),
        };
        self.send(
            "add_known_spell",
            self.client
                .post(self.url("/api/characters/spells"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn remove_known_spell(
        &self,
        character_id: CharacterId,
        spell_id: &SpellId,
    ) -> Result<(), DataError> {
        let body = KnownSpellBody {
            id: character_id.to_uuid(),
            index: spell_id.as_str(),
        };
        self.send(
            "remove_known_spell",
            self.client
                .post(self.url("/api/characters/spells/delete"))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn fetch_all_spells(&self) -> Result<Vec<Spell>, DataError> {
        self.fetch_spell_list("fetch_all_spells", "/api/spells").await
    }

    async fn fetch_spells_by_class(&self, class: &str) -> Result<Vec<Spell>, DataError> {
        let path = format!("/api/classes/{}", path_segment(class));
        self.fetch_spell_list("fetch_spells_by_class", &path).await
    }

    async fn fetch_spells_by_subclass(&self, subclass: &str) -> Result<Vec<Spell>, DataError> {
        let path = format!("/api/subclasses/{}", path_segment(subclass));
        self.fetch_spell_list("fetch_spells_by_subclass", &path).await
    }

    async fn fetch_spell_detail(&self, spell_id: &SpellId) -> Result<SpellDetail, DataError> {
        let path = format!("/api/spells/{}", spell_id.as_str());
        let response = self
            .send("fetch_spell_detail", self.client.get(self.url(&path)))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    DataError::not_found("Spell", spell_id)
                } else {
                    e
                }
            })?;
        let dto: SpellDetailDto = response
            .json()
            .await
            .map_err(|e| DataError::invalid_response("fetch_spell_detail", e))?;
        dto.into_domain(spell_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = SpellApiClient::new("http://localhost:8880/", Duration::from_secs(1));
        assert_eq!(client.url("/api/spells"), "http://localhost:8880/api/spells");
    }

    #[test]
    fn blank_token_is_ignored() {
        let client = SpellApiClient::new("http://localhost:8880", Duration::from_secs(1))
            .with_token(Some("  ".to_string()));
        assert!(client.token.is_none());
    }

    #[test]
    fn server_errors_are_unavailable_client_errors_are_rejected() {
        let err = status_error("fetch_all_spells", StatusCode::BAD_GATEWAY, String::new());
        assert!(err.is_retryable());
        let err = status_error("save_class_levels", StatusCode::BAD_REQUEST, "bad".into());
        assert!(matches!(err, DataError::Rejected { .. }));
        let err = status_error("fetch_spell_detail", StatusCode::NOT_FOUND, String::new());
        assert!(err.is_not_found());
    }

    #[test]
    fn class_names_become_path_segments() {
        assert_eq!(path_segment(" Wizard "), "wizard");
        assert_eq!(path_segment("Eldritch Knight"), "eldritch-knight");
    }

    #[test]
    fn slot_tables_decode_string_keys() {
        let dto: SlotTablesDto = serde_json::from_str(
            r#"{"full_caster_slots":{"1":4,"2":3,"3":2},"warlock_slots":null}"#,
        )
        .unwrap();
        let tables = SlotTables::from(dto);
        assert_eq!(tables.full_caster_slots.get(&2), Some(&3));
        assert!(tables.pact_slots.is_empty());
    }

    #[test]
    fn detail_decodes_school_object_and_blank_material() {
        let dto: SpellDetailDto = serde_json::from_str(
            r#"{
                "name": "Fireball", "level": 3, "range": "150 feet",
                "casting_time": "1 action", "duration": "Instantaneous",
                "components": ["V", "S", "M"], "material": "",
                "desc": ["A bright streak..."], "higher_level": null,
                "concentration": false, "ritual": false, "attack_type": "",
                "school": {"index": "evocation", "name": "Evocation"}
            }"#,
        )
        .unwrap();
        let detail = dto.into_domain(SpellId::new("fireball").unwrap()).unwrap();
        assert_eq!(detail.school.as_deref(), Some("Evocation"));
        assert_eq!(detail.material, None);
        assert_eq!(detail.attack_type, None);
        assert_eq!(detail.components_display(), "V, S, M");
        assert!(!detail.has_higher_level_effects());
    }

    #[test]
    fn character_with_invalid_level_is_an_invalid_response() {
        let dto: CharacterDto = serde_json::from_str(&format!(
            r#"{{"id":"{}","name":"Mira","class_levels":{{"wizard":42}}}}"#,
            Uuid::new_v4()
        ))
        .unwrap();
        assert!(matches!(
            dto.into_domain(),
            Err(DataError::InvalidResponse { .. })
        ));
    }
}
