//! Character entity - the spellcaster whose slots and spells are managed.

use serde::{Deserialize, Serialize};

use crate::ids::CharacterId;
use crate::value_objects::{CharacterName, ClassLevels};

/// A player character.
///
/// Created by the character-creation flow outside this crate; the spellbook
/// only reads it and replaces its name and class levels through a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    id: CharacterId,
    name: CharacterName,
    #[serde(default)]
    class_levels: ClassLevels,
}

impl Character {
    pub fn new(name: CharacterName) -> Self {
        Self {
            id: CharacterId::new(),
            name,
            class_levels: ClassLevels::new(),
        }
    }

    // =========================================================================
    // Builder methods
    // =========================================================================

    pub fn with_id(mut self, id: CharacterId) -> Self {
        self.id = id;
        self
    }

    pub fn with_class_levels(mut self, class_levels: ClassLevels) -> Self {
        self.class_levels = class_levels;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &CharacterName {
        &self.name
    }

    pub fn class_levels(&self) -> &ClassLevels {
        &self.class_levels
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Replace name and class levels after the backend confirmed the save.
    ///
    /// Both values are swapped in together; there is no partial update.
    pub fn replace_class_levels(&mut self, name: CharacterName, class_levels: ClassLevels) {
        self.name = name;
        self.class_levels = class_levels;
    }
}
