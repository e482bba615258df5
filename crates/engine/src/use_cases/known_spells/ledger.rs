use spellbook_domain::{sort_spells, CharacterId, Spell, SpellFilter, SpellId};

/// The spells one character has learned.
///
/// Each id appears at most once. The ledger is a value: add and remove
/// produce a new ledger so a failed write leaves the old one intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownSpellLedger {
    character_id: CharacterId,
    spells: Vec<Spell>,
}

impl KnownSpellLedger {
    pub fn new(character_id: CharacterId, spells: Vec<Spell>) -> Self {
        let mut unique: Vec<Spell> = Vec::with_capacity(spells.len());
        for spell in spells {
            if !unique.iter().any(|known| known.id == spell.id) {
                unique.push(spell);
            }
        }
        sort_spells(&mut unique);
        Self {
            character_id,
            spells: unique,
        }
    }

    pub fn empty(character_id: CharacterId) -> Self {
        Self {
            character_id,
            spells: Vec::new(),
        }
    }

    pub fn character_id(&self) -> CharacterId {
        self.character_id
    }

    /// Known spells in display order.
    pub fn spells(&self) -> &[Spell] {
        &self.spells
    }

    pub fn get(&self, spell_id: &SpellId) -> Option<&Spell> {
        self.spells.iter().find(|spell| &spell.id == spell_id)
    }

    pub fn contains(&self, spell_id: &SpellId) -> bool {
        self.get(spell_id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SpellId> {
        self.spells.iter().map(|spell| &spell.id)
    }

    pub fn len(&self) -> usize {
        self.spells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spells.is_empty()
    }

    /// A ledger that also knows `spell`. Already-known spells are not duplicated.
    pub fn with_spell(&self, spell: Spell) -> Self {
        let mut spells = self.spells.clone();
        spells.push(spell);
        Self::new(self.character_id, spells)
    }

    pub fn without(&self, spell_id: &SpellId) -> Self {
        Self {
            character_id: self.character_id,
            spells: self
                .spells
                .iter()
                .filter(|spell| &spell.id != spell_id)
                .cloned()
                .collect(),
        }
    }

    /// Known spells passing the local predicates of `filter`.
    ///
    /// Class and subclass membership is not consulted here.
    pub fn view(&self, filter: &SpellFilter) -> Vec<Spell> {
        self.spells
            .iter()
            .filter(|spell| filter.matches_local(spell))
            .cloned()
            .collect()
    }
}
