//! Command dispatch for the interactive shell.
//!
//! Every command produces either output lines or a [`Notice`]. Nothing
//! here ends the session; `main` decides when to stop reading input.

use std::sync::Arc;

use spellbook_domain::{
    subclass_options, Character, ResourceClass, SlotPool, SlotPools, SlotSelection, Spell,
    SpellDetail, SpellFilter,
};

use crate::app::App;
use crate::use_cases::{CastOutcome, FilterOutcome, Notice, SessionError, SessionOutcome};

use super::command::{CharacterRef, Command, HELP};

pub struct Repl {
    app: Arc<App>,
}

impl Repl {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    /// Run one command.
    pub async fn execute(&self, command: Command) -> Result<Vec<String>, Notice> {
        let session = &self.app.use_cases.session;
        let pipeline = &self.app.use_cases.spell_filter;

        match command {
            Command::Characters => {
                let characters = session.list_characters().await.map_err(notice)?;
                if characters.is_empty() {
                    return Ok(vec!["No characters".to_string()]);
                }
                Ok(characters
                    .iter()
                    .enumerate()
                    .map(|(index, character)| {
                        format!("{:>3}. {}  {}", index + 1, describe(character), character.id())
                    })
                    .collect())
            }
            Command::Select(target) => {
                let outcome = match target {
                    CharacterRef::Position(position) => session.select_index(position).await,
                    CharacterRef::Id(id) => session.select_character(id).await,
                }
                .map_err(notice)?;
                Ok(match outcome {
                    SessionOutcome::Applied(character) => {
                        let mut lines = vec![format!("Selected {}", describe(&character))];
                        lines.extend(self.slot_lines().await?);
                        lines
                    }
                    SessionOutcome::Superseded => {
                        vec![Notice::info("Selection superseded by a newer one").to_string()]
                    }
                })
            }
            Command::Slots => self.slot_lines().await,
            Command::Slot {
                resource_class,
                level,
            } => {
                let selection = session
                    .select_slot(resource_class, level)
                    .await
                    .map_err(notice)?;
                Ok(vec![describe_selection(selection)])
            }
            Command::Cantrips => {
                let selection = session
                    .select_slot(ResourceClass::FullCaster, 0)
                    .await
                    .map_err(notice)?;
                Ok(vec![describe_selection(selection)])
            }
            Command::Castable => {
                let spells = session.castable().await.map_err(notice)?;
                if spells.is_empty() && session.selection().await.map_err(notice)?.is_none() {
                    return Ok(vec!["Select a slot first".to_string()]);
                }
                Ok(spell_lines(&spells))
            }
            Command::Cast(spell_id) => {
                let outcome = match spell_id {
                    Some(spell_id) => session.cast(&spell_id).await,
                    None => session.cast_selected().await,
                }
                .map_err(notice)?;
                Ok(vec![match outcome {
                    CastOutcome::Cantrip => "Cast a cantrip".to_string(),
                    CastOutcome::SlotExpended {
                        resource_class,
                        level,
                        remaining,
                    } => format!(
                        "Spent a {} level {} slot ({} left)",
                        resource_class, level, remaining
                    ),
                }])
            }
            Command::ShortRest => {
                session.short_rest().await.map_err(notice)?;
                let mut lines = vec!["Short rest: pact slots recovered".to_string()];
                lines.extend(self.slot_lines().await?);
                Ok(lines)
            }
            Command::LongRest => {
                session.long_rest().await.map_err(notice)?;
                let mut lines = vec!["Long rest: all slots recovered".to_string()];
                lines.extend(self.slot_lines().await?);
                Ok(lines)
            }
            Command::Filter(assignments) => {
                let mut filter = pipeline.current_filter().await;
                for assignment in &assignments {
                    filter = filter
                        .with_assignment(assignment)
                        .map_err(|e| notice(SessionError::Validation(e)))?;
                }
                self.apply_filter(filter).await
            }
            Command::FilterClear => self.apply_filter(SpellFilter::new()).await,
            Command::Results => match pipeline.refresh().await.map_err(|e| Notice::from(&e))? {
                FilterOutcome::Applied(spells) => Ok(spell_lines(&spells)),
                FilterOutcome::Superseded => Ok(spell_lines(&pipeline.current_results().await)),
            },
            Command::Known => {
                let filter = pipeline.current_filter().await;
                let spells = session.known_view(&filter).await.map_err(notice)?;
                Ok(spell_lines(&spells))
            }
            Command::Add(spell_id) => {
                match session.add_spell(&spell_id).await.map_err(notice)? {
                    SessionOutcome::Applied(ledger) => Ok(vec![format!(
                        "Learned {} ({} known)",
                        spell_id,
                        ledger.len()
                    )]),
                    SessionOutcome::Superseded => Ok(vec![
                        Notice::info("Character changed before the spell was added").to_string(),
                    ]),
                }
            }
            Command::Remove(spell_id) => {
                match session.remove_spell(&spell_id).await.map_err(notice)? {
                    SessionOutcome::Applied(ledger) => Ok(vec![format!(
                        "Forgot {} ({} known)",
                        spell_id,
                        ledger.len()
                    )]),
                    SessionOutcome::Superseded => Ok(vec![
                        Notice::info("Character changed before the spell was removed").to_string(),
                    ]),
                }
            }
            Command::Detail(spell_id) => {
                let detail = self
                    .app
                    .stores
                    .details
                    .get(&spell_id)
                    .await
                    .map_err(|e| Notice::from(&e))?;
                Ok(detail_lines(&detail))
            }
            Command::Levels(assignments) => self.save_levels(None, &assignments).await,
            Command::Rename(name) => self.save_levels(Some(&name), &[]).await,
            Command::Subclasses(class) => {
                let options = subclass_options(&class);
                if options.is_empty() {
                    return Ok(vec![format!("No subclass spell lists for {}", class)]);
                }
                Ok(options.iter().map(|option| format!("  {}", option)).collect())
            }
            Command::Help => Ok(HELP.lines().map(str::to_string).collect()),
            Command::Quit => Ok(Vec::new()),
        }
    }

    async fn slot_lines(&self) -> Result<Vec<String>, Notice> {
        let session = &self.app.use_cases.session;
        let pools = session.pools().await.map_err(notice)?;
        let selection = session.selection().await.map_err(notice)?;
        Ok(pool_lines(&pools, selection))
    }

    async fn apply_filter(&self, filter: SpellFilter) -> Result<Vec<String>, Notice> {
        let pipeline = &self.app.use_cases.spell_filter;
        match pipeline.apply(filter).await.map_err(|e| Notice::from(&e))? {
            FilterOutcome::Applied(spells) => Ok(spell_lines(&spells)),
            FilterOutcome::Superseded => {
                Ok(vec![Notice::info("Filter superseded by a newer one").to_string()])
            }
        }
    }

    async fn save_levels(
        &self,
        name: Option<&str>,
        assignments: &[String],
    ) -> Result<Vec<String>, Notice> {
        let session = &self.app.use_cases.session;
        match session.save_levels(name, assignments).await.map_err(notice)? {
            SessionOutcome::Applied(saved) => {
                let mut lines = vec![format!("Saved {}", describe(&saved.character))];
                match saved.slot_error {
                    Some(e) => lines.push(
                        Notice::warning(format!("Slots unavailable until reselected: {}", e))
                            .to_string(),
                    ),
                    None => lines.extend(self.slot_lines().await?),
                }
                Ok(lines)
            }
            SessionOutcome::Superseded => {
                Ok(vec![
                    Notice::info("Saved, but another character is now selected").to_string(),
                ])
            }
        }
    }
}

fn notice(error: SessionError) -> Notice {
    Notice::from(&error)
}

fn describe(character: &Character) -> String {
    format!("{} ({})", character.name(), character.class_levels())
}

fn describe_selection(selection: Option<SlotSelection>) -> String {
    match selection {
        Some(selection) => format!("Selected {}", selection),
        None => "Selection cleared".to_string(),
    }
}

fn pool_line(pool: &SlotPool, selection: Option<SlotSelection>) -> String {
    let label = match pool.resource_class() {
        ResourceClass::FullCaster => "full",
        ResourceClass::Pact => "pact",
    };
    if pool.is_empty() {
        return format!("{}: none", label);
    }
    let levels: Vec<String> = pool
        .levels()
        .map(|slot| {
            let marker = match selection {
                Some(s) if s.resource_class == pool.resource_class() && s.level == slot.level() => {
                    "*"
                }
                _ => "",
            };
            format!("L{} {}/{}{}", slot.level(), slot.remaining(), slot.max(), marker)
        })
        .collect();
    format!("{}: {}", label, levels.join("  "))
}

/// Slot display: remaining/max per level, `*` on the selected slot.
pub fn pool_lines(pools: &SlotPools, selection: Option<SlotSelection>) -> Vec<String> {
    let mut lines = vec![
        pool_line(&pools.full_caster, selection),
        pool_line(&pools.pact, selection),
    ];
    if selection.is_some_and(|s| s.is_cantrip()) {
        lines.push("cantrips selected".to_string());
    }
    lines
}

pub fn spell_lines(spells: &[Spell]) -> Vec<String> {
    if spells.is_empty() {
        return vec!["No spells".to_string()];
    }
    spells
        .iter()
        .map(|spell| {
            let mut flags = String::new();
            if spell.concentration {
                flags.push_str(" [C]");
            }
            if spell.ritual {
                flags.push_str(" [R]");
            }
            format!("  {:<8} {} ({}){}", spell.level.to_string(), spell.name, spell.id, flags)
        })
        .collect()
}

fn detail_lines(detail: &SpellDetail) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", detail.name, detail.level)];
    if let Some(school) = &detail.school {
        lines.push(format!("School: {}", school));
    }
    lines.push(format!("Casting time: {}", detail.casting_time));
    lines.push(format!("Range: {}", detail.range));
    lines.push(format!("Duration: {}", detail.duration));
    let mut components = detail.components_display();
    if let Some(material) = &detail.material {
        components = format!("{} ({})", components, material);
    }
    lines.push(format!("Components: {}", components));
    if let Some(attack_type) = &detail.attack_type {
        lines.push(format!("Attack: {}", attack_type));
    }
    if detail.concentration || detail.ritual {
        let mut tags = Vec::new();
        if detail.concentration {
            tags.push("concentration");
        }
        if detail.ritual {
            tags.push("ritual");
        }
        lines.push(tags.join(", "));
    }
    lines.push(String::new());
    lines.extend(detail.description.iter().cloned());
    if detail.has_higher_level_effects() {
        lines.push(String::new());
        lines.push("At higher levels:".to_string());
        lines.extend(detail.higher_level.iter().cloned());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::parse_command;
    use crate::infrastructure::in_memory::InMemorySpellData;

    const SEED: &str = r#"{
        "spells": [
            {"index": "fire-bolt", "name": "Fire Bolt", "level": 0,
             "classes": [{"name": "Wizard"}, {"name": "Sorcerer"}],
             "desc": ["You hurl a mote of fire."], "range": "120 feet",
             "components": ["V", "S"], "duration": "Instantaneous",
             "casting_time": "1 action", "attack_type": "ranged",
             "school": {"name": "Evocation"}},
            {"index": "detect-magic", "name": "Detect Magic", "level": 1,
             "ritual": true, "concentration": true,
             "classes": [{"name": "Wizard"}, {"name": "Cleric"}]},
            {"index": "cure-wounds", "name": "Cure Wounds", "level": 1,
             "classes": [{"name": "Cleric"}], "subclasses": [{"name": "Life"}]},
            {"index": "misty-step", "name": "Misty Step", "level": 2,
             "classes": [{"name": "Wizard"}, {"name": "Warlock"}]},
            {"index": "fireball", "name": "Fireball", "level": 3,
             "classes": [{"name": "Wizard"}], "subclasses": [{"name": "Fiend"}]}
        ],
        "characters": [
            {"name": "Elminster", "class_levels": {"wizard": 5},
             "spells": ["fire-bolt", "misty-step", "fireball"]},
            {"name": "Hexblade", "class_levels": {"warlock": 3}}
        ]
    }"#;

    fn repl() -> Repl {
        let data = InMemorySpellData::from_json_str(SEED).unwrap();
        Repl::new(Arc::new(App::new(Arc::new(data), true)))
    }

    async fn run(repl: &Repl, line: &str) -> Result<Vec<String>, Notice> {
        repl.execute(parse_command(line).unwrap().unwrap()).await
    }

    #[tokio::test]
    async fn select_and_cast_updates_slot_display() {
        let repl = repl();
        let listed = run(&repl, "characters").await.unwrap();
        assert!(listed[0].contains("Elminster (wizard 5)"));

        let selected = run(&repl, "select 1").await.unwrap();
        assert_eq!(selected[1], "full: L1 4/4  L2 3/3  L3 2/2");
        assert_eq!(selected[2], "pact: none");

        run(&repl, "slot full 2").await.unwrap();
        assert_eq!(
            run(&repl, "slots").await.unwrap()[0],
            "full: L1 4/4  L2 3/3*  L3 2/2"
        );
        let cast = run(&repl, "cast misty-step").await.unwrap();
        assert_eq!(cast, vec!["Spent a full level 2 slot (2 left)"]);

        let rested = run(&repl, "long-rest").await.unwrap();
        assert_eq!(rested[1], "full: L1 4/4  L2 3/3  L3 2/2");
    }

    #[tokio::test]
    async fn failures_become_notices() {
        let repl = repl();
        let err = run(&repl, "slots").await.unwrap_err();
        assert_eq!(err.to_string(), "[warn] No character selected");

        run(&repl, "select 2").await.unwrap();
        let err = run(&repl, "slot full 1").await.unwrap_err();
        assert!(err.message.contains("No level 1 slot"));

        let err = run(&repl, "detail wish").await.unwrap_err();
        assert!(err.message.contains("wish"));
    }

    #[tokio::test]
    async fn filters_accumulate_and_clear() {
        let repl = repl();
        let wizard = run(&repl, "filter class=wizard").await.unwrap();
        assert_eq!(wizard.len(), 4);

        let rituals = run(&repl, "filter ritual=yes").await.unwrap();
        assert_eq!(rituals.len(), 1);
        assert!(rituals[0].contains("Detect Magic"));

        let fiend = run(&repl, "filter ritual=no subclass=fiend").await.unwrap();
        assert_eq!(fiend.len(), 1);
        assert!(fiend[0].contains("fireball"));

        let all = run(&repl, "filter clear").await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn known_view_uses_local_filter() {
        let repl = repl();
        run(&repl, "select 1").await.unwrap();
        run(&repl, "filter search=fire").await.unwrap();
        let known = run(&repl, "known").await.unwrap();
        assert_eq!(known.len(), 2);

        run(&repl, "add detect-magic").await.unwrap();
        run(&repl, "filter clear").await.unwrap();
        assert_eq!(run(&repl, "known").await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn detail_shows_record() {
        let repl = repl();
        let lines = run(&repl, "detail fire-bolt").await.unwrap();
        assert_eq!(lines[0], "Fire Bolt (Cantrip)");
        assert!(lines.contains(&"School: Evocation".to_string()));
        assert!(lines.contains(&"Attack: ranged".to_string()));
        assert!(lines.contains(&"You hurl a mote of fire.".to_string()));
    }

    #[tokio::test]
    async fn levels_rederive_slots() {
        let repl = repl();
        run(&repl, "select 2").await.unwrap();
        let saved = run(&repl, "levels warlock=5").await.unwrap();
        assert_eq!(saved[0], "Saved Hexblade (warlock 5)");
        assert_eq!(saved[2], "pact: L3 2/2");

        assert!(run(&repl, "levels warlock=30").await.is_err());
    }
}
