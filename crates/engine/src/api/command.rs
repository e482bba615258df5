//! REPL command parsing.

use std::str::FromStr;

use spellbook_domain::{CharacterId, DomainError, ResourceClass, SpellId};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for a list of commands.")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// How a character is picked: roster position or id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterRef {
    Position(usize),
    Id(CharacterId),
}

impl FromStr for CharacterRef {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(position) = s.parse::<usize>() {
            return Ok(Self::Position(position));
        }
        s.parse::<CharacterId>()
            .map(Self::Id)
            .map_err(|_| CommandError::Usage(SELECT_USAGE))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Characters,
    Select(CharacterRef),
    Slots,
    Slot {
        resource_class: ResourceClass,
        level: u8,
    },
    Cantrips,
    Castable,
    /// Cast a known spell, or spend the selected slot when no spell is named
    Cast(Option<SpellId>),
    ShortRest,
    LongRest,
    /// `key=value` filter changes applied on top of the current filter
    Filter(Vec<String>),
    FilterClear,
    Results,
    Known,
    Add(SpellId),
    Remove(SpellId),
    Detail(SpellId),
    Levels(Vec<String>),
    Rename(String),
    Subclasses(String),
    Help,
    Quit,
}

const SELECT_USAGE: &str = "select <number|character-id>";
const SLOT_USAGE: &str = "slot <full|pact> <level>";
const FILTER_USAGE: &str = "filter <key>=<value>... | filter clear";
const LEVELS_USAGE: &str = "levels <class>=<level>...";

pub const HELP: &str = "\
Commands:
  characters                     list characters
  select <n|id>                  select a character
  slots                          show slots as remaining/max
  slot <full|pact> <level>       toggle the slot for the next cast
  cantrips                       select cantrips (level 0)
  castable                       known spells castable with the selected slot
  cast [spell-id]                cast with the selected slot
  short-rest | long-rest         recover slots
  filter <key>=<value>...        keys: search, level, concentration, ritual, class, subclass
  filter clear                   reset the spell filter
  results                        show the filtered spells
  known                          known spells matching the name/level/flag filters
  add <spell-id>                 learn a spell
  remove <spell-id>              forget a spell
  detail <spell-id>              show spell details
  levels <class>=<level>...      change class levels
  rename <name>                  rename the character
  subclasses <class>             subclasses available for a class
  help | quit";

/// Parse one input line. Blank lines give `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    let Some((name, rest)) = split_first(line) else {
        return Ok(None);
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let command = match name.to_lowercase().as_str() {
        "characters" | "chars" => Command::Characters,
        "select" => match args.as_slice() {
            [target] => Command::Select(target.parse()?),
            _ => return Err(CommandError::Usage(SELECT_USAGE)),
        },
        "slots" => Command::Slots,
        "slot" => match args.as_slice() {
            [resource_class, level] => Command::Slot {
                resource_class: resource_class.parse()?,
                level: level.parse().map_err(|_| CommandError::Usage(SLOT_USAGE))?,
            },
            _ => return Err(CommandError::Usage(SLOT_USAGE)),
        },
        "cantrips" => Command::Cantrips,
        "castable" => Command::Castable,
        "cast" => match args.as_slice() {
            [] => Command::Cast(None),
            [spell_id] => Command::Cast(Some(SpellId::new(spell_id.to_lowercase())?)),
            _ => return Err(CommandError::Usage("cast [spell-id]")),
        },
        "short-rest" | "short" => Command::ShortRest,
        "long-rest" | "long" => Command::LongRest,
        "filter" => match args.as_slice() {
            [] => return Err(CommandError::Usage(FILTER_USAGE)),
            ["clear"] => Command::FilterClear,
            _ => Command::Filter(join_assignments(rest)),
        },
        "results" => Command::Results,
        "known" => Command::Known,
        "add" => Command::Add(single_spell(&args, "add <spell-id>")?),
        "remove" => Command::Remove(single_spell(&args, "remove <spell-id>")?),
        "detail" => Command::Detail(single_spell(&args, "detail <spell-id>")?),
        "levels" => {
            if args.is_empty() {
                return Err(CommandError::Usage(LEVELS_USAGE));
            }
            Command::Levels(args.iter().map(|a| a.to_string()).collect())
        }
        "rename" => {
            if rest.is_empty() {
                return Err(CommandError::Usage("rename <name>"));
            }
            Command::Rename(rest.to_string())
        }
        "subclasses" => match args.as_slice() {
            [class] => Command::Subclasses(class.to_lowercase()),
            _ => return Err(CommandError::Usage("subclasses <class>")),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn split_first(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    })
}

fn single_spell(args: &[&str], usage: &'static str) -> Result<SpellId, CommandError> {
    match args {
        [spell_id] => Ok(SpellId::new(spell_id.to_lowercase())?),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// Split `key=value` pairs, letting values contain spaces:
/// `search=detect magic ritual=yes` gives two assignments.
fn join_assignments(input: &str) -> Vec<String> {
    let mut assignments: Vec<String> = Vec::new();
    for word in input.split_whitespace() {
        match assignments.last_mut() {
            Some(last) if !word.contains('=') => {
                last.push(' ');
                last.push_str(word);
            }
            _ => assignments.push(word.to_string()),
        }
    }
    assignments
}
