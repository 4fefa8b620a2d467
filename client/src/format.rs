//! Format details derived from battle room ids and the server format list

use std::collections::HashMap;

use showbot_protocol::server::global::{FormatSection, game_type_of};
use showbot_protocol::{GameType, to_id};

/// What a battle's format says about how it is played
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatDetails {
    pub generation: u8,
    /// Format id ("gen9doublesou")
    pub format_id: String,
    pub game_type: GameType,
    /// Display name from the server format list, when known
    pub name: Option<String>,
    pub random_team: bool,
}

impl FormatDetails {
    /// Details read from the room id alone.
    ///
    /// `battle-gen9doublesou-123` gives generation 9, format
    /// `gen9doublesou` and doubles. Ids without a generation prefix fall back
    /// to `latest_generation`; the game type falls back to singles.
    pub fn from_battle_id(battle_id: &str, latest_generation: u8) -> Self {
        let rest = battle_id.strip_prefix("battle-").unwrap_or(battle_id);
        let format_id = rest.split('-').next().unwrap_or_default().to_string();

        let generation = format_id
            .strip_prefix("gen")
            .map(|tail| {
                tail.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
            })
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(latest_generation);

        Self {
            generation,
            game_type: game_type_of(&format_id),
            format_id,
            name: None,
            random_team: false,
        }
    }
}

/// A format as listed by the server
#[derive(Debug, Clone, PartialEq)]
pub struct FormatEntry {
    pub name: String,
    pub game_type: GameType,
    pub random_team: bool,
}

/// Format metadata keyed by format id, refreshed from `|formats|` lines
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    formats: HashMap<String, FormatEntry>,
}

impl FormatTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table with a freshly received format list
    pub fn update(&mut self, sections: &[FormatSection]) {
        self.formats = sections
            .iter()
            .flat_map(|section| {
                let section_type = game_type_of(&to_id(&section.name));
                section.formats.iter().map(move |format| {
                    // Names like "Partners in Crime" only say doubles through
                    // the section they are listed under
                    let game_type = match format.game_type() {
                        GameType::Singles => section_type,
                        game_type => game_type,
                    };
                    (
                        format.id(),
                        FormatEntry {
                            name: format.name.clone(),
                            game_type,
                            random_team: format.random_team,
                        },
                    )
                })
            })
            .collect();
    }

    pub fn get(&self, format_id: &str) -> Option<&FormatEntry> {
        self.formats.get(&to_id(format_id))
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Details for a battle room, with listed formats taking precedence over
    /// what the room id implies
    pub fn details(&self, battle_id: &str, latest_generation: u8) -> FormatDetails {
        let mut details = FormatDetails::from_battle_id(battle_id, latest_generation);
        if let Some(entry) = self.get(&details.format_id) {
            details.game_type = entry.game_type;
            details.name = Some(entry.name.clone());
            details.random_team = entry.random_team;
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use showbot_protocol::{GlobalMessage, ServerMessage, parse_server_message};

    use super::*;

    #[test]
    fn test_details_from_battle_id() {
        let details = FormatDetails::from_battle_id("battle-gen9doublesou-123", 9);
        assert_eq!(details.generation, 9);
        assert_eq!(details.format_id, "gen9doublesou");
        assert_eq!(details.game_type, GameType::Doubles);

        let details = FormatDetails::from_battle_id("battle-gen4ou-55-secretpassword", 9);
        assert_eq!(details.generation, 4);
        assert_eq!(details.format_id, "gen4ou");
        assert_eq!(details.game_type, GameType::Singles);
    }

    #[test]
    fn test_details_defaults() {
        let details = FormatDetails::from_battle_id("battle-customgame-7", 9);
        assert_eq!(details.generation, 9);
        assert_eq!(details.game_type, GameType::Singles);
        assert_eq!(details.name, None);
    }

    #[test]
    fn test_format_table_overrides_game_type() {
        let line = "|formats|,1|S/V Singles|[Gen 9] Random Battle,f|[Gen 9] OU,e|,1|S/V Doubles|[Gen 9] Partners in Crime,e";
        let Ok(ServerMessage::Global(GlobalMessage::Formats(sections))) = parse_server_message(line)
        else {
            panic!("expected a format list");
        };
        let mut table = FormatTable::new();
        table.update(&sections);
        assert_eq!(table.len(), 3);

        assert_eq!(
            FormatDetails::from_battle_id("battle-gen9partnersincrime-42", 9).game_type,
            GameType::Singles
        );
        let details = table.details("battle-gen9partnersincrime-42", 9);
        assert_eq!(details.game_type, GameType::Doubles);
        assert_eq!(details.name.as_deref(), Some("[Gen 9] Partners in Crime"));

        let details = table.details("battle-gen9randombattle-1", 9);
        assert!(details.random_team);
        assert_eq!(details.game_type, GameType::Singles);
    }
}
