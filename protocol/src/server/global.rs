//! Global (non-room) control lines consumed by the session layer

use super::battle::{GameType, to_id};
use crate::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum GlobalMessage {
    /// |updateuser|USER|NAMED|AVATAR
    UpdateUser {
        username: String,
        named: bool,
        avatar: String,
    },
    /// |formats|FORMATSLIST
    Formats(Vec<FormatSection>),
}

/// A titled group of formats in the server's format list
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSection {
    pub column: u32,
    pub name: String,
    pub formats: Vec<Format>,
}

/// One format entry with its display flags
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    pub name: String,
    pub random_team: bool,
    pub search_show: bool,
    pub challenge_show: bool,
    pub tournament_show: bool,
    pub level_50: bool,
    pub best_of: bool,
    pub tera_preview: bool,
}

impl Format {
    /// Format id ("[Gen 9] Doubles OU" -> "gen9doublesou")
    pub fn id(&self) -> String {
        to_id(&self.name)
    }

    /// Game type implied by the format name
    pub fn game_type(&self) -> GameType {
        game_type_of(&self.id())
    }
}

/// Game type implied by a format id ("gen9doublesou" -> doubles)
pub fn game_type_of(format_id: &str) -> GameType {
    if format_id.contains("freeforall") {
        GameType::FreeForAll
    } else if format_id.contains("multi") {
        GameType::Multi
    } else if format_id.contains("triples") {
        GameType::Triples
    } else if format_id.contains("doubles") || format_id.contains("vgc") {
        GameType::Doubles
    } else {
        GameType::Singles
    }
}

/// Parse |updateuser|USER|NAMED|AVATAR
pub fn parse_updateuser(args: &[&str]) -> Result<GlobalMessage, ParseError> {
    if args.len() < 2 {
        return Err(ParseError::MissingField("updateuser fields".to_string()));
    }

    // Usernames arrive with a leading rank symbol (" Alice", "+Bob")
    let raw = args[0];
    let username = match raw.chars().next() {
        Some(c) if !c.is_alphanumeric() => raw[c.len_utf8()..].to_string(),
        _ => raw.to_string(),
    };

    Ok(GlobalMessage::UpdateUser {
        username,
        named: args[1] == "1",
        avatar: args.get(2).unwrap_or(&"").to_string(),
    })
}

/// Parse |formats|FORMATSLIST
///
/// Sections start with ",N" where N is the column number, followed by the
/// section name and then "Name,HEXFLAGS" entries.
pub fn parse_formats(args: &[&str]) -> Result<GlobalMessage, ParseError> {
    let mut sections = Vec::new();
    let mut current_section: Option<FormatSection> = None;

    for part in args {
        if part.is_empty() {
            if let Some(section) = current_section.take() {
                sections.push(section);
            }
            continue;
        }

        if let Some(col_str) = part.strip_prefix(',') {
            if let Some(section) = current_section.take() {
                sections.push(section);
            }
            if let Ok(column) = col_str.parse::<u32>() {
                current_section = Some(FormatSection {
                    column,
                    name: String::new(),
                    formats: Vec::new(),
                });
            }
            continue;
        }

        if let Some(ref mut section) = current_section {
            if section.name.is_empty() {
                section.name = part.to_string();
            } else {
                section.formats.push(parse_format_entry(part));
            }
        }
    }

    if let Some(section) = current_section {
        sections.push(section);
    }

    Ok(GlobalMessage::Formats(sections))
}

fn parse_format_entry(entry: &str) -> Format {
    let (name, flags) = match entry.rsplit_once(',') {
        Some((name, hex)) => (name, u8::from_str_radix(hex, 16).unwrap_or(0)),
        None => (entry, 0),
    };

    Format {
        name: name.to_string(),
        random_team: flags & 1 != 0,
        search_show: flags & 2 != 0,
        challenge_show: flags & 4 != 0,
        tournament_show: flags & 8 != 0,
        level_50: flags & 16 != 0,
        best_of: flags & 64 != 0,
        tera_preview: flags & 128 != 0,
    }
}
