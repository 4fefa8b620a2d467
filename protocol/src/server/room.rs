//! Room control lines that drive battle room lifecycle

use crate::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    Chat,
    Battle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomMessage {
    /// |init|ROOMTYPE
    Init(RoomType),
    /// |deinit
    DeInit,
    /// |noinit|REASON|MESSAGE
    NoInit { reason: String, message: String },
    /// |title|TITLE
    Title(String),
    /// |error|MESSAGE
    Error(String),
}

pub fn parse_init(args: &[&str]) -> Result<RoomMessage, ParseError> {
    let room_type = match args.first() {
        Some(&"chat") => RoomType::Chat,
        Some(&"battle") => RoomType::Battle,
        Some(other) => {
            return Err(ParseError::InvalidFormat(format!("unknown room type: {}", other)));
        }
        None => return Err(ParseError::MissingField("init fields".to_string())),
    };

    Ok(RoomMessage::Init(room_type))
}

pub fn parse_noinit(args: &[&str]) -> Result<RoomMessage, ParseError> {
    Ok(RoomMessage::NoInit {
        reason: args.first().unwrap_or(&"").to_string(),
        message: args.iter().skip(1).copied().collect::<Vec<_>>().join("|"),
    })
}

pub fn parse_title(args: &[&str]) -> Result<RoomMessage, ParseError> {
    if args.is_empty() {
        return Err(ParseError::MissingField("title field".to_string()));
    }

    Ok(RoomMessage::Title(args.join("|")))
}

pub fn parse_error(args: &[&str]) -> Result<RoomMessage, ParseError> {
    Ok(RoomMessage::Error(args.join("|")))
}
