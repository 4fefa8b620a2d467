mod choice;

pub use choice::{BattleDecision, Gimmick, SubDecision};

/// Commands that clients can send to server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// /choose CHOICE|RQID
    Choose(ChoiceMessage),

    /// /undo
    Undo,

    /// /leave ROOMID
    LeaveRoom(String),

    /// Raw command for catch-all
    Raw(String),
}

/// A decision bound to the request it answers
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceMessage {
    pub decision: BattleDecision,
    pub rqid: Option<u64>,
}

impl ChoiceMessage {
    pub fn to_protocol_string(&self) -> String {
        let choice = self.decision.to_choice_string();
        match self.rqid {
            Some(rqid) => format!("/choose {}|{}", choice, rqid),
            None => format!("/choose {}", choice),
        }
    }
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Choose(choice) => choice.to_protocol_string(),
            Self::Undo => "/undo".to_string(),
            Self::LeaveRoom(room) => format!("/leave {}", room),
            Self::Raw(command) => command.clone(),
        }
    }
}

/// Client message with optional room context
#[derive(Debug, Clone, PartialEq)]
pub struct ClientMessage {
    pub room_id: Option<String>,
    pub command: ClientCommand,
}

impl ClientMessage {
    pub fn room(room_id: impl Into<String>, command: ClientCommand) -> Self {
        Self {
            room_id: Some(room_id.into()),
            command,
        }
    }

    /// Serialize to wire format: ROOMID|TEXT or |TEXT
    pub fn to_wire_format(&self) -> String {
        let text = self.command.to_protocol_string();
        match &self.room_id {
            Some(room) => format!("{}|{}", room, text),
            None => format!("|{}", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_wire_format() {
        let message = ClientMessage::room(
            "battle-gen9ou-1",
            ClientCommand::Choose(ChoiceMessage {
                decision: BattleDecision::Active(vec![SubDecision::move_index(2)]),
                rqid: Some(5),
            }),
        );
        assert_eq!(message.to_wire_format(), "battle-gen9ou-1|/choose move 2|5");
    }

    #[test]
    fn test_undo_wire_format() {
        let message = ClientMessage::room("battle-gen9ou-1", ClientCommand::Undo);
        assert_eq!(message.to_wire_format(), "battle-gen9ou-1|/undo");
    }

    #[test]
    fn test_global_message() {
        let message = ClientMessage {
            room_id: None,
            command: ClientCommand::Raw("/cmd rooms".to_string()),
        };
        assert_eq!(message.to_wire_format(), "|/cmd rooms");
    }
}
