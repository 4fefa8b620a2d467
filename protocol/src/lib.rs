use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{BattleDecision, ChoiceMessage, ClientCommand, ClientMessage, Gimmick, SubDecision};
pub use server::battle::{
    Effect, EffectKind, GameType, Gender, HpCondition, Player, PokemonDetails, PokemonIdent, Side,
    Stat, to_id,
};
pub use server::event::{BattleEvent, Knowledge, MajorEvent, MinorAction, MinorEvent};
pub use server::request::BattleRequest;
pub use server::{
    GlobalMessage, RoomMessage, ServerFrame, ServerMessage, parse_battle_line, parse_server_frame,
    parse_server_message, render,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Empty message")]
    EmptyMessage,

    #[error("Invalid request document: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("Unknown battle message: {0}")]
    UnknownMessage(String),
}
