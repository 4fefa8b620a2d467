use anyhow::Result;
use tokio::sync::{mpsc, oneshot};

use crate::error::SessionError;
use crate::manager::Command;
use crate::session::SessionSnapshot;

/// Cloneable handle feeding a running [`SessionManager`](crate::SessionManager).
///
/// The manager stops once every handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .map_err(|_| SessionError::Disconnected.into())
    }

    /// Feed a complete websocket frame (`>ROOMID` header and its lines)
    pub fn feed_frame(&self, frame: &str) -> Result<()> {
        self.send(Command::Frame(frame.to_string()))
    }

    /// Feed one protocol line, optionally scoped to a room
    pub fn feed_line(&self, room: Option<&str>, line: &str) -> Result<()> {
        self.send(Command::Line {
            room: room.map(str::to_string),
            line: line.to_string(),
        })
    }

    /// Tear a battle session down (left the room, disconnected)
    pub fn remove_battle(&self, battle: &str) -> Result<()> {
        self.send(Command::Remove(battle.to_string()))
    }

    /// Answer the current request again, taking back the choice already sent
    pub fn redecide(&self, battle: &str) -> Result<()> {
        self.send(Command::Redecide(battle.to_string()))
    }

    /// Current view of a battle session, `None` if there is no such battle
    pub async fn snapshot(&self, battle: &str) -> Result<Option<SessionSnapshot>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot {
            battle: battle.to_string(),
            reply,
        })?;
        response.await.map_err(|_| SessionError::Disconnected.into())
    }
}
