//! The session manager: one task owning every battle session

use std::collections::HashMap;

use showbot_decision::{CancelToken, DecisionError};
use showbot_protocol::server::room::RoomType;
use showbot_protocol::{
    BattleDecision, BattleEvent, ClientCommand, ClientMessage, GlobalMessage, RoomMessage,
    ServerMessage, parse_server_frame, parse_server_message,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::config::{Configure, ManagerOptions};
use crate::error::SessionError;
use crate::format::FormatTable;
use crate::handle::SessionHandle;
use crate::notification::SessionNotification;
use crate::session::{BattleSession, InFlight, SessionSnapshot, SessionState};

/// Requests from [`SessionHandle`]s
pub(crate) enum Command {
    Frame(String),
    Line {
        room: Option<String>,
        line: String,
    },
    Remove(String),
    Redecide(String),
    Snapshot {
        battle: String,
        reply: oneshot::Sender<Option<SessionSnapshot>>,
    },
}

/// Completions reported back by timers and decision tasks
enum Completion {
    TimerFired {
        battle: String,
        seq: u64,
    },
    Decided {
        battle: String,
        seq: u64,
        result: Result<BattleDecision, DecisionError>,
    },
}

/// Owns every battle session and drives their timers and decisions.
///
/// Protocol input arrives through [`SessionHandle`]s; choices leave through
/// the outbound channel and diagnostics through the notification channel.
pub struct SessionManager {
    options: ManagerOptions,
    configure: Configure,
    formats: FormatTable,
    sessions: HashMap<String, BattleSession>,
    commands: mpsc::UnboundedReceiver<Command>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions: mpsc::UnboundedReceiver<Completion>,
    outbound: mpsc::UnboundedSender<ClientMessage>,
    notifications: mpsc::UnboundedSender<SessionNotification>,
}

impl SessionManager {
    pub fn new(
        options: ManagerOptions,
        configure: Configure,
        outbound: mpsc::UnboundedSender<ClientMessage>,
        notifications: mpsc::UnboundedSender<SessionNotification>,
    ) -> (Self, SessionHandle) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (completions_tx, completions) = mpsc::unbounded_channel();
        let manager = Self {
            options,
            configure,
            formats: FormatTable::new(),
            sessions: HashMap::new(),
            commands,
            completions_tx,
            completions,
            outbound,
            notifications,
        };
        (manager, SessionHandle::new(commands_tx))
    }

    /// Start the manager on the current runtime
    pub fn spawn(
        options: ManagerOptions,
        configure: Configure,
        outbound: mpsc::UnboundedSender<ClientMessage>,
        notifications: mpsc::UnboundedSender<SessionNotification>,
    ) -> (SessionHandle, JoinHandle<()>) {
        let (manager, handle) = Self::new(options, configure, outbound, notifications);
        (handle, tokio::spawn(manager.run()))
    }

    /// Run until every handle is dropped, then tear all sessions down
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                // Input first: an event that arrives together with a finished
                // decision must cancel it
                biased;
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = self.completions.recv() => self.handle_completion(completion),
            }
        }

        let battles: Vec<String> = self.sessions.keys().cloned().collect();
        for battle in battles {
            self.remove_battle(&battle);
        }
        debug!("Session manager stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Frame(frame) => {
                let frame = parse_server_frame(&frame);
                for line in &frame.lines {
                    self.handle_line(frame.room_id.as_deref(), line);
                }
            }
            Command::Line { room, line } => self.handle_line(room.as_deref(), &line),
            Command::Remove(battle) => self.remove_battle(&battle),
            Command::Redecide(battle) => self.redecide(&battle),
            Command::Snapshot { battle, reply } => {
                let _ = reply.send(self.sessions.get(&battle).map(BattleSession::snapshot));
            }
        }
    }

    fn handle_line(&mut self, room: Option<&str>, line: &str) {
        let message = match parse_server_message(line) {
            Ok(message) => message,
            Err(e) => {
                self.report(room, SessionError::Parse(e));
                return;
            }
        };

        match message {
            ServerMessage::Battle(event) => match room {
                Some(room) => self.on_battle_event(room, event),
                None => trace!(line, "Battle line outside a room"),
            },
            ServerMessage::Room(RoomMessage::Init(RoomType::Battle)) => {
                if let Some(room) = room {
                    self.session_entry(room);
                }
            }
            ServerMessage::Room(RoomMessage::DeInit) => {
                if let Some(room) = room {
                    self.remove_battle(room);
                }
            }
            ServerMessage::Room(RoomMessage::NoInit { reason, .. }) => {
                if let Some(room) = room {
                    debug!(battle = room, %reason, "Room not joined");
                    self.remove_battle(room);
                }
            }
            ServerMessage::Room(RoomMessage::Error(message)) => {
                if let Some(room) = room
                    && (message.starts_with("[Invalid choice]")
                        || message.starts_with("[Unavailable choice]"))
                {
                    warn!(battle = room, %message, "Choice rejected");
                    self.redecide(room);
                }
            }
            ServerMessage::Room(_) => {}
            ServerMessage::Global(GlobalMessage::Formats(sections)) => {
                self.formats.update(&sections);
                debug!(formats = self.formats.len(), "Format list updated");
            }
            ServerMessage::Global(GlobalMessage::UpdateUser { username, .. }) => {
                debug!(%username, "User updated");
            }
            ServerMessage::Raw(text) => trace!(room, %text, "Unhandled line"),
        }
    }

    /// Session for `room`, created on first reference
    fn session_entry(&mut self, room: &str) -> &mut BattleSession {
        if !self.sessions.contains_key(room) {
            debug!(battle = room, "Battle session created");
            self.notify(SessionNotification::Lifecycle {
                battle: room.to_string(),
                state: SessionState::Initialized,
            });
        }
        let formats = &self.formats;
        let latest = self.options.latest_generation;
        self.sessions
            .entry(room.to_string())
            .or_insert_with(|| BattleSession::new(room, formats.details(room, latest)))
    }

    fn on_battle_event(&mut self, room: &str, event: BattleEvent) {
        if !room.starts_with("battle-") {
            trace!(room, "Battle event outside a battle room");
            return;
        }
        let time_low = match &event {
            BattleEvent::Major(major) => major.time_low_seconds(),
            BattleEvent::Minor(_) => None,
        };

        let configure = self.configure.clone();
        let max_history = self.options.history_depth;
        let mut errors = Vec::new();
        let session = self.session_entry(room);
        let entered = session.apply(event, &configure, max_history, &mut errors);
        let state = session.state();

        for error in errors {
            self.report(Some(room), error);
        }
        if let Some(state) = entered {
            self.notify(SessionNotification::Lifecycle {
                battle: room.to_string(),
                state,
            });
        }

        match state {
            SessionState::Playing => {
                if let Some(seconds) = time_low {
                    debug!(battle = room, seconds, "Time running out");
                    if let Some(session) = self.sessions.get_mut(room)
                        && let Some((_, timer)) = session.timer.take()
                    {
                        timer.abort();
                    }
                    self.trigger(room);
                } else {
                    if let Some(session) = self.sessions.get_mut(room) {
                        session.cancel_pending();
                    }
                    self.arm_timer(room);
                }
            }
            SessionState::Ended => {
                if let Some(session) = self.sessions.get_mut(room) {
                    session.cancel_pending();
                }
            }
            SessionState::Initialized | SessionState::Removed => {}
        }
    }

    fn arm_timer(&mut self, room: &str) {
        let debounce = self.options.debounce;
        let completions = self.completions_tx.clone();
        let Some(session) = self.sessions.get_mut(room) else {
            return;
        };
        if let Some((_, timer)) = session.timer.take() {
            timer.abort();
        }
        let seq = session.next_seq();
        let battle = room.to_string();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let _ = completions.send(Completion::TimerFired { battle, seq });
        });
        session.timer = Some((seq, timer));
        trace!(battle = room, ?debounce, "Decision timer armed");
    }

    /// Start a decision unless one is running or nothing needs answering
    fn trigger(&mut self, room: &str) {
        let completions = self.completions_tx.clone();
        let Some(session) = self.sessions.get_mut(room) else {
            return;
        };
        if session.in_flight.is_some() {
            debug!(battle = room, "Decision already running");
            return;
        }
        if !session.awaiting_decision() {
            trace!(battle = room, "Nothing to decide");
            return;
        }

        let cancel = CancelToken::new();
        let Some((algorithm, context)) = session.decision_inputs(cancel.clone()) else {
            return;
        };
        let rqid = context.battle.request.as_ref().and_then(|request| request.rqid);
        let seq = session.next_seq();
        session.in_flight = Some(InFlight { seq, cancel, rqid });
        debug!(battle = room, algorithm = algorithm.name(), ?rqid, "Deciding");

        let battle = room.to_string();
        tokio::spawn(async move {
            let result = match tokio::task::spawn_blocking(move || algorithm.decide(&context)).await
            {
                Ok(result) => result,
                Err(e) => Err(DecisionError::Algorithm(format!("decision task failed: {e}"))),
            };
            let _ = completions.send(Completion::Decided {
                battle,
                seq,
                result,
            });
        });
    }

    /// Decide now, even if the current request was answered already
    fn redecide(&mut self, room: &str) {
        let Some(session) = self.sessions.get_mut(room) else {
            return;
        };
        session.reopen();
        self.trigger(room);
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::TimerFired { battle, seq } => {
                let Some(session) = self.sessions.get_mut(&battle) else {
                    return;
                };
                if session.timer.as_ref().is_none_or(|(armed, _)| *armed != seq) {
                    trace!(%battle, "Stale timer");
                    return;
                }
                session.timer = None;
                self.trigger(&battle);
            }
            Completion::Decided {
                battle,
                seq,
                result,
            } => self.on_decided(&battle, seq, result),
        }
    }

    fn on_decided(&mut self, room: &str, seq: u64, result: Result<BattleDecision, DecisionError>) {
        let Some(session) = self.sessions.get_mut(room) else {
            return;
        };
        let current = session
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.seq == seq && !in_flight.cancel.is_cancelled());
        if !current {
            trace!(battle = room, "Dropping cancelled decision");
            return;
        }
        let Some(InFlight { rqid, .. }) = session.in_flight.take() else {
            return;
        };

        match result {
            Ok(decision) => {
                let commands = session.record_decision(decision.clone(), rqid);
                let mut command_line = String::new();
                for command in commands {
                    if let ClientCommand::Choose(choice) = &command {
                        command_line = choice.to_protocol_string();
                    }
                    self.send(ClientMessage::room(room, command));
                }
                debug!(battle = room, command = %command_line, "Decision sent");
                self.notify(SessionNotification::Decision {
                    battle: room.to_string(),
                    decision,
                    command: command_line,
                });
            }
            Err(DecisionError::Cancelled) => trace!(battle = room, "Decision cancelled"),
            Err(e) => self.report(Some(room), SessionError::Decision(e)),
        }
    }

    fn remove_battle(&mut self, room: &str) {
        let Some(mut session) = self.sessions.remove(room) else {
            return;
        };
        if let Err(e) = session.teardown() {
            self.report(Some(room), e);
        }
        debug!(battle = room, "Battle session removed");
        self.notify(SessionNotification::Lifecycle {
            battle: room.to_string(),
            state: SessionState::Removed,
        });
    }

    fn send(&self, message: ClientMessage) {
        if self.outbound.send(message).is_err() {
            warn!("Outbound channel closed, choice dropped");
        }
    }

    fn notify(&self, notification: SessionNotification) {
        let _ = self.notifications.send(notification);
    }

    fn report(&self, room: Option<&str>, error: SessionError) {
        warn!(battle = room, error = %error, "Session error");
        self.notify(SessionNotification::Error {
            battle: room.map(str::to_string),
            kind: error.kind(),
            message: error.to_string(),
        });
    }
}
