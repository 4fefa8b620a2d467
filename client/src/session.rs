//! Per-battle session state: the tracked battle, its event log and the
//! decision bookkeeping the manager drives

use std::sync::Arc;

use showbot_battle::Battle;
use showbot_decision::{Analyzer, CancelToken, DecisionAlgorithm, DecisionContext, DecisionHistory};
use showbot_protocol::{BattleDecision, BattleEvent, ChoiceMessage, ClientCommand};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{Configure, SessionConfig};
use crate::error::SessionError;
use crate::format::FormatDetails;

/// Lifecycle of a battle session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Tracking events, no request seen yet
    Initialized,
    /// Answering requests
    Playing,
    /// The battle finished; still tracked until removed
    Ended,
    /// Torn down
    Removed,
}

/// Algorithm, analyzer and history of a session that is playing
struct Engine {
    config: SessionConfig,
    analyzer: Box<dyn Analyzer>,
    history: DecisionHistory,
}

/// A decision computation that has not reported back yet
#[derive(Debug)]
pub(crate) struct InFlight {
    pub seq: u64,
    pub cancel: CancelToken,
    pub rqid: Option<u64>,
}

/// Read-only view of a session
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub format: FormatDetails,
    pub battle: Battle,
    pub events: usize,
    pub history: usize,
    pub awaiting_decision: bool,
    pub decision_in_flight: bool,
}

pub struct BattleSession {
    battle: Battle,
    events: Vec<BattleEvent>,
    state: SessionState,
    format: FormatDetails,
    engine: Option<Engine>,
    /// Request id of the last choice sent
    last_sent: Option<u64>,
    /// The current request already has a choice on its way
    answered: bool,
    seq: u64,
    pub(crate) timer: Option<(u64, JoinHandle<()>)>,
    pub(crate) in_flight: Option<InFlight>,
}

impl BattleSession {
    pub fn new(id: impl Into<String>, format: FormatDetails) -> Self {
        Self {
            battle: Battle::new(id),
            events: Vec::new(),
            state: SessionState::Initialized,
            format,
            engine: None,
            last_sent: None,
            answered: false,
            seq: 0,
            timer: None,
            in_flight: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.battle.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn battle(&self) -> &Battle {
        &self.battle
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn format(&self) -> &FormatDetails {
        &self.format
    }

    pub fn history(&self) -> Option<&DecisionHistory> {
        self.engine.as_ref().map(|engine| &engine.history)
    }

    /// The outstanding request still needs a choice
    pub fn awaiting_decision(&self) -> bool {
        self.state == SessionState::Playing
            && !self.answered
            && self
                .battle
                .request
                .as_ref()
                .is_some_and(|request| request.needs_decision())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            format: self.format.clone(),
            battle: self.battle.clone(),
            events: self.events.len(),
            history: self.history().map_or(0, DecisionHistory::len),
            awaiting_decision: self.awaiting_decision(),
            decision_in_flight: self.in_flight.is_some(),
        }
    }

    pub(crate) fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Fold one event into the battle and hand it to the analyzer.
    ///
    /// Returns the state entered, if the event changed it. Failures are
    /// pushed to `errors`; the event is applied regardless.
    pub(crate) fn apply(
        &mut self,
        event: BattleEvent,
        configure: &Configure,
        max_history: usize,
        errors: &mut Vec<SessionError>,
    ) -> Option<SessionState> {
        self.battle.apply_event(&event);
        let mut entered = None;

        if let Some(request) = event.as_request() {
            if self.state == SessionState::Initialized {
                match self.start_playing(configure, max_history, errors) {
                    Ok(()) => entered = Some(SessionState::Playing),
                    Err(e) => errors.push(e),
                }
            }
            if request.rqid.is_none() || request.rqid != self.last_sent {
                self.answered = false;
            }
        }

        self.events.push(event);

        if let Some(engine) = self.engine.as_mut()
            && let Some(event) = self.events.last()
            && let Err(e) = engine.analyzer.on_event(&self.battle, event)
        {
            errors.push(SessionError::Analyzer(e));
        }

        if self.battle.ended
            && matches!(self.state, SessionState::Initialized | SessionState::Playing)
        {
            self.state = SessionState::Ended;
            entered = Some(SessionState::Ended);
        }
        entered
    }

    /// Pick the configuration and catch a fresh analyzer up on the log
    fn start_playing(
        &mut self,
        configure: &Configure,
        max_history: usize,
        errors: &mut Vec<SessionError>,
    ) -> Result<(), SessionError> {
        let config = configure(&self.format).map_err(SessionError::Lifecycle)?;
        let mut analyzer = (config.analyzer_factory)(&self.format);

        // Each replayed event is seen with the battle as it stood then
        let mut replay = Battle::new(self.battle.id.clone());
        for event in &self.events {
            replay.apply_event(event);
            if let Err(e) = analyzer.on_event(&replay, event) {
                errors.push(SessionError::Analyzer(e));
            }
        }
        debug!(
            battle = %self.battle.id,
            algorithm = config.algorithm.name(),
            replayed = self.events.len(),
            "Battle session playing"
        );

        let history = DecisionHistory::new(config.history_depth.min(max_history));
        self.engine = Some(Engine {
            config,
            analyzer,
            history,
        });
        self.state = SessionState::Playing;
        Ok(())
    }

    /// Algorithm and inputs for a decision on the current request
    pub(crate) fn decision_inputs(
        &self,
        cancel: CancelToken,
    ) -> Option<(Arc<dyn DecisionAlgorithm>, DecisionContext)> {
        let engine = self.engine.as_ref()?;
        let context = DecisionContext::new(self.battle.clone())
            .with_knowledge(engine.analyzer.knowledge())
            .with_events(self.events.clone())
            .with_history(engine.history.clone())
            .with_cancel(cancel);
        Some((Arc::clone(&engine.config.algorithm), context))
    }

    /// Mark the current request as needing a new choice, e.g. after the
    /// server rejected the one sent
    pub(crate) fn reopen(&mut self) {
        self.answered = false;
    }

    /// Record a finished decision and build the commands that send it.
    ///
    /// Answering a request id that was already answered takes the earlier
    /// choice back first.
    pub(crate) fn record_decision(
        &mut self,
        decision: BattleDecision,
        rqid: Option<u64>,
    ) -> Vec<ClientCommand> {
        let mut commands = Vec::with_capacity(2);
        if rqid.is_some() && rqid == self.last_sent {
            commands.push(ClientCommand::Undo);
        }
        if let Some(engine) = self.engine.as_mut() {
            engine.history.push(self.battle.clone(), decision.clone());
        }
        commands.push(ClientCommand::Choose(ChoiceMessage { decision, rqid }));
        self.last_sent = rqid;
        self.answered = true;
        commands
    }

    /// Abort the debounce timer and cancel any running decision
    pub(crate) fn cancel_pending(&mut self) {
        if let Some((_, timer)) = self.timer.take() {
            timer.abort();
        }
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
    }

    /// Release everything the session holds. The analyzer's teardown
    /// failure is returned, the session is removed either way.
    pub(crate) fn teardown(&mut self) -> Result<(), SessionError> {
        self.cancel_pending();
        self.state = SessionState::Removed;
        match self.engine.as_mut() {
            Some(engine) => engine.analyzer.destroy().map_err(SessionError::Lifecycle),
            None => Ok(()),
        }
    }
}
