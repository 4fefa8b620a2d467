use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use showbot_battle::{Battle, GameType, Player};
use showbot_client::{
    ClientCommand, ClientMessage, Configure, ErrorKind, FormatDetails, ManagerOptions,
    SessionConfig, SessionHandle, SessionManager, SessionNotification, SessionState, fixed,
};
use showbot_decision::{
    Analyzer, AnalyzerKnowledge, DecisionAlgorithm, DecisionContext, DecisionError,
    StaticAlgorithm,
};
use showbot_protocol::{BattleDecision, BattleEvent, SubDecision};
use tokio::sync::mpsc;
use tokio::time::{Instant, advance};

const ROOM: &str = "battle-gen9ou-1";

const REQUEST: &str = concat!(
    r#"|request|{"rqid": 3, "active": [{"moves": [{"move": "Brave Bird", "id": "bravebird", "#,
    r#""pp": 24, "maxpp": 24, "target": "any", "disabled": false}]}], "#,
    r#""side": {"name": "bot", "id": "p1", "pokemon": [{"ident": "p1: Corviknight", "#,
    r#""details": "Corviknight, F", "condition": "399/399", "active": true, "#,
    r#""stats": {"atk": 239, "def": 246, "spa": 128, "spd": 206, "spe": 171}, "#,
    r#""moves": ["bravebird"], "baseAbility": "pressure", "item": "leftovers"}]}}"#
);

fn battle_frame(room: &str) -> String {
    [
        &format!(">{room}"),
        "|init|battle",
        "|gametype|singles",
        "|switch|p1a: Corviknight|Corviknight, F|399/399",
        "|switch|p2a: Dragonite|Dragonite|100/100",
        "|turn|1",
        REQUEST,
    ]
    .join("\n")
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct Harness {
    handle: SessionHandle,
    choices: mpsc::UnboundedReceiver<ClientMessage>,
    notifications: mpsc::UnboundedReceiver<SessionNotification>,
}

impl Harness {
    fn start(configure: Configure) -> Self {
        init_tracing();
        let (outbound, choices) = mpsc::unbounded_channel();
        let (notify, notifications) = mpsc::unbounded_channel();
        let (handle, _manager) =
            SessionManager::spawn(ManagerOptions::default(), configure, outbound, notify);
        Self {
            handle,
            choices,
            notifications,
        }
    }

    /// Round trip through the manager so everything fed so far is applied
    async fn settle(&self, room: &str) -> Option<showbot_client::SessionSnapshot> {
        self.handle.snapshot(room).await.unwrap()
    }

    async fn next_error(&mut self) -> (Option<String>, ErrorKind) {
        loop {
            match self.notifications.recv().await.unwrap() {
                SessionNotification::Error { battle, kind, .. } => return (battle, kind),
                _ => continue,
            }
        }
    }

    async fn next_choice(&mut self) -> String {
        let message = self.choices.recv().await.unwrap();
        assert_eq!(message.room_id.as_deref(), Some(ROOM));
        message.command.to_protocol_string()
    }

    fn drain_notifications(&mut self) -> Vec<SessionNotification> {
        let mut drained = Vec::new();
        while let Ok(notification) = self.notifications.try_recv() {
            drained.push(notification);
        }
        drained
    }
}

/// Records the message type of every event it is shown
struct Recorder {
    seen: Arc<Mutex<Vec<&'static str>>>,
}

impl Analyzer for Recorder {
    fn on_event(&mut self, _: &Battle, event: &BattleEvent) -> anyhow::Result<()> {
        self.seen.lock().unwrap().push(event.msg_type());
        Ok(())
    }

    fn knowledge(&self) -> AnalyzerKnowledge {
        AnalyzerKnowledge::default()
    }

    fn destroy(&mut self) -> anyhow::Result<()> {
        Err(anyhow!("recorder cannot be torn down"))
    }
}

/// Counts calls and otherwise decides like [`StaticAlgorithm`]
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

impl DecisionAlgorithm for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        StaticAlgorithm.decide(context)
    }
}

/// First call spins until cancelled and then answers anyway; later calls
/// answer at once with a different move
struct Stubborn {
    calls: AtomicUsize,
    started: mpsc::UnboundedSender<()>,
    finished: mpsc::UnboundedSender<()>,
}

impl Stubborn {
    fn new() -> (Self, mpsc::UnboundedReceiver<()>, mpsc::UnboundedReceiver<()>) {
        let (started, running) = mpsc::unbounded_channel();
        let (finished, done) = mpsc::unbounded_channel();
        let stubborn = Self {
            calls: AtomicUsize::new(0),
            started,
            finished,
        };
        (stubborn, running, done)
    }
}

impl DecisionAlgorithm for Stubborn {
    fn name(&self) -> &str {
        "stubborn"
    }

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            let _ = self.started.send(());
            for _ in 0..5000 {
                if context.cancel.is_cancelled() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            let _ = self.finished.send(());
            return Ok(BattleDecision::Active(vec![SubDecision::move_index(1)]));
        }
        Ok(BattleDecision::Active(vec![SubDecision::move_index(2)]))
    }
}

/// Fails on the first call, panics on the second, then decides normally
#[derive(Default)]
struct Faulty {
    calls: AtomicUsize,
}

impl DecisionAlgorithm for Faulty {
    fn name(&self) -> &str {
        "faulty"
    }

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError> {
        match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => Err(DecisionError::Algorithm("no idea".to_string())),
            1 => panic!("decision blew up"),
            _ => StaticAlgorithm.decide(context),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_scenario() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let configure = fixed(SessionConfig::new(Arc::new(StaticAlgorithm)).with_analyzer(
        move |_: &FormatDetails| {
            Box::new(Recorder {
                seen: Arc::clone(&recorder),
            }) as Box<dyn Analyzer>
        },
    ));
    let mut harness = Harness::start(configure);
    harness.handle.feed_frame(&battle_frame(ROOM)).unwrap();

    let snapshot = harness.settle(ROOM).await.unwrap();
    assert_eq!(snapshot.state, SessionState::Playing);
    assert_eq!(snapshot.format.generation, 9);
    assert_eq!(snapshot.events, 5);
    assert!(snapshot.awaiting_decision);

    let battle = &snapshot.battle;
    assert_eq!(battle.status.game_type, GameType::Singles);
    assert!(battle.request.is_some());
    assert_eq!(battle.players.len(), 2);
    for (player, hp, max_hp) in [(Player::P1, 399, 399), (Player::P2, 100, 100)] {
        let state = battle.player(player).unwrap();
        assert_eq!(state.active.len(), 1);
        let (_, pokemon) = state.active_pokemon().next().unwrap();
        assert_eq!((pokemon.condition.hp, pokemon.condition.max_hp), (hp, max_hp));
    }

    // The four earlier events were replayed, then the request came in live
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["gametype", "switch", "switch", "turn", "request"]
    );
    assert_eq!(
        harness.drain_notifications(),
        vec![
            SessionNotification::Lifecycle {
                battle: ROOM.to_string(),
                state: SessionState::Initialized,
            },
            SessionNotification::Lifecycle {
                battle: ROOM.to_string(),
                state: SessionState::Playing,
            },
        ]
    );

    advance(Duration::from_millis(1100)).await;
    assert_eq!(harness.next_choice().await, "/choose move 1|3");
    assert!(matches!(
        harness.notifications.recv().await,
        Some(SessionNotification::Decision { command, .. }) if command == "/choose move 1|3"
    ));

    // Removal tears the analyzer down; its failure is reported, not fatal
    harness.handle.remove_battle(ROOM).unwrap();
    assert!(harness.settle(ROOM).await.is_none());
    let notifications = harness.drain_notifications();
    assert!(matches!(
        notifications.as_slice(),
        [
            SessionNotification::Error { kind: ErrorKind::Lifecycle, .. },
            SessionNotification::Lifecycle { state: SessionState::Removed, .. },
        ]
    ));
}

#[tokio::test(start_paused = true)]
async fn test_events_within_debounce_window_decide_once() {
    let algorithm = Arc::new(Counting::default());
    let mut harness = Harness::start(fixed(SessionConfig::new(algorithm.clone())));
    harness.handle.feed_frame(&battle_frame(ROOM)).unwrap();
    harness.settle(ROOM).await;

    advance(Duration::from_millis(600)).await;
    harness.handle.feed_line(Some(ROOM), "|upkeep").unwrap();
    harness.settle(ROOM).await;

    // Past the first timer's deadline, short of the re-armed one
    advance(Duration::from_millis(600)).await;
    let snapshot = harness.settle(ROOM).await.unwrap();
    assert!(!snapshot.decision_in_flight);
    assert_eq!(algorithm.calls.load(Ordering::SeqCst), 0);

    advance(Duration::from_millis(500)).await;
    assert_eq!(harness.next_choice().await, "/choose move 1|3");
    assert_eq!(algorithm.calls.load(Ordering::SeqCst), 1);

    advance(Duration::from_secs(5)).await;
    let snapshot = harness.settle(ROOM).await.unwrap();
    assert!(!snapshot.awaiting_decision);
    assert_eq!(snapshot.history, 1);
    assert!(harness.choices.try_recv().is_err());
    assert_eq!(algorithm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_decision_is_never_sent() {
    let (stubborn, mut running, _done) = Stubborn::new();
    let algorithm = Arc::new(stubborn);
    let mut harness = Harness::start(fixed(SessionConfig::new(algorithm.clone())));
    harness.handle.feed_frame(&battle_frame(ROOM)).unwrap();
    harness.settle(ROOM).await;

    advance(Duration::from_millis(1100)).await;
    running.recv().await.unwrap();

    // A new event cancels the running computation and restarts the timer
    harness.handle.feed_line(Some(ROOM), "|upkeep").unwrap();
    let snapshot = harness.settle(ROOM).await.unwrap();
    assert!(!snapshot.decision_in_flight);

    advance(Duration::from_millis(1100)).await;
    assert_eq!(harness.next_choice().await, "/choose move 2|3");
    assert_eq!(algorithm.calls.load(Ordering::SeqCst), 2);

    harness.settle(ROOM).await;
    assert!(harness.choices.try_recv().is_err());
    let decisions = harness
        .drain_notifications()
        .into_iter()
        .filter(|n| matches!(n, SessionNotification::Decision { .. }))
        .count();
    assert_eq!(decisions, 1);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_choice_is_undone_and_resent() {
    let mut harness = Harness::start(fixed(SessionConfig::default()));
    harness.handle.feed_frame(&battle_frame(ROOM)).unwrap();
    harness.settle(ROOM).await;
    advance(Duration::from_millis(1100)).await;
    assert_eq!(harness.next_choice().await, "/choose move 1|3");

    harness
        .handle
        .feed_line(Some(ROOM), "|error|[Invalid choice] Can't move: Brave Bird is disabled")
        .unwrap();
    let undo = harness.choices.recv().await.unwrap();
    assert_eq!(undo.command, ClientCommand::Undo);
    assert_eq!(undo.to_wire_format(), "battle-gen9ou-1|/undo");
    assert_eq!(harness.next_choice().await, "/choose move 1|3");

    let snapshot = harness.settle(ROOM).await.unwrap();
    assert_eq!(snapshot.history, 2);
}

#[tokio::test(start_paused = true)]
async fn test_time_low_decides_without_waiting() {
    let mut harness = Harness::start(fixed(SessionConfig::default()));
    harness.handle.feed_frame(&battle_frame(ROOM)).unwrap();
    harness.settle(ROOM).await;

    let start = Instant::now();
    harness
        .handle
        .feed_line(Some(ROOM), "|inactive|Time left: 20 sec this turn | 140 sec total")
        .unwrap();
    assert_eq!(harness.next_choice().await, "/choose move 1|3");
    assert!(start.elapsed() < ManagerOptions::default().debounce);

    // Already answered: another notice sends nothing
    harness
        .handle
        .feed_line(Some(ROOM), "|inactive|bot has 10 seconds left.")
        .unwrap();
    harness.settle(ROOM).await;
    advance(Duration::from_secs(2)).await;
    harness.settle(ROOM).await;
    assert!(harness.choices.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_tie_and_premature_end_are_equivalent() {
    let mut harness = Harness::start(fixed(SessionConfig::default()));
    let rooms = ["battle-gen9ou-10", "battle-gen9ou-11"];
    for (room, ending) in rooms.iter().zip(["|tie", "|prematureend"]) {
        let frame = format!("{}\n{ending}", battle_frame(room));
        harness.handle.feed_frame(&frame).unwrap();
    }

    let mut ended = Vec::new();
    for room in rooms {
        let snapshot = harness.settle(room).await.unwrap();
        assert_eq!(snapshot.state, SessionState::Ended);
        assert!(snapshot.battle.ended);
        assert!(snapshot.battle.tie);
        assert_eq!(snapshot.battle.winner, None);
        ended.push((snapshot.state, snapshot.battle.ended, snapshot.battle.tie));
    }
    assert_eq!(ended[0], ended[1]);

    // Ending cancels the decision the request had scheduled
    advance(Duration::from_secs(2)).await;
    harness.settle(rooms[0]).await;
    assert!(harness.choices.try_recv().is_err());
    let ends = harness
        .drain_notifications()
        .into_iter()
        .filter(|n| {
            matches!(
                n,
                SessionNotification::Lifecycle {
                    state: SessionState::Ended,
                    ..
                }
            )
        })
        .count();
    assert_eq!(ends, 2);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_lines_are_reported_and_skipped() {
    let configure: Configure = Arc::new(|details: &FormatDetails| {
        if details.game_type == GameType::Singles {
            Ok(SessionConfig::default())
        } else {
            Err(anyhow!("no algorithm for {}", details.format_id))
        }
    });
    let mut harness = Harness::start(configure);
    harness
        .handle
        .feed_frame(&format!(">{ROOM}\n|init|battle\n|request|{{not json\n|turn|2"))
        .unwrap();

    let snapshot = harness.settle(ROOM).await.unwrap();
    assert_eq!(snapshot.battle.turn, 2);
    assert_eq!(snapshot.events, 1);
    assert!(harness.drain_notifications().iter().any(|n| matches!(
        n,
        SessionNotification::Error { kind: ErrorKind::Parse, battle: Some(b), .. } if b == ROOM
    )));

    // A format the configuration refuses stays initialized
    let doubles = "battle-gen9doublesou-2";
    harness.handle.feed_frame(&battle_frame(doubles)).unwrap();
    let snapshot = harness.settle(doubles).await.unwrap();
    assert_eq!(snapshot.state, SessionState::Initialized);
    assert!(harness.drain_notifications().iter().any(|n| matches!(
        n,
        SessionNotification::Error { kind: ErrorKind::Lifecycle, .. }
    )));
}

#[tokio::test(start_paused = true)]
async fn test_failed_decisions_free_the_slot() {
    let algorithm = Arc::new(Faulty::default());
    let mut harness = Harness::start(fixed(SessionConfig::new(algorithm.clone())));
    harness.handle.feed_frame(&battle_frame(ROOM)).unwrap();
    harness.settle(ROOM).await;

    // Returned error
    advance(Duration::from_millis(1100)).await;
    assert_eq!(
        harness.next_error().await,
        (Some(ROOM.to_string()), ErrorKind::Decision)
    );
    let snapshot = harness.settle(ROOM).await.unwrap();
    assert!(!snapshot.decision_in_flight);
    assert!(snapshot.awaiting_decision);
    assert!(harness.choices.try_recv().is_err());

    // Panic in the computation, after the next event re-armed the timer
    harness.handle.feed_line(Some(ROOM), "|upkeep").unwrap();
    harness.settle(ROOM).await;
    advance(Duration::from_millis(1100)).await;
    assert_eq!(
        harness.next_error().await,
        (Some(ROOM.to_string()), ErrorKind::Decision)
    );
    let snapshot = harness.settle(ROOM).await.unwrap();
    assert!(!snapshot.decision_in_flight);
    assert!(harness.choices.try_recv().is_err());

    harness.handle.feed_line(Some(ROOM), "|upkeep").unwrap();
    harness.settle(ROOM).await;
    advance(Duration::from_millis(1100)).await;
    assert_eq!(harness.next_choice().await, "/choose move 1|3");
    assert_eq!(algorithm.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_removal_cancels_running_decision() {
    let (stubborn, mut running, mut done) = Stubborn::new();
    let algorithm = Arc::new(stubborn);
    let mut harness = Harness::start(fixed(SessionConfig::new(algorithm.clone())));
    harness.handle.feed_frame(&battle_frame(ROOM)).unwrap();
    harness.settle(ROOM).await;

    advance(Duration::from_millis(1100)).await;
    running.recv().await.unwrap();
    harness.handle.remove_battle(ROOM).unwrap();
    assert!(harness.settle(ROOM).await.is_none());

    // The computation saw the cancellation and answered anyway
    done.recv().await.unwrap();
    for _ in 0..3 {
        advance(Duration::from_millis(10)).await;
        harness.settle(ROOM).await;
    }
    advance(Duration::from_secs(2)).await;
    harness.settle(ROOM).await;

    assert!(harness.choices.try_recv().is_err());
    assert_eq!(algorithm.calls.load(Ordering::SeqCst), 1);
    let notifications = harness.drain_notifications();
    assert!(
        !notifications
            .iter()
            .any(|n| matches!(n, SessionNotification::Decision { .. }))
    );
    assert!(notifications.iter().any(|n| matches!(
        n,
        SessionNotification::Lifecycle { state: SessionState::Removed, .. }
    )));
}
