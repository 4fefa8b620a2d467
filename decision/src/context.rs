//! Inputs of one decision computation

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use showbot_battle::Battle;
use showbot_protocol::{BattleDecision, BattleEvent};

use crate::analyzer::AnalyzerKnowledge;
use crate::error::DecisionError;

/// Cooperative cancellation flag shared between a session and the
/// computation it started
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` once cancelled; for `?` at checkpoints
    pub fn check(&self) -> Result<(), DecisionError> {
        if self.is_cancelled() {
            Err(DecisionError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A decision sent earlier, with the battle as it was then
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub battle: Battle,
    pub decision: BattleDecision,
}

/// Bounded, oldest-first record of past decisions
#[derive(Debug, Clone, Default)]
pub struct DecisionHistory {
    entries: VecDeque<HistoryEntry>,
    depth: usize,
}

impl DecisionHistory {
    pub fn new(depth: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(depth),
            depth,
        }
    }

    pub fn push(&mut self, battle: Battle, decision: BattleDecision) {
        if self.depth == 0 {
            return;
        }
        while self.entries.len() >= self.depth {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry { battle, decision });
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owned snapshot an algorithm decides from; safe to move onto a worker
#[derive(Debug, Clone)]
pub struct DecisionContext {
    pub battle: Battle,
    pub knowledge: AnalyzerKnowledge,
    pub events: Arc<[BattleEvent]>,
    pub history: DecisionHistory,
    pub cancel: CancelToken,
}

impl DecisionContext {
    /// Context with no analyzer knowledge, event log or history
    pub fn new(battle: Battle) -> Self {
        Self {
            battle,
            knowledge: AnalyzerKnowledge::default(),
            events: Arc::from(Vec::new()),
            history: DecisionHistory::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_knowledge(mut self, knowledge: AnalyzerKnowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_events(mut self, events: impl Into<Arc<[BattleEvent]>>) -> Self {
        self.events = events.into();
        self
    }

    pub fn with_history(mut self, history: DecisionHistory) -> Self {
        self.history = history;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[cfg(test)]
mod tests {
    use showbot_protocol::SubDecision;

    use super::*;

    #[test]
    fn test_cancel_is_shared() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(worker.check().is_ok());
        token.cancel();
        assert!(worker.is_cancelled());
        assert_eq!(worker.check(), Err(DecisionError::Cancelled));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = DecisionHistory::new(2);
        for turn in 1..=3 {
            let mut battle = Battle::new("battle-gen9ou-1");
            battle.turn = turn;
            history.push(
                battle,
                BattleDecision::Active(vec![SubDecision::move_index(1)]),
            );
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().next().map(|e| e.battle.turn), Some(2));
        assert_eq!(history.last().map(|e| e.battle.turn), Some(3));

        let mut none = DecisionHistory::new(0);
        none.push(Battle::new("b"), BattleDecision::TeamOrder(vec![1]));
        assert!(none.is_empty());
    }
}
