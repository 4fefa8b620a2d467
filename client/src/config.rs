use std::sync::Arc;
use std::time::Duration;

use showbot_battle::LATEST_GENERATION;
use showbot_decision::{Analyzer, DecisionAlgorithm, RevealAnalyzer, StaticAlgorithm};

use crate::format::FormatDetails;

pub const DEFAULT_HISTORY_DEPTH: usize = 4;

/// Builds the analyzer for a battle once it starts playing
pub type AnalyzerFactory = Arc<dyn Fn(&FormatDetails) -> Box<dyn Analyzer> + Send + Sync>;

/// Picks the algorithm and analyzer for a battle from its format
pub type Configure =
    Arc<dyn Fn(&FormatDetails) -> anyhow::Result<SessionConfig> + Send + Sync>;

/// Manager-wide tuning
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Quiet period after the last event before a decision is computed
    pub debounce: Duration,
    /// Most past decisions any battle keeps, whatever its configuration asks
    pub history_depth: usize,
    /// Generation assumed for formats whose id does not name one
    pub latest_generation: u8,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(1),
            history_depth: 16,
            latest_generation: LATEST_GENERATION,
        }
    }
}

/// Algorithm and analyzer chosen for one battle
#[derive(Clone)]
pub struct SessionConfig {
    pub algorithm: Arc<dyn DecisionAlgorithm>,
    pub analyzer_factory: AnalyzerFactory,
    pub history_depth: usize,
}

impl SessionConfig {
    pub fn new(algorithm: Arc<dyn DecisionAlgorithm>) -> Self {
        Self {
            algorithm,
            analyzer_factory: Arc::new(|_: &FormatDetails| {
                Box::new(RevealAnalyzer::new()) as Box<dyn Analyzer>
            }),
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }

    pub fn with_analyzer(
        mut self,
        factory: impl Fn(&FormatDetails) -> Box<dyn Analyzer> + Send + Sync + 'static,
    ) -> Self {
        self.analyzer_factory = Arc::new(factory);
        self
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(Arc::new(StaticAlgorithm))
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("algorithm", &self.algorithm.name())
            .field("history_depth", &self.history_depth)
            .finish_non_exhaustive()
    }
}

/// The same configuration for every format
pub fn fixed(config: SessionConfig) -> Configure {
    Arc::new(move |_: &FormatDetails| Ok(config.clone()))
}
