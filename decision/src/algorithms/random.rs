use std::sync::Mutex;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use showbot_protocol::{BattleDecision, SubDecision};

use super::DecisionAlgorithm;
use crate::context::DecisionContext;
use crate::error::DecisionError;
use crate::legal::{ChoiceBuilder, LegalChoices};

/// Uniformly random legal choices
pub struct RandomAlgorithm {
    rng: Mutex<SmallRng>,
}

impl RandomAlgorithm {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().r#gen())
    }
}

impl DecisionAlgorithm for RandomAlgorithm {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError> {
        let legal = LegalChoices::for_battle(&context.battle)?;
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| DecisionError::Algorithm("random source poisoned".to_string()))?;

        if let LegalChoices::TeamPreview { team_size, chosen } = legal {
            let mut order: Vec<usize> = (1..=team_size).collect();
            order.shuffle(&mut *rng);
            order.truncate(chosen);
            return Ok(BattleDecision::TeamOrder(order));
        }

        let mut builder = ChoiceBuilder::default();
        for choices in legal.slots() {
            context.cancel.check()?;
            let mut shuffled: Vec<&SubDecision> = choices.iter().collect();
            shuffled.shuffle(&mut *rng);
            builder.push_first(shuffled);
        }
        legal.decision(builder.finish())
    }
}
