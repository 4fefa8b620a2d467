use showbot_protocol::BattleDecision;

use super::DecisionAlgorithm;
use crate::context::DecisionContext;
use crate::error::DecisionError;
use crate::legal::{ChoiceBuilder, LegalChoices};

/// Always the first legal choice per slot; team order as listed
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAlgorithm;

impl DecisionAlgorithm for StaticAlgorithm {
    fn name(&self) -> &str {
        "static"
    }

    fn decide(&self, context: &DecisionContext) -> Result<BattleDecision, DecisionError> {
        let legal = LegalChoices::for_battle(&context.battle)?;
        if let LegalChoices::TeamPreview { chosen, .. } = legal {
            return Ok(BattleDecision::TeamOrder((1..=chosen).collect()));
        }
        let mut builder = ChoiceBuilder::default();
        for choices in legal.slots() {
            builder.push_first(choices);
        }
        legal.decision(builder.finish())
    }
}

#[cfg(test)]
mod tests {
    use showbot_battle::Battle;
    use showbot_protocol::SubDecision;

    use super::*;
    use crate::algorithms::test_support::{feed, member, request, singles_battle};

    #[test]
    fn test_first_legal_move() {
        let context = DecisionContext::new(singles_battle());
        assert_eq!(
            StaticAlgorithm.decide(&context),
            Ok(BattleDecision::Active(vec![SubDecision::move_index(1)]))
        );
    }

    #[test]
    fn test_team_order_in_roster_order() {
        let members = [
            member("p1: Garchomp", "Garchomp, M", "357/357", false, &["earthquake"]),
            member("p1: Corviknight", "Corviknight, F", "399/399", false, &["bravebird"]),
            member("p1: Magikarp", "Magikarp", "200/200", false, &["tackle"]),
        ];
        let line = request(r#""rqid": 1, "teamPreview": true"#, &members);
        let mut battle = Battle::new("battle-gen9ou-2");
        feed(&mut battle, &["|gametype|singles", "|teampreview", &line]);
        let context = DecisionContext::new(battle);
        assert_eq!(
            StaticAlgorithm.decide(&context).map(|d| d.to_choice_string()),
            Ok("team 1,2,3".to_string())
        );
    }

    #[test]
    fn test_no_request() {
        let context = DecisionContext::new(Battle::new("battle-gen9ou-3"));
        assert_eq!(StaticAlgorithm.decide(&context), Err(DecisionError::NoRequest));
    }
}
