use crate::bandit::AdaptiveBandit;
use crate::games::GameDomain;
use crate::types::{Context, LevelRecommendation};

/// Thin, stateless wrapper composing the bandit's level trend helpers so
/// the presentation layer gets one call instead of three.
pub struct DifficultyPredictor;

impl DifficultyPredictor {
    pub fn recommend<D: GameDomain>(
        bandit: &AdaptiveBandit<D>,
        ctx: &Context,
    ) -> LevelRecommendation {
        LevelRecommendation {
            next_level: bandit.optimal_level(ctx),
            change: bandit.predict_next_difficulty(ctx),
            insight: bandit.performance_insight(ctx),
        }
    }
}
