use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::types::Context;

pub mod disks;
pub mod matching;
pub mod tones;

pub use disks::{DiskConfig, DiskPuzzle};
pub use matching::{MatchingConfig, MatchingPairs};
pub use tones::{ToneConfig, ToneSequence};

/// Pace modifiers crossed with per-level base difficulty when building a
/// catalog. Higher means harder (tighter time allowances).
pub const PACE_MODIFIERS: [f64; 3] = [0.8, 1.0, 1.2];

pub const MAX_LEVEL: u32 = 25;

/// Shared context encoding: level normalized by its max, bounded floats
/// passed through, one-hot time-of-day and user-type, streak normalized
/// by 10. Domains append their own features after this prefix.
pub const BASE_FEATURE_DIM: usize = 16;

/// One game's shape: its action catalog, canonical action signatures and
/// context featurization. The bandit engine is generic over this trait so
/// the three games share one learner implementation.
pub trait GameDomain {
    type Action: Clone + std::fmt::Debug + Serialize + DeserializeOwned;

    /// Persistence key; one serialized state blob per domain.
    fn storage_key(&self) -> &'static str;

    /// Accuracy bar a round must clear to extend the streak.
    fn streak_threshold(&self) -> f64;

    /// Full enumeration of selectable configurations. Built once at bandit
    /// construction; order is stable and ties in predicted reward resolve
    /// to the earlier entry.
    fn catalog(&self) -> Vec<Self::Action>;

    /// Canonical signature of all tunable fields, used as the weight key.
    fn action_key(&self, action: &Self::Action) -> String;

    /// Fixed-length numeric encoding of a context. Length must equal
    /// `feature_dim()` for every context.
    fn featurize(&self, ctx: &Context) -> Vec<f64>;

    fn feature_dim(&self) -> usize;

    fn max_level(&self) -> u32 {
        MAX_LEVEL
    }

    /// Wall-clock budget of a round with this configuration.
    fn time_limit_secs(&self, action: &Self::Action) -> f64;

    /// Theoretical-minimum move count for this configuration.
    fn expected_moves(&self, action: &Self::Action) -> u32;

    /// Difficulty multiplier carried by this configuration.
    fn difficulty_multiplier(&self, action: &Self::Action) -> f64;

    /// Level this configuration belongs to.
    fn action_level(&self, action: &Self::Action) -> u32;
}

pub(crate) fn base_features(ctx: &Context, max_level: u32) -> Vec<f64> {
    let mut values = Vec::with_capacity(BASE_FEATURE_DIM + 2);
    values.push(ctx.current_level as f64 / max_level.max(1) as f64);
    values.push(ctx.recent_accuracy);
    values.push(ctx.recent_speed);
    values.push((ctx.session_length_minutes / 30.0).min(1.0));
    values.extend_from_slice(&ctx.time_of_day.one_hot());
    values.push(ctx.previous_difficulty_multiplier / 2.0);
    values.push((ctx.streak_count as f64 / 10.0).min(1.0));
    values.extend_from_slice(&ctx.user_type.one_hot());
    values.push(ctx.frustration_level);
    values.push(ctx.engagement_level);
    values.push(ctx.preferred_span);
    values.push(ctx.success_rate);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Context;

    #[test]
    fn base_features_have_the_documented_dimension() {
        let features = base_features(&Context::default(), MAX_LEVEL);
        assert_eq!(features.len(), BASE_FEATURE_DIM);
    }

    #[test]
    fn base_features_stay_bounded() {
        let ctx = Context {
            current_level: 25,
            recent_accuracy: 1.0,
            recent_speed: 1.0,
            session_length_minutes: 120.0,
            streak_count: 40,
            ..Context::default()
        };
        for value in base_features(&ctx, MAX_LEVEL) {
            assert!((0.0..=1.0).contains(&value), "feature out of range: {value}");
        }
    }
}
