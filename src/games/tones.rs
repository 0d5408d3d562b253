use serde::{Deserialize, Serialize};

use crate::games::{base_features, GameDomain, MAX_LEVEL, PACE_MODIFIERS};
use crate::types::Context;

/// One tone-sequence round configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneConfig {
    pub level: u32,
    pub sequence_length: u32,
    /// Distinct tones the sequence draws from.
    pub tone_count: u32,
    pub playback_note_ms: u64,
    pub response_window_secs: f64,
    pub adaptive_timer: bool,
    pub difficulty_multiplier: f64,
}

/// Tone-sequence (auditory memory) game domain. Preference slot:
/// preferred sequence length.
pub struct ToneSequence;

impl ToneSequence {
    fn config(level: u32, modifier: f64) -> ToneConfig {
        let sequence_length = (2 + (level + 1) / 2).min(15);
        let tone_count = (4 + level / 6).min(8);
        ToneConfig {
            level,
            sequence_length,
            tone_count,
            playback_note_ms: (600.0 / modifier) as u64,
            response_window_secs: sequence_length as f64 * 2.0 / modifier,
            adaptive_timer: modifier >= 1.2,
            difficulty_multiplier: modifier,
        }
    }
}

impl GameDomain for ToneSequence {
    type Action = ToneConfig;

    fn storage_key(&self) -> &'static str {
        "mindgym.bandit.tones"
    }

    fn streak_threshold(&self) -> f64 {
        0.7
    }

    fn catalog(&self) -> Vec<ToneConfig> {
        let mut actions = Vec::with_capacity(MAX_LEVEL as usize * PACE_MODIFIERS.len());
        for level in 1..=MAX_LEVEL {
            for modifier in PACE_MODIFIERS {
                actions.push(Self::config(level, modifier));
            }
        }
        actions
    }

    fn action_key(&self, action: &ToneConfig) -> String {
        format!(
            "l{}_s{}_n{}_p{}_w{:.1}_a{}_x{:.2}",
            action.level,
            action.sequence_length,
            action.tone_count,
            action.playback_note_ms,
            action.response_window_secs,
            action.adaptive_timer,
            action.difficulty_multiplier,
        )
    }

    fn featurize(&self, ctx: &Context) -> Vec<f64> {
        let mut values = base_features(ctx, self.max_level());
        // Auditory memory strength: recall quality weighted toward the
        // sequence lengths the player actually sustains.
        values.push(ctx.recent_accuracy * (0.4 + 0.6 * ctx.preferred_span));
        values
    }

    fn feature_dim(&self) -> usize {
        super::BASE_FEATURE_DIM + 1
    }

    fn time_limit_secs(&self, action: &ToneConfig) -> f64 {
        action.response_window_secs
    }

    fn expected_moves(&self, action: &ToneConfig) -> u32 {
        action.sequence_length
    }

    fn difficulty_multiplier(&self, action: &ToneConfig) -> f64 {
        action.difficulty_multiplier
    }

    fn action_level(&self, action: &ToneConfig) -> u32 {
        action.level
    }
}
