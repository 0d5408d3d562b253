use serde::{Deserialize, Serialize};

use crate::games::{base_features, GameDomain, MAX_LEVEL, PACE_MODIFIERS};
use crate::types::Context;

/// One matching-pairs round configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingConfig {
    pub level: u32,
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub pair_count: u32,
    pub time_limit_secs: f64,
    pub flip_back_ms: u64,
    pub hints_enabled: bool,
    pub difficulty_multiplier: f64,
}

/// Matching-pairs game domain. Preference slot: preferred grid size.
pub struct MatchingPairs;

impl MatchingPairs {
    /// Grid shapes grow with level; cell counts are always even.
    fn grid_for_level(level: u32) -> (u32, u32) {
        match level {
            0..=3 => (2, 3),
            4..=6 => (3, 4),
            7..=10 => (4, 4),
            11..=14 => (4, 5),
            15..=18 => (5, 6),
            19..=22 => (6, 6),
            _ => (6, 7),
        }
    }

    fn config(level: u32, modifier: f64) -> MatchingConfig {
        let (rows, cols) = Self::grid_for_level(level);
        let pairs = rows * cols / 2;
        let base_secs = 20.0 + pairs as f64 * 6.0;
        MatchingConfig {
            level,
            grid_rows: rows,
            grid_cols: cols,
            pair_count: pairs,
            time_limit_secs: base_secs / modifier,
            flip_back_ms: (1200.0 / modifier) as u64,
            hints_enabled: level <= 3,
            difficulty_multiplier: modifier,
        }
    }
}

impl GameDomain for MatchingPairs {
    type Action = MatchingConfig;

    fn storage_key(&self) -> &'static str {
        "mindgym.bandit.matching"
    }

    fn streak_threshold(&self) -> f64 {
        0.6
    }

    fn catalog(&self) -> Vec<MatchingConfig> {
        let mut actions = Vec::with_capacity(MAX_LEVEL as usize * PACE_MODIFIERS.len());
        for level in 1..=MAX_LEVEL {
            for modifier in PACE_MODIFIERS {
                actions.push(Self::config(level, modifier));
            }
        }
        actions
    }

    fn action_key(&self, action: &MatchingConfig) -> String {
        format!(
            "l{}_g{}x{}_p{}_t{:.1}_f{}_h{}_x{:.2}",
            action.level,
            action.grid_rows,
            action.grid_cols,
            action.pair_count,
            action.time_limit_secs,
            action.flip_back_ms,
            action.hints_enabled,
            action.difficulty_multiplier,
        )
    }

    fn featurize(&self, ctx: &Context) -> Vec<f64> {
        let mut values = base_features(ctx, self.max_level());
        // Visual recall strength: how reliably recent rounds were cleared.
        values.push(0.6 * ctx.recent_accuracy + 0.4 * ctx.success_rate);
        values
    }

    fn feature_dim(&self) -> usize {
        super::BASE_FEATURE_DIM + 1
    }

    fn time_limit_secs(&self, action: &MatchingConfig) -> f64 {
        action.time_limit_secs
    }

    fn expected_moves(&self, action: &MatchingConfig) -> u32 {
        // Perfect memory still needs two flips per pair.
        action.pair_count * 2
    }

    fn difficulty_multiplier(&self, action: &MatchingConfig) -> f64 {
        action.difficulty_multiplier
    }

    fn action_level(&self, action: &MatchingConfig) -> u32 {
        action.level
    }
}
