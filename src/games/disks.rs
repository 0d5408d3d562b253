use serde::{Deserialize, Serialize};

use crate::games::{base_features, GameDomain, MAX_LEVEL, PACE_MODIFIERS};
use crate::types::Context;

/// One disk-puzzle round configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskConfig {
    pub level: u32,
    pub disk_count: u32,
    /// Optimal solution length: 2^disks - 1.
    pub min_moves: u32,
    pub time_limit_secs: f64,
    pub hints_enabled: bool,
    pub difficulty_multiplier: f64,
}

/// Disk-puzzle (tower transfer) game domain. Preference slot: preferred
/// disk count. Move efficiency against the optimal solution is this
/// domain's signature metric.
pub struct DiskPuzzle;

impl DiskPuzzle {
    fn config(level: u32, modifier: f64) -> DiskConfig {
        let disk_count = (3 + level.saturating_sub(1) / 4).min(9);
        let min_moves = 2u32.pow(disk_count) - 1;
        DiskConfig {
            level,
            disk_count,
            min_moves,
            time_limit_secs: min_moves as f64 * 5.0 / modifier,
            hints_enabled: level <= 4,
            difficulty_multiplier: modifier,
        }
    }
}

impl GameDomain for DiskPuzzle {
    type Action = DiskConfig;

    fn storage_key(&self) -> &'static str {
        "mindgym.bandit.disks"
    }

    fn streak_threshold(&self) -> f64 {
        0.65
    }

    fn catalog(&self) -> Vec<DiskConfig> {
        let mut actions = Vec::with_capacity(MAX_LEVEL as usize * PACE_MODIFIERS.len());
        for level in 1..=MAX_LEVEL {
            for modifier in PACE_MODIFIERS {
                actions.push(Self::config(level, modifier));
            }
        }
        actions
    }

    fn action_key(&self, action: &DiskConfig) -> String {
        format!(
            "l{}_d{}_m{}_t{:.1}_h{}_x{:.2}",
            action.level,
            action.disk_count,
            action.min_moves,
            action.time_limit_secs,
            action.hints_enabled,
            action.difficulty_multiplier,
        )
    }

    fn featurize(&self, ctx: &Context) -> Vec<f64> {
        let mut values = base_features(ctx, self.max_level());
        // Planning strength: deliberate players solve transfers in fewer,
        // steadier moves.
        values.push(0.5 * ctx.recent_speed + 0.5 * ctx.success_rate);
        values
    }

    fn feature_dim(&self) -> usize {
        super::BASE_FEATURE_DIM + 1
    }

    fn time_limit_secs(&self, action: &DiskConfig) -> f64 {
        action.time_limit_secs
    }

    fn expected_moves(&self, action: &DiskConfig) -> u32 {
        action.min_moves
    }

    fn difficulty_multiplier(&self, action: &DiskConfig) -> f64 {
        action.difficulty_multiplier
    }

    fn action_level(&self, action: &DiskConfig) -> u32 {
        action.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_covers_all_levels_and_paces() {
        assert_eq!(DiskPuzzle.catalog().len(), 75);
    }

    #[test]
    fn action_keys_are_unique() {
        let domain = DiskPuzzle;
        let keys: HashSet<String> = domain
            .catalog()
            .iter()
            .map(|a| domain.action_key(a))
            .collect();
        assert_eq!(keys.len(), domain.catalog().len());
    }

    #[test]
    fn min_moves_follows_the_transfer_formula() {
        for action in DiskPuzzle.catalog() {
            assert_eq!(action.min_moves, 2u32.pow(action.disk_count) - 1);
        }
    }

    #[test]
    fn disk_count_grows_from_three_to_nine() {
        assert_eq!(DiskPuzzle::config(1, 1.0).disk_count, 3);
        assert_eq!(DiskPuzzle::config(25, 1.0).disk_count, 9);
    }

    #[test]
    fn featurize_matches_declared_dimension() {
        let domain = DiskPuzzle;
        let features = domain.featurize(&Context::default());
        assert_eq!(features.len(), domain.feature_dim());
    }
}
