use std::collections::{HashMap, VecDeque};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum TimeOfDay {
    Morning,
    #[default]
    Afternoon,
    Evening,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
        }
    }

    /// Buckets a local wall-clock hour: 5..12 morning, 12..18 afternoon,
    /// everything else evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn one_hot(&self) -> [f64; 3] {
        match self {
            Self::Morning => [1.0, 0.0, 0.0],
            Self::Afternoon => [0.0, 1.0, 0.0],
            Self::Evening => [0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum UserType {
    SpeedFocused,
    AccuracyFocused,
    #[default]
    Balanced,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeedFocused => "speed_focused",
            Self::AccuracyFocused => "accuracy_focused",
            Self::Balanced => "balanced",
        }
    }

    pub fn one_hot(&self) -> [f64; 3] {
        match self {
            Self::SpeedFocused => [1.0, 0.0, 0.0],
            Self::AccuracyFocused => [0.0, 1.0, 0.0],
            Self::Balanced => [0.0, 0.0, 1.0],
        }
    }
}

/// Snapshot of the player's recent state, rebuilt before every action
/// selection and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub current_level: u32,
    pub recent_accuracy: f64,
    pub recent_speed: f64,
    pub session_length_minutes: f64,
    pub time_of_day: TimeOfDay,
    pub previous_difficulty_multiplier: f64,
    pub streak_count: u32,
    pub user_type: UserType,
    pub frustration_level: f64,
    pub engagement_level: f64,
    /// Domain preference, already normalized to [0,1] by the game domain
    /// (preferred sequence length, grid size, or disk count).
    pub preferred_span: f64,
    pub success_rate: f64,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            current_level: 1,
            recent_accuracy: 0.5,
            recent_speed: 0.5,
            session_length_minutes: 0.0,
            time_of_day: TimeOfDay::Afternoon,
            previous_difficulty_multiplier: 1.0,
            streak_count: 0,
            user_type: UserType::Balanced,
            frustration_level: 0.0,
            engagement_level: 0.5,
            preferred_span: 0.5,
            success_rate: 0.5,
        }
    }
}

/// Reward-function inputs derived from one finished round.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub completed: bool,
    pub accuracy: f64,
    pub time_efficiency: f64,
    pub engagement: f64,
    pub frustration: f64,
    pub move_efficiency: f64,
    pub avg_reaction_ms: f64,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self {
            completed: false,
            accuracy: 0.0,
            time_efficiency: 0.0,
            engagement: 0.5,
            frustration: 0.0,
            move_efficiency: 0.0,
            avg_reaction_ms: 0.0,
        }
    }
}

/// One reduced round, kept in the recorder's rolling window after the raw
/// telemetry is discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReducedSession {
    pub level: u32,
    pub completed: bool,
    pub accuracy: f64,
    pub speed: f64,
    pub duration_minutes: f64,
    pub avg_reaction_ms: f64,
    pub total_moves: u32,
    pub correct_moves: u32,
    pub matches: u32,
    pub expected_moves: u32,
    /// 1 - coefficient of variation of inter-move intervals.
    pub consistency: f64,
    pub time_limit_secs: f64,
    pub remaining_secs: f64,
    pub difficulty_multiplier: f64,
    pub ts: i64,
}

/// Append-only learning trace entry; history is truncated to the most
/// recent `history_cap` records before persisting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRewardRecord<A> {
    pub action: A,
    pub context: Context,
    pub reward: f64,
    pub ts: i64,
}

/// Everything a bandit learns: per-action weight vectors, the exploration
/// rate, and the bounded reward history. Persisted whole after every
/// update and reloaded at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanditState<A> {
    #[serde(default = "HashMap::new")]
    pub weights: HashMap<String, Vec<f64>>,
    pub epsilon: f64,
    #[serde(default = "VecDeque::new")]
    pub history: VecDeque<ActionRewardRecord<A>>,
}

impl<A> BanditState<A> {
    pub fn with_epsilon(epsilon: f64) -> Self {
        Self {
            weights: HashMap::new(),
            epsilon,
            history: VecDeque::new(),
        }
    }
}

impl<A: Clone + Serialize + DeserializeOwned> BanditState<A> {
    pub fn total_pulls(&self) -> usize {
        self.history.len()
    }
}

/// Read-only bandit introspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanditStats {
    pub epsilon: f64,
    /// Monotonic summary of recent average reward on a 0-100 scale.
    pub skill_level: f64,
    pub total_pulls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyChange {
    Easier,
    Same,
    Harder,
}

impl DifficultyChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easier => "easier",
            Self::Same => "same",
            Self::Harder => "harder",
        }
    }
}

/// What the presentation layer gets back from the predictor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecommendation {
    pub next_level: u32,
    pub change: DifficultyChange,
    pub insight: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_of_day_buckets_hours() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(3), TimeOfDay::Evening);
    }

    #[test]
    fn one_hot_encodings_are_exclusive() {
        for tod in [TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening] {
            assert_eq!(tod.one_hot().iter().sum::<f64>(), 1.0);
        }
        for ut in [
            UserType::SpeedFocused,
            UserType::AccuracyFocused,
            UserType::Balanced,
        ] {
            assert_eq!(ut.one_hot().iter().sum::<f64>(), 1.0);
        }
    }

    #[test]
    fn bandit_state_deserializes_with_missing_optional_fields() {
        let json = r#"{"epsilon":0.07}"#;
        let state: BanditState<u32> = serde_json::from_str(json).unwrap();
        assert_eq!(state.epsilon, 0.07);
        assert!(state.weights.is_empty());
        assert!(state.history.is_empty());
    }
}
