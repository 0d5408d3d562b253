use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanditParams {
    pub learning_rate: f64,
    pub initial_epsilon: f64,
    pub epsilon_decay: f64,
    pub min_epsilon: f64,
    pub history_cap: usize,
}

impl Default for BanditParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            initial_epsilon: 0.1,
            epsilon_decay: 0.995,
            min_epsilon: 0.01,
            history_cap: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardWeights {
    pub completion: f64,
    pub accuracy: f64,
    pub time_efficiency: f64,
    pub engagement: f64,
    pub frustration: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for RewardWeights {
    fn default() -> Self {
        Self {
            completion: 50.0,
            accuracy: 30.0,
            time_efficiency: 20.0,
            engagement: 15.0,
            frustration: 25.0,
            floor: -100.0,
            ceiling: 100.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextParams {
    /// How many of the most recent sessions feed the context averages.
    pub history_window: usize,
    /// Margin between recent speed and accuracy before the player is
    /// classified away from Balanced.
    pub user_type_margin: f64,
    /// Neutral value for accuracy/speed/success-rate when no history exists.
    pub neutral_signal: f64,
}

impl Default for ContextParams {
    fn default() -> Self {
        Self {
            history_window: 5,
            user_type_margin: 0.15,
            neutral_signal: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelParams {
    pub min_level: u32,
    pub max_level: u32,
    /// How many recent rewards the level trend averages over.
    pub trend_window: usize,
    pub advance_threshold: f64,
    pub regress_threshold: f64,
    /// How many recent rewards the skill-level summary averages over.
    pub skill_window: usize,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            min_level: 1,
            max_level: 25,
            trend_window: 5,
            advance_threshold: 60.0,
            regress_threshold: 20.0,
            skill_window: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsParams {
    /// Rolling window of reduced sessions.
    pub session_window: usize,
    /// Inter-move interval that maps to full speed.
    pub speed_baseline_ms: f64,
    pub low_accuracy_threshold: f64,
    pub incomplete_penalty: f64,
    pub low_accuracy_penalty: f64,
    pub excess_move_penalty: f64,
    pub completion_bonus: f64,
    pub accuracy_weight: f64,
    pub consistency_weight: f64,
    /// Below this many intervals, consistency falls back to 0.5.
    pub min_consistency_samples: usize,
}

impl Default for AnalyticsParams {
    fn default() -> Self {
        Self {
            session_window: 20,
            speed_baseline_ms: 2000.0,
            low_accuracy_threshold: 0.4,
            incomplete_penalty: 0.3,
            low_accuracy_penalty: 0.2,
            excess_move_penalty: 0.3,
            completion_bonus: 0.4,
            accuracy_weight: 0.3,
            consistency_weight: 0.3,
            min_consistency_samples: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    pub bandit: BanditParams,
    pub reward: RewardWeights,
    pub context: ContextParams,
    pub level: LevelParams,
    pub analytics: AnalyticsParams,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("MINDGYM_LEARNING_RATE") {
            if let Ok(lr) = val.parse::<f64>() {
                config.bandit.learning_rate = lr;
            }
        }
        if let Ok(val) = std::env::var("MINDGYM_INITIAL_EPSILON") {
            if let Ok(eps) = val.parse::<f64>() {
                config.bandit.initial_epsilon = eps.clamp(0.0, 1.0);
            }
        }
        if let Ok(val) = std::env::var("MINDGYM_SESSION_WINDOW") {
            if let Ok(n) = val.parse::<usize>() {
                config.analytics.session_window = n.max(1);
            }
        }

        config
    }
}
