use std::sync::Arc;

use rand::Rng;

use crate::config::EngineConfig;
use crate::games::GameDomain;
use crate::persistence::StateStore;
use crate::types::{
    ActionRewardRecord, BanditState, BanditStats, Context, DifficultyChange, PerformanceMetrics,
};

/// Contextual epsilon-greedy bandit over a game's action catalog.
///
/// One linear weight vector per distinct action; expected reward is the
/// dot product of those weights with the domain's context features. The
/// update is plain online linear regression, a deliberate simplification
/// over a full value-iteration update; the numeric trajectory of weights
/// and epsilon is part of the crate's contract, so keep it this way.
///
/// One instance per game domain, long-lived; the whole `BanditState` is
/// persisted synchronously after every update and reloaded at
/// construction.
pub struct AdaptiveBandit<D: GameDomain> {
    domain: D,
    config: EngineConfig,
    catalog: Vec<D::Action>,
    state: BanditState<D::Action>,
    store: Arc<dyn StateStore>,
}

impl<D: GameDomain> AdaptiveBandit<D> {
    pub fn new(domain: D, config: EngineConfig, store: Arc<dyn StateStore>) -> Self {
        let catalog = domain.catalog();
        let state = Self::load_state(&domain, &config, store.as_ref());
        Self {
            domain,
            config,
            catalog,
            state,
            store,
        }
    }

    /// Loads persisted state; a missing or corrupt blob falls back
    /// silently to defaults. Never surfaced to the caller.
    fn load_state(
        domain: &D,
        config: &EngineConfig,
        store: &dyn StateStore,
    ) -> BanditState<D::Action> {
        let key = domain.storage_key();
        match store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<BanditState<D::Action>>(&raw) {
                Ok(mut state) => {
                    state.epsilon = state.epsilon.clamp(config.bandit.min_epsilon, 1.0);
                    state
                }
                Err(err) => {
                    tracing::warn!(key, error = %err, "persisted bandit state corrupt, resetting");
                    BanditState::with_epsilon(config.bandit.initial_epsilon)
                }
            },
            Ok(None) => BanditState::with_epsilon(config.bandit.initial_epsilon),
            Err(err) => {
                tracing::warn!(key, error = %err, "bandit state load failed, resetting");
                BanditState::with_epsilon(config.bandit.initial_epsilon)
            }
        }
    }

    /// Epsilon-greedy selection: explore uniformly with probability
    /// epsilon, otherwise return the catalog action with the highest
    /// predicted reward (ties go to the earlier entry). `None` only for
    /// an empty catalog.
    pub fn select_action(&self, ctx: &Context) -> Option<D::Action> {
        if self.catalog.is_empty() {
            return None;
        }

        if self.state.epsilon > 0.0 {
            let mut rng = rand::rng();
            if rng.random::<f64>() < self.state.epsilon {
                let idx = rng.random_range(0..self.catalog.len());
                return Some(self.catalog[idx].clone());
            }
        }

        let features = self.domain.featurize(ctx);
        let mut best_idx = 0usize;
        let mut best_score = f64::NEG_INFINITY;
        for (idx, action) in self.catalog.iter().enumerate() {
            let score = self.predicted_reward(action, &features);
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }
        Some(self.catalog[best_idx].clone())
    }

    fn predicted_reward(&self, action: &D::Action, features: &[f64]) -> f64 {
        let key = self.domain.action_key(action);
        match self.state.weights.get(&key) {
            Some(weights) if weights.len() == features.len() => dot(weights, features),
            Some(weights) => {
                // Feature schema drift: stale vector counts as no prior.
                tracing::warn!(
                    key,
                    stored = weights.len(),
                    expected = features.len(),
                    "weight vector dimension mismatch, treating as untrained"
                );
                0.0
            }
            None => 0.0,
        }
    }

    /// Gradient step toward the observed reward, history append, epsilon
    /// decay, synchronous persist. Runs to completion on the calling
    /// thread.
    pub fn update_model(
        &mut self,
        ctx: &Context,
        action: &D::Action,
        reward: f64,
        metrics: &PerformanceMetrics,
    ) {
        let reward = reward.clamp(self.config.reward.floor, self.config.reward.ceiling);
        let features = self.domain.featurize(ctx);
        let key = self.domain.action_key(action);

        let weights = self
            .state
            .weights
            .entry(key.clone())
            .or_insert_with(|| vec![0.0; features.len()]);
        if weights.len() != features.len() {
            tracing::warn!(
                key,
                stored = weights.len(),
                expected = features.len(),
                "weight vector dimension mismatch on update, reinitializing"
            );
            *weights = vec![0.0; features.len()];
        }

        let prediction = dot(weights, &features);
        let error = reward - prediction;
        let lr = self.config.bandit.learning_rate;
        for (w, x) in weights.iter_mut().zip(features.iter()) {
            *w += lr * error * x;
        }

        self.state.history.push_back(ActionRewardRecord {
            action: action.clone(),
            context: ctx.clone(),
            reward,
            ts: chrono::Utc::now().timestamp_millis(),
        });
        while self.state.history.len() > self.config.bandit.history_cap {
            self.state.history.pop_front();
        }

        self.state.epsilon = (self.state.epsilon * self.config.bandit.epsilon_decay)
            .max(self.config.bandit.min_epsilon);

        tracing::debug!(
            key,
            reward,
            prediction,
            epsilon = self.state.epsilon,
            completed = metrics.completed,
            accuracy = metrics.accuracy,
            frustration = metrics.frustration,
            "bandit updated"
        );

        self.persist();
    }

    /// Maps a finished round's metrics to a scalar reward in
    /// [floor, ceiling].
    pub fn calculate_reward(&self, metrics: &PerformanceMetrics) -> f64 {
        let w = &self.config.reward;
        let completion = if metrics.completed { w.completion } else { 0.0 };
        let raw = completion
            + metrics.accuracy * w.accuracy
            + metrics.time_efficiency * w.time_efficiency
            + metrics.engagement * w.engagement
            - metrics.frustration * w.frustration;
        raw.clamp(w.floor, w.ceiling)
    }

    /// Next-level recommendation from the recent reward trend: advance
    /// above the upper threshold, regress below the lower one, otherwise
    /// hold. No history means hold.
    pub fn optimal_level(&self, ctx: &Context) -> u32 {
        let lp = &self.config.level;
        let level = ctx.current_level.clamp(lp.min_level, lp.max_level);
        match self.recent_average_reward(lp.trend_window) {
            Some(avg) if avg > lp.advance_threshold => (level + 1).min(lp.max_level),
            Some(avg) if avg < lp.regress_threshold => level.saturating_sub(1).max(lp.min_level),
            _ => level,
        }
    }

    /// Coarse classification of the coming change, monotone in the recent
    /// reward trend (a higher average never recommends easier).
    pub fn predict_next_difficulty(&self, _ctx: &Context) -> DifficultyChange {
        let lp = &self.config.level;
        match self.recent_average_reward(lp.trend_window) {
            Some(avg) if avg > lp.advance_threshold => DifficultyChange::Harder,
            Some(avg) if avg < lp.regress_threshold => DifficultyChange::Easier,
            _ => DifficultyChange::Same,
        }
    }

    /// Human-readable rationale for the current recommendation.
    pub fn performance_insight(&self, _ctx: &Context) -> String {
        let lp = &self.config.level;
        match self.recent_average_reward(lp.trend_window) {
            None => {
                "Not enough completed rounds to read a trend yet; difficulty holds steady.".into()
            }
            Some(avg) if avg > lp.advance_threshold + 20.0 => format!(
                "Outstanding recent form (average reward {avg:.0}); stepping the challenge up."
            ),
            Some(avg) if avg > lp.advance_threshold => {
                format!("Strong recent rounds (average reward {avg:.0}); ready for a harder setup.")
            }
            Some(avg) if avg < lp.regress_threshold - 20.0 => format!(
                "Recent rounds have been very tough (average reward {avg:.0}); easing difficulty to rebuild momentum."
            ),
            Some(avg) if avg < lp.regress_threshold => {
                format!("Recent rounds have been rough (average reward {avg:.0}); easing off a little.")
            }
            Some(avg) => {
                format!("Performance is steady (average reward {avg:.0}); holding the current difficulty.")
            }
        }
    }

    pub fn stats(&self) -> BanditStats {
        let skill_level = self
            .recent_average_reward(self.config.level.skill_window)
            .map(|avg| ((avg + 100.0) / 2.0).clamp(0.0, 100.0))
            .unwrap_or(50.0);
        BanditStats {
            epsilon: self.state.epsilon,
            skill_level,
            total_pulls: self.state.history.len(),
        }
    }

    /// Average reward of the last `window` history entries, over however
    /// many exist; `None` with no history.
    fn recent_average_reward(&self, window: usize) -> Option<f64> {
        if self.state.history.is_empty() || window == 0 {
            return None;
        }
        let take = window.min(self.state.history.len());
        let sum: f64 = self
            .state
            .history
            .iter()
            .rev()
            .take(take)
            .map(|r| r.reward)
            .sum();
        Some(sum / take as f64)
    }

    fn persist(&self) {
        let key = self.domain.storage_key();
        match serde_json::to_string(&self.state) {
            Ok(raw) => {
                if let Err(err) = self.store.set(key, &raw) {
                    tracing::warn!(key, error = %err, "bandit state save failed");
                }
            }
            Err(err) => tracing::warn!(key, error = %err, "bandit state serialization failed"),
        }
    }

    /// Overrides the exploration rate (mainly for evaluation and tests;
    /// the decay floor applies only to decay, not to explicit overrides).
    pub fn set_exploration(&mut self, epsilon: f64) {
        self.state.epsilon = epsilon.clamp(0.0, 1.0);
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &[D::Action] {
        &self.catalog
    }

    pub fn state(&self) -> &BanditState<D::Action> {
        &self.state
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
