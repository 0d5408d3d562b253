//! # mindgym-adaptive
//!
//! Adaptive difficulty engine for the MindGym brain-training games: a
//! per-game contextual epsilon-greedy bandit that picks round
//! configurations, learns online from session outcomes, and recommends
//! the next difficulty level.
//!
//! The engine is one generic learner instantiated three times:
//!
//! - [`games::MatchingPairs`] - card grid recall
//! - [`games::ToneSequence`] - auditory sequence recall
//! - [`games::DiskPuzzle`] - tower transfer planning
//!
//! Per round: [`ContextBuilder`] derives the player context from the
//! recorder's session window, [`AdaptiveBandit::select_action`] picks a
//! configuration, the game plays it out while the [`SessionRecorder`]
//! collects move telemetry, `end_session` reduces that into metrics,
//! [`AdaptiveBandit::calculate_reward`] scores them,
//! [`AdaptiveBandit::update_model`] learns and persists, and
//! [`DifficultyPredictor`] recommends the next level.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use mindgym_adaptive::games::{GameDomain, MatchingPairs};
//! use mindgym_adaptive::{
//!     AdaptiveBandit, ContextBuilder, ContextSignals, DifficultyPredictor, EngineConfig,
//!     MemoryStore, SessionRecorder,
//! };
//!
//! let config = EngineConfig::default();
//! let mut bandit = AdaptiveBandit::new(
//!     MatchingPairs,
//!     config.clone(),
//!     Arc::new(MemoryStore::new()),
//! );
//! let mut recorder = SessionRecorder::new(config.analytics.clone());
//! let builder = ContextBuilder::new(config.context.clone());
//!
//! let history = recorder.session_slice();
//! let ctx = builder.build(
//!     1,
//!     &history,
//!     bandit.domain().streak_threshold(),
//!     ContextSignals::default(),
//!     chrono::Utc::now(),
//! );
//! let action = bandit.select_action(&ctx).expect("catalog is never empty");
//!
//! recorder.start_session(
//!     1,
//!     bandit.domain().time_limit_secs(&action),
//!     bandit.domain().expected_moves(&action),
//!     bandit.domain().difficulty_multiplier(&action),
//!     None,
//! );
//! recorder.record_move(true, None);
//! recorder.record_match();
//! let session = recorder.end_session(true, 12.0, None);
//!
//! let metrics = recorder.performance_metrics(&session);
//! let reward = bandit.calculate_reward(&metrics);
//! bandit.update_model(&ctx, &action, reward, &metrics);
//!
//! let recommendation = DifficultyPredictor::recommend(&bandit, &ctx);
//! assert!(recommendation.next_level >= 1);
//! ```

pub mod analytics;
pub mod bandit;
pub mod config;
pub mod context;
pub mod error;
pub mod games;
pub mod persistence;
pub mod predictor;
pub mod types;

pub use analytics::SessionRecorder;
pub use bandit::AdaptiveBandit;
pub use config::EngineConfig;
pub use context::{ContextBuilder, ContextSignals};
pub use error::StoreError;
pub use persistence::{FileStore, MemoryStore, StateStore};
pub use predictor::DifficultyPredictor;
pub use types::{
    ActionRewardRecord, BanditState, BanditStats, Context, DifficultyChange, LevelRecommendation,
    PerformanceMetrics, ReducedSession, TimeOfDay, UserType,
};
