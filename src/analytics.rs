use std::collections::VecDeque;

use crate::config::AnalyticsParams;
use crate::types::{PerformanceMetrics, ReducedSession};

/// Raw telemetry for the round in flight. Created by `start_session`,
/// reduced and discarded by `end_session`.
#[derive(Debug, Clone)]
struct RoundTelemetry {
    level: u32,
    time_limit_secs: f64,
    expected_moves: u32,
    difficulty_multiplier: f64,
    started_at: i64,
    move_timestamps: Vec<i64>,
    reaction_samples: Vec<f64>,
    correct_moves: u32,
    total_moves: u32,
    matches: u32,
}

/// Accumulates raw interaction events during a round and reduces them into
/// the performance metrics the reward function needs. Keeps a rolling
/// window of reduced sessions for the engagement/frustration derivations.
pub struct SessionRecorder {
    params: AnalyticsParams,
    window: VecDeque<ReducedSession>,
    active: Option<RoundTelemetry>,
}

impl SessionRecorder {
    pub fn new(params: AnalyticsParams) -> Self {
        Self {
            params,
            window: VecDeque::with_capacity(32),
            active: None,
        }
    }

    /// Begins a round. The time limit, theoretical-minimum move count and
    /// difficulty multiplier come from the selected action; time efficiency
    /// and excess-move frustration are defined against them. An explicit
    /// `at` timestamp (epoch ms) keeps tests deterministic.
    pub fn start_session(
        &mut self,
        level: u32,
        time_limit_secs: f64,
        expected_moves: u32,
        difficulty_multiplier: f64,
        at: Option<i64>,
    ) {
        self.active = Some(RoundTelemetry {
            level,
            time_limit_secs,
            expected_moves,
            difficulty_multiplier,
            started_at: at.unwrap_or_else(now_ms),
            move_timestamps: Vec::new(),
            reaction_samples: Vec::new(),
            correct_moves: 0,
            total_moves: 0,
            matches: 0,
        });
    }

    /// Records one move/click. The reaction sample is the delta from the
    /// previous move (or from round start for the first move). Ignored when
    /// no round is active.
    pub fn record_move(&mut self, is_correct: bool, at: Option<i64>) {
        let Some(round) = self.active.as_mut() else {
            tracing::debug!("record_move outside an active round, dropped");
            return;
        };
        let ts = at.unwrap_or_else(now_ms);
        let previous = round.move_timestamps.last().copied().unwrap_or(round.started_at);
        round.reaction_samples.push((ts - previous).max(0) as f64);
        round.move_timestamps.push(ts);
        round.total_moves += 1;
        if is_correct {
            round.correct_moves += 1;
        }
    }

    /// Domain-specific success counter (matched pair, reproduced tone,
    /// completed transfer).
    pub fn record_match(&mut self) {
        if let Some(round) = self.active.as_mut() {
            round.matches += 1;
        }
    }

    /// Ends the round, reduces the telemetry into a `ReducedSession`,
    /// appends it to the rolling window and returns it. An abandoned round
    /// is reported as `completed = false, remaining_secs = 0.0`.
    pub fn end_session(
        &mut self,
        completed: bool,
        remaining_secs: f64,
        at: Option<i64>,
    ) -> ReducedSession {
        let round = self.active.take().unwrap_or_else(|| {
            tracing::debug!("end_session without start_session, reducing an empty round");
            RoundTelemetry {
                level: 1,
                time_limit_secs: 0.0,
                expected_moves: 0,
                difficulty_multiplier: 1.0,
                started_at: at.unwrap_or_else(now_ms),
                move_timestamps: Vec::new(),
                reaction_samples: Vec::new(),
                correct_moves: 0,
                total_moves: 0,
                matches: 0,
            }
        });
        let ended_at = at.unwrap_or_else(now_ms);

        let accuracy = if round.total_moves == 0 {
            0.0
        } else {
            round.correct_moves as f64 / round.total_moves as f64
        };

        let intervals = Self::intervals(&round);
        let speed = match Self::mean(&intervals) {
            Some(avg) if avg > 0.0 => (self.params.speed_baseline_ms / avg).min(1.0),
            _ => 0.5,
        };
        let consistency = self.consistency(&intervals);

        let avg_reaction_ms = Self::mean(&round.reaction_samples).unwrap_or(0.0);

        let session = ReducedSession {
            level: round.level,
            completed,
            accuracy,
            speed,
            duration_minutes: ((ended_at - round.started_at).max(0) as f64) / 60_000.0,
            avg_reaction_ms,
            total_moves: round.total_moves,
            correct_moves: round.correct_moves,
            matches: round.matches,
            expected_moves: round.expected_moves,
            consistency,
            time_limit_secs: round.time_limit_secs,
            remaining_secs: remaining_secs.max(0.0),
            difficulty_multiplier: round.difficulty_multiplier,
            ts: ended_at,
        };

        self.window.push_back(session.clone());
        while self.window.len() > self.params.session_window {
            self.window.pop_front();
        }

        session
    }

    /// Assembles the reward-function inputs for one reduced session,
    /// pairing it with the window-level engagement/frustration signals.
    pub fn performance_metrics(&self, session: &ReducedSession) -> PerformanceMetrics {
        let time_efficiency = if session.time_limit_secs > 0.0 {
            (session.remaining_secs / session.time_limit_secs).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let move_efficiency = if session.total_moves == 0 {
            0.0
        } else if session.expected_moves == 0 {
            1.0
        } else {
            (session.expected_moves as f64 / session.total_moves as f64).min(1.0)
        };

        PerformanceMetrics {
            completed: session.completed,
            accuracy: session.accuracy,
            time_efficiency,
            engagement: self.engagement_level(),
            frustration: self.frustration_level(),
            move_efficiency,
            avg_reaction_ms: session.avg_reaction_ms,
        }
    }

    /// Windowed engagement: completion, accuracy and click-pattern
    /// consistency, averaged across the window and clamped to [0,1].
    pub fn engagement_level(&self) -> f64 {
        if self.window.is_empty() {
            return 0.5;
        }
        let total: f64 = self
            .window
            .iter()
            .map(|s| {
                let completion = if s.completed {
                    self.params.completion_bonus
                } else {
                    0.0
                };
                completion
                    + s.accuracy * self.params.accuracy_weight
                    + s.consistency * self.params.consistency_weight
            })
            .sum();
        (total / self.window.len() as f64).clamp(0.0, 1.0)
    }

    /// Windowed frustration: incomplete rounds, low accuracy and excess
    /// moves beyond the theoretical minimum, averaged and clamped to [0,1].
    pub fn frustration_level(&self) -> f64 {
        if self.window.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .window
            .iter()
            .map(|s| {
                let mut score = 0.0;
                if !s.completed {
                    score += self.params.incomplete_penalty;
                }
                if s.accuracy < self.params.low_accuracy_threshold {
                    score += self.params.low_accuracy_penalty;
                }
                if s.expected_moves > 0 && s.total_moves > s.expected_moves {
                    let excess =
                        (s.total_moves - s.expected_moves) as f64 / s.expected_moves as f64;
                    score += excess.min(1.0) * self.params.excess_move_penalty;
                }
                score.clamp(0.0, 1.0)
            })
            .sum();
        (total / self.window.len() as f64).clamp(0.0, 1.0)
    }

    pub fn sessions(&self) -> &VecDeque<ReducedSession> {
        &self.window
    }

    /// Contiguous view of the window for the context builder.
    pub fn session_slice(&self) -> Vec<ReducedSession> {
        self.window.iter().cloned().collect()
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    fn intervals(round: &RoundTelemetry) -> Vec<f64> {
        round
            .move_timestamps
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).max(0) as f64)
            .collect()
    }

    fn consistency(&self, intervals: &[f64]) -> f64 {
        if intervals.len() < self.params.min_consistency_samples {
            return 0.5;
        }
        let mean = match Self::mean(intervals) {
            Some(mean) if mean > 0.0 => mean,
            _ => return 0.5,
        };
        let variance =
            intervals.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / intervals.len() as f64;
        let cv = variance.sqrt() / mean;
        (1.0 - cv).clamp(0.0, 1.0)
    }

    fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(AnalyticsParams::default())
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
