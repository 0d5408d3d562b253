use chrono::{DateTime, Timelike, Utc};

use crate::config::ContextParams;
use crate::types::{Context, ReducedSession, TimeOfDay, UserType};

/// Signals the context builder cannot derive from the session window alone:
/// the recorder's windowed engagement/frustration and the domain's
/// normalized preference.
#[derive(Debug, Clone, Copy)]
pub struct ContextSignals {
    pub engagement: f64,
    pub frustration: f64,
    pub preferred_span: f64,
}

impl Default for ContextSignals {
    fn default() -> Self {
        Self {
            engagement: 0.5,
            frustration: 0.0,
            preferred_span: 0.5,
        }
    }
}

/// Builds the per-selection context from the rolling session window.
/// Pure over its inputs; missing history yields neutral defaults.
pub struct ContextBuilder {
    params: ContextParams,
}

impl ContextBuilder {
    pub fn new(params: ContextParams) -> Self {
        Self { params }
    }

    pub fn build(
        &self,
        level: u32,
        history: &[ReducedSession],
        streak_threshold: f64,
        signals: ContextSignals,
        now: DateTime<Utc>,
    ) -> Context {
        let window_start = history.len().saturating_sub(self.params.history_window);
        let window = &history[window_start..];

        let (recent_accuracy, recent_speed, session_length_minutes, success_rate) =
            if window.is_empty() {
                (
                    self.params.neutral_signal,
                    self.params.neutral_signal,
                    0.0,
                    self.params.neutral_signal,
                )
            } else {
                let n = window.len() as f64;
                (
                    window.iter().map(|s| s.accuracy).sum::<f64>() / n,
                    window.iter().map(|s| s.speed).sum::<f64>() / n,
                    window.iter().map(|s| s.duration_minutes).sum::<f64>() / n,
                    window.iter().filter(|s| s.completed).count() as f64 / n,
                )
            };

        let streak_count = window
            .iter()
            .rev()
            .take_while(|s| s.completed && s.accuracy > streak_threshold)
            .count() as u32;

        let previous_difficulty_multiplier = window
            .last()
            .map(|s| s.difficulty_multiplier)
            .unwrap_or(1.0);

        Context {
            current_level: level.max(1),
            recent_accuracy,
            recent_speed,
            session_length_minutes,
            time_of_day: TimeOfDay::from_hour(now.hour()),
            previous_difficulty_multiplier,
            streak_count,
            user_type: self.classify_user(recent_speed, recent_accuracy),
            frustration_level: signals.frustration.clamp(0.0, 1.0),
            engagement_level: signals.engagement.clamp(0.0, 1.0),
            preferred_span: signals.preferred_span.clamp(0.0, 1.0),
            success_rate,
        }
    }

    fn classify_user(&self, recent_speed: f64, recent_accuracy: f64) -> UserType {
        if recent_speed > recent_accuracy + self.params.user_type_margin {
            UserType::SpeedFocused
        } else if recent_accuracy > recent_speed + self.params.user_type_margin {
            UserType::AccuracyFocused
        } else {
            UserType::Balanced
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(ContextParams::default())
    }
}
