use std::collections::HashMap;
use std::sync::Arc;

use mindgym_adaptive::games::{DiskPuzzle, GameDomain, MatchingPairs, ToneSequence};
use mindgym_adaptive::{
    AdaptiveBandit, Context, ContextBuilder, ContextSignals, DifficultyChange,
    DifficultyPredictor, EngineConfig, FileStore, MemoryStore, PerformanceMetrics,
    SessionRecorder, StateStore,
};

fn sample_context(level: u32) -> Context {
    Context {
        current_level: level,
        ..Context::default()
    }
}

fn sample_metrics(completed: bool, accuracy: f64) -> PerformanceMetrics {
    PerformanceMetrics {
        completed,
        accuracy,
        time_efficiency: 0.6,
        engagement: 0.5,
        frustration: 0.1,
        move_efficiency: 0.8,
        avg_reaction_ms: 850.0,
    }
}

/// Plays `rounds` full select -> play -> score -> update cycles through the
/// public API, alternating good and bad outcomes.
fn play_rounds<D: GameDomain>(
    bandit: &mut AdaptiveBandit<D>,
    recorder: &mut SessionRecorder,
    builder: &ContextBuilder,
    level: u32,
    rounds: usize,
) {
    let mut clock = 0i64;
    for i in 0..rounds {
        let history = recorder.session_slice();
        let ctx = builder.build(
            level,
            &history,
            bandit.domain().streak_threshold(),
            ContextSignals {
                engagement: recorder.engagement_level(),
                frustration: recorder.frustration_level(),
                preferred_span: 0.5,
            },
            chrono::Utc::now(),
        );
        let action = bandit.select_action(&ctx).expect("non-empty catalog");

        let good_round = i % 2 == 0;
        recorder.start_session(
            level,
            bandit.domain().time_limit_secs(&action),
            bandit.domain().expected_moves(&action),
            bandit.domain().difficulty_multiplier(&action),
            Some(clock),
        );
        for m in 0..6 {
            clock += if good_round { 800 } else { 2600 };
            recorder.record_move(good_round || m % 2 == 0, Some(clock));
        }
        recorder.record_match();
        clock += 1000;
        let remaining = if good_round { 15.0 } else { 0.0 };
        let session = recorder.end_session(good_round, remaining, Some(clock));

        let metrics = recorder.performance_metrics(&session);
        let reward = bandit.calculate_reward(&metrics);
        bandit.update_model(&ctx, &action, reward, &metrics);
    }
}

#[test]
fn full_lifecycle_runs_for_every_domain() {
    let config = EngineConfig::default();
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());

    let mut matching = AdaptiveBandit::new(MatchingPairs, config.clone(), Arc::clone(&store));
    let mut tones = AdaptiveBandit::new(ToneSequence, config.clone(), Arc::clone(&store));
    let mut disks = AdaptiveBandit::new(DiskPuzzle, config.clone(), Arc::clone(&store));

    let builder = ContextBuilder::new(config.context.clone());
    let mut recorder = SessionRecorder::new(config.analytics.clone());

    play_rounds(&mut matching, &mut recorder, &builder, 2, 8);
    play_rounds(&mut tones, &mut recorder, &builder, 2, 8);
    play_rounds(&mut disks, &mut recorder, &builder, 2, 8);

    assert_eq!(matching.stats().total_pulls, 8);
    assert_eq!(tones.stats().total_pulls, 8);
    assert_eq!(disks.stats().total_pulls, 8);
    assert!(matching.stats().epsilon < 0.1);
}

#[test]
fn greedy_selection_maximizes_predicted_reward_across_catalog() {
    let mut bandit = AdaptiveBandit::new(
        MatchingPairs,
        EngineConfig::default(),
        Arc::new(MemoryStore::new()),
    );
    let ctx = sample_context(5);
    let favorite = bandit.catalog()[30].clone();
    for _ in 0..40 {
        bandit.update_model(&ctx, &favorite, 95.0, &sample_metrics(true, 1.0));
    }

    bandit.set_exploration(0.0);
    let chosen = bandit.select_action(&ctx).unwrap();
    assert_eq!(chosen, favorite);
    // Deterministic with exploration off.
    for _ in 0..10 {
        assert_eq!(bandit.select_action(&ctx).unwrap(), favorite);
    }
}

#[test]
fn full_exploration_covers_the_catalog_roughly_uniformly() {
    let mut bandit = AdaptiveBandit::new(
        ToneSequence,
        EngineConfig::default(),
        Arc::new(MemoryStore::new()),
    );
    bandit.set_exploration(1.0);
    let ctx = sample_context(3);
    let domain = ToneSequence;

    let trials = 7_500usize;
    let arms = bandit.catalog().len();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for _ in 0..trials {
        let action = bandit.select_action(&ctx).unwrap();
        *counts.entry(domain.action_key(&action)).or_insert(0) += 1;
    }

    assert_eq!(counts.len(), arms, "every arm should be visited");
    let expected = trials as f64 / arms as f64;
    // Loose frequency bounds; a biased sampler lands far outside them.
    for (key, count) in &counts {
        assert!(
            (*count as f64) > expected * 0.3 && (*count as f64) < expected * 3.0,
            "arm {key} drawn {count} times, expected about {expected:.0}"
        );
    }
}

#[test]
fn reward_scenarios_from_the_scoring_contract() {
    let bandit = AdaptiveBandit::new(
        DiskPuzzle,
        EngineConfig::default(),
        Arc::new(MemoryStore::new()),
    );

    let perfect = PerformanceMetrics {
        completed: true,
        accuracy: 1.0,
        time_efficiency: 1.0,
        engagement: 1.0,
        frustration: 0.0,
        move_efficiency: 1.0,
        avg_reaction_ms: 600.0,
    };
    assert_eq!(bandit.calculate_reward(&perfect), 100.0);

    let worst = PerformanceMetrics {
        completed: false,
        accuracy: 0.0,
        time_efficiency: 0.0,
        engagement: 0.0,
        frustration: 1.0,
        move_efficiency: 0.0,
        avg_reaction_ms: 0.0,
    };
    assert_eq!(bandit.calculate_reward(&worst), -25.0);
}

#[test]
fn level_trend_scenarios() {
    let config = EngineConfig::default();

    // No data holds the level.
    let empty = AdaptiveBandit::new(
        MatchingPairs,
        config.clone(),
        Arc::new(MemoryStore::new()),
    );
    assert_eq!(empty.optimal_level(&sample_context(1)), 1);

    // Five rewards of 80 advance level 3 to 4.
    let mut strong = AdaptiveBandit::new(
        MatchingPairs,
        config.clone(),
        Arc::new(MemoryStore::new()),
    );
    let ctx = sample_context(3);
    let action = strong.catalog()[0].clone();
    for _ in 0..5 {
        strong.update_model(&ctx, &action, 80.0, &sample_metrics(true, 0.9));
    }
    assert_eq!(strong.optimal_level(&ctx), 4);

    // Five rewards of 10 regress level 3 to 2.
    let mut weak = AdaptiveBandit::new(MatchingPairs, config, Arc::new(MemoryStore::new()));
    for _ in 0..5 {
        weak.update_model(&ctx, &action, 10.0, &sample_metrics(false, 0.2));
    }
    assert_eq!(weak.optimal_level(&ctx), 2);
}

#[test]
fn recommendation_direction_is_monotone_in_reward() {
    let config = EngineConfig::default();
    let ctx = sample_context(10);
    let mut last_rank = -2i32;

    for target in [5.0, 40.0, 90.0] {
        let mut bandit = AdaptiveBandit::new(
            ToneSequence,
            config.clone(),
            Arc::new(MemoryStore::new()),
        );
        let action = bandit.catalog()[0].clone();
        for _ in 0..5 {
            bandit.update_model(&ctx, &action, target, &sample_metrics(true, 0.5));
        }
        let rec = DifficultyPredictor::recommend(&bandit, &ctx);
        let rank = match rec.change {
            DifficultyChange::Easier => -1,
            DifficultyChange::Same => 0,
            DifficultyChange::Harder => 1,
        };
        assert!(rank >= last_rank, "higher reward must never recommend easier");
        last_rank = rank;
    }
}

#[test]
fn state_survives_process_restart_via_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bandits.json");
    let ctx = sample_context(6);

    let (chosen_before, epsilon_before) = {
        let store = Arc::new(FileStore::new(&path));
        let mut bandit =
            AdaptiveBandit::new(DiskPuzzle, EngineConfig::default(), store);
        let favorite = bandit.catalog()[12].clone();
        for _ in 0..25 {
            bandit.update_model(&ctx, &favorite, 70.0, &sample_metrics(true, 0.8));
        }
        let epsilon = bandit.stats().epsilon;
        bandit.set_exploration(0.0);
        (bandit.select_action(&ctx).unwrap(), epsilon)
    };

    // Fresh process: new store handle, new bandit, same file.
    let store = Arc::new(FileStore::new(&path));
    let mut bandit = AdaptiveBandit::new(DiskPuzzle, EngineConfig::default(), store);
    assert!((bandit.stats().epsilon - epsilon_before).abs() < 1e-12);
    assert_eq!(bandit.stats().total_pulls, 25);
    bandit.set_exploration(0.0);
    assert_eq!(bandit.select_action(&ctx).unwrap(), chosen_before);
}

#[test]
fn three_domains_share_one_store_without_interference() {
    let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
    let ctx = sample_context(2);

    let mut matching = AdaptiveBandit::new(
        MatchingPairs,
        EngineConfig::default(),
        Arc::clone(&store),
    );
    let action = matching.catalog()[0].clone();
    for _ in 0..3 {
        matching.update_model(&ctx, &action, 50.0, &sample_metrics(true, 0.8));
    }

    let tones = AdaptiveBandit::new(
        ToneSequence,
        EngineConfig::default(),
        Arc::clone(&store),
    );
    let disks = AdaptiveBandit::new(
        DiskPuzzle,
        EngineConfig::default(),
        Arc::clone(&store),
    );
    assert_eq!(matching.stats().total_pulls, 3);
    assert_eq!(tones.stats().total_pulls, 0);
    assert_eq!(disks.stats().total_pulls, 0);
}

#[test]
fn recorder_window_feeds_context_with_real_history() {
    let config = EngineConfig::default();
    let mut recorder = SessionRecorder::new(config.analytics.clone());
    let builder = ContextBuilder::new(config.context.clone());

    let mut clock = 0i64;
    for _ in 0..4 {
        recorder.start_session(3, 60.0, 8, 1.0, Some(clock));
        for _ in 0..8 {
            clock += 700;
            recorder.record_move(true, Some(clock));
        }
        clock += 500;
        recorder.end_session(true, 20.0, Some(clock));
    }

    let history = recorder.session_slice();
    let ctx = builder.build(
        3,
        &history,
        0.6,
        ContextSignals {
            engagement: recorder.engagement_level(),
            frustration: recorder.frustration_level(),
            preferred_span: 0.5,
        },
        chrono::Utc::now(),
    );

    assert_eq!(ctx.streak_count, 4);
    assert!((ctx.recent_accuracy - 1.0).abs() < 1e-9);
    assert!(ctx.engagement_level > 0.8);
    assert!(ctx.frustration_level < 0.1);
}

#[test]
fn abandoned_rounds_read_as_timeouts_and_lower_the_trend() {
    let config = EngineConfig::default();
    let mut bandit = AdaptiveBandit::new(
        MatchingPairs,
        config.clone(),
        Arc::new(MemoryStore::new()),
    );
    let mut recorder = SessionRecorder::new(config.analytics.clone());
    let builder = ContextBuilder::new(config.context.clone());

    let mut clock = 0i64;
    for _ in 0..5 {
        let history = recorder.session_slice();
        let ctx = builder.build(
            3,
            &history,
            bandit.domain().streak_threshold(),
            ContextSignals {
                engagement: recorder.engagement_level(),
                frustration: recorder.frustration_level(),
                preferred_span: 0.5,
            },
            chrono::Utc::now(),
        );
        let action = bandit.select_action(&ctx).unwrap();
        recorder.start_session(
            3,
            bandit.domain().time_limit_secs(&action),
            bandit.domain().expected_moves(&action),
            bandit.domain().difficulty_multiplier(&action),
            Some(clock),
        );
        clock += 1500;
        recorder.record_move(false, Some(clock));
        // Player walked away: indistinguishable from a timeout.
        let session = recorder.end_session(false, 0.0, Some(clock));
        let metrics = recorder.performance_metrics(&session);
        let reward = bandit.calculate_reward(&metrics);
        bandit.update_model(&ctx, &action, reward, &metrics);
    }

    let ctx = sample_context(3);
    assert_eq!(bandit.optimal_level(&ctx), 2);
    assert_eq!(
        bandit.predict_next_difficulty(&ctx),
        DifficultyChange::Easier
    );
    assert!(bandit.stats().skill_level < 50.0);
}
