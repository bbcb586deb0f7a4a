//! Integration tests for the Tabata phase sequencer.
//!
//! These tests drive complete runs through the public API:
//! - Phase order and round progression
//! - Total tick count of a run
//! - Pause freezing the state
//! - Reset restoring the initial state
//! - Invalid settings falling back to defaults
//! - Cue selection per transition

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use tabata::sequencer::{
    Control, PhaseSequencer, Renderer, RunnerOptions, SequencerEvent, SessionPlan, SessionRunner,
};
use tabata::sound::{Cue, MockCuePlayer};
use tabata::types::{
    EditOutcome, FieldValue, Phase, SequencerState, SettingField, StateSnapshot, TabataConfig,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn config(prepare: u32, work: u32, rest: u32, rounds: u32) -> TabataConfig {
    TabataConfig {
        prepare_seconds: prepare,
        work_seconds: work,
        rest_seconds: rest,
        total_rounds: rounds,
    }
}

fn create_sequencer(
    config: TabataConfig,
) -> (PhaseSequencer, mpsc::UnboundedReceiver<SequencerEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PhaseSequencer::new(config, tx), rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<SequencerEvent>) -> Vec<SequencerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Ticks until Done and returns the number of ticks taken.
fn run_to_done(sequencer: &mut PhaseSequencer) -> u64 {
    let mut ticks = 0;
    while !sequencer.is_done() {
        assert!(sequencer.tick().unwrap(), "tick had no effect");
        ticks += 1;
        assert!(ticks < 100_000, "run did not terminate");
    }
    ticks
}

fn phase_changes(events: &[SequencerEvent]) -> Vec<(Phase, u32)> {
    events
        .iter()
        .filter_map(|event| match event {
            SequencerEvent::PhaseChanged { to, round, .. } => Some((*to, *round)),
            _ => None,
        })
        .collect()
}

#[derive(Clone, Default)]
struct RecordingRenderer {
    snapshots: Arc<Mutex<Vec<StateSnapshot>>>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, snapshot: &StateSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}

// ============================================================================
// Full Run
// ============================================================================

#[test]
fn test_two_round_run_takes_55_ticks() {
    let (mut sequencer, _rx) = create_sequencer(config(5, 20, 10, 2));
    sequencer.start().unwrap();

    assert_eq!(run_to_done(&mut sequencer), 55);
    assert_eq!(sequencer.state().time_remaining, 0);
    assert!(!sequencer.is_running());
}

#[test]
fn test_tick_count_matches_plan_total() {
    for cfg in [
        config(5, 20, 10, 8),
        config(3, 7, 4, 1),
        config(1, 1, 1, 5),
        config(10, 45, 15, 3),
    ] {
        let (mut sequencer, _rx) = create_sequencer(cfg);
        sequencer.start().unwrap();

        let ticks = run_to_done(&mut sequencer);
        assert_eq!(ticks, SessionPlan::from_config(&cfg).total_seconds());
        assert_eq!(ticks, cfg.total_seconds());
    }
}

#[test]
fn test_phase_order_and_rounds() {
    let (mut sequencer, mut rx) = create_sequencer(config(2, 3, 2, 3));
    sequencer.start().unwrap();
    run_to_done(&mut sequencer);

    assert_eq!(
        phase_changes(&drain(&mut rx)),
        vec![
            (Phase::Work, 1),
            (Phase::Rest, 1),
            (Phase::Work, 2),
            (Phase::Rest, 2),
            (Phase::Work, 3),
            (Phase::Done, 3),
        ]
    );
    assert_eq!(sequencer.state().current_round, 3);
}

#[test]
fn test_cues_follow_transitions() {
    let (mut sequencer, mut rx) = create_sequencer(config(1, 1, 1, 2));
    sequencer.start().unwrap();
    run_to_done(&mut sequencer);

    let cues: Vec<Cue> = drain(&mut rx)
        .iter()
        .filter(|event| matches!(event, SequencerEvent::PhaseChanged { .. }))
        .filter_map(SequencerEvent::cue)
        .collect();
    assert_eq!(
        cues,
        vec![
            Cue::PhaseStartHigh,
            Cue::PhaseStartMedium,
            Cue::PhaseStartHigh,
            Cue::Completion,
        ]
    );
}

#[test]
fn test_countdown_cues_in_last_five_seconds() {
    let (mut sequencer, mut rx) = create_sequencer(config(8, 1, 1, 1));
    sequencer.start().unwrap();

    // 8 -> 7, 6, 5, 4, 3, 2, 1
    for _ in 0..7 {
        sequencer.tick().unwrap();
    }

    let countdown: Vec<u32> = drain(&mut rx)
        .iter()
        .filter_map(|event| match event {
            SequencerEvent::Countdown {
                remaining_seconds, ..
            } => Some(*remaining_seconds),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_done_is_absorbing() {
    let (mut sequencer, _rx) = create_sequencer(config(0, 1, 1, 1));
    sequencer.start().unwrap();
    run_to_done(&mut sequencer);

    let before = sequencer.state().clone();
    assert!(!sequencer.start().unwrap());
    assert!(!sequencer.tick().unwrap());
    assert_eq!(sequencer.state(), &before);
}

// ============================================================================
// Pause / Resume
// ============================================================================

#[test]
fn test_pause_freezes_state() {
    let (mut sequencer, _rx) = create_sequencer(TabataConfig::default());
    sequencer.start().unwrap();
    for _ in 0..7 {
        sequencer.tick().unwrap();
    }
    sequencer.pause().unwrap();
    let frozen = sequencer.state().clone();

    for _ in 0..10 {
        assert!(!sequencer.tick().unwrap());
    }
    assert_eq!(sequencer.state(), &frozen);
    assert_eq!(frozen.phase, Phase::Work);
    assert_eq!(frozen.time_remaining, 18);
}

#[test]
fn test_resume_continues_where_paused() {
    let (mut sequencer, mut rx) = create_sequencer(TabataConfig::default());
    sequencer.start().unwrap();
    sequencer.tick().unwrap();
    sequencer.pause().unwrap();
    sequencer.start().unwrap();

    let events = drain(&mut rx);
    assert!(events.contains(&SequencerEvent::Started { resumed: false }));
    assert!(events.contains(&SequencerEvent::Started { resumed: true }));
    assert_eq!(sequencer.state().time_remaining, 4);

    let ticks = run_to_done(&mut sequencer);
    assert_eq!(ticks + 1, TabataConfig::default().total_seconds());
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset_restores_initial_state() {
    let (mut sequencer, _rx) = create_sequencer(config(5, 20, 10, 3));
    sequencer.start().unwrap();
    for _ in 0..40 {
        sequencer.tick().unwrap();
    }
    sequencer.reset().unwrap();

    assert_eq!(sequencer.state(), &SequencerState::new(5));
    assert_eq!(sequencer.snapshot().total_rounds, 3);
}

#[test]
fn test_reset_after_done_allows_new_run() {
    let (mut sequencer, _rx) = create_sequencer(config(0, 1, 1, 2));
    sequencer.start().unwrap();
    run_to_done(&mut sequencer);

    sequencer.reset().unwrap();
    assert_eq!(sequencer.state().phase, Phase::Prepare);
    assert!(!sequencer.state().has_started_once);

    assert!(sequencer.start().unwrap());
    assert_eq!(run_to_done(&mut sequencer), 4);
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn test_invalid_work_falls_back_to_default() {
    for raw in ["", "0"] {
        let (mut sequencer, _rx) = create_sequencer(TabataConfig::default());
        assert_eq!(
            sequencer.edit_setting(SettingField::Work, raw).unwrap(),
            EditOutcome::Cleared
        );
        assert_eq!(
            sequencer.settings().value(SettingField::Work),
            FieldValue::Unset
        );

        sequencer.start().unwrap();
        assert_eq!(sequencer.config().work_seconds, 20);
    }
}

#[test]
fn test_non_numeric_edit_keeps_last_value() {
    let (mut sequencer, _rx) = create_sequencer(TabataConfig::default());
    sequencer.edit_setting(SettingField::Rest, "15").unwrap();

    assert_eq!(
        sequencer.edit_setting(SettingField::Rest, "abc").unwrap(),
        EditOutcome::Ignored
    );
    assert_eq!(sequencer.config().rest_seconds, 15);
}

#[test]
fn test_edit_locked_while_running() {
    let (mut sequencer, _rx) = create_sequencer(TabataConfig::default());
    sequencer.start().unwrap();

    assert_eq!(
        sequencer.edit_setting(SettingField::Rounds, "3").unwrap(),
        EditOutcome::Locked
    );
    assert_eq!(sequencer.config().total_rounds, 8);
}

#[test]
fn test_paused_run_cannot_drop_rounds_below_current_round() {
    let (mut sequencer, mut rx) = create_sequencer(config(1, 1, 2, 4));
    sequencer.start().unwrap();
    for _ in 0..6 {
        sequencer.tick().unwrap();
    }
    assert_eq!(sequencer.state().phase, Phase::Rest);
    assert_eq!(sequencer.state().current_round, 2);
    sequencer.pause().unwrap();

    assert_eq!(
        sequencer.edit_setting(SettingField::Rounds, "1").unwrap(),
        EditOutcome::Rejected { minimum: 3 }
    );
    let snapshot = sequencer.snapshot();
    assert!(snapshot.current_round <= snapshot.total_rounds);

    sequencer.start().unwrap();
    run_to_done(&mut sequencer);
    assert_eq!(sequencer.state().current_round, 4);
    assert_eq!(sequencer.state().time_remaining, 0);
    assert!(!drain(&mut rx).contains(&SequencerEvent::Halted));
}

#[test]
fn test_edit_locked_after_done() {
    let (mut sequencer, _rx) = create_sequencer(config(0, 1, 1, 1));
    sequencer.start().unwrap();
    run_to_done(&mut sequencer);

    assert_eq!(
        sequencer.edit_setting(SettingField::Rounds, "6").unwrap(),
        EditOutcome::Locked
    );
    assert_eq!(sequencer.snapshot().total_rounds, 1);
}

#[test]
fn test_prepare_edit_updates_idle_display() {
    let (mut sequencer, _rx) = create_sequencer(TabataConfig::default());
    sequencer.edit_setting(SettingField::Prepare, "12").unwrap();
    assert_eq!(sequencer.snapshot().time_remaining, 12);
}

// ============================================================================
// Runner
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_runner_completes_in_real_time() {
    let renderer = RecordingRenderer::default();
    let player = Arc::new(MockCuePlayer::new());
    let options = RunnerOptions {
        handle_ctrl_c: false,
        ..RunnerOptions::default()
    };
    let runner = SessionRunner::new(
        config(1, 2, 1, 2),
        renderer.clone(),
        Arc::clone(&player),
        options,
    );

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(Control::Start).unwrap();
    drop(tx);

    let started = tokio::time::Instant::now();
    let state = runner.run(rx).await.unwrap();

    assert_eq!(state.phase, Phase::Done);
    assert_eq!(started.elapsed(), Duration::from_secs(6));

    let snapshots = renderer.snapshots.lock().unwrap();
    let last = snapshots.last().unwrap();
    assert_eq!(last.phase, Phase::Done);
    // Renderers never see a zero outside Done
    assert!(snapshots
        .iter()
        .all(|s| s.phase == Phase::Done || s.time_remaining > 0 || !s.running));

    assert_eq!(player.get_play_calls().last(), Some(&Cue::Completion));
}

#[tokio::test(start_paused = true)]
async fn test_runner_edit_then_start() {
    let renderer = RecordingRenderer::default();
    let options = RunnerOptions {
        handle_ctrl_c: false,
        ..RunnerOptions::default()
    };
    let runner = SessionRunner::new(
        config(0, 5, 5, 5),
        renderer,
        MockCuePlayer::new(),
        options,
    );

    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(Control::Edit {
        field: SettingField::Rounds,
        raw: "1".to_string(),
    })
    .unwrap();
    tx.send(Control::Edit {
        field: SettingField::Work,
        raw: "2".to_string(),
    })
    .unwrap();
    tx.send(Control::Start).unwrap();
    drop(tx);

    let started = tokio::time::Instant::now();
    let state = runner.run(rx).await.unwrap();

    assert_eq!(state.phase, Phase::Done);
    assert_eq!(state.current_round, 1);
    // Zero-length prepare costs one tick, then two seconds of work
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}
