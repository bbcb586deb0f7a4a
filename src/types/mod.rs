//! Core data types for the Tabata Timer.
//!
//! This module defines the data structures used for:
//! - Phase and countdown state
//! - The phase transition table
//! - Read-only snapshots handed to renderers
//! - Timer configuration and editable settings (`config`)

pub mod config;

use serde::{Deserialize, Serialize};

use crate::sound::Cue;

pub use config::{
    ConfigError, EditOutcome, FieldValue, SettingField, Settings, TabataConfig,
    DEFAULT_PREPARE_SECONDS, DEFAULT_REST_SECONDS, DEFAULT_TOTAL_ROUNDS, DEFAULT_WORK_SECONDS,
};

/// Remaining seconds at which the countdown cue sounds.
pub const COUNTDOWN_CUE_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

// ============================================================================
// Phase
// ============================================================================

/// A named countdown segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Lead-in before the first work phase
    #[default]
    Prepare,
    /// Work interval
    Work,
    /// Rest interval between work intervals
    Rest,
    /// All rounds completed
    Done,
}

impl Phase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prepare => "prepare",
            Phase::Work => "work",
            Phase::Rest => "rest",
            Phase::Done => "done",
        }
    }

    /// Returns the user-facing label of the phase.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Prepare => "準備",
            Phase::Work => "運動",
            Phase::Rest => "休憩",
            Phase::Done => "完了",
        }
    }

    /// Returns true for the terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done)
    }
}

// ============================================================================
// Transition
// ============================================================================

/// A phase change performed when the countdown reached zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Phase that just ended
    pub from: Phase,
    /// Phase that just began
    pub to: Phase,
    /// Round after the transition
    pub round: u32,
    /// Time loaded for the new phase
    pub remaining: u32,
    /// Audio cue announcing the new phase
    pub cue: Cue,
}

/// What a single tick did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Remaining time after the decrement, if one happened
    pub counted: Option<u32>,
    /// Transition performed in the same step, if any
    pub transition: Option<Transition>,
    /// The sequencer stopped itself on an impossible state
    pub halted: bool,
}

impl TickOutcome {
    /// Returns true if the tick changed nothing.
    pub fn is_idle(&self) -> bool {
        self.counted.is_none() && self.transition.is_none() && !self.halted
    }
}

// ============================================================================
// SequencerState
// ============================================================================

/// Countdown state of one run.
///
/// Owned by the sequencer and mutated only through `start`, `pause`, `tick`
/// and `reset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerState {
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the current phase
    pub time_remaining: u32,
    /// Current round, starting at 1
    pub current_round: u32,
    /// Whether ticks advance the countdown
    pub running: bool,
    /// Whether the run has been started at least once (start vs. resume label)
    pub has_started_once: bool,
}

impl SequencerState {
    /// Creates the initial state for a run.
    pub fn new(prepare_seconds: u32) -> Self {
        Self {
            phase: Phase::Prepare,
            time_remaining: prepare_seconds,
            current_round: 1,
            running: false,
            has_started_once: false,
        }
    }

    /// Marks the run as running.
    ///
    /// Returns false without changing anything if already running or done.
    pub fn start(&mut self, config: &TabataConfig) -> bool {
        if self.running || self.phase.is_terminal() {
            return false;
        }

        if self.phase == Phase::Prepare && (!self.has_started_once || self.time_remaining == 0) {
            self.time_remaining = config.prepare_seconds;
        }
        self.running = true;
        self.has_started_once = true;
        true
    }

    /// Stops the countdown without touching the remaining time.
    ///
    /// Returns false if already paused.
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Restores the initial state.
    pub fn reset(&mut self, prepare_seconds: u32) {
        *self = Self::new(prepare_seconds);
    }

    /// Advances the countdown by one second.
    ///
    /// Decrements the remaining time and, once it reaches zero, performs
    /// exactly one transition in the same step. Does nothing while paused.
    pub fn tick(&mut self, config: &TabataConfig) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !self.running {
            return outcome;
        }

        if self.time_remaining > 0 {
            self.time_remaining -= 1;
            outcome.counted = Some(self.time_remaining);
        }

        if self.time_remaining == 0 {
            match self.advance(config) {
                Some(transition) => outcome.transition = Some(transition),
                None => outcome.halted = true,
            }
        }

        outcome
    }

    /// Applies the transition table. Returns `None` when no transition is
    /// allowed, in which case the run is stopped.
    fn advance(&mut self, config: &TabataConfig) -> Option<Transition> {
        let from = self.phase;
        let (to, remaining, cue) = match from {
            Phase::Prepare => (Phase::Work, config.work_seconds, Cue::PhaseStartHigh),
            Phase::Work if self.current_round < config.total_rounds => {
                (Phase::Rest, config.rest_seconds, Cue::PhaseStartMedium)
            }
            Phase::Work => (Phase::Done, 0, Cue::Completion),
            Phase::Rest if self.current_round < config.total_rounds => {
                self.current_round += 1;
                (Phase::Work, config.work_seconds, Cue::PhaseStartHigh)
            }
            Phase::Rest => {
                tracing::error!(
                    round = self.current_round,
                    total_rounds = config.total_rounds,
                    "Invariant violation: rest phase ended on the final round; stopping"
                );
                self.running = false;
                return None;
            }
            Phase::Done => {
                tracing::error!("Invariant violation: tick delivered after completion");
                self.running = false;
                return None;
            }
        };

        self.phase = to;
        self.time_remaining = remaining;
        if to.is_terminal() {
            self.running = false;
        }

        Some(Transition {
            from,
            to,
            round: self.current_round,
            remaining,
            cue,
        })
    }

    /// Returns true once all rounds are complete.
    pub fn is_done(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Smallest round count that keeps the run consistent.
    ///
    /// A Rest phase is only entered when another round follows it.
    pub fn minimum_rounds(&self) -> u32 {
        match self.phase {
            Phase::Rest => self.current_round + 1,
            _ => self.current_round,
        }
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new(DEFAULT_PREPARE_SECONDS)
    }
}

// ============================================================================
// StateSnapshot
// ============================================================================

/// Read-only view of the sequencer for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Current phase
    pub phase: Phase,
    /// Seconds left in the current phase
    pub time_remaining: u32,
    /// Current round
    pub current_round: u32,
    /// Configured number of rounds
    pub total_rounds: u32,
    /// Whether the countdown is running
    pub running: bool,
    /// Whether the run has been started at least once
    pub has_started_once: bool,
}

impl StateSnapshot {
    /// Creates a snapshot from the sequencer state.
    pub fn from_state(state: &SequencerState, total_rounds: u32) -> Self {
        Self {
            phase: state.phase,
            time_remaining: state.time_remaining,
            current_round: state.current_round,
            total_rounds,
            running: state.running,
            has_started_once: state.has_started_once,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
