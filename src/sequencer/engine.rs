//! Phase sequencer for the Tabata Timer.
//!
//! This module provides the countdown state machine:
//! - Phase transitions (Prepare → Work → (Rest → Work)* → Done)
//! - One-second ticks driven by an external scheduler
//! - Event firing for renderers and cue players
//! - Settings edits while the countdown is stopped

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::sound::Cue;
use crate::types::{
    EditOutcome, FieldValue, Phase, SequencerState, SettingField, Settings, StateSnapshot,
    TabataConfig, COUNTDOWN_CUE_RANGE,
};

// ============================================================================
// SequencerEvent
// ============================================================================

/// Events emitted by the sequencer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Countdown started
    Started {
        /// False on the first start of a run, true when resuming
        resumed: bool,
    },
    /// Countdown paused
    Paused,
    /// Run and settings restored to their initial values
    Reset,
    /// One second elapsed
    Tick {
        /// Remaining seconds
        remaining_seconds: u32,
    },
    /// Final seconds of a phase
    Countdown {
        /// Remaining seconds (1-5)
        remaining_seconds: u32,
        /// Urgency cue
        cue: Cue,
    },
    /// A new phase began
    PhaseChanged {
        /// Phase that ended
        from: Phase,
        /// Phase that began
        to: Phase,
        /// Current round
        round: u32,
        /// Seconds loaded for the new phase
        remaining_seconds: u32,
        /// Cue announcing the new phase
        cue: Cue,
    },
    /// The sequencer stopped itself on an impossible state
    Halted,
    /// A setting was edited
    SettingsChanged {
        /// Edited field
        field: SettingField,
        /// New content of the field
        value: FieldValue,
    },
}

impl SequencerEvent {
    /// Returns the audio cue carried by this event, if any.
    pub fn cue(&self) -> Option<Cue> {
        match self {
            SequencerEvent::Countdown { cue, .. } | SequencerEvent::PhaseChanged { cue, .. } => {
                Some(*cue)
            }
            _ => None,
        }
    }
}

// ============================================================================
// PhaseSequencer
// ============================================================================

/// Owns the countdown state of one run and its settings.
pub struct PhaseSequencer {
    /// Current countdown state
    state: SequencerState,
    /// Editable settings
    settings: Settings,
    /// Configuration the countdown runs with
    config: TabataConfig,
    /// Event sender channel
    event_tx: mpsc::UnboundedSender<SequencerEvent>,
}

impl PhaseSequencer {
    /// Creates a sequencer whose settings default to `defaults`.
    pub fn new(defaults: TabataConfig, event_tx: mpsc::UnboundedSender<SequencerEvent>) -> Self {
        let settings = Settings::new(defaults);
        let config = settings.resolve();
        Self {
            state: SequencerState::new(config.prepare_seconds),
            settings,
            config,
            event_tx,
        }
    }

    /// Starts or resumes the countdown.
    ///
    /// Resolves the settings first, substituting defaults for empty or
    /// invalid fields. Returns `Ok(false)` if already running or done.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub fn start(&mut self) -> Result<bool> {
        if self.state.running || self.state.is_done() {
            debug!(
                phase = self.state.phase.as_str(),
                running = self.state.running,
                "start ignored"
            );
            return Ok(false);
        }

        self.config = self.settings.commit();
        let resumed = self.state.has_started_once;
        self.state.start(&self.config);

        info!(
            phase = self.state.phase.as_str(),
            remaining = self.state.time_remaining,
            round = self.state.current_round,
            resumed,
            "Timer started"
        );
        self.emit(SequencerEvent::Started { resumed })?;
        Ok(true)
    }

    /// Pauses the countdown. Returns `Ok(false)` if already paused.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub fn pause(&mut self) -> Result<bool> {
        if !self.state.pause() {
            debug!("pause ignored: not running");
            return Ok(false);
        }

        info!(remaining = self.state.time_remaining, "Timer paused");
        self.emit(SequencerEvent::Paused)?;
        Ok(true)
    }

    /// Advances the countdown by one second.
    ///
    /// Returns `Ok(false)` without any effect while paused.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub fn tick(&mut self) -> Result<bool> {
        let outcome = self.state.tick(&self.config);
        if outcome.is_idle() {
            return Ok(false);
        }

        if let Some(remaining_seconds) = outcome.counted {
            self.emit(SequencerEvent::Tick { remaining_seconds })?;
            if COUNTDOWN_CUE_RANGE.contains(&remaining_seconds) {
                self.emit(SequencerEvent::Countdown {
                    remaining_seconds,
                    cue: Cue::Countdown,
                })?;
            }
        }

        if let Some(transition) = outcome.transition {
            info!(
                from = transition.from.as_str(),
                to = transition.to.as_str(),
                round = transition.round,
                remaining = transition.remaining,
                "Phase changed"
            );
            self.emit(SequencerEvent::PhaseChanged {
                from: transition.from,
                to: transition.to,
                round: transition.round,
                remaining_seconds: transition.remaining,
                cue: transition.cue,
            })?;
        }

        if outcome.halted {
            self.emit(SequencerEvent::Halted)?;
        }

        Ok(true)
    }

    /// Stops the countdown and restores the initial state and settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub fn reset(&mut self) -> Result<()> {
        self.pause()?;
        self.settings.reset();
        self.config = self.settings.resolve();
        self.state.reset(self.config.prepare_seconds);

        info!("Timer reset");
        self.emit(SequencerEvent::Reset)
    }

    /// Edits one setting.
    ///
    /// Settings are read-only while the countdown is running and after the
    /// last round. A paused run cannot drop the round count below the
    /// round it has reached.
    ///
    /// # Errors
    ///
    /// Returns an error if the event receiver has been dropped.
    pub fn edit_setting(&mut self, field: SettingField, raw: &str) -> Result<EditOutcome> {
        if self.state.running || self.state.is_done() {
            debug!(
                field = field.as_str(),
                phase = self.state.phase.as_str(),
                "edit rejected"
            );
            return Ok(EditOutcome::Locked);
        }

        let mut edited = self.settings.clone();
        let outcome = edited.edit(field, raw);
        if !outcome.changed() {
            return Ok(outcome);
        }

        let config = edited.resolve();
        let minimum = self.state.minimum_rounds();
        if config.total_rounds < minimum {
            debug!(
                rounds = config.total_rounds,
                minimum, "edit rejected: below current round"
            );
            return Ok(EditOutcome::Rejected { minimum });
        }

        self.settings = edited;
        self.config = config;
        if self.state.phase == Phase::Prepare && !self.state.has_started_once {
            self.state.time_remaining = self.config.prepare_seconds;
        }

        self.emit(SequencerEvent::SettingsChanged {
            field,
            value: self.settings.value(field),
        })?;
        Ok(outcome)
    }

    /// Returns a read-only view for renderers.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::from_state(&self.state, self.config.total_rounds)
    }

    /// Returns a reference to the current countdown state.
    pub fn state(&self) -> &SequencerState {
        &self.state
    }

    /// Returns the configuration the countdown runs with.
    pub fn config(&self) -> &TabataConfig {
        &self.config
    }

    /// Returns the editable settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns true while the countdown is running.
    pub fn is_running(&self) -> bool {
        self.state.running
    }

    /// Returns true once all rounds are complete.
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Returns a mutable reference to the state (for testing).
    #[cfg(test)]
    pub fn get_state_mut(&mut self) -> &mut SequencerState {
        &mut self.state
    }

    fn emit(&self, event: SequencerEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .context("Failed to send sequencer event")
    }
}

// ============================================================================
// Tests
// ============================================================================
