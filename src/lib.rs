//! Tabata Timer Library
//!
//! This library provides the core functionality for the Tabata Timer CLI.
//! It includes:
//! - Phase sequencer driving Prepare, Work and Rest across rounds
//! - Session runner owning the one-second tick source
//! - Settings provider with default fallback for invalid input
//! - Audio cues for phase changes and the final countdown
//! - CLI command parsing, stdin controls and display utilities

pub mod cli;
pub mod sequencer;
pub mod sound;
pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    ConfigError, EditOutcome, FieldValue, Phase, SequencerState, SettingField, Settings,
    StateSnapshot, TabataConfig,
};

// Re-export sequencer types
pub use sequencer::{
    Control, PhaseSequencer, Renderer, RunnerOptions, SequencerEvent, SessionPlan, SessionRunner,
};

// Re-export sound types
pub use sound::{create_player, play_cue, Cue, CuePlayer, MockCuePlayer, SoundError, Tone};
