//! Named audio cues and the tones that make them up.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A single sine tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    /// Pitch in hertz
    pub frequency_hz: u32,
    /// Length in milliseconds
    pub duration_ms: u64,
}

impl Tone {
    /// Creates a tone.
    pub const fn new(frequency_hz: u32, duration_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    /// Returns the tone length as a `Duration`.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

const COUNTDOWN_TONES: &[Tone] = &[Tone::new(800, 200)];
const PHASE_START_HIGH_TONES: &[Tone] = &[Tone::new(880, 100)];
const PHASE_START_MEDIUM_TONES: &[Tone] = &[Tone::new(660, 100)];
const COMPLETION_TONES: &[Tone] = &[Tone::new(1000, 500), Tone::new(1200, 500)];

/// Audio notification selected by the sequencer.
///
/// The sequencer only picks a cue; turning it into sound is up to a
/// [`CuePlayer`](super::CuePlayer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Urgency beep during the last seconds of a phase
    Countdown,
    /// A work phase begins
    PhaseStartHigh,
    /// A rest phase begins
    PhaseStartMedium,
    /// All rounds finished
    Completion,
}

impl Cue {
    /// Returns the tones of this cue, played in order.
    pub fn tones(&self) -> &'static [Tone] {
        match self {
            Cue::Countdown => COUNTDOWN_TONES,
            Cue::PhaseStartHigh => PHASE_START_HIGH_TONES,
            Cue::PhaseStartMedium => PHASE_START_MEDIUM_TONES,
            Cue::Completion => COMPLETION_TONES,
        }
    }

    /// Returns the string representation of the cue.
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Countdown => "countdown",
            Cue::PhaseStartHigh => "phase_start_high",
            Cue::PhaseStartMedium => "phase_start_medium",
            Cue::Completion => "completion",
        }
    }

    /// Total playback length.
    pub fn total_duration(&self) -> Duration {
        self.tones().iter().map(Tone::duration).sum()
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
