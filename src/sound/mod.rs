//! Audio cues for the Tabata Timer.
//!
//! The sequencer selects a [`Cue`]; a [`CuePlayer`] turns it into sound.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │    CuePlayer     │ ← Main interface
//! └────────┬─────────┘
//!          │
//!          ├────────▶ RodioCuePlayer  (sine tones, `audio` feature)
//!          ├────────▶ BellCuePlayer   (terminal bell fallback)
//!          └────────▶ MockCuePlayer   (records cues for tests)
//! ```
//!
//! Playback is best-effort. Failures are reported as [`SoundError`] and
//! logged by the caller; they never interrupt the countdown.

mod cue;
mod error;
#[cfg(feature = "audio")]
mod player;

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

pub use cue::{Cue, Tone};
pub use error::SoundError;
#[cfg(feature = "audio")]
pub use player::RodioCuePlayer;

/// Trait for cue playback implementations.
pub trait CuePlayer {
    /// Plays a cue without blocking.
    ///
    /// # Errors
    ///
    /// Returns an error if playback fails.
    fn play(&self, cue: Cue) -> Result<(), SoundError>;

    /// Returns true if playback is disabled.
    fn is_disabled(&self) -> bool;

    /// Disables playback.
    fn disable(&self);
}

impl<P: CuePlayer + ?Sized> CuePlayer for Arc<P> {
    fn play(&self, cue: Cue) -> Result<(), SoundError> {
        (**self).play(cue)
    }

    fn is_disabled(&self) -> bool {
        (**self).is_disabled()
    }

    fn disable(&self) {
        (**self).disable()
    }
}

impl<P: CuePlayer + ?Sized> CuePlayer for Box<P> {
    fn play(&self, cue: Cue) -> Result<(), SoundError> {
        (**self).play(cue)
    }

    fn is_disabled(&self) -> bool {
        (**self).is_disabled()
    }

    fn disable(&self) {
        (**self).disable()
    }
}

#[cfg(feature = "audio")]
impl CuePlayer for RodioCuePlayer {
    fn play(&self, cue: Cue) -> Result<(), SoundError> {
        RodioCuePlayer::play(self, cue)
    }

    fn is_disabled(&self) -> bool {
        RodioCuePlayer::is_disabled(self)
    }

    fn disable(&self) {
        RodioCuePlayer::disable(self)
    }
}

// ============================================================================
// BellCuePlayer
// ============================================================================

/// Rings the terminal bell once per cue.
///
/// Used when built without the `audio` feature or when no audio device
/// could be opened.
#[derive(Debug, Default)]
pub struct BellCuePlayer {
    disabled: AtomicBool,
}

impl BellCuePlayer {
    /// Creates a bell player.
    #[must_use]
    pub fn new(disabled: bool) -> Self {
        Self {
            disabled: AtomicBool::new(disabled),
        }
    }
}

impl CuePlayer for BellCuePlayer {
    fn play(&self, cue: Cue) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            return Ok(());
        }
        let mut stderr = std::io::stderr().lock();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        debug!("Bell rung for cue {}", cue);
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }
}

// ============================================================================
// MockCuePlayer
// ============================================================================

/// Mock cue player for testing.
#[derive(Debug, Default)]
pub struct MockCuePlayer {
    play_calls: Mutex<Vec<Cue>>,
    disabled: AtomicBool,
    should_fail: AtomicBool,
    device_lost: AtomicBool,
}

impl MockCuePlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            play_calls: Mutex::new(Vec::new()),
            disabled: AtomicBool::new(false),
            should_fail: AtomicBool::new(false),
            device_lost: AtomicBool::new(false),
        }
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Makes playback fail as if the output device went away.
    pub fn set_device_lost(&self, device_lost: bool) {
        self.device_lost.store(device_lost, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.calls().len()
    }

    #[must_use]
    pub fn get_play_calls(&self) -> Vec<Cue> {
        self.calls().clone()
    }

    pub fn clear_calls(&self) {
        self.calls().clear();
    }

    fn calls(&self) -> std::sync::MutexGuard<'_, Vec<Cue>> {
        self.play_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CuePlayer for MockCuePlayer {
    fn play(&self, cue: Cue) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::SeqCst) {
            return Ok(());
        }
        if self.device_lost.load(Ordering::SeqCst) {
            return Err(SoundError::DeviceNotAvailable("Mock device lost".to_string()));
        }
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.calls().push(cue);
        Ok(())
    }

    fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }
}

// ============================================================================
// Player selection
// ============================================================================

/// Creates the best available cue player.
///
/// With the `audio` feature a rodio player is tried first; if no device is
/// available a warning is logged and the terminal bell is used instead.
#[must_use]
pub fn create_player(disabled: bool) -> Box<dyn CuePlayer> {
    #[cfg(feature = "audio")]
    {
        if !disabled {
            match RodioCuePlayer::new(false) {
                Ok(player) => return Box::new(player),
                Err(e) => warn!("Audio not available, falling back to terminal bell: {}", e),
            }
        }
    }

    if disabled {
        debug!("Cue playback disabled");
    } else if !cfg!(feature = "audio") {
        warn!("Built without the `audio` feature, using terminal bell for cues");
    }
    Box::new(BellCuePlayer::new(disabled))
}

/// Plays a cue, logging instead of failing.
///
/// A device error disables the player so the rest of the session stays
/// quiet instead of warning on every cue.
pub fn play_cue<P: CuePlayer + ?Sized>(player: &P, cue: Cue) {
    match player.play(cue) {
        Ok(()) => {}
        Err(e) if e.is_device_error() => {
            warn!("{} ({}); cues disabled for this session", e, e.suggestion());
            player.disable();
        }
        Err(e) => warn!("Failed to play cue {}: {} ({})", cue, e, e.suggestion()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let mock = MockCuePlayer::new();
        mock.play(Cue::Countdown).unwrap();
        mock.play(Cue::Completion).unwrap();

        assert_eq!(mock.play_count(), 2);
        assert_eq!(mock.get_play_calls(), vec![Cue::Countdown, Cue::Completion]);

        mock.clear_calls();
        assert_eq!(mock.play_count(), 0);
    }

    #[test]
    fn test_mock_disabled_records_nothing() {
        let mock = MockCuePlayer::new();
        mock.disable();
        assert!(mock.is_disabled());
        mock.play(Cue::Countdown).unwrap();
        assert_eq!(mock.play_count(), 0);
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockCuePlayer::new();
        mock.set_should_fail(true);
        assert!(mock.play(Cue::Countdown).is_err());
    }

    #[test]
    fn test_play_cue_swallows_errors() {
        let mock = MockCuePlayer::new();
        mock.set_should_fail(true);
        play_cue(&mock, Cue::PhaseStartHigh);
        assert_eq!(mock.play_count(), 0);
        // A playback error is not a device error; the player stays on
        assert!(!mock.is_disabled());
    }

    #[test]
    fn test_play_cue_disables_player_on_device_error() {
        let mock = MockCuePlayer::new();
        mock.set_device_lost(true);

        play_cue(&mock, Cue::Countdown);
        assert!(mock.is_disabled());

        // Later cues are skipped without reaching the device
        mock.set_device_lost(false);
        play_cue(&mock, Cue::Completion);
        assert_eq!(mock.play_count(), 0);
    }

    #[test]
    fn test_arc_forwarding() {
        let mock = Arc::new(MockCuePlayer::new());
        let shared: Box<dyn CuePlayer> = Box::new(Arc::clone(&mock));
        shared.play(Cue::PhaseStartMedium).unwrap();
        assert_eq!(mock.get_play_calls(), vec![Cue::PhaseStartMedium]);

        shared.disable();
        assert!(mock.is_disabled());
    }

    #[test]
    fn test_disabled_bell_is_silent() {
        let bell = BellCuePlayer::new(true);
        assert!(bell.is_disabled());
        assert!(bell.play(Cue::Completion).is_ok());
    }

    #[test]
    fn test_create_player_disabled() {
        let player = create_player(true);
        assert!(player.is_disabled());
        assert!(player.play(Cue::Countdown).is_ok());
    }
}
