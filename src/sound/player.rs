//! Cue player implementation using rodio.
//!
//! Only compiled with the `audio` feature. Tones are synthesized as sine
//! waves and queued on a detached sink, so playback never blocks the timer.

use std::sync::atomic::{AtomicBool, Ordering};

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use super::cue::Cue;
use super::error::SoundError;

/// Output gain applied to every tone.
const CUE_VOLUME: f32 = 0.5;

/// A cue player that synthesizes tones with rodio.
pub struct RodioCuePlayer {
    /// The audio output stream (must be kept alive for playback).
    _stream: OutputStream,
    /// Handle to the output stream for creating sinks.
    stream_handle: OutputStreamHandle,
    /// Whether playback is disabled.
    disabled: AtomicBool,
}

impl RodioCuePlayer {
    /// Opens the default audio output.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::DeviceNotAvailable` if no audio output device
    /// is available.
    pub fn new(disabled: bool) -> Result<Self, SoundError> {
        let (stream, stream_handle) = OutputStream::try_default()
            .map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;

        debug!("Audio output stream initialized");

        Ok(Self {
            _stream: stream,
            stream_handle,
            disabled: AtomicBool::new(disabled),
        })
    }

    /// Queues the tones of `cue` on a new detached sink.
    ///
    /// # Errors
    ///
    /// Returns `SoundError::StreamError` if no sink could be created.
    pub fn play(&self, cue: Cue) -> Result<(), SoundError> {
        if self.disabled.load(Ordering::Relaxed) {
            debug!("Sound playback disabled, skipping {}", cue);
            return Ok(());
        }

        let sink = Sink::try_new(&self.stream_handle)
            .map_err(|e| SoundError::StreamError(e.to_string()))?;

        for tone in cue.tones() {
            sink.append(
                SineWave::new(tone.frequency_hz as f32)
                    .take_duration(tone.duration())
                    .amplify(CUE_VOLUME),
            );
        }
        sink.detach();

        debug!("Cue {} started (detached)", cue);
        Ok(())
    }

    /// Returns true if playback is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Relaxed)
    }

    /// Disables playback.
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for RodioCuePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RodioCuePlayer")
            .field("disabled", &self.disabled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests skip themselves on machines without an audio device.

    #[test]
    fn test_disabled_player_skips_playback() {
        let player = match RodioCuePlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(player.is_disabled());
        assert!(player.play(Cue::Completion).is_ok());
    }

    #[test]
    fn test_disable() {
        let player = match RodioCuePlayer::new(false) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(!player.is_disabled());
        player.disable();
        assert!(player.is_disabled());
    }

    #[test]
    fn test_debug_impl() {
        let player = match RodioCuePlayer::new(true) {
            Ok(p) => p,
            Err(_) => return,
        };

        assert!(format!("{:?}", player).contains("RodioCuePlayer"));
    }
}
