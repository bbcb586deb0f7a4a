//! Sound system error types.
//!
//! Cue playback is best-effort: callers log these errors and keep the timer
//! running.

use thiserror::Error;

/// Errors that can occur while playing a cue.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("オーディオデバイスが利用できません: {0}")]
    DeviceNotAvailable(String),

    /// Failed to create the audio output stream or sink.
    #[error("オーディオストリームの作成に失敗しました: {0}")]
    StreamError(String),

    /// Failed to write the terminal bell.
    #[error("ベルの出力に失敗しました: {0}")]
    OutputError(#[from] std::io::Error),

    /// Generic sound playback error.
    #[error("サウンド再生エラー: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns true if this error is related to device availability.
    #[must_use]
    pub fn is_device_error(&self) -> bool {
        matches!(self, Self::DeviceNotAvailable(_) | Self::StreamError(_))
    }

    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "オーディオデバイスを接続してください",
            Self::StreamError(_) => "オーディオ設定を確認してください",
            Self::OutputError(_) => "--no-sound で音を無効にできます",
            Self::PlaybackError(_) => "アプリケーションを再起動してください",
        }
    }
}
