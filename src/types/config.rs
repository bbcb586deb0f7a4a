//! Timer configuration and the editable settings behind it.
//!
//! `TabataConfig` is the resolved, always-valid configuration the sequencer
//! runs with. `Settings` is the editable form the user interacts with: every
//! field may be temporarily empty or hold a rejected value, and resolving
//! substitutes the caller-supplied default for anything unusable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Default prepare duration in seconds.
pub const DEFAULT_PREPARE_SECONDS: u32 = 5;
/// Default work duration in seconds.
pub const DEFAULT_WORK_SECONDS: u32 = 20;
/// Default rest duration in seconds.
pub const DEFAULT_REST_SECONDS: u32 = 10;
/// Default number of rounds.
pub const DEFAULT_TOTAL_ROUNDS: u32 = 8;

/// Upper bound for any phase duration (one day).
pub const MAX_DURATION_SECONDS: u32 = 86_400;
/// Upper bound for the round count.
pub const MAX_ROUNDS: u32 = 1_000;

// ============================================================================
// ConfigError
// ============================================================================

/// Reasons a raw setting value could not be used.
///
/// These never stop the timer; callers log them and fall back to a default.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The input was empty.
    #[error("{field}が未入力です")]
    Empty {
        /// Field being edited
        field: SettingField,
    },

    /// The input was not an integer.
    #[error("{field}に数値以外が入力されました: {input:?}")]
    NotANumber {
        /// Field being edited
        field: SettingField,
        /// Raw input
        input: String,
    },

    /// The value is outside the allowed range of the field.
    #[error("{field}は{min}-{max}の範囲で指定してください (入力値: {value})")]
    OutOfRange {
        /// Field being edited
        field: SettingField,
        /// Parsed value
        value: i64,
        /// Minimum allowed value
        min: u32,
        /// Maximum allowed value
        max: u32,
    },

    /// The field name is not one of prepare/work/rest/rounds.
    #[error("不明な設定項目です: {0}")]
    UnknownField(String),
}

// ============================================================================
// SettingField
// ============================================================================

/// One of the four user-editable settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    /// Prepare duration (seconds)
    Prepare,
    /// Work duration (seconds)
    Work,
    /// Rest duration (seconds)
    Rest,
    /// Total number of rounds
    Rounds,
}

impl SettingField {
    /// All fields in display order.
    pub const ALL: [SettingField; 4] = [
        SettingField::Prepare,
        SettingField::Work,
        SettingField::Rest,
        SettingField::Rounds,
    ];

    /// Returns the machine-readable name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingField::Prepare => "prepare",
            SettingField::Work => "work",
            SettingField::Rest => "rest",
            SettingField::Rounds => "rounds",
        }
    }

    /// Returns the user-facing label of the field.
    pub fn label(&self) -> &'static str {
        match self {
            SettingField::Prepare => "準備 (秒)",
            SettingField::Work => "運動 (秒)",
            SettingField::Rest => "休憩 (秒)",
            SettingField::Rounds => "セット数",
        }
    }

    /// Smallest accepted value. Prepare may be skipped entirely.
    pub fn min(&self) -> u32 {
        match self {
            SettingField::Prepare => 0,
            _ => 1,
        }
    }

    /// Largest accepted value.
    pub fn max(&self) -> u32 {
        match self {
            SettingField::Rounds => MAX_ROUNDS,
            _ => MAX_DURATION_SECONDS,
        }
    }

    /// Returns true if `value` is within this field's range.
    pub fn accepts(&self, value: u32) -> bool {
        (self.min()..=self.max()).contains(&value)
    }

    /// Parses a raw input string strictly.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing why the input is unusable.
    pub fn parse(&self, raw: &str) -> Result<u32, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::Empty { field: *self });
        }

        let value: i64 = trimmed.parse().map_err(|_| ConfigError::NotANumber {
            field: *self,
            input: trimmed.to_string(),
        })?;

        match u32::try_from(value) {
            Ok(v) if self.accepts(v) => Ok(v),
            _ => Err(ConfigError::OutOfRange {
                field: *self,
                value,
                min: self.min(),
                max: self.max(),
            }),
        }
    }

    /// Parses a raw input, falling back to the documented default.
    ///
    /// Used for command-line flags, where a bad value must not abort the run.
    pub fn coerce(&self, raw: Option<&str>) -> u32 {
        let default = TabataConfig::default().get(*self);
        match raw {
            None => default,
            Some(raw) => match self.parse(raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("{}; デフォルト値 {} を使用します", e, default);
                    default
                }
            },
        }
    }
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SettingField {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prepare" => Ok(SettingField::Prepare),
            "work" => Ok(SettingField::Work),
            "rest" => Ok(SettingField::Rest),
            "rounds" | "round" | "sets" => Ok(SettingField::Rounds),
            other => Err(ConfigError::UnknownField(other.to_string())),
        }
    }
}

// ============================================================================
// TabataConfig
// ============================================================================

/// Resolved configuration for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabataConfig {
    /// Prepare duration in seconds (0 skips the countdown)
    pub prepare_seconds: u32,
    /// Work duration in seconds
    pub work_seconds: u32,
    /// Rest duration in seconds
    pub rest_seconds: u32,
    /// Number of work phases
    pub total_rounds: u32,
}

impl Default for TabataConfig {
    fn default() -> Self {
        Self {
            prepare_seconds: DEFAULT_PREPARE_SECONDS,
            work_seconds: DEFAULT_WORK_SECONDS,
            rest_seconds: DEFAULT_REST_SECONDS,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
        }
    }
}

impl TabataConfig {
    /// Sets the prepare duration.
    pub fn with_prepare_seconds(mut self, seconds: u32) -> Self {
        self.prepare_seconds = seconds;
        self
    }

    /// Sets the work duration.
    pub fn with_work_seconds(mut self, seconds: u32) -> Self {
        self.work_seconds = seconds;
        self
    }

    /// Sets the rest duration.
    pub fn with_rest_seconds(mut self, seconds: u32) -> Self {
        self.rest_seconds = seconds;
        self
    }

    /// Sets the number of rounds.
    pub fn with_total_rounds(mut self, rounds: u32) -> Self {
        self.total_rounds = rounds;
        self
    }

    /// Returns the value of a single field.
    pub fn get(&self, field: SettingField) -> u32 {
        match field {
            SettingField::Prepare => self.prepare_seconds,
            SettingField::Work => self.work_seconds,
            SettingField::Rest => self.rest_seconds,
            SettingField::Rounds => self.total_rounds,
        }
    }

    fn set(&mut self, field: SettingField, value: u32) {
        match field {
            SettingField::Prepare => self.prepare_seconds = value,
            SettingField::Work => self.work_seconds = value,
            SettingField::Rest => self.rest_seconds = value,
            SettingField::Rounds => self.total_rounds = value,
        }
    }

    /// Replaces every invalid field with the documented default.
    pub fn sanitized(mut self) -> Self {
        let fallback = Self::default();
        for field in SettingField::ALL {
            if !field.accepts(self.get(field)) {
                tracing::warn!(
                    "{}の値 {} は無効です。デフォルト値 {} を使用します",
                    field,
                    self.get(field),
                    fallback.get(field)
                );
                self.set(field, fallback.get(field));
            }
        }
        self
    }

    /// Total number of ticks a full run takes.
    pub fn total_seconds(&self) -> u64 {
        let rounds = u64::from(self.total_rounds);
        u64::from(self.prepare_seconds)
            + rounds * u64::from(self.work_seconds)
            + rounds.saturating_sub(1) * u64::from(self.rest_seconds)
    }
}

// ============================================================================
// Settings
// ============================================================================

/// The current content of one editable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    /// Field left empty; resolves to the default
    Unset,
    /// A value accepted by the field
    Value(u32),
}

impl FieldValue {
    /// Returns the stored value, if any.
    pub fn value(&self) -> Option<u32> {
        match self {
            FieldValue::Unset => None,
            FieldValue::Value(v) => Some(*v),
        }
    }
}

/// Result of applying an edit to `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The value was stored
    Applied(u32),
    /// The field was emptied (empty or out-of-range input)
    Cleared,
    /// The input was not numeric; the previous value was kept
    Ignored,
    /// The timer is running or finished; settings are read-only
    Locked,
    /// The round count would fall below what the paused run has reached;
    /// the previous value was kept
    Rejected {
        /// Smallest round count the run allows
        minimum: u32,
    },
}

impl EditOutcome {
    /// Returns true if the settings changed.
    pub fn changed(&self) -> bool {
        matches!(self, EditOutcome::Applied(_) | EditOutcome::Cleared)
    }
}

/// Editable settings with caller-supplied defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    defaults: TabataConfig,
    values: [FieldValue; 4],
}

impl Settings {
    /// Creates settings populated with `defaults`.
    ///
    /// Invalid default fields are replaced by the documented defaults.
    pub fn new(defaults: TabataConfig) -> Self {
        let defaults = defaults.sanitized();
        Self {
            defaults,
            values: SettingField::ALL.map(|field| FieldValue::Value(defaults.get(field))),
        }
    }

    /// Returns the caller-supplied defaults.
    pub fn defaults(&self) -> &TabataConfig {
        &self.defaults
    }

    /// Returns the current content of a field.
    pub fn value(&self, field: SettingField) -> FieldValue {
        self.values[Self::index(field)]
    }

    /// Applies a raw edit to a field.
    ///
    /// Empty and out-of-range input clears the field so it resolves to the
    /// default; non-numeric input is ignored and the last good value kept.
    pub fn edit(&mut self, field: SettingField, raw: &str) -> EditOutcome {
        let slot = &mut self.values[Self::index(field)];
        match field.parse(raw) {
            Ok(value) => {
                *slot = FieldValue::Value(value);
                EditOutcome::Applied(value)
            }
            Err(ConfigError::NotANumber { .. }) => {
                tracing::debug!("Ignoring non-numeric input for {}: {:?}", field.as_str(), raw);
                EditOutcome::Ignored
            }
            Err(e) => {
                tracing::debug!("Clearing {}: {}", field.as_str(), e);
                *slot = FieldValue::Unset;
                EditOutcome::Cleared
            }
        }
    }

    /// Resolves the settings into a valid configuration.
    pub fn resolve(&self) -> TabataConfig {
        let mut config = self.defaults;
        for field in SettingField::ALL {
            if let FieldValue::Value(v) = self.value(field) {
                if field.accepts(v) {
                    config.set(field, v);
                }
            }
        }
        config
    }

    /// Resolves the settings and writes the resolved values back.
    pub fn commit(&mut self) -> TabataConfig {
        let config = self.resolve();
        self.values = SettingField::ALL.map(|field| FieldValue::Value(config.get(field)));
        config
    }

    /// Restores every field to the caller-supplied defaults.
    pub fn reset(&mut self) {
        *self = Self::new(self.defaults);
    }

    fn index(field: SettingField) -> usize {
        match field {
            SettingField::Prepare => 0,
            SettingField::Work => 1,
            SettingField::Rest => 2,
            SettingField::Rounds => 3,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(TabataConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
