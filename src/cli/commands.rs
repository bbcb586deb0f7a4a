//! Command definitions for the Tabata Timer CLI.
//!
//! Uses clap derive macro for argument parsing. Timing flags are taken as
//! raw strings so that a bad value falls back to its default instead of
//! aborting the session.

use clap::{Args, Parser, Subcommand};

use crate::types::{SettingField, TabataConfig};

// ============================================================================
// CLI Structure
// ============================================================================

/// Tabata Timer CLI - interval training in the terminal
#[derive(Parser, Debug)]
#[command(
    name = "tabata",
    version,
    about = "ターミナルで動くタバタタイマー",
    long_about = "準備・運動・休憩をラウンドごとに繰り返すインターバルタイマー。\n\
                  フェーズの切り替わりと残り5秒を音でお知らせします。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a Tabata session in the foreground
    Run(RunArgs),

    /// Show the phase schedule without running it
    Plan(PlanArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Arguments
// ============================================================================

/// Phase durations and round count
#[derive(Args, Debug, Clone, Default)]
pub struct TimingArgs {
    /// Prepare duration in seconds (0 skips it) [default: 5]
    #[arg(short, long, value_name = "SECONDS")]
    pub prepare: Option<String>,

    /// Work duration in seconds [default: 20]
    #[arg(short, long, value_name = "SECONDS")]
    pub work: Option<String>,

    /// Rest duration in seconds [default: 10]
    #[arg(short, long, value_name = "SECONDS")]
    pub rest: Option<String>,

    /// Number of rounds [default: 8]
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub rounds: Option<String>,
}

impl TimingArgs {
    /// Builds a configuration, replacing unusable values with defaults.
    pub fn to_config(&self) -> TabataConfig {
        TabataConfig {
            prepare_seconds: SettingField::Prepare.coerce(self.prepare.as_deref()),
            work_seconds: SettingField::Work.coerce(self.work.as_deref()),
            rest_seconds: SettingField::Rest.coerce(self.rest.as_deref()),
            total_rounds: SettingField::Rounds.coerce(self.rounds.as_deref()),
        }
    }
}

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub timing: TimingArgs,

    /// Start counting immediately instead of waiting for `s`
    #[arg(short, long)]
    pub start: bool,

    /// Disable cue sounds
    #[arg(long)]
    pub no_sound: bool,

    /// Print one JSON snapshot per state change
    #[arg(long)]
    pub json: bool,

    /// Keep the session open after the last round (use `r` to reset)
    #[arg(long)]
    pub keep_open: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub timing: TimingArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Tests
// ============================================================================
