//! Display utilities for the Tabata Timer CLI.
//!
//! This module provides formatted output for:
//! - Live timer state (`TerminalRenderer`, `JsonRenderer`)
//! - Phase schedules
//! - Error messages

use std::io::Write;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::warn;

use crate::sequencer::{Renderer, SessionPlan};
use crate::types::{Phase, StateSnapshot};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the interactive control keys.
    pub fn show_controls_help() {
        println!("操作: s=開始/再開  p=一時停止  Enter=切替  r=リセット  set <項目> <値>  q=終了");
    }

    /// Shows a phase schedule.
    pub fn show_plan(plan: &SessionPlan) {
        println!("タバタタイマー プラン");
        println!("─────────────────────────────");

        for entry in &plan.phases {
            match entry.phase {
                Phase::Prepare => println!(
                    "  {}          {}",
                    entry.phase.label(),
                    Self::format_time(u64::from(entry.seconds))
                ),
                _ => println!(
                    "  {} #{:<3}     {}",
                    entry.phase.label(),
                    entry.round,
                    Self::format_time(u64::from(entry.seconds))
                ),
            }
        }

        println!("─────────────────────────────");
        let total = plan.total_seconds();
        println!(
            "合計: {} ({}秒, {}ラウンド)",
            Self::format_time(total),
            total,
            plan.config.total_rounds
        );
    }

    /// Prints a phase schedule as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show_plan_json(plan: &SessionPlan) -> Result<()> {
        let body = json!({
            "config": plan.config,
            "phases": plan.phases,
            "total_seconds": plan.total_seconds(),
        });
        let text = serde_json::to_string_pretty(&body).context("Failed to serialize plan")?;
        println!("{}", text);
        Ok(())
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Formats seconds as `M:SS`.
    pub fn format_time(total_seconds: u64) -> String {
        format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
    }

    /// Formats one status line for a snapshot.
    pub fn format_status(snapshot: &StateSnapshot) -> String {
        let mut line = format!(
            "[{}] {}",
            snapshot.phase.label(),
            Self::format_time(u64::from(snapshot.time_remaining))
        );

        if snapshot.phase.is_terminal() {
            line.push_str("  お疲れ様でした！");
            return line;
        }

        line.push_str(&format!(
            "  ラウンド: {} / {}",
            snapshot.current_round, snapshot.total_rounds
        ));

        if snapshot.running {
            line.push_str("  > 実行中");
        } else {
            line.push_str(&format!("  || 停止中 (s: {})", Self::start_label(snapshot)));
        }
        line
    }

    /// Label of the start control: "開始" before the first start, "再開" after.
    pub fn start_label(snapshot: &StateSnapshot) -> &'static str {
        if snapshot.has_started_once {
            "再開"
        } else {
            "開始"
        }
    }
}

// ============================================================================
// TerminalRenderer
// ============================================================================

/// Renders one status line per state change.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    last: Option<StateSnapshot>,
}

impl TerminalRenderer {
    /// Creates a terminal renderer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, snapshot: &StateSnapshot) {
        // `status` re-renders on purpose, so only skip exact repeats of a
        // running state
        if snapshot.running && self.last.as_ref() == Some(snapshot) {
            return;
        }
        println!("{}", Display::format_status(snapshot));
        self.last = Some(snapshot.clone());
    }

    fn notice(&mut self, message: &str) {
        println!("* {}", message);
    }
}

// ============================================================================
// JsonRenderer
// ============================================================================

/// Writes one JSON object per line.
pub struct JsonRenderer<W: Write> {
    out: W,
}

impl JsonRenderer<std::io::Stdout> {
    /// Creates a renderer writing to stdout.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, value: &serde_json::Value) {
        let result = serde_json::to_writer(&mut self.out, value)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"))
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write JSON output: {}", e);
        }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, snapshot: &StateSnapshot) {
        match serde_json::to_value(snapshot) {
            Ok(value) => self.write_line(&value),
            Err(e) => warn!("Failed to serialize snapshot: {}", e),
        }
    }

    fn notice(&mut self, message: &str) {
        self.write_line(&json!({ "notice": message }));
    }
}

// ============================================================================
// Tests
// ============================================================================
