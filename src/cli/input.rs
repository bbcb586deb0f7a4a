//! Interactive controls read from stdin.
//!
//! One command per line:
//!
//! | Input | Control |
//! |---|---|
//! | `s`, `start` | start / resume |
//! | `p`, `pause` | pause |
//! | empty line, `t`, `toggle` | toggle |
//! | `r`, `reset` | reset |
//! | `set <prepare\|work\|rest\|rounds> <value>` | edit a setting |
//! | `status` | show the current state |
//! | `q`, `quit`, `exit` | quit |

use std::io::BufRead;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::sequencer::Control;
use crate::types::{ConfigError, SettingField};

/// Errors for unrecognized input lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The command word is unknown.
    #[error("不明なコマンドです: {0}")]
    UnknownCommand(String),

    /// `set` without a field name.
    #[error("使い方: set <prepare|work|rest|rounds> <値>")]
    MissingField,

    /// `set` with an unknown field name.
    #[error(transparent)]
    InvalidField(#[from] ConfigError),
}

/// Parses one input line into a control.
///
/// # Errors
///
/// Returns an `InputError` for unknown commands or malformed `set` lines.
pub fn parse_control(line: &str) -> Result<Control, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Control::Toggle);
    };

    match command.to_ascii_lowercase().as_str() {
        "s" | "start" | "resume" => Ok(Control::Start),
        "p" | "pause" => Ok(Control::Pause),
        "t" | "toggle" => Ok(Control::Toggle),
        "r" | "reset" => Ok(Control::Reset),
        "status" => Ok(Control::Status),
        "q" | "quit" | "exit" => Ok(Control::Quit),
        "set" => {
            let field: SettingField = words.next().ok_or(InputError::MissingField)?.parse()?;
            // A missing value is an empty edit
            let raw = words.collect::<Vec<_>>().join(" ");
            Ok(Control::Edit { field, raw })
        }
        other => Err(InputError::UnknownCommand(other.to_string())),
    }
}

/// Reads controls line by line until EOF or until the receiver is gone.
pub fn read_controls<R: BufRead>(reader: R, tx: &mpsc::UnboundedSender<Control>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };

        match parse_control(&line) {
            Ok(control) => {
                if tx.send(control).is_err() {
                    break;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
    debug!("Input closed");
}

/// Reads stdin on a dedicated thread and forwards controls to `tx`.
///
/// A plain thread is used because a blocking stdin read would otherwise
/// hold up runtime shutdown.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn_stdin_reader(tx: mpsc::UnboundedSender<Control>) -> Result<()> {
    std::thread::Builder::new()
        .name("stdin-controls".to_string())
        .spawn(move || read_controls(std::io::stdin().lock(), &tx))
        .context("Failed to spawn stdin reader")?;
    Ok(())
}
