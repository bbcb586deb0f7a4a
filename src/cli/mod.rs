//! CLI module for the Tabata Timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `display`: Output formatting and the terminal/JSON renderers
//! - `input`: Interactive controls read from stdin

pub mod commands;
pub mod display;
pub mod input;

pub use commands::{Cli, Commands, PlanArgs, RunArgs, TimingArgs};
pub use display::{Display, JsonRenderer, TerminalRenderer};
pub use input::{parse_control, read_controls, spawn_stdin_reader, InputError};
