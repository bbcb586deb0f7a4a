//! Sequencer module for the Tabata Timer.
//!
//! This module contains the countdown machinery:
//! - `engine`: Phase sequencer with state transitions and event firing
//! - `runner`: Real-time session driver owning the tick interval
//! - `plan`: Precomputed phase schedule of a configuration

pub mod engine;
pub mod plan;
pub mod runner;

pub use engine::{PhaseSequencer, SequencerEvent};
pub use plan::{PlannedPhase, SessionPlan};
pub use runner::{Control, Flow, Renderer, RunnerOptions, SessionRunner, DEFAULT_TICK_PERIOD};
