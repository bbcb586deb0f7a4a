//! Session runner: drives a `PhaseSequencer` in real time.
//!
//! The runner is the only owner of the periodic tick source. It holds at most
//! one `tokio::time::Interval`, acquired when the sequencer starts running
//! and dropped as soon as it stops (pause, reset, completion). Between ticks
//! it applies user controls and forwards sequencer events to the renderer
//! and the cue player.

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::sound::{play_cue, CuePlayer};
use crate::types::{EditOutcome, SequencerState, SettingField, StateSnapshot, TabataConfig};

use super::engine::{PhaseSequencer, SequencerEvent};

/// Nominal tick period.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

// ============================================================================
// Control
// ============================================================================

/// A user command delivered to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Start when paused, pause when running
    Toggle,
    /// Restore the initial state and settings
    Reset,
    /// Edit a setting (only while paused)
    Edit {
        /// Field to edit
        field: SettingField,
        /// Raw user input
        raw: String,
    },
    /// Render the current state
    Status,
    /// End the session
    Quit,
}

/// Whether the runner keeps going after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep running
    Continue,
    /// End the session
    Exit,
}

// ============================================================================
// Renderer
// ============================================================================

/// Receives read-only snapshots whenever the state changes.
pub trait Renderer {
    /// Renders the current state.
    fn render(&mut self, snapshot: &StateSnapshot);

    /// Shows a one-off message (e.g. a rejected edit).
    fn notice(&mut self, _message: &str) {}
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, snapshot: &StateSnapshot) {
        (**self).render(snapshot)
    }

    fn notice(&mut self, message: &str) {
        (**self).notice(message)
    }
}

// ============================================================================
// RunnerOptions
// ============================================================================

/// Runner behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Interval between ticks
    pub tick_period: Duration,
    /// End the session as soon as all rounds are done
    pub exit_on_done: bool,
    /// Treat Ctrl-C as `Quit`
    pub handle_ctrl_c: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            exit_on_done: true,
            handle_ctrl_c: true,
        }
    }
}

// ============================================================================
// SessionRunner
// ============================================================================

enum Step {
    Tick,
    Control(Option<Control>),
    Interrupt,
}

/// Drives one timer session.
pub struct SessionRunner<R: Renderer, P: CuePlayer> {
    sequencer: PhaseSequencer,
    events: mpsc::UnboundedReceiver<SequencerEvent>,
    renderer: R,
    player: P,
    ticker: Option<Interval>,
    options: RunnerOptions,
}

impl<R: Renderer, P: CuePlayer> SessionRunner<R, P> {
    /// Creates a runner with a fresh sequencer using `defaults`.
    pub fn new(defaults: TabataConfig, renderer: R, player: P, options: RunnerOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self::with_sequencer(PhaseSequencer::new(defaults, tx), rx, renderer, player, options)
    }

    /// Creates a runner around an existing sequencer and its event receiver.
    pub fn with_sequencer(
        sequencer: PhaseSequencer,
        events: mpsc::UnboundedReceiver<SequencerEvent>,
        renderer: R,
        player: P,
        options: RunnerOptions,
    ) -> Self {
        Self {
            sequencer,
            events,
            renderer,
            player,
            ticker: None,
            options,
        }
    }

    /// Runs the session until it ends.
    ///
    /// The session ends on `Quit`, on Ctrl-C (if enabled), when all rounds
    /// are done (if `exit_on_done`), or when the control channel is closed
    /// while the countdown is stopped. Returns the final state.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequencer's event channel breaks.
    pub async fn run(
        mut self,
        mut controls: mpsc::UnboundedReceiver<Control>,
    ) -> Result<SequencerState> {
        self.renderer.render(&self.sequencer.snapshot());

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut controls_open = true;

        loop {
            if self.should_finish(controls_open) {
                break;
            }

            let step = tokio::select! {
                _ = next_tick(&mut self.ticker) => Step::Tick,
                control = controls.recv(), if controls_open => Step::Control(control),
                _ = &mut ctrl_c, if self.options.handle_ctrl_c => Step::Interrupt,
            };

            let flow = match step {
                Step::Tick => {
                    self.on_tick()?;
                    Flow::Continue
                }
                Step::Control(Some(control)) => self.handle(control)?,
                Step::Control(None) => {
                    debug!("Control channel closed");
                    controls_open = false;
                    Flow::Continue
                }
                Step::Interrupt => {
                    info!("Interrupted");
                    Flow::Exit
                }
            };

            if flow == Flow::Exit {
                break;
            }
        }

        self.release_ticker();
        Ok(self.sequencer.state().clone())
    }

    /// Delivers one tick to the sequencer.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequencer's event channel breaks.
    pub fn on_tick(&mut self) -> Result<()> {
        self.sequencer.tick()?;
        self.dispatch_events();
        self.sync_ticker();
        Ok(())
    }

    /// Applies one control.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequencer's event channel breaks.
    pub fn handle(&mut self, control: Control) -> Result<Flow> {
        debug!(?control, "Control received");
        let flow = match control {
            Control::Start => {
                self.sequencer.start()?;
                Flow::Continue
            }
            Control::Pause => {
                self.sequencer.pause()?;
                Flow::Continue
            }
            Control::Toggle => {
                if self.sequencer.is_running() {
                    self.sequencer.pause()?;
                } else {
                    self.sequencer.start()?;
                }
                Flow::Continue
            }
            Control::Reset => {
                self.sequencer.reset()?;
                Flow::Continue
            }
            Control::Edit { field, raw } => {
                let outcome = self.sequencer.edit_setting(field, &raw)?;
                self.report_edit(field, &raw, outcome);
                Flow::Continue
            }
            Control::Status => {
                self.renderer.render(&self.sequencer.snapshot());
                Flow::Continue
            }
            Control::Quit => Flow::Exit,
        };

        self.dispatch_events();
        self.sync_ticker();
        Ok(flow)
    }

    /// Returns true while a tick interval is held.
    pub fn holds_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    /// Returns the sequencer being driven.
    pub fn sequencer(&self) -> &PhaseSequencer {
        &self.sequencer
    }

    fn should_finish(&self, controls_open: bool) -> bool {
        if self.sequencer.is_done() && self.options.exit_on_done {
            debug!("All rounds done, ending session");
            return true;
        }
        if !controls_open && !self.sequencer.is_running() {
            debug!("No more controls and timer stopped, ending session");
            return true;
        }
        false
    }

    /// Acquires or releases the interval to match the sequencer.
    fn sync_ticker(&mut self) {
        match (self.sequencer.is_running(), self.ticker.is_some()) {
            (true, false) => {
                let period = self.options.tick_period;
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                self.ticker = Some(ticker);
                debug!(?period, "Tick interval acquired");
            }
            (false, true) => self.release_ticker(),
            _ => {}
        }
    }

    fn release_ticker(&mut self) {
        if self.ticker.take().is_some() {
            debug!("Tick interval released");
        }
    }

    /// Forwards pending events: cues to the player, one render per batch.
    fn dispatch_events(&mut self) {
        let mut changed = false;
        while let Ok(event) = self.events.try_recv() {
            if let Some(cue) = event.cue() {
                play_cue(&self.player, cue);
            }
            if matches!(event, SequencerEvent::Halted) {
                warn!("Timer stopped after an inconsistent state; use reset to start over");
            }
            changed = true;
        }
        if changed {
            self.renderer.render(&self.sequencer.snapshot());
        }
    }

    fn report_edit(&mut self, field: SettingField, raw: &str, outcome: EditOutcome) {
        let message = match outcome {
            EditOutcome::Applied(value) => format!("{}を{}に設定しました", field, value),
            EditOutcome::Cleared => format!(
                "{}の入力値 {:?} は無効です。開始時にデフォルト値 {} を使用します",
                field,
                raw,
                self.sequencer.settings().defaults().get(field)
            ),
            EditOutcome::Ignored => format!("{}には数値を入力してください", field),
            EditOutcome::Locked if self.sequencer.is_done() => {
                "完了後は設定を変更できません。リセットしてください".to_string()
            }
            EditOutcome::Locked => "タイマー実行中は設定を変更できません".to_string(),
            EditOutcome::Rejected { minimum } => format!(
                "{}は{}以上を指定してください (進行中のラウンドより減らせません)",
                field, minimum
            ),
        };
        self.renderer.notice(&message);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

// ============================================================================
// Tests
// ============================================================================
