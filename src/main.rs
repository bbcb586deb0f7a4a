//! Tabata Timer CLI - interval training in the terminal
//!
//! A session runs a short prepare countdown, then alternates:
//! - 20 seconds of work
//! - 10 seconds of rest
//! - for 8 rounds, without a rest after the last one

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::sync::mpsc;
use tracing::debug;

use tabata::cli::{
    spawn_stdin_reader, Cli, Commands, Display, JsonRenderer, PlanArgs, RunArgs, TerminalRenderer,
};
use tabata::sequencer::{Control, Renderer, RunnerOptions, SessionPlan, SessionRunner};
use tabata::sound::create_player;

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        Display::show_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so stdout carries only timer output.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Run(args)) => run_session(args).await?,
        Some(Commands::Plan(args)) => show_plan(&args)?,
        Some(Commands::Completions { shell }) => {
            generate_completions(shell);
        }
        None => {
            // No command provided, show help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Runs an interactive session in the foreground.
async fn run_session(args: RunArgs) -> Result<()> {
    let config = args.timing.to_config();
    debug!(?config, "Starting session");

    let renderer: Box<dyn Renderer> = if args.json {
        Box::new(JsonRenderer::stdout())
    } else {
        Display::show_controls_help();
        Box::new(TerminalRenderer::new())
    };
    let options = RunnerOptions {
        exit_on_done: !args.keep_open,
        ..RunnerOptions::default()
    };
    let runner = SessionRunner::new(config, renderer, create_player(args.no_sound), options);

    let (tx, rx) = mpsc::unbounded_channel();
    if args.start {
        tx.send(Control::Start)
            .context("Failed to queue start command")?;
    }
    spawn_stdin_reader(tx)?;

    let state = runner.run(rx).await?;
    debug!(?state, "Session ended");
    Ok(())
}

/// Prints the phase schedule of a configuration.
fn show_plan(args: &PlanArgs) -> Result<()> {
    let plan = SessionPlan::from_config(&args.timing.to_config());
    if args.json {
        Display::show_plan_json(&plan)?;
    } else {
        Display::show_plan(&plan);
    }
    Ok(())
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
