use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use pomoclock::common::format_clock;
use pomoclock::components::indicator::lit_dots;
use pomoclock::components::{Collaborators, LineMode, RingGeometry, TerminalDisplay};
use pomoclock::prelude::*;
use pomoclock::{ENGINE_NAME, VERSION as LIB_VERSION};
use rustyline::highlight::Highlighter;
use rustyline::Editor;
use rustyline_derive::{Completer, Helper, Hinter, Validator};
use std::borrow::Cow;
use std::env;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SHELL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A custom helper struct for rustyline that enables syntax highlighting.
#[derive(Completer, Helper, Hinter, Validator)]
struct CommandHighlighter;

impl Highlighter for CommandHighlighter {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if let Some((command, rest)) = line.split_once(' ') {
            Cow::Owned(format!("{} {}", command.yellow().bold(), rest.yellow()))
        } else {
            Cow::Owned(line.yellow().bold().to_string())
        }
    }
    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

fn print_banner() {
    if env::var("QUIET_MODE").is_ok() {
        return;
    }
    println!("{}", "  pomoshell  ::  work / short break / long break".cyan());
    println!(
        "{}",
        "-----------------------------------------------------------------".dimmed()
    );
    println!(
        "          Shell   v{:<8} Library   v{:<8}",
        SHELL_VERSION, LIB_VERSION
    );
    println!(
        "{}",
        "\n    This software is provided 'as is', without warranty of any kind.\n    Distributed under the MIT OR Apache-2.0 license. Use at your own risk.\n"
            .dimmed()
    );
    println!(
        "{}",
        "-----------------------------------------------------------------".dimmed()
    );
}

fn print_help() {
    println!("Available commands:");
    println!("  toggle                - Starts or pauses the countdown.");
    println!("  start | pause         - Same as toggle, but only in one direction.");
    println!("  reset                 - Stops and rewinds the current phase.");
    println!("  status                - Shows phase, time left and the cycle.");
    println!("  watch on | off        - Prints the clock on every tick.");
    println!("  exit                  - Quits the shell.");
}

/// Prints a one-off view of the timer.
fn print_status(state: &TimerState, tick_period: Duration) {
    let dots: String = lit_dots(state.cycle_position(), CYCLE_LENGTH)
        .into_iter()
        .map(|active| if active { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "  {} {}  ({})",
        state.phase().label().bold(),
        format_clock(state.remaining_seconds()).cyan().bold(),
        state.control_label().as_str()
    );
    println!("  cycle {}   completed {}", dots, state.completed_count());
    if state.is_running() {
        let left = tick_period * state.remaining_seconds();
        if let Ok(left) = chrono::Duration::from_std(left) {
            println!("  ends at {}", (Local::now() + left).format("%H:%M:%S"));
        }
    }
}

/// Spawns tasks that report the engine's low-frequency events.
fn spawn_event_listeners(handle: &EngineHandle) {
    let mut system_rx = handle.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            println!("\n<-- [SYSTEM EVENT] {:?}\n>> ", event);
        }
    });

    let mut timer_rx = handle.subscribe_timer_events();
    tokio::spawn(async move {
        loop {
            match timer_rx.recv().await {
                Ok(TimerEvent::PhaseCompleted { phase, completed_count, at }) => {
                    println!(
                        "\n<-- [PHASE] {} finished at {} ({} completed)",
                        phase,
                        at.format("%H:%M:%S"),
                        completed_count
                    );
                }
                Ok(TimerEvent::PhaseStarted { state }) => {
                    println!(
                        "<-- [PHASE] {} started ({})\n>> ",
                        state.phase(),
                        format_clock(state.total_seconds())
                    );
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });
}

/// The stock collaborators, with the per-tick display gated behind `watch`.
fn collaborators(config: &PomodoroConfig, watching: Arc<AtomicBool>) -> Collaborators {
    let mut collaborators = pomoclock::default_collaborators(config, LineMode::Newline);
    collaborators.display = Box::new(
        TerminalDisplay::stdout(
            RingGeometry::new(config.display.ring_radius),
            config.display.bar_width,
            LineMode::Newline,
        )
        .with_gate(watching),
    );
    collaborators
}

#[tokio::main]
async fn main() -> Result<()> {
    print_banner();

    let config = PomodoroConfig::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_target(false)
        .init();

    let tick_period = config.resolution.tick_period();
    let is_watching = Arc::new(AtomicBool::new(false));
    let engine = PomodoroEngine::new(config.clone(), collaborators(&config, is_watching.clone()));
    let handle = engine.handle();

    spawn_event_listeners(&handle);

    info!("Spawning {} in the background...", ENGINE_NAME.cyan());
    let dispatcher = engine.spawn();

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CommandHighlighter));

    println!("{} is ready. Type 'help' for commands or 'exit' to quit.", ENGINE_NAME.cyan());

    loop {
        let prompt = format!("{}", ">> ".cyan().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let args = line.split_whitespace().collect::<Vec<_>>();

                match args.first().copied() {
                    Some("toggle") => {
                        handle.toggle().await?;
                        let state = handle.snapshot().await?;
                        println!("--> {}", if state.is_running() { "Running." } else { "Paused." });
                    }
                    Some(direction @ ("start" | "pause")) => {
                        let state = handle.snapshot().await?;
                        let want_running = direction == "start";
                        if state.is_running() == want_running {
                            println!("--> Already {}.", if want_running { "running" } else { "paused" });
                        } else {
                            handle.toggle().await?;
                            println!("--> {}.", if want_running { "Running" } else { "Paused" });
                        }
                    }
                    Some("reset") => {
                        handle.reset().await?;
                        let state = handle.snapshot().await?;
                        println!(
                            "--> {} rewound to {}.",
                            state.phase(),
                            format_clock(state.remaining_seconds())
                        );
                    }
                    Some("status") => {
                        let state = handle.snapshot().await?;
                        print_status(&state, tick_period);
                    }
                    Some("watch") => match args.get(1).copied() {
                        Some("on") => {
                            is_watching.store(true, Ordering::Relaxed);
                            println!("--> Printing the clock on every tick.");
                        }
                        Some("off") => {
                            is_watching.store(false, Ordering::Relaxed);
                            println!("--> Stopped printing the clock.");
                        }
                        _ => println!("Usage: watch on | off"),
                    },
                    Some("help") => print_help(),
                    Some("exit") => break,
                    None => {}
                    Some(_) => println!("Unknown command: '{}'. Type 'help'.", line.trim()),
                }
            }
            Err(_) => {
                println!("Exiting pomoshell...");
                break;
            }
        }
    }

    handle.shutdown();
    dispatcher.await?;
    Ok(())
}
