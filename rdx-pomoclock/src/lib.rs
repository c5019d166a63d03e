//! # Pomoclock
//!
//! An event-driven Pomodoro phase cycle engine for Rust.
//!
//! Pomoclock alternates 25-minute work intervals with 5-minute short breaks,
//! and every fourth work interval with a 15-minute long break. It counts the
//! completed work intervals across sessions.
//!
//! ## Core Concepts
//!
//! - **TimerState**: The single owned record of phase, remaining time, cycle
//!   position, completed count and running flag. Its transitions are pure.
//! - **PhaseCycleController**: Wraps the state with the four operations
//!   (`toggle`, `reset`, `tick`, `on_phase_complete`) and calls out to the
//!   injected collaborators: display, alert, counter store and indicator.
//! - **Scheduler**: A cancellable repeating tick source. At most one tick loop
//!   is alive at any moment.
//! - **PomodoroEngine**: Runs the controller on a tokio task that serialises
//!   ticks and user commands, and broadcasts `TimerEvent`s.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pomoclock::prelude::*;
//! use pomoclock::components::{Collaborators, DotIndicator, JsonFileStore, LineMode,
//!     RingGeometry, SilentAlert, TerminalDisplay};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PomodoroConfig::default();
//!     let collaborators = Collaborators::new(
//!         TerminalDisplay::stdout(RingGeometry::new(90.0), 30, LineMode::Inline),
//!         SilentAlert,
//!         JsonFileStore::new("pomoclock.json", "pomodoroCount"),
//!         DotIndicator::stdout(),
//!     );
//!     let engine = PomodoroEngine::new(config, collaborators);
//!     let handle = engine.handle();
//!     let dispatcher = engine.spawn();
//!
//!     handle.toggle().await?;
//!     tokio::signal::ctrl_c().await?;
//!     handle.shutdown();
//!     dispatcher.await?;
//!     Ok(())
//! }
//! ```

pub const ENGINE_NAME: &str = "Pomoclock";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod common;
pub mod components;
pub mod config;
pub mod controller;
pub mod engine;
pub mod events;
pub mod state;
pub mod time;

/// A prelude module for easy importing of the most common Pomoclock types.
pub mod prelude {
    pub use crate::common::{Phase, CYCLE_LENGTH};
    pub use crate::config::{ClockResolution, PomodoroConfig};
    pub use crate::controller::PhaseCycleController;
    pub use crate::engine::{EngineHandle, PomodoroEngine};
    pub use crate::events::{SystemEvent, TimerEvent};
    pub use crate::state::TimerState;
}

/// Builds the collaborators described by `config`: a terminal display and
/// indicator on stdout, the configured tone, and the JSON counter store.
pub fn default_collaborators(
    config: &config::PomodoroConfig,
    mode: components::LineMode,
) -> components::Collaborators {
    use components::*;

    let display = TerminalDisplay::stdout(
        RingGeometry::new(config.display.ring_radius),
        config.display.bar_width,
        mode,
    );
    let store = JsonFileStore::new(config.store.path.clone(), config.store.key.clone());
    let alert: Box<dyn Alert> = if config.alert.enabled {
        Box::new(ToneAlert::new(config.alert.player.clone()))
    } else {
        Box::new(SilentAlert)
    };

    Collaborators {
        display: Box::new(display),
        alert,
        store: Box::new(store),
        indicator: Box::new(DotIndicator::stdout()),
    }
}
